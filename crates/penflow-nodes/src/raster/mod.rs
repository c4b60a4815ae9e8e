//! Raster-sampling kinds
//!
//! Each of these reads brightness from the raster of a connected `image`
//! node, mapped onto a target rectangle in drawing space. Without a raster
//! they produce nothing.

pub mod ascii;
pub mod halftone;
pub mod mask;

use penflow_engine::{PortDataType, PortMetadata, Point, Raster};

pub use ascii::AsciiNode;
pub use halftone::HalftoneNode;
pub use mask::MaskNode;

pub const PORT_IMAGE: &str = "image";

/// Upper bound on samples taken along one scan line or polyline segment
pub const MAX_SAMPLES: usize = 4_096;

/// Upper bound on halftone scan lines
pub const MAX_SCAN_LINES: usize = 2_048;

pub(crate) fn image_input() -> PortMetadata {
    PortMetadata::required(PORT_IMAGE, "Image", PortDataType::Image)
}

/// A raster stretched over a rectangle of the drawing
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    raster: &'a Raster,
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl<'a> Frame<'a> {
    /// Place `raster` at `(x, y)`; a zero `height` keeps the image aspect
    ///
    /// `None` when the resolved rectangle is empty.
    pub fn new(raster: &'a Raster, x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        let height = if height > 0.0 {
            height
        } else {
            width * raster.aspect()
        };
        let usable = width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite();
        usable.then_some(Self {
            raster,
            origin: Point::new(x, y),
            width,
            height,
        })
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x
            && p.x <= self.origin.x + self.width
            && p.y >= self.origin.y
            && p.y <= self.origin.y + self.height
    }

    /// Brightness under `p`; points outside the rectangle read as white
    pub fn brightness(&self, p: Point) -> f64 {
        if !self.contains(p) {
            return 1.0;
        }
        self.raster.sample(
            (p.x - self.origin.x) / self.width,
            (p.y - self.origin.y) / self.height,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use penflow_engine::Raster;

    /// `width` x `height` raster whose left half is black and right half white
    pub fn split_raster(width: usize, height: usize) -> Raster {
        let luma = (0..width * height)
            .map(|i| if i % width < width / 2 { 0.0 } else { 1.0 })
            .collect();
        Raster::from_luma(width, height, luma).unwrap()
    }

    pub fn flat_raster(value: f32) -> Raster {
        Raster::from_luma(4, 4, vec![value; 16]).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_zero_height_keeps_aspect() {
        let raster = split_raster(4, 2);
        let frame = Frame::new(&raster, 0.0, 0.0, 100.0, 0.0).unwrap();
        assert_eq!(frame.height, 50.0);
        assert!(Frame::new(&raster, 0.0, 0.0, 0.0, 10.0).is_none());
    }

    #[test]
    fn test_brightness_maps_rectangle() {
        let raster = split_raster(8, 8);
        let frame = Frame::new(&raster, 10.0, 10.0, 80.0, 80.0).unwrap();
        assert!(frame.brightness(Point::new(15.0, 50.0)) < 0.01);
        assert!(frame.brightness(Point::new(85.0, 50.0)) > 0.99);
        assert_eq!(frame.brightness(Point::new(0.0, 0.0)), 1.0);
    }
}
