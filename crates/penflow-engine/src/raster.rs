//! Decoded rasters for image-sampling node kinds
//!
//! Image nodes carry their pixels as a `data:` URL. Decoding happens once per
//! distinct payload, before a run starts, so evaluation itself never blocks
//! on image work.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use base64::Engine as _;

use crate::error::{PenflowError, Result};
use crate::hashing::image_fingerprint;

/// A luminance grid with values in `[0, 1]` (0 = black)
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    luma: Vec<f32>,
}

impl Raster {
    /// Build a raster from row-major luminance values
    pub fn from_luma(width: usize, height: usize, luma: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 || luma.len() != width * height {
            return Err(PenflowError::failed(format!(
                "raster of {}x{} cannot hold {} samples",
                width,
                height,
                luma.len()
            )));
        }
        Ok(Self { width, height, luma })
    }

    /// Decode a base64 `data:` URL into a luminance grid
    pub fn decode_data_url(src: &str) -> Result<Self> {
        let rest = src
            .strip_prefix("data:")
            .ok_or_else(|| PenflowError::InvalidDataUrl("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| PenflowError::InvalidDataUrl("missing payload separator".to_string()))?;
        if !header.split(';').any(|part| part == "base64") {
            return Err(PenflowError::InvalidDataUrl(
                "only base64 payloads are supported".to_string(),
            ));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| PenflowError::InvalidDataUrl(e.to_string()))?;

        let gray = image::load_from_memory(&bytes)?.to_luma8();
        let (width, height) = (gray.width() as usize, gray.height() as usize);
        let luma = gray
            .into_raw()
            .into_iter()
            .map(|v| f32::from(v) / 255.0)
            .collect();
        Self::from_luma(width, height, luma)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Height over width
    pub fn aspect(&self) -> f64 {
        self.height as f64 / self.width as f64
    }

    fn pixel(&self, x: usize, y: usize) -> f64 {
        f64::from(self.luma[y * self.width + x])
    }

    /// Bilinear brightness at normalized coordinates `(u, v)` in `[0, 1]`
    ///
    /// Coordinates outside the unit square are clamped to the border.
    pub fn sample(&self, u: f64, v: f64) -> f64 {
        let fx = (u.clamp(0.0, 1.0) * self.width as f64 - 0.5).max(0.0);
        let fy = (v.clamp(0.0, 1.0) * self.height as f64 - 0.5).max(0.0);
        let x0 = (fx.floor() as usize).min(self.width - 1);
        let y0 = (fy.floor() as usize).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = (fx - x0 as f64).clamp(0.0, 1.0);
        let ty = (fy - y0 as f64).clamp(0.0, 1.0);

        let top = self.pixel(x0, y0) * (1.0 - tx) + self.pixel(x1, y0) * tx;
        let bottom = self.pixel(x0, y1) * (1.0 - tx) + self.pixel(x1, y1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

/// Decoded rasters memoized by payload fingerprint
#[derive(Debug, Default)]
pub struct RasterStore {
    rasters: HashMap<String, Arc<Raster>>,
    failures: HashMap<String, String>,
}

impl RasterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `src` unless an earlier call already did
    pub fn load(&mut self, src: &str) -> Result<Arc<Raster>> {
        let key = image_fingerprint(src);
        if let Some(raster) = self.rasters.get(&key) {
            return Ok(Arc::clone(raster));
        }
        if let Some(message) = self.failures.get(&key) {
            return Err(PenflowError::failed(message.clone()));
        }
        match Raster::decode_data_url(src) {
            Ok(raster) => {
                log::debug!(
                    "Decoded {}x{} raster ({} bytes)",
                    raster.width(),
                    raster.height(),
                    src.len()
                );
                let raster = Arc::new(raster);
                self.rasters.insert(key, Arc::clone(&raster));
                Ok(raster)
            }
            Err(e) => {
                self.failures.insert(key, e.to_string());
                Err(e)
            }
        }
    }

    /// A previously decoded raster
    pub fn get(&self, src: &str) -> Option<Arc<Raster>> {
        self.rasters.get(&image_fingerprint(src)).cloned()
    }

    /// Forget decoded rasters and failures whose fingerprint is not in `live`
    pub fn retain(&mut self, live: &HashSet<String>) -> usize {
        let before = self.rasters.len() + self.failures.len();
        self.rasters.retain(|key, _| live.contains(key));
        self.failures.retain(|key, _| live.contains(key));
        let removed = before - self.rasters.len() - self.failures.len();
        if removed > 0 {
            log::debug!("Released {} unused rasters", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn png_data_url(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> String {
    let img = image::GrayImage::from_fn(width, height, |x, y| image::Luma([f(x, y)]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
