//! Strange attractor generator
//!
//! Iterates a 2D map from a fixed start point, discards a warm-up prefix,
//! and records the orbit as a cloud of short polylines. The orbit stops at
//! the first iterate that leaves the divergence bound.

use penflow_engine::params::{AttractorParams, AttractorType};
use penflow_engine::{ColoredPath, EngineLimits, NodeDescriptor, NodeKind, NodeMetadata, Point};

pub struct AttractorNode;

impl AttractorNode {
    pub fn generate(p: &AttractorParams, limits: &EngineLimits) -> Vec<ColoredPath> {
        let iterations = (p.iterations as usize).clamp(
            limits.attractor_min_iterations,
            limits.attractor_max_iterations.max(limits.attractor_min_iterations),
        );
        let orbit = iterate(
            start_point(p.attractor_type),
            step_fn(p),
            limits.attractor_warmup,
            iterations,
            limits.attractor_divergence_bound,
        );
        let placed: Vec<Point> = orbit
            .into_iter()
            .map(|q| Point::new(p.cx + q.x * p.scale, p.cy + q.y * p.scale))
            .collect();
        log::debug!("Attractor recorded {} of {} iterates", placed.len(), iterations);
        chunk(placed, limits.attractor_chunk_size, p.color)
    }
}

impl NodeDescriptor for AttractorNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(
            NodeKind::Attractor,
            "Attractor",
            "Orbit of a Clifford, de Jong, Bedhead, Tinkerbell or Gumowski-Mira map",
        )
        .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(AttractorNode::descriptor));

fn start_point(kind: AttractorType) -> Point {
    match kind {
        AttractorType::Tinkerbell => Point::new(-0.72, -0.64),
        AttractorType::Clifford
        | AttractorType::DeJong
        | AttractorType::Bedhead
        | AttractorType::Gumowski => Point::new(0.1, 0.1),
    }
}

fn step_fn(p: &AttractorParams) -> impl FnMut(Point) -> Point {
    let (kind, a, b, c, d) = (p.attractor_type, p.a, p.b, p.c, p.d);
    move |q: Point| {
        let (x, y) = (q.x, q.y);
        match kind {
            AttractorType::Clifford => Point::new(
                (a * y).sin() + c * (a * x).cos(),
                (b * x).sin() + d * (b * y).cos(),
            ),
            AttractorType::DeJong => Point::new(
                (a * y).sin() - (b * x).cos(),
                (c * x).sin() - (d * y).cos(),
            ),
            AttractorType::Bedhead => Point::new(
                (x * y / b).sin() * y + (a * x - y).cos(),
                x + y.sin() / b,
            ),
            AttractorType::Tinkerbell => Point::new(
                x * x - y * y + a * x + b * y,
                2.0 * x * y + c * x + d * y,
            ),
            AttractorType::Gumowski => {
                // mu = a, alpha = b, sigma = c
                let f = |v: f64| a * v + 2.0 * (1.0 - a) * v * v / (1.0 + v * v);
                let nx = y + b * (1.0 - c * y * y) * y + f(x);
                let ny = -x + f(nx);
                Point::new(nx, ny)
            }
        }
    }
}

fn diverged(q: Point, bound: f64) -> bool {
    !q.is_finite() || q.x.abs() > bound || q.y.abs() > bound
}

/// Run `step` from `start`, skip `warmup` iterates, then record up to
/// `iterations` iterates
///
/// Recording stops at the first divergent iterate, which is not recorded.
/// Divergence during warm-up yields nothing.
pub fn iterate(
    start: Point,
    mut step: impl FnMut(Point) -> Point,
    warmup: usize,
    iterations: usize,
    bound: f64,
) -> Vec<Point> {
    let mut current = start;
    for _ in 0..warmup {
        current = step(current);
        if diverged(current, bound) {
            return Vec::new();
        }
    }

    let mut orbit = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        current = step(current);
        if diverged(current, bound) {
            break;
        }
        orbit.push(current);
    }
    orbit
}

/// Split points into paths of at most `size` points, dropping a trailing
/// single point
pub fn chunk(points: Vec<Point>, size: usize, color: Option<u8>) -> Vec<ColoredPath> {
    points
        .chunks(size.max(2))
        .filter(|c| c.len() >= 2)
        .map(|c| ColoredPath::new(c.to_vec(), color))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divergence_stops_recording_at_diverging_iterate() {
        let mut calls = 0usize;
        let orbit = iterate(
            Point::new(0.0, 0.0),
            |q| {
                calls += 1;
                if calls > 100 + 42 {
                    Point::new(f64::NAN, 0.0)
                } else {
                    Point::new(q.x + 1.0, 0.0)
                }
            },
            100,
            5_000,
            1e6,
        );
        assert_eq!(orbit.len(), 42);
        assert_eq!(orbit[0], Point::new(101.0, 0.0));
        assert_eq!(orbit[41], Point::new(142.0, 0.0));
    }

    #[test]
    fn test_bound_counts_as_divergence() {
        // 10, 100, ..., 1e6 are inside the bound; 1e7 is not
        let orbit = iterate(Point::new(1.0, 1.0), |q| q.scale(10.0), 0, 100, 1e6);
        assert_eq!(orbit.len(), 6);
    }

    #[test]
    fn test_divergence_during_warmup_yields_nothing() {
        let orbit = iterate(Point::new(2.0, 0.0), |q| q.scale(1e4), 100, 100, 1e6);
        assert!(orbit.is_empty());
    }

    #[test]
    fn test_chunks_are_capped_and_tail_dropped() {
        let points: Vec<Point> = (0..1001).map(|i| Point::new(i as f64, 0.0)).collect();
        let paths = chunk(points, 500, Some(2));
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.len() == 500 && p.color == Some(2)));
    }

    #[test]
    fn test_clifford_is_deterministic_and_chunked() {
        let limits = EngineLimits::default();
        let params = AttractorParams {
            iterations: 5_000,
            ..AttractorParams::default()
        };
        let a = AttractorNode::generate(&params, &limits);
        let b = AttractorNode::generate(&params, &limits);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert!(a.iter().all(|p| p.len() <= 500));
    }

    #[test]
    fn test_iterations_are_clamped() {
        let limits = EngineLimits::default();
        let params = AttractorParams {
            iterations: 1,
            ..AttractorParams::default()
        };
        let total: usize = AttractorNode::generate(&params, &limits)
            .iter()
            .map(|p| p.len())
            .sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_tinkerbell_starts_off_origin() {
        assert_eq!(start_point(AttractorType::Tinkerbell), Point::new(-0.72, -0.64));
    }
}
