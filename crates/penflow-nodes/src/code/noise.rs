//! Seeded 2D Perlin noise

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Gradient noise over a shuffled permutation table
#[derive(Debug, Clone)]
pub struct Perlin {
    perm: [u8; 512],
}

impl Perlin {
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    /// Noise at `(x, y)`, roughly in `[-1, 1]` and zero on lattice points
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let (x0, y0) = (x.floor(), y.floor());
        let (xf, yf) = (x - x0, y - y0);
        let xi = (x0 as i64 & 255) as usize;
        let yi = (y0 as i64 & 255) as usize;
        let p = |i: usize| usize::from(self.perm[i]);

        let aa = p(p(xi) + yi);
        let ab = p(p(xi) + yi + 1);
        let ba = p(p(xi + 1) + yi);
        let bb = p(p(xi + 1) + yi + 1);

        let (u, v) = (fade(xf), fade(yf));
        lerp(
            v,
            lerp(u, grad(aa, xf, yf), grad(ba, xf - 1.0, yf)),
            lerp(u, grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0)),
        )
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: usize, x: f64, y: f64) -> f64 {
    match hash & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_noise_is_deterministic() {
        let a = Perlin::new(7);
        let b = Perlin::new(7);
        for i in 0..50 {
            let (x, y) = (i as f64 * 0.37, i as f64 * 0.11);
            assert_eq!(a.noise(x, y), b.noise(x, y));
        }
    }

    #[test]
    fn test_lattice_points_are_zero() {
        let n = Perlin::new(3);
        assert_eq!(n.noise(4.0, -2.0), 0.0);
    }

    #[test]
    fn test_range() {
        let n = Perlin::new(11);
        for i in 0..2_000 {
            let v = n.noise(i as f64 * 0.173, (i % 37) as f64 * 0.291);
            assert!((-1.5..=1.5).contains(&v), "{}", v);
        }
    }

    #[test]
    fn test_seeds_differ() {
        let a = Perlin::new(1);
        let b = Perlin::new(2);
        let differs = (0..20).any(|i| {
            let x = i as f64 * 0.5 + 0.25;
            a.noise(x, 0.75) != b.noise(x, 0.75)
        });
        assert!(differs);
    }
}
