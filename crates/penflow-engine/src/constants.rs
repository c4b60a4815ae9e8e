//! Default values for engine limits
//!
//! These are the per-kind safety valves. Changing any of them changes the
//! output of existing documents.

/// Attractor defaults
pub mod attractor {
    /// Iterations discarded before recording starts
    pub const WARMUP_STEPS: usize = 100;
    /// Lower clamp for requested iterations
    pub const MIN_ITERATIONS: usize = 100;
    /// Upper clamp for requested iterations
    pub const MAX_ITERATIONS: usize = 100_000;
    /// Magnitude beyond which the map is considered divergent
    pub const DIVERGENCE_BOUND: f64 = 1e6;
    /// Maximum points per emitted polyline
    pub const CHUNK_SIZE: usize = 500;
}

/// L-system defaults
pub mod lsystem {
    /// Upper clamp for rewrite iterations
    pub const MAX_ITERATIONS: usize = 10;
    /// Expansion length ceiling in symbols
    pub const MAX_LENGTH: usize = 50_000;
    /// Emitted path ceiling
    pub const MAX_PATHS: usize = 5_000;
}

/// Curve layout defaults
pub mod layout {
    /// Fixed sample count for arclength integration
    pub const CURVE_SAMPLES: usize = 1_000;
}

/// Geometry cleanup defaults
pub mod geometry {
    /// Distance under which adjacent points are merged (mm)
    pub const SIMPLIFY_TOLERANCE: f64 = 0.01;
}

/// Script sandbox defaults
pub mod script {
    pub const MAX_OPERATIONS: u64 = 1_000_000;
    pub const MAX_CALL_LEVELS: usize = 64;
    pub const MAX_EXPR_DEPTH: usize = 64;
    pub const MAX_ARRAY_SIZE: usize = 100_000;
    pub const MAX_STRING_SIZE: usize = 10_000;
}

/// Image fingerprint defaults
pub mod image {
    /// Number of leading characters of an image payload folded into its fingerprint
    pub const FINGERPRINT_PREFIX: usize = 64;
}
