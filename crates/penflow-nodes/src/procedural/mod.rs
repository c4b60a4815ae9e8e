//! Procedural generators
//!
//! - **attractor**: orbits of iterated 2D maps
//! - **lsystem**: rewriting systems interpreted by a stamping turtle

pub mod attractor;
pub mod lsystem;

pub use attractor::AttractorNode;
pub use lsystem::LSystemNode;
