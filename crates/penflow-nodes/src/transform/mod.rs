//! Transformers over upstream geometry
//!
//! All of these consume the concatenated input paths and carry each path's
//! color through unchanged.

pub mod bytebeat;
pub mod iteration;
pub mod path;
pub mod rigid;

pub use bytebeat::BytebeatNode;
pub use iteration::{GridNode, RadialNode, RepeatNode};
pub use path::PathNode;
pub use rigid::{RotateNode, ScaleNode, TranslateNode};
