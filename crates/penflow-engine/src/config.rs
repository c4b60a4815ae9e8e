//! Engine configuration
//!
//! Holds the per-kind resource caps. Every field has a default, so a
//! partial JSON document only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Safety caps for the generator kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineLimits {
    /// Attractor iterations discarded before recording
    pub attractor_warmup: usize,
    /// Lower clamp for attractor iterations
    pub attractor_min_iterations: usize,
    /// Upper clamp for attractor iterations
    pub attractor_max_iterations: usize,
    /// Coordinate magnitude treated as divergence
    pub attractor_divergence_bound: f64,
    /// Maximum points per attractor polyline
    pub attractor_chunk_size: usize,
    /// Upper clamp for L-system rewrite iterations
    pub lsystem_max_iterations: usize,
    /// L-system expansion length ceiling
    pub lsystem_max_length: usize,
    /// L-system emitted path ceiling
    pub lsystem_max_paths: usize,
    /// Samples used to integrate curve arclength
    pub curve_samples: usize,
    /// Adjacent-point merge distance for rendered text
    pub simplify_tolerance: f64,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            attractor_warmup: constants::attractor::WARMUP_STEPS,
            attractor_min_iterations: constants::attractor::MIN_ITERATIONS,
            attractor_max_iterations: constants::attractor::MAX_ITERATIONS,
            attractor_divergence_bound: constants::attractor::DIVERGENCE_BOUND,
            attractor_chunk_size: constants::attractor::CHUNK_SIZE,
            lsystem_max_iterations: constants::lsystem::MAX_ITERATIONS,
            lsystem_max_length: constants::lsystem::MAX_LENGTH,
            lsystem_max_paths: constants::lsystem::MAX_PATHS,
            curve_samples: constants::layout::CURVE_SAMPLES,
            simplify_tolerance: constants::geometry::SIMPLIFY_TOLERANCE,
        }
    }
}

/// Limits applied to the embedded script engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptLimits {
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
    pub max_array_size: usize,
    pub max_string_size: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_operations: constants::script::MAX_OPERATIONS,
            max_call_levels: constants::script::MAX_CALL_LEVELS,
            max_expr_depth: constants::script::MAX_EXPR_DEPTH,
            max_array_size: constants::script::MAX_ARRAY_SIZE,
            max_string_size: constants::script::MAX_STRING_SIZE,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub limits: EngineLimits,
    pub script: ScriptLimits,
}

impl EngineConfig {
    /// Parse a configuration document, falling back to defaults for
    /// anything it does not mention
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let limits = EngineLimits::default();
        assert_eq!(limits.attractor_warmup, 100);
        assert_eq!(limits.attractor_chunk_size, 500);
        assert_eq!(limits.lsystem_max_length, 50_000);
        assert_eq!(limits.lsystem_max_paths, 5_000);
        assert_eq!(limits.lsystem_max_iterations, 10);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config =
            EngineConfig::from_json(r#"{"limits": {"attractorChunkSize": 250}}"#).unwrap();
        assert_eq!(config.limits.attractor_chunk_size, 250);
        assert_eq!(config.limits.attractor_max_iterations, 100_000);
        assert_eq!(config.script, ScriptLimits::default());
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let json = serde_json::to_string(&EngineConfig::default()).unwrap();
        assert!(json.contains("lsystemMaxPaths"));
        assert!(json.contains("maxOperations"));
    }
}
