//! Extraction limits
//!
//! Every recursive walker and the binary form parser read their caps from an
//! `ExtractorConfig`. The registry hands one config to each extractor it builds.

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Tunable limits for extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Depth cap for structural tree walkers
    pub max_walk_depth: usize,
    /// Depth cap for the generic config-driven engine
    pub generic_max_depth: usize,
    /// Depth cap for markup element walks (Aura, Visualforce, SFXML)
    pub markup_max_depth: usize,
    /// SCX record count above which the table is clamped
    pub max_scx_records: usize,
    /// Largest memo payload accepted from an FPT heap
    pub max_memo_bytes: usize,
    /// Longest literal kept as a `default_value`
    pub literal_max_len: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_walk_depth: 256,
            generic_max_depth: 50,
            markup_max_depth: 10,
            max_scx_records: 50_000,
            max_memo_bytes: 10_000_000,
            literal_max_len: 200,
        }
    }
}

impl ExtractorConfig {
    /// Load a (possibly partial) JSON config; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ExtractorConfig::from_json(r#"{"max_scx_records": 10}"#).unwrap();
        assert_eq!(config.max_scx_records, 10);
        assert_eq!(config.generic_max_depth, 50);
        assert_eq!(config.markup_max_depth, 10);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = ExtractorConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }
}
