//! Engine configuration.
//!
//! ```json
//! {
//!   "default_tree_depth": 3,
//!   "max_tree_depth": 8,
//!   "gender_policy": "legacy",
//!   "parent_combination": "exactly_two"
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregate::{AtLeastOneParent, ExactlyTwoParents, ParentCombination};
use crate::reciprocal::GenderPolicy;
use crate::{Error, Result};

pub const DEFAULT_TREE_DEPTH: usize = 3;
pub const DEFAULT_MAX_TREE_DEPTH: usize = 8;

/// Which parent edges collapse into a single "parents" entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentCombinationPolicy {
    #[default]
    ExactlyTwo,
    AtLeastOne,
}

impl ParentCombinationPolicy {
    pub fn combiner(self) -> Arc<dyn ParentCombination> {
        match self {
            ParentCombinationPolicy::ExactlyTwo => Arc::new(ExactlyTwoParents),
            ParentCombinationPolicy::AtLeastOne => Arc::new(AtLeastOneParent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Hops used when a tree request does not name a depth.
    pub default_tree_depth: usize,
    /// Requested depths above this are clamped.
    pub max_tree_depth: usize,
    pub gender_policy: GenderPolicy,
    pub parent_combination: ParentCombinationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_tree_depth: DEFAULT_TREE_DEPTH,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            gender_policy: GenderPolicy::default(),
            parent_combination: ParentCombinationPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_tree_depth > self.max_tree_depth {
            return Err(Error::Config(format!(
                "default_tree_depth ({}) exceeds max_tree_depth ({})",
                self.default_tree_depth, self.max_tree_depth
            )));
        }
        Ok(())
    }

    /// Resolve a requested depth: default when absent, clamped to the max.
    pub fn tree_depth(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_tree_depth).min(self.max_tree_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.tree_depth(None), 3);
    }

    #[test]
    fn parses_policies() {
        let config = EngineConfig::from_json_str(
            r#"{"gender_policy": "neutral", "parent_combination": "at_least_one"}"#,
        )
        .unwrap();
        assert_eq!(config.gender_policy, GenderPolicy::Neutral);
        assert_eq!(config.parent_combination, ParentCombinationPolicy::AtLeastOne);
    }

    #[test]
    fn rejects_default_above_max() {
        let err = EngineConfig::from_json_str(r#"{"default_tree_depth": 9, "max_tree_depth": 4}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = EngineConfig::from_json_str(r#"{"depth": 2}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn clamps_requested_depth() {
        let config = EngineConfig::default();
        assert_eq!(config.tree_depth(Some(50)), DEFAULT_MAX_TREE_DEPTH);
        assert_eq!(config.tree_depth(Some(1)), 1);
    }
}
