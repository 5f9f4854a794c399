#![forbid(unsafe_code)]

//! Stack configuration as data.
//!
//! A [`StackConfig`] bundles the motion knobs, the variant, and the card
//! payloads so a stack can be set up from a TOML or JSON file instead of
//! code.
//!
//! # Loading
//!
//! ```toml
//! # cardstack.toml
//! variant = "primary"
//!
//! [motion]
//! spring_duration = 0.4
//! swipe_confidence_threshold = 8000
//!
//! [[items]]
//! id = 1
//! title = "Dune"
//! image = "linear-gradient(135deg, #f6d365 0%, #fda085 100%)"
//! ```
//!
//! ```rust,ignore
//! let config = StackConfig::from_toml_file("cardstack.toml")?;
//! let session = StackSession::from_config(&config)?;
//! ```
//!
//! # Defaults
//!
//! Missing sections and fields take the stock values, so an empty file
//! yields the four-card demo stack with default motion.

use std::collections::HashSet;
use std::path::Path;

use cardstack_core::{Item, MotionParams, PoseTable, StackError};
use serde::{Deserialize, Serialize};

use crate::before_after::BeforeAfterPhoto;

/// Top-level stack configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Which pose table and interaction to use.
    pub variant: PoseTable,
    pub motion: MotionParams,
    /// Cards of the swipe stack, front first.
    pub items: Vec<Item>,
    /// Photos of the before/after stack.
    pub photos: Vec<BeforeAfterPhoto>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            variant: PoseTable::Primary,
            motion: MotionParams::default(),
            items: Item::demo_set(),
            photos: BeforeAfterPhoto::demo_set(),
        }
    }
}

impl StackConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load a file, picking the format from its extension (`.json` is JSON,
    /// anything else TOML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        tracing::debug!(path = %path.display(), variant = ?config.variant, "config loaded");
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    /// Motion knobs outside their documented ranges are reported here but
    /// still accepted when a session is built.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors: Vec<String> = self
            .motion
            .validate()
            .into_iter()
            .map(|e| format!("motion.{e}"))
            .collect();

        match self.variant {
            PoseTable::Primary => {
                if self.items.is_empty() {
                    errors.push("items must not be empty".into());
                }
                let mut seen = HashSet::new();
                for item in &self.items {
                    if !seen.insert(item.id) {
                        errors.push(format!("items: duplicate id {}", item.id));
                    }
                }
            }
            PoseTable::BeforeAfter => {
                if self.photos.is_empty() {
                    errors.push("photos must not be empty".into());
                }
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration or building a
/// session from it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("config JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Stack(#[from] StackError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardstack_core::ItemId;

    #[test]
    fn default_validates_clean() {
        let errors = StackConfig::default().validate();
        assert!(errors.is_empty(), "default should validate: {errors:?}");
    }

    #[test]
    fn empty_toml_is_default() {
        let config = StackConfig::from_toml_str("").unwrap();
        assert_eq!(config, StackConfig::default());
    }

    #[test]
    fn partial_motion_section_keeps_other_defaults() {
        let config = StackConfig::from_toml_str(
            r#"
            [motion]
            spring_duration = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(config.motion.spring_duration, 0.6);
        assert_eq!(config.motion.drag_elastic, 0.7);
        assert_eq!(config.motion.swipe_confidence_threshold, 10_000.0);
    }

    #[test]
    fn items_and_variant_from_toml() {
        let config = StackConfig::from_toml_str(
            r#"
            variant = "before_after"

            [[items]]
            id = 7
            title = "Seven"
            image = "seven.png"
            description = "lucky"
            "#,
        )
        .unwrap();
        assert_eq!(config.variant, PoseTable::BeforeAfter);
        assert_eq!(config.items.len(), 1);
        assert_eq!(config.items[0].id, ItemId(7));
        assert_eq!(config.items[0].description.as_deref(), Some("lucky"));
    }

    #[test]
    fn json_loads() {
        let config =
            StackConfig::from_json_str(r#"{"motion": {"drag_elastic": 1.2}, "items": []}"#)
                .unwrap();
        assert_eq!(config.motion.drag_elastic, 1.2);
        assert!(
            config
                .validate()
                .iter()
                .any(|e| e.contains("items must not be empty"))
        );
    }

    #[test]
    fn validate_flags_out_of_range_knobs_and_duplicates() {
        let mut config = StackConfig::default();
        config.motion.z_index_delay = 0.5;
        config.items.push(config.items[0].clone());
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.starts_with("motion.z_index_delay")));
        assert!(errors.iter().any(|e| e.contains("duplicate id")));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = StackConfig::from_toml_str("[motion\nspring_duration = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn toml_round_trip_preserves_motion() {
        let mut config = StackConfig::default();
        config.motion.swipe_confidence_threshold = 4_500.0;
        let text = config.to_toml_string().unwrap();
        let back = StackConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.motion, config.motion);
        assert_eq!(back.items, config.items);
    }
}
