//! # Engine Configuration
//!
//! Knobs that change how a document is laid out and handed to a renderer,
//! without touching the document itself. Loaded from JSON (camelCase, every
//! field optional) or built in code from `EngineConfig::default()`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LayoutError, Result};

/// What to do when a renderer fails on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Abort the document build with the renderer's error.
    #[default]
    FailFast,
    /// Log the failure, remember the page and keep going.
    SkipPage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Save prepared-but-unrendered pages to disk instead of keeping them in memory.
    pub cache_pages: bool,
    /// Parent directory for the page cache. The system temp dir when unset.
    pub cache_dir: Option<PathBuf>,
    /// Whether the output renderer may receive pages out of document order.
    pub out_of_order: bool,
    pub error_policy: ErrorPolicy,
    /// Family used when a node names none.
    pub default_font_family: String,
    /// Hyphenation language used when a node enables hyphenation without one.
    pub default_language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_pages: false,
            cache_dir: None,
            out_of_order: false,
            error_policy: ErrorPolicy::FailFast,
            default_font_family: "Helvetica".to_string(),
            default_language: "en".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LayoutError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_font_family.trim().is_empty() {
            return Err(LayoutError::Config("defaultFontFamily must not be empty".to_string()));
        }
        if let Some(dir) = &self.cache_dir {
            if !self.cache_pages {
                log::warn!("cacheDir {} is ignored while cachePages is off", dir.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            EngineConfig::from_json(r#"{"cachePages": true, "errorPolicy": "SkipPage"}"#).unwrap();
        assert!(config.cache_pages);
        assert_eq!(config.error_policy, ErrorPolicy::SkipPage);
        assert_eq!(config.default_font_family, "Helvetica");
    }

    #[test]
    fn blank_font_family_is_rejected() {
        let result = EngineConfig::from_json(r#"{"defaultFontFamily": "  "}"#);
        assert!(matches!(result, Err(LayoutError::Config(_))));
    }
}
