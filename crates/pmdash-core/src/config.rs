//! Dashboard configuration
//!
//! Everything has a default, so an empty file (or no file) is a valid
//! configuration.
//!
//! ```toml
//! currency = "₹"
//!
//! [filters]
//! dimensions = ["Region", "Project", "Type"]
//! project_keyword = "project"
//!
//! [text]
//! line_break_delimiters = "|"
//! line_break_token = "<br>"
//!
//! [aliases]
//! total_po = ["Total PO Amt", "PO Amount"]
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::filter::{FilterState, DEFAULT_DIMENSIONS};
use crate::format::{LineBreaker, DEFAULT_BREAK_TOKEN, SENTENCE_DELIMITERS};
use crate::resolve::AliasCatalog;
use crate::ConfigError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Symbol prefixed to money amounts
    pub currency: String,
    pub filters: FilterConfig,
    pub text: TextConfig,
    /// Per-field alias overrides
    pub aliases: AliasCatalog,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Filter columns in precedence order
    pub dimensions: Vec<String>,
    /// Keyword used to detect the project-name column
    pub project_keyword: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub line_break_delimiters: String,
    pub line_break_token: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            currency: "₹".into(),
            filters: FilterConfig::default(),
            text: TextConfig::default(),
            aliases: AliasCatalog::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS.iter().map(|d| d.to_string()).collect(),
            project_keyword: "project".into(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            line_break_delimiters: SENTENCE_DELIMITERS.into(),
            line_break_token: DEFAULT_BREAK_TOKEN.into(),
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.line_breaker()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn line_breaker(&self) -> Result<LineBreaker, ConfigError> {
        LineBreaker::new(&self.text.line_break_delimiters, self.text.line_break_token.clone())
    }

    /// A fresh, unconstrained filter state over the configured dimensions.
    pub fn filter_state(&self) -> FilterState {
        FilterState::new(self.filters.dimensions.iter().cloned())
    }
}
