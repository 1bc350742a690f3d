//! Translator configuration
//!
//! Names the source and target dialects of a translator:
//!
//! ```toml
//! source = "mongo"
//! target = "sql"
//! ```

use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};

/// Dialect pair for a [`QueryTranslator`](crate::QueryTranslator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Registry name of the dialect queries are written in
    pub source: String,
    /// Registry name of the dialect queries are rendered to
    pub target: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            source: "mongo".to_string(),
            target: "sql".to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Load from TOML text; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| QueryError::Config(e.to_string()))
    }
}
