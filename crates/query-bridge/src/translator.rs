//! Translation pipeline: source dialect text → IR → target dialect text.

use crate::config::TranslatorConfig;
use crate::dialect::{DialectRegistry, MongoDialect, QueryDialect, SqlDialect};
use crate::error::Result;
use crate::ir::ParsedQuery;
use std::sync::Arc;
use tracing::debug;

/// Composes a source and a target dialect behind one `translate` call.
///
/// Holds nothing but the two shared adapters. Errors from either stage
/// reach the caller unchanged.
#[derive(Clone)]
pub struct QueryTranslator {
    source: Arc<dyn QueryDialect>,
    target: Arc<dyn QueryDialect>,
}

impl QueryTranslator {
    pub fn new(source: Arc<dyn QueryDialect>, target: Arc<dyn QueryDialect>) -> Self {
        Self { source, target }
    }

    /// MongoDB shell `find` calls to SQL `SELECT` statements.
    pub fn mongo_to_sql() -> Self {
        Self::new(Arc::new(MongoDialect), Arc::new(SqlDialect))
    }

    /// Resolve both dialects of `config` from `registry`.
    pub fn from_config(config: &TranslatorConfig, registry: &DialectRegistry) -> Result<Self> {
        let source = registry.get(&config.source)?;
        let target = registry.get(&config.target)?;
        Ok(Self::new(source, target))
    }

    pub fn source(&self) -> &dyn QueryDialect {
        self.source.as_ref()
    }

    pub fn target(&self) -> &dyn QueryDialect {
        self.target.as_ref()
    }

    /// Parse with the source dialect only.
    pub fn parse(&self, input: &str) -> Result<ParsedQuery> {
        self.source.parse(input)
    }

    /// Translate a query from the source dialect into the target dialect.
    pub fn translate(&self, input: &str) -> Result<String> {
        debug!(
            source = self.source.name(),
            target = self.target.name(),
            "Translating query"
        );
        let parsed = self.source.parse(input)?;
        self.target.render(&parsed)
    }
}

impl std::fmt::Debug for QueryTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryTranslator")
            .field("source", &self.source.name())
            .field("target", &self.target.name())
            .finish()
    }
}
