//! Query dialects.
//!
//! This module defines the `QueryDialect` trait and `DialectRegistry`.
//! A dialect converts between its own query text and the shared IR in
//! one or both directions; the direction it does not support reports
//! [`QueryError::UnimplementedAdapter`].

pub mod literal;
mod mongo;
mod sql;

pub use mongo::MongoDialect;
pub use sql::SqlDialect;

use crate::error::{AdapterDirection, QueryError, Result};
use crate::ir::ParsedQuery;
use std::sync::Arc;

/// Capability set shared by every dialect adapter.
///
/// Adapters are stateless after construction, so one instance can be
/// shared by any number of translators and threads.
pub trait QueryDialect: Send + Sync {
    /// Unique registry name for this dialect
    fn name(&self) -> &'static str;

    /// Human-readable name used in error messages
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Parse dialect text into the IR.
    fn parse(&self, _input: &str) -> Result<ParsedQuery> {
        Err(QueryError::unimplemented(
            self.display_name(),
            AdapterDirection::Parse,
        ))
    }

    /// Render the IR as dialect text.
    fn render(&self, _query: &ParsedQuery) -> Result<String> {
        Err(QueryError::unimplemented(
            self.display_name(),
            AdapterDirection::Render,
        ))
    }
}

/// Registry of dialects addressable by name.
pub struct DialectRegistry {
    dialects: Vec<Arc<dyn QueryDialect>>,
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            dialects: Vec::new(),
        }
    }

    /// Registry holding the built-in `mongo` and `sql` dialects
    pub fn builtin() -> Self {
        DialectRegistryBuilder::new()
            .with_dialect(MongoDialect)
            .with_dialect(SqlDialect)
            .build()
    }

    /// Register a dialect, replacing any dialect with the same name
    pub fn register(&mut self, dialect: Arc<dyn QueryDialect>) {
        self.dialects.retain(|d| d.name() != dialect.name());
        self.dialects.push(dialect);
    }

    /// Look up a dialect by name (case-insensitive)
    pub fn get(&self, name: &str) -> Result<Arc<dyn QueryDialect>> {
        self.dialects
            .iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
            .cloned()
            .ok_or_else(|| QueryError::UnknownDialect {
                name: name.to_string(),
                available: self.dialect_names(),
            })
    }

    /// Get list of registered dialect names
    pub fn dialect_names(&self) -> Vec<&'static str> {
        self.dialects.iter().map(|d| d.name()).collect()
    }
}

/// Builder for ergonomic registry construction
pub struct DialectRegistryBuilder {
    dialects: Vec<Arc<dyn QueryDialect>>,
}

impl Default for DialectRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectRegistryBuilder {
    pub fn new() -> Self {
        Self {
            dialects: Vec::new(),
        }
    }

    /// Add a dialect to the registry
    pub fn with_dialect(mut self, dialect: impl QueryDialect + 'static) -> Self {
        self.dialects.push(Arc::new(dialect));
        self
    }

    /// Build the registry
    pub fn build(self) -> DialectRegistry {
        let mut registry = DialectRegistry::new();
        for dialect in self.dialects {
            registry.register(dialect);
        }
        registry
    }
}
