//! Query translation between declarative query dialects.
//!
//! A query travels through three stages:
//!
//! 1. a source [`QueryDialect`](dialect::QueryDialect) parses its own text
//!    (e.g. `db.user.find({age: {$gte: 21}})`) into a [`ParsedQuery`],
//!    rewriting dialect operators into neutral [`Operator`](ir::Operator)s
//! 2. the [`ParsedQuery`] carries the dialect-neutral filter tree
//! 3. a target dialect renders it (e.g. `SELECT * FROM user WHERE age >= 21;`)
//!
//! ```
//! use query_bridge::QueryTranslator;
//!
//! let translator = QueryTranslator::mongo_to_sql();
//! let sql = translator
//!     .translate("db.user.find({age: {$in: [18, 21, 25]}});")
//!     .unwrap();
//! assert_eq!(sql, "SELECT * FROM user WHERE age IN (18, 21, 25);");
//! ```
//!
//! Every stage is a pure function of its input; adapters keep no state and
//! may be shared freely across threads.

pub mod config;
pub mod dialect;
pub mod error;
pub mod ir;
mod translator;

pub use config::TranslatorConfig;
pub use dialect::{DialectRegistry, DialectRegistryBuilder, MongoDialect, QueryDialect, SqlDialect};
pub use error::{AdapterDirection, QueryError, Result};
pub use ir::ParsedQuery;
pub use translator::QueryTranslator;
