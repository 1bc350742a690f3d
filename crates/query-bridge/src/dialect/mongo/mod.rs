//! MongoDB shell dialect (source side).
//!
//! Parses calls like:
//! - `db.user.find({name: 'john'});`
//! - `db.user.find({_id: 23113}, {name: 1, age: 1})`
//! - `db.user.find({$or: [{age: {$gte: 21}}, {name: 'john'}]})`
//!
//! Only `find` is supported. Rendering back to shell syntax is not
//! implemented.

mod canonicalize;

pub use canonicalize::canonicalize_filter;

use crate::dialect::literal::parse_literal;
use crate::dialect::QueryDialect;
use crate::error::{QueryError, Result};
use crate::ir::{is_field_path, Method, Operator, ParsedQuery, Projection};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// `<namespace>.<collection>.<method>(<args>)` with an optional trailing `;`
static CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*(\w+)\.(\w+)\.(\w+)\s*\((.*)\)\s*;?\s*$").unwrap()
});

/// MongoDB shell dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDialect;

impl MongoDialect {
    /// Shell token for an IR operator. Equality has no token.
    pub fn operator_token(op: Operator) -> &'static str {
        match op {
            Operator::Eq => "",
            Operator::Ne => "$ne",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::In => "$in",
            Operator::And => "$and",
            Operator::Or => "$or",
        }
    }

    /// IR operator for a shell token, the inverse of [`Self::operator_token`].
    pub fn operator_from_token(token: &str) -> Option<Operator> {
        Operator::ALL
            .into_iter()
            .find(|op| Self::operator_token(*op) == token)
    }

    /// Map a shell method name onto the IR method kind.
    pub fn map_method(&self, method: &str) -> Result<Method> {
        if method.eq_ignore_ascii_case("find") {
            Ok(Method::Find)
        } else {
            Err(QueryError::UnsupportedMethod {
                dialect: self.display_name(),
                method: method.to_string(),
            })
        }
    }
}

impl QueryDialect for MongoDialect {
    fn name(&self) -> &'static str {
        "mongo"
    }

    fn display_name(&self) -> &'static str {
        "MongoDB"
    }

    fn parse(&self, input: &str) -> Result<ParsedQuery> {
        let caps = CALL_RE.captures(input).ok_or_else(|| {
            QueryError::format("expected <namespace>.<collection>.<method>(<filter>[, <projection>])")
        })?;
        let namespace = &caps[1];
        let collection = &caps[2];
        let method_token = &caps[3];

        let args = split_arguments(&caps[4]);
        if args.len() > 2 {
            return Err(QueryError::format(format!(
                "expected at most 2 arguments, found {}",
                args.len()
            )));
        }
        debug!(namespace, collection, method = method_token, args = args.len(), "Parsed call");

        if let Some(position) = args.iter().position(|arg| arg.is_empty()) {
            return Err(QueryError::format(format!(
                "argument {} is empty",
                position + 1
            )));
        }

        let raw_filter = match args.first() {
            Some(text) => parse_literal(text)?,
            None => Value::Object(Default::default()),
        };
        let projection = match args.get(1) {
            Some(text) => projection_from(&parse_literal(text)?)?,
            None => None,
        };

        let method = self.map_method(method_token)?;
        let filter = canonicalize_filter(&raw_filter)?;

        Ok(ParsedQuery {
            collection: collection.to_string(),
            method,
            filter,
            projection,
        })
    }
}

/// Split the argument list on top-level commas.
///
/// Commas nested in `{}`/`[]` or inside quoted strings do not split.
fn split_arguments(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in args.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => quote = Some(c),
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = args[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// Field names selected by a projection document.
///
/// Keys set to `0`, `false`, `null` or `''` are excluded; an empty
/// selection means all fields.
fn projection_from(value: &Value) -> Result<Option<Projection>> {
    let Value::Object(map) = value else {
        return Err(QueryError::format("projection must be an object literal"));
    };

    let mut fields = Vec::new();
    for (field, flag) in map {
        if !is_field_path(field) {
            return Err(QueryError::format(format!(
                "invalid projection field '{field}'"
            )));
        }
        if is_included(flag) {
            fields.push(field.clone());
        }
    }

    Ok((!fields.is_empty()).then_some(Projection { fields }))
}

fn is_included(flag: &Value) -> bool {
    match flag {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
