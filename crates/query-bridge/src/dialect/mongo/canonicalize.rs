//! Operator canonicalization.
//!
//! Rewrites a raw filter literal, still spelled with `$`-operators, into
//! the neutral [`FilterNode`] tree:
//!
//! - `$and` / `$or` keys become a combinator node over their array items
//! - `{field: {$op: value, ...}}` becomes one comparison per operator
//! - `{field: value}` becomes an implicit `EQ`
//!
//! Unknown operator tokens compare with `EQ` instead of failing. Field
//! names must be plain or dotted paths (see [`is_field_path`]).

use super::MongoDialect;
use crate::error::{QueryError, Result};
use crate::ir::{
    is_field_path, Combinator, Condition, ConditionValue, FieldFilter, FilterNode, Operator,
    Scalar,
};
use serde_json::{Map, Value};
use tracing::debug;

/// Canonicalize a top-level filter literal.
pub fn canonicalize_filter(raw: &Value) -> Result<FilterNode> {
    match raw {
        Value::Object(map) => canonicalize_object(map),
        other => Err(QueryError::format(format!(
            "filter must be an object literal, found {}",
            describe(other)
        ))),
    }
}

fn canonicalize_object(map: &Map<String, Value>) -> Result<FilterNode> {
    let mut fields = Vec::new();
    let mut and = None;
    let mut or = None;

    for (key, value) in map {
        match MongoDialect::operator_from_token(key) {
            Some(Operator::And) => and = Some(canonicalize_list(key, value)?),
            Some(Operator::Or) => or = Some(canonicalize_list(key, value)?),
            _ => fields.push(canonicalize_field(key, value)?),
        }
    }

    if and.is_none() && or.is_none() {
        return Ok(FilterNode::Fields(fields));
    }

    // Plain fields next to $and/$or join the AND group.
    if !fields.is_empty() {
        and.get_or_insert_with(Vec::new)
            .insert(0, FilterNode::Fields(fields));
    }

    Ok(FilterNode::Combinator(Combinator { and, or }))
}

fn canonicalize_list(key: &str, value: &Value) -> Result<Vec<FilterNode>> {
    let Value::Array(items) = value else {
        return Err(QueryError::format(format!(
            "{} expects an array of filter objects, found {}",
            key,
            describe(value)
        )));
    };

    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => canonicalize_object(map),
            other => Err(QueryError::format(format!(
                "{} entries must be filter objects, found {}",
                key,
                describe(other)
            ))),
        })
        .collect()
}

fn canonicalize_field(field: &str, value: &Value) -> Result<FieldFilter> {
    if !is_field_path(field) {
        return Err(QueryError::format(format!("invalid field name '{field}'")));
    }

    let condition = match value {
        Value::Object(operators) => {
            let mut condition = Condition::new();
            for (token, operand) in operators {
                let op = match MongoDialect::operator_from_token(token) {
                    Some(op) if op.is_logical() => {
                        return Err(QueryError::invalid_condition(
                            field,
                            format!("logical operator {} cannot compare a field", token),
                        ))
                    }
                    Some(op) => op,
                    None => {
                        debug!(field, token = %token, "Unknown comparison operator, using equality");
                        Operator::Eq
                    }
                };
                condition.insert(op, condition_value(field, operand)?);
            }
            condition
        }
        other => Condition::new().with(Operator::Eq, condition_value(field, other)?),
    };

    Ok(FieldFilter::new(field, condition))
}

fn condition_value(field: &str, value: &Value) -> Result<ConditionValue> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| scalar(field, item))
            .collect::<Result<Vec<_>>>()
            .map(ConditionValue::List),
        other => scalar(field, other).map(ConditionValue::Scalar),
    }
}

fn scalar(field: &str, value: &Value) -> Result<Scalar> {
    match value {
        Value::String(s) => Ok(Scalar::String(s.clone())),
        Value::Number(n) => Ok(Scalar::Number(n.clone())),
        Value::Bool(b) => Ok(Scalar::Bool(*b)),
        Value::Null => Ok(Scalar::Null),
        other => Err(QueryError::invalid_condition(
            field,
            format!("{} values are not supported", describe(other)),
        )),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
