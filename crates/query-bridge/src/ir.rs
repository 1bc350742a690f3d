//! Dialect-neutral intermediate representation.
//!
//! Every adapter builds or consumes these shapes; none of them carry a
//! dialect's own tokens. A translation constructs a fresh [`ParsedQuery`],
//! hands it to a renderer, and drops it.

use serde::Serialize;
use serde_json::Number;
use std::fmt;

/// Operation kind requested by a query.
///
/// Only [`Method::Find`] is handled by the built-in dialects; the rest are
/// part of the vocabulary so adapters can name what they reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Find,
    Update,
    Insert,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Find => "FIND",
            Method::Update => "UPDATE",
            Method::Insert => "INSERT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Comparison and logical operators.
///
/// `Eq` is implied whenever a field is compared without an explicit operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    And,
    Or,
}

impl Operator {
    /// All operators, in table order.
    pub const ALL: [Operator; 9] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::And,
        Operator::Or,
    ];

    /// True for `AND` / `OR`.
    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::In => "IN",
            Operator::And => "AND",
            Operator::Or => "OR",
        };
        f.write_str(name)
    }
}

/// A single literal compared against a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Right-hand side of a comparison. Lists are only meaningful under `IN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl From<Scalar> for ConditionValue {
    fn from(value: Scalar) -> Self {
        ConditionValue::Scalar(value)
    }
}

macro_rules! scalar_condition_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ConditionValue {
                fn from(value: $ty) -> Self {
                    ConditionValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_condition_value!(&str, String, i64, i32, bool);

/// One operator applied to one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub op: Operator,
    pub value: ConditionValue,
}

/// Comparisons applied to a single field, in declaration order.
///
/// Each operator appears at most once; inserting an operator that is
/// already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Condition {
    comparisons: Vec<Comparison>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Condition holding a single `EQ` comparison.
    pub fn equals(value: impl Into<ConditionValue>) -> Self {
        Self::new().with(Operator::Eq, value)
    }

    /// Builder form of [`Condition::insert`].
    pub fn with(mut self, op: Operator, value: impl Into<ConditionValue>) -> Self {
        self.insert(op, value.into());
        self
    }

    pub fn insert(&mut self, op: Operator, value: ConditionValue) {
        match self.comparisons.iter_mut().find(|c| c.op == op) {
            Some(existing) => existing.value = value,
            None => self.comparisons.push(Comparison { op, value }),
        }
    }

    pub fn get(&self, op: Operator) -> Option<&ConditionValue> {
        self.comparisons
            .iter()
            .find(|c| c.op == op)
            .map(|c| &c.value)
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }
}

/// Whether `name` is a plain or dotted field path such as `age` or
/// `home.city`: word characters separated by single dots.
pub fn is_field_path(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty() && segment.chars().all(|c| c.is_alphanumeric() || c == '_')
        })
}

/// A field name paired with its condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFilter {
    pub field: String,
    pub condition: Condition,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, condition: Condition) -> Self {
        Self {
            field: field.into(),
            condition,
        }
    }
}

/// Boolean combination of child filters.
///
/// Both lists may be present on one node; renderers emit the AND group
/// before the OR group and join the two with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Combinator {
    #[serde(rename = "AND", skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<FilterNode>>,
    #[serde(rename = "OR", skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<FilterNode>>,
}

/// Recursive filter tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterNode {
    /// Field comparisons, implicitly AND-ed in declaration order.
    Fields(Vec<FieldFilter>),
    /// AND / OR over child nodes.
    Combinator(Combinator),
}

impl Default for FilterNode {
    fn default() -> Self {
        FilterNode::Fields(Vec::new())
    }
}

impl FilterNode {
    /// Node matching everything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::Combinator(Combinator {
            and: Some(children),
            or: None,
        })
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Combinator(Combinator {
            and: None,
            or: Some(children),
        })
    }

    /// Single-field node.
    pub fn field(field: impl Into<String>, condition: Condition) -> Self {
        FilterNode::Fields(vec![FieldFilter::new(field, condition)])
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FilterNode::Fields(fields) => fields.is_empty(),
            FilterNode::Combinator(c) => c.and.is_none() && c.or.is_none(),
        }
    }
}

/// Ordered field names to return. Absent projection means all fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Projection {
    pub fields: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A fully parsed and canonicalized read request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub collection: String,
    pub method: Method,
    pub filter: FilterNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,
}

impl ParsedQuery {
    /// `find` over every document of `collection`.
    pub fn find(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            method: Method::Find,
            filter: FilterNode::empty(),
            projection: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_insert_replaces_in_place() {
        let mut condition = Condition::new()
            .with(Operator::Gt, 1)
            .with(Operator::Lt, 10);
        condition.insert(Operator::Gt, 5.into());

        let ops: Vec<_> = condition.comparisons().iter().map(|c| c.op).collect();
        assert_eq!(ops, vec![Operator::Gt, Operator::Lt]);
        assert_eq!(condition.get(Operator::Gt), Some(&ConditionValue::from(5)));
    }

    #[test]
    fn test_empty_nodes() {
        assert!(FilterNode::empty().is_empty());
        assert!(FilterNode::Combinator(Combinator::default()).is_empty());
        assert!(!FilterNode::and(vec![]).is_empty());
    }

    #[test]
    fn test_logical_operators() {
        let logical: Vec<_> = Operator::ALL
            .iter()
            .copied()
            .filter(|op| op.is_logical())
            .collect();
        assert_eq!(logical, vec![Operator::And, Operator::Or]);
    }

    #[test]
    fn test_ir_serializes_with_neutral_keys() {
        let query = ParsedQuery::find("user").with_filter(FilterNode::or(vec![
            FilterNode::field("age", Condition::new().with(Operator::Gte, 21)),
            FilterNode::field("name", Condition::equals("john")),
        ]));

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "collection": "user",
                "method": "FIND",
                "filter": {"OR": [
                    [{"field": "age", "condition": [{"op": "GTE", "value": 21}]}],
                    [{"field": "name", "condition": [{"op": "EQ", "value": "john"}]}]
                ]}
            })
        );
    }

    #[test]
    fn test_field_paths() {
        assert!(is_field_path("age"));
        assert!(is_field_path("_id"));
        assert!(is_field_path("home.city"));
        assert!(!is_field_path(""));
        assert!(!is_field_path("home..city"));
        assert!(!is_field_path(".age"));
        assert!(!is_field_path("$ne"));
        assert!(!is_field_path("name = 'x' OR 1"));
        assert!(!is_field_path("a; DROP TABLE user"));
    }
}
