//! SQL dialect (target side).
//!
//! Renders a `FIND` query as a single `SELECT` statement:
//!
//! ```sql
//! SELECT <fields> FROM <collection>[ WHERE <predicate>];
//! ```
//!
//! Values are inlined as literals: numbers bare, strings single-quoted.
//! Grouping follows the filter tree: a combinator group with two or
//! more members is parenthesized, a single member is emitted as-is.
//! Field and collection names are written bare, so anything that is not a
//! plain or dotted path is refused with `InvalidCondition`.
//! Parsing SQL into the IR is not implemented.

use crate::dialect::QueryDialect;
use crate::error::{QueryError, Result};
use crate::ir::{
    is_field_path, Combinator, Condition, ConditionValue, FieldFilter, FilterNode, Method, Operator,
    ParsedQuery, Projection, Scalar,
};
use tracing::trace;

/// SQL `SELECT` renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlDialect;

impl SqlDialect {
    /// SQL token for an IR operator.
    pub fn operator_token(op: Operator) -> &'static str {
        match op {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In => "IN",
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }

    /// IR operator for a SQL token, the inverse of [`Self::operator_token`].
    pub fn operator_from_token(token: &str) -> Option<Operator> {
        Operator::ALL
            .into_iter()
            .find(|op| Self::operator_token(*op).eq_ignore_ascii_case(token))
    }

    fn build_select_clause(&self, projection: Option<&Projection>) -> Result<String> {
        match projection {
            Some(p) if !p.is_empty() => {
                for field in &p.fields {
                    check_name(field)?;
                }
                Ok(p.fields.join(", "))
            }
            _ => Ok("*".to_string()),
        }
    }

    /// Render the predicate for a filter node. Empty when nothing filters.
    pub fn build_where(&self, node: &FilterNode) -> Result<String> {
        match node {
            FilterNode::Combinator(combinator) => self.render_combinator(combinator),
            FilterNode::Fields(fields) => self.render_fields(fields),
        }
    }

    fn render_combinator(&self, combinator: &Combinator) -> Result<String> {
        let mut groups = Vec::new();

        // AND group first, then OR, joined with AND.
        if let Some(children) = &combinator.and {
            groups.extend(self.render_group(children, Operator::And)?);
        }
        if let Some(children) = &combinator.or {
            groups.extend(self.render_group(children, Operator::Or)?);
        }

        Ok(groups.join(" AND "))
    }

    fn render_group(&self, children: &[FilterNode], op: Operator) -> Result<Option<String>> {
        let mut expressions = Vec::with_capacity(children.len());
        for child in children {
            let expr = self.build_where(child)?;
            if !expr.is_empty() {
                expressions.push(expr);
            }
        }

        let separator = format!(" {} ", Self::operator_token(op));
        Ok(match expressions.len() {
            0 => None,
            1 => expressions.pop(),
            _ => Some(format!("({})", expressions.join(&separator))),
        })
    }

    fn render_fields(&self, fields: &[FieldFilter]) -> Result<String> {
        let mut clauses = Vec::with_capacity(fields.len());
        for filter in fields {
            if let Some(clause) = self.render_condition(&filter.field, &filter.condition)? {
                clauses.push(clause);
            }
        }
        Ok(clauses.join(" AND "))
    }

    fn render_condition(&self, field: &str, condition: &Condition) -> Result<Option<String>> {
        let mut parts = condition
            .comparisons()
            .iter()
            .map(|c| self.render_comparison(field, c.op, &c.value))
            .collect::<Result<Vec<_>>>()?;

        Ok(match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(format!("({})", parts.join(" AND "))),
        })
    }

    fn render_comparison(&self, field: &str, op: Operator, value: &ConditionValue) -> Result<String> {
        check_name(field)?;
        if op.is_logical() {
            return Err(QueryError::invalid_condition(
                field,
                format!("{} is not a comparison operator", op),
            ));
        }

        let token = Self::operator_token(op);
        match (op, value) {
            (Operator::In, ConditionValue::List(items)) => {
                Ok(format!("{} {} {}", field, token, format_list(items)))
            }
            (Operator::In, ConditionValue::Scalar(item)) => Ok(format!(
                "{} {} {}",
                field,
                token,
                format_list(std::slice::from_ref(item))
            )),
            (_, ConditionValue::List(_)) => Err(QueryError::invalid_condition(
                field,
                format!("{} does not accept a list of values", op),
            )),
            (Operator::Eq, ConditionValue::Scalar(Scalar::Null)) => {
                Ok(format!("{} IS NULL", field))
            }
            (Operator::Ne, ConditionValue::Scalar(Scalar::Null)) => {
                Ok(format!("{} IS NOT NULL", field))
            }
            (_, ConditionValue::Scalar(item)) => {
                Ok(format!("{} {} {}", field, token, format_scalar(item)))
            }
        }
    }
}

fn check_name(name: &str) -> Result<()> {
    if is_field_path(name) {
        Ok(())
    } else {
        Err(QueryError::invalid_condition(name, "not a valid field name"))
    }
}

/// Format a scalar as a SQL literal
fn format_scalar(value: &Scalar) -> String {
    match value {
        Scalar::String(s) => format!("'{}'", s.replace('\'', "''")),
        Scalar::Number(n) => n.to_string(),
        Scalar::Bool(true) => "TRUE".to_string(),
        Scalar::Bool(false) => "FALSE".to_string(),
        Scalar::Null => "NULL".to_string(),
    }
}

/// Format values as a parenthesized list: `(18, 'a')`
fn format_list(items: &[Scalar]) -> String {
    let items: Vec<_> = items.iter().map(format_scalar).collect();
    format!("({})", items.join(", "))
}

impl QueryDialect for SqlDialect {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn display_name(&self) -> &'static str {
        "SQL"
    }

    fn render(&self, query: &ParsedQuery) -> Result<String> {
        if query.method != Method::Find {
            return Err(QueryError::UnsupportedMethod {
                dialect: self.display_name(),
                method: query.method.to_string(),
            });
        }

        check_name(&query.collection)?;
        let fields = self.build_select_clause(query.projection.as_ref())?;
        let predicate = self.build_where(&query.filter)?;

        let sql = if predicate.is_empty() {
            format!("SELECT {} FROM {};", fields, query.collection)
        } else {
            format!(
                "SELECT {} FROM {} WHERE {};",
                fields, query.collection, predicate
            )
        };
        trace!(sql = %sql, "Rendered statement");

        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterDirection;
    use serde_json::Number;

    fn render(query: &ParsedQuery) -> String {
        SqlDialect.render(query).unwrap()
    }

    fn field(name: &str, condition: Condition) -> FilterNode {
        FilterNode::field(name, condition)
    }

    // =========================================================================
    // Operator table
    // =========================================================================

    #[test]
    fn test_operator_table_is_bidirectional() {
        for op in Operator::ALL {
            let token = SqlDialect::operator_token(op);
            assert_eq!(SqlDialect::operator_from_token(token), Some(op));
        }
    }

    // =========================================================================
    // Statement shape
    // =========================================================================

    #[test]
    fn test_render_select_all() {
        assert_eq!(render(&ParsedQuery::find("user")), "SELECT * FROM user;");
    }

    #[test]
    fn test_render_projection() {
        let query = ParsedQuery::find("user")
            .with_filter(field("_id", Condition::equals(23113)))
            .with_projection(Projection::new(["name", "age"]));

        assert_eq!(
            render(&query),
            "SELECT name, age FROM user WHERE _id = 23113;"
        );
    }

    #[test]
    fn test_empty_projection_selects_all() {
        let query = ParsedQuery::find("user").with_projection(Projection::default());
        assert_eq!(render(&query), "SELECT * FROM user;");
    }

    #[test]
    fn test_non_find_method_rejected() {
        let mut query = ParsedQuery::find("user");
        query.method = Method::Update;

        assert_eq!(
            SqlDialect.render(&query),
            Err(QueryError::UnsupportedMethod {
                dialect: "SQL",
                method: "UPDATE".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_is_unimplemented() {
        assert_eq!(
            SqlDialect.parse("SELECT * FROM user;"),
            Err(QueryError::UnimplementedAdapter {
                dialect: "SQL",
                direction: AdapterDirection::Parse,
            })
        );
    }

    // =========================================================================
    // Field conditions
    // =========================================================================

    #[test]
    fn test_fields_are_conjoined_in_order() {
        let node = FilterNode::Fields(vec![
            FieldFilter::new("name", Condition::equals("john")),
            FieldFilter::new("age", Condition::new().with(Operator::Gte, 21)),
        ]);
        assert_eq!(
            SqlDialect.build_where(&node).unwrap(),
            "name = 'john' AND age >= 21"
        );
    }

    #[test]
    fn test_range_is_parenthesized() {
        let node = field(
            "age",
            Condition::new()
                .with(Operator::Gt, 18)
                .with(Operator::Lte, 30),
        );
        assert_eq!(
            SqlDialect.build_where(&node).unwrap(),
            "(age > 18 AND age <= 30)"
        );
    }

    #[test]
    fn test_in_list_formatting() {
        let node = field(
            "tag",
            Condition::new().with(
                Operator::In,
                ConditionValue::List(vec![1.into(), "b".into(), 3.into()]),
            ),
        );
        assert_eq!(
            SqlDialect.build_where(&node).unwrap(),
            "tag IN (1, 'b', 3)"
        );
    }

    #[test]
    fn test_in_with_scalar() {
        let node = field("age", Condition::new().with(Operator::In, 18));
        assert_eq!(SqlDialect.build_where(&node).unwrap(), "age IN (18)");
    }

    #[test]
    fn test_list_under_other_operator_rejected() {
        let node = field(
            "age",
            Condition::new().with(Operator::Gt, ConditionValue::List(vec![1.into()])),
        );
        assert!(matches!(
            SqlDialect.build_where(&node),
            Err(QueryError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_logical_operator_in_condition_rejected() {
        let node = field("age", Condition::new().with(Operator::Or, 1));
        assert!(matches!(
            SqlDialect.build_where(&node),
            Err(QueryError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_null_comparisons() {
        let node = FilterNode::Fields(vec![
            FieldFilter::new("deleted_at", Condition::equals(Scalar::Null)),
            FieldFilter::new(
                "email",
                Condition::new().with(Operator::Ne, Scalar::Null),
            ),
        ]);
        assert_eq!(
            SqlDialect.build_where(&node).unwrap(),
            "deleted_at IS NULL AND email IS NOT NULL"
        );
    }

    #[test]
    fn test_scalar_formatting() {
        assert_eq!(format_scalar(&Scalar::from("O'Brien")), "'O''Brien'");
        assert_eq!(format_scalar(&Scalar::from(-4)), "-4");
        assert_eq!(
            format_scalar(&Scalar::Number(Number::from_f64(2.5).unwrap())),
            "2.5"
        );
        assert_eq!(format_scalar(&Scalar::Bool(true)), "TRUE");
    }

    #[test]
    fn test_empty_condition_renders_nothing() {
        let node = FilterNode::Fields(vec![
            FieldFilter::new("age", Condition::new()),
            FieldFilter::new("name", Condition::equals("x")),
        ]);
        assert_eq!(SqlDialect.build_where(&node).unwrap(), "name = 'x'");
    }

    // =========================================================================
    // Combinators
    // =========================================================================

    #[test]
    fn test_single_member_group_not_parenthesized() {
        let node = FilterNode::or(vec![field("name", Condition::equals("john"))]);
        assert_eq!(SqlDialect.build_where(&node).unwrap(), "name = 'john'");
    }

    #[test]
    fn test_multi_member_group_parenthesized() {
        let node = FilterNode::and(vec![
            field("name", Condition::equals("john")),
            field("age", Condition::new().with(Operator::Gte, 21)),
        ]);
        assert_eq!(
            SqlDialect.build_where(&node).unwrap(),
            "(name = 'john' AND age >= 21)"
        );
    }

    #[test]
    fn test_and_group_before_or_group() {
        let node = FilterNode::Combinator(Combinator {
            and: Some(vec![
                field("age", Condition::new().with(Operator::Lt, 30)),
                field("city", Condition::equals("New York")),
            ]),
            or: Some(vec![
                field("age", Condition::new().with(Operator::Gte, 21)),
                field("name", Condition::equals("john")),
            ]),
        });
        assert_eq!(
            SqlDialect.build_where(&node).unwrap(),
            "(age < 30 AND city = 'New York') AND (age >= 21 OR name = 'john')"
        );
    }

    #[test]
    fn test_nested_groups() {
        let node = FilterNode::or(vec![
            FilterNode::and(vec![
                field("a", Condition::equals(1)),
                field("b", Condition::equals(2)),
            ]),
            field("c", Condition::equals(3)),
        ]);
        assert_eq!(
            SqlDialect.build_where(&node).unwrap(),
            "((a = 1 AND b = 2) OR c = 3)"
        );
    }

    #[test]
    fn test_empty_children_are_dropped() {
        let node = FilterNode::or(vec![FilterNode::empty(), field("a", Condition::equals(1))]);
        assert_eq!(SqlDialect.build_where(&node).unwrap(), "a = 1");
    }

    #[test]
    fn test_empty_combinator_has_no_where() {
        let query = ParsedQuery::find("user").with_filter(FilterNode::and(vec![]));
        assert_eq!(render(&query), "SELECT * FROM user;");
    }

    #[test]
    fn test_rejects_unsafe_names_in_hand_built_ir() {
        let query = ParsedQuery::find("user")
            .with_filter(field("name = 'x' OR 1", Condition::equals(1)));
        assert!(matches!(
            SqlDialect.render(&query),
            Err(QueryError::InvalidCondition { ref field, .. }) if field == "name = 'x' OR 1"
        ));

        let query = ParsedQuery::find("user")
            .with_projection(Projection::new(["name", "* FROM secrets --"]));
        assert!(matches!(
            SqlDialect.render(&query),
            Err(QueryError::InvalidCondition { .. })
        ));

        let query = ParsedQuery::find("user; DROP TABLE user");
        assert!(matches!(
            SqlDialect.render(&query),
            Err(QueryError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_dotted_paths_render_bare() {
        let query = ParsedQuery::find("user")
            .with_filter(field("home.city", Condition::equals("Oslo")))
            .with_projection(Projection::new(["home.city"]));
        assert_eq!(
            render(&query),
            "SELECT home.city FROM user WHERE home.city = 'Oslo';"
        );
    }
}
