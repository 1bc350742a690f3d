//! Literal grammar for call arguments.
//!
//! Query arguments are untrusted text, so they are read by a closed
//! recursive-descent grammar instead of anything resembling evaluation:
//!
//! - objects: `{name: 'john', "home.city": "Oslo", $gte: 21}`
//! - arrays: `[18, 21, 25]`
//! - strings: single or double quoted, with backslash escapes
//! - numbers: `42`, `-7`, `1.5`, `2e3`
//! - `true`, `false`, `null`
//!
//! Trailing commas are allowed. Object key order is preserved. Objects and
//! arrays may nest at most [`MAX_DEPTH`] levels deep.

use crate::error::{QueryError, Result};
use chumsky::extra;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use serde_json::{Number, Value};

/// Extra type for parsers - uses Rich errors for better messages
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Deepest allowed nesting of objects and arrays.
pub const MAX_DEPTH: usize = 128;

/// Parse a complete literal, rejecting trailing input.
pub fn parse_literal(input: &str) -> Result<Value> {
    check_depth(input)?;
    literal()
        .then_ignore(end())
        .parse(input)
        .into_result()
        .map_err(|errs| QueryError::format(format_errors(&errs, input)))
}

/// Reject input whose `{`/`[` nesting exceeds [`MAX_DEPTH`].
///
/// Runs before the grammar so that nothing downstream recurses deeper
/// than the limit. Brackets inside quoted strings do not count.
fn check_depth(input: &str) -> Result<()> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
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
            '{' | '[' => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(QueryError::format(format!(
                        "literal nested deeper than {MAX_DEPTH} levels"
                    )));
                }
            }
            '}' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// Primitive parsers
// ============================================================================

/// Parser for unquoted object keys: alphanumeric, underscore and `$`
pub fn key_ident<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_' || *c == '$')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.to_string())
        .labelled("identifier")
}

fn escape<'src>() -> impl Parser<'src, &'src str, char, Extra<'src>> + Clone {
    just('\\')
        .ignore_then(choice((
            just('\\'),
            just('/'),
            just('\''),
            just('"'),
            just('n').to('\n'),
            just('r').to('\r'),
            just('t').to('\t'),
        )))
        .labelled("escape sequence")
}

fn quoted<'src>(
    quote: char,
    forbidden: &'static str,
) -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    none_of(forbidden)
        .or(escape())
        .repeated()
        .collect::<String>()
        .delimited_by(just(quote), just(quote))
}

/// Parser for string literals (single or double quoted)
pub fn string_literal<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    quoted('\'', "\\'")
        .or(quoted('"', "\\\""))
        .labelled("string literal")
}

/// Parser for numeric literals: integers, decimals and exponents
pub fn number<'src>() -> impl Parser<'src, &'src str, Number, Extra<'src>> + Clone {
    let digits = any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1);
    let fraction = just('.').then(digits.clone());
    let exponent = one_of("eE")
        .then(one_of("+-").or_not())
        .then(digits.clone());

    just('-')
        .or_not()
        .then(digits)
        .then(fraction.or_not())
        .then(exponent.or_not())
        .to_slice()
        .try_map(|s: &str, span: SimpleSpan| {
            if s.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
                let f: f64 = s
                    .parse()
                    .map_err(|_| Rich::custom(span, "invalid float literal"))?;
                Number::from_f64(f).ok_or_else(|| Rich::custom(span, "float is not finite"))
            } else {
                s.parse::<i64>()
                    .map(Number::from)
                    .or_else(|_| s.parse::<u64>().map(Number::from))
                    .map_err(|_| Rich::custom(span, "integer overflow"))
            }
        })
        .labelled("number")
}

// ============================================================================
// Composite literals
// ============================================================================

/// Parser for any literal value
pub fn literal<'src>() -> impl Parser<'src, &'src str, Value, Extra<'src>> + Clone {
    recursive(|value| {
        let array = value
            .clone()
            .separated_by(just(',').padded())
            .allow_trailing()
            .collect::<Vec<_>>()
            .padded()
            .delimited_by(just('['), just(']'))
            .map(Value::Array)
            .labelled("array like [1, 2]");

        let member = string_literal()
            .or(key_ident())
            .padded()
            .then_ignore(just(':'))
            .then(value)
            .labelled("property like name: 'value'");

        let object = member
            .separated_by(just(',').padded())
            .allow_trailing()
            .collect::<Vec<_>>()
            .padded()
            .delimited_by(just('{'), just('}'))
            .map(|members| Value::Object(members.into_iter().collect()))
            .labelled("object like {name: 'value'}");

        choice((
            object,
            array,
            string_literal().map(Value::String),
            number().map(Value::Number),
            just("true").to(Value::Bool(true)),
            just("false").to(Value::Bool(false)),
            just("null").to(Value::Null),
        ))
        .padded()
    })
}

// ============================================================================
// Error formatting
// ============================================================================

/// Format chumsky errors for human consumption
pub fn format_errors(errs: &[Rich<'_, char>], input: &str) -> String {
    errs.iter()
        .map(|e| {
            let start = e.span().start;
            let line = input[..start].lines().count().max(1);
            let col = start - input[..start].rfind('\n').map_or(0, |i| i + 1);

            let found = e
                .found()
                .map_or("end of input".to_string(), |c| format!("'{}'", c));

            format!(
                "line {}, column {}: {} (found {})",
                line,
                col + 1,
                e.reason(),
                found
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
