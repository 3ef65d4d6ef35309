//! Render an expression tree back to expression text.
//!
//! The output is canonical expression text: binary operators are fully
//! parenthesized, strings are double-quoted and identifiers are backquoted
//! only when needed. Reparsing it yields the same text again, though
//! operators written in call form (`is_not(a, b)`, `date_add(..)`,
//! `cont_in(..)`) come back as function calls.

use std::fmt;
use std::sync::OnceLock;

use mysqlkit_core::{Value, quote_identifier};
use regex::Regex;

use crate::ast::{ColumnIdentifier, DocumentPathItem, Expr, Identifier};

/// Operators always rendered infix regardless of name length.
const INFIX_OPERATORS: [&str; 2] = ["and", "or"];

fn plain_member_regex() -> Option<&'static Regex> {
    static PLAIN_MEMBER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    match PLAIN_MEMBER.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$")) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid document member pattern, quoting every member");
            None
        }
    }
}

/// Double quoted string literal with embedded quotes doubled.
fn quote_string(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quote a document path member unless it is a plain `[A-Za-z0-9_]+` name.
pub fn quote_document_path_member(member: &str) -> String {
    if plain_member_regex().is_some_and(|re| re.is_match(member)) {
        member.to_string()
    } else {
        format!("\"{}\"", member.replace('"', "\\\""))
    }
}

/// Escape a JSON object key for single-quoted output.
pub fn quote_json_key(key: &str) -> String {
    key.replace('\'', "\\'")
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::TinyInt(n) => n.to_string(),
        Value::SmallInt(n) => n.to_string(),
        Value::Int(n) => n.to_string(),
        Value::BigInt(n) => n.to_string(),
        Value::UnsignedTinyInt(n) => n.to_string(),
        Value::UnsignedSmallInt(n) => n.to_string(),
        Value::UnsignedInt(n) => n.to_string(),
        Value::UnsignedBigInt(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Double(n) => n.to_string(),
        Value::Decimal(n) => n.to_string(),
        Value::Text(s) => quote_string(s),
        Value::Bytes(b) | Value::Geometry(b) => quote_string(&String::from_utf8_lossy(b)),
        Value::Date(d) => quote_string(&d.to_string()),
        Value::Time(t) => quote_string(&t.to_string()),
        Value::DateTime(dt) => quote_string(&dt.to_string()),
        Value::DateTimeOffset(dt) => quote_string(&dt.to_string()),
        Value::Duration(d) => quote_string(&d.to_string()),
        Value::Uuid(u) => quote_string(&u.to_string()),
        Value::Json(j) => quote_string(&j.to_string()),
    }
}

fn document_path_to_string(items: &[DocumentPathItem]) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            DocumentPathItem::Member(name) => {
                out.push('.');
                out.push_str(&quote_document_path_member(name));
            }
            DocumentPathItem::MemberAsterisk => out.push_str(".*"),
            DocumentPathItem::ArrayIndex(index) => out.push_str(&format!("[{index}]")),
            DocumentPathItem::ArrayIndexAsterisk => out.push_str("[*]"),
            DocumentPathItem::DoubleAsterisk => out.push_str("**"),
        }
    }
    out
}

fn column_identifier_to_string(id: &ColumnIdentifier) -> String {
    let mut s = quote_identifier(&id.name);
    if let Some(table) = id.table.as_deref().filter(|t| !t.is_empty()) {
        s = format!("{}.{}", quote_identifier(table), s);
    }
    if let Some(schema) = id.schema.as_deref().filter(|s| !s.is_empty()) {
        s = format!("{}.{}", quote_identifier(schema), s);
    }
    if !id.document_path.is_empty() {
        s.push('$');
        s.push_str(&document_path_to_string(&id.document_path));
    }
    s
}

fn param_list(params: &[String]) -> String {
    format!("({})", params.join(", "))
}

fn function_call_to_string(name: &Identifier, params: &[Expr]) -> String {
    let mut s = quote_identifier(&name.name);
    if let Some(schema) = name.schema.as_deref().filter(|s| !s.is_empty()) {
        s = format!("{}.{}", quote_identifier(schema), s);
    }
    let params: Vec<String> = params.iter().map(expr_to_string).collect();
    s + &param_list(&params)
}

fn operator_to_string(name: &str, params: &[Expr]) -> String {
    let p: Vec<String> = params.iter().map(expr_to_string).collect();
    let spaced = name.replace('_', " ");
    match (name, p.as_slice()) {
        ("between" | "not_between", [value, low, high]) => {
            format!("({value} {spaced} {low} and {high})")
        }
        ("in" | "not_in", [value, list @ ..]) => format!("{value} {spaced}{}", param_list(list)),
        ("like" | "not_like", [value, pattern, rest @ ..]) => {
            let mut s = format!("{value} {spaced} {pattern}");
            if let [escape] = rest {
                s.push_str(" ESCAPE ");
                s.push_str(escape);
            }
            s
        }
        ("regexp" | "not_regexp", [value, pattern]) => format!("({value} {spaced} {pattern})"),
        ("cast", [value, type_name]) => format!("cast({value} AS {})", type_name.replace('"', "")),
        (_, [lhs, rhs]) if name.len() < 3 || INFIX_OPERATORS.contains(&name) => {
            format!("({lhs} {name} {rhs})")
        }
        (_, [operand]) => format!("{name}{operand}"),
        (_, []) => name.to_string(),
        _ => name.to_string() + &param_list(&p),
    }
}

fn object_to_string(fields: &[(String, Expr)]) -> String {
    let fields: Vec<String> = fields
        .iter()
        .map(|(key, value)| format!("'{}':{}", quote_json_key(key), expr_to_string(value)))
        .collect();
    format!("{{{}}}", fields.join(", "))
}

/// Serialize an expression to text.
pub fn expr_to_string(expr: &Expr) -> String {
    match expr {
        Expr::Literal(value) => scalar_to_string(value),
        Expr::Identifier(id) => column_identifier_to_string(id),
        Expr::FunctionCall { name, params } => function_call_to_string(name, params),
        Expr::Operator { name, params } => operator_to_string(name, params),
        Expr::Placeholder(position) => format!(":{position}"),
        Expr::Object(fields) => object_to_string(fields),
        Expr::Array(items) => {
            let items: Vec<String> = items.iter().map(expr_to_string).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&expr_to_string(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Scalars ====================

    #[test]
    fn test_scalars() {
        assert_eq!(expr_to_string(&Expr::null()), "NULL");
        assert_eq!(expr_to_string(&Expr::lit(true)), "TRUE");
        assert_eq!(expr_to_string(&Expr::lit(-3i64)), "-3");
        assert_eq!(expr_to_string(&Expr::lit(10.0f64)), "10");
        assert_eq!(expr_to_string(&Expr::lit(0.0012f64)), "0.0012");
        assert_eq!(expr_to_string(&Expr::lit("say \"hi\"")), "\"say \"\"hi\"\"\"");
        assert_eq!(expr_to_string(&Expr::octets("HOUR")), "\"HOUR\"");
    }

    // ==================== Identifiers ====================

    #[test]
    fn test_column_identifier() {
        let id = ColumnIdentifier::column("c").table("b").schema("a");
        assert_eq!(expr_to_string(&id.into()), "a.b.c");

        let id = ColumnIdentifier::column("we`ird").path(vec![DocumentPathItem::member("x")]);
        assert_eq!(expr_to_string(&id.into()), "`we``ird`$.x");
    }

    #[test]
    fn test_document_paths() {
        let field = Expr::field(vec![
            DocumentPathItem::member("a"),
            DocumentPathItem::DoubleAsterisk,
            DocumentPathItem::ArrayIndex(0),
            DocumentPathItem::MemberAsterisk,
            DocumentPathItem::ArrayIndexAsterisk,
        ]);
        assert_eq!(expr_to_string(&field), "$.a**[0].*[*]");
    }

    #[test]
    fn test_member_quoting() {
        assert_eq!(quote_document_path_member("plain_1"), "plain_1");
        assert_eq!(quote_document_path_member("a weird key"), "\"a weird key\"");
        assert_eq!(quote_document_path_member("say \"x\""), "\"say \\\"x\\\"\"");
        assert_eq!(quote_document_path_member(""), "\"\"");
    }

    // ==================== Operators ====================

    #[test]
    fn test_operator_forms() {
        let a = Expr::col("a");
        let b = Expr::col("b");
        assert_eq!(
            expr_to_string(&Expr::op("&&", vec![a.clone(), b.clone()])),
            "(a && b)"
        );
        assert_eq!(
            expr_to_string(&Expr::op("and", vec![a.clone(), b.clone()])),
            "(a and b)"
        );
        assert_eq!(
            expr_to_string(&Expr::op("is_not", vec![a.clone(), Expr::null()])),
            "is_not(a, NULL)"
        );
        assert_eq!(expr_to_string(&Expr::op("!", vec![a.clone()])), "!a");
        assert_eq!(expr_to_string(&Expr::op("*", vec![])), "*");
        assert_eq!(
            expr_to_string(&Expr::op("not_between", vec![a.clone(), Expr::lit(1i64), b.clone()])),
            "(a not between 1 and b)"
        );
        assert_eq!(
            expr_to_string(&Expr::op("not_in", vec![a.clone(), Expr::lit(1i64), b.clone()])),
            "a not in(1, b)"
        );
        assert_eq!(
            expr_to_string(&Expr::op("not_regexp", vec![a, b])),
            "(a not regexp b)"
        );
    }

    #[test]
    fn test_cast_strips_quotes() {
        let cast = Expr::op("cast", vec![Expr::col("b"), Expr::octets("DECIMAL(1,2)")]);
        assert_eq!(expr_to_string(&cast), "cast(b AS DECIMAL(1,2))");
    }

    #[test]
    fn test_object_and_array() {
        let obj = Expr::Object(vec![
            ("it's".to_string(), Expr::lit(1i64)),
            ("b".to_string(), Expr::Array(vec![Expr::lit(1i64), Expr::lit("x")])),
        ]);
        assert_eq!(expr_to_string(&obj), "{'it\\'s':1, 'b':[1, \"x\"]}");
        assert_eq!(expr_to_string(&Expr::Object(vec![])), "{}");
    }

    #[test]
    fn test_display_matches_unparse() {
        let expr = Expr::call("now", vec![]);
        assert_eq!(expr.to_string(), "now()");
    }
}
