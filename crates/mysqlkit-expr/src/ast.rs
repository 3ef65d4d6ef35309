//! Expression tree produced by the parser.
//!
//! Nodes are plain data. Operators carry the name the server understands
//! (`&&`, `==`, `date_add`, `not_between`, ...) and a positional parameter
//! list, so a single `Operator` variant covers unary, binary and n-ary forms.

use mysqlkit_core::Value;

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Scalar literal: NULL, bool, signed integer, double, string or octets
    Literal(Value),
    /// Column reference, document field, or both
    Identifier(ColumnIdentifier),
    /// Function call (e.g., `now()`, `schema.func(a, b)`)
    FunctionCall {
        name: Identifier,
        params: Vec<Expr>,
    },
    /// Named operator with its operands in order
    Operator { name: String, params: Vec<Expr> },
    /// Bound parameter position
    Placeholder(u32),
    /// JSON object literal, fields in source order
    Object(Vec<(String, Expr)>),
    /// Array literal
    Array(Vec<Expr>),
}

/// Optionally schema-qualified function name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identifier {
    pub name: String,
    pub schema: Option<String>,
}

/// A column reference (`name[.table[.schema]]`) with an optional document path.
///
/// Document fields have an empty name and a non-empty path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnIdentifier {
    pub name: String,
    pub table: Option<String>,
    pub schema: Option<String>,
    pub document_path: Vec<DocumentPathItem>,
}

/// One step of a JSON document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPathItem {
    /// `.name`
    Member(String),
    /// `.*`
    MemberAsterisk,
    /// `[n]`
    ArrayIndex(u32),
    /// `[*]`
    ArrayIndexAsterisk,
    /// `**`
    DoubleAsterisk,
}

/// Sort direction of an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// An ORDER BY item; `direction` is `None` when the source gave none.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub expr: Expr,
    pub direction: Option<Direction>,
}

/// A projection item with its target alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub source: Expr,
    pub alias: Option<String>,
}

impl Identifier {
    /// Create an unqualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    /// Create a schema-qualified name.
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema.into()),
        }
    }
}

impl ColumnIdentifier {
    /// Create a column reference from its parts.
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Qualify the column with a table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Qualify the column with a schema name.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Attach a document path.
    pub fn path(mut self, path: Vec<DocumentPathItem>) -> Self {
        self.document_path = path;
        self
    }

    /// A bare document field (`$.a.b`).
    pub fn document_field(path: Vec<DocumentPathItem>) -> Self {
        Self {
            document_path: path,
            ..Self::default()
        }
    }
}

impl DocumentPathItem {
    /// Create a member step.
    pub fn member(name: impl Into<String>) -> Self {
        DocumentPathItem::Member(name.into())
    }

    /// The member name, if this is a member step.
    pub fn member_name(&self) -> Option<&str> {
        match self {
            DocumentPathItem::Member(name) => Some(name),
            _ => None,
        }
    }
}

impl Expr {
    // ==================== Constructors ====================

    /// Create a literal value expression.
    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Create a NULL literal.
    pub fn null() -> Self {
        Expr::Literal(Value::Null)
    }

    /// Create an octets literal (used for CAST types and interval units).
    pub fn octets(text: &str) -> Self {
        Expr::Literal(Value::Bytes(text.as_bytes().to_vec()))
    }

    /// Create an unqualified column reference.
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Identifier(ColumnIdentifier::column(name))
    }

    /// Create a document field reference from a path.
    pub fn field(path: Vec<DocumentPathItem>) -> Self {
        Expr::Identifier(ColumnIdentifier::document_field(path))
    }

    /// Create a placeholder for the given bound position.
    pub fn placeholder(position: u32) -> Self {
        Expr::Placeholder(position)
    }

    /// Create a named operator.
    pub fn op(name: impl Into<String>, params: Vec<Expr>) -> Self {
        Expr::Operator {
            name: name.into(),
            params,
        }
    }

    /// Create an unqualified function call.
    pub fn call(name: impl Into<String>, params: Vec<Expr>) -> Self {
        Expr::FunctionCall {
            name: Identifier::new(name),
            params,
        }
    }

    // ==================== Inspection ====================

    /// The operator name, if this is an operator node.
    pub fn operator_name(&self) -> Option<&str> {
        match self {
            Expr::Operator { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The operator or function parameters, empty for other nodes.
    pub fn params(&self) -> &[Expr] {
        match self {
            Expr::Operator { params, .. } | Expr::FunctionCall { params, .. } => params,
            _ => &[],
        }
    }

    /// The column identifier, if this is an identifier node.
    pub fn as_identifier(&self) -> Option<&ColumnIdentifier> {
        match self {
            Expr::Identifier(id) => Some(id),
            _ => None,
        }
    }

    /// The literal value, if this is a literal node.
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Literal(v)
    }
}

impl From<ColumnIdentifier> for Expr {
    fn from(id: ColumnIdentifier) -> Self {
        Expr::Identifier(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Expr::lit(1i64), Expr::Literal(Value::BigInt(1)));
        assert_eq!(Expr::null(), Expr::Literal(Value::Null));
        assert_eq!(
            Expr::octets("HOUR"),
            Expr::Literal(Value::Bytes(b"HOUR".to_vec()))
        );
        assert_eq!(Expr::op("+", vec![]).operator_name(), Some("+"));
        assert!(Expr::placeholder(0).params().is_empty());
    }

    #[test]
    fn test_column_builder() {
        let id = ColumnIdentifier::column("e")
            .table("d")
            .schema("s")
            .path(vec![DocumentPathItem::member("p"), DocumentPathItem::ArrayIndex(2)]);
        assert_eq!(id.name, "e");
        assert_eq!(id.table.as_deref(), Some("d"));
        assert_eq!(id.schema.as_deref(), Some("s"));
        assert_eq!(id.document_path[0].member_name(), Some("p"));
        assert_eq!(id.document_path[1].member_name(), None);
    }

    #[test]
    fn test_document_field_has_empty_name() {
        let expr = Expr::field(vec![DocumentPathItem::member("count")]);
        let id = expr.as_identifier().unwrap();
        assert!(id.name.is_empty());
        assert!(id.table.is_none());
        assert_eq!(id.document_path.len(), 1);
    }
}
