//! Expression language for document and table queries.
//!
//! `mysqlkit-expr` turns filter, projection, ordering and grouping text into
//! an [`Expr`] tree and renders trees back to canonical text.
//!
//! ```
//! use mysqlkit_expr::{expr_to_string, parse};
//!
//! let expr = parse("a between 1 and 10 and b like 'x%'").unwrap();
//! assert_eq!(
//!     expr_to_string(&expr),
//!     "((a between 1 and 10) && b like \"x%\")"
//! );
//! ```
//!
//! Supported syntax: arithmetic, shift, bitwise and comparison operators,
//! `IS [NOT]`, `[NOT] IN`, `[NOT] LIKE ... [ESCAPE ...]`, `[NOT] BETWEEN`,
//! `[NOT] REGEXP`, `[NOT] OVERLAPS`, `AND`/`OR`, `CAST(expr AS type)`,
//! `expr +/- INTERVAL amount unit`, document paths after `$` or `@`,
//! placeholders (`?`, `:name`, `:N`), array and JSON object literals.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod unparse;

pub use ast::{
    ColumnIdentifier, Direction, DocumentPathItem, Expr, Identifier, OrderSpec, Projection,
};
pub use lexer::{Token, TokenKind, lex};
pub use parser::{ExprParser, parse, parse_document};
pub use unparse::{expr_to_string, quote_document_path_member, quote_json_key};
