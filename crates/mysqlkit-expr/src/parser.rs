//! Recursive-descent expression parser.
//!
//! Precedence, tightest first:
//!
//! ```text
//! atomic
//!   -> expr +/- INTERVAL amount unit
//!   -> * / div %
//!   -> + -
//!   -> << >>
//!   -> & | ^
//!   -> == != < <= > >=
//!   -> IS / IN / LIKE / BETWEEN / REGEXP / OVERLAPS (with NOT)
//!   -> AND &&
//!   -> OR ||
//! ```
//!
//! Every binary level is a left-associative loop over the next tighter one.
//! Error positions are token indices.

use std::collections::HashMap;

use mysqlkit_core::{ParseError, Result, Value, quote_identifier};

use crate::ast::{
    ColumnIdentifier, Direction, DocumentPathItem, Expr, Identifier, OrderSpec, Projection,
};
use crate::lexer::{Token, TokenKind, lex};

type PResult<T> = std::result::Result<T, ParseError>;

/// Parser over one expression source string.
///
/// With relational columns allowed (the default), bare identifiers are
/// resolved as `name[.table[.schema]]` columns; otherwise every bare
/// identifier is the first member of a document path.
#[derive(Debug)]
pub struct ExprParser {
    source: String,
    tokens: Vec<Token>,
    pos: usize,
    allow_relational_columns: bool,
    positional_placeholder_count: u32,
    placeholder_name_to_position: HashMap<String, u32>,
}

impl ExprParser {
    /// Lex `source` for parsing with relational columns allowed.
    pub fn new(source: &str) -> Result<Self> {
        Self::with_relational_columns(source, true)
    }

    /// Lex `source` for parsing in document mode.
    pub fn document(source: &str) -> Result<Self> {
        Self::with_relational_columns(source, false)
    }

    /// Lex `source`, choosing whether bare identifiers are table columns.
    pub fn with_relational_columns(source: &str, allow_relational_columns: bool) -> Result<Self> {
        let tokens = lex(source).map_err(|err| {
            tracing::debug!(source = source, error = %err, "Expression lexing failed");
            err.in_source(source)
        })?;
        Ok(Self {
            source: source.to_string(),
            tokens,
            pos: 0,
            allow_relational_columns,
            positional_placeholder_count: 0,
            placeholder_name_to_position: HashMap::new(),
        })
    }

    /// The lexed tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of distinct placeholders seen so far.
    pub fn positional_placeholder_count(&self) -> u32 {
        self.positional_placeholder_count
    }

    /// Placeholder names (lowercased) and the positions they were bound to.
    pub fn placeholder_name_to_position(&self) -> &HashMap<String, u32> {
        &self.placeholder_name_to_position
    }

    // ==================== Entry Points ====================

    /// Parse the whole source as a single expression.
    pub fn parse(&mut self) -> Result<Expr> {
        self.complete(Self::expr)
    }

    /// Parse `expr [ASC|DESC] {, expr [ASC|DESC]}`.
    pub fn parse_order_spec(&mut self) -> Result<Vec<OrderSpec>> {
        self.complete(|p| {
            p.comma_separated(|p| {
                let expr = p.expr()?;
                let direction = if p.accept(TokenKind::OrderByAsc) {
                    Some(Direction::Asc)
                } else if p.accept(TokenKind::OrderByDesc) {
                    Some(Direction::Desc)
                } else {
                    None
                };
                Ok(OrderSpec { expr, direction })
            })
        })
    }

    /// Parse `expr [AS alias] {, expr [AS alias]}`.
    pub fn parse_table_select_projection(&mut self) -> Result<Vec<Projection>> {
        self.complete(|p| {
            p.comma_separated(|p| {
                let source = p.expr()?;
                let alias = p.alias()?;
                Ok(Projection { source, alias })
            })
        })
    }

    /// Parse a document projection list.
    ///
    /// Switches the parser to document mode. Without `AS`, an identifier
    /// source is aliased by its first document path member.
    pub fn parse_document_projection(&mut self) -> Result<Vec<Projection>> {
        self.allow_relational_columns = false;
        self.complete(|p| {
            p.comma_separated(|p| {
                let source = p.expr()?;
                let alias = match p.alias()? {
                    Some(alias) => Some(alias),
                    None => source
                        .as_identifier()
                        .and_then(|id| id.document_path.first())
                        .and_then(DocumentPathItem::member_name)
                        .map(str::to_string),
                };
                Ok(Projection { source, alias })
            })
        })
    }

    /// Parse a comma separated expression list (GROUP BY).
    pub fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        self.complete(|p| p.comma_separated(Self::expr))
    }

    /// Parse an INSERT column name.
    pub fn parse_table_insert_field(&mut self) -> Result<String> {
        self.complete(|p| p.consume(TokenKind::Ident))
    }

    /// Parse an UPDATE target: a column identifier with an optional document path.
    pub fn parse_table_update_field(&mut self) -> Result<ColumnIdentifier> {
        self.complete(Self::column_identifier)
    }

    /// Run an entry point, require every token consumed and wrap failures
    /// with the source text.
    fn complete<T>(&mut self, entry: impl FnOnce(&mut Self) -> PResult<T>) -> Result<T> {
        let result = entry(self).and_then(|value| {
            if self.pos == self.tokens.len() {
                Ok(value)
            } else {
                Err(ParseError::at(
                    self.pos,
                    format!(
                        "Only {} tokens consumed, out of {}",
                        self.pos,
                        self.tokens.len()
                    ),
                ))
            }
        });
        result.map_err(|err| {
            tracing::debug!(source = %self.source, error = %err, "Expression parse failed");
            err.in_source(&self.source).into()
        })
    }

    // ==================== Token Helpers ====================

    fn kind_at(&self, pos: usize) -> Option<TokenKind> {
        self.tokens.get(pos).map(|t| t.kind)
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.kind_at(self.pos) == Some(kind)
    }

    fn next_is(&self, kind: TokenKind) -> bool {
        self.kind_at(self.pos + 1) == Some(kind)
    }

    fn current_in(&self, kinds: &[TokenKind]) -> bool {
        self.kind_at(self.pos).is_some_and(|k| kinds.contains(&k))
    }

    fn assert_token_at(&self, pos: usize, kind: TokenKind) -> PResult<()> {
        match self.kind_at(pos) {
            None => Err(ParseError::at(
                pos,
                format!("No more tokens when expecting {kind} at token pos {pos}"),
            )),
            Some(found) if found != kind => Err(ParseError::at(
                pos,
                format!("Expected token type {kind} at token pos {pos}"),
            )),
            Some(_) => Ok(()),
        }
    }

    /// Consume a token of the given kind and return its value.
    fn consume(&mut self, kind: TokenKind) -> PResult<String> {
        self.assert_token_at(self.pos, kind)?;
        let value = self.tokens[self.pos].value.clone();
        self.pos += 1;
        Ok(value)
    }

    /// Consume the current token if it has the given kind.
    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.current_is(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn comma_separated<T>(
        &mut self,
        mut element: impl FnMut(&mut Self) -> PResult<T>,
    ) -> PResult<Vec<T>> {
        let mut items = vec![element(self)?];
        while self.accept(TokenKind::Comma) {
            items.push(element(self)?);
        }
        Ok(items)
    }

    fn alias(&mut self) -> PResult<Option<String>> {
        if self.accept(TokenKind::As) {
            Ok(Some(self.consume(TokenKind::Ident)?))
        } else {
            Ok(None)
        }
    }

    /// `( [expr {, expr}] )`
    fn paren_expr_list(&mut self) -> PResult<Vec<Expr>> {
        self.consume(TokenKind::LParen)?;
        let mut exprs = Vec::new();
        if !self.current_is(TokenKind::RParen) {
            exprs = self.comma_separated(Self::expr)?;
        }
        self.consume(TokenKind::RParen)?;
        Ok(exprs)
    }

    // ==================== Identifiers and Paths ====================

    /// `[schema.]name` for function calls.
    fn identifier(&mut self) -> PResult<Identifier> {
        self.assert_token_at(self.pos, TokenKind::Ident)?;
        let mut schema = None;
        if self.next_is(TokenKind::Dot) {
            schema = Some(self.consume(TokenKind::Ident)?);
            self.consume(TokenKind::Dot)?;
        }
        let name = self.consume(TokenKind::Ident)?;
        Ok(Identifier { name, schema })
    }

    fn function_call(&mut self) -> PResult<Expr> {
        let name = self.identifier()?;
        let params = self.paren_expr_list()?;
        Ok(Expr::FunctionCall { name, params })
    }

    /// `.name` or `."quoted name"`.
    fn document_path_member(&mut self) -> PResult<DocumentPathItem> {
        self.consume(TokenKind::Dot)?;
        match self.kind_at(self.pos) {
            Some(TokenKind::Ident) => {
                let value = self.consume(TokenKind::Ident)?;
                if value != quote_identifier(&value) {
                    return Err(ParseError::at(
                        self.pos - 1,
                        format!("'{value}' is not a valid JSON/ECMAScript identifier"),
                    ));
                }
                Ok(DocumentPathItem::Member(value))
            }
            Some(TokenKind::LString) => Ok(DocumentPathItem::Member(
                self.consume(TokenKind::LString)?,
            )),
            _ => Err(ParseError::at(
                self.pos,
                format!(
                    "Expected token type IDENT or LSTRING in JSON path at token pos {}",
                    self.pos
                ),
            )),
        }
    }

    /// `[*]` or `[n]`.
    fn document_path_array_location(&mut self) -> PResult<DocumentPathItem> {
        self.consume(TokenKind::LSqBracket)?;
        let item = if self.accept(TokenKind::Star) {
            DocumentPathItem::ArrayIndexAsterisk
        } else if self.current_is(TokenKind::LNumInt) {
            let at = self.pos;
            let text = self.consume(TokenKind::LNumInt)?;
            let index = text.parse::<u32>().map_err(|_| {
                ParseError::at(at, format!("Invalid array index '{text}' at token pos {at}"))
            })?;
            DocumentPathItem::ArrayIndex(index)
        } else {
            return Err(ParseError::at(
                self.pos,
                format!(
                    "Expected token type STAR or LNUM_INT in JSON path array index at token pos {}",
                    self.pos
                ),
            ));
        };
        self.consume(TokenKind::RSqBracket)?;
        Ok(item)
    }

    /// A possibly empty sequence of path steps; may not end in `**`.
    fn document_path(&mut self) -> PResult<Vec<DocumentPathItem>> {
        let mut items = Vec::new();
        loop {
            match self.kind_at(self.pos) {
                Some(TokenKind::Dot) => items.push(self.document_path_member()?),
                Some(TokenKind::DotStar) => {
                    self.pos += 1;
                    items.push(DocumentPathItem::MemberAsterisk);
                }
                Some(TokenKind::LSqBracket) => items.push(self.document_path_array_location()?),
                Some(TokenKind::DoubleStar) => {
                    self.pos += 1;
                    items.push(DocumentPathItem::DoubleAsterisk);
                }
                _ => break,
            }
        }
        if items.last() == Some(&DocumentPathItem::DoubleAsterisk) {
            return Err(ParseError::at(
                self.pos,
                format!("JSON path may not end in '**' at {}", self.pos),
            ));
        }
        Ok(items)
    }

    /// A document field: an optional leading member name, then a path.
    fn document_field(&mut self) -> PResult<Expr> {
        let mut path = Vec::new();
        if self.current_is(TokenKind::Ident) {
            path.push(DocumentPathItem::Member(self.consume(TokenKind::Ident)?));
        }
        path.extend(self.document_path()?);
        Ok(Expr::field(path))
    }

    /// `name[.table[.schema]] [->] [$path]`.
    fn column_identifier(&mut self) -> PResult<ColumnIdentifier> {
        let mut parts = vec![self.consume(TokenKind::Ident)?];
        while parts.len() < 3 && self.accept(TokenKind::Dot) {
            parts.push(self.consume(TokenKind::Ident)?);
        }
        let mut parts = parts.into_iter().rev();
        let mut id = ColumnIdentifier {
            name: parts.next().unwrap_or_default(),
            table: parts.next(),
            schema: parts.next(),
            document_path: Vec::new(),
        };

        if self.current_is(TokenKind::DoubleArrow) {
            return Err(ParseError::at(self.pos, "Operator ->> not supported."));
        }
        self.accept(TokenKind::Arrow);

        if self.accept(TokenKind::At) {
            id.document_path = self.document_path()?;
            if id.document_path.is_empty() {
                return Err(ParseError::at(
                    self.pos,
                    format!("Invalid document path at {}", self.pos),
                ));
            }
        }
        Ok(id)
    }

    // ==================== Atomic Expressions ====================

    fn placeholder(&mut self, introducer: TokenKind) -> PResult<Expr> {
        let name = if self.current_is(TokenKind::LNumInt) {
            self.consume(TokenKind::LNumInt)?
        } else if self.current_is(TokenKind::Ident) {
            self.consume(TokenKind::Ident)?
        } else if introducer == TokenKind::Eroteme {
            self.positional_placeholder_count.to_string()
        } else {
            return Err(ParseError::at(
                self.pos,
                format!("Invalid placeholder name at token pos {}", self.pos),
            ));
        };
        let name = name.to_lowercase();
        let position = match self.placeholder_name_to_position.get(&name) {
            Some(&position) => position,
            None => {
                let position = self.positional_placeholder_count;
                self.placeholder_name_to_position.insert(name, position);
                self.positional_placeholder_count += 1;
                position
            }
        };
        Ok(Expr::Placeholder(position))
    }

    /// `CAST ( expr AS type )`; the type is re-serialized upper-case.
    fn cast(&mut self) -> PResult<Expr> {
        self.consume(TokenKind::LParen)?;
        let operand = self.expr()?;
        self.consume(TokenKind::As)?;

        let Some(type_token) = self.tokens.get(self.pos) else {
            return Err(ParseError::at(
                self.pos,
                format!("Expected valid CAST type argument at {}", self.pos),
            ));
        };
        let kind = type_token.kind;
        let mut type_name = type_token.value.to_uppercase();
        match kind {
            TokenKind::Decimal => {
                self.pos += 1;
                if self.accept(TokenKind::LParen) {
                    type_name.push('(');
                    type_name.push_str(&self.consume(TokenKind::LNumInt)?);
                    if self.accept(TokenKind::Comma) {
                        type_name.push(',');
                        type_name.push_str(&self.consume(TokenKind::LNumInt)?);
                    }
                    self.consume(TokenKind::RParen)?;
                    type_name.push(')');
                }
            }
            TokenKind::Char | TokenKind::Binary => {
                self.pos += 1;
                if self.accept(TokenKind::LParen) {
                    type_name.push('(');
                    type_name.push_str(&self.consume(TokenKind::LNumInt)?);
                    self.consume(TokenKind::RParen)?;
                    type_name.push(')');
                }
            }
            TokenKind::Unsigned | TokenKind::Signed => {
                self.pos += 1;
                // INTEGER is implied and not carried in the type string
                self.accept(TokenKind::Integer);
            }
            TokenKind::Json | TokenKind::Date | TokenKind::DateTime | TokenKind::Time => {
                self.pos += 1;
            }
            _ => {
                return Err(ParseError::at(
                    self.pos,
                    format!("Expected valid CAST type argument at {}", self.pos),
                ));
            }
        }
        self.consume(TokenKind::RParen)?;
        Ok(Expr::op("cast", vec![operand, Expr::octets(&type_name)]))
    }

    fn int_literal(&self, text: &str) -> PResult<Expr> {
        text.parse::<i64>()
            .map(|n| Expr::Literal(Value::BigInt(n)))
            .map_err(|_| {
                ParseError::at(
                    self.pos - 1,
                    format!("Invalid integer literal '{text}' at token pos {}", self.pos - 1),
                )
            })
    }

    fn double_literal(&self, text: &str) -> PResult<Expr> {
        text.parse::<f64>()
            .map(|n| Expr::Literal(Value::Double(n)))
            .map_err(|_| {
                ParseError::at(
                    self.pos - 1,
                    format!("Invalid numeric literal '{text}' at token pos {}", self.pos - 1),
                )
            })
    }

    fn atomic_expr(&mut self) -> PResult<Expr> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(ParseError::at(
                self.pos,
                format!("No more tokens when expecting one at token pos {}", self.pos),
            ));
        };
        self.pos += 1;

        match token.kind {
            TokenKind::Eroteme | TokenKind::Colon => self.placeholder(token.kind),
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.consume(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LSqBracket => {
                let items = self.comma_separated(Self::expr)?;
                self.consume(TokenKind::RSqBracket)?;
                Ok(Expr::Array(items))
            }
            TokenKind::LCurly => {
                let mut fields = Vec::new();
                if self.current_is(TokenKind::LString) {
                    fields = self.comma_separated(|p| {
                        let key = p.consume(TokenKind::LString)?;
                        p.consume(TokenKind::Colon)?;
                        Ok((key, p.expr()?))
                    })?;
                }
                self.consume(TokenKind::RCurly)?;
                Ok(Expr::Object(fields))
            }
            TokenKind::Cast => self.cast(),
            TokenKind::Plus | TokenKind::Minus => {
                if self.current_in(&[TokenKind::LNumInt, TokenKind::LNumDouble]) {
                    // Fold the sign into the numeric literal
                    let number = &mut self.tokens[self.pos].value;
                    number.insert_str(0, &token.value);
                    self.atomic_expr()
                } else {
                    Ok(Expr::op(token.value, vec![self.atomic_expr()?]))
                }
            }
            TokenKind::Not | TokenKind::Neg | TokenKind::Bang => {
                Ok(Expr::op(token.value, vec![self.atomic_expr()?]))
            }
            TokenKind::LString => Ok(Expr::Literal(Value::Text(token.value))),
            TokenKind::Null => Ok(Expr::null()),
            TokenKind::LNumInt => self.int_literal(&token.value),
            TokenKind::LNumDouble => self.double_literal(&token.value),
            TokenKind::True | TokenKind::False => {
                Ok(Expr::Literal(Value::Bool(token.kind == TokenKind::True)))
            }
            TokenKind::At => self.document_field(),
            // "*" as a nullary operator, for count(*)
            TokenKind::Star => Ok(Expr::op("*", Vec::new())),
            TokenKind::Ident => {
                self.pos -= 1;
                let is_call = self.next_is(TokenKind::LParen)
                    || (self.kind_at(self.pos + 1) == Some(TokenKind::Dot)
                        && self.kind_at(self.pos + 2) == Some(TokenKind::Ident)
                        && self.kind_at(self.pos + 3) == Some(TokenKind::LParen));
                if is_call {
                    self.function_call()
                } else if self.allow_relational_columns {
                    Ok(Expr::Identifier(self.column_identifier()?))
                } else {
                    self.document_field()
                }
            }
            _ => Err(ParseError::at(
                self.pos - 1,
                format!("Cannot find atomic expression at token pos: {}", self.pos - 1),
            )),
        }
    }

    // ==================== Operator Levels ====================

    fn left_assoc(
        &mut self,
        kinds: &[TokenKind],
        inner: fn(&mut Self) -> PResult<Expr>,
    ) -> PResult<Expr> {
        let mut lhs = inner(self)?;
        while self.current_in(kinds) {
            let name = self.tokens[self.pos].value.clone();
            self.pos += 1;
            let rhs = inner(self)?;
            lhs = Expr::op(name, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    /// `expr {(+|-) INTERVAL amount unit}` rewritten to `date_add`/`date_sub`.
    fn add_sub_interval_expr(&mut self) -> PResult<Expr> {
        let mut lhs = self.atomic_expr()?;
        while self.current_in(&[TokenKind::Plus, TokenKind::Minus])
            && self.next_is(TokenKind::Interval)
        {
            let name = if self.current_is(TokenKind::Plus) {
                "date_add"
            } else {
                "date_sub"
            };
            self.pos += 2;
            let amount = self.bit_expr()?;
            if !self.current_is(TokenKind::IntervalUnit) {
                return Err(ParseError::at(
                    self.pos,
                    format!("Expected interval units at {}", self.pos),
                ));
            }
            let unit = self.tokens[self.pos].value.to_uppercase();
            self.pos += 1;
            lhs = Expr::op(name, vec![lhs, amount, Expr::octets(&unit)]);
        }
        Ok(lhs)
    }

    fn mul_div_expr(&mut self) -> PResult<Expr> {
        self.left_assoc(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Mod],
            Self::add_sub_interval_expr,
        )
    }

    fn add_sub_expr(&mut self) -> PResult<Expr> {
        self.left_assoc(&[TokenKind::Plus, TokenKind::Minus], Self::mul_div_expr)
    }

    fn shift_expr(&mut self) -> PResult<Expr> {
        self.left_assoc(&[TokenKind::LShift, TokenKind::RShift], Self::add_sub_expr)
    }

    fn bit_expr(&mut self) -> PResult<Expr> {
        self.left_assoc(
            &[TokenKind::BitAnd, TokenKind::BitOr, TokenKind::BitXor],
            Self::shift_expr,
        )
    }

    fn comp_expr(&mut self) -> PResult<Expr> {
        self.left_assoc(
            &[
                TokenKind::Ge,
                TokenKind::Gt,
                TokenKind::Le,
                TokenKind::Lt,
                TokenKind::Eq,
                TokenKind::Ne,
            ],
            Self::bit_expr,
        )
    }

    /// IS / IN / LIKE / BETWEEN / REGEXP / OVERLAPS, each optionally negated.
    fn ilri_expr(&mut self) -> PResult<Expr> {
        const PREDICATES: [TokenKind; 7] = [
            TokenKind::Is,
            TokenKind::In,
            TokenKind::Like,
            TokenKind::Between,
            TokenKind::Regexp,
            TokenKind::Not,
            TokenKind::Overlaps,
        ];

        let mut lhs = self.comp_expr()?;
        while self.current_in(&PREDICATES) {
            let negated = self.accept(TokenKind::Not);
            let Some(token) = self.tokens.get(self.pos).cloned() else {
                return Err(ParseError::at(
                    self.pos,
                    format!("No more tokens when expecting one at token pos {}", self.pos),
                ));
            };
            let mut name = token.value.to_lowercase();
            let mut params = vec![lhs];
            self.pos += 1;
            match token.kind {
                // For IS, NOT comes after the keyword
                TokenKind::Is => {
                    if self.accept(TokenKind::Not) {
                        name = "is_not".to_string();
                    }
                    params.push(self.comp_expr()?);
                }
                TokenKind::In => {
                    if self.current_is(TokenKind::LParen) {
                        params.extend(self.paren_expr_list()?);
                    } else {
                        name = "cont_in".to_string();
                        params.push(self.comp_expr()?);
                    }
                }
                TokenKind::Like => {
                    params.push(self.comp_expr()?);
                    if self.accept(TokenKind::Escape) {
                        params.push(self.comp_expr()?);
                    }
                }
                TokenKind::Between => {
                    params.push(self.comp_expr()?);
                    self.consume(TokenKind::And)?;
                    params.push(self.comp_expr()?);
                }
                TokenKind::Regexp | TokenKind::Overlaps => {
                    params.push(self.comp_expr()?);
                }
                _ => {
                    return Err(ParseError::at(
                        self.pos - 1,
                        format!("Unknown token after NOT at pos: {}", self.pos - 1),
                    ));
                }
            }
            if negated {
                name.insert_str(0, "not_");
            }
            lhs = Expr::op(name, params);
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> PResult<Expr> {
        self.left_assoc(&[TokenKind::And, TokenKind::AndAnd], Self::ilri_expr)
    }

    fn or_expr(&mut self) -> PResult<Expr> {
        self.left_assoc(&[TokenKind::Or, TokenKind::OrOr], Self::and_expr)
    }

    fn expr(&mut self) -> PResult<Expr> {
        self.or_expr()
    }
}

/// Parse a relational expression.
pub fn parse(source: &str) -> Result<Expr> {
    ExprParser::new(source)?.parse()
}

/// Parse a document-mode expression.
pub fn parse_document(source: &str) -> Result<Expr> {
    ExprParser::document(source)?.parse()
}
