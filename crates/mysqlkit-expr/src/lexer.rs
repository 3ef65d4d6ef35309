//! Single-pass lexer for the expression language.
//!
//! Reserved words are case-insensitive and carry their lowercased text as the
//! token value, except `and`/`or` which normalise to `&&`/`||`. Positions in
//! lexing errors are character indices into the source.

use std::fmt;

use mysqlkit_core::ParseError;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Logical
    Not,
    And,
    AndAnd,
    Or,
    OrOr,
    Xor,
    Is,
    // Grouping
    LParen,
    RParen,
    LSqBracket,
    RSqBracket,
    LCurly,
    RCurly,
    // Predicates
    Between,
    In,
    Like,
    Regexp,
    Escape,
    Overlaps,
    Interval,
    // Literals
    True,
    False,
    Null,
    Ident,
    LString,
    LNumInt,
    LNumDouble,
    // Punctuation
    Dot,
    DotStar,
    At,
    Comma,
    Colon,
    Eroteme,
    Arrow,
    DoubleArrow,
    // Comparison
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    // Arithmetic and bitwise
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    Mod,
    Neg,
    Bang,
    Hex,
    Bin,
    /// Any INTERVAL unit keyword (`hour`, `day_minute`, ...)
    IntervalUnit,
    // ORDER BY and projections
    OrderByAsc,
    OrderByDesc,
    As,
    // CAST
    Cast,
    Decimal,
    Unsigned,
    Signed,
    Integer,
    Date,
    Time,
    DateTime,
    Char,
    Binary,
    Json,
}

impl TokenKind {
    /// Upper-case name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Not => "NOT",
            TokenKind::And => "AND",
            TokenKind::AndAnd => "ANDAND",
            TokenKind::Or => "OR",
            TokenKind::OrOr => "OROR",
            TokenKind::Xor => "XOR",
            TokenKind::Is => "IS",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LSqBracket => "LSQBRACKET",
            TokenKind::RSqBracket => "RSQBRACKET",
            TokenKind::LCurly => "LCURLY",
            TokenKind::RCurly => "RCURLY",
            TokenKind::Between => "BETWEEN",
            TokenKind::In => "IN",
            TokenKind::Like => "LIKE",
            TokenKind::Regexp => "REGEXP",
            TokenKind::Escape => "ESCAPE",
            TokenKind::Overlaps => "OVERLAPS",
            TokenKind::Interval => "INTERVAL",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Null => "NULL",
            TokenKind::Ident => "IDENT",
            TokenKind::LString => "LSTRING",
            TokenKind::LNumInt => "LNUM_INT",
            TokenKind::LNumDouble => "LNUM_DOUBLE",
            TokenKind::Dot => "DOT",
            TokenKind::DotStar => "DOTSTAR",
            TokenKind::At => "AT",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Eroteme => "EROTEME",
            TokenKind::Arrow => "ARROW",
            TokenKind::DoubleArrow => "DOUBLE_ARROW",
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::Gt => "GT",
            TokenKind::Ge => "GE",
            TokenKind::Lt => "LT",
            TokenKind::Le => "LE",
            TokenKind::BitAnd => "BITAND",
            TokenKind::BitOr => "BITOR",
            TokenKind::BitXor => "BITXOR",
            TokenKind::LShift => "LSHIFT",
            TokenKind::RShift => "RSHIFT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::DoubleStar => "DOUBLESTAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Mod => "MOD",
            TokenKind::Neg => "NEG",
            TokenKind::Bang => "BANG",
            TokenKind::Hex => "HEX",
            TokenKind::Bin => "BIN",
            TokenKind::IntervalUnit => "INTERVAL_UNIT",
            TokenKind::OrderByAsc => "ORDERBY_ASC",
            TokenKind::OrderByDesc => "ORDERBY_DESC",
            TokenKind::As => "AS",
            TokenKind::Cast => "CAST",
            TokenKind::Decimal => "DECIMAL",
            TokenKind::Unsigned => "UNSIGNED",
            TokenKind::Signed => "SIGNED",
            TokenKind::Integer => "INTEGER",
            TokenKind::Date => "DATE",
            TokenKind::Time => "TIME",
            TokenKind::DateTime => "DATETIME",
            TokenKind::Char => "CHAR",
            TokenKind::Binary => "BINARY",
            TokenKind::Json => "JSON",
        }
    }

    /// Tokens whose value is worth showing in diagnostics.
    const fn carries_text(self) -> bool {
        matches!(
            self,
            TokenKind::Ident | TokenKind::LString | TokenKind::LNumInt | TokenKind::LNumDouble
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.carries_text() {
            write!(f, "{}({})", self.kind, self.value)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Look up a reserved word by its lowercased text.
fn reserved_word(word: &str) -> Option<TokenKind> {
    Some(match word {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "xor" => TokenKind::Xor,
        "is" => TokenKind::Is,
        "not" => TokenKind::Not,
        "like" => TokenKind::Like,
        "in" => TokenKind::In,
        "regexp" => TokenKind::Regexp,
        "between" => TokenKind::Between,
        "interval" => TokenKind::Interval,
        "escape" => TokenKind::Escape,
        "div" => TokenKind::Slash,
        "hex" => TokenKind::Hex,
        "bin" => TokenKind::Bin,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "microsecond" | "second" | "minute" | "hour" | "day" | "week" | "month" | "quarter"
        | "year" | "second_microsecond" | "minute_microsecond" | "minute_second"
        | "hour_microsecond" | "hour_second" | "hour_minute" | "day_microsecond"
        | "day_second" | "day_minute" | "day_hour" | "year_month" => TokenKind::IntervalUnit,
        "asc" => TokenKind::OrderByAsc,
        "desc" => TokenKind::OrderByDesc,
        "as" => TokenKind::As,
        "cast" => TokenKind::Cast,
        "decimal" => TokenKind::Decimal,
        "unsigned" => TokenKind::Unsigned,
        "signed" => TokenKind::Signed,
        "integer" => TokenKind::Integer,
        "date" => TokenKind::Date,
        "time" => TokenKind::Time,
        "datetime" => TokenKind::DateTime,
        "char" => TokenKind::Char,
        "binary" => TokenKind::Binary,
        "json" => TokenKind::Json,
        "overlaps" => TokenKind::Overlaps,
        _ => return None,
    })
}

/// Reserved words that lex as identifiers when directly followed by `(`.
fn is_function_name(word: &str) -> bool {
    matches!(
        word,
        "year"
            | "month"
            | "week"
            | "day"
            | "hour"
            | "minute"
            | "second"
            | "microsecond"
            | "quarter"
            | "time"
            | "date"
            | "char"
            | "hex"
            | "bin"
    )
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split an expression into tokens.
pub fn lex(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer {
    chars: Vec<char>,
    tokens: Vec<Token>,
}

impl Lexer {
    fn peek(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    fn next_is(&self, i: usize, c: char) -> bool {
        self.peek(i + 1) == Some(c)
    }

    fn push(&mut self, kind: TokenKind, value: impl Into<String>) {
        self.tokens.push(Token::new(kind, value));
    }

    fn run(&mut self) -> Result<(), ParseError> {
        let mut i = 0;
        while let Some(c) = self.peek(i) {
            i = if c.is_whitespace() {
                i + 1
            } else if c.is_ascii_digit() {
                match self.peek(i + 1) {
                    Some(next) if next.is_alphabetic() && next != 'e' => self.identifier(i),
                    _ => self.number(i),
                }
            } else if c == '_' || c.is_alphabetic() {
                self.identifier(i)
            } else {
                self.symbol(i, c)?
            };
        }
        Ok(())
    }

    /// Lex an operator, punctuation or quoted literal starting at `i`.
    fn symbol(&mut self, i: usize, c: char) -> Result<usize, ParseError> {
        let single = |kind| (kind, 1usize);
        let (kind, width) = match c {
            ':' => single(TokenKind::Colon),
            '+' => single(TokenKind::Plus),
            '/' => single(TokenKind::Slash),
            '$' | '@' => {
                self.push(TokenKind::At, "$");
                return Ok(i + 1);
            }
            '%' => single(TokenKind::Mod),
            '^' => single(TokenKind::BitXor),
            '(' => single(TokenKind::LParen),
            ')' => single(TokenKind::RParen),
            '[' => single(TokenKind::LSqBracket),
            ']' => single(TokenKind::RSqBracket),
            '{' => single(TokenKind::LCurly),
            '}' => single(TokenKind::RCurly),
            '~' => single(TokenKind::Neg),
            ',' => single(TokenKind::Comma),
            '?' => single(TokenKind::Eroteme),
            '-' if self.next_is(i, '>') && self.next_is(i + 1, '>') => (TokenKind::DoubleArrow, 3),
            '-' if self.next_is(i, '>') => (TokenKind::Arrow, 2),
            '-' => single(TokenKind::Minus),
            '*' if self.next_is(i, '*') => (TokenKind::DoubleStar, 2),
            '*' => single(TokenKind::Star),
            '=' => {
                let width = if self.next_is(i, '=') { 2 } else { 1 };
                self.push(TokenKind::Eq, "==");
                return Ok(i + width);
            }
            '&' if self.next_is(i, '&') => (TokenKind::AndAnd, 2),
            '&' => single(TokenKind::BitAnd),
            '|' if self.next_is(i, '|') => (TokenKind::OrOr, 2),
            '|' => single(TokenKind::BitOr),
            '!' if self.next_is(i, '=') => (TokenKind::Ne, 2),
            '!' => single(TokenKind::Bang),
            '<' if self.next_is(i, '<') => (TokenKind::LShift, 2),
            '<' if self.next_is(i, '=') => (TokenKind::Le, 2),
            '<' => single(TokenKind::Lt),
            '>' if self.next_is(i, '>') => (TokenKind::RShift, 2),
            '>' if self.next_is(i, '=') => (TokenKind::Ge, 2),
            '>' => single(TokenKind::Gt),
            '.' if self.next_is(i, '*') => (TokenKind::DotStar, 2),
            '.' if self.peek(i + 1).is_some_and(|n| n.is_ascii_digit()) => {
                return Ok(self.number(i));
            }
            '.' => single(TokenKind::Dot),
            '"' | '\'' | '`' => return self.quoted(i, c),
            _ => return Err(ParseError::at(i, format!("Can't parse at pos: {i}"))),
        };
        let text: String = self.chars[i..i + width].iter().collect();
        self.push(kind, text);
        Ok(i + width)
    }

    /// Lex a quoted string (`"`/`'`) or quoted identifier (`` ` ``).
    ///
    /// A backslash or a doubled quote escapes the following character.
    fn quoted(&mut self, start: usize, quote: char) -> Result<usize, ParseError> {
        let unterminated =
            || ParseError::at(start, format!("Unterminated string starting at {start}"));
        let mut value = String::new();
        let mut i = start + 1;
        loop {
            let c = self.peek(i).ok_or_else(unterminated)?;
            if c == quote && !self.next_is(i, quote) {
                break;
            }
            if c == '\\' || c == quote {
                i += 1;
            }
            value.push(self.peek(i).ok_or_else(unterminated)?);
            i += 1;
        }
        let kind = if quote == '`' {
            TokenKind::Ident
        } else {
            TokenKind::LString
        };
        self.push(kind, value);
        Ok(i + 1)
    }

    /// Lex an integer or double starting at a digit or `.`.
    ///
    /// An exponent marker followed by a letter turns the whole run into an
    /// identifier (`1each`).
    fn number(&mut self, start: usize) -> usize {
        let mut is_int = true;
        let mut i = start;
        while let Some(c) = self.peek(i) {
            if c == '.' {
                is_int = false;
            } else if c == 'e' || c == 'E' {
                is_int = false;
                if self.next_is(i, '-') || self.next_is(i, '+') {
                    i += 1;
                } else if self.peek(i + 1).is_some_and(char::is_alphabetic) {
                    return self.identifier(start);
                }
            } else if !c.is_ascii_digit() {
                break;
            }
            i += 1;
        }
        let text: String = self.chars[start..i].iter().collect();
        let kind = if is_int {
            TokenKind::LNumInt
        } else {
            TokenKind::LNumDouble
        };
        self.push(kind, text);
        i
    }

    /// Lex an identifier or reserved word starting at `start`.
    fn identifier(&mut self, start: usize) -> usize {
        let mut end = start;
        while self.peek(end).is_some_and(is_ident_char) {
            end += 1;
        }
        let text: String = self.chars[start..end].iter().collect();
        let lower = text.to_lowercase();
        match reserved_word(&lower) {
            Some(TokenKind::And) => self.push(TokenKind::And, "&&"),
            Some(TokenKind::Or) => self.push(TokenKind::Or, "||"),
            Some(_) if is_function_name(&lower) && self.peek(end) == Some('(') => {
                self.push(TokenKind::Ident, text);
            }
            Some(kind) => self.push(kind, lower),
            None => self.push(TokenKind::Ident, text),
        }
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn values(input: &str) -> Vec<String> {
        lex(input).unwrap().into_iter().map(|t| t.value).collect()
    }

    // ==================== Operators ====================

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            kinds("a = b == c != d < e <= f > g >= h"),
            vec![
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Ident,
                TokenKind::Ne,
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Le,
                TokenKind::Ident,
                TokenKind::Gt,
                TokenKind::Ident,
                TokenKind::Ge,
                TokenKind::Ident,
            ]
        );
        assert_eq!(values("a = b")[1], "==");
    }

    #[test]
    fn test_multi_char_symbols() {
        assert_eq!(
            kinds("-> ->> ** .* << >> && ||"),
            vec![
                TokenKind::Arrow,
                TokenKind::DoubleArrow,
                TokenKind::DoubleStar,
                TokenKind::DotStar,
                TokenKind::LShift,
                TokenKind::RShift,
                TokenKind::AndAnd,
                TokenKind::OrOr,
            ]
        );
    }

    #[test]
    fn test_document_marker() {
        assert_eq!(kinds("$.a"), vec![TokenKind::At, TokenKind::Dot, TokenKind::Ident]);
        assert_eq!(kinds("@.a"), vec![TokenKind::At, TokenKind::Dot, TokenKind::Ident]);
    }

    // ==================== Reserved Words ====================

    #[test]
    fn test_reserved_words_normalised() {
        let tokens = lex("a AND b Or c DiV d").unwrap();
        assert_eq!(tokens[1], Token::new(TokenKind::And, "&&"));
        assert_eq!(tokens[3], Token::new(TokenKind::Or, "||"));
        assert_eq!(tokens[5], Token::new(TokenKind::Slash, "div"));
    }

    #[test]
    fn test_function_named_reserved_words() {
        let tokens = lex("year(x) + year").unwrap();
        assert_eq!(tokens[0], Token::new(TokenKind::Ident, "year"));
        assert_eq!(tokens[5], Token::new(TokenKind::IntervalUnit, "year"));

        // Only an immediately following paren counts
        assert_eq!(kinds("hour (x)")[0], TokenKind::IntervalUnit);
        assert_eq!(kinds("Date(x)")[0], TokenKind::Ident);
        assert_eq!(values("Date(x)")[0], "Date");
    }

    // ==================== Numbers ====================

    #[test]
    fn test_numbers() {
        assert_eq!(lex("42").unwrap()[0], Token::new(TokenKind::LNumInt, "42"));
        assert_eq!(lex("1e1").unwrap()[0], Token::new(TokenKind::LNumDouble, "1e1"));
        assert_eq!(lex("12e-4").unwrap()[0], Token::new(TokenKind::LNumDouble, "12e-4"));
        assert_eq!(lex(".10").unwrap()[0], Token::new(TokenKind::LNumDouble, ".10"));
        assert_eq!(lex("1.1.1").unwrap()[0], Token::new(TokenKind::LNumDouble, "1.1.1"));
    }

    #[test]
    fn test_digit_led_identifiers() {
        assert_eq!(lex("1address").unwrap()[0], Token::new(TokenKind::Ident, "1address"));
        assert_eq!(lex("1each").unwrap()[0], Token::new(TokenKind::Ident, "1each"));
    }

    // ==================== Quoting ====================

    #[test]
    fn test_quoted_strings() {
        assert_eq!(
            lex(r#""with \" quote""#).unwrap()[0],
            Token::new(TokenKind::LString, "with \" quote")
        );
        assert_eq!(
            lex("'two quotes to one'''").unwrap()[0],
            Token::new(TokenKind::LString, "two quotes to one'")
        );
        assert_eq!(lex("``").unwrap()[0], Token::new(TokenKind::Ident, ""));
        assert_eq!(
            lex("`ident```").unwrap()[0],
            Token::new(TokenKind::Ident, "ident`")
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("x = \"xyz").unwrap_err();
        assert_eq!(err.message, "Unterminated string starting at 4");
        assert_eq!(err.position, Some(4));
    }

    #[test]
    fn test_unknown_character() {
        let err = lex("a # b").unwrap_err();
        assert_eq!(err.message, "Can't parse at pos: 2");
    }

    #[test]
    fn test_token_display() {
        let tokens = lex("a = :a").unwrap();
        assert_eq!(tokens[0].to_string(), "IDENT(a)");
        assert_eq!(tokens[1].to_string(), "EQ");
        assert_eq!(tokens[2].to_string(), "COLON");
    }
}
