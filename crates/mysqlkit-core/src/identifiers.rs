//! SQL identifier quoting.
//!
//! Two styles are needed: expression text only backquotes identifiers that
//! would not survive as bare names, while generated SQL always delimits.

use crate::config::CodecConfig;

/// Characters that force an expression identifier to be backquoted.
const UNSAFE_IDENT_CHARS: [char; 5] = ['`', '"', '\'', '$', '.'];

/// Quote an identifier for expression text.
///
/// The name is backquoted (with embedded backticks doubled) only when it
/// contains a quote character, `$` or `.`.
///
/// # Examples
///
/// ```
/// use mysqlkit_core::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "users");
/// assert_eq!(quote_identifier("ident`"), "`ident```");
/// assert_eq!(quote_identifier("a.b"), "`a.b`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    if name.contains(UNSAFE_IDENT_CHARS) {
        delimit_identifier(name)
    } else {
        name.to_string()
    }
}

/// Delimit an identifier using MySQL backtick quoting.
///
/// Embedded backticks are escaped by doubling them (`` ` `` → ``` `` ```).
///
/// # Examples
///
/// ```
/// use mysqlkit_core::delimit_identifier;
///
/// assert_eq!(delimit_identifier("users"), "`users`");
/// assert_eq!(delimit_identifier("user`name"), "`user``name`");
/// ```
#[inline]
pub fn delimit_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Delimit a possibly schema-qualified name.
///
/// The configured schema translation hook, when present, decides the final
/// name and the result is a single delimited identifier. Otherwise the
/// schema and name are delimited separately.
pub fn delimit_qualified_identifier(
    name: &str,
    schema: Option<&str>,
    config: &CodecConfig,
) -> String {
    if let Some(hook) = &config.schema_translation {
        return delimit_identifier(&hook.apply(name, schema));
    }
    match schema {
        Some(schema) => format!("{}.{}", delimit_identifier(schema), delimit_identifier(name)),
        None => delimit_identifier(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Expression Quoting Tests ====================

    #[test]
    fn test_quote_identifier_plain() {
        assert_eq!(quote_identifier("users"), "users");
        assert_eq!(quote_identifier("first name"), "first name");
        assert_eq!(quote_identifier(""), "");
    }

    #[test]
    fn test_quote_identifier_unsafe_chars() {
        assert_eq!(quote_identifier("a$b"), "`a$b`");
        assert_eq!(quote_identifier("a'b"), "`a'b`");
        assert_eq!(quote_identifier("a\"b"), "`a\"b`");
        assert_eq!(quote_identifier("ident`"), "`ident```");
    }

    // ==================== MySQL Backtick Tests ====================

    #[test]
    fn test_delimit_identifier_simple() {
        assert_eq!(delimit_identifier("users"), "`users`");
    }

    #[test]
    fn test_delimit_identifier_embedded_backtick() {
        assert_eq!(delimit_identifier("a`b`c"), "`a``b``c`");
    }

    #[test]
    fn test_delimit_identifier_empty() {
        assert_eq!(delimit_identifier(""), "``");
    }

    #[test]
    fn test_delimit_identifier_injection_attempt() {
        let malicious = "users`; DROP TABLE secrets; --";
        assert_eq!(
            delimit_identifier(malicious),
            "`users``; DROP TABLE secrets; --`"
        );
    }

    // ==================== Qualified Names ====================

    #[test]
    fn test_delimit_qualified_without_hook() {
        let config = CodecConfig::default();
        assert_eq!(
            delimit_qualified_identifier("blogs", Some("shop"), &config),
            "`shop`.`blogs`"
        );
        assert_eq!(delimit_qualified_identifier("blogs", None, &config), "`blogs`");
    }

    #[test]
    fn test_delimit_qualified_with_hook() {
        let config = CodecConfig::new().schema_translation(|name, schema| match schema {
            Some(schema) => format!("{schema}_{name}"),
            None => name.to_string(),
        });
        assert_eq!(
            delimit_qualified_identifier("blogs", Some("shop"), &config),
            "`shop_blogs`"
        );
        assert_eq!(delimit_qualified_identifier("blogs", None, &config), "`blogs`");
    }
}
