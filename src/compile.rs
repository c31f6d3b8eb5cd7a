//! Named-query compilation: `:name` placeholders → positional markers.
//!
//! A single left-to-right scan rewrites each placeholder to `?` and
//! collects the names in first-to-last occurrence order, duplicates
//! preserved. That name list is what fixes positional argument order for
//! the lifetime of the statement; it must never be permuted afterwards.

use crate::error::{Error, Result};

/// The positional marker substituted for each placeholder.
const BIND_MARKER: char = '?';

/// A compiled named query: rewritten statement plus ordered name list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub stmt: String,
    pub names: Vec<String>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Compiles a query containing `:name` placeholders.
///
/// Placeholder names may contain ASCII letters, digits, `_` and `.`.
/// `::` escapes to a literal colon and opens no name. A query without a
/// single colon is rejected as not a named query.
///
/// # Errors
///
/// Returns [`Error::Compile`] with the byte offset of the offending
/// colon for a colon inside a name, a bare colon not followed by a name
/// character, or a colon at the end of input.
///
/// # Examples
///
/// ```
/// use cql_named_bind::compile::compile;
///
/// let q = compile("SELECT * FROM t WHERE a = :x AND b = :y")?;
/// assert_eq!(q.stmt, "SELECT * FROM t WHERE a = ? AND b = ?");
/// assert_eq!(q.names, vec!["x", "y"]);
/// # Ok::<(), cql_named_bind::Error>(())
/// ```
pub fn compile(query: &str) -> Result<CompiledQuery> {
    if !query.contains(':') {
        return Err(Error::compile(0, "statement has no named parameters"));
    }

    let mut stmt = String::with_capacity(query.len());
    let mut names = Vec::new();
    let mut name = String::new();
    let mut in_name = false;
    let mut prev_colon = false;

    for (offset, c) in query.char_indices() {
        let is_last = offset + c.len_utf8() == query.len();
        if c == ':' {
            if in_name && prev_colon {
                // second half of a `::` escape
                stmt.push(':');
                in_name = false;
            } else if in_name {
                return Err(Error::compile(
                    offset,
                    "unexpected `:` while reading named parameter",
                ));
            } else {
                in_name = true;
                name.clear();
            }
        } else if in_name && is_name_char(c) && !is_last {
            name.push(c);
        } else if in_name {
            in_name = false;
            if is_last && is_name_char(c) {
                name.push(c);
            }
            if name.is_empty() {
                return Err(Error::compile(
                    offset,
                    "`:` must be followed by a parameter name",
                ));
            }
            names.push(std::mem::take(&mut name));
            stmt.push(BIND_MARKER);
            // re-emit the terminating character unless it joined the name
            if !is_last || !is_name_char(c) {
                stmt.push(c);
            }
        } else {
            stmt.push(c);
        }
        prev_colon = c == ':';
    }

    if in_name {
        // a lone `:` as the final byte never opened a name
        return Err(Error::compile(
            query.len() - 1,
            "`:` must be followed by a parameter name",
        ));
    }

    Ok(CompiledQuery { stmt, names })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn offset_of(err: Error) -> usize {
        match err {
            Error::Compile { offset, .. } => offset,
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn test_compile_two_params() {
        let q = compile("SELECT * FROM t WHERE a=:x AND b=:y").unwrap();
        assert_eq!(q.stmt, "SELECT * FROM t WHERE a=? AND b=?");
        assert_eq!(q.names, vec!["x", "y"]);
    }

    #[test]
    fn test_compile_repeated_params_preserve_duplicates() {
        let q = compile("SELECT * FROM t WHERE a=:id OR b=:id").unwrap();
        assert_eq!(q.stmt, "SELECT * FROM t WHERE a=? OR b=?");
        assert_eq!(q.names, vec!["id", "id"]);
    }

    #[test]
    fn test_compile_trailing_name_not_dropped() {
        let q = compile("UPDATE t SET a=1 WHERE id=:id").unwrap();
        assert_eq!(q.stmt, "UPDATE t SET a=1 WHERE id=?");
        assert_eq!(q.names, vec!["id"]);
    }

    #[test]
    fn test_compile_name_with_underscore_and_dot() {
        let q = compile("SELECT :user_id, :t.col FROM t").unwrap();
        assert_eq!(q.stmt, "SELECT ?, ? FROM t");
        assert_eq!(q.names, vec!["user_id", "t.col"]);
    }

    #[test]
    fn test_compile_double_colon_escapes() {
        let q = compile("a::b").unwrap();
        assert_eq!(q.stmt, "a:b");
        assert_eq!(q.names, Vec::<String>::new());
    }

    #[test]
    fn test_compile_escape_then_placeholder() {
        let q = compile("SELECT a::int, :x FROM t").unwrap();
        assert_eq!(q.stmt, "SELECT a:int, ? FROM t");
        assert_eq!(q.names, vec!["x"]);
    }

    #[test]
    fn test_compile_no_colon_rejected() {
        assert!(compile("SELECT * FROM t").is_err());
    }

    #[test]
    fn test_compile_colon_inside_name_reports_offset() {
        let err = compile("SELECT :a:b FROM t").unwrap_err();
        assert_eq!(offset_of(err), 9);
    }

    #[test]
    fn test_compile_bare_colon_before_non_name_char() {
        let err = compile("SELECT : FROM t").unwrap_err();
        assert_eq!(offset_of(err), 8);
    }

    #[test]
    fn test_compile_trailing_bare_colon() {
        let err = compile("SELECT a FROM t WHERE b = :").unwrap_err();
        assert_eq!(offset_of(err), 26);
    }

    #[test]
    fn test_compile_multibyte_text_untouched() {
        let q = compile("INSERT INTO t (désc) VALUES (:d)").unwrap();
        assert_eq!(q.stmt, "INSERT INTO t (désc) VALUES (?)");
        assert_eq!(q.names, vec!["d"]);
    }
}
