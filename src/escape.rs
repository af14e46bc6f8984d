//! ODBC escape sequence rewriting.
//!
//! Translates `{d ...}`, `{ts ...}`, `{t ...}`, `{oj ...}` and `{fn ...}`
//! escapes into ClickHouse SQL. Escapes nest; inner ones are rewritten first.
//! Text inside quotes is copied verbatim, and so is anything that is not a
//! recognized, well-formed escape.

use crate::types::catalog;

/// Rewrite all escape sequences in `query`.
pub fn rewrite(query: &str) -> String {
    let bytes = query.as_bytes();
    let mut out = String::with_capacity(query.len());
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => {
                i += 2;
                continue;
            }
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if matches!(b, b'\'' | b'"' | b'`') => quote = Some(b),
            None if b == b'{' => {
                if let Some(end) = matching_brace(bytes, i) {
                    out.push_str(&query[start..i]);
                    out.push_str(&rewrite_escape(&query[i + 1..end]));
                    i = end + 1;
                    start = i;
                    continue;
                }
            }
            None => {}
        }
        i += 1;
    }
    out.push_str(&query[start.min(query.len())..]);
    out
}

/// Index of the `}` closing the `{` at `open`, skipping quoted text.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

fn rewrite_escape(inner: &str) -> String {
    let inner = rewrite(inner);
    let trimmed = inner.trim_start();
    let keyword_len = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let keyword = trimmed[..keyword_len].to_ascii_lowercase();
    let body = trimmed[keyword_len..].trim();

    let rewritten = match keyword.as_str() {
        "d" if is_literal(body) => Some(format!("toDate({})", body)),
        "ts" if is_literal(body) => Some(format!("toDateTime({})", drop_fraction(body))),
        "t" if is_literal(body) => Some(body.to_string()),
        "oj" => Some(body.to_string()),
        "fn" => rewrite_function(body),
        _ => None,
    };
    rewritten.unwrap_or_else(|| format!("{{{}}}", inner))
}

fn is_literal(body: &str) -> bool {
    body.len() >= 2 && body.starts_with('\'') && body.ends_with('\'')
}

/// `'2024-01-02 03:04:05.123'` becomes `'2024-01-02 03:04:05'`.
fn drop_fraction(literal: &str) -> String {
    let value = &literal[1..literal.len() - 1];
    match value.rfind('.') {
        Some(dot) if value[dot + 1..].bytes().all(|b| b.is_ascii_digit()) => {
            format!("'{}'", &value[..dot])
        }
        _ => literal.to_string(),
    }
}

fn rewrite_function(body: &str) -> Option<String> {
    let name_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let name = body[..name_len].to_ascii_uppercase();
    let rest = body[name_len..].trim_start();

    let args = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .map(split_args);

    match (name.as_str(), args.as_deref()) {
        ("CONVERT", Some([value, target])) => {
            catalog::convertible_type(target).map(|t| format!("to{}({})", t, value))
        }
        ("LOCATE", Some([needle, haystack])) => {
            Some(format!("positionUTF8({}, {})", haystack, needle))
        }
        ("LOCATE", Some([needle, haystack, from])) => {
            Some(format!("positionUTF8({}, {}, {})", haystack, needle, from))
        }
        _ => Some(match function_name(&name) {
            Some(mapped) => format!("{}{}", mapped, rest),
            None => body.to_string(),
        }),
    }
}

fn function_name(name: &str) -> Option<&'static str> {
    let mapped = match name {
        "ABS" => "abs",
        "CEILING" => "ceil",
        "FLOOR" => "floor",
        "ROUND" => "round",
        "TRUNCATE" => "trunc",
        "SQRT" => "sqrt",
        "EXP" => "exp",
        "LOG" => "log",
        "LOG10" => "log10",
        "POWER" => "pow",
        "MOD" => "modulo",
        "PI" => "pi",
        "RAND" => "rand",
        "SIGN" => "sign",
        "CONCAT" => "concat",
        "LENGTH" | "CHAR_LENGTH" | "CHARACTER_LENGTH" => "lengthUTF8",
        "OCTET_LENGTH" => "length",
        "LCASE" => "lowerUTF8",
        "UCASE" => "upperUTF8",
        "LTRIM" => "trimLeft",
        "RTRIM" => "trimRight",
        "SUBSTRING" => "substringUTF8",
        "REPLACE" => "replaceAll",
        "CURDATE" | "CURRENT_DATE" => "today",
        "NOW" | "CURRENT_TIMESTAMP" => "now",
        "YEAR" => "toYear",
        "QUARTER" => "toQuarter",
        "MONTH" => "toMonth",
        "WEEK" => "toISOWeek",
        "DAYOFMONTH" => "toDayOfMonth",
        "DAYOFWEEK" => "toDayOfWeek",
        "DAYOFYEAR" => "toDayOfYear",
        "HOUR" => "toHour",
        "MINUTE" => "toMinute",
        "SECOND" => "toSecond",
        "IFNULL" => "ifNull",
        "DATABASE" => "currentDatabase",
        "USER" => "currentUser",
        _ => return None,
    };
    Some(mapped)
}

/// Split a call's argument list on top-level commas.
fn split_args(args: &str) -> Vec<&str> {
    let bytes = args.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' => depth += 1,
                b')' => depth -= 1,
                b',' if depth == 0 => {
                    parts.push(args[start..i].trim());
                    start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }
    parts.push(args[start.min(args.len())..].trim());
    parts
}
