//! Lenient JSON recovery.
//!
//! A strict parse is tried first. When it fails, a fixed chain of textual
//! repairs is applied and the result parsed again; as a last resort backslash
//! escapes are resolved as if the fragment had been lifted out of a source
//! code string literal. Each repair is a pure `&str -> String` function that
//! leaves string literals untouched.

use std::path::Path;

use serde_json::Value;

use super::ScanError;

/// Parse a located fragment, repairing it if needed.
///
/// `content` is the full original file and is only used as error context.
pub fn parse_lenient(fragment: &str, path: &Path, content: &str) -> Result<Value, ScanError> {
    let strict_error = match serde_json::from_str::<Value>(fragment) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    tracing::debug!(path = %path.display(), error = %strict_error, "Strict parse failed, repairing");

    let repaired = repair(fragment);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => {
            tracing::info!(path = %path.display(), "Recovered composition after textual repair");
            return Ok(value);
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Repaired fragment still invalid");
        }
    }

    match serde_json::from_str::<Value>(&unescape_raw_literal(&repaired)) {
        Ok(value) => {
            tracing::info!(path = %path.display(), "Recovered composition as raw string literal");
            Ok(value)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to parse MCP composition JSON");
            Err(ScanError::unparseable(path, &e.to_string(), content))
        }
    }
}

/// The textual repair chain, in application order.
pub fn repair(fragment: &str) -> String {
    fill_missing_values(&strip_trailing_commas(&strip_comments(fragment)))
}

// ============================================================================
// Repairs
// ============================================================================

/// Remove `//`, `#` and `/* */` comments outside string literals.
///
/// Line comments end at a newline or right before the next `"`, `{`, `}`,
/// `[` or `]`; located fragments have no newlines, so the structural
/// characters are what terminate an inline comment.
pub fn strip_comments(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' => i = copy_string(&chars, i, &mut out),
            '/' if chars.get(i + 1) == Some(&'*') => {
                i = find_block_end(&chars, i + 2);
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                i = find_line_comment_end(&chars, i + 2);
            }
            '#' => i = find_line_comment_end(&chars, i + 1),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Drop a `,` whose next non-whitespace character closes an object or array.
pub fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' => i = copy_string(&chars, i, &mut out),
            ',' if matches!(next_significant(&chars, i + 1), Some('}' | ']')) => i += 1,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Fill in values that were left out of placeholder configurations.
///
/// - `"KEY":,` and `"KEY":}` get `null`
/// - a key followed directly by `,` or `}` gets `:null`
/// - a bare token that is not `true`, `false`, `null` or a number is quoted,
///   unless it carries a single quote at either end; those are left as they
///   are so a single-quoted fragment still fails to parse
pub fn fill_missing_values(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut containers: Vec<char> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let is_key = at_key_position(&containers, &out);
                i = copy_string(&chars, i, &mut out);
                if is_key {
                    close_dangling_key(&chars, i, &mut out);
                }
            }
            '{' | '[' => {
                containers.push(c);
                out.push(c);
                i += 1;
            }
            '}' | ']' | ',' => {
                if last_significant(&out) == Some(':') {
                    out.push_str("null");
                }
                if c != ',' {
                    containers.pop();
                }
                out.push(c);
                i += 1;
            }
            ':' => {
                out.push(c);
                i += 1;
            }
            c if c.is_whitespace() => {
                out.push(c);
                i += 1;
            }
            _ => {
                let is_key = at_key_position(&containers, &out);
                let end = token_end(&chars, i);
                let token: String = chars[i..end].iter().collect();
                if is_json_literal(&token) || is_single_quoted(&token) {
                    out.push_str(&token);
                } else {
                    out.push_str(&Value::String(token).to_string());
                }
                i = end;
                if is_key {
                    close_dangling_key(&chars, i, &mut out);
                }
            }
        }
    }

    out
}

/// Resolve backslash escapes the way a raw source string literal would.
///
/// Known escapes: `\\ \' \" \n \r \t \xNN \uNNNN`. Anything else, including a
/// malformed hex escape, is kept verbatim.
pub fn unescape_raw_literal(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let simple = match chars.get(i + 1) {
            Some('\\') => Some('\\'),
            Some('\'') => Some('\''),
            Some('"') => Some('"'),
            Some('n') => Some('\n'),
            Some('r') => Some('\r'),
            Some('t') => Some('\t'),
            _ => None,
        };
        if let Some(resolved) = simple {
            out.push(resolved);
            i += 2;
            continue;
        }

        let hex_width = match chars.get(i + 1) {
            Some('x') => 2,
            Some('u') => 4,
            _ => 0,
        };
        if let Some(resolved) = hex_char(&chars, i + 2, hex_width) {
            out.push(resolved);
            i += 2 + hex_width;
            continue;
        }

        out.push('\\');
        i += 1;
    }

    out
}

// ============================================================================
// Scanning helpers
// ============================================================================

/// Copy a string literal starting at the opening quote; returns the index
/// after the closing quote (or the end of input if it never closes).
fn copy_string(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push(chars[start]);
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        if c == '\\' {
            if let Some(&next) = chars.get(i) {
                out.push(next);
                i += 1;
            }
        } else if c == '"' {
            break;
        }
    }
    i
}

fn find_block_end(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}

fn find_line_comment_end(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|c| matches!(c, '\n' | '"' | '{' | '}' | '[' | ']'))
        .map_or(chars.len(), |offset| from + offset)
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}

fn last_significant(out: &str) -> Option<char> {
    out.chars().rev().find(|c| !c.is_whitespace())
}

fn at_key_position(containers: &[char], out: &str) -> bool {
    containers.last() == Some(&'{') && matches!(last_significant(out), Some('{' | ','))
}

fn close_dangling_key(chars: &[char], from: usize, out: &mut String) {
    if matches!(next_significant(chars, from), Some(',' | '}')) {
        out.push_str(":null");
    }
}

fn token_end(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|c| c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | ',' | ':' | '"'))
        .map_or(chars.len(), |offset| from + offset)
}

fn is_json_literal(token: &str) -> bool {
    matches!(token, "true" | "false" | "null") || token.parse::<serde_json::Number>().is_ok()
}

fn is_single_quoted(token: &str) -> bool {
    token.starts_with('\'') || token.ends_with('\'')
}

fn hex_char(chars: &[char], from: usize, width: usize) -> Option<char> {
    if width == 0 || from + width > chars.len() {
        return None;
    }
    let digits: String = chars[from..from + width].iter().collect();
    let code = u32::from_str_radix(&digits, 16).ok()?;
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(fragment: &str) -> Result<Value, ScanError> {
        parse_lenient(fragment, Path::new("config.md"), fragment)
    }

    #[test]
    fn test_valid_json_is_not_repaired() {
        // A `#` inside a string would be eaten by the comment stripper.
        let fragment = r##"{"mcpServers":{"a":{"command":"npx","args":["#tag"]}}}"##;
        let value = parse(fragment).unwrap();
        assert_eq!(value["mcpServers"]["a"]["args"][0], "#tag");
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments(r#"{"a":1,//note"b":2}"#), r#"{"a":1,"b":2}"#);
        assert_eq!(strip_comments(r#"{"a":1#note}"#), r#"{"a":1}"#);
        assert_eq!(strip_comments(r#"{/*x*/"a":1}"#), r#"{"a":1}"#);
        assert_eq!(
            strip_comments("{\"a\":1 // tail\n}"),
            "{\"a\":1 \n}"
        );
    }

    #[test]
    fn test_strip_comments_leaves_strings_alone() {
        let input = r#"{"url":"https://x.dev/#top","glob":"/*.rs"}"#;
        assert_eq!(strip_comments(input), input);
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(strip_trailing_commas(r#"{"a":[1,2,],}"#), r#"{"a":[1,2]}"#);
        assert_eq!(strip_trailing_commas("{\"a\":1,\n}"), "{\"a\":1\n}");
        assert_eq!(strip_trailing_commas(r#"{"a":",}"}"#), r#"{"a":",}"}"#);
    }

    #[test]
    fn test_fill_missing_values() {
        assert_eq!(
            fill_missing_values(r#"{"A":,"B":}"#),
            r#"{"A":null,"B":null}"#
        );
        assert_eq!(
            fill_missing_values(r#"{"A","B":1,"C"}"#),
            r#"{"A":null,"B":1,"C":null}"#
        );
        assert_eq!(
            fill_missing_values(r#"{"A":XXXX,"B":-1.5e3,"C":true}"#),
            r#"{"A":"XXXX","B":-1.5e3,"C":true}"#
        );
    }

    #[test]
    fn test_fill_does_not_touch_array_strings() {
        let input = r#"{"args":["a","b"]}"#;
        assert_eq!(fill_missing_values(input), input);
    }

    #[test]
    fn test_quoted_token_is_escaped() {
        assert_eq!(
            fill_missing_values(r#"{"p":C\bin}"#),
            r#"{"p":"C\\bin"}"#
        );
    }

    #[test]
    fn test_single_quoted_tokens_are_left_alone() {
        assert_eq!(
            fill_missing_values("{\"args\":['-y','pkg']}"),
            "{\"args\":['-y','pkg']}"
        );
    }

    #[test]
    fn test_single_quoted_values_are_unparseable() {
        let fragment = "{\"mcpServers\":{\"s\":{\"command\":'npx',\"args\":['-y','pkg']}}}";
        let err = parse(fragment).unwrap_err();
        assert!(
            err.error_message
                .starts_with("Failed to parse MCP composition JSON: ")
        );
    }

    #[test]
    fn test_unescape_raw_literal() {
        assert_eq!(unescape_raw_literal(r"it\'s"), "it's");
        assert_eq!(unescape_raw_literal(r"\x2dy"), "-y");
        assert_eq!(unescape_raw_literal(r"\u00e9"), "\u{e9}");
        assert_eq!(unescape_raw_literal(r"a\qb"), r"a\qb");
        assert_eq!(unescape_raw_literal(r"\xZZ"), r"\xZZ");
        assert_eq!(unescape_raw_literal(r"\\"), r"\");
    }

    #[test]
    fn test_recovers_trailing_commas_and_comments() {
        let fragment = r#"{"mcpServers":{"t":{"command":"thirdweb-mcp","args":[],//add`--chain-id`optionally"env":{"K":"v",},}}}"#;
        let value = parse(fragment).unwrap();
        assert_eq!(
            value,
            json!({"mcpServers": {"t": {"command": "thirdweb-mcp", "args": [], "env": {"K": "v"}}}})
        );
    }

    #[test]
    fn test_recovers_raw_literal_escapes() {
        let fragment = r#"{"mcpServers":{"a":{"command":"npx","args":["\x2dy","it\'s"]}}}"#;
        let value = parse(fragment).unwrap();
        assert_eq!(value["mcpServers"]["a"]["args"], json!(["-y", "it's"]));
    }

    #[test]
    fn test_unrecoverable_reports_full_content() {
        let content = "docs before\n{\"mcpServers\":{\"a\":{\"command\":\"npx\"]}}\ndocs after";
        let fragment = r#"{"mcpServers":{"a":{"command":"npx"]}}"#;
        let err = parse_lenient(fragment, Path::new("README.md"), content).unwrap_err();
        assert!(
            err.error_message
                .starts_with("Failed to parse MCP composition JSON: ")
        );
        assert_eq!(err.json_config.as_deref(), Some(content));
        assert_eq!(err.filename.as_deref(), Some(Path::new("README.md")));
    }

    #[test]
    fn test_repair_is_deterministic() {
        let fragment = r#"{"mcpServers":{"a":{"command":"npx","env":{"K":,"L"}},}}"#;
        assert_eq!(repair(fragment), repair(fragment));
        assert_eq!(parse(fragment).unwrap(), parse(fragment).unwrap());
    }

    #[test]
    fn test_keeps_insertion_order() {
        let value = parse(r#"{"mcpServers":{"zeta":{},"alpha":{},}}"#).unwrap();
        let keys: Vec<_> = value["mcpServers"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
