//! Embedded-JSON locator.
//!
//! Works on the file content with all whitespace removed, so formatting and
//! indentation never affect the marker search. The located fragment is
//! whitespace-free as a consequence, including inside string literals.

use std::path::Path;

use super::{BraceMatching, ScanError};

/// Markers tried in order.
pub const MARKERS: [&str; 2] = ["\"mcpServers\":{", "\"mcp\":{\"servers\":{"];

/// Remove space, tab, newline and carriage return.
///
/// Carriage returns are stripped too so CRLF files match the same markers as
/// LF files (`"mcpServers":\r\n{` is found).
pub fn strip_whitespace(content: &str) -> String {
    content
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .collect()
}

/// Find the first composition fragment in `content`.
///
/// Returns `Ok(None)` when no marker is present. The fragment starts at the
/// marker, or one byte earlier when the marker is directly preceded by `{`,
/// and ends at the brace that brings the running balance back to zero.
pub fn locate(
    content: &str,
    path: &Path,
    matching: BraceMatching,
) -> Result<Option<String>, ScanError> {
    let stripped = strip_whitespace(content);

    let Some(mut start) = MARKERS.iter().find_map(|marker| stripped.find(marker)) else {
        return Ok(None);
    };

    if start > 0 && stripped.as_bytes()[start - 1] == b'{' {
        start -= 1;
    }

    match matching_close(&stripped.as_bytes()[start..], matching) {
        Some(offset) => Ok(Some(stripped[start..=start + offset].to_string())),
        None => {
            tracing::error!(path = %path.display(), "Malformed JSON: unclosed brackets");
            Err(ScanError::unclosed(path, &stripped[start..]))
        }
    }
}

/// Offset of the closing brace for a fragment whose first byte opens it.
///
/// The balance starts at one and counting begins at the second byte, so the
/// first byte is always treated as an opener even when the fragment starts
/// at the marker's quote. In that case the string-aware matcher starts
/// inside the key literal.
fn matching_close(fragment: &[u8], matching: BraceMatching) -> Option<usize> {
    let mut balance: usize = 1;
    let mut in_string = matching == BraceMatching::StringAware && fragment.first() == Some(&b'"');
    let mut escaped = false;

    for (offset, &byte) in fragment.iter().enumerate().skip(1) {
        if matching == BraceMatching::StringAware {
            if in_string {
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                }
                continue;
            }
            if byte == b'"' {
                in_string = true;
                continue;
            }
        }

        match byte {
            b'{' => balance += 1,
            b'}' => {
                balance -= 1;
                if balance == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }

    None
}
