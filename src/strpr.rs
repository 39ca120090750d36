//! String classification and quoted-string extraction helpers used by the
//! literal parser, the directive parser and the instruction decoder.
//!
//! These are pure functions over byte slices: none of them touch the
//! compile cursor or the fault reporter, which keeps them trivially unit
//! testable in isolation.

/// `true` for the characters allowed inside a symbol or literal identifier:
/// `[0-9A-Za-z_.]`.
pub fn is_symbol_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'.'
}

/// `true` for horizontal tab and space.
pub fn is_whitespace(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// `true` for NUL, LF, CR and the two comment markers `;` and `#`.
pub fn is_line_end(c: u8) -> bool {
    matches!(c, 0 | b'\n' | b'\r' | b';' | b'#')
}

/// Advances `pos` past a run of whitespace, returning the index of the
/// first non-whitespace byte (which may be `src.len()`).
pub fn skip_whitespace(src: &[u8], mut pos: usize) -> usize {
    while pos < src.len() && is_whitespace(src[pos]) {
        pos += 1;
    }
    pos
}

/// Extracts a single- or double-quoted string literal starting at `src[0]`,
/// translating the escape set `\n \t \r \' \" \\`. Returns the unescaped
/// bytes and the length of source consumed (including both quotes), or
/// `None` if `src` does not begin with a quote, the quote is never closed,
/// or a raw control byte other than TAB appears inside the literal.
pub fn extract_string(src: &[u8]) -> Option<(Vec<u8>, usize)> {
    let quote = *src.first()?;
    if quote != b'\'' && quote != b'"' {
        return None;
    }

    let mut out = Vec::new();
    let mut i = 1usize;
    let mut escaped = false;
    loop {
        let c = *src.get(i)?;
        if c < 0x20 && c != b'\t' {
            // Only TAB is allowed unescaped among control bytes.
            return None;
        }

        if escaped {
            let unescaped = match c {
                b'n' => b'\n',
                b't' => b'\t',
                b'r' => b'\r',
                other => other, // covers \' \" \\ and anything else verbatim
            };
            out.push(unescaped);
            escaped = false;
        } else if c == quote {
            return Some((out, i + 1));
        } else if c == b'\\' {
            escaped = true;
        } else {
            out.push(c);
        }
        i += 1;
    }
}

/// Copies up to `dst_cap - 1` bytes from `src`, truncating if necessary.
/// Used by the pass-1 line reader to bound an overlong source line: the
/// result is always `dst_cap`-bounded and the caller learns whether
/// truncation occurred.
pub fn bounded_copy(src: &[u8], dst_cap: usize) -> (Vec<u8>, bool) {
    if dst_cap == 0 {
        return (Vec::new(), !src.is_empty());
    }
    let max = dst_cap - 1;
    if src.len() <= max {
        (src.to_vec(), false)
    } else {
        (src[..max].to_vec(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_chars() {
        assert!(is_symbol_char(b'a'));
        assert!(is_symbol_char(b'Z'));
        assert!(is_symbol_char(b'9'));
        assert!(is_symbol_char(b'_'));
        assert!(is_symbol_char(b'.'));
        assert!(!is_symbol_char(b'-'));
        assert!(!is_symbol_char(b' '));
    }

    #[test]
    fn whitespace_and_end() {
        assert!(is_whitespace(b' '));
        assert!(is_whitespace(b'\t'));
        assert!(!is_whitespace(b'\n'));
        assert!(is_line_end(b';'));
        assert!(is_line_end(b'#'));
        assert!(is_line_end(0));
        assert!(!is_line_end(b'a'));
    }

    #[test]
    fn skip_whitespace_advances() {
        assert_eq!(skip_whitespace(b"   abc", 0), 3);
        assert_eq!(skip_whitespace(b"abc", 0), 0);
    }

    #[test]
    fn extract_simple_string() {
        let (s, len) = extract_string(b"\"hello\"\0").unwrap();
        assert_eq!(s, b"hello");
        assert_eq!(len, 7);
    }

    #[test]
    fn extract_string_round_trips_printable_ascii_without_backslash() {
        let body = b"Hello, RRPGE! 123";
        let mut quoted = Vec::new();
        quoted.push(b'"');
        quoted.extend_from_slice(body);
        quoted.push(b'"');
        quoted.push(0);
        let (s, _) = extract_string(&quoted).unwrap();
        assert_eq!(s, body);
    }

    #[test]
    fn extract_string_handles_escapes() {
        let (s, _) = extract_string(b"'a\\nb\\tc\\\\d'\0").unwrap();
        assert_eq!(s, b"a\nb\tc\\d");
    }

    #[test]
    fn extract_string_rejects_unterminated() {
        assert!(extract_string(b"\"abc\0").is_none());
    }

    #[test]
    fn extract_string_rejects_control_bytes() {
        assert!(extract_string(b"\"a\x01b\"\0").is_none());
    }

    #[test]
    fn extract_string_rejects_non_quote() {
        assert!(extract_string(b"abc\0").is_none());
    }

    #[test]
    fn bounded_copy_truncates() {
        let (v, truncated) = bounded_copy(b"abcdef", 4);
        assert_eq!(v, b"abc");
        assert!(truncated);
        let (v, truncated) = bounded_copy(b"ab", 4);
        assert_eq!(v, b"ab");
        assert!(!truncated);
    }
}
