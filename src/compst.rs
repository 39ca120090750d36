//! The compile cursor: current file/line/column plus the buffered copy of
//! the current source line and the last-seen global label (for local-label
//! expansion).

use crate::strpr;

const SYMBOL_MAX: usize = 32;

/// Tracks where the compiler currently is in the source, and the text of
/// the line being processed.
#[derive(Debug, Default)]
pub struct Cursor {
    file: String,
    line: u32,
    column: u32,
    /// Always NUL-terminated so callers scanning with `strpr::is_line_end`
    /// have a guaranteed stopping byte even past a truncated copy.
    source_line: Vec<u8>,
    last_global: String,
}

impl Cursor {
    pub fn new() -> Self {
        Cursor {
            file: String::new(),
            line: 0,
            column: 0,
            source_line: vec![0],
            last_global: String::new(),
        }
    }

    /// Resets line/column and sets the active file name.
    pub fn set_file(&mut self, file: &str) {
        self.file = file.to_string();
        self.line = 0;
        self.column = 0;
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Resets column and sets the active line number.
    pub fn set_line(&mut self, line: u32) {
        self.line = line;
        self.column = 0;
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn set_column(&mut self, column: u32) {
        self.column = column;
    }

    pub fn advance_column(&mut self, delta: u32) {
        self.column += delta;
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Copies in a new source line, resetting the column. A trailing NUL is
    /// always appended.
    pub fn set_source_line(&mut self, line: &[u8]) {
        self.source_line.clear();
        self.source_line.extend_from_slice(line);
        self.source_line.push(0);
        self.column = 0;
    }

    /// The full buffered source line, including its trailing NUL sentinel.
    pub fn source_line(&self) -> &[u8] {
        &self.source_line
    }

    /// The source line starting at the current column.
    pub fn remaining(&self) -> &[u8] {
        let at = (self.column as usize).min(self.source_line.len().saturating_sub(1));
        &self.source_line[at..]
    }

    /// `true` once the buffered line is empty (just the NUL sentinel) —
    /// used together with the underlying reader's EOF flag to detect true
    /// end of file without skipping the final line.
    pub fn at_blank_line(&self) -> bool {
        self.source_line.first() == Some(&0)
    }

    /// Copies a symbol name starting at `src`, expanding a leading `.`
    /// local-label marker by prefixing the last global label. Returns the
    /// expanded name and the length of `src` consumed (not counting the
    /// prefix).
    pub fn copy_symbol(&self, src: &[u8]) -> (String, usize) {
        let mut out = Vec::new();
        if src.first() == Some(&b'.') {
            out.extend_from_slice(self.last_global.as_bytes());
        }
        let mut i = 0;
        while i < src.len() && strpr::is_symbol_char(src[i]) && out.len() < SYMBOL_MAX - 1 {
            out.push(src[i]);
            i += 1;
        }
        (String::from_utf8_lossy(&out).into_owned(), i)
    }

    /// Sets the last-seen global (non-local) label, used to expand
    /// subsequent local labels. Only takes effect if `src` is an actual
    /// label specification (`name:`) and is not itself local.
    pub fn set_global_symbol(&mut self, src: &[u8]) {
        if src.first() == Some(&b'.') {
            return;
        }
        let mut i = 0;
        while i < src.len() && strpr::is_symbol_char(src[i]) {
            i += 1;
        }
        if src.get(i) != Some(&b':') {
            return;
        }
        self.last_global = String::from_utf8_lossy(&src[..i]).into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_file_resets_line_and_column() {
        let mut cur = Cursor::new();
        cur.set_line(5);
        cur.set_column(3);
        cur.set_file("foo.asm");
        assert_eq!(cur.line(), 0);
        assert_eq!(cur.column(), 0);
        assert_eq!(cur.file(), "foo.asm");
    }

    #[test]
    fn local_label_expands_against_last_global() {
        let mut cur = Cursor::new();
        cur.set_global_symbol(b"main:");
        let (name, len) = cur.copy_symbol(b".loop rest");
        assert_eq!(name, "main.loop");
        assert_eq!(len, 5);
    }

    #[test]
    fn global_label_sets_without_prefixing() {
        let mut cur = Cursor::new();
        cur.set_global_symbol(b"main:");
        let (name, _) = cur.copy_symbol(b"main");
        assert_eq!(name, "main");
    }

    #[test]
    fn non_label_does_not_update_global() {
        let mut cur = Cursor::new();
        cur.set_global_symbol(b"main:");
        cur.set_global_symbol(b"mov a, 5");
        let (name, _) = cur.copy_symbol(b".loop");
        assert_eq!(name, "main.loop");
    }

    #[test]
    fn two_distinct_globals_give_distinct_local_expansions() {
        let mut cur = Cursor::new();
        cur.set_global_symbol(b"first:");
        let (a, _) = cur.copy_symbol(b".loop");
        cur.set_global_symbol(b"second:");
        let (b, _) = cur.copy_symbol(b".loop");
        assert_ne!(a, b);
        assert_eq!(a, "first.loop");
        assert_eq!(b, "second.loop");
    }
}
