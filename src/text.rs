//! Line-oriented helpers over raw source text.
//!
//! The engine itself only deals in byte offsets; rules that report
//! line-granularity findings (and span construction in general) go through
//! [`LineIndex`] to translate offsets into 1-based (line, column) positions.

use std::ops::Range;

use memchr::memchr_iter;

/// Byte offsets of line starts, computed once per file.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr_iter(b'\n', source.as_bytes()).map(|pos| pos + 1));
        Self { line_starts, len: source.len() }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The 1-based (line, column) position of a byte offset. Columns count
    /// bytes from the line start.
    pub fn line_col(&self, byte: usize) -> (u32, u32) {
        let line = self.line_starts.partition_point(|start| *start <= byte);
        let line_start = self.line_starts[line - 1];
        (line as u32, (byte - line_start + 1) as u32)
    }

    /// Byte range of a 1-based line, excluding the trailing newline.
    pub fn line_range(&self, line: u32) -> Range<usize> {
        let idx = line as usize - 1;
        let start = self.line_starts[idx];
        let end = match self.line_starts.get(idx + 1) {
            Some(next_start) => next_start - 1,
            None => self.len,
        };
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(1), (1, 2));
        assert_eq!(index.line_col(3), (2, 1));
        assert_eq!(index.line_col(6), (3, 1));
        assert_eq!(index.line_col(7), (4, 1));
    }

    #[test]
    fn line_ranges_exclude_the_newline() {
        let source = "ab\ncd\n\nef";
        let index = LineIndex::new(source);
        assert_eq!(&source[index.line_range(1)], "ab");
        assert_eq!(&source[index.line_range(2)], "cd");
        assert_eq!(&source[index.line_range(3)], "");
        assert_eq!(&source[index.line_range(4)], "ef");
    }

    #[test]
    fn empty_source_has_one_empty_line() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_range(1), 0..0);
    }
}
