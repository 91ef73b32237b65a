use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A resolved location inside a source file.
///
/// Lines and columns are 1-based; byte offsets are 0-based and half-open
/// (`start_byte..end_byte`). Spans are always derived from a tree node and
/// never change after the tree has been built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan {
    pub path: PathBuf,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl SourceSpan {
    pub fn new(
        path: impl Into<PathBuf>,
        start: (u32, u32),
        end: (u32, u32),
        start_byte: usize,
        end_byte: usize,
    ) -> Self {
        Self {
            path: path.into(),
            start_line: start.0,
            start_column: start.1,
            end_line: end.0,
            end_column: end.1,
            start_byte,
            end_byte,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `other` lies entirely within this span. Spans from different
    /// files never enclose one another.
    pub fn encloses(&self, other: &SourceSpan) -> bool {
        self.path == other.path
            && self.start_byte <= other.start_byte
            && other.end_byte <= self.end_byte
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.path.to_string_lossy(),
            self.start_line,
            self.start_column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encloses_is_byte_based_and_file_scoped() {
        let outer = SourceSpan::new("a.src", (1, 1), (3, 1), 0, 30);
        let inner = SourceSpan::new("a.src", (2, 1), (2, 5), 10, 14);
        let other_file = SourceSpan::new("b.src", (2, 1), (2, 5), 10, 14);

        assert!(outer.encloses(&inner));
        assert!(outer.encloses(&outer));
        assert!(!inner.encloses(&outer));
        assert!(!outer.encloses(&other_file));
    }

    #[test]
    fn display_is_path_line_column() {
        let span = SourceSpan::new("src/a.src", (4, 7), (4, 9), 40, 42);
        assert_eq!(span.to_string(), "src/a.src:4:7");
    }
}
