//! Line-oriented rules bundled behind one traversal pass.
//!
//! Both bundled rules work on the file split into lines. The composite
//! computes that split exactly once per file, before delegating, and fans
//! out to the sub-rules in declared order; each sub-rule reports under its
//! own id.

use anyhow::Result;

use crate::config::RuleConfig;
use crate::error::ConfigError;
use crate::finding::Severity;
use crate::rule::{Descent, NodeVisitor, Rule, RuleContext, RuleMetadata};
use crate::span::SourceSpan;
use crate::text::LineIndex;
use crate::tree::{Node, SourceTree};

pub static METADATA: RuleMetadata = RuleMetadata {
    id: "text_rules",
    aliases: &[],
    requires_type_resolution: false,
    requires_full_type_resolution: false,
    active_by_default_since: Some((0, 1, 0)),
    default_severity: Severity::Style,
    unsuppressible: false,
};

pub static MAX_LINE_LENGTH: RuleMetadata = RuleMetadata {
    id: "max_line_length",
    aliases: &["LongLine"],
    requires_type_resolution: false,
    requires_full_type_resolution: false,
    active_by_default_since: Some((0, 1, 0)),
    default_severity: Severity::Style,
    unsuppressible: false,
};

pub static TRAILING_WHITESPACE: RuleMetadata = RuleMetadata {
    id: "trailing_whitespace",
    aliases: &[],
    requires_type_resolution: false,
    requires_full_type_resolution: false,
    active_by_default_since: Some((0, 1, 0)),
    default_severity: Severity::Style,
    unsuppressible: false,
};

static BUNDLED: [&RuleMetadata; 2] = [&MAX_LINE_LENGTH, &TRAILING_WHITESPACE];

/// The shared per-file artifact: every line with its 1-based number, span
/// and text.
pub struct FileLines {
    pub lines: Vec<Line>,
}

pub struct Line {
    pub number: u32,
    pub span: SourceSpan,
    pub text: String,
}

impl FileLines {
    pub fn compute(tree: &SourceTree) -> Self {
        let index = LineIndex::new(&tree.source);
        let lines = (1..=index.line_count() as u32)
            .map(|number| {
                let range = index.line_range(number);
                let (start_line, start_column) = index.line_col(range.start);
                let text = tree.source[range.clone()].to_string();
                Line {
                    number,
                    span: SourceSpan::new(
                        &tree.path,
                        (start_line, start_column),
                        (start_line, start_column + (range.end - range.start) as u32),
                        range.start,
                        range.end,
                    ),
                    text,
                }
            })
            .collect();
        Self { lines }
    }
}

/// ## What it does
///
/// Bundles the line-based rules `max_line_length` and
/// `trailing_whitespace` so the file is split into lines once instead of
/// once per rule.
///
/// ## Configuration
///
/// Sub-rules are configured under their own table inside this rule's
/// section and can be switched off individually:
///
/// ```toml
/// [smells.text_rules.max_line_length]
/// max = 100
///
/// [smells.text_rules.trailing_whitespace]
/// active = false
/// ```
pub struct TextRules {
    max_line_length: MaxLineLength,
    trailing_whitespace: TrailingWhitespace,
    lines: Option<FileLines>,
}

struct MaxLineLength {
    active: bool,
    max: i64,
}

struct TrailingWhitespace {
    active: bool,
}

impl TextRules {
    pub fn from_config(config: &RuleConfig) -> Result<Box<dyn Rule>, ConfigError> {
        let mll = config.sub("max_line_length")?;
        let tw = config.sub("trailing_whitespace")?;
        Ok(Box::new(Self {
            max_line_length: MaxLineLength {
                active: mll.get_bool("active", true)?,
                max: mll.get_int("max", 120)?,
            },
            trailing_whitespace: TrailingWhitespace { active: tw.get_bool("active", true)? },
            lines: None,
        }))
    }
}

impl MaxLineLength {
    fn check(&self, lines: &FileLines, ctx: &mut RuleContext<'_>) {
        for line in &lines.lines {
            let trimmed = line.text.trim_start();
            // Import statements and comment lines routinely exceed the limit
            // and are not worth breaking.
            if trimmed.starts_with("import ") || trimmed.starts_with("//") {
                continue;
            }
            let length = line.text.chars().count() as i64;
            if length > self.max {
                ctx.report(
                    format!(
                        "Line {} is {length} characters long (limit is {max}).",
                        line.number,
                        max = self.max
                    ),
                    line.span.clone(),
                );
            }
        }
    }
}

impl TrailingWhitespace {
    fn check(&self, lines: &FileLines, ctx: &mut RuleContext<'_>) {
        for line in &lines.lines {
            let trimmed_len = line.text.trim_end_matches([' ', '\t']).len();
            if trimmed_len < line.text.len() {
                let start_byte = line.span.start_byte + trimmed_len;
                let span = SourceSpan::new(
                    &line.span.path,
                    (line.number, trimmed_len as u32 + 1),
                    (line.number, line.text.len() as u32 + 1),
                    start_byte,
                    line.span.end_byte,
                );
                ctx.report(format!("Line {} has trailing whitespace.", line.number), span);
            }
        }
    }
}

impl NodeVisitor for TextRules {
    fn visit_file(&mut self, _node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        let lines = match self.lines.take() {
            Some(lines) => lines,
            None => FileLines::compute(ctx.tree()),
        };

        if self.max_line_length.active {
            let mut sub = ctx.scoped(&MAX_LINE_LENGTH);
            self.max_line_length.check(&lines, &mut sub);
        }
        if self.trailing_whitespace.active {
            let mut sub = ctx.scoped(&TRAILING_WHITESPACE);
            self.trailing_whitespace.check(&lines, &mut sub);
        }

        self.lines = Some(lines);
        // Nothing below the file node matters to line-based rules.
        Ok(Descent::Prune)
    }
}

impl Rule for TextRules {
    fn metadata(&self) -> &'static RuleMetadata {
        &METADATA
    }

    fn reset(&mut self) {
        self.lines = None;
    }

    fn bundled(&self) -> &[&'static RuleMetadata] {
        &BUNDLED
    }
}
