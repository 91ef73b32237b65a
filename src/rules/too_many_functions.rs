use anyhow::Result;

use crate::config::RuleConfig;
use crate::error::ConfigError;
use crate::finding::Severity;
use crate::rule::{Descent, NodeVisitor, Rule, RuleContext, RuleMetadata};
use crate::tree::{Node, SourceTree};

pub static METADATA: RuleMetadata = RuleMetadata {
    id: "too_many_functions",
    aliases: &[],
    requires_type_resolution: false,
    requires_full_type_resolution: false,
    active_by_default_since: Some((0, 1, 0)),
    default_severity: Severity::Maintainability,
    unsuppressible: false,
};

/// ## What it does
///
/// Counts function declarations per file and reports when the file holds
/// more than `max` (default `10`).
///
/// ## Why is this bad?
///
/// Files that accumulate many functions tend to collect unrelated concerns
/// and become hard to navigate.
///
/// The running count is traversal-scoped state: it is reset before every
/// file and reported from the end-of-file hook, never carried across files.
pub struct TooManyFunctions {
    max: i64,
    count: i64,
}

impl TooManyFunctions {
    pub fn from_config(config: &RuleConfig) -> Result<Box<dyn Rule>, ConfigError> {
        Ok(Box::new(Self { max: config.int("max", 10)?, count: 0 }))
    }
}

impl NodeVisitor for TooManyFunctions {
    fn visit_function(&mut self, _node: &Node, _ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.count += 1;
        Ok(Descent::Continue)
    }
}

impl Rule for TooManyFunctions {
    fn metadata(&self) -> &'static RuleMetadata {
        &METADATA
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn finish_file(&mut self, tree: &SourceTree, ctx: &mut RuleContext<'_>) -> Result<()> {
        if self.count > self.max {
            ctx.report(
                format!(
                    "File contains {count} functions (limit is {max}).",
                    count = self.count,
                    max = self.max
                ),
                tree.root.span.clone(),
            );
        }
        Ok(())
    }
}
