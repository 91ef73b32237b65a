use anyhow::Result;
use regex::Regex;

use crate::config::RuleConfig;
use crate::error::ConfigError;
use crate::finding::Severity;
use crate::rule::{Descent, NodeVisitor, Rule, RuleContext, RuleMetadata};
use crate::tree::{Node, NodeKind};

pub static METADATA: RuleMetadata = RuleMetadata {
    id: "return_count",
    aliases: &["restrict_return_statements"],
    requires_type_resolution: false,
    requires_full_type_resolution: false,
    active_by_default_since: Some((0, 1, 0)),
    default_severity: Severity::Style,
    unsuppressible: false,
};

/// ## What it does
///
/// Restricts the number of `return` statements per function body.
///
/// ## Why is this bad?
///
/// A function with many exit points is harder to follow and harder to
/// refactor safely.
///
/// ## Configuration
///
/// - `max` (default `2`): allowed number of returns. The legacy key
///   `maxReturns` is still read when `max` is absent.
/// - `excluded_functions`: simple patterns for function names to skip,
///   e.g. `equals*`.
///
/// Nested functions are counted independently: a return inside an inner
/// function belongs to the inner function only.
pub struct ReturnCount {
    max: i64,
    excluded: Vec<Regex>,
}

impl ReturnCount {
    pub fn from_config(config: &RuleConfig) -> Result<Box<dyn Rule>, ConfigError> {
        Ok(Box::new(Self {
            max: config.int_with_fallback("max", "maxReturns", 2)?,
            excluded: config.patterns("excluded_functions", &[])?,
        }))
    }
}

fn count_returns(node: &Node) -> usize {
    node.children
        .iter()
        .map(|child| match &child.kind {
            NodeKind::Function { .. } => 0,
            NodeKind::Return => 1 + count_returns(child),
            _ => count_returns(child),
        })
        .sum()
}

impl NodeVisitor for ReturnCount {
    fn visit_function(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        let NodeKind::Function { name, name_span } = &node.kind else {
            return Ok(Descent::Continue);
        };
        if self.excluded.iter().any(|pattern| pattern.is_match(name)) {
            // Keep descending: an excluded function may contain nested
            // functions that are not excluded.
            return Ok(Descent::Continue);
        }

        let count = count_returns(node);
        if count as i64 > self.max {
            ctx.report(
                format!(
                    "Function `{name}` has {count} return statements (limit is {max}).",
                    max = self.max
                ),
                name_span.clone(),
            );
        }
        Ok(Descent::Continue)
    }
}

impl Rule for ReturnCount {
    fn metadata(&self) -> &'static RuleMetadata {
        &METADATA
    }
}
