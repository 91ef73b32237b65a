use anyhow::Result;
use regex::Regex;

use crate::config::RuleConfig;
use crate::error::ConfigError;
use crate::finding::Severity;
use crate::rule::{Descent, NodeVisitor, Rule, RuleContext, RuleMetadata};
use crate::tree::{Node, NodeKind};

pub static METADATA: RuleMetadata = RuleMetadata {
    id: "undesirable_call",
    aliases: &["forbidden_call"],
    requires_type_resolution: false,
    requires_full_type_resolution: false,
    // Opt-in: the list of undesirable functions is project-specific.
    active_by_default_since: None,
    default_severity: Severity::Warning,
    unsuppressible: false,
};

/// ## What it does
///
/// Reports calls to functions listed as undesirable.
///
/// ## Why is this bad?
///
/// Some functions should not appear in production code: debugging hooks,
/// deprecated entry points, or platform calls a project has banned.
///
/// ## Configuration
///
/// - `functions`: simple patterns matched against the callee name, e.g.
///   `debug*` or `sys.exit`. The legacy key `methods` is still read when
///   `functions` is absent.
pub struct UndesirableCall {
    functions: Vec<Regex>,
}

impl UndesirableCall {
    pub fn from_config(config: &RuleConfig) -> Result<Box<dyn Rule>, ConfigError> {
        Ok(Box::new(Self {
            functions: config.patterns_with_fallback("functions", "methods", &[])?,
        }))
    }
}

impl NodeVisitor for UndesirableCall {
    fn visit_call(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        let NodeKind::Call { callee } = &node.kind else {
            return Ok(Descent::Continue);
        };
        if self.functions.iter().any(|pattern| pattern.is_match(callee)) {
            ctx.report(
                format!("`{callee}()` is listed as an undesirable call."),
                node.span.clone(),
            );
        }
        Ok(Descent::Continue)
    }
}

impl Rule for UndesirableCall {
    fn metadata(&self) -> &'static RuleMetadata {
        &METADATA
    }
}
