use anyhow::Result;

use crate::config::RuleConfig;
use crate::error::ConfigError;
use crate::finding::Severity;
use crate::rule::{Descent, NodeVisitor, Rule, RuleContext, RuleMetadata};
use crate::tree::{Node, NodeKind};

pub static METADATA: RuleMetadata = RuleMetadata {
    id: "unresolved_reference",
    aliases: &[],
    requires_type_resolution: true,
    requires_full_type_resolution: false,
    active_by_default_since: Some((0, 1, 0)),
    default_severity: Severity::Error,
    unsuppressible: false,
};

/// ## What it does
///
/// Reports identifiers the symbol oracle cannot resolve to a declaration.
///
/// Declares a resolution requirement, so the engine skips it wholesale when
/// no oracle is attached to the run: inside the callbacks an unresolvable
/// node is always a genuine finding, never a missing capability.
pub struct UnresolvedReference;

impl UnresolvedReference {
    pub fn from_config(_config: &RuleConfig) -> Result<Box<dyn Rule>, ConfigError> {
        Ok(Box::new(Self))
    }
}

impl NodeVisitor for UnresolvedReference {
    fn visit_identifier(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        let NodeKind::Identifier { name } = &node.kind else {
            return Ok(Descent::Continue);
        };
        if ctx.resolve(node).is_none() {
            ctx.report(format!("`{name}` cannot be resolved."), node.span.clone());
        }
        Ok(Descent::Continue)
    }
}

impl Rule for UnresolvedReference {
    fn metadata(&self) -> &'static RuleMetadata {
        &METADATA
    }
}
