use anyhow::Result;

use crate::config::RuleConfig;
use crate::error::ConfigError;
use crate::finding::Severity;
use crate::rule::{Descent, NodeVisitor, Rule, RuleContext, RuleMetadata};
use crate::tree::Node;

pub static METADATA: RuleMetadata = RuleMetadata {
    id: "forbidden_suppress",
    aliases: &[],
    requires_type_resolution: false,
    requires_full_type_resolution: false,
    active_by_default_since: None,
    default_severity: Severity::Warning,
    // Suppressing the rule that polices suppressions would make it useless,
    // so its findings survive annotation-based suppression. Path exclusion
    // still applies.
    unsuppressible: true,
};

/// ## What it does
///
/// Reports suppression annotations that name rules a project has declared
/// must never be suppressed.
///
/// ## Configuration
///
/// - `rules`: ids that may not appear in a suppression annotation.
///
/// The rule inspects the raw annotations on the nodes it visits, during the
/// traversal, so it sees every annotation before the filtering layer acts
/// on any of them.
pub struct ForbiddenSuppress {
    rules: Vec<String>,
}

impl ForbiddenSuppress {
    pub fn from_config(config: &RuleConfig) -> Result<Box<dyn Rule>, ConfigError> {
        Ok(Box::new(Self { rules: config.string_list("rules", &[])? }))
    }
}

impl NodeVisitor for ForbiddenSuppress {
    fn visit_node(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        let forbidden: Vec<&str> = node
            .suppressions
            .iter()
            .filter(|name| self.rules.iter().any(|rule| rule == *name))
            .map(String::as_str)
            .collect();
        if !forbidden.is_empty() {
            ctx.report(
                format!("Suppressing `{}` is forbidden.", forbidden.join("`, `")),
                node.span.clone(),
            );
        }
        Ok(Descent::Continue)
    }
}

impl Rule for ForbiddenSuppress {
    fn metadata(&self) -> &'static RuleMetadata {
        &METADATA
    }
}
