//! The rule contract: visitor callbacks, static metadata, and the reporting
//! context handed to every callback.

use anyhow::Result;

use crate::finding::{Finding, Severity};
use crate::oracle::{SymbolInfo, SymbolOracle};
use crate::span::SourceSpan;
use crate::tree::{Node, SourceTree};

/// Static declaration attached to a rule at registration time, never derived
/// from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    /// Stable identifier, used for suppression matching and config lookup.
    pub id: &'static str,
    /// Legacy ids that resolve to the same suppression and config key.
    pub aliases: &'static [&'static str],
    pub requires_type_resolution: bool,
    pub requires_full_type_resolution: bool,
    /// Tool version since which the rule is active without an explicit
    /// `active` flag. `None` means the rule must be switched on explicitly.
    pub active_by_default_since: Option<(u32, u32, u32)>,
    pub default_severity: Severity,
    /// Findings of this rule survive annotation-based suppression. Reserved
    /// for rules that police suppression annotations themselves and would
    /// otherwise be trivially silenced.
    pub unsuppressible: bool,
}

/// Whether traversal should continue into the current node's children.
///
/// Returning [`Descent::Prune`] hides the subtree from the returning rule
/// only; other rules keep descending. This replaces the classic visitor
/// hazard where forgetting to call the super implementation silently pruned
/// the subtree: here descent is the default and pruning is an explicit
/// signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descent {
    Continue,
    Prune,
}

/// One callback per node kind. Every kind-specific callback defaults to its
/// category callback (declaration/statement/expression), which defaults to
/// [`NodeVisitor::visit_node`], which continues descent without doing
/// anything. A rule therefore only implements the callbacks it cares about;
/// implementing a category callback catches every kind in that category the
/// rule did not override.
#[allow(unused_variables)]
pub trait NodeVisitor {
    fn visit_node(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        Ok(Descent::Continue)
    }

    fn visit_declaration(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_node(node, ctx)
    }

    fn visit_statement(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_node(node, ctx)
    }

    fn visit_expression(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_node(node, ctx)
    }

    fn visit_file(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_node(node, ctx)
    }

    fn visit_class(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_declaration(node, ctx)
    }

    fn visit_function(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_declaration(node, ctx)
    }

    fn visit_variable(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_declaration(node, ctx)
    }

    fn visit_import(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_statement(node, ctx)
    }

    fn visit_block(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_statement(node, ctx)
    }

    fn visit_if(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_statement(node, ctx)
    }

    fn visit_loop(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_statement(node, ctx)
    }

    fn visit_return(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_statement(node, ctx)
    }

    fn visit_call(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_expression(node, ctx)
    }

    fn visit_binary(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_expression(node, ctx)
    }

    fn visit_unary(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_expression(node, ctx)
    }

    fn visit_identifier(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_expression(node, ctx)
    }

    fn visit_literal(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> Result<Descent> {
        self.visit_expression(node, ctx)
    }
}

/// A self-contained unit of analysis: visitor callbacks plus metadata plus
/// per-file working state.
///
/// A rule instance may own mutable traversal-scoped state (running counts, a
/// stack of enclosing declarations). That state is reset before every file
/// via [`Rule::reset`], is never shared across files, and is never visible
/// to other rules. Rule instances are not reused across concurrent file
/// runs; the provider builds a fresh set per file.
pub trait Rule: NodeVisitor + Send {
    fn metadata(&self) -> &'static RuleMetadata;

    /// Clears traversal-scoped state. Called once before each file.
    fn reset(&mut self) {}

    /// Called after the traversal of a file completes, for findings that
    /// only make sense at file granularity (e.g. counts over the whole
    /// file). Not called for rules that failed during the traversal.
    fn finish_file(&mut self, tree: &SourceTree, ctx: &mut RuleContext<'_>) -> Result<()> {
        let _ = (tree, ctx);
        Ok(())
    }

    /// Metadata of bundled sub-rules, for composites that fan findings out
    /// under their sub-rules' ids. The filtering layer uses this to match
    /// suppression annotations and aliases against sub-rule findings.
    fn bundled(&self) -> &[&'static RuleMetadata] {
        &[]
    }
}

/// Handed to every rule callback: read access to the file under analysis and
/// the reporting sink of the invoking rule.
///
/// The sink is append-only and engine-owned; a rule can never observe
/// another rule's findings. Reporting any number of findings from a single
/// callback is fine, and nothing deduplicates at this layer.
pub struct RuleContext<'a> {
    tree: &'a SourceTree,
    oracle: Option<&'a dyn SymbolOracle>,
    rule_id: &'a str,
    severity: Severity,
    findings: &'a mut Vec<Finding>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        tree: &'a SourceTree,
        oracle: Option<&'a dyn SymbolOracle>,
        rule_id: &'a str,
        severity: Severity,
        findings: &'a mut Vec<Finding>,
    ) -> Self {
        Self { tree, oracle, rule_id, severity, findings }
    }

    pub fn tree(&self) -> &'a SourceTree {
        self.tree
    }

    pub fn source(&self) -> &'a str {
        &self.tree.source
    }

    /// Query the symbol oracle. `None` both when the node cannot be resolved
    /// and when no oracle is attached to the run; rules that must
    /// distinguish the two declare a resolution requirement in their
    /// metadata and are then never invoked without an oracle.
    pub fn resolve(&self, node: &Node) -> Option<SymbolInfo> {
        self.oracle.and_then(|oracle| oracle.resolve(node))
    }

    pub fn report(&mut self, message: impl Into<String>, span: SourceSpan) {
        self.report_with_references(message, span, Vec::new());
    }

    pub fn report_with_references(
        &mut self,
        message: impl Into<String>,
        span: SourceSpan,
        references: Vec<SourceSpan>,
    ) {
        self.findings.push(Finding {
            rule_id: self.rule_id.to_string(),
            severity: self.severity,
            message: message.into(),
            primary_span: span,
            secondary_spans: references,
            suppressed: false,
        });
    }

    /// Re-scope the sink to a bundled sub-rule, so composites can let each
    /// sub-rule report under its own id and severity.
    pub fn scoped<'b>(&'b mut self, metadata: &'static RuleMetadata) -> RuleContext<'b> {
        RuleContext {
            tree: self.tree,
            oracle: self.oracle,
            rule_id: metadata.id,
            severity: metadata.default_severity,
            findings: self.findings,
        }
    }
}
