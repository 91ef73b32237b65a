//! The visitor dispatch engine.
//!
//! One file, one rule set, one depth-first pre-order traversal. Every active
//! rule's kind-matching callback runs at every node, in rule-declaration
//! order; the resulting finding sequence is ordered by traversal position
//! first and rule order second, and is reproducible for the same inputs --
//! suppression diffing and snapshot tests depend on that.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::config::Config;
use crate::error::ConfigError;
use crate::finding::{Finding, Notice};
use crate::oracle::SymbolOracle;
use crate::rule::{Descent, Rule, RuleContext};
use crate::rule_set::{ActivationPolicy, ActiveRule, RuleSet, RuleSetProvider};
use crate::suppression;
use crate::tree::{Node, NodeKind, SourceTree};

/// Result of analyzing one file: the ordered findings (suppressed ones
/// included, flagged) plus the run's non-fatal notices.
#[derive(Debug, Default)]
pub struct Analysis {
    pub findings: Vec<Finding>,
    pub notices: Vec<Notice>,
}

// Per-rule bookkeeping for one file traversal.
struct RunState {
    // Rule lacks a required oracle capability; it is never invoked.
    skipped: bool,
    // A callback failed; remaining callbacks are skipped for this file.
    failed: bool,
    // Depth at which the rule pruned; cleared when the walk returns there.
    pruned_at: Option<usize>,
}

impl RunState {
    fn live(&self) -> bool {
        !self.skipped && !self.failed && self.pruned_at.is_none()
    }
}

/// Analyze one file with an already-built rule set.
///
/// The rule set is reset, the tree is traversed exactly once, and the
/// suppression/filtering layer marks suppressed findings before the list is
/// returned. Running this twice with the same inputs yields an identical
/// sequence.
pub fn analyze(
    tree: &SourceTree,
    rule_set: &mut RuleSet,
    oracle: Option<&dyn SymbolOracle>,
) -> Analysis {
    let mut findings = Vec::new();
    let mut notices = rule_set.build_notices.clone();

    let mut states = Vec::with_capacity(rule_set.rules.len());
    for active in rule_set.rules.iter_mut() {
        let metadata = active.metadata;
        let skipped = (metadata.requires_type_resolution && oracle.is_none())
            || (metadata.requires_full_type_resolution
                && !oracle.is_some_and(|o| o.full_resolution()));
        if skipped {
            tracing::debug!(rule = metadata.id, "skipped: no capable symbol oracle");
            notices.push(Notice::MissingCapability { rule_id: metadata.id.to_string() });
        } else {
            active.rule.reset();
        }
        states.push(RunState { skipped, failed: false, pruned_at: None });
    }

    walk(
        &tree.root,
        0,
        tree,
        oracle,
        &mut rule_set.rules,
        &mut states,
        &mut findings,
        &mut notices,
    );

    for (active, state) in rule_set.rules.iter_mut().zip(states.iter_mut()) {
        if state.skipped || state.failed {
            continue;
        }
        let mut ctx = RuleContext::new(
            tree,
            oracle,
            active.metadata.id,
            active.severity,
            &mut findings,
        );
        if let Err(err) = active.rule.finish_file(tree, &mut ctx) {
            tracing::warn!(rule = active.metadata.id, "rule failed at end of file: {err}");
            notices.push(Notice::RuleFailed {
                rule_id: active.metadata.id.to_string(),
                message: err.to_string(),
            });
        }
    }

    let annotations = suppression::collect_annotations(tree);
    suppression::apply(&mut findings, &annotations, rule_set);

    Analysis { findings, notices }
}

#[allow(clippy::too_many_arguments)]
fn walk(
    node: &Node,
    depth: usize,
    tree: &SourceTree,
    oracle: Option<&dyn SymbolOracle>,
    rules: &mut [ActiveRule],
    states: &mut [RunState],
    findings: &mut Vec<Finding>,
    notices: &mut Vec<Notice>,
) {
    let mut any_descending = false;

    for (active, state) in rules.iter_mut().zip(states.iter_mut()) {
        if !state.live() {
            continue;
        }
        let mut ctx = RuleContext::new(tree, oracle, active.metadata.id, active.severity, findings);
        match dispatch(active.rule.as_mut(), node, &mut ctx) {
            Ok(Descent::Continue) => any_descending = true,
            Ok(Descent::Prune) => state.pruned_at = Some(depth),
            Err(err) => {
                // Fail once per file per rule: the rule keeps what it already
                // reported, other rules and other nodes are unaffected.
                tracing::warn!(rule = active.metadata.id, "rule failed, disabling for this file: {err}");
                state.failed = true;
                notices.push(Notice::RuleFailed {
                    rule_id: active.metadata.id.to_string(),
                    message: err.to_string(),
                });
            }
        }
    }

    if any_descending {
        for child in &node.children {
            walk(child, depth + 1, tree, oracle, rules, states, findings, notices);
        }
    }

    for state in states.iter_mut() {
        if state.pruned_at == Some(depth) {
            state.pruned_at = None;
        }
    }
}

// Closed double dispatch: node kind -> visitor callback.
fn dispatch(
    rule: &mut dyn Rule,
    node: &Node,
    ctx: &mut RuleContext<'_>,
) -> anyhow::Result<Descent> {
    match &node.kind {
        NodeKind::File => rule.visit_file(node, ctx),
        NodeKind::Class { .. } => rule.visit_class(node, ctx),
        NodeKind::Function { .. } => rule.visit_function(node, ctx),
        NodeKind::Variable { .. } => rule.visit_variable(node, ctx),
        NodeKind::Import { .. } => rule.visit_import(node, ctx),
        NodeKind::Block => rule.visit_block(node, ctx),
        NodeKind::If => rule.visit_if(node, ctx),
        NodeKind::Loop => rule.visit_loop(node, ctx),
        NodeKind::Return => rule.visit_return(node, ctx),
        NodeKind::Call { .. } => rule.visit_call(node, ctx),
        NodeKind::Binary { .. } => rule.visit_binary(node, ctx),
        NodeKind::Unary { .. } => rule.visit_unary(node, ctx),
        NodeKind::Identifier { .. } => rule.visit_identifier(node, ctx),
        NodeKind::Literal { .. } => rule.visit_literal(node, ctx),
    }
}

/// Analyze many files, in parallel at file granularity.
///
/// Each file gets a freshly instantiated rule set because rule instances
/// carry per-file mutable state; the configuration store and the oracle are
/// shared read-only. The configuration is validated once up front so a setup
/// mistake fails the run before any file is traversed.
pub fn analyze_files(
    trees: &[SourceTree],
    provider: &RuleSetProvider,
    config: &Config,
    policy: &ActivationPolicy,
    oracle: Option<&dyn SymbolOracle>,
) -> Result<Vec<(PathBuf, Analysis)>, ConfigError> {
    provider.instantiate(config, policy)?;

    trees
        .par_iter()
        .map(|tree| {
            let mut rule_set = provider.instantiate(config, policy)?;
            Ok((tree.path.clone(), analyze(tree, &mut rule_set, oracle)))
        })
        .collect()
}
