//! Traversal semantics: ordering, pruning, fault isolation, capability
//! gating and composite fan-out, exercised with purpose-built rules.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use common::*;
use smelt::{
    ActivationPolicy, Config, Descent, Node, NodeKind, NodeVisitor, Notice, Rule, RuleContext,
    RuleMetadata, RuleSetProvider, Severity, SourceTree, SymbolInfo, SymbolOracle,
};

const fn meta(id: &'static str) -> RuleMetadata {
    RuleMetadata {
        id,
        aliases: &[],
        requires_type_resolution: false,
        requires_full_type_resolution: false,
        active_by_default_since: Some((0, 1, 0)),
        default_severity: Severity::Info,
        unsuppressible: false,
    }
}

static FIRST: RuleMetadata = meta("first");
static SECOND: RuleMetadata = meta("second");
static PRUNER: RuleMetadata = meta("pruner");
static FRAGILE: RuleMetadata = meta("fragile");

/// Reports every identifier it sees, under the metadata it was given.
struct MarkIdentifiers(&'static RuleMetadata);

impl NodeVisitor for MarkIdentifiers {
    fn visit_identifier(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> anyhow::Result<Descent> {
        let NodeKind::Identifier { name } = &node.kind else {
            return Ok(Descent::Continue);
        };
        ctx.report(format!("`{name}`"), node.span.clone());
        Ok(Descent::Continue)
    }
}

impl Rule for MarkIdentifiers {
    fn metadata(&self) -> &'static RuleMetadata {
        self.0
    }
}

/// "a { b } c": two identifiers at top level, one inside a block.
fn block_tree(path: &str) -> SourceTree {
    let source = "a { b } c";
    let block = Node::new(NodeKind::Block, span_of(path, source, "{ b }"))
        .with_children(vec![identifier(path, source, "b")]);
    file(
        path,
        source,
        vec![identifier(path, source, "a"), block, identifier(path, source, "c")],
    )
}

fn instantiate(provider: &RuleSetProvider) -> smelt::RuleSet {
    provider
        .instantiate(&Config::empty(), &ActivationPolicy::default())
        .unwrap()
}

#[test]
fn findings_are_ordered_by_node_then_rule_and_reproducible() {
    let provider = RuleSetProvider::new("test")
        .register(&FIRST, |_| Ok(Box::new(MarkIdentifiers(&FIRST))))
        .register(&SECOND, |_| Ok(Box::new(MarkIdentifiers(&SECOND))));
    let tree = block_tree("order.src");

    let analysis = smelt::analyze(&tree, &mut instantiate(&provider), None);
    let order: Vec<_> = analysis
        .findings
        .iter()
        .map(|finding| (finding.primary_span.start_byte, finding.rule_id.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![(0, "first"), (0, "second"), (4, "first"), (4, "second"), (8, "first"), (8, "second")]
    );

    let again = smelt::analyze(&tree, &mut instantiate(&provider), None);
    assert_eq!(analysis.findings, again.findings);
}

struct PruneBlocks;

impl NodeVisitor for PruneBlocks {
    fn visit_block(&mut self, _node: &Node, _ctx: &mut RuleContext<'_>) -> anyhow::Result<Descent> {
        Ok(Descent::Prune)
    }

    fn visit_identifier(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> anyhow::Result<Descent> {
        ctx.report("seen", node.span.clone());
        Ok(Descent::Continue)
    }
}

impl Rule for PruneBlocks {
    fn metadata(&self) -> &'static RuleMetadata {
        &PRUNER
    }
}

#[test]
fn pruning_hides_the_subtree_from_that_rule_only() {
    let provider = RuleSetProvider::new("test")
        .register(&PRUNER, |_| Ok(Box::new(PruneBlocks)))
        .register(&FIRST, |_| Ok(Box::new(MarkIdentifiers(&FIRST))));
    let tree = block_tree("prune.src");

    let analysis = smelt::analyze(&tree, &mut instantiate(&provider), None);
    // The pruner skips `b` inside the block; the other rule still sees it.
    assert_eq!(findings_of(&analysis, "pruner").len(), 2);
    assert_eq!(findings_of(&analysis, "first").len(), 3);
}

struct FailsOnCall;

impl NodeVisitor for FailsOnCall {
    fn visit_identifier(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> anyhow::Result<Descent> {
        ctx.report("seen", node.span.clone());
        Ok(Descent::Continue)
    }

    fn visit_call(&mut self, _node: &Node, _ctx: &mut RuleContext<'_>) -> anyhow::Result<Descent> {
        Err(anyhow!("callee lookup failed"))
    }
}

impl Rule for FailsOnCall {
    fn metadata(&self) -> &'static RuleMetadata {
        &FRAGILE
    }
}

#[test]
fn a_failing_rule_is_disabled_for_the_file_only() {
    let provider = RuleSetProvider::new("test")
        .register(&FRAGILE, |_| Ok(Box::new(FailsOnCall)))
        .register(&FIRST, |_| Ok(Box::new(MarkIdentifiers(&FIRST))));

    let source = "a boom() c";
    let tree = file(
        "fail.src",
        source,
        vec![
            identifier("fail.src", source, "a"),
            call("fail.src", source, "boom()", "boom"),
            identifier("fail.src", source, "c"),
        ],
    );

    let mut rule_set = instantiate(&provider);
    let analysis = smelt::analyze(&tree, &mut rule_set, None);

    // The fragile rule keeps the finding it made before failing; everything
    // after the failure is skipped for it and untouched for the other rule.
    assert_eq!(findings_of(&analysis, "fragile").len(), 1);
    assert_eq!(findings_of(&analysis, "first").len(), 2);
    assert!(analysis.notices.iter().any(|notice| matches!(
        notice,
        Notice::RuleFailed { rule_id, message }
            if rule_id == "fragile" && message.contains("callee lookup failed")
    )));

    // Failure state does not leak into the next file.
    let clean = block_tree("clean.src");
    let analysis = smelt::analyze(&clean, &mut rule_set, None);
    assert_eq!(findings_of(&analysis, "fragile").len(), 3);
    assert!(analysis.notices.is_empty());
}

static NEEDS_RESOLUTION: RuleMetadata = RuleMetadata {
    id: "needs_resolution",
    aliases: &[],
    requires_type_resolution: true,
    requires_full_type_resolution: false,
    active_by_default_since: Some((0, 1, 0)),
    default_severity: Severity::Info,
    unsuppressible: false,
};

static NEEDS_FULL_RESOLUTION: RuleMetadata = RuleMetadata {
    id: "needs_full_resolution",
    aliases: &[],
    requires_type_resolution: true,
    requires_full_type_resolution: true,
    active_by_default_since: Some((0, 1, 0)),
    default_severity: Severity::Info,
    unsuppressible: false,
};

struct ResolvesNothing {
    full: bool,
}

impl SymbolOracle for ResolvesNothing {
    fn resolve(&self, _node: &Node) -> Option<SymbolInfo> {
        None
    }

    fn full_resolution(&self) -> bool {
        self.full
    }
}

#[test]
fn rules_without_a_capable_oracle_are_skipped_with_a_notice() {
    let provider = RuleSetProvider::new("test")
        .register(&NEEDS_RESOLUTION, |_| Ok(Box::new(MarkIdentifiers(&NEEDS_RESOLUTION))))
        .register(&NEEDS_FULL_RESOLUTION, |_| {
            Ok(Box::new(MarkIdentifiers(&NEEDS_FULL_RESOLUTION)))
        });
    let tree = block_tree("oracle.src");

    let analysis = smelt::analyze(&tree, &mut instantiate(&provider), None);
    assert!(analysis.findings.is_empty());
    let skipped: Vec<_> = analysis
        .notices
        .iter()
        .filter_map(|notice| match notice {
            Notice::MissingCapability { rule_id } => Some(rule_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec!["needs_resolution", "needs_full_resolution"]);

    // A single-file oracle satisfies the plain requirement only.
    let partial = ResolvesNothing { full: false };
    let analysis = smelt::analyze(&tree, &mut instantiate(&provider), Some(&partial));
    assert_eq!(findings_of(&analysis, "needs_resolution").len(), 3);
    assert!(findings_of(&analysis, "needs_full_resolution").is_empty());

    let full = ResolvesNothing { full: true };
    let analysis = smelt::analyze(&tree, &mut instantiate(&provider), Some(&full));
    assert_eq!(findings_of(&analysis, "needs_full_resolution").len(), 3);
}

static COMPOSITE: RuleMetadata = meta("composite");
static SUB_A: RuleMetadata = meta("sub_a");
static SUB_B: RuleMetadata = meta("sub_b");
static COMPOSITE_BUNDLE: [&RuleMetadata; 2] = [&SUB_A, &SUB_B];

/// Computes an identifier count once per file and fans two findings out
/// under the bundled sub-rule ids.
struct CountingComposite {
    computations: Arc<AtomicUsize>,
    artifact: Option<usize>,
}

impl NodeVisitor for CountingComposite {
    fn visit_file(&mut self, node: &Node, ctx: &mut RuleContext<'_>) -> anyhow::Result<Descent> {
        let count = match self.artifact {
            Some(count) => count,
            None => {
                self.computations.fetch_add(1, Ordering::SeqCst);
                node.descendants()
                    .filter(|n| matches!(n.kind, NodeKind::Identifier { .. }))
                    .count()
            }
        };
        self.artifact = Some(count);

        ctx.scoped(&SUB_A).report(format!("{count} identifiers"), node.span.clone());
        ctx.scoped(&SUB_B).report(format!("{count} identifiers"), node.span.clone());
        Ok(Descent::Prune)
    }
}

impl Rule for CountingComposite {
    fn metadata(&self) -> &'static RuleMetadata {
        &COMPOSITE
    }

    fn reset(&mut self) {
        self.artifact = None;
    }

    fn bundled(&self) -> &[&'static RuleMetadata] {
        &COMPOSITE_BUNDLE
    }
}

#[test]
fn a_composite_shares_its_artifact_and_reports_per_sub_rule() {
    let computations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&computations);
    let provider = RuleSetProvider::new("test").register(&COMPOSITE, move |_| {
        Ok(Box::new(CountingComposite {
            computations: Arc::clone(&counter),
            artifact: None,
        }))
    });

    let tree = block_tree("composite.src");
    let mut rule_set = instantiate(&provider);
    let analysis = smelt::analyze(&tree, &mut rule_set, None);

    assert_eq!(computations.load(Ordering::SeqCst), 1);
    let ids: Vec<_> = analysis.findings.iter().map(|finding| finding.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["sub_a", "sub_b"]);
    assert!(analysis.findings.iter().all(|finding| finding.message == "3 identifiers"));

    // The artifact is per file: the same instance recomputes after a reset.
    let analysis = smelt::analyze(&block_tree("another.src"), &mut rule_set, None);
    assert_eq!(computations.load(Ordering::SeqCst), 2);
    assert_eq!(analysis.findings.len(), 2);
}

#[test]
fn sub_rule_findings_are_suppressible_under_their_own_ids() {
    let provider = RuleSetProvider::new("test").register(&COMPOSITE, |_| {
        Ok(Box::new(CountingComposite {
            computations: Arc::new(AtomicUsize::new(0)),
            artifact: None,
        }))
    });

    let source = "a";
    let root = Node::new(NodeKind::File, span("sup.src", source, 0, source.len()))
        .with_suppressions(vec!["sub_a".to_string()])
        .with_children(vec![identifier("sup.src", source, "a")]);
    let tree = SourceTree::new("sup.src", source, root);

    let analysis = smelt::analyze(&tree, &mut instantiate(&provider), None);
    let sub_a = findings_of(&analysis, "sub_a");
    let sub_b = findings_of(&analysis, "sub_b");
    assert!(sub_a[0].suppressed);
    assert!(!sub_b[0].suppressed);
}

#[test]
fn analyze_files_processes_every_tree_with_a_fresh_rule_set() {
    let provider = RuleSetProvider::new("test")
        .register(&FIRST, |_| Ok(Box::new(MarkIdentifiers(&FIRST))));
    let trees = vec![block_tree("one.src"), block_tree("two.src")];

    let results = smelt::analyze_files(
        &trees,
        &provider,
        &Config::empty(),
        &ActivationPolicy::default(),
        None,
    )
    .unwrap();

    assert_eq!(results.len(), 2);
    for (path, analysis) in &results {
        assert!(path.ends_with("one.src") || path.ends_with("two.src"));
        assert_eq!(analysis.findings.len(), 3);
    }

    // A configuration mistake fails the whole run up front.
    let bad = Config::from_toml_str("[test.first]\nseverity = \"loud\"").unwrap();
    assert!(
        smelt::analyze_files(&trees, &provider, &bad, &ActivationPolicy::default(), None).is_err()
    );
}
