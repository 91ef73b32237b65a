//! Annotation-based suppression and path exclusion.
//!
//! Runs after the traversal, over the full unfiltered finding list. A
//! finding is marked suppressed (never removed) when an annotation lexically
//! enclosing its primary span names its rule id or one of its aliases, or
//! when its file path matches one of the rule set's exclusion patterns; the
//! two mechanisms are independent and either alone suffices.

use rustc_hash::FxHashMap;

use crate::finding::Finding;
use crate::rule::RuleMetadata;
use crate::rule_set::RuleSet;
use crate::span::SourceSpan;
use crate::tree::SourceTree;

/// A suppression annotation lifted out of the tree: the rule ids it names
/// and the span it covers. Lives only for the duration of the filtering
/// pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SuppressionAnnotation {
    pub rules: Vec<String>,
    pub span: SourceSpan,
}

/// Collect every annotation in one pre-order pass. An annotation attached to
/// a node covers that node's whole span.
pub fn collect_annotations(tree: &SourceTree) -> Vec<SuppressionAnnotation> {
    tree.root
        .descendants()
        .filter(|node| !node.suppressions.is_empty())
        .map(|node| SuppressionAnnotation {
            rules: node.suppressions.clone(),
            span: node.span.clone(),
        })
        .collect()
}

/// Set the `suppressed` flag across `findings`.
///
/// Matching is case-sensitive and exact, against canonical ids and declared
/// aliases of the set's rules (bundled sub-rules included). Annotation
/// entries naming unknown rules are ignored: a typo in a suppression must
/// never fail a run, it just doesn't suppress anything. Rules declared
/// unsuppressible are exempt from annotation matching but not from path
/// exclusion.
pub(crate) fn apply(
    findings: &mut [Finding],
    annotations: &[SuppressionAnnotation],
    rule_set: &RuleSet,
) {
    // id-or-alias -> canonical metadata, for the set's rules and their
    // bundled sub-rules.
    let mut known: FxHashMap<&str, &'static RuleMetadata> = FxHashMap::default();
    for active in &rule_set.rules {
        for metadata in std::iter::once(active.metadata).chain(active.rule.bundled().iter().copied())
        {
            known.insert(metadata.id, metadata);
            for alias in metadata.aliases {
                known.insert(alias, metadata);
            }
        }
    }

    for annotation in annotations {
        for name in &annotation.rules {
            if !known.contains_key(name.as_str()) {
                tracing::debug!("suppression annotation names unknown rule `{name}`");
            }
        }
    }

    for finding in findings.iter_mut() {
        let path = finding.primary_span.path.to_string_lossy();
        let excluded = rule_set
            .exclusions
            .iter()
            .any(|pattern| pattern.is_match(&path));

        let annotated = match known.get(finding.rule_id.as_str()) {
            Some(metadata) if !metadata.unsuppressible => annotations.iter().any(|annotation| {
                annotation.span.encloses(&finding.primary_span)
                    && annotation.rules.iter().any(|name| {
                        known
                            .get(name.as_str())
                            .is_some_and(|named| named.id == metadata.id)
                    })
            }),
            _ => false,
        };

        finding.suppressed = excluded || annotated;
    }
}
