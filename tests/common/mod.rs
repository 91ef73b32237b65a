#![allow(dead_code)]

use smelt::{
    ActivationPolicy, Analysis, Config, Finding, LineIndex, Node, NodeKind, SourceSpan, SourceTree,
};

/// Span over `start..end` of `source`, with line/column positions derived
/// from the text itself.
pub fn span(path: &str, source: &str, start: usize, end: usize) -> SourceSpan {
    let index = LineIndex::new(source);
    let (start_line, start_column) = index.line_col(start);
    let (end_line, end_column) = index.line_col(end);
    SourceSpan::new(path, (start_line, start_column), (end_line, end_column), start, end)
}

/// Span of the first occurrence of `pattern` in `source`.
pub fn span_of(path: &str, source: &str, pattern: &str) -> SourceSpan {
    let start = source.find(pattern).expect("pattern not found in source");
    span(path, source, start, start + pattern.len())
}

/// A `File` root covering the whole source.
pub fn file(path: &str, source: &str, children: Vec<Node>) -> SourceTree {
    let root =
        Node::new(NodeKind::File, span(path, source, 0, source.len())).with_children(children);
    SourceTree::new(path, source, root)
}

/// A `Function` node spanning the first occurrence of `decl`, with the name
/// span located inside the declaration text.
pub fn function(path: &str, source: &str, decl: &str, name: &str, children: Vec<Node>) -> Node {
    let decl_start = source.find(decl).expect("declaration not found in source");
    let name_start = decl_start + decl.find(name).expect("name not found in declaration");
    Node::new(
        NodeKind::Function {
            name: name.to_string(),
            name_span: span(path, source, name_start, name_start + name.len()),
        },
        span(path, source, decl_start, decl_start + decl.len()),
    )
    .with_children(children)
}

pub fn return_at(path: &str, source: &str, text: &str) -> Node {
    Node::new(NodeKind::Return, span_of(path, source, text))
}

pub fn identifier(path: &str, source: &str, name: &str) -> Node {
    Node::new(NodeKind::Identifier { name: name.to_string() }, span_of(path, source, name))
}

pub fn call(path: &str, source: &str, text: &str, callee: &str) -> Node {
    Node::new(NodeKind::Call { callee: callee.to_string() }, span_of(path, source, text))
}

/// Run the built-in rule set over one tree, without an oracle.
pub fn analyze_with(toml: &str, tree: &SourceTree) -> Analysis {
    let config = Config::from_toml_str(toml).unwrap();
    let mut rule_set = smelt::rules::builtin_provider()
        .instantiate(&config, &ActivationPolicy::default())
        .unwrap();
    smelt::analyze(tree, &mut rule_set, None)
}

pub fn findings_of<'a>(analysis: &'a Analysis, rule_id: &str) -> Vec<&'a Finding> {
    analysis
        .findings
        .iter()
        .filter(|finding| finding.rule_id == rule_id)
        .collect()
}
