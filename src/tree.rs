//! The source tree handed over by the external parser.
//!
//! The parser frontend is an opaque collaborator: it either produces a fully
//! valid [`SourceTree`] or fails upstream, so this crate never sees a
//! partially-parsed file. Nodes form a closed set of kinds; the dispatch
//! engine matches on [`NodeKind`] instead of relying on an open type
//! hierarchy.

use std::path::PathBuf;

use crate::span::SourceSpan;

/// An immutable parsed file: raw text plus the node tree covering it.
#[derive(Debug, Clone)]
pub struct SourceTree {
    pub path: PathBuf,
    pub source: String,
    pub root: Node,
}

impl SourceTree {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>, root: Node) -> Self {
        Self { path: path.into(), source: source.into(), root }
    }
}

/// A single typed node. `suppressions` holds the rule ids named by a
/// suppression annotation the parser attached to this node; they cover the
/// node's whole span.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: SourceSpan,
    pub suppressions: Vec<String>,
    pub children: Vec<Node>,
}

/// The closed set of node kinds: declarations, statements and expressions,
/// plus the `File` root.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    File,
    // Declarations. `name_span` covers the declared identifier itself, which
    // is where name-related findings are reported.
    Class { name: String, name_span: SourceSpan },
    Function { name: String, name_span: SourceSpan },
    Variable { name: String, name_span: SourceSpan },
    // Statements
    Import { path: String },
    Block,
    If,
    Loop,
    Return,
    // Expressions
    Call { callee: String },
    Binary { operator: String },
    Unary { operator: String },
    Identifier { name: String },
    Literal { value: String },
}

impl Node {
    pub fn new(kind: NodeKind, span: SourceSpan) -> Self {
        Self { kind, span, suppressions: Vec::new(), children: Vec::new() }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_suppressions(mut self, rules: Vec<String>) -> Self {
        self.suppressions = rules;
        self
    }

    /// The span of the declared identifier, for declaration kinds.
    pub fn name_span(&self) -> Option<&SourceSpan> {
        match &self.kind {
            NodeKind::Class { name_span, .. }
            | NodeKind::Function { name_span, .. }
            | NodeKind::Variable { name_span, .. } => Some(name_span),
            _ => None,
        }
    }

    /// Pre-order iterator over this node and everything below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
