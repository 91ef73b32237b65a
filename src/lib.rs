//! A rule execution engine for tree-based static analysis.
//!
//! The engine walks an immutable source tree (produced by an external
//! parser) exactly once per file and applies an ordered set of rules to
//! every node. Rules report [`Finding`]s; a post-traversal filtering layer
//! marks findings as suppressed based on in-source annotations and
//! configured path exclusions. Configuration is a hierarchical read-only
//! store resolved into typed rule parameters at construction time.
//!
//! ```
//! use smelt::{ActivationPolicy, Config, Node, NodeKind, SourceSpan, SourceTree};
//!
//! let config = Config::from_toml_str("[smells.return_count]\nmax = 1").unwrap();
//! let mut rule_set = smelt::rules::builtin_provider()
//!     .instantiate(&config, &ActivationPolicy::default())
//!     .unwrap();
//!
//! let span = SourceSpan::new("lib.src", (1, 1), (1, 1), 0, 0);
//! let tree = SourceTree::new("lib.src", "", Node::new(NodeKind::File, span));
//! let analysis = smelt::analyze(&tree, &mut rule_set, None);
//! assert!(analysis.findings.is_empty());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod finding;
pub mod oracle;
pub mod rule;
pub mod rule_set;
pub mod rules;
pub mod span;
pub mod suppression;
pub mod text;
pub mod tree;

pub use config::{Config, ConfigValue, RuleConfig, simple_pattern_to_regex};
pub use engine::{Analysis, analyze, analyze_files};
pub use error::ConfigError;
pub use finding::{Finding, Notice, Severity};
pub use oracle::{SymbolInfo, SymbolOracle};
pub use rule::{Descent, NodeVisitor, Rule, RuleContext, RuleMetadata};
pub use rule_set::{ActivationPolicy, RuleDescriptor, RuleFactory, RuleSet, RuleSetProvider};
pub use span::SourceSpan;
pub use suppression::SuppressionAnnotation;
pub use text::LineIndex;
pub use tree::{Node, NodeKind, SourceTree};
