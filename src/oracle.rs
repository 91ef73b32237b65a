use crate::span::SourceSpan;
use crate::tree::Node;

/// Resolved type/declaration information for a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: String,
    pub declared_type: Option<String>,
    pub declaration: Option<SourceSpan>,
}

/// Optional symbol-resolution service backing type-aware rules.
///
/// An oracle may be backed by a shared compilation and queried concurrently
/// by several file traversals, so queries must be pure. `resolve` returning
/// `None` means the node cannot be resolved, which is a normal outcome and
/// not an error. Rules that declare a resolution requirement are skipped
/// wholesale by the engine when no oracle (or no sufficiently capable
/// oracle) is available for the run.
pub trait SymbolOracle: Sync {
    fn resolve(&self, node: &Node) -> Option<SymbolInfo>;

    /// Whether the oracle was built from a full compilation with complete
    /// binding information, as opposed to a single-file approximation.
    fn full_resolution(&self) -> bool {
        false
    }
}
