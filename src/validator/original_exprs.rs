use std::ptr;

use indexmap::IndexMap;

use crate::ast::SqlExpr;

/// Maps an expanded (qualified, rewritten) expression back to what the user wrote.
pub trait OriginalExprs {
    fn original(&self, expr: &SqlExpr) -> Option<&SqlExpr>;
}

/// Expansion record: each node of an expanded tree paired with the node of
/// the source tree it was rewritten from.
///
/// Nodes are identified by address, not by value, so equal expansions of
/// different source text never collide. Both trees are borrowed for `'e` and
/// so stay in place while the record is in use.
#[derive(Debug, Clone, Default)]
pub struct ExpansionMap<'e> {
    originals: IndexMap<*const SqlExpr, &'e SqlExpr>,
}

impl<'e> ExpansionMap<'e> {
    pub fn new() -> Self {
        Self { originals: IndexMap::new() }
    }

    /// Pair `expanded` with `original`, then their operands position by
    /// position. Expansion keeps the shape of the tree: columns become
    /// columns or niladic calls, calls and windows keep their operands.
    pub fn record(&mut self, expanded: &'e SqlExpr, original: &'e SqlExpr) {
        self.originals.insert(ptr::from_ref(expanded), original);
        match (expanded, original) {
            (SqlExpr::Call(expanded), SqlExpr::Call(original)) => {
                for (e, o) in expanded.operands.iter().zip(&original.operands) {
                    self.record(e, o);
                }
            }
            (SqlExpr::Window(expanded), SqlExpr::Window(original)) => {
                let expanded_items = expanded.partition_by.iter().chain(&expanded.order_by);
                let original_items = original.partition_by.iter().chain(&original.order_by);
                for (e, o) in expanded_items.zip(original_items) {
                    self.record(e, o);
                }
            }
            _ => {}
        }
    }
}

impl OriginalExprs for ExpansionMap<'_> {
    fn original(&self, expr: &SqlExpr) -> Option<&SqlExpr> {
        self.originals.get(&ptr::from_ref(expr)).copied()
    }
}
