//! Expression arena.
//!
//! Struct-of-arrays layout: `kinds` and `types` are parallel arrays
//! indexed by [`ExprId`]; block bodies and argument lists live in the
//! flat `expr_lists` vector addressed by [`ExprRange`], case arms in
//! `branches` addressed by [`BranchRange`].

use crate::ast::{CaseBranch, ExprKind};
use crate::{BranchRange, ExprId, ExprRange, Name};

/// Convert an arena length to `u32`, panicking on overflow.
#[inline]
fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}

/// Arena owning every expression node of a program.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    /// Expression kinds (parallel with `types`).
    kinds: Vec<ExprKind>,
    /// Static type of each node, as a class name (or `SELF_TYPE`).
    types: Vec<Name>,
    /// Flattened expression ID lists (block bodies, arguments).
    expr_lists: Vec<ExprId>,
    /// Case branches.
    branches: Vec<CaseBranch>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node with its static type, returning its ID.
    pub fn alloc(&mut self, kind: ExprKind, ty: Name) -> ExprId {
        let id = ExprId::new(to_u32(self.kinds.len(), "expressions"));
        self.kinds.push(kind);
        self.types.push(ty);
        id
    }

    /// Allocate a list of expression IDs, returning its range.
    pub fn alloc_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expression list entries");
        self.expr_lists.extend(ids);
        let len = to_u32(self.expr_lists.len(), "expression list entries") - start;
        ExprRange::new(start, len)
    }

    /// Allocate case branches, returning their range.
    pub fn alloc_branches(&mut self, branches: impl IntoIterator<Item = CaseBranch>) -> BranchRange {
        let start = to_u32(self.branches.len(), "case branches");
        self.branches.extend(branches);
        let len = to_u32(self.branches.len(), "case branches") - start;
        BranchRange::new(start, len)
    }

    /// Get the kind of a node.
    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.kinds[id.index()]
    }

    /// Get the static type of a node.
    #[inline]
    pub fn ty(&self, id: ExprId) -> Name {
        self.types[id.index()]
    }

    /// Get the expression IDs of a list range.
    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    /// Get the branches of a case range.
    #[inline]
    pub fn branches(&self, range: BranchRange) -> &[CaseBranch] {
        let start = range.start as usize;
        &self.branches[start..start + range.len()]
    }

    /// True if `id` is absent or the no-value sentinel.
    pub fn is_no_expr(&self, id: ExprId) -> bool {
        !id.is_present() || matches!(self.kind(id), ExprKind::NoExpr)
    }

    /// Iterate all nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &ExprKind)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| (ExprId::new(to_u32(i, "expressions")), kind))
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests;
