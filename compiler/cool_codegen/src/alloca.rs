//! Stack-slot pre-pass.
//!
//! The emitted IR has no phi nodes, so every value that must survive a
//! control-flow join lives in a stack slot. This pass walks a body before
//! any instruction is emitted for it and writes one `alloca` per binding
//! site into the entry block:
//!
//! - `if`: one result slot of the conditional's static type
//! - `let`: one slot of the declared type
//! - `case`: one result slot, plus one slot per branch variable
//!
//! Literals, identifiers, arithmetic and comparisons get nothing; their
//! values stay in registers. The resulting [`SlotTable`] is keyed by node
//! so lowering finds exactly the slot allocated here.

use cool_ir::{ExprId, ExprKind, Name};
use cool_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::context::CodegenCx;
use crate::environment::Environment;
use crate::ir_writer::IrWriter;
use crate::operand::{OpType, Operand};
use crate::CodegenError;

/// Slots allocated for one function.
#[derive(Debug, Default)]
pub struct SlotTable {
    exprs: FxHashMap<ExprId, Operand>,
    branches: FxHashMap<(ExprId, usize), Operand>,
}

impl SlotTable {
    /// Slot of an `if`, `let` or `case` node.
    pub fn expr(&self, id: ExprId) -> Option<&Operand> {
        self.exprs.get(&id)
    }

    /// Slot of the `index`th branch variable of a `case` node.
    pub fn branch(&self, id: ExprId, index: usize) -> Option<&Operand> {
        self.branches.get(&(id, index))
    }

    pub fn len(&self) -> usize {
        self.exprs.len() + self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct AllocaPass<'a> {
    cx: &'a CodegenCx<'a>,
    out: &'a mut IrWriter,
    env: &'a mut Environment,
    slots: SlotTable,
}

impl<'a> AllocaPass<'a> {
    pub fn new(cx: &'a CodegenCx<'a>, out: &'a mut IrWriter, env: &'a mut Environment) -> Self {
        Self {
            cx,
            out,
            env,
            slots: SlotTable::default(),
        }
    }

    pub fn finish(self) -> SlotTable {
        self.slots
    }

    /// Allocate slots for `id` and everything below it.
    pub fn visit(&mut self, id: ExprId) -> Result<(), CodegenError> {
        if !id.is_present() {
            return Ok(());
        }
        ensure_sufficient_stack(|| self.visit_inner(id))
    }

    fn visit_inner(&mut self, id: ExprId) -> Result<(), CodegenError> {
        let arena = self.cx.arena;
        match *arena.kind(id) {
            ExprKind::Cond {
                pred,
                then_branch,
                else_branch,
            } => {
                let ty = self.cx.value_type(arena.ty(id), self.env.class());
                if let Some(slot) = self.alloc_temp("iftmp", ty) {
                    self.slots.exprs.insert(id, slot);
                }
                self.visit(pred)?;
                self.visit(then_branch)?;
                self.visit(else_branch)
            }
            ExprKind::Let {
                name,
                type_decl,
                init,
                body,
            } => {
                let ty = self.cx.value_type(type_decl, self.env.class());
                if let Some(slot) = self.alloc_binding(name, ty) {
                    self.slots.exprs.insert(id, slot);
                }
                self.visit(init)?;
                self.visit(body)
            }
            ExprKind::Case {
                scrutinee,
                branches,
            } => {
                let ty = self.cx.value_type(arena.ty(id), self.env.class());
                if let Some(slot) = self.alloc_temp("casetmp", ty) {
                    self.slots.exprs.insert(id, slot);
                }
                self.visit(scrutinee)?;
                for (index, branch) in arena.branches(branches).iter().enumerate() {
                    let ty = self.cx.value_type(branch.type_decl, self.env.class());
                    if let Some(slot) = self.alloc_binding(branch.name, ty) {
                        self.slots.branches.insert((id, index), slot);
                    }
                    self.visit(branch.body)?;
                }
                Ok(())
            }
            ExprKind::Loop { pred, body } => {
                self.visit(pred)?;
                self.visit(body)
            }
            ExprKind::Block(range) => {
                for &expr in arena.list(range) {
                    self.visit(expr)?;
                }
                Ok(())
            }
            ExprKind::Assign { value, .. } => self.visit(value),
            ExprKind::Binary { left, right, .. } => {
                self.visit(left)?;
                self.visit(right)
            }
            ExprKind::Unary { operand, .. } | ExprKind::IsVoid(operand) => self.visit(operand),
            ExprKind::Dispatch { receiver, args, .. }
            | ExprKind::StaticDispatch { receiver, args, .. } => {
                self.visit(receiver)?;
                for &arg in arena.list(args) {
                    self.visit(arg)?;
                }
                Ok(())
            }
            ExprKind::Ident(_)
            | ExprKind::Int(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::NoExpr
            | ExprKind::New(_) => Ok(()),
        }
    }

    /// `%<hint>.N = alloca ty` for a compiler temporary; nothing for `void`.
    fn alloc_temp(&mut self, hint: &str, ty: OpType) -> Option<Operand> {
        if ty == OpType::Void {
            return None;
        }
        let name = self.env.fresh_slot(hint);
        Some(self.emit(name, ty))
    }

    /// `%<ident>.slot.N = alloca ty` for a `let` or case variable.
    fn alloc_binding(&mut self, ident: Name, ty: OpType) -> Option<Operand> {
        if ty == OpType::Void {
            return None;
        }
        let name = self.env.binding_slot(self.cx.name(ident));
        Some(self.emit(name, ty))
    }

    fn emit(&mut self, name: String, ty: OpType) -> Operand {
        let slot = Operand::register(name, ty.ptr());
        self.out.alloca(&slot);
        slot
    }
}
