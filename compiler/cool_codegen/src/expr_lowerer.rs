//! Expression lowering coordinator.
//!
//! `ExprLowerer` holds the per-function state (environment, pre-allocated
//! slots, output) and dispatches each `ExprKind` to a focused `lower_*`
//! method implemented in a separate file.
//!
//! ```text
//! ExprLowerer
//!   ├── lower_literals.rs     : Int, Bool, Str, NoExpr, Ident, Assign
//!   ├── lower_operators.rs    : Binary, Unary, IsVoid
//!   ├── lower_control_flow.rs : Cond, Loop, Block, Let, Case
//!   ├── lower_calls.rs        : Dispatch, StaticDispatch, New
//!   └── lower_conversions.rs  : boxing, unboxing, defaults, runtime checks
//! ```
//!
//! Every `lower_*` call leaves the writer positioned in the block where
//! the caller continues, and returns the operand holding the node's value.

use cool_ir::{ExprId, ExprKind};
use cool_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::alloca::SlotTable;
use crate::context::CodegenCx;
use crate::environment::Environment;
use crate::ir_writer::IrWriter;
use crate::operand::{OpType, Operand};
use crate::CodegenError;

pub struct ExprLowerer<'a> {
    pub(crate) cx: &'a CodegenCx<'a>,
    pub(crate) out: &'a mut IrWriter,
    pub(crate) env: &'a mut Environment,
    pub(crate) slots: &'a SlotTable,
}

impl<'a> ExprLowerer<'a> {
    pub fn new(
        cx: &'a CodegenCx<'a>,
        out: &'a mut IrWriter,
        env: &'a mut Environment,
        slots: &'a SlotTable,
    ) -> Self {
        Self {
            cx,
            out,
            env,
            slots,
        }
    }

    /// Lower one expression.
    pub fn lower(&mut self, id: ExprId) -> Result<Operand, CodegenError> {
        if !id.is_present() {
            return Ok(Operand::no_value());
        }
        ensure_sufficient_stack(|| self.lower_inner(id))
    }

    fn lower_inner(&mut self, id: ExprId) -> Result<Operand, CodegenError> {
        let kind = *self.cx.arena.kind(id);
        trace!(node = kind.label(), id = id.raw(), "lowering");
        if self.cx.options.annotate {
            self.out.comment(kind.label());
        }

        match kind {
            // --- Literals ---
            ExprKind::Int(value) => Ok(Operand::int(value)),
            ExprKind::Bool(value) => Ok(Operand::bool(value)),
            ExprKind::Str(text) => self.lower_string(text),
            ExprKind::NoExpr => Ok(Operand::no_value()),

            // --- Bindings ---
            ExprKind::Ident(name) => self.lower_ident(id, name),
            ExprKind::Assign { name, value } => self.lower_assign(name, value),

            // --- Operators ---
            ExprKind::Binary { op, left, right } => self.lower_binary(op, left, right),
            ExprKind::Unary { op, operand } => self.lower_unary(op, operand),
            ExprKind::IsVoid(operand) => self.lower_is_void(operand),

            // --- Control flow ---
            ExprKind::Cond {
                pred,
                then_branch,
                else_branch,
            } => self.lower_cond(id, pred, then_branch, else_branch),
            ExprKind::Loop { pred, body } => self.lower_loop(pred, body),
            ExprKind::Block(range) => self.lower_block(range),
            ExprKind::Let {
                name, init, body, ..
            } => self.lower_let(id, name, init, body),
            ExprKind::Case {
                scrutinee,
                branches,
            } => self.lower_case(id, scrutinee, branches),

            // --- Objects ---
            ExprKind::Dispatch {
                receiver,
                method,
                args,
            } => self.lower_dispatch(id, receiver, method, args),
            ExprKind::StaticDispatch {
                receiver,
                class,
                method,
                args,
            } => self.lower_static_dispatch(id, receiver, class, method, args),
            ExprKind::New(class) => self.lower_new(id, class),
        }
    }

    // -----------------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------------

    /// A fresh `%vtmp.N` register of type `ty`.
    pub(crate) fn temp(&mut self, ty: OpType) -> Operand {
        Operand::register(self.env.fresh_temp(), ty)
    }

    /// IR type of the node's static type in the current class.
    pub(crate) fn static_type(&self, id: ExprId) -> OpType {
        self.cx.value_type(self.cx.arena.ty(id), self.env.class())
    }

    /// `dest = load ptr`, typed by the pointee.
    pub(crate) fn load(&mut self, ptr: &Operand) -> Operand {
        let ty = ptr.ty().pointee().cloned().unwrap_or(OpType::Void);
        let value = self.temp(ty);
        self.out.load(&value, ptr);
        value
    }

    /// Pointer to field `field` of `base`, typed `field_ty*`.
    pub(crate) fn field_ptr(&mut self, base: &Operand, field: u32, field_ty: OpType) -> Operand {
        let ptr = self.temp(field_ty.ptr());
        self.out.getelementptr(&ptr, base, &[0, field]);
        ptr
    }

    /// Store `value` into `slot`, converting to the slot's type.
    ///
    /// The no-value sentinel is never stored.
    pub(crate) fn store_value(&mut self, value: &Operand, slot: &Operand) -> Result<(), CodegenError> {
        if value.is_no_value() {
            return Ok(());
        }
        let target = slot.ty().pointee().cloned().unwrap_or(OpType::Void);
        let value = self.conform(value.clone(), &target)?;
        self.out.store(&value, slot);
        Ok(())
    }
}
