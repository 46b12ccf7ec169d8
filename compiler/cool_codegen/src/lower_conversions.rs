//! Value representation changes and emitted runtime checks.
//!
//! `Int` and `Bool` travel unboxed as `i32`/`i1`. They are boxed when
//! they flow into an object-typed position (an `Object` argument, a case
//! scrutinee, a dispatch receiver) and unboxed by loading `val` when an
//! object flows back into an `Int`/`Bool` position.

use crate::class_table::ClassId;
use crate::expr_lowerer::ExprLowerer;
use crate::ir_writer::IntPredicate;
use crate::layout::{vtable_field, FIRST_ATTR_FIELD};
use crate::operand::{Const, OpType, Operand, OperandKind};
use crate::runtime_decl;
use crate::CodegenError;

impl ExprLowerer<'_> {
    /// Convert `value` to the representation `target`.
    ///
    /// The no-value sentinel becomes the target's zero value; a `void`
    /// target accepts anything unchanged.
    pub(crate) fn conform(&mut self, value: Operand, target: &OpType) -> Result<Operand, CodegenError> {
        if value.ty() == target || *target == OpType::Void {
            return Ok(value);
        }
        if value.is_no_value() {
            return target.zero().ok_or_else(|| {
                CodegenError::internal(format!("no zero value of type {target}"))
            });
        }
        match (value.ty(), target) {
            (OpType::Int32 | OpType::Int1, OpType::Ptr(_)) => {
                let boxed = self.box_value(value)?;
                self.conform(boxed, target)
            }
            (OpType::Ptr(_), OpType::Int32 | OpType::Int1) => self.unbox(value, target),
            (OpType::Ptr(_), OpType::Ptr(_)) => {
                if let OperandKind::Const(Const::Null) = value.kind() {
                    return Ok(Operand::null(target.clone()));
                }
                let cast = self.temp(target.clone());
                self.out.bitcast(&cast, &value);
                Ok(cast)
            }
            _ => Err(CodegenError::internal(format!(
                "cannot convert {} to {target}",
                value.ty()
            ))),
        }
    }

    /// The boxing class for an unboxed representation.
    fn box_class(&self, ty: &OpType) -> Result<ClassId, CodegenError> {
        let name = match ty {
            OpType::Int32 => self.cx.known.int,
            OpType::Int1 => self.cx.known.bool_,
            other => {
                return Err(CodegenError::internal(format!("no box for {other}")));
            }
        };
        self.cx.class_id(name)
    }

    /// `C_new()` followed by `C_init(box, value)`.
    fn box_value(&mut self, value: Operand) -> Result<Operand, CodegenError> {
        let class = self.box_class(value.ty())?;
        let ctor = Operand::global(
            self.cx.constructor_symbol(class),
            self.cx.constructor_type(class).ptr(),
        );
        let boxed = self.temp(self.cx.object_type(class));
        self.out.call(Some(&boxed), &ctor, &[]);
        let init = runtime_decl::box_init(self.cx.class_name(class), value.ty().clone());
        self.out.call(None, &init, &[boxed.clone(), value]);
        Ok(boxed)
    }

    /// Load `val` out of an `Int` or `Bool` object.
    fn unbox(&mut self, value: Operand, target: &OpType) -> Result<Operand, CodegenError> {
        let class = self.box_class(target)?;
        let object = self.conform(value, &self.cx.object_type(class))?;
        let ptr = self.field_ptr(&object, FIRST_ATTR_FIELD, target.clone());
        Ok(self.load(&ptr))
    }

    /// Initial value of a slot of type `ty`: `0`, `false`, `""` or `null`.
    pub(crate) fn default_value(&mut self, ty: &OpType) -> Result<Operand, CodegenError> {
        let string = self.cx.class_id(self.cx.known.string)?;
        if *ty == self.cx.object_type(string) {
            let ctor = Operand::global(
                self.cx.constructor_symbol(string),
                self.cx.constructor_type(string).ptr(),
            );
            let empty = self.temp(ty.clone());
            self.out.call(Some(&empty), &ctor, &[]);
            return Ok(empty);
        }
        ty.zero()
            .ok_or_else(|| CodegenError::internal(format!("no default value of type {ty}")))
    }

    // -----------------------------------------------------------------------
    // Runtime checks
    // -----------------------------------------------------------------------

    /// `br cond, abort, ok` and continue in `ok`.
    pub(crate) fn abort_if(&mut self, cond: &Operand, ok: &str) {
        let abort = self.env.abort_label();
        self.out.cond_br(cond, abort, ok);
        self.out.begin_block(ok);
    }

    /// Abort when `object` is null. `self` and globals are never void.
    pub(crate) fn void_check(&mut self, object: &Operand, ok: &str) {
        if object == self.env.self_value() || matches!(object.kind(), OperandKind::Global(_)) {
            return;
        }
        let is_void = self.temp(OpType::Int1);
        let null = Operand::null(object.ty().clone());
        self.out.icmp(IntPredicate::Eq, &is_void, object, &null);
        self.abort_if(&is_void, ok);
    }

    /// Load the vtable pointer of an object typed `%class*`.
    pub(crate) fn load_vtable(&mut self, object: &Operand, class: ClassId) -> Operand {
        let vtable_ptr = self.cx.vtable_type(class).ptr();
        let field = self.field_ptr(object, 0, vtable_ptr);
        self.load(&field)
    }

    /// Load field `field` of the vtable of `object`.
    pub(crate) fn load_vtable_field(
        &mut self,
        object: &Operand,
        class: ClassId,
        field: u32,
        ty: OpType,
    ) -> Operand {
        let vtable = self.load_vtable(object, class);
        let ptr = self.field_ptr(&vtable, field, ty);
        self.load(&ptr)
    }

    /// Runtime class tag of `object`.
    pub(crate) fn load_tag(&mut self, object: &Operand, class: ClassId) -> Operand {
        self.load_vtable_field(object, class, vtable_field::TAG, OpType::Int32)
    }
}
