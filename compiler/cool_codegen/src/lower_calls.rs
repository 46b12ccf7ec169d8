//! Dispatch and allocation lowering.

use cool_ir::{ExprId, ExprRange, Name};
use smallvec::SmallVec;

use crate::class_table::ClassId;
use crate::environment::Counter;
use crate::expr_lowerer::ExprLowerer;
use crate::layout::{vtable_field, MethodSlot};
use crate::operand::{OpType, Operand};
use crate::runtime_decl;
use crate::CodegenError;

type Args = SmallVec<[Operand; 4]>;

impl<'a> ExprLowerer<'a> {
    /// `receiver.method(args)` through the receiver's vtable.
    ///
    /// Arguments are evaluated left to right, then the receiver.
    pub(crate) fn lower_dispatch(
        &mut self,
        id: ExprId,
        receiver: ExprId,
        method: Name,
        args: ExprRange,
    ) -> Result<Operand, CodegenError> {
        let cx = self.cx;
        let args = self.lower_args(args)?;
        let value = self.lower(receiver)?;
        let class = cx.static_class(cx.arena.ty(receiver), self.env.class())?;
        let slot = self.method_slot(class, method)?;

        self.check_receiver(&value);
        let object = self.conform(value, &cx.object_type(class))?;

        let fn_ty = cx.method_type(slot, class).ptr();
        let callee = self.load_vtable_field(&object, class, slot.vtable_field(), fn_ty);
        self.emit_method_call(id, &callee, slot, class, object, args)
    }

    /// `receiver@class.method(args)`, calling `class`'s implementation directly.
    pub(crate) fn lower_static_dispatch(
        &mut self,
        id: ExprId,
        receiver: ExprId,
        class: Name,
        method: Name,
        args: ExprRange,
    ) -> Result<Operand, CodegenError> {
        let cx = self.cx;
        let args = self.lower_args(args)?;
        let value = self.lower(receiver)?;
        let named = cx.class_id(class)?;
        let slot = self.method_slot(named, method)?;
        let owner = slot.impl_class;

        self.check_receiver(&value);
        let object = self.conform(value, &cx.object_type(owner))?;

        let callee = Operand::global(
            cx.method_symbol(owner, method),
            cx.method_type(slot, owner).ptr(),
        );
        self.emit_method_call(id, &callee, slot, owner, object, args)
    }

    /// Void check on a receiver before it is converted. Unboxed values are
    /// never void.
    fn check_receiver(&mut self, value: &Operand) {
        if matches!(value.ty(), OpType::Int32 | OpType::Int1) {
            return;
        }
        let ok = format!("dispatch.ok.{}", self.env.next(Counter::Dispatch));
        self.void_check(value, &ok);
    }

    fn lower_args(&mut self, args: ExprRange) -> Result<Args, CodegenError> {
        let arena = self.cx.arena;
        let mut values = Args::new();
        for &arg in arena.list(args) {
            values.push(self.lower(arg)?);
        }
        Ok(values)
    }

    fn method_slot(&self, class: ClassId, method: Name) -> Result<&'a MethodSlot, CodegenError> {
        self.cx
            .layout(class)
            .method(method)
            .ok_or_else(|| CodegenError::UnknownMethod {
                class: self.cx.class_name(class).to_owned(),
                method: self.cx.name(method).to_owned(),
            })
    }

    /// Call `callee` with `receiver` typed as `class`, converting arguments
    /// to the formal types and the result to the node's static type.
    fn emit_method_call(
        &mut self,
        id: ExprId,
        callee: &Operand,
        slot: &MethodSlot,
        class: ClassId,
        receiver: Operand,
        args: Args,
    ) -> Result<Operand, CodegenError> {
        let cx = self.cx;
        let mut call_args = Args::with_capacity(args.len() + 1);
        call_args.push(receiver);
        for (arg, formal) in args.into_iter().zip(&slot.formals) {
            let ty = cx.value_type(formal.type_decl, class);
            call_args.push(self.conform(arg, &ty)?);
        }

        let ret_ty = cx.value_type(slot.return_type, class);
        if ret_ty == OpType::Void {
            self.out.call(None, callee, &call_args);
            return Ok(Operand::no_value());
        }
        let result = self.temp(ret_ty);
        self.out.call(Some(&result), callee, &call_args);
        let target = self.static_type(id);
        self.conform(result, &target)
    }

    /// `new C` calls `C_new`; `new SELF_TYPE` calls the constructor stored
    /// in the vtable of `self`, so it follows the dynamic class.
    pub(crate) fn lower_new(&mut self, id: ExprId, class: Name) -> Result<Operand, CodegenError> {
        let cx = self.cx;
        let object = if class == cx.known.self_type {
            let current = self.env.class();
            let this = self.env.self_value().clone();
            let ctor_ty = cx.constructor_type(current).ptr();
            let ctor = self.load_vtable_field(&this, current, vtable_field::NEW, ctor_ty);
            let object = self.temp(cx.object_type(current));
            self.out.call(Some(&object), &ctor, &[]);
            object
        } else {
            let class = cx.class_id(class)?;
            let ctor = Operand::global(
                cx.constructor_symbol(class),
                cx.constructor_type(class).ptr(),
            );
            let object = self.temp(cx.object_type(class));
            self.out.call(Some(&object), &ctor, &[]);
            object
        };
        let target = self.static_type(id);
        self.conform(object, &target)
    }
}

impl ExprLowerer<'_> {
    /// Body prologue of `C_new`: `malloc` the instance size recorded in
    /// the vtable prototype into `this`, then install the vtable pointer.
    pub(crate) fn allocate_instance(&mut self, class: ClassId, this: &Operand) {
        let cx = self.cx;
        let vtable_ty = cx.vtable_type(class);
        let prototype = Operand::global(cx.vtable_global(class), vtable_ty.clone().ptr());
        let size_ptr = self.field_ptr(&prototype, vtable_field::SIZE, OpType::Int32);
        let size = self.load(&size_ptr);
        let raw = self.temp(OpType::c_string());
        self.out.call(Some(&raw), &runtime_decl::malloc(), &[size]);
        self.out.bitcast(this, &raw);
        let vtable_slot = self.field_ptr(this, 0, vtable_ty.ptr());
        self.out.store(&prototype, &vtable_slot);
    }
}
