//! Per-function compilation: methods and constructors.
//!
//! Each function is built in two passes over its bodies:
//!
//! 1. **Slots**: formals get an entry-block slot, then [`AllocaPass`]
//!    reserves the slots the body needs. Every `alloca` therefore precedes
//!    the first branch.
//! 2. **Body**: [`ExprLowerer`] emits the instructions, taking its slots
//!    from the pass-1 [`SlotTable`](crate::alloca::SlotTable).
//!
//! Runtime failures branch to a shared `abort:` block appended after the
//! body when anything used it.

use cool_ir::MethodDecl;
use tracing::debug;

use crate::alloca::AllocaPass;
use crate::class_table::ClassId;
use crate::context::CodegenCx;
use crate::environment::{param_register, param_slot, Environment, ABORT_LABEL};
use crate::expr_lowerer::ExprLowerer;
use crate::ir_writer::IrWriter;
use crate::operand::Operand;
use crate::runtime_decl;
use crate::CodegenError;

pub struct FunctionCompiler<'a> {
    cx: &'a CodegenCx<'a>,
    out: &'a mut IrWriter,
}

impl<'a> FunctionCompiler<'a> {
    pub fn new(cx: &'a CodegenCx<'a>, out: &'a mut IrWriter) -> Self {
        Self { cx, out }
    }

    /// `define ret @C_m(%C* %self, formals...)`
    pub fn compile_method(&mut self, class: ClassId, method: &MethodDecl) -> Result<(), CodegenError> {
        let cx = self.cx;
        let this = Operand::register("self", cx.object_type(class));
        let mut env = Environment::new(class, Some(method.name), this.clone());
        let ret_ty = cx.value_type(method.return_type, class);

        let mut params = Vec::with_capacity(method.formals.len() + 1);
        params.push(this);
        for formal in &method.formals {
            params.push(Operand::register(
                param_register(cx.name(formal.name)),
                cx.value_type(formal.type_decl, class),
            ));
        }
        self.out
            .define(&ret_ty, &cx.method_symbol(class, method.name), &params);

        // Pass 1: slots.
        let mut formal_slots = Vec::with_capacity(method.formals.len());
        for (formal, param) in method.formals.iter().zip(&params[1..]) {
            let slot = Operand::register(
                param_slot(cx.name(formal.name)),
                param.ty().clone().ptr(),
            );
            self.out.alloca(&slot);
            formal_slots.push((formal.name, param, slot));
        }
        let slots = {
            let mut pass = AllocaPass::new(cx, self.out, &mut env);
            pass.visit(method.body)?;
            pass.finish()
        };
        for (name, param, slot) in formal_slots {
            self.out.store(param, &slot);
            env.bind(name, slot);
        }

        // Pass 2: body.
        {
            let mut lowerer = ExprLowerer::new(cx, self.out, &mut env, &slots);
            let value = lowerer.lower(method.body)?;
            let value = lowerer.conform(value, &ret_ty)?;
            lowerer.out.ret(&value);
        }
        self.finish(&env);

        debug!(
            class = cx.class_name(class),
            method = cx.name(method.name),
            slots = slots.len(),
            "compiled method"
        );
        Ok(())
    }

    /// `define %C* @C_new()`: allocate, install the vtable, store every
    /// attribute's default, then run the initializers base class first.
    pub fn compile_constructor(&mut self, class: ClassId) -> Result<(), CodegenError> {
        let cx = self.cx;
        let layout = cx.layout(class);
        let obj_ty = cx.object_type(class);
        let this = Operand::register("self", obj_ty.clone());
        let mut env = Environment::new(class, None, this.clone());
        self.out
            .define(&obj_ty, &cx.constructor_symbol(class), &[]);

        let slots = {
            let mut pass = AllocaPass::new(cx, self.out, &mut env);
            for attr in layout.attrs() {
                pass.visit(attr.init)?;
            }
            pass.finish()
        };

        {
            let mut lowerer = ExprLowerer::new(cx, self.out, &mut env, &slots);
            lowerer.allocate_instance(class, &this);
            for attr in layout.attrs() {
                let default = lowerer.default_value(&cx.attr_type(attr))?;
                let place = lowerer.attr_place(attr);
                lowerer.out.store(&default, &place);
            }
            for attr in layout.attrs() {
                if cx.arena.is_no_expr(attr.init) {
                    continue;
                }
                let value = lowerer.lower(attr.init)?;
                let place = lowerer.attr_place(attr);
                lowerer.store_value(&value, &place)?;
            }
            lowerer.out.ret(&this);
        }
        self.finish(&env);

        debug!(class = cx.class_name(class), "compiled constructor");
        Ok(())
    }

    /// Append the abort block if the body branched to it, and close the function.
    fn finish(&mut self, env: &Environment) {
        if env.abort_used() {
            self.out.begin_block(ABORT_LABEL);
            self.out.call(None, &runtime_decl::abort(), &[]);
            self.out.unreachable();
        }
        self.out.end_define();
    }
}
