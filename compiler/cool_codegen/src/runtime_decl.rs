//! Declarations for everything the generated module expects the runtime
//! and libc to provide.
//!
//! The basic classes have no bodies here: their constructors, their
//! methods and the `Int_init`/`Bool_init` boxing helpers are all linked in.

use crate::context::CodegenCx;
use crate::ir_writer::IrWriter;
use crate::operand::{OpType, Operand, OperandKind};

fn function(name: &str, ret: OpType, params: Vec<OpType>) -> Operand {
    Operand::global(name, OpType::func(ret, params).ptr())
}

pub fn strcmp() -> Operand {
    function(
        "strcmp",
        OpType::Int32,
        vec![OpType::c_string(), OpType::c_string()],
    )
}

pub fn printf() -> Operand {
    function("printf", OpType::Int32, vec![OpType::c_string(), OpType::VarArg])
}

pub fn abort() -> Operand {
    function("abort", OpType::Void, Vec::new())
}

pub fn malloc() -> Operand {
    function("malloc", OpType::c_string(), vec![OpType::Int32])
}

/// `void @<class>_init(%<class>*, value)`, filling a freshly boxed value.
pub fn box_init(class: &str, value: OpType) -> Operand {
    function(
        &format!("{class}_init"),
        OpType::Void,
        vec![OpType::object(class), value],
    )
}

fn declare(out: &mut IrWriter, callee: &Operand) {
    let OperandKind::Global(name) = callee.kind() else {
        return;
    };
    if let Some(OpType::Func { ret, params }) = callee.ty().pointee() {
        out.declare(ret, name, params);
    }
}

/// Declare libc primitives, basic-class constructors and methods, and
/// the boxing initializers.
pub fn declare_runtime(cx: &CodegenCx<'_>, out: &mut IrWriter) {
    out.line("; external primitives");
    for primitive in [strcmp(), printf(), abort(), malloc()] {
        declare(out, &primitive);
    }
    out.blank();

    out.line("; runtime-provided classes");
    for &class in cx.table.tag_order() {
        let node = cx.table.node(class);
        if !node.basic {
            continue;
        }
        let ctor = cx.constructor_type(class);
        if let OpType::Func { ret, params } = &ctor {
            out.declare(ret, &cx.constructor_symbol(class), params);
        }
        for method in node.methods() {
            if let OpType::Func { ret, params } =
                cx.signature(&method.formals, method.return_type, class)
            {
                out.declare(&ret, &cx.method_symbol(class, method.name), &params);
            }
        }
    }
    declare(out, &box_init("Int", OpType::Int32));
    declare(out, &box_init("Bool", OpType::Int1));
    out.blank();
}
