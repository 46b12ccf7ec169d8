//! Whole-program driver.
//!
//! Runs the two global phases in order:
//!
//! 1. **Layout**: build the class table (install, link, tag), lay out every
//!    class, collect string constants, and check the entry point exists.
//! 2. **Emit**: declarations, string constants, struct types, vtable
//!    prototypes, then every user class's methods and constructor in tag
//!    order, then `@main`.
//!
//! No code is emitted until every layout is final, since any method may
//! refer to any class's fields or vtable.

use cool_ir::{KnownNames, Program, StringInterner};
use tracing::debug;

use crate::alloca::SlotTable;
use crate::class_table::{ClassId, ClassTable};
use crate::context::CodegenCx;
use crate::environment::Environment;
use crate::expr_lowerer::ExprLowerer;
use crate::function_compiler::FunctionCompiler;
use crate::ir_writer::{c_string_ptr, const_bitcast, escape_c_string, size_of, IrWriter};
use crate::layout::{Layouts, MethodSlot};
use crate::operand::{OpType, Operand};
use crate::runtime_decl;
use crate::strings::{byte_len, StringConstants};
use crate::{CodegenError, CodegenOptions};

/// Global holding the `printf` format used to report the entry result.
const REPORT_FORMAT_GLOBAL: &str = "main.printout.str";

/// Compile a type-checked program to textual LLVM IR.
pub fn generate(
    program: &Program,
    interner: &StringInterner,
    options: &CodegenOptions,
) -> Result<String, CodegenError> {
    // Phase 1: layout.
    let known = KnownNames::new(interner);
    let table = ClassTable::build(program, interner, &known)?;
    let layouts = Layouts::compute(&table);
    let strings = StringConstants::collect(&table, &program.arena);
    let cx = CodegenCx {
        interner,
        known,
        arena: &program.arena,
        table: &table,
        layouts: &layouts,
        strings: &strings,
        options,
    };
    let (entry_class, entry_slot) = find_entry(&cx)?;
    debug!(
        classes = table.len(),
        strings = strings.len(),
        "layout complete"
    );

    // Phase 2: emit.
    let mut out = IrWriter::new();
    runtime_decl::declare_runtime(&cx, &mut out);
    strings.emit(&cx, &mut out);
    emit_class_types(&cx, &mut out);
    emit_vtables(&cx, &mut out);

    let mut functions = FunctionCompiler::new(&cx, &mut out);
    for &class in table.tag_order() {
        let node = table.node(class);
        if node.basic {
            continue;
        }
        for method in node.methods() {
            functions.compile_method(class, method)?;
        }
        functions.compile_constructor(class)?;
    }

    emit_entry_point(&cx, &mut out, entry_class, entry_slot)?;
    Ok(out.into_output())
}

/// The entry class and the vtable slot of its entry method.
fn find_entry<'a>(cx: &CodegenCx<'a>) -> Result<(ClassId, &'a MethodSlot), CodegenError> {
    let options = cx.options;
    let class_name = cx.interner.intern(&options.entry_class);
    let class = cx
        .table
        .lookup(class_name)
        .ok_or_else(|| CodegenError::MissingClass {
            class: options.entry_class.clone(),
        })?;
    let method_name = cx.interner.intern(&options.entry_method);
    let slot = cx
        .layout(class)
        .method(method_name)
        .ok_or_else(|| CodegenError::MissingEntryMethod {
            class: options.entry_class.clone(),
            method: options.entry_method.clone(),
        })?;
    Ok((class, slot))
}

/// `%_C_vtable` and `%C` for every class, in tag order.
fn emit_class_types(cx: &CodegenCx<'_>, out: &mut IrWriter) {
    out.line("; class types");
    for &class in cx.table.tag_order() {
        let layout = cx.layout(class);

        let mut vtable = vec![
            OpType::Int32,
            OpType::Int32,
            OpType::c_string(),
            cx.constructor_type(class).ptr(),
        ];
        vtable.extend(layout.methods().iter().map(|m| cx.method_type(m, class).ptr()));
        out.type_def(&cx.vtable_struct(class), &vtable);

        let mut fields = vec![cx.vtable_type(class).ptr()];
        fields.extend(layout.attrs().iter().map(|a| cx.attr_type(a)));
        out.type_def(cx.class_name(class), &fields);
    }
    out.blank();
}

/// One constant `@_C_vtable_prototype` per class.
///
/// Slots whose body lives in an ancestor hold that ancestor's function,
/// cast to the slot type of this class.
fn emit_vtables(cx: &CodegenCx<'_>, out: &mut IrWriter) {
    out.line("; vtable prototypes");
    for &class in cx.table.tag_order() {
        let node = cx.table.node(class);
        let name = cx.class_name(class);
        let name_ptr = cx
            .strings
            .bytes_global(node.name)
            .map_or_else(|| "null".to_owned(), |g| c_string_ptr(&g, byte_len(name)));
        let ctor = Operand::global(cx.constructor_symbol(class), cx.constructor_type(class).ptr());

        let mut entries = vec![
            format!("i32 {}", node.tag),
            format!("i32 {}", size_of(name)),
            format!("i8* {name_ptr}"),
            ctor.typed().to_string(),
        ];
        for slot in cx.layout(class).methods() {
            let slot_ty = cx.method_type(slot, class).ptr();
            let body = Operand::global(
                cx.method_symbol(slot.impl_class, slot.name),
                cx.method_type(slot, slot.impl_class).ptr(),
            );
            if body.ty() == &slot_ty {
                entries.push(body.typed().to_string());
            } else {
                entries.push(format!("{slot_ty} {}", const_bitcast(&body, &slot_ty)));
            }
        }
        let init = format!("{{ {} }}", entries.join(", "));
        out.global_constant(&cx.vtable_global(class), false, &cx.vtable_type(class), &init);
    }
    out.blank();
}

/// `define i32 @main()`: construct the entry class, call the entry
/// method, optionally print an `Int` result, return 0.
fn emit_entry_point(
    cx: &CodegenCx<'_>,
    out: &mut IrWriter,
    class: ClassId,
    slot: &MethodSlot,
) -> Result<(), CodegenError> {
    let options = cx.options;
    let owner = slot.impl_class;
    let returns_int = slot.return_type == cx.known.int;
    let report = options.report_main_result && returns_int;

    let format_text = format!(
        "{}.{}() returned %d\n",
        options.entry_class, options.entry_method
    );
    let format_len = byte_len(&format_text);
    if report {
        let ty = OpType::Array(Box::new(OpType::Int8), format_len);
        let init = format!("c\"{}\"", escape_c_string(&format_text));
        out.global_constant(REPORT_FORMAT_GLOBAL, true, &ty, &init);
        out.blank();
    }

    out.define(&OpType::Int32, "main", &[]);
    let mut env = Environment::new(class, None, Operand::null(cx.object_type(class)));
    let slots = SlotTable::default();
    let mut lowerer = ExprLowerer::new(cx, out, &mut env, &slots);

    let ctor = Operand::global(cx.constructor_symbol(class), cx.constructor_type(class).ptr());
    let object = lowerer.temp(cx.object_type(class));
    lowerer.out.call(Some(&object), &ctor, &[]);

    let receiver = lowerer.conform(object, &cx.object_type(owner))?;
    let mut args = vec![receiver];
    for formal in &slot.formals {
        let ty = cx.value_type(formal.type_decl, owner);
        args.push(lowerer.conform(Operand::no_value(), &ty)?);
    }
    let callee = Operand::global(
        cx.method_symbol(owner, slot.name),
        cx.method_type(slot, owner).ptr(),
    );
    let result = lowerer.temp(cx.value_type(slot.return_type, owner));
    lowerer.out.call(Some(&result), &callee, &args);

    if report {
        let format = lowerer.temp(OpType::c_string());
        let global = Operand::global(
            REPORT_FORMAT_GLOBAL,
            OpType::Array(Box::new(OpType::Int8), format_len).ptr(),
        );
        lowerer.out.getelementptr(&format, &global, &[0, 0]);
        let printed = lowerer.temp(OpType::Int32);
        lowerer
            .out
            .call(Some(&printed), &runtime_decl::printf(), &[format, result]);
    }
    lowerer.out.ret(&Operand::int(0));
    out.end_define();
    Ok(())
}
