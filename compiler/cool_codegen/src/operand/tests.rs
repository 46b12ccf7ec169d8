use pretty_assertions::assert_eq;

use super::*;

#[test]
fn scalar_types_print_as_llvm_spellings() {
    assert_eq!(OpType::Int32.to_string(), "i32");
    assert_eq!(OpType::Int1.to_string(), "i1");
    assert_eq!(OpType::c_string().to_string(), "i8*");
    assert_eq!(OpType::Void.to_string(), "void");
}

#[test]
fn object_pointer_and_array_types() {
    assert_eq!(OpType::object("Main").to_string(), "%Main*");
    assert_eq!(OpType::object("Main").ptr().to_string(), "%Main**");
    let arr = OpType::Array(Box::new(OpType::Int8), 5);
    assert_eq!(arr.to_string(), "[5 x i8]");
}

#[test]
fn function_types_list_params() {
    let ctor = OpType::func(OpType::object("A"), vec![]).ptr();
    assert_eq!(ctor.to_string(), "%A* ()*");

    let printf = OpType::func(OpType::Int32, vec![OpType::c_string(), OpType::VarArg]);
    assert_eq!(printf.to_string(), "i32 (i8*, ...)");
}

#[test]
fn class_name_sees_through_pointer() {
    assert_eq!(OpType::object("IO").class_name(), Some("IO"));
    assert_eq!(OpType::Int32.class_name(), None);
    assert_eq!(OpType::c_string().class_name(), None);
}

#[test]
fn operands_print_with_prefixes() {
    assert_eq!(Operand::int(-3).to_string(), "-3");
    assert_eq!(Operand::bool(true).to_string(), "true");
    assert_eq!(Operand::register("vtmp.0", OpType::Int32).to_string(), "%vtmp.0");
    assert_eq!(
        Operand::global("String.1", OpType::object("String")).to_string(),
        "@String.1"
    );
}

#[test]
fn typed_prefixes_the_type() {
    let obj = Operand::null(OpType::object("Foo"));
    assert_eq!(obj.typed().to_string(), "%Foo* null");
    assert_eq!(Operand::int(7).typed().to_string(), "i32 7");
}

#[test]
fn zero_values_per_type() {
    assert_eq!(OpType::Int32.zero(), Some(Operand::int(0)));
    assert_eq!(OpType::Int1.zero(), Some(Operand::bool(false)));
    assert_eq!(
        OpType::object("A").zero(),
        Some(Operand::null(OpType::object("A")))
    );
    assert_eq!(OpType::Void.zero(), None);
}

#[test]
fn no_value_is_distinguished() {
    let nv = Operand::no_value();
    assert!(nv.is_no_value());
    assert_eq!(nv.ty(), &OpType::Void);
    assert!(!Operand::int(0).is_no_value());
}
