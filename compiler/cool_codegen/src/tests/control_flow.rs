use cool_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::builder::{function, ProgramBuilder};
use crate::CodegenError;

#[test]
fn conditional_joins_through_a_shared_slot() {
    let mut b = ProgramBuilder::new();
    let (one, two, ten, twenty) = (b.int(1), b.int(2), b.int(10), b.int(20));
    let lt = b.binary(BinaryOp::Lt, one, two);
    let cond = b.cond(lt, ten, twenty, "Int");
    b.main_class("Int", cond);
    let ir = b.compile_ok();

    assert_eq!(
        function(&ir, "Main_main"),
        "define i32 @Main_main(%Main* %self) {
entry:
  %iftmp.0 = alloca i32
  %vtmp.0 = icmp slt i32 1, 2
  br i1 %vtmp.0, label %then.0, label %else.0
then.0:
  store i32 10, i32* %iftmp.0
  br label %fi.0
else.0:
  store i32 20, i32* %iftmp.0
  br label %fi.0
fi.0:
  %vtmp.1 = load i32, i32* %iftmp.0
  ret i32 %vtmp.1
}
"
    );
}

#[test]
fn let_binds_then_evaluates_body() {
    let mut b = ProgramBuilder::new();
    let (five, one) = (b.int(5), b.int(1));
    let x = b.ident("x", "Int");
    let add = b.binary(BinaryOp::Add, x, one);
    let body = b.let_in("x", "Int", five, add);
    b.main_class("Int", body);
    let ir = b.compile_ok();

    assert_eq!(
        function(&ir, "Main_main"),
        "define i32 @Main_main(%Main* %self) {
entry:
  %x.slot.0 = alloca i32
  store i32 5, i32* %x.slot.0
  %vtmp.0 = load i32, i32* %x.slot.0
  %vtmp.1 = add i32 %vtmp.0, 1
  ret i32 %vtmp.1
}
"
    );
}

#[test]
fn let_binding_does_not_outlive_its_body() {
    let mut b = ProgramBuilder::new();
    let five = b.int(5);
    let inner = b.ident("x", "Int");
    let binding = b.let_in("x", "Int", five, inner);
    let outer = b.ident("x", "Int");
    let body = b.block(&[binding, outer]);
    b.main_class("Int", body);

    assert_eq!(
        b.compile().err(),
        Some(CodegenError::UnboundIdentifier {
            name: "x".into(),
            class: "Main".into(),
        })
    );
}

#[test]
fn let_initializer_sees_the_outer_binding() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    let outer_x = b.ident("x", "Int");
    let inc = b.binary(BinaryOp::Add, outer_x, one);
    let inner_x = b.ident("x", "Int");
    let inner = b.let_in("x", "Int", inc, inner_x);
    let seven = b.int(7);
    let body = b.let_in("x", "Int", seven, inner);
    b.main_class("Int", body);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  %vtmp.0 = load i32, i32* %x.slot.0\n"));
    assert!(main.contains("  store i32 %vtmp.1, i32* %x.slot.1\n"));
    assert!(main.contains("  %vtmp.2 = load i32, i32* %x.slot.1\n"));
}

#[test]
fn let_without_initializer_stores_the_default() {
    let mut b = ProgramBuilder::new();
    let (none_i, none_s) = (b.no_expr(), b.no_expr());
    let s = b.ident("s", "String");
    let inner = b.let_in("s", "String", none_s, s);
    let body = b.let_in("n", "Int", none_i, inner);
    b.main_class("String", body);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  store i32 0, i32* %n.slot.0\n"));
    assert!(main.contains("  %vtmp.0 = call %String* @String_new()\n"));
    assert!(main.contains("  store %String* %vtmp.0, %String** %s.slot.1\n"));
}

#[test]
fn loop_value_is_discarded() {
    let mut b = ProgramBuilder::new();
    let (zero, three, one) = (b.int(0), b.int(3), b.int(1));
    let i_pred = b.ident("i", "Int");
    let pred = b.binary(BinaryOp::Lt, i_pred, three);
    let i_body = b.ident("i", "Int");
    let next = b.binary(BinaryOp::Add, i_body, one);
    let step = b.assign("i", next);
    let lp = b.while_loop(pred, step);
    let i_last = b.ident("i", "Int");
    let seq = b.block(&[lp, i_last]);
    let body = b.let_in("i", "Int", zero, seq);
    b.main_class("Int", body);
    let ir = b.compile_ok();

    assert_eq!(
        function(&ir, "Main_main"),
        "define i32 @Main_main(%Main* %self) {
entry:
  %i.slot.0 = alloca i32
  store i32 0, i32* %i.slot.0
  br label %loop.0
loop.0:
  %vtmp.0 = load i32, i32* %i.slot.0
  %vtmp.1 = icmp slt i32 %vtmp.0, 3
  br i1 %vtmp.1, label %body.0, label %pool.0
body.0:
  %vtmp.2 = load i32, i32* %i.slot.0
  %vtmp.3 = add i32 %vtmp.2, 1
  store i32 %vtmp.3, i32* %i.slot.0
  br label %loop.0
pool.0:
  %vtmp.4 = load i32, i32* %i.slot.0
  ret i32 %vtmp.4
}
"
    );
}

#[test]
fn loop_returned_as_object_is_null() {
    let mut b = ProgramBuilder::new();
    let (f, zero) = (b.bool(false), b.int(0));
    let lp = b.while_loop(f, zero);
    b.main_class("Object", lp);
    let ir = b.compile_ok();
    assert!(function(&ir, "Main_main").contains("  ret %Object* null\n"));
}

#[test]
fn nested_conditionals_use_distinct_labels() {
    let mut b = ProgramBuilder::new();
    let (t, f, one, two, three) = (b.bool(true), b.bool(false), b.int(1), b.int(2), b.int(3));
    let inner = b.cond(f, one, two, "Int");
    let outer = b.cond(t, inner, three, "Int");
    b.main_class("Int", outer);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  %iftmp.0 = alloca i32\n  %iftmp.1 = alloca i32\n"));
    assert!(main.contains("br i1 true, label %then.0, label %else.0"));
    assert!(main.contains("br i1 false, label %then.1, label %else.1"));
    // The inner join feeds the outer slot.
    assert!(main.contains("fi.1:\n  %vtmp.0 = load i32, i32* %iftmp.1\n  store i32 %vtmp.0, i32* %iftmp.0\n  br label %fi.0\n"));
}

#[test]
fn block_value_is_the_last_expression() {
    let mut b = ProgramBuilder::new();
    let (one, two) = (b.int(1), b.int(2));
    let body = b.block(&[one, two]);
    b.main_class("Int", body);
    let ir = b.compile_ok();
    assert!(function(&ir, "Main_main").contains("entry:\n  ret i32 2\n"));
}
