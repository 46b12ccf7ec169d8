use cool_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::builder::{function, ProgramBuilder};
use crate::CodegenError;

#[test]
fn dispatch_on_self_goes_through_the_vtable() {
    let mut b = ProgramBuilder::new();
    let hi = b.string("hi");
    let this = b.ident("self", "SELF_TYPE");
    let call = b.dispatch(this, "out_string", &[hi], "SELF_TYPE");
    b.main_class("Object", call);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    // out_string is the fourth method slot, after abort, type_name, copy.
    assert!(main.contains("  %vtmp.0 = getelementptr %Main, %Main* %self, i32 0, i32 0\n"));
    assert!(main.contains("  %vtmp.1 = load %_Main_vtable*, %_Main_vtable** %vtmp.0\n"));
    assert!(main.contains(
        "  %vtmp.2 = getelementptr %_Main_vtable, %_Main_vtable* %vtmp.1, i32 0, i32 7\n"
    ));
    assert!(main.contains(
        "  %vtmp.4 = call %Main* %vtmp.3(%Main* %self, %String* @String.6)\n"
    ));
    // self is never void
    assert!(!main.contains("dispatch.ok"));
}

#[test]
fn dispatch_on_a_local_checks_for_void() {
    let mut b = ProgramBuilder::new();
    let fresh = b.new_object("Main");
    let m = b.ident("m", "Main");
    let call = b.dispatch(m, "type_name", &[], "String");
    let body = b.let_in("m", "Main", fresh, call);
    b.main_class("String", body);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  %vtmp.2 = icmp eq %Main* %vtmp.1, null\n"));
    assert!(main.contains("  br i1 %vtmp.2, label %abort, label %dispatch.ok.0\ndispatch.ok.0:\n"));
    assert!(main.contains("\nabort:\n  call void @abort()\n  unreachable\n"));
}

#[test]
fn static_dispatch_calls_the_named_implementation() {
    let mut b = ProgramBuilder::new();
    let hi = b.string("hi");
    let this = b.ident("self", "SELF_TYPE");
    let call = b.static_dispatch(this, "IO", "out_string", &[hi], "Object");
    b.main_class("Object", call);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  %vtmp.0 = bitcast %Main* %self to %IO*\n"));
    assert!(main.contains("  %vtmp.1 = call %IO* @IO_out_string(%IO* %vtmp.0, %String* @String.6)\n"));
    assert!(!main.contains("_vtable"));
    assert!(!main.contains("abort"));
}

#[test]
fn new_self_type_uses_the_dynamic_constructor() {
    let mut b = ProgramBuilder::new();
    let fresh = b.new_object("SELF_TYPE");
    let make = b.method("make", &[], "SELF_TYPE", fresh);
    let zero = b.int(0);
    let main = b.method("main", &[], "Int", zero);
    b.class("Main", "IO", vec![main, make]);
    let ir = b.compile_ok();

    assert_eq!(
        function(&ir, "Main_make"),
        "define %Main* @Main_make(%Main* %self) {
entry:
  %vtmp.0 = getelementptr %Main, %Main* %self, i32 0, i32 0
  %vtmp.1 = load %_Main_vtable*, %_Main_vtable** %vtmp.0
  %vtmp.2 = getelementptr %_Main_vtable, %_Main_vtable* %vtmp.1, i32 0, i32 3
  %vtmp.3 = load %Main* ()*, %Main* ()** %vtmp.2
  %vtmp.4 = call %Main* %vtmp.3()
  ret %Main* %vtmp.4
}
"
    );
}

#[test]
fn int_argument_is_boxed_for_an_object_formal() {
    let mut b = ProgramBuilder::new();
    let zero = b.int(0);
    let take = b.method("take", &[("x", "Object")], "Int", zero);
    let five = b.int(5);
    let this = b.ident("self", "SELF_TYPE");
    let call = b.dispatch(this, "take", &[five], "Int");
    let main = b.method("main", &[], "Int", call);
    b.class("Main", "IO", vec![take, main]);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  %vtmp.4 = call %Int* @Int_new()\n"));
    assert!(main.contains("  call void @Int_init(%Int* %vtmp.4, i32 5)\n"));
    assert!(main.contains("  %vtmp.5 = bitcast %Int* %vtmp.4 to %Object*\n"));
    assert!(main.contains("  %vtmp.6 = call i32 %vtmp.3(%Main* %self, %Object* %vtmp.5)\n"));
}

#[test]
fn formals_are_spilled_to_slots() {
    let mut b = ProgramBuilder::new();
    let x = b.ident("x", "Int");
    let id = b.method("id", &[("x", "Int")], "Int", x);
    let zero = b.int(0);
    let main = b.method("main", &[], "Int", zero);
    b.class("Main", "IO", vec![main, id]);
    let ir = b.compile_ok();

    assert_eq!(
        function(&ir, "Main_id"),
        "define i32 @Main_id(%Main* %self, i32 %x.arg) {
entry:
  %x.addr = alloca i32
  store i32 %x.arg, i32* %x.addr
  %vtmp.0 = load i32, i32* %x.addr
  ret i32 %vtmp.0
}
"
    );
}

#[test]
fn attributes_are_read_and_written_through_self() {
    let mut b = ProgramBuilder::new();
    let count = b.attr("count", "Int", None);
    let current = b.ident("count", "Int");
    let one = b.int(1);
    let next = b.binary(BinaryOp::Add, current, one);
    let bump = b.assign("count", next);
    let main = b.method("main", &[], "Int", bump);
    b.class("Main", "IO", vec![count, main]);
    let ir = b.compile_ok();

    assert_eq!(
        function(&ir, "Main_main"),
        "define i32 @Main_main(%Main* %self) {
entry:
  %vtmp.0 = getelementptr %Main, %Main* %self, i32 0, i32 1
  %vtmp.1 = load i32, i32* %vtmp.0
  %vtmp.2 = add i32 %vtmp.1, 1
  %vtmp.3 = getelementptr %Main, %Main* %self, i32 0, i32 1
  store i32 %vtmp.2, i32* %vtmp.3
  ret i32 %vtmp.2
}
"
    );
}

#[test]
fn constructor_stores_defaults_then_initializers() {
    let mut b = ProgramBuilder::new();
    let zero = b.int(0);
    b.main_class("Int", zero);
    let one = b.int(1);
    let x = b.attr("x", "Int", Some(one));
    b.class("A", "Object", vec![x]);
    let two = b.int(2);
    let y = b.attr("y", "Int", Some(two));
    b.class("B", "A", vec![y]);
    let ir = b.compile_ok();

    assert_eq!(
        function(&ir, "B_new"),
        "define %B* @B_new() {
entry:
  %vtmp.0 = getelementptr %_B_vtable, %_B_vtable* @_B_vtable_prototype, i32 0, i32 1
  %vtmp.1 = load i32, i32* %vtmp.0
  %vtmp.2 = call i8* @malloc(i32 %vtmp.1)
  %self = bitcast i8* %vtmp.2 to %B*
  %vtmp.3 = getelementptr %B, %B* %self, i32 0, i32 0
  store %_B_vtable* @_B_vtable_prototype, %_B_vtable** %vtmp.3
  %vtmp.4 = getelementptr %B, %B* %self, i32 0, i32 1
  store i32 0, i32* %vtmp.4
  %vtmp.5 = getelementptr %B, %B* %self, i32 0, i32 2
  store i32 0, i32* %vtmp.5
  %vtmp.6 = getelementptr %B, %B* %self, i32 0, i32 1
  store i32 1, i32* %vtmp.6
  %vtmp.7 = getelementptr %B, %B* %self, i32 0, i32 2
  store i32 2, i32* %vtmp.7
  ret %B* %self
}
"
    );
}

#[test]
fn string_attribute_defaults_to_the_empty_string() {
    let mut b = ProgramBuilder::new();
    let name = b.attr("name", "String", None);
    let zero = b.int(0);
    let main = b.method("main", &[], "Int", zero);
    b.class("Main", "IO", vec![name, main]);
    let ir = b.compile_ok();
    let ctor = function(&ir, "Main_new");

    assert!(ctor.contains("  %vtmp.4 = call %String* @String_new()\n"));
    assert!(ctor.contains("  store %String* %vtmp.4, %String** %vtmp.5\n"));
}

/// `case new B of a: A => 1; o: Object => 2; b: B => 3; esac` with
/// tags Object = 0, A = 6, B = 7.
#[test]
fn case_tests_branches_most_specific_first() {
    let mut b = ProgramBuilder::new();
    let scrutinee = b.new_object("B");
    let (one, two, three) = (b.int(1), b.int(2), b.int(3));
    let case = b.case(
        scrutinee,
        &[("a", "A", one), ("o", "Object", two), ("b", "B", three)],
        "Int",
    );
    b.main_class("Int", case);
    b.class("A", "Object", vec![]);
    b.class("B", "A", vec![]);
    let ir = b.compile_ok();

    assert_eq!(
        function(&ir, "Main_main"),
        "define i32 @Main_main(%Main* %self) {
entry:
  %casetmp.0 = alloca i32
  %a.slot.1 = alloca %A*
  %o.slot.2 = alloca %Object*
  %b.slot.3 = alloca %B*
  %vtmp.0 = call %B* @B_new()
  %vtmp.1 = icmp eq %B* %vtmp.0, null
  br i1 %vtmp.1, label %abort, label %case.ok.0
case.ok.0:
  %vtmp.2 = getelementptr %B, %B* %vtmp.0, i32 0, i32 0
  %vtmp.3 = load %_B_vtable*, %_B_vtable** %vtmp.2
  %vtmp.4 = getelementptr %_B_vtable, %_B_vtable* %vtmp.3, i32 0, i32 0
  %vtmp.5 = load i32, i32* %vtmp.4
  br label %case.test.0.0
case.test.0.0:
  %vtmp.6 = icmp sge i32 %vtmp.5, 7
  %vtmp.7 = icmp sle i32 %vtmp.5, 7
  %vtmp.8 = and i1 %vtmp.6, %vtmp.7
  br i1 %vtmp.8, label %case.branch.0.0, label %case.test.0.1
case.branch.0.0:
  store %B* %vtmp.0, %B** %b.slot.3
  store i32 3, i32* %casetmp.0
  br label %case.join.0
case.test.0.1:
  %vtmp.9 = icmp sge i32 %vtmp.5, 6
  %vtmp.10 = icmp sle i32 %vtmp.5, 7
  %vtmp.11 = and i1 %vtmp.9, %vtmp.10
  br i1 %vtmp.11, label %case.branch.0.1, label %case.test.0.2
case.branch.0.1:
  %vtmp.12 = bitcast %B* %vtmp.0 to %A*
  store %A* %vtmp.12, %A** %a.slot.1
  store i32 1, i32* %casetmp.0
  br label %case.join.0
case.test.0.2:
  %vtmp.13 = icmp sge i32 %vtmp.5, 0
  %vtmp.14 = icmp sle i32 %vtmp.5, 7
  %vtmp.15 = and i1 %vtmp.13, %vtmp.14
  br i1 %vtmp.15, label %case.branch.0.2, label %abort
case.branch.0.2:
  %vtmp.16 = bitcast %B* %vtmp.0 to %Object*
  store %Object* %vtmp.16, %Object** %o.slot.2
  store i32 2, i32* %casetmp.0
  br label %case.join.0
case.join.0:
  %vtmp.17 = load i32, i32* %casetmp.0
  ret i32 %vtmp.17
abort:
  call void @abort()
  unreachable
}
"
    );
}

#[test]
fn case_on_an_int_boxes_the_scrutinee() {
    let mut b = ProgramBuilder::new();
    let seven = b.int(7);
    let i = b.ident("i", "Int");
    let case = b.case(seven, &[("i", "Int", i)], "Int");
    b.main_class("Int", case);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  %vtmp.0 = call %Int* @Int_new()\n"));
    assert!(main.contains("  call void @Int_init(%Int* %vtmp.0, i32 7)\n"));
    // A boxed literal is never void.
    assert!(!main.contains("case.ok"));
}

#[test]
fn dispatch_to_a_missing_method_is_an_error() {
    let mut b = ProgramBuilder::new();
    let this = b.ident("self", "SELF_TYPE");
    let call = b.dispatch(this, "frobnicate", &[], "Int");
    b.main_class("Int", call);

    assert_eq!(
        b.compile().err(),
        Some(CodegenError::UnknownMethod {
            class: "Main".into(),
            method: "frobnicate".into(),
        })
    );
}
