//! Source identifiers that spell like generated names must not clash with them.

use cool_ir::BinaryOp;

use super::builder::{function, ProgramBuilder};

/// Every local name a function defines: parameters, instruction results, labels.
fn local_definitions(function: &str) -> Vec<String> {
    let mut defs = Vec::new();
    let mut lines = function.lines();
    if let Some(header) = lines.next() {
        let params = header
            .split_once('(')
            .and_then(|(_, rest)| rest.rsplit_once(')'))
            .map_or("", |(params, _)| params);
        defs.extend(
            params
                .split(", ")
                .filter_map(|p| p.rsplit_once(' '))
                .map(|(_, name)| name.to_owned()),
        );
    }
    for line in lines {
        if let Some(inst) = line.strip_prefix("  ") {
            if let Some((dest, _)) = inst.split_once(" = ") {
                defs.push(dest.to_owned());
            }
        } else if let Some(label) = line.strip_suffix(':') {
            defs.push(format!("%{label}"));
        }
    }
    defs
}

fn assert_unique_locals(function: &str) {
    let defs = local_definitions(function);
    let mut seen = rustc_hash::FxHashSet::default();
    let duplicates: Vec<&String> = defs.iter().filter(|d| !seen.insert(*d)).collect();
    assert!(duplicates.is_empty(), "{duplicates:?} defined twice in:\n{function}");
}

#[test]
fn let_named_like_a_temporary() {
    let mut b = ProgramBuilder::new();
    let (five, one) = (b.int(5), b.int(1));
    let v = b.ident("vtmp", "Int");
    let add = b.binary(BinaryOp::Add, v, one);
    let body = b.let_in("vtmp", "Int", five, add);
    b.main_class("Int", body);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  %vtmp.slot.0 = alloca i32\n"));
    assert!(main.contains("  %vtmp.0 = load i32, i32* %vtmp.slot.0\n"));
    assert_unique_locals(main);
}

#[test]
fn let_named_like_a_loop_label() {
    let mut b = ProgramBuilder::new();
    let (one, f, zero) = (b.int(1), b.bool(false), b.int(0));
    let lp = b.while_loop(f, zero);
    let body = b.let_in("body", "Int", one, lp);
    b.main_class("Object", body);
    let ir = b.compile_ok();
    let main = function(&ir, "Main_main");

    assert!(main.contains("  %body.slot.0 = alloca i32\n"));
    assert!(main.contains("\nbody.0:\n"));
    assert_unique_locals(main);
}

#[test]
fn formal_named_like_the_abort_block() {
    let mut b = ProgramBuilder::new();
    let (l, r) = (b.ident("abort", "Int"), b.ident("abort", "Int"));
    let div = b.binary(BinaryOp::Div, l, r);
    let f = b.method("f", &[("abort", "Int")], "Int", div);
    let zero = b.int(0);
    let main = b.method("main", &[], "Int", zero);
    b.class("Main", "IO", vec![main, f]);
    let ir = b.compile_ok();
    let f = function(&ir, "Main_f");

    assert!(f.starts_with("define i32 @Main_f(%Main* %self, i32 %abort.arg) {\n"));
    assert!(f.contains("\nabort:\n  call void @abort()\n"));
    assert_unique_locals(f);
}

#[test]
fn formal_named_like_the_entry_block() {
    let mut b = ProgramBuilder::new();
    let entry = b.ident("entry", "Int");
    let f = b.method("f", &[("entry", "Int")], "Int", entry);
    let zero = b.int(0);
    let main = b.method("main", &[], "Int", zero);
    b.class("Main", "IO", vec![main, f]);
    let ir = b.compile_ok();

    assert_unique_locals(function(&ir, "Main_f"));
}

#[test]
fn case_variables_named_like_generated_slots() {
    let mut b = ProgramBuilder::new();
    let seven = b.int(7);
    let (x, y) = (b.ident("casetmp", "Int"), b.ident("iftmp", "Object"));
    let (t, one) = (b.bool(true), b.int(1));
    let cond = b.cond(t, one, x, "Int");
    let zero = b.int(0);
    let other = b.is_void(y);
    let arm2 = b.cond(other, zero, one, "Int");
    let case = b.case(seven, &[("casetmp", "Int", cond), ("iftmp", "Object", arm2)], "Int");
    b.main_class("Int", case);
    let ir = b.compile_ok();

    assert_unique_locals(function(&ir, "Main_main"));
}
