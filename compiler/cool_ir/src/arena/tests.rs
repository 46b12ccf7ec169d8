use super::*;
use crate::ast::BinaryOp;
use crate::StringInterner;
use pretty_assertions::assert_eq;

#[test]
fn test_alloc_records_kind_and_type() {
    let interner = StringInterner::new();
    let int = interner.intern("Int");
    let mut arena = ExprArena::new();

    let three = arena.alloc(ExprKind::Int(3), int);
    let four = arena.alloc(ExprKind::Int(4), int);
    let sum = arena.alloc(
        ExprKind::Binary {
            op: BinaryOp::Add,
            left: three,
            right: four,
        },
        int,
    );

    assert_eq!(arena.len(), 3);
    assert_eq!(arena.ty(sum), int);
    assert_eq!(
        *arena.kind(sum),
        ExprKind::Binary {
            op: BinaryOp::Add,
            left: three,
            right: four
        }
    );
}

#[test]
fn test_lists_do_not_overlap() {
    let interner = StringInterner::new();
    let int = interner.intern("Int");
    let mut arena = ExprArena::new();

    let a = arena.alloc(ExprKind::Int(1), int);
    let b = arena.alloc(ExprKind::Int(2), int);
    let c = arena.alloc(ExprKind::Int(3), int);

    let first = arena.alloc_list([a, b]);
    let second = arena.alloc_list([c]);
    let empty = arena.alloc_list([]);

    assert_eq!(arena.list(first), &[a, b]);
    assert_eq!(arena.list(second), &[c]);
    assert!(empty.is_empty());
    assert!(arena.list(empty).is_empty());
}

#[test]
fn test_branches() {
    let interner = StringInterner::new();
    let int = interner.intern("Int");
    let x = interner.intern("x");
    let mut arena = ExprArena::new();

    let body = arena.alloc(ExprKind::Int(7), int);
    let range = arena.alloc_branches([CaseBranch {
        name: x,
        type_decl: int,
        body,
    }]);

    assert_eq!(range.len(), 1);
    assert_eq!(arena.branches(range)[0].body, body);
}

#[test]
fn test_no_expr_detection() {
    let interner = StringInterner::new();
    let no_type = interner.intern("_no_type");
    let int = interner.intern("Int");
    let mut arena = ExprArena::new();

    let none = arena.alloc(ExprKind::NoExpr, no_type);
    let one = arena.alloc(ExprKind::Int(1), int);

    assert!(arena.is_no_expr(none));
    assert!(arena.is_no_expr(ExprId::INVALID));
    assert!(!arena.is_no_expr(one));
}
