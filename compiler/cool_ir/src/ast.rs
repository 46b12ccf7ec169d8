//! Expression and item types.
//!
//! The expression set is closed: exactly the Cool expression forms the
//! code generator lowers. Every node is `Copy`; children are [`ExprId`]s
//! into the owning [`ExprArena`](crate::ExprArena).

use crate::{BranchRange, ExprArena, ExprId, ExprRange, Name};

/// Binary operators: integer arithmetic and comparisons.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Eq,
}

impl BinaryOp {
    /// True for the operators producing a `Bool`.
    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Eq)
    }

    /// Source-level spelling.
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "=",
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// Integer negation, `~e`.
    Neg,
    /// Boolean complement, `not e`.
    Not,
}

/// Expression kinds.
///
/// Each node's static type is stored beside it in the arena, not here.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// `name <- value`
    Assign { name: Name, value: ExprId },
    /// `if pred then a else b fi`
    Cond {
        pred: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    /// `while pred loop body pool`
    Loop { pred: ExprId, body: ExprId },
    /// `{ e1; e2; ... }`
    Block(ExprRange),
    /// `let name : type_decl <- init in body` (one binding per node).
    Let {
        name: Name,
        type_decl: Name,
        init: ExprId,
        body: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary { op: UnaryOp, operand: ExprId },
    /// Object reference, including `self`.
    Ident(Name),
    Int(i32),
    Bool(bool),
    Str(Name),
    /// The no-value sentinel (absent initializer).
    NoExpr,
    /// `receiver.method(args)`
    Dispatch {
        receiver: ExprId,
        method: Name,
        args: ExprRange,
    },
    /// `receiver@class.method(args)`
    StaticDispatch {
        receiver: ExprId,
        class: Name,
        method: Name,
        args: ExprRange,
    },
    /// `new class`
    New(Name),
    IsVoid(ExprId),
    /// `case scrutinee of branches esac`
    Case {
        scrutinee: ExprId,
        branches: BranchRange,
    },
}

impl ExprKind {
    /// Short label used in trace output and IR annotations.
    pub fn label(&self) -> &'static str {
        match self {
            ExprKind::Assign { .. } => "assign",
            ExprKind::Cond { .. } => "cond",
            ExprKind::Loop { .. } => "loop",
            ExprKind::Block(_) => "block",
            ExprKind::Let { .. } => "let",
            ExprKind::Binary { op, .. } => match op {
                BinaryOp::Add => "plus",
                BinaryOp::Sub => "sub",
                BinaryOp::Mul => "mul",
                BinaryOp::Div => "div",
                BinaryOp::Lt => "lt",
                BinaryOp::Le => "leq",
                BinaryOp::Eq => "eq",
            },
            ExprKind::Unary { op: UnaryOp::Neg, .. } => "neg",
            ExprKind::Unary { op: UnaryOp::Not, .. } => "comp",
            ExprKind::Ident(_) => "object",
            ExprKind::Int(_) => "int_const",
            ExprKind::Bool(_) => "bool_const",
            ExprKind::Str(_) => "string_const",
            ExprKind::NoExpr => "no_expr",
            ExprKind::Dispatch { .. } => "dispatch",
            ExprKind::StaticDispatch { .. } => "static_dispatch",
            ExprKind::New(_) => "new",
            ExprKind::IsVoid(_) => "isvoid",
            ExprKind::Case { .. } => "typcase",
        }
    }
}

/// One `name : type_decl => body` arm of a case expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CaseBranch {
    pub name: Name,
    pub type_decl: Name,
    pub body: ExprId,
}

/// A method parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Formal {
    pub name: Name,
    pub type_decl: Name,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDecl {
    pub name: Name,
    pub formals: Vec<Formal>,
    pub return_type: Name,
    /// `ExprId::INVALID` for runtime-provided methods.
    pub body: ExprId,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AttrDecl {
    pub name: Name,
    pub type_decl: Name,
    /// `ExprId::INVALID` or a `NoExpr` node when there is no initializer.
    pub init: ExprId,
}

/// A class member, in declaration order.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Feature {
    Method(MethodDecl),
    Attribute(AttrDecl),
}

impl Feature {
    pub fn name(&self) -> Name {
        match self {
            Feature::Method(m) => m.name,
            Feature::Attribute(a) => a.name,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassDecl {
    pub name: Name,
    pub parent: Name,
    pub features: Vec<Feature>,
}

impl ClassDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.features.iter().filter_map(|f| match f {
            Feature::Method(m) => Some(m),
            Feature::Attribute(_) => None,
        })
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttrDecl> {
        self.features.iter().filter_map(|f| match f {
            Feature::Attribute(a) => Some(a),
            Feature::Method(_) => None,
        })
    }
}

/// A type-checked program: user classes plus the arena their bodies live in.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub arena: ExprArena,
}
