//! Cool IR - typed AST types for the Cool code generator
//!
//! This crate holds the data the code generator consumes:
//! - [`Name`] handles into an explicit [`StringInterner`]
//! - [`KnownNames`], the pre-interned class, method and slot names
//! - [`ExprArena`], a flat arena of typed expression nodes addressed by [`ExprId`]
//! - Item types: [`ClassDecl`], [`Feature`], [`MethodDecl`], [`AttrDecl`], [`Program`]
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers are `Name(u32)`; equality is handle equality
//! - **Flatten Everything**: no `Box<Expr>`, children are `ExprId(u32)` indices
//! - **Typed on arrival**: every node carries the static type the checker assigned

mod arena;
pub mod ast;
mod expr_id;
mod interner;
mod known;
mod name;

pub use arena::ExprArena;
pub use ast::{
    AttrDecl, BinaryOp, CaseBranch, ClassDecl, ExprKind, Feature, Formal, MethodDecl, Program,
    UnaryOp,
};
pub use expr_id::{BranchRange, ExprId, ExprRange};
pub use interner::{InternError, StringInterner};
pub use known::KnownNames;
pub use name::Name;
