//! Cool code generator: typed Cool AST to textual LLVM IR.
//!
//! The pipeline, leaf first:
//!
//! - [`operand`]: typed operands (constant, register, global, no-value)
//! - [`ir_writer`]: one-instruction-per-call IR text writer
//! - [`class_table`]: class tree with pre-order tag intervals
//! - [`layout`]: attribute fields and vtable slots per class
//! - [`environment`]: scopes, fresh names, current class
//! - [`alloca`]: stack-slot pre-pass per function
//! - `ExprLowerer`: expression lowering, split over `lower_*` files
//! - [`function_compiler`]: methods and constructors
//! - [`generate`]: the whole-program driver
//!
//! # Debug Environment Variables
//!
//! - `COOL_CGEN_ANNOTATE`: emit a `; <node>` comment before every lowered
//!   expression. Read by [`CodegenOptions::from_env`].
//!   Example: `COOL_CGEN_ANNOTATE=1 cargo test`
//!
//! - `RUST_LOG=cool_codegen=debug`: phase and per-function tracing.
//!
//! - `RUST_LOG=cool_codegen=trace`: every lowered node and class tag.
//!
// Crate-level lint configuration for codegen-specific patterns
#![allow(
    // IR struct indices are u32, Rust collections index with usize
    clippy::cast_possible_truncation,
    // Call lowering threads receiver, slot, class and arguments together
    clippy::too_many_arguments,
)]

pub mod alloca;
pub mod class_table;
mod context;
pub mod environment;
mod error;
mod expr_lowerer;
pub mod function_compiler;
pub mod ir_writer;
pub mod layout;
mod lower_calls;
mod lower_control_flow;
mod lower_conversions;
mod lower_literals;
mod lower_operators;
mod module;
pub mod operand;
mod options;
pub mod runtime_decl;
mod strings;

#[cfg(test)]
mod tests;

use std::sync::Once;

pub use context::CodegenCx;
pub use error::CodegenError;
pub use expr_lowerer::ExprLowerer;
pub use module::generate;
pub use options::{CodegenOptions, ANNOTATE_ENV};
pub use strings::StringConstants;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
