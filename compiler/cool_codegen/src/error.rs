//! Code generation errors.
//!
//! The first group is fatal while building the class table. The second
//! group can only be produced by an AST the upstream checker should have
//! rejected; they are reported as internal defects, never recovered from.

/// A code generation failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum CodegenError {
    #[error("class {class} inherits from an undefined class {parent}")]
    UndefinedParent { class: String, parent: String },

    #[error("inheritance cycle detected involving class {class}")]
    InheritanceCycle { class: String },

    #[error("class {class} is not defined")]
    MissingClass { class: String },

    #[error("class {class} has no method {method}")]
    MissingEntryMethod { class: String, method: String },

    #[error("unbound identifier {name} in class {class}")]
    UnboundIdentifier { name: String, class: String },

    #[error("unknown class {class}")]
    UnknownClass { class: String },

    #[error("class {class} has no method {method} to dispatch to")]
    UnknownMethod { class: String, method: String },

    #[error("internal codegen error: {0}")]
    Internal(String),
}

impl CodegenError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        CodegenError::Internal(message.into())
    }
}
