//! Typed operands for the textual IR.
//!
//! Every lowered expression yields an [`Operand`]: an immediate constant,
//! a virtual register, a global, or the no-value sentinel. The operand
//! carries its [`OpType`] so consumers never re-derive it from the AST.

use std::fmt;

// ---------------------------------------------------------------------------
// OpType
// ---------------------------------------------------------------------------

/// An IR-level type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpType {
    Void,
    /// `i1`, the unboxed `Bool`.
    Int1,
    /// `i8`, element of C strings.
    Int8,
    /// `i32`, the unboxed `Int`.
    Int32,
    /// `...` in a variadic parameter list.
    VarArg,
    /// A named struct type, printed `%name`.
    Named(String),
    Ptr(Box<OpType>),
    Array(Box<OpType>, u32),
    Func { ret: Box<OpType>, params: Vec<OpType> },
}

impl OpType {
    /// `%name*`, the representation of a class instance.
    pub fn object(class: &str) -> Self {
        OpType::Named(class.to_owned()).ptr()
    }

    /// `i8*`.
    pub fn c_string() -> Self {
        OpType::Int8.ptr()
    }

    pub fn func(ret: OpType, params: Vec<OpType>) -> Self {
        OpType::Func {
            ret: Box::new(ret),
            params,
        }
    }

    /// Pointer to `self`.
    #[must_use]
    pub fn ptr(self) -> Self {
        OpType::Ptr(Box::new(self))
    }

    pub fn pointee(&self) -> Option<&OpType> {
        match self {
            OpType::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    #[inline]
    pub fn is_ptr(&self) -> bool {
        matches!(self, OpType::Ptr(_))
    }

    /// Struct name behind a `%name*` pointer.
    pub fn class_name(&self) -> Option<&str> {
        match self.pointee() {
            Some(OpType::Named(name)) => Some(name),
            _ => None,
        }
    }

    /// The zero value slots of this type start with.
    ///
    /// `None` for types that cannot be stored (`void`, functions).
    pub fn zero(&self) -> Option<Operand> {
        match self {
            OpType::Int32 => Some(Operand::int(0)),
            OpType::Int1 => Some(Operand::bool(false)),
            OpType::Int8 => Some(Operand::constant(Const::Int(0), OpType::Int8)),
            OpType::Ptr(_) => Some(Operand::null(self.clone())),
            OpType::Void
            | OpType::VarArg
            | OpType::Named(_)
            | OpType::Array(..)
            | OpType::Func { .. } => None,
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpType::Void => f.write_str("void"),
            OpType::Int1 => f.write_str("i1"),
            OpType::Int8 => f.write_str("i8"),
            OpType::Int32 => f.write_str("i32"),
            OpType::VarArg => f.write_str("..."),
            OpType::Named(name) => write!(f, "%{name}"),
            OpType::Ptr(inner) => write!(f, "{inner}*"),
            OpType::Array(elem, len) => write!(f, "[{len} x {elem}]"),
            OpType::Func { ret, params } => {
                write!(f, "{ret} (")?;
                write_list(f, params)?;
                f.write_str(")")
            }
        }
    }
}

/// Writes `a, b, c`.
pub(crate) fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Operand
// ---------------------------------------------------------------------------

/// Immediate constant values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Const {
    Int(i32),
    Bool(bool),
    Null,
}

/// What an operand refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Const(Const),
    /// A virtual register, stored without the leading `%`.
    Register(String),
    /// A global symbol, stored without the leading `@`.
    Global(String),
    /// Produced by expressions with nothing storable (`while`, absent initializers).
    NoValue,
}

/// A typed IR value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operand {
    kind: OperandKind,
    ty: OpType,
}

impl Operand {
    pub fn constant(value: Const, ty: OpType) -> Self {
        Self {
            kind: OperandKind::Const(value),
            ty,
        }
    }

    pub fn int(value: i32) -> Self {
        Self::constant(Const::Int(value), OpType::Int32)
    }

    pub fn bool(value: bool) -> Self {
        Self::constant(Const::Bool(value), OpType::Int1)
    }

    pub fn null(ty: OpType) -> Self {
        Self::constant(Const::Null, ty)
    }

    pub fn register(name: impl Into<String>, ty: OpType) -> Self {
        Self {
            kind: OperandKind::Register(name.into()),
            ty,
        }
    }

    pub fn global(name: impl Into<String>, ty: OpType) -> Self {
        Self {
            kind: OperandKind::Global(name.into()),
            ty,
        }
    }

    pub fn no_value() -> Self {
        Self {
            kind: OperandKind::NoValue,
            ty: OpType::Void,
        }
    }

    #[inline]
    pub fn kind(&self) -> &OperandKind {
        &self.kind
    }

    #[inline]
    pub fn ty(&self) -> &OpType {
        &self.ty
    }

    #[inline]
    pub fn is_no_value(&self) -> bool {
        matches!(self.kind, OperandKind::NoValue)
    }

    /// `ty value`, the form instruction arguments are written in.
    pub fn typed(&self) -> Typed<'_> {
        Typed(self)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OperandKind::Const(Const::Int(v)) => write!(f, "{v}"),
            OperandKind::Const(Const::Bool(v)) => write!(f, "{v}"),
            OperandKind::Const(Const::Null) => f.write_str("null"),
            OperandKind::Register(name) => write!(f, "%{name}"),
            OperandKind::Global(name) => write!(f, "@{name}"),
            OperandKind::NoValue => f.write_str("<no value>"),
        }
    }
}

/// Display adapter printing an operand with its type.
pub struct Typed<'a>(&'a Operand);

impl fmt::Display for Typed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.ty, self.0)
    }
}

#[cfg(test)]
mod tests;
