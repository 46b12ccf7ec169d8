//! Append-only writer for textual LLVM IR.
//!
//! `IrWriter` formats one instruction per call. It knows nothing about
//! Cool: callers hand it typed [`Operand`]s and it prints them in the
//! typed-pointer LLVM dialect. Destination registers are operands too,
//! so the register type is always the one the caller recorded.

use std::fmt;

use crate::operand::{write_list, OpType, Operand};

/// Integer binary instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    And,
    Xor,
}

impl BinOp {
    fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::SDiv => "sdiv",
            BinOp::And => "and",
            BinOp::Xor => "xor",
        }
    }
}

/// `icmp` condition codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sge,
}

impl IntPredicate {
    fn mnemonic(self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sge => "sge",
        }
    }
}

/// Textual IR output buffer.
pub struct IrWriter {
    output: String,
}

impl IrWriter {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }

    // -- Top level --

    /// Write a top-level line verbatim.
    pub fn line(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    /// `%name = type { fields }`
    pub fn type_def(&mut self, name: &str, fields: &[OpType]) {
        self.line(&format!("%{name} = type {{ {} }}", List(fields)));
    }

    /// `@name = [internal ]constant ty init`
    pub fn global_constant(&mut self, name: &str, internal: bool, ty: &OpType, init: &str) {
        let linkage = if internal { "internal " } else { "" };
        self.line(&format!("@{name} = {linkage}constant {ty} {init}"));
    }

    /// `declare ret @name(params)`
    pub fn declare(&mut self, ret: &OpType, name: &str, params: &[OpType]) {
        self.line(&format!("declare {ret} @{name}({})", List(params)));
    }

    /// `define ret @name(params) {` followed by the `entry:` label.
    pub fn define(&mut self, ret: &OpType, name: &str, params: &[Operand]) {
        let params: Vec<String> = params.iter().map(|p| p.typed().to_string()).collect();
        self.line(&format!("define {ret} @{name}({}) {{", params.join(", ")));
        self.begin_block("entry");
    }

    pub fn end_define(&mut self) {
        self.line("}");
        self.blank();
    }

    pub fn begin_block(&mut self, label: &str) {
        self.line(&format!("{label}:"));
    }

    // -- Instructions --

    fn inst(&mut self, s: &str) {
        self.output.push_str("  ");
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// `; text` inside a function body.
    pub fn comment(&mut self, text: &str) {
        self.inst(&format!("; {text}"));
    }

    /// `dest = alloca T`, where `dest` has type `T*`.
    pub fn alloca(&mut self, dest: &Operand) {
        let ty = dest.ty().pointee().unwrap_or(&OpType::Void);
        self.inst(&format!("{dest} = alloca {ty}"));
    }

    pub fn load(&mut self, dest: &Operand, ptr: &Operand) {
        self.inst(&format!("{dest} = load {}, {}", dest.ty(), ptr.typed()));
    }

    pub fn store(&mut self, value: &Operand, ptr: &Operand) {
        self.inst(&format!("store {}, {}", value.typed(), ptr.typed()));
    }

    pub fn binary(&mut self, op: BinOp, dest: &Operand, lhs: &Operand, rhs: &Operand) {
        self.inst(&format!(
            "{dest} = {} {}, {rhs}",
            op.mnemonic(),
            lhs.typed()
        ));
    }

    pub fn icmp(&mut self, pred: IntPredicate, dest: &Operand, lhs: &Operand, rhs: &Operand) {
        self.inst(&format!(
            "{dest} = icmp {} {}, {rhs}",
            pred.mnemonic(),
            lhs.typed()
        ));
    }

    pub fn br(&mut self, label: &str) {
        self.inst(&format!("br label %{label}"));
    }

    pub fn cond_br(&mut self, cond: &Operand, then_label: &str, else_label: &str) {
        self.inst(&format!(
            "br {}, label %{then_label}, label %{else_label}",
            cond.typed()
        ));
    }

    pub fn ret(&mut self, value: &Operand) {
        self.inst(&format!("ret {}", value.typed()));
    }

    /// Call through `callee`, whose type must be a function pointer.
    ///
    /// Variadic callees are printed with their full function type, as
    /// LLVM requires.
    pub fn call(&mut self, dest: Option<&Operand>, callee: &Operand, args: &[Operand]) {
        let (ret, variadic) = match callee.ty().pointee() {
            Some(OpType::Func { ret, params }) => {
                (&**ret, params.iter().any(|p| *p == OpType::VarArg))
            }
            _ => (&OpType::Void, false),
        };
        let shown_ty = match (variadic, callee.ty().pointee()) {
            (true, Some(fn_ty)) => fn_ty.to_string(),
            _ => ret.to_string(),
        };
        let args: Vec<String> = args.iter().map(|a| a.typed().to_string()).collect();
        let call = format!("call {shown_ty} {callee}({})", args.join(", "));
        match dest {
            Some(dest) => self.inst(&format!("{dest} = {call}")),
            None => self.inst(&call),
        }
    }

    /// `dest = getelementptr T, T* ptr, i32 i0, i32 i1, ...`
    pub fn getelementptr(&mut self, dest: &Operand, ptr: &Operand, indices: &[u32]) {
        let base = ptr.ty().pointee().unwrap_or(&OpType::Void);
        let mut text = format!("{dest} = getelementptr {base}, {}", ptr.typed());
        for index in indices {
            text.push_str(&format!(", i32 {index}"));
        }
        self.inst(&text);
    }

    pub fn bitcast(&mut self, dest: &Operand, src: &Operand) {
        self.inst(&format!("{dest} = bitcast {} to {}", src.typed(), dest.ty()));
    }

    pub fn unreachable(&mut self) {
        self.inst("unreachable");
    }
}

impl Default for IrWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Constant expressions
// ---------------------------------------------------------------------------

/// `i8*` constant pointing at the first byte of the `[len x i8]` global `name`.
pub fn c_string_ptr(name: &str, len: u32) -> String {
    format!("getelementptr ([{len} x i8], [{len} x i8]* @{name}, i32 0, i32 0)")
}

/// `i32` constant holding the allocation size of the struct `%name`.
pub fn size_of(name: &str) -> String {
    format!("ptrtoint (%{name}* getelementptr (%{name}, %{name}* null, i32 1) to i32)")
}

/// Constant `bitcast` of a global to another type.
pub fn const_bitcast(src: &Operand, to: &OpType) -> String {
    format!("bitcast ({} to {to})", src.typed())
}

/// Body of a `c"..."` literal: NUL-terminated, non-printable bytes as `\XX`.
pub fn escape_c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 3);
    for byte in text.bytes() {
        if byte == b'"' || byte == b'\\' || !(0x20..0x7f).contains(&byte) {
            out.push_str(&format!("\\{byte:02X}"));
        } else {
            out.push(char::from(byte));
        }
    }
    out.push_str("\\00");
    out
}

struct List<'a>(&'a [OpType]);

impl fmt::Display for List<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.0)
    }
}
