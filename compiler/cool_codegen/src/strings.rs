//! String constants: class names and string literals.
//!
//! Every distinct text is emitted once as a `[n x i8]` global `@str.N`.
//! Literals additionally get a constant `%String` object `@String.N`
//! pointing at those bytes, which is what a literal expression evaluates to.

use cool_ir::{ExprArena, ExprKind, Name};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::class_table::ClassTable;
use crate::context::CodegenCx;
use crate::ir_writer::{c_string_ptr, escape_c_string, IrWriter};
use crate::operand::{OpType, Operand};

pub struct StringConstants {
    index: FxHashMap<Name, u32>,
    order: Vec<Name>,
    literals: FxHashSet<Name>,
}

impl StringConstants {
    /// Class names in tag order, then literals in arena order.
    pub fn collect(table: &ClassTable, arena: &ExprArena) -> Self {
        let mut strings = Self {
            index: FxHashMap::default(),
            order: Vec::new(),
            literals: FxHashSet::default(),
        };
        for &class in table.tag_order() {
            strings.add(table.node(class).name);
        }
        for (_, kind) in arena.iter() {
            if let ExprKind::Str(text) = *kind {
                strings.add(text);
                strings.literals.insert(text);
            }
        }
        strings
    }

    fn add(&mut self, text: Name) -> u32 {
        if let Some(&n) = self.index.get(&text) {
            return n;
        }
        let n = self.order.len() as u32;
        self.index.insert(text, n);
        self.order.push(text);
        n
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Global name of the bytes of `text`.
    pub fn bytes_global(&self, text: Name) -> Option<String> {
        self.index.get(&text).map(|n| format!("str.{n}"))
    }

    /// The constant `%String` object for a literal.
    pub fn literal(&self, text: Name) -> Option<Operand> {
        if !self.literals.contains(&text) {
            return None;
        }
        self.index
            .get(&text)
            .map(|n| Operand::global(format!("String.{n}"), OpType::object("String")))
    }

    pub fn emit(&self, cx: &CodegenCx<'_>, out: &mut IrWriter) {
        out.line("; string constants");
        let string_vtable = cx
            .table
            .lookup(cx.known.string)
            .map(|s| (cx.vtable_struct(s), cx.vtable_global(s)));
        for (n, &text) in self.order.iter().enumerate() {
            let s = cx.name(text);
            let len = byte_len(s);
            let bytes = format!("str.{n}");
            let ty = OpType::Array(Box::new(OpType::Int8), len);
            out.global_constant(&bytes, true, &ty, &format!("c\"{}\"", escape_c_string(s)));
            if !self.literals.contains(&text) {
                continue;
            }
            if let Some((vt_struct, vt_global)) = &string_vtable {
                let init = format!(
                    "{{ %{vt_struct}* @{vt_global}, i8* {} }}",
                    c_string_ptr(&bytes, len)
                );
                let string_ty = OpType::Named("String".into());
                out.global_constant(&format!("String.{n}"), false, &string_ty, &init);
            }
        }
        out.blank();
    }
}

/// Length of the NUL-terminated byte array holding `s`.
pub fn byte_len(s: &str) -> u32 {
    u32::try_from(s.len() + 1).unwrap_or(u32::MAX)
}
