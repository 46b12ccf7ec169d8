//! Pre-interned well-known names.

use crate::{Name, StringInterner};

/// Names the code generator compares against on every node.
///
/// Interned once per compilation so dispatch code compares `Name`
/// values directly (`u32 == u32`) instead of re-interning text.
#[derive(Clone, Copy, Debug)]
pub struct KnownNames {
    // Basic classes
    pub object: Name,
    pub io: Name,
    pub int: Name,
    pub bool_: Name,
    pub string: Name,
    // Special symbols
    pub self_type: Name,
    pub self_: Name,
    pub no_class: Name,
    pub no_type: Name,
    // Primitive slot types
    pub prim_int: Name,
    pub prim_bool: Name,
    pub prim_string: Name,
    // Basic methods and slots
    pub abort: Name,
    pub type_name: Name,
    pub copy: Name,
    pub out_string: Name,
    pub out_int: Name,
    pub in_string: Name,
    pub in_int: Name,
    pub length: Name,
    pub concat: Name,
    pub substr: Name,
    pub val: Name,
    pub arg: Name,
    pub arg2: Name,
}

impl KnownNames {
    pub fn new(interner: &StringInterner) -> Self {
        Self {
            object: interner.intern("Object"),
            io: interner.intern("IO"),
            int: interner.intern("Int"),
            bool_: interner.intern("Bool"),
            string: interner.intern("String"),
            self_type: interner.intern("SELF_TYPE"),
            self_: interner.intern("self"),
            no_class: interner.intern("_no_class"),
            no_type: interner.intern("_no_type"),
            prim_int: interner.intern("int"),
            prim_bool: interner.intern("bool"),
            prim_string: interner.intern("sbyte*"),
            abort: interner.intern("abort"),
            type_name: interner.intern("type_name"),
            copy: interner.intern("copy"),
            out_string: interner.intern("out_string"),
            out_int: interner.intern("out_int"),
            in_string: interner.intern("in_string"),
            in_int: interner.intern("in_int"),
            length: interner.intern("length"),
            concat: interner.intern("concat"),
            substr: interner.intern("substr"),
            val: interner.intern("val"),
            arg: interner.intern("arg"),
            arg2: interner.intern("arg2"),
        }
    }

    /// True for the classes whose instances are unboxed in registers.
    #[inline]
    pub fn is_unboxed(&self, class: Name) -> bool {
        class == self.int || class == self.bool_
    }
}
