//! Read-only state shared by every function compiled in a module.

use cool_ir::{ExprArena, Formal, KnownNames, Name, StringInterner};

use crate::class_table::{ClassId, ClassTable};
use crate::layout::{AttrSlot, ClassLayout, Layouts, MethodSlot};
use crate::operand::OpType;
use crate::strings::StringConstants;
use crate::{CodegenError, CodegenOptions};

/// Module-wide lowering context, fixed once layout is complete.
pub struct CodegenCx<'a> {
    pub interner: &'a StringInterner,
    pub known: KnownNames,
    pub arena: &'a ExprArena,
    pub table: &'a ClassTable,
    pub layouts: &'a Layouts,
    pub strings: &'a StringConstants,
    pub options: &'a CodegenOptions,
}

impl<'a> CodegenCx<'a> {
    #[inline]
    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    #[inline]
    pub fn class_name(&self, class: ClassId) -> &'static str {
        self.name(self.table.node(class).name)
    }

    #[inline]
    pub fn layout(&self, class: ClassId) -> &'a ClassLayout {
        self.layouts.get(class)
    }

    pub fn class_id(&self, name: Name) -> Result<ClassId, CodegenError> {
        self.table
            .lookup(name)
            .ok_or_else(|| CodegenError::UnknownClass {
                class: self.name(name).to_owned(),
            })
    }

    /// Class named by a static type, with `SELF_TYPE` read as `current`.
    pub fn static_class(&self, ty: Name, current: ClassId) -> Result<ClassId, CodegenError> {
        if ty == self.known.self_type {
            Ok(current)
        } else {
            self.class_id(ty)
        }
    }

    // -- Types --

    /// IR type of a value of static type `ty` inside class `current`.
    ///
    /// `Int` and `Bool` are unboxed; everything else is an object pointer.
    pub fn value_type(&self, ty: Name, current: ClassId) -> OpType {
        let k = &self.known;
        if ty == k.int || ty == k.prim_int {
            OpType::Int32
        } else if ty == k.bool_ || ty == k.prim_bool {
            OpType::Int1
        } else if ty == k.prim_string {
            OpType::c_string()
        } else if ty == k.self_type {
            self.object_type(current)
        } else if ty == k.no_type {
            OpType::Void
        } else {
            OpType::object(self.name(ty))
        }
    }

    /// Field type of an attribute; `SELF_TYPE` reads as the declaring class.
    pub fn attr_type(&self, attr: &AttrSlot) -> OpType {
        self.value_type(attr.type_decl, attr.owner)
    }

    #[inline]
    pub fn object_type(&self, class: ClassId) -> OpType {
        OpType::object(self.class_name(class))
    }

    pub fn vtable_struct(&self, class: ClassId) -> String {
        format!("_{}_vtable", self.class_name(class))
    }

    pub fn vtable_type(&self, class: ClassId) -> OpType {
        OpType::Named(self.vtable_struct(class))
    }

    pub fn vtable_global(&self, class: ClassId) -> String {
        format!("_{}_vtable_prototype", self.class_name(class))
    }

    /// Function type of a method body with `self` typed as `class`.
    pub fn signature(&self, formals: &[Formal], return_type: Name, class: ClassId) -> OpType {
        let mut params = Vec::with_capacity(formals.len() + 1);
        params.push(self.object_type(class));
        params.extend(formals.iter().map(|f| self.value_type(f.type_decl, class)));
        OpType::func(self.value_type(return_type, class), params)
    }

    /// Type of a vtable slot as seen through a `class` receiver.
    pub fn method_type(&self, slot: &MethodSlot, class: ClassId) -> OpType {
        self.signature(&slot.formals, slot.return_type, class)
    }

    /// `%C* ()`
    pub fn constructor_type(&self, class: ClassId) -> OpType {
        OpType::func(self.object_type(class), Vec::new())
    }

    // -- Symbols --

    /// `@<class>_<method>`, with `_` in the class name doubled so that
    /// `A.b_c` and `A_b.c` stay distinct.
    pub fn method_symbol(&self, class: ClassId, method: Name) -> String {
        format!("{}_{}", self.symbol_prefix(class), self.name(method))
    }

    pub fn constructor_symbol(&self, class: ClassId) -> String {
        format!("{}_new", self.symbol_prefix(class))
    }

    fn symbol_prefix(&self, class: ClassId) -> String {
        self.class_name(class).replace('_', "__")
    }
}
