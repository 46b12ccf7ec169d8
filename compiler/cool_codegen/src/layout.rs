//! Attribute layout and vtable slots, computed once per class in tag order.
//!
//! Instance struct: field 0 is the vtable pointer, attributes follow.
//! Vtable struct: `tag`, `size`, `name`, `new`, then one slot per method.
//!
//! A subclass starts from a copy of its parent's layout, so inherited
//! attributes keep their field index and inherited methods keep their
//! vtable slot even when overridden.

use cool_ir::{ExprId, Feature, Formal, Name};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::class_table::{ClassId, ClassTable};

/// Instance field holding the first attribute.
pub const FIRST_ATTR_FIELD: u32 = 1;

/// Vtable fields before the method slots.
pub mod vtable_field {
    pub const TAG: u32 = 0;
    pub const SIZE: u32 = 1;
    pub const NAME: u32 = 2;
    pub const NEW: u32 = 3;
    pub const FIRST_METHOD: u32 = 4;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrSlot {
    pub name: Name,
    pub type_decl: Name,
    /// Class declaring the attribute.
    pub owner: ClassId,
    pub init: ExprId,
    /// Field index in the instance struct.
    pub field: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSlot {
    pub name: Name,
    /// Most-derived class providing the body.
    pub impl_class: ClassId,
    pub formals: Vec<Formal>,
    pub return_type: Name,
    /// Position among the method slots, starting at 0.
    pub index: u32,
}

impl MethodSlot {
    /// Field index in the vtable struct.
    #[inline]
    pub fn vtable_field(&self) -> u32 {
        vtable_field::FIRST_METHOD + self.index
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClassLayout {
    attrs: Vec<AttrSlot>,
    methods: Vec<MethodSlot>,
    attr_index: FxHashMap<Name, usize>,
    method_index: FxHashMap<Name, usize>,
}

impl ClassLayout {
    /// Attributes in field order, inherited first.
    pub fn attrs(&self) -> &[AttrSlot] {
        &self.attrs
    }

    /// Methods in vtable order.
    pub fn methods(&self) -> &[MethodSlot] {
        &self.methods
    }

    pub fn attr(&self, name: Name) -> Option<&AttrSlot> {
        self.attr_index.get(&name).map(|&i| &self.attrs[i])
    }

    pub fn method(&self, name: Name) -> Option<&MethodSlot> {
        self.method_index.get(&name).map(|&i| &self.methods[i])
    }

    fn add_feature(&mut self, class: ClassId, feature: &Feature) {
        match feature {
            Feature::Attribute(attr) => {
                let field = FIRST_ATTR_FIELD + self.attrs.len() as u32;
                self.attr_index.insert(attr.name, self.attrs.len());
                self.attrs.push(AttrSlot {
                    name: attr.name,
                    type_decl: attr.type_decl,
                    owner: class,
                    init: attr.init,
                    field,
                });
            }
            Feature::Method(method) => {
                if let Some(&i) = self.method_index.get(&method.name) {
                    let slot = &mut self.methods[i];
                    slot.impl_class = class;
                    slot.formals.clone_from(&method.formals);
                    slot.return_type = method.return_type;
                } else {
                    let index = self.methods.len() as u32;
                    self.method_index.insert(method.name, self.methods.len());
                    self.methods.push(MethodSlot {
                        name: method.name,
                        impl_class: class,
                        formals: method.formals.clone(),
                        return_type: method.return_type,
                        index,
                    });
                }
            }
        }
    }
}

/// Layouts for every class, indexed by [`ClassId`].
pub struct Layouts {
    by_class: Vec<ClassLayout>,
}

impl Layouts {
    pub fn compute(table: &ClassTable) -> Self {
        let mut by_class = vec![ClassLayout::default(); table.len()];
        for &id in table.tag_order() {
            let node = table.node(id);
            let mut layout = node
                .parent
                .map(|p| by_class[p.index()].clone())
                .unwrap_or_default();
            for feature in &node.features {
                layout.add_feature(id, feature);
            }
            debug!(
                tag = node.tag,
                attrs = layout.attrs.len(),
                methods = layout.methods.len(),
                "laid out class"
            );
            by_class[id.index()] = layout;
        }
        Self { by_class }
    }

    #[inline]
    pub fn get(&self, class: ClassId) -> &ClassLayout {
        &self.by_class[class.index()]
    }
}
