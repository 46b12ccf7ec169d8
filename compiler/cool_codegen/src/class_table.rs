//! Class hierarchy: installation, parent resolution, tag intervals.
//!
//! Nodes live in a flat arena addressed by [`ClassId`]. A node's parent is
//! a lookup-only index and its children are an owned index list, so the
//! tree needs no shared pointers.
//!
//! After [`ClassTable::build`], every node carries a pre-order `tag` and
//! the largest tag in its subtree, `max_child`. The interval
//! `[tag, max_child]` covers exactly the class and its descendants:
//!
//! ```text
//! Object [0, 5]
//!   IO     [1, 2]
//!     Main   [2, 2]
//!   Int    [3, 3]
//!   Bool   [4, 4]
//!   String [5, 5]
//! ```

use cool_ir::{
    AttrDecl, ClassDecl, ExprId, Feature, Formal, KnownNames, MethodDecl, Name, Program,
    StringInterner,
};
use cool_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::CodegenError;

/// Index of a class in the [`ClassTable`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ClassId(u32);

impl ClassId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One class in the hierarchy.
#[derive(Clone, Debug)]
pub struct ClassNode {
    pub name: Name,
    /// Declared parent name; `_no_class` for the root.
    pub parent_name: Name,
    pub parent: Option<ClassId>,
    pub children: Vec<ClassId>,
    pub tag: u32,
    pub max_child: u32,
    /// Runtime-provided class: no bodies, no generated constructor.
    pub basic: bool,
    pub features: Vec<Feature>,
}

impl ClassNode {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.features.iter().filter_map(|f| match f {
            Feature::Method(m) => Some(m),
            Feature::Attribute(_) => None,
        })
    }
}

/// Every installed class, with resolved links and tag intervals.
pub struct ClassTable {
    nodes: Vec<ClassNode>,
    by_name: FxHashMap<Name, ClassId>,
    /// Pre-order, i.e. ascending tag.
    tag_order: Vec<ClassId>,
    root: Option<ClassId>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_name: FxHashMap::default(),
            tag_order: Vec::new(),
            root: None,
        }
    }

    /// Install the basic and user classes, link parents, and number the tree.
    pub fn build(
        program: &Program,
        interner: &StringInterner,
        known: &KnownNames,
    ) -> Result<Self, CodegenError> {
        let mut table = Self::new();
        table.install_basic_classes(known);
        for class in &program.classes {
            if !table.install_class(class.clone(), false) {
                debug!(class = interner.lookup(class.name), "ignoring duplicate class");
            }
        }
        table.link_parents(interner, known)?;
        table.check_acyclic(interner)?;
        table.assign_tags(interner, known)?;
        Ok(table)
    }

    /// Install `Object`, `IO`, `Int`, `Bool` and `String`.
    ///
    /// Their methods are provided by the runtime; bodies are `ExprId::INVALID`.
    pub fn install_basic_classes(&mut self, k: &KnownNames) {
        let basic = [
            ClassDecl {
                name: k.object,
                parent: k.no_class,
                features: vec![
                    basic_method(k.abort, &[], k.object),
                    basic_method(k.type_name, &[], k.string),
                    basic_method(k.copy, &[], k.self_type),
                ],
            },
            ClassDecl {
                name: k.io,
                parent: k.object,
                features: vec![
                    basic_method(k.out_string, &[(k.arg, k.string)], k.self_type),
                    basic_method(k.out_int, &[(k.arg, k.int)], k.self_type),
                    basic_method(k.in_string, &[], k.string),
                    basic_method(k.in_int, &[], k.int),
                ],
            },
            ClassDecl {
                name: k.int,
                parent: k.object,
                features: vec![basic_attr(k.val, k.prim_int)],
            },
            ClassDecl {
                name: k.bool_,
                parent: k.object,
                features: vec![basic_attr(k.val, k.prim_bool)],
            },
            ClassDecl {
                name: k.string,
                parent: k.object,
                features: vec![
                    basic_attr(k.val, k.prim_string),
                    basic_method(k.length, &[], k.int),
                    basic_method(k.concat, &[(k.arg, k.string)], k.string),
                    basic_method(k.substr, &[(k.arg, k.int), (k.arg2, k.int)], k.string),
                ],
            },
        ];
        for class in basic {
            self.install_class(class, true);
        }
    }

    /// Install one class. Returns `false` if the name was already taken;
    /// the first definition wins.
    pub fn install_class(&mut self, decl: ClassDecl, basic: bool) -> bool {
        if self.by_name.contains_key(&decl.name) {
            return false;
        }
        let id = ClassId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.by_name.insert(decl.name, id);
        self.nodes.push(ClassNode {
            name: decl.name,
            parent_name: decl.parent,
            parent: None,
            children: Vec::new(),
            tag: 0,
            max_child: 0,
            basic,
            features: decl.features,
        });
        true
    }

    /// Resolve every parent name and fill in the children lists.
    fn link_parents(
        &mut self,
        interner: &StringInterner,
        known: &KnownNames,
    ) -> Result<(), CodegenError> {
        for index in 0..self.nodes.len() {
            let node = &self.nodes[index];
            if node.name == known.object {
                continue;
            }
            let Some(&parent) = self.by_name.get(&node.parent_name) else {
                return Err(CodegenError::UndefinedParent {
                    class: interner.lookup(node.name).to_owned(),
                    parent: interner.lookup(node.parent_name).to_owned(),
                });
            };
            self.nodes[index].parent = Some(parent);
            self.nodes[parent.index()].children.push(ClassId(index as u32));
        }
        Ok(())
    }

    /// Reject parent chains that never reach the root.
    ///
    /// A chain through `n` classes is at most `n` links long; anything
    /// longer revisits a class.
    fn check_acyclic(&self, interner: &StringInterner) -> Result<(), CodegenError> {
        let limit = self.nodes.len();
        for node in &self.nodes {
            let mut current = node.parent;
            let mut depth = 0;
            while let Some(id) = current {
                depth += 1;
                if depth > limit {
                    return Err(CodegenError::InheritanceCycle {
                        class: interner.lookup(node.name).to_owned(),
                    });
                }
                current = self.nodes[id.index()].parent;
            }
        }
        Ok(())
    }

    /// Pre-order numbering from `Object`.
    fn assign_tags(
        &mut self,
        interner: &StringInterner,
        known: &KnownNames,
    ) -> Result<(), CodegenError> {
        let root = self
            .lookup(known.object)
            .ok_or_else(|| CodegenError::MissingClass {
                class: interner.lookup(known.object).to_owned(),
            })?;
        self.root = Some(root);
        self.tag_order.clear();
        let mut next = 0;
        self.number(root, &mut next);
        debug!(classes = self.tag_order.len(), "assigned class tags");
        Ok(())
    }

    fn number(&mut self, id: ClassId, next: &mut u32) {
        ensure_sufficient_stack(|| {
            let tag = *next;
            *next += 1;
            self.nodes[id.index()].tag = tag;
            self.tag_order.push(id);
            for i in 0..self.nodes[id.index()].children.len() {
                let child = self.nodes[id.index()].children[i];
                self.number(child, next);
            }
            let node = &mut self.nodes[id.index()];
            node.max_child = *next - 1;
            trace!(tag = node.tag, max_child = node.max_child, "numbered class");
        });
    }

    // -- Queries --

    #[inline]
    pub fn lookup(&self, name: Name) -> Option<ClassId> {
        self.by_name.get(&name).copied()
    }

    #[inline]
    pub fn node(&self, id: ClassId) -> &ClassNode {
        &self.nodes[id.index()]
    }

    pub fn root(&self) -> Option<ClassId> {
        self.root
    }

    /// Classes in ascending tag order; parents precede children.
    pub fn tag_order(&self) -> &[ClassId] {
        &self.tag_order
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `sub` conforms to `sup`: `tag(sup) <= tag(sub) <= max_child(sup)`.
    #[inline]
    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        let (sub, sup) = (self.node(sub), self.node(sup));
        sup.tag <= sub.tag && sub.tag <= sup.max_child
    }
}

fn basic_method(name: Name, formals: &[(Name, Name)], return_type: Name) -> Feature {
    Feature::Method(MethodDecl {
        name,
        formals: formals
            .iter()
            .map(|&(name, type_decl)| Formal { name, type_decl })
            .collect(),
        return_type,
        body: ExprId::INVALID,
    })
}

fn basic_attr(name: Name, type_decl: Name) -> Feature {
    Feature::Attribute(AttrDecl {
        name,
        type_decl,
        init: ExprId::INVALID,
    })
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}
