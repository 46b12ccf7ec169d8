//! Per-function lowering state: lexical scopes, fresh names, current class.
//!
//! Scopes map identifiers to the stack slot holding their value. Lookup
//! walks innermost to outermost and then falls back to the current
//! class's attributes; [`Environment::resolve`] is the only place that
//! decides where an identifier lives, for reads and writes alike.
//!
//! Local names come from two disjoint sets. Generated registers, slots
//! and labels are `self`, `entry`, `abort`, or a fixed kind plus counter
//! (`vtmp.N`, `iftmp.N`, `then.N`, `case.test.N.K`, ...). Names derived
//! from a source identifier always end in `.slot.N`, `.arg` or `.addr`,
//! which no generated name does. Cool identifiers contain no `.`.

use cool_ir::Name;
use rustc_hash::FxHashMap;

use crate::class_table::ClassId;
use crate::layout::{AttrSlot, ClassLayout};
use crate::operand::Operand;

/// Label of the per-function block that calls `abort`.
pub const ABORT_LABEL: &str = "abort";

/// Incoming register of the formal `ident`.
pub fn param_register(ident: &str) -> String {
    format!("{ident}.arg")
}

/// Entry-block slot of the formal `ident`.
pub fn param_slot(ident: &str) -> String {
    format!("{ident}.addr")
}

/// Independent name counters, one per construct kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Counter {
    /// `%vtmp.N` registers.
    Temp,
    /// `then.N` / `else.N` / `fi.N`
    Cond,
    /// `loop.N` / `body.N` / `pool.N`
    Loop,
    /// `div.ok.N`
    Div,
    /// `dispatch.ok.N`
    Dispatch,
    /// `case.*.N`
    Case,
    /// Stack slots, `%<hint>.N`.
    Slot,
}

impl Counter {
    const COUNT: usize = 7;
}

/// Where an identifier's value is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Storage<'l> {
    /// A stack slot (let binding, case branch, formal).
    Slot(Operand),
    /// A field of `self`.
    Attribute(&'l AttrSlot),
}

pub struct Environment {
    scopes: Vec<FxHashMap<Name, Operand>>,
    counters: [u32; Counter::COUNT],
    class: ClassId,
    /// `None` while compiling a constructor.
    method: Option<Name>,
    self_value: Operand,
    abort_used: bool,
}

impl Environment {
    pub fn new(class: ClassId, method: Option<Name>, self_value: Operand) -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
            counters: [0; Counter::COUNT],
            class,
            method,
            self_value,
            abort_used: false,
        }
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn method(&self) -> Option<Name> {
        self.method
    }

    /// The receiver register, `%self`.
    #[inline]
    pub fn self_value(&self) -> &Operand {
        &self.self_value
    }

    // -- Scopes --

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn exit_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "exit_scope without matching enter_scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` to `slot` in the innermost scope.
    pub fn bind(&mut self, name: Name, slot: Operand) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, slot);
        }
    }

    pub fn lookup_local(&self, name: Name) -> Option<&Operand> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    /// Locals first, innermost out, then attributes of the current class.
    pub fn resolve<'l>(&self, name: Name, layout: &'l ClassLayout) -> Option<Storage<'l>> {
        if let Some(slot) = self.lookup_local(name) {
            return Some(Storage::Slot(slot.clone()));
        }
        layout.attr(name).map(Storage::Attribute)
    }

    // -- Fresh names --

    pub fn next(&mut self, counter: Counter) -> u32 {
        let n = &mut self.counters[counter as usize];
        let value = *n;
        *n += 1;
        value
    }

    pub fn fresh_temp(&mut self) -> String {
        format!("vtmp.{}", self.next(Counter::Temp))
    }

    /// Slot for a compiler temporary such as `iftmp`.
    pub fn fresh_slot(&mut self, hint: &str) -> String {
        format!("{hint}.{}", self.next(Counter::Slot))
    }

    /// Slot for a `let` or case variable named `ident`.
    pub fn binding_slot(&mut self, ident: &str) -> String {
        format!("{ident}.slot.{}", self.next(Counter::Slot))
    }

    // -- Abort path --

    /// Label of the abort block, recording that the function needs one.
    pub fn abort_label(&mut self) -> &'static str {
        self.abort_used = true;
        ABORT_LABEL
    }

    pub fn abort_used(&self) -> bool {
        self.abort_used
    }
}
