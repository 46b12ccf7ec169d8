//! Literal, identifier and assignment lowering.

use cool_ir::{ExprId, Name};

use crate::environment::Storage;
use crate::expr_lowerer::ExprLowerer;
use crate::layout::AttrSlot;
use crate::operand::Operand;
use crate::CodegenError;

impl ExprLowerer<'_> {
    /// A string literal evaluates to its constant `%String` object.
    pub(crate) fn lower_string(&mut self, text: Name) -> Result<Operand, CodegenError> {
        self.cx.strings.literal(text).ok_or_else(|| {
            CodegenError::internal(format!(
                "string literal {:?} was not collected",
                self.cx.name(text)
            ))
        })
    }

    pub(crate) fn lower_ident(&mut self, id: ExprId, name: Name) -> Result<Operand, CodegenError> {
        if name == self.cx.known.self_ {
            return Ok(self.env.self_value().clone());
        }
        let place = self.place_of(name)?;
        let value = self.load(&place);
        let target = self.static_type(id);
        self.conform(value, &target)
    }

    /// Evaluates the right-hand side, stores it, and yields it.
    pub(crate) fn lower_assign(&mut self, name: Name, value: ExprId) -> Result<Operand, CodegenError> {
        let value = self.lower(value)?;
        let place = self.place_of(name)?;
        self.store_value(&value, &place)?;
        Ok(value)
    }

    /// Pointer to the storage of `name`, for both loads and stores.
    pub(crate) fn place_of(&mut self, name: Name) -> Result<Operand, CodegenError> {
        let layout = self.cx.layout(self.env.class());
        match self.env.resolve(name, layout) {
            Some(Storage::Slot(slot)) => Ok(slot),
            Some(Storage::Attribute(attr)) => Ok(self.attr_place(attr)),
            None => Err(CodegenError::UnboundIdentifier {
                name: self.cx.name(name).to_owned(),
                class: self.cx.class_name(self.env.class()).to_owned(),
            }),
        }
    }

    /// `getelementptr` to an attribute of `self`.
    pub(crate) fn attr_place(&mut self, attr: &AttrSlot) -> Operand {
        let this = self.env.self_value().clone();
        let ty = self.cx.attr_type(attr);
        self.field_ptr(&this, attr.field, ty)
    }
}
