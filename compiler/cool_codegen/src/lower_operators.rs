//! Arithmetic, comparison, unary and `isvoid` lowering.

use cool_ir::{BinaryOp, ExprId, UnaryOp};

use crate::environment::Counter;
use crate::expr_lowerer::ExprLowerer;
use crate::ir_writer::{BinOp, IntPredicate};
use crate::layout::FIRST_ATTR_FIELD;
use crate::operand::{OpType, Operand};
use crate::runtime_decl;
use crate::CodegenError;

impl ExprLowerer<'_> {
    /// Left operand first, then right.
    pub(crate) fn lower_binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    ) -> Result<Operand, CodegenError> {
        let lhs = self.lower(left)?;
        let rhs = self.lower(right)?;
        match op {
            BinaryOp::Add => self.arith(BinOp::Add, lhs, rhs),
            BinaryOp::Sub => self.arith(BinOp::Sub, lhs, rhs),
            BinaryOp::Mul => self.arith(BinOp::Mul, lhs, rhs),
            BinaryOp::Div => self.lower_div(lhs, rhs),
            BinaryOp::Lt => self.compare_ints(IntPredicate::Slt, lhs, rhs),
            BinaryOp::Le => self.compare_ints(IntPredicate::Sle, lhs, rhs),
            BinaryOp::Eq => self.lower_eq(left, lhs, rhs),
        }
    }

    fn arith(&mut self, op: BinOp, lhs: Operand, rhs: Operand) -> Result<Operand, CodegenError> {
        let lhs = self.conform(lhs, &OpType::Int32)?;
        let rhs = self.conform(rhs, &OpType::Int32)?;
        let dest = self.temp(OpType::Int32);
        self.out.binary(op, &dest, &lhs, &rhs);
        Ok(dest)
    }

    /// Every division checks its divisor; zero branches to `abort`.
    fn lower_div(&mut self, lhs: Operand, rhs: Operand) -> Result<Operand, CodegenError> {
        let rhs = self.conform(rhs, &OpType::Int32)?;
        let is_zero = self.temp(OpType::Int1);
        self.out.icmp(IntPredicate::Eq, &is_zero, &rhs, &Operand::int(0));
        let ok = format!("div.ok.{}", self.env.next(Counter::Div));
        self.abort_if(&is_zero, &ok);
        self.arith(BinOp::SDiv, lhs, rhs)
    }

    fn compare_ints(
        &mut self,
        pred: IntPredicate,
        lhs: Operand,
        rhs: Operand,
    ) -> Result<Operand, CodegenError> {
        let lhs = self.conform(lhs, &OpType::Int32)?;
        let rhs = self.conform(rhs, &OpType::Int32)?;
        let dest = self.temp(OpType::Int1);
        self.out.icmp(pred, &dest, &lhs, &rhs);
        Ok(dest)
    }

    /// `Int`/`Bool` compare values, `String` compares contents, every
    /// other class compares identity.
    fn lower_eq(&mut self, left: ExprId, lhs: Operand, rhs: Operand) -> Result<Operand, CodegenError> {
        let (lhs, rhs) = match lhs.ty() {
            OpType::Int32 | OpType::Int1 => {
                let ty = lhs.ty().clone();
                let rhs = self.conform(rhs, &ty)?;
                (lhs, rhs)
            }
            _ if self.cx.arena.ty(left) == self.cx.known.string => {
                let l = self.string_bytes(lhs)?;
                let r = self.string_bytes(rhs)?;
                let order = self.temp(OpType::Int32);
                self.out.call(Some(&order), &runtime_decl::strcmp(), &[l, r]);
                (order, Operand::int(0))
            }
            _ => {
                let l = self.conform(lhs, &OpType::c_string())?;
                let r = self.conform(rhs, &OpType::c_string())?;
                (l, r)
            }
        };
        let dest = self.temp(OpType::Int1);
        self.out.icmp(IntPredicate::Eq, &dest, &lhs, &rhs);
        Ok(dest)
    }

    /// The `i8*` held in a `String` object's `val` field.
    fn string_bytes(&mut self, value: Operand) -> Result<Operand, CodegenError> {
        let string = self.conform(value, &OpType::object("String"))?;
        let ptr = self.field_ptr(&string, FIRST_ATTR_FIELD, OpType::c_string());
        Ok(self.load(&ptr))
    }

    pub(crate) fn lower_unary(&mut self, op: UnaryOp, operand: ExprId) -> Result<Operand, CodegenError> {
        let value = self.lower(operand)?;
        match op {
            UnaryOp::Neg => {
                let value = self.conform(value, &OpType::Int32)?;
                let dest = self.temp(OpType::Int32);
                self.out.binary(BinOp::Sub, &dest, &Operand::int(0), &value);
                Ok(dest)
            }
            UnaryOp::Not => {
                let value = self.conform(value, &OpType::Int1)?;
                let dest = self.temp(OpType::Int1);
                self.out.binary(BinOp::Xor, &dest, &value, &Operand::bool(true));
                Ok(dest)
            }
        }
    }

    /// Unboxed values are never void; the no-value sentinel always is.
    pub(crate) fn lower_is_void(&mut self, operand: ExprId) -> Result<Operand, CodegenError> {
        let value = self.lower(operand)?;
        if value.is_no_value() {
            return Ok(Operand::bool(true));
        }
        if !value.ty().is_ptr() {
            return Ok(Operand::bool(false));
        }
        let dest = self.temp(OpType::Int1);
        let null = Operand::null(value.ty().clone());
        self.out.icmp(IntPredicate::Eq, &dest, &value, &null);
        Ok(dest)
    }
}
