//! Control flow lowering: `if`, `while`, blocks, `let`, `case`.
//!
//! Values that cross a join live in the slots the alloca pre-pass
//! reserved for the node; each arm stores into the slot and the join
//! block loads it back.

use std::cmp::Reverse;

use cool_ir::{BranchRange, ExprId, ExprRange, Name};
use smallvec::SmallVec;

use crate::class_table::ClassId;
use crate::environment::Counter;
use crate::expr_lowerer::ExprLowerer;
use crate::ir_writer::{BinOp, IntPredicate};
use crate::operand::{OpType, Operand};
use crate::CodegenError;

impl ExprLowerer<'_> {
    pub(crate) fn lower_cond(
        &mut self,
        id: ExprId,
        pred: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    ) -> Result<Operand, CodegenError> {
        let slot = self.slots.expr(id).cloned();
        let cond = self.lower(pred)?;
        let cond = self.conform(cond, &OpType::Int1)?;

        let n = self.env.next(Counter::Cond);
        let then_label = format!("then.{n}");
        let else_label = format!("else.{n}");
        let fi_label = format!("fi.{n}");
        self.out.cond_br(&cond, &then_label, &else_label);

        for (label, arm) in [(&then_label, then_branch), (&else_label, else_branch)] {
            self.out.begin_block(label);
            let value = self.lower(arm)?;
            if let Some(slot) = &slot {
                self.store_value(&value, slot)?;
            }
            self.out.br(&fi_label);
        }

        self.out.begin_block(&fi_label);
        Ok(match slot {
            Some(slot) => self.load(&slot),
            None => Operand::no_value(),
        })
    }

    /// A loop's value is always the no-value sentinel.
    pub(crate) fn lower_loop(&mut self, pred: ExprId, body: ExprId) -> Result<Operand, CodegenError> {
        let n = self.env.next(Counter::Loop);
        let loop_label = format!("loop.{n}");
        let body_label = format!("body.{n}");
        let pool_label = format!("pool.{n}");

        self.out.br(&loop_label);
        self.out.begin_block(&loop_label);
        let cond = self.lower(pred)?;
        let cond = self.conform(cond, &OpType::Int1)?;
        self.out.cond_br(&cond, &body_label, &pool_label);

        self.out.begin_block(&body_label);
        self.lower(body)?;
        self.out.br(&loop_label);

        self.out.begin_block(&pool_label);
        Ok(Operand::no_value())
    }

    pub(crate) fn lower_block(&mut self, range: ExprRange) -> Result<Operand, CodegenError> {
        let arena = self.cx.arena;
        let mut last = Operand::no_value();
        for &expr in arena.list(range) {
            last = self.lower(expr)?;
        }
        Ok(last)
    }

    /// The initializer is evaluated before `name` is in scope; the binding
    /// is dropped again before returning.
    pub(crate) fn lower_let(
        &mut self,
        id: ExprId,
        name: Name,
        init: ExprId,
        body: ExprId,
    ) -> Result<Operand, CodegenError> {
        let slot = self
            .slots
            .expr(id)
            .cloned()
            .ok_or_else(|| CodegenError::internal("let binding without a slot"))?;
        let slot_ty = slot.ty().pointee().cloned().unwrap_or(OpType::Void);

        let value = if self.cx.arena.is_no_expr(init) {
            Operand::no_value()
        } else {
            self.lower(init)?
        };
        let value = if value.is_no_value() {
            self.default_value(&slot_ty)?
        } else {
            value
        };
        self.store_value(&value, &slot)?;

        self.env.enter_scope();
        self.env.bind(name, slot);
        let result = self.lower(body);
        self.env.exit_scope();
        result
    }

    /// Branches are tested by descending tag. All branches matching the
    /// runtime class lie on its ancestor chain, so the first hit is the
    /// most specific one. No hit aborts.
    pub(crate) fn lower_case(
        &mut self,
        id: ExprId,
        scrutinee: ExprId,
        branches: BranchRange,
    ) -> Result<Operand, CodegenError> {
        let cx = self.cx;
        let arena = cx.arena;

        let value = self.lower(scrutinee)?;
        let unboxed = matches!(value.ty(), OpType::Int32 | OpType::Int1);
        let class = cx.static_class(arena.ty(scrutinee), self.env.class())?;
        let object = self.conform(value, &cx.object_type(class))?;

        let n = self.env.next(Counter::Case);
        if !unboxed {
            self.void_check(&object, &format!("case.ok.{n}"));
        }
        let tag = self.load_tag(&object, class);

        let arms = arena.branches(branches);
        let mut order: SmallVec<[(usize, ClassId); 8]> = SmallVec::with_capacity(arms.len());
        for (index, arm) in arms.iter().enumerate() {
            order.push((index, cx.class_id(arm.type_decl)?));
        }
        order.sort_by_key(|&(_, class)| Reverse(cx.table.node(class).tag));

        let result_slot = self.slots.expr(id).cloned();
        let join = format!("case.join.{n}");
        let test_label = |k: usize| format!("case.test.{n}.{k}");

        if order.is_empty() {
            let abort = self.env.abort_label();
            self.out.br(abort);
        } else {
            self.out.br(&test_label(0));
        }

        for (k, &(index, arm_class)) in order.iter().enumerate() {
            let node = cx.table.node(arm_class);
            self.out.begin_block(&test_label(k));
            let lo = self.temp(OpType::Int1);
            self.out.icmp(IntPredicate::Sge, &lo, &tag, &tag_operand(node.tag));
            let hi = self.temp(OpType::Int1);
            self.out.icmp(IntPredicate::Sle, &hi, &tag, &tag_operand(node.max_child));
            let hit = self.temp(OpType::Int1);
            self.out.binary(BinOp::And, &hit, &lo, &hi);

            let arm_label = format!("case.branch.{n}.{k}");
            let miss = if k + 1 < order.len() {
                test_label(k + 1)
            } else {
                self.env.abort_label().to_owned()
            };
            self.out.cond_br(&hit, &arm_label, &miss);

            self.out.begin_block(&arm_label);
            let arm = arms[index];
            let slot = self
                .slots
                .branch(id, index)
                .cloned()
                .ok_or_else(|| CodegenError::internal("case branch without a slot"))?;
            self.store_value(&object, &slot)?;
            self.env.enter_scope();
            self.env.bind(arm.name, slot);
            let result = self.lower(arm.body);
            self.env.exit_scope();
            let result = result?;
            if let Some(result_slot) = &result_slot {
                self.store_value(&result, result_slot)?;
            }
            self.out.br(&join);
        }

        self.out.begin_block(&join);
        Ok(match result_slot {
            Some(slot) => self.load(&slot),
            None => Operand::no_value(),
        })
    }
}

fn tag_operand(tag: u32) -> Operand {
    Operand::int(i32::try_from(tag).unwrap_or(i32::MAX))
}
