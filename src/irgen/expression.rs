/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::ast::{AstNode, NodeKind};
use crate::errors::CompileError;
use crate::ir::{Inst, Op, Type};
use crate::irgen::{ExprCtx, IrGen, Lowered};
use anyhow::Result;

impl<'a> IrGen<'a> {
    // Arithmetic binaries evaluate left then right, then append a single
    // i32 instruction.
    pub(crate) fn lower_binary(&mut self, node: &AstNode) -> Result<Lowered> {
        let op = match node.kind {
            NodeKind::Add => Op::Add,
            NodeKind::Sub => Op::Sub,
            NodeKind::Mul => Op::Mul,
            NodeKind::Div => Op::Div,
            NodeKind::Mod => Op::Mod,
            _ => unreachable!("not an arithmetic node"),
        };

        let lhs = self.lower_expr(&node.children[0], ExprCtx::Value)?;
        let rhs = self.lower_expr(&node.children[1], ExprCtx::Value)?;
        let l = self.expect_value(&node.children[0], &lhs)?;
        let r = self.expect_value(&node.children[1], &rhs)?;

        let mut code = lhs.code;
        code.extend(rhs.code);
        let result = self.emit(&mut code, Inst::new(op, vec![l, r]), Type::Int32);

        Ok(Lowered {
            value: Some(result),
            code,
        })
    }

    // Unary minus. At module scope only constant operands fold; inside a
    // function an i1 operand widens first, then 0 - x is emitted.
    pub(crate) fn lower_neg(&mut self, node: &AstNode) -> Result<Lowered> {
        let operand = &node.children[0];

        if self.module.current.is_none() {
            let lowered = self.lower_expr(operand, ExprCtx::Value)?;
            let value = self.expect_value(operand, &lowered)?;
            match self.module.const_value(value) {
                Some(v) => {
                    return Ok(Lowered::of_value(
                        self.module.new_const_int(v.wrapping_neg()),
                    ));
                }
                None => {
                    return Err(CompileError::SemanticError {
                        line: node.line,
                        reason: "Non-constant global initializer.".to_string(),
                    }
                    .into());
                }
            }
        }

        let lowered = self.lower_expr(operand, ExprCtx::Value)?;
        let mut value = self.expect_value(operand, &lowered)?;
        let mut code = lowered.code;

        if self.module.type_of(value).is_bool() {
            value = self.widen_bool(&mut code, value);
        }

        let zero = self.module.new_const_int(0);
        let result = self.emit(&mut code, Inst::new(Op::Sub, vec![zero, value]), Type::Int32);

        Ok(Lowered {
            value: Some(result),
            code,
        })
    }

    // Relational and equality operators. Both sides evaluate as i32; the
    // i1 result feeds a branch directly in Cond context and widens
    // otherwise. All six compares follow the same rule.
    pub(crate) fn lower_compare(&mut self, node: &AstNode, ctx: ExprCtx) -> Result<Lowered> {
        let op = match node.kind {
            NodeKind::Lt => Op::CmpLt,
            NodeKind::Gt => Op::CmpGt,
            NodeKind::Le => Op::CmpLe,
            NodeKind::Ge => Op::CmpGe,
            NodeKind::Eq => Op::CmpEq,
            NodeKind::Ne => Op::CmpNe,
            _ => unreachable!("not a compare node"),
        };

        let lhs = self.lower_expr(&node.children[0], ExprCtx::Value)?;
        let rhs = self.lower_expr(&node.children[1], ExprCtx::Value)?;
        let l = self.expect_value(&node.children[0], &lhs)?;
        let r = self.expect_value(&node.children[1], &rhs)?;

        let mut code = lhs.code;
        code.extend(rhs.code);
        let cmp = self.emit(&mut code, Inst::new(op, vec![l, r]), Type::Bool);

        let value = if ctx == ExprCtx::Cond {
            cmp
        } else {
            self.widen_bool(&mut code, cmp)
        };

        Ok(Lowered {
            value: Some(value),
            code,
        })
    }

    // Logical not: x == 0 at i1, widened outside Cond context.
    pub(crate) fn lower_not(&mut self, node: &AstNode, ctx: ExprCtx) -> Result<Lowered> {
        let operand = &node.children[0];
        let lowered = self.lower_expr(operand, ExprCtx::Value)?;
        let value = self.expect_value(operand, &lowered)?;
        let mut code = lowered.code;

        let zero = self.module.new_const_int(0);
        let cmp = self.emit(
            &mut code,
            Inst::new(Op::CmpEq, vec![value, zero]),
            Type::Bool,
        );

        let value = if ctx == ExprCtx::Cond {
            cmp
        } else {
            self.widen_bool(&mut code, cmp)
        };

        Ok(Lowered {
            value: Some(value),
            code,
        })
    }

    // Short-circuit && and ||. The right operand only evaluates when the
    // left one leaves the result open; the widen is inlined so both arms
    // share the result assignments and the end label.
    pub(crate) fn lower_short_circuit(&mut self, node: &AstNode) -> Result<Lowered> {
        let is_and = node.kind == NodeKind::And;

        let mut code = Vec::new();
        let result = self.module.new_var(Type::Int32, None);
        let l_rhs = self.module.new_label();
        let l_true = self.module.new_label();
        let l_false = self.module.new_label();
        let l_end = self.module.new_label();

        let lhs = self.lower_expr(&node.children[0], ExprCtx::Cond)?;
        let lhs_value = self.expect_value(&node.children[0], &lhs)?;
        code.extend(lhs.code);
        let c0 = self.to_cond(&mut code, lhs_value);
        if is_and {
            self.emit_branch(&mut code, c0, l_rhs, l_false);
        } else {
            self.emit_branch(&mut code, c0, l_true, l_rhs);
        }

        code.push(l_rhs);
        let rhs = self.lower_expr(&node.children[1], ExprCtx::Cond)?;
        let rhs_value = self.expect_value(&node.children[1], &rhs)?;
        code.extend(rhs.code);
        let c1 = self.to_cond(&mut code, rhs_value);
        self.emit_branch(&mut code, c1, l_true, l_false);

        code.push(l_true);
        let one = self.module.new_const_int(1);
        self.emit_move(&mut code, result, one);
        self.emit_goto(&mut code, l_end);
        code.push(l_false);
        let zero = self.module.new_const_int(0);
        self.emit_move(&mut code, result, zero);
        self.emit_goto(&mut code, l_end);
        code.push(l_end);

        Ok(Lowered {
            value: Some(result),
            code,
        })
    }

    // Call: arguments evaluate left to right; an array-name argument
    // passes the array value itself (its base address by ABI). Arg
    // instructions stay contiguous immediately before the call.
    pub(crate) fn lower_func_call(&mut self, node: &AstNode) -> Result<Lowered> {
        let callee_name = node.children[0].name_str().to_string();
        let callee = self.module.find_function(&callee_name).ok_or_else(|| {
            CompileError::SemanticError {
                line: node.line,
                reason: format!("Undefined function: {}", callee_name),
            }
        })?;

        let args = &node.children[1];
        let expected = self.module.functions[callee].params.len();
        if args.children.len() != expected {
            return Err(CompileError::SemanticError {
                line: node.line,
                reason: format!(
                    "Function {} expects {} argument(s), got {}.",
                    callee_name,
                    expected,
                    args.children.len()
                ),
            }
            .into());
        }
        let return_type = self.module.functions[callee].return_type.clone();

        let mut code = Vec::new();
        let mut arg_values = Vec::new();
        for arg in &args.children {
            let lowered = self.lower_expr(arg, ExprCtx::Value)?;
            let value = self.expect_value(arg, &lowered)?;
            code.extend(lowered.code);
            arg_values.push(value);
        }

        for &value in &arg_values {
            self.emit(&mut code, Inst::new(Op::Arg, vec![value]), Type::Void);
        }

        let call = Inst {
            callee: Some(callee_name),
            ..Inst::new(Op::Call, arg_values.clone())
        };
        let call_value = self.emit(&mut code, call, return_type.clone());
        self.module.cur_fn().note_call(arg_values.len());

        Ok(Lowered {
            value: if return_type.is_void() {
                None
            } else {
                Some(call_value)
            },
            code,
        })
    }

    pub(crate) fn lower_identifier(&mut self, node: &AstNode) -> Result<Lowered> {
        let name = node.name_str();
        let value = self.module.find_var(name).ok_or_else(|| {
            CompileError::SemanticError {
                line: node.line,
                reason: format!("Undefined symbol: {}", name),
            }
        })?;
        Ok(Lowered::of_value(value))
    }
}
