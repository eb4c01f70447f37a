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
use crate::irgen::{ExprCtx, IrGen, LoopLabels, Lowered};
use anyhow::Result;

impl<'a> IrGen<'a> {
    pub(crate) fn lower_block(&mut self, node: &AstNode) -> Result<Lowered> {
        self.module.enter_scope();
        let mut code = Vec::new();
        for child in &node.children {
            let lowered = self.lower_statement(child)?;
            code.extend(lowered.code);
        }
        self.module.leave_scope();
        Ok(Lowered { value: None, code })
    }

    // Local declarations: scalars get a slot and an optional initializing
    // move; arrays collect their declared dims first.
    pub(crate) fn lower_decl_stmt(&mut self, node: &AstNode) -> Result<Lowered> {
        let var_decl = &node.children[0];
        let mut code = Vec::new();

        // children[0] is the LeafType; declarators follow
        for def in &var_decl.children[1..] {
            match def.kind {
                NodeKind::VarDef => {
                    let name = def.children[0].name_str().to_string();
                    let var = self.module.new_var(Type::Int32, Some(&name));
                    if let Some(init) = def.child(1) {
                        let lowered = self.lower_expr(init, ExprCtx::Value)?;
                        let value = self.expect_value(init, &lowered)?;
                        code.extend(lowered.code);
                        self.emit_move(&mut code, var, value);
                    }
                }
                NodeKind::ArrayDef => {
                    let name = def.children[0].name_str().to_string();
                    let dims = self.collect_dims(&def.children[1])?;
                    self.module.new_var(Type::int_array(dims), Some(&name));
                }
                other => {
                    log::warn!(
                        "line {}: unsupported declarator node {:?}, skipped",
                        def.line,
                        other
                    );
                }
            }
        }

        Ok(Lowered { value: None, code })
    }

    // Module-scope declarations: initializers must fold to constants.
    pub(crate) fn lower_global_decl(&mut self, node: &AstNode) -> Result<()> {
        let var_decl = &node.children[0];

        for def in &var_decl.children[1..] {
            match def.kind {
                NodeKind::VarDef => {
                    let name = def.children[0].name_str().to_string();
                    let var = self.module.new_var(Type::Int32, Some(&name));
                    if let Some(init) = def.child(1) {
                        let lowered = self.lower_expr(init, ExprCtx::Value)?;
                        let value = self.expect_value(init, &lowered)?;
                        match self.module.const_value(value) {
                            Some(v) => self.module.set_global_init(var, v),
                            None => {
                                return Err(CompileError::SemanticError {
                                    line: init.line,
                                    reason: "Non-constant global initializer.".to_string(),
                                }
                                .into());
                            }
                        }
                    }
                }
                NodeKind::ArrayDef => {
                    let name = def.children[0].name_str().to_string();
                    let dims = self.collect_dims(&def.children[1])?;
                    self.module.new_var(Type::int_array(dims), Some(&name));
                }
                other => {
                    log::warn!(
                        "line {}: unsupported declarator node {:?}, skipped",
                        def.line,
                        other
                    );
                }
            }
        }

        Ok(())
    }

    // Assignment: rhs first, then the target. An array-access target is
    // lowered in Address context so the store replaces the load.
    pub(crate) fn lower_assign(&mut self, node: &AstNode) -> Result<Lowered> {
        let lhs_node = &node.children[0];
        let rhs_node = &node.children[1];

        let rhs = self.lower_expr(rhs_node, ExprCtx::Value)?;
        let rhs_value = self.expect_value(rhs_node, &rhs)?;
        let mut code = rhs.code;

        if lhs_node.kind == NodeKind::ArrayAccess {
            let lhs = self.lower_expr(lhs_node, ExprCtx::Address)?;
            let addr = self.expect_value(lhs_node, &lhs)?;
            code.extend(lhs.code);
            if self.module.type_of(addr).is_array() {
                return Err(CompileError::SemanticError {
                    line: lhs_node.line,
                    reason: "Cannot assign to a partially indexed array.".to_string(),
                }
                .into());
            }
            self.emit(
                &mut code,
                Inst::new(Op::StoreArray, vec![rhs_value, addr]),
                Type::Void,
            );
        } else {
            let name = lhs_node.name_str();
            let target = self.module.find_var(name).ok_or_else(|| {
                CompileError::SemanticError {
                    line: lhs_node.line,
                    reason: format!("Undefined symbol: {}", name),
                }
            })?;
            if self.module.type_of(target).is_array() {
                return Err(CompileError::SemanticError {
                    line: lhs_node.line,
                    reason: "Cannot assign to an array variable.".to_string(),
                }
                .into());
            }
            self.emit_move(&mut code, target, rhs_value);
        }

        Ok(Lowered { value: None, code })
    }

    // Return: move into the return slot (when one exists), then jump to
    // the shared exit label.
    pub(crate) fn lower_return(&mut self, node: &AstNode) -> Result<Lowered> {
        let mut code = Vec::new();

        if let Some(expr) = node.child(0) {
            let lowered = self.lower_expr(expr, ExprCtx::Value)?;
            let slot = self.module.cur_fn().return_slot;
            let value = if slot.is_some() {
                Some(self.expect_value(expr, &lowered)?)
            } else {
                None
            };
            code.extend(lowered.code);
            if let Some(slot) = slot {
                self.emit_move(&mut code, slot, value.unwrap());
            }
        }

        let exit_label = self
            .module
            .cur_fn()
            .exit_label
            .expect("function has an exit label");
        self.emit_goto(&mut code, exit_label);

        Ok(Lowered { value: None, code })
    }

    pub(crate) fn lower_if(&mut self, node: &AstNode) -> Result<Lowered> {
        let cond_node = &node.children[0];
        let cond = self.lower_expr(cond_node, ExprCtx::Cond)?;
        let cond_value = self.expect_value(cond_node, &cond)?;

        // Constant conditions keep only the live arm between fresh labels.
        if let Some(v) = self.module.const_value(cond_value) {
            let mut code = Vec::new();
            let arm = if v != 0 { node.child(1) } else { node.child(2) };
            if let Some(arm) = arm {
                let l_arm = self.module.new_label();
                let l_end = self.module.new_label();
                let lowered = self.lower_statement(arm)?;
                code.push(l_arm);
                code.extend(lowered.code);
                code.push(l_end);
            }
            return Ok(Lowered { value: None, code });
        }

        let l_then = self.module.new_label();
        let l_else = self.module.new_label();
        let l_end = self.module.new_label();

        let mut code = cond.code;
        let c = self.to_cond(&mut code, cond_value);
        self.emit_branch(&mut code, c, l_then, l_else);

        code.push(l_then);
        let then_arm = self.lower_statement(&node.children[1])?;
        code.extend(then_arm.code);
        self.emit_goto(&mut code, l_end);

        // the else label is emitted even without an else arm
        code.push(l_else);
        if let Some(else_node) = node.child(2) {
            let else_arm = self.lower_statement(else_node)?;
            code.extend(else_arm.code);
        }
        code.push(l_end);

        Ok(Lowered { value: None, code })
    }

    pub(crate) fn lower_while(&mut self, node: &AstNode) -> Result<Lowered> {
        let cond_node = &node.children[0];
        let body_node = &node.children[1];

        let l_cond = self.module.new_label();
        let l_body = self.module.new_label();
        let l_end = self.module.new_label();

        let cond = self.lower_expr(cond_node, ExprCtx::Cond)?;
        let cond_value = self.expect_value(cond_node, &cond)?;

        // Constant conditions: zero drops the loop, non-zero spins
        // without the test; break and continue still resolve.
        if let Some(v) = self.module.const_value(cond_value) {
            if v == 0 {
                return Ok(Lowered::empty());
            }
            let mut code = vec![l_cond, l_body];
            self.loop_stack.push(LoopLabels {
                cond: l_cond,
                end: l_end,
            });
            let body = self.lower_statement(body_node)?;
            self.loop_stack.pop();
            code.extend(body.code);
            self.emit_goto(&mut code, l_cond);
            code.push(l_end);
            return Ok(Lowered { value: None, code });
        }

        let mut code = vec![l_cond];
        code.extend(cond.code);
        let c = self.to_cond(&mut code, cond_value);
        self.emit_branch(&mut code, c, l_body, l_end);

        code.push(l_body);
        self.loop_stack.push(LoopLabels {
            cond: l_cond,
            end: l_end,
        });
        let body = self.lower_statement(body_node)?;
        self.loop_stack.pop();
        code.extend(body.code);
        self.emit_goto(&mut code, l_cond);
        code.push(l_end);

        Ok(Lowered { value: None, code })
    }

    pub(crate) fn lower_break(&mut self, node: &AstNode) -> Result<Lowered> {
        let labels = *self.loop_stack.last().ok_or_else(|| {
            CompileError::SemanticError {
                line: node.line,
                reason: "break outside of a loop.".to_string(),
            }
        })?;
        let mut code = Vec::new();
        self.emit_goto(&mut code, labels.end);
        Ok(Lowered { value: None, code })
    }

    pub(crate) fn lower_continue(&mut self, node: &AstNode) -> Result<Lowered> {
        let labels = *self.loop_stack.last().ok_or_else(|| {
            CompileError::SemanticError {
                line: node.line,
                reason: "continue outside of a loop.".to_string(),
            }
        })?;
        let mut code = Vec::new();
        self.emit_goto(&mut code, labels.cond);
        Ok(Lowered { value: None, code })
    }
}
