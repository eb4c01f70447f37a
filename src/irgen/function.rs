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

use crate::ast::{AstNode, BasicType};
use crate::errors::CompileError;
use crate::ir::{Inst, Op, Type, ValueId};
use crate::irgen::IrGen;
use anyhow::Result;
use log::debug;

impl<'a> IrGen<'a> {
    // Function definition: Entry, parameter copy-in, zeroed return slot,
    // body, shared exit label, Exit.
    pub(crate) fn lower_func_def(&mut self, node: &AstNode) -> Result<()> {
        if self.module.current.is_some() {
            return Err(CompileError::SemanticError {
                line: node.line,
                reason: "Nested function definitions are not allowed.".to_string(),
            }
            .into());
        }

        let return_type = match node.children[0].basic_type {
            Some(BasicType::Void) => Type::Void,
            _ => Type::Int32,
        };
        let name = node.children[1].name_str().to_string();
        debug!("lowering function {}", name);

        self.module.new_function(&name, return_type.clone());
        self.module.enter_scope();

        let mut body = Vec::new();
        let entry = self
            .module
            .new_inst(Inst::new(Op::Entry, vec![]), Type::Void);
        self.module.cur_fn().entry = Some(entry);
        body.push(entry);

        let exit_label = self.module.new_label();
        self.module.cur_fn().exit_label = Some(exit_label);

        self.lower_formal_params(&node.children[2], &mut body)?;

        if !return_type.is_void() {
            let slot = self.module.new_var(Type::Int32, None);
            self.module.cur_fn().return_slot = Some(slot);
            let zero = self.module.new_const_int(0);
            self.emit_move(&mut body, slot, zero);
        }

        let lowered = self.lower_statement(&node.children[3])?;
        body.extend(lowered.code);

        body.push(exit_label);
        let exit_operands = self.module.cur_fn().return_slot.into_iter().collect();
        let exit = self
            .module
            .new_inst(Inst::new(Op::Exit, exit_operands), Type::Void);
        body.push(exit);

        self.module.cur_fn().body = body;
        self.module.leave_scope();
        self.module.current = None;

        Ok(())
    }

    // Formals lower in two passes: first the parameter value holders (with
    // array promotion: leading dim 0, trailing dims from constant
    // expressions), then one same-named local per formal plus the copy-in
    // move, so the body may freely assign the name.
    fn lower_formal_params(
        &mut self,
        params: &AstNode,
        body: &mut Vec<ValueId>,
    ) -> Result<()> {
        let mut formals = Vec::with_capacity(params.children.len());
        for param in &params.children {
            let ty = match param.child(2) {
                Some(dims_node) => {
                    let mut dims = vec![0];
                    dims.extend(self.collect_dims(dims_node)?);
                    Type::int_array(dims)
                }
                None => Type::Int32,
            };
            let formal = self.module.new_param(ty);
            formals.push(formal);
        }

        for (param, &formal) in params.children.iter().zip(&formals) {
            let name = param.children[1].name_str().to_string();
            let ty = self.module.type_of(formal).clone();
            let local = self.module.new_var(ty, Some(&name));
            self.emit_move(body, local, formal);
        }

        Ok(())
    }
}
