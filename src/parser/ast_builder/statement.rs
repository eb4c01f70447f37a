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
use crate::parser::Rule;
use crate::parser::ast_builder::expression::{build_expression, build_variable_ref};
use crate::parser::ast_builder::{AstBuilder, build_statement};
use anyhow::{Context, Result};

impl<'a> AstBuilder<'a> {
    pub fn build_block(self) -> Result<AstNode> {
        let mut block = AstNode::new(NodeKind::Block, self.line);
        for item in self.pairs {
            block.push(build_statement(item)?);
        }
        Ok(block)
    }

    // children: condition, then-statement, optional else-statement
    pub fn build_if_stmt(mut self) -> Result<AstNode> {
        let line = self.line;
        let cond_pair = self.next_pair("an if condition")?;
        let cond = build_expression(cond_pair).context("Invalid if condition")?;
        let then_pair = self.next_pair("an if body")?;
        let then_stmt = build_statement(then_pair)?;

        let mut node = AstNode::with_children(NodeKind::If, line, vec![cond, then_stmt]);

        // a kw_else pair marks the optional else arm
        if self.pairs.next().is_some() {
            let else_pair = self.next_pair("an else body")?;
            node.push(build_statement(else_pair)?);
        }

        Ok(node)
    }

    pub fn build_while_stmt(mut self) -> Result<AstNode> {
        let line = self.line;
        let cond_pair = self.next_pair("a while condition")?;
        let cond = build_expression(cond_pair).context("Invalid while condition")?;
        let body_pair = self.next_pair("a while body")?;
        let body = build_statement(body_pair)?;
        Ok(AstNode::with_children(NodeKind::While, line, vec![cond, body]))
    }

    pub fn build_return_stmt(self) -> Result<AstNode> {
        let line = self.line;
        let mut node = AstNode::new(NodeKind::Return, line);
        for pair in self.pairs {
            if pair.as_rule() == Rule::expr {
                node.push(build_expression(pair).context("Invalid return expression")?);
            }
        }
        Ok(node)
    }

    pub fn build_assign_stmt(mut self) -> Result<AstNode> {
        let line = self.line;
        let lhs_pair = self.next_pair("an assignment target")?;
        let lhs = build_variable_ref(lhs_pair).context("Invalid assignment target")?;
        let rhs_pair = self.next_pair("an assignment value")?;
        let rhs = build_expression(rhs_pair).context("Invalid assignment value")?;
        Ok(AstNode::with_children(NodeKind::Assign, line, vec![lhs, rhs]))
    }

    // An expression in statement position is kept as its own node; the
    // lowering discards the value.
    pub fn build_expr_stmt(mut self) -> Result<AstNode> {
        let pair = self.next_pair("an expression")?;
        build_expression(pair)
    }
}
