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

mod declaration;
mod expression;
mod function;
mod statement;
mod utility_functions;

use crate::ast::{AstNode, NodeKind};
use crate::errors::CompileError;
use crate::parser::Rule;
use anyhow::Result;
use pest::iterators::{Pair, Pairs};

pub use expression::build_expression;

pub struct AstBuilder<'a> {
    line: usize,
    rule: Rule,
    pairs: Pairs<'a, Rule>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(pair: Pair<'a, Rule>) -> Self {
        Self {
            line: pair.as_span().start_pos().line_col().0,
            rule: pair.as_rule(),
            pairs: pair.into_inner(),
        }
    }

    // Next inner pair, or a structural error naming what was expected.
    fn next_pair(&mut self, expected: &str) -> Result<Pair<'a, Rule>> {
        self.pairs.next().ok_or_else(|| {
            CompileError::StructuralError {
                line: self.line,
                reason: format!("Expected {}.", expected),
            }
            .into()
        })
    }
}

// Build one statement-position node from its concrete rule.
pub fn build_statement(pair: Pair<Rule>) -> Result<AstNode> {
    let rule = pair.as_rule();
    let builder = AstBuilder::new(pair);
    match rule {
        Rule::block => builder.build_block(),
        Rule::decl_stmt => builder.build_decl_stmt(),
        Rule::if_stmt => builder.build_if_stmt(),
        Rule::while_stmt => builder.build_while_stmt(),
        Rule::break_stmt => Ok(AstNode::new(NodeKind::Break, builder.line)),
        Rule::continue_stmt => Ok(AstNode::new(NodeKind::Continue, builder.line)),
        Rule::return_stmt => builder.build_return_stmt(),
        Rule::assign_stmt => builder.build_assign_stmt(),
        Rule::expr_stmt => builder.build_expr_stmt(),
        Rule::empty_stmt => Ok(AstNode::new(NodeKind::Block, builder.line)),
        _ => unreachable!("Unknown statement rule: {:?}", rule),
    }
}
