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
use crate::parser::ast_builder::AstBuilder;
use crate::parser::ast_builder::expression::build_expression;
use crate::parser::ast_builder::utility_functions::*;
use anyhow::Result;
use pest::iterators::Pair;

impl<'a> AstBuilder<'a> {
    // FuncDef -> [LeafType, LeafVarId, FuncFormalParams, Block]
    pub fn build_func_def(mut self) -> Result<AstNode> {
        let line = self.line;
        let type_pair = self.next_pair("a return type")?;
        let basic_type = pair_to_basic_type(&type_pair)?;
        let name = self.next_pair("a function name")?;

        let mut params = AstNode::new(NodeKind::FuncFormalParams, line);
        let mut body = None;
        for pair in self.pairs {
            match pair.as_rule() {
                Rule::formal_params => {
                    for param in pair.into_inner() {
                        params.push(build_formal_param(param)?);
                    }
                }
                Rule::block => {
                    body = Some(AstBuilder::new(pair).build_block()?);
                }
                _ => unreachable!("Unknown func_def part: {:?}", pair.as_rule()),
            }
        }

        Ok(AstNode::with_children(
            NodeKind::FuncDef,
            line,
            vec![
                AstNode::leaf_type(line, basic_type),
                AstNode::leaf_var(line, name.as_str()),
                params,
                body.expect("grammar guarantees a function body"),
            ],
        ))
    }
}

// FuncFormalParam -> [LeafType, LeafVarId] for scalars, plus an ArrayDims
// child for array parameters. The dims child holds only the trailing
// dimensions: the leading one is size-erased whether written or not.
fn build_formal_param(pair: Pair<Rule>) -> Result<AstNode> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let type_pair = inner.next().expect("parameter has a type");
    let basic_type = pair_to_basic_type(&type_pair)?;
    let name = inner.next().expect("parameter has a name");

    let mut param = AstNode::new(NodeKind::FuncFormalParam, line);
    param.push(AstNode::leaf_type(line, basic_type));
    param.push(AstNode::leaf_var(line, name.as_str()));

    if let Some(dims_pair) = inner.next() {
        let mut dims = AstNode::new(NodeKind::ArrayDims, line);
        for part in dims_pair.into_inner() {
            match part.as_rule() {
                // a written leading dimension is dropped: parameters decay
                Rule::expr => {}
                Rule::index => {
                    let expr = part
                        .into_inner()
                        .next()
                        .expect("index holds one expression");
                    dims.push(build_expression(expr)?);
                }
                _ => unreachable!("Unknown param dims part: {:?}", part.as_rule()),
            }
        }
        param.push(dims);
    }

    Ok(param)
}
