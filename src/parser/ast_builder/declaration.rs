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
use crate::parser::Rule;
use crate::parser::ast_builder::AstBuilder;
use crate::parser::ast_builder::expression::build_expression;
use crate::parser::ast_builder::utility_functions::*;
use anyhow::{Context, Result};
use pest::iterators::Pair;

impl<'a> AstBuilder<'a> {
    // DeclStmt -> VarDecl -> [LeafType, (VarDef | ArrayDef)+]
    pub fn build_decl_stmt(mut self) -> Result<AstNode> {
        let line = self.line;
        let type_pair = self.next_pair("a type specifier")?;
        let basic_type = pair_to_basic_type(&type_pair)?;

        let mut var_decl = AstNode::new(NodeKind::VarDecl, line);
        var_decl.push(AstNode::leaf_type(line, basic_type));
        for def_pair in self.pairs {
            var_decl.push(build_var_def(def_pair)?);
        }

        Ok(AstNode::with_children(
            NodeKind::DeclStmt,
            line,
            vec![var_decl],
        ))
    }
}

// One declarator: `x`, `x = init`, or `a[d1][d2]...`.
fn build_var_def(pair: Pair<Rule>) -> Result<AstNode> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("declarator has a name");

    let dims_pair = inner.next().expect("declarator has a dims list");
    let mut dims = AstNode::new(NodeKind::ArrayDims, line);
    for index in dims_pair.into_inner() {
        let expr = index.into_inner().next().ok_or_else(|| {
            CompileError::StructuralError {
                line,
                reason: "Empty array dimension in a declaration.".to_string(),
            }
        })?;
        dims.push(build_expression(expr)?);
    }

    let init = match inner.next() {
        Some(expr) => Some(build_expression(expr).context("Invalid initializer")?),
        None => None,
    };

    if dims.children.is_empty() {
        let mut def = AstNode::new(NodeKind::VarDef, line);
        def.push(AstNode::leaf_var(line, name.as_str()));
        if let Some(init) = init {
            def.push(init);
        }
        return Ok(def);
    }

    if init.is_some() {
        return Err(CompileError::StructuralError {
            line,
            reason: "Array initializers are not supported.".to_string(),
        }
        .into());
    }

    Ok(AstNode::with_children(
        NodeKind::ArrayDef,
        line,
        vec![AstNode::leaf_var(line, name.as_str()), dims],
    ))
}
