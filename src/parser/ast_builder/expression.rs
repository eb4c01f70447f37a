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
use crate::parser::ast_builder::utility_functions::*;
use anyhow::Result;
use pest::iterators::Pair;

// Build an expression node from any expression-position pair. The
// precedence ladder rules wrap single children when no operator at their
// level is present; those wrappers unwrap transparently.
pub fn build_expression(pair: Pair<Rule>) -> Result<AstNode> {
    match pair.as_rule() {
        Rule::expr => {
            let inner = single_inner(pair)?;
            build_expression(inner)
        }
        Rule::lor_expr
        | Rule::land_expr
        | Rule::eq_expr
        | Rule::rel_expr
        | Rule::add_expr
        | Rule::mul_expr => fold_binary_chain(pair),
        Rule::unary_expr => build_unary(pair),
        Rule::func_call => build_func_call(pair),
        Rule::array_access | Rule::lval => build_variable_ref(pair),
        Rule::identifier => Ok(AstNode::leaf_var(line_of(&pair), pair.as_str())),
        Rule::int_literal => {
            Ok(AstNode::leaf_literal(line_of(&pair), pair_to_int_literal(&pair)?))
        }
        _ => unreachable!("Unknown expression rule: {:?}", pair.as_rule()),
    }
}

fn single_inner(pair: Pair<Rule>) -> Result<Pair<Rule>> {
    let line = line_of(&pair);
    pair.into_inner().next().ok_or_else(|| {
        CompileError::StructuralError {
            line,
            reason: "Expected an inner expression.".to_string(),
        }
        .into()
    })
}

// Left-associative fold over `operand (op operand)*`.
fn fold_binary_chain(pair: Pair<Rule>) -> Result<AstNode> {
    let mut inner = pair.into_inner();
    let first = inner.next().expect("chain has at least one operand");
    let mut node = build_expression(first)?;

    while let Some(op_pair) = inner.next() {
        let line = line_of(&op_pair);
        let kind = binary_kind(&op_pair)?;
        let rhs_pair = inner.next().ok_or_else(|| CompileError::StructuralError {
            line,
            reason: "Binary operator without a right operand.".to_string(),
        })?;
        let rhs = build_expression(rhs_pair)?;
        node = AstNode::with_children(kind, line, vec![node, rhs]);
    }

    Ok(node)
}

fn binary_kind(op_pair: &Pair<Rule>) -> Result<NodeKind> {
    let kind = match op_pair.as_str() {
        "||" => NodeKind::Or,
        "&&" => NodeKind::And,
        "==" => NodeKind::Eq,
        "!=" => NodeKind::Ne,
        "<=" => NodeKind::Le,
        ">=" => NodeKind::Ge,
        "<" => NodeKind::Lt,
        ">" => NodeKind::Gt,
        "+" => NodeKind::Add,
        "-" => NodeKind::Sub,
        "*" => NodeKind::Mul,
        "/" => NodeKind::Div,
        "%" => NodeKind::Mod,
        other => {
            return Err(CompileError::StructuralError {
                line: line_of(op_pair),
                reason: format!("Unknown binary operator: {}", other),
            }
            .into());
        }
    };
    Ok(kind)
}

// Prefix operators apply innermost-first; unary plus is a no-op.
fn build_unary(pair: Pair<Rule>) -> Result<AstNode> {
    let mut ops = Vec::new();
    let mut operand = None;

    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::unary_op {
            ops.push((line_of(&inner), inner.as_str().to_string()));
        } else {
            operand = Some(build_expression(inner)?);
        }
    }

    let mut node = operand.expect("unary chain has an operand");
    for (line, op) in ops.into_iter().rev() {
        node = match op.as_str() {
            "-" => AstNode::with_children(NodeKind::Neg, line, vec![node]),
            "!" => AstNode::with_children(NodeKind::Not, line, vec![node]),
            _ => node,
        };
    }

    Ok(node)
}

fn build_func_call(pair: Pair<Rule>) -> Result<AstNode> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("call has a callee identifier");

    let mut args = AstNode::new(NodeKind::FuncRealParams, line);
    if let Some(params) = inner.next() {
        for arg in params.into_inner() {
            args.push(build_expression(arg)?);
        }
    }

    Ok(AstNode::with_children(
        NodeKind::FuncCall,
        line,
        vec![AstNode::leaf_var(line, name.as_str()), args],
    ))
}

// An identifier with zero or more indices: a bare variable reference or
// an ArrayAccess whose ArrayDims child holds the index expressions.
pub fn build_variable_ref(pair: Pair<Rule>) -> Result<AstNode> {
    let line = line_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("variable reference has a name");

    let mut dims = AstNode::new(NodeKind::ArrayDims, line);
    for index in inner {
        let expr = index.into_inner().next().ok_or_else(|| {
            CompileError::StructuralError {
                line,
                reason: "Empty array index.".to_string(),
            }
        })?;
        dims.push(build_expression(expr)?);
    }

    if dims.children.is_empty() {
        return Ok(AstNode::leaf_var(line, name.as_str()));
    }

    Ok(AstNode::with_children(
        NodeKind::ArrayAccess,
        line,
        vec![AstNode::leaf_var(line, name.as_str()), dims],
    ))
}
