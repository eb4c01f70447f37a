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

mod ast_builder;

use crate::ast::{AstNode, NodeKind};
use crate::errors::CompileError;
use anyhow::Result;
use ast_builder::AstBuilder;
use pest::Parser;
use pest_derive::Parser;

// Derive the parser from our grammar file.
#[derive(Parser)]
#[grammar = "./grammar.pest"]
pub struct MiniCParser;

// Parse a whole MiniC translation unit into its syntax tree.
pub fn parse_source(source: &str) -> Result<AstNode> {
    let mut pairs =
        MiniCParser::parse(Rule::program, source).map_err(CompileError::PestError)?;
    let program = pairs.next().expect("grammar yields one program pair");

    let mut unit = AstNode::new(NodeKind::CompileUnit, 1);
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::func_def => unit.push(AstBuilder::new(pair).build_func_def()?),
            Rule::decl_stmt => unit.push(AstBuilder::new(pair).build_decl_stmt()?),
            Rule::EOI => {}
            _ => unreachable!("Unknown top-level rule: {:?}", pair.as_rule()),
        }
    }

    Ok(unit)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BasicType;

    fn parse_one(source: &str) -> AstNode {
        let unit = parse_source(source).unwrap();
        assert_eq!(unit.kind, NodeKind::CompileUnit);
        unit.children.into_iter().next().unwrap()
    }

    #[test]
    fn test_parse_empty_main() {
        let def = parse_one("int main() { }");
        assert_eq!(def.kind, NodeKind::FuncDef);
        assert_eq!(def.child(0).unwrap().basic_type, Some(BasicType::Int));
        assert_eq!(def.child(1).unwrap().name_str(), "main");
        assert_eq!(def.child(2).unwrap().kind, NodeKind::FuncFormalParams);
        assert_eq!(def.child(3).unwrap().kind, NodeKind::Block);
    }

    #[test]
    fn test_parse_global_decl() {
        let decl = parse_one("int g = 5;");
        assert_eq!(decl.kind, NodeKind::DeclStmt);
        let var_decl = decl.child(0).unwrap();
        assert_eq!(var_decl.kind, NodeKind::VarDecl);
        let def = var_decl.child(1).unwrap();
        assert_eq!(def.kind, NodeKind::VarDef);
        assert_eq!(def.child(0).unwrap().name_str(), "g");
        assert_eq!(def.child(1).unwrap().value, Some(5));
    }

    #[test]
    fn test_parse_array_decl() {
        let decl = parse_one("int a[3][4];");
        let def = decl.child(0).unwrap().child(1).unwrap();
        assert_eq!(def.kind, NodeKind::ArrayDef);
        let dims = def.child(1).unwrap();
        assert_eq!(dims.kind, NodeKind::ArrayDims);
        assert_eq!(dims.children.len(), 2);
        assert_eq!(dims.child(0).unwrap().value, Some(3));
        assert_eq!(dims.child(1).unwrap().value, Some(4));
    }

    #[test]
    fn test_parse_precedence() {
        // a + b * 3 parses as a + (b * 3)
        let def = parse_one("int f() { return a + b * 3; }");
        let ret = def.child(3).unwrap().child(0).unwrap();
        assert_eq!(ret.kind, NodeKind::Return);
        let add = ret.child(0).unwrap();
        assert_eq!(add.kind, NodeKind::Add);
        assert_eq!(add.child(1).unwrap().kind, NodeKind::Mul);
    }

    #[test]
    fn test_parse_short_circuit_and_not() {
        let def = parse_one("int f() { return !a && b || c; }");
        let ret = def.child(3).unwrap().child(0).unwrap();
        let or = ret.child(0).unwrap();
        assert_eq!(or.kind, NodeKind::Or);
        let and = or.child(0).unwrap();
        assert_eq!(and.kind, NodeKind::And);
        assert_eq!(and.child(0).unwrap().kind, NodeKind::Not);
    }

    #[test]
    fn test_parse_array_param_erases_leading_dim() {
        let def = parse_one("int sum(int b[][4], int n) { return 0; }");
        let params = def.child(2).unwrap();
        assert_eq!(params.children.len(), 2);
        let first = params.child(0).unwrap();
        assert_eq!(first.kind, NodeKind::FuncFormalParam);
        let dims = first.child(2).unwrap();
        assert_eq!(dims.kind, NodeKind::ArrayDims);
        // only the trailing dims survive; the leading dim is size-erased
        assert_eq!(dims.children.len(), 1);
        assert_eq!(dims.child(0).unwrap().value, Some(4));
        // scalar parameter carries no dims child
        assert_eq!(params.child(1).unwrap().children.len(), 2);
    }

    #[test]
    fn test_parse_keyword_prefixed_identifier() {
        let def = parse_one("int f() { int returned = 1; return returned; }");
        let block = def.child(3).unwrap();
        assert_eq!(block.child(0).unwrap().kind, NodeKind::DeclStmt);
        let ret = block.child(1).unwrap();
        assert_eq!(ret.kind, NodeKind::Return);
        assert_eq!(ret.child(0).unwrap().name_str(), "returned");
    }

    #[test]
    fn test_parse_hex_literal_and_comments() {
        let def = parse_one("int f() { /* block */ return 0x10; // line\n }");
        let ret = def.child(3).unwrap().child(0).unwrap();
        assert_eq!(ret.child(0).unwrap().value, Some(16));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_source("int main() { return ; ").is_err());
    }
}
