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

use serde::Serialize;

// Node kind tags for the MiniC syntax tree. The lowering driver dispatches
// on these; leaves carry a name or literal payload instead of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    CompileUnit,
    FuncDef,
    FuncFormalParams,
    FuncFormalParam,
    FuncCall,
    FuncRealParams,
    Block,
    DeclStmt,
    VarDecl,
    VarDef,
    ArrayDef,
    ArrayAccess,
    ArrayDims,
    Assign,
    Return,
    If,
    While,
    Break,
    Continue,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Not,
    LeafType,
    LeafVarId,
    LeafLiteralUint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BasicType {
    Int,
    Void,
}

// A single syntax-tree node: a kind tag, the source line it started on,
// children in syntactic order, and optional leaf payloads.
#[derive(Debug, Clone, Serialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub line: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_type: Option<BasicType>,
}

impl AstNode {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            line,
            children: Vec::new(),
            name: None,
            value: None,
            basic_type: None,
        }
    }

    pub fn with_children(kind: NodeKind, line: usize, children: Vec<AstNode>) -> Self {
        Self {
            children,
            ..Self::new(kind, line)
        }
    }

    pub fn leaf_var(line: usize, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(NodeKind::LeafVarId, line)
        }
    }

    pub fn leaf_literal(line: usize, value: i32) -> Self {
        Self {
            value: Some(value),
            ..Self::new(NodeKind::LeafLiteralUint, line)
        }
    }

    pub fn leaf_type(line: usize, basic_type: BasicType) -> Self {
        Self {
            basic_type: Some(basic_type),
            ..Self::new(NodeKind::LeafType, line)
        }
    }

    pub fn push(&mut self, child: AstNode) {
        self.children.push(child);
    }

    pub fn child(&self, index: usize) -> Option<&AstNode> {
        self.children.get(index)
    }

    // Leaf name, or "" for nodes that carry none.
    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
