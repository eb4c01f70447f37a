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

pub mod ast;
pub mod codegen;
pub mod errors;
pub mod ir;
pub mod irgen;
pub mod parser;

use anyhow::{Context, Result};

// Parse MiniC source into its syntax tree.
pub fn parse_to_ast(source: &str) -> Result<ast::AstNode> {
    parser::parse_source(source).context("Failed during parsing stage")
}

// Parse and lower into the linear IR module.
pub fn build_ir(source: &str) -> Result<ir::Module> {
    let unit = parse_to_ast(source)?;
    irgen::build_module(&unit).context("Failed during IR lowering stage")
}

pub fn compile_to_ast_dump(source: &str) -> Result<String> {
    let unit = parse_to_ast(source)?;
    serde_json::to_string_pretty(&unit).context("Failed to serialize the syntax tree")
}

pub fn compile_to_ir(source: &str) -> Result<String> {
    let module = build_ir(source)?;
    Ok(ir::printer::print_module(&module))
}

pub fn compile_to_asm(source: &str, show_linear_ir: bool) -> Result<String> {
    let mut module = build_ir(source)?;
    codegen::generate_assembly(&mut module, show_linear_ir)
        .context("Failed during instruction selection stage")
}
