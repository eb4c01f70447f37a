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

use crate::ast::BasicType;
use crate::errors::CompileError;
use crate::parser::Rule;
use anyhow::Result;
use pest::iterators::Pair;

pub fn line_of(pair: &Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

// translate a type pair to its basic type
pub fn pair_to_basic_type(pair: &Pair<Rule>) -> Result<BasicType> {
    match pair.as_rule() {
        Rule::int_type => Ok(BasicType::Int),
        Rule::void_type => Ok(BasicType::Void),
        _ => Err(CompileError::StructuralError {
            line: line_of(pair),
            reason: "Expected a type specifier (int or void).".to_string(),
        }
        .into()),
    }
}

// translate a literal pair to its value, decimal or 0x-prefixed hex
pub fn pair_to_int_literal(pair: &Pair<Rule>) -> Result<i32> {
    let line = line_of(pair);
    let text = pair.as_str();

    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        text.parse::<u32>()
    };

    let value = parsed.map_err(|_| CompileError::StructuralError {
        line,
        reason: format!("Invalid integer literal: {}", text),
    })?;

    Ok(value as i32)
}
