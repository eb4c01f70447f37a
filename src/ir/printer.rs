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

use crate::ir::module::Module;
use crate::ir::types::Type;
use crate::ir::value::{Op, ValueId};

// Linear IR text rendering, one instruction per line. Labels and entry
// markers sit flush left, everything else is indented.

pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    for &global in &module.globals {
        out.push_str(&declare_line(module, global));
        out.push('\n');
    }
    for (index, function) in module.functions.iter().enumerate() {
        if index > 0 || !module.globals.is_empty() {
            out.push('\n');
        }
        out.push_str(&print_function(module, index));
    }
    out
}

pub fn print_function(module: &Module, index: usize) -> String {
    let function = &module.functions[index];
    let params = function
        .params
        .iter()
        .map(|&p| typed_name(module, p))
        .collect::<Vec<_>>()
        .join(", ");
    let mut out = format!(
        "define {} @{}({}) {{\n",
        function.return_type, function.name, params
    );
    for &local in &function.locals {
        out.push_str("\tdeclare ");
        out.push_str(&typed_name(module, local));
        out.push('\n');
    }
    for &inst in &function.body {
        if let Some(line) = render_inst(module, inst) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out.push_str("}\n");
    out
}

// One rendered body line, or None for zero-cost pseudo-ops.
pub fn render_inst(module: &Module, id: ValueId) -> Option<String> {
    let data = module.value(id);
    let inst = data.as_inst()?;
    let name = |id: ValueId| module.name_of(id).to_string();
    let line = match inst.op {
        Op::Entry => "entry:".to_string(),
        Op::Exit => match inst.operands.first() {
            Some(&ret) => format!("\texit {}", name(ret)),
            None => "\texit".to_string(),
        },
        Op::Label => format!("{}:", data.name),
        Op::Goto => format!("\tbr label {}", name(inst.targets[0])),
        Op::Branch => format!(
            "\tbc {}, label {}, label {}",
            name(inst.operands[0]),
            name(inst.targets[0]),
            name(inst.targets[1])
        ),
        Op::Move => format!("\t{} = {}", name(inst.operands[0]), name(inst.operands[1])),
        Op::Arg => format!("\targ {}", name(inst.operands[0])),
        Op::Call => {
            let callee = inst.callee.as_deref().unwrap_or("");
            let args = inst
                .operands
                .iter()
                .map(|&a| name(a))
                .collect::<Vec<_>>()
                .join(", ");
            if data.ty.is_void() {
                format!("\tcall void @{}({})", callee, args)
            } else {
                format!("\t{} = call {} @{}({})", data.name, data.ty, callee, args)
            }
        }
        Op::LoadArray => format!("\t{} = *{}", data.name, name(inst.operands[0])),
        Op::StoreArray => format!(
            "\t*{} = {}",
            name(inst.operands[1]),
            name(inst.operands[0])
        ),
        Op::Slice => return None,
        _ => format!(
            "\t{} = {} {}, {}",
            data.name,
            inst.op.mnemonic(),
            name(inst.operands[0]),
            name(inst.operands[1])
        ),
    };
    Some(line)
}

fn declare_line(module: &Module, id: ValueId) -> String {
    let init = match module.value(id).kind {
        crate::ir::value::ValueKind::Global { init: Some(v) } if v != 0 => {
            format!(" = #{}", v)
        }
        _ => String::new(),
    };
    format!("declare {}{}", typed_name(module, id), init)
}

// `i32 %l0`, `i32 @g`, `i32 %l1[3][4]` — arrays show the element type
// followed by the name and declared dims.
fn typed_name(module: &Module, id: ValueId) -> String {
    let data = module.value(id);
    match &data.ty {
        Type::Array { elem, dims } => {
            let suffix = dims
                .iter()
                .map(|d| format!("[{}]", d))
                .collect::<String>();
            format!("{} {}{}", elem, data.name, suffix)
        }
        ty => format!("{} {}", ty, data.name),
    }
}
