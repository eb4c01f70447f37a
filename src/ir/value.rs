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

use crate::ir::types::Type;

// Handle into the module's value arena. Operand references go through
// ids, never owned subtrees, so the operand relation stays a DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

// IR operators. `Goto` has one label target; `Branch` is the conditional
// form with one i1 operand and true/false targets. `AddPtr` is the
// pointer-typed address add used by array accesses. `Slice` is the
// zero-cost partial-access pseudo-op: it aliases its address operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Entry,
    Exit,
    Label,
    Goto,
    Branch,
    Move,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    AddPtr,
    CmpLt,
    CmpGt,
    CmpLe,
    CmpGe,
    CmpEq,
    CmpNe,
    Arg,
    Call,
    LoadArray,
    StoreArray,
    Slice,
}

impl Op {
    pub fn is_compare(&self) -> bool {
        matches!(
            self,
            Op::CmpLt | Op::CmpGt | Op::CmpLe | Op::CmpGe | Op::CmpEq | Op::CmpNe
        )
    }

    pub fn is_binary_arith(&self) -> bool {
        matches!(self, Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Mod)
    }

    // Mnemonic used by the IR text rendering.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Mod => "mod",
            Op::AddPtr => "ptradd",
            Op::CmpLt => "icmp_lt",
            Op::CmpGt => "icmp_gt",
            Op::CmpLe => "icmp_le",
            Op::CmpGe => "icmp_ge",
            Op::CmpEq => "icmp_eq",
            Op::CmpNe => "icmp_ne",
            _ => "",
        }
    }
}

// A defining occurrence in a function body. Operands and branch targets
// are arena ids; `callee` names the called function for `Op::Call`.
// The `dead` bit marks instructions the selector must skip.
#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub op: Op,
    pub operands: Vec<ValueId>,
    pub targets: Vec<ValueId>,
    pub callee: Option<String>,
    pub dead: bool,
}

impl Inst {
    pub fn new(op: Op, operands: Vec<ValueId>) -> Self {
        Self {
            op,
            operands,
            targets: Vec::new(),
            callee: None,
            dead: false,
        }
    }

    pub fn with_targets(op: Op, operands: Vec<ValueId>, targets: Vec<ValueId>) -> Self {
        Self {
            targets,
            ..Self::new(op, operands)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    // Interned per module, printed `#v`, never mutated.
    ConstInt(i32),
    // Stack-resident named or synthetic local.
    Local,
    // Module-level variable; zero or absent initializer lands in BSS.
    Global { init: Option<i32> },
    // Formal parameter value holder before copy-in.
    Param,
    // sp-relative slot for a stack-passed call argument.
    StackArg { offset: i32 },
    Inst(Inst),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueData {
    pub kind: ValueKind,
    pub ty: Type,
    pub name: String,
}

impl ValueData {
    pub fn as_inst(&self) -> Option<&Inst> {
        match &self.kind {
            ValueKind::Inst(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn const_value(&self) -> Option<i32> {
        match &self.kind {
            ValueKind::ConstInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(&self.kind, ValueKind::Inst(inst) if inst.op == Op::Label)
    }
}
