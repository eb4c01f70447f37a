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

use crate::codegen::Selector;
use crate::errors::CompileError;
use crate::ir::{Inst, Op, ValueId};

impl<'a> Selector<'a> {
    // cmp, zero the destination, then a conditional move of 1.
    pub(crate) fn select_compare(&mut self, id: ValueId, inst: &Inst) -> Result<(), CompileError> {
        let cc = match inst.op {
            Op::CmpLt => "lt",
            Op::CmpGt => "gt",
            Op::CmpLe => "le",
            Op::CmpGe => "ge",
            Op::CmpEq => "eq",
            Op::CmpNe => "ne",
            _ => unreachable!("not a compare operator"),
        };

        let ra = self.operand_reg(inst.operands[0])?;
        let rb = self.operand_reg(inst.operands[1])?;
        self.emitter.inst("cmp", &format!("{}, {}", ra, rb));
        let rd = self.def_reg(id)?;
        self.emitter.inst("mov", &format!("{}, #0", rd));
        self.emitter
            .inst(&format!("mov{}", cc), &format!("{}, #1", rd));
        self.release_operand(inst.operands[0], ra);
        self.release_operand(inst.operands[1], rb);
        Ok(())
    }
}
