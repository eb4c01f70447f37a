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
use crate::codegen::registers::Reg;
use crate::errors::CompileError;
use crate::ir::{Inst, Op, ValueId};

impl<'a> Selector<'a> {
    // Integer binaries: both operands and the destination live in
    // registers; operand registers free immediately after the emit.
    pub(crate) fn select_binary(&mut self, id: ValueId, inst: &Inst) -> Result<(), CompileError> {
        let ra = self.operand_reg(inst.operands[0])?;
        let rb = self.operand_reg(inst.operands[1])?;

        if inst.op == Op::Mod {
            return self.select_mod(id, inst, ra, rb);
        }

        let mnemonic = match inst.op {
            Op::Add | Op::AddPtr => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "sdiv",
            _ => unreachable!("not a binary operator"),
        };

        let rd = self.def_reg(id)?;
        self.emitter
            .inst(mnemonic, &format!("{}, {}, {}", rd, ra, rb));
        self.release_operand(inst.operands[0], ra);
        self.release_operand(inst.operands[1], rb);
        Ok(())
    }

    // No hardware remainder: q = a sdiv b, m = q * b, r = a - m.
    fn select_mod(
        &mut self,
        id: ValueId,
        inst: &Inst,
        ra: Reg,
        rb: Reg,
    ) -> Result<(), CompileError> {
        let rq = self.regs.allocate()?;
        let rm = self.regs.allocate()?;
        self.emitter.inst("sdiv", &format!("{}, {}, {}", rq, ra, rb));
        self.emitter.inst("mul", &format!("{}, {}, {}", rm, rq, rb));
        let rd = self.def_reg(id)?;
        self.emitter.inst("sub", &format!("{}, {}, {}", rd, ra, rm));
        self.regs.free(rq);
        self.regs.free(rm);
        self.release_operand(inst.operands[0], ra);
        self.release_operand(inst.operands[1], rb);
        Ok(())
    }
}
