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

use crate::codegen::registers::Reg;
use crate::codegen::{Loc, Selector};
use crate::errors::CompileError;
use crate::ir::{Inst, ValueId};

impl<'a> Selector<'a> {
    // dst = src across the (register, memory) matrix. Memory-to-memory
    // goes through a scratch register, wide offsets through ip.
    pub(crate) fn select_move(&mut self, inst: &Inst) -> Result<(), CompileError> {
        let dst = self.loc_of(inst.operands[0])?;
        self.move_value(&dst, inst.operands[1])
    }

    pub(crate) fn move_value(&mut self, dst: &Loc, src: ValueId) -> Result<(), CompileError> {
        match dst {
            Loc::Reg(rd) => {
                if let Some(v) = self.module.const_value(src) {
                    self.emitter.load_imm(*rd, v);
                    return Ok(());
                }
                let rs = self.operand_reg(src)?;
                if rs != *rd {
                    self.emitter.inst("mov", &format!("{}, {}", rd, rs));
                }
                self.release_operand(src, rs);
            }
            _ => {
                let rs = self.operand_reg(src)?;
                self.emitter.store_var(rs, dst, Reg::Ip);
                self.release_operand(src, rs);
            }
        }
        Ok(())
    }

    pub(crate) fn select_load(&mut self, id: ValueId, inst: &Inst) -> Result<(), CompileError> {
        let raddr = self.operand_reg(inst.operands[0])?;
        let rd = self.def_reg(id)?;
        self.emitter.inst("ldr", &format!("{}, [{}]", rd, raddr));
        self.release_operand(inst.operands[0], raddr);
        Ok(())
    }

    pub(crate) fn select_store(&mut self, inst: &Inst) -> Result<(), CompileError> {
        let rv = self.operand_reg(inst.operands[0])?;
        let raddr = self.operand_reg(inst.operands[1])?;
        self.emitter.inst("str", &format!("{}, [{}]", rv, raddr));
        self.release_operand(inst.operands[0], rv);
        self.release_operand(inst.operands[1], raddr);
        Ok(())
    }

    // A slice costs nothing: the address register simply changes hands.
    pub(crate) fn select_slice(&mut self, id: ValueId, inst: &Inst) -> Result<(), CompileError> {
        let addr = inst.operands[0];
        if self.loc_of(addr).is_err() {
            // address not in a register yet (never the case for AddPtr
            // results, but keep the slice usable)
            let reg = self.operand_reg(addr)?;
            self.bindings.insert(id, reg);
            return Ok(());
        }
        self.transfer_binding(addr, id);
        Ok(())
    }
}
