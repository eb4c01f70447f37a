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

use crate::codegen::{Loc, Selector};
use crate::codegen::registers::Reg;
use crate::errors::CompileError;
use crate::ir::{Inst, ValueId};

impl<'a> Selector<'a> {
    // Arg instructions only queue their value; all movement happens at
    // the call so the argument registers stay free in between. The first
    // four arguments go through r0..r3, the rest into the outgoing area
    // at [sp, #4(k-4)], each via the common move path. The result comes
    // back out of r0.
    pub(crate) fn select_call(&mut self, id: ValueId, inst: &Inst) -> Result<(), CompileError> {
        let args = std::mem::take(&mut self.pending_args);
        let callee = inst
            .callee
            .clone()
            .ok_or_else(|| self.err("call without a callee"))?;

        for reg in Reg::ARG_REGS {
            if self.regs.is_busy(reg) {
                return Err(self.err(format!(
                    "argument register {} is already occupied before the call to {}",
                    reg, callee
                )));
            }
            self.regs.allocate_reg(reg)?;
        }

        for (k, &arg) in args.iter().enumerate() {
            if k < 4 {
                self.move_value(&Loc::Reg(Reg::ARG_REGS[k]), arg)?;
            } else {
                let offset = 4 * (k as i32 - 4);
                if offset + 4 > self.frame.outgoing_bytes {
                    return Err(self.err(format!(
                        "stack argument {} of {} falls outside the outgoing area",
                        k, callee
                    )));
                }
                let slot = self.module.new_stack_arg(offset);
                let loc = self.loc_of(slot)?;
                self.move_value(&loc, arg)?;
            }
        }

        self.emitter.call_fun(&callee);

        if !self.module.type_of(id).is_void() {
            let rd = self.def_reg(id)?;
            self.emitter.inst("mov", &format!("{}, r0", rd));
        }

        for reg in Reg::ARG_REGS {
            self.regs.free(reg);
        }
        Ok(())
    }
}
