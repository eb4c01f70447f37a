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
use crate::ir::Inst;

impl<'a> Selector<'a> {
    // Conditional branch: test the condition register against zero. The
    // true target is taken on bne; block order is not rearranged for
    // fall-through.
    pub(crate) fn select_branch(&mut self, inst: &Inst) -> Result<(), CompileError> {
        let rc = self.operand_reg(inst.operands[0])?;
        self.emitter.inst("cmp", &format!("{}, #0", rc));
        let if_true = self.local_label(inst.targets[0]);
        let if_false = self.local_label(inst.targets[1]);
        self.emitter.inst("bne", &if_true);
        self.emitter.jump(&if_false);
        self.release_operand(inst.operands[0], rc);
        Ok(())
    }

    // Epilogue. The callee-saved set is final here: Exit is the last
    // instruction of the body, so it matches the prologue exactly.
    pub(crate) fn select_exit(&mut self, inst: &Inst) -> Result<(), CompileError> {
        if let Some(&ret) = inst.operands.first() {
            let loc = self.loc_of(ret)?;
            self.emitter.load_var(Reg::R0, &loc, Reg::Ip);
        }

        self.emitter.inst("mov", "sp, fp");
        let mut pop_list: Vec<String> = self
            .regs
            .saved_in_use()
            .iter()
            .map(|r| r.to_string())
            .collect();
        pop_list.push(Reg::Fp.to_string());
        pop_list.push(Reg::Lr.to_string());
        self.emitter
            .inst("pop", &format!("{{{}}}", pop_list.join(", ")));
        self.emitter.inst("bx", "lr");
        Ok(())
    }
}
