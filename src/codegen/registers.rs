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

use std::collections::BTreeSet;
use std::fmt;

use crate::errors::CompileError;

// The ARM32 integer register file. r0..r10 are allocatable; fp, ip, sp,
// lr, pc are reserved (ip serves as the wide-offset scratch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    Fp,
    Ip,
    Sp,
    Lr,
    Pc,
}

impl Reg {
    pub const ARG_REGS: [Reg; 4] = [Reg::R0, Reg::R1, Reg::R2, Reg::R3];

    // Allocation order: keep ordinary temps clear of the argument
    // registers so call setup rarely finds them occupied.
    const ALLOC_ORDER: [Reg; 11] = [
        Reg::R4,
        Reg::R5,
        Reg::R6,
        Reg::R7,
        Reg::R8,
        Reg::R9,
        Reg::R10,
        Reg::R0,
        Reg::R1,
        Reg::R2,
        Reg::R3,
    ];

    fn index(self) -> Option<usize> {
        let index = match self {
            Reg::R0 => 0,
            Reg::R1 => 1,
            Reg::R2 => 2,
            Reg::R3 => 3,
            Reg::R4 => 4,
            Reg::R5 => 5,
            Reg::R6 => 6,
            Reg::R7 => 7,
            Reg::R8 => 8,
            Reg::R9 => 9,
            Reg::R10 => 10,
            _ => return None,
        };
        Some(index)
    }

    pub fn is_callee_saved(self) -> bool {
        matches!(
            self,
            Reg::R4 | Reg::R5 | Reg::R6 | Reg::R7 | Reg::R8 | Reg::R9 | Reg::R10
        )
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg::R0 => "r0",
            Reg::R1 => "r1",
            Reg::R2 => "r2",
            Reg::R3 => "r3",
            Reg::R4 => "r4",
            Reg::R5 => "r5",
            Reg::R6 => "r6",
            Reg::R7 => "r7",
            Reg::R8 => "r8",
            Reg::R9 => "r9",
            Reg::R10 => "r10",
            Reg::Fp => "fp",
            Reg::Ip => "ip",
            Reg::Sp => "sp",
            Reg::Lr => "lr",
            Reg::Pc => "pc",
        };
        f.write_str(name)
    }
}

// On-demand allocator over the fixed register file. There is no
// spilling: exhaustion is a hard back-end error. The used set records
// every register ever handed out so the prologue knows what to save.
#[derive(Debug, Default)]
pub struct RegisterFile {
    busy: [bool; 11],
    used: BTreeSet<Reg>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Result<Reg, CompileError> {
        for reg in Reg::ALLOC_ORDER {
            let index = reg.index().expect("allocation order holds file registers");
            if !self.busy[index] {
                self.busy[index] = true;
                self.used.insert(reg);
                return Ok(reg);
            }
        }
        Err(CompileError::CodegenError {
            context: "register allocator".to_string(),
            reason: "no free register; spilling is not supported".to_string(),
        })
    }

    // Force-acquire a specific register (argument setup around calls).
    pub fn allocate_reg(&mut self, reg: Reg) -> Result<(), CompileError> {
        let index = reg.index().ok_or_else(|| CompileError::CodegenError {
            context: "register allocator".to_string(),
            reason: format!("{} is reserved and cannot be allocated", reg),
        })?;
        if self.busy[index] {
            return Err(CompileError::CodegenError {
                context: "register allocator".to_string(),
                reason: format!("{} is already occupied", reg),
            });
        }
        self.busy[index] = true;
        self.used.insert(reg);
        Ok(())
    }

    pub fn free(&mut self, reg: Reg) {
        if let Some(index) = reg.index() {
            self.busy[index] = false;
        }
    }

    pub fn is_busy(&self, reg: Reg) -> bool {
        reg.index().map(|i| self.busy[i]).unwrap_or(false)
    }

    // Callee-saved registers that were handed out at least once.
    pub fn saved_in_use(&self) -> Vec<Reg> {
        self.used
            .iter()
            .copied()
            .filter(|r| r.is_callee_saved())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_prefers_callee_saved() {
        let mut regs = RegisterFile::new();
        assert_eq!(regs.allocate().unwrap(), Reg::R4);
        assert_eq!(regs.allocate().unwrap(), Reg::R5);
    }

    #[test]
    fn test_allocate_exhaustion_is_an_error() {
        let mut regs = RegisterFile::new();
        for _ in 0..11 {
            regs.allocate().unwrap();
        }
        assert!(regs.allocate().is_err());
    }

    #[test]
    fn test_force_allocate_and_free() {
        let mut regs = RegisterFile::new();
        regs.allocate_reg(Reg::R0).unwrap();
        assert!(regs.allocate_reg(Reg::R0).is_err());
        regs.free(Reg::R0);
        regs.allocate_reg(Reg::R0).unwrap();
    }

    #[test]
    fn test_saved_in_use_tracks_high_water() {
        let mut regs = RegisterFile::new();
        let r = regs.allocate().unwrap();
        regs.free(r);
        regs.allocate_reg(Reg::R1).unwrap();
        assert_eq!(regs.saved_in_use(), vec![Reg::R4]);
    }
}
