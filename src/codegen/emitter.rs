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

use crate::codegen::Loc;
use crate::codegen::registers::Reg;

// ARM immediate operands outside this range go through a literal pool.
const MAX_MOV_IMM: i32 = 255;
// ldr/str immediate offset limit.
const MAX_MEM_OFFSET: i32 = 4095;

// Owns the output text. Pure shaping: every addressing decision here is
// a choice between equivalent encodings, never between semantics.
#[derive(Debug, Default)]
pub struct Emitter {
    out: String,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn raw(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    pub fn label(&mut self, name: &str) {
        self.raw(&format!("{}:", name));
    }

    pub fn inst(&mut self, op: &str, operands: &str) {
        if operands.is_empty() {
            self.raw(&format!("\t{}", op));
        } else {
            self.raw(&format!("\t{} {}", op, operands));
        }
    }

    pub fn comment(&mut self, text: &str) {
        self.raw(&format!("\t@ {}", text));
    }

    pub fn jump(&mut self, target: &str) {
        self.inst("b", target);
    }

    pub fn nop(&mut self) {
        self.inst("nop", "");
    }

    pub fn call_fun(&mut self, name: &str) {
        self.inst("bl", name);
    }

    // Materialize a constant: short immediates use mov/mvn, the rest a
    // literal-pool load.
    pub fn load_imm(&mut self, rd: Reg, value: i32) {
        if (0..=MAX_MOV_IMM).contains(&value) {
            self.inst("mov", &format!("{}, #{}", rd, value));
        } else if (-MAX_MOV_IMM - 1..0).contains(&value) {
            self.inst("mvn", &format!("{}, #{}", rd, -value - 1));
        } else {
            self.inst("ldr", &format!("{}, ={}", rd, value));
        }
    }

    // rd = address fp - offset (array base inside the frame).
    pub fn frame_addr(&mut self, rd: Reg, offset: i32) {
        if (0..=MAX_MOV_IMM).contains(&offset) {
            self.inst("sub", &format!("{}, fp, #{}", rd, offset));
        } else {
            self.load_imm(rd, offset);
            self.inst("sub", &format!("{}, fp, {}", rd, rd));
        }
    }

    pub fn load_var(&mut self, rd: Reg, loc: &Loc, tmp: Reg) {
        match loc {
            Loc::Reg(rs) => {
                if *rs != rd {
                    self.inst("mov", &format!("{}, {}", rd, rs));
                }
            }
            Loc::Imm(v) => self.load_imm(rd, *v),
            Loc::Frame(offset) => {
                if *offset <= MAX_MEM_OFFSET {
                    self.inst("ldr", &format!("{}, [fp, #-{}]", rd, offset));
                } else {
                    self.load_imm(tmp, *offset);
                    self.inst("sub", &format!("{}, fp, {}", tmp, tmp));
                    self.inst("ldr", &format!("{}, [{}]", rd, tmp));
                }
            }
            Loc::Stack(offset) => {
                self.inst("ldr", &format!("{}, [sp, #{}]", rd, offset));
            }
            Loc::Global(name) => {
                self.inst("ldr", &format!("{}, ={}", rd, name));
                self.inst("ldr", &format!("{}, [{}]", rd, rd));
            }
        }
    }

    pub fn store_var(&mut self, rs: Reg, loc: &Loc, tmp: Reg) {
        match loc {
            Loc::Reg(rd) => {
                if *rd != rs {
                    self.inst("mov", &format!("{}, {}", rd, rs));
                }
            }
            Loc::Frame(offset) => {
                if *offset <= MAX_MEM_OFFSET {
                    self.inst("str", &format!("{}, [fp, #-{}]", rs, offset));
                } else {
                    self.load_imm(tmp, *offset);
                    self.inst("sub", &format!("{}, fp, {}", tmp, tmp));
                    self.inst("str", &format!("{}, [{}]", rs, tmp));
                }
            }
            Loc::Stack(offset) => {
                self.inst("str", &format!("{}, [sp, #{}]", rs, offset));
            }
            Loc::Global(name) => {
                self.inst("ldr", &format!("{}, ={}", tmp, name));
                self.inst("str", &format!("{}, [{}]", rs, tmp));
            }
            Loc::Imm(_) => {
                debug_assert!(false, "store to an immediate location");
            }
        }
    }

    // Reserve the frame: locals plus the outgoing argument area.
    pub fn alloc_stack(&mut self, bytes: i32, tmp: Reg) {
        if bytes == 0 {
            return;
        }
        if bytes <= MAX_MOV_IMM {
            self.inst("sub", &format!("sp, sp, #{}", bytes));
        } else {
            self.load_imm(tmp, bytes);
            self.inst("sub", &format!("sp, sp, {}", tmp));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_imm_forms() {
        let mut e = Emitter::new();
        e.load_imm(Reg::R0, 7);
        e.load_imm(Reg::R1, -1);
        e.load_imm(Reg::R2, 100000);
        let text = e.finish();
        assert!(text.contains("mov r0, #7"));
        assert!(text.contains("mvn r1, #0"));
        assert!(text.contains("ldr r2, =100000"));
    }

    #[test]
    fn test_frame_addressing_forms() {
        let mut e = Emitter::new();
        e.load_var(Reg::R0, &Loc::Frame(8), Reg::Ip);
        e.load_var(Reg::R1, &Loc::Frame(5000), Reg::Ip);
        let text = e.finish();
        assert!(text.contains("ldr r0, [fp, #-8]"));
        assert!(text.contains("ldr ip, =5000"));
        assert!(text.contains("sub ip, fp, ip"));
        assert!(text.contains("ldr r1, [ip]"));
    }

    #[test]
    fn test_global_store_uses_tmp() {
        let mut e = Emitter::new();
        e.store_var(Reg::R3, &Loc::Global("g".to_string()), Reg::Ip);
        let text = e.finish();
        assert!(text.contains("ldr ip, =g"));
        assert!(text.contains("str r3, [ip]"));
    }
}
