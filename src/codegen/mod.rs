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

pub mod emitter;
pub mod frame;
pub mod registers;
mod selectors;

use std::collections::HashMap;

use crate::errors::CompileError;
use crate::ir::{Module, Op, ValueId, ValueKind, printer};
use anyhow::Result;
use emitter::Emitter;
use frame::FrameLayout;
use log::{debug, error};
use registers::{Reg, RegisterFile};

// Where a value lives during selection of one function.
#[derive(Debug, Clone, PartialEq)]
pub enum Loc {
    Reg(Reg),
    // [fp, #-offset]
    Frame(i32),
    // [sp, #offset], outgoing call argument
    Stack(i32),
    Global(String),
    Imm(i32),
}

// Emit AAPCS-style ARM32 assembly for the whole module. Back-end
// resource errors are logged with their IR context and selection
// continues, so the output stays inspectable.
pub fn generate_assembly(module: &mut Module, show_ir: bool) -> Result<String> {
    let mut out = String::new();

    let mut globals = Emitter::new();
    emit_globals(&mut globals, module);
    out.push_str(&globals.finish());

    out.push_str(".text\n");
    let mut total_errors = 0;
    for index in 0..module.functions.len() {
        let selector = Selector::new(module, index, show_ir);
        let (text, errors) = selector.run();
        out.push('\n');
        out.push_str(&text);
        total_errors += errors;
    }

    if total_errors > 0 {
        error!(
            "{} back-end error(s); the output is best-effort",
            total_errors
        );
    }

    Ok(out)
}

// Initialized globals go to .data as words; zero or uninitialized ones
// become common symbols in BSS, aligned to 4.
fn emit_globals(out: &mut Emitter, module: &Module) {
    let mut data = Vec::new();
    let mut bss = Vec::new();
    for &id in &module.globals {
        let value = module.value(id);
        let symbol = value.name.trim_start_matches('@').to_string();
        match value.kind {
            ValueKind::Global { init: Some(v) } if v != 0 => data.push((symbol, v)),
            _ => bss.push((symbol, value.ty.size().max(4))),
        }
    }

    if !data.is_empty() {
        out.raw(".data");
        out.raw(".align 2");
        for (symbol, value) in data {
            out.raw(&format!(".global {}", symbol));
            out.label(&symbol);
            out.inst(".word", &value.to_string());
        }
    }
    for (symbol, size) in bss {
        out.raw(&format!(".comm {}, {}, 4", symbol, size));
    }
}

// Per-function instruction selector. Walks the body in order dispatching
// on the IR operator; the prologue is assembled after the walk, when the
// exact callee-saved set is known (Exit is always the last instruction,
// so its epilogue sees the same set).
pub struct Selector<'a> {
    module: &'a mut Module,
    func_index: usize,
    func_name: String,
    body: Vec<ValueId>,
    frame: FrameLayout,
    regs: RegisterFile,
    emitter: Emitter,
    bindings: HashMap<ValueId, Reg>,
    pending_args: Vec<ValueId>,
    show_ir: bool,
    error_count: usize,
}

impl<'a> Selector<'a> {
    pub fn new(module: &'a mut Module, func_index: usize, show_ir: bool) -> Self {
        let frame = frame::layout(module, func_index);
        let func = &module.functions[func_index];
        let func_name = func.name.clone();
        let body = func.body.clone();
        Self {
            module,
            func_index,
            func_name,
            body,
            frame,
            regs: RegisterFile::new(),
            emitter: Emitter::new(),
            bindings: HashMap::new(),
            pending_args: Vec::new(),
            show_ir,
            error_count: 0,
        }
    }

    pub fn run(mut self) -> (String, usize) {
        debug!("selecting function {}", self.func_name);
        let body = std::mem::take(&mut self.body);
        for &id in &body {
            let Some(inst) = self.module.inst(id) else {
                continue;
            };
            if inst.dead {
                continue;
            }
            if self.show_ir {
                if let Some(line) = printer::render_inst(self.module, id) {
                    self.emitter.comment(line.trim());
                }
            }
            if let Err(err) = self.select_inst(id) {
                let context = printer::render_inst(self.module, id).unwrap_or_default();
                error!("{} [at: {}]", err, context.trim());
                self.error_count += 1;
            }
        }
        let errors = self.error_count;
        (self.assemble(), errors)
    }

    fn select_inst(&mut self, id: ValueId) -> Result<(), CompileError> {
        let inst = self
            .module
            .inst(id)
            .cloned()
            .expect("selection visits instruction values only");
        match inst.op {
            Op::Entry => Ok(()),
            Op::Exit => self.select_exit(&inst),
            Op::Label => {
                let label = self.local_label(id);
                self.emitter.label(&label);
                Ok(())
            }
            Op::Goto => {
                let target = self.local_label(inst.targets[0]);
                self.emitter.jump(&target);
                Ok(())
            }
            Op::Branch => self.select_branch(&inst),
            Op::Move => self.select_move(&inst),
            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Mod | Op::AddPtr => {
                self.select_binary(id, &inst)
            }
            Op::CmpLt | Op::CmpGt | Op::CmpLe | Op::CmpGe | Op::CmpEq | Op::CmpNe => {
                self.select_compare(id, &inst)
            }
            Op::Arg => {
                self.pending_args.push(inst.operands[0]);
                Ok(())
            }
            Op::Call => self.select_call(id, &inst),
            Op::LoadArray => self.select_load(id, &inst),
            Op::StoreArray => self.select_store(&inst),
            Op::Slice => self.select_slice(id, &inst),
        }
    }

    // Function header, prologue and parameter spill, then the selected
    // body (whose tail already carries the epilogue).
    fn assemble(self) -> String {
        let saved = self.regs.saved_in_use();
        let mut head = Emitter::new();
        head.raw(".align 2");
        head.raw(&format!(".global {}", self.func_name));
        head.label(&self.func_name);

        let mut push_list: Vec<String> = saved.iter().map(|r| r.to_string()).collect();
        push_list.push(Reg::Fp.to_string());
        push_list.push(Reg::Lr.to_string());
        head.inst("push", &format!("{{{}}}", push_list.join(", ")));
        head.inst("mov", "fp, sp");
        head.alloc_stack(self.frame.frame_bytes, Reg::Ip);

        // spill register params; copy stack params down to their slots
        let params = self.module.functions[self.func_index].params.clone();
        let pushed = saved.len() as i32 + 2;
        for (k, &param) in params.iter().enumerate() {
            let Some(offset) = self.frame.offset_of(param) else {
                continue;
            };
            if k < 4 {
                head.store_var(Reg::ARG_REGS[k], &Loc::Frame(offset), Reg::Ip);
            } else {
                let incoming = 4 * pushed + 4 * (k as i32 - 4);
                head.inst("ldr", &format!("ip, [fp, #{}]", incoming));
                head.store_var(Reg::Ip, &Loc::Frame(offset), Reg::Lr);
            }
        }

        head.finish() + &self.emitter.finish()
    }

    // ------------- shared selection helpers -------------

    pub(crate) fn err(&self, reason: impl Into<String>) -> CompileError {
        CompileError::CodegenError {
            context: format!("function {}", self.func_name),
            reason: reason.into(),
        }
    }

    // Assembly-level name of an IR label, unique per emitted file.
    pub(crate) fn local_label(&self, id: ValueId) -> String {
        format!(".{}{}", self.func_name, self.module.name_of(id))
    }

    pub(crate) fn loc_of(&self, id: ValueId) -> Result<Loc, CompileError> {
        let data = self.module.value(id);
        match &data.kind {
            ValueKind::ConstInt(v) => Ok(Loc::Imm(*v)),
            ValueKind::Local | ValueKind::Param => {
                let offset = self.frame.offset_of(id).ok_or_else(|| {
                    self.err(format!("{} has no frame slot", data.name))
                })?;
                Ok(Loc::Frame(offset))
            }
            ValueKind::Global { .. } => {
                Ok(Loc::Global(data.name.trim_start_matches('@').to_string()))
            }
            ValueKind::StackArg { offset } => Ok(Loc::Stack(*offset)),
            ValueKind::Inst(_) => {
                let reg = self.bindings.get(&id).ok_or_else(|| {
                    self.err(format!("{} is not bound to a register", data.name))
                })?;
                Ok(Loc::Reg(*reg))
            }
        }
    }

    // Bring an operand into a register. Array-typed values materialize
    // their base address; everything else loads its current location.
    pub(crate) fn operand_reg(&mut self, id: ValueId) -> Result<Reg, CompileError> {
        if self.module.type_of(id).is_array() {
            return self.array_base_reg(id);
        }
        match self.loc_of(id)? {
            Loc::Reg(reg) => Ok(reg),
            loc => {
                let rd = self.regs.allocate()?;
                self.emitter.load_var(rd, &loc, Reg::Ip);
                Ok(rd)
            }
        }
    }

    // Base address of an array value: in-frame storage yields fp-offset
    // arithmetic, a size-erased parameter slot holds the address itself,
    // globals come from the literal pool, slices are already registers.
    fn array_base_reg(&mut self, id: ValueId) -> Result<Reg, CompileError> {
        let data = self.module.value(id);
        let size_erased = data.ty.dims().first() == Some(&0);
        match &data.kind {
            ValueKind::Inst(_) => match self.loc_of(id)? {
                Loc::Reg(reg) => Ok(reg),
                _ => Err(self.err("array slice is not in a register")),
            },
            ValueKind::Global { .. } => {
                let symbol = data.name.trim_start_matches('@').to_string();
                let rd = self.regs.allocate()?;
                self.emitter.inst("ldr", &format!("{}, ={}", rd, symbol));
                Ok(rd)
            }
            ValueKind::Local | ValueKind::Param => {
                let offset = self
                    .frame
                    .offset_of(id)
                    .ok_or_else(|| self.err(format!("{} has no frame slot", data.name)))?;
                let rd = self.regs.allocate()?;
                if size_erased {
                    self.emitter.load_var(rd, &Loc::Frame(offset), Reg::Ip);
                } else {
                    self.emitter.frame_addr(rd, offset);
                }
                Ok(rd)
            }
            _ => Err(self.err(format!("{} cannot be used as an array", data.name))),
        }
    }

    // Free the register that carried an operand. A bound temp is
    // consumed here; a scratch load is simply released.
    pub(crate) fn release_operand(&mut self, id: ValueId, reg: Reg) {
        if let Some(&bound) = self.bindings.get(&id) {
            if bound == reg {
                self.bindings.remove(&id);
                self.regs.free(reg);
            }
            return;
        }
        self.regs.free(reg);
    }

    // Allocate and bind the result register of a defining instruction.
    pub(crate) fn def_reg(&mut self, id: ValueId) -> Result<Reg, CompileError> {
        let rd = self.regs.allocate()?;
        self.bindings.insert(id, rd);
        Ok(rd)
    }

    pub(crate) fn transfer_binding(&mut self, from: ValueId, to: ValueId) {
        if let Some(reg) = self.bindings.remove(&from) {
            self.bindings.insert(to, reg);
        }
    }
}
