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
use crate::ir::value::ValueId;

// One lowered function. `body` is the linear instruction list: exactly one
// Entry first, the exit label and one Exit last once lowering completes.
// Params and locals share the `%lN` counter; temps and labels have their
// own, reset per function so re-lowering the same tree is deterministic.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<ValueId>,
    pub locals: Vec<ValueId>,
    pub body: Vec<ValueId>,
    pub entry: Option<ValueId>,
    pub exit_label: Option<ValueId>,
    pub return_slot: Option<ValueId>,
    pub max_call_args: usize,
    pub exists_call: bool,
    var_counter: u32,
    temp_counter: u32,
    label_counter: u32,
}

impl Function {
    pub fn new(name: &str, return_type: Type) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
            entry: None,
            exit_label: None,
            return_slot: None,
            max_call_args: 0,
            exists_call: false,
            var_counter: 0,
            temp_counter: 0,
            label_counter: 0,
        }
    }

    pub fn next_var_name(&mut self) -> String {
        let n = self.var_counter;
        self.var_counter += 1;
        format!("%l{}", n)
    }

    pub fn next_temp_name(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("%t{}", n)
    }

    pub fn next_label_name(&mut self) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!(".L{}", n)
    }

    // Record one call site and its positional argument count.
    pub fn note_call(&mut self, arg_count: usize) {
        self.exists_call = true;
        self.max_call_args = self.max_call_args.max(arg_count);
    }
}
