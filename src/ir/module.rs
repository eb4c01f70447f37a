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

use std::collections::HashMap;

use crate::ir::function::Function;
use crate::ir::types::Type;
use crate::ir::value::{Inst, Op, ValueData, ValueId, ValueKind};

// The compilation unit: a value arena, globals, functions, the interned
// constant pool, and the scope stack mapping source names to values.
// Lowering is the single writer; instruction selection only reads (plus
// the transient stack-arg slots it synthesizes for calls).
#[derive(Debug, Default)]
pub struct Module {
    values: Vec<ValueData>,
    pub globals: Vec<ValueId>,
    pub functions: Vec<Function>,
    const_pool: HashMap<i32, ValueId>,
    scopes: Vec<HashMap<String, ValueId>>,
    pub current: Option<usize>,
}

impl Module {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            ..Self::default()
        }
    }

    // ------------- arena access -------------

    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id.0 as usize]
    }

    pub fn value_mut(&mut self, id: ValueId) -> &mut ValueData {
        &mut self.values[id.0 as usize]
    }

    pub fn name_of(&self, id: ValueId) -> &str {
        &self.value(id).name
    }

    pub fn type_of(&self, id: ValueId) -> &Type {
        &self.value(id).ty
    }

    pub fn inst(&self, id: ValueId) -> Option<&Inst> {
        self.value(id).as_inst()
    }

    pub fn const_value(&self, id: ValueId) -> Option<i32> {
        self.value(id).const_value()
    }

    pub fn set_dead(&mut self, id: ValueId, dead: bool) {
        if let ValueKind::Inst(inst) = &mut self.value_mut(id).kind {
            inst.dead = dead;
        }
    }

    fn alloc(&mut self, data: ValueData) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(data);
        id
    }

    // ------------- value constructors -------------

    // Interned per (module, value): repeated requests return the same id.
    pub fn new_const_int(&mut self, v: i32) -> ValueId {
        if let Some(id) = self.const_pool.get(&v) {
            return *id;
        }
        let id = self.alloc(ValueData {
            kind: ValueKind::ConstInt(v),
            ty: Type::Int32,
            name: format!("#{}", v),
        });
        self.const_pool.insert(v, id);
        id
    }

    // A local in the current function, or a global when no function is
    // active. Named variables are also bound in the innermost scope.
    pub fn new_var(&mut self, ty: Type, name: Option<&str>) -> ValueId {
        match self.current {
            Some(f) => {
                let ir_name = self.functions[f].next_var_name();
                let id = self.alloc(ValueData {
                    kind: ValueKind::Local,
                    ty,
                    name: ir_name,
                });
                self.functions[f].locals.push(id);
                if let Some(name) = name {
                    self.define(name, id);
                }
                id
            }
            None => {
                let name = name.unwrap_or("");
                let id = self.alloc(ValueData {
                    kind: ValueKind::Global { init: None },
                    ty,
                    name: format!("@{}", name),
                });
                self.globals.push(id);
                self.define(name, id);
                id
            }
        }
    }

    pub fn set_global_init(&mut self, id: ValueId, init: i32) {
        if let ValueKind::Global { init: slot } = &mut self.value_mut(id).kind {
            *slot = Some(init);
        }
    }

    // A formal parameter value holder; shares the `%lN` counter with
    // locals but is not bound in any scope (the copy-in local is).
    pub fn new_param(&mut self, ty: Type) -> ValueId {
        let f = self.current.expect("parameter outside a function");
        let ir_name = self.functions[f].next_var_name();
        let id = self.alloc(ValueData {
            kind: ValueKind::Param,
            ty,
            name: ir_name,
        });
        self.functions[f].params.push(id);
        id
    }

    // An sp-relative slot for one stack-passed call argument.
    pub fn new_stack_arg(&mut self, offset: i32) -> ValueId {
        self.alloc(ValueData {
            kind: ValueKind::StackArg { offset },
            ty: Type::Int32,
            name: format!("[sp, #{}]", offset),
        })
    }

    // An instruction value. Result-producing instructions get a fresh
    // `%tN` name; a slice aliases the name of its address operand.
    pub fn new_inst(&mut self, inst: Inst, ty: Type) -> ValueId {
        let name = if inst.op == Op::Slice {
            self.name_of(inst.operands[0]).to_string()
        } else if ty.is_void() {
            String::new()
        } else {
            let f = self.current.expect("instruction outside a function");
            self.functions[f].next_temp_name()
        };
        self.alloc(ValueData {
            kind: ValueKind::Inst(inst),
            ty,
            name,
        })
    }

    pub fn new_label(&mut self) -> ValueId {
        let f = self.current.expect("label outside a function");
        let name = self.functions[f].next_label_name();
        self.alloc(ValueData {
            kind: ValueKind::Inst(Inst::new(Op::Label, vec![])),
            ty: Type::Void,
            name,
        })
    }

    // ------------- functions -------------

    pub fn new_function(&mut self, name: &str, return_type: Type) -> usize {
        self.functions.push(Function::new(name, return_type));
        let index = self.functions.len() - 1;
        self.current = Some(index);
        index
    }

    pub fn find_function(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.name == name)
    }

    pub fn cur_fn(&mut self) -> &mut Function {
        let f = self.current.expect("no active function");
        &mut self.functions[f]
    }

    // ------------- scopes -------------

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn leave_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn define(&mut self, name: &str, id: ValueId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), id);
        }
    }

    // Walks the scope stack innermost-out.
    pub fn find_var(&self, name: &str) -> Option<ValueId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_interning() {
        let mut module = Module::new();
        let a = module.new_const_int(7);
        let b = module.new_const_int(7);
        let c = module.new_const_int(8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(module.name_of(a), "#7");
    }

    #[test]
    fn test_scope_shadowing_and_unwind() {
        let mut module = Module::new();
        let g = module.new_var(Type::Int32, Some("x"));
        module.enter_scope();
        module.new_function("f", Type::Int32);
        let inner = module.new_var(Type::Int32, Some("x"));
        assert_eq!(module.find_var("x"), Some(inner));
        module.leave_scope();
        assert_eq!(module.find_var("x"), Some(g));
    }

    #[test]
    fn test_local_names_continue_one_counter() {
        let mut module = Module::new();
        module.new_function("f", Type::Int32);
        let p = module.new_param(Type::Int32);
        let l = module.new_var(Type::Int32, Some("a"));
        assert_eq!(module.name_of(p), "%l0");
        assert_eq!(module.name_of(l), "%l1");
    }

    #[test]
    fn test_globals_when_no_function_active() {
        let mut module = Module::new();
        let g = module.new_var(Type::int_array(vec![3, 4]), Some("a"));
        assert_eq!(module.name_of(g), "@a");
        assert_eq!(module.globals, vec![g]);
    }
}
