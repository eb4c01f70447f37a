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

use crate::ir::{Module, ValueId};

// Frame layout for one function. Offsets are positive distances below
// fp: a value with offset N lives at [fp, #-N]; an array occupies
// [fp-N, fp-N+size). Every parameter gets a slot too — the prologue
// spills register args and copies stack args so the body addresses all
// of them fp-relative. The outgoing area at the bottom of the frame
// covers the widest call's argument list.
#[derive(Debug, Default)]
pub struct FrameLayout {
    offsets: HashMap<ValueId, i32>,
    pub local_bytes: i32,
    pub outgoing_bytes: i32,
    pub frame_bytes: i32,
}

pub fn layout(module: &Module, func_index: usize) -> FrameLayout {
    let func = &module.functions[func_index];
    let mut offsets = HashMap::new();
    let mut off = 0;

    for &param in &func.params {
        off += module.type_of(param).size().max(4);
        offsets.insert(param, off);
    }
    for &local in &func.locals {
        off += module.type_of(local).size().max(4);
        offsets.insert(local, off);
    }

    let local_bytes = off;
    let outgoing_bytes = 4 * func.max_call_args as i32;
    // AAPCS keeps sp 8-byte aligned
    let frame_bytes = (local_bytes + outgoing_bytes + 7) & !7;

    FrameLayout {
        offsets,
        local_bytes,
        outgoing_bytes,
        frame_bytes,
    }
}

impl FrameLayout {
    pub fn offset_of(&self, id: ValueId) -> Option<i32> {
        self.offsets.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Type;

    #[test]
    fn test_layout_assigns_disjoint_slots() {
        let mut module = Module::new();
        module.new_function("f", Type::Int32);
        let p = module.new_param(Type::Int32);
        let a = module.new_var(Type::int_array(vec![3, 4]), Some("a"));
        let x = module.new_var(Type::Int32, Some("x"));

        let frame = layout(&module, 0);
        assert_eq!(frame.offset_of(p), Some(4));
        assert_eq!(frame.offset_of(a), Some(4 + 48));
        assert_eq!(frame.offset_of(x), Some(4 + 48 + 4));
        assert_eq!(frame.local_bytes, 56);
        assert_eq!(frame.frame_bytes, 56);
    }

    #[test]
    fn test_layout_reserves_outgoing_args_and_aligns() {
        let mut module = Module::new();
        module.new_function("f", Type::Int32);
        module.new_var(Type::Int32, Some("x"));
        module.cur_fn().note_call(6);

        let frame = layout(&module, 0);
        assert_eq!(frame.local_bytes, 4);
        assert_eq!(frame.outgoing_bytes, 24);
        // 4 + 24 = 28, aligned up to 32
        assert_eq!(frame.frame_bytes, 32);
    }

    #[test]
    fn test_size_erased_param_gets_pointer_slot() {
        let mut module = Module::new();
        module.new_function("f", Type::Int32);
        let b = module.new_param(Type::int_array(vec![0, 4]));
        let frame = layout(&module, 0);
        assert_eq!(frame.offset_of(b), Some(4));
    }
}
