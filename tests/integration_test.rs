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

use minicc::{build_ir, compile_to_asm, compile_to_ir, parse_to_ast};
use std::collections::HashSet;

fn ir_of(source: &str) -> String {
    compile_to_ir(source).unwrap()
}

fn asm_of(source: &str) -> String {
    compile_to_asm(source, false).unwrap()
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// ------------- end-to-end scenarios -------------

#[test]
fn test_straight_line_arithmetic() {
    let ir = ir_of("int main(){ int a=1; int b=2; return a+b*3; }");
    // %l0 return slot, %l1 a, %l2 b
    assert_eq!(count(&ir, "= mul"), 1);
    assert_eq!(count(&ir, "= add"), 1);
    assert!(ir.contains("%t0 = mul %l2, #3"));
    assert!(ir.contains("%t1 = add %l1, %t0"));
    // the return slot receives the add result, then the body jumps to exit
    assert!(ir.contains("%l0 = %t1"));
    assert!(ir.contains("br label .L0\n.L0:\n\texit %l0"));
}

#[test]
fn test_if_else_with_non_constant_condition() {
    let ir = ir_of("int main(){ int x=0; if (x<5) x=1; else x=2; return x; }");
    assert_eq!(count(&ir, "icmp_lt"), 1);
    assert_eq!(count(&ir, "\tbc "), 1);
    // then/else/end labels beyond the exit label
    assert!(ir.contains("bc %t0, label .L1, label .L2"));
    assert!(ir.contains(".L1:"));
    assert!(ir.contains(".L2:"));
    assert!(ir.contains(".L3:"));
    // each arm assigns x before reaching the end label
    assert!(ir.contains("%l1 = #1"));
    assert!(ir.contains("%l1 = #2"));
    let end = ir.find("\n.L3:").unwrap();
    assert!(ir.find("%l1 = #1").unwrap() < end);
    assert!(ir.find("%l1 = #2").unwrap() < end);
}

#[test]
fn test_while_with_break_and_continue() {
    let ir = ir_of(
        "int main(){ int i=0; int s=0; \
         while(i<10){ if(i==5) break; i=i+1; if(i==3) continue; s=s+i; } \
         return s; }",
    );
    // a single loop-condition label; .L1 cond, .L2 body, .L3 end
    assert_eq!(count(&ir, "\n.L1:"), 1);
    // break jumps to the end label
    assert_eq!(count(&ir, "br label .L3"), 1);
    // continue and the loop tail both re-enter through the condition
    assert_eq!(count(&ir, "br label .L1"), 2);
    assert!(ir.contains("bc %t0, label .L2, label .L3"));
}

#[test]
fn test_short_circuit_and_skips_rhs_call() {
    let ir = ir_of("int f(){return 1;} int g(){return 0;} int main(){ return g() && f(); }");
    let main_at = ir.find("@main").unwrap();
    let body = &ir[main_at..];

    // g is called, its result is tested, and the branch bypasses the
    // rhs label on the false edge
    assert!(body.contains("call i32 @g()"));
    assert!(body.contains("icmp_ne %t0, #0"));
    assert!(body.contains("bc %t1, label .L1, label .L3"));

    // the f call only exists inside the rhs block
    assert_eq!(count(body, "call i32 @f()"), 1);
    let rhs_label = body.find("\n.L1:").unwrap();
    assert!(body.find("call i32 @f()").unwrap() > rhs_label);
}

#[test]
fn test_two_dimensional_array_read_write() {
    let ir = ir_of("int a[3][4]; int main(){ a[1][2]=7; return a[1][2]; }");
    assert!(ir.contains("declare i32 @a[3][4]"));
    // linear offset (1*4+2) = 6 elements, 24 bytes, on both sides
    assert_eq!(count(&ir, "ptradd @a, #24"), 2);
    // exactly one store and one load
    assert!(ir.contains("*%t0 = #7"));
    assert!(ir.contains("%t2 = *%t1"));
    assert_eq!(count(&ir, "= *"), 1);
    assert_eq!(count(&ir, "\t*%"), 1);
}

#[test]
fn test_array_parameter_passes_base_address() {
    let source = "int sum(int b[][4], int n){ int s=0; int i=0; \
                  while(i<n){ s=s+b[i][0]; i=i+1; } return s; } \
                  int a[2][4]; int main(){ return sum(a,2); }";
    let ir = ir_of(source);
    // the formal records a size-erased leading dimension
    assert!(ir.contains("define i32 @sum(i32 %l0[0][4], i32 %l1)"));
    // the call transmits the array base, no copy
    assert!(ir.contains("call i32 @sum(@a, #2)"));
    // the body offset uses the declared inner dimension 4
    assert!(ir.contains("mul %l6, #4"));
    assert!(ir.contains("ptradd %l2"));
}

// ------------- invariants -------------

#[test]
fn test_unique_value_names_per_function() {
    let module = build_ir(
        "int g; int f(int a, int b){ return a%b; } \
         int main(){ int x=1; if (x || g) x = f(x, 2); return x; }",
    )
    .unwrap();

    for function in &module.functions {
        let mut seen = HashSet::new();
        let named = function
            .params
            .iter()
            .chain(&function.locals)
            .chain(&function.body)
            .copied();
        for id in named {
            let name = module.name_of(id);
            if name.is_empty() {
                continue;
            }
            assert!(
                seen.insert(name.to_string()),
                "duplicate definition of {} in {}",
                name,
                function.name
            );
        }
    }
}

#[test]
fn test_branch_targets_resolve_in_same_function() {
    let module = build_ir(
        "int main(){ int i=0; while(i<3){ if(i==1) break; i=i+1; } return i; }",
    )
    .unwrap();

    for function in &module.functions {
        let body: HashSet<_> = function.body.iter().copied().collect();
        for &id in &function.body {
            if let Some(inst) = module.inst(id) {
                for target in &inst.targets {
                    assert!(
                        body.contains(target),
                        "branch target {} not in {}",
                        module.name_of(*target),
                        function.name
                    );
                }
            }
        }
    }
}

#[test]
fn test_idempotent_relowering() {
    let source = "int a[3][4]; int f(int n){ return n*2; } \
                  int main(){ int i=0; while(i<4){ a[0][i]=f(i); i=i+1; } return a[0][3]; }";
    let unit = parse_to_ast(source).unwrap();
    let first = minicc::irgen::build_module(&unit).unwrap();
    let second = minicc::irgen::build_module(&unit).unwrap();
    assert_eq!(
        minicc::ir::printer::print_module(&first),
        minicc::ir::printer::print_module(&second)
    );
}

#[test]
fn test_nested_block_scoping() {
    let ir = ir_of("int main(){ int x=1; { int x=2; x=3; } return x; }");
    // inner x shadows (%l2); the return reads the outer one (%l1)
    assert!(ir.contains("%l2 = #3"));
    assert!(ir.contains("%l0 = %l1"));

    // the inner name is gone once the block ends
    assert!(compile_to_ir("int main(){ { int y = 2; } return y; }").is_err());
}

#[test]
fn test_arg_ordering_in_assembly() {
    let asm = asm_of(
        "int h(int a,int b,int c,int d,int e,int f){ return f; } \
         int main(){ return h(1,2,3,4,5,6); }",
    );
    let call = asm.find("bl h").unwrap();
    // register args in r0..r3, stack args at [sp, #0] and [sp, #4],
    // all placed before the bl
    for needle in [
        "mov r0, #1",
        "mov r1, #2",
        "mov r2, #3",
        "mov r3, #4",
        "str r4, [sp, #0]",
        "str r4, [sp, #4]",
    ] {
        let at = asm.find(needle).unwrap_or_else(|| panic!("missing {}", needle));
        assert!(at < call, "{} must precede the call", needle);
    }
}

// ------------- assembly shape -------------

#[test]
fn test_minimal_function_frame() {
    let asm = asm_of("int main(){ return 0; }");
    assert!(asm.contains(".text"));
    assert!(asm.contains(".global main"));
    assert!(asm.contains("main:"));
    // r4 carries the zero constant into the return slot, so it is saved
    assert!(asm.contains("push {r4, fp, lr}"));
    assert!(asm.contains("mov fp, sp"));
    assert!(asm.contains("sub sp, sp, #8"));
    // return slot is the only local
    assert!(asm.contains("str r4, [fp, #-4]"));
    assert!(asm.contains("ldr r0, [fp, #-4]"));
    assert!(asm.contains("mov sp, fp"));
    assert!(asm.contains("pop {r4, fp, lr}"));
    assert!(asm.contains("bx lr"));
}

#[test]
fn test_globals_sections() {
    let asm = asm_of("int g = 5; int z; int a[3][4]; int main(){ return g; }");
    assert!(asm.contains(".data"));
    assert!(asm.contains("g:"));
    assert!(asm.contains(".word 5"));
    // zero-initialized and arrays land in BSS
    assert!(asm.contains(".comm z, 4, 4"));
    assert!(asm.contains(".comm a, 48, 4"));
}

#[test]
fn test_compare_uses_condition_codes() {
    let asm = asm_of("int main(){ int x=1; int y = x < 2; return y; }");
    assert!(asm.contains("cmp "));
    assert!(asm.contains("movlt "));
}

#[test]
fn test_show_linear_ir_comments() {
    let asm = compile_to_asm("int main(){ return 1; }", true).unwrap();
    assert!(asm.contains("\t@ "));
    assert!(asm.contains("@ exit %l0"));
}

#[test]
fn test_labels_are_function_qualified_in_assembly() {
    let asm = asm_of(
        "int f(){ int i=0; while(i<2) i=i+1; return i; } \
         int main(){ int i=0; while(i<2) i=i+1; return f(); }",
    );
    // both functions carry loop labels without colliding
    assert!(asm.contains(".f.L1:"));
    assert!(asm.contains(".main.L1:"));
}

#[test]
fn test_void_function_call_statement() {
    let ir = ir_of("void p(int x){ return; } int main(){ p(3); return 0; }");
    assert!(ir.contains("define void @p(i32 %l0)"));
    assert!(ir.contains("call void @p(#3)"));
    // a void exit carries no operand
    assert!(ir.contains("\texit\n"));

    let asm = asm_of("void p(int x){ return; } int main(){ p(3); return 0; }");
    assert!(asm.contains("bl p"));
}

#[test]
fn test_mod_is_synthesized() {
    let asm = asm_of("int main(){ int a=7; int b=3; return a%b; }");
    let sdiv = asm.find("sdiv").unwrap();
    let mul = asm[sdiv..].find("mul").map(|i| i + sdiv).unwrap();
    assert!(asm[mul..].contains("sub"));
}

#[test]
fn test_partial_access_slice_as_argument() {
    let ir = ir_of(
        "int g(int x[][3], int n){ return x[0][0]+n; } \
         int t[2][4][3]; int main(){ return g(t[1], 9); }",
    );
    // t[1] scales by the trailing dims product 4*3, times 4 bytes
    assert!(ir.contains("ptradd @t, #48"));
    // the slice transmits the address value itself
    assert!(ir.contains("call i32 @g(%t0, #9)"));
}

#[test]
fn test_ast_dump_is_json() {
    let dump = minicc::compile_to_ast_dump("int main(){ return 0; }").unwrap();
    assert!(dump.contains("\"kind\": \"CompileUnit\""));
    assert!(dump.contains("\"kind\": \"FuncDef\""));
    assert!(dump.contains("\"name\": \"main\""));
}

#[test]
fn test_dead_instructions_are_skipped() {
    let source = "int main(){ int x=5; return 0; }";

    let mut module = minicc::build_ir(source).unwrap();
    let live = minicc::codegen::generate_assembly(&mut module, false).unwrap();
    assert!(live.contains("mov r4, #5"));

    let mut module = minicc::build_ir(source).unwrap();
    let target = module.functions[0]
        .body
        .iter()
        .copied()
        .find(|&id| {
            module
                .inst(id)
                .map(|i| {
                    i.op == minicc::ir::Op::Move
                        && module.const_value(i.operands[1]) == Some(5)
                })
                .unwrap_or(false)
        })
        .unwrap();
    module.set_dead(target, true);
    let dead = minicc::codegen::generate_assembly(&mut module, false).unwrap();
    assert!(!dead.contains("mov r4, #5"));
}

// ------------- diagnostics -------------

#[test]
fn test_undefined_symbol_fails() {
    assert!(compile_to_ir("int main(){ return q; }").is_err());
}

#[test]
fn test_arg_count_mismatch_fails() {
    let source = "int f(int a){ return a; } int main(){ return f(1,2); }";
    assert!(compile_to_ir(source).is_err());
}

#[test]
fn test_break_outside_loop_fails() {
    assert!(compile_to_ir("int main(){ break; return 0; }").is_err());
}

#[test]
fn test_non_constant_global_initializer_fails() {
    assert!(compile_to_ir("int g = f(); int f(){ return 1; } int main(){ return g; }").is_err());
    // unary minus folds at module scope
    let ir = ir_of("int g = -5; int main(){ return g; }");
    assert!(ir.contains("declare i32 @g = #-5"));
}

#[test]
fn test_constant_condition_specialization() {
    let ir = ir_of("int main(){ int x=0; if (1) x=1; else x=2; while(0) x=9; return x; }");
    // only the live arm survives, no conditional branch at all
    assert!(!ir.contains("\tbc "));
    assert!(ir.contains("%l1 = #1"));
    assert!(!ir.contains("%l1 = #2"));
    assert!(!ir.contains("#9"));
}
