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

mod array;
mod expression;
mod function;
mod statement;

use crate::ast::{AstNode, NodeKind};
use crate::errors::CompileError;
use crate::ir::{Inst, Module, Op, Type, ValueId};
use anyhow::Result;
use log::warn;

// Result of lowering one node: an optional result value plus the ordered
// instruction buffer the node produced. Parents splice child buffers in
// evaluation order before appending their own instructions, so side
// effects surface in source order.
#[derive(Debug, Default)]
pub struct Lowered {
    pub value: Option<ValueId>,
    pub code: Vec<ValueId>,
}

impl Lowered {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of_value(value: ValueId) -> Self {
        Self {
            value: Some(value),
            code: Vec::new(),
        }
    }
}

// How the enclosing node consumes an expression result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprCtx {
    // rvalue: compare results widen to i32
    Value,
    // assignment target: an array access yields its address, unloaded
    Address,
    // branch condition: compare results stay i1
    Cond,
}

#[derive(Clone, Copy)]
pub(crate) struct LoopLabels {
    pub cond: ValueId,
    pub end: ValueId,
}

pub struct IrGen<'a> {
    pub(crate) module: &'a mut Module,
    pub(crate) loop_stack: Vec<LoopLabels>,
}

// Lower a full translation unit into a fresh module.
pub fn build_module(unit: &AstNode) -> Result<Module> {
    let mut module = Module::new();
    let mut lowerer = IrGen {
        module: &mut module,
        loop_stack: Vec::new(),
    };
    lowerer.lower_compile_unit(unit)?;
    Ok(module)
}

impl<'a> IrGen<'a> {
    fn lower_compile_unit(&mut self, unit: &AstNode) -> Result<()> {
        for child in &unit.children {
            match child.kind {
                NodeKind::FuncDef => self.lower_func_def(child)?,
                NodeKind::DeclStmt => self.lower_global_decl(child)?,
                other => {
                    warn!(
                        "line {}: unsupported top-level node {:?}, skipped",
                        child.line, other
                    );
                }
            }
        }
        Ok(())
    }

    // ------------- statement dispatch -------------

    pub(crate) fn lower_statement(&mut self, node: &AstNode) -> Result<Lowered> {
        match node.kind {
            NodeKind::Block => self.lower_block(node),
            NodeKind::DeclStmt => self.lower_decl_stmt(node),
            NodeKind::Assign => self.lower_assign(node),
            NodeKind::Return => self.lower_return(node),
            NodeKind::If => self.lower_if(node),
            NodeKind::While => self.lower_while(node),
            NodeKind::Break => self.lower_break(node),
            NodeKind::Continue => self.lower_continue(node),
            kind if is_expression_kind(kind) => {
                // expression statement: evaluated for effect, value dropped
                self.lower_expr(node, ExprCtx::Value)
            }
            other => {
                warn!(
                    "line {}: unsupported statement node {:?}, skipped",
                    node.line, other
                );
                Ok(Lowered::empty())
            }
        }
    }

    // ------------- expression dispatch -------------

    pub(crate) fn lower_expr(&mut self, node: &AstNode, ctx: ExprCtx) -> Result<Lowered> {
        // At module scope only constant initializer shapes are evaluable.
        if self.module.current.is_none()
            && !matches!(node.kind, NodeKind::LeafLiteralUint | NodeKind::Neg)
        {
            return Err(CompileError::SemanticError {
                line: node.line,
                reason: "Non-constant global initializer.".to_string(),
            }
            .into());
        }

        match node.kind {
            NodeKind::Add | NodeKind::Sub | NodeKind::Mul | NodeKind::Div | NodeKind::Mod => {
                self.lower_binary(node)
            }
            NodeKind::Neg => self.lower_neg(node),
            NodeKind::Not => self.lower_not(node, ctx),
            NodeKind::Lt
            | NodeKind::Gt
            | NodeKind::Le
            | NodeKind::Ge
            | NodeKind::Eq
            | NodeKind::Ne => self.lower_compare(node, ctx),
            NodeKind::And | NodeKind::Or => self.lower_short_circuit(node),
            NodeKind::FuncCall => self.lower_func_call(node),
            NodeKind::ArrayAccess => self.lower_array_access(node, ctx),
            NodeKind::LeafVarId => self.lower_identifier(node),
            NodeKind::LeafLiteralUint => {
                let value = node.value.unwrap_or(0);
                Ok(Lowered::of_value(self.module.new_const_int(value)))
            }
            other => {
                warn!(
                    "line {}: unsupported expression node {:?}, skipped",
                    node.line, other
                );
                Ok(Lowered::empty())
            }
        }
    }

    // ------------- shared emit helpers -------------

    pub(crate) fn emit(
        &mut self,
        code: &mut Vec<ValueId>,
        inst: Inst,
        ty: Type,
    ) -> ValueId {
        let id = self.module.new_inst(inst, ty);
        code.push(id);
        id
    }

    pub(crate) fn emit_move(&mut self, code: &mut Vec<ValueId>, dst: ValueId, src: ValueId) {
        self.emit(code, Inst::new(Op::Move, vec![dst, src]), Type::Void);
    }

    pub(crate) fn emit_goto(&mut self, code: &mut Vec<ValueId>, target: ValueId) {
        self.emit(
            code,
            Inst::with_targets(Op::Goto, vec![], vec![target]),
            Type::Void,
        );
    }

    pub(crate) fn emit_branch(
        &mut self,
        code: &mut Vec<ValueId>,
        cond: ValueId,
        if_true: ValueId,
        if_false: ValueId,
    ) {
        self.emit(
            code,
            Inst::with_targets(Op::Branch, vec![cond], vec![if_true, if_false]),
            Type::Void,
        );
    }

    // Coerce a lowered value into a branch condition: i1 passes through,
    // anything else is tested against zero.
    pub(crate) fn to_cond(&mut self, code: &mut Vec<ValueId>, value: ValueId) -> ValueId {
        if self.module.type_of(value).is_bool() {
            return value;
        }
        let zero = self.module.new_const_int(0);
        self.emit(code, Inst::new(Op::CmpNe, vec![value, zero]), Type::Bool)
    }

    // The bool→int pattern: branch into fresh labels assigning 1/0 to a
    // fresh i32 local.
    pub(crate) fn widen_bool(&mut self, code: &mut Vec<ValueId>, cond: ValueId) -> ValueId {
        let result = self.module.new_var(Type::Int32, None);
        let l_true = self.module.new_label();
        let l_false = self.module.new_label();
        let l_end = self.module.new_label();

        self.emit_branch(code, cond, l_true, l_false);
        code.push(l_true);
        let one = self.module.new_const_int(1);
        self.emit_move(code, result, one);
        self.emit_goto(code, l_end);
        code.push(l_false);
        let zero = self.module.new_const_int(0);
        self.emit_move(code, result, zero);
        self.emit_goto(code, l_end);
        code.push(l_end);

        result
    }

    // Result value of a child node, or a semantic error when the child
    // produced none (a void call used as an operand).
    pub(crate) fn expect_value(&self, node: &AstNode, lowered: &Lowered) -> Result<ValueId> {
        lowered.value.ok_or_else(|| {
            CompileError::SemanticError {
                line: node.line,
                reason: "Expression produces no value.".to_string(),
            }
            .into()
        })
    }
}

fn is_expression_kind(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Add
            | NodeKind::Sub
            | NodeKind::Mul
            | NodeKind::Div
            | NodeKind::Mod
            | NodeKind::Neg
            | NodeKind::Not
            | NodeKind::Lt
            | NodeKind::Gt
            | NodeKind::Le
            | NodeKind::Ge
            | NodeKind::Eq
            | NodeKind::Ne
            | NodeKind::And
            | NodeKind::Or
            | NodeKind::FuncCall
            | NodeKind::ArrayAccess
            | NodeKind::LeafVarId
            | NodeKind::LeafLiteralUint
    )
}

#[cfg(test)]
mod tests {
    use crate::ir::printer::print_module;
    use crate::parser::parse_source;

    fn ir_of(source: &str) -> String {
        let unit = parse_source(source).unwrap();
        let module = super::build_module(&unit).unwrap();
        print_module(&module)
    }

    #[test]
    fn test_compare_widens_in_value_context() {
        let ir = ir_of("int main(){ int y = 1 < 2; return y; }");
        assert!(ir.contains("icmp_lt #1, #2"));
        // the bool->int pattern: one branch, both constant assignments
        assert_eq!(ir.matches("\tbc ").count(), 1);
        assert!(ir.contains("= #1"));
        assert!(ir.contains("= #0"));
    }

    #[test]
    fn test_compare_stays_raw_in_condition_context() {
        let ir = ir_of("int main(){ if (1<2) return 1; return 0; }");
        // the compare feeds the branch directly, no widen branches
        assert_eq!(ir.matches("\tbc ").count(), 1);
        assert_eq!(ir.matches("icmp_lt").count(), 1);
    }

    #[test]
    fn test_plain_variable_condition_tests_against_zero() {
        let ir = ir_of("int main(){ int x=1; while (x) x=0; return x; }");
        assert!(ir.contains("icmp_ne %l1, #0"));
    }

    #[test]
    fn test_param_copy_in_moves() {
        let ir = ir_of("int add(int a, int b){ return a+b; } int main(){ return add(1,2); }");
        // formals %l0/%l1 copied into same-named locals %l2/%l3
        assert!(ir.contains("%l2 = %l0"));
        assert!(ir.contains("%l3 = %l1"));
        assert!(ir.contains("add %l2, %l3"));
    }

    #[test]
    fn test_arg_instructions_precede_call() {
        let ir = ir_of("int f(int a, int b){ return a; } int main(){ return f(4, 5); }");
        assert!(ir.contains("arg #4\n\targ #5\n\t%t0 = call i32 @f(#4, #5)"));
    }
}
