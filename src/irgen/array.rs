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

use crate::ast::AstNode;
use crate::errors::CompileError;
use crate::ir::{Inst, Op, Type, ValueId};
use crate::irgen::{ExprCtx, IrGen, Lowered};
use anyhow::Result;
use log::warn;

impl<'a> IrGen<'a> {
    // Lower `a[i1][i2]...[ik]` against declared shape [d1][d2]...[dn].
    // The row-major offset is Horner's form over the declared sizes of
    // dims 2..k; a partial access scales by the trailing-dims product and
    // yields a slice instead of a load. In Address context the full
    // access yields the address so the assignment can store through it.
    pub(crate) fn lower_array_access(&mut self, node: &AstNode, ctx: ExprCtx) -> Result<Lowered> {
        let name = node.children[0].name_str();
        let base = self.module.find_var(name).ok_or_else(|| {
            CompileError::SemanticError {
                line: node.line,
                reason: format!("Undefined symbol: {}", name),
            }
        })?;

        let dims = self.module.type_of(base).dims().to_vec();
        let indices = &node.children[1].children;
        let k = indices.len();
        let n = dims.len();
        if n == 0 {
            return Err(CompileError::SemanticError {
                line: node.line,
                reason: format!("{} is not an array.", name),
            }
            .into());
        }
        if k > n {
            return Err(CompileError::SemanticError {
                line: node.line,
                reason: format!(
                    "{} has {} dimension(s), {} indices given.",
                    name, n, k
                ),
            }
            .into());
        }

        let mut code = Vec::new();
        let mut index_values = Vec::with_capacity(k);
        for index in indices {
            let lowered = self.lower_expr(index, ExprCtx::Value)?;
            let value = self.expect_value(index, &lowered)?;
            code.extend(lowered.code);
            index_values.push(value);
        }

        // off = i1; off = off*d_j + i_j for j in 2..=k. The declared
        // leading dim is never read, so a size-erased parameter works.
        let mut offset = index_values[0];
        for j in 1..k {
            let dim = self.module.new_const_int(dims[j]);
            offset = self.fold_or_emit(&mut code, Op::Mul, offset, dim);
            offset = self.fold_or_emit(&mut code, Op::Add, offset, index_values[j]);
        }

        if k < n {
            let trailing: i32 = dims[k..].iter().product();
            let scale = self.module.new_const_int(trailing);
            offset = self.fold_or_emit(&mut code, Op::Mul, offset, scale);
        }

        let four = self.module.new_const_int(4);
        let byte_offset = self.fold_or_emit(&mut code, Op::Mul, offset, four);
        let addr = self.emit(
            &mut code,
            Inst::new(Op::AddPtr, vec![base, byte_offset]),
            Type::pointer_to(Type::Int32),
        );

        let value = if k < n {
            // partial access: a zero-cost slice typed as the remainder
            self.emit(
                &mut code,
                Inst::new(Op::Slice, vec![addr]),
                Type::int_array(dims[k..].to_vec()),
            )
        } else if ctx == ExprCtx::Address {
            addr
        } else {
            self.emit(&mut code, Inst::new(Op::LoadArray, vec![addr]), Type::Int32)
        };

        Ok(Lowered {
            value: Some(value),
            code,
        })
    }

    // Declared dimension collection. Each dim expression is lowered; a
    // non-constant dim substitutes 10 and reports a diagnostic. Declared
    // dims must be strictly positive (a parameter's erased leading dim
    // never passes through here).
    pub(crate) fn collect_dims(&mut self, dims_node: &AstNode) -> Result<Vec<i32>> {
        let mut dims = Vec::with_capacity(dims_node.children.len());
        for dim in &dims_node.children {
            let lowered = self.lower_expr(dim, ExprCtx::Value)?;
            let value = self.expect_value(dim, &lowered)?;
            match self.module.const_value(value) {
                Some(v) if v > 0 => dims.push(v),
                Some(v) => {
                    return Err(CompileError::SemanticError {
                        line: dim.line,
                        reason: format!("Array dimension must be positive, got {}.", v),
                    }
                    .into());
                }
                None => {
                    warn!(
                        "line {}: non-constant array dimension, using 10",
                        dim.line
                    );
                    dims.push(10);
                }
            }
        }
        Ok(dims)
    }

    // Fold when both operands are interned constants, emit otherwise.
    fn fold_or_emit(
        &mut self,
        code: &mut Vec<ValueId>,
        op: Op,
        lhs: ValueId,
        rhs: ValueId,
    ) -> ValueId {
        if let (Some(a), Some(b)) = (
            self.module.const_value(lhs),
            self.module.const_value(rhs),
        ) {
            let v = match op {
                Op::Add => a.wrapping_add(b),
                Op::Mul => a.wrapping_mul(b),
                _ => unreachable!("fold supports add and mul only"),
            };
            return self.module.new_const_int(v);
        }
        self.emit(code, Inst::new(op, vec![lhs, rhs]), Type::Int32)
    }
}
