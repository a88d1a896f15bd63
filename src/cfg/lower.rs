use std::collections::HashMap;

use crate::ast::{
    ast::{Decl, FuncDef, Program},
    expressions::{BinaryExpr, BinaryOp, Expr, FuncCallExpr, LiteralValue},
    statements::{AssignStmt, Block, ForStmt, IfStmt, InputStmt, IoArg, OutputStmt, Stmt, WhileStmt},
    types::Type,
};

use super::{
    builder::FunctionBuilder,
    ir::{CfgProgram, GlobalInit, GlobalVar, Op, Place, Slot, SlotId, Terminator, ValueId},
};

/// Lowers a verified program into its basic-block form. The input must have
/// passed semantic analysis; malformed trees here are implementation
/// defects, not user errors.
pub fn lower(program: &Program) -> CfgProgram {
    let mut globals = Vec::new();
    let mut global_types = HashMap::new();
    let mut funcs = HashMap::new();

    for decl in &program.decls {
        match decl {
            Decl::Func(func) => {
                let param_types = func.params.iter().map(|param| param.type_).collect();
                funcs.insert(func.name.clone(), (param_types, func.return_type));
            }
            Decl::Var(decl) => {
                for name in &decl.names {
                    globals.push(GlobalVar {
                        name: name.clone(),
                        type_: decl.type_,
                        init: GlobalInit::Zero,
                    });
                    global_types.insert(name.clone(), decl.type_);
                }
            }
            Decl::VarInit(init) => {
                let global_init = match &init.value.value {
                    LiteralValue::Int(value) => GlobalInit::Int(*value),
                    LiteralValue::Real(value) => GlobalInit::Real(*value),
                    LiteralValue::Bool(value) => GlobalInit::Bool(*value),
                    LiteralValue::Str(value) => GlobalInit::Str(value.clone()),
                };
                globals.push(GlobalVar {
                    name: init.name.clone(),
                    type_: init.value.type_,
                    init: global_init,
                });
                global_types.insert(init.name.clone(), init.value.type_);
            }
        }
    }

    let functions = program
        .decls
        .iter()
        .filter_map(|decl| match decl {
            Decl::Func(func) => Some(lower_function(func, &global_types, &funcs)),
            _ => None,
        })
        .collect();

    CfgProgram { globals, functions }
}

struct FunctionLowerer<'a> {
    globals: &'a HashMap<String, Type>,
    funcs: &'a HashMap<String, (Vec<Type>, Type)>,
    locals: HashMap<String, (SlotId, Type)>,
    builder: FunctionBuilder,
    return_type: Type,
}

fn lower_function(
    func: &FuncDef,
    globals: &HashMap<String, Type>,
    funcs: &HashMap<String, (Vec<Type>, Type)>,
) -> super::ir::CfgFunction {
    let params: Vec<Slot> = func
        .params
        .iter()
        .map(|param| Slot {
            name: param.name.clone(),
            type_: param.type_,
        })
        .collect();

    let mut lowerer = FunctionLowerer {
        globals,
        funcs,
        locals: HashMap::new(),
        builder: FunctionBuilder::new(&func.name, params, func.return_type),
        return_type: func.return_type,
    };

    // Parameter slots are pre-allocated by the builder in order.
    for (index, param) in func.params.iter().enumerate() {
        lowerer
            .locals
            .insert(param.name.clone(), (SlotId(index), param.type_));
    }

    lowerer.lower_block(&func.body);

    // Implicit epilogue for a fall-through tail: void functions return,
    // non-void ones cannot reach here (reachability analysis proved every
    // path returns).
    if !lowerer.builder.is_terminated() {
        if func.return_type == Type::Void {
            lowerer.builder.terminate(Terminator::Ret(None));
        } else {
            lowerer.builder.terminate(Terminator::Unreachable);
        }
    }

    lowerer.builder.finish()
}

impl FunctionLowerer<'_> {
    fn lower_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.lower_stmt(stmt);
            if self.builder.is_terminated() {
                // Anything after a return in this block is unreachable.
                break;
            }
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.lower_block(block),
            Stmt::VarDecl(decl) => {
                for name in &decl.names {
                    let slot = self.builder.add_slot(name, decl.type_);
                    self.locals.insert(name.clone(), (slot, decl.type_));
                    let zero = self.zero_value(decl.type_);
                    self.builder.emit(Op::Store {
                        place: Place::Slot(slot),
                        value: zero,
                    });
                }
            }
            Stmt::VarInit(init) => {
                let type_ = init.value.type_;
                let slot = self.builder.add_slot(&init.name, type_);
                self.locals.insert(init.name.clone(), (slot, type_));
                let value = self.literal_value(&init.value.value, type_);
                self.builder.emit(Op::Store {
                    place: Place::Slot(slot),
                    value,
                });
            }
            Stmt::Assign(assign) => self.lower_assign(assign),
            Stmt::ProcCall(call) => {
                let (param_types, _) = self.funcs[&call.name].clone();
                let args = self.lower_call_args(&call.args, &param_types);
                self.builder.emit(Op::Call {
                    name: call.name.clone(),
                    args,
                });
            }
            Stmt::Return(ret) => match &ret.value {
                Some(value) => {
                    let (value, type_) = self.lower_expr(value);
                    let value = self.coerce(value, type_, self.return_type);
                    self.builder.terminate(Terminator::Ret(Some(value)));
                }
                None => self.builder.terminate(Terminator::Ret(None)),
            },
            Stmt::If(if_stmt) => self.lower_if(if_stmt),
            Stmt::While(while_stmt) => self.lower_while(while_stmt),
            Stmt::For(for_stmt) => self.lower_for(for_stmt),
            Stmt::Output(output) => self.lower_output(output),
            Stmt::Input(input) => self.lower_input(input),
        }
    }

    fn lower_assign(&mut self, assign: &AssignStmt) {
        let (value, value_type) = self.lower_expr(&assign.value);
        let (place, target_type) = self.resolve(&assign.name);
        let value = self.coerce(value, value_type, target_type);
        self.builder.emit(Op::Store { place, value });
    }

    /// Conditional lowering with deferred merge creation. The merge block
    /// is appended only after every branch has been fully lowered, since
    /// nested constructs inside a branch allocate blocks of their own;
    /// edges that need the merge block are patched afterwards.
    fn lower_if(&mut self, if_stmt: &IfStmt) {
        let (cond, _) = self.lower_expr(&if_stmt.condition);
        let start_block = self.builder.current();

        let then_block = self.builder.new_block("if_then");

        let next_block = if !if_stmt.elifs.is_empty() || if_stmt.else_block.is_some() {
            Some(self.builder.new_block("next_branch"))
        } else {
            None
        };

        let mut jumps_to_merge = Vec::new();

        self.builder.set_current(then_block);
        self.lower_block(&if_stmt.then_block);
        if !self.builder.is_terminated() {
            jumps_to_merge.push(self.builder.current());
        }

        // Last-clause false edges that can only be wired once the merge
        // block exists.
        let mut elif_patches = Vec::new();

        if let Some(next_block) = next_block {
            let mut chain_block = next_block;

            for (index, elif) in if_stmt.elifs.iter().enumerate() {
                self.builder.set_current(chain_block);
                let (elif_cond, _) = self.lower_expr(&elif.condition);

                let elif_then = self.builder.new_block(&format!("elif_{}_then", index));

                let has_next =
                    index + 1 < if_stmt.elifs.len() || if_stmt.else_block.is_some();
                if has_next {
                    let elif_next = self.builder.new_block(&format!("elif_{}_next", index));
                    self.builder.terminate(Terminator::CondBr {
                        cond: elif_cond,
                        then_block: elif_then,
                        else_block: elif_next,
                    });
                    chain_block = elif_next;
                } else {
                    elif_patches.push((self.builder.current(), elif_cond, elif_then));
                }

                self.builder.set_current(elif_then);
                self.lower_block(&elif.block);
                if !self.builder.is_terminated() {
                    jumps_to_merge.push(self.builder.current());
                }
            }

            if let Some(else_block) = &if_stmt.else_block {
                self.builder.set_current(chain_block);
                self.lower_block(else_block);
                if !self.builder.is_terminated() {
                    jumps_to_merge.push(self.builder.current());
                }
            }
        }

        // Every branch is lowered; the merge block may now exist.
        let merge_block = self.builder.new_block("if_merge");

        self.builder.terminate_block(
            start_block,
            Terminator::CondBr {
                cond,
                then_block,
                else_block: next_block.unwrap_or(merge_block),
            },
        );

        for (block, cond, true_dest) in elif_patches {
            self.builder.terminate_block(
                block,
                Terminator::CondBr {
                    cond,
                    then_block: true_dest,
                    else_block: merge_block,
                },
            );
        }

        for block in jumps_to_merge {
            self.builder.terminate_block(block, Terminator::Br(merge_block));
        }

        self.builder.set_current(merge_block);
    }

    /// Loop topology is fixed before the body is lowered, so no deferral is
    /// needed here.
    fn lower_while(&mut self, while_stmt: &WhileStmt) {
        let cond_block = self.builder.new_block("while_cond");
        let body_block = self.builder.new_block("while_body");
        let end_block = self.builder.new_block("while_end");

        self.builder.terminate(Terminator::Br(cond_block));

        self.builder.set_current(cond_block);
        let (cond, _) = self.lower_expr(&while_stmt.condition);
        self.builder.terminate(Terminator::CondBr {
            cond,
            then_block: body_block,
            else_block: end_block,
        });

        self.builder.set_current(body_block);
        self.lower_block(&while_stmt.body);
        if !self.builder.is_terminated() {
            self.builder.terminate(Terminator::Br(cond_block));
        }

        self.builder.set_current(end_block);
    }

    fn lower_for(&mut self, for_stmt: &ForStmt) {
        if let Some(init) = &for_stmt.init {
            self.lower_assign(init);
        }

        let cond_block = self.builder.new_block("for_cond");
        let body_block = self.builder.new_block("for_body");
        let end_block = self.builder.new_block("for_end");

        self.builder.terminate(Terminator::Br(cond_block));

        self.builder.set_current(cond_block);
        match &for_stmt.condition {
            Some(condition) => {
                let (cond, _) = self.lower_expr(condition);
                self.builder.terminate(Terminator::CondBr {
                    cond,
                    then_block: body_block,
                    else_block: end_block,
                });
            }
            // An absent condition always takes the true edge.
            None => self.builder.terminate(Terminator::Br(body_block)),
        }

        self.builder.set_current(body_block);
        self.lower_block(&for_stmt.body);
        if !self.builder.is_terminated() {
            if let Some(update) = &for_stmt.update {
                self.lower_assign(update);
            }
            self.builder.terminate(Terminator::Br(cond_block));
        }

        self.builder.set_current(end_block);
    }

    fn lower_output(&mut self, output: &OutputStmt) {
        for arg in &output.args {
            let (value, type_) = self.lower_expr(arg.expr());
            self.emit_print(value, type_);
        }

        if output.newline {
            let newline = self
                .builder
                .emit_value(Op::ConstStr(String::from("\n")), Type::Str);
            self.builder.emit(Op::PrintStr(newline));
        }
    }

    fn lower_input(&mut self, input: &InputStmt) {
        for arg in &input.args {
            match arg {
                IoArg::Plain(expr) => {
                    // Prompts are printed before reading.
                    let (value, type_) = self.lower_expr(expr);
                    self.emit_print(value, type_);
                }
                IoArg::Interpolated(expr) => {
                    if let Expr::VarRef(var_ref) = expr {
                        let (place, type_) = self.resolve(&var_ref.name);
                        match type_ {
                            Type::Int => self.builder.emit(Op::ReadInt(place)),
                            Type::Real => self.builder.emit(Op::ReadReal(place)),
                            Type::Str => self.builder.emit(Op::ReadStr(place)),
                            // No scan verb exists for bool; the target is
                            // left untouched.
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    fn lower_expr(&mut self, expr: &Expr) -> (ValueId, Type) {
        match expr {
            Expr::Literal(literal) => {
                let value = self.literal_value(&literal.value, literal.type_);
                (value, literal.type_)
            }
            Expr::VarRef(var_ref) => {
                let (place, type_) = self.resolve(&var_ref.name);
                let value = self.builder.emit_value(Op::Load(place), type_);
                (value, type_)
            }
            Expr::Binary(binary) => self.lower_binary(binary),
            Expr::Unary(unary) => {
                let (operand, type_) = self.lower_expr(&unary.operand);
                let value = self.builder.emit_value(
                    Op::Unary {
                        op: unary.operator,
                        type_,
                        operand,
                    },
                    type_,
                );
                (value, type_)
            }
            Expr::Call(call) => self.lower_call(call),
        }
    }

    fn lower_binary(&mut self, binary: &BinaryExpr) -> (ValueId, Type) {
        let (mut left, left_type) = self.lower_expr(&binary.left);
        let (mut right, right_type) = self.lower_expr(&binary.right);

        if left_type == Type::Str && right_type == Type::Str && binary.operator == BinaryOp::Add {
            return (self.lower_concat(left, right), Type::Str);
        }

        // Balance mixed int/real operands with an explicit widening.
        let mut operand_type = left_type;
        if left_type == Type::Real || right_type == Type::Real {
            if left_type == Type::Int {
                left = self.builder.emit_value(Op::IntToReal(left), Type::Real);
            }
            if right_type == Type::Int {
                right = self.builder.emit_value(Op::IntToReal(right), Type::Real);
            }
            operand_type = Type::Real;
        }

        let result_type = if binary.operator.is_comparison() {
            Type::Bool
        } else {
            operand_type
        };

        let value = self.builder.emit_value(
            Op::Binary {
                op: binary.operator,
                type_: operand_type,
                left,
                right,
            },
            result_type,
        );
        (value, result_type)
    }

    /// String `+` lowers to runtime primitives:
    /// `alloc(len(a) + len(b) + 1)`, copy the left side in, append the
    /// right.
    fn lower_concat(&mut self, left: ValueId, right: ValueId) -> ValueId {
        let left_len = self.builder.emit_value(Op::StrLen(left), Type::Int);
        let right_len = self.builder.emit_value(Op::StrLen(right), Type::Int);
        let sum = self.builder.emit_value(
            Op::Binary {
                op: BinaryOp::Add,
                type_: Type::Int,
                left: left_len,
                right: right_len,
            },
            Type::Int,
        );
        let one = self.builder.emit_value(Op::ConstInt(1), Type::Int);
        let total = self.builder.emit_value(
            Op::Binary {
                op: BinaryOp::Add,
                type_: Type::Int,
                left: sum,
                right: one,
            },
            Type::Int,
        );
        let buffer = self.builder.emit_value(Op::StrAlloc(total), Type::Str);
        self.builder.emit(Op::StrCopy {
            dest: buffer,
            src: left,
        });
        self.builder.emit(Op::StrAppend {
            dest: buffer,
            src: right,
        });
        buffer
    }

    fn lower_call(&mut self, call: &FuncCallExpr) -> (ValueId, Type) {
        let (param_types, return_type) = self.funcs[&call.name].clone();
        let args = self.lower_call_args(&call.args, &param_types);
        let value = self.builder.emit_value(
            Op::Call {
                name: call.name.clone(),
                args,
            },
            return_type,
        );
        (value, return_type)
    }

    fn lower_call_args(&mut self, args: &[Expr], param_types: &[Type]) -> Vec<ValueId> {
        args.iter()
            .zip(param_types)
            .map(|(arg, &param_type)| {
                let (value, type_) = self.lower_expr(arg);
                self.coerce(value, type_, param_type)
            })
            .collect()
    }

    /// Inserts the int→real widening when the destination requires it; no
    /// other implicit conversion is ever inserted.
    fn coerce(&mut self, value: ValueId, from: Type, to: Type) -> ValueId {
        if to == Type::Real && from == Type::Int {
            self.builder.emit_value(Op::IntToReal(value), Type::Real)
        } else {
            value
        }
    }

    fn emit_print(&mut self, value: ValueId, type_: Type) {
        match type_ {
            Type::Int => self.builder.emit(Op::PrintInt(value)),
            Type::Real => self.builder.emit(Op::PrintReal(value)),
            Type::Bool => self.builder.emit(Op::PrintBool(value)),
            Type::Str => self.builder.emit(Op::PrintStr(value)),
            Type::Void => {}
        }
    }

    fn literal_value(&mut self, value: &LiteralValue, type_: Type) -> ValueId {
        let op = match value {
            LiteralValue::Int(value) => Op::ConstInt(*value),
            LiteralValue::Real(value) => Op::ConstReal(*value),
            LiteralValue::Bool(value) => Op::ConstBool(*value),
            LiteralValue::Str(value) => Op::ConstStr(value.clone()),
        };
        self.builder.emit_value(op, type_)
    }

    fn zero_value(&mut self, type_: Type) -> ValueId {
        let op = match type_ {
            Type::Real => Op::ConstReal(0.0),
            Type::Bool => Op::ConstBool(false),
            Type::Str => Op::ConstStr(String::new()),
            _ => Op::ConstInt(0),
        };
        self.builder.emit_value(op, type_)
    }

    fn resolve(&self, name: &str) -> (Place, Type) {
        if let Some(&(slot, type_)) = self.locals.get(name) {
            return (Place::Slot(slot), type_);
        }
        let type_ = self.globals[name];
        (Place::Global(name.to_string()), type_)
    }
}
