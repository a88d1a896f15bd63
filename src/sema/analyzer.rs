use crate::{
    ast::{
        ast::{Decl, FuncDef, Program},
        expressions::{Expr, FuncCallExpr, UnaryOp},
        statements::{
            AssignStmt, Block, ForStmt, IfStmt, InputStmt, IoArg, OutputStmt, ProcCallStmt,
            ReturnStmt, Stmt, WhileStmt,
        },
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    reachability::block_guarantees_return,
    symbol_table::{FuncSymbol, Symbol, SymbolTable, VarSymbol},
    type_rules::{binary_result, is_compatible, unary_result},
};

/// Analysis context: the scope stack plus the return type of the function
/// whose body is currently being checked.
pub struct Analyzer {
    symbols: SymbolTable,
    current_return: Type,
}

/// Verifies the whole program. On success the AST is guaranteed well-typed
/// and well-scoped; on the first violation analysis stops and the error is
/// returned.
pub fn analyze(program: &Program) -> Result<(), Error> {
    let mut analyzer = Analyzer {
        symbols: SymbolTable::new(),
        current_return: Type::Void,
    };

    analyzer.collect_signatures(program)?;
    analyzer.check_main(program)?;

    for decl in &program.decls {
        if let Decl::Func(func) = decl {
            analyzer.check_function(func)?;
        }
    }

    Ok(())
}

impl Analyzer {
    /// Signature pass: declare every top-level function and variable in the
    /// global scope before any body is checked, so functions may call
    /// forward.
    fn collect_signatures(&mut self, program: &Program) -> Result<(), Error> {
        for decl in &program.decls {
            match decl {
                Decl::Func(func) => {
                    let symbol = Symbol::Func(FuncSymbol {
                        name: func.name.clone(),
                        param_types: func.params.iter().map(|param| param.type_).collect(),
                        return_type: func.return_type,
                    });
                    self.declare(symbol, func.span.start)?;
                }
                Decl::Var(decl) => {
                    for name in &decl.names {
                        let symbol = Symbol::Var(VarSymbol {
                            name: name.clone(),
                            type_: decl.type_,
                        });
                        self.declare(symbol, decl.span.start)?;
                    }
                }
                Decl::VarInit(init) => {
                    let symbol = Symbol::Var(VarSymbol {
                        name: init.name.clone(),
                        type_: init.value.type_,
                    });
                    self.declare(symbol, init.span.start)?;
                }
            }
        }

        Ok(())
    }

    /// The program must define `func void -> main()` exactly.
    fn check_main(&self, program: &Program) -> Result<(), Error> {
        let main = program.decls.iter().find_map(|decl| match decl {
            Decl::Func(func) if func.name == "main" => Some(func),
            _ => None,
        });

        let main = match main {
            Some(main) => main,
            None => return Err(Error::new(ErrorImpl::MissingMain, Position::null())),
        };

        if main.return_type != Type::Void {
            return Err(Error::new(
                ErrorImpl::InvalidMainSignature {
                    message: format!("declared return type is `{}`", main.return_type),
                },
                main.span.start,
            ));
        }

        if !main.params.is_empty() {
            return Err(Error::new(
                ErrorImpl::InvalidMainSignature {
                    message: format!("takes {} parameter(s)", main.params.len()),
                },
                main.span.start,
            ));
        }

        Ok(())
    }

    fn check_function(&mut self, func: &FuncDef) -> Result<(), Error> {
        self.symbols.enter_scope();
        self.current_return = func.return_type;

        // The scope is popped on every exit path, error paths included.
        let result = self.check_function_inner(func);
        self.symbols.exit_scope();
        result
    }

    fn check_function_inner(&mut self, func: &FuncDef) -> Result<(), Error> {
        for param in &func.params {
            let symbol = Symbol::Var(VarSymbol {
                name: param.name.clone(),
                type_: param.type_,
            });
            self.declare(symbol, param.span.start)?;
        }

        self.check_block(&func.body)?;

        if func.return_type != Type::Void && !block_guarantees_return(&func.body) {
            return Err(Error::new(
                ErrorImpl::NonExhaustiveReturn {
                    name: func.name.clone(),
                },
                func.span.start,
            ));
        }

        Ok(())
    }

    /// Declares into the innermost scope, rejecting any name that already
    /// resolves anywhere up the stack (shadowing is never permitted).
    fn declare(&mut self, symbol: Symbol, position: Position) -> Result<(), Error> {
        if self.symbols.lookup(symbol.name()).is_some() {
            return Err(Error::new(
                ErrorImpl::Redeclaration {
                    name: symbol.name().to_string(),
                },
                position,
            ));
        }

        self.symbols.insert(symbol);
        Ok(())
    }

    fn check_block(&mut self, block: &Block) -> Result<(), Error> {
        for stmt in &block.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Block(block) => self.check_block(block),
            Stmt::VarDecl(decl) => {
                for name in &decl.names {
                    let symbol = Symbol::Var(VarSymbol {
                        name: name.clone(),
                        type_: decl.type_,
                    });
                    self.declare(symbol, decl.span.start)?;
                }
                Ok(())
            }
            Stmt::VarInit(init) => {
                let symbol = Symbol::Var(VarSymbol {
                    name: init.name.clone(),
                    type_: init.value.type_,
                });
                self.declare(symbol, init.span.start)
            }
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::ProcCall(call) => self.check_proc_call(call),
            Stmt::Return(ret) => self.check_return(ret),
            Stmt::If(if_stmt) => self.check_if(if_stmt),
            Stmt::While(while_stmt) => self.check_while(while_stmt),
            Stmt::For(for_stmt) => self.check_for(for_stmt),
            Stmt::Output(output) => self.check_output(output),
            Stmt::Input(input) => self.check_input(input),
        }
    }

    fn check_assign(&mut self, assign: &AssignStmt) -> Result<(), Error> {
        let target_type = self.resolve_var(&assign.name, assign.span.start)?;
        let value_type = self.check_expr(&assign.value)?;

        if !is_compatible(target_type, value_type) {
            return Err(Error::new(
                ErrorImpl::TypeMismatch {
                    expected: target_type.to_string(),
                    received: value_type.to_string(),
                    site: String::from("assignment"),
                },
                assign.value.span().start,
            ));
        }

        Ok(())
    }

    /// A bare call statement must invoke a void function; discarding a
    /// non-void result is rejected to force explicit use of results.
    fn check_proc_call(&mut self, call: &ProcCallStmt) -> Result<(), Error> {
        let func = self.resolve_func(&call.name, call.span.start)?.clone();

        if func.return_type != Type::Void {
            return Err(Error::new(
                ErrorImpl::VoidValueUsed {
                    name: call.name.clone(),
                },
                call.span.start,
            ));
        }

        self.check_call_args(&call.name, &func.param_types, &call.args, call.span.start)
    }

    fn check_return(&mut self, ret: &ReturnStmt) -> Result<(), Error> {
        match &ret.value {
            Some(value) => {
                let value_type = self.check_expr(value)?;

                if self.current_return == Type::Void {
                    return Err(Error::new(
                        ErrorImpl::TypeMismatch {
                            expected: Type::Void.to_string(),
                            received: value_type.to_string(),
                            site: String::from("return"),
                        },
                        value.span().start,
                    ));
                }

                if !is_compatible(self.current_return, value_type) {
                    return Err(Error::new(
                        ErrorImpl::TypeMismatch {
                            expected: self.current_return.to_string(),
                            received: value_type.to_string(),
                            site: String::from("return"),
                        },
                        value.span().start,
                    ));
                }

                Ok(())
            }
            None => {
                if self.current_return != Type::Void {
                    return Err(Error::new(
                        ErrorImpl::TypeMismatch {
                            expected: self.current_return.to_string(),
                            received: Type::Void.to_string(),
                            site: String::from("return"),
                        },
                        ret.span.start,
                    ));
                }

                Ok(())
            }
        }
    }

    fn check_if(&mut self, if_stmt: &IfStmt) -> Result<(), Error> {
        self.check_condition(&if_stmt.condition)?;
        self.check_block(&if_stmt.then_block)?;

        for elif in &if_stmt.elifs {
            self.check_condition(&elif.condition)?;
            self.check_block(&elif.block)?;
        }

        if let Some(else_block) = &if_stmt.else_block {
            self.check_block(else_block)?;
        }

        Ok(())
    }

    fn check_while(&mut self, while_stmt: &WhileStmt) -> Result<(), Error> {
        self.check_condition(&while_stmt.condition)?;
        self.check_block(&while_stmt.body)
    }

    fn check_for(&mut self, for_stmt: &ForStmt) -> Result<(), Error> {
        if let Some(init) = &for_stmt.init {
            self.check_assign(init)?;
        }

        // An omitted condition is always-true and needs no check.
        if let Some(condition) = &for_stmt.condition {
            self.check_condition(condition)?;
        }

        if let Some(update) = &for_stmt.update {
            self.check_assign(update)?;
        }

        self.check_block(&for_stmt.body)
    }

    /// Output arguments may be of any type; they only need to be
    /// well-typed.
    fn check_output(&mut self, output: &OutputStmt) -> Result<(), Error> {
        for arg in &output.args {
            self.check_expr(arg.expr())?;
        }
        Ok(())
    }

    /// Plain input arguments are prompts and must be strings; interpolated
    /// arguments are read targets and must name a declared variable.
    fn check_input(&mut self, input: &InputStmt) -> Result<(), Error> {
        for arg in &input.args {
            match arg {
                IoArg::Plain(expr) => {
                    let type_ = self.check_expr(expr)?;
                    if type_ != Type::Str {
                        return Err(Error::new(
                            ErrorImpl::InvalidPromptType {
                                received: type_.to_string(),
                            },
                            expr.span().start,
                        ));
                    }
                }
                IoArg::Interpolated(expr) => match expr {
                    Expr::VarRef(var_ref) => match self.symbols.lookup(&var_ref.name) {
                        Some(Symbol::Var(_)) => {}
                        _ => {
                            return Err(Error::new(
                                ErrorImpl::InvalidInputTarget,
                                var_ref.span.start,
                            ))
                        }
                    },
                    _ => return Err(Error::new(ErrorImpl::InvalidInputTarget, expr.span().start)),
                },
            }
        }

        Ok(())
    }

    fn check_condition(&mut self, condition: &Expr) -> Result<(), Error> {
        let type_ = self.check_expr(condition)?;
        if type_ != Type::Bool {
            return Err(Error::new(
                ErrorImpl::TypeMismatch {
                    expected: Type::Bool.to_string(),
                    received: type_.to_string(),
                    site: String::from("condition"),
                },
                condition.span().start,
            ));
        }
        Ok(())
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<Type, Error> {
        match expr {
            Expr::Literal(literal) => Ok(literal.type_),
            Expr::VarRef(var_ref) => self.resolve_var(&var_ref.name, var_ref.span.start),
            Expr::Binary(binary) => {
                let left = self.check_expr(&binary.left)?;
                let right = self.check_expr(&binary.right)?;

                match binary_result(binary.operator, left, right) {
                    Some(result) => Ok(result),
                    None => Err(Error::new(
                        ErrorImpl::InvalidOperandTypes {
                            operator: binary.operator.to_string(),
                            left: left.to_string(),
                            right: right.to_string(),
                        },
                        binary.span.start,
                    )),
                }
            }
            Expr::Unary(unary) => {
                let operand = self.check_expr(&unary.operand)?;

                match unary_result(unary.operator, operand) {
                    Some(result) => Ok(result),
                    None => {
                        let expected = match unary.operator {
                            UnaryOp::Neg => "int or real",
                            UnaryOp::Not => "bool",
                        };
                        Err(Error::new(
                            ErrorImpl::TypeMismatch {
                                expected: expected.to_string(),
                                received: operand.to_string(),
                                site: format!("unary `{}`", unary.operator),
                            },
                            unary.span.start,
                        ))
                    }
                }
            }
            Expr::Call(call) => self.check_call_expr(call),
        }
    }

    /// A call in expression position must produce a value.
    fn check_call_expr(&mut self, call: &FuncCallExpr) -> Result<Type, Error> {
        let func = self.resolve_func(&call.name, call.span.start)?.clone();

        if func.return_type == Type::Void {
            return Err(Error::new(
                ErrorImpl::VoidValueUsed {
                    name: call.name.clone(),
                },
                call.span.start,
            ));
        }

        self.check_call_args(&call.name, &func.param_types, &call.args, call.span.start)?;
        Ok(func.return_type)
    }

    fn check_call_args(
        &mut self,
        name: &str,
        param_types: &[Type],
        args: &[Expr],
        position: Position,
    ) -> Result<(), Error> {
        if args.len() != param_types.len() {
            return Err(Error::new(
                ErrorImpl::ArityMismatch {
                    name: name.to_string(),
                    expected: param_types.len(),
                    received: args.len(),
                },
                position,
            ));
        }

        for (arg, &param_type) in args.iter().zip(param_types) {
            let arg_type = self.check_expr(arg)?;
            if !is_compatible(param_type, arg_type) {
                return Err(Error::new(
                    ErrorImpl::TypeMismatch {
                        expected: param_type.to_string(),
                        received: arg_type.to_string(),
                        site: format!("argument to `{}`", name),
                    },
                    arg.span().start,
                ));
            }
        }

        Ok(())
    }

    fn resolve_var(&self, name: &str, position: Position) -> Result<Type, Error> {
        match self.symbols.lookup(name) {
            Some(Symbol::Var(var)) => Ok(var.type_),
            Some(Symbol::Func(_)) => Err(Error::new(
                ErrorImpl::NotAVariable {
                    name: name.to_string(),
                },
                position,
            )),
            None => Err(Error::new(
                ErrorImpl::UndeclaredIdentifier {
                    name: name.to_string(),
                },
                position,
            )),
        }
    }

    fn resolve_func(&self, name: &str, position: Position) -> Result<&FuncSymbol, Error> {
        match self.symbols.lookup(name) {
            Some(Symbol::Func(func)) => Ok(func),
            Some(Symbol::Var(_)) => Err(Error::new(
                ErrorImpl::NotAFunction {
                    name: name.to_string(),
                },
                position,
            )),
            None => Err(Error::new(
                ErrorImpl::UndeclaredIdentifier {
                    name: name.to_string(),
                },
                position,
            )),
        }
    }
}
