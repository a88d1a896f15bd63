//! Unit tests for the parser module.

use crate::{
    ast::{
        ast::{Decl, Program},
        expressions::{BinaryOp, Expr, LiteralValue, UnaryOp},
        statements::{IoArg, Stmt},
        types::Type,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

use super::parser::parse;

fn parse_source(source: &str) -> Result<Program, Error> {
    parse(tokenize(source.to_string()).unwrap())
}

#[test]
fn test_parse_empty_main() {
    let program = parse_source("func void -> main() {}").unwrap();

    assert_eq!(program.decls.len(), 1);
    match &program.decls[0] {
        Decl::Func(func) => {
            assert_eq!(func.name, "main");
            assert_eq!(func.return_type, Type::Void);
            assert!(func.params.is_empty());
            assert!(func.body.stmts.is_empty());
        }
        _ => panic!("expected a function declaration"),
    }
}

#[test]
fn test_parse_function_with_params() {
    let program = parse_source("func int -> add(a: int, b: int) { return a + b; }").unwrap();

    match &program.decls[0] {
        Decl::Func(func) => {
            assert_eq!(func.name, "add");
            assert_eq!(func.return_type, Type::Int);
            assert_eq!(func.params.len(), 2);
            assert_eq!(func.params[0].name, "a");
            assert_eq!(func.params[0].type_, Type::Int);
            assert_eq!(func.params[1].name, "b");
            assert_eq!(func.body.stmts.len(), 1);
        }
        _ => panic!("expected a function declaration"),
    }
}

#[test]
fn test_parse_var_decl_multiple_names() {
    let program = parse_source("var x, y, z: real;").unwrap();

    match &program.decls[0] {
        Decl::Var(decl) => {
            assert_eq!(decl.type_, Type::Real);
            assert_eq!(decl.names, vec!["x", "y", "z"]);
        }
        _ => panic!("expected a variable declaration"),
    }
}

#[test]
fn test_parse_var_init_infers_type() {
    let program = parse_source("var x = 5; var y = 2.5; var s = \"hi\"; var b = true;").unwrap();

    let types: Vec<Type> = program
        .decls
        .iter()
        .map(|decl| match decl {
            Decl::VarInit(init) => init.value.type_,
            _ => panic!("expected an initialized variable"),
        })
        .collect();

    assert_eq!(types, vec![Type::Int, Type::Real, Type::Str, Type::Bool]);
}

#[test]
fn test_parse_var_init_negative_number() {
    let program = parse_source("var x = -3;").unwrap();

    match &program.decls[0] {
        Decl::VarInit(init) => {
            assert_eq!(init.value.value, LiteralValue::Int(-3));
        }
        _ => panic!("expected an initialized variable"),
    }
}

#[test]
fn test_parse_precedence() {
    let program = parse_source("func void -> main() { x = 1 + 2 * 3; }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    let assign = match &func.body.stmts[0] {
        Stmt::Assign(assign) => assign,
        _ => panic!("expected an assignment"),
    };

    // 1 + (2 * 3)
    match &assign.value {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOp::Add);
            match &binary.right {
                Expr::Binary(inner) => assert_eq!(inner.operator, BinaryOp::Mul),
                _ => panic!("expected a nested multiplication"),
            }
        }
        _ => panic!("expected a binary expression"),
    }
}

#[test]
fn test_parse_left_associativity() {
    let program = parse_source("func void -> main() { x = 10 - 4 - 3; }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    let assign = match &func.body.stmts[0] {
        Stmt::Assign(assign) => assign,
        _ => panic!("expected an assignment"),
    };

    // (10 - 4) - 3
    match &assign.value {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOp::Sub);
            match &binary.left {
                Expr::Binary(inner) => assert_eq!(inner.operator, BinaryOp::Sub),
                _ => panic!("expected a nested subtraction"),
            }
        }
        _ => panic!("expected a binary expression"),
    }
}

#[test]
fn test_parse_unary_binds_tighter_than_binary() {
    let program = parse_source("func void -> main() { x = -a + b; }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    let assign = match &func.body.stmts[0] {
        Stmt::Assign(assign) => assign,
        _ => panic!("expected an assignment"),
    };

    // (-a) + b
    match &assign.value {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOp::Add);
            match &binary.left {
                Expr::Unary(unary) => assert_eq!(unary.operator, UnaryOp::Neg),
                _ => panic!("expected a unary negation"),
            }
        }
        _ => panic!("expected a binary expression"),
    }
}

#[test]
fn test_parse_if_elif_else() {
    let source = "func void -> main() { if x < 0 { y = 1; } elif x == 0 { y = 2; } elif x < 10 { y = 3; } else { y = 4; } }";
    let program = parse_source(source).unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::If(if_stmt) => {
            assert_eq!(if_stmt.elifs.len(), 2);
            assert!(if_stmt.else_block.is_some());
        }
        _ => panic!("expected an if statement"),
    }
}

#[test]
fn test_parse_while() {
    let program = parse_source("func void -> main() { while x < 10 { x = x + 1; } }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::While(while_stmt) => {
            assert_eq!(while_stmt.body.stmts.len(), 1);
        }
        _ => panic!("expected a while statement"),
    }
}

#[test]
fn test_parse_for_full_header() {
    let program =
        parse_source("func void -> main() { for (i = 0; i < 10; i = i + 1) { out i; } }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::For(for_stmt) => {
            assert!(for_stmt.init.is_some());
            assert!(for_stmt.condition.is_some());
            assert!(for_stmt.update.is_some());
        }
        _ => panic!("expected a for statement"),
    }
}

#[test]
fn test_parse_for_empty_header() {
    let program = parse_source("func void -> main() { for (;;) { x = 1; } }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::For(for_stmt) => {
            assert!(for_stmt.init.is_none());
            assert!(for_stmt.condition.is_none());
            assert!(for_stmt.update.is_none());
        }
        _ => panic!("expected a for statement"),
    }
}

#[test]
fn test_parse_output_with_interpolation() {
    let program =
        parse_source("func void -> main() { outl(\"x is \", #(x + 1)); }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::Output(output) => {
            assert!(output.newline);
            assert_eq!(output.args.len(), 2);
            assert!(matches!(output.args[0], IoArg::Plain(_)));
            assert!(matches!(output.args[1], IoArg::Interpolated(_)));
        }
        _ => panic!("expected an output statement"),
    }
}

#[test]
fn test_parse_output_bare_argument() {
    let program = parse_source("func void -> main() { out x; outl; }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::Output(output) => {
            assert!(!output.newline);
            assert_eq!(output.args.len(), 1);
        }
        _ => panic!("expected an output statement"),
    }
    match &func.body.stmts[1] {
        Stmt::Output(output) => {
            assert!(output.newline);
            assert!(output.args.is_empty());
        }
        _ => panic!("expected an output statement"),
    }
}

#[test]
fn test_parse_output_bare_list() {
    let program = parse_source("func void -> main() { outl \"x: \", #(x); }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::Output(output) => {
            assert_eq!(output.args.len(), 2);
            assert!(matches!(output.args[1], IoArg::Interpolated(_)));
        }
        _ => panic!("expected an output statement"),
    }
}

#[test]
fn test_parse_input() {
    let program = parse_source("func void -> main() { in(\"age? \", #(age)); }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::Input(input) => {
            assert_eq!(input.args.len(), 2);
            assert!(matches!(input.args[0], IoArg::Plain(_)));
            assert!(matches!(input.args[1], IoArg::Interpolated(_)));
        }
        _ => panic!("expected an input statement"),
    }
}

#[test]
fn test_parse_proc_call_stmt() {
    let program = parse_source("func void -> main() { greet(\"world\", 3); }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    match &func.body.stmts[0] {
        Stmt::ProcCall(call) => {
            assert_eq!(call.name, "greet");
            assert_eq!(call.args.len(), 2);
        }
        _ => panic!("expected a procedure call"),
    }
}

#[test]
fn test_parse_call_in_expression() {
    let program = parse_source("func void -> main() { x = add(1, 2) * 3; }").unwrap();

    let func = match &program.decls[0] {
        Decl::Func(func) => func,
        _ => panic!("expected a function declaration"),
    };
    let assign = match &func.body.stmts[0] {
        Stmt::Assign(assign) => assign,
        _ => panic!("expected an assignment"),
    };
    match &assign.value {
        Expr::Binary(binary) => {
            assert!(matches!(binary.left, Expr::Call(_)));
        }
        _ => panic!("expected a binary expression"),
    }
}

#[test]
fn test_parse_missing_semicolon() {
    let result = parse_source("func void -> main() { x = 1 }");
    assert!(result.is_err());
}

#[test]
fn test_parse_unknown_type() {
    let result = parse_source("var x: quaternion;");
    assert!(result.is_err());
}

#[test]
fn test_parse_void_variable_rejected() {
    let result = parse_source("var x: void;");
    assert!(result.is_err());
}

#[test]
fn test_parse_top_level_statement_rejected() {
    let result = parse_source("x = 1;");
    assert!(result.is_err());
}
