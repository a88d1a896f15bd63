//! Unit tests for semantic analysis.

use crate::{
    ast::{
        expressions::{BinaryOp, UnaryOp},
        types::Type,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
    parser::parser::parse,
};

use super::{
    analyzer::analyze,
    reachability::block_guarantees_return,
    symbol_table::{Symbol, SymbolTable, VarSymbol},
    type_rules::{binary_result, is_compatible, unary_result},
};

fn analyze_source(source: &str) -> Result<(), Error> {
    let tokens = tokenize(source.to_string()).unwrap();
    let program = parse(tokens).unwrap();
    analyze(&program)
}

fn error_name(result: Result<(), Error>) -> String {
    result.unwrap_err().get_error_name().to_string()
}

fn var(name: &str) -> Symbol {
    Symbol::Var(VarSymbol {
        name: name.to_string(),
        type_: Type::Int,
    })
}

#[test]
fn test_symbol_table_scoped_lookup() {
    let mut table = SymbolTable::new();
    assert!(table.insert(var("g")));

    table.enter_scope();
    assert!(table.insert(var("l")));
    assert!(table.lookup("g").is_some());
    assert!(table.lookup("l").is_some());

    table.exit_scope();
    assert!(table.lookup("l").is_none());
    assert!(table.lookup("g").is_some());
}

#[test]
fn test_symbol_table_rejects_same_scope_duplicate() {
    let mut table = SymbolTable::new();
    assert!(table.insert(var("x")));
    assert!(!table.insert(var("x")));
}

#[test]
fn test_symbol_table_never_pops_global() {
    let mut table = SymbolTable::new();
    table.insert(var("g"));
    table.exit_scope();
    table.exit_scope();
    assert_eq!(table.depth(), 1);
    assert!(table.lookup("g").is_some());
}

#[test]
fn test_compatibility_is_one_directional() {
    assert!(is_compatible(Type::Real, Type::Int));
    assert!(!is_compatible(Type::Int, Type::Real));
    assert!(is_compatible(Type::Int, Type::Int));
    assert!(!is_compatible(Type::Str, Type::Int));
}

#[test]
fn test_binary_result_arithmetic() {
    assert_eq!(
        binary_result(BinaryOp::Add, Type::Int, Type::Int),
        Some(Type::Int)
    );
    assert_eq!(
        binary_result(BinaryOp::Mul, Type::Int, Type::Real),
        Some(Type::Real)
    );
    assert_eq!(
        binary_result(BinaryOp::Add, Type::Str, Type::Str),
        Some(Type::Str)
    );
    assert_eq!(binary_result(BinaryOp::Sub, Type::Str, Type::Str), None);
    assert_eq!(binary_result(BinaryOp::Add, Type::Bool, Type::Bool), None);
}

#[test]
fn test_binary_result_logical_and_comparison() {
    assert_eq!(
        binary_result(BinaryOp::And, Type::Bool, Type::Bool),
        Some(Type::Bool)
    );
    assert_eq!(binary_result(BinaryOp::Or, Type::Int, Type::Bool), None);
    assert_eq!(
        binary_result(BinaryOp::Eq, Type::Int, Type::Real),
        Some(Type::Bool)
    );
    assert_eq!(binary_result(BinaryOp::Eq, Type::Str, Type::Int), None);
    assert_eq!(
        binary_result(BinaryOp::Lt, Type::Real, Type::Int),
        Some(Type::Bool)
    );
    assert_eq!(binary_result(BinaryOp::Lt, Type::Str, Type::Str), None);
}

#[test]
fn test_unary_result() {
    assert_eq!(unary_result(UnaryOp::Neg, Type::Int), Some(Type::Int));
    assert_eq!(unary_result(UnaryOp::Neg, Type::Real), Some(Type::Real));
    assert_eq!(unary_result(UnaryOp::Neg, Type::Bool), None);
    assert_eq!(unary_result(UnaryOp::Not, Type::Bool), Some(Type::Bool));
    assert_eq!(unary_result(UnaryOp::Not, Type::Int), None);
}

#[test]
fn test_reachability_if_without_else() {
    let tokens =
        tokenize("func int -> f() { if true { return 1; } } func void -> main() {}".to_string())
            .unwrap();
    let program = parse(tokens).unwrap();
    let func = match &program.decls[0] {
        crate::ast::ast::Decl::Func(func) => func,
        _ => panic!("expected a function"),
    };
    assert!(!block_guarantees_return(&func.body));
}

#[test]
fn test_missing_main() {
    let result = analyze_source("func void -> helper() {}");
    assert_eq!(error_name(result), "MissingMain");
}

#[test]
fn test_main_must_be_void() {
    let result = analyze_source("func int -> main() { return 0; }");
    assert_eq!(error_name(result), "InvalidMainSignature");
}

#[test]
fn test_main_must_take_no_params() {
    let result = analyze_source("func void -> main(a: int) {}");
    assert_eq!(error_name(result), "InvalidMainSignature");
}

#[test]
fn test_valid_minimal_program() {
    assert!(analyze_source("func void -> main() {}").is_ok());
}

#[test]
fn test_global_redeclaration() {
    let result = analyze_source("var x: int; var x: real; func void -> main() {}");
    assert_eq!(error_name(result), "Redeclaration");
}

#[test]
fn test_parameter_collision() {
    let result = analyze_source("func void -> f(a: int, a: int) {} func void -> main() {}");
    assert_eq!(error_name(result), "Redeclaration");
}

#[test]
fn test_local_shadowing_global_rejected() {
    let result = analyze_source("var x: int; func void -> main() { var x: real; }");
    assert_eq!(error_name(result), "Redeclaration");
}

#[test]
fn test_local_shadowing_parameter_rejected() {
    let result = analyze_source("func void -> f(a: int) { var a: int; } func void -> main() {}");
    assert_eq!(error_name(result), "Redeclaration");
}

#[test]
fn test_locals_of_sibling_functions_do_not_collide() {
    let source = "func void -> f() { var t: int; } func void -> g() { var t: int; } func void -> main() {}";
    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_assignment_coercion_int_to_real() {
    assert!(analyze_source("func void -> main() { var y: real; y = 2; }").is_ok());
}

#[test]
fn test_assignment_real_to_int_rejected() {
    let result = analyze_source("func void -> main() { var x: int; x = 2.5; }");
    assert_eq!(error_name(result), "TypeMismatch");
}

#[test]
fn test_assignment_to_undeclared() {
    let result = analyze_source("func void -> main() { x = 1; }");
    assert_eq!(error_name(result), "UndeclaredIdentifier");
}

#[test]
fn test_assignment_to_function_rejected() {
    let result = analyze_source("func void -> f() {} func void -> main() { f = 1; }");
    assert_eq!(error_name(result), "NotAVariable");
}

#[test]
fn test_calling_a_variable_rejected() {
    let result = analyze_source("var x: int; func void -> main() { x(); }");
    assert_eq!(error_name(result), "NotAFunction");
}

#[test]
fn test_bare_call_of_non_void_rejected() {
    let result =
        analyze_source("func int -> f() { return 1; } func void -> main() { f(); }");
    assert_eq!(error_name(result), "VoidValueUsed");
}

#[test]
fn test_void_call_in_expression_rejected() {
    let result = analyze_source("func void -> f() {} func void -> main() { var x: int; x = f(); }");
    assert_eq!(error_name(result), "VoidValueUsed");
}

#[test]
fn test_call_arity_mismatch() {
    let result = analyze_source(
        "func int -> add(a: int, b: int) { return a + b; } func void -> main() { var x: int; x = add(1); }",
    );
    assert_eq!(error_name(result), "ArityMismatch");
}

#[test]
fn test_argument_coercion() {
    let source = "func real -> half(x: real) { return x / 2.0; } func void -> main() { var y: real; y = half(3); }";
    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_argument_real_to_int_rejected() {
    let source =
        "func int -> id(x: int) { return x; } func void -> main() { var y: int; y = id(2.5); }";
    assert_eq!(error_name(analyze_source(source)), "TypeMismatch");
}

#[test]
fn test_return_value_from_void_rejected() {
    let result = analyze_source("func void -> main() { return 1; }");
    assert_eq!(error_name(result), "TypeMismatch");
}

#[test]
fn test_return_without_value_from_non_void_rejected() {
    let result = analyze_source("func int -> f() { return; } func void -> main() {}");
    assert_eq!(error_name(result), "TypeMismatch");
}

#[test]
fn test_return_coercion() {
    assert!(analyze_source("func real -> f() { return 3; } func void -> main() {}").is_ok());
}

#[test]
fn test_non_bool_condition_rejected() {
    let result = analyze_source("func void -> main() { if 1 { out 1; } }");
    assert_eq!(error_name(result), "TypeMismatch");
}

#[test]
fn test_non_exhaustive_return_without_else() {
    let result = analyze_source("func int -> f() { if true { return 1; } } func void -> main() {}");
    assert_eq!(error_name(result), "NonExhaustiveReturn");
}

#[test]
fn test_exhaustive_return_with_else() {
    let source =
        "func int -> f() { if true { return 1; } else { return 0; } } func void -> main() {}";
    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_exhaustive_return_requires_all_elifs() {
    let source = "func int -> f(x: int) { if x < 0 { return 1; } elif x == 0 { out x; } else { return 0; } } func void -> main() {}";
    assert_eq!(error_name(analyze_source(source)), "NonExhaustiveReturn");
}

#[test]
fn test_loop_never_guarantees_return() {
    let source = "func int -> f() { while true { return 1; } } func void -> main() {}";
    assert_eq!(error_name(analyze_source(source)), "NonExhaustiveReturn");
}

#[test]
fn test_for_without_condition_skips_bool_check() {
    let source = "func void -> main() { var i: int; for (i = 0;;) { i = i + 1; } }";
    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_input_target_must_be_variable() {
    let result =
        analyze_source("func void -> main() { var x: int; in(\"x: \", #(5 + 3)); }");
    assert_eq!(error_name(result), "InvalidInputTarget");
}

#[test]
fn test_input_target_must_be_declared() {
    let result = analyze_source("func void -> main() { in(\"x: \", #(x)); }");
    assert_eq!(error_name(result), "InvalidInputTarget");
}

#[test]
fn test_input_with_string_target() {
    let source = "func void -> main() { var name: string; in(\"name: \", #(name)); }";
    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_input_prompt_must_be_string() {
    let result = analyze_source("func void -> main() { var x: int; in(42, #(x)); }");
    assert_eq!(error_name(result), "InvalidPromptType");
}

#[test]
fn test_output_accepts_any_type() {
    let source =
        "func void -> main() { var b: bool; outl(1, 2.5, \"s\", #(b), #(1 + 2)); }";
    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_string_concatenation_types() {
    let source = "func void -> main() { var s: string; s = \"a\" + \"b\"; }";
    assert!(analyze_source(source).is_ok());
}

#[test]
fn test_string_subtraction_rejected() {
    let result = analyze_source("func void -> main() { var s: string; s = \"a\" - \"b\"; }");
    assert_eq!(error_name(result), "InvalidOperandTypes");
}

#[test]
fn test_forward_call_resolves() {
    let source = "func void -> main() { later(); } func void -> later() {}";
    assert!(analyze_source(source).is_ok());
}
