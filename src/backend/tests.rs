//! Unit tests for LLVM emission.

use inkwell::context::Context;

use crate::{
    cfg::lower::lower, lexer::lexer::tokenize, parser::parser::parse, sema::analyzer::analyze,
};

use super::codegen::{codegen, Codegen};

fn compile<'a>(source: &str, context: &'a Context) -> Codegen<'a> {
    let tokens = tokenize(source.to_string()).unwrap();
    let program = parse(tokens).unwrap();
    analyze(&program).unwrap();
    let cfg = lower(&program);
    codegen(&cfg, context, "test")
}

fn compile_to_ir(source: &str) -> String {
    let context = Context::create();
    let gen = compile(source, &context);
    assert!(
        gen.module.verify().is_ok(),
        "module failed verification:\n{}",
        gen.module.print_to_string().to_string()
    );
    gen.module.print_to_string().to_string()
}

#[test]
fn test_codegen_empty_main() {
    let ir = compile_to_ir("func void -> main() {}");

    assert!(ir.contains("define void @main()"));
    assert!(ir.contains("declare i32 @printf(i8*, ...)"));
}

#[test]
fn test_codegen_arithmetic_and_output() {
    let ir = compile_to_ir("func void -> main() { var x: int; x = 2 + 3 * 4; outl x; }");

    assert!(ir.contains("mul"));
    assert!(ir.contains("add"));
    assert!(ir.contains("@printf"));
}

#[test]
fn test_codegen_function_signature() {
    let ir = compile_to_ir(
        "func int -> add(a: int, b: int) { return a + b; } func void -> main() { outl add(1, 2); }",
    );

    assert!(ir.contains("define i32 @add(i32"));
    assert!(ir.contains("call i32 @add"));
}

#[test]
fn test_codegen_real_uses_double() {
    let ir = compile_to_ir("func void -> main() { var y: real; y = 1.5; out y; }");

    assert!(ir.contains("double"));
    assert!(ir.contains("1.5"));
}

#[test]
fn test_codegen_int_to_real_conversion() {
    let ir = compile_to_ir("func void -> main() { var y: real; y = 2; }");

    assert!(ir.contains("sitofp"));
}

#[test]
fn test_codegen_globals() {
    let ir = compile_to_ir("var c = 3; var flag: bool; func void -> main() { outl c; }");

    assert!(ir.contains("@c = global i32 3"));
    assert!(ir.contains("@flag = global i1 false"));
}

#[test]
fn test_codegen_conditional_branches() {
    let source = "func void -> main() { var x: int; if x < 1 { x = 1; } else { x = 2; } outl x; }";
    let ir = compile_to_ir(source);

    assert!(ir.contains("br i1"));
    assert!(ir.contains("if_merge"));
}

#[test]
fn test_codegen_loop_branches_back() {
    let source = "func void -> main() { var i: int; while i < 3 { i = i + 1; } }";
    let ir = compile_to_ir(source);

    assert!(ir.contains("while_cond"));
    assert!(ir.contains("while_body"));
    assert!(ir.contains("icmp slt"));
}

#[test]
fn test_codegen_string_concat_calls_runtime() {
    let source = "func void -> main() { var s: string; s = \"a\" + \"b\"; outl s; }";
    let ir = compile_to_ir(source);

    assert!(ir.contains("call i64 @strlen"));
    assert!(ir.contains("call i8* @malloc"));
    assert!(ir.contains("call i8* @strcpy"));
    assert!(ir.contains("call i8* @strcat"));
}

#[test]
fn test_codegen_string_equality_uses_strcmp() {
    let source =
        "func void -> main() { var s = \"a\"; if s == \"a\" { outl \"eq\"; } }";
    let ir = compile_to_ir(source);

    assert!(ir.contains("call i32 @strcmp"));
}

#[test]
fn test_codegen_input_calls_scanf() {
    let source = "func void -> main() { var n: int; in(\"n: \", #(n)); }";
    let ir = compile_to_ir(source);

    assert!(ir.contains("call i32 (i8*, ...) @scanf"));
}

#[test]
fn test_codegen_string_read_allocates_buffer() {
    let source = "func void -> main() { var s: string; in(#(s)); }";
    let ir = compile_to_ir(source);

    assert!(ir.contains("call i8* @malloc(i64 256)"));
}

#[test]
fn test_codegen_bool_printed_as_int() {
    let source = "func void -> main() { outl true; }";
    let ir = compile_to_ir(source);

    assert!(ir.contains("zext i1"));
}

#[test]
fn test_codegen_non_void_fall_through_is_unreachable() {
    let source =
        "func int -> f() { if true { return 1; } else { return 2; } } func void -> main() {}";
    let ir = compile_to_ir(source);

    assert!(ir.contains("unreachable"));
}
