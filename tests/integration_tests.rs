//! Integration tests for end-to-end compilation.
//!
//! These tests drive the complete pipeline from source text through
//! tokenization, parsing, semantic analysis, lowering, and LLVM IR
//! generation, plus the error reporting contract of each front-end phase.

use gristc::{
    backend::codegen::codegen,
    cfg::lower::lower,
    errors::errors::Error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    sema::analyzer::analyze,
};
use inkwell::context::Context;

fn compile_to_ir(source: &str) -> Result<String, Error> {
    let tokens = tokenize(source.to_string())?;
    let program = parse(tokens)?;
    analyze(&program)?;
    let cfg = lower(&program);

    let context = Context::create();
    let compiled = codegen(&cfg, &context, "test.gr");
    assert!(
        compiled.module.verify().is_ok(),
        "module failed verification:\n{}",
        compiled.module.print_to_string().to_string()
    );
    Ok(compiled.module.print_to_string().to_string())
}

#[test]
fn test_compile_hello_world() {
    let ir = compile_to_ir("func void -> main() { outl \"Hello, world!\"; }").unwrap();

    assert!(ir.contains("define void @main()"));
    assert!(ir.contains("Hello, world!"));
}

#[test]
fn test_compile_functions_and_calls() {
    let source = "
        func int -> add(a: int, b: int) {
            return a + b;
        }

        func void -> main() {
            var total: int;
            total = add(2, 3);
            outl(\"total: \", #(total));
        }
    ";
    let ir = compile_to_ir(source).unwrap();

    assert!(ir.contains("define i32 @add(i32"));
    assert!(ir.contains("call i32 @add"));
}

#[test]
fn test_compile_control_flow() {
    let source = "
        func int -> sign(x: int) {
            if x < 0 {
                return 0 - 1;
            } elif x == 0 {
                return 0;
            } else {
                return 1;
            }
        }

        func void -> main() {
            var i: int;
            for (i = 0; i < 10; i = i + 1) {
                outl sign(i - 5);
            }
            while i > 0 {
                i = i - 1;
            }
        }
    ";
    let ir = compile_to_ir(source).unwrap();

    assert!(ir.contains("if_merge"));
    assert!(ir.contains("for_cond"));
    assert!(ir.contains("while_cond"));
}

#[test]
fn test_compile_globals_and_coercion() {
    let source = "
        var counter: int;
        var scale = 2.5;

        func void -> main() {
            counter = counter + 1;
            scale = scale * counter;
            outl scale;
        }
    ";
    let ir = compile_to_ir(source).unwrap();

    assert!(ir.contains("@counter = global i32 0"));
    assert!(ir.contains("@scale = global double"));
    assert!(ir.contains("sitofp"));
}

#[test]
fn test_compile_string_handling() {
    let source = "
        func string -> greet(name: string) {
            return \"Hello, \" + name;
        }

        func void -> main() {
            var name: string;
            in(\"Name: \", #(name));
            outl greet(name);
        }
    ";
    let ir = compile_to_ir(source).unwrap();

    assert!(ir.contains("@strlen"));
    assert!(ir.contains("@strcat"));
    assert!(ir.contains("@scanf"));
}

#[test]
fn test_lexer_error_is_reported() {
    let error = compile_to_ir("func void -> main() { var x = @; }").unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_parser_error_is_reported() {
    let error = compile_to_ir("func void -> main() { var x: int }").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedToken");
}

#[test]
fn test_type_error_is_reported() {
    let error = compile_to_ir("func void -> main() { var x: int; x = 2.5; }").unwrap_err();
    assert_eq!(error.get_error_name(), "TypeMismatch");
}

#[test]
fn test_missing_main_is_reported() {
    let error = compile_to_ir("func void -> helper() {}").unwrap_err();
    assert_eq!(error.get_error_name(), "MissingMain");
}

#[test]
fn test_missing_return_is_reported() {
    let source = "
        func int -> f(x: int) {
            while x < 10 {
                return 1;
            }
        }

        func void -> main() {}
    ";
    let error = compile_to_ir(source).unwrap_err();
    assert_eq!(error.get_error_name(), "NonExhaustiveReturn");
}

#[test]
fn test_first_error_wins() {
    // Two errors in source order; only the first is reported.
    let source = "func void -> main() { y = 1; var x: int; x = true; }";
    let error = compile_to_ir(source).unwrap_err();
    assert_eq!(error.get_error_name(), "UndeclaredIdentifier");
}
