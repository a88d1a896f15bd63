use std::{env, fs::read_to_string, path::PathBuf, process, time::Instant};

use gristc::{
    backend::{codegen::codegen, execution::run},
    cfg::lower::lower,
    display_error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    sema::analyzer::analyze,
};
use inkwell::context::Context;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut source_path: Option<String> = None;
    let mut output_path: Option<String> = None;
    let mut no_run = false;

    let mut index = 1;
    while index < args.len() {
        match args[index].as_str() {
            "-o" => {
                index += 1;
                if index >= args.len() {
                    eprintln!("Missing a path after `-o`");
                    process::exit(1);
                }
                output_path = Some(args[index].clone());
            }
            "--no-run" => no_run = true,
            other => {
                if source_path.is_some() {
                    eprintln!("Unexpected argument: `{}`", other);
                    process::exit(1);
                }
                source_path = Some(other.to_string());
            }
        }
        index += 1;
    }

    let source_path = match source_path {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: gristc <file.gr> [-o <out.ll>] [--no-run]");
            process::exit(1);
        }
    };

    let file_name = source_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("main.gr"));

    let file_contents = match read_to_string(&source_path) {
        Ok(contents) => contents,
        Err(error) => {
            eprintln!("Failed to read {}: {}", source_path.display(), error);
            process::exit(1);
        }
    };

    let start = Instant::now();

    let tokens = match tokenize(file_contents) {
        Ok(tokens) => tokens,
        Err(error) => {
            display_error(&error, &source_path);
            process::exit(1);
        }
    };

    println!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let program = match parse(tokens) {
        Ok(program) => program,
        Err(error) => {
            display_error(&error, &source_path);
            process::exit(1);
        }
    };

    println!("Parsed in {:?}", parse_start.elapsed());

    let analyze_start = Instant::now();
    if let Err(error) = analyze(&program) {
        display_error(&error, &source_path);
        process::exit(1);
    }

    println!("Analyzed in {:?}", analyze_start.elapsed());

    let compile_start = Instant::now();
    let cfg = lower(&program);

    let context = Context::create();
    let compiled = codegen(&cfg, &context, &file_name);

    println!("Compiled in {:?}", compile_start.elapsed());
    println!("Total time for IR generation: {:?}", start.elapsed());

    if let Some(output_path) = output_path {
        compiled.save_module_to_file(&PathBuf::from(output_path));
    }

    if !no_run {
        run(&compiled);
    }
}
