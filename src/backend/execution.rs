//! In-process execution of a compiled module.

use inkwell::OptimizationLevel;

use super::codegen::Codegen;

type MainFunction = unsafe extern "C" fn();

/// Runs the program's `main` through the JIT. The runtime functions the
/// module declares (printf, scanf, malloc, the str* family) are resolved
/// against the host process.
pub fn run(codegen: &Codegen) {
    let engine = codegen
        .module
        .create_jit_execution_engine(OptimizationLevel::None)
        .expect("Failed to create the JIT engine");

    unsafe {
        let main = engine
            .get_function::<MainFunction>("main")
            .expect("The module has no `main` function");
        main.call();
    }
}
