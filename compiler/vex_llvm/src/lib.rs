//! LLVM IR lowering for ahead-of-time compilation. A single traversal walks
//! the same AST the evaluator walks, emitting typed IR instructions through
//! a thin builder wrapper (`context::Cx`) instead of producing runtime
//! `Value`s directly.

mod annotation;
mod context;
mod locals;
mod lower;

pub use inkwell::context::Context;
pub use lower::lower_module;

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::context::Context;
    use inkwell::execution_engine::JitFunction;
    use inkwell::OptimizationLevel;
    use vex_ir::Arena;
    use vex_parse::parse;

    fn compile(source: &str) -> (Context, String) {
        let arena = Arena::default();
        let root = parse(&arena, source).expect("source parses");
        let context = Context::create();
        let module = lower_module(&context, "test", root);
        let ir = module.print_to_string().to_string();
        (context, ir)
    }

    #[test]
    fn int_addition_lowers_to_signed_add() {
        let (_ctx, ir) = compile("val x : int = 1 + 2");
        assert!(ir.contains("add"));
    }

    #[test]
    fn float_arithmetic_lowers_to_float_ops() {
        let (_ctx, ir) = compile("val x : float = 1.0 +. 2.0");
        assert!(ir.contains("fadd"));
    }

    #[test]
    fn print_declares_variadic_printf() {
        let (_ctx, ir) = compile("print<int>(1)");
        assert!(ir.contains("declare"));
        assert!(ir.contains("printf"));
    }

    #[test]
    fn function_definition_emits_a_separate_ir_function() {
        let (_ctx, ir) = compile("fn add(a: int, b: int) : int = a + b; add(1,2)");
        assert!(ir.contains("define"));
        assert!(ir.contains("@add"));
    }

    #[test]
    fn recursive_factorial_jit_executes_to_120() {
        let arena = Arena::default();
        let root = parse(
            &arena,
            "fn fact(n: int) : int = if n <= 1 then 1 else n * fact(n-1); fact(5)",
        )
        .expect("source parses");
        let context = Context::create();
        let module = lower_module(&context, "test", root);

        let engine = module
            .create_jit_execution_engine(OptimizationLevel::None)
            .expect("jit engine");
        unsafe {
            let main: JitFunction<unsafe extern "C" fn() -> i64> =
                engine.get_function("main").expect("main exists");
            assert_eq!(main.call(), 120);
        }
    }
}
