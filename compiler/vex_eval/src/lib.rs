//! Tree-walking evaluator used by the REPL. Lowering has its own separate
//! translation to LLVM IR (`vex_llvm`); this crate never touches it.

mod environment;
mod evaluator;
mod value;

pub use evaluator::Session;
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use vex_ir::Arena;
    use vex_parse::parse;
    use vex_typeck::{typecheck, typecheck_in_env};

    fn run(source: &str) -> Value {
        let arena = Arena::default();
        let root = parse(&arena, source).expect("source parses");
        typecheck(&arena, root);
        let mut session = Session::new();
        session.eval_root(root)
    }

    #[test]
    fn int_addition_yields_int_three() {
        assert_eq!(run("val x : int = 1 + 2"), Value::Int(3));
    }

    #[test]
    fn division_by_zero_yields_unit() {
        assert_eq!(run("10 / 0"), Value::Unit);
    }

    #[test]
    fn recursive_factorial_evaluates() {
        assert_eq!(
            run("fn fact(n: int) : int = if n <= 1 then 1 else n * fact(n-1); fact(5)"),
            Value::Int(120)
        );
    }

    #[test]
    fn session_persists_bindings_across_lines() {
        let arena = Arena::default();
        let mut session = Session::new();

        let line1 = parse(&arena, "val x : int = 10").expect("parses");
        let (_, type_env) = typecheck_in_env(&arena, None, line1);
        session.eval_root(line1);

        let line2 = parse(&arena, "x + 5").expect("parses");
        let (_, type_env) = typecheck_in_env(&arena, type_env, line2);
        let _ = type_env;
        assert_eq!(session.eval_root(line2), Value::Int(15));
    }
}
