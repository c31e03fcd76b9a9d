//! The two-phase type checker: a pre-binding pass over the top-level block
//! followed by a recursive per-expression checking pass, with a persistent
//! environment and two controlled back-inference mutation points.

mod annotation;
mod checker;

pub use annotation::parse_type_annotation;
pub use checker::{typecheck, typecheck_in_env};
pub use vex_ir::{type_to_string, Env};

#[cfg(test)]
mod tests {
    use super::*;
    use vex_ir::{type_to_string, Arena, Type};
    use vex_parse::parse;

    fn check_source(source: &str) -> String {
        let arena = Arena::default();
        let root = parse(&arena, source).expect("source parses");
        let ty = typecheck(&arena, root);
        type_to_string(ty)
    }

    #[test]
    fn int_addition_binds_int() {
        assert_eq!(check_source("val x : int = 1 + 2"), "int");
    }

    #[test]
    fn list_of_ints_types_as_list_int() {
        assert_eq!(check_source("val xs : list<int> = [1,2,3]"), "list<int>");
    }

    #[test]
    fn recursive_factorial_type_checks() {
        assert_eq!(
            check_source("fn fact(n: int) : int = if n <= 1 then 1 else n * fact(n-1)"),
            "<function>"
        );
    }

    #[test]
    fn back_inference_resolves_unannotated_parameter() {
        // `x` has no annotation; `x + 1` fixes it to Int via back-inference.
        assert_eq!(check_source("fn f(x) : int = x + 1"), "<function>");
    }

    #[test]
    fn back_inference_is_reflected_in_the_bound_function_type() {
        // The body resolves `x` to `int` via back-inference; that resolution
        // must be visible in the signature `typecheck` hands back, not just
        // in the body's own local scope, or a later caller could pass a
        // mismatched argument and have the checker wave it through.
        let arena = Arena::default();
        let root = parse(&arena, "fn f(x) : int = x + 1").expect("source parses");
        let ty = typecheck(&arena, root);
        match ty {
            Type::Function(params, _) => assert_eq!(params[0], &Type::Int),
            other => panic!("expected Type::Function, got {other:?}"),
        }
    }

    #[test]
    fn block_type_is_last_statement_type() {
        let arena = Arena::default();
        let root = parse(&arena, "val a : int = 1; val b : float = 2.0").expect("parses");
        let ty = typecheck(&arena, root);
        assert_eq!(type_to_string(ty), "float");
    }
}
