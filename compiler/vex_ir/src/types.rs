//! Type descriptors.
//!
//! Tagged variant over the five primitive kinds plus `List`, `Function`, and
//! `Error`. Types are arena-allocated and immutable; `PartialEq`/`Eq` are
//! derived, which for a `&'a Type<'a>` field compares the pointee
//! structurally (not by address) — exactly the "shared by value-equality on
//! their fully expanded structure" the spec asks for.

use crate::arena::Arena;

#[derive(Debug, PartialEq, Eq)]
pub enum Type<'a> {
    Int,
    Float,
    Bool,
    Char,
    String,
    List(&'a Type<'a>),
    Function(&'a [&'a Type<'a>], &'a Type<'a>),
    /// Placeholder for an unannotated parameter awaiting back-inference, or
    /// the result of a failed lookup in contexts that can't abort directly.
    Error,
}

impl<'a> Type<'a> {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }
}

pub fn make_int<'a>(arena: &'a Arena) -> &'a Type<'a> {
    arena.alloc(Type::Int)
}

pub fn make_float<'a>(arena: &'a Arena) -> &'a Type<'a> {
    arena.alloc(Type::Float)
}

pub fn make_bool<'a>(arena: &'a Arena) -> &'a Type<'a> {
    arena.alloc(Type::Bool)
}

pub fn make_char<'a>(arena: &'a Arena) -> &'a Type<'a> {
    arena.alloc(Type::Char)
}

pub fn make_string<'a>(arena: &'a Arena) -> &'a Type<'a> {
    arena.alloc(Type::String)
}

pub fn make_error<'a>(arena: &'a Arena) -> &'a Type<'a> {
    arena.alloc(Type::Error)
}

pub fn make_list<'a>(arena: &'a Arena, element: &'a Type<'a>) -> &'a Type<'a> {
    arena.alloc(Type::List(element))
}

pub fn make_function<'a>(
    arena: &'a Arena,
    params: &[&'a Type<'a>],
    ret: &'a Type<'a>,
) -> &'a Type<'a> {
    arena.alloc(Type::Function(arena.alloc_slice(params), ret))
}

/// Render a type's kind as the annotation string that would parse back to an
/// equivalent type — the partner half of the round-trip testable property.
#[must_use]
pub fn type_to_string(ty: &Type<'_>) -> String {
    match ty {
        Type::Int => "int".to_string(),
        Type::Float => "float".to_string(),
        Type::Bool => "bool".to_string(),
        Type::Char => "char".to_string(),
        Type::String => "string".to_string(),
        Type::List(elem) => format!("list<{}>", type_to_string(elem)),
        Type::Function(_, _) => "<function>".to_string(),
        Type::Error => "<error>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equal_structure_compares_equal_across_separate_allocations() {
        let arena = Arena::default();
        let a = make_list(&arena, make_int(&arena));
        let b = make_list(&arena, make_int(&arena));
        assert_eq!(a, b);
    }

    #[test]
    fn differing_element_kind_compares_unequal() {
        let arena = Arena::default();
        let a = make_list(&arena, make_int(&arena));
        let b = make_list(&arena, make_float(&arena));
        assert_ne!(a, b);
    }

    #[test]
    fn primitive_round_trips_through_type_to_string() {
        let arena = Arena::default();
        assert_eq!(type_to_string(make_int(&arena)), "int");
        assert_eq!(type_to_string(make_float(&arena)), "float");
        assert_eq!(type_to_string(make_bool(&arena)), "bool");
        assert_eq!(type_to_string(make_char(&arena)), "char");
        assert_eq!(type_to_string(make_string(&arena)), "string");
    }

    #[test]
    fn list_round_trips_through_type_to_string() {
        let arena = Arena::default();
        let list_of_int = make_list(&arena, make_int(&arena));
        assert_eq!(type_to_string(list_of_int), "list<int>");
    }
}
