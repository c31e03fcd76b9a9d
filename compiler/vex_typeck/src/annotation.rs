//! Annotation grammar: parses the short strings the parser stores verbatim
//! in `VarDecl`/`Function`/`Print` nodes into `vex_ir::Type` descriptors.
//!
//! Mirrors the table-driven shape of the original `tc.c`: primitive names
//! are looked up in a fixed table rather than matched with a chain of
//! `if`/`else`, keeping the set trivial to extend.

use vex_diagnostic::TypeError;
use vex_ir::{make_bool, make_char, make_float, make_int, make_list, make_string, Arena, Type};

const PRIMITIVE_NAMES: &[&str] = &["int", "float", "bool", "char", "string"];

/// Cap carried over from the original implementation's `sscanf("<%15[^>]>", ...)`.
const MAX_INNER_LEN: usize = 15;

fn primitive<'a>(arena: &'a Arena, name: &str) -> Option<&'a Type<'a>> {
    match name {
        "int" => Some(make_int(arena)),
        "float" => Some(make_float(arena)),
        "bool" => Some(make_bool(arena)),
        "char" => Some(make_char(arena)),
        "string" => Some(make_string(arena)),
        _ => {
            debug_assert!(!PRIMITIVE_NAMES.contains(&name));
            None
        }
    }
}

/// Parse an annotation string into a type. Recognizes the five primitive
/// names, `list<T>`, and the bare `<T>` shorthand for `list<T>`.
pub fn parse_type_annotation<'a>(
    arena: &'a Arena,
    annotation: &str,
) -> Result<&'a Type<'a>, TypeError> {
    if let Some(inner) = bare_list_inner(annotation) {
        return list_of(arena, annotation, inner);
    }
    if let Some(inner) = prefixed_list_inner(annotation, "list") {
        return list_of(arena, annotation, inner);
    }
    primitive(arena, annotation).ok_or_else(|| TypeError::UnknownAnnotation {
        annotation: annotation.to_string(),
    })
}

fn bare_list_inner(annotation: &str) -> Option<&str> {
    annotation
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
}

fn prefixed_list_inner<'s>(annotation: &'s str, prefix: &str) -> Option<&'s str> {
    annotation
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('<'))
        .and_then(|rest| rest.strip_suffix('>'))
}

fn list_of<'a>(arena: &'a Arena, annotation: &str, inner: &str) -> Result<&'a Type<'a>, TypeError> {
    if inner.len() > MAX_INNER_LEN {
        return Err(TypeError::UnknownAnnotation {
            annotation: annotation.to_string(),
        });
    }
    let element = primitive(arena, inner).ok_or_else(|| TypeError::UnknownAnnotation {
        annotation: annotation.to_string(),
    })?;
    Ok(make_list(arena, element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vex_ir::type_to_string;

    #[test]
    fn parses_all_primitives() {
        let arena = Arena::default();
        for name in PRIMITIVE_NAMES {
            let ty = parse_type_annotation(&arena, name).expect("valid");
            assert_eq!(type_to_string(ty), *name);
        }
    }

    #[test]
    fn parses_list_and_bare_shorthand_identically() {
        let arena = Arena::default();
        let a = parse_type_annotation(&arena, "list<int>").expect("valid");
        let b = parse_type_annotation(&arena, "<int>").expect("valid");
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_unknown_annotation() {
        let arena = Arena::default();
        assert!(parse_type_annotation(&arena, "widget").is_err());
    }

    #[test]
    fn rejects_inner_name_over_cap() {
        let arena = Arena::default();
        let too_long = "<abcdefghijklmnopqrstuvwxyz>";
        assert!(parse_type_annotation(&arena, too_long).is_err());
    }
}
