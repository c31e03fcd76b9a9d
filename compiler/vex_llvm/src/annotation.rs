//! Translates a type annotation string (the same five primitive names the
//! checker recognizes) directly to an LLVM scalar type. Lowering walks the
//! AST independently of the checker's resolved types, so it re-reads the
//! annotation strings rather than consulting `vex_typeck`.

use crate::context::Cx;
use inkwell::types::BasicTypeEnum;

#[must_use]
pub fn llvm_type_for_annotation<'ctx>(cx: &Cx<'ctx>, annotation: &str) -> Option<BasicTypeEnum<'ctx>> {
    match annotation {
        "int" => Some(cx.type_i64().into()),
        "float" => Some(cx.type_f64().into()),
        "bool" => Some(cx.type_i1().into()),
        "char" => Some(cx.type_i8().into()),
        "string" => Some(cx.type_ptr().into()),
        _ => None,
    }
}

/// Format string used by `printf` for a value of the given annotation kind.
/// Bools are printed as `%d` after a zero-extension to 32 bits, matching the
/// lowering table's rule for the one primitive with no native `printf`
/// conversion specifier.
#[must_use]
pub fn printf_format_for_annotation(annotation: &str) -> Option<&'static str> {
    match annotation {
        "int" => Some("%ld\n\0"),
        "float" => Some("%lf\n\0"),
        "char" => Some("%c\n\0"),
        "string" => Some("%s\n\0"),
        "bool" => Some("%d\n\0"),
        _ => None,
    }
}
