//! Error taxonomy for the Vex pipeline.
//!
//! Three severities, matching the propagation policy: parse and type errors
//! are fatal and abort the process with a single-line diagnostic; lowering
//! and runtime errors are reported and the pass continues. Nothing here
//! carries source spans — the type checker does not track source locations,
//! so every message is phrased in terms of the AST/type content alone.
//!
//! Construction of a diagnostic also emits a `tracing::error!` event, giving
//! compiler developers a structured trail independent of what gets printed
//! to the user-facing error stream.

use thiserror::Error;

/// Failure reported by the (external) lexer/parser. The core only learns
/// that parsing failed, never why — matching the "surface as 'Parsing
/// failed.'" propagation rule.
#[derive(Debug, Error)]
#[error("Parsing failed.")]
pub struct ParseError;

/// Fatal type-checking failures. Every variant renders as the single-line
/// diagnostic the checker prints before aborting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("Undefined identifier '{name}'")]
    UndefinedIdentifier { name: String },

    #[error("Type mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: String, found: String },

    #[error("Unknown type annotation '{annotation}'")]
    UnknownAnnotation { annotation: String },

    #[error("Cannot infer type of empty list")]
    EmptyListInference,

    #[error("Empty block has no type")]
    EmptyBlock,

    #[error("List elements must share a type: expected {expected}, found {found}")]
    ListKindMismatch { expected: String, found: String },

    #[error("Function '{name}' expects {expected} argument(s), found {found}")]
    ParamCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Cannot infer type of parameter '{name}'")]
    UninferrableParameter { name: String },

    #[error("Operands to '{op}' must both be {expected}")]
    BadOperatorKinds { op: String, expected: String },

    #[error("Called value is not a function")]
    NotCallable,

    #[error("Unary expressions are not supported")]
    UnsupportedUnary,
}

impl TypeError {
    /// Print the single-line diagnostic and terminate the process with a
    /// non-zero status. The type checker is abort-on-first: there is no
    /// returning from this call.
    pub fn abort(&self) -> ! {
        tracing::error!(error = %self, "fatal type error");
        eprintln!("{self}");
        std::process::exit(1);
    }
}

/// Non-fatal failures from IR lowering. A lowering error yields an
/// absent-value handle for the offending node; the pass continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoweringError {
    #[error("unsupported AST node in lowering: {kind}")]
    UnsupportedNode { kind: &'static str },

    #[error("malformed lowering combination: {detail}")]
    Malformed { detail: String },
}

impl LoweringError {
    /// Print the diagnostic to the error stream without aborting.
    pub fn report(&self) {
        tracing::warn!(error = %self, "lowering diagnostic");
        eprintln!("{self}");
    }
}

/// Non-fatal failures from the tree-walking evaluator. Each yields `Unit`
/// from the offending expression; the REPL loop continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("print type mismatch: expected {expected}, found {found}")]
    PrintMismatch { expected: String, found: String },

    #[error("unsupported AST node in evaluation: {kind}")]
    UnsupportedNode { kind: &'static str },
}

impl RuntimeError {
    /// Print the diagnostic to the error stream without aborting.
    pub fn report(&self) {
        tracing::warn!(error = %self, "runtime diagnostic");
        eprintln!("{self}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_messages_are_single_line() {
        let err = TypeError::KindMismatch {
            expected: "int".to_string(),
            found: "float".to_string(),
        };
        let rendered = err.to_string();
        assert!(!rendered.contains('\n'));
        assert_eq!(rendered, "Type mismatch: expected int, found float");
    }

    #[test]
    fn bad_operator_kinds_matches_scenario_wording() {
        let err = TypeError::BadOperatorKinds {
            op: "+.".to_string(),
            expected: "float".to_string(),
        };
        assert_eq!(err.to_string(), "Operands to '+.' must both be float");
    }

    #[test]
    fn parse_error_surfaces_fixed_message() {
        assert_eq!(ParseError.to_string(), "Parsing failed.");
    }
}
