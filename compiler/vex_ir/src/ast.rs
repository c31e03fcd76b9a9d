//! AST node kinds and the factory API that constructs them.
//!
//! Every node lives in an `Arena` (see `arena.rs`); child references are
//! plain `&'a Node<'a>` borrows with the arena's lifetime, so a well-typed
//! tree can never outlive the arena it was built from. Nodes are built once
//! by the factory functions below and never mutated afterward — the parser
//! (out of scope for this crate) is the only caller.

use crate::arena::Arena;
use std::fmt;

/// A function parameter: a name plus an optional type annotation string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param<'a> {
    pub name: &'a str,
    pub annotation: Option<&'a str>,
}

/// The AST node. A node's payload always matches its kind tag; there is no
/// way to construct a mismatched node outside this module.
#[derive(Debug, PartialEq)]
pub enum Node<'a> {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    /// Stored as a byte, matching the 8-bit codepoint payload of the spec.
    CharLit(u8),
    StringLit(&'a str),
    Identifier(&'a str),
    VarDecl {
        name: &'a str,
        annotation: Option<&'a str>,
        init: &'a Node<'a>,
    },
    UnaryExpr {
        op: &'a str,
        operand: &'a Node<'a>,
    },
    BinaryExpr {
        op: &'a str,
        left: &'a Node<'a>,
        right: &'a Node<'a>,
    },
    Block(&'a [&'a Node<'a>]),
    If {
        cond: &'a Node<'a>,
        then_branch: &'a Node<'a>,
        else_branch: Option<&'a Node<'a>>,
    },
    List(&'a [&'a Node<'a>]),
    Print {
        value: &'a Node<'a>,
        annotation: &'a str,
    },
    Function {
        name: &'a str,
        params: &'a [Param<'a>],
        return_annotation: Option<&'a str>,
        body: &'a Node<'a>,
        recursive: bool,
    },
    Call {
        callee: &'a Node<'a>,
        args: &'a [&'a Node<'a>],
    },
}

impl<'a> Node<'a> {
    /// Human-readable name of this node's kind, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::IntLit(_) => "IntLit",
            Node::FloatLit(_) => "FloatLit",
            Node::BoolLit(_) => "BoolLit",
            Node::CharLit(_) => "CharLit",
            Node::StringLit(_) => "StringLit",
            Node::Identifier(_) => "Identifier",
            Node::VarDecl { .. } => "VarDecl",
            Node::UnaryExpr { .. } => "UnaryExpr",
            Node::BinaryExpr { .. } => "BinaryExpr",
            Node::Block(_) => "Block",
            Node::If { .. } => "If",
            Node::List(_) => "List",
            Node::Print { .. } => "Print",
            Node::Function { .. } => "Function",
            Node::Call { .. } => "Call",
        }
    }
}

// ===== Factory API =====
//
// One factory per kind. String-bearing factories copy their input into the
// arena; the caller keeps ownership of (and may discard) its own buffer.

pub fn int_lit<'a>(arena: &'a Arena, value: i64) -> &'a Node<'a> {
    arena.alloc(Node::IntLit(value))
}

pub fn float_lit<'a>(arena: &'a Arena, value: f64) -> &'a Node<'a> {
    arena.alloc(Node::FloatLit(value))
}

pub fn bool_lit<'a>(arena: &'a Arena, value: bool) -> &'a Node<'a> {
    arena.alloc(Node::BoolLit(value))
}

pub fn char_lit<'a>(arena: &'a Arena, value: u8) -> &'a Node<'a> {
    arena.alloc(Node::CharLit(value))
}

pub fn string_lit<'a>(arena: &'a Arena, value: &str) -> &'a Node<'a> {
    arena.alloc(Node::StringLit(arena.alloc_str(value)))
}

pub fn identifier<'a>(arena: &'a Arena, name: &str) -> &'a Node<'a> {
    arena.alloc(Node::Identifier(arena.alloc_str(name)))
}

pub fn var_decl<'a>(
    arena: &'a Arena,
    name: &str,
    annotation: Option<&str>,
    init: &'a Node<'a>,
) -> &'a Node<'a> {
    arena.alloc(Node::VarDecl {
        name: arena.alloc_str(name),
        annotation: annotation.map(|a| arena.alloc_str(a) as &str),
        init,
    })
}

pub fn unary_expr<'a>(arena: &'a Arena, op: &str, operand: &'a Node<'a>) -> &'a Node<'a> {
    arena.alloc(Node::UnaryExpr {
        op: arena.alloc_str(op),
        operand,
    })
}

pub fn binary_expr<'a>(
    arena: &'a Arena,
    op: &str,
    left: &'a Node<'a>,
    right: &'a Node<'a>,
) -> &'a Node<'a> {
    arena.alloc(Node::BinaryExpr {
        op: arena.alloc_str(op),
        left,
        right,
    })
}

pub fn block<'a>(arena: &'a Arena, statements: &[&'a Node<'a>]) -> &'a Node<'a> {
    arena.alloc(Node::Block(arena.alloc_slice(statements)))
}

pub fn if_expr<'a>(
    arena: &'a Arena,
    cond: &'a Node<'a>,
    then_branch: &'a Node<'a>,
    else_branch: Option<&'a Node<'a>>,
) -> &'a Node<'a> {
    arena.alloc(Node::If {
        cond,
        then_branch,
        else_branch,
    })
}

pub fn list<'a>(arena: &'a Arena, elements: &[&'a Node<'a>]) -> &'a Node<'a> {
    arena.alloc(Node::List(arena.alloc_slice(elements)))
}

pub fn print<'a>(arena: &'a Arena, value: &'a Node<'a>, annotation: &str) -> &'a Node<'a> {
    arena.alloc(Node::Print {
        value,
        annotation: arena.alloc_str(annotation),
    })
}

/// Build a `Function` node.
///
/// `params` is `(name, annotation)` pairs; each is copied into the arena as a
/// `Param`. An empty `params` slice yields an empty arena-owned slice — the
/// safe-Rust analogue of the C factory's "null arrays on zero parameters."
pub fn function<'a>(
    arena: &'a Arena,
    name: &str,
    params: &[(&str, Option<&str>)],
    return_annotation: Option<&str>,
    body: &'a Node<'a>,
    recursive: bool,
) -> &'a Node<'a> {
    let params: Vec<Param<'a>> = params
        .iter()
        .map(|(pname, pann)| Param {
            name: arena.alloc_str(pname),
            annotation: pann.map(|a| arena.alloc_str(a) as &str),
        })
        .collect();
    arena.alloc(Node::Function {
        name: arena.alloc_str(name),
        params: arena.alloc_slice(&params),
        return_annotation: return_annotation.map(|a| arena.alloc_str(a) as &str),
        body,
        recursive,
    })
}

pub fn call<'a>(arena: &'a Arena, callee: &'a Node<'a>, args: &[&'a Node<'a>]) -> &'a Node<'a> {
    arena.alloc(Node::Call {
        callee,
        args: arena.alloc_slice(args),
    })
}

// ===== Pretty printer =====

impl<'a> fmt::Display for Node<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pretty(f, 0)
    }
}

impl<'a> Node<'a> {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            Node::IntLit(v) => writeln!(f, "{pad}IntLit({v})"),
            Node::FloatLit(v) => writeln!(f, "{pad}FloatLit({v})"),
            Node::BoolLit(v) => writeln!(f, "{pad}BoolLit({v})"),
            Node::CharLit(v) => writeln!(f, "{pad}CharLit({})", *v as char),
            Node::StringLit(v) => writeln!(f, "{pad}StringLit({v:?})"),
            Node::Identifier(v) => writeln!(f, "{pad}Identifier({v})"),
            Node::VarDecl {
                name,
                annotation,
                init,
            } => {
                writeln!(f, "{pad}VarDecl({name}, {annotation:?})")?;
                init.pretty(f, indent + 1)
            }
            Node::UnaryExpr { op, operand } => {
                writeln!(f, "{pad}UnaryExpr({op})")?;
                operand.pretty(f, indent + 1)
            }
            Node::BinaryExpr { op, left, right } => {
                writeln!(f, "{pad}BinaryExpr({op})")?;
                left.pretty(f, indent + 1)?;
                right.pretty(f, indent + 1)
            }
            Node::Block(stmts) => {
                writeln!(f, "{pad}Block")?;
                for s in *stmts {
                    s.pretty(f, indent + 1)?;
                }
                Ok(())
            }
            Node::If {
                cond,
                then_branch,
                else_branch,
            } => {
                writeln!(f, "{pad}If")?;
                cond.pretty(f, indent + 1)?;
                then_branch.pretty(f, indent + 1)?;
                if let Some(e) = else_branch {
                    e.pretty(f, indent + 1)?;
                }
                Ok(())
            }
            Node::List(elements) => {
                writeln!(f, "{pad}List")?;
                for e in *elements {
                    e.pretty(f, indent + 1)?;
                }
                Ok(())
            }
            Node::Print { value, annotation } => {
                writeln!(f, "{pad}Print({annotation})")?;
                value.pretty(f, indent + 1)
            }
            Node::Function {
                name,
                params,
                return_annotation,
                body,
                recursive,
            } => {
                writeln!(
                    f,
                    "{pad}Function({name}, recursive={recursive}, return={return_annotation:?})"
                )?;
                for p in *params {
                    writeln!(f, "{}  Param({}, {:?})", pad, p.name, p.annotation)?;
                }
                body.pretty(f, indent + 1)
            }
            Node::Call { callee, args } => {
                writeln!(f, "{pad}Call")?;
                callee.pretty(f, indent + 1)?;
                for a in *args {
                    a.pretty(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_copy_strings_into_the_arena() {
        let arena = Arena::default();
        let mut buf = String::from("x");
        let node = identifier(&arena, &buf);
        buf.push('y');
        match node {
            Node::Identifier(n) => assert_eq!(*n, "x"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn zero_param_function_has_empty_param_slice() {
        let arena = Arena::default();
        let body = int_lit(&arena, 0);
        let node = function(&arena, "f", &[], None, body, false);
        match node {
            Node::Function { params, .. } => assert!(params.is_empty()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn pretty_printer_renders_nested_structure() {
        let arena = Arena::default();
        let left = int_lit(&arena, 1);
        let right = int_lit(&arena, 2);
        let sum = binary_expr(&arena, "+", left, right);
        let rendered = sum.to_string();
        assert!(rendered.contains("BinaryExpr(+)"));
        assert!(rendered.contains("IntLit(1)"));
        assert!(rendered.contains("IntLit(2)"));
    }
}
