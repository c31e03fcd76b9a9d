//! Shared data model for the Vex compiler: arena allocation, AST nodes, type
//! descriptors, and the type environment. Every other crate in this
//! workspace builds nodes and types exclusively through the factory
//! functions here; none of them construct a `Node` or `Type` variant
//! directly.

pub mod arena;
pub mod ast;
pub mod env;
pub mod types;

pub use arena::Arena;
pub use ast::{
    binary_expr, block, bool_lit, call, char_lit, float_lit, function, identifier, if_expr,
    int_lit, list, print, string_lit, unary_expr, var_decl, Node, Param,
};
pub use env::{Env, EnvFrame};
pub use types::{
    make_bool, make_char, make_error, make_float, make_function, make_int, make_list, make_string,
    type_to_string, Type,
};
