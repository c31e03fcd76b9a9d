//! Tree-walking evaluation. Rules mirror the IR lowering rules but stay in
//! the interpreter domain: no LLVM context, just a `Value` and an
//! environment.

use crate::environment::Env;
use crate::value::Value;
use rustc_hash::FxHashMap;
use vex_diagnostic::RuntimeError;
use vex_ir::{Node, Param};

const RED_ZONE: usize = 100 * 1024;
const STACK_PER_RECURSION: usize = 1024 * 1024;

fn recurse<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

struct FnDef<'a> {
    params: &'a [Param<'a>],
    body: &'a Node<'a>,
}

/// An evaluation session spanning the lifetime of one REPL (or batch eval)
/// run. Function definitions and top-level variable bindings accumulate
/// here across successive calls to `eval_root`, matching the single
/// process-wide arena the whole session shares.
pub struct Session<'a> {
    env: Env<'a>,
    functions: FxHashMap<&'a str, FnDef<'a>>,
}

impl<'a> Default for Session<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Session<'a> {
    #[must_use]
    pub fn new() -> Self {
        Session {
            env: Env::new(),
            functions: FxHashMap::default(),
        }
    }

    /// Evaluate one parsed root (ordinarily a `Block`, one per REPL line).
    /// Functions are hoisted ahead of the statement list so forward and
    /// self references resolve regardless of definition order.
    pub fn eval_root(&mut self, root: &'a Node<'a>) -> Value {
        match root {
            Node::Block(stmts) => {
                for stmt in *stmts {
                    if let Node::Function {
                        name, params, body, ..
                    } = stmt
                    {
                        self.functions.insert(name, FnDef { params, body });
                    }
                }
                let mut last = Value::Unit;
                for stmt in *stmts {
                    last = self.eval_stmt(stmt);
                }
                last
            }
            other => self.eval_expr(other),
        }
    }

    fn eval_stmt(&mut self, node: &'a Node<'a>) -> Value {
        match node {
            Node::VarDecl { name, init, .. } => {
                let value = self.eval_expr(init);
                self.env = self.env.extended(name, value.clone());
                value
            }
            // Already registered by the hoisting pass in `eval_root`.
            Node::Function { .. } => Value::Unit,
            other => self.eval_expr(other),
        }
    }

    fn eval_expr(&self, node: &'a Node<'a>) -> Value {
        eval(&self.functions, &self.env, node)
    }
}

fn eval<'a>(functions: &FxHashMap<&'a str, FnDef<'a>>, env: &Env<'a>, node: &'a Node<'a>) -> Value {
    recurse(|| match node {
        Node::IntLit(v) => Value::Int(*v),
        Node::FloatLit(v) => Value::Float(*v),
        Node::BoolLit(v) => Value::Bool(*v),
        Node::CharLit(v) => Value::Char(*v),
        Node::StringLit(v) => Value::String((*v).to_string()),
        Node::Identifier(name) => env.lookup(name).cloned().unwrap_or(Value::Unit),
        Node::UnaryExpr { .. } => {
            RuntimeError::UnsupportedNode { kind: "UnaryExpr" }.report();
            Value::Unit
        }
        Node::BinaryExpr { op, left, right } => eval_binary(functions, env, op, left, right),
        Node::VarDecl { init, .. } => eval(functions, env, init),
        Node::Block(stmts) => eval_block(functions, env.clone(), stmts),
        Node::If {
            cond,
            then_branch,
            else_branch,
        } => eval_if(functions, env, cond, then_branch, *else_branch),
        Node::List(_) => {
            RuntimeError::UnsupportedNode { kind: "List" }.report();
            Value::Unit
        }
        Node::Print { value, annotation } => eval_print(functions, env, value, annotation),
        Node::Function { .. } => {
            RuntimeError::UnsupportedNode { kind: "Function" }.report();
            Value::Unit
        }
        Node::Call { callee, args } => eval_call(functions, env, callee, args),
    })
}

fn eval_block<'a>(
    functions: &FxHashMap<&'a str, FnDef<'a>>,
    env: Env<'a>,
    stmts: &'a [&'a Node<'a>],
) -> Value {
    let mut cur = env;
    let mut last = Value::Unit;
    for stmt in stmts {
        match stmt {
            Node::VarDecl { name, init, .. } => {
                let value = eval(functions, &cur, init);
                cur = cur.extended(name, value.clone());
                last = value;
            }
            Node::Function { .. } => last = Value::Unit,
            other => last = eval(functions, &cur, other),
        }
    }
    last
}

fn eval_if<'a>(
    functions: &FxHashMap<&'a str, FnDef<'a>>,
    env: &Env<'a>,
    cond: &'a Node<'a>,
    then_branch: &'a Node<'a>,
    else_branch: Option<&'a Node<'a>>,
) -> Value {
    match eval(functions, env, cond) {
        Value::Bool(true) => eval(functions, env, then_branch),
        Value::Bool(false) => else_branch.map_or(Value::Unit, |e| eval(functions, env, e)),
        _ => {
            RuntimeError::UnsupportedNode { kind: "If" }.report();
            Value::Unit
        }
    }
}

fn eval_print<'a>(
    functions: &FxHashMap<&'a str, FnDef<'a>>,
    env: &Env<'a>,
    value: &'a Node<'a>,
    annotation: &str,
) -> Value {
    let v = eval(functions, env, value);
    match format_for_print(&v, annotation) {
        Ok(rendered) => {
            println!("- : {annotation} = {rendered}");
            v
        }
        Err(err) => {
            err.report();
            Value::Unit
        }
    }
}

fn format_for_print(value: &Value, annotation: &str) -> Result<String, RuntimeError> {
    let matches_annotation = matches!(
        (value, annotation),
        (Value::Int(_), "int")
            | (Value::Float(_), "float")
            | (Value::Bool(_), "bool")
            | (Value::Char(_), "char")
            | (Value::String(_), "string")
    );
    if matches_annotation {
        Ok(value.to_string())
    } else {
        Err(RuntimeError::PrintMismatch {
            expected: annotation.to_string(),
            found: value.kind_name().to_string(),
        })
    }
}

fn eval_call<'a>(
    functions: &FxHashMap<&'a str, FnDef<'a>>,
    env: &Env<'a>,
    callee: &'a Node<'a>,
    args: &'a [&'a Node<'a>],
) -> Value {
    let Node::Identifier(name) = callee else {
        RuntimeError::UnsupportedNode { kind: "Call" }.report();
        return Value::Unit;
    };
    let Some(def) = functions.get(name) else {
        RuntimeError::UnsupportedNode { kind: "Call" }.report();
        return Value::Unit;
    };

    let arg_values: Vec<Value> = args.iter().map(|a| eval(functions, env, a)).collect();
    let mut call_env = Env::new();
    for (param, value) in def.params.iter().zip(arg_values) {
        call_env = call_env.extended(param.name, value);
    }
    eval(functions, &call_env, def.body)
}

fn eval_binary<'a>(
    functions: &FxHashMap<&'a str, FnDef<'a>>,
    env: &Env<'a>,
    op: &str,
    left: &'a Node<'a>,
    right: &'a Node<'a>,
) -> Value {
    let lv = eval(functions, env, left);
    let rv = eval(functions, env, right);
    match (op, lv, rv) {
        ("+", Value::Int(a), Value::Int(b)) => Value::Int(a + b),
        ("-", Value::Int(a), Value::Int(b)) => Value::Int(a - b),
        ("*", Value::Int(a), Value::Int(b)) => Value::Int(a * b),
        ("/", Value::Int(a), Value::Int(b)) => {
            if b == 0 {
                RuntimeError::DivisionByZero.report();
                Value::Unit
            } else {
                Value::Int(a / b)
            }
        }
        ("+.", Value::Float(a), Value::Float(b)) => Value::Float(a + b),
        ("-.", Value::Float(a), Value::Float(b)) => Value::Float(a - b),
        ("*.", Value::Float(a), Value::Float(b)) => Value::Float(a * b),
        ("/.", Value::Float(a), Value::Float(b)) => {
            if b == 0.0 {
                RuntimeError::DivisionByZero.report();
                Value::Unit
            } else {
                Value::Float(a / b)
            }
        }
        ("==", a, b) => Value::Bool(a == b),
        ("!=", a, b) => Value::Bool(a != b),
        ("<", Value::Int(a), Value::Int(b)) => Value::Bool(a < b),
        ("<=", Value::Int(a), Value::Int(b)) => Value::Bool(a <= b),
        (">", Value::Int(a), Value::Int(b)) => Value::Bool(a > b),
        (">=", Value::Int(a), Value::Int(b)) => Value::Bool(a >= b),
        ("<", Value::Float(a), Value::Float(b)) => Value::Bool(a < b),
        ("<=", Value::Float(a), Value::Float(b)) => Value::Bool(a <= b),
        (">", Value::Float(a), Value::Float(b)) => Value::Bool(a > b),
        (">=", Value::Float(a), Value::Float(b)) => Value::Bool(a >= b),
        ("&&", Value::Bool(a), Value::Bool(b)) => Value::Bool(a && b),
        ("||", Value::Bool(a), Value::Bool(b)) => Value::Bool(a || b),
        _ => {
            RuntimeError::UnsupportedNode {
                kind: "BinaryExpr",
            }
            .report();
            Value::Unit
        }
    }
}
