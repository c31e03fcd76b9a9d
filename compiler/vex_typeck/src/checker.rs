//! The two-phase checker.
//!
//! Every function here either returns a concrete, non-`Error` type or calls
//! `TypeError::abort`, which never returns — there is no recoverable error
//! path once checking starts, matching the abort-on-first propagation
//! policy.

use crate::annotation::parse_type_annotation;
use vex_diagnostic::TypeError;
use vex_ir::{
    make_bool, make_error, make_function, make_list, type_to_string, Arena, Env, EnvFrame, Node,
    Param, Type,
};

struct Ctx<'a> {
    arena: &'a Arena,
}

const RED_ZONE: usize = 100 * 1024;
const STACK_PER_RECURSION: usize = 1024 * 1024;

fn recurse<'a, R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Type-check `root` in an empty environment. Returns a concrete type on
/// success; any failure aborts the process from within `TypeError::abort`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn typecheck<'a>(arena: &'a Arena, root: &'a Node<'a>) -> &'a Type<'a> {
    let ctx = Ctx { arena };
    match root {
        Node::Block(stmts) => check_root_block(&ctx, stmts),
        other => check_expr(&ctx, None, other),
    }
}

/// Type-check `root` against a caller-supplied environment, returning the
/// (possibly extended) environment alongside the result type. Used by the
/// REPL, where each line's bindings must be visible to the next line —
/// unlike `typecheck`, this does not run the root's two-phase pre-binding
/// pass; each line's own `Function`/`Call` rules already bind recursively
/// where needed (see `check_function`), so sequential threading is enough
/// for single-line-at-a-time input.
#[tracing::instrument(level = "debug", skip_all)]
pub fn typecheck_in_env<'a>(
    arena: &'a Arena,
    env: Env<'a>,
    root: &'a Node<'a>,
) -> (&'a Type<'a>, Env<'a>) {
    let ctx = Ctx { arena };
    match root {
        Node::Block(stmts) => check_block(&ctx, env, stmts),
        other => (check_expr(&ctx, env, other), env),
    }
}

/// The root's two-phase checking: a pre-binding pass that hoists function
/// and value bindings, followed by a checking pass over the full
/// pre-bound environment.
#[tracing::instrument(level = "debug", skip_all, fields(statements = stmts.len()))]
fn check_root_block<'a>(ctx: &Ctx<'a>, stmts: &'a [&'a Node<'a>]) -> &'a Type<'a> {
    let mut env: Env<'a> = None;
    for stmt in stmts {
        env = pre_bind(ctx, env, stmt);
    }

    let mut last: Option<&'a Type<'a>> = None;
    for stmt in stmts {
        last = Some(check_expr(ctx, env, stmt));
    }
    last.unwrap_or_else(|| TypeError::EmptyBlock.abort())
}

fn pre_bind<'a>(ctx: &Ctx<'a>, env: Env<'a>, stmt: &'a Node<'a>) -> Env<'a> {
    match stmt {
        Node::Function {
            name,
            params,
            return_annotation,
            ..
        } => {
            let fn_type = function_type_from_annotations(ctx, params, *return_annotation);
            Some(EnvFrame::extend(ctx.arena, env, name, fn_type))
        }
        Node::VarDecl {
            name,
            annotation: Some(annotation),
            ..
        } => {
            let ty = parse_type_annotation(ctx.arena, annotation).unwrap_or_else(|e| e.abort());
            Some(EnvFrame::extend(ctx.arena, env, name, ty))
        }
        Node::VarDecl {
            name,
            annotation: None,
            init,
        } => {
            let ty = check_expr(ctx, env, init);
            Some(EnvFrame::extend(ctx.arena, env, name, ty))
        }
        _ => env,
    }
}

fn function_type_from_annotations<'a>(
    ctx: &Ctx<'a>,
    params: &'a [Param<'a>],
    return_annotation: Option<&'a str>,
) -> &'a Type<'a> {
    let param_types: Vec<&'a Type<'a>> = params
        .iter()
        .map(|p| match p.annotation {
            Some(a) => parse_type_annotation(ctx.arena, a).unwrap_or_else(|e| e.abort()),
            None => make_error(ctx.arena),
        })
        .collect();
    let ret_type = match return_annotation {
        Some(a) => parse_type_annotation(ctx.arena, a).unwrap_or_else(|e| e.abort()),
        None => make_error(ctx.arena),
    };
    make_function(ctx.arena, &param_types, ret_type)
}

fn check_expr<'a>(ctx: &Ctx<'a>, env: Env<'a>, node: &'a Node<'a>) -> &'a Type<'a> {
    recurse(|| match node {
        Node::IntLit(_) => vex_ir::make_int(ctx.arena),
        Node::FloatLit(_) => vex_ir::make_float(ctx.arena),
        Node::BoolLit(_) => make_bool(ctx.arena),
        Node::CharLit(_) => vex_ir::make_char(ctx.arena),
        Node::StringLit(_) => vex_ir::make_string(ctx.arena),
        Node::Identifier(name) => EnvFrame::lookup(env, name).unwrap_or_else(|| {
            TypeError::UndefinedIdentifier {
                name: (*name).to_string(),
            }
            .abort()
        }),
        Node::UnaryExpr { .. } => TypeError::UnsupportedUnary.abort(),
        Node::BinaryExpr { op, left, right } => check_binary(ctx, env, op, left, right),
        Node::VarDecl {
            annotation, init, ..
        } => check_var_decl(ctx, env, *annotation, init),
        Node::Block(stmts) => check_block(ctx, env, stmts).0,
        Node::If {
            cond,
            then_branch,
            else_branch,
        } => check_if(ctx, env, cond, then_branch, *else_branch),
        Node::List(elements) => check_list(ctx, env, elements),
        Node::Print { value, annotation } => check_print(ctx, env, value, annotation),
        Node::Function {
            name,
            params,
            return_annotation,
            body,
            ..
        } => check_function(ctx, env, name, params, *return_annotation, body),
        Node::Call { callee, args } => check_call(ctx, env, callee, args),
    })
}

fn check_var_decl<'a>(
    ctx: &Ctx<'a>,
    env: Env<'a>,
    annotation: Option<&'a str>,
    init: &'a Node<'a>,
) -> &'a Type<'a> {
    let init_ty = check_expr(ctx, env, init);
    match annotation {
        Some(a) => {
            let ann_ty = parse_type_annotation(ctx.arena, a).unwrap_or_else(|e| e.abort());
            if ann_ty != init_ty {
                TypeError::KindMismatch {
                    expected: type_to_string(ann_ty),
                    found: type_to_string(init_ty),
                }
                .abort();
            }
            ann_ty
        }
        None => init_ty,
    }
}

/// Sequential, non-destructive threading used by nested `Block`s (as
/// opposed to the root's two-phase pre-binding + full-environment pass).
fn check_block<'a>(ctx: &Ctx<'a>, env: Env<'a>, stmts: &'a [&'a Node<'a>]) -> (&'a Type<'a>, Env<'a>) {
    let mut cur_env = env;
    let mut last: Option<&'a Type<'a>> = None;
    for stmt in stmts {
        match stmt {
            Node::VarDecl {
                name,
                annotation,
                init,
            } => {
                let ty = check_var_decl(ctx, cur_env, *annotation, init);
                cur_env = Some(EnvFrame::extend(ctx.arena, cur_env, name, ty));
                last = Some(ty);
            }
            other => last = Some(check_expr(ctx, cur_env, other)),
        }
    }
    let ty = last.unwrap_or_else(|| TypeError::EmptyBlock.abort());
    (ty, cur_env)
}

fn check_if<'a>(
    ctx: &Ctx<'a>,
    env: Env<'a>,
    cond: &'a Node<'a>,
    then_branch: &'a Node<'a>,
    else_branch: Option<&'a Node<'a>>,
) -> &'a Type<'a> {
    let cond_ty = check_expr(ctx, env, cond);
    if !matches!(cond_ty, Type::Bool) {
        TypeError::KindMismatch {
            expected: "bool".to_string(),
            found: type_to_string(cond_ty),
        }
        .abort();
    }
    let then_ty = check_expr(ctx, env, then_branch);
    match else_branch {
        Some(else_node) => {
            let else_ty = check_expr(ctx, env, else_node);
            if then_ty != else_ty {
                TypeError::KindMismatch {
                    expected: type_to_string(then_ty),
                    found: type_to_string(else_ty),
                }
                .abort();
            }
            then_ty
        }
        None => then_ty,
    }
}

fn check_list<'a>(ctx: &Ctx<'a>, env: Env<'a>, elements: &'a [&'a Node<'a>]) -> &'a Type<'a> {
    let Some((first, rest)) = elements.split_first() else {
        TypeError::EmptyListInference.abort();
    };
    let first_ty = check_expr(ctx, env, first);
    for e in rest {
        let ty = check_expr(ctx, env, e);
        if ty != first_ty {
            TypeError::ListKindMismatch {
                expected: type_to_string(first_ty),
                found: type_to_string(ty),
            }
            .abort();
        }
    }
    make_list(ctx.arena, first_ty)
}

fn check_print<'a>(
    ctx: &Ctx<'a>,
    env: Env<'a>,
    value: &'a Node<'a>,
    annotation: &str,
) -> &'a Type<'a> {
    let value_ty = check_expr(ctx, env, value);
    let ann_ty = parse_type_annotation(ctx.arena, annotation).unwrap_or_else(|e| e.abort());
    if value_ty != ann_ty {
        TypeError::KindMismatch {
            expected: type_to_string(ann_ty),
            found: type_to_string(value_ty),
        }
        .abort();
    }
    value_ty
}

#[allow(clippy::too_many_arguments)]
fn check_function<'a>(
    ctx: &Ctx<'a>,
    env: Env<'a>,
    name: &'a str,
    params: &'a [Param<'a>],
    return_annotation: Option<&'a str>,
    body: &'a Node<'a>,
) -> &'a Type<'a> {
    // The root pre-binding pass already bound `name` to its (possibly
    // unresolved) signature before this ever runs, and `env` here is that
    // same full pre-bound chain — reuse that exact frame so the signature
    // refresh below updates the one frame later top-level statements look
    // up through. A function nested in a block with no pre-binding pass
    // (e.g. inside another function's body) has no such frame yet; bind one
    // now, on top of `env`, so the body can refer to itself.
    let (fn_frame, outer_env) = match EnvFrame::find(env, name) {
        Some(frame) => (frame, env),
        None => {
            let fn_type = function_type_from_annotations(ctx, params, return_annotation);
            let frame = EnvFrame::extend(ctx.arena, env, name, fn_type);
            (frame, Some(frame))
        }
    };
    let fn_type = fn_frame.ty();
    let Type::Function(_, ret_type) = fn_type else {
        unreachable!("fn_frame is always bound to Type::Function")
    };

    let mut body_env = outer_env;
    for p in params {
        let initial = match p.annotation {
            Some(a) => parse_type_annotation(ctx.arena, a).unwrap_or_else(|e| e.abort()),
            None => make_error(ctx.arena),
        };
        body_env = Some(EnvFrame::extend(ctx.arena, body_env, p.name, initial));
    }

    let body_ty = check_expr(ctx, body_env, body);

    let mut resolved_params: Vec<&'a Type<'a>> = Vec::with_capacity(params.len());
    for p in params {
        let resolved = EnvFrame::lookup(body_env, p.name)
            .expect("parameter frame was just bound above");
        if resolved.is_error() {
            TypeError::UninferrableParameter {
                name: p.name.to_string(),
            }
            .abort();
        }
        resolved_params.push(resolved);
    }

    if body_ty != *ret_type {
        TypeError::KindMismatch {
            expected: type_to_string(ret_type),
            found: type_to_string(body_ty),
        }
        .abort();
    }

    // Swap the pre-bound signature (whose parameter slots may still have
    // been `Error` before the body ran back-inference) for the resolved
    // one, so every caller that looks `name` up after this point — not just
    // a recursive self-call made mid-body — sees the true parameter kinds.
    let resolved_fn_type = make_function(ctx.arena, &resolved_params, ret_type);
    fn_frame.replace_resolved(resolved_fn_type);

    resolved_fn_type
}

fn check_call<'a>(
    ctx: &Ctx<'a>,
    env: Env<'a>,
    callee: &'a Node<'a>,
    args: &'a [&'a Node<'a>],
) -> &'a Type<'a> {
    let callee_ty = check_expr(ctx, env, callee);
    let Type::Function(params, ret) = callee_ty else {
        TypeError::NotCallable.abort();
    };

    if params.len() != args.len() {
        let name = match callee {
            Node::Identifier(n) => (*n).to_string(),
            _ => "<expr>".to_string(),
        };
        TypeError::ParamCountMismatch {
            name,
            expected: params.len(),
            found: args.len(),
        }
        .abort();
    }

    for (param_ty, arg) in params.iter().zip(args.iter()) {
        let arg_ty = check_expr(ctx, env, arg);
        // A still-unresolved (Error) parameter kind is the callee's own
        // concern (checked at the end of `check_function`); a recursive
        // self-call made before that resolution completes is not rejected
        // here, matching the "limited" scope of back-inference.
        if !param_ty.is_error() && *param_ty != arg_ty {
            TypeError::KindMismatch {
                expected: type_to_string(param_ty),
                found: type_to_string(arg_ty),
            }
            .abort();
        }
    }

    ret
}

// ===== Operator table and back-inference =====

fn check_binary<'a>(
    ctx: &Ctx<'a>,
    env: Env<'a>,
    op: &'a str,
    left: &'a Node<'a>,
    right: &'a Node<'a>,
) -> &'a Type<'a> {
    let left_ty = check_expr(ctx, env, left);
    let right_ty = check_expr(ctx, env, right);

    let left_ty = maybe_back_infer(ctx, env, left, left_ty, right_ty, op);
    let right_ty = maybe_back_infer(ctx, env, right, right_ty, left_ty, op);

    apply_operator(ctx, op, left_ty, right_ty)
}

/// If `node` is an identifier still bound to the `Error` placeholder and
/// `op`/`other_ty` pin down a concrete kind for it, rewrite its environment
/// frame exactly once (see `vex_ir::env`).
fn maybe_back_infer<'a>(
    ctx: &Ctx<'a>,
    env: Env<'a>,
    node: &'a Node<'a>,
    this_ty: &'a Type<'a>,
    other_ty: &'a Type<'a>,
    op: &str,
) -> &'a Type<'a> {
    if !this_ty.is_error() {
        return this_ty;
    }
    let Node::Identifier(name) = node else {
        return this_ty;
    };
    let Some(inferred) = infer_from_operator(ctx, op, other_ty) else {
        return this_ty;
    };
    if let Some(frame) = EnvFrame::find(env, name) {
        frame.update_in_place(inferred);
    }
    inferred
}

fn infer_from_operator<'a>(ctx: &Ctx<'a>, op: &str, other_ty: &'a Type<'a>) -> Option<&'a Type<'a>> {
    match op {
        "+" | "-" | "*" | "/" if matches!(other_ty, Type::Int) => Some(vex_ir::make_int(ctx.arena)),
        "+." | "-." | "*." | "/." if matches!(other_ty, Type::Float) => {
            Some(vex_ir::make_float(ctx.arena))
        }
        _ => None,
    }
}

fn apply_operator<'a>(
    ctx: &Ctx<'a>,
    op: &str,
    left_ty: &'a Type<'a>,
    right_ty: &'a Type<'a>,
) -> &'a Type<'a> {
    match op {
        "+" | "-" | "*" | "/" => {
            require_both(op, "int", left_ty, right_ty, |t| matches!(t, Type::Int));
            vex_ir::make_int(ctx.arena)
        }
        "+." | "-." | "*." | "/." => {
            require_both(op, "float", left_ty, right_ty, |t| matches!(t, Type::Float));
            vex_ir::make_float(ctx.arena)
        }
        "==" | "!=" | "<" | "<=" | ">" | ">=" => {
            let both_int = matches!(left_ty, Type::Int) && matches!(right_ty, Type::Int);
            let both_float = matches!(left_ty, Type::Float) && matches!(right_ty, Type::Float);
            if !both_int && !both_float {
                TypeError::BadOperatorKinds {
                    op: op.to_string(),
                    expected: "int or float".to_string(),
                }
                .abort();
            }
            make_bool(ctx.arena)
        }
        "&&" | "||" => {
            require_both(op, "bool", left_ty, right_ty, |t| matches!(t, Type::Bool));
            make_bool(ctx.arena)
        }
        _ => TypeError::BadOperatorKinds {
            op: op.to_string(),
            expected: "a recognized operator".to_string(),
        }
        .abort(),
    }
}

fn require_both(
    op: &str,
    expected_name: &str,
    left_ty: &Type<'_>,
    right_ty: &Type<'_>,
    is_expected: impl Fn(&Type<'_>) -> bool,
) {
    if !is_expected(left_ty) || !is_expected(right_ty) {
        TypeError::BadOperatorKinds {
            op: op.to_string(),
            expected: expected_name.to_string(),
        }
        .abort();
    }
}
