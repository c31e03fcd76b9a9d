//! The lowering traversal: one walk of the AST per compilation, emitting IR
//! through `Cx`'s thin builder wrapper. Mirrors the tree-walking evaluator's
//! shape but stays entirely in the IR domain — every rule here has a sibling
//! rule in `vex_eval`.

use crate::annotation::{llvm_type_for_annotation, printf_format_for_annotation};
use crate::context::Cx;
use crate::locals::Locals;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::BasicType;
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, FunctionValue};
use rustc_hash::FxHashMap;
use vex_diagnostic::LoweringError;
use vex_ir::{Node, Param};

struct Functions<'ctx> {
    table: FxHashMap<String, FunctionValue<'ctx>>,
}

impl<'ctx> Functions<'ctx> {
    fn new() -> Self {
        Functions {
            table: FxHashMap::default(),
        }
    }
}

/// Reports a `LoweringError` and discards the builder result. The LLVM
/// builder calls used here only fail on malformed IR (type mismatches
/// between an instruction and its operands), which a well-formed, already
/// type-checked tree should never produce — but we never `unwrap` across an
/// FFI boundary, so a failure degrades to a diagnostic and an absent value
/// rather than a panic.
fn checked<T, E: std::fmt::Debug>(op: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            LoweringError::Malformed {
                detail: format!("{op}: {e:?}"),
            }
            .report();
            None
        }
    }
}

/// Lower a fully parsed and type-checked root to an LLVM module named
/// `module_name`. A `main` function is created whose body is the lowered
/// root; its return value is the root's last value handle, or a 64-bit zero
/// if the root produced no value.
#[must_use]
pub fn lower_module<'ctx>(context: &'ctx Context, module_name: &str, root: &Node) -> Module<'ctx> {
    let cx = Cx::new(context, module_name);
    let mut functions = Functions::new();

    let top_level: Vec<&Node> = match root {
        Node::Block(stmts) => stmts.to_vec(),
        other => vec![other],
    };

    predefine_functions(&cx, &mut functions, &top_level);

    let i64_ty = cx.type_i64();
    let main_ty = i64_ty.fn_type(&[], false);
    let main_fn = cx.module.add_function("main", main_ty, None);
    let entry = cx.llcx.append_basic_block(main_fn, "entry");
    cx.builder.position_at_end(entry);

    let mut locals = Locals::new();
    let mut last: Option<BasicValueEnum> = None;
    for stmt in &top_level {
        match stmt {
            Node::Function {
                name,
                params,
                body,
                ..
            } => {
                define_function(&cx, &functions, name, params, body);
                cx.builder.position_at_end(entry);
            }
            other => {
                if let Some(v) = lower_expr(&cx, &functions, &mut locals, other) {
                    last = Some(v);
                }
            }
        }
    }

    let ret = last
        .filter(BasicValueEnum::is_int_value)
        .unwrap_or_else(|| i64_ty.const_int(0, false).into());
    let _ = checked("main return", cx.builder.build_return(Some(&ret)));

    cx.module
}

fn predefine_functions<'ctx>(cx: &Cx<'ctx>, functions: &mut Functions<'ctx>, stmts: &[&Node]) {
    for stmt in stmts {
        if let Node::Function {
            name,
            params,
            return_annotation,
            ..
        } = stmt
        {
            let param_types: Vec<_> = params
                .iter()
                .map(|p| {
                    p.annotation
                        .and_then(|a| llvm_type_for_annotation(cx, a))
                        .unwrap_or_else(|| cx.type_i64().into())
                })
                .map(inkwell::types::BasicMetadataTypeEnum::from)
                .collect();
            let ret_ty = return_annotation
                .and_then(|a| llvm_type_for_annotation(cx, a))
                .unwrap_or_else(|| cx.type_i64().into());
            let fn_ty = ret_ty.fn_type(&param_types, false);
            let f = cx.module.add_function(name, fn_ty, None);
            functions.table.insert((*name).to_string(), f);
        }
    }
}

fn define_function<'ctx>(
    cx: &Cx<'ctx>,
    functions: &Functions<'ctx>,
    name: &str,
    params: &[Param],
    body: &Node,
) {
    let Some(&f) = functions.table.get(name) else {
        LoweringError::Malformed {
            detail: format!("function '{name}' was not predeclared"),
        }
        .report();
        return;
    };

    let entry = cx.llcx.append_basic_block(f, "entry");
    cx.builder.position_at_end(entry);

    let mut locals = Locals::new();
    for (i, param) in params.iter().enumerate() {
        let Some(arg) = f.get_nth_param(i as u32) else {
            continue;
        };
        let ty = param
            .annotation
            .and_then(|a| llvm_type_for_annotation(cx, a))
            .unwrap_or_else(|| cx.type_i64().into());
        let Some(slot) = checked("param alloca", cx.builder.build_alloca(ty, param.name)) else {
            continue;
        };
        let _ = checked("param store", cx.builder.build_store(slot, arg));
        locals.bind(param.name, slot, ty);
    }

    let ret_ty = f.get_type().get_return_type();
    let body_val = lower_expr(cx, functions, &mut locals, body);
    match (body_val, ret_ty) {
        (Some(v), _) => {
            let _ = checked("function return", cx.builder.build_return(Some(&v)));
        }
        (None, Some(ty)) => {
            let zero = zero_of(cx, ty);
            let _ = checked("function return", cx.builder.build_return(Some(&zero)));
        }
        (None, None) => {
            let _ = checked("function return", cx.builder.build_return(None));
        }
    }
}

fn zero_of<'ctx>(cx: &Cx<'ctx>, ty: inkwell::types::BasicTypeEnum<'ctx>) -> BasicValueEnum<'ctx> {
    use inkwell::types::BasicTypeEnum;
    match ty {
        BasicTypeEnum::IntType(t) => t.const_int(0, false).into(),
        BasicTypeEnum::FloatType(t) => t.const_float(0.0).into(),
        BasicTypeEnum::PointerType(t) => t.const_null().into(),
        _ => cx.type_i64().const_int(0, false).into(),
    }
}

fn lower_expr<'ctx>(
    cx: &Cx<'ctx>,
    functions: &Functions<'ctx>,
    locals: &mut Locals<'ctx>,
    node: &Node,
) -> Option<BasicValueEnum<'ctx>> {
    match node {
        Node::IntLit(v) => Some(cx.type_i64().const_int(*v as u64, true).into()),
        Node::FloatLit(v) => Some(cx.type_f64().const_float(*v).into()),
        Node::BoolLit(v) => Some(cx.type_i1().const_int(u64::from(*v), false).into()),
        Node::CharLit(v) => Some(cx.type_i8().const_int(u64::from(*v), false).into()),
        Node::StringLit(s) => intern_string(cx, s),
        Node::Identifier(name) => lower_identifier(cx, locals, name),
        Node::UnaryExpr { .. } => {
            LoweringError::UnsupportedNode { kind: "UnaryExpr" }.report();
            None
        }
        Node::BinaryExpr { op, left, right } => lower_binary(cx, functions, locals, op, left, right),
        Node::Block(stmts) => {
            let mut last = None;
            for stmt in *stmts {
                if let Some(v) = lower_stmt(cx, functions, locals, stmt) {
                    last = Some(v);
                }
            }
            last
        }
        Node::If {
            cond,
            then_branch,
            else_branch,
        } => lower_if(cx, functions, locals, cond, then_branch, *else_branch),
        Node::List(_) => {
            LoweringError::UnsupportedNode { kind: "List" }.report();
            None
        }
        Node::Print { value, annotation } => lower_print(cx, functions, locals, value, annotation),
        Node::Function { .. } => {
            LoweringError::Malformed {
                detail: "nested function definitions are not lowered".to_string(),
            }
            .report();
            None
        }
        Node::Call { callee, args } => lower_call(cx, functions, locals, callee, args),
        Node::VarDecl { .. } => lower_stmt(cx, functions, locals, node),
    }
}

fn lower_stmt<'ctx>(
    cx: &Cx<'ctx>,
    functions: &Functions<'ctx>,
    locals: &mut Locals<'ctx>,
    node: &Node,
) -> Option<BasicValueEnum<'ctx>> {
    match node {
        Node::VarDecl {
            name,
            annotation,
            init,
        } => {
            let value = lower_expr(cx, functions, locals, init)?;
            let ty = annotation
                .and_then(|a| llvm_type_for_annotation(cx, a))
                .unwrap_or_else(|| value.get_type());
            let slot = checked("var slot alloca", cx.builder.build_alloca(ty, name))?;
            let _ = checked("var store", cx.builder.build_store(slot, value));
            locals.bind(name, slot, ty);
            Some(value)
        }
        Node::Function { .. } => {
            LoweringError::Malformed {
                detail: "nested function definitions are not lowered".to_string(),
            }
            .report();
            None
        }
        other => lower_expr(cx, functions, locals, other),
    }
}

fn lower_identifier<'ctx>(cx: &Cx<'ctx>, locals: &Locals<'ctx>, name: &str) -> Option<BasicValueEnum<'ctx>> {
    let Some((slot, ty)) = locals.get(name) else {
        LoweringError::Malformed {
            detail: format!("unresolved identifier '{name}'"),
        }
        .report();
        return None;
    };
    checked("identifier load", cx.builder.build_load(ty, slot, name))
}

fn intern_string<'ctx>(cx: &Cx<'ctx>, s: &str) -> Option<BasicValueEnum<'ctx>> {
    let name = cx.next_string_name();
    let ptr = checked("string intern", cx.builder.build_global_string_ptr(s, &name))?;
    Some(ptr.as_pointer_value().into())
}

fn lower_binary<'ctx>(
    cx: &Cx<'ctx>,
    functions: &Functions<'ctx>,
    locals: &mut Locals<'ctx>,
    op: &str,
    left: &Node,
    right: &Node,
) -> Option<BasicValueEnum<'ctx>> {
    let l = lower_expr(cx, functions, locals, left)?;
    let r = lower_expr(cx, functions, locals, right)?;
    let b = &cx.builder;
    match (op, l, r) {
        ("+", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => {
            Some(checked("iadd", b.build_int_add(a, v, "addtmp"))?.into())
        }
        ("-", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => {
            Some(checked("isub", b.build_int_sub(a, v, "subtmp"))?.into())
        }
        ("*", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => {
            Some(checked("imul", b.build_int_mul(a, v, "multmp"))?.into())
        }
        ("/", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => {
            Some(checked("sdiv", b.build_int_signed_div(a, v, "divtmp"))?.into())
        }
        ("+.", BasicValueEnum::FloatValue(a), BasicValueEnum::FloatValue(v)) => {
            Some(checked("fadd", b.build_float_add(a, v, "faddtmp"))?.into())
        }
        ("-.", BasicValueEnum::FloatValue(a), BasicValueEnum::FloatValue(v)) => {
            Some(checked("fsub", b.build_float_sub(a, v, "fsubtmp"))?.into())
        }
        ("*.", BasicValueEnum::FloatValue(a), BasicValueEnum::FloatValue(v)) => {
            Some(checked("fmul", b.build_float_mul(a, v, "fmultmp"))?.into())
        }
        ("/.", BasicValueEnum::FloatValue(a), BasicValueEnum::FloatValue(v)) => {
            Some(checked("fdiv", b.build_float_div(a, v, "fdivtmp"))?.into())
        }
        ("<", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => Some(
            checked(
                "icmp",
                b.build_int_compare(inkwell::IntPredicate::SLT, a, v, "cmptmp"),
            )?
            .into(),
        ),
        ("<=", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => Some(
            checked(
                "icmp",
                b.build_int_compare(inkwell::IntPredicate::SLE, a, v, "cmptmp"),
            )?
            .into(),
        ),
        (">", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => Some(
            checked(
                "icmp",
                b.build_int_compare(inkwell::IntPredicate::SGT, a, v, "cmptmp"),
            )?
            .into(),
        ),
        (">=", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => Some(
            checked(
                "icmp",
                b.build_int_compare(inkwell::IntPredicate::SGE, a, v, "cmptmp"),
            )?
            .into(),
        ),
        ("==", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => Some(
            checked(
                "icmp",
                b.build_int_compare(inkwell::IntPredicate::EQ, a, v, "cmptmp"),
            )?
            .into(),
        ),
        ("!=", BasicValueEnum::IntValue(a), BasicValueEnum::IntValue(v)) => Some(
            checked(
                "icmp",
                b.build_int_compare(inkwell::IntPredicate::NE, a, v, "cmptmp"),
            )?
            .into(),
        ),
        _ => {
            LoweringError::Malformed {
                detail: format!("operator '{op}' is not applicable to these operand kinds"),
            }
            .report();
            None
        }
    }
}

fn lower_if<'ctx>(
    cx: &Cx<'ctx>,
    functions: &Functions<'ctx>,
    locals: &mut Locals<'ctx>,
    cond: &Node,
    then_branch: &Node,
    else_branch: Option<&Node>,
) -> Option<BasicValueEnum<'ctx>> {
    let Some(BasicValueEnum::IntValue(cond_val)) = lower_expr(cx, functions, locals, cond) else {
        LoweringError::Malformed {
            detail: "if condition did not lower to an integer value".to_string(),
        }
        .report();
        return None;
    };

    let parent = cx.builder.get_insert_block()?.get_parent()?;
    let then_bb = cx.llcx.append_basic_block(parent, "then");
    let else_bb = cx.llcx.append_basic_block(parent, "else");
    let merge_bb = cx.llcx.append_basic_block(parent, "ifmerge");

    let _ = checked(
        "if condbr",
        cx.builder.build_conditional_branch(cond_val, then_bb, else_bb),
    );

    cx.builder.position_at_end(then_bb);
    let then_val = lower_expr(cx, functions, locals, then_branch);
    let then_end = cx.builder.get_insert_block()?;
    let _ = checked("if then-br", cx.builder.build_unconditional_branch(merge_bb));

    cx.builder.position_at_end(else_bb);
    let else_val = else_branch.and_then(|e| lower_expr(cx, functions, locals, e));
    let else_end = cx.builder.get_insert_block()?;
    let _ = checked("if else-br", cx.builder.build_unconditional_branch(merge_bb));

    cx.builder.position_at_end(merge_bb);
    match (then_val, else_val) {
        (Some(t), Some(e)) if t.get_type() == e.get_type() => {
            let phi = checked("if phi", cx.builder.build_phi(t.get_type(), "ifval"))?;
            phi.add_incoming(&[(&t, then_end), (&e, else_end)]);
            Some(phi.as_basic_value())
        }
        (Some(t), _) => Some(t),
        (None, Some(e)) => Some(e),
        (None, None) => None,
    }
}

fn lower_print<'ctx>(
    cx: &Cx<'ctx>,
    functions: &Functions<'ctx>,
    locals: &mut Locals<'ctx>,
    value: &Node,
    annotation: &str,
) -> Option<BasicValueEnum<'ctx>> {
    let v = lower_expr(cx, functions, locals, value)?;
    let Some(fmt) = printf_format_for_annotation(annotation) else {
        LoweringError::Malformed {
            detail: format!("unrecognized print annotation '{annotation}'"),
        }
        .report();
        return None;
    };
    let fmt_name = cx.next_string_name();
    let fmt_ptr = checked(
        "print format string",
        cx.builder.build_global_string_ptr(fmt, &fmt_name),
    )?
    .as_pointer_value();

    let arg: BasicMetadataValueEnum = if annotation == "bool" {
        let BasicValueEnum::IntValue(b) = v else {
            LoweringError::Malformed {
                detail: "print(bool) received a non-bool value".to_string(),
            }
            .report();
            return None;
        };
        checked(
            "bool zext",
            cx.builder.build_int_z_extend(b, cx.type_i32(), "boolext"),
        )?
        .into()
    } else {
        v.into()
    };

    let _ = checked(
        "printf call",
        cx.builder.build_call(cx.printf(), &[fmt_ptr.into(), arg], "printf_call"),
    );
    Some(v)
}

fn lower_call<'ctx>(
    cx: &Cx<'ctx>,
    functions: &Functions<'ctx>,
    locals: &mut Locals<'ctx>,
    callee: &Node,
    args: &[&Node],
) -> Option<BasicValueEnum<'ctx>> {
    let Node::Identifier(name) = callee else {
        LoweringError::Malformed {
            detail: "call target is not a simple function reference".to_string(),
        }
        .report();
        return None;
    };
    let Some(&f) = functions.table.get(*name) else {
        LoweringError::Malformed {
            detail: format!("call to undeclared function '{name}'"),
        }
        .report();
        return None;
    };

    let mut arg_vals: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
    for a in args {
        let v = lower_expr(cx, functions, locals, a)?;
        arg_vals.push(v.into());
    }
    let call = checked("call", cx.builder.build_call(f, &arg_vals, "calltmp"))?;
    call.try_as_basic_value().left()
}
