//! Second pass: give every expression and left-expression its type and
//! l-value flag, and collect the semantic errors.
//!
//! Cascading errors are suppressed: every rule guards its operands with
//! `is_error`, and an identifier that failed to resolve becomes an l-value
//! of the error type so neither the read nor the assignment around it
//! complains a second time.

use crate::Compilation;
use ast::types::TypeId;
use ast::{
    Expr, ExprKind, Function, FunctionCall, Ident, LeftExpr, Literal, Program, Stmt, UnOp, WriteArg,
};

pub fn check(program: &Program, cx: &mut Compilation) {
    cx.symbols.push_scope(cx.decor.scope(program.id));
    for f in &program.functions {
        function(f, cx);
    }
    if cx.symbols.no_main_properly_declared(&cx.types) {
        cx.errors.no_main_properly_declared();
    }
    cx.symbols.pop_scope();
}

fn function(f: &Function, cx: &mut Compilation) {
    cx.symbols.push_scope(cx.decor.scope(f.id));
    // a duplicate function declaration carries no type decoration; the
    // error sentinel mutes every return check in its body
    let fn_ty = cx.decor.try_ty(f.id).unwrap_or_else(|| cx.types.error_ty());
    for s in &f.body {
        statement(s, fn_ty, cx);
    }
    cx.symbols.pop_scope();
}

fn statement(s: &Stmt, fn_ty: TypeId, cx: &mut Compilation) {
    match s {
        Stmt::Assign { loc, target, value } => {
            left_expr(target, cx);
            expr(value, cx);
            let t1 = cx.decor.ty(target.id);
            let t2 = cx.decor.ty(value.id);
            if !cx.types.is_error(t1) && !cx.types.is_error(t2) && !cx.types.copyable(t1, t2) {
                cx.errors.incompatible_assignment(*loc);
            }
            if !cx.types.is_error(t1) && !cx.decor.lvalue(target.id) {
                cx.errors.non_referenceable_left_expr(target.loc);
            }
        }
        Stmt::If { loc, cond, then_body, else_body } => {
            expr(cond, cx);
            let t = cx.decor.ty(cond.id);
            if !cx.types.is_error(t) && !cx.types.is_boolean(t) {
                cx.errors.boolean_required(*loc);
            }
            for s in then_body {
                statement(s, fn_ty, cx);
            }
            for s in else_body.iter().flatten() {
                statement(s, fn_ty, cx);
            }
        }
        Stmt::While { loc, cond, body } => {
            expr(cond, cx);
            let t = cx.decor.ty(cond.id);
            if !cx.types.is_error(t) && !cx.types.is_boolean(t) {
                cx.errors.boolean_required(*loc);
            }
            for s in body {
                statement(s, fn_ty, cx);
            }
        }
        Stmt::ProcCall { call, .. } => {
            function_call(call, cx);
        }
        Stmt::Read { loc, target } => {
            left_expr(target, cx);
            let t = cx.decor.ty(target.id);
            if !cx.types.is_error(t) && !cx.types.is_primitive(t) && !cx.types.is_function(t) {
                cx.errors.read_write_require_basic(*loc);
            }
            if !cx.types.is_error(t) && !cx.decor.lvalue(target.id) {
                cx.errors.non_referenceable_expression(*loc);
            }
        }
        Stmt::Write { loc, arg } => match arg {
            WriteArg::Expr(e) => {
                expr(e, cx);
                let t = cx.decor.ty(e.id);
                if !cx.types.is_error(t) && !cx.types.is_primitive(t) {
                    cx.errors.read_write_require_basic(*loc);
                }
            }
            WriteArg::Str(_) => {}
        },
        Stmt::Return { loc, value } => {
            let t1 = match value {
                Some(e) => {
                    expr(e, cx);
                    cx.decor.ty(e.id)
                }
                None => cx.types.void_ty(),
            };
            // the return expression must be assignable to the declared
            // return type, not the other way around
            if !cx.types.is_error(fn_ty) {
                let ret = cx.types.func_return(fn_ty);
                if !cx.types.copyable(ret, t1) {
                    cx.errors.incompatible_return(*loc);
                }
            }
        }
    }
}

fn left_expr(le: &LeftExpr, cx: &mut Compilation) {
    ident(&le.ident, cx);
    let t1 = cx.decor.ty(le.ident.id);
    match &le.index {
        Some(index) => {
            if !cx.types.is_error(t1) && !cx.types.is_array(t1) {
                cx.errors.non_array_in_array_access(le.loc);
            }
            expr(index, cx);
            let t2 = cx.decor.ty(index.id);
            if !cx.types.is_error(t2) && !cx.types.is_integer(t2) {
                cx.errors.non_integer_index_in_array_access(index.loc);
            }
            let (ty, lvalue) = if cx.types.is_array(t1) {
                (cx.types.array_elem(t1), true)
            } else {
                (cx.types.error_ty(), false)
            };
            cx.decor.put_ty(le.id, ty);
            cx.decor.put_lvalue(le.id, lvalue);
        }
        None => {
            cx.decor.put_ty(le.id, t1);
            cx.decor.put_lvalue(le.id, cx.decor.lvalue(le.ident.id));
        }
    }
}

fn expr(e: &Expr, cx: &mut Compilation) {
    match &e.kind {
        ExprKind::Value(lit) => {
            let ty = match lit {
                Literal::Int(_) => cx.types.integer_ty(),
                Literal::Float(_) => cx.types.float_ty(),
                Literal::Bool(_) => cx.types.boolean_ty(),
                Literal::Char(_) => cx.types.character_ty(),
            };
            cx.decor.put_ty(e.id, ty);
            cx.decor.put_lvalue(e.id, false);
        }
        ExprKind::Ident(id) => {
            ident(id, cx);
            cx.decor.put_ty(e.id, cx.decor.ty(id.id));
            cx.decor.put_lvalue(e.id, cx.decor.lvalue(id.id));
        }
        ExprKind::Paren(inner) => {
            expr(inner, cx);
            cx.decor.put_ty(e.id, cx.decor.ty(inner.id));
            cx.decor.put_lvalue(e.id, false);
        }
        ExprKind::Unary { op, operand } => {
            expr(operand, cx);
            let t1 = cx.decor.ty(operand.id);
            let ty = if cx.types.is_error(t1) {
                t1
            } else {
                match op {
                    // '+' passes its operand through untouched, like a
                    // parenthesis
                    UnOp::Plus => t1,
                    UnOp::Not => {
                        if !cx.types.is_boolean(t1) {
                            cx.errors.incompatible_operator(e.loc, op.as_str());
                        }
                        cx.types.boolean_ty()
                    }
                    UnOp::Minus => {
                        if !cx.types.is_numeric(t1) {
                            cx.errors.incompatible_operator(e.loc, op.as_str());
                        }
                        if cx.types.is_float(t1) {
                            cx.types.float_ty()
                        } else {
                            cx.types.integer_ty()
                        }
                    }
                }
            };
            cx.decor.put_ty(e.id, ty);
            cx.decor.put_lvalue(e.id, false);
        }
        ExprKind::Arith { op, left, right } => {
            expr(left, cx);
            expr(right, cx);
            let t1 = cx.decor.ty(left.id);
            let t2 = cx.decor.ty(right.id);
            let ty = if *op == ast::ArithOp::Mod {
                // both sides must be integers, no float form of '%'
                if (!cx.types.is_error(t1) && !cx.types.is_integer(t1))
                    || (!cx.types.is_error(t2) && !cx.types.is_integer(t2))
                {
                    cx.errors.incompatible_operator(e.loc, op.as_str());
                }
                cx.types.integer_ty()
            } else {
                if (!cx.types.is_error(t1) && !cx.types.is_numeric(t1))
                    || (!cx.types.is_error(t2) && !cx.types.is_numeric(t2))
                {
                    cx.errors.incompatible_operator(e.loc, op.as_str());
                }
                if cx.types.is_float(t1) || cx.types.is_float(t2) {
                    cx.types.float_ty()
                } else {
                    cx.types.integer_ty()
                }
            };
            cx.decor.put_ty(e.id, ty);
            cx.decor.put_lvalue(e.id, false);
        }
        ExprKind::Rel { op, left, right } => {
            expr(left, cx);
            expr(right, cx);
            let t1 = cx.decor.ty(left.id);
            let t2 = cx.decor.ty(right.id);
            if !cx.types.is_error(t1)
                && !cx.types.is_error(t2)
                && !cx.types.comparable(t1, t2, *op)
            {
                cx.errors.incompatible_operator(e.loc, op.as_str());
            }
            cx.decor.put_ty(e.id, cx.types.boolean_ty());
            cx.decor.put_lvalue(e.id, false);
        }
        ExprKind::Logical { op, left, right } => {
            expr(left, cx);
            expr(right, cx);
            let t1 = cx.decor.ty(left.id);
            let t2 = cx.decor.ty(right.id);
            if (!cx.types.is_error(t1) && !cx.types.is_boolean(t1))
                || (!cx.types.is_error(t2) && !cx.types.is_boolean(t2))
            {
                cx.errors.incompatible_operator(e.loc, op.as_str());
            }
            cx.decor.put_ty(e.id, cx.types.boolean_ty());
            cx.decor.put_lvalue(e.id, false);
        }
        ExprKind::ArrayAccess { array, index } => {
            ident(array, cx);
            let t1 = cx.decor.ty(array.id);
            if !cx.types.is_error(t1) && !cx.types.is_array(t1) {
                cx.errors.non_array_in_array_access(e.loc);
            }
            expr(index, cx);
            let t2 = cx.decor.ty(index.id);
            if !cx.types.is_error(t2) && !cx.types.is_integer(t2) {
                cx.errors.non_integer_index_in_array_access(index.loc);
            }
            let (ty, lvalue) = if cx.types.is_array(t1) {
                (cx.types.array_elem(t1), true)
            } else {
                (cx.types.error_ty(), false)
            };
            cx.decor.put_ty(e.id, ty);
            cx.decor.put_lvalue(e.id, lvalue);
        }
        ExprKind::Call(call) => {
            function_call(call, cx);
            let mut ty = cx.decor.ty(call.id);
            let mut lvalue = cx.decor.lvalue(call.id);
            // a procedure call yields no value to use in an expression
            if cx.types.is_void(ty) {
                cx.errors.is_not_function(call.loc);
                ty = cx.types.error_ty();
                lvalue = false;
            }
            cx.decor.put_ty(e.id, ty);
            cx.decor.put_lvalue(e.id, lvalue);
        }
    }
}

fn function_call(call: &FunctionCall, cx: &mut Compilation) {
    ident(&call.callee, cx);
    let fn_ty = cx.decor.ty(call.callee.id);

    if !cx.types.is_function(fn_ty) && !cx.types.is_error(fn_ty) {
        cx.errors.is_not_callable(call.callee.loc, &call.callee.name);
    }
    for arg in &call.args {
        expr(arg, cx);
    }

    if cx.types.is_function(fn_ty) {
        cx.decor.put_ty(call.id, cx.types.func_return(fn_ty));
        if call.args.len() != cx.types.func_arity(fn_ty) {
            cx.errors.number_of_parameters(call.callee.loc, &call.callee.name);
        } else {
            for (i, arg) in call.args.iter().enumerate() {
                let t_arg = cx.decor.ty(arg.id);
                let t_formal = cx.types.func_param(fn_ty, i);
                if !cx.types.is_error(t_arg) && !cx.types.copyable(t_formal, t_arg) {
                    cx.errors.incompatible_parameter(arg.loc, i + 1);
                }
            }
        }
    } else {
        cx.decor.put_ty(call.id, cx.types.error_ty());
    }
    cx.decor.put_lvalue(call.id, cx.decor.lvalue(call.callee.id));
}

fn ident(id: &Ident, cx: &mut Compilation) {
    if cx.symbols.find_in_stack(&id.name).is_none() {
        cx.errors.undeclared_ident(id.loc, &id.name);
        cx.decor.put_ty(id.id, cx.types.error_ty());
        cx.decor.put_lvalue(id.id, true);
    } else {
        let ty = cx.symbols.get_type(&id.name).unwrap();
        cx.decor.put_ty(id.id, ty);
        cx.decor.put_lvalue(id.id, !cx.symbols.is_function_class(&id.name));
    }
}
