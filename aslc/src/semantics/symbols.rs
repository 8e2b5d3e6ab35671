//! First pass: walk the declarations, build the scopes, intern the types.
//!
//! Each function gets a fresh scope named after it; parameters and locals
//! register inside that scope, and the function symbol itself lands in the
//! enclosing scope only after the inner scope is popped. That makes a
//! function visible to its siblings while its parameters still shadow
//! globals.

use crate::Compilation;
use ast::types::TypeId;
use ast::{BasicType, Function, Parameter, Program, TypeSpec, TypeSpecKind, VarDecl};
use symtab::GLOBAL_SCOPE;

pub fn collect(program: &Program, cx: &mut Compilation) {
    let scope = cx.symbols.push_new_scope(GLOBAL_SCOPE);
    cx.decor.put_scope(program.id, scope);
    for f in &program.functions {
        function(f, cx);
    }
    cx.symbols.pop_scope();
}

fn function(f: &Function, cx: &mut Compilation) {
    let scope = cx.symbols.push_new_scope(&f.name);
    cx.decor.put_scope(f.id, scope);

    let mut param_tys = Vec::with_capacity(f.params.len());
    for p in &f.params {
        param_tys.push(parameter(p, cx));
    }
    for d in &f.decls {
        var_decl(d, cx);
    }
    cx.symbols.pop_scope();

    if cx.symbols.find_in_current_scope(&f.name) {
        cx.errors.declared_ident(f.loc, &f.name);
    } else {
        let ret = match &f.ret {
            Some(spec) => type_spec(spec, cx),
            None => cx.types.void_ty(),
        };
        let fn_ty = cx.types.function_ty(param_tys, ret);
        cx.decor.put_ty(f.id, fn_ty);
        cx.symbols.add_function(&f.name, fn_ty);
    }
}

fn parameter(p: &Parameter, cx: &mut Compilation) -> TypeId {
    let ty = type_spec(&p.ty, cx);
    cx.decor.put_ty(p.id, ty);
    if cx.symbols.find_in_current_scope(&p.name) {
        cx.errors.declared_ident(p.loc, &p.name);
    } else {
        cx.symbols.add_parameter(&p.name, ty);
    }
    ty
}

fn var_decl(d: &VarDecl, cx: &mut Compilation) {
    let ty = type_spec(&d.ty, cx);
    for name in &d.names {
        if cx.symbols.find_in_current_scope(&name.name) {
            cx.errors.declared_ident(name.loc, &name.name);
        } else {
            cx.symbols.add_local_var(&name.name, ty);
        }
    }
}

fn type_spec(spec: &TypeSpec, cx: &mut Compilation) -> TypeId {
    let ty = match spec.kind {
        TypeSpecKind::Basic(b) => basic(b, cx),
        TypeSpecKind::Array { size, elem } => {
            let elem = basic(elem, cx);
            cx.types.array_ty(size, elem)
        }
    };
    cx.decor.put_ty(spec.id, ty);
    ty
}

fn basic(b: BasicType, cx: &Compilation) -> TypeId {
    match b {
        BasicType::Int => cx.types.integer_ty(),
        BasicType::Float => cx.types.float_ty(),
        BasicType::Bool => cx.types.boolean_ty(),
        BasicType::Char => cx.types.character_ty(),
    }
}
