//! Hand-built syntax trees for the pass tests, standing in for the parser.
#![allow(dead_code)]

use ast::{
    ArithOp, BasicType, Expr, ExprKind, Function, FunctionCall, IdGen, Ident, LeftExpr, Literal,
    Loc, LogOp, Parameter, Program, RelOp, Stmt, TypeSpec, TypeSpecKind, UnOp, VarDecl, WriteArg,
};

/// Builds nodes the way the parser would: fresh ids, one source line per
/// construct so every error location is distinct.
pub struct Build {
    ids: IdGen,
    line: u32,
}

impl Build {
    pub fn new() -> Self {
        Self {
            ids: IdGen::default(),
            line: 0,
        }
    }

    fn loc(&mut self) -> Loc {
        self.line += 1;
        Loc::new(self.line, 1)
    }

    pub fn ident(&mut self, name: &str) -> Ident {
        Ident {
            id: self.ids.fresh(),
            loc: self.loc(),
            name: name.to_string(),
        }
    }

    fn expr(&mut self, kind: ExprKind) -> Expr {
        Expr {
            id: self.ids.fresh(),
            loc: self.loc(),
            kind,
        }
    }

    pub fn int(&mut self, value: i64) -> Expr {
        self.expr(ExprKind::Value(Literal::Int(value.to_string())))
    }

    pub fn float(&mut self, text: &str) -> Expr {
        self.expr(ExprKind::Value(Literal::Float(text.to_string())))
    }

    pub fn boolean(&mut self, value: bool) -> Expr {
        self.expr(ExprKind::Value(Literal::Bool(value)))
    }

    pub fn chr(&mut self, text: &str) -> Expr {
        self.expr(ExprKind::Value(Literal::Char(text.to_string())))
    }

    pub fn var(&mut self, name: &str) -> Expr {
        let ident = self.ident(name);
        self.expr(ExprKind::Ident(ident))
    }

    pub fn paren(&mut self, inner: Expr) -> Expr {
        self.expr(ExprKind::Paren(Box::new(inner)))
    }

    pub fn unary(&mut self, op: UnOp, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn arith(&mut self, op: ArithOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Arith {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn rel(&mut self, op: RelOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Rel {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn logical(&mut self, op: LogOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn index(&mut self, array: &str, index: Expr) -> Expr {
        let array = self.ident(array);
        self.expr(ExprKind::ArrayAccess {
            array,
            index: Box::new(index),
        })
    }

    pub fn call(&mut self, callee: &str, args: Vec<Expr>) -> FunctionCall {
        FunctionCall {
            id: self.ids.fresh(),
            loc: self.loc(),
            callee: self.ident(callee),
            args,
        }
    }

    pub fn call_expr(&mut self, callee: &str, args: Vec<Expr>) -> Expr {
        let call = self.call(callee, args);
        self.expr(ExprKind::Call(call))
    }

    pub fn lhs(&mut self, name: &str) -> LeftExpr {
        LeftExpr {
            id: self.ids.fresh(),
            loc: self.loc(),
            ident: self.ident(name),
            index: None,
        }
    }

    pub fn lhs_index(&mut self, name: &str, index: Expr) -> LeftExpr {
        LeftExpr {
            id: self.ids.fresh(),
            loc: self.loc(),
            ident: self.ident(name),
            index: Some(index),
        }
    }

    pub fn assign(&mut self, target: LeftExpr, value: Expr) -> Stmt {
        Stmt::Assign {
            loc: self.loc(),
            target,
            value,
        }
    }

    pub fn if_stmt(&mut self, cond: Expr, then_body: Vec<Stmt>) -> Stmt {
        Stmt::If {
            loc: self.loc(),
            cond,
            then_body,
            else_body: None,
        }
    }

    pub fn if_else(&mut self, cond: Expr, then_body: Vec<Stmt>, else_body: Vec<Stmt>) -> Stmt {
        Stmt::If {
            loc: self.loc(),
            cond,
            then_body,
            else_body: Some(else_body),
        }
    }

    pub fn while_stmt(&mut self, cond: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::While {
            loc: self.loc(),
            cond,
            body,
        }
    }

    pub fn proc_call(&mut self, callee: &str, args: Vec<Expr>) -> Stmt {
        let call = self.call(callee, args);
        Stmt::ProcCall {
            loc: self.loc(),
            call,
        }
    }

    pub fn read(&mut self, target: LeftExpr) -> Stmt {
        Stmt::Read {
            loc: self.loc(),
            target,
        }
    }

    pub fn write(&mut self, value: Expr) -> Stmt {
        Stmt::Write {
            loc: self.loc(),
            arg: WriteArg::Expr(value),
        }
    }

    pub fn write_str(&mut self, text: &str) -> Stmt {
        Stmt::Write {
            loc: self.loc(),
            arg: WriteArg::Str(text.to_string()),
        }
    }

    pub fn ret(&mut self, value: Option<Expr>) -> Stmt {
        Stmt::Return {
            loc: self.loc(),
            value,
        }
    }

    pub fn basic(&mut self, basic: BasicType) -> TypeSpec {
        TypeSpec {
            id: self.ids.fresh(),
            kind: TypeSpecKind::Basic(basic),
        }
    }

    pub fn array(&mut self, size: u32, elem: BasicType) -> TypeSpec {
        TypeSpec {
            id: self.ids.fresh(),
            kind: TypeSpecKind::Array { size, elem },
        }
    }

    pub fn param(&mut self, name: &str, ty: TypeSpec) -> Parameter {
        Parameter {
            id: self.ids.fresh(),
            loc: self.loc(),
            name: name.to_string(),
            ty,
        }
    }

    pub fn decl(&mut self, names: &[&str], ty: TypeSpec) -> VarDecl {
        let names = names.iter().map(|n| self.ident(n)).collect();
        VarDecl { ty, names }
    }

    pub fn func(
        &mut self,
        name: &str,
        params: Vec<Parameter>,
        ret: Option<TypeSpec>,
        decls: Vec<VarDecl>,
        body: Vec<Stmt>,
    ) -> Function {
        Function {
            id: self.ids.fresh(),
            loc: self.loc(),
            name: name.to_string(),
            params,
            ret,
            decls,
            body,
        }
    }

    /// `func main()` with no parameters and no return type.
    pub fn main(&mut self, decls: Vec<VarDecl>, body: Vec<Stmt>) -> Function {
        self.func("main", Vec::new(), None, decls, body)
    }

    pub fn program(&mut self, functions: Vec<Function>) -> Program {
        Program {
            id: self.ids.fresh(),
            functions,
        }
    }

    /// A whole program that is just a `main` body (plus declarations).
    pub fn main_program(&mut self, decls: Vec<VarDecl>, body: Vec<Stmt>) -> Program {
        let main = self.main(decls, body);
        self.program(vec![main])
    }
}
