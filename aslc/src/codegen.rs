//! Three-address-code generation.
//!
//! Runs only on a clean tree: every expression node already carries its
//! type, so the pass just reads decorations and emits. Each expression
//! yields an [`Addr`]: the symbolic location of its value and, when the
//! value still lives inside an array, the symbolic offset to it.
//!
//! Arrays are passed by reference. A parameter of array type therefore
//! holds a base pointer, and every use of it as a base goes through a
//! `LOAD` into a temporary first.

use crate::decor::Decorations;
use crate::Compilation;
use ast::types::{TypeId, Types};
use ast::{
    ArithOp, Expr, ExprKind, Function, FunctionCall, LeftExpr, Literal, Program, RelOp, Stmt,
    UnOp, WriteArg,
};
use symtab::SymTable;
use tac::{BinOp, Instr};

pub fn emit(program: &Program, cx: &mut Compilation) -> tac::Program {
    cx.symbols.push_scope(cx.decor.scope(program.id));
    let mut subs = Vec::with_capacity(program.functions.len());
    for f in &program.functions {
        subs.push(function(f, cx));
    }
    cx.symbols.pop_scope();
    tac::Program(subs)
}

fn function(f: &Function, cx: &mut Compilation) -> tac::Subroutine {
    cx.symbols.push_scope(cx.decor.scope(f.id));
    let mut g = Gen::new(&cx.types, &cx.symbols, &cx.decor);
    let sub = g.subroutine(f);
    cx.symbols.pop_scope();
    sub
}

/// Value location of an expression: the address holding it, plus the
/// offset when the address is an array base the value sits in.
struct Addr {
    addr: String,
    offs: Option<String>,
}

impl Addr {
    fn plain(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            offs: None,
        }
    }
}

struct Gen<'a> {
    types: &'a Types,
    symbols: &'a SymTable,
    decor: &'a Decorations,
    // all three reset at each subroutine boundary
    temps: u32,
    if_labels: u32,
    while_labels: u32,
}

impl<'a> Gen<'a> {
    fn new(types: &'a Types, symbols: &'a SymTable, decor: &'a Decorations) -> Self {
        Self {
            types,
            symbols,
            decor,
            temps: 0,
            if_labels: 0,
            while_labels: 0,
        }
    }

    fn temp(&mut self) -> String {
        let n = self.temps;
        self.temps += 1;
        format!("%{n}")
    }

    fn if_label(&mut self) -> u32 {
        self.if_labels += 1;
        self.if_labels
    }

    fn while_label(&mut self) -> u32 {
        self.while_labels += 1;
        self.while_labels
    }

    fn subroutine(&mut self, f: &Function) -> tac::Subroutine {
        let mut sub = tac::Subroutine::new(&f.name);

        // the caller allocates a slot for the result ahead of the arguments
        if let Some(ret) = &f.ret {
            let t = self.decor.ty(ret.id);
            sub.params.push(tac::Param {
                name: "_result".to_string(),
                tag: self.types.tag(t).to_string(),
                by_ref: false,
            });
        }
        for p in &f.params {
            let t = self.decor.ty(p.id);
            sub.params.push(tac::Param {
                name: p.name.clone(),
                tag: self.types.tag(t).to_string(),
                by_ref: self.types.is_array(t),
            });
        }
        for d in &f.decls {
            let t = self.decor.ty(d.ty.id);
            let size = self.types.size_of(t);
            let tag = self.types.tag(t);
            for name in &d.names {
                sub.vars.push(tac::Var {
                    name: name.name.clone(),
                    tag: tag.to_string(),
                    size,
                });
            }
        }

        let mut code = Vec::new();
        for s in &f.body {
            self.statement(s, &mut code);
        }
        code.push(Instr::Return);
        sub.instrs = code;
        sub
    }

    fn statement(&mut self, s: &Stmt, code: &mut Vec<Instr>) {
        match s {
            Stmt::Assign { target, value, .. } => self.assign(target, value, code),
            Stmt::If { cond, then_body, else_body, .. } => {
                let c = self.rvalue(cond, code);
                let mut then_code = Vec::new();
                for s in then_body {
                    self.statement(s, &mut then_code);
                }
                let n = self.if_label();
                match else_body {
                    Some(else_body) => {
                        let else_label = format!("else{n}");
                        let endif = format!("endif{n}");
                        code.push(Instr::FJump { cond: c, label: else_label.clone() });
                        code.append(&mut then_code);
                        code.push(Instr::UJump { label: endif.clone() });
                        code.push(Instr::Label { name: else_label });
                        for s in else_body {
                            self.statement(s, code);
                        }
                        code.push(Instr::Label { name: endif });
                    }
                    None => {
                        let endif = format!("endif{n}");
                        code.push(Instr::FJump { cond: c, label: endif.clone() });
                        code.append(&mut then_code);
                        code.push(Instr::Label { name: endif });
                    }
                }
            }
            Stmt::While { cond, body, .. } => {
                let mut cond_code = Vec::new();
                let c = self.rvalue(cond, &mut cond_code);
                let mut body_code = Vec::new();
                for s in body {
                    self.statement(s, &mut body_code);
                }
                let n = self.while_label();
                let start = format!("while{n}");
                let end = format!("endwhile{n}");
                code.push(Instr::Label { name: start.clone() });
                code.append(&mut cond_code);
                code.push(Instr::FJump { cond: c, label: end.clone() });
                code.append(&mut body_code);
                code.push(Instr::UJump { label: start });
                code.push(Instr::Label { name: end });
            }
            Stmt::ProcCall { call, .. } => {
                // same sequence as a call expression, result discarded
                self.function_call(call, code);
            }
            Stmt::Read { target, .. } => {
                let la = self.left_expr(target, code);
                let t = self.decor.ty(target.id);
                match la.offs {
                    Some(offs) => {
                        let temp = self.temp();
                        code.push(self.read_instr(t, temp.clone()));
                        code.push(Instr::XLoad { base: la.addr, offs, src: temp });
                    }
                    None => {
                        let instr = self.read_instr(t, la.addr);
                        code.push(instr);
                    }
                }
            }
            Stmt::Write { arg, .. } => match arg {
                WriteArg::Expr(e) => {
                    let addr = self.rvalue(e, code);
                    let t = self.decor.ty(e.id);
                    if self.types.is_float(t) {
                        code.push(Instr::WriteF { src: addr });
                    } else if self.types.is_character(t) {
                        code.push(Instr::WriteC { src: addr });
                    } else {
                        code.push(Instr::WriteI { src: addr });
                    }
                }
                WriteArg::Str(text) => code.push(Instr::WriteS { text: text.clone() }),
            },
            Stmt::Return { value, .. } => {
                if let Some(e) = value {
                    let addr = self.rvalue(e, code);
                    code.push(Instr::Load { dst: "_result".to_string(), src: addr });
                }
                code.push(Instr::Return);
            }
        }
    }

    fn assign(&mut self, target: &LeftExpr, value: &Expr, code: &mut Vec<Instr>) {
        let la = self.left_expr(target, code);
        let ra = self.expr(value, code);
        let mut addr1 = la.addr;
        let mut addr2 = ra.addr;

        let t_left = self.decor.ty(target.id);
        let mut t_right = self.decor.ty(value.id);

        // implicit widening of the stored value
        if self.types.is_float(t_left) && self.types.is_integer(t_right) {
            let temp = self.temp();
            code.push(Instr::Float { dst: temp.clone(), src: addr2 });
            addr2 = temp;
            t_right = self.types.float_ty();
        }

        // array-ness is judged on the base identifier, not the element
        let t_base = match target.index {
            Some(_) => self.decor.ty(target.ident.id),
            None => t_left,
        };

        match (la.offs, ra.offs) {
            // element to element
            (Some(offs1), Some(offs2)) => {
                addr1 = self.deref_param(addr1, code);
                addr2 = self.deref_param(addr2, code);
                let temp = self.temp();
                code.push(Instr::LoadX { dst: temp.clone(), base: addr2, offs: offs2 });
                code.push(Instr::XLoad { base: addr1, offs: offs1, src: temp });
            }
            // scalar target, indexed source
            (None, Some(offs2)) => {
                addr2 = self.deref_param(addr2, code);
                code.push(Instr::LoadX { dst: addr1, base: addr2, offs: offs2 });
            }
            // indexed target, scalar source
            (Some(offs1), None) => {
                code.push(Instr::XLoad { base: addr1, offs: offs1, src: addr2 });
            }
            (None, None) if self.types.is_array(t_base) => {
                // whole-array assignment: unrolled element-by-element copy
                addr1 = self.deref_param(addr1, code);
                addr2 = self.deref_param(addr2, code);
                let size = self.types.array_size(t_base);
                let t_offs = self.temp();
                let t_elem = self.temp();
                for i in 0..size {
                    code.push(Instr::ILoad { dst: t_offs.clone(), src: i.to_string() });
                    code.push(Instr::LoadX {
                        dst: t_elem.clone(),
                        base: addr2.clone(),
                        offs: t_offs.clone(),
                    });
                    code.push(Instr::XLoad {
                        base: addr1.clone(),
                        offs: t_offs.clone(),
                        src: t_elem.clone(),
                    });
                }
            }
            (None, None) => {
                if self.types.is_float(t_right) {
                    code.push(Instr::FLoad { dst: addr1, src: addr2 });
                } else if self.types.is_character(t_right) {
                    code.push(Instr::ChLoad { dst: addr1, src: addr2 });
                } else {
                    code.push(Instr::ILoad { dst: addr1, src: addr2 });
                }
            }
        }
    }

    fn left_expr(&mut self, le: &LeftExpr, code: &mut Vec<Instr>) -> Addr {
        let mut addr = le.ident.name.clone();
        match &le.index {
            Some(index) => {
                let offs = self.rvalue(index, code);
                // an array parameter holds a base pointer
                if self.symbols.is_parameter_class(&addr) {
                    let temp = self.temp();
                    code.push(Instr::Load { dst: temp.clone(), src: addr });
                    addr = temp;
                }
                Addr { addr, offs: Some(offs) }
            }
            None => Addr::plain(addr),
        }
    }

    /// Expression whose value is needed as a plain address: compute it and
    /// fetch it out of its array slot if it still has an offset.
    fn rvalue(&mut self, e: &Expr, code: &mut Vec<Instr>) -> String {
        let a = self.expr(e, code);
        self.load_indexed(a, code)
    }

    fn load_indexed(&mut self, a: Addr, code: &mut Vec<Instr>) -> String {
        let Some(offs) = a.offs else {
            return a.addr;
        };
        let dst = self.temp();
        if self.symbols.is_local_var_class(&a.addr) {
            code.push(Instr::LoadX { dst: dst.clone(), base: a.addr, offs });
        } else {
            let base = self.temp();
            code.push(Instr::Load { dst: base.clone(), src: a.addr });
            code.push(Instr::LoadX { dst: dst.clone(), base, offs });
        }
        dst
    }

    fn read_instr(&self, t: TypeId, dst: String) -> Instr {
        if self.types.is_float(t) {
            Instr::ReadF { dst }
        } else if self.types.is_character(t) {
            Instr::ReadC { dst }
        } else {
            Instr::ReadI { dst }
        }
    }

    /// Base-pointer detour for by-reference arrays.
    fn deref_param(&mut self, addr: String, code: &mut Vec<Instr>) -> String {
        if self.symbols.is_parameter_class(&addr) {
            let temp = self.temp();
            code.push(Instr::Load { dst: temp.clone(), src: addr });
            temp
        } else {
            addr
        }
    }

    fn expr(&mut self, e: &Expr, code: &mut Vec<Instr>) -> Addr {
        match &e.kind {
            ExprKind::Value(lit) => {
                let temp = self.temp();
                let instr = match lit {
                    Literal::Int(text) => Instr::ILoad { dst: temp.clone(), src: text.clone() },
                    Literal::Float(text) => Instr::FLoad { dst: temp.clone(), src: text.clone() },
                    Literal::Char(text) => Instr::ChLoad { dst: temp.clone(), src: text.clone() },
                    Literal::Bool(value) => Instr::ILoad {
                        dst: temp.clone(),
                        src: if *value { "1" } else { "0" }.to_string(),
                    },
                };
                code.push(instr);
                Addr::plain(temp)
            }
            ExprKind::Ident(id) => Addr::plain(id.name.clone()),
            ExprKind::Paren(inner) => self.expr(inner, code),
            ExprKind::Call(call) => {
                let result = self.function_call(call, code);
                Addr::plain(result.unwrap_or_default())
            }
            ExprKind::Unary { op, operand } => {
                let a = self.expr(operand, code);
                let addr = self.load_indexed(a, code);
                let t1 = self.decor.ty(operand.id);
                let temp = self.temp();
                match op {
                    UnOp::Not => {
                        code.push(Instr::Un {
                            op: tac::UnOp::Not,
                            dst: temp.clone(),
                            src: addr,
                        });
                        Addr::plain(temp)
                    }
                    UnOp::Plus => Addr::plain(addr),
                    UnOp::Minus => {
                        let op = if self.types.is_float(t1) {
                            tac::UnOp::FNeg
                        } else {
                            tac::UnOp::Neg
                        };
                        code.push(Instr::Un { op, dst: temp.clone(), src: addr });
                        Addr::plain(temp)
                    }
                }
            }
            ExprKind::Arith { op, left, right } => {
                let a1 = self.expr(left, code);
                let a2 = self.expr(right, code);
                let addr1 = self.load_indexed(a1, code);
                let addr2 = self.load_indexed(a2, code);
                let t1 = self.decor.ty(left.id);
                let t2 = self.decor.ty(right.id);
                let temp = self.temp();

                if self.types.is_integer(t1) && self.types.is_integer(t2) {
                    match op {
                        ArithOp::Mod => self.modulo(false, temp.clone(), addr1, addr2, code),
                        _ => code.push(Instr::Bin {
                            op: int_arith(*op),
                            dst: temp.clone(),
                            a: addr1,
                            b: addr2,
                        }),
                    }
                } else {
                    let addr1 = self.widen(t1, addr1, code);
                    let addr2 = self.widen(t2, addr2, code);
                    match op {
                        ArithOp::Mod => self.modulo(true, temp.clone(), addr1, addr2, code),
                        _ => code.push(Instr::Bin {
                            op: float_arith(*op),
                            dst: temp.clone(),
                            a: addr1,
                            b: addr2,
                        }),
                    }
                }
                Addr::plain(temp)
            }
            ExprKind::Rel { op, left, right } => {
                let a1 = self.expr(left, code);
                let a2 = self.expr(right, code);
                let addr1 = self.load_indexed(a1, code);
                let addr2 = self.load_indexed(a2, code);
                let t1 = self.decor.ty(left.id);
                let t2 = self.decor.ty(right.id);
                let temp = self.temp();

                if !self.types.is_float(t1) && !self.types.is_float(t2) {
                    self.compare(false, *op, temp.clone(), addr1, addr2, code);
                } else {
                    let addr1 = self.widen(t1, addr1, code);
                    let addr2 = self.widen(t2, addr2, code);
                    self.compare(true, *op, temp.clone(), addr1, addr2, code);
                }
                Addr::plain(temp)
            }
            ExprKind::Logical { op, left, right } => {
                let a1 = self.expr(left, code);
                let a2 = self.expr(right, code);
                let addr1 = self.load_indexed(a1, code);
                let addr2 = self.load_indexed(a2, code);
                let temp = self.temp();
                let op = match op {
                    ast::LogOp::And => BinOp::And,
                    ast::LogOp::Or => BinOp::Or,
                };
                code.push(Instr::Bin { op, dst: temp.clone(), a: addr1, b: addr2 });
                Addr::plain(temp)
            }
            ExprKind::ArrayAccess { array, index } => {
                let offs = self.rvalue(index, code);
                Addr {
                    addr: array.name.clone(),
                    offs: Some(offs),
                }
            }
        }
    }

    /// `a % b` as `q = a / b; r = a - b * q`.
    fn modulo(&mut self, float: bool, dst: String, a: String, b: String, code: &mut Vec<Instr>) {
        let (div, mul, sub) = if float {
            (BinOp::FDiv, BinOp::FMul, BinOp::FSub)
        } else {
            (BinOp::Div, BinOp::Mul, BinOp::Sub)
        };
        let quot = self.temp();
        let prod = self.temp();
        code.push(Instr::Bin { op: div, dst: quot.clone(), a: a.clone(), b: b.clone() });
        code.push(Instr::Bin { op: mul, dst: prod.clone(), a: b, b: quot });
        code.push(Instr::Bin { op: sub, dst, a, b: prod });
    }

    /// Coerce an integer operand of a mixed expression into a float temp.
    fn widen(&mut self, t: TypeId, addr: String, code: &mut Vec<Instr>) -> String {
        if self.types.is_float(t) {
            return addr;
        }
        let temp = self.temp();
        code.push(Instr::Float { dst: temp.clone(), src: addr });
        temp
    }

    /// `!=` is `EQ` then `NOT`; `>` and `>=` swap the operands of `LT`/`LE`.
    fn compare(
        &mut self,
        float: bool,
        op: RelOp,
        dst: String,
        a: String,
        b: String,
        code: &mut Vec<Instr>,
    ) {
        let (eq, lt, le) = if float {
            (BinOp::FEq, BinOp::FLt, BinOp::FLe)
        } else {
            (BinOp::Eq, BinOp::Lt, BinOp::Le)
        };
        match op {
            RelOp::Eq => code.push(Instr::Bin { op: eq, dst, a, b }),
            RelOp::Ne => {
                code.push(Instr::Bin { op: eq, dst: dst.clone(), a, b });
                code.push(Instr::Un { op: tac::UnOp::Not, dst: dst.clone(), src: dst });
            }
            RelOp::Lt => code.push(Instr::Bin { op: lt, dst, a, b }),
            RelOp::Gt => code.push(Instr::Bin { op: lt, dst, a: b, b: a }),
            RelOp::Le => code.push(Instr::Bin { op: le, dst, a, b }),
            RelOp::Ge => code.push(Instr::Bin { op: le, dst, a: b, b: a }),
        }
    }

    fn function_call(&mut self, call: &FunctionCall, code: &mut Vec<Instr>) -> Option<String> {
        let fn_ty = self.decor.ty(call.callee.id);
        let returns_value = !self.types.is_void_function(fn_ty);

        // result slot first, then the arguments in declaration order
        if returns_value {
            code.push(Instr::Push { src: None });
        }
        let mut pushes = Vec::with_capacity(call.args.len());
        for (i, arg) in call.args.iter().enumerate() {
            let addr = self.rvalue(arg, code);
            let t_arg = self.decor.ty(arg.id);
            let t_formal = self.types.func_param(fn_ty, i);
            let addr = if self.types.is_integer(t_arg) && self.types.is_float(t_formal) {
                let temp = self.temp();
                code.push(Instr::Float { dst: temp.clone(), src: addr });
                temp
            } else if self.types.is_array(t_formal) && self.symbols.is_local_var_class(&addr) {
                // a local array decays to its address at the call boundary
                let temp = self.temp();
                code.push(Instr::ALoad { dst: temp.clone(), src: addr });
                temp
            } else {
                addr
            };
            pushes.push(Instr::Push { src: Some(addr) });
        }
        code.extend(pushes);
        code.push(Instr::Call { name: call.callee.name.clone() });
        for _ in &call.args {
            code.push(Instr::Pop { dst: None });
        }
        if returns_value {
            let temp = self.temp();
            code.push(Instr::Pop { dst: Some(temp.clone()) });
            Some(temp)
        } else {
            None
        }
    }
}

const fn int_arith(op: ArithOp) -> BinOp {
    match op {
        ArithOp::Add => BinOp::Add,
        ArithOp::Sub => BinOp::Sub,
        ArithOp::Mul => BinOp::Mul,
        ArithOp::Div => BinOp::Div,
        ArithOp::Mod => unreachable!(),
    }
}

const fn float_arith(op: ArithOp) -> BinOp {
    match op {
        ArithOp::Add => BinOp::FAdd,
        ArithOp::Sub => BinOp::FSub,
        ArithOp::Mul => BinOp::FMul,
        ArithOp::Div => BinOp::FDiv,
        ArithOp::Mod => unreachable!(),
    }
}
