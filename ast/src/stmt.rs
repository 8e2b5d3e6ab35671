use crate::expr::{Expr, FunctionCall, LeftExpr};
use crate::Loc;

#[derive(Debug)]
pub enum Stmt {
    Assign {
        /// Location of the `:=` token.
        loc: Loc,
        target: LeftExpr,
        value: Expr,
    },
    If {
        loc: Loc,
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        loc: Loc,
        cond: Expr,
        body: Vec<Stmt>,
    },
    ProcCall {
        loc: Loc,
        call: FunctionCall,
    },
    Read {
        loc: Loc,
        target: LeftExpr,
    },
    Write {
        loc: Loc,
        arg: WriteArg,
    },
    Return {
        loc: Loc,
        value: Option<Expr>,
    },
}

#[derive(Debug)]
pub enum WriteArg {
    Expr(Expr),
    /// String literal, kept with its delimiting quotes as the parser
    /// produced it; `WRITES` passes it through verbatim.
    Str(String),
}
