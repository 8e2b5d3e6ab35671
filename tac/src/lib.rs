//! The three-address-code module produced by code generation.
//!
//! Addresses stay symbolic: a local or parameter name, or a compiler
//! temporary `%N`. `Display` renders the textual module consumed by the
//! downstream assembler; one subroutine per block, parameters and locals
//! declared before the instruction list.

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Default)]
pub struct Program(pub Vec<Subroutine>);

#[derive(Debug)]
pub struct Subroutine {
    pub name: String,
    pub params: Vec<Param>,
    pub vars: Vec<Var>,
    pub instrs: Vec<Instr>,
}

impl Subroutine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
            vars: Vec::new(),
            instrs: Vec::new(),
        }
    }
}

/// Formal parameter slot. Array parameters are passed by reference and
/// marked with `&` in the module text.
#[derive(Debug)]
pub struct Param {
    pub name: String,
    pub tag: String,
    pub by_ref: bool,
}

/// Local variable: name, element type tag, number of slots.
#[derive(Debug)]
pub struct Var {
    pub name: String,
    pub tag: String,
    pub size: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Instr {
    /// Integer load: immediate text or plain move.
    ILoad { dst: String, src: String },
    FLoad { dst: String, src: String },
    ChLoad { dst: String, src: String },
    /// Generic move, also used for base-pointer copies.
    Load { dst: String, src: String },
    /// Integer-to-float coercion.
    Float { dst: String, src: String },
    /// Address of a local array.
    ALoad { dst: String, src: String },
    /// `dst = base[offs]`
    LoadX { dst: String, base: String, offs: String },
    /// `base[offs] = src`
    XLoad { base: String, offs: String, src: String },
    Bin { op: BinOp, dst: String, a: String, b: String },
    Un { op: UnOp, dst: String, src: String },
    Push { src: Option<String> },
    Pop { dst: Option<String> },
    Call { name: String },
    Return,
    Label { name: String },
    UJump { label: String },
    /// Jump to `label` when `cond` is false (zero).
    FJump { cond: String, label: String },
    ReadI { dst: String },
    ReadF { dst: String },
    ReadC { dst: String },
    WriteI { src: String },
    WriteF { src: String },
    WriteC { src: String },
    /// The operand keeps the delimiting quotes of the source literal.
    WriteS { text: String },
    Halt { code: u32 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FAdd,
    FSub,
    FMul,
    FDiv,
    Eq,
    Lt,
    Le,
    FEq,
    FLt,
    FLe,
    And,
    Or,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    FNeg,
    Not,
}

impl BinOp {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::FAdd => "FADD",
            Self::FSub => "FSUB",
            Self::FMul => "FMUL",
            Self::FDiv => "FDIV",
            Self::Eq => "EQ",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::FEq => "FEQ",
            Self::FLt => "FLT",
            Self::FLe => "FLE",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl UnOp {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Neg => "NEG",
            Self::FNeg => "FNEG",
            Self::Not => "NOT",
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for sub in &self.0 {
            write!(f, "{sub}")?;
        }
        Ok(())
    }
}

impl Display for Subroutine {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "subroutine {}", self.name)?;
        for Param { name, tag, by_ref } in &self.params {
            if *by_ref {
                writeln!(f, "  param {name} {tag} &")?;
            } else {
                writeln!(f, "  param {name} {tag}")?;
            }
        }
        for Var { name, tag, size } in &self.vars {
            writeln!(f, "  var {name} {tag} {size}")?;
        }
        for instr in &self.instrs {
            // labels outdent so the blocks they open stay readable
            if matches!(instr, Instr::Label { .. }) {
                writeln!(f, "  {instr}")?;
            } else {
                writeln!(f, "    {instr}")?;
            }
        }
        writeln!(f, "endsubroutine")
    }
}

impl Display for Instr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::ILoad { dst, src } => write!(f, "ILOAD {dst}, {src}"),
            Self::FLoad { dst, src } => write!(f, "FLOAD {dst}, {src}"),
            Self::ChLoad { dst, src } => write!(f, "CHLOAD {dst}, {src}"),
            Self::Load { dst, src } => write!(f, "LOAD {dst}, {src}"),
            Self::Float { dst, src } => write!(f, "FLOAT {dst}, {src}"),
            Self::ALoad { dst, src } => write!(f, "ALOAD {dst}, {src}"),
            Self::LoadX { dst, base, offs } => write!(f, "LOADX {dst}, {base}, {offs}"),
            Self::XLoad { base, offs, src } => write!(f, "XLOAD {base}, {offs}, {src}"),
            Self::Bin { op, dst, a, b } => write!(f, "{} {dst}, {a}, {b}", op.mnemonic()),
            Self::Un { op, dst, src } => write!(f, "{} {dst}, {src}", op.mnemonic()),
            Self::Push { src: Some(src) } => write!(f, "PUSH {src}"),
            Self::Push { src: None } => write!(f, "PUSH"),
            Self::Pop { dst: Some(dst) } => write!(f, "POP {dst}"),
            Self::Pop { dst: None } => write!(f, "POP"),
            Self::Call { name } => write!(f, "CALL {name}"),
            Self::Return => write!(f, "RETURN"),
            Self::Label { name } => write!(f, "LABEL {name}"),
            Self::UJump { label } => write!(f, "UJUMP {label}"),
            Self::FJump { cond, label } => write!(f, "FJUMP {cond}, {label}"),
            Self::ReadI { dst } => write!(f, "READI {dst}"),
            Self::ReadF { dst } => write!(f, "READF {dst}"),
            Self::ReadC { dst } => write!(f, "READC {dst}"),
            Self::WriteI { src } => write!(f, "WRITEI {src}"),
            Self::WriteF { src } => write!(f, "WRITEF {src}"),
            Self::WriteC { src } => write!(f, "WRITEC {src}"),
            Self::WriteS { text } => write!(f, "WRITES {text}"),
            Self::Halt { code } => write!(f, "HALT {code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: &str) -> String {
        x.to_string()
    }

    #[test]
    fn instruction_text() {
        assert_eq!(
            Instr::ILoad { dst: s("%0"), src: s("1") }.to_string(),
            "ILOAD %0, 1"
        );
        assert_eq!(
            Instr::LoadX { dst: s("%1"), base: s("a"), offs: s("%0") }.to_string(),
            "LOADX %1, a, %0"
        );
        assert_eq!(
            Instr::XLoad { base: s("a"), offs: s("%0"), src: s("%1") }.to_string(),
            "XLOAD a, %0, %1"
        );
        assert_eq!(
            Instr::Bin { op: BinOp::FAdd, dst: s("%2"), a: s("%0"), b: s("%1") }.to_string(),
            "FADD %2, %0, %1"
        );
        assert_eq!(
            Instr::FJump { cond: s("%0"), label: s("else1") }.to_string(),
            "FJUMP %0, else1"
        );
        assert_eq!(Instr::Push { src: None }.to_string(), "PUSH");
        assert_eq!(Instr::Pop { dst: Some(s("%3")) }.to_string(), "POP %3");
        assert_eq!(
            Instr::WriteS { text: s("\"done\\n\"") }.to_string(),
            "WRITES \"done\\n\""
        );
        assert_eq!(Instr::Halt { code: 2 }.to_string(), "HALT 2");
    }

    #[test]
    fn subroutine_text() {
        let sub = Subroutine {
            name: s("f"),
            params: vec![
                Param { name: s("_result"), tag: s("integer"), by_ref: false },
                Param { name: s("v"), tag: s("integer"), by_ref: true },
            ],
            vars: vec![Var { name: s("x"), tag: s("float"), size: 1 }],
            instrs: vec![
                Instr::Label { name: s("while1") },
                Instr::ILoad { dst: s("%0"), src: s("0") },
                Instr::Return,
            ],
        };
        assert_eq!(
            sub.to_string(),
            "subroutine f\n\
             \x20 param _result integer\n\
             \x20 param v integer &\n\
             \x20 var x float 1\n\
             \x20 LABEL while1\n\
             \x20   ILOAD %0, 0\n\
             \x20   RETURN\n\
             endsubroutine\n"
        );
    }
}
