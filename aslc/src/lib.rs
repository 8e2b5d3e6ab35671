//! Semantic analysis and intermediate-code generation for ASL.
//!
//! The front end (lexer and parser) is an external collaborator; this
//! crate takes the finished syntax tree and runs three passes over it:
//! symbol collection, type checking, and three-address-code generation.
//! The passes communicate through one [`Compilation`] session holding the
//! interned types, the scope table, the node decorations and the
//! semantic-error sink.

pub mod codegen;
pub mod decor;
pub mod errors;
pub mod semantics;

pub use decor::{Decor, Decorations};
pub use errors::{Diagnostics, SemError, SemErrorKind};

use ast::types::Types;
use symtab::SymTable;
use thiserror::Error as ThisError;

/// Shared state of one compilation, owned across all passes.
#[derive(Debug, Default)]
pub struct Compilation {
    pub types: Types,
    pub symbols: SymTable,
    pub decor: Decorations,
    pub errors: Diagnostics,
}

/// Run symbol collection and type checking. The returned session carries
/// every decoration and every semantic error that was found.
pub fn analyze(program: &ast::Program) -> Compilation {
    let mut cx = Compilation::default();
    semantics::check(program, &mut cx);
    cx
}

/// Full pipeline: analyze, then generate the TAC module. Code generation
/// only runs when the error sink is clean.
pub fn compile(program: &ast::Program) -> Result<tac::Program, Error> {
    let mut cx = analyze(program);
    if cx.errors.has_errors() {
        return Err(Error::Semantics(std::mem::take(&mut cx.errors)));
    }
    Ok(codegen::emit(program, &mut cx))
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    Semantics(Diagnostics),
}

impl Error {
    /// Number of semantic errors behind this failure.
    pub fn error_count(&self) -> usize {
        match self {
            Self::Semantics(diags) => diags.len(),
        }
    }
}
