//! The two semantic passes: symbol collection, then type checking.
//!
//! Both walk the same immutable tree and talk through the shared session
//! state: the type pool, the scope table, the decoration table and the
//! error sink.

pub mod symbols;
pub mod typecheck;

use crate::Compilation;

pub fn check(program: &ast::Program, cx: &mut Compilation) {
    symbols::collect(program, cx);
    typecheck::check(program, cx);
}
