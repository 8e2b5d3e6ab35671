//! The semantic-error sink.
//!
//! Errors accumulate in emission order while the passes run and are
//! reported once, after type checking. A (kind, location) pair is recorded
//! at most once so a revisited node cannot inflate the count.

use ast::Loc;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemErrorKind {
    #[error("identifier '{name}' already declared")]
    DeclaredIdent { name: String },
    #[error("identifier '{name}' is undeclared")]
    UndeclaredIdent { name: String },
    #[error("incompatible types in assignment")]
    IncompatibleAssignment,
    #[error("incompatible type of expression in return statement")]
    IncompatibleReturn,
    #[error("instruction requires an expression of type boolean")]
    BooleanRequired,
    #[error("read/write statements require an expression of basic type")]
    ReadWriteRequireBasic,
    #[error("left expression is not referenceable")]
    NonReferenceableLeftExpr,
    #[error("expression is not referenceable")]
    NonReferenceableExpression,
    #[error("identifier '{name}' is not callable")]
    IsNotCallable { name: String },
    #[error("call to a procedure used as an expression")]
    IsNotFunction,
    #[error("wrong number of parameters in call to '{name}'")]
    NumberOfParameters { name: String },
    #[error("incompatible type for parameter {n} in call")]
    IncompatibleParameter { n: usize },
    #[error("incompatible operands for operator '{op}'")]
    IncompatibleOperator { op: &'static str },
    #[error("array access to a non-array operand")]
    NonArrayInArrayAccess,
    #[error("non-integer index in array access")]
    NonIntegerIndexInArrayAccess,
    #[error("there is no 'main' function properly declared")]
    NoMainProperlyDeclared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemError {
    pub kind: SemErrorKind,
    pub loc: Loc,
}

impl Display for SemError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.loc == Loc::default() {
            write!(f, "Error: {}", self.kind)
        } else {
            write!(f, "Error at {}: {}", self.loc, self.kind)
        }
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<SemError>,
}

impl Diagnostics {
    pub fn report(&mut self, loc: Loc, kind: SemErrorKind) {
        let error = SemError { kind, loc };
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemError> {
        self.errors.iter()
    }

    pub fn declared_ident(&mut self, loc: Loc, name: &str) {
        self.report(loc, SemErrorKind::DeclaredIdent { name: name.to_string() });
    }

    pub fn undeclared_ident(&mut self, loc: Loc, name: &str) {
        self.report(loc, SemErrorKind::UndeclaredIdent { name: name.to_string() });
    }

    pub fn incompatible_assignment(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::IncompatibleAssignment);
    }

    pub fn incompatible_return(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::IncompatibleReturn);
    }

    pub fn boolean_required(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::BooleanRequired);
    }

    pub fn read_write_require_basic(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::ReadWriteRequireBasic);
    }

    pub fn non_referenceable_left_expr(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::NonReferenceableLeftExpr);
    }

    pub fn non_referenceable_expression(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::NonReferenceableExpression);
    }

    pub fn is_not_callable(&mut self, loc: Loc, name: &str) {
        self.report(loc, SemErrorKind::IsNotCallable { name: name.to_string() });
    }

    pub fn is_not_function(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::IsNotFunction);
    }

    pub fn number_of_parameters(&mut self, loc: Loc, name: &str) {
        self.report(loc, SemErrorKind::NumberOfParameters { name: name.to_string() });
    }

    pub fn incompatible_parameter(&mut self, loc: Loc, n: usize) {
        self.report(loc, SemErrorKind::IncompatibleParameter { n });
    }

    pub fn incompatible_operator(&mut self, loc: Loc, op: &'static str) {
        self.report(loc, SemErrorKind::IncompatibleOperator { op });
    }

    pub fn non_array_in_array_access(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::NonArrayInArrayAccess);
    }

    pub fn non_integer_index_in_array_access(&mut self, loc: Loc) {
        self.report(loc, SemErrorKind::NonIntegerIndexInArrayAccess);
    }

    pub fn no_main_properly_declared(&mut self) {
        self.report(Loc::default(), SemErrorKind::NoMainProperlyDeclared);
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{error}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_suppressed() {
        let mut diags = Diagnostics::default();
        let loc = Loc::new(3, 7);
        diags.undeclared_ident(loc, "x");
        diags.undeclared_ident(loc, "x");
        diags.undeclared_ident(Loc::new(4, 1), "x");
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn emission_order_is_kept() {
        let mut diags = Diagnostics::default();
        diags.boolean_required(Loc::new(2, 1));
        diags.undeclared_ident(Loc::new(1, 1), "y");
        let kinds: Vec<_> = diags.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                SemErrorKind::BooleanRequired,
                SemErrorKind::UndeclaredIdent { name: "y".into() },
            ]
        );
    }

    #[test]
    fn report_text() {
        let mut diags = Diagnostics::default();
        diags.undeclared_ident(Loc::new(5, 9), "v");
        diags.no_main_properly_declared();
        assert_eq!(
            diags.to_string(),
            "Error at 5:9: identifier 'v' is undeclared\n\
             Error: there is no 'main' function properly declared\n"
        );
    }
}
