//! Stacked lexical scopes.
//!
//! Scopes are kept in an arena and named by stable [`ScopeId`]s, so the
//! symbols pass can create them and the later passes can re-enter the same
//! scopes in the same order. The stack must stay balanced: every push has a
//! matching pop within one pass.

use ast::types::{TypeId, Types};
use std::collections::HashMap;

pub const GLOBAL_SCOPE: &str = "$global";

/// Stable identity of a scope, valid for the whole compilation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// What a name is bound to within its scope.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Symbol {
    LocalVar(TypeId),
    Parameter(TypeId),
    Function(TypeId),
}

impl Symbol {
    pub const fn ty(&self) -> TypeId {
        match self {
            Self::LocalVar(t) | Self::Parameter(t) | Self::Function(t) => *t,
        }
    }
}

#[derive(Debug)]
struct Scope {
    name: String,
    symbols: HashMap<String, Symbol>,
}

#[derive(Debug, Default)]
pub struct SymTable {
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
}

impl SymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope, push it, and hand back its id for decoration.
    pub fn push_new_scope(&mut self, name: &str) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            name: name.to_string(),
            symbols: HashMap::new(),
        });
        self.stack.push(id);
        id
    }

    /// Re-enter a scope created by an earlier pass.
    pub fn push_scope(&mut self, id: ScopeId) {
        self.stack.push(id);
    }

    pub fn pop_scope(&mut self) {
        self.stack.pop().expect("scope stack underflow");
    }

    pub fn scope_name(&self, id: ScopeId) -> &str {
        &self.scopes[id.0 as usize].name
    }

    fn current(&mut self) -> &mut Scope {
        let &id = self.stack.last().expect("no open scope");
        &mut self.scopes[id.0 as usize]
    }

    pub fn add_local_var(&mut self, name: &str, ty: TypeId) {
        self.current()
            .symbols
            .insert(name.to_string(), Symbol::LocalVar(ty));
    }

    pub fn add_parameter(&mut self, name: &str, ty: TypeId) {
        self.current()
            .symbols
            .insert(name.to_string(), Symbol::Parameter(ty));
    }

    pub fn add_function(&mut self, name: &str, ty: TypeId) {
        self.current()
            .symbols
            .insert(name.to_string(), Symbol::Function(ty));
    }

    pub fn find_in_current_scope(&self, name: &str) -> bool {
        let &id = self.stack.last().expect("no open scope");
        self.scopes[id.0 as usize].symbols.contains_key(name)
    }

    /// Innermost scope on the stack that binds `name`.
    pub fn find_in_stack(&self, name: &str) -> Option<ScopeId> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|id| self.scopes[id.0 as usize].symbols.contains_key(name))
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.stack
            .iter()
            .rev()
            .find_map(|id| self.scopes[id.0 as usize].symbols.get(name))
    }

    pub fn get_type(&self, name: &str) -> Option<TypeId> {
        self.lookup(name).map(Symbol::ty)
    }

    pub fn is_function_class(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(Symbol::Function(_)))
    }

    pub fn is_parameter_class(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(Symbol::Parameter(_)))
    }

    pub fn is_local_var_class(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(Symbol::LocalVar(_)))
    }

    /// True when the global scope has no `main` bound to a parameterless
    /// void function. The global scope is the first one ever pushed.
    pub fn no_main_properly_declared(&self, types: &Types) -> bool {
        let Some(global) = self.scopes.first() else {
            return true;
        };
        match global.symbols.get("main") {
            Some(Symbol::Function(t)) => {
                types.func_arity(*t) != 0 || !types.is_void(types.func_return(*t))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let mut types = Types::new();
        let int = types.integer_ty();
        let float = types.float_ty();

        let mut table = SymTable::new();
        let global = table.push_new_scope(GLOBAL_SCOPE);
        table.add_local_var("x", int);
        let inner = table.push_new_scope("f");
        table.add_parameter("x", float);

        // the parameter shadows the global
        assert_eq!(table.find_in_stack("x"), Some(inner));
        assert_eq!(table.get_type("x"), Some(float));
        assert!(table.is_parameter_class("x"));

        table.pop_scope();
        assert_eq!(table.find_in_stack("x"), Some(global));
        assert!(table.is_local_var_class("x"));
        assert_eq!(table.find_in_stack("y"), None);
    }

    #[test]
    fn scopes_can_be_reentered_by_id() {
        let mut types = Types::new();
        let int = types.integer_ty();

        let mut table = SymTable::new();
        table.push_new_scope(GLOBAL_SCOPE);
        let f = table.push_new_scope("f");
        table.add_local_var("a", int);
        table.pop_scope();

        assert!(!table.find_in_current_scope("a"));
        table.push_scope(f);
        assert!(table.find_in_current_scope("a"));
        table.pop_scope();
    }

    #[test]
    fn main_detection() {
        let mut types = Types::new();
        let void = types.void_ty();
        let int = types.integer_ty();

        let mut table = SymTable::new();
        table.push_new_scope(GLOBAL_SCOPE);
        assert!(table.no_main_properly_declared(&types));

        let wrong = types.function_ty(vec![int], void);
        table.add_function("main", wrong);
        assert!(table.no_main_properly_declared(&types));

        let proper = types.function_ty(Vec::new(), void);
        table.add_function("main", proper);
        assert!(!table.no_main_properly_declared(&types));
    }
}
