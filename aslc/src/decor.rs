//! The tree decoration table: computed attributes keyed by node id.
//!
//! Written monotonically, scope and type by the symbols pass, type and
//! l-value flag by the type check. Code generation only reads.

use ast::types::TypeId;
use ast::NodeId;
use derive_more::{Deref, DerefMut};
use std::collections::HashMap;
use symtab::ScopeId;

#[derive(Debug, Default, Copy, Clone)]
pub struct Decor {
    pub scope: Option<ScopeId>,
    pub ty: Option<TypeId>,
    pub lvalue: Option<bool>,
}

#[derive(Debug, Default, Deref, DerefMut)]
pub struct Decorations(HashMap<NodeId, Decor>);

impl Decorations {
    pub fn put_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.0.entry(node).or_default().scope = Some(scope);
    }

    pub fn put_ty(&mut self, node: NodeId, ty: TypeId) {
        self.0.entry(node).or_default().ty = Some(ty);
    }

    pub fn put_lvalue(&mut self, node: NodeId, lvalue: bool) {
        self.0.entry(node).or_default().lvalue = Some(lvalue);
    }

    pub fn scope(&self, node: NodeId) -> ScopeId {
        self.try_scope(node).expect("node has no scope decoration")
    }

    pub fn ty(&self, node: NodeId) -> TypeId {
        self.try_ty(node).expect("node has no type decoration")
    }

    pub fn lvalue(&self, node: NodeId) -> bool {
        self.try_lvalue(node).expect("node has no l-value decoration")
    }

    pub fn try_scope(&self, node: NodeId) -> Option<ScopeId> {
        self.0.get(&node).and_then(|d| d.scope)
    }

    pub fn try_ty(&self, node: NodeId) -> Option<TypeId> {
        self.0.get(&node).and_then(|d| d.ty)
    }

    pub fn try_lvalue(&self, node: NodeId) -> Option<bool> {
        self.0.get(&node).and_then(|d| d.lvalue)
    }
}
