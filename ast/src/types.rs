//! Structural type identities, interned so that equality of [`TypeId`]s is
//! equality of types.
//!
//! The error type is a top sentinel: predicates are false for it and
//! `copyable` accepts it on either side, so a subtree that already failed
//! never triggers a second report upstream.

use crate::expr::RelOp;
use std::collections::HashMap;

/// Canonical id of an interned type. Two structurally equal types always
/// get the same id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Ty {
    Error,
    Void,
    Integer,
    Float,
    Boolean,
    Character,
    Array { size: u32, elem: TypeId },
    Function { params: Vec<TypeId>, ret: TypeId },
}

/// The intern pool. Grows monotonically over one compilation.
#[derive(Debug)]
pub struct Types {
    pool: Vec<Ty>,
    interned: HashMap<Ty, TypeId>,
}

// The six leaf types are interned by `new` in this order.
const ERROR: TypeId = TypeId(0);
const VOID: TypeId = TypeId(1);
const INTEGER: TypeId = TypeId(2);
const FLOAT: TypeId = TypeId(3);
const BOOLEAN: TypeId = TypeId(4);
const CHARACTER: TypeId = TypeId(5);

impl Default for Types {
    fn default() -> Self {
        Self::new()
    }
}

impl Types {
    pub fn new() -> Self {
        let mut types = Self {
            pool: Vec::new(),
            interned: HashMap::new(),
        };
        for ty in [
            Ty::Error,
            Ty::Void,
            Ty::Integer,
            Ty::Float,
            Ty::Boolean,
            Ty::Character,
        ] {
            types.intern(ty);
        }
        types
    }

    fn intern(&mut self, ty: Ty) -> TypeId {
        if let Some(&id) = self.interned.get(&ty) {
            return id;
        }
        let id = TypeId(self.pool.len() as u32);
        self.pool.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    fn get(&self, id: TypeId) -> &Ty {
        &self.pool[id.0 as usize]
    }

    pub fn error_ty(&self) -> TypeId {
        ERROR
    }

    pub fn void_ty(&self) -> TypeId {
        VOID
    }

    pub fn integer_ty(&self) -> TypeId {
        INTEGER
    }

    pub fn float_ty(&self) -> TypeId {
        FLOAT
    }

    pub fn boolean_ty(&self) -> TypeId {
        BOOLEAN
    }

    pub fn character_ty(&self) -> TypeId {
        CHARACTER
    }

    pub fn array_ty(&mut self, size: u32, elem: TypeId) -> TypeId {
        self.intern(Ty::Array { size, elem })
    }

    pub fn function_ty(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.intern(Ty::Function { params, ret })
    }

    pub fn is_error(&self, t: TypeId) -> bool {
        t == ERROR
    }

    pub fn is_void(&self, t: TypeId) -> bool {
        t == VOID
    }

    pub fn is_integer(&self, t: TypeId) -> bool {
        t == INTEGER
    }

    pub fn is_float(&self, t: TypeId) -> bool {
        t == FLOAT
    }

    pub fn is_boolean(&self, t: TypeId) -> bool {
        t == BOOLEAN
    }

    pub fn is_character(&self, t: TypeId) -> bool {
        t == CHARACTER
    }

    /// Any scalar type.
    pub fn is_primitive(&self, t: TypeId) -> bool {
        matches!(
            self.get(t),
            Ty::Integer | Ty::Float | Ty::Boolean | Ty::Character
        )
    }

    pub fn is_numeric(&self, t: TypeId) -> bool {
        matches!(self.get(t), Ty::Integer | Ty::Float)
    }

    pub fn is_array(&self, t: TypeId) -> bool {
        matches!(self.get(t), Ty::Array { .. })
    }

    pub fn is_function(&self, t: TypeId) -> bool {
        matches!(self.get(t), Ty::Function { .. })
    }

    pub fn is_void_function(&self, t: TypeId) -> bool {
        match self.get(t) {
            Ty::Function { ret, .. } => *ret == VOID,
            _ => false,
        }
    }

    pub fn array_elem(&self, t: TypeId) -> TypeId {
        match self.get(t) {
            Ty::Array { elem, .. } => *elem,
            other => unreachable!("array_elem on {other:?}"),
        }
    }

    pub fn array_size(&self, t: TypeId) -> u32 {
        match self.get(t) {
            Ty::Array { size, .. } => *size,
            other => unreachable!("array_size on {other:?}"),
        }
    }

    pub fn func_return(&self, t: TypeId) -> TypeId {
        match self.get(t) {
            Ty::Function { ret, .. } => *ret,
            other => unreachable!("func_return on {other:?}"),
        }
    }

    pub fn func_param(&self, t: TypeId, i: usize) -> TypeId {
        match self.get(t) {
            Ty::Function { params, .. } => params[i],
            other => unreachable!("func_param on {other:?}"),
        }
    }

    pub fn func_arity(&self, t: TypeId) -> usize {
        match self.get(t) {
            Ty::Function { params, .. } => params.len(),
            other => unreachable!("func_arity on {other:?}"),
        }
    }

    /// Scalars occupy one slot, arrays as many as they have elements.
    pub fn size_of(&self, t: TypeId) -> u32 {
        match self.get(t) {
            Ty::Integer | Ty::Float | Ty::Boolean | Ty::Character => 1,
            Ty::Array { size, elem } => size * self.size_of(*elem),
            Ty::Error | Ty::Void | Ty::Function { .. } => 0,
        }
    }

    /// The type tag written into the TAC module. Arrays tag with their
    /// element type, the declared size travels separately.
    pub fn tag(&self, t: TypeId) -> &'static str {
        match self.get(t) {
            Ty::Integer => "integer",
            Ty::Float => "float",
            Ty::Boolean => "boolean",
            Ty::Character => "character",
            Ty::Void => "void",
            Ty::Error => "error",
            Ty::Array { elem, .. } => self.tag(*elem),
            Ty::Function { .. } => "function",
        }
    }

    /// Whether a value of type `src` can be stored into a slot of type
    /// `dst`: identical types, the implicit integer-to-float widening, or
    /// anything when either side already failed to type.
    pub fn copyable(&self, dst: TypeId, src: TypeId) -> bool {
        if self.is_error(dst) || self.is_error(src) {
            return true;
        }
        dst == src || (self.is_float(dst) && self.is_integer(src))
    }

    /// Whether `a op b` is a legal comparison. Equality accepts any numeric
    /// pair and any matching primitive kind; ordering is numeric only.
    pub fn comparable(&self, a: TypeId, b: TypeId, op: RelOp) -> bool {
        let numeric = self.is_numeric(a) && self.is_numeric(b);
        if op.is_equality() {
            numeric || (a == b && self.is_primitive(a))
        } else {
            numeric
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_interned_once() {
        let types = Types::new();
        assert_eq!(types.integer_ty(), types.integer_ty());
        assert!(types.is_integer(types.integer_ty()));
        assert!(types.is_primitive(types.character_ty()));
        assert!(!types.is_primitive(types.void_ty()));
        assert!(!types.is_primitive(types.error_ty()));
    }

    #[test]
    fn structural_types_share_ids() {
        let mut types = Types::new();
        let int = types.integer_ty();
        let a1 = types.array_ty(10, int);
        let a2 = types.array_ty(10, int);
        assert_eq!(a1, a2);
        let a3 = types.array_ty(11, int);
        assert_ne!(a1, a3);

        let f1 = types.function_ty(vec![int, a1], types.void_ty());
        let f2 = types.function_ty(vec![int, a2], types.void_ty());
        assert_eq!(f1, f2);
    }

    #[test]
    fn copyable_laws() {
        let mut types = Types::new();
        let int = types.integer_ty();
        let float = types.float_ty();
        let err = types.error_ty();

        assert!(types.copyable(float, int));
        assert!(!types.copyable(int, float));
        assert!(types.copyable(int, int));
        assert!(types.copyable(err, int));
        assert!(types.copyable(int, err));

        let a = types.array_ty(3, int);
        let b = types.array_ty(3, int);
        let c = types.array_ty(4, int);
        let d = types.array_ty(3, float);
        assert!(types.copyable(a, b));
        assert!(!types.copyable(a, c));
        assert!(!types.copyable(a, d));
    }

    #[test]
    fn comparability() {
        let mut types = Types::new();
        let int = types.integer_ty();
        let float = types.float_ty();
        let boolean = types.boolean_ty();
        let chr = types.character_ty();

        assert!(types.comparable(int, float, RelOp::Eq));
        assert!(types.comparable(boolean, boolean, RelOp::Ne));
        assert!(types.comparable(chr, chr, RelOp::Eq));
        assert!(!types.comparable(boolean, chr, RelOp::Eq));
        assert!(types.comparable(int, float, RelOp::Lt));
        assert!(!types.comparable(boolean, boolean, RelOp::Le));

        let arr = types.array_ty(2, int);
        assert!(!types.comparable(arr, arr, RelOp::Eq));
    }

    #[test]
    fn sizes() {
        let mut types = Types::new();
        let int = types.integer_ty();
        assert_eq!(types.size_of(int), 1);
        let arr = types.array_ty(8, int);
        assert_eq!(types.size_of(arr), 8);
    }
}
