//! Lexically nested binding frames.
//!
//! A frame maps identifiers to values and optionally points at an outer
//! frame. Lookup walks outward until found or exhausted. Function calls
//! allocate a frame whose outer pointer is the closure's captured frame,
//! not the caller's.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

use super::value::Value;
use crate::intern::Name;

/// Shared handle to a binding frame. Closures hold one of these, which
/// keeps the captured frame alive as long as the closure is.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A single binding frame.
#[derive(Debug, Default)]
pub struct Environment {
    store: FxHashMap<Name, Value>,
    outer: Option<EnvRef>,
}

impl Environment {
    /// Create a new top-level frame.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment {
            store: FxHashMap::default(),
            outer: None,
        }))
    }

    /// Create a frame enclosed by `outer`.
    pub fn new_enclosed(outer: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            store: FxHashMap::default(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    /// Look up a name, walking the outer chain.
    pub fn get(&self, name: Name) -> Option<Value> {
        if let Some(value) = self.store.get(&name) {
            return Some(value.clone());
        }
        if let Some(outer) = &self.outer {
            return outer.borrow().get(name);
        }
        None
    }

    /// Bind in this frame, creating or shadowing (`:=`).
    pub fn set(&mut self, name: Name, value: Value) {
        self.store.insert(name, value);
    }

    /// Reassign an existing binding along the outer chain (`=`).
    ///
    /// Returns false when no binding exists anywhere on the chain.
    pub fn assign(&mut self, name: Name, value: Value) -> bool {
        if let Some(slot) = self.store.get_mut(&name) {
            *slot = value;
            return true;
        }
        if let Some(outer) = &self.outer {
            return outer.borrow_mut().assign(name, value);
        }
        false
    }

    /// Snapshot this frame's own bindings (used to package modules).
    pub fn bindings(&self) -> Vec<(Name, Value)> {
        self.store
            .iter()
            .map(|(name, value)| (*name, value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::StringInterner;

    #[test]
    fn test_set_and_get() {
        let interner = StringInterner::new();
        let x = interner.intern("x");

        let env = Environment::new();
        env.borrow_mut().set(x, Value::Boolean(true));
        assert!(matches!(env.borrow().get(x), Some(Value::Boolean(true))));
    }

    #[test]
    fn test_enclosed_lookup_walks_outward() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let y = interner.intern("y");

        let outer = Environment::new();
        outer.borrow_mut().set(x, Value::Boolean(true));

        let inner = Environment::new_enclosed(&outer);
        inner.borrow_mut().set(y, Value::Boolean(false));

        assert!(inner.borrow().get(x).is_some());
        assert!(inner.borrow().get(y).is_some());
        assert!(outer.borrow().get(y).is_none());
    }

    #[test]
    fn test_shadowing() {
        let interner = StringInterner::new();
        let x = interner.intern("x");

        let outer = Environment::new();
        outer.borrow_mut().set(x, Value::Boolean(true));

        let inner = Environment::new_enclosed(&outer);
        inner.borrow_mut().set(x, Value::Boolean(false));

        assert!(matches!(inner.borrow().get(x), Some(Value::Boolean(false))));
        assert!(matches!(outer.borrow().get(x), Some(Value::Boolean(true))));
    }

    #[test]
    fn test_assign_walks_chain() {
        let interner = StringInterner::new();
        let x = interner.intern("x");

        let outer = Environment::new();
        outer.borrow_mut().set(x, Value::Boolean(true));

        let inner = Environment::new_enclosed(&outer);
        assert!(inner.borrow_mut().assign(x, Value::Boolean(false)));
        assert!(matches!(outer.borrow().get(x), Some(Value::Boolean(false))));
    }

    #[test]
    fn test_assign_unbound_fails() {
        let interner = StringInterner::new();
        let x = interner.intern("x");

        let env = Environment::new();
        assert!(!env.borrow_mut().assign(x, Value::Null));
    }
}
