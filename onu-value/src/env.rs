//! Lexical environments.

use crate::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A shared handle to a scope of bindings plus its enclosing scope.
///
/// Cloning the handle does not copy the bindings: every clone (the call frame
/// that created it, closures that captured it) sees the same scope, which
/// lives as long as its longest-lived holder.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Scope>>);

#[derive(Default)]
struct Scope {
    bindings: HashMap<String, Value>,
    outer: Option<Environment>,
}

impl Environment {
    /// Creates a root environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty environment whose lookups fall back to `outer`.
    pub fn new_enclosed(outer: &Environment) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    /// Looks `name` up from the innermost scope outwards.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut env = self.clone();
        loop {
            let outer = {
                let scope = env.0.borrow();
                if let Some(value) = scope.bindings.get(name) {
                    return Some(value.clone());
                }
                scope.outer.clone()
            };
            env = outer?;
        }
    }

    /// Binds `name` in this (innermost) scope. Rebinding overwrites the previous value.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Returns `true` if `name` is bound in this scope, ignoring enclosing ones.
    pub fn contains_local(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    pub fn outer(&self) -> Option<Environment> {
        self.0.borrow().outer.clone()
    }

    /// Returns `true` if both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.0.borrow();
        let mut names: Vec<_> = scope.bindings.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("outer", &scope.outer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        assert_eq!(env.get("a"), None);
        env.define("a", Value::Integer(1));
        assert_eq!(env.get("a"), Some(Value::Integer(1)));
        env.define("a", Value::Integer(2)); // last write wins
        assert_eq!(env.get("a"), Some(Value::Integer(2)));
    }

    #[test]
    fn test_lookup_walks_outwards() {
        let root = Environment::new();
        root.define("a", Value::Integer(1));
        root.define("b", Value::Integer(2));
        let inner = Environment::new_enclosed(&root);
        inner.define("b", Value::Integer(20));

        assert_eq!(inner.get("a"), Some(Value::Integer(1)));
        assert_eq!(inner.get("b"), Some(Value::Integer(20)));
        assert_eq!(root.get("b"), Some(Value::Integer(2)));
        assert!(inner.contains_local("b"));
        assert!(!inner.contains_local("a"));
        assert!(inner.outer().unwrap().ptr_eq(&root));
    }

    #[test]
    fn test_clones_share_bindings() {
        let env = Environment::new();
        let captured = env.clone();
        env.define("x", Value::Bool(true));
        assert_eq!(captured.get("x"), Some(Value::Bool(true)));
        assert!(captured.ptr_eq(&env));
        assert!(!Environment::new().ptr_eq(&env));
    }
}
