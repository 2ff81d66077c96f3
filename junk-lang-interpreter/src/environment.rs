use crate::object::Object;
use gc::{Finalize, Gc, GcCell, Trace};
use std::collections::HashMap;

#[derive(Debug, Trace, Finalize)]
struct EnvironmentCore {
    store: HashMap<String, Gc<Object>>,
    outer: Option<Environment>,
}

/// A scope: name bindings plus a chain to the enclosing scope. Environments
/// are shared (closures keep the scope that defined them alive) and a
/// binding may point back at a closure over this very environment, so the
/// handle is a traced `Gc` rather than an `Rc`.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct Environment {
    environment: Gc<GcCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: None,
            })),
        }
    }

    pub fn new_enclosed(outer: Environment) -> Environment {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: Some(outer),
            })),
        }
    }

    /// Innermost binding wins; unbound names fall through to the builtin
    /// table last.
    pub fn get(&self, key: &str) -> Option<Gc<Object>> {
        let env = self.environment.borrow();
        env.store
            .get(key)
            .cloned()
            .or_else(|| env.outer.as_ref().and_then(|outer| outer.get(key)))
            .or_else(|| crate::builtins::map_builtins(key).map(Object::builtin_function))
    }

    pub fn set(&mut self, key: &str, value: Gc<Object>) {
        self.environment
            .borrow_mut()
            .store
            .insert(key.to_owned(), value);
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        Gc::ptr_eq(&self.environment, &other.environment)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_chains_to_outer() {
        let mut outer = Environment::new();
        outer.set("a", Object::integer(1));
        outer.set("b", Object::integer(2));

        let mut inner = Environment::new_enclosed(outer.clone());
        inner.set("b", Object::integer(3));

        assert_eq!(inner.get("a"), Some(Object::integer(1)));
        assert_eq!(inner.get("b"), Some(Object::integer(3)));
        assert_eq!(outer.get("b"), Some(Object::integer(2)));
        assert_eq!(inner.get("c"), None);
    }

    #[test]
    fn test_set_writes_innermost_only() {
        let mut outer = Environment::new();
        outer.set("x", Object::integer(1));

        let mut inner = Environment::new_enclosed(outer.clone());
        inner.set("x", Object::integer(2));

        assert_eq!(outer.get("x"), Some(Object::integer(1)));
        assert_eq!(inner.get("x"), Some(Object::integer(2)));
    }

    #[test]
    fn test_builtin_fallback() {
        let env = Environment::new();
        let len = env.get("len").expect("builtin should resolve");
        assert!(matches!(&*len, Object::BuiltinFunction(_)));
    }
}
