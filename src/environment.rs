use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A scope shared between the evaluator and every closure that captured it.
pub type SharedEnv = Rc<RefCell<Environment>>;

/// One scope of name bindings, chained outward to its enclosing scope.
#[derive(Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    outer: Option<SharedEnv>,
}

impl Environment {
    pub fn new() -> SharedEnv {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn new_enclosed(outer: SharedEnv) -> SharedEnv {
        Rc::new(RefCell::new(Self {
            values: HashMap::new(),
            outer: Some(outer),
        }))
    }

    /// Looks `name` up from this scope outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds `name` in this scope, shadowing any outer binding.
    pub fn set(&mut self, name: &str, value: Value) -> Value {
        self.values.insert(name.to_string(), value.clone());
        value
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of scopes from this one to the root, inclusive.
    pub fn depth(&self) -> usize {
        1 + self.outer.as_ref().map_or(0, |outer| outer.borrow().depth())
    }
}

impl std::fmt::Debug for Environment {
    // Closures stored here point back at their defining scope, so only names
    // are printed.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let root = Environment::new();
        root.borrow_mut().set("x", Value::Integer(1));
        let inner = Environment::new_enclosed(root.clone());

        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(1)));
        assert_eq!(inner.borrow().get("missing"), None);
        assert_eq!(inner.borrow().depth(), 2);
    }

    #[test]
    fn set_shadows_instead_of_updating_outer() {
        let root = Environment::new();
        root.borrow_mut().set("x", Value::Integer(1));
        let inner = Environment::new_enclosed(root.clone());
        inner.borrow_mut().set("x", Value::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(2)));
        assert_eq!(root.borrow().get("x"), Some(Value::Integer(1)));
        assert!(inner.borrow().contains_local("x"));
    }

    #[test]
    fn outer_changes_are_visible_through_the_chain() {
        let root = Environment::new();
        let inner = Environment::new_enclosed(root.clone());
        root.borrow_mut().set("late", Value::String("bound".to_string()));

        assert_eq!(
            inner.borrow().get("late"),
            Some(Value::String("bound".to_string()))
        );
    }
}
