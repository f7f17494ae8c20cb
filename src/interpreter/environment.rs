use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::interpreter::value::core::Value;

/// A shared, mutable handle to an [`Environment`].
///
/// Environments are shared by reference: closures capture the environment
/// they were defined in, instances enclose their grimoire's environment,
/// and imported modules keep their own. `Rc<RefCell<_>>` gives the object
/// graph the aliasing the language semantics require.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A lexically nested name-to-value mapping.
///
/// `get` walks outward through enclosing environments until a binding is
/// found; `set` always writes into *this* environment, so assignment at a
/// given nesting level never mutates outer bindings.
///
/// # Example
/// ```
/// use corvid::interpreter::{environment::Environment, value::core::Value};
///
/// let outer = Environment::new();
/// outer.borrow_mut().set("x", Value::Integer(1));
///
/// let inner = Environment::new_enclosed(&outer);
/// assert_eq!(inner.borrow().get("x"), Some(Value::Integer(1)));
///
/// inner.borrow_mut().set("x", Value::Integer(2));
/// assert_eq!(outer.borrow().get("x"), Some(Value::Integer(1)));
/// ```
#[derive(Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<EnvRef>,
}

impl Environment {
    /// Creates a new, empty top-level environment.
    #[must_use]
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Creates a new environment enclosed by `outer`.
    #[must_use]
    pub fn new_enclosed(outer: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self { store: HashMap::new(),
                                    outer: Some(Rc::clone(outer)), }))
    }

    /// Looks up `name`, walking outward through enclosing environments.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.borrow().get(name))
    }

    /// Looks up `name` in this environment only, without walking outward.
    /// Used for namespace member access, where enclosing bindings must
    /// not leak through.
    #[must_use]
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.store.get(name).cloned()
    }

    /// Binds `name` to `value` in this environment (no outward walk).
    pub fn set(&mut self, name: &str, value: Value) {
        self.store.insert(name.to_string(), value);
    }

    /// Returns the enclosing environment, if any.
    #[must_use]
    pub fn outer(&self) -> Option<EnvRef> {
        self.outer.clone()
    }

    /// Returns the names bound directly in this environment.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.store.keys().cloned().collect()
    }

    /// Determines the current function name for stack traces.
    ///
    /// Inside a method, the grimoire name is used; otherwise the
    /// `__function_name` binding set at call-frame creation. Enclosing
    /// environments are consulted when this one has neither.
    #[must_use]
    pub fn function_name(&self) -> Option<String> {
        if let Some(Value::Instance(instance)) = self.store.get("self") {
            return Some(format!("{} method", instance.grimoire.name));
        }
        if let Some(Value::Str(name)) = self.store.get("__function_name") {
            return Some(name.clone());
        }
        self.outer
            .as_ref()
            .and_then(|outer| outer.borrow().function_name())
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Bindings may form cycles through instances; print names only.
        let mut names = self.names();
        names.sort();
        f.debug_struct("Environment")
         .field("names", &names)
         .field("enclosed", &self.outer.is_some())
         .finish()
    }
}
