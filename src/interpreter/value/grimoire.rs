use std::{collections::HashMap, rc::Rc};

use crate::{ast::{Block, Parameter},
            interpreter::environment::EnvRef};

/// A spell value: parameters, body, and the environment captured at the
/// definition site. Visibility flags are derived from the declared name
/// (`__name` private, `_name` protected) when the spell is a method.
pub struct Function {
    /// Parameters in declaration order, with optional defaults.
    pub parameters:   Vec<Parameter>,
    /// The body suite.
    pub body:         Block,
    /// The defining environment, captured by reference.
    pub env:          EnvRef,
    /// Callable only when the caller's `self` shares the grimoire.
    pub is_private:   bool,
    /// Callable when the caller's `self` is the grimoire or a subclass.
    pub is_protected: bool,
    /// Declared `arcanespell`; must be overridden before instantiation.
    pub is_abstract:  bool,
}

impl Function {
    /// Creates a public, concrete function.
    #[must_use]
    pub fn new(parameters: Vec<Parameter>, body: Block, env: EnvRef) -> Self {
        Self { parameters,
               body,
               env,
               is_private: false,
               is_protected: false,
               is_abstract: false }
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The captured environment may cycle back through this function.
        let params: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        f.debug_struct("Function")
         .field("parameters", &params)
         .field("is_abstract", &self.is_abstract)
         .finish()
    }
}

/// A grimoire: the class template carrying methods, an optional `init`,
/// an inheritance link, and the environment captured at definition.
///
/// Method tables are flattened at definition time: a child grimoire starts
/// from a copy of its parent's table and overrides by name, so dispatch
/// never walks the inheritance chain.
pub struct Grimoire {
    /// The grimoire name.
    pub name:      String,
    /// Flattened method table.
    pub methods:   HashMap<String, Rc<Function>>,
    /// The constructor spell, if declared.
    pub init:      Option<Rc<Function>>,
    /// The defining environment.
    pub env:       EnvRef,
    /// The parent grimoire, if this one inherits.
    pub parent:    Option<Rc<Grimoire>>,
    /// Declared `arcane`; cannot be instantiated.
    pub is_arcane: bool,
}

impl std::fmt::Debug for Grimoire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("Grimoire")
         .field("name", &self.name)
         .field("methods", &methods)
         .field("is_arcane", &self.is_arcane)
         .finish()
    }
}

/// An instance of a grimoire: the class link plus an enclosed environment
/// holding per-instance fields.
///
/// The field environment is enclosed by the grimoire's captured
/// environment, and `self` is bound inside method invocations. Two
/// references to the same instance share field mutations.
pub struct Instance {
    /// The instantiated grimoire.
    pub grimoire: Rc<Grimoire>,
    /// The per-instance field environment.
    pub env:      EnvRef,
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Fields may refer back to this instance; avoid recursing.
        f.debug_struct("Instance")
         .field("grimoire", &self.grimoire.name)
         .finish()
    }
}
