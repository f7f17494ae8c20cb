use std::rc::Rc;

use crate::{ast::{Expr, FunctionDef, GrimoireDef},
            error::ErrorKind,
            interpreter::{environment::{EnvRef, Environment},
                          evaluator::core::{EvalResult, Interpreter, Signal},
                          lexer::Position,
                          value::{core::Value,
                                  grimoire::{Function, Grimoire, Instance}}}};

impl Interpreter {
    /// Evaluates a spell definition: the function captures the defining
    /// environment and is bound under its name.
    pub(crate) fn eval_function_def(&mut self, def: &FunctionDef, env: &EnvRef) -> EvalResult<Value> {
        let function = Function::new(def.parameters.clone(), def.body.clone(), Rc::clone(env));
        let value = Value::Function(Rc::new(function));
        env.borrow_mut().set(&def.name, value.clone());
        Ok(value)
    }

    /// Evaluates a grimoire definition.
    ///
    /// The method table starts from the parent's (when inheriting) and is
    /// overridden by name. Visibility flags follow the naming convention:
    /// `__name` is private, `_name` protected. A non-arcane grimoire that
    /// leaves an inherited abstract method unimplemented fails here.
    pub(crate) fn eval_grimoire_def(&mut self, def: &GrimoireDef, env: &EnvRef) -> EvalResult<Value> {
        let parent = match &def.inherits {
            Some(parent_name) => {
                let parent_value = env.borrow().get(parent_name);
                match parent_value {
                    Some(Value::Grimoire(grimoire)) => Some(grimoire),
                    Some(other) => {
                        return Err(self.raise(ErrorKind::Type,
                                              format!("'{parent_name}' is not a grimoire, got {}",
                                                      other.type_name()),
                                              &def.position));
                    },
                    None => {
                        return Err(self.raise(ErrorKind::Name,
                                              format!("parent grimoire '{parent_name}' not found"),
                                              &def.position));
                    },
                }
            },
            None => None,
        };

        let mut methods = parent.as_ref()
                                .map(|grimoire| grimoire.methods.clone())
                                .unwrap_or_default();

        for method in &def.methods {
            let mut function =
                Function::new(method.parameters.clone(), method.body.clone(), Rc::clone(env));
            if method.name.starts_with("__") {
                function.is_private = true;
            } else if method.name.starts_with('_') {
                function.is_protected = true;
            }
            function.is_abstract = method.is_arcane;
            methods.insert(method.name.clone(), Rc::new(function));
        }

        if let Some(parent) = &parent {
            if !def.is_arcane {
                for (name, method) in &parent.methods {
                    if method.is_abstract
                       && methods.get(name).is_none_or(|candidate| candidate.is_abstract)
                    {
                        return Err(self.raise(ErrorKind::NotImplemented,
                                              format!("grimoire '{}' must implement abstract \
                                                       method '{name}'",
                                                      def.name),
                                              &def.position));
                    }
                }
            }
        }

        let init = def.init.as_ref().map(|init_def| {
                                        Rc::new(Function::new(init_def.parameters.clone(),
                                                              init_def.body.clone(),
                                                              Rc::clone(env)))
                                    });

        let grimoire = Grimoire { name: def.name.clone(),
                                  methods,
                                  init,
                                  env: Rc::clone(env),
                                  parent,
                                  is_arcane: def.is_arcane };
        let value = Value::Grimoire(Rc::new(grimoire));
        env.borrow_mut().set(&def.name, value.clone());
        Ok(value)
    }

    /// Evaluates a call expression: the callee, then the arguments, then
    /// the dispatch.
    pub(crate) fn eval_call_expr(&mut self,
                                 function: &Expr,
                                 arguments: &[Expr],
                                 env: &EnvRef,
                                 position: &Position)
                                 -> EvalResult<Value> {
        let callee = self.eval_expr(function, env)?;
        let args = self.eval_expressions(arguments, env)?;
        let name_hint = callee_name(function);
        self.call_function(&callee, args, &name_hint, position)
    }

    /// Dispatches a call on a callable value.
    ///
    /// A single tuple argument to a call is unpacked into positional
    /// arguments, so `f((a, b))` and `f(a, b)` agree.
    pub(crate) fn call_function(&mut self,
                                callee: &Value,
                                mut args: Vec<Value>,
                                name_hint: &str,
                                position: &Position)
                                -> EvalResult<Value> {
        if args.len() == 1 {
            if let Value::Tuple(elements) = &args[0] {
                args = elements.as_ref().clone();
            }
        }

        match callee {
            Value::Function(function) => {
                let function = Rc::clone(function);
                let extended = self.extend_function_env(&function, args, false, name_hint)?;
                self.push_frame(name_hint.to_string(), position.clone());
                let result = self.eval_block(&function.body, &extended);
                self.pop_frame();
                unwrap_return(result)
            },
            Value::BoundMethod { instance, method } => {
                if method.is_abstract {
                    return Err(self.raise(ErrorKind::NotImplemented,
                                          "cannot call abstract method",
                                          position));
                }
                let frame_name = format!("{}.{name_hint}", instance.grimoire.name);
                let extended = self.extend_function_env(method, args, true, &frame_name)?;
                extended.borrow_mut().set("self", Value::Instance(Rc::clone(instance)));
                self.push_frame(frame_name, position.clone());
                let result = self.eval_block(&method.body, &extended);
                self.pop_frame();
                unwrap_return(result)
            },
            Value::Grimoire(grimoire) => self.instantiate(grimoire, args, position),
            Value::Builtin(builtin) => {
                (builtin.func)(&args, position).map_err(|mut error| {
                    for frame in &self.call_stack {
                        error.stack_trace
                             .push(crate::error::StackTraceEntry::new(frame.function.clone(),
                                                                      frame.position.clone()));
                    }
                    Signal::Raise(error)
                })
            },
            other => Err(self.raise(ErrorKind::Type,
                                    format!("not a function: {}", other.type_name()),
                                    position)),
        }
    }

    /// Constructs an instance of a grimoire, running `init` when present
    /// with `self` bound to the fresh instance.
    fn instantiate(&mut self,
                   grimoire: &Rc<Grimoire>,
                   args: Vec<Value>,
                   position: &Position)
                   -> EvalResult<Value> {
        if grimoire.is_arcane {
            return Err(self.raise(ErrorKind::Type,
                                  format!("cannot instantiate arcane grimoire: {}", grimoire.name),
                                  position));
        }

        let instance = Rc::new(Instance { grimoire: Rc::clone(grimoire),
                                          env:      Environment::new_enclosed(&grimoire.env), });

        if let Some(init) = &grimoire.init {
            let frame_name = format!("{}.init", grimoire.name);
            let extended = self.extend_function_env(init, args, true, &frame_name)?;
            extended.borrow_mut().set("self", Value::Instance(Rc::clone(&instance)));
            self.push_frame(frame_name, position.clone());
            let result = self.eval_block(&init.body, &extended);
            self.pop_frame();
            match result {
                Ok(_) | Err(Signal::Return(_)) => {},
                Err(signal) => return Err(signal),
            }
        }

        Ok(Value::Instance(instance))
    }

    /// Builds the call-frame environment for a function invocation.
    ///
    /// Parameters bind in declaration order; a leading `self` parameter
    /// of a method is recognized and left to the receiver binding rather
    /// than consuming a positional argument. Missing arguments fall back
    /// to default expressions, evaluated in the captured environment with
    /// identifiers first resolved against the global environment; with no
    /// default, the parameter binds to None.
    fn extend_function_env(&mut self,
                           function: &Function,
                           args: Vec<Value>,
                           is_method: bool,
                           function_name: &str)
                           -> EvalResult<EnvRef> {
        let env = Environment::new_enclosed(&function.env);
        env.borrow_mut().set("__function_name", Value::Str(function_name.to_string()));

        let parameters: &[crate::ast::Parameter] =
            if is_method && function.parameters.first().is_some_and(|p| p.name == "self") {
                &function.parameters[1..]
            } else {
                &function.parameters
            };

        for (index, parameter) in parameters.iter().enumerate() {
            if let Some(arg) = args.get(index) {
                env.borrow_mut().set(&parameter.name, arg.clone());
                continue;
            }

            match &parameter.default {
                Some(default) => {
                    if let Expr::Identifier { name, .. } = default {
                        let global = global_env(&function.env);
                        let resolved = global.borrow().get(name);
                        if let Some(value) = resolved {
                            env.borrow_mut().set(&parameter.name, value);
                            continue;
                        }
                    }
                    let value = self.eval_expr(default, &function.env)?;
                    env.borrow_mut().set(&parameter.name, value);
                },
                None => env.borrow_mut().set(&parameter.name, Value::None),
            }
        }

        Ok(env)
    }

    /// Evaluates member access `left.field`, including the `super`
    /// special form.
    pub(crate) fn eval_dot(&mut self,
                           left: &Expr,
                           field: &str,
                           env: &EnvRef,
                           position: &Position)
                           -> EvalResult<Value> {
        if let Expr::Identifier { name, .. } = left {
            if name == "super" {
                return self.eval_super(field, env, position);
            }
        }

        let object = self.eval_expr(left, env)?;

        match &object {
            Value::Instance(instance) => {
                if let Some(value) = instance.env.borrow().get(field) {
                    return Ok(value);
                }

                let Some(method) = instance.grimoire.methods.get(field) else {
                    return Err(self.raise(ErrorKind::Attribute,
                                          format!("undefined property or method: {field}"),
                                          position));
                };

                if method.is_private && !same_class(env, &instance.grimoire) {
                    return Err(self.raise(ErrorKind::Attribute,
                                          format!("private method '{field}' not accessible \
                                                   outside its defining class"),
                                          position));
                }
                if method.is_protected && !same_or_subclass(env, &instance.grimoire) {
                    return Err(self.raise(ErrorKind::Attribute,
                                          format!("protected method '{field}' not accessible \
                                                   here"),
                                          position));
                }

                Ok(Value::BoundMethod { instance: Rc::clone(instance),
                                        method:   Rc::clone(method), })
            },
            Value::Namespace(namespace) => {
                namespace.borrow().get_local(field).ok_or_else(|| {
                    self.raise(ErrorKind::Attribute,
                               format!("namespace has no member '{field}'"),
                               position)
                })
            },
            other => Err(self.raise(ErrorKind::Type,
                                    format!("type error: {} is not an instance",
                                            other.type_name()),
                                    position)),
        }
    }

    /// Resolves `super.field`: the parent grimoire's method, bound to the
    /// current `self`.
    fn eval_super(&mut self, field: &str, env: &EnvRef, position: &Position) -> EvalResult<Value> {
        let receiver = env.borrow().get("self");
        let Some(Value::Instance(instance)) = receiver else {
            return Err(self.raise(ErrorKind::Runtime,
                                  "'super' can only be used in an instance method",
                                  position));
        };

        let Some(parent) = &instance.grimoire.parent else {
            return Err(self.raise(ErrorKind::Runtime,
                                  "no parent grimoire found for 'super'",
                                  position));
        };

        let Some(method) = parent.methods.get(field) else {
            return Err(self.raise(ErrorKind::Attribute,
                                  format!("no method '{field}' found in parent grimoire"),
                                  position));
        };

        Ok(Value::BoundMethod { instance: Rc::clone(&instance),
                                method:   Rc::clone(method), })
    }
}

fn unwrap_return(result: EvalResult<Value>) -> EvalResult<Value> {
    match result {
        Err(Signal::Return(value)) => Ok(value),
        other => other,
    }
}

/// The display name used for call frames, taken from the callee
/// expression's shape.
fn callee_name(function: &Expr) -> String {
    match function {
        Expr::Identifier { name, .. } => name.clone(),
        Expr::Dot { field, .. } => field.clone(),
        _ => "function".to_string(),
    }
}

/// Walks to the outermost (global) environment.
fn global_env(env: &EnvRef) -> EnvRef {
    let mut current = Rc::clone(env);
    loop {
        let outer = current.borrow().outer();
        match outer {
            Some(outer) => current = outer,
            None => return current,
        }
    }
}

/// Whether the caller's `self` is an instance of exactly `target`.
fn same_class(env: &EnvRef, target: &Rc<Grimoire>) -> bool {
    match env.borrow().get("self") {
        Some(Value::Instance(instance)) => Rc::ptr_eq(&instance.grimoire, target),
        _ => false,
    }
}

/// Whether the caller's `self` is an instance of `target` or one of its
/// subclasses.
fn same_or_subclass(env: &EnvRef, target: &Rc<Grimoire>) -> bool {
    let Some(Value::Instance(instance)) = env.borrow().get("self") else {
        return false;
    };

    let mut grimoire = Some(Rc::clone(&instance.grimoire));
    while let Some(current) = grimoire {
        if Rc::ptr_eq(&current, target) {
            return true;
        }
        grimoire = current.parent.clone();
    }
    false
}
