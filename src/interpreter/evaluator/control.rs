use std::rc::Rc;

use crate::{ast::{Block, EnsnareClause, Expr, MatchCase, OtherwiseBranch},
            error::{ErrorKind, RuntimeError, StackTraceEntry},
            interpreter::{environment::EnvRef,
                          evaluator::core::{EvalResult, Interpreter, Signal},
                          lexer::Position,
                          value::core::Value}};

impl Interpreter {
    /// Evaluates an `if`/`otherwise`/`else` chain: the first truthy
    /// condition wins; with no match and no `else`, the result is None.
    pub(crate) fn eval_if(&mut self,
                          condition: &Expr,
                          consequence: &Block,
                          otherwise: &[OtherwiseBranch],
                          alternative: Option<&Block>,
                          env: &EnvRef)
                          -> EvalResult<Value> {
        if self.eval_expr(condition, env)?.is_truthy() {
            return self.eval_block(consequence, env);
        }

        for branch in otherwise {
            if self.eval_expr(&branch.condition, env)?.is_truthy() {
                return self.eval_block(&branch.consequence, env);
            }
        }

        match alternative {
            Some(block) => self.eval_block(block, env),
            None => Ok(Value::None),
        }
    }

    /// Evaluates a `while` loop. `stop` ends the loop, `skip` continues
    /// with the next pass, and returns or errors propagate outward.
    pub(crate) fn eval_while(&mut self,
                             condition: &Expr,
                             body: &Block,
                             env: &EnvRef)
                             -> EvalResult<Value> {
        loop {
            if !self.eval_expr(condition, env)?.is_truthy() {
                break;
            }

            match self.eval_block(body, env) {
                Ok(_) => {},
                Err(Signal::Stop) => break,
                Err(Signal::Skip) => {},
                Err(signal) => return Err(signal),
            }
        }

        Ok(Value::None)
    }

    /// Evaluates a `for` loop over an array.
    ///
    /// The loop variable binds each element (or unpacks it against a
    /// tuple pattern). `stop` exits yielding None and skips the `else`
    /// suite; after normal completion the `else` suite, when present,
    /// provides the result.
    pub(crate) fn eval_for(&mut self,
                           variable: &Expr,
                           iterable: &Expr,
                           body: &Block,
                           alternative: Option<&Block>,
                           env: &EnvRef,
                           position: &Position)
                           -> EvalResult<Value> {
        let iterated = self.eval_expr(iterable, env)?;
        let Value::Array(elements) = &iterated else {
            return Err(self.raise(ErrorKind::Type,
                                  format!("unsupported iterable type: {}", iterated.type_name()),
                                  position));
        };
        // Snapshot so the body may mutate the array while we walk it.
        let elements: Vec<Value> = elements.borrow().clone();

        let mut result = Value::None;

        for element in elements {
            self.bind_loop_variable(variable, element, env, position)?;

            match self.eval_block(body, env) {
                Ok(value) => result = value,
                Err(Signal::Stop) => return Ok(Value::None),
                Err(Signal::Skip) => {},
                Err(signal) => return Err(signal),
            }
        }

        match alternative {
            Some(block) => self.eval_block(block, env),
            None => Ok(result),
        }
    }

    fn bind_loop_variable(&mut self,
                          variable: &Expr,
                          element: Value,
                          env: &EnvRef,
                          position: &Position)
                          -> EvalResult<()> {
        match variable {
            Expr::Identifier { name, .. } => {
                env.borrow_mut().set(name, element);
                Ok(())
            },
            Expr::Tuple { elements: targets, .. } => {
                let items: Vec<Value> = match &element {
                    Value::Tuple(items) => items.as_ref().clone(),
                    Value::Array(items) => items.borrow().clone(),
                    other => {
                        return Err(self.raise(ErrorKind::Type,
                                              format!("cannot unpack non-iterable element: {}",
                                                      other.type_name()),
                                              position));
                    },
                };
                if items.len() != targets.len() {
                    return Err(self.raise(ErrorKind::Value,
                                          format!("unpacking mismatch: expected {} values, got {}",
                                                  targets.len(),
                                                  items.len()),
                                          position));
                }
                for (target, item) in targets.iter().zip(items) {
                    let Expr::Identifier { name, .. } = target else {
                        return Err(self.raise(ErrorKind::Type,
                                              "invalid assignment target in for loop",
                                              position));
                    };
                    env.borrow_mut().set(name, item);
                }
                Ok(())
            },
            other => Err(self.raise(ErrorKind::Type,
                                    format!("invalid loop variable: {other}"),
                                    position)),
        }
    }

    /// Evaluates a `match` statement. Cases compare with `==` over
    /// integers and strings only; anything else falls through to the
    /// default.
    pub(crate) fn eval_match(&mut self,
                             value: &Expr,
                             cases: &[MatchCase],
                             default: Option<&Block>,
                             env: &EnvRef)
                             -> EvalResult<Value> {
        let matched = self.eval_expr(value, env)?;

        for case in cases {
            let candidate = self.eval_expr(&case.condition, env)?;
            if match_values_equal(&matched, &candidate) {
                return self.eval_block(&case.body, env);
            }
        }

        match default {
            Some(block) => self.eval_block(block, env),
            None => Ok(Value::None),
        }
    }

    /// Evaluates a `check` assertion.
    ///
    /// On failure, the message expression (evaluated only now) or the
    /// stringified condition becomes an `AssertionError`.
    pub(crate) fn eval_check(&mut self,
                             condition: &Expr,
                             message: Option<&Expr>,
                             env: &EnvRef,
                             position: &Position)
                             -> EvalResult<Value> {
        if self.eval_expr(condition, env)?.is_truthy() {
            return Ok(Value::None);
        }

        let text = message.and_then(|expr| self.eval_expr(expr, env).ok())
                          .map_or_else(|| format!("Assertion failed: {condition}"),
                                       |value| value.to_string());

        Err(self.raise(ErrorKind::Assertion, text, position))
    }

    /// Evaluates a `raise` statement.
    ///
    /// Raising a grimoire instance produces an error named after the
    /// grimoire (message from the instance's `message` field) and linked
    /// back to it for `ensnare` matching; raising a string produces a
    /// generic error; anything else is itself an error.
    pub(crate) fn eval_raise(&mut self,
                             error: &Expr,
                             env: &EnvRef,
                             position: &Position)
                             -> EvalResult<Value> {
        let raised = self.eval_expr(error, env)?;

        let function_name = env.borrow().function_name().unwrap_or_else(|| "main".to_string());

        match raised {
            Value::Instance(instance) => {
                let message = match instance.env.borrow().get("message") {
                    Some(Value::Str(text)) => text,
                    _ => String::new(),
                };
                let mut error =
                    RuntimeError::custom(instance.grimoire.name.clone(), message, position.clone());
                error.class = Some(Rc::clone(&instance.grimoire));
                error.instance = Some(Value::Instance(Rc::clone(&instance)));
                self.annotate(&mut error, function_name, position);
                Err(Signal::Raise(error))
            },
            Value::Str(message) => {
                let mut error = RuntimeError::custom("Error", message, position.clone());
                self.annotate(&mut error, function_name, position);
                Err(Signal::Raise(error))
            },
            other => {
                let mut error =
                    self.error(ErrorKind::Runtime,
                               format!("cannot raise non-error object: {}", other.type_name()),
                               position.clone());
                error.add_stack_entry(function_name, position.clone());
                Err(Signal::Raise(error))
            },
        }
    }

    fn annotate(&self, error: &mut RuntimeError, function_name: String, position: &Position) {
        for frame in &self.call_stack {
            error.stack_trace
                 .push(StackTraceEntry::new(frame.function.clone(), frame.position.clone()));
        }
        error.add_stack_entry(function_name, position.clone());
    }

    /// Evaluates an `attempt`/`ensnare`/`resolve` statement.
    ///
    /// An error raised in the try block is tested against each ensnare
    /// guard: a grimoire matches by identity with the error's class, a
    /// string matches the error's name. The resolve suite runs
    /// unconditionally on exit; an error from it supersedes any prior
    /// result.
    pub(crate) fn eval_attempt(&mut self,
                               try_block: &Block,
                               ensnare: &[EnsnareClause],
                               resolve_block: Option<&Block>,
                               env: &EnvRef)
                               -> EvalResult<Value> {
        let try_result = self.eval_block(try_block, env);

        let mut result = match try_result {
            Err(Signal::Raise(error)) => {
                let mut outcome = None;

                for clause in ensnare {
                    let guard = match self.eval_expr(&clause.condition, env) {
                        Ok(value) => value,
                        Err(signal) => {
                            outcome = Some(Err(signal));
                            break;
                        },
                    };

                    let matches = match &guard {
                        Value::Grimoire(grimoire) => {
                            error.class.as_ref().is_some_and(|class| Rc::ptr_eq(class, grimoire))
                        },
                        Value::Str(name) => error.name == *name,
                        _ => false,
                    };

                    if matches {
                        outcome = Some(self.eval_block(&clause.body, env));
                        break;
                    }
                }

                outcome.unwrap_or(Err(Signal::Raise(error)))
            },
            other => other,
        };

        if let Some(resolve) = resolve_block {
            if let Err(signal) = self.eval_block(resolve, env) {
                result = Err(signal);
            }
        }

        result
    }
}

/// `match`-statement equality: integers and strings by value; every other
/// pairing never matches.
fn match_values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        _ => false,
    }
}
