use std::{collections::HashSet, rc::Rc};

use crate::{ast::{Block, Expr, FStringPart, Program, Statement},
            error::{ErrorKind, RuntimeError, StackTraceEntry},
            interpreter::{environment::EnvRef,
                          evaluator::builtin,
                          lexer::Position,
                          value::core::{HashPair, Value}}};

/// A control-flow signal unwinding out of an evaluation.
///
/// The evaluator models the unwinding sentinels as the `Err` arm of
/// [`EvalResult`]: `?` after every child evaluation gives short-circuit
/// propagation, and the constructs that own a signal (loops for
/// `Stop`/`Skip`, calls for `Return`, `attempt` for `Raise`) intercept
/// exactly their own variants and re-raise the rest.
#[derive(Debug)]
pub enum Signal {
    /// Unwinds to the nearest loop and ends it.
    Stop,
    /// Unwinds to the nearest loop and continues with the next pass.
    Skip,
    /// Unwinds to the nearest call boundary carrying the return value.
    Return(Value),
    /// Unwinds to the nearest `attempt` handler or the program top.
    Raise(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Self::Raise(error)
    }
}

/// Result type used by the evaluator.
///
/// Evaluation functions return either a value of type `T` or a [`Signal`]
/// unwinding control flow.
pub type EvalResult<T> = Result<T, Signal>;

/// A function call recorded on the evaluation stack.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// The callee's display name.
    pub function: String,
    /// The call-site position.
    pub position: Position,
}

/// One evaluation session: the call stack used for error annotation, the
/// source file name, and the imported-files set that makes imports
/// idempotent.
///
/// Create one `Interpreter` per top-level evaluation; the core keeps no
/// process-wide state.
///
/// # Example
/// ```
/// use corvid::interpreter::{environment::Environment,
///                           evaluator::core::Interpreter,
///                           parser::core::parse_source,
///                           value::core::Value};
///
/// let program = parse_source("x = 2\nx * 21", "").unwrap();
/// let env = Environment::new();
/// let mut interpreter = Interpreter::new("");
///
/// let result = interpreter.eval_program(&program, &env).unwrap();
/// assert_eq!(result, Value::Integer(42));
/// ```
pub struct Interpreter {
    pub(crate) file_name:  String,
    pub(crate) call_stack: Vec<CallFrame>,
    pub(crate) imported:   HashSet<String>,
}

impl Interpreter {
    /// Creates a fresh evaluation session for `file_name`.
    #[must_use]
    pub fn new(file_name: &str) -> Self {
        Self { file_name:  file_name.to_string(),
               call_stack: Vec::new(),
               imported:   HashSet::new(), }
    }

    /// Evaluates a whole program in `env`.
    ///
    /// A `return` at the top level yields its value; `stop` and `skip`
    /// outside a loop are reported as syntax errors.
    ///
    /// # Errors
    /// Returns the [`RuntimeError`] that unwound uncaught to the top.
    pub fn eval_program(&mut self, program: &Program, env: &EnvRef) -> Result<Value, RuntimeError> {
        let mut result = Value::None;

        for statement in &program.statements {
            match self.eval_statement(statement, env) {
                Ok(value) => result = value,
                Err(Signal::Return(value)) => return Ok(value),
                Err(Signal::Raise(error)) => return Err(error),
                Err(Signal::Stop) => {
                    return Err(self.error(ErrorKind::Syntax,
                                          "'stop' outside of a loop",
                                          statement.position().clone()));
                },
                Err(Signal::Skip) => {
                    return Err(self.error(ErrorKind::Syntax,
                                          "'skip' outside of a loop",
                                          statement.position().clone()));
                },
            }
        }

        Ok(result)
    }

    /// Evaluates a single statement.
    pub fn eval_statement(&mut self, statement: &Statement, env: &EnvRef) -> EvalResult<Value> {
        match statement {
            Statement::Expression { expr, .. } => self.eval_expr(expr, env),
            Statement::Assign { target, value, position } => {
                self.eval_assign(target, value, env, position)
            },
            Statement::CompoundAssign { name, operator, value, position } => {
                self.eval_compound_assign(name, *operator, value, env, position)
            },
            Statement::Return { value, .. } => {
                let result = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::None,
                };
                Err(Signal::Return(result))
            },
            Statement::If { condition, consequence, otherwise, alternative, .. } => {
                self.eval_if(condition, consequence, otherwise, alternative.as_ref(), env)
            },
            Statement::While { condition, body, .. } => self.eval_while(condition, body, env),
            Statement::For { variable, iterable, body, alternative, position } => {
                self.eval_for(variable, iterable, body, alternative.as_ref(), env, position)
            },
            Statement::Match { value, cases, default, .. } => {
                self.eval_match(value, cases, default.as_ref(), env)
            },
            Statement::Raise { error, position } => self.eval_raise(error, env, position),
            Statement::Attempt { try_block, ensnare, resolve_block, .. } => {
                self.eval_attempt(try_block, ensnare, resolve_block.as_ref(), env)
            },
            Statement::Check { condition, message, position } => {
                self.eval_check(condition, message.as_ref(), env, position)
            },
            Statement::Ignore { .. } => Ok(Value::None),
            Statement::Stop { .. } => Err(Signal::Stop),
            Statement::Skip { .. } => Err(Signal::Skip),
            Statement::Function(def) => self.eval_function_def(def, env),
            Statement::Grimoire(def) => self.eval_grimoire_def(def, env),
            Statement::Import { path, alias, position } => {
                self.eval_import(path, alias.as_deref(), env, position)
            },
        }
    }

    /// Evaluates the statements of a block in order.
    ///
    /// The last statement's value is the block's value; any signal
    /// short-circuits the remainder.
    pub fn eval_block(&mut self, block: &Block, env: &EnvRef) -> EvalResult<Value> {
        let mut result = Value::None;
        for statement in &block.statements {
            result = self.eval_statement(statement, env)?;
        }
        Ok(result)
    }

    /// Evaluates a single expression.
    pub fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Value> {
        match expr {
            Expr::Integer { value, .. } => Ok(Value::Integer(*value)),
            Expr::Float { value, .. } => Ok(Value::Float(*value)),
            Expr::Str { value, .. } => Ok(Value::Str(value.clone())),
            Expr::Boolean { value, .. } => Ok(Value::Boolean(*value)),
            Expr::NoneLiteral { .. } => Ok(Value::None),
            Expr::FString { parts, .. } => self.eval_fstring(parts, env),
            Expr::Identifier { name, position } => self.eval_identifier(name, env, position),
            Expr::Array { elements, .. } => {
                let values = self.eval_expressions(elements, env)?;
                Ok(Value::from(values))
            },
            Expr::Tuple { elements, .. } => {
                let values = self.eval_expressions(elements, env)?;
                Ok(Value::Tuple(Rc::new(values)))
            },
            Expr::Hash { pairs, .. } => self.eval_hash_literal(pairs, env),
            Expr::Range { start, end, .. } => {
                let start_value = match start {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::None,
                };
                let end_value = match end {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::None,
                };
                Ok(Value::Range { start: Box::new(start_value),
                                  end:   Box::new(end_value), })
            },
            Expr::Prefix { operator, right, position } => {
                self.eval_prefix(*operator, right, env, position)
            },
            Expr::Infix { left, operator, right, position } => {
                self.eval_infix_expr(*operator, left, right, env, position)
            },
            Expr::Postfix { left, operator, position } => {
                self.eval_postfix(*operator, left, env, position)
            },
            Expr::Dot { left, field, position } => self.eval_dot(left, field, env, position),
            Expr::Index { left, index, position } => {
                self.eval_index_expr(left, index, env, position)
            },
            Expr::Call { function, arguments, position } => {
                self.eval_call_expr(function, arguments, env, position)
            },
        }
    }

    /// Evaluates a list of expressions left to right.
    pub(crate) fn eval_expressions(&mut self,
                                   exprs: &[Expr],
                                   env: &EnvRef)
                                   -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            values.push(self.eval_expr(expr, env)?);
        }
        Ok(values)
    }

    /// Resolves an identifier: builtins first, then the environment chain,
    /// then the `None` fallback.
    fn eval_identifier(&mut self,
                       name: &str,
                       env: &EnvRef,
                       position: &Position)
                       -> EvalResult<Value> {
        if let Some(native) = builtin::lookup(name) {
            return Ok(Value::Builtin(native));
        }
        if let Some(value) = env.borrow().get(name) {
            return Ok(value);
        }
        if name == "None" {
            return Ok(Value::None);
        }
        Err(self.raise(ErrorKind::Name, format!("identifier not found: {name}"), position))
    }

    fn eval_fstring(&mut self, parts: &[FStringPart], env: &EnvRef) -> EvalResult<Value> {
        let mut out = String::new();

        for part in parts {
            match part {
                FStringPart::Text(text) => out.push_str(text),
                FStringPart::Expr(expr) => {
                    let value = self.eval_expr(expr, env)?;
                    out.push_str(&value.to_string());
                },
            }
        }

        Ok(Value::Str(out))
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expr, Expr)], env: &EnvRef) -> EvalResult<Value> {
        let mut map = std::collections::HashMap::new();

        for (key_expr, value_expr) in pairs {
            let key = self.eval_expr(key_expr, env)?;
            let Some(hash_key) = key.hash_key() else {
                return Err(self.raise(ErrorKind::Type,
                                      format!("unusable as hash key: {}", key.type_name()),
                                      key_expr.position()));
            };
            let value = self.eval_expr(value_expr, env)?;
            map.insert(hash_key, HashPair { key, value });
        }

        Ok(Value::Hash(Rc::new(std::cell::RefCell::new(map))))
    }

    /// Builds an error of the given kind, annotated with the current call
    /// stack.
    pub(crate) fn error(&self,
                        kind: ErrorKind,
                        message: impl Into<String>,
                        position: Position)
                        -> RuntimeError {
        let mut error = RuntimeError::smart(kind, message, position);
        for frame in &self.call_stack {
            error.stack_trace
                 .push(StackTraceEntry::new(frame.function.clone(), frame.position.clone()));
        }
        error
    }

    /// Builds an error and wraps it into a [`Signal`].
    pub(crate) fn raise(&self,
                        kind: ErrorKind,
                        message: impl Into<String>,
                        position: &Position)
                        -> Signal {
        Signal::Raise(self.error(kind, message, position.clone()))
    }

    pub(crate) fn push_frame(&mut self, function: String, mut position: Position) {
        // Inline scripts lex with an empty file name; frames still report
        // the session's file.
        if position.file.is_empty() {
            position.file = self.file_name.clone();
        }
        self.call_stack.push(CallFrame { function, position });
    }

    pub(crate) fn pop_frame(&mut self) {
        self.call_stack.pop();
    }
}
