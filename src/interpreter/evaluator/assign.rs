use crate::{ast::{Expr, InfixOperator},
            error::ErrorKind,
            interpreter::{environment::EnvRef,
                          evaluator::core::{EvalResult, Interpreter},
                          lexer::Position,
                          value::core::Value},
            util::num::i64_to_usize_checked};

impl Interpreter {
    /// Evaluates an assignment statement.
    ///
    /// The target decides the store: identifiers bind in the current
    /// environment, dot targets set instance fields, index targets mutate
    /// arrays in place, and tuple patterns unpack with snapshot-first
    /// semantics so `(a, b) = (b, a)` swaps correctly.
    pub(crate) fn eval_assign(&mut self,
                              target: &Expr,
                              value: &Expr,
                              env: &EnvRef,
                              position: &Position)
                              -> EvalResult<Value> {
        match target {
            Expr::Identifier { name, .. } => {
                let value = self.eval_expr(value, env)?;
                env.borrow_mut().set(name, value.clone());
                Ok(value)
            },
            Expr::Tuple { elements, .. } => {
                let value = self.eval_expr(value, env)?;
                self.unpack_into(elements, &value, env, position)
            },
            Expr::Dot { left, field, .. } => {
                let object = self.eval_expr(left, env)?;
                let Value::Instance(instance) = &object else {
                    return Err(self.raise(ErrorKind::Type,
                                          format!("invalid assignment target: {}",
                                                  object.type_name()),
                                          position));
                };
                let value = self.eval_expr(value, env)?;
                instance.env.borrow_mut().set(field, value.clone());
                Ok(value)
            },
            Expr::Index { left, index, .. } => {
                let container = self.eval_expr(left, env)?;
                let index = self.eval_expr(index, env)?;
                let value = self.eval_expr(value, env)?;
                self.assign_index(&container, &index, value, position)
            },
            other => Err(self.raise(ErrorKind::Type,
                                    format!("invalid assignment target: {other}"),
                                    position)),
        }
    }

    /// Unpacks `value` (a tuple or array) across `targets`.
    ///
    /// All right-hand elements are snapshotted before any target is
    /// written, then each target is assigned in order; nested tuple
    /// patterns recurse.
    pub(crate) fn unpack_into(&mut self,
                              targets: &[Expr],
                              value: &Value,
                              env: &EnvRef,
                              position: &Position)
                              -> EvalResult<Value> {
        let values: Vec<Value> = match value {
            Value::Tuple(elements) => elements.as_ref().clone(),
            Value::Array(elements) => elements.borrow().clone(),
            other => {
                return Err(self.raise(ErrorKind::Type,
                                      format!("cannot unpack non-iterable {} into {} values",
                                              other.type_name(),
                                              targets.len()),
                                      position));
            },
        };

        if values.len() != targets.len() {
            return Err(self.raise(ErrorKind::Value,
                                  format!("unpacking mismatch: expected {} values, got {}",
                                          targets.len(),
                                          values.len()),
                                  position));
        }

        for (target, element) in targets.iter().zip(&values) {
            self.assign_to_target(target, element.clone(), env, position)?;
        }

        Ok(value.clone())
    }

    /// Assigns one already-evaluated value to a single target form.
    fn assign_to_target(&mut self,
                        target: &Expr,
                        value: Value,
                        env: &EnvRef,
                        position: &Position)
                        -> EvalResult<Value> {
        match target {
            Expr::Identifier { name, .. } => {
                env.borrow_mut().set(name, value.clone());
                Ok(value)
            },
            Expr::Index { left, index, .. } => {
                let container = self.eval_expr(left, env)?;
                let index = self.eval_expr(index, env)?;
                self.assign_index(&container, &index, value, position)
            },
            Expr::Dot { left, field, .. } => {
                let object = self.eval_expr(left, env)?;
                let Value::Instance(instance) = &object else {
                    return Err(self.raise(ErrorKind::Type,
                                          format!("invalid assignment target in unpacking: {}",
                                                  object.type_name()),
                                          position));
                };
                instance.env.borrow_mut().set(field, value.clone());
                Ok(value)
            },
            Expr::Tuple { elements, .. } => self.unpack_into(elements, &value, env, position),
            other => Err(self.raise(ErrorKind::Type,
                                    format!("invalid assignment target in unpacking: {other}"),
                                    position)),
        }
    }

    /// Writes `value` at `index` of `container` (array element
    /// assignment). Unlike reads, an out-of-range write is an error.
    fn assign_index(&mut self,
                    container: &Value,
                    index: &Value,
                    value: Value,
                    position: &Position)
                    -> EvalResult<Value> {
        match (container, index) {
            (Value::Array(elements), Value::Integer(raw_index)) => {
                let mut elements = elements.borrow_mut();
                let length = elements.len() as i64;
                let mut idx = *raw_index;
                if idx < 0 {
                    idx += length;
                }
                if idx < 0 || idx >= length {
                    return Err(self.raise(ErrorKind::Index,
                                          format!("array index out of range: {raw_index}"),
                                          position));
                }
                let slot = i64_to_usize_checked(idx, position)?;
                elements[slot] = value.clone();
                Ok(value)
            },
            (container, index) => Err(self.raise(ErrorKind::Type,
                                                 format!("invalid assignment target: {}[{}]",
                                                         container.type_name(),
                                                         index.type_name()),
                                                 position)),
        }
    }

    /// Evaluates a compound assignment (`+= -= *= /=`) on an identifier.
    ///
    /// The operand types must match exactly; `/=` by zero raises a
    /// division error.
    pub(crate) fn eval_compound_assign(&mut self,
                                       name: &str,
                                       operator: InfixOperator,
                                       value: &Expr,
                                       env: &EnvRef,
                                       position: &Position)
                                       -> EvalResult<Value> {
        let Some(current) = env.borrow().get(name) else {
            return Err(self.raise(ErrorKind::Name,
                                  format!("undefined variable: {name}"),
                                  position));
        };
        let right = self.eval_expr(value, env)?;

        let updated = match (&current, &right) {
            (Value::Integer(_), Value::Integer(_)) | (Value::Float(_), Value::Float(_)) => {
                self.eval_infix(operator, &current, &right, position)?
            },
            (current, right) => {
                return Err(self.raise(ErrorKind::Type,
                                      format!("type mismatch: expected {}, got {}",
                                              current.type_name(),
                                              right.type_name()),
                                      position));
            },
        };

        env.borrow_mut().set(name, updated.clone());
        Ok(updated)
    }
}
