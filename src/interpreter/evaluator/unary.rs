use crate::{ast::{Expr, PostfixOperator, PrefixOperator},
            error::ErrorKind,
            interpreter::{environment::EnvRef,
                          evaluator::core::{EvalResult, Interpreter},
                          lexer::Position,
                          value::core::Value}};

impl Interpreter {
    /// Evaluates a prefix operator application.
    pub(crate) fn eval_prefix(&mut self,
                              operator: PrefixOperator,
                              right: &Expr,
                              env: &EnvRef,
                              position: &Position)
                              -> EvalResult<Value> {
        match operator {
            PrefixOperator::Increment => self.eval_prefix_step(right, 1, env, position),
            PrefixOperator::Decrement => self.eval_prefix_step(right, -1, env, position),
            PrefixOperator::Bang | PrefixOperator::Not => {
                let value = self.eval_expr(right, env)?;
                Ok(Value::Boolean(!value.is_truthy()))
            },
            PrefixOperator::Tilde => {
                let value = self.eval_expr(right, env)?;
                match value {
                    Value::Integer(n) => Ok(Value::Integer(!n)),
                    other => Err(self.raise(ErrorKind::Type,
                                            format!("unsupported operand type for ~: {}",
                                                    other.type_name()),
                                            position)),
                }
            },
            PrefixOperator::Minus => {
                let value = self.eval_expr(right, env)?;
                match value {
                    Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or_else(|| {
                        self.raise(ErrorKind::Overflow,
                                   "integer overflow while computing result",
                                   position)
                    }),
                    Value::Float(f) => Ok(Value::Float(-f)),
                    other => Err(self.raise(ErrorKind::Type,
                                            format!("unknown operator: -{}", other.type_name()),
                                            position)),
                }
            },
        }
    }

    /// Pre-increment/decrement: mutates the binding and yields the new
    /// value. Valid only on identifiers bound to integers.
    fn eval_prefix_step(&mut self,
                        operand: &Expr,
                        delta: i64,
                        env: &EnvRef,
                        position: &Position)
                        -> EvalResult<Value> {
        let (name, current) = self.integer_operand(operand, env, "prefix", position)?;

        let updated = current.checked_add(delta).ok_or_else(|| {
                                                    self.raise(ErrorKind::Overflow,
                                                               "integer overflow while computing result",
                                                               position)
                                                })?;
        env.borrow_mut().set(&name, Value::Integer(updated));
        Ok(Value::Integer(updated))
    }

    /// Post-increment/decrement: stores the new value and yields the old.
    pub(crate) fn eval_postfix(&mut self,
                               operator: PostfixOperator,
                               operand: &Expr,
                               env: &EnvRef,
                               position: &Position)
                               -> EvalResult<Value> {
        let delta = match operator {
            PostfixOperator::Increment => 1,
            PostfixOperator::Decrement => -1,
        };

        let (name, current) = self.integer_operand(operand, env, "postfix", position)?;

        let updated = current.checked_add(delta).ok_or_else(|| {
                                                    self.raise(ErrorKind::Overflow,
                                                               "integer overflow while computing result",
                                                               position)
                                                })?;
        env.borrow_mut().set(&name, Value::Integer(updated));
        Ok(Value::Integer(current))
    }

    /// Resolves the operand of an increment/decrement: an identifier bound
    /// to an integer.
    fn integer_operand(&self,
                       operand: &Expr,
                       env: &EnvRef,
                       fixity: &str,
                       position: &Position)
                       -> EvalResult<(String, i64)> {
        let Expr::Identifier { name, .. } = operand else {
            return Err(self.raise(ErrorKind::Type,
                                  format!("{fixity} operator requires an identifier"),
                                  position));
        };

        let Some(value) = env.borrow().get(name) else {
            return Err(self.raise(ErrorKind::Name,
                                  format!("undefined variable '{name}'"),
                                  position));
        };

        match value {
            Value::Integer(n) => Ok((name.clone(), n)),
            _ => Err(self.raise(ErrorKind::Type,
                                format!("{fixity} operator requires an integer variable \
                                         '{name}'"),
                                position)),
        }
    }
}
