use std::{cell::RefCell, rc::Rc};

use crate::{ast::{Expr, InfixOperator},
            error::ErrorKind,
            interpreter::{environment::EnvRef,
                          evaluator::core::{EvalResult, Interpreter, Signal},
                          lexer::Position,
                          value::core::Value},
            util::num::i64_to_u32_checked};

impl Interpreter {
    /// Evaluates an infix expression.
    ///
    /// `and`/`or` short-circuit and may skip the right operand entirely;
    /// every other operator evaluates both operands (right first, as the
    /// language has always done) and dispatches on the value types.
    pub(crate) fn eval_infix_expr(&mut self,
                                  operator: InfixOperator,
                                  left: &Expr,
                                  right: &Expr,
                                  env: &EnvRef,
                                  position: &Position)
                                  -> EvalResult<Value> {
        match operator {
            InfixOperator::And => {
                let left_value = self.eval_expr(left, env)?;
                if left_value.is_truthy() {
                    self.eval_expr(right, env)
                } else {
                    Ok(left_value)
                }
            },
            InfixOperator::Or => {
                let left_value = self.eval_expr(left, env)?;
                if left_value.is_truthy() {
                    Ok(left_value)
                } else {
                    self.eval_expr(right, env)
                }
            },
            _ => {
                let right_value = self.eval_expr(right, env)?;
                let left_value = self.eval_expr(left, env)?;
                self.eval_infix(operator, &left_value, &right_value, position)
            },
        }
    }

    /// Dispatches a binary operation on a (left type, right type) pair.
    pub(crate) fn eval_infix(&self,
                             operator: InfixOperator,
                             left: &Value,
                             right: &Value,
                             position: &Position)
                             -> EvalResult<Value> {
        match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => {
                self.eval_integer_infix(operator, *a, *b, position)
            },
            (Value::Boolean(a), Value::Boolean(b)) => match operator {
                InfixOperator::Eq => Ok(Value::Boolean(a == b)),
                InfixOperator::NotEq => Ok(Value::Boolean(a != b)),
                _ => Err(self.unknown_operator(operator, left, right, position)),
            },
            (Value::Str(a), Value::Str(b)) => match operator {
                InfixOperator::Plus => Ok(Value::Str(format!("{a}{b}"))),
                InfixOperator::Eq => Ok(Value::Boolean(a == b)),
                InfixOperator::NotEq => Ok(Value::Boolean(a != b)),
                _ => Err(self.unknown_operator(operator, left, right, position)),
            },
            (Value::Array(a), Value::Array(b)) => {
                if operator != InfixOperator::Plus {
                    return Err(self.unknown_operator(operator, left, right, position));
                }
                // A fresh backing vector; the result never aliases either
                // input.
                let mut elements = a.borrow().clone();
                elements.extend(b.borrow().iter().cloned());
                Ok(Value::Array(Rc::new(RefCell::new(elements))))
            },
            (Value::None, Value::None) => Ok(Value::Boolean(operator == InfixOperator::Eq)),
            (Value::None, _) | (_, Value::None) => match operator {
                InfixOperator::Eq => Ok(Value::Boolean(false)),
                InfixOperator::NotEq => Ok(Value::Boolean(true)),
                _ => Err(self.type_mismatch(operator, left, right, position)),
            },
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                self.eval_float_infix(operator, to_float(left), to_float(right), position)
            },
            _ => Err(self.type_mismatch(operator, left, right, position)),
        }
    }

    fn eval_integer_infix(&self,
                          operator: InfixOperator,
                          a: i64,
                          b: i64,
                          position: &Position)
                          -> EvalResult<Value> {
        let overflow =
            || self.raise(ErrorKind::Overflow, "integer overflow while computing result", position);

        match operator {
            InfixOperator::Plus => a.checked_add(b).map(Value::Integer).ok_or_else(overflow),
            InfixOperator::Minus => a.checked_sub(b).map(Value::Integer).ok_or_else(overflow),
            InfixOperator::Asterisk => a.checked_mul(b).map(Value::Integer).ok_or_else(overflow),
            InfixOperator::Slash => {
                if b == 0 {
                    return Err(self.raise(ErrorKind::DivisionByZero, "division by zero", position));
                }
                a.checked_div(b).map(Value::Integer).ok_or_else(overflow)
            },
            InfixOperator::Mod => {
                if b == 0 {
                    return Err(self.raise(ErrorKind::DivisionByZero, "modulo by zero", position));
                }
                a.checked_rem(b).map(Value::Integer).ok_or_else(overflow)
            },
            InfixOperator::Power => self.eval_integer_power(a, b, position),
            InfixOperator::Eq => Ok(Value::Boolean(a == b)),
            InfixOperator::NotEq => Ok(Value::Boolean(a != b)),
            InfixOperator::Lt => Ok(Value::Boolean(a < b)),
            InfixOperator::Gt => Ok(Value::Boolean(a > b)),
            InfixOperator::Le => Ok(Value::Boolean(a <= b)),
            InfixOperator::Ge => Ok(Value::Boolean(a >= b)),
            InfixOperator::Lshift => {
                let shift = i64_to_u32_checked(b, position)?;
                Ok(Value::Integer(a.checked_shl(shift).unwrap_or(0)))
            },
            InfixOperator::Rshift => {
                let shift = i64_to_u32_checked(b, position)?;
                if shift >= 64 {
                    // Arithmetic shift saturates at the sign.
                    Ok(Value::Integer(if a < 0 { -1 } else { 0 }))
                } else {
                    Ok(Value::Integer(a >> shift))
                }
            },
            InfixOperator::BitAnd => Ok(Value::Integer(a & b)),
            InfixOperator::BitXor => Ok(Value::Integer(a ^ b)),
            InfixOperator::BitOr => Ok(Value::Integer(a | b)),
            InfixOperator::And | InfixOperator::Or => {
                Err(self.unknown_operator(operator,
                                          &Value::Integer(a),
                                          &Value::Integer(b),
                                          position))
            },
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn eval_integer_power(&self, a: i64, b: i64, position: &Position) -> EvalResult<Value> {
        if b >= 0 {
            let exponent = i64_to_u32_checked(b, position)?;
            a.checked_pow(exponent).map(Value::Integer).ok_or_else(|| {
                                                           self.raise(ErrorKind::Overflow,
                                                                      "integer overflow while computing result",
                                                                      position)
                                                       })
        } else {
            // A negative exponent truncates toward zero, as integer
            // exponentiation always has here.
            Ok(Value::Integer(((a as f64).powf(b as f64)) as i64))
        }
    }

    fn eval_float_infix(&self,
                        operator: InfixOperator,
                        a: f64,
                        b: f64,
                        position: &Position)
                        -> EvalResult<Value> {
        match operator {
            InfixOperator::Plus => Ok(Value::Float(a + b)),
            InfixOperator::Minus => Ok(Value::Float(a - b)),
            InfixOperator::Asterisk => Ok(Value::Float(a * b)),
            InfixOperator::Slash => {
                if b == 0.0 {
                    return Err(self.raise(ErrorKind::DivisionByZero, "division by zero", position));
                }
                Ok(Value::Float(a / b))
            },
            InfixOperator::Power => Ok(Value::Float(a.powf(b))),
            InfixOperator::Eq => Ok(Value::Boolean(a == b)),
            InfixOperator::NotEq => Ok(Value::Boolean(a != b)),
            InfixOperator::Lt => Ok(Value::Boolean(a < b)),
            InfixOperator::Gt => Ok(Value::Boolean(a > b)),
            InfixOperator::Le => Ok(Value::Boolean(a <= b)),
            InfixOperator::Ge => Ok(Value::Boolean(a >= b)),
            _ => Err(self.raise(ErrorKind::Type,
                                format!("unknown operator: FLOAT {operator} FLOAT"),
                                position)),
        }
    }

    fn unknown_operator(&self,
                        operator: InfixOperator,
                        left: &Value,
                        right: &Value,
                        position: &Position)
                        -> Signal {
        self.raise(ErrorKind::Type,
                   format!("unknown operator: {} {operator} {}",
                           left.type_name(),
                           right.type_name()),
                   position)
    }

    fn type_mismatch(&self,
                     operator: InfixOperator,
                     left: &Value,
                     right: &Value,
                     position: &Position)
                     -> Signal {
        self.raise(ErrorKind::Type,
                   format!("type mismatch: {} {operator} {}",
                           left.type_name(),
                           right.type_name()),
                   position)
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_float(value: &Value) -> f64 {
    match value {
        Value::Integer(n) => *n as f64,
        Value::Float(f) => *f,
        _ => 0.0,
    }
}
