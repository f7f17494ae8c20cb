use std::{cell::RefCell, rc::Rc};

use crate::{ast::Expr,
            error::ErrorKind,
            interpreter::{environment::EnvRef,
                          evaluator::core::{EvalResult, Interpreter},
                          lexer::Position,
                          value::core::Value}};

impl Interpreter {
    /// Evaluates an index expression `left[index]`, where the index may
    /// be a plain value or a slice range.
    pub(crate) fn eval_index_expr(&mut self,
                                  left: &Expr,
                                  index: &Expr,
                                  env: &EnvRef,
                                  position: &Position)
                                  -> EvalResult<Value> {
        let container = self.eval_expr(left, env)?;
        let index = self.eval_expr(index, env)?;
        self.eval_index(&container, &index, position)
    }

    /// Dispatches indexing on the container type.
    pub(crate) fn eval_index(&self,
                             container: &Value,
                             index: &Value,
                             position: &Position)
                             -> EvalResult<Value> {
        match container {
            Value::Array(elements) => match index {
                Value::Integer(idx) => Ok(read_element(&elements.borrow(), *idx)),
                Value::Range { start, end } => self.eval_array_slice(&elements.borrow(),
                                                                     start,
                                                                     end,
                                                                     position),
                other => Err(self.raise(ErrorKind::Type,
                                        format!("array index must be INTEGER or RANGE, got {}",
                                                other.type_name()),
                                        position)),
            },
            Value::Tuple(elements) => match index {
                Value::Integer(idx) => Ok(read_element(elements, *idx)),
                other => Err(self.raise(ErrorKind::Type,
                                        format!("tuple index must be INTEGER, got {}",
                                                other.type_name()),
                                        position)),
            },
            Value::Hash(pairs) => {
                let Some(key) = index.hash_key() else {
                    return Err(self.raise(ErrorKind::Type,
                                          format!("unusable as hash key: {}", index.type_name()),
                                          position));
                };
                Ok(pairs.borrow()
                        .get(&key)
                        .map_or(Value::None, |pair| pair.value.clone()))
            },
            other => Err(self.raise(ErrorKind::Type,
                                    format!("index operator not supported: {}",
                                            other.type_name()),
                                    position)),
        }
    }

    /// Slices an array over a half-open range.
    ///
    /// Bounds default to the ends, negative bounds count from the back,
    /// and everything clamps to `[0, len]`; an empty or inverted range
    /// yields an empty array. The result copies the selected elements and
    /// never aliases the source.
    fn eval_array_slice(&self,
                        elements: &[Value],
                        start: &Value,
                        end: &Value,
                        position: &Position)
                        -> EvalResult<Value> {
        let length = elements.len() as i64;

        let mut start_idx = match start {
            Value::None => 0,
            Value::Integer(idx) if *idx < 0 => length + idx,
            Value::Integer(idx) => *idx,
            other => {
                return Err(self.raise(ErrorKind::Type,
                                      format!("array slice start index must be INTEGER, got {}",
                                              other.type_name()),
                                      position));
            },
        };
        let mut end_idx = match end {
            Value::None => length,
            Value::Integer(idx) if *idx < 0 => length + idx,
            Value::Integer(idx) => *idx,
            other => {
                return Err(self.raise(ErrorKind::Type,
                                      format!("array slice end index must be INTEGER, got {}",
                                              other.type_name()),
                                      position));
            },
        };

        start_idx = start_idx.max(0);
        end_idx = end_idx.min(length);
        if start_idx >= length || end_idx <= 0 || start_idx >= end_idx {
            return Ok(Value::Array(Rc::new(RefCell::new(Vec::new()))));
        }

        #[allow(clippy::cast_sign_loss)]
        let selected = elements[start_idx as usize..end_idx as usize].to_vec();
        Ok(Value::from(selected))
    }
}

/// Reads an element with negative-index wrapping; out-of-range reads
/// yield None rather than an error.
fn read_element(elements: &[Value], raw_index: i64) -> Value {
    let length = elements.len() as i64;
    let mut index = raw_index;
    if index < 0 {
        index += length;
    }
    if index < 0 || index >= length {
        return Value::None;
    }
    #[allow(clippy::cast_sign_loss)]
    let index = index as usize;
    elements.get(index).cloned().unwrap_or(Value::None)
}
