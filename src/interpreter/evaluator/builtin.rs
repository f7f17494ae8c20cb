use crate::{error::{ErrorKind, RuntimeError},
            interpreter::{lexer::Position, value::core::{Builtin, Value}}};

/// The builtins registry: native functions consulted before environment
/// lookup during identifier resolution, so these names cannot be
/// shadowed.
static BUILTINS: &[Builtin] = &[Builtin { name: "print", func: builtin_print },
                                Builtin { name: "len", func: builtin_len },
                                Builtin { name: "type", func: builtin_type },
                                Builtin { name: "str", func: builtin_str },
                                Builtin { name: "int", func: builtin_int },
                                Builtin { name: "float", func: builtin_float },
                                Builtin { name: "range", func: builtin_range },
                                Builtin { name: "abs", func: builtin_abs },
                                Builtin { name: "max", func: builtin_max },
                                Builtin { name: "min", func: builtin_min }];

/// Looks up a builtin by name.
#[must_use]
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name).copied()
}

/// Checks that the argument list has the expected count.
fn check_arity(args: &[Value], expected: usize, position: &Position) -> Result<(), RuntimeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::new(ErrorKind::Type,
                              format!("wrong number of arguments. got={}, want={expected}",
                                      args.len()),
                              position.clone()))
    }
}

/// Writes the printable form of each argument, space-separated, with a
/// trailing newline.
fn builtin_print(args: &[Value], _position: &Position) -> Result<Value, RuntimeError> {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::None)
}

fn builtin_len(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    check_arity(args, 1, position)?;

    let length = match &args[0] {
        Value::Str(value) => value.chars().count(),
        Value::Array(elements) => elements.borrow().len(),
        Value::Tuple(elements) => elements.len(),
        Value::Hash(pairs) => pairs.borrow().len(),
        other => {
            return Err(RuntimeError::new(ErrorKind::Type,
                                         format!("argument to `len` not supported, got {}",
                                                 other.type_name()),
                                         position.clone()));
        },
    };

    Ok(Value::Integer(length as i64))
}

fn builtin_type(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    check_arity(args, 1, position)?;
    Ok(Value::Str(args[0].type_name().to_string()))
}

fn builtin_str(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    check_arity(args, 1, position)?;
    Ok(Value::Str(args[0].to_string()))
}

#[allow(clippy::cast_possible_truncation)]
fn builtin_int(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    check_arity(args, 1, position)?;

    match &args[0] {
        Value::Integer(value) => Ok(Value::Integer(*value)),
        Value::Float(value) => Ok(Value::Integer(value.trunc() as i64)),
        Value::Boolean(value) => Ok(Value::Integer(i64::from(*value))),
        Value::Str(text) => text.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
                                RuntimeError::new(ErrorKind::Value,
                                                  format!("invalid literal for int: '{text}'"),
                                                  position.clone())
                            }),
        other => Err(RuntimeError::new(ErrorKind::Type,
                                       format!("argument to `int` not supported, got {}",
                                               other.type_name()),
                                       position.clone())),
    }
}

#[allow(clippy::cast_precision_loss)]
fn builtin_float(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    check_arity(args, 1, position)?;

    match &args[0] {
        Value::Integer(value) => Ok(Value::Float(*value as f64)),
        Value::Float(value) => Ok(Value::Float(*value)),
        Value::Str(text) => text.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                                RuntimeError::new(ErrorKind::Value,
                                                  format!("invalid literal for float: '{text}'"),
                                                  position.clone())
                            }),
        other => Err(RuntimeError::new(ErrorKind::Type,
                                       format!("argument to `float` not supported, got {}",
                                               other.type_name()),
                                       position.clone())),
    }
}

/// `range(end)`, `range(start, end)`, or `range(start, end, step)` over
/// integers, producing an array.
fn builtin_range(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    let as_integer = |value: &Value| match value {
        Value::Integer(n) => Ok(*n),
        other => Err(RuntimeError::new(ErrorKind::Type,
                                       format!("argument to `range` must be INTEGER, got {}",
                                               other.type_name()),
                                       position.clone())),
    };

    let (start, end, step) = match args {
        [end] => (0, as_integer(end)?, 1),
        [start, end] => (as_integer(start)?, as_integer(end)?, 1),
        [start, end, step] => (as_integer(start)?, as_integer(end)?, as_integer(step)?),
        _ => {
            return Err(RuntimeError::new(ErrorKind::Type,
                                         format!("wrong number of arguments. got={}, want=1..3",
                                                 args.len()),
                                         position.clone()));
        },
    };

    if step == 0 {
        return Err(RuntimeError::new(ErrorKind::Value,
                                     "range step must not be zero",
                                     position.clone()));
    }

    let mut elements = Vec::new();
    let mut current = start;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        elements.push(Value::Integer(current));
        current += step;
    }

    Ok(Value::from(elements))
}

fn builtin_abs(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    check_arity(args, 1, position)?;

    match &args[0] {
        Value::Integer(value) => value.checked_abs().map(Value::Integer).ok_or_else(|| {
                                     RuntimeError::new(ErrorKind::Overflow,
                                                       "integer overflow while computing result",
                                                       position.clone())
                                 }),
        Value::Float(value) => Ok(Value::Float(value.abs())),
        other => Err(RuntimeError::new(ErrorKind::Type,
                                       format!("argument to `abs` must be a number, got {}",
                                               other.type_name()),
                                       position.clone())),
    }
}

fn builtin_max(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    fold_extremum("max", args, position, |candidate, best| candidate > best)
}

fn builtin_min(args: &[Value], position: &Position) -> Result<Value, RuntimeError> {
    fold_extremum("min", args, position, |candidate, best| candidate < best)
}

/// Shared `max`/`min` implementation: numeric arguments compared after
/// promotion, returning the original (unpromoted) winner.
#[allow(clippy::cast_precision_loss)]
fn fold_extremum(name: &str,
                 args: &[Value],
                 position: &Position,
                 wins: fn(f64, f64) -> bool)
                 -> Result<Value, RuntimeError> {
    if args.is_empty() {
        return Err(RuntimeError::new(ErrorKind::Type,
                                     format!("`{name}` expects at least one argument"),
                                     position.clone()));
    }

    let as_number = |value: &Value| match value {
        Value::Integer(n) => Ok(*n as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::new(ErrorKind::Type,
                                       format!("argument to `{name}` must be a number, got {}",
                                               other.type_name()),
                                       position.clone())),
    };

    let mut best = args[0].clone();
    let mut best_key = as_number(&best)?;

    for candidate in &args[1..] {
        let key = as_number(candidate)?;
        if wins(key, best_key) {
            best = candidate.clone();
            best_key = key;
        }
    }

    Ok(best)
}
