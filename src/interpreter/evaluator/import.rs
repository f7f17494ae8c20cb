use std::fs;

use crate::{error::ErrorKind,
            interpreter::{environment::{EnvRef, Environment},
                          evaluator::core::{EvalResult, Interpreter, Signal},
                          lexer::{Lexer, Position},
                          parser::core::Parser,
                          value::core::Value}};

impl Interpreter {
    /// Evaluates an `import "path" [as alias]` statement.
    ///
    /// The path resolves to `path.crl`. Imports are idempotent within a
    /// session: a path already imported is a no-op. The module evaluates
    /// in a fresh environment enclosed by the importer's; with an alias
    /// the whole module binds as a namespace, without one only grimoire
    /// bindings are copied into the importer.
    pub(crate) fn eval_import(&mut self,
                              path: &str,
                              alias: Option<&str>,
                              env: &EnvRef,
                              position: &Position)
                              -> EvalResult<Value> {
        let file_path = format!("{path}.crl");

        if self.imported.contains(&file_path) {
            return Ok(Value::None);
        }
        self.imported.insert(file_path.clone());

        let source = fs::read_to_string(&file_path).map_err(|error| {
                         self.raise(ErrorKind::Import,
                                    format!("could not import file '{file_path}': {error}"),
                                    position)
                     })?;

        let mut parser = Parser::new(Lexer::new(&source, &file_path));
        let program = parser.parse_program().map_err(|error| {
                                                self.raise(ErrorKind::Import,
                                                           format!("parsing errors in imported \
                                                                    file: {error}"),
                                                           position)
                                            })?;

        let import_env = Environment::new_enclosed(env);
        for statement in &program.statements {
            match self.eval_statement(statement, &import_env) {
                Ok(_) => {},
                Err(Signal::Return(_)) => break,
                Err(signal) => return Err(signal),
            }
        }

        match alias {
            Some(alias) => {
                env.borrow_mut().set(alias, Value::Namespace(import_env));
            },
            None => {
                let names = import_env.borrow().names();
                for name in names {
                    let binding = import_env.borrow().get_local(&name);
                    if let Some(value @ Value::Grimoire(_)) = binding {
                        env.borrow_mut().set(&name, value);
                    }
                }
            },
        }

        Ok(Value::None)
    }
}
