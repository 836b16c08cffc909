//! Evaluator for Vanara
//!
//! Walks the AST against an environment and produces a value. Three
//! conventions govern every node: truthiness (`null` and `false` are the
//! only falsy values), error short-circuiting (an `Error` value returns
//! immediately through every frame), and return unwinding (a `Return`
//! value passes through blocks unchanged and is unwrapped by the nearest
//! enclosing function call).

use std::io::{self, Write};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::{Block, Expr, Identifier, InfixOp, PrefixOp, Program, Stmt};
use crate::builtins::{BuiltinFn, Registry};
use crate::environment::{EnvArena, EnvId};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::{FunctionValue, HashPair, Value};

/// The interpreter: environment arena, builtin registry, output sink.
/// At most one is active per run; evaluation is single-threaded,
/// synchronous recursion bounded only by the host stack.
pub struct Interpreter {
    pub envs: EnvArena,
    builtins: Registry,
    out: Box<dyn Write>,
}

impl Interpreter {
    /// An interpreter with the core builtins, writing to stdout
    pub fn new() -> Self {
        Self::with_out(Box::new(io::stdout()))
    }

    /// An interpreter with the core builtins and a caller-supplied
    /// output sink (parser-error banners and `puts` go there)
    pub fn with_out(out: Box<dyn Write>) -> Self {
        Self {
            envs: EnvArena::new(),
            builtins: Registry::core(),
            out,
        }
    }

    /// Attach a host builtin; used by the CLI to add the OS-bound set
    pub fn register_builtin(&mut self, name: &'static str, func: BuiltinFn) {
        self.builtins.register(name, func);
    }

    pub(crate) fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
    }

    /// Lex, parse and evaluate `source` in `env`.
    ///
    /// Parser errors are written to the output sink and yield `None`;
    /// the program is not evaluated. Otherwise `MAIN`, `MONKEY_VERSION`
    /// and `FILE` are bound in `env` and the program's value returned —
    /// `None` again if the program produced no value (e.g. it ends in a
    /// `let` or is empty). A runtime failure is `Some(Value::Error)`.
    pub fn run(&mut self, source: &str, file: &str, is_main: bool, env: EnvId) -> Option<Value> {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();

        if !parser.errors().is_empty() {
            let _ = self
                .out
                .write_all(b"Woops! We ran into some monkey business here!\n parser errors:\n");

            for message in parser.errors() {
                let _ = writeln!(self.out, "\t{}", message);
            }

            return None;
        }

        self.envs.set(env, "MAIN", Value::Boolean(is_main));
        self.envs.set(
            env,
            "MONKEY_VERSION",
            Value::String(format!("v{}", crate::VERSION)),
        );
        self.envs.set(env, "FILE", Value::String(file.to_string()));

        self.eval_program(&program, env)
    }

    fn eval_program(&mut self, program: &Program, env: EnvId) -> Option<Value> {
        let mut result = None;

        for stmt in &program.statements {
            result = match self.eval_statement(stmt, env) {
                // a top-level return ends the program with its inner value
                Some(Value::Return(value)) => return Some(*value),
                Some(Value::Error(message)) => return Some(Value::Error(message)),
                other => other,
            };
        }

        result
    }

    /// Evaluate the statements of a block. `Return` and `Error` results
    /// pass through unchanged so the enclosing function call can unwrap
    /// or propagate them.
    fn eval_block(&mut self, block: &Block, env: EnvId) -> Option<Value> {
        let mut result = None;

        for stmt in &block.statements {
            result = match self.eval_statement(stmt, env) {
                Some(value @ (Value::Return(_) | Value::Error(_))) => return Some(value),
                other => other,
            };
        }

        result
    }

    /// Evaluate one statement. `None` means the statement produced no
    /// value (a `let`); expression positions map that to `null`.
    fn eval_statement(&mut self, stmt: &Stmt, env: EnvId) -> Option<Value> {
        match stmt {
            Stmt::Let { name, value, .. } => {
                let value = self.eval_expression(value, env);

                if value.is_error() {
                    return Some(value);
                }

                self.envs.set(env, name.value.clone(), value);

                None
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => {
                        let value = self.eval_expression(expr, env);

                        if value.is_error() {
                            return Some(value);
                        }

                        value
                    }
                    None => Value::Null,
                };

                Some(Value::Return(Box::new(value)))
            }
            Stmt::Expr { expression, .. } => Some(self.eval_expression(expression, env)),
        }
    }

    fn eval_expression(&mut self, expr: &Expr, env: EnvId) -> Value {
        match expr {
            Expr::Ident(ident) => self.eval_identifier(ident, env),
            Expr::Int { value, .. } => Value::Integer(*value),
            Expr::Str { value, .. } => Value::String(value.clone()),
            Expr::Bool { value, .. } => Value::Boolean(*value),
            Expr::Null { .. } => Value::Null,
            Expr::Prefix { op, right, .. } => {
                let right = self.eval_expression(right, env);

                if right.is_error() {
                    return right;
                }

                eval_prefix_expression(*op, right)
            }
            Expr::Infix {
                op, left, right, ..
            } => {
                let left = self.eval_expression(left, env);

                if left.is_error() {
                    return left;
                }

                let right = self.eval_expression(right, env);

                if right.is_error() {
                    return right;
                }

                eval_infix_expression(*op, left, right)
            }
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.eval_expression(condition, env);

                if condition.is_error() {
                    return condition;
                }

                if condition.is_truthy() {
                    self.eval_block(consequence, env).unwrap_or(Value::Null)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env).unwrap_or(Value::Null)
                } else {
                    Value::Null
                }
            }
            Expr::Function {
                parameters, body, ..
            } => Value::Function(Rc::new(FunctionValue {
                parameters: parameters.clone(),
                body: body.clone(),
                env,
            })),
            Expr::Call {
                function,
                arguments,
                ..
            } => {
                let function = self.eval_expression(function, env);

                if function.is_error() {
                    return function;
                }

                let mut args = self.eval_expressions(arguments, env);

                if args.len() == 1 && args[0].is_error() {
                    return args.swap_remove(0);
                }

                self.apply_function(&function, &args)
            }
            Expr::Array { elements, .. } => {
                let mut elements = self.eval_expressions(elements, env);

                if elements.len() == 1 && elements[0].is_error() {
                    return elements.swap_remove(0);
                }

                Value::array(elements)
            }
            Expr::Index { left, index, .. } => {
                let left = self.eval_expression(left, env);

                if left.is_error() {
                    return left;
                }

                let index = self.eval_expression(index, env);

                if index.is_error() {
                    return index;
                }

                eval_index_expression(left, index)
            }
            Expr::Hash { pairs, .. } => self.eval_hash_literal(pairs, env),
            Expr::Assign { left, value, .. } => self.eval_assign_expression(left, value, env),
        }
    }

    /// Names resolve through the environment chain first, then the
    /// builtin registry; user bindings shadow builtins
    fn eval_identifier(&mut self, ident: &Identifier, env: EnvId) -> Value {
        if let Some(value) = self.envs.get(env, &ident.value) {
            return value;
        }

        if let Some(builtin) = self.builtins.get(&ident.value) {
            return Value::Builtin(builtin);
        }

        Value::error(format!("identifier not found: {}", ident.value))
    }

    /// Evaluate a list left-to-right; on the first error the result is
    /// that single error alone
    fn eval_expressions(&mut self, exprs: &[Expr], env: EnvId) -> Vec<Value> {
        let mut results = Vec::with_capacity(exprs.len());

        for expr in exprs {
            let value = self.eval_expression(expr, env);

            if value.is_error() {
                return vec![value];
            }

            results.push(value);
        }

        results
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expr, Expr)], env: EnvId) -> Value {
        let mut evaluated = FxHashMap::default();

        for (key_expr, value_expr) in pairs {
            let key = self.eval_expression(key_expr, env);

            if key.is_error() {
                return key;
            }

            let Some(hashed) = key.hash_key() else {
                return Value::error(format!("unusable as hash key: {}", key.type_name()));
            };

            let value = self.eval_expression(value_expr, env);

            if value.is_error() {
                return value;
            }

            // duplicate keys resolve last-writer
            evaluated.insert(hashed, HashPair { key, value });
        }

        Value::hash(evaluated)
    }

    fn eval_assign_expression(&mut self, left: &Expr, value_expr: &Expr, env: EnvId) -> Value {
        let value = self.eval_expression(value_expr, env);

        if value.is_error() {
            return value;
        }

        match left {
            Expr::Ident(ident) => {
                self.envs.set(env, ident.value.clone(), value);
                Value::Null
            }
            Expr::Index {
                left: target,
                index,
                ..
            } => {
                let target = self.eval_expression(target, env);

                if target.is_error() {
                    return target;
                }

                let index = self.eval_expression(index, env);

                if index.is_error() {
                    return index;
                }

                match target {
                    Value::Array(elements) => match index {
                        Value::Integer(i) => {
                            let mut elements = elements.borrow_mut();

                            if i < 0 || i >= elements.len() as i64 {
                                return Value::error(format!("index out of range: {}", i));
                            }

                            elements[i as usize] = value;

                            Value::Null
                        }
                        other => Value::error(format!(
                            "cannot index array with {}",
                            other.type_name()
                        )),
                    },
                    Value::Hash(pairs) => match index.hash_key() {
                        Some(hashed) => {
                            pairs
                                .borrow_mut()
                                .insert(hashed, HashPair { key: index, value });

                            Value::Null
                        }
                        None => Value::error(format!(
                            "unusable as hash key: {}",
                            index.type_name()
                        )),
                    },
                    other => Value::error(format!(
                        "object type {} does not support item assignment",
                        other.type_name()
                    )),
                }
            }
            _ => Value::error("expected identifier or index expression as assignment target"),
        }
    }

    /// Call a function or builtin value with already-evaluated arguments.
    ///
    /// A user function gets a fresh environment enclosed by its captured
    /// one, parameters bound positionally, the full argument list bound
    /// as `arguments`, and its body's `Return` unwrapped exactly once.
    /// Excess arguments are allowed; missing ones are an error.
    pub fn apply_function(&mut self, function: &Value, args: &[Value]) -> Value {
        match function {
            Value::Function(function) => {
                if args.len() < function.parameters.len() {
                    return Value::error(format!(
                        "number of arguments passed to function is lesser than expected. got={}, expected={}",
                        args.len(),
                        function.parameters.len()
                    ));
                }

                let call_env = self.envs.alloc_enclosed(function.env);

                for (param, arg) in function.parameters.iter().zip(args) {
                    self.envs.set(call_env, param.value.clone(), arg.clone());
                }

                self.envs
                    .set(call_env, "arguments", Value::array(args.to_vec()));

                let result = self
                    .eval_block(&function.body, call_env)
                    .unwrap_or(Value::Null);

                match result {
                    Value::Return(value) => *value,
                    other => other,
                }
            }
            Value::Builtin(builtin) => (builtin.func)(self, args),
            other => Value::error(format!("not a function: {}", other.type_name())),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_prefix_expression(op: PrefixOp, right: Value) -> Value {
    match op {
        PrefixOp::Bang => Value::Boolean(!right.is_truthy()),
        PrefixOp::Minus => match right {
            Value::Integer(n) => Value::Integer(n.wrapping_neg()),
            other => Value::error(format!("unknown operator: -{}", other.type_name())),
        },
    }
}

fn eval_infix_expression(op: InfixOp, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix_expression(op, *l, *r),
        (Value::String(l), Value::String(r)) => eval_string_infix_expression(op, l, r),
        _ => match op {
            // identity comparison; booleans and null compare by value
            InfixOp::Eq => Value::Boolean(left == right),
            InfixOp::NotEq => Value::Boolean(left != right),
            _ if left.type_name() != right.type_name() => Value::error(format!(
                "type mismatch: {} {} {}",
                left.type_name(),
                op,
                right.type_name()
            )),
            _ => Value::error(format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                op,
                right.type_name()
            )),
        },
    }
}

/// Integer arithmetic wraps (two's-complement, 64-bit signed)
fn eval_integer_infix_expression(op: InfixOp, left: i64, right: i64) -> Value {
    match op {
        InfixOp::Plus => Value::Integer(left.wrapping_add(right)),
        InfixOp::Minus => Value::Integer(left.wrapping_sub(right)),
        InfixOp::Asterisk => Value::Integer(left.wrapping_mul(right)),
        InfixOp::Slash => {
            if right == 0 {
                Value::error("division by zero")
            } else {
                Value::Integer(left.wrapping_div(right))
            }
        }
        InfixOp::Lt => Value::Boolean(left < right),
        InfixOp::Gt => Value::Boolean(left > right),
        InfixOp::Eq => Value::Boolean(left == right),
        InfixOp::NotEq => Value::Boolean(left != right),
    }
}

fn eval_string_infix_expression(op: InfixOp, left: &str, right: &str) -> Value {
    match op {
        InfixOp::Plus => Value::String(format!("{}{}", left, right)),
        InfixOp::Gt => Value::Boolean(left > right),
        InfixOp::Eq => Value::Boolean(left == right),
        _ => Value::error(format!("unknown operator: STRING {} STRING", op)),
    }
}

fn eval_index_expression(left: Value, index: Value) -> Value {
    match (&left, &index) {
        (Value::Array(elements), Value::Integer(i)) => {
            let elements = elements.borrow();

            // out of range reads yield null, not an error
            if *i < 0 || *i >= elements.len() as i64 {
                Value::Null
            } else {
                elements[*i as usize].clone()
            }
        }
        (Value::Hash(pairs), _) => match index.hash_key() {
            Some(hashed) => pairs
                .borrow()
                .get(&hashed)
                .map(|pair| pair.value.clone())
                .unwrap_or(Value::Null),
            None => Value::error(format!("unusable as hash key: {}", index.type_name())),
        },
        _ => Value::error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}
