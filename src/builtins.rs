//! Builtin registry and core builtins for Vanara
//!
//! Builtins are host functions resolved when an identifier misses the
//! environment chain; user bindings with the same name win. Every builtin
//! validates its own arity and argument types and reports mismatches as
//! `Error` values, never by failing the host.

use rustc_hash::FxHashMap;

use crate::evaluator::Interpreter;
use crate::value::Value;

/// Host function signature. The interpreter is passed in so builtins can
/// call back into evaluation (`array_map`) or re-enter `run` (`require`).
pub type BuiltinFn = fn(&mut Interpreter, &[Value]) -> Value;

/// A named host function
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn new(name: &'static str, func: BuiltinFn) -> Self {
        Self { name, func }
    }
}

/// Name-to-builtin mapping, initialized once per interpreter
#[derive(Debug, Default)]
pub struct Registry {
    builtins: FxHashMap<&'static str, Builtin>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The core builtin set every interpreter ships
    pub fn core() -> Self {
        let mut registry = Self::new();

        for builtin in core_builtins() {
            registry.builtins.insert(builtin.name, builtin);
        }

        registry
    }

    /// Attach a host-specific builtin; later registrations replace
    /// earlier ones of the same name
    pub fn register(&mut self, name: &'static str, func: BuiltinFn) {
        self.builtins.insert(name, Builtin::new(name, func));
    }

    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.builtins.get(name).copied()
    }
}

fn wrong_arg_count(got: usize, want: usize) -> Value {
    Value::error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

fn core_builtins() -> Vec<Builtin> {
    vec![
        // len(string | array)
        Builtin::new("len", |_interp, args| {
            if args.len() != 1 {
                return wrong_arg_count(args.len(), 1);
            }

            match &args[0] {
                Value::String(s) => Value::Integer(s.len() as i64),
                Value::Array(elements) => Value::Integer(elements.borrow().len() as i64),
                other => Value::error(format!(
                    "argument to `len` not supported, got {}",
                    other.type_name()
                )),
            }
        }),
        // type(val) -> type name string
        Builtin::new("type", |_interp, args| {
            if args.len() != 1 {
                return wrong_arg_count(args.len(), 1);
            }

            Value::String(args[0].type_name().to_string())
        }),
        // puts(vals...) -> null; one line per value
        Builtin::new("puts", |interp, args| {
            for arg in args {
                interp.write_line(&arg.inspect());
            }

            Value::Null
        }),
        // range(start, end[, step]) -> array of integers
        Builtin::new("range", |_interp, args| {
            if args.len() < 2 {
                return wrong_arg_count(args.len(), 2);
            }

            let Value::Integer(start) = &args[0] else {
                return Value::error(format!(
                    "first argument to `range` must be INTEGER, got {}",
                    args[0].type_name()
                ));
            };

            let Value::Integer(end) = &args[1] else {
                return Value::error(format!(
                    "second argument to `range` must be INTEGER, got {}",
                    args[1].type_name()
                ));
            };

            let step = if args.len() == 3 {
                match &args[2] {
                    Value::Integer(step) => *step,
                    _ => {
                        return Value::error(format!(
                            "third argument to `range` must be INTEGER, got {}",
                            args[2].type_name()
                        ))
                    }
                }
            } else {
                1
            };

            if step == 0 {
                return Value::error("step argument to `range` must not be zero");
            }

            let (start, end) = (*start, *end);
            let mut elements = Vec::new();
            let mut i = start;

            while (step > 0 && i < end) || (step < 0 && i > end) {
                elements.push(Value::Integer(i));
                i = i.wrapping_add(step);
            }

            Value::array(elements)
        }),
        // array_first(arr) -> first element or null
        Builtin::new("array_first", |_interp, args| {
            let elements = match expect_array_arg("array_first", args) {
                Ok(elements) => elements,
                Err(error) => return error,
            };

            elements.first().cloned().unwrap_or(Value::Null)
        }),
        // array_last(arr) -> last element or null
        Builtin::new("array_last", |_interp, args| {
            let elements = match expect_array_arg("array_last", args) {
                Ok(elements) => elements,
                Err(error) => return error,
            };

            elements.last().cloned().unwrap_or(Value::Null)
        }),
        // array_rest(arr) -> new array without the first element, null if empty
        Builtin::new("array_rest", |_interp, args| {
            let elements = match expect_array_arg("array_rest", args) {
                Ok(elements) => elements,
                Err(error) => return error,
            };

            if elements.is_empty() {
                Value::Null
            } else {
                Value::array(elements[1..].to_vec())
            }
        }),
        // array_copy(arr) -> shallow copy
        Builtin::new("array_copy", |_interp, args| {
            let elements = match expect_array_arg("array_copy", args) {
                Ok(elements) => elements,
                Err(error) => return error,
            };

            Value::array(elements)
        }),
        // array_push(arr, val) -> null; mutates arr in place
        Builtin::new("array_push", |_interp, args| {
            if args.len() != 2 {
                return wrong_arg_count(args.len(), 2);
            }

            let Value::Array(elements) = &args[0] else {
                return Value::error(format!(
                    "argument to `array_push` must be ARRAY, got {}",
                    args[0].type_name()
                ));
            };

            elements.borrow_mut().push(args[1].clone());

            Value::Null
        }),
        // array_map(arr, fn[, thisArr]) -> new array of fn(element, index[, thisArr])
        Builtin::new("array_map", |interp, args| {
            let (elements, callback, this) = match expect_iteration_args("array_map", args) {
                Ok(parts) => parts,
                Err(error) => return error,
            };

            let mut mapped = Vec::with_capacity(elements.len());

            for (i, element) in elements.iter().enumerate() {
                let result = apply_callback(interp, &callback, element, i, this.as_ref());

                if result.is_error() {
                    return result;
                }

                mapped.push(result);
            }

            Value::array(mapped)
        }),
        // array_each(arr, fn[, thisArr]) -> null; callback results are discarded
        Builtin::new("array_each", |interp, args| {
            let (elements, callback, this) = match expect_iteration_args("array_each", args) {
                Ok(parts) => parts,
                Err(error) => return error,
            };

            for (i, element) in elements.iter().enumerate() {
                apply_callback(interp, &callback, element, i, this.as_ref());
            }

            Value::Null
        }),
        // array_reduce(arr, init, fn[, thisArr]) -> folded value;
        // the callback receives (acc, element, index[, thisArr])
        Builtin::new("array_reduce", |interp, args| {
            if args.len() < 3 {
                return Value::error(format!(
                    "wrong number of arguments. got={}, expected at least=3",
                    args.len()
                ));
            }

            if args.len() > 4 {
                return Value::error(format!(
                    "wrong number of arguments. got={}, expected max=4",
                    args.len()
                ));
            }

            let Value::Array(elements) = &args[0] else {
                return Value::error(format!(
                    "first argument to `array_reduce` must be ARRAY, got {}",
                    args[0].type_name()
                ));
            };

            if !is_callable(&args[2]) {
                return Value::error(format!(
                    "third argument to `array_reduce` must be FUNCTION, got {}",
                    args[2].type_name()
                ));
            }

            let this = if args.len() == 4 {
                if !matches!(args[3], Value::Array(_)) {
                    return Value::error(format!(
                        "fourth argument to `array_reduce` must be ARRAY, got {}",
                        args[3].type_name()
                    ));
                }

                Some(args[0].clone())
            } else {
                None
            };

            let elements = elements.borrow().clone();
            let callback = args[2].clone();
            let mut acc = args[1].clone();

            for (i, element) in elements.iter().enumerate() {
                let mut callback_args =
                    vec![acc, element.clone(), Value::Integer(i as i64)];

                if let Some(this) = &this {
                    callback_args.push(this.clone());
                }

                acc = interp.apply_function(&callback, &callback_args);

                if acc.is_error() {
                    return acc;
                }
            }

            acc
        }),
    ]
}

fn is_callable(value: &Value) -> bool {
    matches!(value, Value::Function(_) | Value::Builtin(_))
}

/// Validate the single-array-argument builtins and hand back a snapshot
/// of the elements
fn expect_array_arg(name: &str, args: &[Value]) -> Result<Vec<Value>, Value> {
    if args.len() != 1 {
        return Err(wrong_arg_count(args.len(), 1));
    }

    match &args[0] {
        Value::Array(elements) => Ok(elements.borrow().clone()),
        other => Err(Value::error(format!(
            "argument to `{}` must be ARRAY, got {}",
            name,
            other.type_name()
        ))),
    }
}

/// Validate `(arr, fn[, thisArr])` argument lists shared by
/// `array_map` and `array_each`
fn expect_iteration_args(
    name: &str,
    args: &[Value],
) -> Result<(Vec<Value>, Value, Option<Value>), Value> {
    if args.len() < 2 {
        return Err(Value::error(format!(
            "wrong number of arguments. got={}, expected at least=2",
            args.len()
        )));
    }

    if args.len() > 3 {
        return Err(Value::error(format!(
            "wrong number of arguments. got={}, expected max=3",
            args.len()
        )));
    }

    let Value::Array(elements) = &args[0] else {
        return Err(Value::error(format!(
            "first argument to `{}` must be ARRAY, got {}",
            name,
            args[0].type_name()
        )));
    };

    if !is_callable(&args[1]) {
        return Err(Value::error(format!(
            "second argument to `{}` must be FUNCTION, got {}",
            name,
            args[1].type_name()
        )));
    }

    let this = if args.len() == 3 {
        if !matches!(args[2], Value::Array(_)) {
            return Err(Value::error(format!(
                "third argument to `{}` must be ARRAY, got {}",
                name,
                args[2].type_name()
            )));
        }

        Some(args[0].clone())
    } else {
        None
    };

    Ok((elements.borrow().clone(), args[1].clone(), this))
}

fn apply_callback(
    interp: &mut Interpreter,
    callback: &Value,
    element: &Value,
    index: usize,
    this: Option<&Value>,
) -> Value {
    let mut args = vec![element.clone(), Value::Integer(index as i64)];

    if let Some(this) = this {
        args.push(this.clone());
    }

    interp.apply_function(callback, &args)
}
