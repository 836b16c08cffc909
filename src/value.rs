//! Runtime value types for Vanara

use std::cell::RefCell;
use std::fmt;
use std::hash::Hasher;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHasher};

use crate::ast::{Block, Identifier};
use crate::builtins::Builtin;
use crate::environment::EnvId;

/// Type names as the language reports them, used by `type` and in
/// runtime error messages
pub const INTEGER: &str = "INTEGER";
pub const BOOLEAN: &str = "BOOLEAN";
pub const STRING: &str = "STRING";
pub const NULL: &str = "NULL";
pub const ARRAY: &str = "ARRAY";
pub const HASH: &str = "HASH";
pub const FUNCTION: &str = "FUNCTION";
pub const BUILTIN: &str = "BUILTIN";
pub const RETURN_VALUE: &str = "RETURN_VALUE";
pub const ERROR: &str = "ERROR";

/// A user-defined function: parameters, body, and the environment the
/// literal was evaluated in. The environment is a plain arena handle, so
/// the function-to-environment back edge cannot form a refcount cycle.
#[derive(Debug)]
pub struct FunctionValue {
    pub parameters: Vec<Identifier>,
    pub body: Block,
    pub env: EnvId,
}

impl fmt::Display for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
        write!(f, "fn({}) {}", params.join(", "), self.body)
    }
}

/// A key/value pair in a hash, keeping the original key for inspection
#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

/// Derived hash-key for the three hashable kinds
///
/// Integer keys are the two's-complement bit pattern, booleans 0/1,
/// strings a stable 64-bit hash of their bytes. Equal strings produce
/// equal keys within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: &'static str,
    pub value: u64,
}

/// Runtime values in Vanara
///
/// `Return` and `Error` are internal control-flow carriers; they never
/// survive inside arrays, hashes or bindings, only as in-flight results.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Rc<RefCell<Vec<Value>>>),
    Hash(Rc<RefCell<FxHashMap<HashKey, HashPair>>>),
    Function(Rc<FunctionValue>),
    Builtin(Builtin),
    Return(Box<Value>),
    Error(String),
}

impl Value {
    /// Wrap a vector of elements in a fresh array value
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Wrap a pair map in a fresh hash value
    pub fn hash(pairs: FxHashMap<HashKey, HashPair>) -> Value {
        Value::Hash(Rc::new(RefCell::new(pairs)))
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(message.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => INTEGER,
            Value::Boolean(_) => BOOLEAN,
            Value::String(_) => STRING,
            Value::Null => NULL,
            Value::Array(_) => ARRAY,
            Value::Hash(_) => HASH,
            Value::Function(_) => FUNCTION,
            Value::Builtin(_) => BUILTIN,
            Value::Return(_) => RETURN_VALUE,
            Value::Error(_) => ERROR,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Exactly `null` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    /// Derive the hash key of a hashable value; `None` for every other kind
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(n) => Some(HashKey {
                kind: INTEGER,
                value: *n as u64,
            }),
            Value::Boolean(b) => Some(HashKey {
                kind: BOOLEAN,
                value: u64::from(*b),
            }),
            Value::String(s) => {
                let mut hasher = FxHasher::default();
                hasher.write(s.as_bytes());
                Some(HashKey {
                    kind: STRING,
                    value: hasher.finish(),
                })
            }
            _ => None,
        }
    }

    /// The observable rendering of a value
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::String(s) => s.clone(),
            Value::Null => "null".to_string(),
            Value::Array(elements) => {
                let elements: Vec<String> =
                    elements.borrow().iter().map(|e| e.inspect()).collect();
                format!("[{}]", elements.join(", "))
            }
            Value::Hash(pairs) => {
                // iteration order is unspecified
                let pairs: Vec<String> = pairs
                    .borrow()
                    .values()
                    .map(|pair| format!("{}: {}", pair.key.inspect(), pair.value.inspect()))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
            Value::Function(function) => function.to_string(),
            Value::Builtin(_) => "builtin function".to_string(),
            Value::Return(value) => value.inspect(),
            Value::Error(message) => format!("ERROR: {}", message),
        }
    }
}

/// Equality follows the language's identity semantics: integers, strings,
/// booleans and null compare by value; arrays, hashes and functions by
/// object identity; builtins by registered name.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}
