//! Vanara - a small, dynamically-typed, expression-oriented scripting
//! language in the Monkey tradition
//!
//! Source flows through a hand-written lexer, a Pratt parser and a
//! tree-walking evaluator. Functions are first-class closures, data lives
//! in arrays and hashes, and runtime failures are first-class error
//! values that short-circuit evaluation.

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

pub use evaluator::Interpreter;
pub use lexer::Lexer;
pub use parser::Parser;
pub use value::Value;

/// Version of the Vanara language
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenience function to run Vanara code in a fresh interpreter.
///
/// Returns `None` when the program has parser errors (reported to
/// stdout) or produces no value; runtime failures come back as
/// `Some(Value::Error)`.
pub fn run(source: &str) -> Option<Value> {
    let mut interp = Interpreter::new();
    let env = interp.envs.alloc();

    interp.run(source, "__main__", true, env)
}
