//! Host integration builtins for Vanara
//!
//! The OS-bound builtin set: module import, file access and process
//! facilities. These register against the same registry as the core
//! builtins and follow the same contract — arity and type mismatches
//! become `Error` values, never host failures.

use std::fs;
use std::process;

use crate::evaluator::Interpreter;
use crate::value::Value;

/// Attach the host builtins to an interpreter. The CLI installs these;
/// embedders that want a sandboxed interpreter simply skip the call.
pub fn install(interp: &mut Interpreter) {
    interp.register_builtin("require", require);
    interp.register_builtin("file_read", file_read);
    interp.register_builtin("file_readlines", file_readlines);
    interp.register_builtin("file_write", file_write);
    interp.register_builtin("sys_exit", sys_exit);
    interp.register_builtin("sys_user", sys_user);
    interp.register_builtin("sys_user_home", sys_user_home);
}

fn expect_string_arg(name: &str, args: &[Value]) -> Result<String, Value> {
    if args.len() != 1 {
        return Err(Value::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        )));
    }

    match &args[0] {
        Value::String(s) => Ok(s.clone()),
        other => Err(Value::error(format!(
            "argument to `{}` must be STRING, got {}",
            name,
            other.type_name()
        ))),
    }
}

/// require(path) — run another source file in a fresh environment and
/// return a hash of its exported bindings (names starting with an ASCII
/// uppercase letter). The sub-run re-enters the full pipeline with
/// `MAIN` bound to false and `FILE` to the path.
fn require(interp: &mut Interpreter, args: &[Value]) -> Value {
    let path = match expect_string_arg("require", args) {
        Ok(path) => path,
        Err(error) => return error,
    };

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(error) => return Value::error(format!("failed to require file: {}", error)),
    };

    let module_env = interp.envs.alloc();
    let evaluated = interp.run(&source, &path, false, module_env);

    if let Some(value) = &evaluated {
        if value.is_error() {
            return Value::error(format!(
                "error in required file ({}):\n {}",
                path,
                value.inspect()
            ));
        }
    }

    interp.envs.exported_hash(module_env)
}

fn file_read(_interp: &mut Interpreter, args: &[Value]) -> Value {
    let path = match expect_string_arg("file_read", args) {
        Ok(path) => path,
        Err(error) => return error,
    };

    match fs::read_to_string(&path) {
        Ok(data) => Value::String(data),
        Err(error) => Value::error(error.to_string()),
    }
}

fn file_readlines(_interp: &mut Interpreter, args: &[Value]) -> Value {
    let path = match expect_string_arg("file_readlines", args) {
        Ok(path) => path,
        Err(error) => return error,
    };

    match fs::read_to_string(&path) {
        Ok(data) => Value::array(
            data.lines()
                .map(|line| Value::String(line.to_string()))
                .collect(),
        ),
        Err(error) => Value::error(error.to_string()),
    }
}

/// file_write(path, data, mode) — write `data` to `path`; `mode` is the
/// numeric permission set, applied on Unix hosts
fn file_write(_interp: &mut Interpreter, args: &[Value]) -> Value {
    if args.len() != 3 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=3",
            args.len()
        ));
    }

    let Value::String(path) = &args[0] else {
        return Value::error(format!(
            "first argument to `file_write` must be STRING, got {}",
            args[0].type_name()
        ));
    };

    let Value::String(data) = &args[1] else {
        return Value::error(format!(
            "second argument to `file_write` must be STRING, got {}",
            args[1].type_name()
        ));
    };

    let Value::Integer(mode) = &args[2] else {
        return Value::error(format!(
            "third argument to `file_write` must be INTEGER, got {}",
            args[2].type_name()
        ));
    };

    if let Err(error) = fs::write(path, data) {
        return Value::error(error.to_string());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let permissions = fs::Permissions::from_mode(*mode as u32);

        if let Err(error) = fs::set_permissions(path, permissions) {
            return Value::error(error.to_string());
        }
    }

    #[cfg(not(unix))]
    let _ = mode;

    Value::Null
}

fn sys_exit(_interp: &mut Interpreter, args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }

    match &args[0] {
        Value::Integer(code) => process::exit(*code as i32),
        other => Value::error(format!(
            "argument to `sys_exit` must be INTEGER, got {}",
            other.type_name()
        )),
    }
}

fn sys_user(_interp: &mut Interpreter, _args: &[Value]) -> Value {
    match std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
        Ok(user) => Value::String(user),
        Err(_) => Value::error("failed to get user"),
    }
}

fn sys_user_home(_interp: &mut Interpreter, _args: &[Value]) -> Value {
    match std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        Ok(home) => Value::String(home),
        Err(_) => Value::error("failed to get user home"),
    }
}
