use std::fs;
use std::path::PathBuf;

use vanara::{host, Interpreter, Value};

/// Write a module source file under a unique temp directory and return
/// its path
fn write_module(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vanara-test-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");

    let path = dir.join(format!("{}.vn", name));
    fs::write(&path, contents).expect("write module file");

    path
}

fn interpreter() -> Interpreter {
    let mut interp = Interpreter::new();
    host::install(&mut interp);
    interp
}

fn run(interp: &mut Interpreter, source: &str) -> Option<Value> {
    let env = interp.envs.alloc();
    interp.run(source, "test.vn", true, env)
}

#[test]
fn test_require_exports_uppercase_bindings() {
    let path = write_module(
        "math",
        r#"
            let Add = fn(a, b) { a + b };
            let Pi = 3;
            let hidden = 99;
        "#,
    );

    let mut interp = interpreter();
    let source = format!(
        r#"
            let math = require("{}");
            [math["Add"](2, math["Pi"]), math["hidden"]]
        "#,
        path.display()
    );

    let result = run(&mut interp, &source).expect("program produced no value");
    assert_eq!(result.inspect(), "[5, null]");
}

#[test]
fn test_module_sees_main_false() {
    let path = write_module("mainflag", "let WasMain = MAIN;");

    let mut interp = interpreter();
    let source = format!(
        r#"[require("{}")["WasMain"], MAIN]"#,
        path.display()
    );

    let result = run(&mut interp, &source).expect("program produced no value");
    assert_eq!(result.inspect(), "[false, true]");
}

#[test]
fn test_module_file_binding_is_module_path() {
    let path = write_module("filename", "let Where = FILE;");

    let mut interp = interpreter();
    let source = format!(r#"require("{}")["Where"]"#, path.display());

    let result = run(&mut interp, &source).expect("program produced no value");
    match result {
        Value::String(s) => assert_eq!(s, path.display().to_string()),
        _ => panic!("Expected string, got {:?}", result),
    }
}

#[test]
fn test_module_runtime_errors_are_wrapped() {
    let path = write_module("broken", "let Boom = missingIdentifier;");

    let mut interp = interpreter();
    let source = format!(r#"require("{}")"#, path.display());

    let result = run(&mut interp, &source).expect("program produced no value");
    match result {
        Value::Error(message) => {
            assert!(
                message.starts_with(&format!("error in required file ({}):", path.display())),
                "{}",
                message
            );
            assert!(
                message.contains("identifier not found: missingIdentifier"),
                "{}",
                message
            );
        }
        other => panic!("Expected error, got {:?}", other),
    }
}

#[test]
fn test_module_environment_is_fresh() {
    // bindings of the requiring file do not leak into the module
    let path = write_module("isolated", "let Sees = secret;");

    let mut interp = interpreter();
    let source = format!(
        r#"
            let secret = 1;
            require("{}")
        "#,
        path.display()
    );

    let result = run(&mut interp, &source).expect("program produced no value");
    match result {
        Value::Error(message) => {
            assert!(message.contains("identifier not found: secret"), "{}", message)
        }
        other => panic!("Expected error, got {:?}", other),
    }
}

#[test]
fn test_modules_can_require_modules() {
    let inner = write_module("inner", "let Value = 21;");
    let outer = write_module(
        "outer",
        &format!(
            r#"
                let inner = require("{}");
                let Doubled = inner["Value"] * 2;
            "#,
            inner.display()
        ),
    );

    let mut interp = interpreter();
    let source = format!(r#"require("{}")["Doubled"]"#, outer.display());

    assert_eq!(run(&mut interp, &source), Some(Value::Integer(42)));
}

#[test]
fn test_file_roundtrip_through_builtins() {
    let dir = std::env::temp_dir().join(format!("vanara-test-io-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("note.txt");

    let mut interp = interpreter();
    let source = format!(
        r#"
            file_write("{path}", "one\ntwo\n", 420);
            [file_read("{path}"), file_readlines("{path}")]
        "#,
        path = path.display()
    );

    let result = run(&mut interp, &source).expect("program produced no value");
    assert_eq!(result.inspect(), "[one\ntwo\n, [one, two]]");
}
