use vanara::run;
use vanara::value::Value;

#[test]
fn test_basic_closure() {
    let source = r#"
        let x = "global";
        let makeClosure = fn() {
            let y = "captured";
            fn() { x + " " + y }
        };
        let closure = makeClosure();
        closure()
    "#;

    let result = run(source).expect("program produced no value");
    match result {
        Value::String(s) => assert_eq!(s, "global captured"),
        _ => panic!("Expected string, got {:?}", result),
    }
}

#[test]
fn test_closure_captures_definition_environment() {
    // each make() call captures its own frame
    let source = r#"
        let make = fn(x) { fn(y) { x + y } };
        let addTwo = make(2);
        let addTen = make(10);
        [addTwo(1), addTen(1), addTwo(5)]
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[3, 11, 7]");
}

#[test]
fn test_recursive_function() {
    let source = r#"
        let fact = fn(n) { if (n < 2) { 1 } else { n * fact(n - 1) } };
        fact(10)
    "#;

    assert_eq!(run(source), Some(Value::Integer(3628800)));
}

#[test]
fn test_mutual_recursion_via_late_binding() {
    // isOdd is looked up when even() runs, not when it is defined
    let source = r#"
        let isEven = fn(n) { if (n == 0) { true } else { isOdd(n - 1) } };
        let isOdd = fn(n) { if (n == 0) { false } else { isEven(n - 1) } };
        isEven(8)
    "#;

    assert_eq!(run(source), Some(Value::Boolean(true)));
}

#[test]
fn test_higher_order_functions() {
    let source = r#"
        let twice = fn(f, x) { f(f(x)) };
        let addThree = fn(x) { x + 3 };
        twice(addThree, 10)
    "#;

    assert_eq!(run(source), Some(Value::Integer(16)));
}

#[test]
fn test_return_unwinds_single_function() {
    let source = r#"
        let f = fn() {
            if (true) {
                if (true) {
                    return "inner";
                }
            }
            "unreachable"
        };
        f() + "!"
    "#;

    let result = run(source).expect("program produced no value");
    match result {
        Value::String(s) => assert_eq!(s, "inner!"),
        _ => panic!("Expected string, got {:?}", result),
    }
}

#[test]
fn test_arguments_is_bound_per_call() {
    let source = r#"
        let count = fn() { len(arguments) };
        [count(), count(1), count(1, 2, 3)]
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[0, 1, 3]");
}

#[test]
fn test_self_referencing_binding() {
    // the function value sits in the environment it captures
    let source = r#"
        let loop = fn(n, acc) {
            if (n == 0) { acc } else { loop(n - 1, acc + n) }
        };
        loop(100, 0)
    "#;

    assert_eq!(run(source), Some(Value::Integer(5050)));
}
