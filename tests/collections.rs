use vanara::run;
use vanara::value::Value;

#[test]
fn test_array_literals_evaluate_left_to_right() {
    let source = r#"
        let log = [];
        let note = fn(n) { array_push(log, n); n };
        let arr = [note(1), note(2), note(3)];
        [arr, log]
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[[1, 2, 3], [1, 2, 3]]");
}

#[test]
fn test_array_index_assignment_mutates_in_place() {
    let source = r#"
        let a = [1, 2, 3];
        a[1] = 42;
        a
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[1, 42, 3]");
}

#[test]
fn test_aliases_see_mutation() {
    let source = r#"
        let a = [1, 2, 3];
        let b = a;
        b[0] = 99;
        a[0]
    "#;

    assert_eq!(run(source), Some(Value::Integer(99)));
}

#[test]
fn test_array_copy_is_independent() {
    let source = r#"
        let a = [1, 2, 3];
        let b = array_copy(a);
        b[0] = 99;
        [a[0], b[0]]
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[1, 99]");
}

#[test]
fn test_out_of_bounds_reads_are_null() {
    let source = r#"
        let a = [1, 2, 3];
        [a[3], a[-1]]
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[null, null]");
}

#[test]
fn test_array_map() {
    let source = r#"
        let doubled = array_map([1, 2, 3], fn(x) { x * 2 });
        doubled
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[2, 4, 6]");
}

#[test]
fn test_array_map_passes_index() {
    let source = r#"
        array_map([10, 20, 30], fn(x, i) { x + i })
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[10, 21, 32]");
}

#[test]
fn test_array_each_collects_side_effects() {
    let source = r#"
        let sink = [];
        array_each([1, 2, 3], fn(x) { array_push(sink, x * x) });
        sink
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[1, 4, 9]");
}

#[test]
fn test_array_reduce() {
    let source = r#"
        array_reduce([1, 2, 3, 4], 0, fn(acc, x) { acc + x })
    "#;

    assert_eq!(run(source), Some(Value::Integer(10)));
}

#[test]
fn test_array_reduce_with_index() {
    // callback order is (acc, element, index)
    let source = r#"
        array_reduce(["a", "b"], "", fn(acc, x, i) { acc + x })
    "#;

    let result = run(source).expect("program produced no value");
    match result {
        Value::String(s) => assert_eq!(s, "ab"),
        _ => panic!("Expected string, got {:?}", result),
    }
}

#[test]
fn test_reduce_propagates_callback_errors() {
    let source = r#"
        array_reduce([1, 2], 0, fn(acc, x) { acc + missing })
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result, Value::Error("identifier not found: missing".to_string()));
}

#[test]
fn test_range_feeds_collection_pipeline() {
    let source = r#"
        let squares = array_map(range(1, 6), fn(n) { n * n });
        array_reduce(squares, 0, fn(acc, n) { acc + n })
    "#;

    // 1 + 4 + 9 + 16 + 25
    assert_eq!(run(source), Some(Value::Integer(55)));
}

#[test]
fn test_hash_with_mixed_keys() {
    let source = r#"
        let h = {"k": 1, true: 2, 3: "v"};
        h["k"] + h[true] + len(h[3])
    "#;

    assert_eq!(run(source), Some(Value::Integer(4)));
}

#[test]
fn test_hash_key_assignment_and_overwrite() {
    let source = r#"
        let h = {"hits": 0};
        h["hits"] = h["hits"] + 1;
        h["hits"] = h["hits"] + 1;
        h["misses"] = 5;
        [h["hits"], h["misses"]]
    "#;

    let result = run(source).expect("program produced no value");
    assert_eq!(result.inspect(), "[2, 5]");
}

#[test]
fn test_hash_absent_key_is_null() {
    assert_eq!(run(r#"{"a": 1}["b"]"#), Some(Value::Null));
}

#[test]
fn test_duplicate_literal_keys_last_writer() {
    assert_eq!(run(r#"{"a": 1, "a": 2}["a"]"#), Some(Value::Integer(2)));
}

#[test]
fn test_nested_structures() {
    let source = r#"
        let db = {"users": [{"name": "ada"}, {"name": "brin"}]};
        db["users"][1]["name"]
    "#;

    let result = run(source).expect("program produced no value");
    match result {
        Value::String(s) => assert_eq!(s, "brin"),
        _ => panic!("Expected string, got {:?}", result),
    }
}

#[test]
fn test_functions_are_array_and_hash_values() {
    let source = r#"
        let ops = {"double": fn(x) { x * 2 }, "inc": fn(x) { x + 1 }};
        let pipeline = [ops["double"], ops["inc"]];
        pipeline[1](pipeline[0](20))
    "#;

    assert_eq!(run(source), Some(Value::Integer(41)));
}
