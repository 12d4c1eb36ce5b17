//! Integration tests for the Ghost interpreter.
//!
//! These exercise the full pipeline (lex → parse → evaluate) on source
//! strings, checking results and exact runtime error messages.

use bigdecimal::BigDecimal;
use std::rc::Rc;

use ghostc::eval::{Environment, Evaluator, Value};
use ghostc::intern::StringInterner;

/// Evaluate source and return the result with the interner used.
fn eval_with(
    configure: impl FnOnce(&Evaluator),
    source: &str,
) -> (Value, Rc<StringInterner>) {
    let interner = Rc::new(StringInterner::new());
    let evaluator = Evaluator::new(Rc::clone(&interner));
    configure(&evaluator);
    let env = Environment::new();
    let value = evaluator
        .eval_source(source, &env)
        .unwrap_or_else(|diags| panic!("parse failed for {:?}: {:?}", source, diags));
    (value, interner)
}

fn eval(source: &str) -> Value {
    eval_with(|_| {}, source).0
}

fn assert_number(source: &str, expected: i64) {
    match eval(source) {
        Value::Number(n) => assert_eq!(
            n,
            BigDecimal::from(expected),
            "wrong value for {:?}",
            source
        ),
        other => panic!("expected NUMBER for {:?}, got {:?}", source, other),
    }
}

fn assert_boolean(source: &str, expected: bool) {
    match eval(source) {
        Value::Boolean(b) => assert_eq!(b, expected, "wrong value for {:?}", source),
        other => panic!("expected BOOLEAN for {:?}, got {:?}", source, other),
    }
}

fn assert_null(source: &str) {
    match eval(source) {
        Value::Null => {}
        other => panic!("expected NULL for {:?}, got {:?}", source, other),
    }
}

fn assert_string(source: &str, expected: &str) {
    match eval(source) {
        Value::Str(s) => assert_eq!(s.as_str(), expected, "wrong value for {:?}", source),
        other => panic!("expected STRING for {:?}, got {:?}", source, other),
    }
}

fn assert_error(source: &str, expected: &str) {
    match eval(source) {
        Value::Error(message) => {
            assert_eq!(message.as_str(), expected, "wrong message for {:?}", source)
        }
        other => panic!("expected ERROR for {:?}, got {:?}", source, other),
    }
}

fn inspect(source: &str) -> String {
    let (value, interner) = eval_with(|_| {}, source);
    value.inspect(&interner)
}

// =============================================================================
// Number expressions
// =============================================================================

mod arithmetic {
    use super::*;

    #[test]
    fn test_number_expressions() {
        let tests: &[(&str, i64)] = &[
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
        ];
        for (input, expected) in tests {
            assert_number(input, *expected);
        }
    }

    #[test]
    fn test_increment_and_compound_assignment() {
        let tests: &[(&str, i64)] = &[
            ("index := 0; index++; index", 1),
            ("index := 6; index--; index", 5),
            ("index := 0; index += 10; index", 10),
            ("index := 12; index -= 2; index", 10),
            ("index := 2; index *= 5; index", 10),
            ("index := 100; index /= 10; index", 10),
        ];
        for (input, expected) in tests {
            assert_number(input, *expected);
        }
    }

    #[test]
    fn test_decimal_arithmetic() {
        assert_eq!(inspect("0.1 + 0.2"), "0.3");
        assert_eq!(inspect("1 / 4"), "0.25");
        assert_eq!(inspect("2.50 * 2"), "5");
        assert_boolean("0.1 + 0.2 == 0.3", true);
    }

    #[test]
    fn test_double_negation() {
        assert_number("--5", 5);
        assert_number("--0", 0);
        assert_number("--123", 123);
    }

    #[test]
    fn test_division_by_zero() {
        assert_error("1 / 0", "[1] division by zero");
        assert_error("1 % 0", "[1] modulo by zero");
    }
}

// =============================================================================
// Booleans, logic, truthiness
// =============================================================================

mod booleans {
    use super::*;

    #[test]
    fn test_boolean_expressions() {
        let tests: &[(&str, bool)] = &[
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 < 1", false),
            ("1 > 1", false),
            ("1 <= 1", true),
            ("1 >= 2", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("1 != 2", true),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("false != true", true),
            ("(1 < 2) == true", true),
            ("(1 < 2) == false", false),
            ("(1 > 2) == true", false),
            ("(1 > 2) == false", true),
        ];
        for (input, expected) in tests {
            assert_boolean(input, *expected);
        }
    }

    #[test]
    fn test_logical_operators() {
        assert_boolean("true and true", true);
        assert_boolean("true and false", false);
        assert_boolean("true or false", true);
        assert_boolean("false or true", true);
    }

    #[test]
    fn test_logical_operators_return_last_operand() {
        assert_number("5 and 3", 3);
        assert_number("false or 7", 7);
        assert_null("null and 1");
        assert_number("2 or 9", 2);
    }

    #[test]
    fn test_short_circuit_skips_right_operand() {
        // The right operand would be an unbound identifier error if touched.
        assert_boolean("false and missing", false);
        assert_boolean("true or missing", true);
        assert_number("x := 0; false and (x := 99); x", 0);
    }

    #[test]
    fn test_bang_operator() {
        let tests: &[(&str, bool)] = &[
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!!true", true),
            ("!!false", false),
            ("!!5", true),
            ("!null", true),
            ("!!null", false),
            ("!\"\"", false),
        ];
        for (input, expected) in tests {
            assert_boolean(input, *expected);
        }
    }

    #[test]
    fn test_cross_type_equality_is_false() {
        assert_boolean("5 == \"5\"", false);
        assert_boolean("5 != \"5\"", true);
        assert_boolean("true == 1", false);
        assert_boolean("null == false", false);
    }
}

// =============================================================================
// Conditionals and returns
// =============================================================================

mod control_flow {
    use super::*;

    #[test]
    fn test_if_else_expressions() {
        assert_number("if (true) { 10 }", 10);
        assert_null("if (false) { 10 }");
        assert_number("if (1) { 10 }", 10);
        assert_number("if (1 < 2) { 10 }", 10);
        assert_null("if (1 > 2) { 10 }");
        assert_number("if (1 > 2) { 10 } else { 20 }", 20);
        assert_number("if (1 < 2) { 10 } else { 20 }", 10);
        assert_number("if (1 < 2) { 10 } else if (1 == 1) { 20 } else { 30 }", 10);
        assert_number("if (1 > 2) { 10 } else if (1 == 1) { 20 } else { 30 }", 20);
        assert_number("if (1 > 2) { 10 } else if (1 == 2) { 20 } else { 30 }", 30);
    }

    #[test]
    fn test_return_statements() {
        let tests: &[(&str, i64)] = &[
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            ("if (10 > 1) { if (10 > 1) { return 10; } return 1; }", 10),
        ];
        for (input, expected) in tests {
            assert_number(input, *expected);
        }
    }

    #[test]
    fn test_bare_return() {
        assert_null("return;");
        assert_null("return; 9;");
    }

    #[test]
    fn test_return_exits_enclosing_function_not_block() {
        assert_number(
            "f := function() { while (true) { return 3 } return 4 }; f()",
            3,
        );
        assert_number(
            "f := function() { for (x in 1 .. 10) { return x } }; f()",
            1,
        );
    }

    #[test]
    fn test_while_expressions() {
        assert_null("while (false) { }");
        assert_number("n := 0; while (n < 10) { n = n + 1 }; n", 10);
        assert_number("n := 10; while (n > 0) { n = n - 1 }; n", 0);
        assert_null("n := 0; while (n < 10) { n = n + 1 }");
        assert_null("n := 10; while (n > 0) { n = n - 1 }");
    }

    #[test]
    fn test_for_expressions() {
        // The loop header and body scope to the loop; outer bindings of the
        // same name survive untouched.
        assert_number("x := 1; for (x := 0; x < 10; x := x + 1) { x }; x;", 1);
        assert_null("for (i := 0; i < 10; i := i + 1) { i };");
        assert_number("y := []; for (x in 1 .. 10) { push(y, x) }; length(y)", 10);
        assert_number("y := []; x := 100 for (x in 1 .. 10) { x := x + 1 }; x", 100);
    }

    #[test]
    fn test_for_in_over_list_literal() {
        assert_number(
            "total := 0; for (n in [1, 2, 3]) { total = total + n }; total",
            6,
        );
    }

    #[test]
    fn test_for_in_requires_list() {
        assert_error(
            "for (x in 5) { x }",
            "[1] argument to `for..in` must be LIST, got NUMBER",
        );
    }
}

// =============================================================================
// Assignment and scoping
// =============================================================================

mod assignment {
    use super::*;

    #[test]
    fn test_declarations() {
        assert_number("x := 10; x", 10);
        assert_number("x := 10; x := 20; x", 20);
        assert_number("a := 5; a;", 5);
        assert_number("a := 5 * 5; a;", 25);
        assert_number("a := 5; b := a; b;", 5);
        assert_number("a := 5; b := a; c := a + b + 5; c;", 15);
    }

    #[test]
    fn test_reassignment() {
        assert_number("a := 5; a = 10; a;", 10);
        assert_error("a = 10", "[1] Identifier not found: a");
        assert_error("b += 1", "[1] Identifier not found: b");
    }

    #[test]
    fn test_reassignment_walks_outer_chain() {
        assert_number(
            "n := 0; f := function() { n = 5 }; f(); n",
            5,
        );
    }

    #[test]
    fn test_assignment_evaluates_to_value() {
        assert_number("x := (y := 4) + 1; x", 5);
    }

    #[test]
    fn test_string_compound_append() {
        assert_string("s := \"foo\"; s += \"bar\"; s", "foobar");
    }

    #[test]
    fn test_increment_requires_number() {
        assert_error("s := \"x\"; s++", "[1] Unknown operator: STRING++");
        assert_error("q++", "[1] Identifier not found: q");
    }
}

// =============================================================================
// Strings
// =============================================================================

mod strings {
    use super::*;

    #[test]
    fn test_string_literal() {
        assert_string("\"Hello World!\"", "Hello World!");
    }

    #[test]
    fn test_string_concatenation() {
        assert_string("\"Hello\" + \" \" + \"World!\"", "Hello World!");
    }

    #[test]
    fn test_string_equality() {
        assert_boolean("\"a\" == \"a\"", true);
        assert_boolean("\"a\" != \"b\"", true);
    }

    #[test]
    fn test_string_subtraction_is_unknown_operator() {
        assert_error("\"Hello\" - \"World\"", "[1] Unknown operator: STRING - STRING");
    }
}

// =============================================================================
// Ranges
// =============================================================================

mod ranges {
    use super::*;

    #[test]
    fn test_ascending_ranges() {
        assert_eq!(inspect("-1 .. 0"), "[-1, 0]");
        assert_eq!(inspect("1 .. 1"), "[1]");
        assert_eq!(inspect("1 .. 5"), "[1, 2, 3, 4, 5]");
    }

    #[test]
    fn test_descending_range_is_empty() {
        assert_eq!(inspect("1 .. 0"), "[]");
        assert_number("length(5 .. 1)", 0);
    }

    #[test]
    fn test_range_requires_numbers() {
        assert_error("\"a\" .. \"b\"", "[1] Unknown operator: STRING .. STRING");
        assert_error("1 .. true", "[1] Type mismatch: NUMBER .. BOOLEAN");
    }
}

// =============================================================================
// Lists
// =============================================================================

mod lists {
    use super::*;

    #[test]
    fn test_list_literals() {
        assert_eq!(inspect("[1, 2 * 2, 3 + 3]"), "[1, 4, 6]");
    }

    #[test]
    fn test_list_index_expressions() {
        let tests: &[(&str, Option<i64>)] = &[
            ("[1, 2, 3][0]", Some(1)),
            ("[1, 2, 3][1]", Some(2)),
            ("[1, 2, 3][2]", Some(3)),
            ("i := 0; [1][i];", Some(1)),
            ("[1, 2, 3][1 + 1]", Some(3)),
            ("myList := [1, 2, 3]; myList[2];", Some(3)),
            ("myList := [1, 2, 3]; myList[0] + myList[1] + myList[2];", Some(6)),
            ("myList := [1, 2, 3]; i := myList[0]; myList[i]", Some(2)),
            ("[1, 2, 3][3]", None),
            ("[1, 2, 3][-1]", None),
        ];
        for (input, expected) in tests {
            match expected {
                Some(n) => assert_number(input, *n),
                None => assert_null(input),
            }
        }
    }

    #[test]
    fn test_list_index_assignment() {
        assert_number("myList := []; myList[0] := 5; myList[0]", 5);
        assert_number("xs := [1, 2, 3]; xs[1] := 9; xs[1]", 9);
        assert_eq!(inspect("xs := [1, 2]; xs[2] := 3; xs"), "[1, 2, 3]");
    }

    #[test]
    fn test_implicit_container_creation() {
        assert_number("grid := []; grid[0] := []; grid[0][0] := 10; grid[0][0]", 10);
        assert_number("fresh[0] := 7; fresh[0]", 7);
        assert_number("table[\"a\"] := 3; table[\"a\"]", 3);
    }

    #[test]
    fn test_list_assignment_gap_is_error() {
        assert_error("xs := []; xs[2] := 1", "[1] index out of range");
        assert_error("xs := [1]; xs[-1] := 0", "[1] index out of range");
    }

    #[test]
    fn test_lists_alias() {
        assert_number("a := [1]; b := a; push(b, 2); length(a)", 2);
        assert_number("a := [1, 2]; b := a; b[0] := 9; a[0]", 9);
    }

    #[test]
    fn test_list_equality_is_identity() {
        assert_boolean("a := [1]; b := a; a == b", true);
        assert_boolean("[1] == [1]", false);
    }
}

// =============================================================================
// Maps
// =============================================================================

mod maps {
    use super::*;

    #[test]
    fn test_map_literals() {
        let source = r#"two := "two";
        {
            "one": 10 - 9,
            two: 1 + 1,
            "thr" + "ee": 6 / 2,
            4: 4,
            true: 5,
            false: 6
        }"#;
        let (value, interner) = super::eval_with(|_| {}, source);
        assert_eq!(
            value.inspect(&interner),
            "{one: 1, two: 2, three: 3, 4: 4, true: 5, false: 6}"
        );
    }

    #[test]
    fn test_map_index_expressions() {
        let tests: &[(&str, Option<i64>)] = &[
            (r#"{"foo": 5}["foo"]"#, Some(5)),
            (r#"{"foo": 5}["bar"]"#, None),
            (r#"key := "foo"; {"foo": 5}[key]"#, Some(5)),
            (r#"{}["foo"]"#, None),
            ("{5: 5}[5]", Some(5)),
            ("{true: 5}[true]", Some(5)),
            ("{false: 5}[false]", Some(5)),
        ];
        for (input, expected) in tests {
            match expected {
                Some(n) => assert_number(input, *n),
                None => assert_null(input),
            }
        }
    }

    #[test]
    fn test_map_keys_are_decimal_exact() {
        assert_number("{4: 1}[4.0]", 1);
        assert_number("m := {}; m[2.50] := 9; m[2.5]", 9);
    }

    #[test]
    fn test_map_dot_notation() {
        assert_number(r#"{"foo": 5}.foo"#, 5);
        assert_null(r#"{"foo": 5}.bar"#);
        assert_null("{}.foo");
    }

    #[test]
    fn test_map_update_keeps_insertion_order() {
        assert_eq!(
            inspect(r#"m := {"a": 1, "b": 2}; m["a"] = 9; m"#),
            "{a: 9, b: 2}"
        );
    }

    #[test]
    fn test_map_index_assignment() {
        assert_number(r#"m := {}; m["k"] := 1; m["k"] = 2; m["k"]"#, 2);
        assert_number(r#"m := {"n": 1}; m["n"] += 4; m["n"]"#, 5);
    }

    #[test]
    fn test_unusable_map_keys() {
        assert_error(
            r#"{"name": "Ghost"}[function(x) { x }]"#,
            "[1] Unusable as map key: FUNCTION",
        );
        assert_error("{[1]: 2}", "[1] Unusable as map key: LIST");
        assert_error("m := {}; m[null] := 1", "[1] Unusable as map key: NULL");
    }

    #[test]
    fn test_maps_alias() {
        assert_number(r#"a := {"k": 1}; b := a; b["k"] = 2; a["k"]"#, 2);
    }
}

// =============================================================================
// Functions and closures
// =============================================================================

mod functions {
    use super::*;
    use bigdecimal::BigDecimal;

    #[test]
    fn test_named_function_statements() {
        assert_number("function five() { return 5 } five()", 5);
        assert_number("function ten() { return 10 } ten()", 10);
        assert_number("function fifteen() { return 15 } fifteen()", 15);
    }

    #[test]
    fn test_function_object() {
        let (value, interner) = super::eval_with(|_| {}, "function(x) { x + 2; };");
        match value {
            Value::Function(function) => {
                assert_eq!(function.literal.params.len(), 1);
                assert_eq!(interner.lookup(function.literal.params[0]), "x");
                assert_eq!(function.literal.body.to_code(&interner), "(x + 2)");
            }
            other => panic!("expected FUNCTION, got {:?}", other),
        }
    }

    #[test]
    fn test_function_application() {
        let tests: &[(&str, i64)] = &[
            ("identity := function(x) { x; }; identity(5);", 5),
            ("identity := function(x) { return x; }; identity(5);", 5),
            ("double := function(x) { x * 2; }; double(5);", 10),
            ("add := function(x, y) { x + y; }; add(5, 5);", 10),
            ("add := function(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
            ("function(x) { x; }(5)", 5),
        ];
        for (input, expected) in tests {
            assert_number(input, *expected);
        }
    }

    #[test]
    fn test_closures_capture_defining_environment() {
        assert_number(
            "makeAdder := function(x) { function(y) { x + y } };
             add5 := makeAdder(5);
             add5(3)",
            8,
        );
        assert_number(
            "makeAdder := function(x) { function(y) { x + y } };
             add5 := makeAdder(5);
             add5(3) + add5(4)",
            17,
        );
    }

    #[test]
    fn test_recursion() {
        assert_number(
            "function fact(n) { if (n < 2) { return 1 } return n * fact(n - 1) } fact(5)",
            120,
        );
    }

    #[test]
    fn test_call_frame_outer_is_closure_not_caller() {
        // The callee must not see the caller's locals.
        assert_error(
            "f := function() { hidden }; g := function() { hidden := 1; f() }; g()",
            "[1] Identifier not found: hidden",
        );
    }

    #[test]
    fn test_arity_mismatch() {
        assert_error(
            "add := function(x, y) { x + y }; add(1)",
            "[1] wrong number of arguments. got=1, expected=2",
        );
        assert_error(
            "id := function(x) { x }; id(1, 2)",
            "[1] wrong number of arguments. got=2, expected=1",
        );
    }

    #[test]
    fn test_function_parameters_shadow_outer_bindings() {
        assert_number("x := 1; f := function(x) { x * 10 }; f(5) + x", 51);
    }

    #[test]
    fn test_higher_order_functions() {
        let source = "apply := function(f, v) { f(v) };
                      double := function(n) { n * 2 };
                      apply(double, 21)";
        match eval(source) {
            Value::Number(n) => assert_eq!(n, BigDecimal::from(42)),
            other => panic!("expected NUMBER, got {:?}", other),
        }
    }
}

// =============================================================================
// Built-in functions
// =============================================================================

mod builtins {
    use super::*;

    #[test]
    fn test_length() {
        assert_number("length(\"\")", 0);
        assert_number("length(\"four\")", 4);
        assert_number("length(\"hello world\")", 11);
        assert_number("length([1, 2, 3])", 3);
        assert_number("length({\"a\": 1})", 1);
        assert_error("length(1)", "argument to `length` not supported, got NUMBER");
        assert_error(
            "length(\"one\", \"two\")",
            "wrong number of arguments. got=2, expected=1",
        );
    }

    #[test]
    fn test_push_mutates_in_place() {
        assert_number("y := []; push(y, 1); push(y, 2); length(y)", 2);
        assert_error("push(1, 2)", "argument to `push` must be LIST, got NUMBER");
    }

    #[test]
    fn test_list_accessors() {
        assert_number("first([1, 2, 3])", 1);
        assert_number("last([1, 2, 3])", 3);
        assert_null("first([])");
        assert_null("last([])");
        assert_eq!(inspect("rest([1, 2, 3])"), "[2, 3]");
        assert_null("rest([])");
        assert_number("xs := [1, 2]; pop(xs) + length(xs)", 3);
        assert_null("pop([])");
    }

    #[test]
    fn test_rest_copies() {
        assert_number("xs := [1, 2, 3]; rest(xs); length(xs)", 3);
    }

    #[test]
    fn test_keys_and_values() {
        assert_eq!(inspect("keys({\"a\": 1, 2: 3})"), "[a, 2]");
        assert_eq!(inspect("values({\"a\": 1, 2: 3})"), "[1, 3]");
        assert_error("keys([1])", "argument to `keys` must be MAP, got LIST");
    }

    #[test]
    fn test_type() {
        assert_string("type(1)", "NUMBER");
        assert_string("type(\"s\")", "STRING");
        assert_string("type(true)", "BOOLEAN");
        assert_string("type(null)", "NULL");
        assert_string("type([])", "LIST");
        assert_string("type({})", "MAP");
        assert_string("type(function() {})", "FUNCTION");
        assert_string("type(length)", "BUILTIN");
        assert_string("type(Math)", "MODULE");
    }

    #[test]
    fn test_builtins_are_shadowable() {
        assert_number("length := 3; length", 3);
    }

    #[test]
    fn test_math_module() {
        assert_number("Math.abs(123)", 123);
        assert_number("Math.abs(-123)", 123);
        assert_number("Math.ceil(1.2)", 2);
        assert_number("Math.floor(1.8)", 1);
        assert_number("Math.round(2.5)", 3);
        assert_number("Math.sqrt(49)", 7);
        assert_number("Math.min(3, 9)", 3);
        assert_number("Math.max(3, 9)", 9);
        assert_error(
            "Math.abs(\"foo\")",
            "argument to `Math.abs` must be NUMBER, got STRING",
        );
        assert_error("Math.abs()", "wrong number of arguments. got=0, expected=1");
        assert_null("Math.missing");
    }

    #[test]
    fn test_calling_a_non_function() {
        assert_error("5(1)", "[1] not a function: NUMBER");
        assert_error("\"f\"()", "[1] not a function: STRING");
        assert_error("Math()", "[1] not a function: MODULE");
    }
}

// =============================================================================
// Error handling
// =============================================================================

mod errors {
    use super::*;

    #[test]
    fn test_error_messages() {
        let tests: &[(&str, &str)] = &[
            ("5 + true;", "[1] Type mismatch: NUMBER + BOOLEAN"),
            ("5 + true; 5;", "[1] Type mismatch: NUMBER + BOOLEAN"),
            ("-true", "[1] Unknown operator: -BOOLEAN"),
            ("true + false;", "[1] Unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "[1] Unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "[1] Unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "[1] Unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "[1] Identifier not found: foobar"),
            (
                r#"{"name": "Ghost"}[function(x) { x }]"#,
                "[1] Unusable as map key: FUNCTION",
            ),
        ];
        for (input, expected) in tests {
            assert_error(input, expected);
        }
    }

    #[test]
    fn test_error_line_numbers() {
        assert_error("1 + 1\n5 + true", "[2] Type mismatch: NUMBER + BOOLEAN");
        assert_error("x := 1\n\n\nmissing", "[4] Identifier not found: missing");
    }

    #[test]
    fn test_errors_stop_evaluation() {
        // The declaration after the failing expression never runs.
        assert_error(
            "x := 0; (missing) + (x = 99); x",
            "[1] Identifier not found: missing",
        );
    }

    #[test]
    fn test_errors_propagate_through_operands() {
        assert_error("(5 + true) * 2", "[1] Type mismatch: NUMBER + BOOLEAN");
        assert_error("[1, missing, 3]", "[1] Identifier not found: missing");
        assert_error("length(missing)", "[1] Identifier not found: missing");
        assert_error(
            "f := function() { missing }; [f()]",
            "[1] Identifier not found: missing",
        );
    }

    #[test]
    fn test_return_does_not_wrap_errors() {
        assert_error(
            "f := function() { return missing }; f(); 5",
            "[1] Identifier not found: missing",
        );
    }

    #[test]
    fn test_index_operator_not_supported() {
        assert_error("5[0]", "[1] Index operator not supported: NUMBER");
        assert_error("true.name", "[1] Index operator not supported: BOOLEAN");
        assert_error("[1, 2][true]", "[1] Index operator not supported: LIST");
    }
}

// =============================================================================
// Modules and import
// =============================================================================

mod modules {
    use super::*;

    #[test]
    fn test_import_direct_path() {
        let (value, _) = eval_with(|_| {}, r#"m := import("tests/scripts/module"); m.A"#);
        match value {
            Value::Number(n) => assert_eq!(n, BigDecimal::from(5)),
            other => panic!("expected NUMBER, got {:?}", other),
        }
    }

    #[test]
    fn test_import_search_paths() {
        let (value, _) = eval_with(
            |evaluator| evaluator.add_search_path("tests/scripts"),
            r#"m := import("module"); m.A"#,
        );
        match value {
            Value::Number(n) => assert_eq!(n, BigDecimal::from(5)),
            other => panic!("expected NUMBER, got {:?}", other),
        }
    }

    #[test]
    fn test_module_members() {
        let (value, interner) = eval_with(
            |_| {},
            r#"m := import("tests/scripts/module"); m.Greeting"#,
        );
        assert_eq!(value.inspect(&interner), "Hello from module");

        let (value, _) = eval_with(
            |_| {},
            r#"m := import("tests/scripts/module"); m.Sum(2, 3)"#,
        );
        match value {
            Value::Number(n) => assert_eq!(n, BigDecimal::from(5)),
            other => panic!("expected NUMBER, got {:?}", other),
        }
    }

    #[test]
    fn test_module_missing_member_is_null() {
        let (value, _) = eval_with(|_| {}, r#"m := import("tests/scripts/module"); m.nope"#);
        assert!(matches!(value, Value::Null), "got {:?}", value);
    }

    #[test]
    fn test_repeat_imports_are_cached() {
        let (value, _) = eval_with(
            |_| {},
            r#"a := import("tests/scripts/module");
               b := import("tests/scripts/module");
               a == b"#,
        );
        assert!(matches!(value, Value::Boolean(true)), "got {:?}", value);
    }

    #[test]
    fn test_import_not_found() {
        let (value, _) = eval_with(|_| {}, r#"import("no/such/module")"#);
        match value {
            Value::Error(message) => {
                assert_eq!(message.as_str(), "[1] Module not found: no/such/module")
            }
            other => panic!("expected ERROR, got {:?}", other),
        }
    }

    #[test]
    fn test_import_requires_string() {
        let (value, _) = eval_with(|_| {}, "import(5)");
        match value {
            Value::Error(message) => {
                assert_eq!(message.as_str(), "[1] argument to `import` must be STRING, got NUMBER")
            }
            other => panic!("expected ERROR, got {:?}", other),
        }
    }

    #[test]
    fn test_import_cycle_detected() {
        let (value, _) = eval_with(|_| {}, r#"import("tests/scripts/cycle_a")"#);
        match value {
            Value::Error(message) => assert!(
                message.contains("Import cycle detected"),
                "unexpected message: {}",
                message
            ),
            other => panic!("expected ERROR, got {:?}", other),
        }
    }
}

// =============================================================================
// Display forms
// =============================================================================

mod display {
    use super::*;

    #[test]
    fn test_numbers_display_without_trailing_zeros() {
        assert_eq!(inspect("5.500"), "5.5");
        assert_eq!(inspect("10.0"), "10");
        assert_eq!(inspect("2.50 + 2.50"), "5");
    }

    #[test]
    fn test_collection_display() {
        assert_eq!(inspect("[1, \"two\", true, null]"), "[1, two, true, null]");
        assert_eq!(inspect("{\"a\": [1, 2]}"), "{a: [1, 2]}");
    }

    #[test]
    fn test_function_display() {
        assert_eq!(
            inspect("function(x) { x + 2; }"),
            "function(x) {\n(x + 2)\n}"
        );
    }
}
