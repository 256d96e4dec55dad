use lumen::error::InterpretError;
use lumen::vm;
use lumen::vm::value::Value;
use rstest::rstest;

fn run(source: &str) -> Result<Value, InterpretError> {
    vm::interpret(source)
}

fn run_ok(source: &str) -> Value {
    run(source).expect("interpret should succeed")
}

#[rstest]
#[case("1 + 2 * 3", 7.0)]
#[case("(-1 + 2) * 3 - -4", 7.0)]
#[case("1 + 2 * (3 + 4)", 15.0)]
#[case("10 / 4", 2.5)]
#[case("0 - 0.5", -0.5)]
fn arithmetic_expressions(#[case] source: &str, #[case] expected: f64) {
    assert_eq!(run_ok(source), Value::Number(expected));
}

#[rstest]
#[case("!(5 - 4 >= 3 * 2 == !nil)", true)]
#[case("nil == nil", true)]
#[case("\"hello\" == \"hello\"", true)]
#[case("\"hello\" == \"world\"", false)]
#[case("\"hello\" != \"world\"", true)]
#[case("1 == nil", false)]
#[case("1 < 2 == 3 >= 4", false)]
#[case("!true", false)]
#[case("!123", false)]
fn boolean_expressions(#[case] source: &str, #[case] expected: bool) {
    assert_eq!(run_ok(source), Value::Bool(expected));
}

#[test]
fn nil_literal() {
    assert_eq!(run_ok("nil"), Value::Nil);
}

#[test]
fn string_concatenation() {
    match run_ok("\"hello\" + \" \" + \"world\"") {
        Value::Str(s) => assert_eq!(s.as_str(), "hello world"),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn concatenation_compares_equal_to_a_literal() {
    assert_eq!(run_ok("\"foo\" + \"bar\" == \"foobar\""), Value::Bool(true));
}

#[rstest]
#[case("true + 1", "Operands must be two numbers or two strings.")]
#[case("\"text\" + 1", "Operands must be two numbers or two strings.")]
#[case("-false", "Operand must be a number.")]
#[case("nil * 2", "Operands must be numbers.")]
#[case("\"a\" < \"b\"", "Operands must be numbers.")]
fn runtime_type_errors(#[case] source: &str, #[case] message: &str) {
    match run(source) {
        Err(InterpretError::Runtime(e)) => {
            assert_eq!(e.message, message);
            assert!(e.to_string().contains("[line 1] in script"));
        }
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[rstest]
#[case("")]
#[case("1 +")]
#[case("~")]
#[case("(1 + 2")]
#[case("1 2")]
#[case("\"unterminated")]
#[case("+ 1")]
fn compile_errors(#[case] source: &str) {
    match run(source) {
        Err(InterpretError::Compile(errors)) => assert!(!errors.is_empty()),
        other => panic!("expected a compile error, got {other:?}"),
    }
}

#[test]
fn unexpected_character_diagnostic() {
    match run("~") {
        Err(InterpretError::Compile(errors)) => {
            assert_eq!(errors[0].to_string(), "[line 1] Error: Unexpected character.");
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
}

#[test]
fn multi_line_sources_report_later_lines() {
    match run("1 +\n+ 2") {
        Err(InterpretError::Compile(errors)) => {
            assert_eq!(errors[0].to_string(), "[line 2] Error at '+': Expect expression.");
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
}

#[test]
fn comments_and_whitespace_are_ignored() {
    assert_eq!(run_ok("// leading comment\n 1 + 2 // trailing"), Value::Number(3.0));
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(run_ok("(1 + 2) * 3"), Value::Number(9.0));
    assert_eq!(run_ok("1 + 2 * 3"), Value::Number(7.0));
}

#[test]
fn division_is_left_associative() {
    assert_eq!(run_ok("8 / 4 / 2"), Value::Number(1.0));
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(run_ok("8 - 4 - 2"), Value::Number(2.0));
}
