//! Evaluation tests for the FluxScript tree-walking interpreter.
//!
//! Programs run against in-memory stdin/stdout so assertions see exactly what
//! a script would write, with no trailing newlines added.

use fluxscript::ast::Expr;
use fluxscript::interpreter::{ErrorCode, Interpreter, RuntimeError, Value};
use fluxscript::parser::Parser;
use fluxscript::runtime::{self, RuntimeOptions};
use fluxscript::tokenizer::Tokenizer;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn run_with_input(source: &str, stdin: &str) -> String {
    let mut out = Vec::new();
    runtime::run_source(
        source,
        &RuntimeOptions::default(),
        stdin.as_bytes(),
        &mut out,
    )
    .unwrap_or_else(|err| panic!("script failed: {err}"));
    String::from_utf8(out).expect("utf-8 output")
}

fn run(source: &str) -> String {
    run_with_input(source, "")
}

fn run_err(source: &str) -> RuntimeError {
    let program = runtime::parse_source(source).expect("parse program");
    let mut out = Vec::new();
    let mut interpreter = Interpreter::with_io(&b""[..], &mut out);
    interpreter
        .eval_program(&program)
        .expect_err("expected a runtime error")
}

fn eval(source: &str) -> Value {
    let tokens = Tokenizer::new(source).tokenize().expect("lex failed");
    let expr: Expr = Parser::new(tokens)
        .parse_expression_only()
        .expect("parse failed");
    let mut out = Vec::new();
    let mut interpreter = Interpreter::with_io(&b""[..], &mut out);
    interpreter.eval_value(&expr).expect("eval failed")
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn declared_int_is_printed_without_newline() {
    assert_eq!(run("int x = 5\nprint << x\n"), "5");
}

#[test]
fn function_call_returns_sum() {
    let source = r#"
function add(int a, int b)
return a + b
end function
int r = add(2, 3)
print << r
"#;
    assert_eq!(run(source), "5");
}

#[test]
fn for_loop_prints_run_together() {
    let source = r#"
for i = 0 in 3
print << i
end for
"#;
    assert_eq!(run(source), "012");
}

#[test]
fn string_slice_prefix() {
    let source = r#"
string s = "hello world"
print << s[0:5]
"#;
    assert_eq!(run(source), "hello");
}

#[test]
fn add_assign_with_string_concatenates() {
    let source = r#"
int x = 2
x += "!"
print << x
"#;
    assert_eq!(run(source), "2!");
}

// ---------------------------------------------------------------------------
// Arithmetic and operators
// ---------------------------------------------------------------------------

#[test]
fn division_narrows_exact_integer_results() {
    assert_eq!(eval("6 / 2"), Value::Integer(3));
    assert_eq!(eval("7 / 2"), Value::Float(3.5));
}

#[test]
fn division_by_zero_is_fatal() {
    assert_eq!(run_err("int x = 5 / 0\n"), RuntimeError::DivisionByZero);
}

#[test]
fn plus_with_string_operand() {
    assert_eq!(eval("\"a\" + 1"), Value::String("a1".into()));
    assert_eq!(eval("1 + 2"), Value::Integer(3));
}

#[test]
fn precedence_and_unary_minus() {
    assert_eq!(eval("2 + 3 * 4"), Value::Integer(14));
    assert_eq!(eval("(2 + 3) * 4"), Value::Integer(20));
    assert_eq!(eval("-2 * -3"), Value::Integer(6));
    assert_eq!(eval("10 - 4 - 3"), Value::Integer(3));
    assert_eq!(eval("1.5 + 1"), Value::Float(2.5));
}

#[test]
fn comparison_after_arithmetic() {
    assert_eq!(eval("1 + 2 < 4"), Value::Boolean(true));
    assert_eq!(eval("1 < 2 * 3"), Value::Boolean(true));
    assert_eq!(eval("\"pear\" > \"apple\""), Value::Boolean(true));
}

#[test]
fn comparison_right_side_must_be_a_term() {
    let source = r#"
int a = 1
int b = 1
if a < b + 1
print << "yes"
end if
"#;
    let mut out = Vec::new();
    let err = runtime::run_source(source, &RuntimeOptions::default(), &b""[..], &mut out)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Syntax);
    assert!(out.is_empty());

    let grouped = r#"
int a = 1
int b = 1
if a < (b + 1)
print << "yes"
end if
"#;
    assert_eq!(run(grouped), "yes");
}

#[test]
fn compound_assignment_operators() {
    let source = r#"
int x = 10
x -= 4
x *= 3
print << x << " "
x /= 4
print << x
"#;
    assert_eq!(run(source), "18 4.5");
}

#[test]
fn divide_assign_always_yields_float() {
    assert_eq!(run("int x = 6\nx /= 2\nprint << x\n"), "3.0");
}

#[test]
fn subtract_assign_rejects_strings() {
    let err = run_err("string s = \"abc\"\ns -= 1\n");
    assert!(matches!(err, RuntimeError::TypeMismatch(_)), "{err:?}");
}

// ---------------------------------------------------------------------------
// Declarations, coercion and rendering
// ---------------------------------------------------------------------------

#[test]
fn declarations_coerce_to_declared_type() {
    let source = r#"
int i = 3.99
float f = 2
string s = 1.5
bool b = 0
print << i << "|" << f << "|" << s << "|" << b
"#;
    assert_eq!(run(source), "3|2.0|1.5|False");
}

#[test]
fn booleans_render_capitalized_everywhere() {
    let source = r#"
bool b = 1
string t = false
print << b << "|" << "x" + true << "|" << t
"#;
    assert_eq!(run(source), "True|xTrue|False");
}

#[test]
fn huge_floats_print_in_exponent_form() {
    let source = r#"
float big = 10000000000000000.0
float small = 0.0000001
print << big << " " << small
"#;
    assert_eq!(run(source), "1e+16 1e-07");
}

#[test]
fn int_declaration_rejects_string() {
    let err = run_err("int x = \"five\"\n");
    assert!(matches!(err, RuntimeError::TypeMismatch(_)), "{err:?}");
}

#[test]
fn bool_declaration_rejects_string() {
    let err = run_err("bool b = \"yes\"\n");
    assert!(matches!(err, RuntimeError::TypeMismatch(_)), "{err:?}");
}

#[test]
fn assignment_to_undeclared_name_fails() {
    assert_eq!(
        run_err("y = 3\n"),
        RuntimeError::UndefinedVariable("y".into())
    );
}

// ---------------------------------------------------------------------------
// Control flow and scoping
// ---------------------------------------------------------------------------

#[test]
fn loop_variable_survives_the_loop() {
    let source = r#"
for i = 0 in 3
end for
print << i
"#;
    assert_eq!(run(source), "2");
}

#[test]
fn empty_range_runs_nothing() {
    let source = r#"
for i = 5 in 2
print << i
end for
print << "done"
"#;
    assert_eq!(run(source), "done");
}

#[test]
fn for_bounds_must_be_integers() {
    let err = run_err("for i = 0 in 2.5\nend for\n");
    assert_eq!(
        err,
        RuntimeError::NonIntegerBounds {
            start: "int",
            end: "float"
        }
    );
}

#[test]
fn if_body_declarations_persist() {
    let source = r#"
if true
int inner = 7
end if
print << inner
"#;
    assert_eq!(run(source), "7");
}

#[test]
fn falsy_condition_skips_body() {
    let source = r#"
if ""
print << "no"
end if
if 0.0
print << "no"
end if
"#;
    assert_eq!(run(source), "");
}

#[test]
fn while_loop_counts_down() {
    let source = r#"
int n = 3
while (n > 0)
print << n
n -= 1
end while
"#;
    assert_eq!(run(source), "321");
}

#[test]
fn return_unwinds_nested_blocks_only_to_the_call() {
    let source = r#"
function find(int target)
int i = 0
while i < 10
if i > target
return i * 10
end if
i += 1
end while
return 0 - 1
end function
print << find(2) << "," << find(50)
"#;
    assert_eq!(run(source), "30,-1");
}

#[test]
fn recursion() {
    let source = r#"
function fib(int n)
if n < 2
return n
end if
return fib(n - 1) + fib(n - 2)
end function
print << fib(15)
"#;
    assert_eq!(run(source), "610");
}

#[test]
fn top_level_return_is_an_error() {
    assert_eq!(run_err("return 1\n"), RuntimeError::ReturnOutsideFunction);
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

#[test]
fn callee_cannot_see_caller_locals() {
    let source = r#"
function peek()
return secret
end function
function caller()
int secret = 1
return peek()
end function
int r = caller()
"#;
    assert_eq!(
        run_err(source),
        RuntimeError::UndefinedVariable("secret".into())
    );
}

#[test]
fn callee_locals_do_not_leak_into_caller() {
    let source = r#"
function shadow()
int x = 99
return x
end function
int x = 1
int y = shadow()
print << x << " " << y
"#;
    assert_eq!(run(source), "1 99");
}

#[test]
fn callee_assigns_globals_it_does_not_shadow() {
    let source = r#"
int count = 0
function bump()
count += 1
end function
bump()
bump()
print << count
"#;
    assert_eq!(run(source), "2");
}

#[test]
fn parameters_are_bound_without_coercion() {
    let source = r#"
function show(int v)
return v
end function
print << show("raw")
"#;
    assert_eq!(run(source), "raw");
}

#[test]
fn argument_count_must_match() {
    let source = r#"
function add(int a, int b)
return a + b
end function
int r = add(1)
"#;
    assert_eq!(
        run_err(source),
        RuntimeError::ArgumentCount {
            name: "add".into(),
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn calling_unknown_function_fails() {
    assert_eq!(
        run_err("launch()\n"),
        RuntimeError::UndefinedFunction("launch".into())
    );
}

#[test]
fn missing_return_prints_as_empty() {
    let source = r#"
function quiet()
int x = 1
end function
print << "[" << quiet() << "]"
"#;
    assert_eq!(run(source), "[]");
}

#[test]
fn missing_return_cannot_be_stored() {
    let source = r#"
function quiet()
int x = 1
end function
string s = quiet()
"#;
    assert_eq!(run_err(source), RuntimeError::AbsentValue("quiet".into()));
}

#[test]
fn redefinition_overwrites_previous_function() {
    let source = r#"
function f()
return 1
end function
print << f()
function f()
return 2
end function
print << f()
"#;
    assert_eq!(run(source), "12");
}

// ---------------------------------------------------------------------------
// Strings, slices and input
// ---------------------------------------------------------------------------

#[test]
fn slice_bounds_default_and_clamp() {
    let source = r#"
string s = "abcdef"
print << s[:2] << "|" << s[4:] << "|" << s[-2:] << "|" << s[3:100] << "|" << s[4:1]
"#;
    assert_eq!(run(source), "ab|ef|ef|def|");
}

#[test]
fn slice_counts_characters_not_bytes() {
    assert_eq!(run("string s = \"héllo\"\nprint << s[1:3]\n"), "él");
}

#[test]
fn slicing_a_number_fails() {
    let err = run_err("int n = 12345\nprint << n[0:2]\n");
    assert!(matches!(err, RuntimeError::InvalidSlice { ref name, .. } if name == "n"));
}

#[test]
fn escaped_newlines_in_output() {
    assert_eq!(run(r#"print << "a\n" << "b""#), "a\nb");
}

#[test]
fn input_echoes_prompt_and_returns_raw_line() {
    let source = r#"
string name = input << "Name: "
print << "Hi " << name
int n = input << ""
"#;
    let program = runtime::parse_source(source).unwrap();
    let mut out = Vec::new();
    let result = runtime::execute(
        &program,
        &RuntimeOptions::default(),
        "Ada\r\n42\n".as_bytes(),
        &mut out,
    );
    // `input` never converts to a number, so the int declaration fails.
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::TypeMismatch);
    assert_eq!(String::from_utf8(out).unwrap(), "Name: Hi Ada");
}

#[test]
fn input_at_end_of_stream_fails() {
    let source = "string s = input << \"> \"\n";
    let mut out = Vec::new();
    let err = runtime::run_source(source, &RuntimeOptions::default(), &b""[..], &mut out)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RuntimePanic);
}

#[test]
fn input_value_is_usable() {
    assert_eq!(
        run_with_input("string a = input << \"\"\nprint << a + a\n", "ab\n"),
        "abab"
    );
}

// ---------------------------------------------------------------------------
// Error reporting
// ---------------------------------------------------------------------------

#[test]
fn lex_errors_carry_code_e001() {
    let mut out = Vec::new();
    let err = runtime::run_source("int x = 1.2.3\n", &RuntimeOptions::default(), &b""[..], &mut out)
        .unwrap_err();
    assert_eq!(err.code_str(), "E001");
}

#[test]
fn undefined_variable_message_names_it() {
    let err = run_err("print << ghost\n");
    assert_eq!(err.to_string(), "Variable 'ghost' not defined");
}
