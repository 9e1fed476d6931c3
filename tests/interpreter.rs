mod common;

use lox_interpreter as lox;

use common::{messages, run, session};
use lox::lox::Outcome;
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Runs `source` and asserts it finished cleanly.
fn output_of(source: &str) -> String {
    let (output, outcome) = run(source);
    assert!(outcome.is_success(), "failed: {:?}", messages(&outcome));
    output
}

/// Runs `source` and returns its single runtime error.
fn runtime_error(source: &str) -> String {
    let (_, outcome) = run(source);
    match outcome {
        Outcome::RuntimeError(e) => e.to_string(),
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────────────

#[rstest]
#[case("print 1 + 2;", "3")]
#[case("print 7 / 2;", "3.5")]
#[case("print -(2 * 3) + 10;", "4")]
#[case("print \"ab\" + \"cd\";", "abcd")]
#[case("print 1 < 2;", "true")]
#[case("print 2 <= 1;", "false")]
#[case("print !nil;", "true")]
#[case("print !0;", "false")]
#[case("print 1 == 1.0;", "true")]
#[case("print \"1\" == 1;", "false")]
#[case("print nil == false;", "false")]
#[case("print 1 / 0;", "Infinity")]
#[case("print nil or \"default\";", "default")]
#[case("print 0 and \"second\";", "second")]
#[case("print false and undefinedName;", "false")]
#[case("print 0.1;", "0.1")]
#[case("print 123456.789;", "123456.789")]
#[case("print 1000000000000000;", "1000000000000000")]
fn evaluates_expressions(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(output_of(source), format!("{expected}\n"));
}

#[test]
fn assignment_is_an_expression() {
    assert_eq!(output_of("var a; var b; a = b = 3; print a; print b;"), "3\n3\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Scoping and closures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn shadowing_restores_outer_binding_after_block() {
    assert_eq!(
        output_of("var a = 1; { var b = a + 1; var a = b; print a; } print a;"),
        "2\n1\n"
    );
}

#[test]
fn reading_local_in_own_initializer_is_rejected() {
    let (output, outcome) = run("var a = 1; { var a = a + 1; print a; } print a;");

    assert_eq!(output, "");
    assert_eq!(
        messages(&outcome),
        vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn counter_closure_keeps_its_own_state() {
    let source = r#"
fun counter() {
  var i = 0;
  fun inc() { i = i + 1; return i; }
  return inc;
}
var c = counter();
print c();
print c();
var d = counter();
print d();
print c();
"#;

    assert_eq!(output_of(source), "1\n2\n1\n3\n");
}

#[test]
fn closures_share_the_captured_scope() {
    let source = r#"
var get;
var set;
{
  var x = "before";
  fun g() { return x; }
  fun s(v) { x = v; }
  get = g;
  set = s;
}
set("after");
print get();
"#;

    assert_eq!(output_of(source), "after\n");
}

#[test]
fn control_flow_and_loops() {
    let source = r#"
var total = 0;
for (var i = 1; i <= 4; i = i + 1) {
  if (i == 3) total = total + 100; else total = total + i;
}
print total;
var n = 0;
while (n < 3) n = n + 1;
print n;
"#;

    assert_eq!(output_of(source), "107\n3\n");
}

#[test]
fn recursion_and_early_return() {
    let source = r#"
fun fib(n) {
  if (n < 2) return n;
  return fib(n - 1) + fib(n - 2);
}
print fib(10);
fun firstOver(limit) {
  for (var i = 0; ; i = i + 1) {
    if (i > limit) return i;
  }
}
print firstOver(5);
"#;

    assert_eq!(output_of(source), "55\n6\n");
}

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(output_of("fun f() {} print f();"), "nil\n");
}

#[rstest]
#[case("fun hello() {} print hello;", "<fn hello>")]
#[case("print clock;", "<native fn>")]
#[case("class Box {} print Box;", "LoxClass(Box)")]
#[case("class Box {} print Box();", "LoxInstance(Box)")]
#[case("class Box { open() {} } print Box().open;", "<fn open>")]
fn stringifies_objects(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(output_of(source), format!("{expected}\n"));
}

#[test]
fn clock_returns_seconds() {
    assert_eq!(output_of("print clock() > 1000000000;"), "true\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn initializer_sets_fields() {
    assert_eq!(
        output_of("class C { init() { this.x = 1; } } var c = C(); print c.x;"),
        "1\n"
    );
}

#[test]
fn initializer_with_bare_return_still_yields_instance() {
    let source = r#"
class P {
  init(flag) {
    this.flag = flag;
    if (flag) return;
    this.flag = "late";
  }
}
print P(true).flag;
print P(false).flag;
var p = P(true);
print p.init(false);
"#;

    assert_eq!(output_of(source), "true\nlate\nLoxInstance(P)\n");
}

#[test]
fn super_calls_reach_the_superclass_method() {
    let source = r#"
class A { foo() { print "A"; } }
class B < A { foo() { super.foo(); print "B"; } }
B().foo();
"#;

    assert_eq!(output_of(source), "A\nB\n");
}

#[test]
fn this_dispatches_dynamically_and_super_statically() {
    let source = r#"
class A {
  name() { return "A"; }
  describe() { return "I am " + this.name(); }
}
class B < A {
  name() { return "B"; }
  parent() { return super.name(); }
}
class C < B {
  name() { return "C"; }
}
print B().describe();
print C().describe();
print C().parent();
"#;

    assert_eq!(output_of(source), "I am B\nI am C\nA\n");
}

#[test]
fn inherited_initializer_sets_arity() {
    let source = r#"
class Point { init(x, y) { this.x = x; this.y = y; } }
class Labelled < Point {}
var p = Labelled(1, 2);
print p.x + p.y;
"#;

    assert_eq!(output_of(source), "3\n");
}

#[test]
fn fields_shadow_methods_and_bound_methods_remember_this() {
    let source = r#"
class Greeter {
  init(name) { this.name = name; }
  greet() { return "hi " + this.name; }
}
var g = Greeter("ann");
var m = g.greet;
g.name = "bob";
print m();
g.greet = "field";
print g.greet;
"#;

    assert_eq!(output_of(source), "hi bob\nfield\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime errors
// ─────────────────────────────────────────────────────────────────────────────

#[rstest]
#[case("print 1 + \"2\";", "Operands must be two numbers or two strings.\n[line 1]")]
#[case(
    "fun f(a, b) { return a + b; }\nprint f(1);",
    "Expected 2 arguments but got 1.\n[line 2]"
)]
#[case("print -\"x\";", "Operand must be a number.\n[line 1]")]
#[case("print 1 < \"2\";", "Operands must be numbers.\n[line 1]")]
#[case("print missing;", "Undefined variable 'missing'.\n[line 1]")]
#[case("missing = 1;", "Undefined variable 'missing'.\n[line 1]")]
#[case("\"text\"();", "Can only call functions and classes.\n[line 1]")]
#[case("print 4.field;", "Only instances have properties.\n[line 1]")]
#[case("var s = \"str\"; s.field = 1;", "Only instances have fields.\n[line 1]")]
#[case("class A {} print A().nope;", "Undefined property 'nope'.\n[line 1]")]
#[case("var NotAClass = 1; class B < NotAClass {}", "Superclass must be a class.\n[line 1]")]
#[case(
    "class A {} class B < A { m() { return super.nope; } } B().m();",
    "Undefined property 'nope'.\n[line 1]"
)]
#[case("class A { init(x) {} } A();", "Expected 1 arguments but got 0.\n[line 1]")]
fn reports_runtime_errors(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(runtime_error(source), expected);
}

#[test]
fn runtime_error_stops_remaining_statements() {
    let (output, outcome) = run("print \"before\";\nprint nil + 1;\nprint \"after\";");

    assert_eq!(output, "before\n");
    assert_eq!(outcome.exit_code(), 70);
}

#[test]
fn arguments_are_evaluated_before_arity_check() {
    let source = r#"
var log = "";
fun noisy() { log = log + "x"; return 1; }
fun one(a) {}
one(noisy(), noisy());
"#;
    let (mut lox, buffer) = session();

    let outcome = lox.run(source);
    assert_eq!(outcome.exit_code(), 70);

    assert!(lox.run("print log;").is_success());
    assert_eq!(buffer.contents(), "xx\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Deep recursion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn deep_recursion_completes() {
    let source = r#"
fun count(n) {
  if (n > 0) return count(n - 1);
  return 0;
}
print count(10000);
"#;

    assert_eq!(output_of(source), "0\n");
}

#[test]
fn unbounded_recursion_is_a_runtime_error() {
    let source = "fun f() { f(); }\nf();";

    assert_eq!(runtime_error(source), "Stack overflow.\n[line 1]");
    assert_eq!(run(source).1.exit_code(), 70);
}

#[test]
fn call_depth_resets_after_overflow() {
    let (mut lox, buffer) = session();

    assert_eq!(lox.run("fun f() { f(); } f();").exit_code(), 70);
    assert!(lox
        .run("fun count(n) { if (n > 0) return count(n - 1); return n; } print count(5000);")
        .is_success());

    assert_eq!(buffer.contents(), "0\n");
}

#[test]
fn deeply_nested_expression_evaluates() {
    let depth = 2000;
    let source = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));

    assert_eq!(output_of(&source), "1\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn runtime_error_restores_the_outer_environment() {
    let (mut lox, buffer) = session();

    assert!(lox
        .run("var a = \"g\"; fun f() { var a = 1; a = nil + 1; }")
        .is_success());
    assert_eq!(lox.run("f();").exit_code(), 70);
    assert!(lox.run("print a;").is_success());

    assert_eq!(lox.run("{ var a = \"block\"; print nil + 1; }").exit_code(), 70);
    assert!(lox.run("print a;").is_success());

    assert_eq!(buffer.contents(), "g\ng\n");
}

#[test]
fn session_keeps_globals_across_runs() {
    let (mut lox, buffer) = session();

    assert!(lox.run("var count = 1;").is_success());
    assert!(lox.run("fun bump() { count = count + 1; return count; }").is_success());
    assert!(lox.run("print bump();").is_success());
    assert!(lox.run("print bump();").is_success());

    assert_eq!(buffer.contents(), "2\n3\n");
}

#[test]
fn closures_from_earlier_runs_keep_their_resolution() {
    let (mut lox, buffer) = session();

    assert!(lox
        .run("fun make() { var n = 0; fun next() { n = n + 1; return n; } return next; } var next = make();")
        .is_success());
    assert!(lox.run("{ var n = 100; print next(); }").is_success());
    assert!(lox.run("print next();").is_success());

    assert_eq!(buffer.contents(), "1\n2\n");
}

#[test]
fn errors_do_not_end_the_session() {
    let (mut lox, buffer) = session();

    assert_eq!(lox.run("print ;").exit_code(), 65);
    assert_eq!(lox.run("print undefinedThing;").exit_code(), 70);
    assert!(lox.run("print \"still here\";").is_success());

    assert_eq!(buffer.contents(), "still here\n");
}
