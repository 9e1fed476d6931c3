use lox_interpreter as lox;

use lox::ast::{Expr, ExprIds, Stmt};
use lox::ast_printer::AstPrinter;
use lox::error::LoxError;
use lox::parser::Parser;
use lox::scanner::Scanner;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn parse(source: &str) -> (Vec<Stmt>, Vec<LoxError>) {
    let (tokens, errors) = Scanner::new(source).scan_tokens();
    assert!(errors.is_empty(), "unexpected scan errors: {:?}", errors);

    let mut ids = ExprIds::new();
    Parser::new(&tokens, &mut ids).parse()
}

fn printed(source: &str) -> Vec<String> {
    let (statements, errors) = parse(source);
    assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);

    statements.iter().map(AstPrinter::print_stmt).collect()
}

fn error_messages(source: &str) -> Vec<String> {
    parse(source).1.iter().map(|e| e.to_string()).collect()
}

#[rstest]
#[case("print 1 + 2 * 3;", "(print (+ 1.0 (* 2.0 3.0)))")]
#[case("print (1 + 2) * 3;", "(print (* (group (+ 1.0 2.0)) 3.0))")]
#[case("print -a - -b;", "(print (- (- a) (- b)))")]
#[case("print 1 - 2 - 3;", "(print (- (- 1.0 2.0) 3.0))")]
#[case("print a == b < c;", "(print (== a (< b c)))")]
#[case("print a or b and c;", "(print (or a (and b c)))")]
#[case("a = b = 1;", "(; (= a (= b 1.0)))")]
#[case("f(1)(2);", "(; (call (call f 1.0) 2.0))")]
#[case("a.b.c = 3;", "(; (= (. (. a b) c) 3.0))")]
fn precedence_and_associativity(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(printed(source), vec![expected.to_string()]);
}

#[test]
fn declarations_print_structurally() {
    assert_eq!(
        printed("var a; var b = \"hi\"; fun add(x, y) { return x + y; }"),
        vec![
            "(var a)",
            "(var b = hi)",
            "(fun add(x, y) (return (+ x y)))",
        ]
    );
}

#[test]
fn class_with_superclass_and_methods() {
    assert_eq!(
        printed("class B < A { init(n) { this.n = n; } get() { return super.get(); } }"),
        vec![
            "(class B < A (fun init(n) (; (= (. this n) n))) (fun get() (return (call (super get)))))",
        ]
    );
}

#[test]
fn for_loop_desugars_to_while_in_block() {
    assert_eq!(
        printed("for (var i = 0; i < 3; i = i + 1) print i;"),
        vec!["(block (var i = 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"]
    );
}

#[test]
fn for_loop_without_clauses_loops_on_true() {
    let (statements, errors) = parse("for (;;) print 1;");
    assert!(errors.is_empty());

    match &statements[..] {
        [Stmt::While { condition, .. }] => {
            assert_eq!(AstPrinter::print(condition), "true");
        }
        other => panic!("expected a bare while, got {:?}", other),
    }
}

#[test]
fn if_else_binds_to_nearest_if() {
    assert_eq!(
        printed("if (a) if (b) print 1; else print 2;"),
        vec!["(if a (if-else b (print 1.0) (print 2.0)))"]
    );
}

#[test]
fn variable_nodes_get_distinct_ids() {
    let (statements, _) = parse("a; a;");

    let ids: Vec<_> = statements
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expression(Expr::Variable { id, .. }) => *id,
            other => panic!("unexpected statement {:?}", other),
        })
        .collect();

    assert_ne!(ids[0], ids[1]);
}

#[rstest]
#[case("print 1", "[line 1] Error at end: Expect ';' after value.")]
#[case("var = 1;", "[line 1] Error at '=': Expect variable name.")]
#[case("print );", "[line 1] Error at ')': Expect expression.")]
#[case("(1 + 2;", "[line 1] Error at ';': Expect ')' after expression.")]
#[case("1 + 2 = 3;", "[line 1] Error at '=': Invalid assignment target.")]
#[case("class { }", "[line 1] Error at '{': Expect class name.")]
fn reports_errors_with_location(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(error_messages(source), vec![expected.to_string()]);
}

#[test]
fn recovers_and_reports_every_bad_statement() {
    let messages = error_messages("print ;\nvar x = 1;\nprint x\nprint 2;");

    assert_eq!(
        messages,
        vec![
            "[line 1] Error at ';': Expect expression.",
            "[line 4] Error at 'print': Expect ';' after value.",
        ]
    );
}

#[test]
fn invalid_target_does_not_drop_statement() {
    let (statements, errors) = parse("a + b = c; print 1;");

    assert_eq!(errors.len(), 1);
    assert_eq!(statements.len(), 2);
}

#[test]
fn too_many_arguments_is_reported_once() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", args.join(", "));

    let messages = error_messages(&source);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].ends_with("Can't have more than 255 arguments."));
}

#[test]
fn too_many_parameters_is_reported() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
    let source = format!("fun f({}) {{}}", params.join(", "));

    let messages = error_messages(&source);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].ends_with("Can't have more than 255 parameters."));
}

#[test]
fn parsing_is_deterministic() {
    let source = r#"
class Shape { area() { return 0; } }
fun total(xs, n) { var sum = 0; for (var i = 0; i < n; i = i + 1) sum = sum + xs; return sum; }
print total(2, 3) * -(1 + 2) or nil;
"#;

    let (first, first_errors) = parse(source);
    let (second, second_errors) = parse(source);
    assert!(first_errors.is_empty() && second_errors.is_empty());

    assert_eq!(first, second);
    assert_eq!(printed(source), printed(source));
}

#[test]
fn deeply_nested_groupings_parse() {
    let depth = 2000;
    let source = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));

    let printed = printed(&source);
    assert_eq!(printed.len(), 1);
    assert!(printed[0].starts_with("(print (group (group"));
    assert_eq!(printed[0].matches("group").count(), depth);
}
