use treelox::ast_printer::AstPrinter;
use treelox::error::LoxError;
use treelox::parser::Parser;
use treelox::scanner::Scanner;
use treelox::stmt::Stmt;

fn parse(source: &str) -> (Vec<Stmt>, Vec<LoxError>) {
    let (tokens, lex_errors) = Scanner::new(source.as_bytes()).tokenize();

    assert!(
        lex_errors.is_empty(),
        "lex errors in {:?}: {:?}",
        source,
        lex_errors
    );

    Parser::new(tokens).parse()
}

fn assert_pretty(source: &str, expected: &str) {
    let (statements, errors) = parse(source);

    assert!(
        errors.is_empty(),
        "parse errors in {:?}: {:?}",
        source,
        errors
    );

    assert_eq!(AstPrinter::print(&statements), expected, "for {:?}", source);
}

fn assert_one_error(source: &str, message: &str) {
    let (_statements, errors) = parse(source);

    assert_eq!(
        errors.len(),
        1,
        "expected exactly one error for {:?}, got {:?}",
        source,
        errors
    );

    assert_eq!(errors[0].message(), message);
}

#[test]
fn literal_statements() {
    assert_pretty("\"true\";", "\"true\"");
    assert_pretty("true;", "true");
    assert_pretty("\"false\";", "\"false\"");
    assert_pretty("false;", "false");
    assert_pretty("0;", "0");
    assert_pretty("nil;", "nil");
}

#[test]
fn variables() {
    assert_pretty("a;", "a");
    assert_pretty("a1;", "a1");
    assert_pretty("_a1;", "_a1");
}

#[test]
fn unary_expressions() {
    assert_pretty("-1;", "(- 1)");
    assert_pretty("!1;", "(! 1)");

    assert_pretty("-   1;", "(- 1)");
    assert_pretty("!   1;", "(! 1)");

    assert_pretty("!\"\";", "(! \"\")");
    assert_pretty("-\"\";", "(- \"\")");

    assert_pretty("! -1;", "(! (- 1))");
    assert_pretty("- !1;", "(- (! 1))");

    assert_pretty("!!1;", "(! (! 1))");
    assert_pretty("--1;", "(- (- 1))");
}

#[test]
fn grouping() {
    assert_pretty("(1);", "(group 1)");
    assert_pretty("(\"abc\");", "(group \"abc\")");
    assert_pretty("(true);", "(group true)");
    assert_pretty("(1 + 2);", "(group (+ 1 2))");
    assert_pretty("(! 2);", "(group (! 2))");
}

#[test]
fn binary_precedence_and_associativity() {
    assert_pretty("1 + 2;", "(+ 1 2)");
    assert_pretty("1 + (2);", "(+ 1 (group 2))");
    assert_pretty("1 + (2 + 3);", "(+ 1 (group (+ 2 3)))");
    assert_pretty("1 + 2 * 3;", "(+ 1 (* 2 3))");
    assert_pretty("1 * 2 + 3;", "(+ (* 1 2) 3)");
    assert_pretty("(1 + 2) * 3;", "(* (group (+ 1 2)) 3)");
    assert_pretty("1 - 2 == 3;", "(== (- 1 2) 3)");
    assert_pretty("1 - 2 * 4 == 3 / 5;", "(== (- 1 (* 2 4)) (/ 3 5))");
    assert_pretty(
        "1 - 2 * 4 == 3 / 5 != 6 >= 3;",
        "(!= (== (- 1 (* 2 4)) (/ 3 5)) (>= 6 3))",
    );
}

#[test]
fn assignment_and_logical_operators() {
    assert_pretty("a = b = 3;", "(= a (= b 3))");
    assert_pretty("a and b or 3;", "(or (and a b) 3)");
    assert_pretty("a or b or 3;", "(or (or a b) 3)");
    assert_pretty("a or b and 3;", "(or a (and b 3))");
}

#[test]
fn invalid_assignment_targets() {
    assert_one_error("a = 2 = 3;", "Invalid assignment target");
    assert_one_error("1 = a = 3;", "Invalid assignment target");
}

#[test]
fn unclosed_grouping() {
    assert_one_error("(1 + 2", "Expect a closing parenthesis ')'");
    assert_one_error("1 + (2", "Expect a closing parenthesis ')'");
}

#[test]
fn invalid_primary() {
    assert_one_error(
        "+1 + 2",
        "Expect a numeric literal, string literal, variable or grouping expression",
    );
    assert_one_error(
        "+2",
        "Expect a numeric literal, string literal, variable or grouping expression",
    );
}

#[test]
fn print_statements() {
    assert_pretty("print a + 2;", "(print (+ a 2))");
    assert_pretty("print 1 + (a);", "(print (+ 1 (group a)))");
    assert_pretty("print 1 + (b + 3);", "(print (+ 1 (group (+ b 3))))");
    assert_pretty("print 1 + 2 * 3;", "(print (+ 1 (* 2 3)))");
    assert_pretty("print (1 + 2) * 3;", "(print (* (group (+ 1 2)) 3))");
    assert_pretty(
        "print 1 - 2 * 4 == 3 / 5;",
        "(print (== (- 1 (* 2 4)) (/ 3 5)))",
    );
}

#[test]
fn var_declarations() {
    assert_pretty("var x = 1 + 2;", "(define x (+ 1 2))");
    assert_pretty("var yy = 1 + (2);", "(define yy (+ 1 (group 2)))");
    assert_pretty("var _z1;", "(define _z1)");
}

#[test]
fn invalid_var_declarations() {
    assert_one_error("var", "Expect an identifier");
    assert_one_error(
        "var x =",
        "Expect a numeric literal, string literal, variable or grouping expression",
    );
}

#[test]
fn blocks() {
    assert_pretty("{}", "(block)");
    assert_pretty(
        "var a = 3; { var b = 3; }",
        "(define a 3)\n(block (define b 3))",
    );
    assert_pretty(
        "var a = 3; { var b = 3; } var c = 3;",
        "(define a 3)\n(block (define b 3))\n(define c 3)",
    );
    assert_pretty(
        "{ var a = 3; var b = a + 1; c; }",
        "(block (define a 3) (define b (+ a 1)) c)",
    );
}

#[test]
fn unclosed_blocks_report_where_parsing_stopped() {
    assert_one_error(
        "{",
        "Expect a numeric literal, string literal, variable or grouping expression",
    );
    assert_one_error(
        "{ var a = 3; ",
        "Expect a numeric literal, string literal, variable or grouping expression",
    );
}

#[test]
fn if_statements_bind_else_to_nearest_if() {
    assert_pretty("if (x) x;", "(if x then x)");
    assert_pretty("if (x) x; else x;", "(if x then x else x)");
    assert_pretty(
        "if (x == 1) x + 1; else x - 1;",
        "(if (== x 1) then (+ x 1) else (- x 1))",
    );
    assert_pretty(
        "if (x == 1) if (x != 2) 3; else 2;",
        "(if (== x 1) then (if (!= x 2) then 3 else 2))",
    );
    assert_pretty(
        "if (x == 1) if (x != 2) 3; else 2; else x - 1;",
        "(if (== x 1) then (if (!= x 2) then 3 else 2) else (- x 1))",
    );
}

#[test]
fn while_statements() {
    assert_pretty("while (x) x;", "(while x do x)");
    assert_pretty(
        "while (x) { x + 1; print x; }",
        "(while x do (block (+ x 1) (print x)))",
    );
}

#[test]
fn for_statements() {
    assert_pretty(
        "for (var x = 0; x < 10; x = x + 1) x;",
        "(for (define x 0) (< x 10) (= x (+ x 1)) do x)",
    );
    assert_pretty(
        "for (var x = 0; x < 10; x = x + 1) { x + 1; print x; }",
        "(for (define x 0) (< x 10) (= x (+ x 1)) do (block (+ x 1) (print x)))",
    );
}

#[test]
fn for_statements_synthesize_missing_clauses() {
    // Omitted clauses still appear in the tree: nil init/post, true condition.
    assert_pretty("for (;;) x;", "(for nil true nil do x)");
    assert_pretty("for (; x < 3;) x;", "(for nil (< x 3) nil do x)");
}

#[test]
fn function_declarations_and_calls() {
    assert_pretty(
        "fun add(a, b) { return a + b; }",
        "(fun add (a b) (return (+ a b)))",
    );
    assert_pretty("fun f() { return; }", "(fun f () (return))");
    assert_pretty("add(1, 2);", "(call add 1 2)");
    assert_pretty("f();", "(call f)");
    assert_pretty("f()();", "(call (call f))");
}

#[test]
fn property_access_and_assignment() {
    assert_pretty("a.b;", "(get a b)");
    assert_pretty("a.b.c;", "(get (get a b) c)");
    assert_pretty("a.b = 3;", "(set a b 3)");
    assert_pretty("a.b(1);", "(call (get a b) 1)");
    assert_pretty("this.x;", "(get this x)");
}

#[test]
fn class_declarations() {
    assert_pretty("class Foo {}", "(class Foo)");
    assert_pretty(
        "class Foo { bar() { return 1; } }",
        "(class Foo (fun bar () (return 1)))",
    );
    assert_pretty("class Foo < Bar {}", "(class Foo (< Bar))");
    assert_pretty(
        "class B < A { m() { return super.m(); } init(x) { super(x); } }",
        "(class B (< A) (fun m () (return (call (super m)))) (fun init (x) (super-call x)))",
    );
}

#[test]
fn recovery_continues_after_an_error() {
    // The malformed first statement is dropped; the rest still parse.
    let (statements, errors) = parse("var x = ; var y = 2; y;");

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        "Expect a numeric literal, string literal, variable or grouping expression"
    );
    assert_eq!(AstPrinter::print(&statements), "(define y 2)\ny");
}

#[test]
fn recovery_collects_multiple_independent_errors() {
    let (statements, errors) = parse("var 1 = 2; print 3; var = 4;");

    assert_eq!(errors.len(), 2, "errors: {:?}", errors);
    assert_eq!(errors[0].message(), "Expect an identifier");
    assert_eq!(errors[1].message(), "Expect an identifier");

    // The statement between the two bad ones survives.
    assert_eq!(AstPrinter::print(&statements), "(print 3)");
}

#[test]
fn parse_errors_carry_line_numbers() {
    let (_statements, errors) = parse("var x = 1;\nvar;\n");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line(), 2);
}
