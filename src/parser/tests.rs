use super::{
    context::ParseContext,
    expr::build_expression,
    lowering::Lowering,
    parser::Parser,
    stmt::parse_token_list,
};
use crate::{
    ast::{
        ast::Node,
        prototype::{ArgType, FunctionDef, Prototype},
    },
    errors::{
        errors::{Error, ErrorImpl},
        handler::ErrorHandler,
    },
    lexer::{
        lexer::scan_tokens,
        tokens::{Token, TokenKind},
    },
};

/// Collects whatever the AST builder hands over instead of generating code.
#[derive(Default)]
struct RecordingLowering {
    externs: Vec<Prototype>,
    definitions: Vec<FunctionDef>,
}

impl Lowering for RecordingLowering {
    fn lower_extern(
        &mut self,
        prototype: &Prototype,
        _handler: &mut ErrorHandler,
    ) -> Result<(), Error> {
        self.externs.push(prototype.clone());
        Ok(())
    }

    fn lower_definition(
        &mut self,
        function: &FunctionDef,
        _handler: &mut ErrorHandler,
    ) -> Result<(), Error> {
        self.definitions.push(function.clone());
        Ok(())
    }
}

fn parse_source(source: &str) -> (RecordingLowering, ErrorHandler) {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens(source, &mut handler);

    let mut context = ParseContext::new();
    let mut lowering = RecordingLowering::default();
    let result = parse_token_list(tokens, &mut context, &mut lowering, &mut handler);
    assert!(result.is_ok());

    (lowering, handler)
}

/// Turns `source` into an expression slice and builds it with `variables` in scope.
fn parse_expression(source: &str, variables: &[&str]) -> Result<Node, Error> {
    let mut handler = ErrorHandler::new();
    let mut tokens = scan_tokens(source, &mut handler);
    let eof = tokens.pop().expect("scanner always emits EOF");
    tokens.push(Token::end_of_expression(eof.position));

    let mut context = ParseContext::new();
    for variable in variables {
        context.declare_variable(variable);
    }

    build_expression(tokens, &mut context, false)
}

fn body_of(lowering: &RecordingLowering, name: &str) -> String {
    lowering
        .definitions
        .iter()
        .find(|def| def.prototype.name == name)
        .map(|def| def.body.to_string())
        .unwrap_or_default()
}

#[test]
fn test_multiplication_binds_tighter() {
    let expression = parse_expression("1+2*3", &[]).unwrap();
    assert_eq!(expression.to_string(), "(+ 1 (* 2 3))");

    let expression = parse_expression("1*2+3", &[]).unwrap();
    assert_eq!(expression.to_string(), "(+ (* 1 2) 3)");
}

#[test]
fn test_left_associativity() {
    let expression = parse_expression("1-2-3", &[]).unwrap();
    assert_eq!(expression.to_string(), "(- (- 1 2) 3)");
}

#[test]
fn test_assignment_binds_loosest() {
    let expression = parse_expression("x = 1 + 2 < y", &["x", "y"]).unwrap();
    assert_eq!(expression.to_string(), "(= x (< (+ 1 2) y))");

    match expression {
        Node::BinaryOp { lhs, .. } => assert!(lhs.is_assignable()),
        other => panic!("expected a binary op, got {}", other.kind_name()),
    }
}

#[test]
fn test_grouping_unary_and_calls() {
    let expression = parse_expression("(1+2)*-x", &["x"]).unwrap();
    assert_eq!(expression.to_string(), "(* (+ 1 2) (- x))");

    let expression = parse_expression("foo(1, bar(x), 2*3)", &["x"]).unwrap();
    assert_eq!(expression.to_string(), "(call foo 1 (call bar x) (* 2 3))");

    let expression = parse_expression("print(\"hi\\n\")", &[]).unwrap();
    assert_eq!(expression, Node::Call {
        callee: String::from("print"),
        args: vec![Node::StringLiteral(String::from("hi\n"))],
    });
}

#[test]
fn test_expression_errors() {
    let error = parse_expression("(1+2", &[]).unwrap_err();
    assert_eq!(error.get_error_name(), "ExpectedToken");

    let error = parse_expression("foo(1 2)", &[]).unwrap_err();
    assert_eq!(
        error.to_string(),
        "expected ')' or ',' in argument list, found '2'"
    );

    let error = parse_expression("1 2", &[]).unwrap_err();
    assert_eq!(error.to_string(), "unexpected token '2' after expression");

    let error = parse_expression(")", &[]).unwrap_err();
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::UnknownExpressionToken { .. }
    ));

    let error = parse_expression("y + 1", &[]).unwrap_err();
    assert_eq!(error.to_string(), "unknown variable name: y");
}

#[test]
fn test_user_defined_binary_precedence() {
    let (lowering, handler) = parse_source(
        "fn binary | 5 (a b) double { return a; }
         fn f(a, b, c) double { return a | b + c; }",
    );

    assert!(!handler.had_error(), "{:?}", handler.error_messages());
    assert_eq!(body_of(&lowering, "f"), "(block (return (| a (+ b c))))");

    let operator = &lowering.definitions[0].prototype;
    assert!(operator.is_binary_op());
    assert_eq!(operator.name, "binary|");
    assert_eq!(operator.binary_precedence(), 5);
}

#[test]
fn test_binary_operator_default_precedence() {
    let (lowering, handler) = parse_source(
        "extern binary & (a, b) double;
         fn f(a, b, c) double { return a & b * c; }
         fn g(a, b, c) double { return a & b + c; }",
    );

    assert!(!handler.had_error());
    assert_eq!(lowering.externs[0].binary_precedence(), 30);
    // `*` (40) binds tighter than `&` (30), which binds tighter than `+` (20).
    assert_eq!(body_of(&lowering, "f"), "(block (return (& a (* b c))))");
    assert_eq!(body_of(&lowering, "g"), "(block (return (+ (& a b) c)))");
}

#[test]
fn test_unary_operator_declaration() {
    let (lowering, handler) = parse_source(
        "fn unary ! (v) double { if (v) { return 0; } else { return 1; } }
         fn f(x) double { return !x + 1; }",
    );

    assert!(!handler.had_error(), "{:?}", handler.error_messages());
    assert!(lowering.definitions[0].prototype.is_unary_op());
    assert_eq!(body_of(&lowering, "f"), "(block (return (+ (! x) 1)))");
}

#[test]
fn test_missing_return_in_one_sided_if() {
    let (lowering, handler) = parse_source("fn f(x) double { if (x) { return 1.0; } }");

    assert!(handler.had_error());
    assert_eq!(handler.error_messages(), vec!["this function needs a return"]);
    assert!(lowering.definitions.is_empty());
}

#[test]
fn test_return_on_both_branches() {
    let (lowering, handler) =
        parse_source("fn f(x) double { if (x) { return 1.0; } else { return 2.0; } }");

    assert!(!handler.had_error());
    assert_eq!(lowering.definitions.len(), 1);

    match &lowering.definitions[0].statements()[0] {
        Node::If {
            then_returns,
            else_returns,
            ..
        } => assert!(*then_returns && *else_returns),
        other => panic!("expected an if, got {}", other.kind_name()),
    }
}

#[test]
fn test_return_in_nested_block() {
    let (_, handler) = parse_source("fn f() double { { var x = 2; return x; } }");
    assert!(!handler.had_error());
}

#[test]
fn test_array_size_mismatch() {
    let (_, handler) = parse_source("fn f() void { var arr[3] = (1.0, 2.0); }");

    assert_eq!(
        handler.error_messages(),
        vec!["mismatch between declared array size and initialized elements"]
    );
}

#[test]
fn test_array_size_limits() {
    let (lowering, handler) = parse_source("fn f() void { var arr[100000000000000000000]; }");

    assert_eq!(
        handler.error_messages(),
        vec!["expected a number to indicate array size, found '100000000000000000000'"]
    );
    assert_eq!(
        handler.diagnostics()[0].tip.as_deref(),
        Some("array sizes must be whole numbers between 0 and 65536")
    );
    assert!(lowering.definitions.is_empty());

    let (_, handler) = parse_source("fn f() void { var arr[65537]; }");
    assert_eq!(handler.error_count(), 1);

    let (lowering, handler) = parse_source("fn f() void { var arr[65536]; }");
    assert!(!handler.had_error());
    assert_eq!(lowering.definitions.len(), 1);
}

#[test]
fn test_return_rejected_in_headers() {
    for source in [
        "fn f(x) double { if (return x) { return 1; } return 0; }",
        "fn f(x) double { for (var i = 0, (return 1), 1) { } return 0; }",
        "fn f() void { for (var i = return, i < 2) { } }",
    ] {
        let (lowering, handler) = parse_source(source);

        assert_eq!(
            handler.error_messages(),
            vec!["'return' cannot appear in an if or for header"],
            "source: {}",
            source
        );
        assert!(lowering.definitions.is_empty());
    }
}

#[test]
fn test_array_defaults_to_zero() {
    let (lowering, handler) = parse_source("fn f() double { var arr[3]; return arr[1]; }");

    assert!(!handler.had_error());
    assert_eq!(
        body_of(&lowering, "f"),
        "(block (array arr[3] 0 0 0) (return arr[1]))"
    );
}

#[test]
fn test_array_initializer_expressions() {
    let (lowering, handler) = parse_source("fn f(x) void { var arr[2] = (x + 1, 2 * x); }");

    assert!(!handler.had_error());
    assert_eq!(body_of(&lowering, "f"), "(block (array arr[2] (+ x 1) (* 2 x)))");
}

#[test]
fn test_unknown_array() {
    let (_, handler) = parse_source("fn f() double { return arr[0]; }");
    assert_eq!(handler.error_messages(), vec!["unknown array name: arr"]);
}

#[test]
fn test_idempotent_reparse() {
    let source = "fn binary ^ 50 (a b) double { return a * b; }
                  fn main() void { var x = 2 ^ 3 + 1; for (var i = 0, i < x) { print(\"x\"); } }";

    let (first, _) = parse_source(source);
    let (second, _) = parse_source(source);

    assert_eq!(first.definitions, second.definitions);
    assert_eq!(first.definitions.len(), 2);
}

#[test]
fn test_error_isolation_at_top_level() {
    let (lowering, handler) = parse_source(
        "fn bad( double { var y = 1; }
         extern sin(x) double;",
    );

    assert_eq!(handler.error_count(), 1);
    assert_eq!(
        handler.error_messages(),
        vec!["expected ')' or ',' in prototype, found 'double'"]
    );
    assert_eq!(lowering.externs.len(), 1);
    assert_eq!(lowering.externs[0].name, "sin");
}

#[test]
fn test_unexpected_top_level_token() {
    let (lowering, handler) = parse_source("1 + 2; var x; extern f() void;");

    assert_eq!(
        handler.error_messages(),
        vec!["unexpected token at 'top level': '1'"]
    );
    assert_eq!(lowering.externs.len(), 1);
}

#[test]
fn test_each_bad_declaration_reports_once() {
    let (lowering, handler) = parse_source(
        "fn a() double { }
         fn b() void { return 1; }
         fn c() void { }",
    );

    assert_eq!(
        handler.error_messages(),
        vec![
            "this function needs a return",
            "you cannot return a value in a void function",
        ]
    );
    assert_eq!(lowering.definitions.len(), 1);
    assert_eq!(lowering.definitions[0].prototype.name, "c");
}

#[test]
fn test_return_without_value() {
    let (_, handler) = parse_source("fn f() double { return; }");
    assert_eq!(handler.error_messages(), vec!["this function must return a value"]);

    let (lowering, handler) = parse_source("fn g() void { return; }");
    assert!(!handler.had_error());
    assert_eq!(body_of(&lowering, "g"), "(block (return))");
}

#[test]
fn test_prototype_errors() {
    let (_, handler) = parse_source("extern binary | 200 (a b) double;");
    assert_eq!(
        handler.error_messages(),
        vec!["invalid precedence: must be 1..100, found 200"]
    );

    let (_, handler) = parse_source("extern unary - (a b) double;");
    assert_eq!(
        handler.error_messages(),
        vec!["invalid number of operands for operator '-': expected 1, received 2"]
    );

    let (_, handler) = parse_source("extern foo(x);");
    assert_eq!(
        handler.error_messages(),
        vec!["expected return type here, found ';'"]
    );

    let (_, handler) = parse_source("extern binary = (a b) double;");
    assert_eq!(
        handler.error_messages(),
        vec!["expected binary operator, found '='"]
    );

    let (_, handler) = parse_source("extern (x) double;");
    assert_eq!(
        handler.error_messages(),
        vec!["expected function name in prototype, found '('"]
    );

    let (_, handler) = parse_source("extern foo(x) double");
    assert_eq!(
        handler.error_messages(),
        vec!["expected terminating semicolon, found end of file"]
    );
}

#[test]
fn test_typed_prototype_arguments() {
    let (lowering, handler) = parse_source("extern show(s: string, n: double, k: int) void;");

    assert!(!handler.had_error());
    assert_eq!(handler.warning_count(), 1);

    let types: Vec<ArgType> = lowering.externs[0].args.iter().map(|a| a.arg_type).collect();
    assert_eq!(types, vec![ArgType::String, ArgType::Double, ArgType::Double]);
}

#[test]
fn test_for_loop_scope() {
    let (lowering, handler) =
        parse_source("fn f() void { for (var i = 0, i < 10, 2) { print(\"x\"); } }");

    assert!(!handler.had_error());
    assert_eq!(
        body_of(&lowering, "f"),
        "(block (for i 0 (< i 10) 2 (block (call print \"x\"))))"
    );

    let (_, handler) = parse_source("fn g() double { for (var i = 0, i < 3) { } return i; }");
    assert_eq!(handler.error_messages(), vec!["unknown variable name: i"]);
}

#[test]
fn test_for_loop_restores_shadowed_variable() {
    let (lowering, handler) =
        parse_source("fn f(i) double { for (var i = 0, i < max(i, 3)) { } return i; }");

    assert!(!handler.had_error(), "{:?}", handler.error_messages());
    match &lowering.definitions[0].statements()[0] {
        Node::For { step, end, .. } => {
            assert!(step.is_none());
            assert_eq!(end.to_string(), "(< i (call max i 3))");
        }
        other => panic!("expected a for, got {}", other.kind_name()),
    }
}

#[test]
fn test_nested_parentheses_in_if_condition() {
    let (lowering, handler) = parse_source("fn f(x) void { if ((x + 1) * 2) { x = 0; } }");

    assert!(!handler.had_error());
    assert_eq!(
        body_of(&lowering, "f"),
        "(block (if (* (+ x 1) 2) (block (= x 0))))"
    );
}

#[test]
fn test_unterminated_block_and_expression() {
    let (_, handler) = parse_source("fn f() void { var x = 1; ");
    assert_eq!(
        handler.error_messages(),
        vec!["a block has unexpectedly reached the end of the file"]
    );

    let (_, handler) = parse_source("fn f() void { var x = 1 }");
    assert_eq!(
        handler.error_messages(),
        vec!["expected ';' after expression, found '}'"]
    );
}

#[test]
fn test_cursor_overrun_is_fatal() {
    let parser = Parser::new(vec![]);
    let error = parser.current_token().unwrap_err();
    assert!(error.is_fatal());

    // A stream without its EOF sentinel runs the cursor off the end.
    let mut handler = ErrorHandler::new();
    let mut tokens = scan_tokens("extern f() void", &mut handler);
    assert_eq!(tokens.pop().map(|t| t.kind), Some(TokenKind::EOF));

    let mut lowering = RecordingLowering::default();
    let result = parse_token_list(tokens, &mut ParseContext::new(), &mut lowering, &mut handler);

    let error = result.unwrap_err();
    assert!(error.is_fatal());
    assert!(handler.had_error());
    assert!(lowering.externs.is_empty());
}

#[test]
fn test_precedence_persists_across_functions() {
    let mut context = ParseContext::new();
    assert_eq!(context.precedence_of('|'), None);

    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("extern binary | 7 (a b) double;", &mut handler);
    let mut lowering = RecordingLowering::default();
    parse_token_list(tokens, &mut context, &mut lowering, &mut handler).unwrap();

    assert_eq!(context.precedence_of('|'), Some(7));
    assert_eq!(context.precedence_of('+'), Some(20));
}
