//! Unit tests for the parser module.

use crate::ast::{Crate, Expression, Item, LiteralKind, Pattern, Statement, TypeNode};
use crate::lexer::lexer::tokenize;

use super::parser::parse;

fn parse_source(source: &str) -> Crate {
    parse(tokenize(source).unwrap()).unwrap()
}

fn only_function(krate: &Crate) -> &crate::ast::Function {
    match &krate.items[0] {
        Item::Function(function) => function,
        item => panic!("expected a function item, got {:?}", item),
    }
}

#[test]
fn test_parse_function_signature() {
    let krate = parse_source("fn add(a: i64, b: i64) -> i64 { a + b }");
    let function = only_function(&krate);

    assert_eq!(function.id, "add");
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.params[0].id, "a");
    assert!(matches!(function.params[0].var_type, TypeNode::Path(_)));
    assert!(function.return_type.is_some());
    assert!(function.body.expr.is_some());
    assert!(function.body.statements.is_empty());
}

#[test]
fn test_parse_function_without_return_type() {
    let krate = parse_source("fn main() { }");
    let function = only_function(&krate);

    assert!(function.return_type.is_none());
    assert!(function.params.is_empty());
    assert!(function.body.expr.is_none());
}

#[test]
fn test_parse_use_declaration() {
    let krate = parse_source("use std::mem;\nfn main() { }");

    match &krate.items[0] {
        Item::Use(decl) => assert_eq!(decl.path, vec!["std", "mem"]),
        item => panic!("expected a use declaration, got {:?}", item),
    }
}

#[test]
fn test_parse_let_variants() {
    let krate = parse_source(
        "fn main() { let a: i64 = 1; let b = 2; let c: i64; let mut d = 3; }",
    );
    let body = &only_function(&krate).body;

    assert_eq!(body.statements.len(), 4);
    match &body.statements[0] {
        Statement::Let(decl) => {
            assert!(decl.var_type.is_some());
            assert!(decl.expr.is_some());
        }
        statement => panic!("expected let, got {:?}", statement),
    }
    match &body.statements[2] {
        Statement::Let(decl) => {
            assert!(decl.var_type.is_some());
            assert!(decl.expr.is_none());
        }
        statement => panic!("expected let, got {:?}", statement),
    }
    match &body.statements[3] {
        Statement::Let(decl) => match &decl.assignee {
            Pattern::Identifier { is_mut, id } => {
                assert!(*is_mut);
                assert_eq!(id, "d");
            }
            pattern => panic!("expected identifier pattern, got {:?}", pattern),
        },
        statement => panic!("expected let, got {:?}", statement),
    }
}

#[test]
fn test_parse_operator_precedence() {
    let krate = parse_source("fn main() { let x = 1 + 2 * 3; }");
    let body = &only_function(&krate).body;

    let Statement::Let(decl) = &body.statements[0] else {
        panic!("expected let");
    };
    let Some(Expression::Binary { op, rhs, .. }) = &decl.expr else {
        panic!("expected binary initializer");
    };
    assert_eq!(op, "+");
    assert!(matches!(**rhs, Expression::Binary { ref op, .. } if op == "*"));
}

#[test]
fn test_parse_grouping_overrides_precedence() {
    let krate = parse_source("fn main() { let x = (1 + 2) * 3; }");
    let body = &only_function(&krate).body;

    let Statement::Let(decl) = &body.statements[0] else {
        panic!("expected let");
    };
    let Some(Expression::Binary { op, lhs, .. }) = &decl.expr else {
        panic!("expected binary initializer");
    };
    assert_eq!(op, "*");
    assert!(matches!(**lhs, Expression::Binary { ref op, .. } if op == "+"));
}

#[test]
fn test_parse_if_else_chain() {
    let krate = parse_source(
        "fn main() { if a { } else if b { } else { } }",
    );
    let body = &only_function(&krate).body;

    let Statement::Expression(Expression::If(if_expr)) = &body.statements[0] else {
        panic!("expected if statement");
    };
    let Some(else_branch) = &if_expr.if_false else {
        panic!("expected else branch");
    };
    let Expression::If(nested) = &**else_branch else {
        panic!("expected else-if chain");
    };
    assert!(matches!(
        nested.if_false.as_deref(),
        Some(Expression::Block(_))
    ));
}

#[test]
fn test_parse_loops() {
    let krate = parse_source(
        "fn main() { loop { break; } while x < 10 { continue; } for i in xs { } }",
    );
    let body = &only_function(&krate).body;

    assert!(matches!(
        body.statements[0],
        Statement::Expression(Expression::InfiniteLoop { .. })
    ));
    assert!(matches!(
        body.statements[1],
        Statement::Expression(Expression::PredicateLoop { .. })
    ));
    assert!(matches!(
        body.statements[2],
        Statement::Expression(Expression::IteratorLoop { .. })
    ));
}

#[test]
fn test_parse_trailing_expression() {
    let krate = parse_source("fn f() -> i64 { let x = 1; x }");
    let body = &only_function(&krate).body;

    assert_eq!(body.statements.len(), 1);
    assert!(matches!(
        body.expr.as_deref(),
        Some(Expression::Path { .. })
    ));
}

#[test]
fn test_parse_call_with_path_callee() {
    let krate = parse_source("fn main() { oxide::writeln_i64(42); }");
    let body = &only_function(&krate).body;

    let Statement::Expression(Expression::Call { callee, params }) = &body.statements[0] else {
        panic!("expected call statement");
    };
    assert!(
        matches!(&**callee, Expression::Path { segments } if segments == &["oxide", "writeln_i64"])
    );
    assert_eq!(params.len(), 1);
}

#[test]
fn test_parse_literals() {
    let krate = parse_source(r#"fn main() { let a = 1; let b = "hi"; let c = 'x'; let d = true; }"#);
    let body = &only_function(&krate).body;

    let kinds: Vec<LiteralKind> = body
        .statements
        .iter()
        .map(|statement| match statement {
            Statement::Let(decl) => match decl.expr.as_ref().unwrap() {
                Expression::Literal { kind, .. } => *kind,
                expression => panic!("expected literal, got {:?}", expression),
            },
            statement => panic!("expected let, got {:?}", statement),
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            LiteralKind::Integer,
            LiteralKind::Str,
            LiteralKind::Char,
            LiteralKind::Boolean,
        ]
    );
}

#[test]
fn test_parse_cast_and_index() {
    let krate = parse_source("fn main() { let a = x as i32; let b = xs[0]; }");
    let body = &only_function(&krate).body;

    let Statement::Let(first) = &body.statements[0] else {
        panic!("expected let");
    };
    assert!(matches!(first.expr, Some(Expression::Cast { .. })));

    let Statement::Let(second) = &body.statements[1] else {
        panic!("expected let");
    };
    assert!(matches!(second.expr, Some(Expression::ArrayIndex { .. })));
}

#[test]
fn test_parse_type_forms() {
    let krate = parse_source(
        "fn f(a: *mut i8, b: &i64, c: (i8, i16), d: [i8; 4], e: [i64]) { }",
    );
    let params = &only_function(&krate).params;

    assert!(matches!(params[0].var_type, TypeNode::Pointer { is_mut: true, .. }));
    assert!(matches!(params[1].var_type, TypeNode::Reference { is_mut: false, .. }));
    assert!(matches!(params[2].var_type, TypeNode::Tuple(_)));
    assert!(matches!(params[3].var_type, TypeNode::Array { len: 4, .. }));
    assert!(matches!(params[4].var_type, TypeNode::Slice(_)));
}

#[test]
fn test_parse_match_expression() {
    let krate = parse_source("fn main() { match x { 1 => { }, other => { } } }");
    let body = &only_function(&krate).body;

    let Statement::Expression(Expression::Match { arms, .. }) = &body.statements[0] else {
        panic!("expected match statement");
    };
    assert_eq!(arms.len(), 2);
    assert!(matches!(arms[0].patterns[0], Pattern::Literal { .. }));
    assert!(matches!(arms[1].patterns[0], Pattern::Identifier { .. }));
}

#[test]
fn test_parse_error_missing_semicolon() {
    let tokens = tokenize("fn main() { let x = 42 }").unwrap();
    assert!(parse(tokens).is_err());
}

#[test]
fn test_parse_error_statement_at_crate_level() {
    let tokens = tokenize("let x = 1;").unwrap();
    assert!(parse(tokens).is_err());
}

#[test]
fn test_parse_error_unexpected_token() {
    let tokens = tokenize("fn main() { let = 42; }").unwrap();
    assert!(parse(tokens).is_err());
}

#[test]
fn test_ast_dump_uses_descriptive_keys() {
    let krate = parse_source("fn main() { let x: i64 = 1; }");
    let dump = crate::ast::dump(&krate);

    assert!(dump.contains("\"assignee\""));
    assert!(dump.contains("\"type\""));
    assert!(dump.contains("\"expression\""));
    assert!(dump.contains("\"Body\""));
}
