//! Unit tests for the semantic analyzer.

use crate::lexer::lexer::tokenize;
use crate::parser::parser::parse;

use super::analyzer::{analyze, Analyzer};
use super::diagnostics::Severity;
use super::types::{ExprResult, TypeDescriptor};

fn analyze_source(source: &str) -> Analyzer {
    let krate = parse(tokenize(source).unwrap()).unwrap();
    analyze(&krate)
}

fn error_messages(analyzer: &Analyzer) -> Vec<String> {
    analyzer
        .diags
        .iter()
        .filter(|diagnostic| diagnostic.severity == Severity::Error)
        .map(|diagnostic| diagnostic.message.clone())
        .collect()
}

#[test]
fn test_scope_stack_empty_after_pass() {
    let analyzer = analyze_source(
        "fn f(x: i64) -> i64 { if x > 1 { return x; } while x < 3 { } loop { break; } x }",
    );
    assert_eq!(analyzer.scopes.depth(), 0);
}

#[test]
fn test_resolve_is_idempotent() {
    let cases = vec![
        TypeDescriptor::Void,
        TypeDescriptor::primitive(64, true),
        TypeDescriptor::Typedef(Box::new(TypeDescriptor::primitive(8, false))),
        TypeDescriptor::Typedef(Box::new(TypeDescriptor::Typedef(Box::new(
            TypeDescriptor::primitive(16, true),
        )))),
        TypeDescriptor::Function {
            params: vec![TypeDescriptor::primitive(64, true)],
            return_type: Box::new(TypeDescriptor::Typedef(Box::new(
                TypeDescriptor::primitive(32, true),
            ))),
        },
        TypeDescriptor::Pointer {
            mutable: false,
            inner: Box::new(TypeDescriptor::primitive(8, true)),
        },
        TypeDescriptor::Array {
            elem: Box::new(TypeDescriptor::primitive(8, true)),
            len: 5,
        },
    ];

    for ty in cases {
        assert_eq!(ty.resolve(), ty.resolve().resolve(), "resolve({}) drifted", ty);
    }
}

#[test]
fn test_expr_result_tag_never_leaks() {
    let pending = ExprResult::Pending(TypeDescriptor::primitive(64, true));
    let value = ExprResult::Value(TypeDescriptor::primitive(64, true));
    assert_eq!(pending.resolved(), value.resolved());
}

#[test]
fn test_simple_function_declares_one_symbol() {
    let analyzer = analyze_source("fn fact(n: i64) -> i64 { n }");

    assert_eq!(analyzer.diags.error_count(), 0);
    let fact_declarations = analyzer
        .diags
        .iter()
        .filter(|diagnostic| {
            diagnostic.severity == Severity::Info
                && diagnostic.message.contains("Declaring var fact ")
        })
        .count();
    assert_eq!(fact_declarations, 1);
}

#[test]
fn test_let_type_contradiction() {
    let analyzer = analyze_source(r#"fn main() { let x: i32 = "hello"; }"#);

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("i32"));
    assert!(errors[0].contains("[i8; 5]"));
}

#[test]
fn test_let_without_type_or_value() {
    let analyzer = analyze_source("fn main() { let x; }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("cannot determine type"));
}

#[test]
fn test_let_bool_alias_consistent() {
    let analyzer = analyze_source("fn main() { let b: bool = true; let c: char = 'x'; }");
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_redefinition_in_same_scope_is_error() {
    let analyzer = analyze_source("fn main() { let x = 1; let x = 2; }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("already defined in the same scope"));
}

#[test]
fn test_shadowing_is_warning_only() {
    let analyzer = analyze_source("fn main() { let x = 1; { let x = 2; } }");

    assert_eq!(analyzer.diags.error_count(), 0);
    let warnings: Vec<_> = analyzer
        .diags
        .iter()
        .filter(|diagnostic| diagnostic.severity == Severity::Warn)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("redefined in scope"));
    assert!(warnings[0].message.contains("earlier definition in scope"));
}

#[test]
fn test_shadowing_builtin_is_warning() {
    let analyzer = analyze_source("fn main() { let i64 = 1; }");

    assert_eq!(analyzer.diags.error_count(), 0);
    assert!(analyzer.diags.count_of(Severity::Warn) >= 1);
}

#[test]
fn test_undeclared_path_is_error() {
    let analyzer = analyze_source("fn main() { y; }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("'y' undeclared"));
}

#[test]
fn test_if_branch_divergence() {
    let analyzer = analyze_source("fn f() -> i64 { if true { 1 } else { } 0 }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("i64"));
    assert!(errors[0].contains("void"));
}

#[test]
fn test_if_with_equal_branches_is_clean() {
    let analyzer = analyze_source("fn main() { if true { 1; } else { 2; } }");
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_if_without_else_adds_no_constraint() {
    let analyzer = analyze_source("fn main() { if true { 1; } }");
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_else_if_chain_checked() {
    let analyzer = analyze_source("fn main() { if true { 1; } else if false { 2; } else { 3; } }");
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_block_with_divergent_returns() {
    let analyzer = analyze_source("fn f() -> i64 { return 'c'; 1 }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("several different types"));
}

#[test]
fn test_return_matches_trailing_expression() {
    let analyzer = analyze_source("fn f(n: i64) -> i64 { if n <= 1 { return 1; } n }");
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_function_body_type_mismatch() {
    let analyzer = analyze_source("fn f() -> i64 { }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("claimed return type"));
}

#[test]
fn test_operator_whitelist_rejects_mixed_operands() {
    let analyzer = analyze_source(r#"fn main() { let x = 1 + "a"; }"#);

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("unsupported types"));
}

#[test]
fn test_operator_whitelist_rejects_width_mixing() {
    let analyzer = analyze_source("fn main() { let a = 1 as i32; let b = a + 1; }");

    // i32 + i64 is not in the whitelist; only same-width pairs are
    assert_eq!(analyzer.diags.error_count(), 1);
}

#[test]
fn test_unary_minus_rejects_unsigned() {
    let analyzer = analyze_source("fn main() { let a = 1 as u64; let b = -a; }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("unsupported type"));
}

#[test]
fn test_unary_not_accepts_unsigned() {
    let analyzer = analyze_source("fn main() { let a = 1 as u64; let b = !a; }");
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_call_to_missing_function() {
    let analyzer = analyze_source("fn main() { g(1); }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("not found in symtable"));
}

#[test]
fn test_forward_reference_not_supported() {
    let analyzer = analyze_source("fn main() { helper(); } fn helper() { }");
    assert_eq!(analyzer.diags.error_count(), 1);
}

#[test]
fn test_self_recursion_supported() {
    let analyzer = analyze_source(
        "fn fact(n: i64) -> i64 { if n <= 1 { return 1; } return n * fact(n - 1); }",
    );
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_call_arity_mismatch() {
    let analyzer = analyze_source("fn f(a: i64) -> i64 { a } fn main() { f(); }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("expected 1"));
}

#[test]
fn test_call_parameter_type_mismatch() {
    let analyzer = analyze_source("fn f(a: i64) -> i64 { a } fn main() { f(true); }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("differ from ones declared"));
}

#[test]
fn test_calling_a_non_function() {
    let analyzer = analyze_source("fn main() { let x = 1; x(); }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("got called for different type"));
}

#[test]
fn test_intrinsic_writer_preseeded() {
    let analyzer = analyze_source("fn main() { oxide::writeln_i64(42); }");
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_use_declaration_binds_namespace() {
    let analyzer = analyze_source("use std::mem;\nfn main() { }");
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_assignment_checks_types() {
    let analyzer = analyze_source(r#"fn main() { let mut x = 1; x = "no"; }"#);

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("assignment type contradiction"));
}

#[test]
fn test_array_literal_and_indexing() {
    let analyzer = analyze_source(
        r#"fn main() { let a: [i8; 3] = "abc"; let c: char = a[0]; }"#,
    );
    assert_eq!(analyzer.diags.error_count(), 0);
}

#[test]
fn test_indexing_non_array_is_error() {
    let analyzer = analyze_source("fn main() { let a = 1; let b = a[0]; }");

    let errors = error_messages(&analyzer);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("is not an array"));
}

#[test]
fn test_str_alias_is_pointer_shaped() {
    let analyzer = analyze_source(r#"fn main() { let s: str = "hi"; }"#);

    // a string literal is a fixed-size array, not a pointer
    assert_eq!(analyzer.diags.error_count(), 1);
}

#[test]
fn test_while_program_is_clean() {
    let analyzer = analyze_source(
        "fn factorial(n: i64) -> i64 {\
             let mut result: i64 = 1;\
             let mut tmp: i64 = n;\
             while tmp > 1 {\
                 result = result * tmp;\
                 tmp = tmp - 1;\
             }\
             result\
         }\
         fn main() {\
             oxide::writeln_i64(factorial(5));\
         }",
    );

    assert_eq!(analyzer.diags.error_count(), 0);
    assert_eq!(analyzer.diags.count_of(Severity::Warn), 0);
}

#[test]
fn test_diagnostics_are_ordered_and_prefixed() {
    let analyzer = analyze_source("fn main() { }");

    let first = analyzer.diags.iter().next().unwrap();
    assert_eq!(first.to_string(), "[INFO] Entering scope 1...");
}

#[test]
fn test_analysis_is_exhaustive_not_short_circuited() {
    let analyzer = analyze_source("fn main() { y; z; }");
    assert_eq!(analyzer.diags.error_count(), 2);
}

#[test]
fn test_match_and_method_calls_are_neutral() {
    let analyzer = analyze_source(
        "fn main() { let x = 1; match x { 1 => { }, other => { } } }",
    );
    assert_eq!(analyzer.diags.error_count(), 0);
}
