//! Unit tests for the IR generator.
//!
//! Each test lowers a small analyzed program and inspects the block
//! structure and terminators of the produced module.

use inkwell::{context::Context, module::Module, values::InstructionOpcode};

use crate::lexer::lexer::tokenize;
use crate::parser::parser::parse;
use crate::semantics::analyzer::analyze;

use super::generator::generate;

fn build_module<'ctx>(context: &'ctx Context, source: &str) -> Module<'ctx> {
    let krate = parse(tokenize(source).unwrap()).unwrap();
    let analyzer = analyze(&krate);
    assert_eq!(
        analyzer.diags.error_count(),
        0,
        "test program must analyze cleanly"
    );
    generate(context, &krate, "test")
}

#[test]
fn test_identity_function_is_one_block() {
    let context = Context::create();
    let module = build_module(&context, "fn f(x: i64) -> i64 { x }");

    let function = module.get_function("f").unwrap();
    assert_eq!(function.count_basic_blocks(), 1);

    let entry = function.get_first_basic_block().unwrap();
    let terminator = entry.get_terminator().unwrap();
    assert_eq!(terminator.get_opcode(), InstructionOpcode::Return);
}

#[test]
fn test_parameters_are_spilled_to_slots() {
    let context = Context::create();
    let module = build_module(&context, "fn f(x: i64) -> i64 { x }");

    let ir = module.print_to_string().to_string();
    // the parameter is stored into an alloca and read back with a load
    assert!(ir.contains("alloca"));
    assert!(ir.contains("store"));
    assert!(ir.contains("load"));
}

#[test]
fn test_infinite_loop_with_break() {
    let context = Context::create();
    let module = build_module(&context, "fn f() { loop { break; } }");

    let function = module.get_function("f").unwrap();
    let blocks = function.get_basic_blocks();
    assert_eq!(blocks.len(), 3);

    let body = blocks[1];
    let leave = blocks[2];
    assert_eq!(body.get_name().to_str().unwrap(), "inf.loop.body");
    assert_eq!(leave.get_name().to_str().unwrap(), "leave.inf.loop");

    // the break's branch is the body's terminator and targets `leave`
    let body_terminator = body.get_terminator().unwrap();
    assert_eq!(body_terminator.get_opcode(), InstructionOpcode::Br);
    let target = body_terminator.get_operand(0).unwrap().right().unwrap();
    assert_eq!(target, leave);

    // the reachable terminal block is `leave`
    let leave_terminator = leave.get_terminator().unwrap();
    assert_eq!(leave_terminator.get_opcode(), InstructionOpcode::Return);
}

#[test]
fn test_while_loop_block_shape() {
    let context = Context::create();
    let module = build_module(
        &context,
        "fn f() { let mut i = 0; while i < 3 { i = i + 1; } }",
    );

    let function = module.get_function("f").unwrap();
    let blocks = function.get_basic_blocks();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[1].get_name().to_str().unwrap(), "while.loop.cond");
    assert_eq!(blocks[2].get_name().to_str().unwrap(), "while.loop.body");
    assert_eq!(blocks[3].get_name().to_str().unwrap(), "leave.while.loop");

    // the predicate block ends in a two-way conditional branch
    let cond_terminator = blocks[1].get_terminator().unwrap();
    assert_eq!(cond_terminator.get_opcode(), InstructionOpcode::Br);
    assert_eq!(cond_terminator.get_num_operands(), 3);

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_if_without_else_shape() {
    let context = Context::create();
    let module = build_module(&context, "fn f(x: i64) -> i64 { if x > 1 { return 1; } return 2; }");

    let function = module.get_function("f").unwrap();
    let blocks = function.get_basic_blocks();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1].get_name().to_str().unwrap(), "if.then");
    assert_eq!(blocks[2].get_name().to_str().unwrap(), "leave.if");

    // both the then branch and the fall-through path return directly
    assert_eq!(
        blocks[1].get_terminator().unwrap().get_opcode(),
        InstructionOpcode::Return
    );
    assert_eq!(
        blocks[2].get_terminator().unwrap().get_opcode(),
        InstructionOpcode::Return
    );

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_if_else_branches_to_leave() {
    let context = Context::create();
    let module = build_module(
        &context,
        "fn f(x: i64) { if x > 1 { x + 1; } else { x - 1; } }",
    );

    let function = module.get_function("f").unwrap();
    let blocks = function.get_basic_blocks();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[1].get_name().to_str().unwrap(), "if.then");
    assert_eq!(blocks[2].get_name().to_str().unwrap(), "if.else");
    assert_eq!(blocks[3].get_name().to_str().unwrap(), "leave.if");

    assert_eq!(
        blocks[1].get_terminator().unwrap().get_opcode(),
        InstructionOpcode::Br
    );
    assert_eq!(
        blocks[2].get_terminator().unwrap().get_opcode(),
        InstructionOpcode::Br
    );

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_writer_intrinsics_are_defined() {
    let context = Context::create();
    let module = build_module(&context, "fn main() { oxide::writeln_i64(42); }");

    assert!(module.get_function("printf").is_some());
    assert!(module.get_function("oxide::writeln_i64").is_some());
    assert!(module.get_function("oxide::writeln_char").is_some());

    let ir = module.print_to_string().to_string();
    assert!(ir.contains("%ld"));
    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_recursive_factorial_program() {
    let context = Context::create();
    let module = build_module(
        &context,
        "fn factorial(n: i64) -> i64 {\
             if n <= 1 { return 1; }\
             return n * factorial(n - 1);\
         }\
         fn main() {\
             oxide::writeln_i64(factorial(10));\
         }",
    );

    let ir = module.print_to_string().to_string();
    assert!(ir.contains("define i64 @factorial"));
    assert!(ir.contains("define void @main"));

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_iterative_factorial_program() {
    let context = Context::create();
    let module = build_module(
        &context,
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

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_integer_opcode_family() {
    let context = Context::create();
    let module = build_module(
        &context,
        "fn f(a: i64, b: i64) -> i64 { a + b * a - b / a % b }",
    );

    let ir = module.print_to_string().to_string();
    assert!(ir.contains("add"));
    assert!(ir.contains("mul"));
    assert!(ir.contains("sdiv"));
    assert!(ir.contains("srem"));
    assert!(!ir.contains("fadd"));

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_string_literal_is_byte_array() {
    let context = Context::create();
    let module = build_module(&context, r#"fn main() { let s = "hi"; }"#);

    let ir = module.print_to_string().to_string();
    assert!(ir.contains("[2 x i8]"));

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_cast_lowering() {
    let context = Context::create();
    let module = build_module(&context, "fn f(a: i64) -> i32 { a as i32 }");

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_nested_loop_break_targets_inner_loop() {
    let context = Context::create();
    let module = build_module(
        &context,
        "fn f() { loop { loop { break; } break; } }",
    );

    let function = module.get_function("f").unwrap();
    // entry + two bodies + two leaves
    assert_eq!(function.count_basic_blocks(), 5);
    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}

#[test]
fn test_break_inside_if_reaches_enclosing_loop() {
    let context = Context::create();
    let module = build_module(
        &context,
        "fn f(x: i64) { loop { if x > 1 { break; } } }",
    );

    assert!(module.verify().is_ok(), "{}", module.print_to_string());
}
