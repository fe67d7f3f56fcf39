//! Expression lowering, including the control-flow state machines.
//!
//! Binary and unary operators select opcodes from two disjoint
//! families, integer and floating point, keyed off the resolved operand
//! type; the families are never mixed. Constructs outside the lowered
//! subset produce a defined neutral result (`None`) instead of being
//! silently miscompiled.

use inkwell::{
    types::BasicTypeEnum,
    values::{BasicMetadataValueEnum, BasicValueEnum, IntValue, PointerValue},
    FloatPredicate, IntPredicate,
};

use crate::{
    ast::{BlockExpression, Expression, IfExpression, LiteralKind},
    ICE,
};

use super::generator::Generator;

/// Lowers one expression; `None` is the defined neutral result for
/// value-less or unsupported constructs.
pub fn gen_expression<'ctx>(
    generator: &mut Generator<'ctx>,
    expression: &Expression,
) -> Option<BasicValueEnum<'ctx>> {
    match expression {
        Expression::Literal { kind, value } => gen_literal(generator, *kind, value),
        Expression::Path { segments } => {
            let name = segments.join("::");
            if let Some(slot) = generator.lookup_var(&name) {
                return Some(generator.builder.build_load(slot, &name).unwrap());
            }
            if generator.functions.contains_key(&name) {
                // functions as values are not lowered in this subset
                return None;
            }
            ICE!("no such variable: {}", name)
        }
        Expression::Call { callee, params } => gen_call(generator, callee, params),
        Expression::Binary { op, lhs, rhs } => gen_binary(generator, op, lhs, rhs),
        Expression::Unary { op, value } => gen_unary(generator, op, value),
        Expression::Assignment { assignee, value } => gen_assignment(generator, assignee, value),
        Expression::Cast { expr, ty } => {
            let value = gen_expression(generator, expr)?;
            let target = generator.lower_type(ty);
            match (value, target) {
                (BasicValueEnum::IntValue(int), BasicTypeEnum::IntType(int_type)) => Some(
                    generator
                        .builder
                        .build_int_cast(int, int_type, "")
                        .unwrap()
                        .into(),
                ),
                _ => Some(value),
            }
        }
        Expression::ArrayIndex { object, index } => {
            let element_ptr = gen_element_pointer(generator, object, index)?;
            Some(generator.builder.build_load(element_ptr, "").unwrap())
        }
        Expression::Block(block) => {
            generator.gen_block(block);
            None
        }
        Expression::If(if_expr) => gen_if(generator, if_expr),
        Expression::InfiniteLoop { body } => gen_infinite_loop(generator, body),
        Expression::PredicateLoop { expr, body } => gen_predicate_loop(generator, expr, body),
        Expression::Return { expr } => {
            let value = expr
                .as_ref()
                .and_then(|inner| gen_expression(generator, inner));
            match value {
                Some(value) => generator.builder.build_return(Some(&value)).unwrap(),
                None => generator.builder.build_return(None).unwrap(),
            };
            None
        }
        Expression::Break { expr } => {
            // a break value is evaluated but not materialized
            if let Some(inner) = expr {
                gen_expression(generator, inner);
            }
            let Some(target) = generator.break_target() else {
                ICE!("break outside of a loop survived analysis")
            };
            generator
                .builder
                .build_unconditional_branch(target)
                .unwrap();
            None
        }
        Expression::Continue => {
            let Some(target) = generator.continue_target() else {
                ICE!("continue outside of a loop survived analysis")
            };
            generator
                .builder
                .build_unconditional_branch(target)
                .unwrap();
            None
        }
        // Not lowered in this subset: defined no-ops
        Expression::MethodCall { .. }
        | Expression::TupleIndex { .. }
        | Expression::Borrow { .. }
        | Expression::Match { .. }
        | Expression::IteratorLoop { .. } => None,
    }
}

fn gen_literal<'ctx>(
    generator: &Generator<'ctx>,
    kind: LiteralKind,
    value: &str,
) -> Option<BasicValueEnum<'ctx>> {
    match kind {
        LiteralKind::Integer => {
            let Ok(parsed) = value.parse::<i64>() else {
                ICE!("couldn't convert literal '{}' into integer", value)
            };
            Some(
                generator
                    .context
                    .i64_type()
                    .const_int(parsed as u64, false)
                    .into(),
            )
        }
        LiteralKind::Char => Some(
            generator
                .context
                .i8_type()
                .const_int(value.bytes().next().unwrap_or(0) as u64, false)
                .into(),
        ),
        LiteralKind::Boolean => Some(
            generator
                .context
                .i8_type()
                .const_int((value == "true") as u64, false)
                .into(),
        ),
        LiteralKind::Str => {
            let bytes: Vec<IntValue<'ctx>> = value
                .bytes()
                .map(|byte| generator.context.i8_type().const_int(byte as u64, false))
                .collect();
            Some(generator.context.i8_type().const_array(&bytes).into())
        }
    }
}

fn gen_call<'ctx>(
    generator: &mut Generator<'ctx>,
    callee: &Expression,
    params: &[Expression],
) -> Option<BasicValueEnum<'ctx>> {
    let Expression::Path { segments } = callee else {
        ICE!("non-path callee survived analysis")
    };
    let name = segments.join("::");

    let mut args: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(params.len());
    for param in params {
        args.push(gen_expression(generator, param)?.into());
    }

    let Some(function) = generator.functions.get(&name).copied() else {
        ICE!("no such function: {}", name)
    };

    generator
        .builder
        .build_call(function, &args, "")
        .unwrap()
        .try_as_basic_value()
        .left()
}

fn gen_binary<'ctx>(
    generator: &mut Generator<'ctx>,
    op: &str,
    lhs: &Expression,
    rhs: &Expression,
) -> Option<BasicValueEnum<'ctx>> {
    if op == "&&" || op == "||" {
        let left_value = gen_expression(generator, lhs)?;
        let left = generator.as_condition(left_value);
        let right_value = gen_expression(generator, rhs)?;
        let right = generator.as_condition(right_value);
        let combined = if op == "&&" {
            generator.builder.build_and(left, right, "").unwrap()
        } else {
            generator.builder.build_or(left, right, "").unwrap()
        };
        return Some(combined.into());
    }

    let left = gen_expression(generator, lhs)?;
    let right = gen_expression(generator, rhs)?;

    match left.get_type() {
        BasicTypeEnum::FloatType(_) => {
            let l = left.into_float_value();
            let r = right.into_float_value();
            let builder = &generator.builder;
            Some(match op {
                "+" => builder.build_float_add(l, r, "").unwrap().into(),
                "-" => builder.build_float_sub(l, r, "").unwrap().into(),
                "*" => builder.build_float_mul(l, r, "").unwrap().into(),
                "/" => builder.build_float_div(l, r, "").unwrap().into(),
                "<" => builder
                    .build_float_compare(FloatPredicate::OLT, l, r, "")
                    .unwrap()
                    .into(),
                ">" => builder
                    .build_float_compare(FloatPredicate::OGT, l, r, "")
                    .unwrap()
                    .into(),
                "<=" => builder
                    .build_float_compare(FloatPredicate::OLE, l, r, "")
                    .unwrap()
                    .into(),
                ">=" => builder
                    .build_float_compare(FloatPredicate::OGE, l, r, "")
                    .unwrap()
                    .into(),
                "==" => builder
                    .build_float_compare(FloatPredicate::OEQ, l, r, "")
                    .unwrap()
                    .into(),
                "!=" => builder
                    .build_float_compare(FloatPredicate::ONE, l, r, "")
                    .unwrap()
                    .into(),
                _ => ICE!("no floating-point lowering for operator {}", op),
            })
        }
        BasicTypeEnum::IntType(_) => {
            let l = left.into_int_value();
            let r = right.into_int_value();
            let builder = &generator.builder;
            Some(match op {
                "+" => builder.build_int_add(l, r, "").unwrap().into(),
                "-" => builder.build_int_sub(l, r, "").unwrap().into(),
                "*" => builder.build_int_mul(l, r, "").unwrap().into(),
                "/" => builder.build_int_signed_div(l, r, "").unwrap().into(),
                "%" => builder.build_int_signed_rem(l, r, "").unwrap().into(),
                "<" => builder
                    .build_int_compare(IntPredicate::SLT, l, r, "")
                    .unwrap()
                    .into(),
                ">" => builder
                    .build_int_compare(IntPredicate::SGT, l, r, "")
                    .unwrap()
                    .into(),
                "<=" => builder
                    .build_int_compare(IntPredicate::SLE, l, r, "")
                    .unwrap()
                    .into(),
                ">=" => builder
                    .build_int_compare(IntPredicate::SGE, l, r, "")
                    .unwrap()
                    .into(),
                "==" => builder
                    .build_int_compare(IntPredicate::EQ, l, r, "")
                    .unwrap()
                    .into(),
                "!=" => builder
                    .build_int_compare(IntPredicate::NE, l, r, "")
                    .unwrap()
                    .into(),
                _ => ICE!("no integer lowering for operator {}", op),
            })
        }
        _ => None,
    }
}

fn gen_unary<'ctx>(
    generator: &mut Generator<'ctx>,
    op: &str,
    value: &Expression,
) -> Option<BasicValueEnum<'ctx>> {
    let operand = gen_expression(generator, value)?.into_int_value();
    match op {
        "!" => Some(generator.builder.build_not(operand, "").unwrap().into()),
        "-" => {
            let zero = operand.get_type().const_zero();
            Some(
                generator
                    .builder
                    .build_int_sub(zero, operand, "")
                    .unwrap()
                    .into(),
            )
        }
        _ => ICE!("no unary lowering for operator {}", op),
    }
}

fn gen_assignment<'ctx>(
    generator: &mut Generator<'ctx>,
    assignee: &Expression,
    value: &Expression,
) -> Option<BasicValueEnum<'ctx>> {
    let stored = gen_expression(generator, value)?;

    match assignee {
        Expression::Path { segments } => {
            let name = segments.join("::");
            let Some(slot) = generator.lookup_var(&name) else {
                ICE!("no such variable: {}", name)
            };
            generator.builder.build_store(slot, stored).unwrap();
        }
        Expression::ArrayIndex { object, index } => {
            let element_ptr = gen_element_pointer(generator, object, index)?;
            generator.builder.build_store(element_ptr, stored).unwrap();
        }
        _ => return None,
    }

    Some(stored)
}

/// A pointer to one array element: GEP through the array's slot.
fn gen_element_pointer<'ctx>(
    generator: &mut Generator<'ctx>,
    object: &Expression,
    index: &Expression,
) -> Option<PointerValue<'ctx>> {
    let Expression::Path { segments } = object else {
        return None;
    };
    let slot = generator.lookup_var(&segments.join("::"))?;
    let index_value = gen_expression(generator, index)?.into_int_value();
    let zero = generator.context.i64_type().const_zero();

    let element_ptr = unsafe {
        generator
            .builder
            .build_gep(slot, &[zero, index_value], "")
            .unwrap()
    };
    Some(element_ptr)
}

/// if/else lowering: allocate `then`, `leave`, and (only when an else
/// branch exists) `else`; branch conditionally; each branch that falls
/// through gets a branch to `leave`; generation continues in `leave`.
fn gen_if<'ctx>(
    generator: &mut Generator<'ctx>,
    if_expr: &IfExpression,
) -> Option<BasicValueEnum<'ctx>> {
    let condition = gen_expression(generator, &if_expr.expr)
        .map(|value| generator.as_condition(value))
        .unwrap_or_else(|| generator.context.bool_type().const_zero());

    let function = generator.current_function();
    let then_block = generator.context.append_basic_block(function, "if.then");
    let else_block = if_expr
        .if_false
        .as_ref()
        .map(|_| generator.context.append_basic_block(function, "if.else"));
    let leave_block = generator.context.append_basic_block(function, "leave.if");

    generator
        .builder
        .build_conditional_branch(condition, then_block, else_block.unwrap_or(leave_block))
        .unwrap();

    generator.builder.position_at_end(then_block);
    generator.gen_block(&if_expr.if_true);
    if !generator.current_block_terminated() {
        generator
            .builder
            .build_unconditional_branch(leave_block)
            .unwrap();
    }

    if let Some(else_block) = else_block {
        generator.builder.position_at_end(else_block);
        match if_expr.if_false.as_deref() {
            Some(Expression::Block(block)) => generator.gen_block(block),
            // else-if chains nest their own leave logic
            Some(other) => {
                gen_expression(generator, other);
            }
            None => {}
        }
        if !generator.current_block_terminated() {
            generator
                .builder
                .build_unconditional_branch(leave_block)
                .unwrap();
        }
    }

    generator.builder.position_at_end(leave_block);
    None
}

/// Infinite loop: branch into `body`, lower it with break → `leave` and
/// continue → `body`, then close the back edge.
fn gen_infinite_loop<'ctx>(
    generator: &mut Generator<'ctx>,
    body: &BlockExpression,
) -> Option<BasicValueEnum<'ctx>> {
    let function = generator.current_function();
    let body_block = generator
        .context
        .append_basic_block(function, "inf.loop.body");
    let leave_block = generator
        .context
        .append_basic_block(function, "leave.inf.loop");

    generator
        .builder
        .build_unconditional_branch(body_block)
        .unwrap();
    generator.builder.position_at_end(body_block);

    generator.push_loop_frame(leave_block, body_block);
    generator.gen_block(body);
    generator.pop_frame();

    if !generator.current_block_terminated() {
        generator
            .builder
            .build_unconditional_branch(body_block)
            .unwrap();
    }

    generator.builder.position_at_end(leave_block);
    None
}

/// Predicate loop: `cond` evaluates the predicate and branches to
/// `body` or `leave`; the body closes back into `cond`.
fn gen_predicate_loop<'ctx>(
    generator: &mut Generator<'ctx>,
    predicate: &Expression,
    body: &BlockExpression,
) -> Option<BasicValueEnum<'ctx>> {
    let function = generator.current_function();
    let cond_block = generator
        .context
        .append_basic_block(function, "while.loop.cond");
    let body_block = generator
        .context
        .append_basic_block(function, "while.loop.body");
    let leave_block = generator
        .context
        .append_basic_block(function, "leave.while.loop");

    generator
        .builder
        .build_unconditional_branch(cond_block)
        .unwrap();
    generator.builder.position_at_end(cond_block);
    let condition = gen_expression(generator, predicate)
        .map(|value| generator.as_condition(value))
        .unwrap_or_else(|| generator.context.bool_type().const_zero());
    generator
        .builder
        .build_conditional_branch(condition, body_block, leave_block)
        .unwrap();

    generator.builder.position_at_end(body_block);
    generator.push_loop_frame(leave_block, cond_block);
    generator.gen_block(body);
    generator.pop_frame();

    if !generator.current_block_terminated() {
        generator
            .builder
            .build_unconditional_branch(cond_block)
            .unwrap();
    }

    generator.builder.position_at_end(leave_block);
    None
}
