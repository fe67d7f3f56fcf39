use crate::{
    ast::{Expression, IfExpression, LiteralKind, MatchArm, Pattern},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    stmt::parse_block,
    types::parse_type,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expression, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        ));
    };

    let mut left = nud_fn(parser)?;

    // While a LED exists and the current token binds tighter, keep
    // extending the left-hand side
    while *parser
        .get_bp_lookup()
        .get(&parser.current_token_kind())
        .unwrap_or(&BindingPower::Default)
        > bp
    {
        let token_kind = parser.current_token_kind();
        let Some(led_fn) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ));
        };
        let next_bp = *parser.get_bp_lookup().get(&token_kind).unwrap();

        left = led_fn(parser, left, next_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expression, Error> {
    match parser.current_token_kind() {
        TokenKind::Integer => Ok(Expression::Literal {
            kind: LiteralKind::Integer,
            value: parser.advance().value.clone(),
        }),
        TokenKind::String => Ok(Expression::Literal {
            kind: LiteralKind::Str,
            value: parser.advance().value.clone(),
        }),
        TokenKind::Char => Ok(Expression::Literal {
            kind: LiteralKind::Char,
            value: parser.advance().value.clone(),
        }),
        TokenKind::True | TokenKind::False => Ok(Expression::Literal {
            kind: LiteralKind::Boolean,
            value: parser.advance().value.clone(),
        }),
        TokenKind::Identifier => Ok(Expression::Path {
            segments: parse_path_segments(parser)?,
        }),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        )),
    }
}

/// `segment (:: segment)*`
pub fn parse_path_segments(parser: &mut Parser) -> Result<Vec<String>, Error> {
    let mut segments = vec![parser.expect(TokenKind::Identifier)?.value];
    while parser.current_token_kind() == TokenKind::PathSep {
        parser.advance();
        segments.push(parser.expect(TokenKind::Identifier)?.value);
    }
    Ok(segments)
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expression,
    bp: BindingPower,
) -> Result<Expression, Error> {
    let operator_token = parser.advance().clone();

    let right = parse_expr(parser, bp)?;

    Ok(Expression::Binary {
        op: operator_token.value,
        lhs: Box::new(left),
        rhs: Box::new(right),
    })
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let operator_token = parser.advance().clone();
    let rhs = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expression::Unary {
        op: operator_token.value,
        value: Box::new(rhs),
    })
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expression,
    bp: BindingPower,
) -> Result<Expression, Error> {
    parser.advance();
    let rhs = parse_expr(parser, bp)?;

    Ok(Expression::Assignment {
        assignee: Box::new(left),
        value: Box::new(rhs),
    })
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_borrow_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();

    let is_mut = if parser.current_token_kind() == TokenKind::Mut {
        parser.advance();
        true
    } else {
        false
    };

    let expr = parse_expr(parser, BindingPower::Unary)?;
    Ok(Expression::Borrow {
        is_mut,
        expr: Box::new(expr),
    })
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, Error> {
    parser.advance();
    let params = parse_call_params(parser)?;

    Ok(Expression::Call {
        callee: Box::new(left),
        params,
    })
}

fn parse_call_params(parser: &mut Parser) -> Result<Vec<Expression>, Error> {
    let mut params = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        params.push(parse_expr(parser, BindingPower::Comma)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(params)
}

pub fn parse_index_expr(
    parser: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expression::ArrayIndex {
        object: Box::new(left),
        index: Box::new(index),
    })
}

/// `expr.method(args)` or `expr.0`; plain field access does not exist in
/// the subset.
pub fn parse_member_expr(
    parser: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, Error> {
    parser.advance();

    match parser.current_token_kind() {
        TokenKind::Integer => {
            let token = parser.advance().clone();
            let index = token.value.parse::<u32>().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                )
            })?;
            Ok(Expression::TupleIndex {
                object: Box::new(left),
                index,
            })
        }
        TokenKind::Identifier => {
            let method = parser.advance().value.clone();
            parser.expect(TokenKind::OpenParen)?;
            let params = parse_call_params(parser)?;
            Ok(Expression::MethodCall {
                receiver: Box::new(left),
                method,
                params,
            })
        }
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected method name or tuple index after `.`"),
            },
            parser.get_position(),
        )),
    }
}

pub fn parse_cast_expr(
    parser: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, Error> {
    parser.advance();
    let ty = parse_type(parser)?;

    Ok(Expression::Cast {
        expr: Box::new(left),
        ty,
    })
}

pub fn parse_block_expr(parser: &mut Parser) -> Result<Expression, Error> {
    Ok(Expression::Block(parse_block(parser)?))
}

pub fn parse_if_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let if_true = parse_block(parser)?;

    let if_false = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(Box::new(parse_if_expr(parser)?))
        } else {
            Some(Box::new(Expression::Block(parse_block(parser)?)))
        }
    } else {
        None
    };

    Ok(Expression::If(IfExpression {
        expr: Box::new(condition),
        if_true,
        if_false,
    }))
}

pub fn parse_loop_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();
    let body = parse_block(parser)?;

    Ok(Expression::InfiniteLoop { body })
}

pub fn parse_while_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();
    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Expression::PredicateLoop {
        expr: Box::new(condition),
        body,
    })
}

pub fn parse_for_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();
    let pattern = parse_binding_pattern(parser)?;
    parser.expect(TokenKind::In)?;
    let iterated = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Expression::IteratorLoop {
        pattern,
        expr: Box::new(iterated),
        body,
    })
}

pub fn parse_match_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();
    let scrutinee = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::OpenCurly)?;
    let mut arms = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let pattern = parse_match_pattern(parser)?;
        parser.expect(TokenKind::FatArrow)?;
        let body = parse_block(parser)?;
        arms.push(MatchArm {
            patterns: vec![pattern],
            body,
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expression::Match {
        expr: Box::new(scrutinee),
        arms,
    })
}

/// `(mut)? identifier`, the binding form used by `let` and `for`.
pub fn parse_binding_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let is_mut = if parser.current_token_kind() == TokenKind::Mut {
        parser.advance();
        true
    } else {
        false
    };

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected identifier in binding pattern"),
        },
        parser.get_position(),
    );
    let id = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    Ok(Pattern::Identifier { is_mut, id })
}

fn parse_match_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    match parser.current_token_kind() {
        TokenKind::Integer => Ok(Pattern::Literal {
            kind: LiteralKind::Integer,
            value: parser.advance().value.clone(),
        }),
        TokenKind::String => Ok(Pattern::Literal {
            kind: LiteralKind::Str,
            value: parser.advance().value.clone(),
        }),
        TokenKind::Char => Ok(Pattern::Literal {
            kind: LiteralKind::Char,
            value: parser.advance().value.clone(),
        }),
        TokenKind::True | TokenKind::False => Ok(Pattern::Literal {
            kind: LiteralKind::Boolean,
            value: parser.advance().value.clone(),
        }),
        TokenKind::Ampersand => {
            parser.advance();
            Ok(Pattern::Reference {
                pattern: Box::new(parse_match_pattern(parser)?),
            })
        }
        TokenKind::Identifier => {
            let segments = parse_path_segments(parser)?;
            if segments.len() == 1 {
                Ok(Pattern::Identifier {
                    is_mut: false,
                    id: segments.into_iter().next().unwrap(),
                })
            } else {
                Ok(Pattern::Path { segments })
            }
        }
        TokenKind::Mut => parse_binding_pattern(parser),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected pattern"),
            },
            parser.get_position(),
        )),
    }
}

pub fn parse_return_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();

    let expr = if parser.get_nud_lookup().contains_key(&parser.current_token_kind()) {
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    } else {
        None
    };

    Ok(Expression::Return { expr })
}

pub fn parse_break_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();

    let expr = if parser.get_nud_lookup().contains_key(&parser.current_token_kind()) {
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    } else {
        None
    };

    Ok(Expression::Break { expr })
}

pub fn parse_continue_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();
    Ok(Expression::Continue)
}
