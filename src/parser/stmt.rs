use crate::{
    ast::{BlockExpression, Function, Item, LetStatement, Parameter, Statement, UseDecl},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    expr::{parse_binding_pattern, parse_expr, parse_path_segments},
    lookups::BindingPower,
    parser::Parser,
    types::parse_type,
};

/// Top-level declarations: functions and use declarations.
pub fn parse_item(parser: &mut Parser) -> Result<Item, Error> {
    match parser.current_token_kind() {
        TokenKind::Fn => Ok(Item::Function(parse_fn_decl(parser)?)),
        TokenKind::Use => Ok(Item::Use(parse_use_decl(parser)?)),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected `fn` or `use` at crate level"),
            },
            parser.get_position(),
        )),
    }
}

pub fn parse_fn_decl(parser: &mut Parser) -> Result<Function, Error> {
    parser.advance();

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected function name after `fn`"),
        },
        parser.get_position(),
    );
    let id = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenParen)?;

    let mut params = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name = parser.expect(TokenKind::Identifier)?.value;
        parser.expect(TokenKind::Colon)?;
        let ty = parse_type(parser)?;
        params.push(Parameter { id: name, var_type: ty });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(Function {
        id,
        params,
        return_type,
        body,
    })
}

pub fn parse_use_decl(parser: &mut Parser) -> Result<UseDecl, Error> {
    parser.advance();
    let path = parse_path_segments(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(UseDecl { path })
}

pub fn parse_let_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    parser.advance();

    let pattern = parse_binding_pattern(parser)?;

    let var_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let expr = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        // Leaving out both the annotation and the initializer parses;
        // the analyzer reports it
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Statement::Let(LetStatement {
        assignee: pattern,
        var_type,
        expr,
    }))
}

/// `{ statement* trailing-expression? }`
///
/// An expression statement needs a terminating semicolon unless it has
/// block form; an expression directly before the closing brace is the
/// block's trailing expression.
pub fn parse_block(parser: &mut Parser) -> Result<BlockExpression, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let mut statements = Vec::new();
    let mut trailing = None;

    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        match parser.current_token_kind() {
            TokenKind::Let => statements.push(parse_let_stmt(parser)?),
            TokenKind::Fn => statements.push(Statement::Item(Item::Function(parse_fn_decl(parser)?))),
            TokenKind::Use => statements.push(Statement::Item(Item::Use(parse_use_decl(parser)?))),
            TokenKind::Semicolon => {
                parser.advance();
            }
            _ => {
                let expr = parse_expr(parser, BindingPower::Default)?;

                if parser.current_token_kind() == TokenKind::Semicolon {
                    parser.advance();
                    statements.push(Statement::Expression(expr));
                } else if parser.current_token_kind() == TokenKind::CloseCurly {
                    trailing = Some(Box::new(expr));
                } else if expr.has_block_form() {
                    statements.push(Statement::Expression(expr));
                } else {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedTokenDetailed {
                            token: parser.current_token().value.clone(),
                            message: String::from("expected `;` after expression statement"),
                        },
                        parser.get_position(),
                    ));
                }
            }
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockExpression {
        statements,
        expr: trailing,
    })
}
