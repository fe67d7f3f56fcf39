//! Type parsing implementation.
//!
//! Parses the syntactic type forms: type paths, pointers, references,
//! tuples, arrays, slices, the never type, the inferred type, and
//! function types.

use crate::{
    ast::TypeNode,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{expr::parse_path_segments, parser::Parser};

pub fn parse_type(parser: &mut Parser) -> Result<TypeNode, Error> {
    match parser.current_token_kind() {
        TokenKind::Identifier => {
            let segments = parse_path_segments(parser)?;
            if segments.len() == 1 && segments[0] == "_" {
                return Ok(TypeNode::Inferred);
            }
            Ok(TypeNode::Path(segments))
        }
        TokenKind::Star => {
            parser.advance();
            let is_mut = if parser.current_token_kind() == TokenKind::Mut {
                parser.advance();
                true
            } else {
                false
            };
            Ok(TypeNode::Pointer {
                is_mut,
                inner: Box::new(parse_type(parser)?),
            })
        }
        TokenKind::Ampersand => {
            parser.advance();
            let is_mut = if parser.current_token_kind() == TokenKind::Mut {
                parser.advance();
                true
            } else {
                false
            };
            Ok(TypeNode::Reference {
                is_mut,
                inner: Box::new(parse_type(parser)?),
            })
        }
        TokenKind::OpenParen => {
            parser.advance();
            let mut elements = vec![];
            let mut saw_comma = false;
            while parser.current_token_kind() != TokenKind::CloseParen {
                elements.push(parse_type(parser)?);
                if parser.current_token_kind() == TokenKind::Comma {
                    saw_comma = true;
                    parser.advance();
                }
            }
            parser.expect(TokenKind::CloseParen)?;

            // `(T)` is just T in parentheses; `(T,)` and longer are tuples
            if elements.len() == 1 && !saw_comma {
                Ok(elements.into_iter().next().unwrap())
            } else {
                Ok(TypeNode::Tuple(elements))
            }
        }
        TokenKind::OpenBracket => {
            parser.advance();
            let elem = parse_type(parser)?;

            if parser.current_token_kind() == TokenKind::Semicolon {
                parser.advance();
                let len_token = parser.expect(TokenKind::Integer)?;
                let len = len_token.value.parse::<usize>().map_err(|_| {
                    Error::new(
                        ErrorImpl::NumberParseError {
                            token: len_token.value.clone(),
                        },
                        len_token.span.start,
                    )
                })?;
                parser.expect(TokenKind::CloseBracket)?;
                Ok(TypeNode::Array {
                    elem: Box::new(elem),
                    len,
                })
            } else {
                parser.expect(TokenKind::CloseBracket)?;
                Ok(TypeNode::Slice(Box::new(elem)))
            }
        }
        TokenKind::Not => {
            parser.advance();
            Ok(TypeNode::Never)
        }
        TokenKind::Fn => {
            parser.advance();
            parser.expect(TokenKind::OpenParen)?;
            let mut inputs = vec![];
            while parser.current_token_kind() != TokenKind::CloseParen {
                inputs.push(parse_type(parser)?);
                if parser.current_token_kind() == TokenKind::Comma {
                    parser.advance();
                }
            }
            parser.expect(TokenKind::CloseParen)?;

            let output = if parser.current_token_kind() == TokenKind::Arrow {
                parser.advance();
                Some(Box::new(parse_type(parser)?))
            } else {
                None
            };
            Ok(TypeNode::Function { inputs, output })
        }
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a type"),
            },
            parser.get_position(),
        )),
    }
}
