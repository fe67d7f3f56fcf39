use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("fn", TokenKind::Fn);
        map.insert("let", TokenKind::Let);
        map.insert("mut", TokenKind::Mut);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("loop", TokenKind::Loop);
        map.insert("while", TokenKind::While);
        map.insert("for", TokenKind::For);
        map.insert("in", TokenKind::In);
        map.insert("return", TokenKind::Return);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map.insert("use", TokenKind::Use);
        map.insert("as", TokenKind::As);
        map.insert("match", TokenKind::Match);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    String,
    Char,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,
    Ampersand,

    Dot,
    PathSep, // ::
    Semicolon,
    Colon,
    Comma,
    Arrow,
    FatArrow,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Fn,
    Let,
    Mut,
    If,
    Else,
    Loop,
    While,
    For,
    In,
    Return,
    Break,
    Continue,
    Use,
    As,
    Match,
    True,
    False,
}

impl TokenKind {
    /// The vocabulary name used by the token dump, one per kind.
    pub fn symbolic_name(&self) -> &'static str {
        match self {
            TokenKind::EOF => "EOF",
            TokenKind::Integer => "INTEGER_LITERAL",
            TokenKind::String => "STRING_LITERAL",
            TokenKind::Char => "CHAR_LITERAL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::OpenBracket => "LSQUAREBRACKET",
            TokenKind::CloseBracket => "RSQUAREBRACKET",
            TokenKind::OpenCurly => "LCURLYBRACE",
            TokenKind::CloseCurly => "RCURLYBRACE",
            TokenKind::OpenParen => "LPAREN",
            TokenKind::CloseParen => "RPAREN",
            TokenKind::Assignment => "EQ",
            TokenKind::Equals => "EQEQ",
            TokenKind::Not => "NOT",
            TokenKind::NotEquals => "NE",
            TokenKind::Less => "LT",
            TokenKind::LessEquals => "LE",
            TokenKind::Greater => "GT",
            TokenKind::GreaterEquals => "GE",
            TokenKind::Or => "OROR",
            TokenKind::And => "ANDAND",
            TokenKind::Ampersand => "AND",
            TokenKind::Dot => "DOT",
            TokenKind::PathSep => "PATHSEP",
            TokenKind::Semicolon => "SEMI",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Arrow => "RARROW",
            TokenKind::FatArrow => "FATARROW",
            TokenKind::Plus => "PLUS",
            TokenKind::Dash => "MINUS",
            TokenKind::Slash => "SLASH",
            TokenKind::Star => "STAR",
            TokenKind::Percent => "PERCENT",
            TokenKind::Fn => "KW_FN",
            TokenKind::Let => "KW_LET",
            TokenKind::Mut => "KW_MUT",
            TokenKind::If => "KW_IF",
            TokenKind::Else => "KW_ELSE",
            TokenKind::Loop => "KW_LOOP",
            TokenKind::While => "KW_WHILE",
            TokenKind::For => "KW_FOR",
            TokenKind::In => "KW_IN",
            TokenKind::Return => "KW_RETURN",
            TokenKind::Break => "KW_BREAK",
            TokenKind::Continue => "KW_CONTINUE",
            TokenKind::Use => "KW_USE",
            TokenKind::As => "KW_AS",
            TokenKind::Match => "KW_MATCH",
            TokenKind::True => "KW_TRUE",
            TokenKind::False => "KW_FALSE",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{ kind: {}, value: {} }}", self.kind, self.value)
    }
}

impl Token {
    /// One token-dump line: `Loc=<line:col>\tNAME 'text'`.
    pub fn dump(&self) -> String {
        format!(
            "Loc=<{}>\t{} '{}'",
            self.span.start,
            self.kind.symbolic_name(),
            self.value
        )
    }
}
