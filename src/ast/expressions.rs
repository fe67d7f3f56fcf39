use serde::Serialize;

use super::{ast::BlockExpression, patterns::Pattern, types::TypeNode};

/// The literal families the language knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LiteralKind {
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "char")]
    Char,
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "bool")]
    Boolean,
}

#[derive(Debug, Clone, Serialize)]
pub enum Expression {
    Literal {
        #[serde(rename = "type")]
        kind: LiteralKind,
        value: String,
    },
    Path {
        segments: Vec<String>,
    },
    Call {
        callee: Box<Expression>,
        params: Vec<Expression>,
    },
    MethodCall {
        receiver: Box<Expression>,
        method: String,
        params: Vec<Expression>,
    },
    Binary {
        op: String,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Unary {
        op: String,
        value: Box<Expression>,
    },
    Assignment {
        assignee: Box<Expression>,
        value: Box<Expression>,
    },
    Borrow {
        is_mut: bool,
        expr: Box<Expression>,
    },
    Cast {
        expr: Box<Expression>,
        #[serde(rename = "type")]
        ty: TypeNode,
    },
    ArrayIndex {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    TupleIndex {
        object: Box<Expression>,
        index: u32,
    },
    Block(BlockExpression),
    If(IfExpression),
    Match {
        expr: Box<Expression>,
        arms: Vec<MatchArm>,
    },
    InfiniteLoop {
        body: BlockExpression,
    },
    PredicateLoop {
        expr: Box<Expression>,
        body: BlockExpression,
    },
    IteratorLoop {
        pattern: Pattern,
        expr: Box<Expression>,
        body: BlockExpression,
    },
    Return {
        #[serde(skip_serializing_if = "Option::is_none")]
        expr: Option<Box<Expression>>,
    },
    Break {
        #[serde(skip_serializing_if = "Option::is_none")]
        expr: Option<Box<Expression>>,
    },
    Continue,
}

impl Expression {
    /// Block-shaped expressions may stand as statements without a
    /// trailing semicolon.
    pub fn has_block_form(&self) -> bool {
        matches!(
            self,
            Expression::Block(_)
                | Expression::If(_)
                | Expression::Match { .. }
                | Expression::InfiniteLoop { .. }
                | Expression::PredicateLoop { .. }
                | Expression::IteratorLoop { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IfExpression {
    pub expr: Box<Expression>,
    #[serde(rename = "ifTrue")]
    pub if_true: BlockExpression,
    #[serde(rename = "ifFalse", skip_serializing_if = "Option::is_none")]
    pub if_false: Option<Box<Expression>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchArm {
    pub patterns: Vec<Pattern>,
    pub body: BlockExpression,
}
