use serde::Serialize;

use super::{expressions::Expression, patterns::Pattern, types::TypeNode};

/// One whole compilation unit: the parsed tree of a single source file.
#[derive(Debug, Clone, Serialize)]
pub struct Crate {
    pub items: Vec<Item>,
}

/// Top-level declarations.
#[derive(Debug, Clone, Serialize)]
pub enum Item {
    Function(Function),
    Use(UseDecl),
}

#[derive(Debug, Clone, Serialize)]
pub struct UseDecl {
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Function {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "ReturnType", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeNode>,
    #[serde(rename = "Params", skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Parameter>,
    #[serde(rename = "Body")]
    pub body: BlockExpression,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub id: String,
    #[serde(rename = "type")]
    pub var_type: TypeNode,
}

#[derive(Debug, Clone, Serialize)]
pub enum Statement {
    Let(LetStatement),
    Expression(Expression),
    Item(Item),
}

#[derive(Debug, Clone, Serialize)]
pub struct LetStatement {
    pub assignee: Pattern,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub var_type: Option<TypeNode>,
    #[serde(rename = "expression", skip_serializing_if = "Option::is_none")]
    pub expr: Option<Expression>,
}

/// A sequence of statements plus an optional trailing expression; the
/// trailing expression is the block's value.
#[derive(Debug, Clone, Serialize)]
pub struct BlockExpression {
    pub statements: Vec<Statement>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub expr: Option<Box<Expression>>,
}
