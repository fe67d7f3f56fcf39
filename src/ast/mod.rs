/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Core node definitions (crate, items, statements, blocks)
/// - expressions: Definitions for various expression kinds
/// - patterns: Binding patterns
/// - types: Syntactic type forms
///
/// The tree is a set of tagged variants: each pass dispatches with a
/// single `match` over the node tag. Nodes are immutable once built and
/// are read-only input to both the analyzer and the generator.
pub mod ast;
pub mod expressions;
pub mod patterns;
pub mod types;

pub use ast::{BlockExpression, Crate, Function, Item, LetStatement, Parameter, Statement, UseDecl};
pub use expressions::{Expression, IfExpression, LiteralKind, MatchArm};
pub use patterns::Pattern;
pub use types::TypeNode;

/// Serializes a crate as a human-readable nested mapping, in source
/// order, with descriptive per-node field names.
pub fn dump(krate: &Crate) -> String {
    serde_json::to_string_pretty(krate).expect("AST serialization cannot fail")
}
