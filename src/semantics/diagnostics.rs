use std::fmt::{self, Display};

use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warn => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One analyzer finding. INFO is pure tracing, WARN never blocks code
/// generation, any ERROR fails the pass.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Append-only log; order is emission order is traversal order.
#[derive(Debug, Default)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn info(&mut self, message: String) {
        self.messages.push(Diagnostic {
            severity: Severity::Info,
            message,
        });
    }

    pub fn warn(&mut self, finding: SemanticError) {
        self.messages.push(Diagnostic {
            severity: Severity::Warn,
            message: finding.to_string(),
        });
    }

    pub fn error(&mut self, finding: SemanticError) {
        self.messages.push(Diagnostic {
            severity: Severity::Error,
            message: finding.to_string(),
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.messages.iter()
    }

    pub fn error_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
            .count()
    }

    pub fn count_of(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.messages
    }
}

/// The semantic finding catalog; each variant formats into one
/// diagnostic message.
#[derive(ThisError, Debug, Clone)]
pub enum SemanticError {
    #[error("'{name}' undeclared!")]
    UndeclaredName { name: String },
    #[error("'{name}': already defined in the same scope {scope}!")]
    Redefinition { name: String, scope: usize },
    #[error("'{name}': redefined in scope {scope} (earlier definition in scope {earlier}: {descriptor})!")]
    Shadowing {
        name: String,
        scope: usize,
        earlier: usize,
        descriptor: String,
    },
    #[error("cannot determine type of variable '{name}'")]
    CannotDetermineType { name: String },
    #[error("{name} type contradiction: declared type is {declared}; expression return type is {inferred}")]
    LetTypeContradiction {
        name: String,
        declared: String,
        inferred: String,
    },
    #[error("function {name}: claimed return type {declared} doesn't correlate with body return type {body}")]
    ReturnTypeContradiction {
        name: String,
        declared: String,
        body: String,
    },
    #[error("return type contradiction: do block {then_type}; else block {else_type}")]
    BranchTypeContradiction {
        then_type: String,
        else_type: String,
    },
    #[error("block expression returns several different types: {types}")]
    BlockTypeContradiction { types: String },
    #[error("unknown operand {op}")]
    UnknownOperator { op: String },
    #[error("unsupported type {operand} for operator {op}")]
    UnaryOperandUnsupported { op: String, operand: String },
    #[error("binary operation unsupported types: {lhs} {op} {rhs}")]
    BinaryOperandsUnsupported {
        op: String,
        lhs: String,
        rhs: String,
    },
    #[error("assignment type contradiction: assignee is {assignee}; value is {value}")]
    AssignmentTypeContradiction { assignee: String, value: String },
    #[error("assignment target must be a declared variable or array element")]
    AssignmentTargetInvalid,
    #[error("empty fn header")]
    EmptyCallee,
    #[error("function called not found in symtable; id is {name}")]
    MissingFunction { name: String },
    #[error("function {name} got called for different type; its attributes are {descriptor}")]
    NotAFunction { name: String, descriptor: String },
    #[error("function {name} called with {received} parameters, expected {expected}")]
    CallArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("function {name} called parameters ({received}) differ from ones declared ({declared})")]
    CallParameterMismatch {
        name: String,
        received: String,
        declared: String,
    },
    #[error("unknown type {name}")]
    UnknownType { name: String },
    #[error("{descriptor} is not correct indexing type")]
    InvalidIndexType { descriptor: String },
    #[error("{descriptor} is not an array")]
    NotAnArray { descriptor: String },
}
