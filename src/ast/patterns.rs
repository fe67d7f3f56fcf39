use serde::Serialize;

use super::expressions::LiteralKind;

/// Binding patterns. Only identifier patterns participate in type
/// checking; the other forms parse and get defined neutral treatment.
#[derive(Debug, Clone, Serialize)]
pub enum Pattern {
    Identifier {
        #[serde(rename = "mutable")]
        is_mut: bool,
        id: String,
    },
    Literal {
        #[serde(rename = "type")]
        kind: LiteralKind,
        value: String,
    },
    Reference {
        pattern: Box<Pattern>,
    },
    Path {
        segments: Vec<String>,
    },
}
