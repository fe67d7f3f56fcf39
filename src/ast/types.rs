use serde::Serialize;

/// Syntactic type forms, as written in source. The analyzer maps these
/// onto type descriptors through scope lookup.
#[derive(Debug, Clone, Serialize)]
pub enum TypeNode {
    Path(Vec<String>),
    Pointer {
        #[serde(rename = "mutable")]
        is_mut: bool,
        #[serde(rename = "type")]
        inner: Box<TypeNode>,
    },
    Reference {
        #[serde(rename = "mutable")]
        is_mut: bool,
        #[serde(rename = "type")]
        inner: Box<TypeNode>,
    },
    Tuple(Vec<TypeNode>),
    Array {
        #[serde(rename = "type")]
        elem: Box<TypeNode>,
        len: usize,
    },
    Slice(Box<TypeNode>),
    Never,
    Inferred,
    Function {
        inputs: Vec<TypeNode>,
        #[serde(rename = "ReturnType", skip_serializing_if = "Option::is_none")]
        output: Option<Box<TypeNode>>,
    },
}
