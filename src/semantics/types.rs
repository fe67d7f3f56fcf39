use std::fmt::{self, Display};

/// The closed set of type shapes the analyzer works with.
///
/// Identity is structural: two descriptors are equal iff their variant
/// and all fields are recursively equal. Scope lookup is the only place
/// names enter the picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Void,
    Primitive {
        width: u8,
        signed: bool,
    },
    Typedef(Box<TypeDescriptor>),
    Pointer {
        mutable: bool,
        inner: Box<TypeDescriptor>,
    },
    Array {
        elem: Box<TypeDescriptor>,
        len: usize,
    },
    Tuple(Vec<TypeDescriptor>),
    Function {
        params: Vec<TypeDescriptor>,
        return_type: Box<TypeDescriptor>,
    },
    Namespace(String),
}

impl TypeDescriptor {
    pub fn primitive(width: u8, signed: bool) -> Self {
        TypeDescriptor::Primitive { width, signed }
    }

    /// Peels transparent wrappers (typedefs, a function's return
    /// position when used as a value) down to the first concrete
    /// descriptor. Idempotent.
    pub fn resolve(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::Typedef(inner) => inner.resolve(),
            TypeDescriptor::Function { return_type, .. } => return_type.resolve(),
            other => other,
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Void => write!(f, "void"),
            TypeDescriptor::Primitive { width, signed } => {
                write!(f, "{}{}", if *signed { "i" } else { "u" }, width)
            }
            TypeDescriptor::Typedef(inner) => write!(f, "{}", inner),
            TypeDescriptor::Pointer { mutable, inner } => {
                write!(f, "*{} {}", if *mutable { "mut" } else { "const" }, inner)
            }
            TypeDescriptor::Array { elem, len } => write!(f, "[{}; {}]", elem, len),
            TypeDescriptor::Tuple(elems) => {
                write!(f, "(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, ")")
            }
            TypeDescriptor::Function {
                params,
                return_type,
            } => {
                write!(f, "fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", return_type)
            }
            TypeDescriptor::Namespace(path) => write!(f, "namespace {}", path),
        }
    }
}

/// The analyzer's internal per-expression result: a descriptor plus a
/// tag saying how it arrived. Never stored in the scope stack.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprResult {
    /// An ordinary value of the given type.
    Value(TypeDescriptor),
    /// A borrow; surfaces as a pointer-shaped descriptor when a plain
    /// descriptor is needed.
    Reference {
        mutable: bool,
        inner: TypeDescriptor,
    },
    /// The type a `return`/`break`/`continue` wants to hand to the
    /// enclosing block, kept distinct from the block's own value type.
    Pending(TypeDescriptor),
}

impl ExprResult {
    /// The concrete descriptor this result stands for. The
    /// control-transfer tag is peeled here and never leaks into plain
    /// type comparisons.
    pub fn resolved(&self) -> TypeDescriptor {
        match self {
            ExprResult::Value(ty) => ty.resolve().clone(),
            ExprResult::Pending(ty) => ty.resolve().clone(),
            ExprResult::Reference { mutable, inner } => TypeDescriptor::Pointer {
                mutable: *mutable,
                inner: Box::new(inner.resolve().clone()),
            },
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ExprResult::Pending(_))
    }
}

impl Display for ExprResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprResult::Value(ty) => write!(f, "{}", ty),
            ExprResult::Reference { mutable, inner } => {
                write!(f, "&{}{}", if *mutable { "mut " } else { "" }, inner)
            }
            ExprResult::Pending(ty) => write!(f, "to return: {}", ty),
        }
    }
}
