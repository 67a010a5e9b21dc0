use std::fmt;

/// A reference made by an instruction to another program element
///
/// This is the only instruction payload the engine cares about. Names are
/// dotted; references to classes outside the scope stay unresolved and are
/// ignored by the scanners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsnRef {
    /// A type reference (new-instance, const-class, check-cast, ...)
    Type(String),

    /// A field access on the named class
    Field { class: String, name: String },

    /// An invocation of the named method; overloads are not distinguished
    Method { class: String, name: String },
}

impl InsnRef {
    pub fn type_ref(class: &str) -> Self {
        InsnRef::Type(class.to_string())
    }

    pub fn field_ref(class: &str, name: &str) -> Self {
        InsnRef::Field {
            class: class.to_string(),
            name: name.to_string(),
        }
    }

    pub fn method_ref(class: &str, name: &str) -> Self {
        InsnRef::Method {
            class: class.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for InsnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsnRef::Type(class) => write!(f, "type {}", class),
            InsnRef::Field { class, name } => write!(f, "field {}.{}", class, name),
            InsnRef::Method { class, name } => write!(f, "method {}.{}()", class, name),
        }
    }
}

/// The instruction body of a method, reduced to its outgoing references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodBody {
    pub refs: Vec<InsnRef>,
}

impl MethodBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refs(refs: Vec<InsnRef>) -> Self {
        Self { refs }
    }

    pub fn push(&mut self, r: InsnRef) {
        self.refs.push(r);
    }
}
