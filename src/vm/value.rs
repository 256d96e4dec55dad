use std::fmt;
use std::rc::Rc;

/// A heap string with its 32-bit FNV-1a hash computed once at construction.
#[derive(Debug)]
pub struct StrObj {
    text: String,
    hash: u32,
}

impl StrObj {
    pub fn new(text: String) -> Self {
        let hash = fnv1a(text.as_bytes());
        Self { text, hash }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }
}

impl PartialEq for StrObj {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.text == other.text
    }
}

impl Eq for StrObj {}

/// 32-bit FNV-1a over raw bytes.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(0x0100_0193)
    })
}

/// A runtime value: tagged, cheap to clone. String values are non-owning in
/// spirit; the `Rc` keeps the underlying object alive as long as any stack
/// slot, constant pool, or intern table refers to it.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Nil,
    Str(Rc<StrObj>),
}

impl Value {
    /// Exactly `nil` and `false` are falsey; everything else is truthy.
    pub fn is_falsey(&self) -> bool {
        matches!(self, Self::Nil | Self::Bool(false))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Nil, Self::Nil) => true,
            (Self::Str(a), Self::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Bool(b) => write!(f, "{b}"),
            Self::Nil => write!(f, "nil"),
            Self::Str(s) => write!(f, "{}", s.as_str()),
        }
    }
}
