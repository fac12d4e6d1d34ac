use {
    indexmap::IndexMap,
    serde::Serialize,
    std::{
        collections::{BTreeMap, HashMap},
        fmt,
        sync::Arc,
    },
    tap::Pipe,
};

pub mod ser;

/// Kinds that exist in a dynamic value model but can never be rendered as a flat string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedKind {
    Function,
    Channel,
    Pointer,
    Complex,
}

impl UnsupportedKind {
    pub fn name(self) -> &'static str {
        match self {
            UnsupportedKind::Function => "func",
            UnsupportedKind::Channel => "chan",
            UnsupportedKind::Pointer => "unsafe pointer",
            UnsupportedKind::Complex => "complex",
        }
    }
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An already-decoded dynamic value.
///
/// The value is an owned tree: a `Value` cannot contain itself, so there is no
/// way to build a cyclic graph out of it and traversal depth is bounded by the
/// nesting depth.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Signed(i128),
    Unsigned(u128),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
    /// Anything with its own string rendering. Rendered verbatim, even if the
    /// underlying type would otherwise look like a container.
    Display(Arc<dyn fmt::Display + Send + Sync>),
    Unsupported(UnsupportedKind),
    /// A kind the formatter does not know how to handle, tagged with its name.
    Unknown(&'static str),
}

impl Value {
    pub fn display(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Value::Display(Arc::new(value))
    }

    /// Converts anything serializable without going through JSON, so 128-bit integers
    /// and non-finite floats survive.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ser::Error> {
        value.serialize(ser::Serializer)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Signed(_) => "int",
            Value::Unsigned(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Display(_) => "stringer",
            Value::Unsupported(kind) => kind.name(),
            Value::Unknown(name) => *name,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Signed(v) => f.debug_tuple("Signed").field(v).finish(),
            Value::Unsigned(v) => f.debug_tuple("Unsigned").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::String(v) => f.debug_tuple("String").field(v).finish(),
            Value::Sequence(v) => f.debug_tuple("Sequence").field(v).finish(),
            Value::Mapping(v) => f.debug_tuple("Mapping").field(v).finish(),
            Value::Display(v) => f.debug_tuple("Display").field(&v.to_string()).finish(),
            Value::Unsupported(kind) => f.debug_tuple("Unsupported").field(kind).finish(),
            Value::Unknown(name) => f.debug_tuple("Unknown").field(name).finish(),
        }
    }
}

macro_rules! from_integer {
    ($variant:ident as $wide:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(<$wide>::from(value))
                }
            }
        )+
    };
}

from_integer!(Signed as i128: i8, i16, i32, i64, i128);
from_integer!(Unsigned as u128: u8, u16, u32, u64, u128);

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Value::Signed(value as i128)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Unsigned(value as u128)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().map(Into::into).collect::<Vec<_>>().pipe(Value::Sequence)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(values: [T; N]) -> Self {
        values.into_iter().map(Into::into).collect::<Vec<_>>().pipe(Value::Sequence)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<IndexMap<_, _>>()
            .pipe(Value::Mapping)
    }
}

impl<K: Into<String>, V: Into<Value>> From<IndexMap<K, V>> for Value {
    fn from(map: IndexMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(map: HashMap<K, V, S>) -> Self {
        map.into_iter().collect()
    }
}

impl From<serde_json::Number> for Value {
    fn from(number: serde_json::Number) -> Self {
        number
            .as_u64()
            .map(Value::from)
            .or_else(|| number.as_i64().map(Value::from))
            .or_else(|| number.as_f64().map(Value::from))
            .unwrap_or(Value::Unknown("number"))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Bool(v),
            serde_json::Value::Number(number) => Value::from(number),
            serde_json::Value::String(v) => Value::String(v),
            serde_json::Value::Array(values) => values.pipe(Value::from),
            serde_json::Value::Object(map) => map.into_iter().collect(),
        }
    }
}
