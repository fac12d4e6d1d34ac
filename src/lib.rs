pub mod flat_csv;
pub mod flatten_value;
pub mod value;

pub use {
    flatten_value::{Error, FlatMap, Flattened, Flattener, PartialError, PathStyle, flatten},
    value::{UnsupportedKind, Value},
};

/// Serializes the referenced value as a single-level map of path -> string.
#[derive(Debug)]
pub struct FlatRef<'a, T: ?Sized> {
    value: &'a T,
    prefix: &'a str,
    flattener: Flattener,
}

impl<'a, T: ?Sized> FlatRef<'a, T> {
    pub fn new(value: &'a T) -> Self {
        Self {
            value,
            prefix: "",
            flattener: Flattener::default(),
        }
    }

    pub fn with_prefix(self, prefix: &'a str) -> Self {
        Self { prefix, ..self }
    }

    pub fn with_flattener(self, flattener: Flattener) -> Self {
        Self { flattener, ..self }
    }
}

mod serde;
