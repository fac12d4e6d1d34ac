use {
    super::Value,
    indexmap::IndexMap,
    serde::ser::{self, Serialize},
    std::fmt,
    tap::Pipe,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Custom(String),
    #[error("map key must be a string, bool or integer, found {0}")]
    KeyMustBeAString(&'static str),
    #[error("map value serialized before its key")]
    ValueWithoutKey,
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

type Result<T> = std::result::Result<T, self::Error>;

/// Builds a [`Value`] straight from a `Serialize` implementation.
///
/// Same shape as `serde_json::to_value` (enum variants become single-key mappings, unit
/// variants become strings) but integers keep their full 128-bit range and NaN/infinity
/// stay floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct Serializer;

fn single_entry(key: &'static str, value: Value) -> Value {
    [(key, value)].into_iter().collect()
}

fn map_key(key: Value) -> Result<String> {
    match key {
        Value::String(key) => Ok(key),
        Value::Bool(v) => Ok(v.to_string()),
        Value::Signed(v) => Ok(v.to_string()),
        Value::Unsigned(v) => Ok(v.to_string()),
        other => Err(self::Error::KeyMustBeAString(other.kind())),
    }
}

impl ser::Serializer for Serializer {
    type Ok = Value;
    type Error = self::Error;
    type SerializeSeq = SerializeSequence;
    type SerializeTuple = SerializeSequence;
    type SerializeTupleStruct = SerializeSequence;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMapping;
    type SerializeStruct = SerializeMapping;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(v.into())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        v.iter()
            .copied()
            .map(Value::from)
            .collect::<Vec<_>>()
            .pipe(Value::Sequence)
            .pipe(Ok)
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str) -> Result<Value> {
        Ok(variant.into())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        value.serialize(self).map(|value| single_entry(variant, value))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeSequence(Vec::with_capacity(len.unwrap_or_default())))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMapping {
            map: IndexMap::with_capacity(len.unwrap_or_default()),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            map: IndexMap::with_capacity(len),
        })
    }
}

pub struct SerializeSequence(Vec<Value>);

impl ser::SerializeSeq for SerializeSequence {
    type Ok = Value;
    type Error = self::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(Serializer).map(|value| self.0.push(value))
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Sequence(self.0))
    }
}

impl ser::SerializeTuple for SerializeSequence {
    type Ok = Value;
    type Error = self::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSequence {
    type Ok = Value;
    type Error = self::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = self::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(Serializer).map(|value| self.items.push(value))
    }

    fn end(self) -> Result<Value> {
        Ok(single_entry(self.variant, Value::Sequence(self.items)))
    }
}

pub struct SerializeMapping {
    map: IndexMap<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMapping {
    type Ok = Value;
    type Error = self::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        key.serialize(Serializer)
            .and_then(map_key)
            .map(|key| self.next_key = Some(key))
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self.next_key.take().ok_or(self::Error::ValueWithoutKey)?;
        value.serialize(Serializer).map(|value| {
            self.map.insert(key, value);
        })
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Mapping(self.map))
    }
}

impl ser::SerializeStruct for SerializeMapping {
    type Ok = Value;
    type Error = self::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        value.serialize(Serializer).map(|value| {
            self.map.insert(key.to_owned(), value);
        })
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Mapping(self.map))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    map: IndexMap<String, Value>,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = self::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        value.serialize(Serializer).map(|value| {
            self.map.insert(key.to_owned(), value);
        })
    }

    fn end(self) -> Result<Value> {
        Ok(single_entry(self.variant, Value::Mapping(self.map)))
    }
}
