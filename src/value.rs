//! Dynamic wire-model values exchanged with the row source.
//!
//! Every bound argument and every scanned column crosses the driver boundary
//! as a [`Value`]. The [`IntoValue`] and [`FromValue`] traits cover the scalar
//! and collection types the binder and scanner move around; [`ValueSink`]
//! turns any `FromValue` type into a writable scan slot.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A single CQL value in its dynamic wire form.
///
/// `Unset` is the driver sentinel for "leave this column untouched"; binding
/// it on an UPDATE or INSERT skips the column instead of writing null. See
/// [`crate::bind::unset_empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Unset,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(i64),
    Uuid([u8; 16]),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    /// A user-defined type value: an ordered, named tuple of sub-attributes.
    Udt(Vec<(String, Value)>),
}

impl Value {
    /// Short type label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unset => "unset",
            Value::Boolean(_) => "boolean",
            Value::TinyInt(_) => "tinyint",
            Value::SmallInt(_) => "smallint",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Udt(_) => "udt",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Value::Unset)
    }
}

/// Conversion from an application value into its wire form.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion from a wire value back into an application value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

/// A writable destination slot for one scanned column.
pub trait ValueSink {
    fn put(&mut self, value: Value) -> Result<()>;
}

impl<T: FromValue> ValueSink for T {
    fn put(&mut self, value: Value) -> Result<()> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

fn mismatch(got: &Value, want: &'static str) -> Error {
    Error::shape(format!("cannot read {} into {}", got.kind(), want))
}

macro_rules! scalar_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {$(
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch(&other, stringify!($ty))),
                }
            }
        }
    )+};
}

scalar_value! {
    bool => Boolean,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    f32 => Float,
    f64 => Double,
    String => Text,
    [u8; 16] => Uuid,
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::BigInt(self)
    }
}

impl FromValue for i64 {
    /// Accepts the three 64-bit-representable integer columns.
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::BigInt(v) | Value::Timestamp(v) => Ok(v),
            Value::Int(v) => Ok(i64::from(v)),
            other => Err(mismatch(&other, "i64")),
        }
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

/// Blob column wrapper. A bare `Vec<u8>` would collide with list decoding,
/// so blobs travel through this newtype.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl IntoValue for Bytes {
    fn into_value(self) -> Value {
        Value::Blob(self.0)
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(Bytes(b)),
            Value::Null => Ok(Bytes::default()),
            other => Err(mismatch(&other, "Bytes")),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => Ok(Some(T::from_value(other)?)),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            // the wire reports empty collections as null
            Value::Null => Ok(Vec::new()),
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(&other, "Vec<_>")),
        }
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (Value::Text(k), v.into_value()))
                .collect(),
        )
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(BTreeMap::new()),
            Value::Map(pairs) => pairs
                .into_iter()
                .map(|(k, v)| match k {
                    Value::Text(k) => Ok((k, T::from_value(v)?)),
                    other => Err(mismatch(&other, "map key (text)")),
                })
                .collect(),
            other => Err(mismatch(&other, "BTreeMap<String, _>")),
        }
    }
}
