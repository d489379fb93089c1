//! Custom attribute argument decoding.
//!
//! Raw constructor arguments arrive layered: an `object`-typed argument boxes the
//! real argument, possibly more than once, and array arguments hold a list of
//! arguments that may be boxed in turn. [`decode_annotation_argument`] strips all
//! of that and yields a [`DecodedValue`] edit logic can match on directly.
//!
//! Decoding is total and idempotent: every argument decodes to a plain value or a
//! list of plain values, and re-decoding a decoded value (converted back with
//! `From<DecodedValue>`) returns it unchanged.
//!
//! # Example
//!
//! ```
//! use insider_core::attributes::{decode_annotation_argument, DecodedValue};
//! use insider_types::{AttributeValue, CustomAttributeArgument};
//!
//! let arg = CustomAttributeArgument::new(AttributeValue::I32(42)).boxed().boxed();
//! assert_eq!(decode_annotation_argument(&arg), DecodedValue::I32(42));
//! ```

use std::fmt;

use insider_types::{AttributeValue, CustomAttribute, CustomAttributeArgument, TypeReference};

/// A fully unwrapped argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Type(TypeReference),
    Array(Vec<DecodedValue>),
}

/// Decode one constructor argument.
pub fn decode_annotation_argument(argument: &CustomAttributeArgument) -> DecodedValue {
    decode_value(&argument.value)
}

/// Decode every constructor argument of `attribute`, in order.
pub fn decode_arguments(attribute: &CustomAttribute) -> Vec<DecodedValue> {
    attribute
        .arguments
        .iter()
        .map(decode_annotation_argument)
        .collect()
}

/// Decode a raw value, unwrapping any number of box layers.
///
/// Box layers are peeled in a loop, so stack use does not grow with their number.
pub fn decode_value(value: &AttributeValue) -> DecodedValue {
    let mut value = value;
    while let AttributeValue::Boxed(inner) = value {
        value = &inner.value;
    }
    match value {
        AttributeValue::Boxed(_) | AttributeValue::Null => DecodedValue::Null,
        AttributeValue::Bool(v) => DecodedValue::Bool(*v),
        AttributeValue::Char(v) => DecodedValue::Char(*v),
        AttributeValue::I8(v) => DecodedValue::I8(*v),
        AttributeValue::U8(v) => DecodedValue::U8(*v),
        AttributeValue::I16(v) => DecodedValue::I16(*v),
        AttributeValue::U16(v) => DecodedValue::U16(*v),
        AttributeValue::I32(v) => DecodedValue::I32(*v),
        AttributeValue::U32(v) => DecodedValue::U32(*v),
        AttributeValue::I64(v) => DecodedValue::I64(*v),
        AttributeValue::U64(v) => DecodedValue::U64(*v),
        AttributeValue::F32(v) => DecodedValue::F32(*v),
        AttributeValue::F64(v) => DecodedValue::F64(*v),
        AttributeValue::String(v) => DecodedValue::String(v.clone()),
        AttributeValue::Type(v) => DecodedValue::Type(v.clone()),
        AttributeValue::Array(items) => {
            DecodedValue::Array(items.iter().map(decode_annotation_argument).collect())
        }
    }
}

impl DecodedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DecodedValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Any integer value that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            DecodedValue::I8(v) => Some(v.into()),
            DecodedValue::U8(v) => Some(v.into()),
            DecodedValue::I16(v) => Some(v.into()),
            DecodedValue::U16(v) => Some(v.into()),
            DecodedValue::I32(v) => Some(v.into()),
            DecodedValue::U32(v) => Some(v.into()),
            DecodedValue::I64(v) => Some(v),
            DecodedValue::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            DecodedValue::F32(v) => Some(v.into()),
            DecodedValue::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeReference> {
        match self {
            DecodedValue::Type(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl From<DecodedValue> for AttributeValue {
    fn from(value: DecodedValue) -> Self {
        match value {
            DecodedValue::Null => AttributeValue::Null,
            DecodedValue::Bool(v) => AttributeValue::Bool(v),
            DecodedValue::Char(v) => AttributeValue::Char(v),
            DecodedValue::I8(v) => AttributeValue::I8(v),
            DecodedValue::U8(v) => AttributeValue::U8(v),
            DecodedValue::I16(v) => AttributeValue::I16(v),
            DecodedValue::U16(v) => AttributeValue::U16(v),
            DecodedValue::I32(v) => AttributeValue::I32(v),
            DecodedValue::U32(v) => AttributeValue::U32(v),
            DecodedValue::I64(v) => AttributeValue::I64(v),
            DecodedValue::U64(v) => AttributeValue::U64(v),
            DecodedValue::F32(v) => AttributeValue::F32(v),
            DecodedValue::F64(v) => AttributeValue::F64(v),
            DecodedValue::String(v) => AttributeValue::String(v),
            DecodedValue::Type(v) => AttributeValue::Type(v),
            DecodedValue::Array(items) => AttributeValue::Array(
                items
                    .into_iter()
                    .map(|item| CustomAttributeArgument::new(item.into()))
                    .collect(),
            ),
        }
    }
}

impl From<DecodedValue> for CustomAttributeArgument {
    fn from(value: DecodedValue) -> Self {
        CustomAttributeArgument::new(value.into())
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Null => write!(f, "null"),
            DecodedValue::Bool(v) => write!(f, "{}", v),
            DecodedValue::Char(v) => write!(f, "'{}'", v),
            DecodedValue::I8(v) => write!(f, "{}", v),
            DecodedValue::U8(v) => write!(f, "{}", v),
            DecodedValue::I16(v) => write!(f, "{}", v),
            DecodedValue::U16(v) => write!(f, "{}", v),
            DecodedValue::I32(v) => write!(f, "{}", v),
            DecodedValue::U32(v) => write!(f, "{}", v),
            DecodedValue::I64(v) => write!(f, "{}", v),
            DecodedValue::U64(v) => write!(f, "{}", v),
            DecodedValue::F32(v) => write!(f, "{}", v),
            DecodedValue::F64(v) => write!(f, "{}", v),
            DecodedValue::String(v) => write!(f, "{:?}", v),
            DecodedValue::Type(v) => write!(f, "typeof({})", v.full_name()),
            DecodedValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
