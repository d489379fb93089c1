//! Custom attributes as stored in module metadata.
//!
//! Constructor arguments keep the layering the on-disk format introduces: an
//! argument declared as `object` holds a boxed [`CustomAttributeArgument`] carrying
//! the real value, and array arguments hold a list of arguments, each of which may
//! itself be boxed.

use serde::{Deserialize, Serialize};

use crate::type_ref::TypeReference;

/// A custom attribute attached to a type or method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAttribute {
    pub attribute_type: TypeReference,
    #[serde(default)]
    pub arguments: Vec<CustomAttributeArgument>,
}

impl CustomAttribute {
    pub fn new(attribute_type: TypeReference) -> Self {
        Self {
            attribute_type,
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: CustomAttributeArgument) -> Self {
        self.arguments.push(argument);
        self
    }
}

/// One constructor argument: its declared type and its raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAttributeArgument {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub arg_type: Option<TypeReference>,
    pub value: AttributeValue,
}

impl CustomAttributeArgument {
    pub fn new(value: AttributeValue) -> Self {
        Self {
            arg_type: None,
            value,
        }
    }

    pub fn typed(arg_type: TypeReference, value: AttributeValue) -> Self {
        Self {
            arg_type: Some(arg_type),
            value,
        }
    }

    /// Wrap this argument in an `object`-typed box.
    pub fn boxed(self) -> Self {
        Self::new(AttributeValue::Boxed(Box::new(self)))
    }

    /// An array argument over `elements`.
    pub fn array(elements: Vec<CustomAttributeArgument>) -> Self {
        Self::new(AttributeValue::Array(elements))
    }
}

/// Raw argument value, possibly wrapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
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
    Boxed(Box<CustomAttributeArgument>),
    Array(Vec<CustomAttributeArgument>),
}

impl AttributeValue {
    /// Whether this value is a wrapper layer rather than a plain value.
    pub fn is_wrapper(&self) -> bool {
        matches!(self, AttributeValue::Boxed(_) | AttributeValue::Array(_))
    }
}
