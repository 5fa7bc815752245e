//! FHIR primitive values and their `_name` shadow
//!
//! In FHIR JSON a primitive is split across two keys: `"status": "final"`
//! carries the value and `"_status": {"id": ..., "extension": [...]}` carries
//! the element metadata. Either side may be present without the other.

use crate::element::Element;
use serde_json::{Number, Value};
use std::str::FromStr;

/// A primitive value together with its optional shadow element
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive<T> {
    pub value: Option<T>,
    pub element: Option<Element>,
}

pub type Boolean = Primitive<bool>;
pub type Integer = Primitive<i32>;
pub type Decimal = Primitive<rust_decimal::Decimal>;
pub type FhirString = Primitive<String>;
pub type Code = Primitive<String>;
pub type Uri = Primitive<String>;
pub type Canonical = Primitive<String>;
pub type Id = Primitive<String>;
pub type Date = Primitive<String>;
pub type DateTime = Primitive<String>;
pub type Instant = Primitive<String>;

/// Conversion of a primitive value to and from its JSON form
pub trait PrimitiveValue: Sized {
    fn to_json_value(&self) -> serde_json::Result<Value>;

    fn from_json_value(value: Value) -> serde_json::Result<Self>;
}

macro_rules! primitive_value_via_serde {
    ($($ty:ty),+) => {$(
        impl PrimitiveValue for $ty {
            fn to_json_value(&self) -> serde_json::Result<Value> {
                serde_json::to_value(self)
            }

            fn from_json_value(value: Value) -> serde_json::Result<Self> {
                serde_json::from_value(value)
            }
        }
    )+};
}

primitive_value_via_serde!(bool, i32, String);

/// Decimals keep the written form of the number: `72` stays `72` and
/// `1.50` keeps its trailing zero.
impl PrimitiveValue for rust_decimal::Decimal {
    fn to_json_value(&self) -> serde_json::Result<Value> {
        Number::from_str(&self.to_string()).map(Value::Number)
    }

    fn from_json_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Number(number) => {
                let text = number.to_string();
                rust_decimal::Decimal::from_str(&text)
                    .or_else(|_| rust_decimal::Decimal::from_scientific(&text))
                    .map_err(serde::de::Error::custom)
            }
            other => Err(serde::de::Error::custom(format!(
                "expected a decimal number, found {}",
                other
            ))),
        }
    }
}

impl<T> Default for Primitive<T> {
    fn default() -> Self {
        Self {
            value: None,
            element: None,
        }
    }
}

impl<T> Primitive<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Some(value),
            element: None,
        }
    }

    /// Annotation without a value
    pub fn shadow(element: Element) -> Self {
        Self {
            value: None,
            element: Some(element),
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn has_shadow(&self) -> bool {
        self.element.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Returns `true` if neither a value nor a non-empty shadow is present.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && !self.has_shadow()
    }
}

impl<T> From<T> for Primitive<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Primitive<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}
