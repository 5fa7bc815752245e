//! FHIR Extension

use crate::datatypes::{CodeableConcept, Coding, Period, Quantity, Reference};
use crate::element::Element;
use crate::error::Result;
use crate::primitive::Primitive;
use crate::property::{Property, PropertyReader, PropertyWriter};
use crate::record::Record;

choice_type! {
    /// Extension.value[x]
    pub enum ExtensionValue("value") {
        primitive String(String),
        primitive Boolean(bool),
        primitive Integer(i32),
        primitive Decimal(rust_decimal::Decimal),
        primitive Code(String),
        primitive Uri(String),
        primitive DateTime(String),
        complex Coding(Coding),
        complex CodeableConcept(CodeableConcept),
        complex Quantity(Quantity),
        complex Period(Period),
        complex Reference(Reference),
    }
}

/// Optional extension element - found in all resources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extension {
    pub base: Element,

    /// Identifies the meaning of the extension
    pub url: Option<String>,

    /// Value of extension
    pub value: Option<ExtensionValue>,
}

impl Extension {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: ExtensionValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Nested extensions of a complex extension
    pub fn extensions(&self) -> &[Extension] {
        self.base.extensions()
    }

    pub fn value_string(&self) -> Option<&str> {
        match &self.value {
            Some(ExtensionValue::String(Primitive { value: Some(v), .. })) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl Record for Extension {
    type Base = Element;
    const TYPE_NAME: &'static str = "Extension";
    const PROPERTIES: &'static [Property] = &[
        Property::value("url"),
        Property::choice("value", <ExtensionValue as crate::choice::ChoiceType>::group),
    ];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.value("url", &self.url)?;
        writer.choice(&self.value)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            url: reader.value("url")?,
            value: reader.choice()?,
        })
    }
}

impl_json_codec!(Extension);
