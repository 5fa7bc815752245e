//! HumanName

use crate::datatypes::Period;
use crate::element::Element;
use crate::error::Result;
use crate::primitive::{Code, FhirString};
use crate::property::{Property, PropertyReader, PropertyWriter};
use crate::record::Record;

/// Name of a human - parts and usage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HumanName {
    pub base: Element,

    /// `usual` | `official` | `temp` | `nickname` | `anonymous` | `old` | `maiden`
    pub use_: Option<Code>,

    pub text: Option<FhirString>,
    pub family: Option<FhirString>,
    pub given: Option<Vec<FhirString>>,
    pub prefix: Option<Vec<FhirString>>,
    pub suffix: Option<Vec<FhirString>>,
    pub period: Option<Period>,
}

impl HumanName {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: Some(family.into().into()),
            ..Self::default()
        }
    }

    pub fn with_given(mut self, given: impl Into<String>) -> Self {
        self.given
            .get_or_insert_with(Vec::new)
            .push(given.into().into());
        self
    }

    pub fn with_use(mut self, use_: impl Into<String>) -> Self {
        self.use_ = Some(use_.into().into());
        self
    }

    /// Given names that carry a value, in order
    pub fn given_names(&self) -> impl Iterator<Item = &str> {
        self.given
            .iter()
            .flatten()
            .filter_map(|p| p.value().map(String::as_str))
    }
}

impl Record for HumanName {
    type Base = Element;
    const TYPE_NAME: &'static str = "HumanName";
    const PROPERTIES: &'static [Property] = &[
        Property::primitive("use"),
        Property::primitive("text"),
        Property::primitive("family"),
        Property::primitive("given"),
        Property::primitive("prefix"),
        Property::primitive("suffix"),
        Property::complex("period"),
    ];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("use", &self.use_)?;
        writer.primitive("text", &self.text)?;
        writer.primitive("family", &self.family)?;
        writer.primitives("given", &self.given)?;
        writer.primitives("prefix", &self.prefix)?;
        writer.primitives("suffix", &self.suffix)?;
        writer.complex("period", &self.period)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            use_: reader.primitive("use")?,
            text: reader.primitive("text")?,
            family: reader.primitive("family")?,
            given: reader.primitives("given")?,
            prefix: reader.primitives("prefix")?,
            suffix: reader.primitives("suffix")?,
            period: reader.complex("period")?,
        })
    }
}

impl_json_codec!(HumanName);
