//! Coding and CodeableConcept

use crate::element::Element;
use crate::error::Result;
use crate::primitive::{Boolean, Code, FhirString, Uri};
use crate::property::{Property, PropertyReader, PropertyWriter};
use crate::record::Record;

/// A reference to a code defined by a terminology system
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coding {
    pub base: Element,

    /// Identity of the terminology system
    pub system: Option<Uri>,

    /// Version of the system - if relevant
    pub version: Option<FhirString>,

    /// Symbol in syntax defined by the system
    pub code: Option<Code>,

    /// Representation defined by the system
    pub display: Option<FhirString>,

    /// If this coding was chosen directly by the user
    pub user_selected: Option<Boolean>,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into().into()),
            code: Some(code.into().into()),
            ..Self::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into().into());
        self
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_ref().and_then(|p| p.value()).map(String::as_str)
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_ref().and_then(|p| p.value()).map(String::as_str)
    }
}

impl Record for Coding {
    type Base = Element;
    const TYPE_NAME: &'static str = "Coding";
    const PROPERTIES: &'static [Property] = &[
        Property::primitive("system"),
        Property::primitive("version"),
        Property::primitive("code"),
        Property::primitive("display"),
        Property::primitive("userSelected"),
    ];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("system", &self.system)?;
        writer.primitive("version", &self.version)?;
        writer.primitive("code", &self.code)?;
        writer.primitive("display", &self.display)?;
        writer.primitive("userSelected", &self.user_selected)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            system: reader.primitive("system")?,
            version: reader.primitive("version")?,
            code: reader.primitive("code")?,
            display: reader.primitive("display")?,
            user_selected: reader.primitive("userSelected")?,
        })
    }
}

/// Concept - reference to a terminology or just text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeableConcept {
    pub base: Element,

    /// Code defined by a terminology system
    pub coding: Option<Vec<Coding>>,

    /// Plain text representation of the concept
    pub text: Option<FhirString>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: Some(vec![coding]),
            ..Self::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into().into()),
            ..Self::default()
        }
    }

    pub fn codings(&self) -> &[Coding] {
        self.coding.as_deref().unwrap_or(&[])
    }

    /// Whether any coding matches `system` and `code`
    pub fn has_coding(&self, system: &str, code: &str) -> bool {
        self.codings()
            .iter()
            .any(|c| c.system() == Some(system) && c.code() == Some(code))
    }
}

impl Record for CodeableConcept {
    type Base = Element;
    const TYPE_NAME: &'static str = "CodeableConcept";
    const PROPERTIES: &'static [Property] =
        &[Property::complex("coding"), Property::primitive("text")];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.complexes("coding", &self.coding)?;
        writer.primitive("text", &self.text)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            coding: reader.complexes("coding")?,
            text: reader.primitive("text")?,
        })
    }
}

impl_json_codec!(Coding, CodeableConcept);
