//! Resource metadata and narrative

use crate::datatypes::Coding;
use crate::element::Element;
use crate::error::Result;
use crate::primitive::{Canonical, Code, Id, Instant, Uri};
use crate::property::{Property, PropertyReader, PropertyWriter};
use crate::record::Record;
use serde_json::Value;

/// Metadata about a resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub base: Element,
    pub version_id: Option<Id>,
    pub last_updated: Option<Instant>,
    pub source: Option<Uri>,

    /// Profiles this resource claims to conform to
    pub profile: Option<Vec<Canonical>>,

    pub security: Option<Vec<Coding>>,
    pub tag: Option<Vec<Coding>>,
}

impl Meta {
    pub fn with_profile(profile: impl Into<String>) -> Self {
        let mut meta = Self::default();
        meta.add_profile(profile);
        meta
    }

    pub fn add_profile(&mut self, profile: impl Into<String>) {
        self.profile
            .get_or_insert_with(Vec::new)
            .push(profile.into().into());
    }

    pub fn add_tag(&mut self, tag: Coding) {
        self.tag.get_or_insert_with(Vec::new).push(tag);
    }

    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.profile
            .iter()
            .flatten()
            .filter_map(|p| p.value().map(String::as_str))
    }
}

impl Record for Meta {
    type Base = Element;
    const TYPE_NAME: &'static str = "Meta";
    const PROPERTIES: &'static [Property] = &[
        Property::primitive("versionId"),
        Property::primitive("lastUpdated"),
        Property::primitive("source"),
        Property::primitive("profile"),
        Property::complex("security"),
        Property::complex("tag"),
    ];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("versionId", &self.version_id)?;
        writer.primitive("lastUpdated", &self.last_updated)?;
        writer.primitive("source", &self.source)?;
        writer.primitives("profile", &self.profile)?;
        writer.complexes("security", &self.security)?;
        writer.complexes("tag", &self.tag)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            version_id: reader.primitive("versionId")?,
            last_updated: reader.primitive("lastUpdated")?,
            source: reader.primitive("source")?,
            profile: reader.primitives("profile")?,
            security: reader.complexes("security")?,
            tag: reader.complexes("tag")?,
        })
    }
}

/// Human-readable summary of a resource
///
/// `div` is limited XHTML kept as an opaque JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Narrative {
    pub base: Element,

    /// `generated` | `extensions` | `additional` | `empty`
    pub status: Option<Code>,

    pub div: Option<Value>,
}

impl Narrative {
    pub fn new(status: impl Into<String>, div: impl Into<String>) -> Self {
        Self {
            status: Some(status.into().into()),
            div: Some(Value::String(div.into())),
            ..Self::default()
        }
    }

    pub fn generated(div: impl Into<String>) -> Self {
        Self::new("generated", div)
    }

    pub fn div(&self) -> Option<&str> {
        self.div.as_ref().and_then(Value::as_str)
    }
}

impl Record for Narrative {
    type Base = Element;
    const TYPE_NAME: &'static str = "Narrative";
    const PROPERTIES: &'static [Property] =
        &[Property::primitive("status"), Property::value("div")];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("status", &self.status)?;
        writer.value("div", &self.div)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            status: reader.primitive("status")?,
            div: reader.value("div")?,
        })
    }
}

impl_json_codec!(Meta, Narrative);
