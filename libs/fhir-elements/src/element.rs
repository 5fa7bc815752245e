//! Record base levels
//!
//! The hierarchy is additive: [`Element`] carries an id and extensions,
//! [`BackboneElement`] embeds an `Element` and adds modifier extensions, and
//! [`DomainResource`] embeds a `BackboneElement` and adds resource metadata.
//! Every concrete record embeds exactly one of these as its `base`.

use crate::datatypes::{Extension, Meta, Narrative};
use crate::error::Result;
use crate::primitive::{Code, Uri};
use crate::property::{Property, PropertyReader, PropertyWriter};
use crate::resources::Resource;

/// A record level: writes and reads its own fields ahead of the
/// type-specific ones.
pub trait Level: HasElement + Default + Clone + PartialEq + Send + Sync + 'static {
    /// Root-level records are preceded by a `resourceType` discriminator.
    const DISCRIMINATED: bool = false;

    /// Fields owned by this level, in serialization order
    const PROPERTIES: &'static [Property];

    fn serialize_level_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()>;

    fn assign_level(reader: &mut PropertyReader<'_>) -> Result<Self>;
}

pub trait HasElement {
    fn element(&self) -> &Element;
    fn element_mut(&mut self) -> &mut Element;
}

pub trait HasBackboneElement: HasElement {
    fn backbone_element(&self) -> &BackboneElement;
    fn backbone_element_mut(&mut self) -> &mut BackboneElement;
}

pub trait HasDomainResource: HasBackboneElement {
    fn domain_resource(&self) -> &DomainResource;
    fn domain_resource_mut(&mut self) -> &mut DomainResource;
}

/// Base of all elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Unique id for inter-element referencing
    pub id: Option<String>,

    /// Additional content defined by implementations
    pub extension: Option<Vec<Extension>>,
}

impl Element {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            extension: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.extension.is_none()
    }

    pub fn extensions(&self) -> &[Extension] {
        self.extension.as_deref().unwrap_or(&[])
    }

    /// Extensions with the given url
    pub fn extensions_by_url<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a Extension> {
        self.extensions()
            .iter()
            .filter(move |e| e.url.as_deref() == Some(url))
    }

    pub fn add_extension(&mut self, extension: Extension) {
        self.extension.get_or_insert_with(Vec::new).push(extension);
    }

    pub fn serialize_element_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.value("id", &self.id)?;
        writer.complexes("extension", &self.extension)?;
        Ok(())
    }
}

impl Level for Element {
    const PROPERTIES: &'static [Property] = &[Property::value("id"), Property::complex("extension")];

    fn serialize_level_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        self.serialize_element_to(writer)
    }

    fn assign_level(reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            id: reader.value("id")?,
            extension: reader.complexes("extension")?,
        })
    }
}

impl HasElement for Element {
    fn element(&self) -> &Element {
        self
    }

    fn element_mut(&mut self) -> &mut Element {
        self
    }
}

/// Base for elements nested inside resources
///
/// Modifier extensions change the meaning of the element that carries them;
/// a consumer that does not understand one must not process the element as
/// if it were absent. They are therefore kept apart from `extension`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackboneElement {
    pub base: Element,

    /// Extensions that cannot be ignored
    pub modifier_extension: Option<Vec<Extension>>,
}

impl BackboneElement {
    pub fn modifier_extensions(&self) -> &[Extension] {
        self.modifier_extension.as_deref().unwrap_or(&[])
    }

    pub fn add_modifier_extension(&mut self, extension: Extension) {
        self.modifier_extension
            .get_or_insert_with(Vec::new)
            .push(extension);
    }

    pub fn serialize_backbone_element_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        self.base.serialize_element_to(writer)?;
        writer.complexes("modifierExtension", &self.modifier_extension)?;
        Ok(())
    }
}

impl Level for BackboneElement {
    const PROPERTIES: &'static [Property] = &[
        Property::value("id"),
        Property::complex("extension"),
        Property::complex("modifierExtension"),
    ];

    fn serialize_level_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        self.serialize_backbone_element_to(writer)
    }

    fn assign_level(reader: &mut PropertyReader<'_>) -> Result<Self> {
        let base = Element::assign_level(reader)?;
        Ok(Self {
            base,
            modifier_extension: reader.complexes("modifierExtension")?,
        })
    }
}

impl HasElement for BackboneElement {
    fn element(&self) -> &Element {
        &self.base
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.base
    }
}

impl HasBackboneElement for BackboneElement {
    fn backbone_element(&self) -> &BackboneElement {
        self
    }

    fn backbone_element_mut(&mut self) -> &mut BackboneElement {
        self
    }
}

/// Base for top-level resources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainResource {
    pub base: BackboneElement,

    /// Metadata about the resource
    pub meta: Option<Meta>,

    /// A set of rules under which this content was created
    pub implicit_rules: Option<Uri>,

    /// Language of the resource content
    pub language: Option<Code>,

    /// Text summary of the resource, for human interpretation
    pub text: Option<Narrative>,

    /// Contained, inline resources
    pub contained: Option<Vec<Resource>>,
}

impl DomainResource {
    pub fn contained(&self) -> &[Resource] {
        self.contained.as_deref().unwrap_or(&[])
    }

    pub fn add_contained(&mut self, resource: Resource) {
        self.contained.get_or_insert_with(Vec::new).push(resource);
    }

    pub fn serialize_domain_resource_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        self.base.serialize_backbone_element_to(writer)?;
        writer.complex("meta", &self.meta)?;
        writer.primitive("implicitRules", &self.implicit_rules)?;
        writer.primitive("language", &self.language)?;
        writer.complex("text", &self.text)?;
        writer.complexes("contained", &self.contained)?;
        Ok(())
    }
}

impl Level for DomainResource {
    const DISCRIMINATED: bool = true;

    const PROPERTIES: &'static [Property] = &[
        Property::value("id"),
        Property::complex("extension"),
        Property::complex("modifierExtension"),
        Property::complex("meta"),
        Property::primitive("implicitRules"),
        Property::primitive("language"),
        Property::complex("text"),
        Property::complex("contained"),
    ];

    fn serialize_level_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        self.serialize_domain_resource_to(writer)
    }

    fn assign_level(reader: &mut PropertyReader<'_>) -> Result<Self> {
        let base = BackboneElement::assign_level(reader)?;
        Ok(Self {
            base,
            meta: reader.complex("meta")?,
            implicit_rules: reader.primitive("implicitRules")?,
            language: reader.primitive("language")?,
            text: reader.complex("text")?,
            contained: reader.complexes("contained")?,
        })
    }
}

impl HasElement for DomainResource {
    fn element(&self) -> &Element {
        &self.base.base
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.base.base
    }
}

impl HasBackboneElement for DomainResource {
    fn backbone_element(&self) -> &BackboneElement {
        &self.base
    }

    fn backbone_element_mut(&mut self) -> &mut BackboneElement {
        &mut self.base
    }
}

impl HasDomainResource for DomainResource {
    fn domain_resource(&self) -> &DomainResource {
        self
    }

    fn domain_resource_mut(&mut self) -> &mut DomainResource {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use serde_json::{json, Value};

    fn write<L: Level>(level: &L) -> Value {
        let config = ModelConfig::default();
        let mut writer = PropertyWriter::new(&config);
        level.serialize_level_to(&mut writer).unwrap();
        Value::Object(writer.into_map())
    }

    #[test]
    fn test_element_level_order() {
        let mut element = Element::default();
        element.add_extension(Extension::new("http://example.org/a"));
        element.id = Some("e1".to_string());

        let json = write(&element);
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "extension"]);
        assert_eq!(json["extension"], json!([{"url": "http://example.org/a"}]));
    }

    #[test]
    fn test_backbone_keeps_modifier_extensions_apart() {
        let mut backbone = BackboneElement::default();
        backbone.base.add_extension(Extension::new("http://example.org/plain"));
        backbone.add_modifier_extension(Extension::new("http://example.org/modifier"));

        let json = write(&backbone);
        assert_eq!(json["extension"][0]["url"], "http://example.org/plain");
        assert_eq!(json["modifierExtension"][0]["url"], "http://example.org/modifier");
        assert_eq!(backbone.modifier_extensions().len(), 1);
    }

    #[test]
    fn test_domain_resource_level_order() {
        let mut resource = DomainResource::default();
        resource.text = Some(Narrative::generated("<div xmlns=\"http://www.w3.org/1999/xhtml\">x</div>"));
        resource.language = Some("en".into());
        resource.base.base.id = Some("r1".to_string());

        let json = write(&resource);
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "language", "text"]);
    }

    #[test]
    fn test_extensions_by_url() {
        let mut element = Element::default();
        element.add_extension(Extension::new("http://example.org/a"));
        element.add_extension(Extension::new("http://example.org/b"));
        element.add_extension(Extension::new("http://example.org/a"));
        assert_eq!(element.extensions_by_url("http://example.org/a").count(), 2);
    }
}
