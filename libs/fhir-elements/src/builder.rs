//! Fluent record builders
//!
//! A [`RecordBuilder`] owns a private draft record. Setters may be called in
//! any order and repeated calls overwrite; [`build`](RecordBuilder::build)
//! hands out a detached copy of the draft, so a builder can keep
//! accumulating and build again.
//!
//! Level setters come from [`ElementBuilder`], [`BackboneElementBuilder`] and
//! [`DomainResourceBuilder`], which are available according to the record's
//! base level. Concrete types add their own named setters on
//! `RecordBuilder<TheirType>`.

use crate::choice::ChoiceType;
use crate::datatypes::{Extension, Meta, Narrative};
use crate::element::{
    BackboneElement, DomainResource, Element, HasBackboneElement, HasDomainResource, HasElement,
};
use crate::error::Result;
use crate::record::Record;
use crate::resources::Resource;
use crate::validation::Validator;
use serde_json::Value;

/// Accumulates a record of type `T`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBuilder<T: Record> {
    draft: T,
}

impl<T: Record + Default> Default for RecordBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordBuilder<T> {
    pub fn new() -> Self
    where
        T: Default,
    {
        Self { draft: T::default() }
    }

    /// Starts from an existing record.
    pub fn from_record(record: T) -> Self {
        Self { draft: record }
    }

    /// The record accumulated so far
    pub fn draft(&self) -> &T {
        &self.draft
    }

    /// Assigns fields directly on the draft.
    pub fn set<F>(&mut self, assign: F) -> &mut Self
    where
        F: FnOnce(&mut T),
    {
        assign(&mut self.draft);
        self
    }

    /// Appends to a sequence field, creating the sequence on first use.
    pub fn add_to_array<V, F>(&mut self, field: F, value: V) -> &mut Self
    where
        F: FnOnce(&mut T) -> &mut Option<Vec<V>>,
    {
        field(&mut self.draft)
            .get_or_insert_with(Vec::new)
            .push(value);
        self
    }

    /// Sets a choice group, replacing whichever variant it held.
    pub fn set_choice_type<C, F>(&mut self, field: F, value: C) -> &mut Self
    where
        C: ChoiceType,
        F: FnOnce(&mut T) -> &mut Option<C>,
    {
        let slot = field(&mut self.draft);
        if let Some(previous) = slot.as_ref() {
            if previous.variant() != value.variant() {
                tracing::trace!(
                    group = C::group().name,
                    from = previous.variant(),
                    to = value.variant(),
                    "replacing choice variant"
                );
            }
        }
        *slot = Some(value);
        self
    }

    /// Sets a choice group from a variant suffix and its JSON value.
    ///
    /// Fails with [`Error::InvalidArgument`](crate::Error::InvalidArgument)
    /// when `suffix` is not one of the group's variants; the draft is left
    /// unchanged in that case.
    pub fn set_choice_variant<C, F>(&mut self, field: F, suffix: &str, value: Value) -> Result<&mut Self>
    where
        C: ChoiceType,
        F: FnOnce(&mut T) -> &mut Option<C>,
    {
        let choice = C::from_variant(suffix, value)?;
        Ok(self.set_choice_type(field, choice))
    }

    /// Builds a detached record. Never validates.
    pub fn build(&self) -> T {
        self.draft.clone()
    }

    /// Builds a record and runs `validator` on it.
    ///
    /// The validator's error is returned as is and the built record is
    /// dropped.
    pub async fn build_or_throw<V>(&self, validator: &V) -> std::result::Result<T, V::Error>
    where
        V: Validator<T> + ?Sized,
    {
        let record = self.build();
        match validator.validate_or_throw(&record).await {
            Ok(()) => {
                tracing::debug!(record_type = T::TYPE_NAME, "record passed validation");
                Ok(record)
            }
            Err(err) => {
                tracing::debug!(record_type = T::TYPE_NAME, "record rejected by validator");
                Err(err)
            }
        }
    }
}

/// Setters for `Element` level fields
pub trait ElementBuilder {
    fn element_mut(&mut self) -> &mut Element;

    fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.element_mut().id = Some(id.into());
        self
    }

    fn add_extension(&mut self, extension: Extension) -> &mut Self {
        self.element_mut().add_extension(extension);
        self
    }
}

/// Setters for `BackboneElement` level fields
pub trait BackboneElementBuilder: ElementBuilder {
    fn backbone_element_mut(&mut self) -> &mut BackboneElement;

    fn add_modifier_extension(&mut self, extension: Extension) -> &mut Self {
        self.backbone_element_mut().add_modifier_extension(extension);
        self
    }
}

/// Setters for `DomainResource` level fields
pub trait DomainResourceBuilder: BackboneElementBuilder {
    fn domain_resource_mut(&mut self) -> &mut DomainResource;

    fn set_meta(&mut self, meta: Meta) -> &mut Self {
        self.domain_resource_mut().meta = Some(meta);
        self
    }

    fn set_implicit_rules(&mut self, implicit_rules: impl Into<String>) -> &mut Self {
        self.domain_resource_mut().implicit_rules = Some(implicit_rules.into().into());
        self
    }

    fn set_language(&mut self, language: impl Into<String>) -> &mut Self {
        self.domain_resource_mut().language = Some(language.into().into());
        self
    }

    fn set_text(&mut self, text: Narrative) -> &mut Self {
        self.domain_resource_mut().text = Some(text);
        self
    }

    fn add_contained(&mut self, resource: impl Into<Resource>) -> &mut Self {
        self.domain_resource_mut().add_contained(resource.into());
        self
    }
}

impl<T: Record> ElementBuilder for RecordBuilder<T> {
    fn element_mut(&mut self) -> &mut Element {
        self.draft.base_mut().element_mut()
    }
}

impl<T> BackboneElementBuilder for RecordBuilder<T>
where
    T: Record,
    T::Base: HasBackboneElement,
{
    fn backbone_element_mut(&mut self) -> &mut BackboneElement {
        self.draft.base_mut().backbone_element_mut()
    }
}

impl<T> DomainResourceBuilder for RecordBuilder<T>
where
    T: Record,
    T::Base: HasDomainResource,
{
    fn domain_resource_mut(&mut self) -> &mut DomainResource {
        self.draft.base_mut().domain_resource_mut()
    }
}
