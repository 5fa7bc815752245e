//! Observation resource

use crate::builder::RecordBuilder;
use crate::datatypes::{CodeableConcept, Period, Quantity, Reference};
use crate::element::{BackboneElement, DomainResource};
use crate::error::Result;
use crate::primitive::{Code, Instant};
use crate::property::{Property, PropertyReader, PropertyWriter};
use crate::record::Record;

choice_type! {
    /// Observation.effective[x]
    pub enum ObservationEffective("effective") {
        primitive DateTime(String),
        complex Period(Period),
        primitive Instant(String),
    }
}

choice_type! {
    /// Observation.value[x] and Observation.component.value[x]
    pub enum ObservationValue("value") {
        complex Quantity(Quantity),
        complex CodeableConcept(CodeableConcept),
        primitive String(String),
        primitive Boolean(bool),
        primitive Integer(i32),
        primitive DateTime(String),
        complex Period(Period),
    }
}

/// Measurements and simple assertions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub base: DomainResource,

    /// `registered` | `preliminary` | `final` | `amended` +
    pub status: Option<Code>,

    /// Classification of type of observation
    pub category: Option<Vec<CodeableConcept>>,

    /// Type of observation (code / type)
    pub code: Option<CodeableConcept>,

    /// Who and/or what the observation is about
    pub subject: Option<Reference>,

    /// Clinically relevant time/time-period for observation
    pub effective: Option<ObservationEffective>,

    /// Date/Time this version was made available
    pub issued: Option<Instant>,

    /// Actual result
    pub value: Option<ObservationValue>,

    /// Why the result is missing
    pub data_absent_reason: Option<CodeableConcept>,

    /// Component results
    pub component: Option<Vec<ObservationComponent>>,
}

impl Observation {
    pub fn builder() -> ObservationBuilder {
        ObservationBuilder::new()
    }

    pub fn status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|p| p.value())
            .map(String::as_str)
    }

    pub fn components(&self) -> &[ObservationComponent] {
        self.component.as_deref().unwrap_or(&[])
    }
}

impl Record for Observation {
    type Base = DomainResource;
    const TYPE_NAME: &'static str = "Observation";
    const PROPERTIES: &'static [Property] = &[
        Property::primitive("status"),
        Property::complex("category"),
        Property::complex("code"),
        Property::complex("subject"),
        Property::choice("effective", <ObservationEffective as crate::choice::ChoiceType>::group),
        Property::primitive("issued"),
        Property::choice("value", <ObservationValue as crate::choice::ChoiceType>::group),
        Property::complex("dataAbsentReason"),
        Property::complex("component"),
    ];

    fn base(&self) -> &DomainResource {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DomainResource {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("status", &self.status)?;
        writer.complexes("category", &self.category)?;
        writer.complex("code", &self.code)?;
        writer.complex("subject", &self.subject)?;
        writer.choice(&self.effective)?;
        writer.primitive("issued", &self.issued)?;
        writer.choice(&self.value)?;
        writer.complex("dataAbsentReason", &self.data_absent_reason)?;
        writer.complexes("component", &self.component)?;
        Ok(())
    }

    fn assign_props(base: DomainResource, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            status: reader.primitive("status")?,
            category: reader.complexes("category")?,
            code: reader.complex("code")?,
            subject: reader.complex("subject")?,
            effective: reader.choice()?,
            issued: reader.primitive("issued")?,
            value: reader.choice()?,
            data_absent_reason: reader.complex("dataAbsentReason")?,
            component: reader.complexes("component")?,
        })
    }
}

/// Component results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationComponent {
    pub base: BackboneElement,
    pub code: Option<CodeableConcept>,
    pub value: Option<ObservationValue>,
    pub data_absent_reason: Option<CodeableConcept>,
}

impl ObservationComponent {
    pub fn builder() -> ObservationComponentBuilder {
        ObservationComponentBuilder::new()
    }
}

impl Record for ObservationComponent {
    type Base = BackboneElement;
    const TYPE_NAME: &'static str = "Observation.component";
    const PROPERTIES: &'static [Property] = &[
        Property::complex("code"),
        Property::choice("value", <ObservationValue as crate::choice::ChoiceType>::group),
        Property::complex("dataAbsentReason"),
    ];

    fn base(&self) -> &BackboneElement {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BackboneElement {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.complex("code", &self.code)?;
        writer.choice(&self.value)?;
        writer.complex("dataAbsentReason", &self.data_absent_reason)?;
        Ok(())
    }

    fn assign_props(base: BackboneElement, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            code: reader.complex("code")?,
            value: reader.choice()?,
            data_absent_reason: reader.complex("dataAbsentReason")?,
        })
    }
}

impl_json_codec!(Observation, ObservationComponent);

pub type ObservationBuilder = RecordBuilder<Observation>;
pub type ObservationComponentBuilder = RecordBuilder<ObservationComponent>;

impl RecordBuilder<Observation> {
    pub fn set_status(&mut self, status: impl Into<String>) -> &mut Self {
        self.set(|o| o.status = Some(status.into().into()))
    }

    pub fn add_category(&mut self, category: CodeableConcept) -> &mut Self {
        self.add_to_array(|o| &mut o.category, category)
    }

    pub fn set_code(&mut self, code: CodeableConcept) -> &mut Self {
        self.set(|o| o.code = Some(code))
    }

    pub fn set_subject(&mut self, subject: Reference) -> &mut Self {
        self.set(|o| o.subject = Some(subject))
    }

    pub fn set_effective(&mut self, effective: ObservationEffective) -> &mut Self {
        self.set_choice_type(|o| &mut o.effective, effective)
    }

    pub fn set_issued(&mut self, issued: impl Into<String>) -> &mut Self {
        self.set(|o| o.issued = Some(issued.into().into()))
    }

    pub fn set_value(&mut self, value: ObservationValue) -> &mut Self {
        self.set_choice_type(|o| &mut o.value, value)
    }

    pub fn set_data_absent_reason(&mut self, reason: CodeableConcept) -> &mut Self {
        self.set(|o| o.data_absent_reason = Some(reason))
    }

    pub fn add_component(&mut self, component: ObservationComponent) -> &mut Self {
        self.add_to_array(|o| &mut o.component, component)
    }
}

impl RecordBuilder<ObservationComponent> {
    pub fn set_code(&mut self, code: CodeableConcept) -> &mut Self {
        self.set(|c| c.code = Some(code))
    }

    pub fn set_value(&mut self, value: ObservationValue) -> &mut Self {
        self.set_choice_type(|c| &mut c.value, value)
    }

    pub fn set_data_absent_reason(&mut self, reason: CodeableConcept) -> &mut Self {
        self.set(|c| c.data_absent_reason = Some(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BackboneElementBuilder, DomainResourceBuilder, ElementBuilder};
    use crate::datatypes::{Coding, Extension};
    use crate::error::Error;
    use crate::primitive::Primitive;
    use crate::record::JsonCodec;
    use serde_json::json;

    fn weight() -> CodeableConcept {
        CodeableConcept::from_coding(Coding::new("http://loinc.org", "29463-7"))
    }

    #[test]
    fn test_observation_key_order() {
        let mut builder = Observation::builder();
        builder
            .set_value(ObservationValue::Quantity(Quantity::ucum(rust_decimal::Decimal::new(725, 1), "kg")))
            .set_code(weight())
            .set_status("final")
            .set_language("en")
            .set_id("obs-1");

        let json = builder.build().to_json().unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["resourceType", "id", "language", "status", "code", "valueQuantity"]
        );
    }

    #[test]
    fn test_round_trip_with_shadows() {
        let json = json!({
            "resourceType": "Observation",
            "id": "bp",
            "status": "final",
            "_status": {"id": "s"},
            "code": {"text": "Blood pressure"},
            "effectiveDateTime": "2024-03-01T10:00:00Z",
            "component": [
                {"code": {"text": "Systolic"}, "valueQuantity": {"value": 120.5, "unit": "mmHg"}},
                {"code": {"text": "Diastolic"}, "_valueString": {"extension": [{"url": "http://example.org/absent", "valueCode": "masked"}]}}
            ]
        });
        let obs = Observation::from_json(json.clone()).unwrap();
        assert_eq!(obs.components().len(), 2);
        assert!(matches!(
            obs.components()[1].value,
            Some(ObservationValue::String(Primitive { value: None, element: Some(_) }))
        ));
        assert_eq!(obs.to_json().unwrap(), json);
    }

    #[test]
    fn test_conflicting_variants_rejected() {
        let err = Observation::from_json(json!({
            "resourceType": "Observation",
            "valueString": "a",
            "valueBoolean": true
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::ConflictingChoice { group: "value", first: "String", second: "Boolean" }
        ));
    }

    #[test]
    fn test_shadow_scoped_to_its_variant() {
        let err = Observation::from_json(json!({
            "resourceType": "Observation",
            "valueBoolean": true,
            "_valueString": {"id": "x"}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::ConflictingChoice { .. }));
    }

    #[test]
    fn test_component_builder_levels() {
        let mut component = ObservationComponent::builder();
        component
            .set_code(weight())
            .set_value(ObservationValue::Integer(3.into()))
            .add_modifier_extension(Extension::new("http://example.org/modifier"))
            .set_id("c1");

        let json = component.build().to_json().unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id", "modifierExtension", "code", "valueInteger"]);
    }

    #[test]
    fn test_wrong_resource_type() {
        let err = Observation::from_json(json!({"resourceType": "Patient"})).unwrap_err();
        assert!(matches!(err, Error::ResourceTypeMismatch { expected: "Observation", .. }));
    }
}
