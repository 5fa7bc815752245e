//! Patient resource

use crate::builder::RecordBuilder;
use crate::datatypes::{CodeableConcept, HumanName};
use crate::element::{BackboneElement, DomainResource};
use crate::error::Result;
use crate::primitive::{Boolean, Code, Date};
use crate::property::{Property, PropertyReader, PropertyWriter};
use crate::record::Record;

choice_type! {
    /// Patient.deceased[x]
    pub enum PatientDeceased("deceased") {
        primitive Boolean(bool),
        primitive DateTime(String),
    }
}

choice_type! {
    /// Patient.multipleBirth[x]
    pub enum PatientMultipleBirth("multipleBirth") {
        primitive Boolean(bool),
        primitive Integer(i32),
    }
}

/// Information about an individual receiving care
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patient {
    pub base: DomainResource,

    /// Whether this patient's record is in active use
    pub active: Option<Boolean>,

    pub name: Option<Vec<HumanName>>,

    /// `male` | `female` | `other` | `unknown`
    pub gender: Option<Code>,

    pub birth_date: Option<Date>,
    pub deceased: Option<PatientDeceased>,
    pub multiple_birth: Option<PatientMultipleBirth>,

    /// A contact party for the patient
    pub contact: Option<Vec<PatientContact>>,
}

impl Patient {
    pub fn builder() -> PatientBuilder {
        PatientBuilder::new()
    }

    pub fn names(&self) -> &[HumanName] {
        self.name.as_deref().unwrap_or(&[])
    }
}

impl Record for Patient {
    type Base = DomainResource;
    const TYPE_NAME: &'static str = "Patient";
    const PROPERTIES: &'static [Property] = &[
        Property::primitive("active"),
        Property::complex("name"),
        Property::primitive("gender"),
        Property::primitive("birthDate"),
        Property::choice("deceased", <PatientDeceased as crate::choice::ChoiceType>::group),
        Property::choice(
            "multipleBirth",
            <PatientMultipleBirth as crate::choice::ChoiceType>::group,
        ),
        Property::complex("contact"),
    ];

    fn base(&self) -> &DomainResource {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DomainResource {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("active", &self.active)?;
        writer.complexes("name", &self.name)?;
        writer.primitive("gender", &self.gender)?;
        writer.primitive("birthDate", &self.birth_date)?;
        writer.choice(&self.deceased)?;
        writer.choice(&self.multiple_birth)?;
        writer.complexes("contact", &self.contact)?;
        Ok(())
    }

    fn assign_props(base: DomainResource, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            active: reader.primitive("active")?,
            name: reader.complexes("name")?,
            gender: reader.primitive("gender")?,
            birth_date: reader.primitive("birthDate")?,
            deceased: reader.choice()?,
            multiple_birth: reader.choice()?,
            contact: reader.complexes("contact")?,
        })
    }
}

/// A contact party (e.g. guardian, partner, friend) for the patient
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientContact {
    pub base: BackboneElement,
    pub relationship: Option<Vec<CodeableConcept>>,
    pub name: Option<HumanName>,
    pub gender: Option<Code>,
}

impl Record for PatientContact {
    type Base = BackboneElement;
    const TYPE_NAME: &'static str = "Patient.contact";
    const PROPERTIES: &'static [Property] = &[
        Property::complex("relationship"),
        Property::complex("name"),
        Property::primitive("gender"),
    ];

    fn base(&self) -> &BackboneElement {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BackboneElement {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.complexes("relationship", &self.relationship)?;
        writer.complex("name", &self.name)?;
        writer.primitive("gender", &self.gender)?;
        Ok(())
    }

    fn assign_props(base: BackboneElement, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            relationship: reader.complexes("relationship")?,
            name: reader.complex("name")?,
            gender: reader.primitive("gender")?,
        })
    }
}

impl_json_codec!(Patient, PatientContact);

pub type PatientBuilder = RecordBuilder<Patient>;
pub type PatientContactBuilder = RecordBuilder<PatientContact>;

impl RecordBuilder<Patient> {
    pub fn set_active(&mut self, active: bool) -> &mut Self {
        self.set(|p| p.active = Some(active.into()))
    }

    pub fn add_name(&mut self, name: HumanName) -> &mut Self {
        self.add_to_array(|p| &mut p.name, name)
    }

    pub fn set_gender(&mut self, gender: impl Into<String>) -> &mut Self {
        self.set(|p| p.gender = Some(gender.into().into()))
    }

    pub fn set_birth_date(&mut self, birth_date: impl Into<String>) -> &mut Self {
        self.set(|p| p.birth_date = Some(birth_date.into().into()))
    }

    pub fn set_deceased(&mut self, deceased: PatientDeceased) -> &mut Self {
        self.set_choice_type(|p| &mut p.deceased, deceased)
    }

    pub fn set_multiple_birth(&mut self, multiple_birth: PatientMultipleBirth) -> &mut Self {
        self.set_choice_type(|p| &mut p.multiple_birth, multiple_birth)
    }

    pub fn add_contact(&mut self, contact: PatientContact) -> &mut Self {
        self.add_to_array(|p| &mut p.contact, contact)
    }
}

impl RecordBuilder<PatientContact> {
    pub fn add_relationship(&mut self, relationship: CodeableConcept) -> &mut Self {
        self.add_to_array(|c| &mut c.relationship, relationship)
    }

    pub fn set_name(&mut self, name: HumanName) -> &mut Self {
        self.set(|c| c.name = Some(name))
    }

    pub fn set_gender(&mut self, gender: impl Into<String>) -> &mut Self {
        self.set(|c| c.gender = Some(gender.into().into()))
    }
}
