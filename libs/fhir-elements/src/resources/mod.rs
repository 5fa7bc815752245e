//! Resources
//!
//! [`Resource`] is the closed set of resource types this crate models. It is
//! what `DomainResource.contained` holds and dispatches on `resourceType`.

pub mod observation;
pub mod patient;

pub use observation::*;
pub use patient::*;

use crate::config::ModelConfig;
use crate::element::DomainResource;
use crate::error::{Error, Result};
use crate::property::RESOURCE_TYPE_KEY;
use crate::record::{JsonCodec, Record};
use serde_json::Value;

/// Any modeled resource
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Observation(Box<Observation>),
    Patient(Box<Patient>),
}

impl Resource {
    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::Observation(_) => Observation::TYPE_NAME,
            Resource::Patient(_) => Patient::TYPE_NAME,
        }
    }

    pub fn domain_resource(&self) -> &DomainResource {
        match self {
            Resource::Observation(r) => r.base(),
            Resource::Patient(r) => r.base(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.domain_resource().base.base.id.as_deref()
    }
}

impl JsonCodec for Resource {
    fn to_json_with(&self, config: &ModelConfig) -> Result<Value> {
        match self {
            Resource::Observation(r) => r.to_json_with(config),
            Resource::Patient(r) => r.to_json_with(config),
        }
    }

    fn from_json_with(value: Value, config: &ModelConfig) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(Error::NotAnObject {
                context: "Resource".to_string(),
            });
        };
        let resource_type = match object.get(RESOURCE_TYPE_KEY).and_then(Value::as_str) {
            Some(resource_type) => resource_type.to_string(),
            None => return Err(Error::MissingResourceType),
        };

        match resource_type.as_str() {
            "Observation" => Ok(Observation::from_json_with(value, config)?.into()),
            "Patient" => Ok(Patient::from_json_with(value, config)?.into()),
            _ => Err(Error::UnknownResourceType(resource_type)),
        }
    }
}

impl_serde_via_codec!(Resource);

impl From<Observation> for Resource {
    fn from(resource: Observation) -> Self {
        Resource::Observation(Box::new(resource))
    }
}

impl From<Patient> for Resource {
    fn from(resource: Patient) -> Self {
        Resource::Patient(Box::new(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{DomainResourceBuilder, ElementBuilder};
    use crate::datatypes::Reference;
    use serde_json::json;

    #[test]
    fn test_contained_dispatch() {
        let mut patient = Patient::builder();
        patient.set_id("p1").set_active(true);

        let mut builder = Observation::builder();
        builder
            .add_contained(patient.build())
            .set_status("final")
            .set_subject(Reference::to("#p1"));
        let obs = builder.build();

        let json = obs.to_json().unwrap();
        assert_eq!(
            json["contained"],
            json!([{"resourceType": "Patient", "id": "p1", "active": true}])
        );

        let back = Observation::from_json(json).unwrap();
        let contained = back.base.contained();
        assert_eq!(contained[0].resource_type(), "Patient");
        assert_eq!(contained[0].id(), back.subject.as_ref().unwrap().contained_id());
    }

    #[test]
    fn test_missing_and_unknown_resource_type() {
        assert!(matches!(
            Resource::from_json(json!({"id": "x"})),
            Err(Error::MissingResourceType)
        ));
        assert!(matches!(
            Resource::from_json(json!({"resourceType": "Encounter"})),
            Err(Error::UnknownResourceType(ref t)) if t == "Encounter"
        ));
        assert!(matches!(
            Resource::from_json(json!([1, 2])),
            Err(Error::NotAnObject { .. })
        ));
    }
}
