//! FHIR element model
//!
//! This crate provides the record layer underneath typed FHIR resources:
//! base levels, ordered JSON serialization, choice types and builders.
//!
//! # Module Organization
//!
//! - `element`: the `Element` → `BackboneElement` → `DomainResource` levels
//! - `property`: ordered property writing and reading
//! - `choice`: `value[x]` choice groups and their exclusivity
//! - `record`: serialization, reconstruction and copy-on-write updates
//! - `builder`: fluent builders with optional async validation
//! - `datatypes`, `resources`: concrete types built on the above
//!
//! # Design Philosophy
//!
//! - **Declared order**: serialized keys follow the FHIR element order, not
//!   the order in which fields were set
//! - **One variant per choice**: choice groups are enums, so `valueString`
//!   and `valueBoolean` can never coexist
//! - **Values, not objects**: records change only through `with` and
//!   `apply_transform`, which return new instances
//! - **Pluggable validation**: semantic checks are an external [`Validator`]
//!
//! # Example
//!
//! ```rust
//! use ferrum_elements::datatypes::Quantity;
//! use ferrum_elements::resources::{Observation, ObservationValue};
//! use ferrum_elements::{ElementBuilder, JsonCodec, Record};
//! use rust_decimal::Decimal;
//! use serde_json::json;
//!
//! let mut builder = Observation::builder();
//! builder
//!     .set_value(ObservationValue::String("pending".into()))
//!     .set_status("preliminary")
//!     .set_id("obs-1");
//! builder.set_value(ObservationValue::Quantity(Quantity::ucum(Decimal::new(725, 1), "kg")));
//! let obs = builder.build();
//!
//! let json = obs.to_json().unwrap();
//! assert_eq!(json["resourceType"], "Observation");
//! assert!(json.get("valueString").is_none());
//!
//! let amended = obs.with(json!({"status": "final"})).unwrap();
//! assert_eq!(amended.status(), Some("final"));
//! assert_eq!(obs.status(), Some("preliminary"));
//! ```

#[macro_use]
mod macros;

pub mod builder;
pub mod choice;
pub mod config;
pub mod datatypes;
pub mod element;
pub mod error;
pub mod primitive;
pub mod property;
pub mod record;
pub mod resources;
pub mod validation;

pub use builder::{BackboneElementBuilder, DomainResourceBuilder, ElementBuilder, RecordBuilder};
pub use choice::{set_choice_type, ChoiceGroup, ChoiceType, ChoiceVariant};
pub use config::{EmptyArrayPolicy, ModelConfig, UnknownPropertyPolicy};
pub use element::{
    BackboneElement, DomainResource, Element, HasBackboneElement, HasDomainResource, HasElement,
    Level,
};
pub use error::{Error, Result};
pub use primitive::{Primitive, PrimitiveValue};
pub use record::{JsonCodec, Record};
pub use resources::Resource;
pub use validation::{validate_or_throw, AcceptAll, Validator};
