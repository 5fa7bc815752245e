//! Records: serialization, reconstruction and copy-on-write updates

use crate::choice::ChoiceGroup;
use crate::config::ModelConfig;
use crate::element::Level;
use crate::error::{Error, Result};
use crate::property::{merge_patch, Property, PropertyReader, PropertyWriter, RESOURCE_TYPE_KEY};
use serde_json::{Map, Value};

/// Conversion between a typed value and its FHIR JSON form
pub trait JsonCodec: Sized {
    fn to_json_with(&self, config: &ModelConfig) -> Result<Value>;

    fn from_json_with(value: Value, config: &ModelConfig) -> Result<Self>;

    /// Serializes with the default configuration.
    fn to_json(&self) -> Result<Value> {
        self.to_json_with(&ModelConfig::default())
    }

    /// Reconstructs from a previously serialized object with the default
    /// configuration. Values are assumed to be conformant; only the shape is
    /// checked.
    fn from_json(value: Value) -> Result<Self> {
        Self::from_json_with(value, &ModelConfig::default())
    }
}

/// A concrete FHIR type: one base level plus its own declared properties
///
/// Records are values. Once built they are changed only through [`with`]
/// and [`apply_transform`], which return new instances. `Clone` produces a
/// fully independent deep copy.
///
/// [`with`]: Record::with
/// [`apply_transform`]: Record::apply_transform
pub trait Record: JsonCodec + Clone + PartialEq + Send + Sync + 'static {
    type Base: Level;

    /// FHIR type name; the discriminator for resources
    const TYPE_NAME: &'static str;

    /// Type-specific properties in serialization order
    const PROPERTIES: &'static [Property];

    fn base(&self) -> &Self::Base;

    fn base_mut(&mut self) -> &mut Self::Base;

    /// Writes the type-specific fields, in declared order.
    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()>;

    /// Builds the record from an already assigned base and the remaining
    /// input properties.
    fn assign_props(base: Self::Base, reader: &mut PropertyReader<'_>) -> Result<Self>;

    /// Every key the type may serialize, in order.
    fn declared_keys() -> Vec<String> {
        let mut keys = Vec::new();
        if Self::Base::DISCRIMINATED {
            keys.push(RESOURCE_TYPE_KEY.to_string());
        }
        for property in Self::Base::PROPERTIES.iter().chain(Self::PROPERTIES) {
            keys.extend(property.keys());
        }
        keys
    }

    fn choice_groups() -> Vec<&'static ChoiceGroup> {
        Self::PROPERTIES
            .iter()
            .filter_map(Property::choice_group)
            .collect()
    }

    /// The serialized snapshot as a JSON object
    fn to_json_object(&self) -> Result<Map<String, Value>> {
        match self.to_json()? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::NotAnObject {
                context: Self::TYPE_NAME.to_string(),
            }),
        }
    }

    /// Returns a new record built from the current snapshot with `changes`
    /// merged over it. `self` is left untouched.
    ///
    /// A `null` in `changes` removes the property. Setting a variant of a
    /// choice group (its value or its shadow) drops the group's other
    /// variants; naming two variants of one group is a conflict.
    fn with(&self, changes: Value) -> Result<Self> {
        let Value::Object(patch) = changes else {
            return Err(Error::NotAnObject {
                context: format!("patch for {}", Self::TYPE_NAME),
            });
        };
        let mut snapshot = self.to_json_object()?;
        tracing::trace!(record_type = Self::TYPE_NAME, keys = patch.len(), "applying patch");
        merge_patch(&mut snapshot, patch, &Self::choice_groups())?;
        Self::from_json(Value::Object(snapshot))
    }

    /// Like [`with`](Record::with), with the patch computed from the current
    /// snapshot.
    fn apply_transform<F>(&self, transform: F) -> Result<Self>
    where
        F: FnOnce(&Map<String, Value>) -> Value,
    {
        let snapshot = self.to_json_object()?;
        let changes = transform(&snapshot);
        self.with(changes)
    }
}

/// Serializes a record: discriminator, level fields, then its own fields.
pub fn encode_record<R: Record>(record: &R, config: &ModelConfig) -> Result<Value> {
    let mut writer = PropertyWriter::new(config);
    if R::Base::DISCRIMINATED {
        writer.discriminator(R::TYPE_NAME);
    }
    record.base().serialize_level_to(&mut writer)?;
    record.serialize_props_to(&mut writer)?;
    Ok(Value::Object(writer.into_map()))
}

/// Reconstructs a record from its serialized form.
pub fn decode_record<R: Record>(value: Value, config: &ModelConfig) -> Result<R> {
    let mut reader = PropertyReader::from_value(value, config, R::TYPE_NAME)?;
    if R::Base::DISCRIMINATED {
        reader.discriminator(R::TYPE_NAME)?;
    }
    let base = R::Base::assign_level(&mut reader)?;
    let record = R::assign_props(base, &mut reader)?;
    reader.finish()?;
    Ok(record)
}
