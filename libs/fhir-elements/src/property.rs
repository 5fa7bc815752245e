//! Ordered property assignment and serialization
//!
//! Every record type declares its properties in FHIR order. Serialization
//! goes through [`PropertyWriter`], which appends present properties to an
//! insertion-ordered JSON map, so the output order is the order in which a
//! type writes its declared fields. Reconstruction goes through
//! [`PropertyReader`], which consumes declared keys from an input map and
//! reports whatever is left over once the record has taken what it knows.

use crate::choice::{ChoiceGroup, ChoiceType};
use crate::config::{EmptyArrayPolicy, ModelConfig, UnknownPropertyPolicy};
use crate::element::{Element, Level};
use crate::error::{Error, Result};
use crate::primitive::{Primitive, PrimitiveValue};
use crate::record::JsonCodec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Key of the discriminator written ahead of every resource
pub const RESOURCE_TYPE_KEY: &str = "resourceType";

/// The key carrying the shadow element of a primitive property
pub fn shadow_key(name: &str) -> String {
    format!("_{}", name)
}

/// Shape of a declared property
#[derive(Debug, Clone, Copy)]
pub enum PropertyKind {
    /// Plain JSON value without a shadow
    Value,
    /// Primitive (single or repeated) with a `_name` shadow
    Primitive,
    /// Nested record or sequence of records
    Complex,
    /// Choice group, materialized as one key per variant
    Choice(fn() -> &'static ChoiceGroup),
}

/// One entry of a type's declared property list
#[derive(Debug, Clone, Copy)]
pub struct Property {
    pub name: &'static str,
    pub kind: PropertyKind,
}

impl Property {
    pub const fn value(name: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Value,
        }
    }

    pub const fn primitive(name: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Primitive,
        }
    }

    pub const fn complex(name: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Complex,
        }
    }

    pub const fn choice(name: &'static str, group: fn() -> &'static ChoiceGroup) -> Self {
        Self {
            name,
            kind: PropertyKind::Choice(group),
        }
    }

    pub fn choice_group(&self) -> Option<&'static ChoiceGroup> {
        match self.kind {
            PropertyKind::Choice(group) => Some(group()),
            _ => None,
        }
    }

    /// Concrete JSON keys this property may occupy, in serialization order.
    pub fn keys(&self) -> Vec<String> {
        match self.kind {
            PropertyKind::Value | PropertyKind::Complex => vec![self.name.to_string()],
            PropertyKind::Primitive => vec![self.name.to_string(), shadow_key(self.name)],
            PropertyKind::Choice(group) => group().keys(),
        }
    }
}

/// Writes present properties into an insertion-ordered JSON object
pub struct PropertyWriter<'a> {
    target: Map<String, Value>,
    config: &'a ModelConfig,
}

impl<'a> PropertyWriter<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            target: Map::new(),
            config,
        }
    }

    pub fn config(&self) -> &'a ModelConfig {
        self.config
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.target
    }

    pub fn discriminator(&mut self, resource_type: &str) {
        self.target.insert(
            RESOURCE_TYPE_KEY.to_string(),
            Value::String(resource_type.to_string()),
        );
    }

    /// Appends a plain value
    pub fn value<T: Serialize>(&mut self, name: &str, value: &Option<T>) -> Result<()> {
        if let Some(value) = value {
            let json = serde_json::to_value(value)?;
            self.put(name.to_string(), json);
        }
        Ok(())
    }

    /// Appends a primitive and its shadow
    pub fn primitive<T: PrimitiveValue>(&mut self, name: &str, value: &Option<Primitive<T>>) -> Result<()> {
        match value {
            Some(primitive) => self.write_primitive(name, primitive),
            None => Ok(()),
        }
    }

    pub fn write_primitive<T: PrimitiveValue>(
        &mut self,
        name: &str,
        primitive: &Primitive<T>,
    ) -> Result<()> {
        if let Some(value) = &primitive.value {
            let json = value.to_json_value()?;
            self.put(name.to_string(), json);
        }
        if let Some(element) = &primitive.element {
            let shadow = self.encode_shadow(element)?;
            if !shadow.is_empty() {
                self.put(shadow_key(name), Value::Object(shadow));
            }
        }
        Ok(())
    }

    /// Appends a repeated primitive as parallel `name` / `_name` arrays.
    ///
    /// A list whose entries are all empty is written as an array of nulls so
    /// that its length survives a round trip.
    pub fn primitives<T: PrimitiveValue>(
        &mut self,
        name: &str,
        values: &Option<Vec<Primitive<T>>>,
    ) -> Result<()> {
        let Some(values) = values else {
            return Ok(());
        };
        if values.is_empty() {
            self.put(name.to_string(), Value::Array(Vec::new()));
            return Ok(());
        }

        let mut plain = Vec::with_capacity(values.len());
        let mut shadows = Vec::with_capacity(values.len());
        let mut has_value = false;
        let mut has_shadow = false;

        for primitive in values {
            match &primitive.value {
                Some(value) => {
                    has_value = true;
                    plain.push(value.to_json_value()?);
                }
                None => plain.push(Value::Null),
            }
            let shadow = match &primitive.element {
                Some(element) => self.encode_shadow(element)?,
                None => Map::new(),
            };
            if shadow.is_empty() {
                shadows.push(Value::Null);
            } else {
                has_shadow = true;
                shadows.push(Value::Object(shadow));
            }
        }

        if has_value || !has_shadow {
            self.put(name.to_string(), Value::Array(plain));
        }
        if has_shadow {
            self.put(shadow_key(name), Value::Array(shadows));
        }
        Ok(())
    }

    /// Appends a nested record
    pub fn complex<T: JsonCodec>(&mut self, name: &str, value: &Option<T>) -> Result<()> {
        match value {
            Some(value) => self.write_complex(name, value),
            None => Ok(()),
        }
    }

    pub fn write_complex<T: JsonCodec>(&mut self, name: &str, value: &T) -> Result<()> {
        let json = value.to_json_with(self.config)?;
        self.put(name.to_string(), json);
        Ok(())
    }

    /// Appends a sequence of nested records
    pub fn complexes<T: JsonCodec>(&mut self, name: &str, values: &Option<Vec<T>>) -> Result<()> {
        if let Some(values) = values {
            let items = values
                .iter()
                .map(|v| v.to_json_with(self.config))
                .collect::<Result<Vec<_>>>()?;
            self.put(name.to_string(), Value::Array(items));
        }
        Ok(())
    }

    /// Appends the populated variant of a choice group
    pub fn choice<C: ChoiceType>(&mut self, value: &Option<C>) -> Result<()> {
        match value {
            Some(choice) => choice.write_to(self),
            None => Ok(()),
        }
    }

    fn encode_shadow(&self, element: &Element) -> Result<Map<String, Value>> {
        let mut writer = PropertyWriter::new(self.config);
        element.serialize_element_to(&mut writer)?;
        Ok(writer.into_map())
    }

    fn put(&mut self, key: String, value: Value) {
        if let Value::Array(items) = &value {
            if items.is_empty() && self.config.empty_arrays == EmptyArrayPolicy::Omit {
                return;
            }
        }
        self.target.insert(key, value);
    }
}

/// Consumes declared properties from a JSON object
pub struct PropertyReader<'a> {
    source: Map<String, Value>,
    config: &'a ModelConfig,
    type_name: &'static str,
}

impl<'a> PropertyReader<'a> {
    pub fn new(source: Map<String, Value>, config: &'a ModelConfig, type_name: &'static str) -> Self {
        Self {
            source,
            config,
            type_name,
        }
    }

    pub fn from_value(value: Value, config: &'a ModelConfig, type_name: &'static str) -> Result<Self> {
        match value {
            Value::Object(source) => Ok(Self::new(source, config, type_name)),
            _ => Err(Error::NotAnObject {
                context: type_name.to_string(),
            }),
        }
    }

    pub fn config(&self) -> &'a ModelConfig {
        self.config
    }

    /// `true` if `key` holds a non-null value
    pub fn is_present(&self, key: &str) -> bool {
        self.source.get(key).is_some_and(|v| !v.is_null())
    }

    /// Removes `key`, treating `null` as absent
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.source.remove(key).filter(|v| !v.is_null())
    }

    /// Takes and checks the `resourceType` discriminator.
    ///
    /// A missing discriminator is accepted; a different one is rejected
    /// unless the resource type check is disabled.
    pub fn discriminator(&mut self, expected: &'static str) -> Result<()> {
        let Some(found) = self.take(RESOURCE_TYPE_KEY) else {
            return Ok(());
        };
        let found = match found {
            Value::String(found) => found,
            other => {
                let found = other.to_string();
                if self.config.check_resource_type {
                    return Err(Error::ResourceTypeMismatch { expected, found });
                }
                tracing::debug!(expected, found = %found, "accepting non-string resourceType");
                return Ok(());
            }
        };
        if found != expected {
            if self.config.check_resource_type {
                return Err(Error::ResourceTypeMismatch { expected, found });
            }
            tracing::debug!(expected, found = %found, "accepting mismatched resourceType");
        }
        Ok(())
    }

    pub fn value<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>> {
        match self.take(name) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| Error::InvalidValue {
                    property: name.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub fn primitive<T: PrimitiveValue>(&mut self, name: &str) -> Result<Option<Primitive<T>>> {
        let value = match self.take(name) {
            Some(value) => Some(decode_primitive(name, value)?),
            None => None,
        };
        let element = match self.take(&shadow_key(name)) {
            Some(shadow) => Some(decode_shadow(shadow, self.config)?),
            None => None,
        };
        if value.is_none() && element.is_none() {
            return Ok(None);
        }
        Ok(Some(Primitive { value, element }))
    }

    pub fn primitives<T: PrimitiveValue>(
        &mut self,
        name: &str,
    ) -> Result<Option<Vec<Primitive<T>>>> {
        let values: Option<Vec<Value>> = self.value(name)?;
        let key = shadow_key(name);
        let shadows: Option<Vec<Value>> = self.value(&key)?;
        if values.is_none() && shadows.is_none() {
            return Ok(None);
        }

        let values = values.unwrap_or_default();
        let shadows = shadows.unwrap_or_default();
        let len = values.len().max(shadows.len());
        let mut values = values.into_iter();
        let mut shadows = shadows.into_iter();

        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            let value = match values.next() {
                Some(value) if !value.is_null() => Some(decode_primitive(name, value)?),
                _ => None,
            };
            let element = match shadows.next() {
                Some(shadow) if !shadow.is_null() => Some(decode_shadow(shadow, self.config)?),
                _ => None,
            };
            out.push(Primitive { value, element });
        }
        Ok(Some(out))
    }

    pub fn complex<T: JsonCodec>(&mut self, name: &str) -> Result<Option<T>> {
        match self.take(name) {
            Some(value) => T::from_json_with(value, self.config).map(Some),
            None => Ok(None),
        }
    }

    pub fn complexes<T: JsonCodec>(&mut self, name: &str) -> Result<Option<Vec<T>>> {
        match self.take(name) {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| T::from_json_with(item, self.config))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(Error::InvalidValue {
                property: name.to_string(),
                source: serde::de::Error::custom(format!("expected an array, found {}", other)),
            }),
            None => Ok(None),
        }
    }

    /// Reads a choice group, rejecting input that populates two variants.
    pub fn choice<C: ChoiceType>(&mut self) -> Result<Option<C>> {
        let group = C::group();
        let present = group.present_variants(|key| self.is_present(key));

        let choice = match present.as_slice() {
            [] => None,
            [variant] => Some(C::read_variant(variant, self)?),
            [first, second, ..] => {
                return Err(Error::ConflictingChoice {
                    group: group.name,
                    first: *first,
                    second: *second,
                })
            }
        };

        // null placeholders of the other variants are consumed, not left over
        for key in group.keys() {
            self.source.remove(&key);
        }
        Ok(choice)
    }

    /// Finishes reading, applying the unknown-property policy to leftovers.
    pub fn finish(self) -> Result<()> {
        for property in self.source.keys() {
            match self.config.unknown_properties {
                UnknownPropertyPolicy::Ignore => {
                    tracing::debug!(
                        record_type = self.type_name,
                        property = %property,
                        "ignoring undeclared property"
                    );
                }
                UnknownPropertyPolicy::Reject => {
                    return Err(Error::UnknownProperty {
                        type_name: self.type_name,
                        property: property.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn decode_primitive<T: PrimitiveValue>(name: &str, value: Value) -> Result<T> {
    T::from_json_value(value).map_err(|source| Error::InvalidValue {
        property: name.to_string(),
        source,
    })
}

fn decode_shadow(value: Value, config: &ModelConfig) -> Result<Element> {
    let mut reader = PropertyReader::from_value(value, config, "Element")?;
    let element = Element::assign_level(&mut reader)?;
    reader.finish()?;
    Ok(element)
}

/// Merges a patch into a serialized snapshot.
///
/// `null` in the patch removes the key. A patch that sets a variant of one
/// of `groups` (its value or its `_` shadow) clears the keys of every other
/// variant of that group, so the merged map never carries two variants of
/// the same choice. The touched variant keeps whatever the patch leaves
/// alone. A patch setting two variants of one group is rejected.
pub fn merge_patch(
    snapshot: &mut Map<String, Value>,
    patch: Map<String, Value>,
    groups: &[&'static ChoiceGroup],
) -> Result<()> {
    for group in groups {
        let mut touched: Option<&'static str> = None;
        for (key, value) in &patch {
            if value.is_null() {
                continue;
            }
            let Some(variant) = group.variant_of_key(key) else {
                continue;
            };
            match touched {
                Some(first) if first != variant.suffix => {
                    return Err(Error::ConflictingChoice {
                        group: group.name,
                        first,
                        second: variant.suffix,
                    });
                }
                _ => touched = Some(variant.suffix),
            }
        }
        if let Some(suffix) = touched {
            let cleared = group.clear_except(snapshot, suffix);
            tracing::trace!(
                group = group.name,
                keep = suffix,
                cleared,
                "cleared sibling variants before patch"
            );
        }
    }

    for (key, value) in patch {
        if value.is_null() {
            snapshot.remove(&key);
        } else {
            snapshot.insert(key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::Quantity;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_primitive_writes_value_then_shadow() {
        let config = ModelConfig::default();
        let mut writer = PropertyWriter::new(&config);
        let status = Some(Primitive::new("final".to_string()).with_element(Element::with_id("s1")));
        writer.primitive("status", &status).unwrap();

        let map = writer.into_map();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["status", "_status"]);
        assert_eq!(map["_status"], json!({"id": "s1"}));
    }

    #[test]
    fn test_absent_values_are_not_written() {
        let config = ModelConfig::default();
        let mut writer = PropertyWriter::new(&config);
        writer.value::<String>("id", &None).unwrap();
        writer.primitive::<bool>("active", &Some(Primitive::default())).unwrap();
        writer.complex::<Quantity>("valueQuantity", &None).unwrap();
        assert!(writer.into_map().is_empty());
    }

    #[test]
    fn test_empty_array_policy() {
        let empty: Option<Vec<Primitive<String>>> = Some(Vec::new());

        let keep = ModelConfig::default();
        let mut writer = PropertyWriter::new(&keep);
        writer.primitives("given", &empty).unwrap();
        assert_eq!(Value::Object(writer.into_map()), json!({"given": []}));

        let omit = ModelConfig::default().with_empty_arrays(EmptyArrayPolicy::Omit);
        let mut writer = PropertyWriter::new(&omit);
        writer.primitives("given", &empty).unwrap();
        assert!(writer.into_map().is_empty());
    }

    #[test]
    fn test_primitive_arrays_are_parallel() {
        let config = ModelConfig::default();
        let given = Some(vec![
            Primitive::new("Peter".to_string()),
            Primitive::shadow(Element::with_id("g2")),
            Primitive::new("James".to_string()),
        ]);

        let mut writer = PropertyWriter::new(&config);
        writer.primitives("given", &given).unwrap();
        let map = writer.into_map();
        assert_eq!(map["given"], json!(["Peter", null, "James"]));
        assert_eq!(map["_given"], json!([null, {"id": "g2"}, null]));

        let mut reader = PropertyReader::new(map, &config, "HumanName");
        let read = reader.primitives::<String>("given").unwrap();
        reader.finish().unwrap();
        assert_eq!(read, given);
    }

    #[test]
    fn test_reader_treats_null_as_absent() {
        let config = ModelConfig::default();
        let mut reader = PropertyReader::new(object(json!({"status": null})), &config, "Test");
        assert_eq!(reader.primitive::<String>("status").unwrap(), None);
    }

    #[test]
    fn test_reader_invalid_value() {
        let config = ModelConfig::default();
        let mut reader = PropertyReader::new(object(json!({"active": "yes"})), &config, "Test");
        let err = reader.primitive::<bool>("active").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref property, .. } if property == "active"));
    }

    #[test]
    fn test_finish_policies() {
        let lenient = ModelConfig::default();
        let reader = PropertyReader::new(object(json!({"bogus": 1})), &lenient, "Test");
        assert!(reader.finish().is_ok());

        let strict = ModelConfig::strict();
        let reader = PropertyReader::new(object(json!({"bogus": 1})), &strict, "Test");
        let err = reader.finish().unwrap_err();
        assert!(matches!(err, Error::UnknownProperty { type_name: "Test", .. }));
    }

    #[test]
    fn test_discriminator_check() {
        let config = ModelConfig::default();
        let mut reader =
            PropertyReader::new(object(json!({"resourceType": "Patient"})), &config, "Observation");
        assert!(matches!(
            reader.discriminator("Observation"),
            Err(Error::ResourceTypeMismatch { expected: "Observation", .. })
        ));

        let lenient = ModelConfig::default().with_resource_type_check(false);
        let mut reader =
            PropertyReader::new(object(json!({"resourceType": "Patient"})), &lenient, "Observation");
        assert!(reader.discriminator("Observation").is_ok());

        let mut reader = PropertyReader::new(Map::new(), &config, "Observation");
        assert!(reader.discriminator("Observation").is_ok());
    }

    #[test]
    fn test_all_empty_primitive_list_keeps_its_length() {
        let config = ModelConfig::default();
        let given: Option<Vec<Primitive<String>>> = Some(vec![Primitive::default(), Primitive::default()]);

        let mut writer = PropertyWriter::new(&config);
        writer.primitives("given", &given).unwrap();
        let map = writer.into_map();
        assert_eq!(Value::Object(map.clone()), json!({"given": [null, null]}));

        let mut reader = PropertyReader::new(map, &config, "HumanName");
        assert_eq!(reader.primitives::<String>("given").unwrap(), given);
    }

    #[test]
    fn test_shadow_only_primitive_list_omits_values() {
        let config = ModelConfig::default();
        let given = Some(vec![Primitive::<String>::shadow(Element::with_id("g1"))]);

        let mut writer = PropertyWriter::new(&config);
        writer.primitives("given", &given).unwrap();
        assert_eq!(Value::Object(writer.into_map()), json!({"_given": [{"id": "g1"}]}));
    }

    #[test]
    fn test_decimal_primitive_keeps_precision() {
        let config = ModelConfig::default();
        let input: Value = serde_json::from_str(r#"{"value": 1.50, "values": [72, 0.10]}"#).unwrap();

        let mut reader = PropertyReader::from_value(input, &config, "Test").unwrap();
        let value = reader.primitive::<rust_decimal::Decimal>("value").unwrap();
        let values = reader.primitives::<rust_decimal::Decimal>("values").unwrap();

        let mut writer = PropertyWriter::new(&config);
        writer.primitive("value", &value).unwrap();
        writer.primitives("values", &values).unwrap();
        let text = serde_json::to_string(&Value::Object(writer.into_map())).unwrap();
        assert_eq!(text, r#"{"value":1.50,"values":[72,0.10]}"#);
    }

    #[test]
    fn test_non_string_discriminator() {
        let input = json!({"resourceType": 42});

        let config = ModelConfig::default();
        let mut reader = PropertyReader::new(object(input.clone()), &config, "Observation");
        assert!(matches!(
            reader.discriminator("Observation"),
            Err(Error::ResourceTypeMismatch { ref found, .. }) if found == "42"
        ));

        let lenient = ModelConfig::default().with_resource_type_check(false);
        let mut reader = PropertyReader::new(object(input), &lenient, "Observation");
        assert!(reader.discriminator("Observation").is_ok());
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_merge_patch_removes_nulls() {
        let mut snapshot = object(json!({"id": "a", "status": "final"}));
        merge_patch(&mut snapshot, object(json!({"status": null, "id": "b"})), &[]).unwrap();
        assert_eq!(Value::Object(snapshot), json!({"id": "b"}));
    }
}
