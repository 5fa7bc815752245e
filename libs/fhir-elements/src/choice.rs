//! Choice types (`value[x]`)
//!
//! A choice group is one logical field that can hold exactly one of a closed
//! set of typed variants. Each variant is serialized under its own key
//! (`valueString`, `valueQuantity`) and primitive variants may carry a
//! shadow (`_valueString`).
//!
//! Typed records model a group as an enum implementing [`ChoiceType`], so at
//! most one variant can be populated. [`set_choice_type`] provides the same
//! guarantee for raw JSON maps: it clears every sibling key of the group
//! before assigning the chosen variant.

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::property::{shadow_key, PropertyReader, PropertyWriter};
use serde_json::{Map, Value};

/// One allowed variant of a choice group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceVariant {
    /// Type suffix appended to the group name, e.g. `Quantity`
    pub suffix: &'static str,
    /// Primitive variants may carry a `_` shadow
    pub primitive: bool,
}

/// Declaration of a choice group: its logical name and allowed variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceGroup {
    pub name: &'static str,
    pub variants: &'static [ChoiceVariant],
}

impl ChoiceGroup {
    pub fn variant(&self, suffix: &str) -> Option<&'static ChoiceVariant> {
        self.variants.iter().find(|v| v.suffix == suffix)
    }

    /// Concrete key of a variant, e.g. `valueString`
    pub fn key(&self, suffix: &str) -> String {
        format!("{}{}", self.name, suffix)
    }

    pub fn shadow_key(&self, suffix: &str) -> String {
        shadow_key(&self.key(suffix))
    }

    /// Every key the group may occupy, in declared variant order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.variants.len() * 2);
        for variant in self.variants {
            keys.push(self.key(variant.suffix));
            if variant.primitive {
                keys.push(self.shadow_key(variant.suffix));
            }
        }
        keys
    }

    /// The variant a concrete or shadow key belongs to, if any.
    pub fn variant_of_key(&self, key: &str) -> Option<&'static ChoiceVariant> {
        let (concrete, is_shadow) = match key.strip_prefix('_') {
            Some(rest) => (rest, true),
            None => (key, false),
        };
        let suffix = concrete.strip_prefix(self.name)?;
        self.variant(suffix)
            .filter(|variant| !is_shadow || variant.primitive)
    }

    pub fn owns_key(&self, key: &str) -> bool {
        self.variant_of_key(key).is_some()
    }

    /// Suffixes of the variants for which `is_present` reports a key.
    pub fn present_variants(&self, is_present: impl Fn(&str) -> bool) -> Vec<&'static str> {
        self.variants
            .iter()
            .filter(|variant| {
                is_present(&self.key(variant.suffix))
                    || (variant.primitive && is_present(&self.shadow_key(variant.suffix)))
            })
            .map(|variant| variant.suffix)
            .collect()
    }

    /// Removes every key of the group from `target`, returning how many were set.
    pub fn clear(&self, target: &mut Map<String, Value>) -> usize {
        let mut cleared = 0;
        for key in self.keys() {
            if target.remove(&key).is_some() {
                cleared += 1;
            }
        }
        cleared
    }

    /// Removes the value and shadow keys of every variant except `keep`.
    pub fn clear_except(&self, target: &mut Map<String, Value>, keep: &str) -> usize {
        let mut cleared = 0;
        for variant in self.variants.iter().filter(|variant| variant.suffix != keep) {
            if target.remove(&self.key(variant.suffix)).is_some() {
                cleared += 1;
            }
            if variant.primitive && target.remove(&self.shadow_key(variant.suffix)).is_some() {
                cleared += 1;
            }
        }
        cleared
    }

    pub fn unknown_variant(&self, suffix: &str) -> Error {
        Error::InvalidArgument {
            group: self.name,
            reason: format!(
                "'{}' is not one of [{}]",
                suffix,
                self.variants
                    .iter()
                    .map(|v| v.suffix)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// Sets one variant of a choice group on a JSON map, clearing all others.
///
/// The chosen variant's concrete key receives `value` and its shadow key
/// receives `shadow`; every other concrete and shadow key of the group is
/// removed. Fails with [`Error::InvalidArgument`] when `suffix` is not a
/// declared variant or a shadow is given for a non-primitive variant.
pub fn set_choice_type(
    target: &mut Map<String, Value>,
    group: &ChoiceGroup,
    suffix: &str,
    value: Option<Value>,
    shadow: Option<Value>,
) -> Result<()> {
    let variant = group
        .variant(suffix)
        .ok_or_else(|| group.unknown_variant(suffix))?;
    if shadow.is_some() && !variant.primitive {
        return Err(Error::InvalidArgument {
            group: group.name,
            reason: format!("variant '{}' cannot carry a shadow element", suffix),
        });
    }

    let cleared = group.clear(target);
    tracing::trace!(group = group.name, variant = suffix, cleared, "set choice variant");

    if let Some(value) = value.filter(|v| !v.is_null()) {
        target.insert(group.key(suffix), value);
    }
    if let Some(shadow) = shadow.filter(|v| !v.is_null()) {
        target.insert(group.shadow_key(suffix), shadow);
    }
    Ok(())
}

/// A choice group materialized as an enum with one variant per type.
///
/// Implementations are generated with the `choice_type!` macro.
pub trait ChoiceType: Clone + PartialEq + Send + Sync + Sized + 'static {
    fn group() -> &'static ChoiceGroup;

    /// Suffix of the populated variant
    fn variant(&self) -> &'static str;

    fn write_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()>;

    /// Reads the given variant's key (and shadow) from `reader`.
    fn read_variant(suffix: &str, reader: &mut PropertyReader<'_>) -> Result<Self>;

    /// Concrete key of the populated variant
    fn key(&self) -> String {
        Self::group().key(self.variant())
    }

    /// Builds a choice from a variant suffix and its JSON value.
    fn from_variant(suffix: &str, value: Value) -> Result<Self> {
        let group = Self::group();
        if group.variant(suffix).is_none() {
            return Err(group.unknown_variant(suffix));
        }
        if value.is_null() {
            return Err(Error::InvalidArgument {
                group: group.name,
                reason: format!("variant '{}' requires a value", suffix),
            });
        }

        let config = ModelConfig::default();
        let mut source = Map::new();
        set_choice_type(&mut source, group, suffix, Some(value), None)?;
        let mut reader = PropertyReader::new(source, &config, group.name);
        let choice = Self::read_variant(suffix, &mut reader)?;
        reader.finish()?;
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static GROUP: ChoiceGroup = ChoiceGroup {
        name: "value",
        variants: &[
            ChoiceVariant {
                suffix: "String",
                primitive: true,
            },
            ChoiceVariant {
                suffix: "Boolean",
                primitive: true,
            },
            ChoiceVariant {
                suffix: "Quantity",
                primitive: false,
            },
        ],
    };

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_clear_except_keeps_variant_and_shadow() {
        let mut map = object(json!({
            "valueString": "abc",
            "_valueString": {"id": "s"},
            "_valueBoolean": {"id": "b"},
            "valueQuantity": {"value": 1}
        }));
        assert_eq!(GROUP.clear_except(&mut map, "String"), 2);
        assert_eq!(
            Value::Object(map),
            json!({"valueString": "abc", "_valueString": {"id": "s"}})
        );
    }

    #[test]
    fn test_keys_include_primitive_shadows_only() {
        assert_eq!(
            GROUP.keys(),
            vec![
                "valueString",
                "_valueString",
                "valueBoolean",
                "_valueBoolean",
                "valueQuantity"
            ]
        );
    }

    #[test]
    fn test_owns_key() {
        assert!(GROUP.owns_key("valueString"));
        assert!(GROUP.owns_key("_valueBoolean"));
        assert!(GROUP.owns_key("valueQuantity"));
        assert!(!GROUP.owns_key("_valueQuantity"));
        assert!(!GROUP.owns_key("valueInteger"));
        assert!(!GROUP.owns_key("value"));
        assert!(!GROUP.owns_key("status"));
    }

    #[test]
    fn test_set_choice_type_clears_siblings() {
        let mut map = object(json!({"status": "final"}));
        set_choice_type(
            &mut map,
            &GROUP,
            "String",
            Some(json!("abc")),
            Some(json!({"id": "v1"})),
        )
        .unwrap();
        assert_eq!(
            Value::Object(map.clone()),
            json!({"status": "final", "valueString": "abc", "_valueString": {"id": "v1"}})
        );

        set_choice_type(&mut map, &GROUP, "Boolean", Some(json!(true)), None).unwrap();
        assert_eq!(
            Value::Object(map),
            json!({"status": "final", "valueBoolean": true})
        );
    }

    #[test]
    fn test_set_choice_type_is_order_independent() {
        let mut a = Map::new();
        set_choice_type(&mut a, &GROUP, "Quantity", Some(json!({"value": 1})), None).unwrap();
        set_choice_type(&mut a, &GROUP, "String", Some(json!("x")), None).unwrap();

        let mut b = Map::new();
        set_choice_type(&mut b, &GROUP, "String", Some(json!("x")), None).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_set_choice_type_rejects_unknown_variant() {
        let mut map = object(json!({"valueString": "keep"}));
        let err = set_choice_type(&mut map, &GROUP, "Integer", Some(json!(1)), None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { group: "value", .. }));
        assert_eq!(map["valueString"], json!("keep"));
    }

    #[test]
    fn test_set_choice_type_rejects_shadow_on_complex() {
        let mut map = Map::new();
        let err = set_choice_type(
            &mut map,
            &GROUP,
            "Quantity",
            Some(json!({"value": 1})),
            Some(json!({"id": "x"})),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_present_variants() {
        let map = object(json!({"_valueString": {"id": "a"}, "valueQuantity": {}}));
        let present = GROUP.present_variants(|key| map.contains_key(key));
        assert_eq!(present, vec!["String", "Quantity"]);
    }
}
