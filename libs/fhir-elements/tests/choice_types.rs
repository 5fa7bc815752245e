use ferrum_elements::datatypes::{Extension, ExtensionValue};
use ferrum_elements::resources::{Observation, ObservationEffective, ObservationValue};
use ferrum_elements::{set_choice_type, ChoiceType, Error, JsonCodec, RecordBuilder};
use serde_json::{json, Map, Value};

fn sample(suffix: &str) -> Value {
    match suffix {
        "Quantity" => json!({"value": 1.5, "unit": "mg"}),
        "CodeableConcept" => json!({"text": "positive"}),
        "String" => json!("abc"),
        "Boolean" => json!(true),
        "Integer" => json!(3),
        "DateTime" => json!("2024-05-01T08:00:00Z"),
        "Period" => json!({"start": "2024-05-01"}),
        other => panic!("no sample for {}", other),
    }
}

#[test]
fn string_then_boolean_on_same_builder() {
    let mut builder = RecordBuilder::<Extension>::new();
    builder.set(|e| e.url = Some("http://example.org/flag".to_string()));

    builder
        .set_choice_variant(|e: &mut Extension| &mut e.value, "String", json!("abc"))
        .unwrap();
    let json = builder.build().to_json().unwrap();
    assert_eq!(json["valueString"], "abc");
    for key in ["valueBoolean", "_valueBoolean", "_valueString"] {
        assert!(json.get(key).is_none(), "{} should be absent", key);
    }

    builder
        .set_choice_variant(|e: &mut Extension| &mut e.value, "Boolean", json!(true))
        .unwrap();
    let json = builder.build().to_json().unwrap();
    assert_eq!(json["valueBoolean"], true);
    for key in ["valueString", "_valueString", "_valueBoolean"] {
        assert!(json.get(key).is_none(), "{} should be absent", key);
    }
}

#[test]
fn every_variant_pair_leaves_one_variant() {
    let group = ObservationValue::group();
    for first in group.variants {
        for second in group.variants {
            let mut builder = Observation::builder();
            builder
                .set_choice_variant(|o: &mut Observation| &mut o.value, first.suffix, sample(first.suffix))
                .unwrap()
                .set_choice_variant(|o: &mut Observation| &mut o.value, second.suffix, sample(second.suffix))
                .unwrap();

            let json = builder.build().to_json().unwrap();
            let present: Vec<_> = group
                .keys()
                .into_iter()
                .filter(|key| json.get(key).is_some())
                .collect();
            assert_eq!(
                present,
                vec![group.key(second.suffix)],
                "{} then {}",
                first.suffix,
                second.suffix
            );
        }
    }
}

#[test]
fn unknown_variant_is_invalid_argument() {
    let mut builder = Observation::builder();
    let err = builder
        .set_choice_variant(|o: &mut Observation| &mut o.effective, "Timing", json!({}))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { group: "effective", .. }));
    assert!(builder.draft().effective.is_none());
}

#[test]
fn null_variant_value_is_invalid_argument() {
    let err = ObservationEffective::from_variant("DateTime", Value::Null).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { group: "effective", .. }));
}

#[test]
fn typed_and_dynamic_variants_agree() {
    let typed = ObservationValue::Integer(3.into());
    let dynamic = ObservationValue::from_variant("Integer", json!(3)).unwrap();
    assert_eq!(typed, dynamic);
    assert_eq!(dynamic.key(), "valueInteger");
}

#[test]
fn map_runtime_matches_typed_records() {
    let group = ExtensionValue::group();
    let mut map = Map::new();
    map.insert("url".to_string(), json!("http://example.org/x"));

    set_choice_type(&mut map, group, "Code", Some(json!("a")), Some(json!({"id": "c"}))).unwrap();
    set_choice_type(&mut map, group, "Integer", Some(json!(7)), None).unwrap();

    let ext = Extension::from_json(Value::Object(map.clone())).unwrap();
    assert!(matches!(ext.value, Some(ExtensionValue::Integer(_))));
    assert_eq!(ext.to_json().unwrap(), Value::Object(map));
}

#[test]
fn shadow_on_complex_variant_is_rejected() {
    let mut map = Map::new();
    let err = set_choice_type(
        &mut map,
        ExtensionValue::group(),
        "Coding",
        Some(json!({"code": "x"})),
        Some(json!({"id": "nope"})),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { group: "value", .. }));
    assert!(map.is_empty());
}
