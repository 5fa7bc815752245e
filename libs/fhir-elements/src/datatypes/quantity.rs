//! Quantity, Period and Reference

use crate::element::Element;
use crate::error::Result;
use crate::primitive::{Code, DateTime, Decimal, FhirString, Uri};
use crate::property::{Property, PropertyReader, PropertyWriter};
use crate::record::Record;

/// A measured or measurable amount
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quantity {
    pub base: Element,

    /// Numerical value (with implicit precision)
    pub value: Option<Decimal>,

    /// `<` | `<=` | `>=` | `>` | `ad` - how to understand the value
    pub comparator: Option<Code>,

    /// Unit representation
    pub unit: Option<FhirString>,

    /// System that defines coded unit form
    pub system: Option<Uri>,

    /// Coded form of the unit
    pub code: Option<Code>,
}

impl Quantity {
    /// A UCUM quantity
    pub fn ucum(value: rust_decimal::Decimal, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            value: Some(value.into()),
            unit: Some(code.clone().into()),
            system: Some("http://unitsofmeasure.org".into()),
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn value(&self) -> Option<rust_decimal::Decimal> {
        self.value.as_ref().and_then(|p| p.value().copied())
    }
}

impl Record for Quantity {
    type Base = Element;
    const TYPE_NAME: &'static str = "Quantity";
    const PROPERTIES: &'static [Property] = &[
        Property::primitive("value"),
        Property::primitive("comparator"),
        Property::primitive("unit"),
        Property::primitive("system"),
        Property::primitive("code"),
    ];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("value", &self.value)?;
        writer.primitive("comparator", &self.comparator)?;
        writer.primitive("unit", &self.unit)?;
        writer.primitive("system", &self.system)?;
        writer.primitive("code", &self.code)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            value: reader.primitive("value")?,
            comparator: reader.primitive("comparator")?,
            unit: reader.primitive("unit")?,
            system: reader.primitive("system")?,
            code: reader.primitive("code")?,
        })
    }
}

/// Time range defined by start and end date/time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Period {
    pub base: Element,
    pub start: Option<DateTime>,
    pub end: Option<DateTime>,
}

impl Period {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into().into()),
            end: Some(end.into().into()),
            ..Self::default()
        }
    }
}

impl Record for Period {
    type Base = Element;
    const TYPE_NAME: &'static str = "Period";
    const PROPERTIES: &'static [Property] =
        &[Property::primitive("start"), Property::primitive("end")];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("start", &self.start)?;
        writer.primitive("end", &self.end)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            start: reader.primitive("start")?,
            end: reader.primitive("end")?,
        })
    }
}

/// A reference from one resource to another
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    pub base: Element,

    /// Literal reference, relative, internal or absolute URL
    pub reference: Option<FhirString>,

    /// Type the reference refers to (e.g. "Patient")
    pub type_: Option<Uri>,

    /// Text alternative for the resource
    pub display: Option<FhirString>,
}

impl Reference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into().into()),
            ..Self::default()
        }
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_ref()
            .and_then(|p| p.value())
            .map(String::as_str)
    }

    /// Id of a contained resource for local `#id` references
    pub fn contained_id(&self) -> Option<&str> {
        self.reference()?.strip_prefix('#')
    }
}

impl Record for Reference {
    type Base = Element;
    const TYPE_NAME: &'static str = "Reference";
    const PROPERTIES: &'static [Property] = &[
        Property::primitive("reference"),
        Property::primitive("type"),
        Property::primitive("display"),
    ];

    fn base(&self) -> &Element {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Element {
        &mut self.base
    }

    fn serialize_props_to(&self, writer: &mut PropertyWriter<'_>) -> Result<()> {
        writer.primitive("reference", &self.reference)?;
        writer.primitive("type", &self.type_)?;
        writer.primitive("display", &self.display)?;
        Ok(())
    }

    fn assign_props(base: Element, reader: &mut PropertyReader<'_>) -> Result<Self> {
        Ok(Self {
            base,
            reference: reader.primitive("reference")?,
            type_: reader.primitive("type")?,
            display: reader.primitive("display")?,
        })
    }
}

impl_json_codec!(Quantity, Period, Reference);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::JsonCodec;
    use serde_json::json;

    #[test]
    fn test_ucum_quantity() {
        let qty = Quantity::ucum(rust_decimal::Decimal::new(725, 1), "kg");
        assert_eq!(
            qty.to_json().unwrap(),
            json!({"value": 72.5, "unit": "kg", "system": "http://unitsofmeasure.org", "code": "kg"})
        );
        assert_eq!(qty.value(), Some(rust_decimal::Decimal::new(725, 1)));
    }

    #[test]
    fn test_decimal_value_keeps_written_form() {
        for text in [
            r#"{"value":72,"unit":"kg"}"#,
            r#"{"value":1.50,"unit":"mg"}"#,
        ] {
            let qty: Quantity = serde_json::from_str(text).unwrap();
            assert_eq!(serde_json::to_string(&qty.to_json().unwrap()).unwrap(), text);
        }

        let qty: Quantity = serde_json::from_str(r#"{"value":1.50}"#).unwrap();
        assert_eq!(qty.value(), Some(rust_decimal::Decimal::new(15, 1)));
    }

    #[test]
    fn test_reference_type_key() {
        let json = json!({"reference": "#p1", "type": "Patient"});
        let reference = Reference::from_json(json.clone()).unwrap();
        assert_eq!(reference.contained_id(), Some("p1"));
        assert_eq!(reference.to_json().unwrap(), json);
    }

    #[test]
    fn test_period_shadow_without_value() {
        let json = json!({"start": "2024-01-01", "_end": {"id": "open"}});
        let period = Period::from_json(json.clone()).unwrap();
        assert!(period.end.as_ref().unwrap().value().is_none());
        assert_eq!(period.to_json().unwrap(), json);
    }
}
