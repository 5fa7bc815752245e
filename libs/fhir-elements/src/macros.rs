//! Declaration macros for generated types

/// Declares a choice group enum and its [`ChoiceType`](crate::choice::ChoiceType)
/// implementation.
///
/// Each variant is tagged `primitive` (wrapped in [`Primitive`](crate::Primitive),
/// serialized with a `_` shadow) or `complex` (a nested record). The variant
/// name is the FHIR type suffix.
macro_rules! choice_type {
    (@slot primitive $ty:ty) => { $crate::primitive::Primitive<$ty> };
    (@slot complex $ty:ty) => { $ty };

    (@is_primitive primitive) => { true };
    (@is_primitive complex) => { false };

    (@write primitive $writer:ident, $key:expr, $value:ident) => {
        $writer.write_primitive($key, $value)
    };
    (@write complex $writer:ident, $key:expr, $value:ident) => {
        $writer.write_complex($key, $value)
    };

    (@read primitive $reader:ident, $key:expr) => {
        $reader.primitive($key)?.unwrap_or_default()
    };
    (@read complex $reader:ident, $key:expr) => {
        match $reader.complex($key)? {
            Some(value) => value,
            None => return Err($crate::error::Error::NotAnObject { context: $key.to_string() }),
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident($group:literal) {
            $( $(#[$vmeta:meta])* $kind:ident $variant:ident($ty:ty) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant(choice_type!(@slot $kind $ty)), )+
        }

        impl $crate::choice::ChoiceType for $name {
            fn group() -> &'static $crate::choice::ChoiceGroup {
                static GROUP: $crate::choice::ChoiceGroup = $crate::choice::ChoiceGroup {
                    name: $group,
                    variants: &[
                        $( $crate::choice::ChoiceVariant {
                            suffix: stringify!($variant),
                            primitive: choice_type!(@is_primitive $kind),
                        }, )+
                    ],
                };
                &GROUP
            }

            fn variant(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($variant), )+
                }
            }

            fn write_to(
                &self,
                writer: &mut $crate::property::PropertyWriter<'_>,
            ) -> $crate::error::Result<()> {
                let key = <Self as $crate::choice::ChoiceType>::key(self);
                match self {
                    $( Self::$variant(value) => choice_type!(@write $kind writer, &key, value), )+
                }
            }

            fn read_variant(
                suffix: &str,
                reader: &mut $crate::property::PropertyReader<'_>,
            ) -> $crate::error::Result<Self> {
                let group = <Self as $crate::choice::ChoiceType>::group();
                let key = group.key(suffix);
                $(
                    if suffix == stringify!($variant) {
                        return Ok(Self::$variant(choice_type!(@read $kind reader, &key)));
                    }
                )+
                Err(group.unknown_variant(suffix))
            }
        }
    };
}

/// Implements serde `Serialize` / `Deserialize` by going through the type's
/// [`JsonCodec`](crate::record::JsonCodec) with the default configuration.
macro_rules! impl_serde_via_codec {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                use serde::ser::Error as _;
                let value = $crate::record::JsonCodec::to_json(self).map_err(S::Error::custom)?;
                serde::Serialize::serialize(&value, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                use serde::de::Error as _;
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                <$ty as $crate::record::JsonCodec>::from_json(value).map_err(D::Error::custom)
            }
        }
    };
}

/// Implements [`JsonCodec`](crate::record::JsonCodec) and serde support for
/// record types through their [`Record`](crate::record::Record) implementation.
macro_rules! impl_json_codec {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::record::JsonCodec for $ty {
            fn to_json_with(
                &self,
                config: &$crate::config::ModelConfig,
            ) -> $crate::error::Result<serde_json::Value> {
                $crate::record::encode_record(self, config)
            }

            fn from_json_with(
                value: serde_json::Value,
                config: &$crate::config::ModelConfig,
            ) -> $crate::error::Result<Self> {
                $crate::record::decode_record(value, config)
            }
        }

        impl_serde_via_codec!($ty);
    )+};
}
