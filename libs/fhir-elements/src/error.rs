//! Error types for the element model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument for {group}[x]: {reason}")]
    InvalidArgument { group: &'static str, reason: String },

    #[error("conflicting variants for {group}[x]: '{first}' and '{second}' are both present")]
    ConflictingChoice {
        group: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("unknown property '{property}' on {type_name}")]
    UnknownProperty {
        type_name: &'static str,
        property: String,
    },

    #[error("resource type mismatch: expected {expected}, found {found}")]
    ResourceTypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("missing resourceType")]
    MissingResourceType,

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("expected a JSON object for {context}")]
    NotAnObject { context: String },

    #[error("invalid value for property '{property}': {source}")]
    InvalidValue {
        property: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
