//! Serialization and reconstruction settings
//!
//! Settings can be built in code or loaded from YAML:
//!
//! ```rust
//! use ferrum_elements::{EmptyArrayPolicy, ModelConfig};
//!
//! let cfg = ModelConfig::from_yaml("empty_arrays: omit\n").unwrap();
//! assert_eq!(cfg.empty_arrays, EmptyArrayPolicy::Omit);
//! assert!(cfg.check_resource_type);
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How a present-but-empty sequence is serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyArrayPolicy {
    /// Emit `[]`
    #[default]
    Keep,
    /// Drop the property as if it were unset
    Omit,
}

/// What to do with keys that are not declared by the record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPropertyPolicy {
    #[default]
    Ignore,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub empty_arrays: EmptyArrayPolicy,
    pub unknown_properties: UnknownPropertyPolicy,
    /// Reject input whose `resourceType` names a different record type.
    pub check_resource_type: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            empty_arrays: EmptyArrayPolicy::Keep,
            unknown_properties: UnknownPropertyPolicy::Ignore,
            check_resource_type: true,
        }
    }
}

impl ModelConfig {
    /// Rejects undeclared keys and drops empty arrays.
    pub fn strict() -> Self {
        Self {
            empty_arrays: EmptyArrayPolicy::Omit,
            unknown_properties: UnknownPropertyPolicy::Reject,
            check_resource_type: true,
        }
    }

    pub fn with_empty_arrays(mut self, policy: EmptyArrayPolicy) -> Self {
        self.empty_arrays = policy;
        self
    }

    pub fn with_unknown_properties(mut self, policy: UnknownPropertyPolicy) -> Self {
        self.unknown_properties = policy;
        self
    }

    pub fn with_resource_type_check(mut self, check: bool) -> Self {
        self.check_resource_type = check;
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
