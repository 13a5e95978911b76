//! Per-variable metadata carried alongside array data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CubeDataError;

/// How a variable may be resampled.
///
/// Categorical layers (class codes, masks) must stay `Nearest` so that
/// only valid codes ever appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationPolicy {
    #[default]
    Nearest,
    Linear,
}

impl InterpolationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Nearest)
    }
}

impl FromStr for InterpolationPolicy {
    type Err = CubeDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "nearest" => Ok(Self::Nearest),
            "linear" | "bilinear" => Ok(Self::Linear),
            other => Err(CubeDataError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for InterpolationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed description of one data variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Variable name, e.g. `B04` or `s2_B04` once namespaced.
    pub name: String,
    #[serde(default)]
    pub interpolation: InterpolationPolicy,
    /// Human-readable data source, e.g. "Sentinel 2".
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Legend for class codes of categorical layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
}

impl VariableDescriptor {
    pub fn new(name: impl Into<String>, interpolation: InterpolationPolicy) -> Self {
        Self {
            name: name.into(),
            interpolation,
            provider: String::new(),
            description: String::new(),
            units: None,
            classes: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_classes(mut self, classes: impl Into<String>) -> Self {
        self.classes = Some(classes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("nearest".parse::<InterpolationPolicy>().unwrap(), InterpolationPolicy::Nearest);
        assert_eq!("LINEAR".parse::<InterpolationPolicy>().unwrap(), InterpolationPolicy::Linear);
        assert_eq!("bilinear".parse::<InterpolationPolicy>().unwrap(), InterpolationPolicy::Linear);
        assert!("cubic".parse::<InterpolationPolicy>().is_err());
    }

    #[test]
    fn test_descriptor_defaults_to_nearest() {
        let desc: VariableDescriptor = serde_json::from_str(r#"{"name": "SCL"}"#).unwrap();
        assert_eq!(desc.interpolation, InterpolationPolicy::Nearest);
        assert!(desc.units.is_none());
    }

    #[test]
    fn test_descriptor_builders() {
        let desc = VariableDescriptor::new("SCL", InterpolationPolicy::Nearest)
            .with_provider("s2")
            .with_description("Scene classification")
            .with_classes("0: no data, 4: vegetation, 8: cloud medium probability");
        assert_eq!(desc.provider, "s2");
        assert!(desc.interpolation.is_categorical());
        assert!(desc.classes.as_deref().unwrap().contains("vegetation"));

        let dem = VariableDescriptor::new("dem", InterpolationPolicy::Linear).with_units("m");
        assert_eq!(dem.units.as_deref(), Some("m"));
        assert!(!dem.interpolation.is_categorical());
    }
}
