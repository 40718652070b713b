use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Part types offered when adding a part to a record.
pub const PART_TYPES: [&str; 7] = [
    "Engine Oil",
    "Battery",
    "Tire",
    "Brake Pads",
    "Air Filter",
    "Spark Plugs",
    "Other",
];

/// Whether the serviced component was actually replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Replaced {
    #[serde(rename = "Yes")]
    Yes,
    #[serde(rename = "No")]
    #[default]
    No,
}

impl Replaced {
    pub fn is_yes(self) -> bool { matches!(self, Replaced::Yes) }

    pub fn as_str(self) -> &'static str {
        match self {
            Replaced::Yes => "Yes",
            Replaced::No => "No",
        }
    }
}

impl fmt::Display for Replaced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Replaced {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(Replaced::Yes),
            "no" | "n" | "false" => Ok(Replaced::No),
            other => Err(ModelError::Validation(format!("replaced must be Yes or No, got '{other}'"))),
        }
    }
}

/// One serviced or replaced component. Owned by its record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub part_type: String,
    #[serde(default)]
    pub replaced: Replaced,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub manufacture_date: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub change_date: String,
    #[serde(default)]
    pub cost: f64,
}

impl Part {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.part_type.trim().is_empty() {
            return Err(ModelError::Validation("part type required".into()));
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(ModelError::Validation("cost cannot be negative".into()));
        }
        Ok(())
    }
}
