use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The logical groups persisted artifacts are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Job documents as they were submitted.
    Request,
    /// Raw results returned by the service.
    Output,
    /// Load profile reference data.
    LoadProfile,
    /// Utility rate definitions.
    RateDefinition,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Request,
        Category::Output,
        Category::LoadProfile,
        Category::RateDefinition,
    ];

    /// The directory (or key prefix) a store keeps this category under.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Request => "inputs",
            Self::Output => "results",
            Self::LoadProfile => "load_profiles",
            Self::RateDefinition => "rates",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Output => "output",
            Self::LoadProfile => "load_profile",
            Self::RateDefinition => "rate_definition",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s || c.dir_name() == s)
            .ok_or_else(|| StorageError::InvalidName(format!("unknown category `{s}`")))
    }
}

/// Rejects artifact names that are empty or could escape their category.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name.contains("..")
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
