//! Processing parameter declarations and the inputs advertised for them.

use crate::models::format::Format;
use serde::{Deserialize, Serialize};

/// Kind of a declared processing parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ParameterKind {
    Geometry,
    Point,
    Extent,
    /// Parameters not handled by geometry translation
    #[default]
    Other,
}

/// A declared processing parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    pub kind: ParameterKind,
    pub description: Option<String>,
}

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Protocol-level input advertised for a parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDefinition {
    BoundingBox {
        identifier: String,
        description: Option<String>,
        /// Supported CRS identifiers, the first one being the default
        crss: Vec<String>,
    },
    Complex {
        identifier: String,
        description: Option<String>,
        supported_formats: Vec<Format>,
    },
}

impl InputDefinition {
    pub fn identifier(&self) -> &str {
        match self {
            InputDefinition::BoundingBox { identifier, .. } => identifier,
            InputDefinition::Complex { identifier, .. } => identifier,
        }
    }

    /// Abstract advertised with the input
    pub fn description(&self) -> Option<&str> {
        match self {
            InputDefinition::BoundingBox { description, .. } => description.as_deref(),
            InputDefinition::Complex { description, .. } => description.as_deref(),
        }
    }
}
