//! Inputs as submitted by the protocol layer.

use crate::models::format::Format;

/// Submitted data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Textual payload of a complex input (WKT, GeoJSON, GML)
    Text(String),
    /// Sequence of numeric strings, as carried by bounding box inputs
    Tuple(Vec<String>),
}

/// A submitted input together with its declared format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedInput {
    /// Identifier of the parameter the input was submitted for
    pub identifier: String,
    pub payload: Payload,
    pub format: Format,
    /// Declared CRS, only meaningful for bounding boxes
    pub crs: Option<String>,
}

impl TaggedInput {
    /// Create a complex input from its textual data and declared MIME type
    pub fn complex(
        identifier: impl Into<String>,
        data: impl Into<String>,
        mime_type: &str,
    ) -> Self {
        Self::with_format(identifier, data, Format::from_mime_type(mime_type))
    }

    /// Create a complex input with an already resolved format
    pub fn with_format(
        identifier: impl Into<String>,
        data: impl Into<String>,
        format: Format,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            payload: Payload::Text(data.into()),
            format,
            crs: None,
        }
    }

    /// Create a bounding box input from values ordered (xmin, xmax, ymin, ymax)
    pub fn bounding_box<I, V>(identifier: impl Into<String>, values: I, crs: Option<&str>) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self {
            identifier: identifier.into(),
            payload: Payload::Tuple(values.into_iter().map(|v| v.to_string()).collect()),
            format: Format::BoundingBox,
            crs: crs.map(str::to_string),
        }
    }

    /// Set the declared CRS
    pub fn crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Textual payload, if any
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            Payload::Tuple(_) => None,
        }
    }
}
