//! Readers for the non-WKT geometry encodings
//!
//! Each encoding implements the `GeometryReader` trait, returning the parsed
//! geometry together with whatever spatial reference the payload embeds. The
//! dispatcher normalizes both through the WKT constructor, so readers never
//! decide whether a CRS is valid.

use geo::Geometry;
use geoparam_core::error::Result;
use geoparam_core::models::Format;

pub mod geojson;
pub mod gml;

/// Reader trait that all embedded-CRS geometry encodings implement
pub trait GeometryReader: Send + Sync {
    /// Parse a payload into a geometry and its embedded spatial reference
    fn read(&self, data: &str) -> Result<SourceGeometry>;

    /// Format handled by this reader
    fn format(&self) -> Format;
}

/// Geometry as parsed from a payload, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct SourceGeometry {
    pub geometry: Geometry<f64>,

    /// Spatial reference embedded in the payload, verbatim
    pub srs: Option<String>,
}

static GEOJSON_READER: geojson::GeoJsonReader = geojson::GeoJsonReader;
static GML_READER: gml::GmlReader = gml::GmlReader;

/// Reader for a declared format, if it has one
pub fn reader_for(format: &Format) -> Option<&'static dyn GeometryReader> {
    match format {
        Format::GeoJson => Some(&GEOJSON_READER),
        Format::Gml => Some(&GML_READER),
        _ => None,
    }
}
