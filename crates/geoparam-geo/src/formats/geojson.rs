//! GeoJSON geometry reader

use geo::Geometry;
use geoparam_core::error::{GeoparamError, Result};
use geoparam_core::models::Format;
use serde_json::Value;

use crate::formats::{GeometryReader, SourceGeometry};

/// GeoJSON geometry reader
pub struct GeoJsonReader;

impl GeometryReader for GeoJsonReader {
    fn read(&self, data: &str) -> Result<SourceGeometry> {
        let geojson: ::geojson::GeoJson = data
            .parse()
            .map_err(|e| malformed(format!("Failed to parse GeoJSON: {}", e)))?;

        let geometry = match geojson {
            ::geojson::GeoJson::Geometry(geometry) => geometry,
            ::geojson::GeoJson::Feature(_) => {
                return Err(malformed("Expected a geometry object, found a Feature"))
            }
            ::geojson::GeoJson::FeatureCollection(_) => {
                return Err(malformed("Expected a geometry object, found a FeatureCollection"))
            }
        };

        let srs = geometry
            .foreign_members
            .as_ref()
            .and_then(|members| members.get("crs"))
            .and_then(extract_crs_name);

        let geometry = Geometry::<f64>::try_from(geometry)
            .map_err(|e| malformed(format!("Failed to convert geometry: {}", e)))?;

        Ok(SourceGeometry { geometry, srs })
    }

    fn format(&self) -> Format {
        Format::GeoJson
    }
}

fn malformed(reason: impl Into<String>) -> GeoparamError {
    GeoparamError::malformed(Format::GeoJson.name(), reason)
}

/// Extract a CRS identifier from a legacy GeoJSON `crs` member
///
/// Handles named CRS (`{"type": "name", "properties": {"name": "EPSG:3857"}}`)
/// and EPSG-typed CRS (`{"type": "EPSG", "properties": {"code": 3857}}`).
fn extract_crs_name(crs: &Value) -> Option<String> {
    let properties = crs.get("properties")?;
    let crs_type = crs.get("type").and_then(Value::as_str).unwrap_or("name");

    if crs_type.eq_ignore_ascii_case("epsg") {
        return match properties.get("code")? {
            Value::Number(code) => Some(format!("EPSG:{}", code)),
            Value::String(code) => Some(format!("EPSG:{}", code)),
            _ => None,
        };
    }

    properties.get("name").and_then(Value::as_str).map(str::to_string)
}
