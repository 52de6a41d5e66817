//! Reduction of inputs to points and rectangles

use geo::{coord, Centroid, Rect};
use geoparam_core::error::{GeoparamError, Result};
use geoparam_core::models::{
    Crs, Format, Payload, ReferencedPoint, ReferencedRectangle, TaggedInput,
};

use crate::decode::decode_geometry;

/// Decode an input and reduce it to its centroid.
///
/// The point keeps the decoded geometry's CRS; an unreferenced geometry gives
/// an unreferenced point.
pub fn decode_point(input: &TaggedInput) -> Result<ReferencedPoint> {
    let _span = tracing::debug_span!(
        "decode_point",
        identifier = %input.identifier,
        format = %input.format
    )
    .entered();

    let geom = decode_geometry(input)?;
    let point = geom.geometry.centroid().ok_or_else(|| {
        GeoparamError::malformed(
            input.format.name(),
            "cannot take the centroid of an empty geometry",
        )
    })?;

    Ok(ReferencedPoint {
        point,
        crs: geom.crs,
    })
}

/// Decode a bounding box given as (xmin, xmax, ymin, ymax).
///
/// The CRS is the one declared with the input, attached without a validity
/// check: unlike geometries and points, an invalid CRS stays on the rectangle.
pub fn decode_extent(input: &TaggedInput) -> Result<ReferencedRectangle> {
    let _span = tracing::debug_span!(
        "decode_extent",
        identifier = %input.identifier,
        crs = input.crs.as_deref().unwrap_or_default()
    )
    .entered();

    let values = bounds(&input.payload)?;
    let [xmin, xmax, ymin, ymax] = values;
    let rect = Rect::new(coord! { x: xmin, y: ymin }, coord! { x: xmax, y: ymax });

    let crs = Crs::from_definition(input.crs.as_deref().unwrap_or_default());
    if !crs.is_valid() {
        tracing::warn!(crs = %crs.definition, "Bounding box declares an unknown CRS");
    }

    Ok(ReferencedRectangle { rect, crs })
}

/// Exactly four numbers, from a tuple or from comma/whitespace separated text
fn bounds(payload: &Payload) -> Result<[f64; 4]> {
    let raw: Vec<&str> = match payload {
        Payload::Tuple(values) => values.iter().map(String::as_str).collect(),
        Payload::Text(text) => text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|v| !v.is_empty())
            .collect(),
    };

    let values = raw
        .iter()
        .map(|v| {
            v.trim().parse::<f64>().map_err(|_| {
                let reason = format!("Invalid number: '{}'", v);
                GeoparamError::malformed(Format::BoundingBox.name(), reason)
            })
        })
        .collect::<Result<Vec<_>>>()?;

    values.try_into().map_err(|values: Vec<f64>| {
        GeoparamError::malformed(
            Format::BoundingBox.name(),
            format!(
                "expected 4 values (xmin, xmax, ymin, ymax), found {}",
                values.len()
            ),
        )
    })
}
