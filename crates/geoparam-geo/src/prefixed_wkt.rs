//! WKT with an optional `CRS=<crs>;` prefix.
//!
//! `CRS=EPSG:4326;POINT(1 2)` yields a point referenced in EPSG:4326, while a
//! bare `POINT(1 2)` or a prefix naming an unknown CRS yields an unreferenced
//! point. Only the WKT body can make the parse fail.

use geo::Geometry;
use geoparam_core::error::{GeoparamError, Result};
use geoparam_core::models::{Crs, Format, ReferencedGeometry};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// Optional CRS prefix followed by the WKT body
static WKT_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?:CRS=([^;]*?);)?(.*?)\s*$")
        .expect("Invalid WKT prefix regex pattern")
});

/// Parse WKT with an optional `CRS=<crs>;` prefix
pub fn parse_wkt_with_crs(text: &str) -> Result<ReferencedGeometry> {
    // The pattern accepts any string; a miss is still reported as malformed input
    let captures = WKT_EXPR.captures(text).ok_or_else(|| {
        GeoparamError::malformed(Format::Wkt.name(), "input does not match CRS=<crs>;<wkt>")
    })?;

    let body = captures.get(2).map_or("", |m| m.as_str());
    let geometry = geometry_from_wkt(body, &Format::Wkt)?;

    let crs = captures
        .get(1)
        .map(|m| m.as_str().trim())
        .filter(|definition| !definition.is_empty())
        .map(Crs::from_definition);

    if let Some(crs) = crs.as_ref().filter(|crs| !crs.is_valid()) {
        tracing::debug!(crs = %crs.definition, "Ignoring invalid CRS prefix");
    }

    Ok(ReferencedGeometry::with_crs(geometry, crs))
}

/// Construct a geometry from a WKT body.
///
/// All decoding paths go through this constructor; `source` names the format
/// the text came from so that failures are attributed to the right payload.
pub fn geometry_from_wkt(body: &str, source: &Format) -> Result<Geometry<f64>> {
    let body = body.trim();
    if body.is_empty() {
        return Err(GeoparamError::malformed(source.name(), "empty geometry text"));
    }

    let parsed = ::wkt::Wkt::<f64>::from_str(body).map_err(|e| {
        GeoparamError::malformed(source.name(), format!("Failed to parse WKT: {}", e))
    })?;

    // The parser stops after the first geometry
    if has_trailing_text(body) {
        return Err(GeoparamError::malformed(source.name(), "unexpected text after geometry"));
    }

    let geometry = Geometry::try_from(parsed).map_err(|e| {
        GeoparamError::malformed(source.name(), format!("Unsupported WKT geometry: {}", e))
    })?;

    // An empty point has no geo counterpart and comes back as an empty multipoint
    let empty_point = leading_tag(body).eq_ignore_ascii_case("POINT")
        && !matches!(geometry, Geometry::Point(_));
    if empty_point {
        return Err(GeoparamError::malformed(source.name(), "empty points are not supported"));
    }

    Ok(geometry)
}

/// Geometry type keyword at the start of a WKT body
fn leading_tag(body: &str) -> &str {
    body.split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
}

/// Whether anything follows the first complete geometry of a parsed body
fn has_trailing_text(body: &str) -> bool {
    if !body.contains('(') {
        return !body
            .rsplit(char::is_whitespace)
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("EMPTY"));
    }

    let mut depth = 0usize;
    for (offset, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return offset + 1 < body.len();
                }
            }
            _ => {}
        }
    }
    false
}
