//! Format dispatch from tagged inputs to referenced geometries

use ::wkt::ToWkt;
use geoparam_core::error::{GeoparamError, Result};
use geoparam_core::models::{Crs, Format, ReferencedGeometry, TaggedInput};

use crate::formats::{reader_for, SourceGeometry};
use crate::prefixed_wkt::{geometry_from_wkt, parse_wkt_with_crs};

/// Decode a tagged input into a geometry, referenced when its CRS is valid.
///
/// WKT goes through [`parse_wkt_with_crs`]. GeoJSON and GML are parsed by
/// their reader, then re-exported to WKT and rebuilt through the same
/// constructor so every format ends up on one construction path.
pub fn decode_geometry(input: &TaggedInput) -> Result<ReferencedGeometry> {
    let _span = tracing::debug_span!(
        "decode_geometry",
        identifier = %input.identifier,
        format = %input.format
    )
    .entered();

    if input.format == Format::Wkt {
        return parse_wkt_with_crs(text_payload(input)?);
    }

    let Some(reader) = reader_for(&input.format) else {
        let mime_type = input.format.mime_type().unwrap_or(input.format.name());
        return Err(GeoparamError::UnsupportedFormat {
            mime_type: mime_type.to_string(),
        });
    };

    let source = reader.read(text_payload(input)?)?;
    normalize(source, &reader.format())
}

/// Rebuild a parsed geometry through WKT and attach its embedded CRS if valid.
///
/// Failures are attributed to `format`, the format of the reader that parsed it.
fn normalize(source: SourceGeometry, format: &Format) -> Result<ReferencedGeometry> {
    let geometry = geometry_from_wkt(&source.geometry.wkt_string(), format)?;

    let crs = source.srs.as_deref().map(Crs::from_definition);
    if let Some(crs) = crs.as_ref().filter(|crs| !crs.is_valid()) {
        tracing::debug!(srs = %crs.definition, "Ignoring invalid embedded spatial reference");
    }

    Ok(ReferencedGeometry::with_crs(geometry, crs))
}

/// Textual payload of a complex input
pub(crate) fn text_payload(input: &TaggedInput) -> Result<&str> {
    input.text().ok_or_else(|| {
        GeoparamError::malformed(input.format.name(), "expected a textual payload")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, Point};
    use geoparam_core::error::ErrorKind;

    #[test]
    fn test_wkt_dispatch() {
        let input = TaggedInput::complex("geom", "CRS=EPSG:4326;POINT(1 2)", "application/wkt");
        let geom = decode_geometry(&input).unwrap();
        assert_eq!(geom.geometry, Geometry::Point(Point::new(1.0, 2.0)));
        assert!(geom.is_referenced());
    }

    #[test]
    fn test_geojson_dispatch_with_crs() {
        let input = TaggedInput::complex(
            "geom",
            r#"{"type": "Point", "coordinates": [1, 2],
                "crs": {"type": "name", "properties": {"name": "EPSG:3857"}}}"#,
            "application/vnd.geo+json",
        );
        let geom = decode_geometry(&input).unwrap();
        assert_eq!(geom.geometry, Geometry::Point(Point::new(1.0, 2.0)));
        assert_eq!(geom.crs.and_then(|crs| crs.epsg), Some(3857));
    }

    #[test]
    fn test_geojson_with_invalid_crs_degrades() {
        let input = TaggedInput::complex(
            "geom",
            r#"{"type": "Point", "coordinates": [1, 2],
                "crs": {"type": "name", "properties": {"name": "urn:unknown:crs"}}}"#,
            "application/geo+json",
        );
        let geom = decode_geometry(&input).unwrap();
        assert!(geom.crs.is_none());
    }

    #[test]
    fn test_gml_dispatch() {
        let input = TaggedInput::complex(
            "geom",
            r#"<gml:Point xmlns:gml="http://www.opengis.net/gml"
                    srsName="urn:ogc:def:crs:EPSG::4326">
                <gml:pos>5 6</gml:pos>
            </gml:Point>"#,
            "application/gml+xml",
        );
        let geom = decode_geometry(&input).unwrap();
        assert_eq!(geom.geometry, Geometry::Point(Point::new(5.0, 6.0)));
        assert_eq!(geom.crs.and_then(|crs| crs.epsg), Some(4326));
    }

    #[test]
    fn test_unsupported_format() {
        let input = TaggedInput::complex("geom", "1,2", "text/csv");
        let err = decode_geometry(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(err.to_string().contains("text/csv"));
    }

    #[test]
    fn test_bounding_box_is_not_a_geometry() {
        let input = TaggedInput::bounding_box("extent", [1, 3, 5, 9], Some("EPSG:4326"));
        let err = decode_geometry(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(err.to_string().contains("bbox"));
    }

    #[test]
    fn test_tuple_payload_for_wkt_is_malformed() {
        let mut input = TaggedInput::bounding_box("geom", [1, 2], None);
        input.format = Format::Wkt;
        let err = decode_geometry(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_reader_failures_name_the_reader_format() {
        let input = TaggedInput::complex("geom", "<Point/>", "application/gml+xml; version=3.2");
        let err = decode_geometry(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().starts_with("Invalid gml format"));
    }
}
