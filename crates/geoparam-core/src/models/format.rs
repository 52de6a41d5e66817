//! Declared data formats of submitted inputs.

use std::fmt;

/// Format descriptor used to select a decoding path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    /// Well-known text, optionally prefixed with `CRS=<crs>;`
    Wkt,
    GeoJson,
    Gml,
    /// Four-value bounding box tuple
    BoundingBox,
    /// Any other declared MIME type, kept verbatim
    Unsupported(String),
}

impl Format {
    /// Resolve a declared MIME type.
    ///
    /// Matching is case-insensitive and ignores parameters such as `; version=3.2`.
    pub fn from_mime_type(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/wkt" | "text/wkt" => Format::Wkt,
            "application/vnd.geo+json" | "application/geo+json" => Format::GeoJson,
            "application/gml+xml" => Format::Gml,
            _ => Format::Unsupported(mime_type.to_string()),
        }
    }

    /// Resolve a short format name (`wkt`, `geojson`, `gml`, `bbox`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wkt" => Some(Format::Wkt),
            "geojson" => Some(Format::GeoJson),
            "gml" => Some(Format::Gml),
            "bbox" => Some(Format::BoundingBox),
            _ => None,
        }
    }

    /// Short name used in error messages
    pub fn name(&self) -> &str {
        match self {
            Format::Wkt => "wkt",
            Format::GeoJson => "geojson",
            Format::Gml => "gml",
            Format::BoundingBox => "bbox",
            Format::Unsupported(mime_type) => mime_type.as_str(),
        }
    }

    /// Canonical MIME type; bounding boxes are not carried as a complex payload
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Format::Wkt => Some("application/wkt"),
            Format::GeoJson => Some("application/vnd.geo+json"),
            Format::Gml => Some("application/gml+xml"),
            Format::BoundingBox => None,
            Format::Unsupported(mime_type) => Some(mime_type.as_str()),
        }
    }

    /// Formats accepted by point and geometry parameters, in advertised order
    pub fn geometry_formats() -> Vec<Format> {
        vec![Format::GeoJson, Format::Gml, Format::Wkt]
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mime_types() {
        let known = [
            ("application/wkt", Format::Wkt),
            ("text/wkt", Format::Wkt),
            ("application/vnd.geo+json", Format::GeoJson),
            ("application/geo+json", Format::GeoJson),
            ("application/gml+xml", Format::Gml),
        ];
        for (mime_type, format) in known {
            assert_eq!(Format::from_mime_type(mime_type), format);
        }
    }

    #[test]
    fn test_mime_parameters_and_case_are_ignored() {
        let format = Format::from_mime_type("Application/GML+XML; version=3.2");
        assert_eq!(format, Format::Gml);
    }

    #[test]
    fn test_unknown_mime_type_is_kept() {
        let format = Format::from_mime_type("application/unknown");
        assert_eq!(
            format,
            Format::Unsupported("application/unknown".to_string())
        );
        assert_eq!(format.name(), "application/unknown");
        assert_eq!(format.mime_type(), Some("application/unknown"));
    }

    #[test]
    fn test_names() {
        assert_eq!(Format::from_name("GeoJSON"), Some(Format::GeoJson));
        assert_eq!(Format::from_name("bbox"), Some(Format::BoundingBox));
        assert_eq!(Format::from_name("shp"), None);
        assert_eq!(Format::Wkt.to_string(), "wkt");
        assert_eq!(Format::BoundingBox.mime_type(), None);
    }
}
