//! Coordinate reference systems.
//!
//! A [`Crs`] is built from whatever identifier a caller or a payload supplied.
//! Construction never fails: the identifier is kept verbatim and resolved
//! against the static EPSG registry, and [`Crs::is_valid`] reports whether
//! that resolution succeeded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System built from a textual definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    /// Definition as supplied, trimmed
    pub definition: String,
    /// EPSG code, set only when the definition resolves to a registered CRS
    pub epsg: Option<u32>,
}

impl Crs {
    /// Build a CRS from an identifier, URN, URL or WKT CRS text.
    pub fn from_definition(definition: impl Into<String>) -> Self {
        let definition = definition.into().trim().to_string();
        let epsg = parse_epsg_code(&definition).filter(|code| is_registered(*code));
        Self { definition, epsg }
    }

    /// Build a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self::from_definition(format!("EPSG:{}", code))
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Whether the definition resolved to a known CRS
    pub fn is_valid(&self) -> bool {
        self.epsg.is_some()
    }

    /// Keep the CRS only if it is valid
    pub fn validated(self) -> Option<Self> {
        if self.is_valid() {
            Some(self)
        } else {
            None
        }
    }

    /// Authority identifier such as `EPSG:4326`
    pub fn auth_id(&self) -> Option<String> {
        self.epsg.map(|code| format!("EPSG:{}", code))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.auth_id() {
            Some(auth_id) => write!(f, "{}", auth_id),
            None => write!(f, "{}", self.definition),
        }
    }
}

const CRS84_ALIASES: &[&str] = &[
    "CRS:84",
    "OGC:CRS84",
    "URN:OGC:DEF:CRS:OGC:1.3:CRS84",
    "URN:OGC:DEF:CRS:OGC::CRS84",
    "HTTP://WWW.OPENGIS.NET/DEF/CRS/OGC/1.3/CRS84",
];

const EPSG_URN_PREFIXES: &[&str] = &["URN:OGC:DEF:CRS:EPSG:", "URN:X-OGC:DEF:CRS:EPSG:"];

const EPSG_URL_PREFIXES: &[&str] = &[
    "HTTP://WWW.OPENGIS.NET/DEF/CRS/EPSG/",
    "HTTPS://WWW.OPENGIS.NET/DEF/CRS/EPSG/",
];

/// Extract an EPSG code from the supported identifier forms
pub fn parse_epsg_code(definition: &str) -> Option<u32> {
    let upper = definition.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }

    // CRS84 is WGS 84 with longitude/latitude axis order
    if CRS84_ALIASES.contains(&upper.as_str()) {
        return Some(4326);
    }

    if let Some(code) = upper.strip_prefix("EPSG:") {
        return code.trim().parse().ok();
    }

    // urn:ogc:def:crs:EPSG:[version]:<code>
    if EPSG_URN_PREFIXES.iter().any(|prefix| upper.starts_with(prefix)) {
        return upper.rsplit(':').next().and_then(|code| code.parse().ok());
    }

    // http://www.opengis.net/def/crs/EPSG/0/<code>
    if EPSG_URL_PREFIXES.iter().any(|prefix| upper.starts_with(prefix)) {
        return upper.trim_end_matches('/').rsplit('/').next().and_then(|code| code.parse().ok());
    }

    // http://www.opengis.net/gml/srs/epsg.xml#<code>
    if let Some(idx) = upper.find("EPSG.XML#") {
        return upper[idx + "EPSG.XML#".len()..].parse().ok();
    }

    parse_epsg_from_wkt(&upper)
}

/// Read the root authority code from WKT1 `AUTHORITY["EPSG","n"]` or WKT2 `ID["EPSG",n]`.
///
/// The root authority closes the outermost node, so it is the last one in the text.
fn parse_epsg_from_wkt(wkt: &str) -> Option<u32> {
    let compact: String = wkt.chars().filter(|c| !c.is_whitespace()).collect();
    ["AUTHORITY[\"EPSG\",\"", "ID[\"EPSG\","]
        .iter()
        .filter_map(|marker| compact.rfind(marker).map(|idx| idx + marker.len()))
        .max()
        .and_then(|start| {
            let digits: String =
                compact[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
}

/// Whether the static EPSG registry knows this code
fn is_registered(code: u32) -> bool {
    u16::try_from(code).ok().and_then(crs_definitions::from_code).is_some()
}
