//! GeoParam Geo - Decoding of submitted geometry inputs
//!
//! This crate turns tagged inputs into the canonical shapes of `geoparam-core`:
//! CRS-prefixed WKT parsing, GeoJSON and GML decoding, format dispatch, and
//! reduction to points and rectangles. Every entry point is a pure function of
//! its input and may be called concurrently.

pub mod decode;
pub mod formats;
pub mod prefixed_wkt;
pub mod processing;
pub mod project;

pub use decode::decode_geometry;
pub use prefixed_wkt::parse_wkt_with_crs;
pub use processing::{input_definition, processing_value};
pub use project::{decode_extent, decode_point};
