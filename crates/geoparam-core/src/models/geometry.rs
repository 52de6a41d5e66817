//! Canonical shapes handed to the processing engine.
//!
//! Geometries and points carry an optional CRS which, when present, has passed
//! [`Crs::is_valid`]. Rectangles always carry the CRS declared with the input,
//! whether or not it is valid.

use crate::models::crs::Crs;
use geo::{Geometry, Point, Rect};
use wkt::ToWkt;

/// Geometry optionally tagged with a validated CRS
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencedGeometry {
    pub geometry: Geometry<f64>,
    pub crs: Option<Crs>,
}

impl ReferencedGeometry {
    /// Geometry without a reference system
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            crs: None,
        }
    }

    /// Attach the CRS if it is valid, otherwise leave the geometry unreferenced
    pub fn with_crs(geometry: Geometry<f64>, crs: Option<Crs>) -> Self {
        Self {
            geometry,
            crs: crs.and_then(Crs::validated),
        }
    }

    pub fn is_referenced(&self) -> bool {
        self.crs.is_some()
    }

    /// Canonical WKT export of the geometry
    pub fn to_wkt(&self) -> String {
        self.geometry.wkt_string()
    }
}

/// Point optionally tagged with a validated CRS
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencedPoint {
    pub point: Point<f64>,
    pub crs: Option<Crs>,
}

impl ReferencedPoint {
    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    pub fn is_referenced(&self) -> bool {
        self.crs.is_some()
    }
}

/// Rectangle tagged with the CRS declared alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencedRectangle {
    pub rect: Rect<f64>,
    pub crs: Crs,
}

impl ReferencedRectangle {
    pub fn xmin(&self) -> f64 {
        self.rect.min().x
    }

    pub fn xmax(&self) -> f64 {
        self.rect.max().x
    }

    pub fn ymin(&self) -> f64 {
        self.rect.min().y
    }

    pub fn ymax(&self) -> f64 {
        self.rect.max().y
    }
}

/// Value handed to the processing engine for a geometry-like parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingValue {
    Geometry(ReferencedGeometry),
    Point(ReferencedPoint),
    Extent(ReferencedRectangle),
}

impl ProcessingValue {
    /// CRS carried by the value, if any
    pub fn crs(&self) -> Option<&Crs> {
        match self {
            ProcessingValue::Geometry(g) => g.crs.as_ref(),
            ProcessingValue::Point(p) => p.crs.as_ref(),
            ProcessingValue::Extent(r) => Some(&r.crs),
        }
    }
}
