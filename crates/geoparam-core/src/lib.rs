//! GeoParam Core - Domain models, errors and configuration
//!
//! This crate holds the canonical shapes handed to the processing engine
//! (referenced geometries, points and rectangles), the tagged inputs they are
//! decoded from, and the layered configuration shared by all geoparam crates.

pub mod config;
pub mod error;
pub mod models;

pub use error::{ErrorKind, GeoparamError, Result};
