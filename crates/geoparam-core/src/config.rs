use crate::error::{GeoparamError, Result};
use crate::models::Format;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Set programmatically by the embedding service
    Override,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Override => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for geometry input translation
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// CRS identifiers advertised for bounding box inputs, the first being the default
    pub extent_crss: ConfigValue<Vec<String>>,
    /// Formats advertised for point and geometry inputs
    pub geometry_formats: ConfigValue<Vec<Format>>,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            // Do not presume anything about the effective CRS at compute time
            extent_crss: ConfigValue::new(vec!["EPSG:4326".to_string()], ConfigSource::Default),
            geometry_formats: ConfigValue::new(Format::geometry_formats(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeoparamError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeoparamError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(crss) = file_config.extent_crss {
            self.extent_crss.update(validate_crs_list(crss)?, ConfigSource::File);
        }

        if let Some(formats) = file_config.geometry_formats {
            let formats = formats.iter().map(|f| parse_format(f)).collect::<Result<Vec<_>>>()?;
            self.geometry_formats.update(formats, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOPARAM_EXTENT_CRSS
        if let Ok(crss_str) = env::var("GEOPARAM_EXTENT_CRSS") {
            match validate_crs_list(split_list(&crss_str)) {
                Ok(crss) => self.extent_crss.update(crss, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOPARAM_EXTENT_CRSS value '{}': expected known CRS identifiers",
                    crss_str
                ),
            }
        }

        // GEOPARAM_GEOMETRY_FORMATS
        if let Ok(formats_str) = env::var("GEOPARAM_GEOMETRY_FORMATS") {
            match parse_format_list(&formats_str) {
                Ok(formats) => self.geometry_formats.update(formats, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOPARAM_GEOMETRY_FORMATS value '{}': expected geojson, gml or wkt",
                    formats_str
                ),
            }
        }

        self
    }

    /// Apply programmatic overrides
    pub fn update_from_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(crss) = overrides.extent_crss {
            self.extent_crss.update(crss, ConfigSource::Override);
        }

        if let Some(formats) = overrides.geometry_formats {
            self.geometry_formats.update(formats, ConfigSource::Override);
        }
    }

    /// Default CRS for bounding boxes that declare none
    pub fn default_extent_crs(&self) -> Option<&str> {
        self.extent_crss.value.first().map(String::as_str)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "extent_crss".to_string(),
            (self.extent_crss.value.join(","), self.extent_crss.source),
        );

        let formats: Vec<&str> = self.geometry_formats.value.iter().map(Format::name).collect();
        map.insert(
            "geometry_formats".to_string(),
            (formats.join(","), self.geometry_formats.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    extent_crss: Option<Vec<String>>,
    geometry_formats: Option<Vec<String>>,
}

/// Programmatic configuration overrides
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub extent_crss: Option<Vec<String>>,
    pub geometry_formats: Option<Vec<Format>>,
}

/// Parse a geometry format from its short name or MIME type
pub fn parse_format(s: &str) -> Result<Format> {
    let format = Format::from_name(s).unwrap_or_else(|| Format::from_mime_type(s));
    match format {
        Format::Wkt | Format::GeoJson | Format::Gml => Ok(format),
        _ => Err(GeoparamError::ConfigInvalid {
            key: "geometry_formats".to_string(),
            reason: format!("Invalid geometry format: {}. Use geojson, gml or wkt", s),
        }),
    }
}

/// Parse a comma-separated list of geometry formats
pub fn parse_format_list(s: &str) -> Result<Vec<Format>> {
    split_list(s).iter().map(|f| parse_format(f)).collect()
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

/// Bounding boxes need at least one advertised CRS
fn validate_crs_list(crss: Vec<String>) -> Result<Vec<String>> {
    if crss.is_empty() {
        return Err(GeoparamError::ConfigInvalid {
            key: "extent_crss".to_string(),
            reason: "At least one CRS identifier is required".to_string(),
        });
    }
    Ok(crss)
}
