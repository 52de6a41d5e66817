//! Mapping between processing parameters, advertised inputs and decoded values

use geoparam_core::config::LayeredConfig;
use geoparam_core::error::{GeoparamError, Result};
use geoparam_core::models::{
    Format, InputDefinition, ParameterDefinition, ParameterKind, ProcessingValue, TaggedInput,
};

use crate::decode::decode_geometry;
use crate::project::{decode_extent, decode_point};

/// Input advertised for a processing parameter, if the parameter is geometry-like
pub fn input_definition(
    param: &ParameterDefinition,
    config: &LayeredConfig,
) -> Option<InputDefinition> {
    match param.kind {
        ParameterKind::Extent => Some(InputDefinition::BoundingBox {
            identifier: param.name.clone(),
            description: param.description.clone(),
            crss: config.extent_crss.value.clone(),
        }),
        ParameterKind::Point | ParameterKind::Geometry => Some(InputDefinition::Complex {
            identifier: param.name.clone(),
            description: param.description.clone(),
            supported_formats: config.geometry_formats.value.clone(),
        }),
        ParameterKind::Other => None,
    }
}

/// Decode the value of a processing parameter from its submitted inputs.
///
/// Only the first input is used. Parameters that are not geometry-like yield
/// `Ok(None)`.
pub fn processing_value(
    param: &ParameterDefinition,
    inputs: &[TaggedInput],
    config: &LayeredConfig,
) -> Result<Option<ProcessingValue>> {
    if param.kind == ParameterKind::Other {
        return Ok(None);
    }

    let input = inputs
        .first()
        .ok_or_else(|| GeoparamError::MissingParameterValue {
            name: param.name.clone(),
        })?;

    let value = match param.kind {
        ParameterKind::Geometry => ProcessingValue::Geometry(decode_geometry(input)?),
        ParameterKind::Point => ProcessingValue::Point(decode_point(input)?),
        ParameterKind::Extent => {
            ProcessingValue::Extent(decode_extent(&with_default_crs(input, config))?)
        }
        ParameterKind::Other => return Ok(None),
    };

    Ok(Some(value))
}

/// Bounding boxes submitted without a CRS take the first advertised one
fn with_default_crs(input: &TaggedInput, config: &LayeredConfig) -> TaggedInput {
    let mut input = input.clone();
    if input.crs.is_none() {
        input.crs = config.default_extent_crs().map(str::to_string);
    }
    if input.format != Format::BoundingBox {
        tracing::debug!(format = %input.format, "Reading extent from a non bounding box input");
    }
    input
}
