pub mod crs;
pub mod format;
pub mod geometry;
pub mod input;
pub mod parameter;

pub use crs::Crs;
pub use format::Format;
pub use geometry::{ProcessingValue, ReferencedGeometry, ReferencedPoint, ReferencedRectangle};
pub use input::{Payload, TaggedInput};
pub use parameter::{InputDefinition, ParameterDefinition, ParameterKind};
