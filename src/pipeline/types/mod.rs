mod color_match;
mod color_name;
mod entity;
mod hypothesis;
mod object_model;
mod observation;
mod pixel_mask;
mod region;

pub use color_match::ColorMatch;
pub use color_name::{ColorName, UnknownColorName};
pub use entity::{Entity, EntityMeasurement};
pub use hypothesis::Hypothesis;
pub use object_model::{ColorSet, ObjectModel};
pub use observation::{ColorDistribution, ColorHistogram, ColorObservation};
pub use pixel_mask::{PixelMask, MAX_UPSCALE};
pub use region::{DenseMask, RegionOfInterest, MASKED, UNMASKED};
