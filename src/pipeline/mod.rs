pub mod models;
pub mod palette;
pub mod services;
pub mod types;

pub use models::{ModelLearner, ModelStore};
pub use palette::{LookupTablePalette, Palette};
pub use services::{ColorMatcher, ColorMatcherService};
pub use types::{ColorMatch, ColorName, Entity, EntityMeasurement, Hypothesis, PixelMask};
