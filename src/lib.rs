//! Color-based object recognition for segmented entities.
//!
//! A [`ColorMatcher`] takes the latest image and pixel mask of an entity,
//! estimates which named colors it is made of and scores that composition
//! against learned color models. Results are written into the entity's JSON
//! result document under `perception_result.color_matcher`.

pub mod config;
pub mod error;
pub mod pipeline;

pub use crate::config::{MatcherSettings, Settings};
pub use crate::error::{MatcherError, ModelError, PaletteError, SkipReason};

pub use crate::pipeline::models::{ModelLearner, ModelStore};
pub use crate::pipeline::services::{ColorMatcher, ColorMatcherService};
pub use crate::pipeline::types::{ColorName, Entity, EntityMeasurement, Hypothesis, PixelMask};
