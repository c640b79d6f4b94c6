pub mod color_aggregator;
pub mod color_matcher;
pub mod color_matcher_service;
pub mod hypothesis_scorer;
pub mod region_extractor;
pub mod result_emitter;

pub use color_aggregator::ColorAggregator;
pub use color_matcher::{ColorMatcher, MODULE_NAME};
pub use color_matcher_service::ColorMatcherService;
pub use hypothesis_scorer::HypothesisScorer;
pub use region_extractor::{ContourSmoothing, ExtractedRegion, RegionExtractor};
pub use result_emitter::{
    ColorEntry, ColorMatcherGroup, HypothesisEntry, ResultEmitter, MODULE_GROUP, RESULT_GROUP,
};
