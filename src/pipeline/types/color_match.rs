use super::{ColorObservation, Hypothesis, RegionOfInterest};

/// Everything one classification call produced for an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatch {
    pub region: RegionOfInterest,
    pub observation: ColorObservation,
    pub hypothesis: Hypothesis,
}
