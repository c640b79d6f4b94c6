//! Color-name classification of single RGB samples.
//!
//! A palette answers one question: how likely is a sample to be called each
//! of the named colors. Everything downstream only relies on [`Palette`].

mod lookup_table;

pub use lookup_table::{LookupTablePalette, BINS_PER_CHANNEL, TABLE_SIZE};

#[cfg(test)]
pub(crate) use lookup_table::tests::channel_table;

use image::Rgb;

use crate::pipeline::types::ColorName;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorProbability {
    pub color: ColorName,
    pub probability: f32,
}

impl ColorProbability {
    pub fn new(color: ColorName, probability: f32) -> Self {
        Self { color, probability }
    }
}

/// Maps an RGB sample to a probability per named color.
///
/// Implementations return every palette color, in palette order. The order
/// is part of the contract: [`Palette::dominant`] resolves equal
/// probabilities in favor of the earliest entry.
pub trait Palette: Send + Sync {
    fn classify(&self, sample: Rgb<u8>) -> Vec<ColorProbability>;

    fn name(&self) -> &'static str;

    /// Most probable color for `sample`; ties go to the first color returned.
    /// Non-finite probabilities are ignored.
    fn dominant(&self, sample: Rgb<u8>) -> Option<ColorName> {
        let mut best: Option<ColorProbability> = None;
        for candidate in self.classify(sample) {
            if !candidate.probability.is_finite() {
                continue;
            }
            match best {
                Some(current) if current.probability >= candidate.probability => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|winner| winner.color)
    }
}
