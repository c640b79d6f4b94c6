use std::collections::BTreeMap;

use super::ColorName;

/// Per-color occurrence counts, indexed by palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorHistogram {
    counts: [u32; ColorName::COUNT],
}

impl ColorHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, color: ColorName) {
        self.counts[color.index()] += 1;
    }

    pub fn get(&self, color: ColorName) -> u32 {
        self.counts[color.index()]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Observed colors with their counts, in palette order.
    pub fn observed(&self) -> impl Iterator<Item = (ColorName, u32)> + '_ {
        ColorName::ALL
            .into_iter()
            .map(|color| (color, self.get(color)))
            .filter(|&(_, count)| count > 0)
    }
}

/// Fraction of an entity's masked pixels assigned to each observed color.
///
/// Only observed colors are present; over a non-empty mask the values sum to 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorDistribution {
    fractions: BTreeMap<ColorName, f64>,
}

impl ColorDistribution {
    /// Normalizes a histogram by its own total. Returns `None` when nothing
    /// was counted.
    pub fn from_histogram(histogram: &ColorHistogram) -> Option<Self> {
        Self::from_counts(histogram, histogram.total())
    }

    /// Normalizes a histogram by `masked` pixels, which may exceed the counted
    /// ones. Returns `None` when nothing was counted.
    pub fn from_counts(histogram: &ColorHistogram, masked: u64) -> Option<Self> {
        let denominator = masked.max(histogram.total());
        if histogram.is_empty() {
            return None;
        }

        let fractions = histogram
            .observed()
            .map(|(color, count)| (color, f64::from(count) / denominator as f64))
            .collect();
        Some(Self { fractions })
    }

    /// Builds a distribution from explicit fractions, dropping non-positive ones.
    pub fn from_fractions<I>(fractions: I) -> Self
    where
        I: IntoIterator<Item = (ColorName, f64)>,
    {
        Self {
            fractions: fractions
                .into_iter()
                .filter(|&(_, value)| value > 0.0)
                .collect(),
        }
    }

    /// Observed fraction for `color`, zero when it was not observed.
    pub fn probability(&self, color: ColorName) -> f64 {
        self.fractions.get(&color).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorName, f64)> + '_ {
        self.fractions.iter().map(|(&color, &value)| (color, value))
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.fractions.values().sum()
    }

    pub fn dominant(&self) -> Option<(ColorName, f64)> {
        self.iter()
            .fold(None, |best: Option<(ColorName, f64)>, (color, value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((color, value)),
            })
    }
}

/// Result of aggregating one entity's masked pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorObservation {
    pub distribution: ColorDistribution,
    pub histogram: ColorHistogram,
}

impl ColorObservation {
    pub fn pixel_count(&self) -> u64 {
        self.histogram.total()
    }
}
