use image::RgbImage;
use tracing::trace;

use crate::error::SkipReason;
use crate::pipeline::palette::Palette;
use crate::pipeline::types::{ColorDistribution, ColorHistogram, ColorObservation, DenseMask};

/// Counts the dominant palette color of every masked pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorAggregator;

impl ColorAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Classifies each masked pixel of `image` and aggregates the result.
    ///
    /// `image` and `mask` are expected to cover the same area; only their
    /// overlap is visited. Fractions are taken over every masked pixel. A
    /// pixel the palette cannot classify is left out of the histogram but
    /// still counts as masked, so the distribution then sums to less than 1.
    /// Returns [`SkipReason::NoObservation`] when no pixel was counted.
    pub fn aggregate(
        &self,
        palette: &dyn Palette,
        image: &RgbImage,
        mask: &DenseMask,
    ) -> Result<ColorObservation, SkipReason> {
        let width = image.width().min(mask.width());
        let height = image.height().min(mask.height());

        let mut histogram = ColorHistogram::new();
        let mut unclassified = 0usize;

        for y in 0..height {
            for x in 0..width {
                if !mask.is_masked(x, y) {
                    continue;
                }
                match palette.dominant(*image.get_pixel(x, y)) {
                    Some(color) => histogram.increment(color),
                    None => unclassified += 1,
                }
            }
        }

        if unclassified > 0 {
            trace!(
                "{} masked pixels could not be classified by palette '{}'",
                unclassified,
                palette.name()
            );
        }

        let masked = histogram.total() + unclassified as u64;
        let distribution = ColorDistribution::from_counts(&histogram, masked)
            .ok_or(SkipReason::NoObservation)?;

        Ok(ColorObservation {
            distribution,
            histogram,
        })
    }
}
