use imageproc::filter::box_filter;

use crate::config::SmoothingSettings;
use crate::error::SkipReason;
use crate::pipeline::types::{DenseMask, PixelMask, RegionOfInterest};

/// Blur-and-threshold passes applied to a dense mask.
///
/// Each kernel size runs one box filter over a window of `kernel + 1` pixels,
/// with edge pixels repeated past the border. Growing
/// box blurs smear jagged segmentation borders; re-binarizing with a
/// low threshold then keeps the smeared border, which slightly dilates the
/// region.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSmoothing {
    pub kernel_sizes: Vec<u32>,
    pub threshold: u8,
}

impl Default for ContourSmoothing {
    fn default() -> Self {
        Self::from(&SmoothingSettings::default())
    }
}

impl From<&SmoothingSettings> for ContourSmoothing {
    fn from(settings: &SmoothingSettings) -> Self {
        let step = settings.step.max(1) as usize;
        let kernel_sizes = (settings.first_kernel.max(1)..=settings.last_kernel)
            .step_by(step)
            .collect();
        Self {
            kernel_sizes,
            threshold: settings.threshold,
        }
    }
}

/// A dense, smoothed mask for the whole image plus the bounding box of the
/// original mask points.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRegion {
    pub mask: DenseMask,
    pub region: RegionOfInterest,
}

impl ExtractedRegion {
    /// The smoothed mask restricted to the region of interest.
    pub fn region_mask(&self) -> DenseMask {
        self.mask.crop(&self.region)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegionExtractor {
    smoothing: ContourSmoothing,
}

impl RegionExtractor {
    pub fn new(smoothing: ContourSmoothing) -> Self {
        Self { smoothing }
    }

    /// Turns a sparse mask into a dense smoothed mask and its bounding box for
    /// an image of `width`x`height` pixels.
    ///
    /// Mask points outside the mask's own size are ignored. A mask that cannot
    /// be mapped onto the image, or has no point left, is a degenerate region.
    pub fn extract(
        &self,
        mask: &PixelMask,
        width: u32,
        height: u32,
    ) -> Result<ExtractedRegion, SkipReason> {
        if mask.is_empty() {
            return Err(SkipReason::EmptyMask);
        }

        let points = mask
            .points_at(width, height)
            .ok_or(SkipReason::DegenerateRegion)?;

        let region = RegionOfInterest::enclosing(points.iter().copied())
            .filter(|region| region.fits_within(width, height))
            .ok_or(SkipReason::DegenerateRegion)?;

        let dense = DenseMask::from_points(width, height, points);
        Ok(ExtractedRegion {
            mask: self.smooth(&dense),
            region,
        })
    }

    pub fn smooth(&self, mask: &DenseMask) -> DenseMask {
        let mut buffer = mask.as_image().clone();
        for &kernel in &self.smoothing.kernel_sizes {
            let radius = kernel_radius(kernel);
            buffer = box_filter(&buffer, radius, radius);
        }
        DenseMask::from_threshold(&buffer, self.smoothing.threshold)
    }
}

/// Radius of the centered box filter standing in for an even `kernel`.
///
/// `box_filter` only takes odd windows, so a kernel of `k` becomes a window of
/// `2 * (k / 2) + 1` pixels.
fn kernel_radius(kernel: u32) -> u32 {
    kernel / 2
}
