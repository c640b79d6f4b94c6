use image::{GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};

pub const MASKED: u8 = 255;
pub const UNMASKED: u8 = 0;

/// Inclusive bounding rectangle of a segmented entity's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionOfInterest {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl RegionOfInterest {
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Tightest region enclosing `points`, or `None` when there are none.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        points.into_iter().fold(None, |region, (x, y)| {
            Some(match region {
                None => Self::new(x, y, x, y),
                Some(r) => Self::new(r.min_x.min(x), r.min_y.min(y), r.max_x.max(x), r.max_y.max(y)),
            })
        })
    }

    /// A region whose minimum exceeds its maximum on either axis.
    pub fn is_degenerate(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> u32 {
        if self.is_degenerate() {
            0
        } else {
            self.max_x - self.min_x + 1
        }
    }

    pub fn height(&self) -> u32 {
        if self.is_degenerate() {
            0
        } else {
            self.max_y - self.min_y + 1
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Whether the region lies entirely inside a `width`x`height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_degenerate() && self.max_x < width && self.max_y < height
    }
}

/// Per-pixel binary mask covering a whole image (or a crop of one).
///
/// Values are either [`MASKED`] or [`UNMASKED`].
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMask {
    buffer: GrayImage,
}

impl DenseMask {
    pub fn from_points<I>(width: u32, height: u32, points: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut buffer = GrayImage::from_pixel(width, height, Luma([UNMASKED]));
        for (x, y) in points {
            if x < width && y < height {
                buffer.put_pixel(x, y, Luma([MASKED]));
            }
        }
        Self { buffer }
    }

    /// Re-binarizes a grayscale buffer: values strictly above `level` become masked.
    pub fn from_threshold(buffer: &GrayImage, level: u8) -> Self {
        Self {
            buffer: threshold(buffer, level, ThresholdType::Binary),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn is_masked(&self, x: u32, y: u32) -> bool {
        self.buffer.get_pixel(x, y)[0] > UNMASKED
    }

    pub fn masked_count(&self) -> usize {
        self.buffer.pixels().filter(|p| p[0] > UNMASKED).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.buffer
    }

    /// New mask restricted to `region`. The region must fit inside this mask.
    pub fn crop(&self, region: &RegionOfInterest) -> Self {
        let buffer = image::imageops::crop_imm(
            &self.buffer,
            region.min_x,
            region.min_y,
            region.width(),
            region.height(),
        )
        .to_image();
        Self { buffer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosing_tracks_extremes() {
        let region = RegionOfInterest::enclosing([(4, 2), (1, 7), (3, 3)]).unwrap();
        assert_eq!(region, RegionOfInterest::new(1, 2, 4, 7));
        assert_eq!(region.width(), 4);
        assert_eq!(region.height(), 6);
        assert_eq!(region.area(), 24);
    }

    #[test]
    fn test_enclosing_nothing_is_none() {
        assert!(RegionOfInterest::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn test_inverted_bounds_are_degenerate() {
        let region = RegionOfInterest::new(10, 0, 2, 5);
        assert!(region.is_degenerate());
        assert_eq!(region.area(), 0);
        assert!(!region.fits_within(100, 100));
    }

    #[test]
    fn test_dense_mask_ignores_out_of_bounds_points() {
        let mask = DenseMask::from_points(3, 3, [(0, 0), (2, 2), (3, 1), (1, 9)]);
        assert_eq!(mask.masked_count(), 2);
        assert!(mask.is_masked(2, 2));
        assert!(!mask.is_masked(1, 1));
    }

    #[test]
    fn test_threshold_is_strictly_above_level() {
        let buffer = GrayImage::from_fn(3, 1, |x, _| Luma([[49u8, 50, 51][x as usize]]));
        let mask = DenseMask::from_threshold(&buffer, 50);
        assert!(!mask.is_masked(0, 0));
        assert!(!mask.is_masked(1, 0));
        assert!(mask.is_masked(2, 0));
        assert_eq!(mask.as_image().get_pixel(2, 0)[0], MASKED);
    }

    #[test]
    fn test_crop_keeps_region_pixels() {
        let mask = DenseMask::from_points(5, 5, [(2, 2), (3, 3)]);
        let cropped = mask.crop(&RegionOfInterest::new(2, 2, 3, 3));
        assert_eq!((cropped.width(), cropped.height()), (2, 2));
        assert!(cropped.is_masked(0, 0));
        assert!(cropped.is_masked(1, 1));
        assert!(!cropped.is_masked(1, 0));
    }
}
