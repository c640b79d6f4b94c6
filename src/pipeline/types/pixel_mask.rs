/// Sparse set of pixel coordinates belonging to one segmented entity.
///
/// The mask remembers the image size it was computed against so that it can
/// be read back at a different resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelMask {
    width: u32,
    height: u32,
    points: Vec<(u32, u32)>,
}

impl PixelMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            points: Vec::new(),
        }
    }

    pub fn from_points<I>(width: u32, height: u32, points: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        Self {
            width,
            height,
            points: points.into_iter().collect(),
        }
    }

    pub fn add_point(&mut self, x: u32, y: u32) {
        self.points.push((x, y));
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn points(&self) -> &[(u32, u32)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Coordinates of the mask when read against a `target_width`x`target_height`
    /// image.
    ///
    /// Points outside the mask's own size are dropped. Each axis is scaled on
    /// its own: a source pixel covers the target pixels from
    /// `x * target / source` up to `(x + 1) * target / source`, so an integer
    /// factor `k` expands a point into a `k`x`k` block and downscaling merges
    /// points. Returns `None` for empty sizes or when either axis grows by more
    /// than [`MAX_UPSCALE`].
    pub fn points_at(&self, target_width: u32, target_height: u32) -> Option<Vec<(u32, u32)>> {
        if self.width == 0 || self.height == 0 || target_width == 0 || target_height == 0 {
            return None;
        }

        let in_bounds = self
            .points
            .iter()
            .copied()
            .filter(|&(x, y)| x < self.width && y < self.height);

        if target_width == self.width && target_height == self.height {
            return Some(in_bounds.collect());
        }

        if target_width.div_ceil(self.width) > MAX_UPSCALE
            || target_height.div_ceil(self.height) > MAX_UPSCALE
        {
            return None;
        }

        let mut scaled = Vec::new();
        for (x, y) in in_bounds {
            let columns = scaled_span(x, self.width, target_width);
            let rows = scaled_span(y, self.height, target_height);
            for ty in rows {
                for tx in columns.clone() {
                    scaled.push((tx, ty));
                }
            }
        }
        scaled.sort_unstable();
        scaled.dedup();
        Some(scaled)
    }
}

/// Largest per-axis growth `points_at` accepts.
pub const MAX_UPSCALE: u32 = 16;

/// Target coordinates covered by source coordinate `value`. Never empty.
fn scaled_span(value: u32, source: u32, target: u32) -> std::ops::Range<u32> {
    let (value, source, target) = (u64::from(value), u64::from(source), u64::from(target));
    let start = value * target / source;
    let end = ((value + 1) * target / source).max(start + 1);
    // value < source, so both bounds are at most target.
    start as u32..end as u32
}
