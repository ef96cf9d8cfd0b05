/// Geometry of the vertical paging container.
///
/// Items are laid out top-to-bottom with a fixed extent and a constant gap.
/// All values are in px along the scroll axis; `offset` is the container's
/// scroll position (distance from content top to viewport top).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageGeometry {
    /// Height of one item (default: 0, i.e. not measured yet)
    pub item_extent: f64,
    /// Gap between consecutive items (default: 0)
    pub spacing: f64,
    /// Height of the visible viewport (default: 0)
    pub viewport_extent: f64,
}

impl PageGeometry {
    /// Full-bleed pages: every item is exactly one viewport tall.
    pub fn full_screen(viewport_extent: f64) -> Self {
        Self {
            item_extent: viewport_extent,
            spacing: 0.0,
            viewport_extent,
        }
    }

    pub fn new(item_extent: f64, spacing: f64, viewport_extent: f64) -> Self {
        Self {
            item_extent,
            spacing,
            viewport_extent,
        }
    }

    /// Whether the container has been measured well enough to locate items.
    pub fn is_measured(&self) -> bool {
        self.item_extent.is_finite()
            && self.item_extent > 0.0
            && self.spacing.is_finite()
            && self.spacing >= 0.0
            && self.viewport_extent.is_finite()
            && self.viewport_extent > 0.0
    }

    fn stride(&self) -> f64 {
        self.item_extent + self.spacing
    }

    /// Centre of item `index` in content coordinates.
    pub fn item_center(&self, index: usize) -> f64 {
        index as f64 * self.stride() + self.item_extent / 2.0
    }

    /// Centre of the viewport in content coordinates at scroll `offset`.
    pub fn viewport_center(&self, offset: f64) -> f64 {
        offset + self.viewport_extent / 2.0
    }

    /// Total scrollable content height for `count` items.
    pub fn content_extent(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        count as f64 * self.item_extent + (count - 1) as f64 * self.spacing
    }

    pub fn max_offset(&self, count: usize) -> f64 {
        (self.content_extent(count) - self.viewport_extent).max(0.0)
    }

    /// Scroll offset that centres item `index`, clamped to the scrollable range.
    pub fn offset_for_index(&self, index: usize, count: usize) -> f64 {
        if count == 0 || !self.is_measured() {
            return 0.0;
        }
        let index = index.min(count - 1);
        let centred = self.item_center(index) - self.viewport_extent / 2.0;
        centred.clamp(0.0, self.max_offset(count))
    }
}
