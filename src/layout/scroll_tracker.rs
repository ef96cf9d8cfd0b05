//! Active-index tracking for the vertical paging container.
//!
//! Every scroll update picks the item whose centre is closest to the
//! viewport centre (ties go to the lower index). While a possibly-horizontal
//! touch is in flight, and for a short settle window after it ends,
//! recomputation is suppressed so the index does not flicker under a swipe.
//! The last offset seen during suppression is kept and applied once the
//! window expires.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::PageGeometry;

/// Index of the item nearest the viewport centre at `offset`.
///
/// Linear scan; the lowest index wins ties. `None` for an empty list or an
/// unmeasured container.
pub fn compute_active_index(geometry: &PageGeometry, item_count: usize, offset: f64) -> Option<usize> {
    if item_count == 0 || !geometry.is_measured() || !offset.is_finite() {
        return None;
    }

    let center = geometry.viewport_center(offset);
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for index in 0..item_count {
        let distance = (geometry.item_center(index) - center).abs();
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    Some(best)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suppression {
    Inactive,
    /// A touch that may turn into a horizontal swipe is in flight.
    Gesture,
    Settling { until: Instant },
}

#[derive(Debug, Clone)]
pub struct ScrollIndexTracker {
    geometry: PageGeometry,
    item_count: usize,
    settle_delay: Duration,
    active_index: Option<usize>,
    suppression: Suppression,
    /// Offset received while suppressed, applied when suppression lifts.
    pending_offset: Option<f64>,
    last_offset: Option<f64>,
}

impl ScrollIndexTracker {
    pub fn new(
        item_count: usize,
        geometry: PageGeometry,
        settle_delay: Duration,
        initial_index: Option<usize>,
    ) -> Self {
        let active_index = match (item_count, initial_index) {
            (0, _) => None,
            (n, Some(i)) => Some(i.min(n - 1)),
            (_, None) => Some(0),
        };
        Self {
            geometry,
            item_count,
            settle_delay,
            active_index,
            suppression: Suppression::Inactive,
            pending_offset: None,
            last_offset: None,
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Whether scroll updates at `now` would be dropped.
    pub fn is_suppressed(&self, now: Instant) -> bool {
        match self.suppression {
            Suppression::Inactive => false,
            Suppression::Gesture => true,
            Suppression::Settling { until } => now < until,
        }
    }

    /// Handle a scroll position update. Returns the new index if it changed.
    pub fn on_scroll(&mut self, offset: f64, now: Instant) -> Option<usize> {
        trace!(offset, "scroll update");
        self.expire_settle(now);
        if self.is_suppressed(now) {
            self.pending_offset = Some(offset);
            return None;
        }
        self.pending_offset = None;
        self.recompute(offset)
    }

    /// Clock check for the settle window. Applies a pending offset once the
    /// window has passed; returns the new index if it changed.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        self.expire_settle(now);
        if self.is_suppressed(now) {
            return None;
        }
        let offset = self.pending_offset.take()?;
        self.recompute(offset)
    }

    /// A touch began; hold recomputation until it resolves.
    pub fn suppress(&mut self) {
        if self.suppression != Suppression::Gesture {
            debug!("Scroll index tracking suppressed");
        }
        self.suppression = Suppression::Gesture;
    }

    /// The touch turned out to be a vertical scroll; track immediately.
    pub fn resume(&mut self) -> Option<usize> {
        if self.suppression == Suppression::Inactive {
            return None;
        }
        debug!("Scroll index tracking resumed");
        self.suppression = Suppression::Inactive;
        let offset = self.pending_offset.take()?;
        self.recompute(offset)
    }

    /// The suppressing touch ended at `now`; lift suppression after the settle delay.
    pub fn settle(&mut self, now: Instant) {
        if self.suppression == Suppression::Inactive {
            return;
        }
        let until = now + self.settle_delay;
        debug!(delay_ms = self.settle_delay.as_millis() as u64, "Scroll index tracking settling");
        self.suppression = Suppression::Settling { until };
    }

    /// Programmatic jump. Clears any pending offset so it cannot override the jump.
    ///
    /// Before the container is measured there is no real offset for the
    /// target, so none is recorded and the next measurement anchors on the
    /// jumped-to index instead.
    pub fn jump_to(&mut self, index: usize) -> Option<usize> {
        if self.item_count == 0 {
            return None;
        }
        self.pending_offset = None;
        let index = index.min(self.item_count - 1);
        self.last_offset = self
            .geometry
            .is_measured()
            .then(|| self.geometry.offset_for_index(index, self.item_count));
        self.set_active(index)
    }

    /// Container was measured or resized. Re-evaluates the last known offset,
    /// or anchors on the active index when no offset has been observed yet.
    pub fn set_geometry(&mut self, geometry: PageGeometry, now: Instant) -> Option<usize> {
        if self.geometry == geometry {
            return None;
        }
        self.geometry = geometry;
        match self.pending_offset.or(self.last_offset) {
            Some(offset) => self.on_scroll(offset, now),
            None => {
                if self.geometry.is_measured() {
                    self.last_offset = self
                        .active_index
                        .map(|index| self.geometry.offset_for_index(index, self.item_count));
                }
                None
            }
        }
    }

    fn expire_settle(&mut self, now: Instant) {
        if let Suppression::Settling { until } = self.suppression {
            if now >= until {
                debug!("Settle window elapsed, scroll index tracking resumed");
                self.suppression = Suppression::Inactive;
            }
        }
    }

    fn recompute(&mut self, offset: f64) -> Option<usize> {
        self.last_offset = Some(offset);
        let index = compute_active_index(&self.geometry, self.item_count, offset)?;
        self.set_active(index)
    }

    fn set_active(&mut self, index: usize) -> Option<usize> {
        if self.active_index == Some(index) {
            return None;
        }
        debug!(from = ?self.active_index, to = index, "Active index changed");
        self.active_index = Some(index);
        Some(index)
    }
}
