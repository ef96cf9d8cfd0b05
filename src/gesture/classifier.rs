//! Single-pointer gesture classification for the full-screen viewer.
//!
//! One touch (start -> move* -> end/cancel) becomes exactly one
//! [`GestureIntent`]. Vertical motion past the noise threshold latches a
//! scroll lock for the rest of the touch; a locked touch always classifies as
//! [`GestureIntent::None`] because the paging container already consumed it
//! as a native scroll.

use std::fmt;

use tracing::{debug, trace};

use crate::config::GestureThresholds;

/// Pointer position in viewer coordinates (px).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Outcome of a finished touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureIntent {
    /// Tap, scroll, diagonal drag or too-short swipe.
    None,
    /// Horizontal swipe towards +x.
    RevealPanel,
    /// Horizontal swipe towards -x.
    Dismiss,
}

impl fmt::Display for GestureIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::RevealPanel => "reveal-panel",
            Self::Dismiss => "dismiss",
        })
    }
}

/// One in-flight touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub start: Point,
    pub last: Point,
    pub scroll_lock_engaged: bool,
}

impl GestureSample {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            last: start,
            scroll_lock_engaged: false,
        }
    }

    /// Signed horizontal travel from the start point.
    pub fn delta_x(&self) -> f64 {
        self.last.x - self.start.x
    }

    /// Unsigned vertical travel from the start point.
    pub fn delta_y(&self) -> f64 {
        (self.last.y - self.start.y).abs()
    }

    /// Record a move. Returns true if this move engaged the scroll lock.
    ///
    /// The lock never disengages once set.
    pub fn track(&mut self, point: Point, thresholds: &GestureThresholds) -> bool {
        self.last = point;
        if self.scroll_lock_engaged {
            return false;
        }
        if self.delta_y() > thresholds.vertical_noise_px {
            self.scroll_lock_engaged = true;
            return true;
        }
        false
    }

    /// Classify the finished touch, consuming it.
    pub fn classify(self, thresholds: &GestureThresholds) -> GestureIntent {
        if self.scroll_lock_engaged {
            return GestureIntent::None;
        }

        let dx = self.delta_x();
        let dy = self.delta_y();
        // NaN coordinates fall through every comparison below, so reject them here.
        if !dx.is_finite() || !dy.is_finite() {
            return GestureIntent::None;
        }
        if dx.abs() < thresholds.min_swipe_px || dx.abs() <= thresholds.direction_ratio * dy {
            return GestureIntent::None;
        }

        if dx > 0.0 {
            GestureIntent::RevealPanel
        } else {
            GestureIntent::Dismiss
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GesturePhase {
    Idle,
    Tracking(GestureSample),
}

/// Per-touch state machine. Holds at most one [`GestureSample`] and forgets
/// it as soon as the touch ends.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
    phase: GesturePhase,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            phase: GesturePhase::Idle,
        }
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, GesturePhase::Tracking(_))
    }

    /// True while the current touch is committed to vertical scrolling.
    pub fn is_scroll_locked(&self) -> bool {
        matches!(
            self.phase,
            GesturePhase::Tracking(GestureSample {
                scroll_lock_engaged: true,
                ..
            })
        )
    }

    pub fn sample(&self) -> Option<&GestureSample> {
        match &self.phase {
            GesturePhase::Tracking(sample) => Some(sample),
            GesturePhase::Idle => None,
        }
    }

    /// Begin a new touch. A touch still in flight is discarded without an intent.
    pub fn touch_start(&mut self, point: Point) {
        if self.is_tracking() {
            debug!("Touch started while another was tracked, discarding previous gesture");
        }
        trace!(x = point.x, y = point.y, "touch start");
        self.phase = GesturePhase::Tracking(GestureSample::new(point));
    }

    /// Feed a move. Returns true when this move engaged the scroll lock.
    pub fn touch_move(&mut self, point: Point) -> bool {
        let GesturePhase::Tracking(sample) = &mut self.phase else {
            return false;
        };
        let engaged = sample.track(point, &self.thresholds);
        trace!(x = point.x, y = point.y, locked = sample.scroll_lock_engaged, "touch move");
        if engaged {
            debug!(delta_y = sample.delta_y(), "Scroll lock engaged");
        }
        engaged
    }

    /// Finish the touch at `point` and classify it.
    ///
    /// The end point updates the deltas but not the lock. Without an active
    /// touch this returns [`GestureIntent::None`].
    pub fn touch_end(&mut self, point: Point) -> GestureIntent {
        match std::mem::replace(&mut self.phase, GesturePhase::Idle) {
            GesturePhase::Idle => GestureIntent::None,
            GesturePhase::Tracking(mut sample) => {
                sample.last = point;
                self.finish(sample)
            }
        }
    }

    /// Platform cancel: classify with the last known position.
    ///
    /// A cancelled touch that had already travelled far enough horizontally
    /// still yields a swipe intent, so a cancel can dismiss the viewer.
    pub fn touch_cancel(&mut self) -> GestureIntent {
        match std::mem::replace(&mut self.phase, GesturePhase::Idle) {
            GesturePhase::Idle => GestureIntent::None,
            GesturePhase::Tracking(sample) => self.finish(sample),
        }
    }

    fn finish(&self, sample: GestureSample) -> GestureIntent {
        let (dx, dy, locked) = (sample.delta_x(), sample.delta_y(), sample.scroll_lock_engaged);
        let intent = sample.classify(&self.thresholds);
        debug!(delta_x = dx, delta_y = dy, locked, %intent, "Gesture classified");
        intent
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}
