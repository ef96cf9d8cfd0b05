// Viewer controller for the reelview full-screen media viewer
// Wires the gesture classifier and the scroll index tracker to one viewer session
// and reports everything the host UI needs through callbacks:
// - active index changes (scroll tracking or programmatic jumps)
// - classified gestures (right swipe opens the side panel, left swipe closes)
// - side panel open/close with the item it should show
// - neighbour prefetch requests
// - ownership-gated delete requests

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::gesture::{GestureClassifier, GestureIntent, Point};
use crate::layout::{PageGeometry, ScrollIndexTracker};
use crate::models::{MediaItem, ViewerSession};

/// What the opaque side panel is instantiated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelTarget {
    pub item_id: String,
    /// Id of the record the media belongs to.
    pub host_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelToggle {
    /// Panel shown (or re-targeted) for this item; toolbar hidden.
    Opened(PanelTarget),
    Closed,
}

impl PanelToggle {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Opened(_))
    }
}

/// Callback type for active index changes
pub type ActiveIndexCallback = Box<dyn Fn(usize)>;
/// Callback type for classified gestures
pub type GestureCallback = Box<dyn Fn(GestureIntent)>;
/// Callback type for viewer close
pub type CloseCallback = Box<dyn Fn()>;
/// Callback type for side panel visibility
pub type PanelToggleCallback = Box<dyn Fn(&PanelToggle)>;
/// Callback type for confirmed deletes
pub type DeleteCallback = Box<dyn Fn(&str)>;
/// Callback type for neighbour prefetch
pub type PrefetchCallback = Box<dyn Fn(&[MediaItem])>;

/// Orchestrates one viewer lifetime. All entry points are cheap and
/// non-blocking; the host calls them from its UI thread.
pub struct ViewerController {
    /// `None` once the viewer has been closed.
    session: Option<ViewerSession>,
    classifier: GestureClassifier,
    tracker: ScrollIndexTracker,
    config: ViewerConfig,
    host_id: String,
    current_user_id: Option<String>,
    // Callbacks
    on_active_index_changed: Option<ActiveIndexCallback>,
    on_gesture_classified: Option<GestureCallback>,
    on_close: Option<CloseCallback>,
    on_panel_toggle: Option<PanelToggleCallback>,
    on_delete: Option<DeleteCallback>,
    on_prefetch: Option<PrefetchCallback>,
}

impl ViewerController {
    /// Create the controller for a freshly mounted viewer.
    ///
    /// `initial_index` is clamped into range. Geometry starts unmeasured; call
    /// [`Self::set_geometry`] once the container has a size.
    pub fn new(
        items: Vec<MediaItem>,
        initial_index: usize,
        host_id: impl Into<String>,
        current_user_id: Option<String>,
        config: ViewerConfig,
    ) -> Self {
        let session = ViewerSession::new(items, initial_index);
        let tracker = ScrollIndexTracker::new(
            session.len(),
            PageGeometry::default(),
            config.settle_delay,
            session.active_index(),
        );
        let host_id = host_id.into();
        info!(
            host_id = %host_id,
            items = session.len(),
            active = ?session.active_index(),
            "Opening viewer"
        );

        Self {
            session: Some(session),
            classifier: GestureClassifier::new(config.gesture),
            tracker,
            config,
            host_id,
            current_user_id,
            on_active_index_changed: None,
            on_gesture_classified: None,
            on_close: None,
            on_panel_toggle: None,
            on_delete: None,
            on_prefetch: None,
        }
    }

    pub fn connect_active_index_changed<F>(&mut self, callback: F)
    where
        F: Fn(usize) + 'static,
    {
        self.on_active_index_changed = Some(Box::new(callback));
    }

    pub fn connect_gesture_classified<F>(&mut self, callback: F)
    where
        F: Fn(GestureIntent) + 'static,
    {
        self.on_gesture_classified = Some(Box::new(callback));
    }

    pub fn connect_close<F>(&mut self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.on_close = Some(Box::new(callback));
    }

    pub fn connect_panel_toggle<F>(&mut self, callback: F)
    where
        F: Fn(&PanelToggle) + 'static,
    {
        self.on_panel_toggle = Some(Box::new(callback));
    }

    /// Connect callback for deletes that passed the ownership check.
    pub fn connect_delete<F>(&mut self, callback: F)
    where
        F: Fn(&str) + 'static,
    {
        self.on_delete = Some(Box::new(callback));
    }

    pub fn connect_prefetch<F>(&mut self, callback: F)
    where
        F: Fn(&[MediaItem]) + 'static,
    {
        self.on_prefetch = Some(Box::new(callback));
    }

    /// Finish mounting: request neighbour prefetch for the initial item and
    /// return the scroll offset the container should jump to.
    pub fn mount(&mut self) -> f64 {
        self.emit_prefetch();
        self.initial_offset()
    }

    /// Offset that centres the current active item.
    pub fn initial_offset(&self) -> f64 {
        match self.session.as_ref().and_then(|s| s.active_index()) {
            Some(index) => self
                .tracker
                .geometry()
                .offset_for_index(index, self.tracker.item_count()),
            None => 0.0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    pub fn items(&self) -> &[MediaItem] {
        self.session.as_ref().map(|s| s.items()).unwrap_or(&[])
    }

    pub fn active_index(&self) -> Option<usize> {
        self.session.as_ref()?.active_index()
    }

    pub fn active_item(&self) -> Option<&MediaItem> {
        self.session.as_ref()?.active_item()
    }

    /// Whether chrome that depends on an active item (toolbar, metadata,
    /// gesture affordances) may be rendered.
    pub fn has_active_item(&self) -> bool {
        self.active_item().is_some()
    }

    pub fn panel_open(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.panel_open())
    }

    /// Target for the side panel while it is open.
    pub fn panel_target(&self) -> Option<PanelTarget> {
        if !self.panel_open() {
            return None;
        }
        self.active_item().map(|item| PanelTarget {
            item_id: item.id.clone(),
            host_id: self.host_id.clone(),
        })
    }

    /// The container was measured or resized.
    pub fn set_geometry(&mut self, geometry: PageGeometry, now: Instant) {
        if self.is_closed() {
            return;
        }
        let changed = self.tracker.set_geometry(geometry, now);
        self.apply_index_change(changed);
    }

    pub fn on_touch_start(&mut self, point: Point) {
        if self.is_closed() {
            return;
        }
        self.classifier.touch_start(point);
        self.tracker.suppress();
    }

    pub fn on_touch_move(&mut self, point: Point) {
        if self.is_closed() {
            return;
        }
        if self.classifier.touch_move(point) {
            // Vertical scroll: let the index follow it right away.
            let changed = self.tracker.resume();
            self.apply_index_change(changed);
        }
    }

    pub fn on_touch_end(&mut self, point: Point, now: Instant) -> GestureIntent {
        if self.is_closed() {
            return GestureIntent::None;
        }
        let locked = self.classifier.is_scroll_locked();
        let intent = self.classifier.touch_end(point);
        self.finish_gesture(locked, intent, now);
        intent
    }

    /// Platform cancel; classified like a touch end at the last known position.
    pub fn on_touch_cancel(&mut self, now: Instant) -> GestureIntent {
        if self.is_closed() {
            return GestureIntent::None;
        }
        let locked = self.classifier.is_scroll_locked();
        let intent = self.classifier.touch_cancel();
        self.finish_gesture(locked, intent, now);
        intent
    }

    pub fn on_scroll(&mut self, offset: f64, now: Instant) {
        if self.is_closed() {
            return;
        }
        let changed = self.tracker.on_scroll(offset, now);
        self.apply_index_change(changed);
    }

    /// Clock tick from the host; lets the settle window expire without a
    /// further scroll event.
    pub fn poll(&mut self, now: Instant) {
        if self.is_closed() {
            return;
        }
        let changed = self.tracker.poll(now);
        self.apply_index_change(changed);
    }

    /// Programmatic jump. Returns the offset to scroll the container to, which
    /// is `0.0` until the container is measured; use [`Self::initial_offset`]
    /// after [`Self::set_geometry`] in that case.
    pub fn jump_to(&mut self, index: usize) -> Result<f64, ViewerError> {
        let session = self.session.as_ref().ok_or(ViewerError::Closed)?;
        if session.is_empty() {
            return Err(ViewerError::NoActiveItem);
        }
        let changed = self.tracker.jump_to(index);
        self.apply_index_change(changed);
        Ok(self.initial_offset())
    }

    /// Toolbar button. Returns the new panel state.
    pub fn toggle_panel(&mut self) -> Result<bool, ViewerError> {
        if self.panel_open() {
            self.close_panel()?;
            Ok(false)
        } else {
            self.open_panel()?;
            Ok(true)
        }
    }

    pub fn open_panel(&mut self) -> Result<(), ViewerError> {
        let session = self.session.as_mut().ok_or(ViewerError::Closed)?;
        if session.active_item().is_none() {
            return Err(ViewerError::NoActiveItem);
        }
        if session.set_panel_open(true) {
            debug!("Side panel opened");
            self.emit_panel_opened();
        }
        Ok(())
    }

    pub fn close_panel(&mut self) -> Result<(), ViewerError> {
        let session = self.session.as_mut().ok_or(ViewerError::Closed)?;
        if session.set_panel_open(false) {
            debug!("Side panel closed");
            if let Some(ref callback) = self.on_panel_toggle {
                callback(&PanelToggle::Closed);
            }
        }
        Ok(())
    }

    /// End the viewer session. Later calls are no-ops.
    pub fn close(&mut self) {
        if self.session.take().is_none() {
            return;
        }
        info!(host_id = %self.host_id, "Closing viewer");
        if let Some(ref callback) = self.on_close {
            callback();
        }
    }

    /// Whether the delete affordance should be offered for `item_id`.
    pub fn can_delete(&self, item_id: &str) -> bool {
        let Some(user_id) = self.current_user_id.as_deref() else {
            return false;
        };
        self.session
            .as_ref()
            .and_then(|s| s.find(item_id))
            .is_some_and(|item| item.is_owned_by(user_id))
    }

    /// Forward a delete to the host after checking ownership. The deletion
    /// itself is the host's job.
    pub fn request_delete(&self, item_id: &str) -> Result<(), ViewerError> {
        let session = self.session.as_ref().ok_or(ViewerError::Closed)?;
        let item = session.find(item_id).ok_or_else(|| ViewerError::UnknownItem {
            item_id: item_id.to_string(),
        })?;
        let owned = self
            .current_user_id
            .as_deref()
            .is_some_and(|user_id| item.is_owned_by(user_id));
        if !owned {
            warn!(item_id, "Delete rejected, current user does not own the item");
            return Err(ViewerError::NotOwner {
                item_id: item_id.to_string(),
            });
        }

        info!(item_id, "Delete confirmed");
        if let Some(ref callback) = self.on_delete {
            callback(item_id);
        }
        Ok(())
    }

    /// Items within the prefetch radius of the active one, nearest first.
    pub fn prefetch_items(&self) -> Vec<MediaItem> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let Some(active) = session.active_index() else {
            return Vec::new();
        };
        let radius = self.config.prefetch_radius;
        let start = active.saturating_sub(radius);
        let end = active.saturating_add(radius).saturating_add(1).min(session.len());

        let mut indices: Vec<usize> = (start..end).filter(|&i| i != active).collect();
        indices.sort_by_key(|i| i.abs_diff(active));
        indices
            .into_iter()
            .filter_map(|i| session.item(i).cloned())
            .collect()
    }

    fn finish_gesture(&mut self, locked: bool, intent: GestureIntent, now: Instant) {
        if locked {
            // Momentum from the scroll keeps moving the index.
            let changed = self.tracker.resume();
            self.apply_index_change(changed);
        } else {
            self.tracker.settle(now);
        }

        if let Some(ref callback) = self.on_gesture_classified {
            callback(intent);
        }

        match intent {
            GestureIntent::RevealPanel => {
                if let Err(err) = self.open_panel() {
                    debug!(error = %err, "Ignoring reveal-panel gesture");
                }
            }
            GestureIntent::Dismiss => self.close(),
            GestureIntent::None => {}
        }
    }

    fn apply_index_change(&mut self, changed: Option<usize>) {
        let Some(index) = changed else {
            return;
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.set_active_index(index) {
            return;
        }
        let panel_open = session.panel_open();
        info!(index, "Active item changed");

        if let Some(ref callback) = self.on_active_index_changed {
            callback(index);
        }
        self.emit_prefetch();
        if panel_open {
            self.emit_panel_opened();
        }
    }

    fn emit_panel_opened(&self) {
        let (Some(callback), Some(target)) = (self.on_panel_toggle.as_ref(), self.panel_target()) else {
            return;
        };
        callback(&PanelToggle::Opened(target));
    }

    fn emit_prefetch(&self) {
        let Some(ref callback) = self.on_prefetch else {
            return;
        };
        let items = self.prefetch_items();
        if !items.is_empty() {
            callback(&items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Index(usize),
        Gesture(GestureIntent),
        Close,
        Panel(PanelToggle),
        Delete(String),
        Prefetch(Vec<String>),
    }

    fn make_items(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| {
                let owner = if i % 2 == 0 { "alice" } else { "bob" };
                MediaItem::new(format!("img-{i}"), format!("https://cdn.example/{i}.jpg"), owner)
            })
            .collect()
    }

    fn controller(n: usize, initial: usize) -> (ViewerController, Rc<RefCell<Vec<Event>>>) {
        let mut c = ViewerController::new(
            make_items(n),
            initial,
            "vehicle-42",
            Some("alice".to_string()),
            ViewerConfig::default(),
        );
        let events = Rc::new(RefCell::new(Vec::new()));

        let log = events.clone();
        c.connect_active_index_changed(move |i| log.borrow_mut().push(Event::Index(i)));
        let log = events.clone();
        c.connect_gesture_classified(move |g| log.borrow_mut().push(Event::Gesture(g)));
        let log = events.clone();
        c.connect_close(move || log.borrow_mut().push(Event::Close));
        let log = events.clone();
        c.connect_panel_toggle(move |p| log.borrow_mut().push(Event::Panel(p.clone())));
        let log = events.clone();
        c.connect_delete(move |id| log.borrow_mut().push(Event::Delete(id.to_string())));
        let log = events.clone();
        c.connect_prefetch(move |items| {
            log.borrow_mut()
                .push(Event::Prefetch(items.iter().map(|i| i.id.clone()).collect()))
        });

        c.set_geometry(PageGeometry::full_screen(100.0), Instant::now());
        (c, events)
    }

    fn swipe(c: &mut ViewerController, from: (f64, f64), to: (f64, f64), now: Instant) -> GestureIntent {
        c.on_touch_start(Point::new(from.0, from.1));
        c.on_touch_move(Point::new(to.0, to.1));
        c.on_touch_end(Point::new(to.0, to.1), now)
    }

    fn target(item: &str) -> PanelToggle {
        PanelToggle::Opened(PanelTarget {
            item_id: item.to_string(),
            host_id: "vehicle-42".to_string(),
        })
    }

    #[test]
    fn test_mount_prefetches_neighbours_and_returns_offset() {
        let (mut c, events) = controller(6, 2);
        assert_eq!(c.mount(), 200.0);
        assert_eq!(
            *events.borrow(),
            vec![Event::Prefetch(vec![
                "img-1".into(),
                "img-3".into(),
                "img-0".into(),
                "img-4".into()
            ])]
        );
    }

    #[test]
    fn test_scroll_updates_active_index() {
        let (mut c, events) = controller(4, 0);
        let now = Instant::now();
        c.on_scroll(100.0, now);
        c.on_scroll(100.0, now);
        assert_eq!(c.active_index(), Some(1));
        let index_events: Vec<_> = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Index(_)))
            .cloned()
            .collect();
        assert_eq!(index_events, vec![Event::Index(1)]);
    }

    #[test]
    fn test_right_swipe_opens_panel() {
        let (mut c, events) = controller(4, 1);
        let intent = swipe(&mut c, (100.0, 300.0), (180.0, 302.0), Instant::now());
        assert_eq!(intent, GestureIntent::RevealPanel);
        assert!(c.panel_open());
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Gesture(GestureIntent::RevealPanel),
                Event::Panel(target("img-1"))
            ]
        );

        // A second reveal while open does not re-emit.
        swipe(&mut c, (100.0, 300.0), (180.0, 302.0), Instant::now());
        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn test_left_swipe_closes_viewer() {
        let (mut c, events) = controller(4, 0);
        let now = Instant::now();
        let intent = swipe(&mut c, (100.0, 300.0), (40.0, 305.0), now);
        assert_eq!(intent, GestureIntent::Dismiss);
        assert!(c.is_closed());
        assert_eq!(
            *events.borrow(),
            vec![Event::Gesture(GestureIntent::Dismiss), Event::Close]
        );

        // Everything after close is inert.
        c.on_scroll(300.0, now);
        c.close();
        assert_eq!(c.jump_to(1), Err(ViewerError::Closed));
        assert_eq!(swipe(&mut c, (0.0, 0.0), (-200.0, 0.0), now), GestureIntent::None);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_vertical_scroll_is_tracked_during_touch() {
        let (mut c, events) = controller(4, 0);
        let now = Instant::now();
        c.on_touch_start(Point::new(100.0, 300.0));
        // Scroll events before the lock are held back.
        c.on_scroll(60.0, now);
        assert_eq!(c.active_index(), Some(0));
        // Lock engages; the held offset applies at once.
        c.on_touch_move(Point::new(100.0, 240.0));
        assert_eq!(c.active_index(), Some(1));
        c.on_scroll(200.0, now);
        assert_eq!(c.active_index(), Some(2));
        let intent = c.on_touch_end(Point::new(160.0, 300.0), now);
        assert_eq!(intent, GestureIntent::None);
        // Momentum after lift is tracked without a settle delay.
        c.on_scroll(300.0, now + Duration::from_millis(10));
        assert_eq!(c.active_index(), Some(3));
        assert!(!c.panel_open());
        assert!(!events.borrow().contains(&Event::Close));
    }

    #[test]
    fn test_horizontal_gesture_suppresses_until_settled() {
        let (mut c, _events) = controller(4, 0);
        let start = Instant::now();
        c.on_touch_start(Point::new(100.0, 300.0));
        c.on_touch_move(Point::new(120.0, 302.0));
        c.on_scroll(100.0, start);
        c.on_touch_end(Point::new(130.0, 302.0), start);
        assert_eq!(c.active_index(), Some(0));

        c.poll(start + Duration::from_millis(50));
        assert_eq!(c.active_index(), Some(0));
        c.poll(start + Duration::from_millis(100));
        assert_eq!(c.active_index(), Some(1));
    }

    #[test]
    fn test_cancel_is_classified_and_releases() {
        let (mut c, events) = controller(4, 0);
        c.on_touch_start(Point::new(100.0, 300.0));
        c.on_touch_move(Point::new(190.0, 305.0));
        assert_eq!(c.on_touch_cancel(Instant::now()), GestureIntent::RevealPanel);
        assert!(c.panel_open());
        assert_eq!(events.borrow()[0], Event::Gesture(GestureIntent::RevealPanel));
    }

    #[test]
    fn test_panel_follows_active_item() {
        let (mut c, events) = controller(4, 0);
        let now = Instant::now();
        c.open_panel().unwrap();
        c.on_scroll(100.0, now);
        assert_eq!(c.panel_target().map(|t| t.item_id), Some("img-1".to_string()));
        let panels: Vec<_> = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Panel(_)))
            .cloned()
            .collect();
        assert_eq!(panels, vec![Event::Panel(target("img-0")), Event::Panel(target("img-1"))]);
    }

    #[test]
    fn test_toggle_panel() {
        let (mut c, events) = controller(2, 0);
        assert_eq!(c.toggle_panel(), Ok(true));
        assert_eq!(c.toggle_panel(), Ok(false));
        assert!(c.panel_target().is_none());
        assert_eq!(events.borrow().last(), Some(&Event::Panel(PanelToggle::Closed)));
        assert!(target("img-0").is_open());
        assert!(!PanelToggle::Closed.is_open());
    }

    #[test]
    fn test_delete_requires_ownership() {
        let (c, events) = controller(4, 0);
        assert!(c.can_delete("img-0"));
        assert!(!c.can_delete("img-1"));
        assert_eq!(c.request_delete("img-0"), Ok(()));
        assert_eq!(
            c.request_delete("img-1"),
            Err(ViewerError::NotOwner {
                item_id: "img-1".to_string()
            })
        );
        assert_eq!(
            c.request_delete("nope"),
            Err(ViewerError::UnknownItem {
                item_id: "nope".to_string()
            })
        );
        assert_eq!(*events.borrow(), vec![Event::Delete("img-0".to_string())]);
    }

    #[test]
    fn test_delete_without_signed_in_user() {
        let c = ViewerController::new(make_items(2), 0, "v", None, ViewerConfig::default());
        assert!(!c.can_delete("img-0"));
        assert!(matches!(c.request_delete("img-0"), Err(ViewerError::NotOwner { .. })));
    }

    #[test]
    fn test_empty_viewer_is_inert() {
        let (mut c, events) = controller(0, 0);
        let now = Instant::now();
        assert_eq!(c.mount(), 0.0);
        assert!(!c.has_active_item());
        assert_eq!(c.active_index(), None);
        c.on_scroll(500.0, now);
        assert_eq!(swipe(&mut c, (0.0, 0.0), (120.0, 0.0), now), GestureIntent::RevealPanel);
        assert!(!c.panel_open());
        assert_eq!(c.open_panel(), Err(ViewerError::NoActiveItem));
        assert_eq!(c.jump_to(0), Err(ViewerError::NoActiveItem));
        assert_eq!(*events.borrow(), vec![Event::Gesture(GestureIntent::RevealPanel)]);
    }

    #[test]
    fn test_jump_to() {
        let (mut c, events) = controller(5, 0);
        assert_eq!(c.jump_to(3), Ok(300.0));
        assert_eq!(c.jump_to(3), Ok(300.0));
        assert_eq!(c.jump_to(40), Ok(400.0));
        let index_events: Vec<_> = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Index(_)))
            .cloned()
            .collect();
        assert_eq!(index_events, vec![Event::Index(3), Event::Index(4)]);
    }

    #[test]
    fn test_jump_before_measurement_keeps_index() {
        let mut c = ViewerController::new(
            make_items(5),
            0,
            "vehicle-42",
            None,
            ViewerConfig::default(),
        );
        let events = Rc::new(RefCell::new(Vec::new()));
        let log = events.clone();
        c.connect_active_index_changed(move |i| log.borrow_mut().push(Event::Index(i)));

        assert_eq!(c.jump_to(3), Ok(0.0));
        c.set_geometry(PageGeometry::full_screen(100.0), Instant::now());
        assert_eq!(c.active_index(), Some(3));
        assert_eq!(c.initial_offset(), 300.0);
        assert_eq!(*events.borrow(), vec![Event::Index(3)]);
    }

    #[test]
    fn test_prefetch_clamped_at_edges() {
        let (c, _events) = controller(3, 2);
        let ids: Vec<_> = c.prefetch_items().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["img-1".to_string(), "img-0".to_string()]);
    }
}
