use tracing::warn;

use super::MediaItem;

/// Mutable state for one viewer lifetime.
///
/// Created on mount, dropped on close; nothing here outlives the viewer.
/// `active_index` is `None` only when `items` is empty, otherwise it always
/// points at a valid item.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    items: Vec<MediaItem>,
    active_index: Option<usize>,
    panel_open: bool,
}

impl ViewerSession {
    /// Start a session at `initial_index`, clamped into range.
    pub fn new(items: Vec<MediaItem>, initial_index: usize) -> Self {
        let active_index = if items.is_empty() {
            None
        } else if initial_index >= items.len() {
            warn!(
                initial_index,
                len = items.len(),
                "Initial index out of range, clamping to last item"
            );
            Some(items.len() - 1)
        } else {
            Some(initial_index)
        };

        Self {
            items,
            active_index,
            panel_open: false,
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active_item(&self) -> Option<&MediaItem> {
        self.active_index.and_then(|i| self.items.get(i))
    }

    pub fn item(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn find(&self, item_id: &str) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Set the active index. Returns true if it changed.
    ///
    /// Out-of-range indices are clamped so the invariant holds.
    pub fn set_active_index(&mut self, index: usize) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let index = index.min(self.items.len() - 1);
        if self.active_index == Some(index) {
            return false;
        }
        self.active_index = Some(index);
        true
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    /// Returns true if the flag changed.
    pub fn set_panel_open(&mut self, open: bool) -> bool {
        let changed = self.panel_open != open;
        self.panel_open = open;
        changed
    }
}
