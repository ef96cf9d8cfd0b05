pub mod page_geometry;
pub mod scroll_tracker;

pub use page_geometry::PageGeometry;
pub use scroll_tracker::{compute_active_index, ScrollIndexTracker};
