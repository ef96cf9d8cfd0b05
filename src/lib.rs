//! Gesture and scroll reconciliation for a full-screen, vertically paged
//! media viewer.
//!
//! - [`gesture::GestureClassifier`] turns one touch into a swipe intent
//! - [`layout::ScrollIndexTracker`] keeps the active item in sync with the scroll position
//! - [`ui::ViewerController`] combines both for a single viewer session

pub mod config;
pub mod error;
pub mod gesture;
pub mod layout;
pub mod models;
pub mod replay;
pub mod ui;

pub use config::{GestureThresholds, ViewerConfig};
pub use error::{ConfigError, ViewerError};
pub use gesture::{GestureClassifier, GestureIntent, GestureSample, Point};
pub use layout::{PageGeometry, ScrollIndexTracker};
pub use models::{MediaItem, ViewerSession};
pub use ui::{PanelTarget, PanelToggle, ViewerController};
