//! Error types for the viewer controller and its configuration.
//!
//! The gesture classifier and the scroll tracker never fail; everything here
//! is a caller-side precondition violation surfaced to the host.

use thiserror::Error;

/// Rejections returned by [`crate::ui::ViewerController`].
///
/// The `Display` text is short enough to show to the user as a denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("only the uploader can delete item {item_id}")]
    NotOwner { item_id: String },

    #[error("item {item_id} is not part of this viewer")]
    UnknownItem { item_id: String },

    #[error("no media item is active")]
    NoActiveItem,

    #[error("viewer is closed")]
    Closed,
}

/// Invalid tuning constants, either from code or from the environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite value greater than zero")]
    NonPositive { name: &'static str },

    #[error("direction ratio must be at least 1.0, got {ratio}")]
    RatioBelowOne { ratio: f64 },

    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}
