//! Touch gesture handling for the reelview media viewer.

pub mod classifier;

pub use classifier::{GestureClassifier, GestureIntent, GestureSample, Point};
