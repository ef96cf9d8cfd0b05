pub mod controller;

pub use controller::{PanelTarget, PanelToggle, ViewerController};
