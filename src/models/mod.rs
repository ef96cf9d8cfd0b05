pub mod media_item;
pub mod session;

pub use media_item::*;
pub use session::*;
