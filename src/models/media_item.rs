/// A single media entry shown by the viewer.
///
/// Items come from the image-list provider and are immutable for the lifetime
/// of a viewer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    /// Id of the user who uploaded the item.
    pub owner_id: String,
}

impl MediaItem {
    pub fn new(id: impl Into<String>, url: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Check whether `user_id` uploaded this item
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.owner_id == user_id
    }
}
