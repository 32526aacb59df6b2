use std::collections::{HashMap, HashSet};

/// Which central panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Feed,
    Create,
}

/// Per-card interaction state for the feed.
#[derive(Default)]
pub struct FeedState {
    /// Item ids whose comment panel is toggled open.
    pub comments_open: HashSet<String>,
    /// Draft comment text per item.
    pub comment_drafts: HashMap<String, String>,
    /// Item awaiting delete confirmation.
    pub confirm_delete: Option<String>,
    /// Item whose delete request is in flight; delete buttons are disabled
    /// while this is set so deletes never overlap.
    pub deleting: Option<String>,
}

/// Creation form state. Contents survive a failed submit so the user can
/// correct and retry.
#[derive(Default)]
pub struct CreateItemState {
    pub description: String,
    /// Public URL of the uploaded image; empty until an upload completes.
    pub image_url: String,
    pub uploading: bool,
    pub upload_error: Option<String>,
    pub submitting: bool,
    pub error: Option<String>,
    pub description_error: Option<String>,
    pub image_error: Option<String>,
}

impl CreateItemState {
    pub fn reset(&mut self) {
        *self = CreateItemState::default();
    }
}

/// Decoded RGBA pixels handed from a download task to the UI thread, which
/// turns them into a texture.
#[derive(Clone)]
pub struct LoadedImage {
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}
