use crate::core::images::{collect_image_refs, ImageRef};
use crate::core::rich_text::plain_text;
use crate::domain::model::{content_types, Entry};
use serde::Serialize;

pub const COMING_SOON: &str = "Content Coming Soon!";
const IMAGE_ALT: &str = "Cabin life";

/// The cabin-life page. Only the first cabin-life entry is shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CabinLifeView {
    pub available: bool,
    pub body: String,
    pub images: Vec<ImageRef>,
}

impl CabinLifeView {
    pub fn coming_soon() -> Self {
        Self {
            available: false,
            body: COMING_SOON.to_string(),
            images: Vec::new(),
        }
    }

    pub fn from_entries(entries: &[Entry]) -> Self {
        let Some(entry) = entries
            .iter()
            .find(|entry| entry.content_type == content_types::CABIN_LIFE)
        else {
            return Self::coming_soon();
        };

        Self {
            available: true,
            body: entry.field("content").map(plain_text).unwrap_or_default(),
            images: collect_image_refs(&entry.fields, &["images"], IMAGE_ALT),
        }
    }
}
