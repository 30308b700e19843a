use crate::core::images::{resolve_alt_text, resolve_single_url};
use crate::domain::model::{content_types, Entry};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GallerySource {
    #[serde(rename = "trips")]
    Trips,
    #[serde(rename = "blog")]
    Blog,
    #[serde(rename = "cabinlife")]
    CabinLife,
}

impl GallerySource {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            content_types::TRIP => Some(GallerySource::Trips),
            content_types::BLOG_POST => Some(GallerySource::Blog),
            content_types::CABIN_LIFE => Some(GallerySource::CabinLife),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            GallerySource::Trips => "trips",
            GallerySource::Blog => "blog",
            GallerySource::CabinLife => "cabinlife",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GallerySource::Trips => "Trips",
            GallerySource::Blog => "Blog",
            GallerySource::CabinLife => "Cabin Life",
        }
    }
}

impl FromStr for GallerySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trips" => Ok(GallerySource::Trips),
            "blog" => Ok(GallerySource::Blog),
            "cabinlife" => Ok(GallerySource::CabinLife),
            other => Err(format!("unknown gallery source '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImage {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub source: GallerySource,
    pub alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GalleryCounts {
    pub all: usize,
    pub trips: usize,
    pub blog: usize,
    pub cabin_life: usize,
}

fn is_asset(value: &Value) -> bool {
    value.pointer("/fields/file/url").and_then(Value::as_str).is_some()
}

fn asset_description(value: &Value) -> Option<String> {
    value
        .pointer("/fields/description")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

/// Featured images are labelled by their own title, then the entry's title.
/// The asset description is never used here.
fn featured_alt(value: &Value, entry: &Entry) -> String {
    let value = match value {
        Value::Array(items) => items.first().unwrap_or(value),
        other => other,
    };
    value
        .pointer("/fields/title")
        .and_then(Value::as_str)
        .filter(|title| !title.trim().is_empty())
        .or_else(|| entry.title())
        .unwrap_or("Image")
        .to_string()
}

struct EntryImages<'a> {
    entry: &'a Entry,
    source: GallerySource,
    title: String,
    images: Vec<GalleryImage>,
}

impl<'a> EntryImages<'a> {
    fn new(entry: &'a Entry, source: GallerySource) -> Self {
        Self {
            entry,
            source,
            title: entry.title().unwrap_or("Untitled").to_string(),
            images: Vec::new(),
        }
    }

    fn post_title(&self) -> &str {
        self.entry.title().unwrap_or("post")
    }

    fn push(&mut self, id: String, value: &Value, description: String, alt: String) {
        let Some(url) = resolve_single_url(value) else {
            return;
        };
        self.images.push(GalleryImage {
            id,
            url,
            title: self.title.clone(),
            description,
            source: self.source,
            alt,
        });
    }

    fn collect(mut self) -> Vec<GalleryImage> {
        let entry = self.entry;

        if let Some(featured) = entry.field("featuredImage") {
            let description = format!("Featured image from {}", self.post_title());
            let alt = featured_alt(featured, entry);
            self.push(format!("{}-featured", entry.id), featured, description, alt);
        }

        if let Some(Value::Array(gallery)) = entry.field("gallery") {
            for (index, image) in gallery.iter().enumerate() {
                let description = asset_description(image).unwrap_or_else(|| {
                    format!("Gallery image {} from {}", index + 1, self.post_title())
                });
                self.push(
                    format!("{}-gallery-{}", entry.id, index),
                    image,
                    description,
                    resolve_alt_text(image, "Gallery image"),
                );
            }
        }

        for (key, value) in &entry.fields {
            if key == "featuredImage" || key == "gallery" {
                continue;
            }
            match value {
                Value::Object(_) if is_asset(value) => {
                    let description = asset_description(value)
                        .unwrap_or_else(|| format!("{} from {}", key, self.post_title()));
                    let alt = resolve_alt_text(value, "Image");
                    self.push(format!("{}-{}", entry.id, key), value, description, alt);
                }
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate().filter(|(_, item)| is_asset(item)) {
                        let description = asset_description(item)
                            .unwrap_or_else(|| format!("{} from {}", key, self.post_title()));
                        self.push(
                            format!("{}-{}-{}", entry.id, key, index),
                            item,
                            description,
                            resolve_alt_text(item, "Image"),
                        );
                    }
                }
                _ => {}
            }
        }

        self.images
    }
}

/// Gallery across trips, blog posts and cabin-life entries. Each URL shows up
/// once, attributed to the first entry that referenced it.
pub fn collect_gallery(entries: &[Entry]) -> Vec<GalleryImage> {
    let mut seen = HashSet::new();
    let mut gallery = Vec::new();

    for entry in entries {
        let Some(source) = GallerySource::from_content_type(&entry.content_type) else {
            tracing::debug!(
                entry = %entry.id,
                content_type = %entry.content_type,
                "skipping entry with no gallery source"
            );
            continue;
        };

        for image in EntryImages::new(entry, source).collect() {
            if seen.insert(image.url.clone()) {
                gallery.push(image);
            }
        }
    }

    gallery
}

pub fn filter_gallery(images: &[GalleryImage], source: Option<GallerySource>) -> Vec<&GalleryImage> {
    images
        .iter()
        .filter(|image| source.map_or(true, |source| image.source == source))
        .collect()
}

pub fn source_counts(images: &[GalleryImage]) -> GalleryCounts {
    images.iter().fold(
        GalleryCounts {
            all: images.len(),
            ..GalleryCounts::default()
        },
        |mut counts, image| {
            match image.source {
                GallerySource::Trips => counts.trips += 1,
                GallerySource::Blog => counts.blog += 1,
                GallerySource::CabinLife => counts.cabin_life += 1,
            }
            counts
        },
    )
}
