//! Image-valued fields on content entries come in several shapes: a bare URL
//! string, an asset object with a nested `fields.file.url` (or `file.url`),
//! or an array of either. This module collapses them into absolute URLs with
//! alt text. Nothing here fails; shapes it does not recognize are dropped.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const DEFAULT_IMAGE_FIELDS: [&str; 3] = ["featuredImage", "images", "additionalImages"];

const ALT_TEXT_POINTERS: [&str; 3] = ["/fields/title", "/fields/description", "/title"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub url: String,
    pub alt: String,
}

impl ImageRef {
    pub fn from_value(value: &Value, fallback_alt: &str) -> Option<Self> {
        Some(Self {
            url: resolve_single_url(value)?,
            alt: resolve_alt_text(value, fallback_alt),
        })
    }
}

/// An image field after normalization at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "kind", content = "images", rename_all = "lowercase")]
pub enum ImageField {
    #[default]
    Absent,
    Single(ImageRef),
    Many(Vec<ImageRef>),
}

impl ImageField {
    /// Arrays that resolve to a single usable image become `Single`.
    pub fn from_value(value: Option<&Value>, fallback_alt: &str) -> Self {
        match value {
            None => ImageField::Absent,
            Some(Value::Array(items)) => {
                let mut refs = dedup_by_url(
                    items
                        .iter()
                        .filter_map(|item| ImageRef::from_value(item, fallback_alt)),
                );
                match refs.len() {
                    0 => ImageField::Absent,
                    1 => refs.pop().map(ImageField::Single).unwrap_or_default(),
                    _ => ImageField::Many(refs),
                }
            }
            Some(single) => ImageRef::from_value(single, fallback_alt)
                .map(ImageField::Single)
                .unwrap_or_default(),
        }
    }

    pub fn first(&self) -> Option<&ImageRef> {
        match self {
            ImageField::Absent => None,
            ImageField::Single(image) => Some(image),
            ImageField::Many(images) => images.first(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ImageField::Absent => 0,
            ImageField::Single(_) => 1,
            ImageField::Many(images) => images.len(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ImageField::Absent)
    }

    pub fn urls(&self) -> Vec<&str> {
        match self {
            ImageField::Absent => Vec::new(),
            ImageField::Single(image) => vec![image.url.as_str()],
            ImageField::Many(images) => images.iter().map(|image| image.url.as_str()).collect(),
        }
    }

    pub fn into_refs(self) -> Vec<ImageRef> {
        match self {
            ImageField::Absent => Vec::new(),
            ImageField::Single(image) => vec![image],
            ImageField::Many(images) => images,
        }
    }
}

fn absolutize(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match url.strip_prefix("//") {
        Some(rest) => Some(format!("https://{}", rest)),
        None => Some(url.to_string()),
    }
}

fn nested_file_url(value: &Value) -> Option<&str> {
    value
        .pointer("/fields/file/url")
        .or_else(|| value.pointer("/file/url"))
        .and_then(Value::as_str)
}

fn resolve_non_array(value: &Value) -> Option<String> {
    match value {
        Value::String(url) => absolutize(url),
        Value::Object(_) => nested_file_url(value).and_then(absolutize),
        _ => None,
    }
}

/// URL of a single image value; for arrays only the first element counts.
pub fn resolve_single_url(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(resolve_non_array),
        other => resolve_non_array(other),
    }
}

pub fn resolve_alt_text(value: &Value, fallback: &str) -> String {
    let value = match value {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return fallback.to_string(),
        },
        other => other,
    };

    ALT_TEXT_POINTERS
        .iter()
        .find_map(|pointer| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|text| !text.is_empty())
        })
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

fn raw_images<'a>(record: &'a Map<String, Value>, field_names: &[&str]) -> Vec<&'a Value> {
    let mut raw = Vec::new();
    for name in field_names {
        match record.get(*name) {
            Some(Value::Array(items)) => raw.extend(items.iter()),
            Some(value) => raw.push(value),
            None => {}
        }
    }
    raw
}

fn dedup_by_url(images: impl Iterator<Item = ImageRef>) -> Vec<ImageRef> {
    let mut seen = HashSet::new();
    images.filter(|image| seen.insert(image.url.clone())).collect()
}

/// Every image across `field_names`, field order first and array order
/// second. A URL that shows up again later is skipped.
pub fn collect_image_refs(
    record: &Map<String, Value>,
    field_names: &[&str],
    fallback_alt: &str,
) -> Vec<ImageRef> {
    dedup_by_url(
        raw_images(record, field_names)
            .into_iter()
            .filter_map(|value| ImageRef::from_value(value, fallback_alt)),
    )
}

pub fn collect_all_urls(record: &Map<String, Value>, field_names: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw_images(record, field_names)
        .into_iter()
        .filter_map(resolve_single_url)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
