use crate::core::date_range::{CalendarDate, TimeInterval, INVALID_DATE};
use crate::core::images::{
    collect_all_urls, collect_image_refs, ImageField, ImageRef, DEFAULT_IMAGE_FIELDS,
};
use crate::core::rich_text::plain_text;
use crate::domain::model::Entry;
use serde::Serialize;
use std::cmp::Ordering;

pub const EXCERPT_CHARS: usize = 200;
pub const NO_EXCERPT: &str = "Click to read more...";

#[derive(Debug, Clone, Serialize)]
pub struct BlogCard {
    pub id: String,
    pub title: String,
    pub date: Option<CalendarDate>,
    pub date_label: String,
    pub excerpt: String,
    pub image: Option<ImageRef>,
    pub image_urls: Vec<String>,
}

impl BlogCard {
    pub fn from_entry(entry: &Entry) -> Self {
        let title = entry.title().unwrap_or("Untitled").to_string();
        let posted = entry
            .raw_date("date")
            .and_then(|raw| TimeInterval::resolve(raw, None));

        Self {
            id: entry.id.clone(),
            date: posted.map(|interval| interval.start),
            date_label: posted
                .map(|interval| interval.display())
                .unwrap_or_else(|| INVALID_DATE.to_string()),
            excerpt: excerpt(entry),
            image: ImageField::from_value(entry.field("featuredImage"), &title)
                .first()
                .cloned(),
            image_urls: collect_all_urls(&entry.fields, &DEFAULT_IMAGE_FIELDS),
            title,
        }
    }
}

fn excerpt(entry: &Entry) -> String {
    if let Some(excerpt) = entry.text("excerpt") {
        return excerpt.to_string();
    }

    let body = entry.field("content").map(plain_text).unwrap_or_default();
    if body.is_empty() {
        return NO_EXCERPT.to_string();
    }

    let truncated: String = body.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", truncated)
}

/// Newest post first; posts without a usable date go last.
pub fn build_blog(entries: &[Entry]) -> Vec<BlogCard> {
    let mut cards: Vec<BlogCard> = entries.iter().map(BlogCard::from_entry).collect();
    cards.sort_by(|a, b| newest_first(a.date, b.date));
    cards
}

fn newest_first(a: Option<CalendarDate>, b: Option<CalendarDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Full view of one post: the whole body and every image with alt text.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub date: Option<CalendarDate>,
    pub date_label: String,
    pub body: String,
    pub images: Vec<ImageRef>,
}

impl BlogPost {
    pub fn from_entry(entry: &Entry) -> Self {
        let title = entry.title().unwrap_or("Untitled").to_string();
        let posted = entry
            .raw_date("date")
            .and_then(|raw| TimeInterval::resolve(raw, None));

        Self {
            id: entry.id.clone(),
            date: posted.map(|interval| interval.start),
            date_label: posted
                .map(|interval| interval.display())
                .unwrap_or_else(|| INVALID_DATE.to_string()),
            body: entry.field("content").map(plain_text).unwrap_or_default(),
            images: collect_image_refs(&entry.fields, &DEFAULT_IMAGE_FIELDS, &title),
            title,
        }
    }
}

/// Same order as [`build_blog`].
pub fn build_blog_posts(entries: &[Entry]) -> Vec<BlogPost> {
    let mut posts: Vec<BlogPost> = entries.iter().map(BlogPost::from_entry).collect();
    posts.sort_by(|a, b| newest_first(a.date, b.date));
    posts
}
