use crate::core::blog::{BlogCard, BlogPost};
use crate::core::cabin_life::CabinLifeView;
use crate::core::date_range::RawDate;
use crate::core::gallery::GalleryImage;
use crate::core::itinerary::{StopFilter, TripDetail, TripStop};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content type ids used by the journal's content space.
pub mod content_types {
    pub const TRIP: &str = "trip";
    pub const BLOG_POST: &str = "blogPost";
    pub const CABIN_LIFE: &str = "cabinLife";

    /// Fetch order for the pipeline.
    pub const ALL: [&str; 3] = [TRIP, BLOG_POST, CABIN_LIFE];
}

/// One entry from the content backend, with asset links already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub content_type: String,
    pub fields: Map<String, Value>,
}

impl Entry {
    pub fn new(id: impl Into<String>, content_type: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            content_type: content_type.into(),
            fields: match fields {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Non-empty string field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    /// Date-like field; `None` when missing, null or blank.
    pub fn raw_date(&self, name: &str) -> Option<RawDate<'_>> {
        match self.fields.get(name)? {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            value => Some(RawDate::from(value)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub filter: StopFilter,
    pub stops: Vec<TripStop>,
    pub current_stop_id: Option<String>,
    pub show_newsletter: bool,
    /// How long the page waits before opening the newsletter prompt.
    pub newsletter_delay_ms: u64,
}

/// Everything the site's pages render, produced by the transform step.
#[derive(Debug, Clone, Serialize)]
pub struct SiteDigest {
    pub generated_for: chrono::NaiveDate,
    pub itinerary: Vec<TripStop>,
    pub home: HomeView,
    pub trips: Vec<TripDetail>,
    pub blog: Vec<BlogCard>,
    pub posts: Vec<BlogPost>,
    pub cabin_life: CabinLifeView,
    pub gallery: Vec<GalleryImage>,
}
