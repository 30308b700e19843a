pub mod blog;
pub mod cabin_life;
pub mod date_range;
pub mod engine;
pub mod gallery;
pub mod images;
pub mod itinerary;
pub mod pipeline;
pub mod rich_text;

pub use crate::domain::model::{Entry, SiteDigest};
pub use crate::domain::ports::{
    Clock, ConfigProvider, ContentSource, EntryQuery, Pipeline, SessionStore, Storage,
};
pub use crate::utils::error::Result;
