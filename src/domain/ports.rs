use crate::core::itinerary::StopFilter;
use crate::domain::model::{Entry, SiteDigest};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn space_id(&self) -> &str;
    fn access_token(&self) -> &str;
    fn environment(&self) -> &str;
    fn output_path(&self) -> &str;
    fn entry_limit(&self) -> usize;
    fn include_depth(&self) -> u8;
    fn output_formats(&self) -> &[String];
    fn compress(&self) -> bool;
    fn bundle_filename(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn home_filter(&self) -> StopFilter;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    pub content_type: String,
    pub limit: usize,
    pub include: u8,
}

impl EntryQuery {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            limit: 100,
            include: 3,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_include(mut self, include: u8) -> Self {
        self.include = include;
        self
    }
}

/// Read access to the hosted content backend.
pub trait ContentSource: Send + Sync {
    fn get_entries(
        &self,
        query: &EntryQuery,
    ) -> impl std::future::Future<Output = Result<Vec<Entry>>> + Send;
}

/// Session-scoped key-value flags, injected instead of process-wide globals.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

pub trait Clock: Send + Sync {
    /// Today's calendar day in the viewer's time zone.
    fn today(&self) -> NaiveDate;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Entry>>;
    async fn transform(&self, entries: Vec<Entry>) -> Result<SiteDigest>;
    async fn load(&self, digest: SiteDigest) -> Result<String>;
}
