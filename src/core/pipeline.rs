use crate::adapters::clock::SystemClock;
use crate::adapters::contentful::fetch_until_cancelled;
use crate::adapters::session::MemorySessionStore;
use crate::app::newsletter::{NewsletterPrompt, PROMPT_DELAY};
use crate::core::blog::{build_blog, build_blog_posts};
use crate::core::cabin_life::CabinLifeView;
use crate::core::date_range::CalendarDate;
use crate::core::gallery::{collect_gallery, source_counts, GalleryCounts, GalleryImage};
use crate::core::itinerary::{
    build_itinerary, build_trip_details, current_stop, filter_stops, TripStop,
};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{content_types, Entry, HomeView, SiteDigest};
use crate::domain::ports::{Clock, ContentSource, EntryQuery, SessionStore};
use crate::utils::error::{JournalError, Result};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use zip::write::{FileOptions, ZipWriter};

pub const DIGEST_FILE: &str = "digest.json";
pub const GALLERY_FILE: &str = "gallery.json";
pub const ITINERARY_FILE: &str = "itinerary.csv";

#[derive(Serialize)]
struct GalleryFile<'a> {
    counts: GalleryCounts,
    images: &'a [GalleryImage],
}

#[derive(Serialize)]
struct ItineraryRow<'a> {
    id: &'a str,
    title: &'a str,
    dates: &'a str,
    start: Option<CalendarDate>,
    end: Option<CalendarDate>,
    status: &'static str,
    current: bool,
    at_sea_after: bool,
    image_url: Option<&'a str>,
}

impl<'a> From<&'a TripStop> for ItineraryRow<'a> {
    fn from(stop: &'a TripStop) -> Self {
        Self {
            id: &stop.id,
            title: &stop.title,
            dates: &stop.date_label,
            start: stop.interval.map(|interval| interval.start),
            end: stop.interval.map(|interval| interval.last_day()),
            status: match stop.status {
                crate::core::date_range::TripStatus::Upcoming => "upcoming",
                crate::core::date_range::TripStatus::Current => "current",
                crate::core::date_range::TripStatus::Past => "past",
            },
            current: stop.is_current,
            at_sea_after: stop.at_sea_after,
            image_url: stop.featured_image.as_ref().map(|image| image.url.as_str()),
        }
    }
}

pub struct JournalPipeline<S: Storage, C: ConfigProvider, K: ContentSource> {
    storage: S,
    config: C,
    source: K,
    clock: Box<dyn Clock>,
    session: Arc<dyn SessionStore>,
    cancel: CancellationToken,
}

impl<S: Storage, C: ConfigProvider, K: ContentSource> JournalPipeline<S, C, K> {
    pub fn new(storage: S, config: C, source: K) -> Self {
        Self {
            storage,
            config,
            source,
            clock: Box::new(SystemClock),
            session: Arc::new(MemorySessionStore::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_session(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = session;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Cancelling this token discards any fetch still in flight.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn itinerary_csv(stops: &[TripStop]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for stop in stops {
            writer.serialize(ItineraryRow::from(stop))?;
        }
        writer.into_inner().map_err(|e| JournalError::ProcessingError {
            message: format!("Failed to finish itinerary CSV: {}", e),
        })
    }

    fn render_files(&self, digest: &SiteDigest) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let formats = self.config.output_formats();
        let mut files = Vec::new();

        if formats.iter().any(|f| f == "json") {
            files.push((DIGEST_FILE, serde_json::to_vec_pretty(digest)?));
            let gallery = GalleryFile {
                counts: source_counts(&digest.gallery),
                images: &digest.gallery,
            };
            files.push((GALLERY_FILE, serde_json::to_vec_pretty(&gallery)?));
        }

        if formats.iter().any(|f| f == "csv") {
            files.push((ITINERARY_FILE, Self::itinerary_csv(&digest.itinerary)?));
        }

        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, K: ContentSource> Pipeline for JournalPipeline<S, C, K> {
    async fn extract(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut fetched_any = false;
        let mut last_error = None;

        for content_type in content_types::ALL {
            let query = EntryQuery::new(content_type)
                .with_limit(self.config.entry_limit())
                .with_include(self.config.include_depth());

            match fetch_until_cancelled(&self.source, &query, &self.cancel).await {
                Ok(Some(batch)) => {
                    fetched_any = true;
                    entries.extend(batch);
                }
                Ok(None) => return Err(JournalError::Cancelled),
                Err(e) => {
                    // 單一類型失敗只影響對應頁面
                    tracing::warn!("Failed to fetch {} entries: {}", content_type, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !fetched_any => Err(e),
            _ => Ok(entries),
        }
    }

    async fn transform(&self, entries: Vec<Entry>) -> Result<SiteDigest> {
        let today = CalendarDate::from(self.clock.today());
        tracing::debug!("Transforming {} entries for {}", entries.len(), today.naive());

        let gallery = collect_gallery(&entries);
        let cabin_life = CabinLifeView::from_entries(&entries);

        let (trips, rest): (Vec<Entry>, Vec<Entry>) = entries
            .into_iter()
            .partition(|entry| entry.content_type == content_types::TRIP);
        let posts: Vec<Entry> = rest
            .into_iter()
            .filter(|entry| entry.content_type == content_types::BLOG_POST)
            .collect();

        let itinerary = build_itinerary(&trips, today);
        let filter = self.config.home_filter();
        let home = HomeView {
            filter,
            stops: filter_stops(&itinerary, filter),
            current_stop_id: current_stop(&itinerary).map(|stop| stop.id.clone()),
            show_newsletter: NewsletterPrompt::new(self.session.as_ref()).should_show(),
            newsletter_delay_ms: PROMPT_DELAY.as_millis() as u64,
        };

        Ok(SiteDigest {
            generated_for: today.naive(),
            trips: build_trip_details(&trips, today),
            itinerary,
            home,
            blog: build_blog(&posts),
            posts: build_blog_posts(&posts),
            cabin_life,
            gallery,
        })
    }

    async fn load(&self, digest: SiteDigest) -> Result<String> {
        let files = self.render_files(&digest)?;
        if files.is_empty() {
            return Err(JournalError::ProcessingError {
                message: "No output formats selected".to_string(),
            });
        }

        if !self.config.compress() {
            for (name, data) in &files {
                self.storage.write_file(name, data).await?;
            }
            tracing::debug!("Wrote {} files", files.len());
            return Ok(self.config.output_path().to_string());
        }

        let bundle_name = self.config.bundle_filename();
        tracing::debug!("Creating ZIP bundle with {} files", files.len());

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &files {
                zip.start_file::<_, ()>(*name, FileOptions::default())?;
                zip.write_all(data)?;
            }
            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP bundle ({} bytes) to storage", zip_data.len());
        self.storage.write_file(bundle_name, &zip_data).await?;

        Ok(format!("{}/{}", self.config.output_path(), bundle_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::app::newsletter::SEEN_NEWSLETTER_KEY;
    use crate::core::itinerary::StopFilter;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                JournalError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        output_formats: Vec<String>,
        compress: bool,
        filter: StopFilter,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                output_formats: vec!["json".to_string(), "csv".to_string()],
                compress: false,
                filter: StopFilter::All,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_base(&self) -> &str {
            "http://localhost"
        }
        fn space_id(&self) -> &str {
            "space"
        }
        fn access_token(&self) -> &str {
            "token"
        }
        fn environment(&self) -> &str {
            "master"
        }
        fn output_path(&self) -> &str {
            "test_output"
        }
        fn entry_limit(&self) -> usize {
            100
        }
        fn include_depth(&self) -> u8 {
            3
        }
        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }
        fn compress(&self) -> bool {
            self.compress
        }
        fn bundle_filename(&self) -> &str {
            "bundle.zip"
        }
        fn request_timeout(&self) -> Option<Duration> {
            None
        }
        fn home_filter(&self) -> StopFilter {
            self.filter
        }
    }

    /// Serves canned entries per content type; a missing type is an error.
    struct MockSource {
        entries: HashMap<String, Vec<Entry>>,
        delay: Option<Duration>,
    }

    impl MockSource {
        fn new() -> Self {
            let mut entries = HashMap::new();
            entries.insert(
                "trip".to_string(),
                vec![
                    Entry::new(
                        "cadiz",
                        "trip",
                        json!({ "title": "Cadiz", "date": "2024-09-20", "endDate": "2024-09-22" }),
                    ),
                    Entry::new(
                        "lisbon",
                        "trip",
                        json!({
                            "title": "Lisbon",
                            "date": "2024-09-15",
                            "endDate": "2024-09-17",
                            "featuredImage": { "fields": { "file": { "url": "//cdn/lisbon.jpg" } } }
                        }),
                    ),
                ],
            );
            entries.insert(
                "blogPost".to_string(),
                vec![Entry::new(
                    "post1",
                    "blogPost",
                    json!({ "title": "Week one", "date": "2024-09-14", "featuredImage": "//cdn/lisbon.jpg" }),
                )],
            );
            Self {
                entries,
                delay: None,
            }
        }
    }

    impl ContentSource for MockSource {
        async fn get_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.entries
                .get(&query.content_type)
                .cloned()
                .ok_or_else(|| JournalError::ContentApiError {
                    status: 404,
                    message: format!("unknown content type {}", query.content_type),
                })
        }
    }

    fn pipeline(
        config: MockConfig,
        source: MockSource,
    ) -> JournalPipeline<MockStorage, MockConfig, MockSource> {
        JournalPipeline::new(MockStorage::default(), config, source)
            .with_clock(FixedClock(NaiveDate::from_ymd_opt(2024, 9, 16).unwrap()))
    }

    #[tokio::test]
    async fn test_extract_skips_failed_content_type() {
        let pipeline = pipeline(MockConfig::new(), MockSource::new());
        let entries = pipeline.extract().await.unwrap();
        // cabinLife 失敗，其餘照常
        assert_eq!(entries.len(), 3);
    }

    #[tokio::test]
    async fn test_extract_fails_when_every_type_fails() {
        let source = MockSource {
            entries: HashMap::new(),
            delay: None,
        };
        let err = pipeline(MockConfig::new(), source).extract().await.unwrap_err();
        assert!(matches!(err, JournalError::ContentApiError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_extract_cancelled_discards_results() {
        let mut source = MockSource::new();
        source.delay = Some(Duration::from_secs(30));
        let pipeline = pipeline(MockConfig::new(), source);

        let token = pipeline.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, JournalError::Cancelled));
    }

    #[tokio::test]
    async fn test_transform_builds_digest() {
        let pipeline = pipeline(MockConfig::new(), MockSource::new());
        let entries = pipeline.extract().await.unwrap();
        let digest = pipeline.transform(entries).await.unwrap();

        assert_eq!(digest.generated_for, NaiveDate::from_ymd_opt(2024, 9, 16).unwrap());
        assert_eq!(digest.itinerary[0].id, "lisbon");
        assert_eq!(digest.itinerary[0].date_label, "Sep 15-17");
        assert_eq!(digest.home.current_stop_id.as_deref(), Some("lisbon"));
        assert!(digest.home.show_newsletter);
        assert_eq!(digest.blog.len(), 1);
        // 同一張照片只出現一次
        assert_eq!(digest.gallery.len(), 1);
        assert_eq!(digest.gallery[0].id, "lisbon-featured");

        assert_eq!(digest.home.newsletter_delay_ms, 1500);
        let trip_ids: Vec<&str> = digest.trips.iter().map(|trip| trip.id.as_str()).collect();
        assert_eq!(trip_ids, vec!["lisbon", "cadiz"]);
        assert_eq!(digest.trips[0].images, vec!["https://cdn/lisbon.jpg"]);
        assert_eq!(digest.posts[0].title, "Week one");
        assert_eq!(digest.posts[0].images[0].url, "https://cdn/lisbon.jpg");
        // cabinLife 抓取失敗
        assert!(!digest.cabin_life.available);
    }

    #[tokio::test]
    async fn test_transform_respects_session_and_filter() {
        let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        session.set(SEEN_NEWSLETTER_KEY, "true");

        let mut config = MockConfig::new();
        config.filter = StopFilter::Past;
        let pipeline = pipeline(config, MockSource::new()).with_session(session);

        let entries = pipeline.extract().await.unwrap();
        let digest = pipeline.transform(entries).await.unwrap();

        assert!(!digest.home.show_newsletter);
        assert!(digest.home.stops.is_empty());
        assert_eq!(digest.home.filter, StopFilter::Past);
    }

    #[tokio::test]
    async fn test_load_writes_separate_files() {
        let storage = MockStorage::default();
        let pipeline = JournalPipeline::new(storage.clone(), MockConfig::new(), MockSource::new())
            .with_clock(FixedClock(NaiveDate::from_ymd_opt(2024, 9, 16).unwrap()));

        let entries = pipeline.extract().await.unwrap();
        let digest = pipeline.transform(entries).await.unwrap();
        let output = pipeline.load(digest).await.unwrap();
        assert_eq!(output, "test_output");

        let csv = String::from_utf8(storage.get_file(ITINERARY_FILE).await.unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,title,dates,start,end,status,current,at_sea_after,image_url")
        );
        assert_eq!(
            lines.next(),
            Some("lisbon,Lisbon,Sep 15-17,2024-09-15,2024-09-17,current,true,false,https://cdn/lisbon.jpg")
        );

        let gallery: serde_json::Value =
            serde_json::from_slice(&storage.get_file(GALLERY_FILE).await.unwrap()).unwrap();
        assert_eq!(gallery["counts"]["all"], 1);
        assert!(storage.get_file(DIGEST_FILE).await.is_some());
    }

    #[tokio::test]
    async fn test_load_zips_when_compressed() {
        let storage = MockStorage::default();
        let mut config = MockConfig::new();
        config.compress = true;
        config.output_formats = vec!["csv".to_string()];
        let pipeline = JournalPipeline::new(storage.clone(), config, MockSource::new())
            .with_clock(FixedClock(NaiveDate::from_ymd_opt(2024, 9, 16).unwrap()));

        let entries = pipeline.extract().await.unwrap();
        let digest = pipeline.transform(entries).await.unwrap();
        let output = pipeline.load(digest).await.unwrap();
        assert_eq!(output, "test_output/bundle.zip");

        let zip_data = storage.get_file("bundle.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names, vec![ITINERARY_FILE]);
    }

    #[tokio::test]
    async fn test_load_without_formats_fails() {
        let mut config = MockConfig::new();
        config.output_formats = Vec::new();
        let pipeline = pipeline(config, MockSource::new());

        let entries = pipeline.extract().await.unwrap();
        let digest = pipeline.transform(entries).await.unwrap();
        assert!(matches!(
            pipeline.load(digest).await,
            Err(JournalError::ProcessingError { .. })
        ));
    }
}
