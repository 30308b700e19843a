use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct JournalEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> JournalEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting site data build");

        // Extract
        let entries = self.pipeline.extract().await?;
        tracing::info!("Fetched {} entries", entries.len());

        // Transform
        let digest = self.pipeline.transform(entries).await?;
        tracing::info!(
            stops = digest.itinerary.len(),
            posts = digest.blog.len(),
            images = digest.gallery.len(),
            "Built site digest"
        );

        // Load
        let output_path = self.pipeline.load(digest).await?;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Output saved to: {}",
            output_path
        );

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cabin_life::CabinLifeView;
    use crate::core::itinerary::StopFilter;
    use crate::domain::model::{Entry, HomeView, SiteDigest};
    use crate::utils::error::JournalError;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPipeline {
        calls: AtomicUsize,
        fail_extract: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<Vec<Entry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_extract {
                return Err(JournalError::Cancelled);
            }
            Ok(vec![Entry::new("a", "trip", serde_json::json!({}))])
        }

        async fn transform(&self, entries: Vec<Entry>) -> Result<SiteDigest> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(entries.len(), 1);
            Ok(SiteDigest {
                generated_for: NaiveDate::from_ymd_opt(2024, 9, 16).unwrap(),
                itinerary: Vec::new(),
                home: HomeView {
                    filter: StopFilter::All,
                    stops: Vec::new(),
                    current_stop_id: None,
                    show_newsletter: true,
                    newsletter_delay_ms: 1500,
                },
                trips: Vec::new(),
                blog: Vec::new(),
                posts: Vec::new(),
                cabin_life: CabinLifeView::coming_soon(),
                gallery: Vec::new(),
            })
        }

        async fn load(&self, _digest: SiteDigest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("out".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_calls_every_phase() {
        let engine = JournalEngine::new(CountingPipeline::default());
        assert_eq!(engine.run().await.unwrap(), "out");
        assert_eq!(engine.pipeline().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let engine = JournalEngine::new(CountingPipeline {
            fail_extract: true,
            ..Default::default()
        });
        assert!(matches!(engine.run().await, Err(JournalError::Cancelled)));
        assert_eq!(engine.pipeline().calls.load(Ordering::SeqCst), 1);
    }
}
