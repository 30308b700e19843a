use crate::adapters::contentful::DEFAULT_API_BASE;
use crate::config::{DEFAULT_BUNDLE_FILENAME, OUTPUT_FORMATS};
use crate::core::itinerary::StopFilter;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_access_token, validate_allowed_values, validate_non_empty_string, validate_path,
    validate_positive_number, validate_range, validate_space_id, validate_url, Validate,
};
use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "trip-journal")]
#[command(about = "Builds the travel journal's site data from the content backend")]
pub struct CliConfig {
    #[arg(long, env = "CONTENTFUL_SPACE_ID")]
    pub space_id: String,

    #[arg(long, env = "CONTENTFUL_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    #[arg(long, default_value = "master")]
    pub environment: String,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, default_value = "./site-data")]
    pub output_path: String,

    #[arg(long, default_value = "100")]
    pub entry_limit: usize,

    #[arg(long, default_value = "3")]
    pub include_depth: u8,

    #[arg(long, value_delimiter = ',', default_value = "json,csv")]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Pack the output files into a single zip")]
    pub compress: bool,

    #[arg(long, default_value = "all", help = "Home timeline filter: all, upcoming or past")]
    pub filter: StopFilter,

    #[arg(long, help = "Build as if today were this date (YYYY-MM-DD)")]
    pub today: Option<NaiveDate>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn space_id(&self) -> &str {
        &self.space_id
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn environment(&self) -> &str {
        &self.environment
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn entry_limit(&self) -> usize {
        self.entry_limit
    }

    fn include_depth(&self) -> u8 {
        self.include_depth
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn compress(&self) -> bool {
        self.compress
    }

    fn bundle_filename(&self) -> &str {
        DEFAULT_BUNDLE_FILENAME
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    fn home_filter(&self) -> StopFilter {
        self.filter
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_space_id("space_id", &self.space_id)?;
        validate_access_token("access_token", &self.access_token)?;
        validate_non_empty_string("environment", &self.environment)?;
        validate_url("api_base", &self.api_base)?;
        validate_path("output_path", &self.output_path)?;
        validate_positive_number("entry_limit", self.entry_limit, 1)?;
        validate_range("include_depth", self.include_depth, 0, 10)?;
        validate_allowed_values("output_formats", &self.output_formats, &OUTPUT_FORMATS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::JournalError;

    #[test]
    fn test_parse_defaults() {
        let config = CliConfig::parse_from([
            "trip-journal",
            "--space-id",
            "space123",
            "--access-token",
            "token",
        ]);

        assert_eq!(config.environment, "master");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.output_formats, vec!["json", "csv"]);
        assert_eq!(config.filter, StopFilter::All);
        assert!(config.today.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_overrides() {
        let config = CliConfig::parse_from([
            "trip-journal",
            "--space-id",
            "space123",
            "--access-token",
            "token",
            "--filter",
            "upcoming",
            "--today",
            "2024-09-16",
            "--output-formats",
            "csv",
            "--compress",
        ]);

        assert_eq!(config.home_filter(), StopFilter::Upcoming);
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 9, 16));
        assert_eq!(config.output_formats(), ["csv".to_string()]);
        assert!(config.compress());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = CliConfig::parse_from([
            "trip-journal",
            "--space-id",
            "space123",
            "--access-token",
            "token",
        ]);
        config.output_formats = vec!["xml".to_string()];
        assert!(config.validate().is_err());

        config.output_formats = vec!["json".to_string()];
        config.api_base = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api_base = "https://cdn.contentful.com".to_string();
        config.space_id = "space-123".to_string();
        assert!(config.validate().is_err());

        config.space_id = "space123".to_string();
        config.access_token = "${CONTENTFUL_ACCESS_TOKEN}".to_string();
        assert!(matches!(
            config.validate(),
            Err(JournalError::MissingConfigError { .. })
        ));
    }
}
