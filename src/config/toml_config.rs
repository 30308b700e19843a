use crate::adapters::contentful::DEFAULT_API_BASE;
use crate::config::{DEFAULT_BUNDLE_FILENAME, OUTPUT_FORMATS};
use crate::core::itinerary::StopFilter;
use crate::core::ConfigProvider;
use crate::utils::error::{JournalError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub site: SiteConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub space_id: String,
    pub access_token: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub entry_limit: Option<usize>,
    pub include_depth: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    pub home_filter: Option<StopFilter>,
    /// 預覽用：固定「今天」的日期
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

fn default_environment() -> String {
    "master".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| JournalError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CONTENTFUL_ACCESS_TOKEN})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_space_id("source.space_id", &self.source.space_id)?;
        validation::validate_access_token("source.access_token", &self.source.access_token)?;
        validation::validate_url("source.api_base", &self.source.api_base)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(limit) = self.extract.entry_limit {
            validation::validate_positive_number("extract.entry_limit", limit, 1)?;
        }
        if let Some(depth) = self.extract.include_depth {
            validation::validate_range("extract.include_depth", depth, 0, 10)?;
        }

        validation::validate_allowed_values(
            "load.output_formats",
            &self.load.output_formats,
            &OUTPUT_FORMATS,
        )?;

        Ok(())
    }

    pub fn today_override(&self) -> Option<NaiveDate> {
        self.transform.today
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn verbose_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_level.as_deref())
            .map(|level| matches!(level, "debug" | "trace"))
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base(&self) -> &str {
        &self.source.api_base
    }

    fn space_id(&self) -> &str {
        &self.source.space_id
    }

    fn access_token(&self) -> &str {
        &self.source.access_token
    }

    fn environment(&self) -> &str {
        &self.source.environment
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn entry_limit(&self) -> usize {
        self.extract.entry_limit.unwrap_or(100)
    }

    fn include_depth(&self) -> u8 {
        self.extract.include_depth.unwrap_or(3)
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn compress(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    fn bundle_filename(&self) -> &str {
        self.load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
            .unwrap_or(DEFAULT_BUNDLE_FILENAME)
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn home_filter(&self) -> StopFilter {
        self.transform.home_filter.unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
