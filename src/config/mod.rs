#[cfg(feature = "cli")]
pub mod cli;
pub mod storage;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

/// Formats the load step knows how to write.
pub const OUTPUT_FORMATS: [&str; 2] = ["json", "csv"];

pub const DEFAULT_BUNDLE_FILENAME: &str = "site-data.zip";
