pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    clock::{FixedClock, SystemClock},
    contentful::ContentfulClient,
    session::MemorySessionStore,
};
pub use config::{storage::LocalStorage, toml_config::TomlConfig};
pub use core::{engine::JournalEngine, pipeline::JournalPipeline};
pub use utils::error::{JournalError, Result};
