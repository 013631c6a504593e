//! Crawler engine: configuration, browser sessions, persistence and the run pipeline.
mod chrome;
mod config;
mod persist;
mod pipeline;
mod provider;
mod storage;

pub use chrome::{ChromeContext, ChromeElement, ChromeLink, ChromeSession, ChromeSettings, LaunchArgs};
pub use config::{ConfigError, CrawlerConfig, DEFAULT_PROFILE_VARIANT};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{
    run_crawler, run_crawler_with, CrawlOptions, RunError, DEFAULT_CONFIG_PATH,
    DEFAULT_OUTPUT_PATH,
};
pub use provider::{ChromeSessionProvider, SessionProvider};
pub use storage::{JsonStorage, PostSink, StorageError};
