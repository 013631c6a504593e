use std::path::Path;

use crawler_core::{
    BrowserSession, CrawlError, FeedLayout, LocatorStrategy, Post, PostExtractionEngine,
    SessionError,
};
use crawler_logging::crawler_info;
use thiserror::Error;

use crate::config::{ConfigError, CrawlerConfig};
use crate::provider::SessionProvider;
use crate::storage::{PostSink, StorageError};

pub const DEFAULT_CONFIG_PATH: &str = "mvars";
pub const DEFAULT_OUTPUT_PATH: &str = "scraped_posts.json";

#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("browser session error: {0}")]
    Session(#[from] SessionError),
    #[error("extraction failed: {0}")]
    Crawl(#[from] CrawlError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    pub layout: FeedLayout,
    pub strategy: LocatorStrategy,
}

/// Load the configuration, scrape the configured feed and save the posts.
///
/// Nothing is written unless the whole pass succeeds, and the browser session
/// is released before the posts reach the sink.
pub fn run_crawler<P, K>(config_path: &Path, provider: &P, sink: &K) -> Result<Vec<Post>, RunError>
where
    P: SessionProvider,
    K: PostSink,
{
    run_crawler_with(config_path, provider, sink, &CrawlOptions::default())
}

pub fn run_crawler_with<P, K>(
    config_path: &Path,
    provider: &P,
    sink: &K,
    options: &CrawlOptions,
) -> Result<Vec<Post>, RunError>
where
    P: SessionProvider,
    K: PostSink,
{
    let config = CrawlerConfig::load(config_path)?;
    crawler_info!("loaded configuration from {:?}", config_path);

    let posts = {
        let mut session = provider.acquire(&config)?;
        session.navigate(config.url())?;
        let mut engine = PostExtractionEngine::new(&mut session)
            .with_layout(options.layout.clone())
            .with_strategy(options.strategy);
        engine.run()?
    };

    sink.save_posts(&posts)?;
    Ok(posts)
}
