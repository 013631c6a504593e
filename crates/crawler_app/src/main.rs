use std::path::Path;
use std::process::ExitCode;

use crawler_engine::{
    run_crawler, ChromeSessionProvider, JsonStorage, RunError, DEFAULT_CONFIG_PATH,
    DEFAULT_OUTPUT_PATH,
};
use crawler_logging::{crawler_error, crawler_info, LogDestination};
use log::LevelFilter;

fn main() -> ExitCode {
    crawler_logging::initialize(LogDestination::Both, LevelFilter::Info);

    let provider = ChromeSessionProvider::default();
    let storage = JsonStorage::new(DEFAULT_OUTPUT_PATH);

    match run_crawler(Path::new(DEFAULT_CONFIG_PATH), &provider, &storage) {
        Ok(posts) => {
            crawler_info!("saved {} posts to {}", posts.len(), DEFAULT_OUTPUT_PATH);
            ExitCode::SUCCESS
        }
        Err(RunError::Config(err)) => {
            crawler_error!("configuration error: {}", err);
            eprintln!("Configuration error: {err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            crawler_error!("crawl failed: {}", err);
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
