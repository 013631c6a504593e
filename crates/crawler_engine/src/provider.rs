use crawler_core::{BrowserSession, SessionError};

use crate::chrome::{ChromeSession, ChromeSettings, LaunchArgs};
use crate::config::CrawlerConfig;

/// Hands out ready browser sessions.
///
/// A session is released when the value returned by [`SessionProvider::acquire`]
/// is dropped, so every exit path of the caller tears it down.
pub trait SessionProvider {
    type Session: BrowserSession;

    fn acquire(&self, config: &CrawlerConfig) -> Result<Self::Session, SessionError>;
}

#[derive(Debug, Clone, Default)]
pub struct ChromeSessionProvider {
    settings: ChromeSettings,
}

impl ChromeSessionProvider {
    pub fn new(settings: ChromeSettings) -> Self {
        Self { settings }
    }
}

impl SessionProvider for ChromeSessionProvider {
    type Session = ChromeSession;

    fn acquire(&self, config: &CrawlerConfig) -> Result<ChromeSession, SessionError> {
        ChromeSession::launch(&LaunchArgs::from_config(config), self.settings.clone())
    }
}
