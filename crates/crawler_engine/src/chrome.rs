//! `BrowserSession` over a Chrome instance driven through the DevTools protocol.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crawler_core::{BrowserSession, OpenModifier, SessionError, SessionFailureKind};
use crawler_logging::{crawler_debug, crawler_info};
use headless_chrome::browser::tab::{ModifierKey, NoElementFound};
use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::config::CrawlerConfig;

const USER_DATA_DIR_FLAG: &str = "--user-data-dir=";

#[derive(Debug, Clone)]
pub struct ChromeSettings {
    /// How long a link opened with the modifier may take to show up as a tab.
    pub new_context_timeout: Duration,
    /// Chrome is shut down after this long without DevTools traffic.
    pub idle_browser_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ChromeSettings {
    fn default() -> Self {
        Self {
            new_context_timeout: Duration::from_secs(15),
            idle_browser_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Chrome command line derived from the crawler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    pub user_data_dir: Option<PathBuf>,
    pub args: Vec<String>,
    pub headless: bool,
}

impl LaunchArgs {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        let profile = config.session_profile();
        let (user_data_dir, mut args) = match profile.strip_prefix(USER_DATA_DIR_FLAG) {
            Some(path) => (Some(PathBuf::from(path)), Vec::new()),
            None if profile.starts_with("--") => (None, vec![profile.to_string()]),
            None => (Some(PathBuf::from(profile)), Vec::new()),
        };
        args.push(format!("--profile-directory={}", config.profile_variant()));
        Self {
            user_data_dir,
            args,
            headless: config.headless(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeContext(String);

#[derive(Debug, Clone)]
pub struct ChromeLink {
    context: String,
    xpath: String,
    ordinal: usize,
}

#[derive(Debug, Clone)]
pub struct ChromeElement {
    context: String,
    text: String,
}

pub struct ChromeSession {
    browser: Browser,
    active: Arc<Tab>,
    closed: HashSet<String>,
    settings: ChromeSettings,
}

impl ChromeSession {
    pub fn launch(launch: &LaunchArgs, settings: ChromeSettings) -> Result<Self, SessionError> {
        let args: Vec<&OsStr> = launch.args.iter().map(OsStr::new).collect();
        let options = LaunchOptions::default_builder()
            .headless(launch.headless)
            .user_data_dir(launch.user_data_dir.clone())
            .args(args)
            .idle_browser_timeout(settings.idle_browser_timeout)
            .build()
            .map_err(|err| SessionError::new(SessionFailureKind::Launch, err.to_string()))?;

        let browser = Browser::new(options)
            .map_err(|err| SessionError::new(SessionFailureKind::Launch, err.to_string()))?;
        let active = browser
            .wait_for_initial_tab()
            .map_err(|err| SessionError::new(SessionFailureKind::Launch, err.to_string()))?;

        crawler_info!(
            "browser session started (headless: {}, profile dir: {:?})",
            launch.headless,
            launch.user_data_dir
        );
        Ok(Self {
            browser,
            active,
            closed: HashSet::new(),
            settings,
        })
    }

    fn tabs(&self) -> Result<Vec<Arc<Tab>>, SessionError> {
        let tabs = self.browser.get_tabs().lock().map_err(|_| {
            SessionError::new(SessionFailureKind::Query, "browser tab list is poisoned")
        })?;
        Ok(tabs
            .iter()
            .filter(|tab| !self.closed.contains(tab.get_target_id()))
            .cloned()
            .collect())
    }

    fn tab(&self, target_id: &str) -> Result<Arc<Tab>, SessionError> {
        self.tabs()?
            .into_iter()
            .find(|tab| tab.get_target_id() == target_id)
            .ok_or_else(|| {
                SessionError::new(
                    SessionFailureKind::ContextNotFound,
                    format!("tab {target_id} is not open"),
                )
            })
    }

    fn active_id(&self) -> String {
        self.active.get_target_id().to_string()
    }

    fn wait_for_tab_count(&self, expected: usize) -> Result<(), SessionError> {
        let started = Instant::now();
        loop {
            if self.tabs()?.len() >= expected {
                return Ok(());
            }
            if started.elapsed() >= self.settings.new_context_timeout {
                return Err(SessionError::new(
                    SessionFailureKind::ContextNotFound,
                    format!(
                        "no new tab opened within {:?}",
                        self.settings.new_context_timeout
                    ),
                ));
            }
            thread::sleep(self.settings.poll_interval);
        }
    }
}

impl BrowserSession for ChromeSession {
    type Link = ChromeLink;
    type Element = ChromeElement;
    type Context = ChromeContext;

    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        crawler_debug!("navigating to {}", url);
        self.active
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|err| SessionError::new(SessionFailureKind::Navigation, err.to_string()))?;
        Ok(())
    }

    fn current_markup(&mut self) -> Result<String, SessionError> {
        self.active
            .get_content()
            .map_err(|err| SessionError::new(SessionFailureKind::Query, err.to_string()))
    }

    fn query_by_link_text(&mut self, text: &str) -> Result<Vec<ChromeLink>, SessionError> {
        let xpath = format!("//a[normalize-space(.)={}]", xpath_literal(text));
        let count = count_by_xpath(&self.active, &xpath)?;
        let context = self.active_id();
        Ok((0..count)
            .map(|ordinal| ChromeLink {
                context: context.clone(),
                xpath: xpath.clone(),
                ordinal,
            })
            .collect())
    }

    fn query_by_class_exact(&mut self, classes: &[&str]) -> Result<Vec<ChromeElement>, SessionError> {
        let Some(xpath) = class_exact_xpath(classes) else {
            return Ok(Vec::new());
        };
        let context = self.active_id();
        let elements = match self.active.find_elements_by_xpath(&xpath) {
            Ok(elements) => elements,
            Err(err) if err.downcast_ref::<NoElementFound>().is_some() => return Ok(Vec::new()),
            Err(err) => {
                return Err(SessionError::new(SessionFailureKind::Query, err.to_string()))
            }
        };
        elements
            .iter()
            .map(|element| {
                element
                    .get_inner_text()
                    .map(|text| ChromeElement {
                        context: context.clone(),
                        text,
                    })
                    .map_err(|err| {
                        SessionError::new(SessionFailureKind::StaleElement, err.to_string())
                    })
            })
            .collect()
    }

    fn element_text(&mut self, element: &ChromeElement) -> Result<String, SessionError> {
        if self.closed.contains(&element.context) {
            return Err(SessionError::new(
                SessionFailureKind::StaleElement,
                "element belongs to a closed tab",
            ));
        }
        Ok(element.text.clone())
    }

    fn open_in_new_context(
        &mut self,
        link: &ChromeLink,
        modifier: OpenModifier,
    ) -> Result<(), SessionError> {
        let tab = self.tab(&link.context)?;
        let before = self.tabs()?.len();
        {
            let elements = tab.find_elements_by_xpath(&link.xpath).map_err(|err| {
                SessionError::new(SessionFailureKind::StaleElement, err.to_string())
            })?;
            let element = elements.get(link.ordinal).ok_or_else(|| {
                SessionError::new(
                    SessionFailureKind::StaleElement,
                    format!("link {} is no longer on the page", link.ordinal),
                )
            })?;
            element
                .focus()
                .map_err(|err| SessionError::new(SessionFailureKind::Input, err.to_string()))?;
        }

        let key = match modifier {
            OpenModifier::Command => ModifierKey::Meta,
            OpenModifier::Control => ModifierKey::Ctrl,
        };
        tab.press_key_with_modifiers("Enter", Some(&[key]))
            .map_err(|err| SessionError::new(SessionFailureKind::Input, err.to_string()))?;

        self.wait_for_tab_count(before + 1)
    }

    fn list_contexts(&mut self) -> Result<Vec<ChromeContext>, SessionError> {
        Ok(self
            .tabs()?
            .iter()
            .map(|tab| ChromeContext(tab.get_target_id().to_string()))
            .collect())
    }

    fn set_active_context(&mut self, context: &ChromeContext) -> Result<(), SessionError> {
        let tab = self.tab(&context.0)?;
        tab.activate()
            .map_err(|err| SessionError::new(SessionFailureKind::ContextNotFound, err.to_string()))?;
        self.active = tab;
        Ok(())
    }

    fn close_active_context(&mut self) -> Result<(), SessionError> {
        let id = self.active_id();
        if self.closed.contains(&id) {
            return Err(SessionError::new(
                SessionFailureKind::ContextNotFound,
                format!("tab {id} is already closed"),
            ));
        }
        self.active
            .close(true)
            .map_err(|err| SessionError::new(SessionFailureKind::ContextNotFound, err.to_string()))?;
        self.closed.insert(id);
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        crawler_info!("releasing browser session");
    }
}

fn count_by_xpath(tab: &Tab, xpath: &str) -> Result<usize, SessionError> {
    match tab.find_elements_by_xpath(xpath) {
        Ok(elements) => Ok(elements.len()),
        Err(err) if err.downcast_ref::<NoElementFound>().is_some() => Ok(0),
        Err(err) => Err(SessionError::new(SessionFailureKind::Query, err.to_string())),
    }
}

fn class_exact_xpath(classes: &[&str]) -> Option<String> {
    if classes.is_empty() {
        return None;
    }
    let predicate = classes
        .iter()
        .map(|class| format!("@class={}", xpath_literal(class)))
        .collect::<Vec<_>>()
        .join(" or ");
    Some(format!("//*[{predicate}]"))
}

/// Quote `value` as an XPath 1.0 string literal; XPath has no escape syntax,
/// so values holding both quote kinds are spliced together with `concat`.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect::<Vec<_>>()
        .join(", \"'\", ");
    format!("concat({parts})")
}
