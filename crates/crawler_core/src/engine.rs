use crawler_logging::{crawler_debug, crawler_info, crawler_trace, crawler_warn};
use thiserror::Error;

use crate::container::{ContainerLocator, LocatorStrategy};
use crate::layout::FeedLayout;
use crate::metadata::{decode_metadata, MetadataParseError};
use crate::post::Post;
use crate::progress::{ExtractionEvent, NoopProgress, ProgressSink};
use crate::query::{collect_links, extract_content};
use crate::session::{BrowserSession, OpenModifier, SessionError, SessionFailureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    Idle,
    Scanning,
    Decoding { index: usize },
    Navigating { index: usize },
    Extracting { index: usize },
    Closing { index: usize },
    Done,
    Failed,
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Metadata(#[from] MetadataParseError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Extracts every post of the feed page loaded in the session's active context.
///
/// The i-th post container of the markup is paired with the i-th "full story"
/// link; extra containers without a link are ignored. Each post is read in a
/// context of its own that is closed before the next post starts, and the
/// origin context is active again whenever `run` returns.
pub struct PostExtractionEngine<'a, S: BrowserSession> {
    session: &'a mut S,
    layout: FeedLayout,
    strategy: LocatorStrategy,
    tracker: StateTracker<'a>,
}

impl<'a, S: BrowserSession> PostExtractionEngine<'a, S> {
    pub fn new(session: &'a mut S) -> Self {
        Self {
            session,
            layout: FeedLayout::default(),
            strategy: LocatorStrategy::default(),
            tracker: StateTracker {
                state: ExtractionState::Idle,
                progress: &NoopProgress,
            },
        }
    }

    pub fn with_layout(mut self, layout: FeedLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_strategy(mut self, strategy: LocatorStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.tracker.progress = progress;
        self
    }

    pub fn state(&self) -> ExtractionState {
        self.tracker.state
    }

    /// Run one full pass over the current page. Any failure aborts the pass
    /// and drops the posts collected so far.
    pub fn run(&mut self) -> Result<Vec<Post>, CrawlError> {
        match self.run_pass() {
            Ok(posts) => {
                crawler_info!("extracted {} posts", posts.len());
                self.tracker.enter(ExtractionState::Done);
                Ok(posts)
            }
            Err(err) => {
                crawler_warn!("extraction aborted in {:?}: {}", self.tracker.state, err);
                self.tracker.enter(ExtractionState::Failed);
                Err(err)
            }
        }
    }

    fn run_pass(&mut self) -> Result<Vec<Post>, CrawlError> {
        self.tracker.enter(ExtractionState::Scanning);
        let origin = self
            .session
            .list_contexts()?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SessionError::new(SessionFailureKind::ContextNotFound, "session has no open context")
            })?;

        let markup = self.session.current_markup()?;
        let locator: Box<dyn ContainerLocator> = self.strategy.build(&self.layout);
        let containers = locator.locate(&markup);
        let links = collect_links(&mut *self.session, &self.layout.link_text)?;

        crawler_info!(
            "found {} post containers and {} links",
            containers.len(),
            links.len()
        );
        if links.len() < containers.len() {
            crawler_warn!(
                "{} containers have no matching link and will be skipped",
                containers.len() - links.len()
            );
        }
        self.tracker.progress.emit(ExtractionEvent::Scanned {
            containers: containers.len(),
            links: links.len(),
        });

        let modifier = OpenModifier::for_host();
        let content_classes = self.layout.content_class_refs();
        let mut posts = Vec::with_capacity(containers.len().min(links.len()));

        for (index, (container, link)) in containers.iter().zip(links.iter()).enumerate() {
            self.tracker.enter(ExtractionState::Decoding { index });
            let metadata = decode_metadata(container, &self.layout.metadata_attribute)?;

            self.tracker.enter(ExtractionState::Navigating { index });
            self.session.open_in_new_context(link, modifier)?;
            let mut detail = DetailContext::enter(&mut *self.session, origin.clone())?;

            self.tracker.enter(ExtractionState::Extracting { index });
            let content = extract_content(detail.session(), &content_classes)?;
            let content_blocks = content.len();
            posts.push(Post::new(metadata, content));

            self.tracker.enter(ExtractionState::Closing { index });
            detail.close()?;

            crawler_debug!("post {} extracted with {} content blocks", index, content_blocks);
            self.tracker.progress.emit(ExtractionEvent::PostExtracted {
                index,
                content_blocks,
            });
        }

        Ok(posts)
    }
}

struct StateTracker<'a> {
    state: ExtractionState,
    progress: &'a dyn ProgressSink,
}

impl StateTracker<'_> {
    fn enter(&mut self, state: ExtractionState) {
        crawler_trace!("{:?} -> {:?}", self.state, state);
        self.state = state;
        self.progress.emit(ExtractionEvent::StageEntered(state));
    }
}

/// Focus on a freshly opened detail context.
///
/// If the new context cannot be focused it is left open and only the origin
/// is refocused.
///
/// Dropping the guard without calling [`DetailContext::close`] still closes
/// the detail context and refocuses the origin; failures on that path are
/// only logged so the error that caused the early exit is the one reported.
struct DetailContext<'s, S: BrowserSession> {
    session: &'s mut S,
    origin: S::Context,
    released: bool,
}

impl<'s, S: BrowserSession> DetailContext<'s, S> {
    fn enter(session: &'s mut S, origin: S::Context) -> Result<Self, SessionError> {
        let detail = match session.list_contexts()?.pop() {
            Some(last) if last != origin => last,
            _ => {
                return Err(SessionError::new(
                    SessionFailureKind::ContextNotFound,
                    "link did not open a new browsing context",
                ))
            }
        };

        if let Err(err) = session.set_active_context(&detail) {
            // Only the active context can be closed, so an unfocusable one stays open.
            crawler_warn!("detail context {:?} could not be focused and is left open", detail);
            if let Err(refocus) = session.set_active_context(&origin) {
                crawler_warn!("failed to refocus origin context: {}", refocus);
            }
            return Err(err);
        }

        Ok(Self {
            session,
            origin,
            released: false,
        })
    }

    fn session(&mut self) -> &mut S {
        self.session
    }

    fn close(mut self) -> Result<(), SessionError> {
        self.released = true;
        let closed = self.session.close_active_context();
        let refocused = self.session.set_active_context(&self.origin);
        closed.and(refocused)
    }
}

impl<S: BrowserSession> Drop for DetailContext<'_, S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.session.close_active_context() {
            crawler_warn!("failed to close detail context: {}", err);
        }
        if let Err(err) = self.session.set_active_context(&self.origin) {
            crawler_warn!("failed to refocus origin context: {}", err);
        }
    }
}
