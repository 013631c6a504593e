//! Scripted in-memory browser session for tests.
//!
//! The fake serves one feed page from its origin context. Every link opened
//! from it creates a new context whose content blocks come from the next
//! scripted detail page. All calls are recorded so tests can assert on the
//! exact interaction with the session.

use std::collections::VecDeque;

use crate::session::{BrowserSession, OpenModifier, SessionError, SessionFailureKind};

pub const ORIGIN: ContextId = ContextId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeLink {
    pub context: ContextId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    pub context: ContextId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Navigate(String),
    CurrentMarkup,
    QueryByLinkText(String),
    QueryByClassExact(Vec<String>),
    ElementText,
    OpenInNewContext { link: usize, modifier: OpenModifier },
    ListContexts,
    SetActiveContext(ContextId),
    CloseActiveContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// The n-th (zero based) `open_in_new_context` call fails.
    Open(usize),
    /// The n-th (zero based) content query fails.
    ContentQuery(usize),
    /// The n-th (zero based) switch to a context other than the origin fails.
    Focus(usize),
}

#[derive(Debug)]
struct FakeContext {
    id: ContextId,
    blocks: Vec<String>,
}

#[derive(Debug)]
pub struct FakeSession {
    markup: String,
    link_text: String,
    link_count: usize,
    detail_pages: VecDeque<Vec<String>>,
    contexts: Vec<FakeContext>,
    active: ContextId,
    next_id: u32,
    opens: usize,
    content_queries: usize,
    focuses: usize,
    failure: Option<FailurePoint>,
    calls: Vec<SessionCall>,
}

impl FakeSession {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            link_text: "Full Story".to_string(),
            link_count: 0,
            detail_pages: VecDeque::new(),
            contexts: vec![FakeContext {
                id: ORIGIN,
                blocks: Vec::new(),
            }],
            active: ORIGIN,
            next_id: 1,
            opens: 0,
            content_queries: 0,
            focuses: 0,
            failure: None,
            calls: Vec::new(),
        }
    }

    /// Number of links on the feed page that match the link text.
    pub fn with_links(mut self, count: usize) -> Self {
        self.link_count = count;
        self
    }

    pub fn with_link_text(mut self, text: impl Into<String>) -> Self {
        self.link_text = text.into();
        self
    }

    /// Content blocks served by the next context opened from a link.
    pub fn with_detail_page<I, T>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.detail_pages
            .push_back(blocks.into_iter().map(Into::into).collect());
        self
    }

    pub fn failing_at(mut self, failure: FailurePoint) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn calls(&self) -> &[SessionCall] {
        &self.calls
    }

    pub fn active_context(&self) -> ContextId {
        self.active
    }

    pub fn open_contexts(&self) -> Vec<ContextId> {
        self.contexts.iter().map(|context| context.id).collect()
    }

    fn active(&self) -> Result<&FakeContext, SessionError> {
        self.contexts
            .iter()
            .find(|context| context.id == self.active)
            .ok_or_else(|| {
                SessionError::new(
                    SessionFailureKind::ContextNotFound,
                    format!("active context {:?} is closed", self.active),
                )
            })
    }
}

impl BrowserSession for FakeSession {
    type Link = FakeLink;
    type Element = FakeElement;
    type Context = ContextId;

    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.calls.push(SessionCall::Navigate(url.to_string()));
        Ok(())
    }

    fn current_markup(&mut self) -> Result<String, SessionError> {
        self.calls.push(SessionCall::CurrentMarkup);
        if self.active()?.id == ORIGIN {
            Ok(self.markup.clone())
        } else {
            Ok(String::new())
        }
    }

    fn query_by_link_text(&mut self, text: &str) -> Result<Vec<FakeLink>, SessionError> {
        self.calls.push(SessionCall::QueryByLinkText(text.to_string()));
        let context = self.active()?.id;
        if context != ORIGIN || text != self.link_text {
            return Ok(Vec::new());
        }
        Ok((0..self.link_count)
            .map(|index| FakeLink { context, index })
            .collect())
    }

    fn query_by_class_exact(&mut self, classes: &[&str]) -> Result<Vec<FakeElement>, SessionError> {
        self.calls.push(SessionCall::QueryByClassExact(
            classes.iter().map(|class| class.to_string()).collect(),
        ));
        let query = self.content_queries;
        self.content_queries += 1;
        if self.failure == Some(FailurePoint::ContentQuery(query)) {
            return Err(SessionError::new(
                SessionFailureKind::Query,
                format!("content query {query} failed"),
            ));
        }
        let context = self.active()?;
        Ok(context
            .blocks
            .iter()
            .map(|text| FakeElement {
                context: context.id,
                text: text.clone(),
            })
            .collect())
    }

    fn element_text(&mut self, element: &FakeElement) -> Result<String, SessionError> {
        self.calls.push(SessionCall::ElementText);
        if !self.contexts.iter().any(|context| context.id == element.context) {
            return Err(SessionError::new(
                SessionFailureKind::StaleElement,
                "element belongs to a closed context",
            ));
        }
        Ok(element.text.clone())
    }

    fn open_in_new_context(
        &mut self,
        link: &FakeLink,
        modifier: OpenModifier,
    ) -> Result<(), SessionError> {
        self.calls.push(SessionCall::OpenInNewContext {
            link: link.index,
            modifier,
        });
        let attempt = self.opens;
        self.opens += 1;
        if self.failure == Some(FailurePoint::Open(attempt)) {
            return Err(SessionError::new(
                SessionFailureKind::StaleElement,
                format!("link {} is stale", link.index),
            ));
        }
        if self.active != link.context || link.index >= self.link_count {
            return Err(SessionError::new(
                SessionFailureKind::StaleElement,
                format!("link {} is not on the active page", link.index),
            ));
        }

        let id = ContextId(self.next_id);
        self.next_id += 1;
        let blocks = self.detail_pages.pop_front().unwrap_or_default();
        self.contexts.push(FakeContext { id, blocks });
        Ok(())
    }

    fn list_contexts(&mut self) -> Result<Vec<ContextId>, SessionError> {
        self.calls.push(SessionCall::ListContexts);
        Ok(self.open_contexts())
    }

    fn set_active_context(&mut self, context: &ContextId) -> Result<(), SessionError> {
        self.calls.push(SessionCall::SetActiveContext(*context));
        if *context != ORIGIN {
            let attempt = self.focuses;
            self.focuses += 1;
            if self.failure == Some(FailurePoint::Focus(attempt)) {
                return Err(SessionError::new(
                    SessionFailureKind::ContextNotFound,
                    format!("context {context:?} refused focus"),
                ));
            }
        }
        if !self.contexts.iter().any(|open| open.id == *context) {
            return Err(SessionError::new(
                SessionFailureKind::ContextNotFound,
                format!("context {context:?} is not open"),
            ));
        }
        self.active = *context;
        Ok(())
    }

    fn close_active_context(&mut self) -> Result<(), SessionError> {
        self.calls.push(SessionCall::CloseActiveContext);
        let position = self
            .contexts
            .iter()
            .position(|context| context.id == self.active)
            .ok_or_else(|| {
                SessionError::new(SessionFailureKind::ContextNotFound, "active context is closed")
            })?;
        self.contexts.remove(position);
        Ok(())
    }
}
