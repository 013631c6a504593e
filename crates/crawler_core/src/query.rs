use crawler_logging::crawler_debug;

use crate::session::{BrowserSession, SessionError};

/// Collect the "full story" links of the active context, in document order.
pub fn collect_links<S: BrowserSession>(
    session: &mut S,
    link_text: &str,
) -> Result<Vec<S::Link>, SessionError> {
    let links = session.query_by_link_text(link_text)?;
    crawler_debug!("found {} links with text {:?}", links.len(), link_text);
    Ok(links)
}

/// Text of every element whose class is exactly one of `classes`, in document order.
pub fn extract_content<S: BrowserSession>(
    session: &mut S,
    classes: &[&str],
) -> Result<Vec<String>, SessionError> {
    let elements = session.query_by_class_exact(classes)?;
    elements
        .iter()
        .map(|element| session.element_text(element))
        .collect()
}
