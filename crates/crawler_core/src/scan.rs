//! Streaming start-tag scanner used when no DOM parser is compiled in.
//!
//! Only start tags matter for container discovery, so the scanner walks the
//! markup tag by tag, skipping comments, declarations, end tags and the bodies
//! of raw-text elements. A start tag that cannot be read to its closing `>`
//! is dropped.

use std::borrow::Cow;

use crate::container::{has_class_tokens, ContainerLocator, PostContainer};
use crate::layout::FeedLayout;

/// Elements whose body is text, not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
    // Pages are parsed with scripting on, so this is text as well.
    "noscript",
];

#[derive(Debug, Clone)]
pub struct StreamingContainerLocator {
    tag: String,
    classes: Vec<String>,
}

impl StreamingContainerLocator {
    pub fn new(layout: &FeedLayout) -> Self {
        Self {
            tag: layout.container_tag.to_ascii_lowercase(),
            classes: layout.container_classes.clone(),
        }
    }
}

impl ContainerLocator for StreamingContainerLocator {
    fn locate(&self, markup: &str) -> Vec<PostContainer> {
        scan_start_tags(markup)
            .into_iter()
            .filter(|tag| tag.name == self.tag)
            .map(|tag| PostContainer::from_attributes(tag.attributes))
            .filter(|container| {
                container
                    .attr("class")
                    .is_some_and(|class| has_class_tokens(class, &self.classes))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
    end: usize,
}

pub(crate) fn scan_start_tags(markup: &str) -> Vec<StartTag> {
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(rel) = markup[pos..].find('<') {
        let start = pos + rel;
        let rest = &markup[start..];

        if let Some(body) = rest.strip_prefix("<!--") {
            match body.find("-->") {
                Some(end) => pos = start + 4 + end + 3,
                None => break,
            }
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") || rest.starts_with("</") {
            match rest.find('>') {
                Some(end) => pos = start + end + 1,
                None => break,
            }
            continue;
        }

        match read_start_tag(markup, start + 1) {
            Some(tag) => {
                pos = tag.end;
                let raw_text = RAW_TEXT_ELEMENTS.contains(&tag.name.as_str());
                if raw_text && !tag.self_closing {
                    let closing = format!("</{}", tag.name);
                    match find_ignore_ascii_case(&markup[pos..], &closing) {
                        Some(rel) => pos += rel,
                        None => {
                            tags.push(tag);
                            break;
                        }
                    }
                }
                tags.push(tag);
            }
            // A bare `<` in text.
            None => pos = start + 1,
        }
    }

    tags
}

/// Read a start tag whose name begins at `pos` (just past `<`).
fn read_start_tag(markup: &str, pos: usize) -> Option<StartTag> {
    let bytes = markup.as_bytes();
    if !bytes.get(pos)?.is_ascii_alphabetic() {
        return None;
    }

    let mut i = pos;
    while i < bytes.len() && !is_tag_delimiter(bytes[i]) {
        i += 1;
    }
    let name = markup[pos..i].to_ascii_lowercase();

    let mut attributes = Vec::new();
    let mut self_closing = false;
    loop {
        i = skip_whitespace(bytes, i);
        match bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attributes,
                    self_closing,
                    end: i + 1,
                });
            }
            b'/' => {
                self_closing = bytes.get(i + 1) == Some(&b'>');
                i += 1;
                continue;
            }
            _ => self_closing = false,
        }

        let name_start = i;
        // The first character is always part of the name, even a stray `=`.
        i += 1;
        while i < bytes.len() && !is_tag_delimiter(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        let attr_name = markup[name_start..i].to_ascii_lowercase();

        let after_name = skip_whitespace(bytes, i);
        if bytes.get(after_name) != Some(&b'=') {
            attributes.push((attr_name, String::new()));
            i = after_name;
            continue;
        }

        i = skip_whitespace(bytes, after_name + 1);
        let raw_value = match *bytes.get(i)? {
            quote @ (b'"' | b'\'') => {
                let close = markup[i + 1..].find(quote as char)? + i + 1;
                let value = &markup[i + 1..close];
                i = close + 1;
                value
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &markup[value_start..i]
            }
        };
        attributes.push((attr_name, decode_attribute_value(raw_value).into_owned()));
    }
}

fn is_tag_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'/' || byte == b'>'
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Decode an attribute value the way an HTML parser reports it: line breaks
/// normalised to `\n`, then every numeric and named character reference resolved.
pub(crate) fn decode_attribute_value(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '\r']) {
        return Cow::Borrowed(raw);
    }
    if raw.contains('\r') {
        let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
        return Cow::Owned(html_escape::decode_html_entities(&normalized).into_owned());
    }
    html_escape::decode_html_entities(raw)
}
