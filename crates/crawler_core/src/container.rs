use std::collections::BTreeMap;

use crate::layout::FeedLayout;
use crate::scan::StreamingContainerLocator;

#[cfg(feature = "dom-parser")]
use crate::dom::DomContainerLocator;

/// Attribute snapshot of one post container found in the feed markup.
///
/// Attribute names are lower-case; when an element repeats an attribute the
/// first occurrence wins, matching how HTML parsers treat duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostContainer {
    attributes: BTreeMap<String, String>,
}

impl PostContainer {
    pub fn from_attributes<I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = BTreeMap::new();
        for (name, value) in attributes {
            map.entry(name.to_ascii_lowercase()).or_insert(value);
        }
        Self { attributes: map }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Finds post containers in rendered feed markup, in document order.
///
/// Implementations never fail: markup they cannot make sense of simply
/// contributes no containers.
pub trait ContainerLocator {
    fn locate(&self, markup: &str) -> Vec<PostContainer>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    /// Full DOM parse (requires the `dom-parser` feature).
    Dom,
    /// Tag-by-tag scan without a parser dependency.
    Streaming,
}

impl Default for LocatorStrategy {
    fn default() -> Self {
        if cfg!(feature = "dom-parser") {
            LocatorStrategy::Dom
        } else {
            LocatorStrategy::Streaming
        }
    }
}

impl LocatorStrategy {
    /// Build the locator for this strategy. `Dom` falls back to streaming
    /// when the crate was built without `dom-parser`.
    pub fn build(self, layout: &FeedLayout) -> Box<dyn ContainerLocator> {
        match self {
            #[cfg(feature = "dom-parser")]
            LocatorStrategy::Dom => Box::new(DomContainerLocator::new(layout)),
            #[cfg(not(feature = "dom-parser"))]
            LocatorStrategy::Dom => Box::new(StreamingContainerLocator::new(layout)),
            LocatorStrategy::Streaming => Box::new(StreamingContainerLocator::new(layout)),
        }
    }
}

/// True when every required token appears in the whitespace-separated class list.
pub(crate) fn has_class_tokens(class_attr: &str, required: &[String]) -> bool {
    let tokens: Vec<&str> = class_attr.split_ascii_whitespace().collect();
    required.iter().all(|needed| tokens.contains(&needed.as_str()))
}
