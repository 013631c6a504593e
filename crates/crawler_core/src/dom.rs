use scraper::{Html, Selector};

use crate::container::{has_class_tokens, ContainerLocator, PostContainer};
use crate::layout::FeedLayout;

/// Container discovery over a full DOM parse of the feed page.
#[derive(Debug, Clone)]
pub struct DomContainerLocator {
    tag: String,
    classes: Vec<String>,
}

impl DomContainerLocator {
    pub fn new(layout: &FeedLayout) -> Self {
        Self {
            tag: layout.container_tag.to_ascii_lowercase(),
            classes: layout.container_classes.clone(),
        }
    }
}

impl ContainerLocator for DomContainerLocator {
    fn locate(&self, markup: &str) -> Vec<PostContainer> {
        let document = Html::parse_document(markup);
        let Ok(selector) = Selector::parse(&self.tag) else {
            return Vec::new();
        };

        document
            .select(&selector)
            .filter(|element| {
                element
                    .value()
                    .attr("class")
                    .is_some_and(|class| has_class_tokens(class, &self.classes))
            })
            .map(|element| {
                PostContainer::from_attributes(
                    element
                        .value()
                        .attrs()
                        .map(|(name, value)| (name.to_string(), value.to_string())),
                )
            })
            .collect()
    }
}
