/// Structural signature of the feed page the crawler understands.
///
/// The defaults describe the mobile feed markup: posts are `div`s carrying
/// the `by di ds` class tokens with their metadata in `data-ft`, each post has
/// a "Full Story" link, and the detail page keeps body text in elements whose
/// class is exactly `bx` or `bv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLayout {
    pub container_tag: String,
    pub container_classes: Vec<String>,
    pub metadata_attribute: String,
    pub link_text: String,
    pub content_classes: Vec<String>,
}

impl Default for FeedLayout {
    fn default() -> Self {
        Self {
            container_tag: "div".to_string(),
            container_classes: vec!["by".to_string(), "di".to_string(), "ds".to_string()],
            metadata_attribute: "data-ft".to_string(),
            link_text: "Full Story".to_string(),
            content_classes: vec!["bx".to_string(), "bv".to_string()],
        }
    }
}

impl FeedLayout {
    pub fn content_class_refs(&self) -> Vec<&str> {
        self.content_classes.iter().map(String::as_str).collect()
    }
}
