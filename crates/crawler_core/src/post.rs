use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded metadata of one post: the page controls its shape, so it stays dynamic.
pub type Metadata = Map<String, Value>;

/// One extracted feed post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    metadata: Metadata,
    content: Vec<String>,
}

impl Post {
    pub fn new(metadata: Metadata, content: Vec<String>) -> Self {
        Self { metadata, content }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }
}
