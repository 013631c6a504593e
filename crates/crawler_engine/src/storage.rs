use std::path::{Path, PathBuf};

use crawler_core::Post;
use crawler_logging::crawler_info;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unable to serialize posts: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unable to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

/// Destination for the posts of a completed run.
pub trait PostSink {
    fn save_posts(&self, posts: &[Post]) -> Result<(), StorageError>;
}

/// Writes all posts as one pretty-printed JSON array, replacing the file.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    writer: AtomicFileWriter,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.writer.target()
    }
}

impl PostSink for JsonStorage {
    fn save_posts(&self, posts: &[Post]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(posts)?;
        self.writer
            .write(json.as_bytes())
            .map_err(|source| StorageError::Persist {
                path: self.path().to_path_buf(),
                source,
            })?;
        crawler_info!("saved {} posts to {:?}", posts.len(), self.path());
        Ok(())
    }
}
