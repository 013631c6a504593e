//! Crawler core: post discovery, metadata decoding and the extraction engine.
mod container;
#[cfg(feature = "dom-parser")]
mod dom;
mod engine;
mod layout;
mod metadata;
mod post;
mod progress;
mod query;
mod scan;
mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use container::{ContainerLocator, LocatorStrategy, PostContainer};
#[cfg(feature = "dom-parser")]
pub use dom::DomContainerLocator;
pub use engine::{CrawlError, ExtractionState, PostExtractionEngine};
pub use layout::FeedLayout;
pub use metadata::{decode_metadata, MetadataParseError};
pub use post::{Metadata, Post};
pub use progress::{ExtractionEvent, NoopProgress, ProgressSink};
pub use query::{collect_links, extract_content};
pub use scan::StreamingContainerLocator;
pub use session::{BrowserSession, OpenModifier, SessionError, SessionFailureKind};
