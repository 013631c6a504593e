use crate::engine::ExtractionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionEvent {
    /// Containers and links found on the feed page.
    Scanned { containers: usize, links: usize },
    StageEntered(ExtractionState),
    PostExtracted { index: usize, content_blocks: usize },
}

pub trait ProgressSink {
    fn emit(&self, event: ExtractionEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _event: ExtractionEvent) {}
}
