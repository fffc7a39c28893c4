/// Incremental progress for long harvests. Frontends implement this to show
/// how many index pages are done; it has no effect on results.
pub trait ProgressSink: Send + Sync {
    /// Called once the page count is known.
    fn begin(&self, _total_pages: u32) {}

    /// Called after each page, whether it succeeded or was abandoned.
    fn page_done(&self, _completed: u32, _total: u32) {}

    /// Called at the end, successful or not.
    fn finish(&self) {}
}

/// A no-op progress sink.
pub struct NoProgress;
impl ProgressSink for NoProgress {}
