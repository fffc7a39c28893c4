//! Terminal progress bar for index harvests.

use cdx_client::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

/// Page-level progress bar. Hidden entirely in quiet mode.
pub struct HarvestProgress {
    bar: Option<ProgressBar>,
}

impl HarvestProgress {
    pub fn new(quiet: bool) -> Self {
        let bar = (!quiet).then(|| {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });
        Self { bar }
    }
}

impl ProgressSink for HarvestProgress {
    fn begin(&self, total_pages: u32) {
        if let Some(pb) = &self.bar {
            pb.set_length(u64::from(total_pages));
            pb.set_position(0);
        }
    }

    fn page_done(&self, completed: u32, _total: u32) {
        if let Some(pb) = &self.bar {
            pb.set_position(u64::from(completed));
        }
    }

    fn finish(&self) {
        if let Some(pb) = &self.bar {
            pb.finish_and_clear();
        }
    }
}

impl Drop for HarvestProgress {
    fn drop(&mut self) {
        // Don't leave a dangling bar behind when a harvest errors out
        if let Some(pb) = &self.bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}
