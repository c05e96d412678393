//! Scan progress reporter
//!
//! Wraps indicatif for root-level scan feedback. The bar is only worth
//! drawing when the root is wide enough for the scan to take noticeable
//! time; the traversal engine applies that threshold.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over a scan root's immediate entries
pub struct ScanProgress {
    bar: ProgressBar,
}

impl ScanProgress {
    /// Create a visible bar over `total` root entries
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} items")
                .expect("Invalid template")
                .progress_chars("=> "),
        );
        bar.set_prefix("Scanning");
        Self { bar }
    }

    /// Create a no-op reporter
    pub fn disabled() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Record one processed root entry
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
