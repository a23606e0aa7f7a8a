use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over the documents of one collection.
///
/// Hidden in quiet mode or when stderr is not a TTY.
pub struct AuditProgress {
    progress_bar: ProgressBar,
}

impl AuditProgress {
    #[must_use]
    pub fn new(collection: &str, total: u64, quiet: bool) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self::new_with_visibility(collection, total, quiet, is_tty)
    }

    fn new_with_visibility(collection: &str, total: u64, quiet: bool, is_tty: bool) -> Self {
        let progress_bar = if quiet || !is_tty {
            ProgressBar::hidden()
        } else {
            Self::create_visible_progress_bar(collection, total)
        };
        Self { progress_bar }
    }

    fn create_visible_progress_bar(collection: &str, total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} documents")
                // SAFETY: Template is a static string with valid format specifiers
                .expect("valid template")
                .progress_chars("█▓░"),
        );
        pb.set_prefix(collection.to_string());
        pb
    }

    pub fn inc(&self) {
        self.progress_bar.inc(1);
    }

    /// Run `f` with the bar temporarily cleared so printed lines stay intact.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        self.progress_bar.suspend(f);
    }

    pub fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
