//! Progress UI (byte progress bar) for archive downloads.

use std::io::{self, IsTerminal};

use ensdf_sync::{FetchObserver, NoProgress};
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner} [{elapsed_precise}] [{wide_bar}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

/// Draws download progress on stderr.
pub(crate) struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub(crate) fn new() -> Self {
        Self {
            bar: ProgressBar::no_length(),
        }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl FetchObserver for ProgressBarObserver {
    fn on_start(&self, declared_bytes: Option<u64>) {
        match declared_bytes {
            Some(total) => {
                self.bar.set_length(total);
                self.bar.set_style(
                    ProgressStyle::with_template(BAR_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
            }
            None => self.bar.set_style(
                ProgressStyle::with_template(SPINNER_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            ),
        }
    }

    fn on_progress(&self, bytes_so_far: u64) {
        self.bar.set_position(bytes_so_far);
    }

    fn on_finish(&self, _bytes_written: u64) {
        self.bar.finish_and_clear();
    }
}

/// Picks the observer for a run: a progress bar when requested and stderr is
/// a terminal, otherwise none.
pub(crate) fn progress_observer(show_progress: bool) -> Box<dyn FetchObserver> {
    if show_progress && io::stderr().is_terminal() {
        Box::new(ProgressBarObserver::new())
    } else {
        Box::new(NoProgress)
    }
}
