//! Spinner shown while the summary is in its loading state.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

pub struct LoadingSpinner {
    bar: ProgressBar,
}

impl LoadingSpinner {
    #[must_use]
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(TICK);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Stop ticking and erase the spinner line.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
