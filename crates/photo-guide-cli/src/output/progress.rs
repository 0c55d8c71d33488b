//! Progress spinner adapter using indicatif.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use photo_guide_core::{ProgressEvent, ProgressSink};

/// Spinner on stderr while requests are in flight.
#[derive(Clone)]
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    /// Creates a new spinner.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, draw the spinner; otherwise stay silent
    #[must_use]
    pub fn new(quiet: bool, show_bar: bool) -> Self {
        if quiet || !show_bar {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
        {
            bar.set_style(style);
        }
        Self { bar: Some(bar) }
    }

    fn start(&self, message: String) {
        if let Some(bar) = &self.bar {
            if bar.is_finished() {
                bar.reset();
            }
            bar.set_message(message);
            bar.enable_steady_tick(Duration::from_millis(100));
        }
    }

    fn clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for Spinner {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Uploading { file_name, bytes } => {
                self.start(format!("Uploading {file_name} ({} KiB)", bytes.div_ceil(1024)));
            }
            ProgressEvent::Analyzing => self.start("Analyzing composition...".to_string()),
            ProgressEvent::Generating => self.start("Generating improved image...".to_string()),
            ProgressEvent::Analyzed { .. }
            | ProgressEvent::Generated { .. }
            | ProgressEvent::Failed { .. } => self.clear(),
        }
    }
}
