//! Progress reporting functionality
//!
//! Progress bars are drawn on stderr so the report on stdout stays clean.

use crate::core::parallel::ProgressUpdate;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;
use std::sync::Arc;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";

/// Progress reporter for long-running operations
pub struct ProgressReporter {
    enabled: bool,
    bar: Option<ProgressBar>,
    current_operation: Mutex<String>,
}

impl ProgressReporter {
    /// Create a new progress reporter; a disabled reporter draws nothing
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            let style = ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            bar.set_style(style);
            Some(bar)
        } else {
            None
        };

        Self {
            enabled,
            bar,
            current_operation: Mutex::new(String::new()),
        }
    }

    /// Start a new progress operation
    pub fn start(&self, operation: &str) {
        if let Some(bar) = &self.bar {
            bar.reset();
            bar.set_message(operation.to_string());
        }
        *self.current_operation.lock() = operation.to_string();
        tracing::debug!("starting: {}", operation);
    }

    /// Update progress
    pub fn update(&self, current: usize, total: usize, message: &str) {
        let Some(bar) = &self.bar else {
            return;
        };

        {
            let mut operation = self.current_operation.lock();
            // a new stage restarts the bar
            let stage = message.split(" (").next().unwrap_or(message);
            if stage != operation.as_str() {
                *operation = stage.to_string();
                bar.reset();
            }
        }

        bar.set_length(total as u64);
        bar.set_position(current as u64);
        bar.set_message(message.to_string());
    }

    /// Update progress from a ProgressUpdate
    pub fn update_from(&self, progress: ProgressUpdate) {
        self.update(progress.current, progress.total, &progress.message);
    }

    /// Finish the progress operation
    pub fn finish(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
        tracing::debug!("finished: {}", message);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The stage currently shown
    pub fn current_operation(&self) -> String {
        self.current_operation.lock().clone()
    }
}

/// Create a progress callback function that updates a ProgressReporter
pub fn create_progress_callback(reporter: Arc<ProgressReporter>) -> impl Fn(ProgressUpdate) + Send + Sync {
    move |progress: ProgressUpdate| {
        reporter.update_from(progress);
    }
}
