//! Progress indicators and the status sink used by the upgrade flow.
//!
//! The upgrade subsystem reports progress through the [`Reporter`] trait so
//! callers decide how status lines are rendered. The CLI uses
//! [`ProgressReporter`], a spinner with consistent styling that automatically
//! disables itself in non-interactive environments; tests use
//! [`SilentReporter`].
//!
//! # Environment Variables
//!
//! - `LOFT_NO_PROGRESS`: set to any value to disable all progress indicators

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Checks if progress indicators should be disabled.
///
/// Useful for CI/CD environments, scripts, or when clean output is desired.
fn is_progress_disabled() -> bool {
    std::env::var("LOFT_NO_PROGRESS").is_ok()
}

/// Abstract sink for upgrade status and result messages.
///
/// The subsystem never prints directly; everything user-visible flows
/// through this trait.
pub trait Reporter: Send + Sync {
    /// Replace the current transient status message (e.g. a spinner suffix).
    fn update(&self, message: &str);

    /// Emit a persistent line that survives the transient status.
    fn println(&self, line: &str);

    /// Clear any transient status from the terminal.
    fn clear(&self);
}

/// Spinner-backed reporter for interactive terminals.
///
/// Renders a steady-tick spinner with the current status message. When
/// progress is disabled (or the spinner template cannot be built) it falls
/// back to a hidden bar that silently ignores all operations, keeping
/// automation output clean.
pub struct ProgressReporter {
    inner: ProgressBar,
}

impl ProgressReporter {
    /// Create a new spinner reporter.
    #[must_use]
    pub fn new() -> Self {
        let inner = if is_progress_disabled() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
            {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self { inner }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ProgressReporter {
    fn update(&self, message: &str) {
        self.inner.set_message(message.to_string());
    }

    fn println(&self, line: &str) {
        self.inner.println(line);
    }

    fn clear(&self) {
        self.inner.finish_and_clear();
    }
}

/// Reporter that swallows all output. Used in tests and quiet mode.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn update(&self, _message: &str) {}

    fn println(&self, _line: &str) {}

    fn clear(&self) {}
}
