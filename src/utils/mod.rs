//! Supporting utilities shared across the CLI.

pub mod progress;

pub use progress::{ProgressReporter, Reporter, SilentReporter};
