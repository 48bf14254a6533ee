//! Core types shared across the Loft CLI.
//!
//! Currently this is the error layer: the typed [`UpgradeError`] taxonomy and
//! the [`ErrorContext`] display wrapper used at the CLI boundary.

pub mod error;

pub use error::{ErrorContext, UpgradeError, user_friendly_error};
