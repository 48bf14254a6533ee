//! Self-upgrade subsystem for the Loft binary.
//!
//! Lets an installed `loft` binary discover, fetch, and install a newer
//! release of itself, replacing its own on-disk executable in place while
//! the old process is still running, with rollback on failure and optional
//! privilege elevation.
//!
//! # Flow
//!
//! ```text
//! 1. Resolve executable path (symlinks followed)
//!    └── Directory unwritable and not elevated → re-run under sudo,
//!        propagate the child's exit code
//!
//! 2. Resolve latest release from the releases endpoint
//!    └── Normalized versions equal → "already up to date"
//!
//! 3. Select the platform asset (loft_<OS>_<Arch>.<tar.gz|zip>)
//!    └── No match → "no compatible release" for this OS/arch
//!
//! 4. Download into a scoped temp directory, extract, locate the
//!    embedded executable
//!
//! 5. Install: rename to .backup → copy new binary → restore mode →
//!    remove backup (copy failure restores the backup automatically)
//! ```
//!
//! Steps 1–4 leave no trace outside the temp directory, which is removed on
//! every exit path. Only step 5 touches the install location, under an
//! exclusive lock and with automatic rollback, so exactly one working binary
//! exists at the executable path at all times.
//!
//! # Module Structure
//!
//! - [`version`]: version string normalization and comparison
//! - [`release`]: release endpoint query and JSON decoding
//! - [`platform`]: OS/arch detection and asset selection
//! - [`download`]: streaming asset download
//! - [`archive`]: tar.gz/zip extraction and executable lookup
//! - [`installer`]: locked backup-and-restore binary replacement
//! - [`elevate`]: write-permission probing and sudo re-execution
//! - [`updater`]: orchestration of the whole flow

pub mod archive;
pub mod download;
pub mod elevate;
pub mod installer;
pub mod platform;
pub mod release;
pub mod updater;
pub mod version;

pub use platform::PlatformKey;
pub use release::{Release, ReleaseAsset};
pub use updater::{Updater, UpdaterConfig, UpgradeOutcome};
