//! Loft - a command-line tool with safe in-place self-upgrade.
//!
//! The core of this crate is the [`upgrade`] subsystem: it lets an installed
//! `loft` binary discover the latest published release, download the
//! platform-appropriate archive, extract the embedded executable, and
//! replace its own on-disk binary in place, with automatic rollback if the
//! replacement fails and privilege elevation when the install directory is
//! not writable.
//!
//! # Safety Model
//!
//! - Everything before the install step happens inside a scoped temporary
//!   directory that is removed on every exit path.
//! - The install step moves the old binary aside before writing the new
//!   one, so a failure at any point leaves a working binary at the
//!   executable path.
//! - An exclusive lock file beside the executable prevents concurrent
//!   upgrade invocations from racing on the backup.
//!
//! # Modules
//!
//! - [`cli`] - command-line parsing and the `upgrade` subcommand
//! - [`core`] - the typed error taxonomy and user-facing error display
//! - [`upgrade`] - the self-upgrade subsystem itself
//! - [`utils`] - progress reporting and other supporting pieces

pub mod cli;
pub mod core;
pub mod upgrade;
pub mod utils;
