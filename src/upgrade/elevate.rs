//! Privilege elevation for installs into protected directories.
//!
//! When the directory holding the running executable is not writable, the
//! upgrade is re-executed under `sudo` with the original arguments, with the
//! child's stdio wired to the current process so the user can answer the
//! password prompt. The child's exact exit code is returned to the caller
//! (never `process::exit` from in here): propagating it is the top-level
//! entry point's job, which keeps this logic testable.
//!
//! On Windows elevation cannot be automated this way, so the check fails
//! with an error instructing a manual re-run from an elevated terminal.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use tracing::{debug, info};
use which::which;

use crate::core::UpgradeError;

/// Check whether the current user can write to `dir` by creating and
/// removing a probe file.
#[must_use]
pub fn is_dir_writable(dir: &Path) -> bool {
    let probe = dir.join(".loft-write-probe");
    match std::fs::OpenOptions::new().create(true).write(true).open(&probe) {
        Ok(file) => {
            drop(file);
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Whether the process is already running with elevated privileges.
///
/// Effective UID 0 on Unix; always `false` on Windows, where the writability
/// probe alone decides.
#[must_use]
pub fn running_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Re-run the given executable under the system elevation helper and wait
/// for it to finish.
///
/// The child inherits stdin/stdout/stderr so elevation prompts reach the
/// user. Returns the child's exit code; the caller terminates the process
/// with it so automation observes the real outcome of the elevated attempt.
///
/// # Errors
///
/// [`UpgradeError::ElevationUnavailable`] when no helper exists (Windows, or
/// `sudo` missing from `PATH`); [`UpgradeError::Io`] if the child cannot be
/// spawned.
pub async fn rerun_elevated(
    exec_path: &Path,
    args: Vec<OsString>,
) -> Result<i32, UpgradeError> {
    if cfg!(windows) {
        return Err(UpgradeError::ElevationUnavailable {
            reason: "automatic elevation is not supported on Windows; \
                     re-run from an Administrator terminal"
                .to_string(),
        });
    }

    let sudo = which("sudo").map_err(|_| UpgradeError::ElevationUnavailable {
        reason: "sudo not found in PATH; re-run manually with elevated privileges".to_string(),
    })?;

    info!("re-running {} under {}", exec_path.display(), sudo.display());
    debug!(?args, "forwarding original arguments to elevated child");

    let status = tokio::process::Command::new(sudo)
        .arg(exec_path)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;

    // Terminated-by-signal has no code; report a generic failure in that case.
    Ok(status.code().unwrap_or(1))
}
