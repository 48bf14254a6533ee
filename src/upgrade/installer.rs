//! In-place binary replacement with backup and rollback.
//!
//! The install sequence is rename-then-copy: the running executable is moved
//! aside to `<exe>.backup`, the new binary's bytes are copied to the original
//! path, the original file mode is restored, and the backup is removed. If
//! the copy fails, the backup is renamed back before the error is surfaced,
//! so at every observable point exactly one file exists at the executable
//! path and it is either the new binary or the original one. A crash between
//! rename and copy still leaves the recoverable backup on disk, which is why
//! this order is used instead of remove-then-copy.
//!
//! An exclusive lock file beside the executable guards the whole sequence so
//! two concurrent upgrade invocations cannot race on the backup path.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::core::UpgradeError;

/// Exclusive lock held for the duration of the install step.
///
/// Backed by an OS file lock (`flock` on Unix, `LockFile` on Windows) on a
/// `<exe>.upgrade.lock` sibling of the executable. The lock is released when
/// this is dropped; the lock file itself is left in place. Removing it would
/// race a contender that already opened the same inode, leaving it locked on
/// an orphaned file while a third invocation locks a fresh one. A lingering
/// unlocked file never blocks acquisition.
pub struct InstallLock {
    _file: File,
    path: PathBuf,
}

impl InstallLock {
    /// Try to acquire the install lock for the given executable.
    ///
    /// # Errors
    ///
    /// [`UpgradeError::AlreadyInProgress`] if another invocation holds the
    /// lock, [`UpgradeError::Io`] if the lock file cannot be created.
    pub fn acquire(exec_path: &Path) -> Result<Self, UpgradeError> {
        let path = sibling_with_suffix(exec_path, ".upgrade.lock");
        let file =
            OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;

        let acquired = file.try_lock_exclusive()?;
        if !acquired {
            return Err(UpgradeError::AlreadyInProgress {
                lock_path: path.display().to_string(),
            });
        }

        debug!("acquired install lock at {}", path.display());
        Ok(Self { _file: file, path })
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        #[allow(unstable_name_collisions)]
        if let Err(err) = self._file.unlock() {
            warn!("failed to unlock {}: {err}", self.path.display());
        }
    }
}

/// The backup path used during installation: the executable path with a
/// `.backup` suffix appended to its file name.
#[must_use]
pub fn backup_path(exec_path: &Path) -> PathBuf {
    sibling_with_suffix(exec_path, ".backup")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    sibling.set_file_name(format!(
        "{}{suffix}",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));
    sibling
}

/// Replace the executable at `exec_path` with the binary at `new_binary`.
///
/// On success the new bytes sit at `exec_path` with the original file mode
/// and no backup remains. On copy failure the original binary is restored
/// from its backup and [`UpgradeError::InstallFailed`] is returned. A chmod
/// failure after a successful copy is logged but not treated as fatal;
/// rolling back a correctly installed binary over a permission detail would
/// be a worse outcome.
///
/// This step is not cancellable: once entered it runs to completion, success
/// or rollback.
pub async fn install(exec_path: &Path, new_binary: &Path) -> Result<(), UpgradeError> {
    let _lock = InstallLock::acquire(exec_path)?;

    let metadata = fs::metadata(exec_path).await?;
    let backup = backup_path(exec_path);

    info!("installing {} over {}", new_binary.display(), exec_path.display());

    // Commit point: the stable binary leaves its original location.
    fs::rename(exec_path, &backup).await?;

    if let Err(copy_err) = fs::copy(new_binary, exec_path).await {
        warn!("install copy failed: {copy_err}; restoring previous binary");

        // A failed copy can leave a partial file at the target.
        let _ = fs::remove_file(exec_path).await;
        if let Err(restore_err) = fs::rename(&backup, exec_path).await {
            error!(
                "failed to restore previous binary from {}: {restore_err}",
                backup.display()
            );
        }
        return Err(UpgradeError::InstallFailed { source: copy_err });
    }

    // Cosmetic from here on: the new binary is already in place.
    if let Err(err) = fs::set_permissions(exec_path, metadata.permissions()).await {
        warn!("could not restore permissions on {}: {err}", exec_path.display());
    }

    if let Err(err) = fs::remove_file(&backup).await {
        debug!("could not remove backup {}: {err}", backup.display());
    }

    info!("install complete");
    Ok(())
}
