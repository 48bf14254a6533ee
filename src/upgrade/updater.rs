//! Upgrade orchestration.
//!
//! [`Updater`] wires the leaf components into the single `upgrade` operation
//! the CLI exposes: resolve the running executable's real path, check write
//! permission on its directory (re-running elevated when necessary), resolve
//! the latest release, compare versions, then download, extract, and install
//! inside a scoped temporary directory that is removed on every exit path.
//!
//! The running binary's version is injected through [`UpdaterConfig`] rather
//! than read from global state, so the whole flow is testable with arbitrary
//! versions and a mock endpoint. Cancellation (dropping the future) is safe
//! at any point before the install step; the install itself is a short
//! sequential rename/copy/chmod that runs to completion once entered.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::core::UpgradeError;
use crate::upgrade::archive::ArchiveFormat;
use crate::upgrade::platform::{PlatformKey, select_asset};
use crate::upgrade::release::ReleaseResolver;
use crate::upgrade::{download, elevate, installer, version};
use crate::utils::progress::Reporter;

/// Releases endpoint for the official Loft repository.
pub const DEFAULT_RELEASE_ENDPOINT: &str =
    "https://api.github.com/repos/loftlabs/loft/releases/latest";

/// Product name: release assets and the embedded executable are named
/// after it.
pub const PRODUCT_NAME: &str = "loft";

/// Default deadline applied to each network call so an unresponsive server
/// cannot hang the command forever.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one [`Updater`].
///
/// Every value the flow depends on is explicit here; nothing is read from
/// process-wide state.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Releases endpoint queried for the latest release descriptor
    pub endpoint: String,
    /// Product name used to derive asset and executable names
    pub product: String,
    /// Version string of the running binary
    pub current_version: String,
    /// Per-request network deadline
    pub timeout: Duration,
    /// Override for the executable path to replace; `None` resolves the
    /// running executable (symlinks followed). Used by tests.
    pub exec_path: Option<PathBuf>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RELEASE_ENDPOINT.to_string(),
            product: PRODUCT_NAME.to_string(),
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            timeout: DEFAULT_TIMEOUT,
            exec_path: None,
        }
    }
}

/// Terminal result of one upgrade invocation.
#[derive(Debug)]
pub enum UpgradeOutcome {
    /// The running version already matches the latest release
    UpToDate,
    /// A new binary was downloaded and installed
    Installed {
        /// The release tag that was installed
        version: String,
    },
    /// The command was re-run under elevation; the child has finished and
    /// the caller should exit with this code
    Elevated {
        /// Exit code of the elevated child process
        code: i32,
    },
}

/// Performs the end-to-end self-upgrade.
pub struct Updater {
    config: UpdaterConfig,
    client: reqwest::Client,
}

impl Updater {
    /// Build an updater from the given configuration.
    ///
    /// # Errors
    ///
    /// [`UpgradeError::Network`] if the HTTP client cannot be constructed.
    pub fn new(config: UpdaterConfig) -> Result<Self, UpgradeError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", config.product, config.current_version))
            .timeout(config.timeout)
            .build()
            .map_err(|source| UpgradeError::Network {
                url: config.endpoint.clone(),
                source,
            })?;
        Ok(Self { config, client })
    }

    /// The version string this updater considers "current".
    #[must_use]
    pub fn current_version(&self) -> &str {
        &self.config.current_version
    }

    /// Run the full upgrade flow, reporting progress through `reporter`.
    ///
    /// # Errors
    ///
    /// Any [`UpgradeError`] from the underlying steps. Errors from steps
    /// before installation leave no on-disk changes; an install failure has
    /// already been rolled back when it surfaces.
    pub async fn upgrade(&self, reporter: &dyn Reporter) -> Result<UpgradeOutcome, UpgradeError> {
        let exec_path = self.resolve_exec_path()?;
        debug!("running executable resolved to {}", exec_path.display());

        let install_dir = exec_path.parent().ok_or_else(|| {
            UpgradeError::Io(std::io::Error::other("executable has no parent directory"))
        })?;

        if !elevate::is_dir_writable(install_dir) && !elevate::running_elevated() {
            reporter.clear();
            reporter.println("Elevated privileges required. Re-running with sudo...");
            let args: Vec<OsString> = std::env::args_os().skip(1).collect();
            let code = elevate::rerun_elevated(&exec_path, args).await?;
            return Ok(UpgradeOutcome::Elevated { code });
        }

        reporter.update("Checking for updates...");
        let release =
            ReleaseResolver::new(&self.client, &self.config.endpoint).fetch_latest().await?;

        if version::equal(&self.config.current_version, &release.tag_name) {
            info!("already on latest version {}", self.config.current_version);
            return Ok(UpgradeOutcome::UpToDate);
        }

        reporter.println(&format!("Current version: {}", self.config.current_version));
        reporter.println(&format!("Latest version:  {}", release.tag_name));

        let platform = PlatformKey::current().ok_or_else(|| UpgradeError::NoCompatibleAsset {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        })?;

        let asset = select_asset(&release, &platform, &self.config.product).ok_or_else(|| {
            UpgradeError::NoCompatibleAsset {
                os: platform.os.label().to_string(),
                arch: platform.arch.label().to_string(),
            }
        })?;

        // Scoped working directory, removed on every exit path below.
        let temp_dir = tempfile::Builder::new().prefix("loft-upgrade-").tempdir()?;
        let archive_path = temp_dir.path().join(&asset.name);

        reporter.update(&format!("Downloading {}...", asset.name));
        download::download(&self.client, &asset.browser_download_url, &archive_path).await?;

        reporter.update("Extracting...");
        let format = ArchiveFormat::detect(&archive_path)?;
        let expected = platform.executable_name(&self.config.product);
        let binary_path = {
            let archive_path = archive_path.clone();
            let dest = temp_dir.path().to_path_buf();
            tokio::task::spawn_blocking(move || format.extract(&archive_path, &dest, &expected))
                .await
                .map_err(|err| UpgradeError::Io(std::io::Error::other(err)))??
        };

        reporter.update("Installing...");
        installer::install(&exec_path, &binary_path).await?;

        info!("upgraded to {}", release.tag_name);
        Ok(UpgradeOutcome::Installed { version: release.tag_name.clone() })
    }

    fn resolve_exec_path(&self) -> Result<PathBuf, UpgradeError> {
        match &self.config.exec_path {
            Some(path) => Ok(path.clone()),
            None => {
                let exe = std::env::current_exe()?;
                // Canonicalize resolves symlinked install locations; fall
                // back to the raw path if resolution fails.
                Ok(std::fs::canonicalize(&exe).unwrap_or(exe))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_the_official_repo() {
        let config = UpdaterConfig::default();
        assert_eq!(config.endpoint, DEFAULT_RELEASE_ENDPOINT);
        assert_eq!(config.product, "loft");
        assert_eq!(config.current_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.exec_path.is_none());
    }

    #[test]
    fn updater_reports_injected_version() {
        let config = UpdaterConfig {
            current_version: "9.9.9-test".to_string(),
            ..UpdaterConfig::default()
        };
        let updater = Updater::new(config).unwrap();
        assert_eq!(updater.current_version(), "9.9.9-test");
    }
}
