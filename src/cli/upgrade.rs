//! The `loft upgrade` command.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::upgrade::{Updater, UpdaterConfig, UpgradeOutcome};
use crate::utils::progress::{ProgressReporter, Reporter, SilentReporter};

/// Command-line arguments for the upgrade command.
///
/// The command is deliberately flagless: it always moves to whatever the
/// release endpoint reports as latest, or reports that the running version
/// already matches. Process-wide `--version`/`--help` come from the root
/// command.
#[derive(Parser, Debug)]
pub struct UpgradeArgs {}

impl UpgradeArgs {
    /// Execute the upgrade and return the process exit code.
    ///
    /// Exit code 0 covers both a successful install and "already up to
    /// date". When the command re-ran itself under elevation, the returned
    /// code is the elevated child's exact exit code so automation observes
    /// the real outcome.
    pub async fn execute(self, quiet: bool) -> Result<i32> {
        let updater = Updater::new(UpdaterConfig::default())?;

        let reporter: Box<dyn Reporter> =
            if quiet { Box::new(SilentReporter) } else { Box::new(ProgressReporter::new()) };

        let outcome = updater.upgrade(reporter.as_ref()).await;
        reporter.clear();

        match outcome? {
            UpgradeOutcome::UpToDate => {
                if !quiet {
                    println!(
                        "{}",
                        format!(
                            "Already on the latest version ({})",
                            updater.current_version()
                        )
                        .green()
                    );
                }
                Ok(0)
            }
            UpgradeOutcome::Installed { version } => {
                if !quiet {
                    println!("{}", format!("Successfully upgraded to version {version}!").green());
                    println!("Run 'loft --version' to verify.");
                }
                Ok(0)
            }
            UpgradeOutcome::Elevated { code } => Ok(code),
        }
    }
}
