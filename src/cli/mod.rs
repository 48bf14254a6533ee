//! Command-line interface for Loft.
//!
//! Defines the root [`Cli`] parser, the [`Commands`] enum, and logging
//! setup. Each subcommand returns the process exit code up through normal
//! call returns; `main` is the single point that actually terminates the
//! process, which keeps command logic (including the elevation path)
//! unit-testable.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub mod upgrade;

/// Root command-line parser for the `loft` binary.
#[derive(Parser)]
#[command(
    name = "loft",
    version,
    about = "Loft - a command-line tool with safe in-place self-upgrade",
    propagate_version = true
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors, for automation.
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Upgrade loft to the latest released version
    Upgrade(upgrade::UpgradeArgs),
}

impl Cli {
    /// Execute the parsed command and return the process exit code.
    pub async fn execute(self) -> Result<i32> {
        self.init_logging();

        match self.command {
            Commands::Upgrade(cmd) => cmd.execute(self.quiet).await,
        }
    }

    /// Initialize tracing from the CLI flags and `RUST_LOG`.
    ///
    /// `--verbose` forces debug level, `--quiet` disables logging entirely,
    /// and otherwise `RUST_LOG` decides (silent when unset).
    fn init_logging(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            return;
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn upgrade_subcommand_parses() {
        let cli = Cli::try_parse_from(["loft", "upgrade"]).unwrap();
        assert!(matches!(cli.command, Commands::Upgrade(_)));
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["loft", "upgrade", "--verbose", "--quiet"]).is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["loft", "upgrade", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }
}
