//! Loft CLI entry point.
//!
//! Handles argument parsing, error display, and process termination. This is
//! the only place the process exits: subcommands (including the privilege
//! elevation path, which must forward the elevated child's exit code) return
//! a typed exit code up through normal call returns.

use anyhow::Result;
use clap::Parser;
use loft_cli::cli;
use loft_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
