// src/cli.rs

//! CLI argument parsing using `clap`.

use std::ffi::OsString;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `clientrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clientrun",
    version,
    about = "Run an external client program under a timeout and report pass/fail.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Clientrun.toml` in the current directory is used when it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Override `[run].timeout` (e.g. `30s`, `1000s`, `5m`).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CLIENTRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Send child output to the log at debug level instead of printing it.
    #[arg(long)]
    pub quiet: bool,

    /// Resolve and print the command and options, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run instead of the one in the config file.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<OsString>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_command_is_collected() {
        let args = CliArgs::try_parse_from([
            "clientrun",
            "--timeout",
            "5s",
            "--",
            "echo",
            "--not-a-flag",
        ])
        .unwrap();

        assert_eq!(args.timeout.as_deref(), Some("5s"));
        assert_eq!(
            args.command,
            vec![OsString::from("echo"), OsString::from("--not-a-flag")]
        );
        assert!(!args.dry_run);
    }

    #[test]
    fn no_command_by_default() {
        let args = CliArgs::try_parse_from(["clientrun", "--quiet"]).unwrap();
        assert!(args.command.is_empty());
        assert!(args.quiet);
        assert!(args.config.is_none());
    }
}
