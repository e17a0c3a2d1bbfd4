//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manage the Serene wellness theme and color mode.
#[derive(Debug, Parser)]
#[command(name = "serene", version, about)]
pub struct Cli {
    /// Settings file (YAML).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding profiles and the local cache.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Act as this signed-in user.
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,

    /// Print machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current appearance and where it came from.
    Show,
    /// List the available wellness themes.
    Themes,
    /// Select a wellness theme.
    SetTheme {
        /// lavender, ocean, sunset, forest or moonlight.
        theme: String,
    },
    /// Select a color mode.
    Mode {
        /// light, dark or system.
        mode: String,
    },
    /// Switch to the explicit mode opposite the current scheme.
    Toggle,
    /// Follow OS appearance changes while in system mode.
    Watch {
        /// Stop after this many seconds (runs until interrupted if omitted).
        #[arg(long, value_name = "N")]
        seconds: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["serene", "set-theme", "ocean", "--user", "u1", "--json"])
            .unwrap();
        assert_eq!(cli.user.as_deref(), Some("u1"));
        assert!(cli.json);
        assert!(matches!(cli.command, Command::SetTheme { ref theme } if theme == "ocean"));
    }

    #[test]
    fn watch_seconds_is_optional() {
        let cli = Cli::try_parse_from(["serene", "watch", "--seconds", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Watch { seconds: Some(3) }));
    }
}
