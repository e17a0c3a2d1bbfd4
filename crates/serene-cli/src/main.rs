//! `serene`: inspect and change the wellness appearance from a terminal.

mod app;
mod cli;
mod config;
mod render;

use std::io;

use anyhow::Result;
use clap::Parser;
use serene_appearance::env::OsPreference;
use tracing_subscriber::EnvFilter;

use crate::app::Output;
use crate::cli::Cli;
use crate::config::Settings;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings =
        Settings::load(cli.config.as_deref())?.with_overrides(cli.data_dir.clone(), cli.user.clone());
    tracing::debug!(?settings, "settings loaded");

    let signal = OsPreference::new().with_poll_interval(settings.poll_interval());
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let mut output = Output {
        out: &mut stdout,
        err: &mut stderr,
        json: cli.json,
    };
    app::run(&cli.command, &settings, signal, &mut output)
}
