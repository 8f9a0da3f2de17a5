//! `didly-tui`: terminal dashboard for DID phone numbers.
//!
//! Two screens, Search and My Numbers, on top of the same `Session` the
//! CLI uses. Every purchase, configuration change, and release goes
//! through a confirmation popup first. Backend health is shown in the
//! status bar and refreshed in the background.
//!
//! Logs go to a file (default under the didly data directory) so they
//! never land on the terminal being drawn.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Section;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use didly_core::{Session, SessionConfig};

use crate::app::App;

/// Terminal dashboard for searching, buying, and managing DID numbers.
#[derive(Parser, Debug)]
#[command(name = "didly-tui", version, about)]
struct Cli {
    /// Profile from the didly config file
    #[arg(short, long, env = "DIDLY_PROFILE")]
    profile: Option<String>,

    /// Use the seeded in-memory backend instead of a real one
    #[arg(long, env = "DIDLY_DEMO")]
    demo: bool,

    /// Log file path (defaults to didly-tui.log in the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Hold the returned guard until exit so buffered
/// lines get flushed.
fn setup_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("didly_tui={level},didly_core={level}")));

    let path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| didly_config::data_dir().join("didly-tui.log"));
    let dir = path
        .parent()
        .map_or_else(std::env::temp_dir, std::path::Path::to_path_buf);
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("cannot create log directory {}", dir.display()))?;
    let file_name = path
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("didly-tui.log"));

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, file_name));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Ok(guard)
}

/// `--demo` first, then the selected (or default) profile.
fn session_config(cli: &Cli) -> Result<SessionConfig> {
    let cfg = didly_config::load_config_or_default();
    if cli.demo {
        return Ok(didly_config::demo_session_config(&cfg.defaults)?);
    }

    let name = cfg.active_profile_name(cli.profile.as_deref());
    let profile = cfg
        .profile(&name)
        .wrap_err_with(|| format!("no usable profile '{name}'"))
        .suggestion("create one with `didly config init`, or pass --demo")?;
    let config = didly_config::profile_to_session_config(profile, &name, &cfg.defaults)
        .wrap_err_with(|| format!("profile '{name}' is incomplete"))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal switches modes.
    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli)?;

    let config = session_config(&cli)?;
    let session = Session::new(config)?;
    info!(backend = %session.backend_label(), "starting didly-tui");

    let mut app = App::new(session);
    app.run().await
}
