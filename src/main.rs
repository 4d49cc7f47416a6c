mod app;
mod cache;
mod commands;
mod config;
mod dogapi;
mod event;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "d9s")]
#[command(about = "A terminal UI for browsing dog breeds, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/d9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Breed list page size
  #[arg(short, long)]
  page_size: Option<u32>,
}

/// Log to a file in the data directory; stdout belongs to the terminal UI.
/// Filtered via D9S_LOG (e.g. D9S_LOG=d9s=debug).
fn init_logging() -> Result<WorkerGuard> {
  let log_dir = dirs::data_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join("d9s");
  std::fs::create_dir_all(&log_dir)?;

  let appender = tracing_appender::rolling::never(log_dir, "d9s.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_env("D9S_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_logging()?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override page size if specified on command line
  let config = if let Some(page_size) = args.page_size {
    config::Config {
      page_size,
      ..config
    }
  } else {
    config
  };

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
