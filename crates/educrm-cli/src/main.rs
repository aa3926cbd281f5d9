//! `educrm` — terminal dashboard for the EduCRM enrollment server.
//!
//! # Usage
//!
//! ```
//! educrm --url http://localhost:3000
//! educrm --config ~/.config/educrm/config.toml
//! educrm --dump
//! ```

mod app;
mod cache;
mod client;
mod dump;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "educrm", about = "Terminal dashboard for the EduCRM server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the EduCRM server (default: http://localhost:3000).
  #[arg(long, env = "EDUCRM_URL")]
  url: Option<String>,

  /// Print every prospect and the section count, then exit.
  #[arg(long)]
  dump: bool,

  /// Write logs to this file. Without it nothing is logged, since the
  /// terminal belongs to the UI.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

fn init_logging(path: &Path) -> Result<()> {
  let file = File::create(path)
    .with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };
  tracing::info!(url = %api_config.base_url, "starting");

  let client = ApiClient::new(api_config)?;

  if args.dump {
    let (prospects, sections) =
      tokio::try_join!(client.list_prospects(), client.list_sections())?;
    print!("{}", dump::render(&prospects, &sections));
    return Ok(());
  }

  let mut app = App::new(client);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data.
  let load_result = app.refresh().await;

  // Run the event loop; restore terminal even on error.
  let run_result = if load_result.is_ok() {
    run_event_loop(&mut terminal, &mut app).await
  } else {
    load_result
  };

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      let cont = app.handle_key(key).await?;
      if !cont {
        break;
      }
    }
  }

  Ok(())
}
