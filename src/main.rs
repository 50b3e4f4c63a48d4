mod app;
mod browser;
mod config;
mod constants;
mod controller;
mod date_utils;
mod display;
mod error;
mod feed;
mod gallery;
mod graphics;
mod input;
mod logging;
mod media;
mod modal;
mod surface;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton, MouseEventKind},
    execute,
  },
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use app::{App, AppOptions};
use config::Config;
use constants::constants;
use date_utils::DateLocale;
use display::CliDisplayMode;
use feed::{FeedStore, HttpFeedSource};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// JSON feed to browse (default: the class APOD feed)
  #[arg(long)]
  feed_url: Option<String>,

  /// Display mode: 'auto', 'direct', or 'ascii' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Open items in the browser instead of the detail overlay
  #[arg(long)]
  no_modal: bool,

  /// Locale for displayed dates, e.g. 'fr_FR' (default: from the environment)
  #[arg(long)]
  locale: Option<String>,

  /// Prefill the start date (YYYY-MM-DD)
  #[arg(long)]
  start: Option<String>,

  /// Prefill the end date (YYYY-MM-DD)
  #[arg(long)]
  end: Option<String>,
}

// --- Main ---

fn restore_terminal() {
  let _ = execute!(std::io::stdout(), DisableMouseCapture);
  ratatui::restore();
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = logging::init_logging();

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    restore_terminal();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  execute!(std::io::stdout(), EnableMouseCapture).context("Failed to enable mouse capture")?;
  let result = run(&mut terminal, args).await;
  restore_terminal();
  if let Err(e) = &result {
    error!(err = %format!("{:#}", e), "apodview: exited with error");
  }
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let config = Config::load();
  let feed_url = args.feed_url.or(config.feed_url.clone()).unwrap_or_else(|| constants().feed_url.clone());
  let locale = DateLocale::resolve(args.locale.as_deref().or(config.locale.as_deref()));
  let display_mode = display::resolve_display_mode(args.display_mode);
  info!(feed = %feed_url, display = display_mode.label(), "apodview: starting");

  let http = reqwest::Client::builder()
    .user_agent(concat!("apodview/", env!("CARGO_PKG_VERSION")))
    .build()
    .context("Failed to build HTTP client")?;
  let store = Arc::new(FeedStore::new(Box::new(HttpFeedSource::new(http.clone(), feed_url))));

  let mut app = App::new(AppOptions {
    store,
    http,
    locale,
    display_mode,
    modal_enabled: !args.no_modal && config.modal_enabled(),
    theme_index: theme::theme_index(config.theme_name.as_deref()),
    start: args.start,
    end: args.end,
  });
  app.start_load();

  loop {
    app.check_pending();
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key_event(&mut app, key),
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
          app.handle_click(mouse.column, mouse.row);
        }
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::ScrollDown => app.handle_scroll(true),
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::ScrollUp => app.handle_scroll(false),
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!("apodview: quit");
  Ok(())
}
