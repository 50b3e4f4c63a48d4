use anyhow::{Result, anyhow};
use chrono::Days;
use image::DynamicImage;
use rand::Rng;
use rand::seq::SliceRandom;
use ratatui::layout::{Position, Rect};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::Config;
use crate::constants::constants;
use crate::controller::{self, SubmitOutcome};
use crate::date_utils::{DateLocale, parse_iso_date};
use crate::display::DisplayMode;
use crate::feed::{DateBounds, DateRange, FeedStore, LoadOutcome};
use crate::gallery::GalleryView;
use crate::graphics::fit_to_cells;
use crate::media::{PreviewCache, fetch_image};
use crate::modal::ModalController;
use crate::surface::{DateRangeInput, Selection, Status, StatusSink};
use crate::theme::{THEMES, Theme};

const PREVIEW_CACHE_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Start,
  End,
  Gallery,
}

// --- Date inputs ---

/// Single-line `YYYY-MM-DD` text field.
#[derive(Debug, Default, Clone)]
pub struct DateField {
  pub text: String,
  /// Char index.
  pub cursor: usize,
}

impl DateField {
  pub fn set(&mut self, text: String) {
    self.cursor = text.chars().count();
    self.text = text;
  }

  pub fn clear(&mut self) {
    self.text.clear();
    self.cursor = 0;
  }

  /// Only digits and dashes make sense in an ISO date.
  pub fn insert(&mut self, c: char) {
    if !(c.is_ascii_digit() || c == '-') || self.text.chars().count() >= 10 {
      return;
    }
    let byte_idx = crate::input::char_to_byte_index(&self.text, self.cursor);
    self.text.insert(byte_idx, c);
    self.cursor += 1;
  }

  pub fn backspace(&mut self) {
    if self.cursor > 0 {
      self.cursor -= 1;
      let byte_idx = crate::input::char_to_byte_index(&self.text, self.cursor);
      self.text.remove(byte_idx);
    }
  }

  pub fn delete(&mut self) {
    if self.cursor < self.text.chars().count() {
      let byte_idx = crate::input::char_to_byte_index(&self.text, self.cursor);
      self.text.remove(byte_idx);
    }
  }

  pub fn left(&mut self) {
    self.cursor = self.cursor.saturating_sub(1);
  }

  pub fn right(&mut self) {
    self.cursor = (self.cursor + 1).min(self.text.chars().count());
  }

  /// Move the date by `delta` days, staying within `bounds`. An empty or invalid
  /// field starts from the newest available day.
  pub fn step(&mut self, delta: i64, bounds: Option<DateBounds>) {
    let Some(current) = parse_iso_date(&self.text).or(bounds.map(|b| b.max)) else { return };
    let moved = if delta >= 0 {
      current.checked_add_days(Days::new(delta.unsigned_abs()))
    } else {
      current.checked_sub_days(Days::new(delta.unsigned_abs()))
    };
    let Some(mut next) = moved else { return };
    if let Some(bounds) = bounds {
      next = bounds.clamp(next);
    }
    self.set(next.format("%Y-%m-%d").to_string());
  }
}

/// Start/end inputs bounded by the feed's observed dates.
#[derive(Debug, Default)]
pub struct RangeForm {
  pub start: DateField,
  pub end: DateField,
  pub bounds: Option<DateBounds>,
}

impl DateRangeInput for RangeForm {
  fn selection(&self) -> Selection {
    Selection { start: self.start.text.clone(), end: self.end.text.clone() }
  }

  fn set_bounds(&mut self, bounds: DateBounds) {
    self.bounds = Some(bounds);
  }

  fn set_range(&mut self, range: DateRange) {
    self.start.set(range.start.format("%Y-%m-%d").to_string());
    self.end.set(range.end.format("%Y-%m-%d").to_string());
  }

  fn clear(&mut self) {
    self.start.clear();
    self.end.clear();
  }
}

#[derive(Debug)]
pub struct StatusLine {
  pub status: Status,
}

impl StatusSink for StatusLine {
  fn set_status(&mut self, status: Status) {
    self.status = status;
  }
}

// --- Background work ---

struct PendingImage {
  url: String,
  rx: oneshot::Receiver<Result<DynamicImage>>,
  handle: JoinHandle<()>,
}

impl PendingImage {
  fn spawn(client: &Client, url: String) -> Self {
    let client = client.clone();
    let task_url = url.clone();
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
      let _ = tx.send(fetch_image(&client, &task_url).await);
    });
    Self { url, rx, handle }
  }
}

/// Take a finished fetch out of `slot`, leaving unfinished ones in place.
fn poll_image(slot: &mut Option<PendingImage>) -> Option<(String, Result<DynamicImage>)> {
  let mut pending = slot.take()?;
  match pending.rx.try_recv() {
    Ok(result) => Some((pending.url, result)),
    Err(oneshot::error::TryRecvError::Empty) => {
      *slot = Some(pending);
      None
    }
    Err(oneshot::error::TryRecvError::Closed) => Some((pending.url, Err(anyhow!("Image task failed.")))),
  }
}

#[derive(Default)]
struct AsyncTasks {
  load_rx: Option<oneshot::Receiver<LoadOutcome>>,
  preview: Option<PendingImage>,
  modal_image: Option<PendingImage>,
}

/// Image scaled for a given cell area, reused until the URL or area changes.
#[derive(Default)]
pub struct FittedImage {
  key: Option<(String, u16, u16)>,
  image: Option<DynamicImage>,
}

impl FittedImage {
  pub fn get_or_fit(&mut self, url: &str, source: &DynamicImage, area: Rect, mode: DisplayMode) -> &DynamicImage {
    let key = (url.to_string(), area.width, area.height);
    if self.key.as_ref() != Some(&key) {
      self.image = None;
      self.key = Some(key);
    }
    self.image.get_or_insert_with(|| fit_to_cells(source, area.width, area.height, mode))
  }

  pub fn clear(&mut self) {
    self.key = None;
    self.image = None;
  }
}

/// Screen regions from the last draw, for mouse hit-testing.
#[derive(Default)]
pub struct HitAreas {
  pub cards: Vec<(Rect, usize)>,
  pub start: Option<Rect>,
  pub end: Option<Rect>,
  pub submit: Option<Rect>,
  pub reset: Option<Rect>,
  pub modal: Option<Rect>,
  pub modal_close: Option<Rect>,
}

fn hit(rect: Option<Rect>, pos: Position) -> bool {
  rect.is_some_and(|r| r.contains(pos))
}

// --- App ---

pub struct AppOptions {
  pub store: Arc<FeedStore>,
  pub http: Client,
  pub locale: DateLocale,
  pub display_mode: DisplayMode,
  pub modal_enabled: bool,
  pub theme_index: usize,
  pub start: Option<String>,
  pub end: Option<String>,
}

pub struct App {
  pub focus: Focus,
  pub theme_index: usize,
  pub form: RangeForm,
  pub gallery: GalleryView,
  pub status: StatusLine,
  /// `None` when the overlay is disabled; activation then opens the browser.
  pub modal: Option<ModalController>,
  pub store: Arc<FeedStore>,
  pub locale: DateLocale,
  pub display_mode: DisplayMode,
  pub fact: String,
  pub previews: PreviewCache,
  pub fitted_preview: FittedImage,
  pub fitted_modal: FittedImage,
  pub hits: HitAreas,
  pub last_error: Option<String>,
  pub should_quit: bool,
  /// A submit is waiting for the feed to finish loading.
  pending_submit: bool,
  error_time: Option<Instant>,
  http: Client,
  tasks: AsyncTasks,
}

impl App {
  pub fn new(opts: AppOptions) -> Self {
    let mut form = RangeForm::default();
    if let Some(start) = opts.start {
      form.start.set(start);
    }
    if let Some(end) = opts.end {
      form.end.set(end);
    }

    Self {
      focus: Focus::Start,
      theme_index: opts.theme_index.min(THEMES.len() - 1),
      form,
      gallery: GalleryView::default(),
      status: StatusLine { status: Status::Prompt },
      modal: opts.modal_enabled.then(|| ModalController::new(opts.locale)),
      store: opts.store,
      locale: opts.locale,
      display_mode: opts.display_mode,
      fact: random_fact(),
      previews: PreviewCache::new(PREVIEW_CACHE_SIZE),
      fitted_preview: FittedImage::default(),
      fitted_modal: FittedImage::default(),
      hits: HitAreas::default(),
      last_error: None,
      should_quit: false,
      pending_submit: false,
      error_time: None,
      http: opts.http,
      tasks: AsyncTasks::default(),
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index is clamped in new() and wrapped in next_theme().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.save();
  }

  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.clear_error();
    }
  }

  pub fn modal_open(&self) -> bool {
    self.modal.as_ref().is_some_and(ModalController::is_open)
  }

  /// The gallery doesn't scroll or take focus while the overlay is up.
  pub fn background_locked(&self) -> bool {
    self.modal_open()
  }

  pub fn focused_field(&mut self) -> Option<&mut DateField> {
    match self.focus {
      Focus::Start => Some(&mut self.form.start),
      Focus::End => Some(&mut self.form.end),
      Focus::Gallery => None,
    }
  }

  pub fn cycle_focus(&mut self) {
    self.focus = match self.focus {
      Focus::Start => Focus::End,
      Focus::End if !self.gallery.is_empty() => Focus::Gallery,
      Focus::End | Focus::Gallery => Focus::Start,
    };
  }

  // --- Feed ---

  /// Spawn the feed load unless it is loaded or already on its way.
  pub fn start_load(&mut self) {
    if self.store.is_loaded() || self.tasks.load_rx.is_some() {
      return;
    }
    debug!(status = ?self.store.status(), "feed: starting load");
    self.status.set_status(Status::Loading);
    let store = Arc::clone(&self.store);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(store.load().await);
    });
    self.tasks.load_rx = Some(rx);
  }

  pub fn submit(&mut self) {
    self.clear_error();
    match controller::submit(&self.store, self.locale, &self.form, &mut self.gallery, &mut self.status) {
      SubmitOutcome::NeedsLoad => {
        self.pending_submit = true;
        self.start_load();
      }
      SubmitOutcome::Rendered(count) => {
        info!(count, "gallery: rendered");
        self.fitted_preview.clear();
        if count > 0 {
          self.focus = Focus::Gallery;
          self.request_preview();
        }
      }
      SubmitOutcome::Rejected(_) => {}
    }
  }

  pub fn reset(&mut self) {
    controller::reset(&mut self.form, &mut self.gallery, &mut self.status);
    self.pending_submit = false;
    self.fitted_preview.clear();
    self.focus = Focus::Start;
  }

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.load_rx.take() {
      match rx.try_recv() {
        Ok(outcome) => self.finish_load(outcome),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.load_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          warn!("feed: load task ended without a result");
          self.pending_submit = false;
          self.status.set_status(Status::LoadFailed);
        }
      }
    }

    if let Some((url, result)) = poll_image(&mut self.tasks.preview) {
      match result {
        Ok(image) => self.previews.insert(url, image),
        Err(e) => {
          debug!(url = %url, err = %format!("{:#}", e), "preview: fetch failed");
          self.previews.mark_failed(url);
        }
      }
    }
    self.request_preview();

    if let Some((url, result)) = poll_image(&mut self.tasks.modal_image) {
      match result {
        Ok(image) => {
          if let Some(modal) = self.modal.as_mut() {
            modal.attach_image(&url, image);
          }
        }
        Err(e) => warn!(url = %url, err = %format!("{:#}", e), "modal: media fetch failed"),
      }
    }
  }

  fn finish_load(&mut self, outcome: LoadOutcome) {
    controller::apply_load_outcome(
      &self.store,
      &outcome,
      constants().default_range_days,
      &mut self.form,
      &mut self.status,
    );
    if std::mem::take(&mut self.pending_submit) && self.store.is_loaded() {
      self.submit();
    }
  }

  // --- Previews ---

  /// Fetch the selected card's thumbnail if it isn't cached or already coming.
  pub fn request_preview(&mut self) {
    if self.tasks.preview.is_some() {
      return;
    }
    let Some(url) = self.gallery.selected().and_then(|c| c.thumbnail.url()).map(str::to_string) else { return };
    if self.previews.wants(&url) {
      self.tasks.preview = Some(PendingImage::spawn(&self.http, url));
    }
  }

  // --- Activation & modal ---

  pub fn activate_selected(&mut self) {
    if let Some(index) = self.gallery.list_state.selected() {
      self.activate(index);
    }
  }

  pub fn activate(&mut self, index: usize) {
    let Some(item) = self.gallery.cards.get(index).map(|c| c.item.clone()) else { return };
    self.gallery.select(index);

    if self.modal.is_none() {
      let url = item.url.clone().unwrap_or_default();
      if let Err(e) = browser::open_url(&url) {
        self.set_error(format!("{:#}", e));
      }
      return;
    }

    self.abort_modal_fetch();
    self.fitted_modal.clear();
    let Some(modal) = self.modal.as_mut() else { return };
    modal.open(&item);
    info!(date = %item.iso_date(), "modal: opened");

    let Some(still) = modal.view().and_then(|v| v.still_url()) else { return };
    if let Some(cached) = self.previews.get(&still).cloned() {
      modal.attach_image(&still, cached);
    } else {
      self.tasks.modal_image = Some(PendingImage::spawn(&self.http, still));
    }
  }

  pub fn close_modal(&mut self) {
    if self.modal.as_mut().is_some_and(ModalController::close) {
      debug!("modal: closed");
      self.abort_modal_fetch();
      self.fitted_modal.clear();
    }
  }

  fn abort_modal_fetch(&mut self) {
    if let Some(pending) = self.tasks.modal_image.take() {
      pending.handle.abort();
    }
  }

  pub fn open_modal_external(&mut self) {
    let url = self.modal.as_ref().and_then(|m| m.view()).and_then(|v| v.external_url()).map(str::to_string);
    if let Err(e) = browser::open_url(&url.unwrap_or_default()) {
      self.set_error(format!("{:#}", e));
    }
  }

  // --- Mouse ---

  /// Wheel scrolls the explanation while the overlay is up, the gallery otherwise.
  pub fn handle_scroll(&mut self, down: bool) {
    if let Some(modal) = self.modal.as_mut().filter(|m| m.is_open()) {
      if down { modal.scroll_down() } else { modal.scroll_up() }
      return;
    }
    if down { self.gallery.select_next() } else { self.gallery.select_prev() }
    self.request_preview();
  }

  pub fn handle_click(&mut self, column: u16, row: u16) {
    let pos = Position::new(column, row);

    if self.modal_open() {
      // Close control, or anywhere on the backdrop outside the dialog.
      if hit(self.hits.modal_close, pos) || !hit(self.hits.modal, pos) {
        self.close_modal();
      }
      return;
    }

    if let Some(&(_, index)) = self.hits.cards.iter().find(|(rect, _)| rect.contains(pos)) {
      self.focus = Focus::Gallery;
      self.activate(index);
    } else if hit(self.hits.start, pos) {
      self.focus = Focus::Start;
    } else if hit(self.hits.end, pos) {
      self.focus = Focus::End;
    } else if hit(self.hits.submit, pos) {
      self.submit();
    } else if hit(self.hits.reset, pos) {
      self.reset();
    }
  }
}

fn random_fact() -> String {
  pick_fact(&constants().facts, &mut rand::thread_rng())
}

fn pick_fact(facts: &[String], rng: &mut impl Rng) -> String {
  facts.choose(rng).map(|fact| format!("Did you know? {}", fact)).unwrap_or_default()
}
