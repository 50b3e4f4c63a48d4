//! Feed model, normalization and the write-once `FeedStore`.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::constants;
use crate::date_utils::{date_in_range, parse_iso_date};
use crate::error::FeedError;

// --- Model ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
  Image,
  Video,
  /// Missing or unrecognized `media_type`.
  Unknown,
}

impl MediaType {
  fn from_feed(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      Some("image") => MediaType::Image,
      Some("video") => MediaType::Video,
      _ => MediaType::Unknown,
    }
  }
}

/// One dated entry of the feed. Immutable once normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
  pub date: NaiveDate,
  pub title: Option<String>,
  pub media_type: MediaType,
  pub url: Option<String>,
  pub hd_url: Option<String>,
  pub thumbnail_url: Option<String>,
  pub explanation: Option<String>,
}

impl MediaItem {
  pub fn display_title(&self) -> &str {
    self.title.as_deref().unwrap_or("Untitled")
  }

  /// `YYYY-MM-DD`, the feed's own key format.
  pub fn iso_date(&self) -> String {
    self.date.format("%Y-%m-%d").to_string()
  }
}

/// Wire shape of a feed entry. Every field is optional; empty strings count as absent.
#[derive(Debug, Deserialize)]
struct RawItem {
  date: Option<String>,
  title: Option<String>,
  media_type: Option<String>,
  url: Option<String>,
  hdurl: Option<String>,
  thumbnail_url: Option<String>,
  explanation: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl RawItem {
  fn into_item(self) -> Option<MediaItem> {
    let date = parse_iso_date(self.date.as_deref()?)?;
    Some(MediaItem {
      date,
      title: non_empty(self.title),
      media_type: MediaType::from_feed(self.media_type.as_deref()),
      url: non_empty(self.url),
      hd_url: non_empty(self.hdurl),
      thumbnail_url: non_empty(self.thumbnail_url),
      explanation: non_empty(self.explanation),
    })
  }
}

// --- Normalization ---

/// Accept a top-level array or `{ "items": [...] }` and return items ascending by date.
/// Entries without a parsable date are skipped.
pub fn normalize_feed(payload: Value) -> Result<Vec<MediaItem>, FeedError> {
  let entries = match payload {
    Value::Array(entries) => entries,
    Value::Object(mut map) => match map.remove("items") {
      Some(Value::Array(entries)) => entries,
      _ => return Err(FeedError::MalformedFeed("object has no `items` array".to_string())),
    },
    other => return Err(FeedError::MalformedFeed(format!("expected an array, got {}", json_kind(&other)))),
  };

  let total = entries.len();
  let mut items: Vec<MediaItem> =
    entries.into_iter().filter_map(|v| serde_json::from_value::<RawItem>(v).ok()).filter_map(RawItem::into_item).collect();

  if items.len() < total {
    debug!(skipped = total - items.len(), total, "feed: dropped entries without a usable date");
  }
  if items.is_empty() {
    return Err(FeedError::MalformedFeed("feed is empty".to_string()));
  }

  items.sort_by_key(|item| item.date);
  Ok(items)
}

fn json_kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

// --- Bounds and ranges ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
  pub min: NaiveDate,
  pub max: NaiveDate,
}

impl DateBounds {
  pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
    date.clamp(self.min, self.max)
  }
}

/// Inclusive, validated date range (`start <= end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

pub fn compute_date_bounds(items: &[MediaItem]) -> Option<DateBounds> {
  let min = items.iter().map(|i| i.date).min()?;
  let max = items.iter().map(|i| i.date).max()?;
  Some(DateBounds { min, max })
}

/// The last `days` available days, ending at the newest date and never starting before the oldest.
pub fn suggest_default_range(bounds: DateBounds, days: u32) -> DateRange {
  let back = Days::new(u64::from(days.saturating_sub(1)));
  let start = bounds.max.checked_sub_days(back).unwrap_or(bounds.min).max(bounds.min);
  DateRange { start, end: bounds.max }
}

// --- Source ---

/// Where the raw feed JSON comes from.
#[async_trait]
pub trait FeedSource: Send + Sync {
  async fn fetch(&self) -> Result<Value, FeedError>;
}

pub struct HttpFeedSource {
  client: Client,
  url: String,
}

impl HttpFeedSource {
  pub fn new(client: Client, url: impl Into<String>) -> Self {
    Self { client, url: url.into() }
  }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
  async fn fetch(&self) -> Result<Value, FeedError> {
    let timeout = Duration::from_secs(constants().request_timeout_secs);
    let response = self.client.get(&self.url).timeout(timeout).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(FeedError::Status(status.as_u16()));
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

// --- Store ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
  Empty,
  Loading,
  Loaded,
  Failed(String),
}

#[derive(Debug)]
pub enum LoadOutcome {
  /// This call fetched and stored the feed.
  Loaded(usize),
  AlreadyLoaded,
  /// Another load is in flight; no request was issued.
  InFlight,
  Failed(FeedError),
}

/// Lazily loaded, write-once feed cache.
pub struct FeedStore {
  source: Box<dyn FeedSource>,
  status: Mutex<LoadStatus>,
  cache: OnceLock<Vec<MediaItem>>,
}

impl FeedStore {
  pub fn new(source: Box<dyn FeedSource>) -> Self {
    Self { source, status: Mutex::new(LoadStatus::Empty), cache: OnceLock::new() }
  }

  fn lock_status(&self) -> MutexGuard<'_, LoadStatus> {
    self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn status(&self) -> LoadStatus {
    self.lock_status().clone()
  }

  pub fn is_loaded(&self) -> bool {
    self.cache.get().is_some()
  }

  /// Fetch the feed unless it is already loaded or loading. Never fails out;
  /// problems come back as `LoadOutcome::Failed` and leave the cache empty.
  pub async fn load(&self) -> LoadOutcome {
    {
      let mut status = self.lock_status();
      match *status {
        LoadStatus::Loaded => return LoadOutcome::AlreadyLoaded,
        LoadStatus::Loading => return LoadOutcome::InFlight,
        LoadStatus::Empty | LoadStatus::Failed(_) => *status = LoadStatus::Loading,
      }
    }
    let mut guard = LoadingGuard { store: self, settled: false };

    let result = match self.source.fetch().await {
      Ok(payload) => normalize_feed(payload),
      Err(e) => Err(e),
    };

    let outcome = match result {
      Ok(items) => {
        if let Err(rejected) = self.cache.set(items) {
          warn!(dropped = rejected.len(), "feed: cache already populated, keeping the first copy");
        }
        let count = self.items().len();
        *self.lock_status() = LoadStatus::Loaded;
        info!(count, "feed: loaded");
        LoadOutcome::Loaded(count)
      }
      Err(e) => {
        warn!(err = %e, "feed: load failed");
        *self.lock_status() = LoadStatus::Failed(e.to_string());
        LoadOutcome::Failed(e)
      }
    };
    guard.settled = true;
    outcome
  }

  /// Cached items in ascending date order; empty until a load succeeds.
  pub fn items(&self) -> &[MediaItem] {
    self.cache.get().map(Vec::as_slice).unwrap_or_default()
  }

  pub fn date_bounds(&self) -> Option<DateBounds> {
    compute_date_bounds(self.items())
  }

  /// Items within `[start, end]`, newest first.
  pub fn query_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<MediaItem> {
    let mut hits: Vec<MediaItem> =
      self.items().iter().filter(|item| date_in_range(item.date, start, end)).cloned().collect();
    hits.sort_by(|a, b| b.date.cmp(&a.date));
    hits
  }
}

/// Resets `Loading` back to `Empty` if the load future is dropped mid-flight.
struct LoadingGuard<'a> {
  store: &'a FeedStore,
  settled: bool,
}

impl Drop for LoadingGuard<'_> {
  fn drop(&mut self) {
    if !self.settled {
      let mut status = self.store.lock_status();
      if *status == LoadStatus::Loading {
        *status = LoadStatus::Empty;
      }
    }
  }
}
