//! Submit / reset / load wiring between the store and the surfaces.

use tracing::debug;

use crate::date_utils::{DateLocale, parse_iso_date};
use crate::error::SelectionError;
use crate::feed::{DateRange, FeedStore, LoadOutcome, suggest_default_range};
use crate::gallery;
use crate::surface::{DateRangeInput, GallerySink, Selection, Status, StatusSink};

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
  Rendered(usize),
  Rejected(SelectionError),
  /// Selection is fine but the feed is not in memory yet; retry after a load.
  NeedsLoad,
}

pub fn validate_selection(selection: &Selection) -> Result<DateRange, SelectionError> {
  let (start, end) = (selection.start.trim(), selection.end.trim());
  if start.is_empty() || end.is_empty() {
    return Err(SelectionError::MissingDates);
  }
  let start = parse_iso_date(start).ok_or_else(|| SelectionError::InvalidDate(start.to_string()))?;
  let end = parse_iso_date(end).ok_or_else(|| SelectionError::InvalidDate(end.to_string()))?;
  if start > end {
    return Err(SelectionError::StartAfterEnd);
  }
  Ok(DateRange { start, end })
}

/// Validate the selection, then query and render. A rejected selection leaves
/// the gallery untouched and never reaches the store.
pub fn submit(
  store: &FeedStore,
  locale: DateLocale,
  input: &impl DateRangeInput,
  gallery: &mut impl GallerySink,
  status: &mut impl StatusSink,
) -> SubmitOutcome {
  let range = match validate_selection(&input.selection()) {
    Ok(range) => range,
    Err(e) => {
      debug!(err = %e, "submit: selection rejected");
      status.set_status(Status::Rejected(e.clone()));
      return SubmitOutcome::Rejected(e);
    }
  };

  if !store.is_loaded() {
    status.set_status(Status::Loading);
    return SubmitOutcome::NeedsLoad;
  }

  let items = store.query_range(range.start, range.end);
  debug!(start = %range.start, end = %range.end, hits = items.len(), "submit: range query");
  gallery::render(&items, locale, gallery, status);
  SubmitOutcome::Rendered(items.len())
}

/// Reflect a finished load: bound the inputs and preselect the last `default_days`
/// available days unless the user already typed a range.
pub fn apply_load_outcome(
  store: &FeedStore,
  outcome: &LoadOutcome,
  default_days: u32,
  input: &mut impl DateRangeInput,
  status: &mut impl StatusSink,
) {
  match outcome {
    LoadOutcome::Loaded(_) | LoadOutcome::AlreadyLoaded => {
      if let Some(bounds) = store.date_bounds() {
        input.set_bounds(bounds);
        let current = input.selection();
        if current.start.trim().is_empty() && current.end.trim().is_empty() {
          input.set_range(suggest_default_range(bounds, default_days));
        }
      }
      status.set_status(Status::Clear);
    }
    LoadOutcome::InFlight => {}
    LoadOutcome::Failed(_) => status.set_status(Status::LoadFailed),
  }
}

pub fn reset(input: &mut impl DateRangeInput, gallery: &mut impl GallerySink, status: &mut impl StatusSink) {
  input.clear();
  gallery.clear();
  status.set_status(Status::Prompt);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::FeedError;
  use crate::feed::{DateBounds, FeedSource};
  use crate::gallery::GalleryView;
  use async_trait::async_trait;
  use chrono::NaiveDate;
  use serde_json::{Value, json};
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  struct CountingSource {
    payload: Option<Value>,
    calls: Arc<AtomicUsize>,
  }

  #[async_trait]
  impl FeedSource for CountingSource {
    async fn fetch(&self) -> Result<Value, FeedError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.payload.clone().ok_or(FeedError::Status(500))
    }
  }

  fn store(payload: Option<Value>) -> (FeedStore, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (FeedStore::new(Box::new(CountingSource { payload, calls: Arc::clone(&calls) })), calls)
  }

  fn feed() -> Value {
    json!([
      { "date": "2024-01-01", "title": "A", "media_type": "image" },
      { "date": "2024-01-10", "title": "C", "media_type": "video", "url": "https://youtu.be/abc123" },
      { "date": "2024-01-05", "title": "B", "media_type": "image" },
    ])
  }

  #[derive(Default)]
  struct FakeInput {
    selection: Selection,
    bounds: Option<DateBounds>,
  }

  impl FakeInput {
    fn with(start: &str, end: &str) -> Self {
      Self { selection: Selection { start: start.to_string(), end: end.to_string() }, bounds: None }
    }
  }

  impl DateRangeInput for FakeInput {
    fn selection(&self) -> Selection {
      self.selection.clone()
    }
    fn set_bounds(&mut self, bounds: DateBounds) {
      self.bounds = Some(bounds);
    }
    fn set_range(&mut self, range: DateRange) {
      self.selection = Selection { start: range.start.to_string(), end: range.end.to_string() };
    }
    fn clear(&mut self) {
      self.selection = Selection::default();
    }
  }

  #[derive(Default)]
  struct StatusLog(Vec<Status>);

  impl StatusSink for StatusLog {
    fn set_status(&mut self, status: Status) {
      self.0.push(status);
    }
  }

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  // --- validate_selection ---

  #[test]
  fn validation_rules() {
    let sel = |s: &str, e: &str| Selection { start: s.to_string(), end: e.to_string() };
    assert_eq!(validate_selection(&sel("", "2024-01-01")), Err(SelectionError::MissingDates));
    assert_eq!(validate_selection(&sel("2024-01-01", "  ")), Err(SelectionError::MissingDates));
    assert_eq!(validate_selection(&sel("2024-1-x", "2024-01-01")), Err(SelectionError::InvalidDate("2024-1-x".into())));
    assert_eq!(validate_selection(&sel("2024-01-02", "2024-01-01")), Err(SelectionError::StartAfterEnd));
    assert_eq!(
      validate_selection(&sel("2024-01-01", "2024-01-01")),
      Ok(DateRange { start: ymd(2024, 1, 1), end: ymd(2024, 1, 1) })
    );
  }

  // --- submit ---

  #[tokio::test]
  async fn submit_renders_newest_first() {
    let (store, _) = store(Some(feed()));
    store.load().await;
    let input = FakeInput::with("2024-01-02", "2024-01-10");
    let mut gallery = GalleryView::default();
    let mut status = StatusLog::default();
    let outcome = submit(&store, DateLocale::default(), &input, &mut gallery, &mut status);
    assert_eq!(outcome, SubmitOutcome::Rendered(2));
    let titles: Vec<_> = gallery.cards.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["C", "B"]);
    assert_eq!(status.0.last(), Some(&Status::Count(2)));
  }

  #[tokio::test]
  async fn rejected_selection_keeps_prior_results_and_skips_store() {
    let (store, calls) = store(Some(feed()));
    let mut gallery = GalleryView::default();
    let mut status = StatusLog::default();

    let outcome = submit(&store, DateLocale::default(), &FakeInput::with("2024-01-10", "2024-01-01"), &mut gallery, &mut status);
    assert_eq!(outcome, SubmitOutcome::Rejected(SelectionError::StartAfterEnd));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    store.load().await;
    submit(&store, DateLocale::default(), &FakeInput::with("2024-01-01", "2024-01-10"), &mut gallery, &mut status);
    assert_eq!(gallery.cards.len(), 3);

    submit(&store, DateLocale::default(), &FakeInput::with("2024-01-10", "2024-01-01"), &mut gallery, &mut status);
    assert_eq!(gallery.cards.len(), 3);
    assert_eq!(status.0.last(), Some(&Status::Rejected(SelectionError::StartAfterEnd)));
  }

  #[test]
  fn submit_before_load_asks_for_load() {
    let (store, calls) = store(Some(feed()));
    let mut status = StatusLog::default();
    let outcome = submit(
      &store,
      DateLocale::default(),
      &FakeInput::with("2024-01-01", "2024-01-10"),
      &mut GalleryView::default(),
      &mut status,
    );
    assert_eq!(outcome, SubmitOutcome::NeedsLoad);
    assert_eq!(status.0, vec![Status::Loading]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn empty_range_reports_no_results() {
    let (store, _) = store(Some(feed()));
    store.load().await;
    let mut gallery = GalleryView::default();
    let mut status = StatusLog::default();
    let outcome = submit(&store, DateLocale::default(), &FakeInput::with("2023-01-01", "2023-01-31"), &mut gallery, &mut status);
    assert_eq!(outcome, SubmitOutcome::Rendered(0));
    assert_eq!(status.0, vec![Status::NoResults]);
  }

  // --- apply_load_outcome ---

  #[tokio::test]
  async fn successful_load_bounds_and_preselects_inputs() {
    let (store, _) = store(Some(feed()));
    let outcome = store.load().await;
    let mut input = FakeInput::default();
    let mut status = StatusLog::default();
    apply_load_outcome(&store, &outcome, 7, &mut input, &mut status);
    assert_eq!(input.bounds, Some(DateBounds { min: ymd(2024, 1, 1), max: ymd(2024, 1, 10) }));
    assert_eq!(input.selection, Selection { start: "2024-01-04".into(), end: "2024-01-10".into() });
    assert_eq!(status.0, vec![Status::Clear]);
  }

  #[tokio::test]
  async fn load_keeps_user_selection() {
    let (store, _) = store(Some(feed()));
    let outcome = store.load().await;
    let mut input = FakeInput::with("2024-01-01", "2024-01-02");
    apply_load_outcome(&store, &outcome, 7, &mut input, &mut StatusLog::default());
    assert_eq!(input.selection.start, "2024-01-01");
  }

  #[tokio::test]
  async fn failed_load_reports_status_without_bounds() {
    let (store, _) = store(Some(json!([])));
    let outcome = store.load().await;
    let mut input = FakeInput::default();
    let mut status = StatusLog::default();
    apply_load_outcome(&store, &outcome, 7, &mut input, &mut status);
    assert_eq!(store.date_bounds(), None);
    assert_eq!(input.bounds, None);
    assert_eq!(status.0, vec![Status::LoadFailed]);
  }

  // --- reset ---

  #[tokio::test]
  async fn reset_clears_inputs_and_gallery() {
    let (store, _) = store(Some(feed()));
    store.load().await;
    let mut input = FakeInput::with("2024-01-01", "2024-01-10");
    let mut gallery = GalleryView::default();
    let mut status = StatusLog::default();
    submit(&store, DateLocale::default(), &input, &mut gallery, &mut status);
    reset(&mut input, &mut gallery, &mut status);
    assert_eq!(input.selection, Selection::default());
    assert!(gallery.is_empty());
    assert_eq!(status.0.last(), Some(&Status::Prompt));
  }
}
