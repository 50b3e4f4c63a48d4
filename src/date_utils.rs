//! Date parsing/formatting helpers and video id extraction.
//!
//! Everything here is pure and total: bad input degrades to the raw string,
//! `false`, or `None`, never a panic.

use chrono::{DateTime, Locale, NaiveDate, Utc};
use url::Url;

/// Locale used for long display dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLocale {
  locale: Locale,
  /// English locales read "January 5, 2024"; the rest "5 January 2024".
  month_first: bool,
}

impl Default for DateLocale {
  fn default() -> Self {
    Self { locale: Locale::en_US, month_first: true }
  }
}

impl DateLocale {
  /// Parse a POSIX-style locale name such as `fr_FR.UTF-8` or `de-DE`.
  pub fn parse(name: &str) -> Option<Self> {
    let base = name.split(['.', '@']).next().unwrap_or_default().trim().replace('-', "_");
    if base.is_empty() || base == "C" || base == "POSIX" {
      return None;
    }
    let locale = Locale::try_from(base.as_str()).ok()?;
    Some(Self { locale, month_first: base.starts_with("en") })
  }

  /// Resolve from an explicit name, then `LC_TIME`/`LC_ALL`/`LANG`, then en_US.
  pub fn resolve(explicit: Option<&str>) -> Self {
    if let Some(locale) = explicit.and_then(Self::parse) {
      return locale;
    }
    ["LC_ALL", "LC_TIME", "LANG"]
      .iter()
      .filter_map(|var| std::env::var(var).ok())
      .find_map(|value| Self::parse(&value))
      .unwrap_or_default()
  }

  fn pattern(self) -> &'static str {
    if self.month_first { "%B %-d, %Y" } else { "%-d %B %Y" }
  }
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into its UTC calendar day.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(date);
  }
  DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// Long, locale-aware rendering of an ISO date. Unparsable input comes back unchanged.
pub fn format_display_date(iso: &str, locale: DateLocale) -> String {
  match parse_iso_date(iso) {
    Some(date) => format_date(date, locale),
    None => iso.to_string(),
  }
}

pub fn format_date(date: NaiveDate, locale: DateLocale) -> String {
  date.format_localized(locale.pattern(), locale.locale).to_string()
}

/// True iff `iso` falls within `[start_iso, end_iso]`, both ends inclusive.
pub fn is_within_range(iso: &str, start_iso: &str, end_iso: &str) -> bool {
  match (parse_iso_date(iso), parse_iso_date(start_iso), parse_iso_date(end_iso)) {
    (Some(date), Some(start), Some(end)) => date_in_range(date, start, end),
    _ => false,
  }
}

pub fn date_in_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
  start <= date && date <= end
}

/// Pull the YouTube video id out of a `youtu.be/<id>`, `youtube.com/embed/<id>`
/// or `youtube.com/watch?v=<id>` URL.
pub fn extract_video_id(raw: &str) -> Option<String> {
  let url = Url::parse(raw.trim()).ok()?;
  let host = url.host_str()?;

  let id = if host.contains("youtu.be") {
    url.path().trim_start_matches('/').split('/').next().map(str::to_string)
  } else if host.contains("youtube.com") {
    match url.path().strip_prefix("/embed/") {
      Some(rest) => rest.split('/').next().map(str::to_string),
      None => url.query_pairs().find(|(k, _)| k == "v").map(|(_, v)| v.into_owned()),
    }
  } else {
    None
  };

  id.filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  // --- parse_iso_date ---

  #[test]
  fn parses_plain_dates_and_timestamps() {
    assert_eq!(parse_iso_date("2024-01-05"), Some(ymd(2024, 1, 5)));
    assert_eq!(parse_iso_date(" 2024-01-05 "), Some(ymd(2024, 1, 5)));
    assert_eq!(parse_iso_date("2024-01-05T23:30:00-02:00"), Some(ymd(2024, 1, 6)));
    assert_eq!(parse_iso_date("2024-02-30"), None);
    assert_eq!(parse_iso_date("yesterday"), None);
    assert_eq!(parse_iso_date(""), None);
  }

  // --- format_display_date ---

  #[test]
  fn formats_english_long_date() {
    assert_eq!(format_display_date("2024-01-05", DateLocale::default()), "January 5, 2024");
    assert_eq!(format_display_date("1995-06-16", DateLocale::default()), "June 16, 1995");
  }

  #[test]
  fn formats_other_locales_day_first() {
    let fr = DateLocale::parse("fr_FR.UTF-8").unwrap();
    assert_eq!(format_display_date("2024-01-05", fr), "5 janvier 2024");
  }

  #[test]
  fn unparsable_date_is_returned_unchanged() {
    assert_eq!(format_display_date("not a date", DateLocale::default()), "not a date");
    assert_eq!(format_display_date("", DateLocale::default()), "");
  }

  #[test]
  fn valid_dates_always_format_non_empty() {
    let mut date = ymd(1995, 6, 16);
    while date < ymd(1996, 6, 16) {
      let iso = date.format("%Y-%m-%d").to_string();
      assert!(!format_display_date(&iso, DateLocale::default()).is_empty());
      date = date.succ_opt().unwrap();
    }
  }

  // --- DateLocale ---

  #[test]
  fn locale_parse_rejects_posix_and_garbage() {
    assert_eq!(DateLocale::parse("C"), None);
    assert_eq!(DateLocale::parse("POSIX"), None);
    assert_eq!(DateLocale::parse(""), None);
    assert_eq!(DateLocale::parse("xx_YY"), None);
    assert_eq!(DateLocale::parse("en-GB"), Some(DateLocale { locale: Locale::en_GB, month_first: true }));
  }

  #[test]
  fn locale_resolve_prefers_explicit_name() {
    let de = DateLocale::resolve(Some("de_DE"));
    assert_eq!(de, DateLocale::parse("de_DE").unwrap());
  }

  // --- is_within_range ---

  #[test]
  fn range_is_inclusive_on_both_ends() {
    assert!(is_within_range("2024-01-02", "2024-01-02", "2024-01-10"));
    assert!(is_within_range("2024-01-10", "2024-01-02", "2024-01-10"));
    assert!(is_within_range("2024-01-05", "2024-01-05", "2024-01-05"));
    assert!(!is_within_range("2024-01-01", "2024-01-02", "2024-01-10"));
    assert!(!is_within_range("2024-01-11", "2024-01-02", "2024-01-10"));
  }

  #[test]
  fn range_with_unparsable_input_is_false() {
    assert!(!is_within_range("garbage", "2024-01-01", "2024-01-10"));
    assert!(!is_within_range("2024-01-05", "", "2024-01-10"));
  }

  // --- extract_video_id ---

  #[test]
  fn video_id_from_short_link() {
    assert_eq!(extract_video_id("https://youtu.be/abc123"), Some("abc123".to_string()));
    assert_eq!(extract_video_id("https://youtu.be/abc123?t=42"), Some("abc123".to_string()));
  }

  #[test]
  fn video_id_from_embed_and_watch() {
    assert_eq!(extract_video_id("https://www.youtube.com/embed/xyz789?rel=0"), Some("xyz789".to_string()));
    assert_eq!(extract_video_id("https://www.youtube.com/watch?v=q1w2e3&t=5"), Some("q1w2e3".to_string()));
  }

  #[test]
  fn video_id_missing_or_unrecognized() {
    assert_eq!(extract_video_id("https://www.youtube.com/watch"), None);
    assert_eq!(extract_video_id("https://youtu.be/"), None);
    assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
    assert_eq!(extract_video_id("not a url at all"), None);
    assert_eq!(extract_video_id(""), None);
  }
}
