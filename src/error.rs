//! Domain error types for feed loading and date-range selection.

use thiserror::Error;

/// Failures while fetching or decoding the feed. All of these are caught at
/// the `FeedStore::load` boundary and turned into a status line.
#[derive(Error, Debug)]
pub enum FeedError {
  /// Request could not be sent or the body could not be read
  #[error("network error: {0}")]
  Network(#[from] reqwest::Error),

  /// Server answered with a non-success status
  #[error("feed request failed with HTTP {0}")]
  Status(u16),

  /// Payload is not an array, has no usable `items`, or is empty after normalization
  #[error("malformed feed: {0}")]
  MalformedFeed(String),
}

impl From<serde_json::Error> for FeedError {
  fn from(err: serde_json::Error) -> Self {
    FeedError::MalformedFeed(err.to_string())
  }
}

/// Reasons a start/end selection is rejected before querying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
  #[error("Please pick both start and end dates.")]
  MissingDates,

  #[error("'{0}' is not a valid date (use YYYY-MM-DD).")]
  InvalidDate(String),

  #[error("Start date must be before end date.")]
  StartAfterEnd,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn feed_error_display() {
    assert_eq!(FeedError::Status(404).to_string(), "feed request failed with HTTP 404");
    assert_eq!(FeedError::MalformedFeed("empty".into()).to_string(), "malformed feed: empty");
  }

  #[test]
  fn json_error_becomes_malformed_feed() {
    let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    assert!(matches!(FeedError::from(err), FeedError::MalformedFeed(_)));
  }

  #[test]
  fn selection_error_display() {
    assert_eq!(SelectionError::StartAfterEnd.to_string(), "Start date must be before end date.");
    assert_eq!(SelectionError::InvalidDate("2024-13-01".into()).to_string(), "'2024-13-01' is not a valid date (use YYYY-MM-DD).");
  }
}
