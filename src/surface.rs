//! Capability traits the gallery logic writes into.
//!
//! The terminal front end binds these once at startup; the controller,
//! renderer and tests only ever see the traits.

use std::fmt;

use crate::error::SelectionError;
use crate::feed::{DateBounds, DateRange};
use crate::gallery::Card;

/// What the single status line currently says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
  Prompt,
  Loading,
  LoadFailed,
  NoResults,
  Count(usize),
  Rejected(SelectionError),
  Clear,
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Status::Prompt => write!(f, "🔭 Pick a date range and hit “Get Space Images.”"),
      Status::Loading => write!(f, "🔄 Loading space photos…"),
      Status::LoadFailed => write!(f, "⚠️ Could not load data from the class feed."),
      Status::NoResults => write!(f, "🙈 No results for that date range."),
      Status::Count(n) => write!(f, "{} item(s) displayed.", n),
      Status::Rejected(SelectionError::StartAfterEnd) => write!(f, "↔️ {}", SelectionError::StartAfterEnd),
      Status::Rejected(err) => write!(f, "🗓️ {}", err),
      Status::Clear => Ok(()),
    }
  }
}

pub trait StatusSink {
  fn set_status(&mut self, status: Status);
}

pub trait GallerySink {
  fn clear(&mut self);
  fn mount(&mut self, cards: Vec<Card>);
}

/// Raw start/end text as the user left it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
  pub start: String,
  pub end: String,
}

pub trait DateRangeInput {
  fn selection(&self) -> Selection;
  fn set_bounds(&mut self, bounds: DateBounds);
  fn set_range(&mut self, range: DateRange);
  fn clear(&mut self);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_texts() {
    assert_eq!(Status::Count(3).to_string(), "3 item(s) displayed.");
    assert_eq!(Status::Clear.to_string(), "");
    assert_eq!(Status::LoadFailed.to_string(), "⚠️ Could not load data from the class feed.");
    assert_eq!(Status::Rejected(SelectionError::MissingDates).to_string(), "🗓️ Please pick both start and end dates.");
    assert_eq!(Status::Rejected(SelectionError::StartAfterEnd).to_string(), "↔️ Start date must be before end date.");
  }
}
