//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!`, so there is no runtime file I/O.
//! Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
pub struct Constants {
  /// Feed used when neither the CLI nor prefs override it.
  pub feed_url: String,
  pub request_timeout_secs: u64,
  /// Length of the preselected range after the feed loads.
  pub default_range_days: u32,

  pub video_thumbnail_template: String,
  pub video_embed_template: String,

  pub facts: Vec<String>,
}

impl Constants {
  pub fn video_thumbnail_url(&self, video_id: &str) -> String {
    self.video_thumbnail_template.replace("{id}", video_id)
  }

  pub fn video_embed_url(&self, video_id: &str) -> String {
    self.video_embed_template.replace("{id}", video_id)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

pub fn constants() -> &'static Constants {
  &CONSTANTS
}
