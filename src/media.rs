use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use lru::LruCache;
use reqwest::Client;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::constants::constants;

/// Download and decode a still image.
pub async fn fetch_image(client: &Client, url: &str) -> Result<DynamicImage> {
  let response = client
    .get(url)
    .timeout(Duration::from_secs(constants().request_timeout_secs))
    .send()
    .await
    .with_context(|| format!("Failed to request image {}", url))?;
  if !response.status().is_success() {
    return Err(anyhow!("Image request for {} failed with HTTP {}", url, response.status().as_u16()));
  }
  let bytes = response.bytes().await.with_context(|| format!("Failed to read image bytes from {}", url))?;
  image::load_from_memory(&bytes).with_context(|| format!("Failed to decode image from memory (URL: {})", url))
}

/// Decoded previews keyed by URL, least recently viewed evicted first.
pub struct PreviewCache {
  images: LruCache<String, DynamicImage>,
  /// URLs that failed to fetch or decode; bounded like the images.
  failed: LruCache<String, ()>,
}

impl PreviewCache {
  pub fn new(capacity: usize) -> Self {
    let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
    Self { images: LruCache::new(capacity), failed: LruCache::new(capacity) }
  }

  /// Looking an image up marks it as recently used.
  pub fn get(&mut self, url: &str) -> Option<&DynamicImage> {
    self.images.get(url)
  }

  /// Whether a fetch for `url` is worth starting.
  pub fn wants(&self, url: &str) -> bool {
    !self.images.contains(url) && !self.failed.contains(url)
  }

  pub fn insert(&mut self, url: String, image: DynamicImage) {
    self.failed.pop(&url);
    self.images.put(url, image);
  }

  pub fn mark_failed(&mut self, url: String) {
    self.failed.put(url, ());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pixel() -> DynamicImage {
    DynamicImage::new_rgb8(1, 1)
  }

  #[test]
  fn cache_evicts_least_recently_viewed() {
    let mut cache = PreviewCache::new(2);
    cache.insert("a".into(), pixel());
    cache.insert("b".into(), pixel());
    assert!(cache.get("a").is_some());
    cache.insert("c".into(), pixel());
    assert!(cache.get("a").is_some());
    assert!(cache.get("b").is_none());
    assert!(cache.get("c").is_some());
  }

  #[test]
  fn failed_urls_are_not_retried() {
    let mut cache = PreviewCache::new(4);
    assert!(cache.wants("x"));
    cache.mark_failed("x".into());
    assert!(!cache.wants("x"));
    cache.insert("y".into(), pixel());
    assert!(!cache.wants("y"));
  }

  #[test]
  fn failure_list_is_bounded() {
    let mut cache = PreviewCache::new(2);
    cache.mark_failed("x".into());
    cache.mark_failed("y".into());
    cache.mark_failed("z".into());
    assert!(cache.wants("x"));
    assert!(!cache.wants("z"));
  }

  #[test]
  fn later_success_clears_failure() {
    let mut cache = PreviewCache::new(2);
    cache.mark_failed("x".into());
    cache.insert("x".into(), pixel());
    assert!(cache.get("x").is_some());
    cache.images.pop("x");
    assert!(cache.wants("x"));
  }

  #[test]
  fn zero_capacity_still_holds_one() {
    let mut cache = PreviewCache::new(0);
    cache.insert("a".into(), pixel());
    assert!(cache.get("a").is_some());
  }
}
