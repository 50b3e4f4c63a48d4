//! Cards and the gallery renderer.

use ratatui::widgets::ListState;

use crate::constants::constants;
use crate::date_utils::{DateLocale, extract_video_id, format_date};
use crate::feed::{MediaItem, MediaType};
use crate::surface::{GallerySink, Status, StatusSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
  Image,
  Video,
}

impl Badge {
  pub fn label(self) -> &'static str {
    match self {
      Badge::Image => "IMAGE",
      Badge::Video => "VIDEO",
    }
  }
}

/// Where a card's thumbnail comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
  Url(String),
  /// Video with nothing to show; drawn as a local placeholder.
  Placeholder,
  Missing,
}

impl Thumbnail {
  pub fn url(&self) -> Option<&str> {
    match self {
      Thumbnail::Url(url) => Some(url),
      Thumbnail::Placeholder | Thumbnail::Missing => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
  pub title: String,
  pub display_date: String,
  pub badge: Badge,
  pub thumbnail: Thumbnail,
  /// Full item, handed to the modal on activation.
  pub item: MediaItem,
}

impl Card {
  pub fn from_item(item: &MediaItem, locale: DateLocale) -> Self {
    let (badge, thumbnail) = match item.media_type {
      MediaType::Video => (Badge::Video, video_thumbnail(item)),
      MediaType::Image | MediaType::Unknown => {
        let src = item.hd_url.as_ref().or(item.url.as_ref());
        (Badge::Image, src.map_or(Thumbnail::Missing, |url| Thumbnail::Url(url.clone())))
      }
    };
    Card {
      title: item.display_title().to_string(),
      display_date: format_date(item.date, locale),
      badge,
      thumbnail,
      item: item.clone(),
    }
  }
}

/// Explicit thumbnail, else one derived from the video id, else a placeholder.
fn video_thumbnail(item: &MediaItem) -> Thumbnail {
  if let Some(url) = &item.thumbnail_url {
    return Thumbnail::Url(url.clone());
  }
  match item.url.as_deref().and_then(extract_video_id) {
    Some(id) => Thumbnail::Url(constants().video_thumbnail_url(&id)),
    None => Thumbnail::Placeholder,
  }
}

/// Replace the gallery contents with one card per item, in the order given.
pub fn render(items: &[MediaItem], locale: DateLocale, gallery: &mut impl GallerySink, status: &mut impl StatusSink) {
  gallery.clear();
  if items.is_empty() {
    status.set_status(Status::NoResults);
    return;
  }
  let cards: Vec<Card> = items.iter().map(|item| Card::from_item(item, locale)).collect();
  let count = cards.len();
  gallery.mount(cards);
  status.set_status(Status::Count(count));
}

// --- View state ---

/// Mounted cards plus the keyboard selection.
#[derive(Default)]
pub struct GalleryView {
  pub cards: Vec<Card>,
  pub list_state: ListState,
}

impl GalleryView {
  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  pub fn selected(&self) -> Option<&Card> {
    self.list_state.selected().and_then(|i| self.cards.get(i))
  }

  pub fn select(&mut self, index: usize) {
    if index < self.cards.len() {
      self.list_state.select(Some(index));
    }
  }

  pub fn select_next(&mut self) {
    let count = self.cards.len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
      self.list_state.select(Some(i));
    }
  }

  pub fn select_prev(&mut self) {
    let count = self.cards.len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.list_state.select(Some(i));
    }
  }
}

impl GallerySink for GalleryView {
  fn clear(&mut self) {
    self.cards.clear();
    self.list_state = ListState::default();
  }

  fn mount(&mut self, cards: Vec<Card>) {
    self.cards = cards;
    self.list_state.select(if self.cards.is_empty() { None } else { Some(0) });
  }
}
