//! Detail overlay for a single item.
//!
//! `Closed --open(item)--> Open(item) --close--> Closed`. Opening while open
//! replaces the item; closing while closed does nothing.

use image::DynamicImage;

use crate::constants::constants;
use crate::date_utils::{DateLocale, extract_video_id, format_date};
use crate::feed::{MediaItem, MediaType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMedia {
  Image { src: Option<String> },
  /// `embed_url` is the player URL when the id resolves, else the raw item URL.
  Video { embed_url: String, video_id: Option<String> },
  Unsupported,
}

impl ModalMedia {
  fn for_item(item: &MediaItem) -> Self {
    match item.media_type {
      MediaType::Image => ModalMedia::Image { src: item.hd_url.clone().or_else(|| item.url.clone()) },
      MediaType::Video => {
        let raw = item.url.clone().unwrap_or_default();
        let video_id = extract_video_id(&raw);
        let embed_url = video_id.as_deref().map_or(raw, |id| constants().video_embed_url(id));
        ModalMedia::Video { embed_url, video_id }
      }
      MediaType::Unknown => ModalMedia::Unsupported,
    }
  }
}

pub struct ModalView {
  pub item: MediaItem,
  pub title: String,
  pub date: String,
  pub explanation: String,
  pub media: ModalMedia,
  /// Decoded still for the media area, attached once fetched.
  pub image: Option<DynamicImage>,
  pub scroll: u16,
}

impl ModalView {
  /// URL of the still shown in the media area: the image itself, or the video's thumbnail.
  pub fn still_url(&self) -> Option<String> {
    match &self.media {
      ModalMedia::Image { src } => src.clone(),
      ModalMedia::Video { video_id, .. } => self
        .item
        .thumbnail_url
        .clone()
        .or_else(|| video_id.as_deref().map(|id| constants().video_thumbnail_url(id))),
      ModalMedia::Unsupported => None,
    }
  }

  /// URL handed to the system browser from inside the modal.
  pub fn external_url(&self) -> Option<&str> {
    match &self.media {
      ModalMedia::Video { embed_url, .. } if !embed_url.is_empty() => Some(embed_url),
      ModalMedia::Image { src: Some(src) } => Some(src),
      _ => self.item.url.as_deref(),
    }
  }
}

#[derive(Default)]
pub enum ModalState {
  #[default]
  Closed,
  Open(Box<ModalView>),
}

pub struct ModalController {
  state: ModalState,
  locale: DateLocale,
}

impl ModalController {
  pub fn new(locale: DateLocale) -> Self {
    Self { state: ModalState::Closed, locale }
  }

  pub fn is_open(&self) -> bool {
    matches!(self.state, ModalState::Open(_))
  }

  pub fn view(&self) -> Option<&ModalView> {
    match &self.state {
      ModalState::Open(view) => Some(view),
      ModalState::Closed => None,
    }
  }

  pub fn open(&mut self, item: &MediaItem) {
    let view = ModalView {
      title: item.display_title().to_string(),
      date: format_date(item.date, self.locale),
      explanation: item.explanation.clone().unwrap_or_default(),
      media: ModalMedia::for_item(item),
      image: None,
      scroll: 0,
      item: item.clone(),
    };
    self.state = ModalState::Open(Box::new(view));
  }

  /// Hide the overlay and drop its media. Returns whether anything was open.
  pub fn close(&mut self) -> bool {
    matches!(std::mem::take(&mut self.state), ModalState::Open(_))
  }

  /// Attach a fetched still if it still belongs to the open item.
  pub fn attach_image(&mut self, url: &str, image: DynamicImage) -> bool {
    match &mut self.state {
      ModalState::Open(view) if view.still_url().as_deref() == Some(url) => {
        view.image = Some(image);
        true
      }
      _ => false,
    }
  }

  pub fn scroll_down(&mut self) {
    if let ModalState::Open(view) = &mut self.state {
      view.scroll = view.scroll.saturating_add(1);
    }
  }

  pub fn scroll_up(&mut self) {
    if let ModalState::Open(view) = &mut self.state {
      view.scroll = view.scroll.saturating_sub(1);
    }
  }
}
