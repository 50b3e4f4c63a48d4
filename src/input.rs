use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Focus};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

fn ctrl(key: &KeyEvent, c: char) -> bool {
  key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
  if ctrl(&key, 'c') {
    app.should_quit = true;
    return;
  }

  if ctrl(&key, 't') {
    app.next_theme();
    return;
  }

  // The overlay captures everything while it is up.
  if app.modal_open() {
    handle_modal_key(app, key);
    return;
  }

  if ctrl(&key, 'r') {
    app.reset();
    return;
  }

  match app.focus {
    Focus::Start | Focus::End => handle_form_key(app, key),
    Focus::Gallery => handle_gallery_key(app, key),
  }
}

fn handle_modal_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') => app.close_modal(),
    KeyCode::Char('o') => app.open_modal_external(),
    KeyCode::Down | KeyCode::Char('j') => {
      if let Some(modal) = app.modal.as_mut() {
        modal.scroll_down();
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      if let Some(modal) = app.modal.as_mut() {
        modal.scroll_up();
      }
    }
    _ => {}
  }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
  app.clear_error();
  let bounds = app.form.bounds;
  match key.code {
    KeyCode::Enter => app.submit(),
    KeyCode::Tab | KeyCode::BackTab => app.cycle_focus(),
    KeyCode::Esc => {
      if app.gallery.is_empty() {
        app.should_quit = true;
      } else {
        app.focus = Focus::Gallery;
      }
    }
    code => {
      let Some(field) = app.focused_field() else { return };
      match code {
        KeyCode::Char(c) => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.cursor = 0,
        KeyCode::End => field.cursor = field.text.chars().count(),
        KeyCode::Up => field.step(1, bounds),
        KeyCode::Down => field.step(-1, bounds),
        _ => {}
      }
    }
  }
}

fn handle_gallery_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),
    KeyCode::Down | KeyCode::Char('j') => {
      app.gallery.select_next();
      app.request_preview();
    }
    KeyCode::Up | KeyCode::Char('k') => {
      app.gallery.select_prev();
      app.request_preview();
    }
    KeyCode::Tab | KeyCode::BackTab => app.cycle_focus(),
    KeyCode::Char('r') => app.reset(),
    KeyCode::Esc | KeyCode::Char('/') => app.focus = Focus::Start,
    KeyCode::Char('q') => app.should_quit = true,
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::app::AppOptions;
  use crate::date_utils::DateLocale;
  use crate::display::DisplayMode;
  use crate::error::FeedError;
  use crate::feed::{FeedSource, FeedStore};
  use async_trait::async_trait;
  use serde_json::{Value, json};
  use std::sync::Arc;

  struct StaticSource;

  #[async_trait]
  impl FeedSource for StaticSource {
    async fn fetch(&self) -> Result<Value, FeedError> {
      Ok(json!([
        { "date": "2024-03-01", "title": "First", "media_type": "image" },
        { "date": "2024-03-02", "title": "Second", "media_type": "image" },
      ]))
    }
  }

  fn press(app: &mut App, code: KeyCode) {
    handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
  }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  fn new_app() -> App {
    App::new(AppOptions {
      store: Arc::new(FeedStore::new(Box::new(StaticSource))),
      http: reqwest::Client::new(),
      locale: DateLocale::default(),
      display_mode: DisplayMode::Ascii,
      modal_enabled: true,
      theme_index: 0,
      start: None,
      end: None,
    })
  }

  async fn loaded_app() -> App {
    let mut app = new_app();
    app.store.load().await;
    app
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  #[test]
  fn char_to_byte_empty() {
    assert_eq!(char_to_byte_index("", 0), 0);
    assert_eq!(char_to_byte_index("", 5), 0);
  }

  // --- Keys ---

  #[test]
  fn typing_goes_to_focused_field() {
    let mut app = new_app();
    type_str(&mut app, "2024-03-01");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "2024-03-02");
    assert_eq!(app.form.start.text, "2024-03-01");
    assert_eq!(app.form.end.text, "2024-03-02");
  }

  #[test]
  fn ctrl_c_quits_from_anywhere() {
    let mut app = new_app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn enter_renders_and_moves_to_gallery() {
    let mut app = loaded_app().await;
    type_str(&mut app, "2024-03-01");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "2024-03-02");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.focus, Focus::Gallery);
    assert_eq!(app.gallery.cards[0].title, "Second");

    press(&mut app, KeyCode::Down);
    assert_eq!(app.gallery.list_state.selected(), Some(1));
  }

  #[tokio::test]
  async fn modal_swallows_navigation_until_closed() {
    let mut app = loaded_app().await;
    type_str(&mut app, "2024-03-01");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "2024-03-02");
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Enter);
    assert!(app.modal_open());

    // Scrolls the explanation, not the gallery.
    press(&mut app, KeyCode::Down);
    assert_eq!(app.gallery.list_state.selected(), Some(0));
    assert_eq!(app.modal.as_ref().and_then(|m| m.view()).map(|v| v.scroll), Some(1));

    press(&mut app, KeyCode::Esc);
    assert!(!app.modal_open());
    assert!(!app.should_quit);
  }

  #[tokio::test]
  async fn ctrl_r_resets_form() {
    let mut app = loaded_app().await;
    type_str(&mut app, "2024-03-01");
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
    assert_eq!(app.form.start.text, "");
    assert_eq!(app.focus, Focus::Start);
  }
}
