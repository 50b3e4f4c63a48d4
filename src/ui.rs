use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, Focus};
use crate::date_utils::{format_display_date, is_within_range, parse_iso_date};
use crate::gallery::{Badge, Thumbnail};
use crate::graphics::{ImagePreview, VideoPlaceholder};
use crate::modal::ModalMedia;
use crate::surface::Status;
use crate::theme::Theme;

const CLOSE_LABEL: &str = " [x] Close ";
const SUBMIT_LABEL: &str = "[ Get Space Images ]";
const RESET_LABEL: &str = "[ Reset ]";

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

fn badge_color(theme: &Theme, badge: Badge) -> ratatui::style::Color {
  match badge {
    Badge::Image => theme.image_badge,
    Badge::Video => theme.video_badge,
  }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
  let [area] = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center).areas(area);
  let [area] = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center).areas(area);
  area
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  app.hits = Default::default();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)), frame.area());

  let [header_area, form_area, status_area, main_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_form(frame, app, form_area);
  render_status(frame, app, status_area);
  render_main(frame, app, main_area);
  render_footer(frame, app, footer_area);

  if app.modal_open() {
    render_modal(frame, app);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let title = " 🔭 apodview ";
  let fact_w = (area.width as usize).saturating_sub(title.chars().count() + version.len() + 4);

  let left = Line::from(vec![
    Span::styled(title, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::raw("  "),
    Span::styled(truncate_str(&app.fact, fact_w), Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC)),
  ]);
  frame.render_widget(left, area);

  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_form(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let [start_area, end_area, buttons_area] =
    Layout::horizontal([Constraint::Length(24), Constraint::Length(24), Constraint::Min(0)]).areas(area);

  for (label, field_area, focus) in [(" Start ", start_area, Focus::Start), (" End ", end_area, Focus::End)] {
    let focused = app.focus == focus && !app.modal_open();
    let color = if focused { theme.accent } else { theme.border };
    let block = rounded(theme)
      .title(label)
      .title_style(Style::default().fg(color))
      .border_style(Style::default().fg(color))
      .padding(Padding::horizontal(1));
    let field = if focus == Focus::Start { &app.form.start } else { &app.form.end };
    let text = if field.text.is_empty() {
      Span::styled("YYYY-MM-DD", Style::default().fg(theme.muted))
    } else {
      // Dates the feed doesn't cover are flagged but still accepted.
      let outside = app.form.bounds.is_some_and(|b| {
        parse_iso_date(&field.text).is_some()
          && !is_within_range(&field.text, &b.min.format("%Y-%m-%d").to_string(), &b.max.format("%Y-%m-%d").to_string())
      });
      Span::styled(field.text.as_str(), Style::default().fg(if outside { theme.error } else { theme.fg }))
    };
    let pretty = format_display_date(&field.text, app.locale);
    let block = if pretty != field.text {
      block.title_bottom(Line::from(Span::styled(format!(" {} ", pretty), Style::default().fg(theme.muted))))
    } else {
      block
    };
    frame.render_widget(Paragraph::new(Line::from(text)).block(block), field_area);

    if focused {
      let cursor_x = field_area.x + 2 + display_width(&field.text, field.cursor) as u16;
      frame.set_cursor_position((cursor_x, field_area.y + 1));
    }
  }
  app.hits.start = Some(start_area);
  app.hits.end = Some(end_area);

  // Buttons sit on the middle row, aligned with the input text.
  let row = Rect { y: buttons_area.y + 1, height: 1, ..buttons_area };
  let submit = Rect { x: row.x + 1, width: (SUBMIT_LABEL.len() as u16).min(row.width.saturating_sub(1)), ..row };
  let reset = Rect {
    x: submit.right() + 2,
    width: (RESET_LABEL.len() as u16).min(row.right().saturating_sub(submit.right() + 2)),
    ..row
  };
  frame.render_widget(
    Span::styled(SUBMIT_LABEL, Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).bold()),
    submit,
  );
  frame.render_widget(Span::styled(RESET_LABEL, Style::default().fg(theme.key_fg).bg(theme.key_bg)), reset);
  app.hits.submit = Some(submit);
  app.hits.reset = Some(reset);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else {
    let color = match app.status.status {
      Status::LoadFailed | Status::Rejected(_) => theme.error,
      Status::Loading | Status::Count(_) => theme.status,
      Status::Prompt | Status::NoResults | Status::Clear => theme.muted,
    };
    (format!(" {}", app.status.status), Style::default().fg(color))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  if app.gallery.is_empty() {
    render_empty(frame, app.theme(), area);
    return;
  }
  let [list_area, preview_area] =
    Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);
  render_gallery(frame, app, list_area);
  render_preview(frame, app, preview_area);
}

fn render_empty(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("🌌  No images yet", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Choose a start and end date above, then press Enter.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("↑/↓ in a date field moves it by one day.", Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(rounded(theme)), area);
}

fn render_gallery(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Gallery && !app.modal_open();

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let selected = app.gallery.list_state.selected();

  let items: Vec<ListItem> = app
    .gallery
    .cards
    .iter()
    .enumerate()
    .map(|(i, card)| {
      let bg = if Some(i) == selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };
      let fg = if Some(i) == selected { theme.highlight_fg } else { theme.fg };

      let badge = format!("{:<5}", card.badge.label());
      let date_w = card.display_date.chars().count();
      let title_max = inner_w.saturating_sub(badge.len() + 1 + date_w + 2);
      let title = truncate_str(&card.title, title_max);
      let gap = inner_w.saturating_sub(badge.len() + 1 + title.chars().count() + date_w);

      let line = Line::from(vec![
        Span::styled(badge, Style::default().fg(badge_color(theme, card.badge)).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(card.display_date.clone(), Style::default().fg(if Some(i) == selected { fg } else { theme.muted })),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let border = if focused { theme.accent } else { theme.border };
  let list = List::new(items)
    .block(
      rounded(theme)
        .title(format!(" Gallery · {} ", app.gallery.cards.len()))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.gallery.list_state);

  // One row per card; record the visible ones for mouse activation.
  let inner = Rect {
    x: area.x + 1,
    y: area.y + 1,
    width: area.width.saturating_sub(2),
    height: area.height.saturating_sub(2),
  };
  let offset = app.gallery.list_state.offset();
  let visible = app.gallery.cards.len().saturating_sub(offset).min(inner.height as usize);
  app.hits.cards = (0..visible).map(|row| (Rect { y: inner.y + row as u16, height: 1, ..inner }, offset + row)).collect();
}

fn render_preview(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = rounded(theme)
    .title(Line::from(vec![
      Span::styled(" Preview ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
      Span::styled(format!("[{}] ", app.display_mode.label().to_lowercase()), Style::default().fg(theme.muted)),
    ]))
    .padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let Some(card) = app.gallery.selected() else { return };
  let [info_area, image_area] = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(inner);
  let inner_w = info_area.width as usize;
  let info = vec![
    Line::from(Span::styled(truncate_str(&card.title, inner_w), Style::default().fg(theme.fg).bold())),
    Line::from(vec![
      Span::styled(card.badge.label(), Style::default().fg(badge_color(theme, card.badge))),
      Span::styled(format!("  {}", card.display_date), Style::default().fg(theme.muted)),
    ]),
  ];
  frame.render_widget(Paragraph::new(info), info_area);

  let placeholder = |text: &'static str| {
    Paragraph::new(Line::from(Span::styled(text, Style::default().fg(theme.muted)))).alignment(Alignment::Center)
  };
  match &card.thumbnail {
    Thumbnail::Url(url) => {
      let pending = app.previews.wants(url);
      match app.previews.get(url) {
        Some(source) => {
          let image = app.fitted_preview.get_or_fit(url, source, image_area, app.display_mode);
          frame.render_widget(ImagePreview { image, mode: app.display_mode }, image_area);
        }
        None if pending => frame.render_widget(placeholder("Loading preview…"), image_area),
        None => frame.render_widget(placeholder("Preview unavailable"), image_area),
      }
    }
    Thumbnail::Placeholder => {
      frame.render_widget(VideoPlaceholder { style: Style::default().fg(theme.video_badge).bold() }, image_area)
    }
    Thumbnail::Missing => frame.render_widget(placeholder("No image"), image_area),
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = if app.modal_open() {
    vec![("Esc", "Close"), ("o", "Open in browser"), ("↑/↓", "Scroll")]
  } else {
    match app.focus {
      Focus::Start | Focus::End => {
        let mut k = vec![("Enter", "Get images"), ("↑/↓", "±1 day"), ("Tab", "Next"), ("^r", "Reset")];
        k.push(if app.gallery.is_empty() { ("Esc", "Quit") } else { ("Esc", "Gallery") });
        k
      }
      Focus::Gallery => vec![("Enter", "Open"), ("j/k", "Navigate"), ("r", "Reset"), ("Esc", "Dates"), ("q", "Quit")],
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("^t {} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let label_w = theme_label.chars().count() as u16;
  let right_area = Rect { x: area.x + area.width.saturating_sub(label_w), width: label_w, ..area };
  frame.render_widget(right, right_area);
}

// --- Modal ---

fn render_modal(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  let mode = app.display_mode;
  let Some(view) = app.modal.as_ref().and_then(|m| m.view()) else { return };

  let area = centered(frame.area(), 84, 86);
  frame.render_widget(Clear, area);

  let block = rounded(theme)
    .title(Span::styled(
      format!(" {} ", truncate_str(&view.title, area.width.saturating_sub(16) as usize)),
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    ))
    .title(Line::from(Span::styled(CLOSE_LABEL, Style::default().fg(theme.key_fg).bg(theme.key_bg))).right_aligned())
    .border_style(Style::default().fg(theme.accent))
    .style(Style::default().bg(theme.bg))
    .padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let close_w = CLOSE_LABEL.len() as u16;
  app.hits.modal = Some(area);
  app.hits.modal_close =
    Some(Rect { x: area.right().saturating_sub(close_w + 1), y: area.y, width: close_w, height: 1 });

  let [date_area, media_area, link_area, text_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Percentage(55),
    Constraint::Length(2),
    Constraint::Min(2),
  ])
  .areas(inner);

  frame.render_widget(Line::from(Span::styled(view.date.as_str(), Style::default().fg(theme.muted))), date_area);

  let muted = |text: String| {
    Paragraph::new(Line::from(Span::styled(text, Style::default().fg(theme.muted))))
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true })
  };
  let still = view.still_url();
  match (&view.image, still.as_deref()) {
    (Some(source), Some(url)) => {
      let image = app.fitted_modal.get_or_fit(url, source, media_area, mode);
      frame.render_widget(ImagePreview { image, mode }, media_area);
    }
    (None, Some(_)) => frame.render_widget(muted("Loading media…".to_string()), media_area),
    _ => match view.media {
      ModalMedia::Video { .. } => {
        frame.render_widget(VideoPlaceholder { style: Style::default().fg(theme.video_badge).bold() }, media_area)
      }
      ModalMedia::Image { .. } => frame.render_widget(muted("No image available.".to_string()), media_area),
      ModalMedia::Unsupported => {
        frame.render_widget(muted("Format not supported. Press o to open it.".to_string()), media_area)
      }
    },
  }

  let link = match &view.media {
    ModalMedia::Video { embed_url, .. } => Line::from(vec![
      Span::styled("▶ Video  ", Style::default().fg(theme.video_badge).bold()),
      Span::styled(embed_url.as_str(), Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED)),
    ]),
    _ => match view.external_url() {
      Some(url) => Line::from(Span::styled(url, Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED))),
      None => Line::default(),
    },
  };
  frame.render_widget(Paragraph::new(link).wrap(Wrap { trim: true }), link_area);

  let explanation = if view.explanation.is_empty() { "No description provided." } else { view.explanation.as_str() };
  frame.render_widget(
    Paragraph::new(explanation).style(Style::default().fg(theme.fg)).wrap(Wrap { trim: true }).scroll((view.scroll, 0)),
    text_area,
  );
}
