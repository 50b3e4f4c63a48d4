use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::{Alignment, Rect},
  style::{Color, Style},
  text::Line,
  widgets::{Paragraph, Widget},
};

use crate::display::DisplayMode;

const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// Scale `image` to fit a `cols` x `rows` cell area, keeping its aspect ratio.
pub fn fit_to_cells(image: &DynamicImage, cols: u16, rows: u16, mode: DisplayMode) -> DynamicImage {
  let max_w = u32::from(cols).max(1);
  // Cells are roughly twice as tall as wide; ASCII squashes vertically to compensate.
  let max_h = (u32::from(rows) * mode.rows_per_cell()).max(1);
  let (w, h) = (image.width().max(1), image.height().max(1));
  let (target_w, target_h) = match mode {
    DisplayMode::Direct => (max_w, max_h),
    DisplayMode::Ascii => (max_w, max_h.min((max_w * h).div_ceil(w * 2).max(1))),
  };
  image.resize(target_w, target_h, FilterType::Triangle)
}

/// Draws an already-fitted image centered in its area.
pub struct ImagePreview<'a> {
  pub image: &'a DynamicImage,
  pub mode: DisplayMode,
}

impl Widget for ImagePreview<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.mode {
      DisplayMode::Direct => draw_half_blocks(self.image, area, buf),
      DisplayMode::Ascii => draw_ascii(self.image, area, buf),
    }
  }
}

fn centered_origin(area: Rect, cols: u32, rows: u32) -> (u16, u16) {
  let dx = (u32::from(area.width).saturating_sub(cols) / 2) as u16;
  let dy = (u32::from(area.height).saturating_sub(rows) / 2) as u16;
  (area.x.saturating_add(dx), area.y.saturating_add(dy))
}

fn draw_half_blocks(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let cols = rgb.width().min(u32::from(area.width));
  let rows = rgb.height().div_ceil(2).min(u32::from(area.height));
  let (x0, y0) = centered_origin(area, cols, rows);

  for row in 0..rows {
    for col in 0..cols {
      let top = rgb.get_pixel(col, row * 2);
      let bottom = if row * 2 + 1 < rgb.height() {
        let p = rgb.get_pixel(col, row * 2 + 1);
        Color::Rgb(p[0], p[1], p[2])
      } else {
        Color::Reset
      };
      if let Some(cell) = buf.cell_mut((x0 + col as u16, y0 + row as u16)) {
        cell.set_symbol("▀").set_style(Style::default().fg(Color::Rgb(top[0], top[1], top[2])).bg(bottom));
      }
    }
  }
}

fn draw_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let luma = image.to_luma8();
  let cols = luma.width().min(u32::from(area.width));
  let rows = luma.height().min(u32::from(area.height));
  let (x0, y0) = centered_origin(area, cols, rows);
  let last = ASCII_RAMP.len() - 1;

  for row in 0..rows {
    for col in 0..cols {
      let level = usize::from(luma.get_pixel(col, row)[0]) * last / 255;
      if let Some(cell) = buf.cell_mut((x0 + col as u16, y0 + row as u16)) {
        cell.set_char(char::from(ASCII_RAMP[level]));
      }
    }
  }
}

/// Stand-in for a video without any thumbnail.
pub struct VideoPlaceholder {
  pub style: Style,
}

impl Widget for VideoPlaceholder {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
      return;
    }
    let mid = Rect { y: area.y + area.height / 2, height: 1, ..area };
    Paragraph::new(Line::from("▶  VIDEO")).alignment(Alignment::Center).style(self.style).render(mid, buf);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fit_respects_cell_budget() {
    let image = DynamicImage::new_rgb8(400, 200);
    let fitted = fit_to_cells(&image, 40, 10, DisplayMode::Direct);
    assert!(fitted.width() <= 40);
    assert!(fitted.height() <= 20);

    let ascii = fit_to_cells(&image, 40, 10, DisplayMode::Ascii);
    assert!(ascii.width() <= 40);
    assert!(ascii.height() <= 10);
  }

  #[test]
  fn half_blocks_stay_inside_area() {
    let image = DynamicImage::new_rgb8(4, 4);
    let area = Rect::new(2, 1, 10, 5);
    let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
    ImagePreview { image: &image, mode: DisplayMode::Direct }.render(area, &mut buf);
    // 4x4 pixels -> 4 cols x 2 rows, centered at (5, 2).
    assert_eq!(buf[(5, 2)].symbol(), "▀");
    assert_eq!(buf[(8, 3)].symbol(), "▀");
    assert_eq!(buf[(4, 2)].symbol(), " ");
    assert_eq!(buf[(5, 4)].symbol(), " ");
  }

  #[test]
  fn ascii_maps_black_to_blank_and_white_to_at() {
    let mut image = image::GrayImage::new(2, 1);
    image.put_pixel(1, 0, image::Luma([255]));
    let image = DynamicImage::ImageLuma8(image);
    let area = Rect::new(0, 0, 2, 1);
    let mut buf = Buffer::empty(area);
    ImagePreview { image: &image, mode: DisplayMode::Ascii }.render(area, &mut buf);
    assert_eq!(buf[(0, 0)].symbol(), " ");
    assert_eq!(buf[(1, 0)].symbol(), "@");
  }
}
