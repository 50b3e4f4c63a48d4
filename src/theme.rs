use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
  pub image_badge: Color,
  pub video_badge: Color,
}

pub const THEMES: &[Theme] = &[
  Theme {
    name: "Nebula",
    bg: Color::Rgb(14, 12, 28),
    fg: Color::Rgb(226, 224, 240),
    muted: Color::Rgb(128, 122, 160),
    accent: Color::Rgb(190, 140, 255),
    border: Color::Rgb(70, 60, 110),
    highlight_fg: Color::Rgb(14, 12, 28),
    highlight_bg: Color::Rgb(190, 140, 255),
    stripe_bg: Color::Rgb(22, 19, 40),
    status: Color::Rgb(120, 200, 255),
    error: Color::Rgb(255, 120, 140),
    key_fg: Color::Rgb(14, 12, 28),
    key_bg: Color::Rgb(128, 122, 160),
    image_badge: Color::Rgb(120, 200, 255),
    video_badge: Color::Rgb(255, 170, 90),
  },
  Theme {
    name: "Daylight",
    bg: Color::Rgb(248, 246, 240),
    fg: Color::Rgb(40, 40, 48),
    muted: Color::Rgb(130, 128, 120),
    accent: Color::Rgb(30, 100, 200),
    border: Color::Rgb(200, 196, 186),
    highlight_fg: Color::Rgb(248, 246, 240),
    highlight_bg: Color::Rgb(30, 100, 200),
    stripe_bg: Color::Rgb(238, 235, 226),
    status: Color::Rgb(20, 120, 90),
    error: Color::Rgb(190, 40, 50),
    key_fg: Color::Rgb(248, 246, 240),
    key_bg: Color::Rgb(130, 128, 120),
    image_badge: Color::Rgb(30, 100, 200),
    video_badge: Color::Rgb(200, 90, 20),
  },
  Theme {
    name: "Terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    muted: Color::DarkGray,
    accent: Color::Cyan,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    status: Color::Green,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
    image_badge: Color::Blue,
    video_badge: Color::Yellow,
  },
];

pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|name| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(name))).unwrap_or(0)
}
