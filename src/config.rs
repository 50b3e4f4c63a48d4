use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// User preferences persisted to `prefs.toml`. CLI flags win over these.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq, Eq)]
pub struct Config {
  pub theme_name: Option<String>,
  pub feed_url: Option<String>,
  /// e.g. `fr_FR`; falls back to the environment's locale.
  pub locale: Option<String>,
  /// `false` opens items in the browser instead of the detail overlay.
  pub modal: Option<bool>,
}

impl Config {
  pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "apodview")
  }

  pub fn load() -> Self {
    if let Some(proj_dirs) = Self::project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        match Self::parse(&content) {
          Ok(config) => return config,
          Err(e) => warn!(path = %config_file.display(), err = %e, "config: ignoring unreadable prefs"),
        }
      }
    }
    Self::default()
  }

  pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = Self::project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  pub fn modal_enabled(&self) -> bool {
    self.modal.unwrap_or(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_prefs_are_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config, Config::default());
    assert!(config.modal_enabled());
  }

  #[test]
  fn prefs_round_trip_through_toml() {
    let config = Config {
      theme_name: Some("Nebula".into()),
      feed_url: Some("https://example.com/feed.json".into()),
      locale: Some("fr_FR".into()),
      modal: Some(false),
    };
    let text = toml::to_string(&config).unwrap();
    assert_eq!(Config::parse(&text).unwrap(), config);
    assert!(!config.modal_enabled());
  }

  #[test]
  fn wrong_types_are_rejected() {
    assert!(Config::parse("modal = \"yes\"").is_err());
  }
}
