use color_eyre::{eyre::eyre, Result};
use ratatui::prelude::Color;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  /// Breed list page size (the `limit` of each page fetch)
  pub page_size: u32,
  /// Color scheme preference
  pub theme: Theme,
  /// Custom label for the header (defaults to the API domain)
  pub title: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      page_size: 12,
      theme: Theme::default(),
      title: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: "https://api.thedogapi.com/v1/".to_string(),
    }
  }
}

/// Light/dark preference, a plain config key outside the cache's concern.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Dark,
  Light,
}

impl Theme {
  pub fn accent(self) -> Color {
    match self {
      Theme::Dark => Color::Cyan,
      Theme::Light => Color::Blue,
    }
  }

  pub fn text(self) -> Color {
    match self {
      Theme::Dark => Color::White,
      Theme::Light => Color::Black,
    }
  }

  pub fn dim(self) -> Color {
    Color::DarkGray
  }

  pub fn bg(self) -> Color {
    match self {
      Theme::Dark => Color::Black,
      Theme::Light => Color::Gray,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./d9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/d9s/config.yaml
  ///
  /// The public API works without configuration, so a missing file falls
  /// back to defaults.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("d9s.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("d9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the API key from environment variables, if any.
  ///
  /// Checks D9S_API_KEY first, then DOG_API_KEY as fallback. The key raises
  /// rate limits; the catalog endpoints answer without one.
  pub fn get_api_key() -> Option<String> {
    std::env::var("D9S_API_KEY")
      .or_else(|_| std::env::var("DOG_API_KEY"))
      .ok()
      .filter(|k| !k.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.page_size, 12);
    assert_eq!(config.theme, Theme::Dark);
    assert!(config.api.url.starts_with("https://"));
  }

  #[test]
  fn test_parse_partial_yaml() {
    let config: Config = serde_yaml::from_str("page_size: 24\ntheme: light\n").unwrap();
    assert_eq!(config.page_size, 24);
    assert_eq!(config.theme, Theme::Light);
    // Unset sections keep their defaults
    assert_eq!(config.api.url, ApiConfig::default().url);
  }
}
