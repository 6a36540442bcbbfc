use std::path::{Path, PathBuf};

use dirs::home_dir;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::map::coordinates::{BoundingBox, WGS84Coordinate};

pub const DEFAULT_API_BASE: &str = "https://inmoovi-backend-production.up.railway.app";
pub const DEFAULT_CITY: &str = "Uberlandia";
pub const DEFAULT_WHATSAPP_NUMBER: &str = "5534992423942";
pub const DEFAULT_LINK_SOURCE: &str = "landing";
pub const DEFAULT_MINIMUM_CHALLENGES: usize = 3;
/// Downward sheet drag, in logical pixels, past which the sheet closes.
pub const DEFAULT_DRAG_DISMISS_THRESHOLD: f64 = 120.0;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Could not read {path}: {source}")]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("Could not parse {path}: {source}")]
  Parse {
    path: PathBuf,
    source: serde_json::Error,
  },
}

/// Where the map starts before any data arrives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialView {
  pub center: WGS84Coordinate,
  pub zoom: u8,
  /// Half the width of the territory query box, in degrees.
  pub half_span: f64,
}

impl InitialView {
  #[must_use]
  pub fn bbox(&self) -> BoundingBox {
    BoundingBox::around(self.center, self.half_span)
  }
}

impl Default for InitialView {
  fn default() -> Self {
    Self {
      center: WGS84Coordinate::new(-19.752, -47.932),
      zoom: 13,
      half_span: 0.03,
    }
  }
}

/// A modal that can be opened by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalDefinition {
  pub id: String,
  pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub config_path: Option<PathBuf>,
  pub api_base: Option<String>,
  pub city: Option<String>,
  pub initial_view: Option<InitialView>,
  pub minimum_challenges: Option<usize>,
  pub drag_dismiss_threshold: Option<f64>,
  pub whatsapp_number: Option<String>,
  pub link_source: Option<String>,
  pub seed_file: Option<PathBuf>,
  pub sections: Vec<String>,
  pub modals: Vec<ModalDefinition>,
}

impl Config {
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    let from_file = Self::from_file();
    let default = Self::default();

    let mut merged = from_env;
    if let Some(from_file) = &from_file {
      merged = merged.merge(from_file);
    }
    merged = merged.merge(&default);

    if merged.config_path.is_some() && from_file.is_none() {
      merged.init_cfg_file();
    }

    merged
  }

  /// Applies the `api` parameter of a page query string (`?api=...`).
  /// It is read once and takes precedence over every other source.
  #[must_use]
  pub fn with_query_override(mut self, query: &str) -> Self {
    let api = query
      .trim_start_matches('?')
      .split('&')
      .filter_map(|pair| pair.split_once('='))
      .find(|(key, _)| *key == "api")
      .and_then(|(_, value)| urlencoding::decode(value).ok())
      .map(|value| value.trim().to_string())
      .filter(|value| !value.is_empty());
    if let Some(api) = api {
      debug!("Backend overridden by query string: {api}");
      self.api_base = Some(api);
    }
    self
  }

  #[must_use]
  pub fn api_base(&self) -> &str {
    self
      .api_base
      .as_deref()
      .unwrap_or(DEFAULT_API_BASE)
      .trim_end_matches('/')
  }

  #[must_use]
  pub fn city(&self) -> &str {
    self.city.as_deref().unwrap_or(DEFAULT_CITY)
  }

  #[must_use]
  pub fn initial_view(&self) -> InitialView {
    self.initial_view.unwrap_or_default()
  }

  #[must_use]
  pub fn minimum_challenges(&self) -> usize {
    self
      .minimum_challenges
      .unwrap_or(DEFAULT_MINIMUM_CHALLENGES)
  }

  #[must_use]
  pub fn drag_dismiss_threshold(&self) -> f64 {
    self
      .drag_dismiss_threshold
      .unwrap_or(DEFAULT_DRAG_DISMISS_THRESHOLD)
  }

  #[must_use]
  pub fn whatsapp_number(&self) -> &str {
    self
      .whatsapp_number
      .as_deref()
      .unwrap_or(DEFAULT_WHATSAPP_NUMBER)
  }

  #[must_use]
  pub fn link_source(&self) -> &str {
    self.link_source.as_deref().unwrap_or(DEFAULT_LINK_SOURCE)
  }

  fn empty() -> Self {
    Self {
      config_path: None,
      api_base: None,
      city: None,
      initial_view: None,
      minimum_challenges: None,
      drag_dismiss_threshold: None,
      whatsapp_number: None,
      link_source: None,
      seed_file: None,
      sections: Vec::new(),
      modals: Vec::new(),
    }
  }

  fn from_env() -> Self {
    let config_path = std::env::var("RUNMAP_CONFIG").ok().map(PathBuf::from);
    let api_base = std::env::var("RUNMAP_API").ok().filter(|v| !v.is_empty());
    let seed_file = std::env::var("RUNMAP_SEED_FILE").ok().map(PathBuf::from);

    Self {
      config_path,
      api_base,
      seed_file,
      ..Self::empty()
    }
  }

  fn merge(mut self, other: &Self) -> Self {
    self.config_path = self.config_path.or(other.config_path.clone());
    self.api_base = self.api_base.or(other.api_base.clone());
    self.city = self.city.or(other.city.clone());
    self.initial_view = self.initial_view.or(other.initial_view);
    self.minimum_challenges = self.minimum_challenges.or(other.minimum_challenges);
    self.drag_dismiss_threshold = self.drag_dismiss_threshold.or(other.drag_dismiss_threshold);
    self.whatsapp_number = self.whatsapp_number.or(other.whatsapp_number.clone());
    self.link_source = self.link_source.or(other.link_source.clone());
    self.seed_file = self.seed_file.or(other.seed_file.clone());

    for section in &other.sections {
      if !self.sections.contains(section) {
        self.sections.push(section.clone());
      }
    }

    for modal in &other.modals {
      if !self.modals.iter().any(|m| m.id == modal.id) {
        self.modals.push(modal.clone());
      }
    }

    self
  }

  fn default_config_path() -> Option<PathBuf> {
    std::env::var("RUNMAP_CONFIG")
      .ok()
      .map(PathBuf::from)
      .or_else(|| home_dir().map(|p| p.join(".config").join("runmap")))
  }

  fn from_file() -> Option<Self> {
    let config_path = Self::default_config_path()?.join("config.json");
    Self::read_file(&config_path)
      .inspect_err(|e| {
        if !matches!(e, ConfigError::Read { .. }) {
          error!("Failed to read config file: {e}");
        }
      })
      .ok()
  }

  /// Reads a config file. Fields missing from the file take their defaults.
  ///
  /// # Errors
  /// If the file cannot be read or is not a valid config.
  pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  fn init_cfg_file(&self) {
    let Some(path) = &self.config_path else {
      return;
    };
    if !path.exists() {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create config directory: {e}");
      });
    }

    let path = path.join("config.json");
    if !path.exists() {
      match serde_json::to_string_pretty(self) {
        Ok(config) => {
          let _ = std::fs::write(path, config).inspect_err(|e| {
            error!("Failed to write config file: {e}");
          });
        }
        Err(e) => error!("Failed to serialize config: {e}"),
      }
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      config_path: home_dir().map(|p| p.join(".config").join("runmap")),
      api_base: Some(DEFAULT_API_BASE.to_string()),
      city: Some(DEFAULT_CITY.to_string()),
      initial_view: Some(InitialView::default()),
      minimum_challenges: Some(DEFAULT_MINIMUM_CHALLENGES),
      drag_dismiss_threshold: Some(DEFAULT_DRAG_DISMISS_THRESHOLD),
      whatsapp_number: Some(DEFAULT_WHATSAPP_NUMBER.to_string()),
      link_source: Some(DEFAULT_LINK_SOURCE.to_string()),
      seed_file: None,
      sections: vec![
        "mapa".to_string(),
        "lugares".to_string(),
        "desafios".to_string(),
      ],
      modals: vec![
        ModalDefinition {
          id: "how-it-works".to_string(),
          title: "How it works".to_string(),
        },
        ModalDefinition {
          id: "faq".to_string(),
          title: "FAQ".to_string(),
        },
      ],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let config = Config::default();
    assert_eq!(config.api_base(), DEFAULT_API_BASE);
    assert_eq!(config.city(), "Uberlandia");
    assert_eq!(config.minimum_challenges(), 3);
    assert!((config.drag_dismiss_threshold() - 120.0).abs() < f64::EPSILON);
    assert_eq!(config.initial_view().zoom, 13);
  }

  #[test]
  fn empty_config_falls_back_to_constants() {
    let config = Config::empty();
    assert_eq!(config.api_base(), DEFAULT_API_BASE);
    assert_eq!(config.whatsapp_number(), DEFAULT_WHATSAPP_NUMBER);
    assert_eq!(config.link_source(), "landing");
  }

  #[test]
  fn merge_prefers_self_and_dedups() {
    let mut first = Config::empty();
    first.api_base = Some("http://localhost:8080".to_string());
    first.sections = vec!["mapa".to_string()];
    let merged = first.merge(&Config::default());
    assert_eq!(merged.api_base(), "http://localhost:8080");
    assert_eq!(merged.city(), DEFAULT_CITY);
    assert_eq!(merged.sections, vec!["mapa", "lugares", "desafios"]);
    assert_eq!(merged.modals.len(), 2);
  }

  #[test]
  fn query_override() {
    let config =
      Config::default().with_query_override("?foo=1&api=http%3A%2F%2Flocalhost%3A3000%2F");
    assert_eq!(config.api_base(), "http://localhost:3000");
  }

  #[test]
  fn empty_query_override_is_ignored() {
    let config = Config::default().with_query_override("api=&x=2");
    assert_eq!(config.api_base(), DEFAULT_API_BASE);
    let config = Config::default().with_query_override("");
    assert_eq!(config.api_base(), DEFAULT_API_BASE);
  }

  #[test]
  fn partial_file_gets_defaults() {
    let config: Config = serde_json::from_str(r#"{"city": "Uberaba"}"#).unwrap();
    assert_eq!(config.city(), "Uberaba");
    assert_eq!(config.minimum_challenges(), 3);
  }

  #[test]
  fn read_missing_file() {
    let err = Config::read_file(Path::new("/nonexistent/runmap/config.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }
}
