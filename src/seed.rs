//! Static sample data used when a backend source is unavailable.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
  config::{Config, ConfigError},
  map::entities::{Challenge, Place, Territory},
};

/// Fallback collections, one per backend source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
  pub territories: Vec<Territory>,
  pub places: Vec<Place>,
  pub challenges: Vec<Challenge>,
}

impl SeedData {
  /// The seed compiled into the crate. Only places are seeded.
  #[must_use]
  pub fn builtin() -> Self {
    Self {
      territories: Vec::new(),
      places: builtin_places(),
      challenges: Vec::new(),
    }
  }

  /// Reads a seed file. Collections missing from the file are empty.
  ///
  /// # Errors
  /// If the file cannot be read or parsed.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// The configured seed file, collection by collection over the built-in
  /// seed: an empty collection in the file keeps the built-in one.
  #[must_use]
  pub fn from_config(config: &Config) -> Self {
    let builtin = Self::builtin();
    let Some(path) = &config.seed_file else {
      return builtin;
    };
    match Self::from_file(path) {
      Ok(file) => {
        info!(
          "Loaded seed file {}: {} territories, {} places, {} challenges",
          path.display(),
          file.territories.len(),
          file.places.len(),
          file.challenges.len()
        );
        file.or(builtin)
      }
      Err(e) => {
        warn!("Ignoring seed file: {e}");
        builtin
      }
    }
  }

  fn or(self, other: Self) -> Self {
    fn pick<T>(mine: Vec<T>, theirs: Vec<T>) -> Vec<T> {
      if mine.is_empty() { theirs } else { mine }
    }
    Self {
      territories: pick(self.territories, other.territories),
      places: pick(self.places, other.places),
      challenges: pick(self.challenges, other.challenges),
    }
  }
}

fn builtin_place(
  id: &str,
  name: &str,
  (lat, lng): (f64, f64),
  tags: &[&str],
  best_time: &str,
  description: &str,
) -> Place {
  Place {
    id: id.to_string(),
    name: name.to_string(),
    lat,
    lng,
    tags: tags.iter().map(ToString::to_string).collect(),
    best_time: best_time.to_string(),
    description: description.to_string(),
  }
}

fn builtin_places() -> Vec<Place> {
  vec![
    builtin_place(
      "p1",
      "Parque do Sabia",
      (-19.744, -47.936),
      &["plano", "iluminado"],
      "18-20h",
      "Otimo pra corrida leve e longao.",
    ),
    builtin_place(
      "p2",
      "Pista Sul",
      (-19.758, -47.928),
      &["tiros", "rapido"],
      "06-08h",
      "Pista mais rapida da cidade.",
    ),
    builtin_place(
      "p3",
      "Avenida Azul",
      (-19.752, -47.918),
      &["longao", "seguro"],
      "19-21h",
      "Ideal para longoes e ritmo constante.",
    ),
  ]
}
