use std::{
  fmt::Display,
  sync::atomic::{AtomicBool, Ordering},
};

use log::{debug, info, warn};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
  config::Config,
  map::{
    coordinates::BoundingBox,
    entities::{Challenge, Place, Territory},
  },
  seed::SeedData,
};

/// One of the three independent backend collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
  Territories,
  Places,
  Challenges,
}

impl Display for DataSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DataSource::Territories => write!(f, "territories"),
      DataSource::Places => write!(f, "places"),
      DataSource::Challenges => write!(f, "challenges"),
    }
  }
}

#[derive(Error, Debug)]
pub enum LoadError {
  #[error("{data} request failed: {message}")]
  Transport { data: DataSource, message: String },
  #[error("{data} request returned status {status}")]
  Status { data: DataSource, status: u16 },
  #[error("{data} response could not be decoded: {message}")]
  Decode { data: DataSource, message: String },
  #[error("A load is already in progress.")]
  InFlight,
}

/// Query for `GET territories?bbox=W,S,E,N&z=<zoom>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerritoryQuery {
  pub bbox: BoundingBox,
  pub zoom: u8,
}

/// Query for `GET places?city=<name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
  pub city: String,
}

/// The caller-supplied parameters of one load cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
  pub territories: TerritoryQuery,
  pub places: PlaceQuery,
}

impl LoadRequest {
  #[must_use]
  pub fn from_config(config: &Config) -> Self {
    let view = config.initial_view();
    Self {
      territories: TerritoryQuery {
        bbox: view.bbox(),
        zoom: view.zoom,
      },
      places: PlaceQuery {
        city: config.city().to_string(),
      },
    }
  }
}

/// The remote source of the three collections.
#[async_trait::async_trait]
pub trait MapBackend: Send + Sync {
  async fn territories(&self, query: &TerritoryQuery) -> Result<Vec<Territory>, LoadError>;

  async fn places(&self, query: &PlaceQuery) -> Result<Vec<Place>, LoadError>;

  async fn challenges(&self) -> Result<Vec<Challenge>, LoadError>;
}

/// Talks JSON to the map backend over HTTP.
pub struct HttpBackend {
  base_url: String,
  client: surf::Client,
}

impl HttpBackend {
  #[must_use]
  pub fn new(base_url: &str) -> Self {
    Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      client: surf::Client::new(),
    }
  }

  #[must_use]
  pub fn from_config(config: &Config) -> Self {
    Self::new(config.api_base())
  }

  #[must_use]
  pub fn territories_url(&self, query: &TerritoryQuery) -> String {
    format!(
      "{}/api/map/territories?bbox={}&z={}",
      self.base_url,
      query.bbox.query_value(),
      query.zoom
    )
  }

  #[must_use]
  pub fn places_url(&self, query: &PlaceQuery) -> String {
    format!(
      "{}/api/map/places?city={}",
      self.base_url,
      urlencoding::encode(&query.city)
    )
  }

  #[must_use]
  pub fn challenges_url(&self) -> String {
    format!("{}/api/challenges", self.base_url)
  }

  async fn get_list<T: DeserializeOwned>(
    &self,
    data: DataSource,
    url: &str,
  ) -> Result<Vec<T>, LoadError> {
    debug!("Requesting {data}: {url}");
    let mut response = self
      .client
      .get(url)
      .await
      .map_err(|e| LoadError::Transport {
        data,
        message: e.to_string(),
      })?;

    if !response.status().is_success() {
      return Err(LoadError::Status {
        data,
        status: u16::from(response.status()),
      });
    }

    let body = response
      .body_string()
      .await
      .map_err(|e| LoadError::Transport {
        data,
        message: e.to_string(),
      })?;
    serde_json::from_str(&body).map_err(|e| LoadError::Decode {
      data,
      message: e.to_string(),
    })
  }
}

#[async_trait::async_trait]
impl MapBackend for HttpBackend {
  async fn territories(&self, query: &TerritoryQuery) -> Result<Vec<Territory>, LoadError> {
    self
      .get_list(DataSource::Territories, &self.territories_url(query))
      .await
  }

  async fn places(&self, query: &PlaceQuery) -> Result<Vec<Place>, LoadError> {
    self
      .get_list(DataSource::Places, &self.places_url(query))
      .await
  }

  async fn challenges(&self) -> Result<Vec<Challenge>, LoadError> {
    self
      .get_list(DataSource::Challenges, &self.challenges_url())
      .await
  }
}

/// The settled result of each source, kept apart so one failure never hides
/// the others.
#[derive(Debug)]
pub struct LoadOutcome {
  pub territories: Result<Vec<Territory>, LoadError>,
  pub places: Result<Vec<Place>, LoadError>,
  pub challenges: Result<Vec<Challenge>, LoadError>,
}

impl LoadOutcome {
  /// Replaces every failed source by its seed collection.
  #[must_use]
  pub fn into_dataset(self, seed: &SeedData) -> Dataset {
    let mut fallbacks = Vec::new();
    let territories = settle(
      DataSource::Territories,
      self.territories,
      &seed.territories,
      &mut fallbacks,
    );
    let places = settle(DataSource::Places, self.places, &seed.places, &mut fallbacks);
    let challenges = settle(
      DataSource::Challenges,
      self.challenges,
      &seed.challenges,
      &mut fallbacks,
    );
    Dataset {
      territories,
      places,
      challenges,
      fallbacks,
      synthesized: 0,
    }
  }
}

fn settle<T: Clone>(
  data: DataSource,
  result: Result<Vec<T>, LoadError>,
  seed: &[T],
  fallbacks: &mut Vec<DataSource>,
) -> Vec<T> {
  match result {
    Ok(items) => items,
    Err(e) => {
      warn!("Loading {data} failed: {e}");
      info!("Using {} seed {data}", seed.len());
      fallbacks.push(data);
      seed.to_vec()
    }
  }
}

/// The three collections of one load cycle. Replaced wholesale on reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
  pub territories: Vec<Territory>,
  pub places: Vec<Place>,
  pub challenges: Vec<Challenge>,
  /// Sources that were replaced by seed data.
  pub fallbacks: Vec<DataSource>,
  /// How many challenges at the end of `challenges` are synthetic.
  pub synthesized: usize,
}

impl Dataset {
  #[must_use]
  pub fn territory(&self, id: &str) -> Option<&Territory> {
    self.territories.iter().find(|t| t.id == id)
  }

  #[must_use]
  pub fn place(&self, id: &str) -> Option<&Place> {
    self.places.iter().find(|p| p.id == id)
  }

  #[must_use]
  pub fn challenge(&self, id: &str) -> Option<&Challenge> {
    self.challenges.iter().find(|c| c.id == id)
  }
}

/// Issues the three requests together and waits for all of them to settle.
pub struct DataLoader<B> {
  backend: B,
  in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

impl<B: MapBackend> DataLoader<B> {
  #[must_use]
  pub fn new(backend: B) -> Self {
    Self {
      backend,
      in_flight: AtomicBool::new(false),
    }
  }

  #[must_use]
  pub fn is_loading(&self) -> bool {
    self.in_flight.load(Ordering::Acquire)
  }

  /// Fetches territories, places and challenges concurrently.
  ///
  /// # Errors
  /// `LoadError::InFlight` if a previous load has not settled yet. Failures
  /// of individual sources are reported inside the outcome.
  pub async fn load_all(&self, request: &LoadRequest) -> Result<LoadOutcome, LoadError> {
    if self.in_flight.swap(true, Ordering::AcqRel) {
      warn!("Rejecting load: another load is still in flight");
      return Err(LoadError::InFlight);
    }
    let _guard = InFlightGuard(&self.in_flight);

    let (territories, places, challenges) = tokio::join!(
      self.backend.territories(&request.territories),
      self.backend.places(&request.places),
      self.backend.challenges(),
    );
    debug!(
      "Load settled: territories ok={}, places ok={}, challenges ok={}",
      territories.is_ok(),
      places.is_ok(),
      challenges.is_ok()
    );

    Ok(LoadOutcome {
      territories,
      places,
      challenges,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use tokio::sync::Notify;

  use super::*;
  use crate::map::coordinates::WGS84Coordinate;

  fn territory(id: &str, score: f64) -> Territory {
    Territory {
      id: id.to_string(),
      label: id.to_uppercase(),
      lat: -19.75,
      lng: -47.93,
      score,
      streak_weeks: 1,
      consistency: 50,
      peak: "18-20".to_string(),
      good_for: String::new(),
    }
  }

  struct FakeBackend {
    territories_fail: bool,
    places_fail: bool,
    challenges_fail: bool,
  }

  #[async_trait::async_trait]
  impl MapBackend for FakeBackend {
    async fn territories(&self, _query: &TerritoryQuery) -> Result<Vec<Territory>, LoadError> {
      if self.territories_fail {
        Err(LoadError::Status {
          data: DataSource::Territories,
          status: 500,
        })
      } else {
        Ok(vec![territory("t1", 0.9)])
      }
    }

    async fn places(&self, _query: &PlaceQuery) -> Result<Vec<Place>, LoadError> {
      if self.places_fail {
        Err(LoadError::Transport {
          data: DataSource::Places,
          message: "connection refused".to_string(),
        })
      } else {
        Ok(vec![])
      }
    }

    async fn challenges(&self) -> Result<Vec<Challenge>, LoadError> {
      if self.challenges_fail {
        Err(LoadError::Decode {
          data: DataSource::Challenges,
          message: "expected array".to_string(),
        })
      } else {
        Ok(vec![])
      }
    }
  }

  fn request() -> LoadRequest {
    LoadRequest::from_config(&Config::default())
  }

  #[tokio::test]
  async fn one_failure_does_not_affect_others() {
    let loader = DataLoader::new(FakeBackend {
      territories_fail: false,
      places_fail: true,
      challenges_fail: false,
    });
    let outcome = loader.load_all(&request()).await.unwrap();
    assert!(outcome.territories.is_ok());
    assert!(outcome.places.is_err());
    assert!(outcome.challenges.is_ok());

    let dataset = outcome.into_dataset(&SeedData::builtin());
    assert_eq!(dataset.territories.len(), 1);
    assert_eq!(dataset.places, SeedData::builtin().places);
    assert_eq!(dataset.fallbacks, vec![DataSource::Places]);
    assert!(!loader.is_loading());
  }

  #[tokio::test]
  async fn all_failures_fall_back_to_seed() {
    let loader = DataLoader::new(FakeBackend {
      territories_fail: true,
      places_fail: true,
      challenges_fail: true,
    });
    let dataset = loader
      .load_all(&request())
      .await
      .unwrap()
      .into_dataset(&SeedData::builtin());
    assert!(dataset.territories.is_empty());
    assert_eq!(dataset.places.len(), 3);
    assert!(dataset.challenges.is_empty());
    assert_eq!(
      dataset.fallbacks,
      vec![
        DataSource::Territories,
        DataSource::Places,
        DataSource::Challenges
      ]
    );
  }

  #[tokio::test]
  async fn successful_empty_list_is_not_replaced() {
    let loader = DataLoader::new(FakeBackend {
      territories_fail: false,
      places_fail: false,
      challenges_fail: false,
    });
    let dataset = loader
      .load_all(&request())
      .await
      .unwrap()
      .into_dataset(&SeedData::builtin());
    assert!(dataset.places.is_empty());
    assert!(dataset.fallbacks.is_empty());
  }

  struct GatedBackend {
    entered: Arc<Notify>,
    release: Arc<Notify>,
  }

  #[async_trait::async_trait]
  impl MapBackend for GatedBackend {
    async fn territories(&self, _query: &TerritoryQuery) -> Result<Vec<Territory>, LoadError> {
      self.entered.notify_one();
      self.release.notified().await;
      Ok(vec![])
    }

    async fn places(&self, _query: &PlaceQuery) -> Result<Vec<Place>, LoadError> {
      Ok(vec![])
    }

    async fn challenges(&self) -> Result<Vec<Challenge>, LoadError> {
      Ok(vec![])
    }
  }

  #[tokio::test]
  async fn second_load_is_rejected_while_in_flight() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let loader = Arc::new(DataLoader::new(GatedBackend {
      entered: entered.clone(),
      release: release.clone(),
    }));

    let first = {
      let loader = loader.clone();
      tokio::spawn(async move { loader.load_all(&request()).await })
    };
    entered.notified().await;
    assert!(loader.is_loading());

    let second = loader.load_all(&request()).await;
    assert!(matches!(second, Err(LoadError::InFlight)));

    release.notify_one();
    assert!(first.await.unwrap().is_ok());
    assert!(!loader.is_loading());
  }

  #[test]
  fn http_urls() {
    let backend = HttpBackend::new("http://localhost:3000/");
    let query = TerritoryQuery {
      bbox: BoundingBox::new(-48.0, -20.0, -47.0, -19.0),
      zoom: 13,
    };
    assert_eq!(
      backend.territories_url(&query),
      "http://localhost:3000/api/map/territories?bbox=-48,-20,-47,-19&z=13"
    );
    assert_eq!(
      backend.places_url(&PlaceQuery {
        city: "São Paulo".to_string()
      }),
      "http://localhost:3000/api/map/places?city=S%C3%A3o%20Paulo"
    );
    assert_eq!(
      backend.challenges_url(),
      "http://localhost:3000/api/challenges"
    );
  }

  #[test]
  fn request_from_config() {
    let request = request();
    assert_eq!(request.places.city, "Uberlandia");
    assert_eq!(request.territories.zoom, 13);
    assert!(
      request
        .territories
        .bbox
        .contains(WGS84Coordinate::new(-19.752, -47.932))
    );
  }
}
