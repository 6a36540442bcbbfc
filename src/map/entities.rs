use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::coordinates::WGS84Coordinate;

/// A geographic zone with a dominance score and a best-activity time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Territory {
  pub id: String,
  #[serde(default)]
  pub label: String,
  pub lat: f64,
  pub lng: f64,
  #[serde(default)]
  pub score: f64,
  #[serde(default)]
  pub streak_weeks: u32,
  /// 0 to 100.
  #[serde(default)]
  pub consistency: u32,
  /// `start-end` in hours, e.g. `18-20`.
  #[serde(default)]
  pub peak: String,
  #[serde(default)]
  pub good_for: String,
}

impl Territory {
  #[must_use]
  pub fn coordinate(&self) -> WGS84Coordinate {
    WGS84Coordinate::new(self.lat, self.lng)
  }

  #[must_use]
  pub fn peak_window(&self) -> Option<PeakWindow> {
    PeakWindow::parse(&self.peak)
  }
}

/// The hours a territory is busiest, both ends inclusive.
///
/// A window that crosses midnight (`23-1`) is kept as parsed and therefore
/// never contains any hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakWindow {
  pub start: i64,
  pub end: i64,
}

impl PeakWindow {
  /// Reads the leading integer of both halves of `start-end`, so `18-20h`
  /// parses as 18 to 20. Returns `None` if either half has no leading digits.
  #[must_use]
  pub fn parse(input: &str) -> Option<Self> {
    let mut parts = input.split('-');
    let start = leading_int(parts.next()?)?;
    let end = leading_int(parts.next()?)?;
    Some(Self { start, end })
  }

  #[must_use]
  pub fn contains(&self, hour: u32) -> bool {
    let hour = i64::from(hour);
    self.start <= hour && hour <= self.end
  }

  /// Start not after end, both valid hours of the day.
  #[must_use]
  pub fn is_well_formed(&self) -> bool {
    (0..=23).contains(&self.start) && (0..=23).contains(&self.end) && self.start <= self.end
  }
}

fn leading_int(s: &str) -> Option<i64> {
  let s = s.trim_start();
  let (sign, rest) = match s.strip_prefix('-') {
    Some(rest) => (-1, rest),
    None => (1, s.strip_prefix('+').unwrap_or(s)),
  };
  let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
  if digits.is_empty() {
    return None;
  }
  digits.parse::<i64>().ok().map(|v| sign * v)
}

/// A point of interest with descriptive tags and a best-time recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
  pub id: String,
  pub name: String,
  pub lat: f64,
  pub lng: f64,
  #[serde(default)]
  pub tags: Vec<String>,
  /// Display only, e.g. `18-20h`.
  #[serde(default)]
  pub best_time: String,
  #[serde(default)]
  pub description: String,
}

impl Place {
  #[must_use]
  pub fn coordinate(&self) -> WGS84Coordinate {
    WGS84Coordinate::new(self.lat, self.lng)
  }
}

/// Where a challenge happens.
#[derive(Debug, Clone, PartialEq)]
pub enum ChallengeSite {
  /// The challenge carries its own position.
  Coordinates {
    coordinate: WGS84Coordinate,
    name: Option<String>,
  },
  /// Only a place name, resolved against the place list.
  LocationReference(String),
  /// Listed, but never drawn on the map.
  Unknown,
}

/// A time-bound goal tied to a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawChallenge", into = "RawChallenge")]
pub struct Challenge {
  pub id: String,
  pub title: String,
  pub site: ChallengeSite,
  pub rules: String,
  pub ends_in: String,
  pub tag: Option<String>,
  /// Outbound link supplied by the backend. Built from the id when absent.
  pub action_url: Option<String>,
}

impl Challenge {
  #[must_use]
  pub fn location_name(&self) -> Option<&str> {
    match &self.site {
      ChallengeSite::Coordinates { name, .. } => name.as_deref(),
      ChallengeSite::LocationReference(name) => Some(name),
      ChallengeSite::Unknown => None,
    }
  }

  /// The badge text: the tag, or the title when there is no tag.
  #[must_use]
  pub fn badge(&self) -> &str {
    self
      .tag
      .as_deref()
      .filter(|t| !t.is_empty())
      .unwrap_or(&self.title)
  }
}

/// The wire shape. Coordinates come either flat (`lat`/`lng`) or nested
/// (`coordinates`), rules either as `rules` or `goal`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChallenge {
  id: String,
  #[serde(default)]
  title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  location: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  lat: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none", alias = "lon")]
  lng: Option<f64>,
  #[serde(default, skip_serializing)]
  coordinates: Option<WGS84Coordinate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  rules: Option<String>,
  #[serde(default, skip_serializing)]
  goal: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  ends_in: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  tag: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none", alias = "link")]
  action_url: Option<String>,
}

impl From<RawChallenge> for Challenge {
  fn from(raw: RawChallenge) -> Self {
    let embedded = match (raw.lat, raw.lng, raw.coordinates) {
      (Some(lat), Some(lng), _) => Some(WGS84Coordinate::new(lat, lng)),
      (_, _, nested) => nested,
    };
    let site = match (embedded, raw.location) {
      (Some(coordinate), name) => ChallengeSite::Coordinates { coordinate, name },
      (None, Some(name)) if !name.is_empty() => ChallengeSite::LocationReference(name),
      (None, _) => ChallengeSite::Unknown,
    };
    Self {
      id: raw.id,
      title: raw.title,
      site,
      rules: raw.rules.or(raw.goal).unwrap_or_default(),
      ends_in: raw.ends_in.unwrap_or_default(),
      tag: raw.tag,
      action_url: raw.action_url,
    }
  }
}

impl From<Challenge> for RawChallenge {
  fn from(challenge: Challenge) -> Self {
    let (lat, lng, location) = match challenge.site {
      ChallengeSite::Coordinates { coordinate, name } => {
        (Some(coordinate.lat), Some(coordinate.lng), name)
      }
      ChallengeSite::LocationReference(name) => (None, None, Some(name)),
      ChallengeSite::Unknown => (None, None, None),
    };
    Self {
      id: challenge.id,
      title: challenge.title,
      location,
      lat,
      lng,
      coordinates: None,
      rules: Some(challenge.rules).filter(|r| !r.is_empty()),
      goal: None,
      ends_in: Some(challenge.ends_in).filter(|e| !e.is_empty()),
      tag: challenge.tag,
      action_url: challenge.action_url,
    }
  }
}

/// Returns the embedded coordinates if present, otherwise those of the first
/// place whose name equals the challenge location exactly. `None` means the
/// challenge stays off the map.
#[must_use]
pub fn resolve_challenge_coordinates(
  challenge: &Challenge,
  places: &[Place],
) -> Option<WGS84Coordinate> {
  match &challenge.site {
    ChallengeSite::Coordinates { coordinate, .. } => Some(*coordinate),
    ChallengeSite::LocationReference(name) => places
      .iter()
      .find(|p| &p.name == name)
      .map(Place::coordinate),
    ChallengeSite::Unknown => None,
  }
}

/// Which kind of entity an id points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
  Territory,
  Place,
  Challenge,
}

/// A reference by id into one of the three collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
  pub kind: EntityKind,
  pub id: String,
}

impl EntityRef {
  #[must_use]
  pub fn territory(id: impl Into<String>) -> Self {
    Self {
      kind: EntityKind::Territory,
      id: id.into(),
    }
  }

  #[must_use]
  pub fn place(id: impl Into<String>) -> Self {
    Self {
      kind: EntityKind::Place,
      id: id.into(),
    }
  }

  #[must_use]
  pub fn challenge(id: impl Into<String>) -> Self {
    Self {
      kind: EntityKind::Challenge,
      id: id.into(),
    }
  }
}

impl Display for EntityRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let kind = match self.kind {
      EntityKind::Territory => "territory",
      EntityKind::Place => "place",
      EntityKind::Challenge => "challenge",
    };
    write!(f, "{kind}={}", self.id)
  }
}
