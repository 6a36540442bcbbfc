use std::{fmt::Display, str::FromStr};

use chrono::Timelike as _;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::map::entities::{Challenge, Territory};

/// How many territories the dominant rule highlights.
pub const DOMINANT_COUNT: usize = 2;

/// The filter chips above the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
  #[default]
  Places,
  Dominance,
  BestTime,
  Challenges,
}

static ALL_FILTERS: [Filter; 4] = [
  Filter::Places,
  Filter::Dominance,
  Filter::BestTime,
  Filter::Challenges,
];

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown filter: {0}")]
pub struct UnknownFilter(pub String);

impl Filter {
  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      Filter::Places => "places",
      Filter::Dominance => "dominance",
      Filter::BestTime => "best-time",
      Filter::Challenges => "challenges",
    }
  }

  #[must_use]
  pub fn all() -> &'static [Filter] {
    &ALL_FILTERS
  }

  #[must_use]
  pub fn layers(&self) -> LayerVisibility {
    match self {
      Filter::Places => LayerVisibility {
        territories: true,
        places: true,
        challenges: false,
        badges: false,
      },
      Filter::Dominance | Filter::BestTime => LayerVisibility {
        territories: true,
        places: false,
        challenges: false,
        badges: false,
      },
      Filter::Challenges => LayerVisibility {
        territories: true,
        places: true,
        challenges: true,
        badges: true,
      },
    }
  }

  #[must_use]
  pub fn highlight_rule(&self) -> HighlightRule {
    match self {
      Filter::BestTime => HighlightRule::CurrentHour,
      Filter::Places | Filter::Dominance | Filter::Challenges => HighlightRule::Dominant,
    }
  }
}

impl Display for Filter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for Filter {
  type Err = UnknownFilter;
  fn from_str(input: &str) -> Result<Filter, Self::Err> {
    Filter::all()
      .iter()
      .find(|f| f.name() == input.trim())
      .copied()
      .ok_or_else(|| UnknownFilter(input.to_string()))
  }
}

/// Which layers are on the map, and whether the challenge badge strip shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerVisibility {
  pub territories: bool,
  pub places: bool,
  pub challenges: bool,
  pub badges: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightRule {
  /// The two highest scoring territories.
  Dominant,
  /// Territories whose peak window contains the current hour.
  CurrentHour,
}

impl HighlightRule {
  #[must_use]
  pub fn apply<'a>(&self, territories: &'a [Territory], hour: u32) -> Vec<&'a str> {
    match self {
      HighlightRule::Dominant => dominant_territories(territories),
      HighlightRule::CurrentHour => territories_at_hour(territories, hour),
    }
  }
}

/// Ids of the top two territories by score. Ties keep input order and a
/// NaN score ranks last.
#[must_use]
pub fn dominant_territories(territories: &[Territory]) -> Vec<&str> {
  fn rank(score: f64) -> f64 {
    if score.is_nan() { f64::NEG_INFINITY } else { score }
  }
  let mut ranked: Vec<&Territory> = territories.iter().collect();
  ranked.sort_by(|a, b| rank(b.score).total_cmp(&rank(a.score)));
  ranked
    .into_iter()
    .take(DOMINANT_COUNT)
    .map(|t| t.id.as_str())
    .collect()
}

/// Ids of territories whose peak window contains `hour`, in input order.
/// Unparsable and midnight-crossing windows never match.
#[must_use]
pub fn territories_at_hour(territories: &[Territory], hour: u32) -> Vec<&str> {
  territories
    .iter()
    .filter(|t| t.peak_window().is_some_and(|w| w.contains(hour)))
    .map(|t| t.id.as_str())
    .collect()
}

/// The local wall-clock hour, 0 to 23.
#[must_use]
pub fn current_hour() -> u32 {
  chrono::Local::now().hour()
}

/// Everything the active filter decides about the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterView {
  pub active: Filter,
  pub layers: LayerVisibility,
  pub rule: HighlightRule,
  pub highlighted: Vec<String>,
  /// One entry per challenge when the badge strip is visible, else empty.
  pub badges: Vec<String>,
}

/// Holds the active filter. Everything else is derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
  active: Filter,
}

impl FilterState {
  /// Starts from the chip marked active, or `places` if none is marked or
  /// the mark is not a known filter.
  #[must_use]
  pub fn new(marked: Option<&str>) -> Self {
    let active = marked
      .and_then(|m| {
        m.parse::<Filter>()
          .inspect_err(|e| debug!("Ignoring initial filter: {e}"))
          .ok()
      })
      .unwrap_or_default();
    Self { active }
  }

  #[must_use]
  pub fn active(&self) -> Filter {
    self.active
  }

  /// Moves to `filter`. Every selection is accepted.
  pub fn select(&mut self, filter: Filter) {
    debug!("Filter {} -> {}", self.active, filter);
    self.active = filter;
  }

  #[must_use]
  pub fn derive(&self, territories: &[Territory], challenges: &[Challenge], hour: u32) -> FilterView {
    let layers = self.active.layers();
    let rule = self.active.highlight_rule();
    let highlighted: Vec<String> = rule
      .apply(territories, hour)
      .into_iter()
      .map(ToString::to_string)
      .collect();
    let badges = if layers.badges {
      challenges.iter().map(|c| c.badge().to_string()).collect()
    } else {
      Vec::new()
    };
    FilterView {
      active: self.active,
      layers,
      rule,
      highlighted,
      badges,
    }
  }
}
