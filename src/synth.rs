//! Tops up a sparse challenge list with challenges made from places.

use std::collections::HashSet;

use itertools::Itertools as _;
use log::debug;

use crate::map::entities::{Challenge, ChallengeSite, Place};

/// Identifier prefix reserved for synthetic challenges.
pub const SYNTHETIC_ID_PREFIX: &str = "fallback-";
pub const SYNTHETIC_RULES: &str = "Complete 3 runs here this week.";
pub const SYNTHETIC_ENDS_IN: &str = "7 days";

/// Returns `challenges` unchanged when it already holds `minimum` entries.
/// Otherwise appends synthetic challenges built from `places`, or from
/// `seed_pool` when `places` is empty. Candidates need valid coordinates and
/// are taken in name order. The result may still be short, or empty, when
/// there are not enough candidates.
#[must_use]
pub fn ensure_minimum_challenges(
  challenges: &[Challenge],
  places: &[Place],
  seed_pool: &[Place],
  minimum: usize,
) -> Vec<Challenge> {
  let mut result = challenges.to_vec();
  if challenges.len() >= minimum {
    return result;
  }
  let needed = minimum - challenges.len();
  let (source, source_name) = if places.is_empty() {
    (seed_pool, "seed pool")
  } else {
    (places, "places")
  };

  let taken: HashSet<&str> = challenges.iter().map(|c| c.id.as_str()).collect();
  let mut ordinal = 0usize;
  let mut next_id = || loop {
    ordinal += 1;
    let id = format!("{SYNTHETIC_ID_PREFIX}{ordinal}");
    if !taken.contains(id.as_str()) {
      return id;
    }
  };

  let synthetic: Vec<Challenge> = source
    .iter()
    .filter(|p| p.coordinate().is_valid())
    .sorted_by(|a, b| a.name.cmp(&b.name))
    .take(needed)
    .map(|place| synthesize(next_id(), place))
    .collect();

  debug!(
    "Synthesized {} of {needed} missing challenges from {source_name}",
    synthetic.len()
  );
  result.extend(synthetic);
  result
}

fn synthesize(id: String, place: &Place) -> Challenge {
  Challenge {
    id,
    title: format!("Run at {}", place.name),
    site: ChallengeSite::Coordinates {
      coordinate: place.coordinate(),
      name: Some(place.name.clone()),
    },
    rules: SYNTHETIC_RULES.to_string(),
    ends_in: SYNTHETIC_ENDS_IN.to_string(),
    tag: place.tags.first().cloned(),
    action_url: None,
  }
}

#[must_use]
pub fn is_synthetic(challenge: &Challenge) -> bool {
  challenge.id.starts_with(SYNTHETIC_ID_PREFIX)
}
