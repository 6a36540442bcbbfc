//! The boundary to the map drawing library.
//!
//! The coordinator never draws. It hands a [`ViewSnapshot`] to [`project`],
//! which tells a [`MapRenderer`] what to show. Projecting the same snapshot
//! twice leaves the renderer in the same state.

use serde::Serialize;

use crate::{
  config::InitialView,
  coordinator::ViewSnapshot,
  filter::LayerVisibility,
  loader::Dataset,
  map::{
    coordinates::WGS84Coordinate,
    entities::{EntityRef, resolve_challenge_coordinates},
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
  Territories,
  Places,
  Challenges,
}

impl LayerKind {
  #[must_use]
  pub fn all() -> [LayerKind; 3] {
    [LayerKind::Territories, LayerKind::Places, LayerKind::Challenges]
  }

  #[must_use]
  pub fn visible_in(&self, layers: &LayerVisibility) -> bool {
    match self {
      LayerKind::Territories => layers.territories,
      LayerKind::Places => layers.places,
      LayerKind::Challenges => layers.challenges,
    }
  }
}

/// A clickable point on the map. A click is reported back as
/// `ViewEvent::MarkerClicked(entity)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
  pub entity: EntityRef,
  pub coordinate: WGS84Coordinate,
  pub label: String,
  pub highlighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerSet {
  pub territories: Vec<Marker>,
  pub places: Vec<Marker>,
  pub challenges: Vec<Marker>,
}

impl MarkerSet {
  /// Markers for every entity that has a valid position. Challenges that do
  /// not resolve to coordinates are left out; they stay in the lists.
  #[must_use]
  pub fn build(dataset: &Dataset, highlighted: &[String]) -> Self {
    let territories = dataset
      .territories
      .iter()
      .filter(|t| t.coordinate().is_valid())
      .map(|t| Marker {
        entity: EntityRef::territory(&t.id),
        coordinate: t.coordinate(),
        label: t.label.clone(),
        highlighted: highlighted.contains(&t.id),
      })
      .collect();
    let places = dataset
      .places
      .iter()
      .filter(|p| p.coordinate().is_valid())
      .map(|p| Marker {
        entity: EntityRef::place(&p.id),
        coordinate: p.coordinate(),
        label: p.name.clone(),
        highlighted: false,
      })
      .collect();
    let challenges = dataset
      .challenges
      .iter()
      .filter_map(|c| {
        let coordinate = resolve_challenge_coordinates(c, &dataset.places)?;
        coordinate.is_valid().then(|| Marker {
          entity: EntityRef::challenge(&c.id),
          coordinate,
          label: c.title.clone(),
          highlighted: false,
        })
      })
      .collect();
    Self {
      territories,
      places,
      challenges,
    }
  }

  #[must_use]
  pub fn layer(&self, kind: LayerKind) -> &[Marker] {
    match kind {
      LayerKind::Territories => &self.territories,
      LayerKind::Places => &self.places,
      LayerKind::Challenges => &self.challenges,
    }
  }
}

/// What the coordinator needs from a map library.
pub trait MapRenderer {
  fn set_layer_visible(&mut self, layer: LayerKind, visible: bool);

  /// Clears `layer` and draws `markers` on it.
  fn redraw_markers(&mut self, layer: LayerKind, markers: &[Marker]);

  fn pan_to(&mut self, center: WGS84Coordinate, zoom: u8);
}

/// Moves the map to the configured starting view. Called once before the
/// first projection.
pub fn initial_view(view: &InitialView, renderer: &mut dyn MapRenderer) {
  renderer.pan_to(view.center, view.zoom);
}

pub fn project(snapshot: &ViewSnapshot, renderer: &mut dyn MapRenderer) {
  let layers = snapshot.filter.layers;
  for kind in LayerKind::all() {
    renderer.redraw_markers(kind, snapshot.markers.layer(kind));
    renderer.set_layer_visible(kind, kind.visible_in(&layers));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::map::entities::{Challenge, ChallengeSite, Place, Territory};

  fn dataset() -> Dataset {
    let place = |id: &str, name: &str, lat: f64| Place {
      id: id.to_string(),
      name: name.to_string(),
      lat,
      lng: -47.9,
      tags: vec![],
      best_time: String::new(),
      description: String::new(),
    };
    let challenge = |id: &str, site: ChallengeSite| Challenge {
      id: id.to_string(),
      title: id.to_uppercase(),
      site,
      rules: String::new(),
      ends_in: String::new(),
      tag: None,
      action_url: None,
    };
    Dataset {
      territories: vec![Territory {
        id: "t1".to_string(),
        label: "Centro".to_string(),
        lat: -19.75,
        lng: -47.93,
        score: 0.9,
        streak_weeks: 1,
        consistency: 80,
        peak: "18-20".to_string(),
        good_for: String::new(),
      }],
      places: vec![place("p1", "Pista Sul", -19.7), place("p2", "Broken", f64::NAN)],
      challenges: vec![
        challenge("c1", ChallengeSite::LocationReference("Pista Sul".to_string())),
        challenge("c2", ChallengeSite::LocationReference("Nowhere".to_string())),
        challenge("c3", ChallengeSite::Unknown),
        challenge(
          "c4",
          ChallengeSite::Coordinates {
            coordinate: WGS84Coordinate::new(1.0, 2.0),
            name: None,
          },
        ),
      ],
      ..Dataset::default()
    }
  }

  #[test]
  fn markers_skip_unplaceable_entities() {
    let markers = MarkerSet::build(&dataset(), &["t1".to_string()]);
    assert_eq!(markers.territories.len(), 1);
    assert!(markers.territories[0].highlighted);
    assert_eq!(markers.places.len(), 1);
    let ids: Vec<&str> = markers
      .challenges
      .iter()
      .map(|m| m.entity.id.as_str())
      .collect();
    assert_eq!(ids, vec!["c1", "c4"]);
  }

  #[test]
  fn challenge_marker_uses_place_position() {
    let markers = MarkerSet::build(&dataset(), &[]);
    assert_eq!(markers.challenges[0].coordinate, WGS84Coordinate::new(-19.7, -47.9));
    assert!(!markers.territories[0].highlighted);
  }
}
