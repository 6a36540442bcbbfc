use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The standard WGS84 coordinate system.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct WGS84Coordinate {
  #[serde(alias = "latitude")]
  pub lat: f64,
  #[serde(alias = "lon", alias = "longitude")]
  pub lng: f64,
}

impl WGS84Coordinate {
  #[must_use]
  pub fn new(lat: f64, lng: f64) -> Self {
    Self { lat, lng }
  }

  /// Finite and inside the lat/lng ranges a map can place a marker on.
  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.lat.is_finite()
      && self.lng.is_finite()
      && (-90.0..=90.0).contains(&self.lat)
      && (-180.0..=180.0).contains(&self.lng)
  }

  /// Exact equality comparison using bit representation
  #[must_use]
  pub fn exact_eq(&self, other: &Self) -> bool {
    self.lat.to_bits() == other.lat.to_bits() && self.lng.to_bits() == other.lng.to_bits()
  }
}

impl Display for WGS84Coordinate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:.4}, {:.4}", self.lat, self.lng)
  }
}

/// A west/south/east/north box in degrees, as sent to the territories endpoint.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
  pub west: f64,
  pub south: f64,
  pub east: f64,
  pub north: f64,
}

impl BoundingBox {
  #[must_use]
  pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
    Self {
      west,
      south,
      east,
      north,
    }
  }

  /// A box of `half_span` degrees around `center` in every direction.
  #[must_use]
  pub fn around(center: WGS84Coordinate, half_span: f64) -> Self {
    Self {
      west: center.lng - half_span,
      south: center.lat - half_span,
      east: center.lng + half_span,
      north: center.lat + half_span,
    }
  }

  #[must_use]
  pub fn contains(&self, coord: WGS84Coordinate) -> bool {
    (self.west..=self.east).contains(&coord.lng) && (self.south..=self.north).contains(&coord.lat)
  }

  /// Formats the box as the `W,S,E,N` query value.
  #[must_use]
  pub fn query_value(&self) -> String {
    format!("{},{},{},{}", self.west, self.south, self.east, self.north)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;

  #[test]
  fn coordinate_validity() {
    assert!(WGS84Coordinate::new(-19.744, -47.936).is_valid());
    assert!(WGS84Coordinate::new(90.0, 180.0).is_valid());
    assert!(!WGS84Coordinate::new(91.0, 0.0).is_valid());
    assert!(!WGS84Coordinate::new(0.0, -181.0).is_valid());
    assert!(!WGS84Coordinate::new(f64::NAN, 0.0).is_valid());
  }

  #[test]
  fn coordinate_aliases() {
    let c: WGS84Coordinate = serde_json::from_str(r#"{"latitude": 1.5, "longitude": 2.5}"#).unwrap();
    assert_approx_eq!(c.lat, 1.5);
    assert_approx_eq!(c.lng, 2.5);
    let c: WGS84Coordinate = serde_json::from_str(r#"{"lat": 3.0, "lon": 4.0}"#).unwrap();
    assert!(c.exact_eq(&WGS84Coordinate::new(3.0, 4.0)));
  }

  #[test]
  fn bbox_query_value() {
    let bbox = BoundingBox::new(-47.96, -19.78, -47.9, -19.72);
    assert_eq!(bbox.query_value(), "-47.96,-19.78,-47.9,-19.72");
  }

  #[test]
  fn bbox_around_contains_center() {
    let center = WGS84Coordinate::new(-19.752, -47.932);
    let bbox = BoundingBox::around(center, 0.03);
    assert!(bbox.contains(center));
    assert_approx_eq!(bbox.west, -47.962);
    assert_approx_eq!(bbox.north, -19.722);
    assert!(!bbox.contains(WGS84Coordinate::new(0.0, 0.0)));
  }
}
