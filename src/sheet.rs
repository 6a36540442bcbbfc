//! Detail sheet content for a territory, place or challenge.

use serde::Serialize;

use crate::{
  links::LinkBuilder,
  map::entities::{Challenge, EntityRef, Place, Territory},
};

pub const SECTION_MAP: &str = "mapa";
pub const SECTION_PLACES: &str = "lugares";

/// Consistency at or above which a territory is held by consistency.
pub const CONSISTENCY_DOMINANCE: u32 = 90;

/// The entity a sheet is opened for.
#[derive(Debug, Clone, Copy)]
pub enum SheetPayload<'a> {
  Territory(&'a Territory),
  Place(&'a Place),
  Challenge(&'a Challenge),
}

impl SheetPayload<'_> {
  #[must_use]
  pub fn entity(&self) -> EntityRef {
    match self {
      SheetPayload::Territory(t) => EntityRef::territory(&t.id),
      SheetPayload::Place(p) => EntityRef::place(&p.id),
      SheetPayload::Challenge(c) => EntityRef::challenge(&c.id),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAction {
  pub label: String,
  pub url: String,
}

/// Closes the sheet, then scrolls to `section`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollAction {
  pub label: String,
  pub section: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetContent {
  pub subject: EntityRef,
  pub heading: String,
  pub details: Vec<String>,
  pub primary: LinkAction,
  pub secondary: ScrollAction,
}

impl SheetContent {
  #[must_use]
  pub fn build(payload: SheetPayload<'_>, links: &LinkBuilder) -> Self {
    match payload {
      SheetPayload::Territory(t) => territory_sheet(t, links),
      SheetPayload::Place(p) => place_sheet(p, links),
      SheetPayload::Challenge(c) => challenge_sheet(c, links),
    }
  }
}

#[must_use]
pub fn dominance_label(territory: &Territory) -> &'static str {
  if territory.consistency >= CONSISTENCY_DOMINANCE {
    "Consistency"
  } else {
    "Speed"
  }
}

#[must_use]
pub fn territory_sheet(territory: &Territory, links: &LinkBuilder) -> SheetContent {
  let subject = EntityRef::territory(&territory.id);
  SheetContent {
    heading: territory.label.clone(),
    details: vec![
      format!("Dominance: {}", dominance_label(territory)),
      format!("Streak: {} weeks", territory.streak_weeks),
      format!("Consistency: {}/100", territory.consistency),
      format!("Peak: {}", territory.peak),
      format!("Good for: {}", territory.good_for),
    ],
    primary: LinkAction {
      label: "Take the post".to_string(),
      url: links.entity_link(&subject, &[("takeover", "true")]),
    },
    secondary: ScrollAction {
      label: "See nearby places".to_string(),
      section: SECTION_PLACES.to_string(),
    },
    subject,
  }
}

#[must_use]
pub fn place_sheet(place: &Place, links: &LinkBuilder) -> SheetContent {
  let subject = EntityRef::place(&place.id);
  SheetContent {
    heading: place.name.clone(),
    details: vec![
      place.description.clone(),
      format!("Tags: {}", place.tags.join(" / ")),
      format!("Best time: {}", place.best_time),
    ],
    primary: LinkAction {
      label: "Send to my WhatsApp".to_string(),
      url: links.entity_link(&subject, &[]),
    },
    secondary: back_to_map(),
    subject,
  }
}

#[must_use]
pub fn challenge_sheet(challenge: &Challenge, links: &LinkBuilder) -> SheetContent {
  let subject = EntityRef::challenge(&challenge.id);
  let mut details = vec![challenge.rules.clone()];
  if let Some(tag) = &challenge.tag {
    details.push(format!("Tag: {tag}"));
  }
  if let Some(location) = challenge.location_name() {
    details.push(format!("Where: {location}"));
  }
  if !challenge.ends_in.is_empty() {
    details.push(format!("Ends in: {}", challenge.ends_in));
  }
  let url = challenge
    .action_url
    .clone()
    .unwrap_or_else(|| links.entity_link(&subject, &[]));
  SheetContent {
    heading: challenge.title.clone(),
    details,
    primary: LinkAction {
      label: "Join the challenge".to_string(),
      url,
    },
    secondary: back_to_map(),
    subject,
  }
}

fn back_to_map() -> ScrollAction {
  ScrollAction {
    label: "Back to map".to_string(),
    section: SECTION_MAP.to_string(),
  }
}
