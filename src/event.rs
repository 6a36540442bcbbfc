use serde::Serialize;

use crate::{filter::Filter, loader::Dataset, map::entities::EntityRef};

/// Which collection the drawer lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawerList {
  Territories,
  Places,
  Challenges,
}

/// Everything that can happen to the widget, one variant per user action or
/// load milestone.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
  SelectFilter(Filter),
  MarkerClicked(EntityRef),
  PlaceCardClicked(String),
  BackdropClicked,
  CloseSheet,
  /// The in-sheet control that closes the sheet and scrolls to a section.
  ScrollRequested(String),
  OpenDrawer(DrawerList),
  CloseDrawer,
  OpenModal(String),
  CloseModal(String),
  ModalBackdropClicked(String),
  TouchStart(f64),
  TouchMove(f64),
  TouchEnd,
  LoadStarted,
  DataLoaded(Dataset),
}

/// What the host has to do after an event was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
  /// Project the snapshot onto the map again.
  RedrawMap,
  /// Panels changed.
  RedrawOverlay,
  ScrollTo(String),
}
