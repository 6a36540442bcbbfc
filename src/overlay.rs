//! The panels drawn over the map: detail sheet, side drawer and modals.
//!
//! Each panel keeps its own open flag. The dimming backdrop has no state of
//! its own; it is visible exactly when any panel is.

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use crate::{
  config::{Config, ModalDefinition},
  links::LinkBuilder,
  map::entities::EntityRef,
  sheet::{SheetContent, SheetPayload},
};

/// One row of the drawer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerItem {
  pub entity: EntityRef,
  pub label: String,
  pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerContent {
  pub title: String,
  pub items: Vec<DrawerItem>,
}

impl DrawerContent {
  /// Nothing to list; the drawer shows its empty state.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

/// What happens when a sheet drag ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
  /// No gesture was active.
  Ignored,
  SnapBack,
  Dismiss,
}

/// Tracks a single downward drag on the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetDrag {
  threshold: f64,
  start_y: Option<f64>,
  current_y: f64,
}

impl SheetDrag {
  #[must_use]
  pub fn new(threshold: f64) -> Self {
    Self {
      threshold,
      start_y: None,
      current_y: 0.0,
    }
  }

  pub fn start(&mut self, y: f64) {
    self.start_y = Some(y);
    self.current_y = y;
  }

  /// Returns the downward offset to draw the sheet at.
  pub fn update(&mut self, y: f64) -> f64 {
    if self.start_y.is_none() {
      return 0.0;
    }
    self.current_y = y;
    self.offset()
  }

  #[must_use]
  pub fn offset(&self) -> f64 {
    self
      .start_y
      .map_or(0.0, |start| (self.current_y - start).max(0.0))
  }

  #[must_use]
  pub fn is_active(&self) -> bool {
    self.start_y.is_some()
  }

  pub fn finish(&mut self) -> DragOutcome {
    let Some(start) = self.start_y.take() else {
      return DragOutcome::Ignored;
    };
    if self.current_y - start > self.threshold {
      DragOutcome::Dismiss
    } else {
      DragOutcome::SnapBack
    }
  }

  pub fn cancel(&mut self) {
    self.start_y = None;
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySnapshot {
  pub backdrop: bool,
  pub sheet: Option<SheetContent>,
  pub sheet_offset: f64,
  pub drawer: Option<DrawerContent>,
  pub modals: Vec<ModalDefinition>,
}

pub struct OverlayStack {
  links: LinkBuilder,
  registry: Vec<ModalDefinition>,
  sections: Vec<String>,
  sheet: Option<SheetContent>,
  drawer: Option<DrawerContent>,
  open_modals: BTreeSet<String>,
  drag: SheetDrag,
}

impl OverlayStack {
  #[must_use]
  pub fn new(config: &Config) -> Self {
    Self {
      links: LinkBuilder::from_config(config),
      registry: config.modals.clone(),
      sections: config.sections.clone(),
      sheet: None,
      drawer: None,
      open_modals: BTreeSet::new(),
      drag: SheetDrag::new(config.drag_dismiss_threshold()),
    }
  }

  #[must_use]
  pub fn links(&self) -> &LinkBuilder {
    &self.links
  }

  /// Opens the sheet with content built fresh from `payload`, replacing
  /// whatever it showed before.
  pub fn open_sheet(&mut self, payload: SheetPayload<'_>) {
    debug!("Opening sheet for {}", payload.entity());
    self.drag.cancel();
    self.sheet = Some(SheetContent::build(payload, &self.links));
  }

  /// Returns whether the sheet was open.
  pub fn close_sheet(&mut self) -> bool {
    self.drag.cancel();
    let was_open = self.sheet.take().is_some();
    if was_open {
      debug!("Closing sheet");
    }
    was_open
  }

  #[must_use]
  pub fn sheet(&self) -> Option<&SheetContent> {
    self.sheet.as_ref()
  }

  #[must_use]
  pub fn is_sheet_open(&self) -> bool {
    self.sheet.is_some()
  }

  pub fn open_drawer(&mut self, content: DrawerContent) {
    debug!("Opening drawer '{}' with {} items", content.title, content.items.len());
    self.drawer = Some(content);
  }

  pub fn close_drawer(&mut self) -> bool {
    self.drawer.take().is_some()
  }

  #[must_use]
  pub fn drawer(&self) -> Option<&DrawerContent> {
    self.drawer.as_ref()
  }

  #[must_use]
  pub fn is_drawer_open(&self) -> bool {
    self.drawer.is_some()
  }

  /// Opens a registered modal. Unknown ids are ignored.
  pub fn open_modal(&mut self, id: &str) -> bool {
    if !self.registry.iter().any(|m| m.id == id) {
      debug!("No modal registered as '{id}'");
      return false;
    }
    debug!("Opening modal '{id}'");
    self.open_modals.insert(id.to_string());
    true
  }

  pub fn close_modal(&mut self, id: &str) -> bool {
    self.open_modals.remove(id)
  }

  #[must_use]
  pub fn is_modal_open(&self, id: &str) -> bool {
    self.open_modals.contains(id)
  }

  #[must_use]
  pub fn any_modal_open(&self) -> bool {
    !self.open_modals.is_empty()
  }

  #[must_use]
  pub fn backdrop_visible(&self) -> bool {
    self.is_sheet_open() || self.is_drawer_open() || self.any_modal_open()
  }

  /// A click on the shared backdrop closes the sheet and the drawer.
  /// Modals stay open; they close through their own controls.
  pub fn click_backdrop(&mut self) {
    self.close_sheet();
    self.close_drawer();
  }

  /// A click on a modal's own backdrop region closes that modal.
  pub fn click_modal_backdrop(&mut self, id: &str) -> bool {
    self.close_modal(id)
  }

  /// Closes the sheet, then returns the section to scroll to if the page has
  /// one by that name.
  pub fn close_and_scroll(&mut self, section: &str) -> Option<String> {
    self.close_sheet();
    if self.sections.iter().any(|s| s == section) {
      Some(section.to_string())
    } else {
      debug!("No section '{section}' to scroll to");
      None
    }
  }

  pub fn touch_start(&mut self, y: f64) {
    if self.is_sheet_open() {
      self.drag.start(y);
    }
  }

  pub fn touch_move(&mut self, y: f64) -> f64 {
    self.drag.update(y)
  }

  pub fn touch_end(&mut self) -> DragOutcome {
    let outcome = self.drag.finish();
    if outcome == DragOutcome::Dismiss {
      self.close_sheet();
    }
    outcome
  }

  #[must_use]
  pub fn snapshot(&self) -> OverlaySnapshot {
    OverlaySnapshot {
      backdrop: self.backdrop_visible(),
      sheet: self.sheet.clone(),
      sheet_offset: self.drag.offset(),
      drawer: self.drawer.clone(),
      modals: self
        .registry
        .iter()
        .filter(|m| self.open_modals.contains(&m.id))
        .cloned()
        .collect(),
    }
  }
}
