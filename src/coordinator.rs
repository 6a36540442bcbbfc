//! The single owner of everything the widget shows.
//!
//! Events go in through [`ViewCoordinator::dispatch`], effects come out, and
//! [`ViewCoordinator::snapshot`] derives the full view on demand. Nothing in
//! here draws; see [`crate::render::project`].

use log::{debug, info};
use serde::Serialize;

use crate::{
  config::Config,
  event::{DrawerList, Effect, ViewEvent},
  filter::{FilterState, FilterView, current_hour},
  loader::{DataLoader, DataSource, Dataset, LoadError, LoadRequest, MapBackend},
  map::entities::{EntityKind, EntityRef, resolve_challenge_coordinates},
  overlay::{DragOutcome, DrawerContent, DrawerItem, OverlaySnapshot, OverlayStack},
  render::MarkerSet,
  seed::SeedData,
  sheet::SheetPayload,
  synth::{ensure_minimum_challenges, is_synthetic},
};

/// A place as shown in the card grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceCard {
  pub id: String,
  pub name: String,
  pub tags: Vec<String>,
  pub best_time: String,
}

/// A challenge as shown in lists. Challenges without a position are listed
/// with `on_map` false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeItem {
  pub id: String,
  pub title: String,
  pub badge: String,
  pub ends_in: String,
  pub on_map: bool,
  pub synthetic: bool,
}

/// Which lists have nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyState {
  pub territories: bool,
  pub places: bool,
  pub challenges: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
  pub loading: bool,
  pub hour: u32,
  pub filter: FilterView,
  pub markers: MarkerSet,
  pub place_cards: Vec<PlaceCard>,
  pub challenges: Vec<ChallengeItem>,
  pub empty: EmptyState,
  pub overlay: OverlaySnapshot,
  pub fallbacks: Vec<DataSource>,
  pub landing_link: String,
}

pub struct ViewCoordinator {
  dataset: Dataset,
  filter: FilterState,
  overlay: OverlayStack,
  seed: SeedData,
  minimum_challenges: usize,
  drawer_list: Option<DrawerList>,
  loading: bool,
}

impl ViewCoordinator {
  /// `marked_filter` is the filter chip marked active at startup, if any.
  #[must_use]
  pub fn new(config: &Config, seed: SeedData, marked_filter: Option<&str>) -> Self {
    Self {
      dataset: Dataset::default(),
      filter: FilterState::new(marked_filter),
      overlay: OverlayStack::new(config),
      seed,
      minimum_challenges: config.minimum_challenges(),
      drawer_list: None,
      loading: false,
    }
  }

  #[must_use]
  pub fn dataset(&self) -> &Dataset {
    &self.dataset
  }

  #[must_use]
  pub fn filter(&self) -> &FilterState {
    &self.filter
  }

  #[must_use]
  pub fn overlay(&self) -> &OverlayStack {
    &self.overlay
  }

  #[must_use]
  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn dispatch(&mut self, event: ViewEvent) -> Vec<Effect> {
    match event {
      ViewEvent::SelectFilter(filter) => {
        self.filter.select(filter);
        vec![Effect::RedrawMap]
      }
      ViewEvent::MarkerClicked(entity) => self.open_entity(&entity),
      ViewEvent::PlaceCardClicked(id) => self.open_entity(&EntityRef::place(id)),
      ViewEvent::BackdropClicked => {
        self.overlay.click_backdrop();
        self.drawer_list = None;
        vec![Effect::RedrawOverlay]
      }
      ViewEvent::CloseSheet => {
        self.overlay.close_sheet();
        vec![Effect::RedrawOverlay]
      }
      ViewEvent::ScrollRequested(section) => {
        let mut effects = vec![Effect::RedrawOverlay];
        if let Some(section) = self.overlay.close_and_scroll(&section) {
          effects.push(Effect::ScrollTo(section));
        }
        effects
      }
      ViewEvent::OpenDrawer(list) => {
        let content = self.drawer_content(list);
        self.overlay.open_drawer(content);
        self.drawer_list = Some(list);
        vec![Effect::RedrawOverlay]
      }
      ViewEvent::CloseDrawer => {
        self.overlay.close_drawer();
        self.drawer_list = None;
        vec![Effect::RedrawOverlay]
      }
      ViewEvent::OpenModal(id) => redraw_overlay_if(self.overlay.open_modal(&id)),
      ViewEvent::CloseModal(id) => redraw_overlay_if(self.overlay.close_modal(&id)),
      ViewEvent::ModalBackdropClicked(id) => {
        redraw_overlay_if(self.overlay.click_modal_backdrop(&id))
      }
      ViewEvent::TouchStart(y) => {
        self.overlay.touch_start(y);
        Vec::new()
      }
      ViewEvent::TouchMove(y) => {
        self.overlay.touch_move(y);
        vec![Effect::RedrawOverlay]
      }
      ViewEvent::TouchEnd => match self.overlay.touch_end() {
        DragOutcome::Ignored => Vec::new(),
        DragOutcome::SnapBack | DragOutcome::Dismiss => vec![Effect::RedrawOverlay],
      },
      ViewEvent::LoadStarted => {
        self.loading = true;
        vec![Effect::RedrawMap]
      }
      ViewEvent::DataLoaded(dataset) => self.replace_dataset(dataset),
    }
  }

  /// Runs one load cycle against `loader` and applies its result.
  ///
  /// # Errors
  /// `LoadError::InFlight` if the loader is still busy with an earlier
  /// cycle. The current dataset stays in place.
  pub async fn load<B: MapBackend>(
    &mut self,
    loader: &DataLoader<B>,
    request: &LoadRequest,
  ) -> Result<Vec<Effect>, LoadError> {
    let was_loading = self.loading;
    let mut effects = self.dispatch(ViewEvent::LoadStarted);
    match loader.load_all(request).await {
      Ok(outcome) => {
        let dataset = outcome.into_dataset(&self.seed);
        effects.extend(self.dispatch(ViewEvent::DataLoaded(dataset)));
        Ok(effects)
      }
      Err(e) => {
        self.loading = was_loading;
        Err(e)
      }
    }
  }

  #[must_use]
  pub fn snapshot(&self, hour: u32) -> ViewSnapshot {
    let filter = self.filter.derive(
      &self.dataset.territories,
      &self.dataset.challenges,
      hour,
    );
    let markers = MarkerSet::build(&self.dataset, &filter.highlighted);
    let place_cards: Vec<PlaceCard> = self
      .dataset
      .places
      .iter()
      .map(|p| PlaceCard {
        id: p.id.clone(),
        name: p.name.clone(),
        tags: p.tags.clone(),
        best_time: p.best_time.clone(),
      })
      .collect();
    let challenges: Vec<ChallengeItem> = self
      .dataset
      .challenges
      .iter()
      .map(|c| ChallengeItem {
        id: c.id.clone(),
        title: c.title.clone(),
        badge: c.badge().to_string(),
        ends_in: c.ends_in.clone(),
        on_map: resolve_challenge_coordinates(c, &self.dataset.places)
          .is_some_and(|coord| coord.is_valid()),
        synthetic: is_synthetic(c),
      })
      .collect();
    let empty = EmptyState {
      territories: self.dataset.territories.is_empty(),
      places: place_cards.is_empty(),
      challenges: challenges.is_empty(),
    };
    ViewSnapshot {
      loading: self.loading,
      hour,
      filter,
      markers,
      place_cards,
      challenges,
      empty,
      overlay: self.overlay.snapshot(),
      fallbacks: self.dataset.fallbacks.clone(),
      landing_link: self.overlay.links().landing_link(),
    }
  }

  /// The snapshot for the local wall-clock hour.
  #[must_use]
  pub fn snapshot_now(&self) -> ViewSnapshot {
    self.snapshot(current_hour())
  }

  fn open_entity(&mut self, entity: &EntityRef) -> Vec<Effect> {
    let payload = match entity.kind {
      EntityKind::Territory => self.dataset.territory(&entity.id).map(SheetPayload::Territory),
      EntityKind::Place => self.dataset.place(&entity.id).map(SheetPayload::Place),
      EntityKind::Challenge => self.dataset.challenge(&entity.id).map(SheetPayload::Challenge),
    };
    match payload {
      Some(payload) => {
        self.overlay.open_sheet(payload);
        vec![Effect::RedrawOverlay]
      }
      None => {
        debug!("Ignoring click on unknown {entity}");
        Vec::new()
      }
    }
  }

  fn replace_dataset(&mut self, mut dataset: Dataset) -> Vec<Effect> {
    let real = dataset.challenges.len();
    dataset.challenges = ensure_minimum_challenges(
      &dataset.challenges,
      &dataset.places,
      &self.seed.places,
      self.minimum_challenges,
    );
    dataset.synthesized = dataset.challenges.len() - real;
    info!(
      "Loaded {} territories, {} places, {} challenges ({} synthetic)",
      dataset.territories.len(),
      dataset.places.len(),
      dataset.challenges.len(),
      dataset.synthesized
    );
    self.dataset = dataset;
    self.loading = false;

    let mut effects = vec![Effect::RedrawMap];
    if let Some(list) = self.drawer_list {
      let content = self.drawer_content(list);
      self.overlay.open_drawer(content);
      effects.push(Effect::RedrawOverlay);
    }
    effects
  }

  fn drawer_content(&self, list: DrawerList) -> DrawerContent {
    let (title, items) = match list {
      DrawerList::Territories => (
        "Territories",
        self
          .dataset
          .territories
          .iter()
          .map(|t| DrawerItem {
            entity: EntityRef::territory(&t.id),
            label: t.label.clone(),
            detail: t.peak.clone(),
          })
          .collect(),
      ),
      DrawerList::Places => (
        "Places",
        self
          .dataset
          .places
          .iter()
          .map(|p| DrawerItem {
            entity: EntityRef::place(&p.id),
            label: p.name.clone(),
            detail: p.best_time.clone(),
          })
          .collect(),
      ),
      DrawerList::Challenges => (
        "Challenges",
        self
          .dataset
          .challenges
          .iter()
          .map(|c| DrawerItem {
            entity: EntityRef::challenge(&c.id),
            label: c.title.clone(),
            detail: c.ends_in.clone(),
          })
          .collect(),
      ),
    };
    DrawerContent {
      title: title.to_string(),
      items,
    }
  }
}

fn redraw_overlay_if(changed: bool) -> Vec<Effect> {
  if changed {
    vec![Effect::RedrawOverlay]
  } else {
    Vec::new()
  }
}
