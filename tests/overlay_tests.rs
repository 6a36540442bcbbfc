use runmap::{
  config::Config,
  map::entities::{Challenge, ChallengeSite, Place, Territory},
  overlay::{DragOutcome, DrawerContent, OverlayStack},
  sheet::SheetPayload,
};

fn place() -> Place {
  Place {
    id: "p1".to_string(),
    name: "Parque do Sabia".to_string(),
    lat: -19.7,
    lng: -47.9,
    tags: vec!["plano".to_string()],
    best_time: "06-08h".to_string(),
    description: "Flat loop".to_string(),
  }
}

fn drawer() -> DrawerContent {
  DrawerContent {
    title: "Places".to_string(),
    items: vec![],
  }
}

fn assert_backdrop_invariant(overlay: &OverlayStack) {
  assert_eq!(
    overlay.backdrop_visible(),
    overlay.is_sheet_open() || overlay.is_drawer_open() || overlay.any_modal_open()
  );
}

#[test]
fn backdrop_follows_panels() {
  let mut overlay = OverlayStack::new(&Config::default());
  let place = place();
  assert_backdrop_invariant(&overlay);

  overlay.open_sheet(SheetPayload::Place(&place));
  assert_backdrop_invariant(&overlay);
  assert!(overlay.backdrop_visible());

  overlay.open_drawer(drawer());
  assert_backdrop_invariant(&overlay);

  overlay.close_sheet();
  assert_backdrop_invariant(&overlay);
  assert!(overlay.backdrop_visible());

  overlay.close_drawer();
  assert_backdrop_invariant(&overlay);
  assert!(!overlay.backdrop_visible());
}

#[test]
fn backdrop_follows_modals() {
  let mut overlay = OverlayStack::new(&Config::default());
  assert!(overlay.open_modal("how-it-works"));
  assert_backdrop_invariant(&overlay);
  assert!(overlay.backdrop_visible());

  overlay.open_sheet(SheetPayload::Place(&place()));
  assert!(overlay.is_modal_open("how-it-works"));
  overlay.click_backdrop();
  assert_backdrop_invariant(&overlay);
  assert!(overlay.backdrop_visible());

  assert!(overlay.close_modal("how-it-works"));
  assert!(!overlay.close_modal("how-it-works"));
  assert_backdrop_invariant(&overlay);
  assert!(!overlay.backdrop_visible());
}

#[test]
fn sheet_shows_latest_entity() {
  let mut overlay = OverlayStack::new(&Config::default());
  let territory = Territory {
    id: "t1".to_string(),
    label: "Centro".to_string(),
    lat: 0.0,
    lng: 0.0,
    score: 0.9,
    streak_weeks: 3,
    consistency: 95,
    peak: "18-20".to_string(),
    good_for: "tiros".to_string(),
  };
  let challenge = Challenge {
    id: "c1".to_string(),
    title: "Sunrise 5k".to_string(),
    site: ChallengeSite::Unknown,
    rules: "Run 5k".to_string(),
    ends_in: String::new(),
    tag: None,
    action_url: None,
  };

  overlay.open_sheet(SheetPayload::Territory(&territory));
  assert_eq!(overlay.sheet().unwrap().heading, "Centro");
  overlay.open_sheet(SheetPayload::Challenge(&challenge));
  let sheet = overlay.sheet().unwrap();
  assert_eq!(sheet.heading, "Sunrise 5k");
  assert_eq!(sheet.details, vec!["Run 5k"]);
}

#[test]
fn scroll_to_missing_section_only_closes() {
  let mut overlay = OverlayStack::new(&Config::default());
  overlay.open_sheet(SheetPayload::Place(&place()));
  assert_eq!(overlay.close_and_scroll("nowhere"), None);
  assert!(!overlay.backdrop_visible());
  assert_eq!(overlay.close_and_scroll("desafios"), Some("desafios".to_string()));
}

#[test]
fn drag_threshold_comes_from_config() {
  let mut config = Config::default();
  config.drag_dismiss_threshold = Some(50.0);
  let mut overlay = OverlayStack::new(&config);
  overlay.open_sheet(SheetPayload::Place(&place()));
  overlay.touch_start(0.0);
  overlay.touch_move(60.0);
  assert_eq!(overlay.touch_end(), DragOutcome::Dismiss);
  assert!(!overlay.is_sheet_open());
}

#[test]
fn upward_drag_never_goes_negative() {
  let mut overlay = OverlayStack::new(&Config::default());
  overlay.open_sheet(SheetPayload::Place(&place()));
  overlay.touch_start(300.0);
  assert!(overlay.touch_move(100.0).abs() < f64::EPSILON);
  assert_eq!(overlay.touch_end(), DragOutcome::SnapBack);
  assert!(overlay.is_sheet_open());
}
