use rstest::rstest;
use runmap::{
  filter::{Filter, FilterState, HighlightRule, dominant_territories, territories_at_hour},
  map::entities::Territory,
};

fn territory(id: &str, score: f64, peak: &str) -> Territory {
  Territory {
    id: id.to_string(),
    label: id.to_string(),
    lat: -19.75,
    lng: -47.93,
    score,
    streak_weeks: 0,
    consistency: 0,
    peak: peak.to_string(),
    good_for: String::new(),
  }
}

#[rstest]
#[case("18-20", 17, false)]
#[case("18-20", 18, true)]
#[case("18-20", 19, true)]
#[case("18-20", 20, true)]
#[case("18-20", 21, false)]
#[case("06-08h", 7, true)]
#[case("0-23", 0, true)]
#[case("0-23", 23, true)]
#[case("23-1", 23, false)]
#[case("23-1", 0, false)]
#[case("evening", 19, false)]
#[case("", 0, false)]
fn current_hour_rule(#[case] peak: &str, #[case] hour: u32, #[case] highlighted: bool) {
  let territories = vec![territory("t1", 0.5, peak)];
  assert_eq!(
    territories_at_hour(&territories, hour) == vec!["t1"],
    highlighted
  );
}

#[rstest]
#[case(Filter::Places, true, false, false)]
#[case(Filter::Dominance, false, false, false)]
#[case(Filter::BestTime, false, false, false)]
#[case(Filter::Challenges, true, true, true)]
fn filter_layers(
  #[case] filter: Filter,
  #[case] places: bool,
  #[case] challenges: bool,
  #[case] badges: bool,
) {
  let layers = filter.layers();
  assert!(layers.territories);
  assert_eq!(layers.places, places);
  assert_eq!(layers.challenges, challenges);
  assert_eq!(layers.badges, badges);
  let expected_rule = if filter == Filter::BestTime {
    HighlightRule::CurrentHour
  } else {
    HighlightRule::Dominant
  };
  assert_eq!(filter.highlight_rule(), expected_rule);
}

#[test]
fn dominant_rule_scenario() {
  let territories = vec![
    territory("t1", 0.9, ""),
    territory("t2", 0.7, ""),
    territory("t3", 0.5, ""),
  ];
  let first = dominant_territories(&territories);
  assert_eq!(first, vec!["t1", "t2"]);
  assert_eq!(dominant_territories(&territories), first);
}

#[test]
fn dominant_rule_is_subset_of_input() {
  let territories = vec![
    territory("a", 0.1, ""),
    territory("b", f64::NAN, ""),
    territory("c", 0.3, ""),
    territory("d", 0.3, ""),
  ];
  let top = dominant_territories(&territories);
  assert!(top.len() <= 2);
  assert!(top.iter().all(|id| territories.iter().any(|t| t.id == *id)));
}

#[test]
fn nan_score_ranks_last() {
  let territories = vec![
    territory("t0", 0.1, ""),
    territory("t1", f64::NAN, ""),
    territory("t2", 0.9, ""),
  ];
  assert_eq!(dominant_territories(&territories), vec!["t2", "t0"]);
}

#[test]
fn many_nan_scores_still_rank() {
  let territories: Vec<Territory> = (0..64)
    .map(|i| {
      let score = if i % 3 == 0 { f64::NAN } else { f64::from(i) / 100.0 };
      territory(&format!("t{i}"), score, "")
    })
    .collect();
  assert_eq!(dominant_territories(&territories), vec!["t62", "t61"]);
}

#[test]
fn every_selection_is_accepted() {
  let territories = vec![territory("t1", 0.9, "18-20"), territory("t2", 0.7, "06-08")];
  let mut state = FilterState::new(Some("dominance"));
  for filter in Filter::all() {
    state.select(*filter);
    assert_eq!(state.active(), *filter);
    let view = state.derive(&territories, &[], 19);
    assert_eq!(view.active, *filter);
    assert_eq!(view, state.derive(&territories, &[], 19));
  }
}

#[test]
fn best_time_is_recomputed_per_hour() {
  let territories = vec![territory("t1", 0.9, "18-20")];
  let mut state = FilterState::default();
  state.select(Filter::BestTime);
  assert_eq!(state.derive(&territories, &[], 19).highlighted, vec!["t1"]);
  assert!(state.derive(&territories, &[], 21).highlighted.is_empty());
  assert_eq!(state.derive(&territories, &[], 18).highlighted, vec!["t1"]);
  assert_eq!(state.derive(&territories, &[], 20).highlighted, vec!["t1"]);
}
