use clap::Parser as CliParser;
use log::{debug, info};
use runmap::{
  ViewCoordinator,
  config::Config,
  filter::{Filter, current_hour},
  loader::{DataLoader, HttpBackend, LoadRequest},
  map::coordinates::WGS84Coordinate,
  render::{self, LayerKind, MapRenderer, Marker},
  seed::SeedData,
};

/// Loads the map data the way the widget does and prints what it would show.
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Backend base URL.
  #[arg(short, long)]
  api: Option<String>,

  /// City to request places for.
  #[arg(short, long)]
  city: Option<String>,

  /// Zoom level sent with the territory request.
  #[arg(short, long)]
  zoom: Option<u8>,

  /// Active filter. Values: places, dominance, best-time, challenges.
  #[arg(short, long)]
  filter: Option<Filter>,

  /// Hour of day for the best-time highlight. Defaults to the local hour.
  #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
  hour: Option<u32>,

  /// A raw page query string, e.g. `api=http://localhost:3000`.
  #[arg(short, long)]
  query: Option<String>,
}

/// Stands in for a map library and logs what it is asked to draw.
struct LogRenderer;

impl MapRenderer for LogRenderer {
  fn set_layer_visible(&mut self, layer: LayerKind, visible: bool) {
    debug!("Layer {layer:?} visible={visible}");
  }

  fn redraw_markers(&mut self, layer: LayerKind, markers: &[Marker]) {
    let highlighted = markers.iter().filter(|m| m.highlighted).count();
    debug!(
      "Layer {layer:?}: {} markers, {highlighted} highlighted",
      markers.len()
    );
  }

  fn pan_to(&mut self, center: WGS84Coordinate, zoom: u8) {
    debug!("Pan to {center} at zoom {zoom}");
  }
}

fn build_config(args: &Args) -> Config {
  let mut config = Config::new();
  if let Some(api) = &args.api {
    config.api_base = Some(api.clone());
  }
  if let Some(city) = &args.city {
    config.city = Some(city.clone());
  }
  if let Some(zoom) = args.zoom {
    let mut view = config.initial_view();
    view.zoom = zoom;
    config.initial_view = Some(view);
  }
  match &args.query {
    Some(query) => config.with_query_override(query),
    None => config,
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  env_logger::init();
  let args = Args::parse();
  let config = build_config(&args);
  info!("Using backend {}", config.api_base());

  let mut renderer = LogRenderer;
  render::initial_view(&config.initial_view(), &mut renderer);

  let loader = DataLoader::new(HttpBackend::from_config(&config));
  let request = LoadRequest::from_config(&config);
  let mut view = ViewCoordinator::new(
    &config,
    SeedData::from_config(&config),
    args.filter.map(|f| f.name()),
  );
  view.load(&loader, &request).await?;

  let snapshot = view.snapshot(args.hour.unwrap_or_else(current_hour));
  render::project(&snapshot, &mut renderer);
  println!("{}", serde_json::to_string_pretty(&snapshot)?);
  Ok(())
}
