pub mod config;
pub mod coordinator;
pub mod event;
pub mod filter;
pub mod links;
pub mod loader;
pub mod map;
pub mod overlay;
pub mod render;
pub mod seed;
pub mod sheet;
pub mod synth;

pub use coordinator::ViewCoordinator;
pub use event::{Effect, ViewEvent};
