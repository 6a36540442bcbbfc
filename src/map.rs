/// Coordinates and bounding boxes.
pub mod coordinates;
/// Territories, places and challenges.
pub mod entities;
