mod geometry;
mod projection;
mod renderer;

pub use geometry::draw_ring;
pub use projection::Viewport;
pub use renderer::{LineString, MapRenderer, PlacedMarker};
