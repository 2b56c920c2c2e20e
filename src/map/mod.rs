mod geometry;
mod projection;
mod renderer;

pub use geometry::{draw_line, draw_marker, draw_path};
pub use projection::Viewport;
pub use renderer::{DisplaySettings, MapLayers, MapRenderer};
