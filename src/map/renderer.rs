use crate::braille::BrailleCanvas;
use crate::dashboard::MapSpec;
use crate::data::{Bounds, GeometryTable, Ring};
use crate::map::geometry::{draw_marker, draw_path};
use crate::map::projection::Viewport;

/// Outline of one country drawn as map context
#[derive(Clone, Debug)]
struct ContextOutline {
    rings: Vec<Ring>,
    bounds: Option<Bounds>,
}

/// Display toggles for the map pane
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    /// Draw every other country dimmed behind the selection
    pub show_world: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_world: true,
            show_labels: true,
        }
    }
}

/// Rendered map, one canvas per color
pub struct MapLayers {
    pub world: BrailleCanvas,
    pub outline: BrailleCanvas,
    pub marker: BrailleCanvas,
    /// (col, row, text) overlays in cell coordinates
    pub labels: Vec<(u16, u16, String)>,
}

/// Draws the selected country over the rest of the boundary dataset
pub struct MapRenderer {
    world: Vec<ContextOutline>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new(table: &GeometryTable) -> Self {
        let world = table
            .rows()
            .iter()
            .map(|row| ContextOutline {
                rings: row.boundary.iter().flat_map(|p| p.rings().cloned()).collect(),
                bounds: row.bounds,
            })
            .collect();
        Self {
            world,
            settings: DisplaySettings::default(),
        }
    }

    /// Render into a `width` x `height` cell area
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport, spec: Option<&MapSpec>) -> MapLayers {
        let mut layers = MapLayers {
            world: BrailleCanvas::new(width, height),
            outline: BrailleCanvas::new(width, height),
            marker: BrailleCanvas::new(width, height),
            labels: Vec::new(),
        };

        if self.settings.show_world {
            let visible = viewport.visible_bounds();
            let wide = viewport.zoom < 2.0;
            for country in &self.world {
                // Culling by lon/lat box breaks down when the view spans the antimeridian
                let on_screen = wide || country.bounds.map_or(true, |b| b.intersects(&visible));
                if on_screen {
                    for ring in &country.rings {
                        draw_path(&mut layers.world, ring, viewport);
                    }
                }
            }
        }

        let Some(spec) = spec else {
            return layers;
        };

        for polygon in &spec.outline {
            for ring in polygon.rings() {
                draw_path(&mut layers.outline, ring, viewport);
            }
        }

        let (lon, lat) = spec.anchor;
        let (px, py) = viewport.project(lon, lat);
        if viewport.is_visible(px, py) {
            draw_marker(&mut layers.marker, (px, py), 3);

            if self.settings.show_labels && px >= 0 && py >= 0 {
                let col = (px / 2) as u16;
                let row = (py / 4) as u16;
                if let Some(label_col) = col.checked_add(2) {
                    layers.labels.push((label_col, row, spec.marker_label.clone()));
                }
            }
        }

        layers
    }

    pub fn toggle_world(&mut self) {
        self.settings.show_world = !self.settings.show_world;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }
}
