use std::f64::consts::PI;

use crate::data::Bounds;

/// Web Mercator blows up at the poles; clamp like slippy maps do
const MAX_LAT: f64 = 85.0511;
const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 400.0;
/// Share of the pane the fitted outline may cover
const FIT_MARGIN: f64 = 0.85;

/// Normalized Web Mercator x in [0, 1]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Normalized Web Mercator y in [0, 1], north at 0
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT) * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

/// Visible map area: center, zoom and dot size of the braille canvas
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    /// 1.0 shows the whole world across the width
    pub zoom: f64,
    /// Canvas width in braille dots
    pub width: usize,
    /// Canvas height in braille dots
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat: center_lat.clamp(-MAX_LAT, MAX_LAT),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    /// Whole world
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    /// Centered on `anchor`, zoomed so `bounds` fits around it
    pub fn fit(anchor: (f64, f64), bounds: Option<Bounds>, width: usize, height: usize) -> Self {
        let (lon, lat) = anchor;
        let Some(b) = bounds else {
            return Self::new(lon, lat, 4.0, width, height);
        };
        if width == 0 || height == 0 {
            return Self::new(lon, lat, 1.0, width, height);
        }

        // Extent measured from the anchor so the whole outline stays visible
        let ax = mercator_x(lon);
        let ay = mercator_y(lat);
        let span_x = 2.0 * (mercator_x(b.min_lon) - ax).abs().max((mercator_x(b.max_lon) - ax).abs());
        let span_y = 2.0 * (mercator_y(b.min_lat) - ay).abs().max((mercator_y(b.max_lat) - ay).abs());

        // scale = zoom * width dots per normalized unit
        let zoom_x = if span_x > 0.0 { FIT_MARGIN / span_x } else { MAX_ZOOM };
        let zoom_y = if span_y > 0.0 {
            FIT_MARGIN * height as f64 / (span_y * width as f64)
        } else {
            MAX_ZOOM
        };

        Self::new(lon, lat, zoom_x.min(zoom_y), width, height)
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width.max(1) as f64);
        self.center_lon += dx as f64 * scale;
        // Rough Mercator correction, good enough for key panning
        self.center_lat -= dy as f64 * scale * 0.5;

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
        self.center_lat = self.center_lat.clamp(-MAX_LAT, MAX_LAT);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom keeping the point under (px, py) fixed
    pub fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    /// Geographic coordinate to canvas dots
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let scale = self.scale();
        let px = (mercator_x(lon) - mercator_x(self.center_lon)) * scale + self.width as f64 / 2.0;
        let py = (mercator_y(lat) - mercator_y(self.center_lat)) * scale + self.height as f64 / 2.0;
        (px as i32, py as i32)
    }

    /// Canvas dots back to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.scale();
        let x = (px as f64 - self.width as f64 / 2.0) / scale + mercator_x(self.center_lon);
        let y = (py as f64 - self.height as f64 / 2.0) / scale + mercator_y(self.center_lat);

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI;
        (lon, lat)
    }

    /// Lon/lat box currently on screen
    pub fn visible_bounds(&self) -> Bounds {
        let (min_lon, max_lat) = self.unproject(0, 0);
        let (max_lon, min_lat) = self.unproject(self.width as i32, self.height as i32);
        Bounds {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Dot inside the canvas, with a small margin for markers
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Rough bounding-box test for a segment
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        p1.0.max(p2.0) >= 0
            && p1.0.min(p2.0) < self.width as i32
            && p1.1.max(p2.1) >= 0
            && p1.1.min(p2.1) < self.height as i32
    }
}
