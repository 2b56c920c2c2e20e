use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::config::Settings;
use crate::dashboard::{self, Dashboard, Outcome};
use crate::data::Tables;
use crate::error::Result;
use crate::map::{MapRenderer, Viewport};
use crate::selector::{country_options, year_options, Selection};
use crate::stats::ExactName;
use crate::ui;

/// Which pane receives keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Countries,
    Years,
    Map,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Countries => Focus::Years,
            Focus::Years => Focus::Map,
            Focus::Map => Focus::Countries,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Countries => Focus::Map,
            Focus::Years => Focus::Countries,
            Focus::Map => Focus::Years,
        }
    }
}

/// Interactive session state. Tables are loaded once and never change.
pub struct App {
    pub tables: Tables,
    pub settings: Settings,
    pub countries: Vec<String>,
    pub years: Vec<String>,
    pub selection: Selection,
    pub dashboard: Dashboard,
    pub focus: Focus,
    /// Index into `visible_countries()`; `None` while the selected country is not listed
    pub country_cursor: Option<usize>,
    pub year_cursor: usize,
    /// Country filter typed after `/`
    pub search: String,
    pub searching: bool,
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    /// Inner area of the map pane, in terminal cells
    pub map_area: Rect,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    pub should_quit: bool,
}

impl App {
    /// Build the session and run the first recompute
    pub fn new(tables: Tables, settings: Settings, selection: Selection, width: u16, height: u16) -> Result<Self> {
        let countries = country_options(&tables.population);
        let years = year_options(&tables.population);
        let map_renderer = MapRenderer::new(&tables.geometry);
        let dashboard = dashboard::build(&selection, &tables, &settings, &ExactName)?;
        let country_cursor = countries.iter().position(|c| *c == selection.country);

        let mut app = Self {
            tables,
            settings,
            countries,
            years,
            selection,
            dashboard,
            focus: Focus::Countries,
            country_cursor,
            year_cursor: 0,
            search: String::new(),
            searching: false,
            viewport: Viewport::world(0, 0),
            map_renderer,
            map_area: Rect::default(),
            last_mouse: None,
            should_quit: false,
        };
        app.resize(width, height);
        app.recenter();
        info!(
            countries = app.countries.len(),
            years = app.years.len(),
            "session ready"
        );
        Ok(app)
    }

    /// Recompute the dashboard for the current selection
    pub fn refresh(&mut self) -> Result<()> {
        self.dashboard = dashboard::build(&self.selection, &self.tables, &self.settings, &ExactName)?;
        debug!(country = %self.selection.country, years = ?self.selection.years, ready = self.dashboard.is_ready(), "recomputed");
        self.recenter();
        Ok(())
    }

    /// Terminal resized: recompute the map pane and keep the view center
    pub fn resize(&mut self, width: u16, height: u16) {
        let panes = ui::layout(Rect::new(0, 0, width, height), self.years.len());
        self.map_area = ui::pane_inner(panes.map);
        // Braille gives 2x4 dots per cell
        self.viewport.width = self.map_area.width as usize * 2;
        self.viewport.height = self.map_area.height as usize * 4;
    }

    /// Fit the map to the selected country, or show the world
    pub fn recenter(&mut self) {
        let (width, height) = (self.viewport.width, self.viewport.height);
        self.viewport = match &self.dashboard.outcome {
            Outcome::Ready { map, .. } => Viewport::fit(map.anchor, map.bounds, width, height),
            Outcome::Unavailable { .. } => Viewport::world(width, height),
        };
    }

    /// Countries matching the search filter (case-insensitive substring)
    pub fn visible_countries(&self) -> Vec<&str> {
        let needle = self.search.to_lowercase();
        self.countries
            .iter()
            .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Move the country cursor and select what it lands on
    pub fn move_country(&mut self, delta: i32) -> Result<()> {
        let count = self.visible_countries().len();
        if count == 0 {
            return Ok(());
        }
        let current = self.country_cursor.map_or(-1, |c| c as i64);
        let target = (current + delta as i64).clamp(0, count as i64 - 1);
        self.country_cursor = Some(target as usize);
        self.select_at_cursor()
    }

    pub fn first_country(&mut self) -> Result<()> {
        self.move_country(i32::MIN)
    }

    pub fn last_country(&mut self) -> Result<()> {
        self.move_country(i32::MAX)
    }

    fn select_at_cursor(&mut self) -> Result<()> {
        let Some(cursor) = self.country_cursor else {
            return Ok(());
        };
        let Some(country) = self.visible_countries().get(cursor).map(|c| c.to_string()) else {
            return Ok(());
        };
        if country == self.selection.country {
            return Ok(());
        }
        self.selection.country = country;
        self.refresh()
    }

    pub fn move_year_cursor(&mut self, delta: i32) {
        if self.years.is_empty() {
            return;
        }
        let target = (self.year_cursor as i64 + delta as i64).clamp(0, self.years.len() as i64 - 1);
        self.year_cursor = target as usize;
    }

    /// Select or deselect the year under the cursor
    pub fn toggle_year(&mut self) -> Result<()> {
        let Some(year) = self.years.get(self.year_cursor).cloned() else {
            return Ok(());
        };
        self.selection.toggle_year(&year);
        self.refresh()
    }

    pub fn start_search(&mut self) {
        self.searching = true;
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.sync_cursor();
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.sync_cursor();
    }

    /// Leave search mode. Confirming selects the first match.
    pub fn finish_search(&mut self, confirm: bool) -> Result<()> {
        self.searching = false;
        if confirm {
            self.select_at_cursor()
        } else {
            self.search.clear();
            self.sync_cursor();
            Ok(())
        }
    }

    /// Keep the cursor on the selected country when it is visible.
    /// While filtering, fall back to the first match so Enter picks it.
    fn sync_cursor(&mut self) {
        let visible = self.visible_countries();
        let cursor = visible
            .iter()
            .position(|c| *c == self.selection.country)
            .or_else(|| (self.searching && !visible.is_empty()).then_some(0));
        self.country_cursor = cursor;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Terminal cell to braille dot inside the map pane
    fn map_dot(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        let inside = col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height;
        inside.then(|| (((col - area.x) as i32) * 2, ((row - area.y) as i32) * 4))
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_dot(col, row) {
            self.viewport.zoom_at(px, py, 1.5);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_dot(col, row) {
            self.viewport.zoom_at(px, py, 1.0 / 1.5);
        }
    }

    /// Drag to pan; only drags that start on the map count
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        let Some((last_col, last_row)) = self.last_mouse else {
            return;
        };
        let dx = last_col as i32 - col as i32;
        let dy = last_row as i32 - row as i32;
        self.pan(dx * 2, dy * 4);
        self.last_mouse = Some((col, row));
    }

    pub fn start_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = self.map_dot(col, row).map(|_| (col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}
