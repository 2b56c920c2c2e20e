use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Widget, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::braille::BrailleCanvas;
use crate::dashboard::{short_population, stats_rows, Outcome, UNAVAILABLE_MESSAGE};
use crate::map::MapLayers;

/// Screen areas of every pane
#[derive(Clone, Copy, Debug)]
pub struct Panes {
    pub countries: Rect,
    pub years: Rect,
    pub stats: Rect,
    pub chart: Rect,
    pub map: Rect,
    pub status: Rect,
}

/// Split the screen. Shared with `App::resize` so the map viewport matches.
pub fn layout(area: Rect, year_count: usize) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30),
            Constraint::Percentage(35),
            Constraint::Min(20),
        ])
        .split(rows[0]);

    let years_height = (year_count as u16 + 2).min(12);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(years_height)])
        .split(columns[0]);

    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(columns[1]);

    Panes {
        countries: left[0],
        years: left[1],
        stats: middle[0],
        chart: middle[1],
        map: columns[2],
        status: rows[1],
    }
}

/// Area inside a pane's border
pub fn pane_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

fn pane<'a>(title: String, focused: bool) -> Block<'a> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let panes = layout(frame.area(), app.years.len());

    render_countries(frame, app, panes.countries);
    render_years(frame, app, panes.years);
    render_stats(frame, app, panes.stats);
    render_chart(frame, app, panes.chart);
    render_map(frame, app, panes.map);
    render_status_bar(frame, app, panes.status);
}

fn render_countries(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.searching || !app.search.is_empty() {
        format!(" Countries /{} ", app.search)
    } else {
        " Countries ".to_string()
    };

    let items: Vec<ListItem> = app
        .visible_countries()
        .into_iter()
        .map(|name| {
            let style = if name == app.selection.country {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(name.to_string(), style))
        })
        .collect();

    let list = List::new(items)
        .block(pane(title, app.focus == Focus::Countries))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.country_cursor);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_years(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .years
        .iter()
        .map(|year| {
            let (mark, style) = match app.selection.year_rank(year) {
                Some(rank) => (format!("[{rank}]"), Style::default().fg(Color::Green)),
                None => ("[ ]".to_string(), Style::default().fg(Color::DarkGray)),
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, style),
                Span::raw(" "),
                Span::raw(year.clone()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(pane(" Years ".to_string(), app.focus == Focus::Years))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.year_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Statistics for {} ", app.dashboard.country);
    match &app.dashboard.outcome {
        Outcome::Ready { stats, .. } => {
            let rows = stats_rows(stats).map(|(label, value)| {
                Row::new(vec![
                    Cell::from(label).style(Style::default().fg(Color::DarkGray)),
                    Cell::from(value).style(Style::default().fg(Color::White)),
                ])
            });
            let table = Table::new(rows, [Constraint::Length(32), Constraint::Min(8)])
                .block(pane(title, false));
            frame.render_widget(table, area);
        }
        Outcome::Unavailable { reason } => {
            let warning = Paragraph::new(vec![
                Line::from(Span::styled(
                    UNAVAILABLE_MESSAGE,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(reason.clone(), Style::default().fg(Color::DarkGray))),
            ])
            .wrap(Wrap { trim: true })
            .block(pane(title, false));
            frame.render_widget(warning, area);
        }
    }
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane(" Population over the years ".to_string(), false);
    let Outcome::Ready { chart, .. } = &app.dashboard.outcome else {
        frame.render_widget(block, area);
        return;
    };

    let bars: Vec<Bar> = chart
        .iter()
        .map(|point| {
            let value = point.population.unwrap_or(0);
            let text = point
                .population
                .map(short_population)
                .unwrap_or_else(|| "n/a".to_string());
            Bar::default()
                .value(value)
                .label(Line::from(point.year.clone()))
                .text_value(text)
                .style(Style::default().fg(Color::Cyan))
                .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        })
        .collect();

    let inner_width = pane_inner(area).width;
    let count = bars.len().max(1) as u16;
    let bar_width = (inner_width.saturating_sub(count) / count).clamp(3, 12);
    let max = chart.iter().filter_map(|p| p.population).max().unwrap_or(0).max(1);

    let widget = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(max);
    frame.render_widget(widget, area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane(" Map ".to_string(), app.focus == Focus::Map);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let spec = match &app.dashboard.outcome {
        Outcome::Ready { map, .. } => Some(map),
        Outcome::Unavailable { .. } => None,
    };
    let layers = app
        .map_renderer
        .render(inner.width as usize, inner.height as usize, &viewport, spec);

    frame.render_widget(MapWidget { layers }, inner);
}

/// Braille map layers with text labels on top
struct MapWidget {
    layers: MapLayers,
}

impl MapWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (col, row, glyph) in canvas.lit_cells() {
            if col >= area.width || row >= area.height {
                continue;
            }
            buf[(area.x + col, area.y + row)].set_char(glyph).set_fg(color);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: context, selected outline, marker
        Self::render_layer(&self.layers.world, Color::DarkGray, area, buf);
        Self::render_layer(&self.layers.outline, Color::Yellow, area, buf);
        Self::render_layer(&self.layers.marker, Color::Red, area, buf);

        let label_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        for (col, row, text) in &self.layers.labels {
            if *row >= area.height || *col >= area.width {
                continue;
            }
            let max_len = (area.width - col) as usize;
            for (i, ch) in text.chars().take(max_len).enumerate() {
                buf[(area.x + col + i as u16, area.y + row)].set_char(ch).set_style(label_style);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;
    let keys = match app.focus {
        _ if app.searching => " type to filter, enter:select esc:clear",
        Focus::Countries => " j/k:country /:search tab:focus q:quit",
        Focus::Years => " j/k:move space:toggle tab:focus q:quit",
        Focus::Map => " hjkl:pan +/-:zoom r:recenter w:world L:labels tab:focus q:quit",
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if settings.show_world { "[W]orld " } else { "[w]orld " },
            Style::default().fg(if settings.show_world { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_labels { "[L]abels " } else { "[l]abels " },
            Style::default().fg(if settings.show_labels { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("|", Style::default().fg(Color::DarkGray)),
        Span::styled(keys, Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
