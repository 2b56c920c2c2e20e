//! Plain-text and JSON renderings of a dashboard for one-shot use.

use std::fmt::Write;

use clap::ValueEnum;

use crate::dashboard::{short_population, stats_rows, AnchorSource, Dashboard, Outcome, UNAVAILABLE_MESSAGE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

pub fn render(dashboard: &Dashboard, format: Format) -> Result<String, serde_json::Error> {
    match format {
        Format::Text => Ok(render_text(dashboard)),
        Format::Json => serde_json::to_string_pretty(dashboard),
    }
}

pub fn render_text(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let (stats, map, chart) = match &dashboard.outcome {
        Outcome::Ready { stats, map, chart } => (stats, map, chart),
        Outcome::Unavailable { reason } => {
            let _ = writeln!(out, "{}", UNAVAILABLE_MESSAGE);
            let _ = writeln!(out, "  ({})", reason);
            return out;
        }
    };

    let _ = writeln!(out, "Statistics for {}", dashboard.country);
    let rows = stats_rows(stats);
    let label_width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    for (label, value) in &rows {
        let pad = label_width - label.chars().count();
        let _ = writeln!(out, "  {}{}  {}", label, " ".repeat(pad), value);
    }

    let (lon, lat) = map.anchor;
    let source = match map.anchor_source {
        AnchorSource::Capital => "capital",
        AnchorSource::Centroid => "centroid",
    };
    let _ = writeln!(out);
    let _ = writeln!(out, "Map");
    let _ = writeln!(out, "  {} at {:.4}, {:.4} ({})", map.marker_label, lat, lon, source);

    let _ = writeln!(out);
    let _ = writeln!(out, "Population over the years");
    let peak = chart.iter().filter_map(|p| p.population).max().unwrap_or(0).max(1);
    for point in chart {
        let value = point.population.unwrap_or(0);
        let bar = "█".repeat(((value as f64 / peak as f64) * 40.0).round() as usize);
        let label = point
            .population
            .map(short_population)
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(out, "  {:>6} {:<40} {}", point.year, bar, label);
    }

    out
}
