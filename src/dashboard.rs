//! One full recompute of the dashboard from the loaded tables.
//!
//! [`build`] is a pure function of the selection, the tables and the
//! settings. The interactive session calls it after every selection change;
//! the one-shot report calls it once.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::data::{population_column, Bounds, Polygon, PopulationRecord, PopulationTable, Tables};
use crate::error::{DashboardError, Result};
use crate::selector::Selection;
use crate::stats::{compute_stats, join, DerivedStats, Joined, NameMatcher};

pub const UNAVAILABLE_MESSAGE: &str = "Data not available for this country.";
pub const CAPITAL_PLACEHOLDER: &str = "Capital info not available";

/// Where the map marker's position came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    Capital,
    Centroid,
}

/// What the map pane should show
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapSpec {
    /// Map center and marker position (lon, lat)
    pub anchor: (f64, f64),
    pub anchor_source: AnchorSource,
    pub marker_label: String,
    #[serde(skip)]
    pub outline: Vec<Polygon>,
    #[serde(skip)]
    pub bounds: Option<Bounds>,
}

/// One bar of the population chart (long format)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub year: String,
    pub population: Option<u64>,
}

/// Result of one recompute
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ready {
        stats: DerivedStats,
        map: MapSpec,
        chart: Vec<SeriesPoint>,
    },
    /// The country could not be joined; show a warning instead
    Unavailable { reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub country: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Dashboard {
    pub fn is_ready(&self) -> bool {
        matches!(self.outcome, Outcome::Ready { .. })
    }
}

/// Recompute stats, map and chart for the current selection.
///
/// Join failures come back as [`Outcome::Unavailable`]. A missing column
/// is an error and is left for the caller to surface.
pub fn build(
    selection: &Selection,
    tables: &Tables,
    settings: &Settings,
    matcher: &impl NameMatcher,
) -> Result<Dashboard> {
    let country = selection.country.clone();

    // A bad year column is fatal whichever country is selected
    if let Err(err) = check_year_columns(&tables.population, &selection.years) {
        warn!(%country, %err, "dashboard recompute failed");
        return Err(err);
    }

    let ready = join(&country, tables, matcher).and_then(|joined| {
        let chart = reshape(joined.record, &selection.years)?;
        let stats = compute_stats(&joined, &tables.population, settings)?;
        let map = map_spec(&joined, tables, matcher);
        Ok(Outcome::Ready { stats, map, chart })
    });

    let outcome = match ready {
        Ok(outcome) => outcome,
        Err(err) if err.is_recoverable() => {
            debug!(%country, %err, "country unavailable");
            Outcome::Unavailable {
                reason: err.to_string(),
            }
        }
        Err(err) => {
            warn!(%country, %err, "dashboard recompute failed");
            return Err(err);
        }
    };

    Ok(Dashboard { country, outcome })
}

fn check_year_columns(table: &PopulationTable, years: &[String]) -> Result<()> {
    for year in years {
        let column = population_column(year);
        if !table.has_column(&column) {
            return Err(DashboardError::MissingColumn { column });
        }
    }
    Ok(())
}

/// Marker, center and outline for the joined country
pub fn map_spec(joined: &Joined<'_>, tables: &Tables, matcher: &impl NameMatcher) -> MapSpec {
    let geometry = joined.geometry;
    let capital = tables
        .capitals
        .find(&geometry.name, geometry.capital.as_deref(), matcher);

    // `find` only returns a city carrying the geometry's capital name, if it has one
    let capital_name = geometry
        .capital
        .as_deref()
        .or_else(|| capital.map(|c| c.name.as_str()));

    let (anchor, anchor_source) = match capital {
        Some(c) => ((c.lon, c.lat), AnchorSource::Capital),
        None => (geometry.centroid, AnchorSource::Centroid),
    };

    MapSpec {
        anchor,
        anchor_source,
        marker_label: format!(
            "Capital: {}",
            capital_name.unwrap_or(CAPITAL_PLACEHOLDER)
        ),
        outline: geometry.boundary.clone(),
        bounds: geometry.bounds,
    }
}

/// Wide-to-long: one point per selected year, in selection order
pub fn reshape(record: &PopulationRecord, years: &[String]) -> Result<Vec<SeriesPoint>> {
    years
        .iter()
        .map(|year| {
            Ok(SeriesPoint {
                year: year.clone(),
                population: record.population(&population_column(year))?,
            })
        })
        .collect()
}

/// Label/value rows of the statistics block
pub fn stats_rows(stats: &DerivedStats) -> [(&'static str, String); 3] {
    [
        ("Area (km²)", format!("{:.2}", round2(stats.area_km2))),
        (
            "Population Density (people/km²)",
            format!("{:.2}", round2(stats.density)),
        ),
        ("World Population Percentage", format!("{:.2}%", stats.world_pct)),
    ]
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Compact population figure for bar labels: 1.43B, 338.3M, 12.5K
pub fn short_population(value: u64) -> String {
    let v = value as f64;
    if value >= 1_000_000_000 {
        format!("{:.2}B", v / 1e9)
    } else if value >= 1_000_000 {
        format!("{:.1}M", v / 1e6)
    } else if value >= 1_000 {
        format!("{:.1}K", v / 1e3)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CapitalCity, CapitalIndex, CountryGeometry, GeometryTable};
    use crate::stats::ExactName;
    use crate::testdata;

    fn selection(country: &str, years: &[&str]) -> Selection {
        Selection::new(country, years.iter().map(|y| y.to_string()).collect())
    }

    #[test]
    fn test_china_scenario() {
        let tables = testdata::tables();
        let dashboard = build(
            &selection("China", &["2020", "2022"]),
            &tables,
            &Settings::default(),
            &ExactName,
        )
        .unwrap();

        let Outcome::Ready { chart, .. } = dashboard.outcome else {
            panic!("China should be available");
        };
        assert_eq!(
            chart,
            vec![
                SeriesPoint {
                    year: "2020".into(),
                    population: Some(1_424_929_781)
                },
                SeriesPoint {
                    year: "2022".into(),
                    population: Some(1_425_887_337)
                },
            ]
        );
    }

    #[test]
    fn test_reshape_follows_selection_order() {
        let tables = testdata::tables();
        let record = tables.population.find("Erewhon", &ExactName).unwrap();
        let years: Vec<String> = vec!["2015".into(), "2022".into(), "2020".into()];
        let series = reshape(record, &years).unwrap();
        let values: Vec<_> = series.iter().map(|p| p.population).collect();
        assert_eq!(values, vec![Some(300), Some(500), Some(400)]);
        assert!(reshape(record, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_year_propagates() {
        let tables = testdata::tables();
        let result = build(
            &selection("China", &["2022", "1999"]),
            &tables,
            &Settings::default(),
            &ExactName,
        );
        assert_eq!(
            result,
            Err(DashboardError::MissingColumn {
                column: "1999 Population".into()
            })
        );
    }

    #[test]
    fn test_typo_is_unavailable_not_error() {
        let tables = testdata::tables();
        let dashboard = build(
            &selection("Chnia", &["2022"]),
            &tables,
            &Settings::default(),
            &ExactName,
        )
        .unwrap();
        assert!(!dashboard.is_ready());
        assert!(matches!(dashboard.outcome, Outcome::Unavailable { .. }));
    }

    #[test]
    fn test_capital_from_property_without_location_uses_centroid() {
        let tables = testdata::tables();
        let joined = join("China", &tables, &ExactName).unwrap();
        let spec = map_spec(&joined, &tables, &ExactName);
        assert_eq!(spec.marker_label, "Capital: Beijing");
        assert_eq!(spec.anchor_source, AnchorSource::Centroid);
        assert_eq!(spec.anchor, (110.0, 30.0));
    }

    #[test]
    fn test_capital_location_from_cities() {
        let tables = testdata::tables_with_capitals();
        let joined = join("China", &tables, &ExactName).unwrap();
        let spec = map_spec(&joined, &tables, &ExactName);
        assert_eq!(spec.anchor_source, AnchorSource::Capital);
        assert_eq!(spec.anchor, (116.4, 39.9));
        assert_eq!(spec.outline.len(), 1);
    }

    #[test]
    fn test_no_capital_uses_placeholder() {
        let tables = testdata::tables_with_capitals();
        let joined = join("Atlantis", &tables, &ExactName).unwrap();
        let spec = map_spec(&joined, &tables, &ExactName);
        assert_eq!(spec.marker_label, "Capital: Capital info not available");
        assert_eq!(spec.anchor_source, AnchorSource::Centroid);
        let (lon, lat) = spec.anchor;
        assert!((lon + 21.5).abs() < 1e-9 && (lat - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_stats_formatting() {
        let stats = DerivedStats {
            population_2022: 10,
            area_km2: 1234.5678,
            density: 0.004,
            world_pct: 12.3456,
        };
        let rows = stats_rows(&stats);
        assert_eq!(rows[0].1, "1234.57");
        assert_eq!(rows[1].1, "0.00");
        assert_eq!(rows[2].1, "12.35%");
    }

    #[test]
    fn test_short_population() {
        assert_eq!(short_population(1_425_887_337), "1.43B");
        assert_eq!(short_population(338_289_857), "338.3M");
        assert_eq!(short_population(12_500), "12.5K");
        assert_eq!(short_population(999), "999");
    }

    #[test]
    fn test_named_capital_without_matching_city_uses_centroid() {
        let tables = Tables {
            capitals: CapitalIndex::new(vec![CapitalCity {
                country: "China".into(),
                name: "Nanjing".into(),
                lon: 118.8,
                lat: 32.1,
            }]),
            ..testdata::tables()
        };
        let joined = join("China", &tables, &ExactName).unwrap();
        let spec = map_spec(&joined, &tables, &ExactName);
        assert_eq!(spec.marker_label, "Capital: Beijing");
        assert_eq!(spec.anchor_source, AnchorSource::Centroid);
        assert_eq!(spec.anchor, (110.0, 30.0));
    }

    #[test]
    fn test_unnamed_capital_takes_city_name_and_location() {
        let mut tables = testdata::tables();
        tables.capitals = CapitalIndex::new(vec![CapitalCity {
            country: "Atlantis".into(),
            name: "Poseidonia".into(),
            lon: -25.0,
            lat: 5.0,
        }]);
        let joined = join("Atlantis", &tables, &ExactName).unwrap();
        let spec = map_spec(&joined, &tables, &ExactName);
        assert_eq!(spec.marker_label, "Capital: Poseidonia");
        assert_eq!(spec.anchor_source, AnchorSource::Capital);
        assert_eq!(spec.anchor, (-25.0, 5.0));
    }

    #[test]
    fn test_unknown_year_beats_empty_reference_cell() {
        let tables = testdata::tables();
        for country in ["Nullland", "Chnia"] {
            let result = build(
                &selection(country, &["2022", "1999"]),
                &tables,
                &Settings::default(),
                &ExactName,
            );
            assert_eq!(
                result,
                Err(DashboardError::MissingColumn {
                    column: "1999 Population".into()
                })
            );
        }
    }

    #[test]
    fn test_boundary_without_area_is_unavailable() {
        let mut tables = testdata::tables();
        tables.geometry = GeometryTable::new(vec![CountryGeometry::new("China".into(), None, Vec::new())]);
        let dashboard = build(
            &selection("China", &["2022"]),
            &tables,
            &Settings::default(),
            &ExactName,
        )
        .unwrap();
        assert!(!dashboard.is_ready());
    }
}
