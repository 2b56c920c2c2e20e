use serde::Serialize;
use tracing::debug;

use crate::config::{Settings, ShareBasis};
use crate::data::{population_column, CountryGeometry, PopulationRecord, PopulationTable, Tables};
use crate::error::{DashboardError, Result};

/// Reference year for density and world share
pub const REFERENCE_YEAR: &str = "2022";

/// Decides whether a row's country name refers to the selected country.
/// Every join between the datasets goes through this.
pub trait NameMatcher {
    fn matches(&self, wanted: &str, candidate: &str) -> bool;
}

/// Case-sensitive, byte-for-byte equality
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactName;

impl NameMatcher for ExactName {
    #[inline]
    fn matches(&self, wanted: &str, candidate: &str) -> bool {
        wanted == candidate
    }
}

/// Statistics shown for the selected country
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DerivedStats {
    pub population_2022: u64,
    pub area_km2: f64,
    pub density: f64,
    pub world_pct: f64,
}

/// The selected country's row in each table
#[derive(Clone, Copy, Debug)]
pub struct Joined<'a> {
    pub record: &'a PopulationRecord,
    pub geometry: &'a CountryGeometry,
}

/// Look the country up in both tables
pub fn join<'a>(country: &str, tables: &'a Tables, matcher: &impl NameMatcher) -> Result<Joined<'a>> {
    let record = tables
        .population
        .find(country, matcher)
        .ok_or_else(|| DashboardError::NoMatch {
            country: country.to_string(),
            table: "population",
        })?;
    let geometry = tables
        .geometry
        .find(country, matcher)
        .ok_or_else(|| DashboardError::NoMatch {
            country: country.to_string(),
            table: "geometry",
        })?;
    Ok(Joined { record, geometry })
}

/// Area, density and world share for a joined country
pub fn compute_stats(joined: &Joined<'_>, population: &PopulationTable, settings: &Settings) -> Result<DerivedStats> {
    let column = population_column(REFERENCE_YEAR);
    let area_km2 = joined.geometry.area_km2(settings.area_mode);

    let population_2022 = joined
        .record
        .population(&column)?
        .ok_or_else(|| DashboardError::MissingValue {
            country: joined.record.country.clone(),
            column: column.clone(),
        })?;

    // Also catches the -0.0 of a feature without polygons
    if area_km2.is_nan() || area_km2 <= 0.0 {
        return Err(DashboardError::ZeroDivisor {
            country: joined.record.country.clone(),
            quantity: "boundary area",
        });
    }

    let denominator = world_share_denominator(population, settings.share_basis, &column)?;
    if denominator.is_nan() || denominator <= 0.0 {
        return Err(DashboardError::ZeroDivisor {
            country: joined.record.country.clone(),
            quantity: "world population total",
        });
    }
    let pop = population_2022 as f64;

    let stats = DerivedStats {
        population_2022,
        area_km2,
        density: pop / area_km2,
        world_pct: pop / denominator * 100.0,
    };
    debug!(country = %joined.record.country, ?stats, "computed stats");
    Ok(stats)
}

/// Sum the world percentage is taken against, over rows with a reference-year figure
pub fn world_share_denominator(table: &PopulationTable, basis: ShareBasis, column: &str) -> Result<f64> {
    let mut total = 0.0;
    for record in table.records() {
        let Some(pop) = record.population(column)? else {
            continue;
        };
        total += match basis {
            ShareBasis::PercentageSum => record.world_share.unwrap_or(0.0),
            ShareBasis::PopulationSum => pop as f64,
        };
    }
    Ok(total)
}
