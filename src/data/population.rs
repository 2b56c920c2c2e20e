use std::collections::HashMap;
use std::io::Read;

use crate::error::{DashboardError, Result};
use crate::stats::NameMatcher;

pub const COUNTRY_COLUMN: &str = "Country/Territory";
pub const WORLD_SHARE_COLUMN: &str = "World Population Percentage";

/// Column name holding the population for a year
pub fn population_column(year: &str) -> String {
    format!("{year} Population")
}

/// The year a column holds, if it is a "<digits> ...Population..." column
pub fn year_of_column(header: &str) -> Option<&str> {
    if !header.contains("Population") {
        return None;
    }
    let token = header.split(' ').next()?;
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        Some(token)
    } else {
        None
    }
}

/// One country's row in wide format
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationRecord {
    pub country: String,
    /// Population cells keyed by full column name ("2022 Population")
    pub populations: HashMap<String, Option<u64>>,
    pub world_share: Option<f64>,
}

impl PopulationRecord {
    /// Cell for a population column. `Ok(None)` is an empty cell.
    pub fn population(&self, column: &str) -> Result<Option<u64>> {
        self.populations
            .get(column)
            .copied()
            .ok_or_else(|| DashboardError::MissingColumn {
                column: column.to_string(),
            })
    }
}

/// The population dataset, rows in file order
#[derive(Clone, Debug, Default)]
pub struct PopulationTable {
    headers: Vec<String>,
    records: Vec<PopulationRecord>,
}

impl PopulationTable {
    pub fn from_csv<R: Read>(reader: R, origin: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| DashboardError::unavailable(origin, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DashboardError::unavailable(origin, format!("missing column {name:?}")))
        };
        let country_idx = find(COUNTRY_COLUMN)?;
        let share_idx = find(WORLD_SHARE_COLUMN)?;
        let population_idx: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| year_of_column(h).is_some())
            .map(|(i, _)| i)
            .collect();

        let mut records = Vec::new();
        for (line, row) in rdr.records().enumerate() {
            let row = row.map_err(|e| DashboardError::unavailable(origin, e))?;
            let cell = |idx: usize| row.get(idx).unwrap_or("");

            let country = cell(country_idx).to_string();
            let world_share = parse_cell::<f64>(cell(share_idx))
                .map_err(|bad| malformed(origin, line, WORLD_SHARE_COLUMN, bad))?;

            let mut populations = HashMap::with_capacity(population_idx.len());
            for &idx in &population_idx {
                let value = parse_population(cell(idx))
                    .map_err(|bad| malformed(origin, line, &headers[idx], bad))?;
                populations.insert(headers[idx].clone(), value);
            }

            records.push(PopulationRecord {
                country,
                populations,
                world_share,
            });
        }

        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[PopulationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// First row whose country matches
    pub fn find(&self, country: &str, matcher: &impl NameMatcher) -> Option<&PopulationRecord> {
        self.records.iter().find(|r| matcher.matches(country, &r.country))
    }
}

fn malformed(origin: &str, line: usize, column: &str, bad: String) -> DashboardError {
    // +2: header line, 1-based
    DashboardError::unavailable(
        origin,
        format!("line {}: bad value {bad:?} in {column:?}", line + 2),
    )
}

fn parse_cell<T: std::str::FromStr>(raw: &str) -> std::result::Result<Option<T>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| raw.to_string())
}

/// Integers, or floats such as "1425887337.0" written by spreadsheet exports
fn parse_population(raw: &str) -> std::result::Result<Option<u64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(Some(v));
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v.round() as u64)),
        Ok(v) if v.is_nan() => Ok(None),
        _ => Err(raw.to_string()),
    }
}
