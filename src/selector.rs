use std::collections::BTreeSet;

use serde::Serialize;

use crate::data::{year_of_column, PopulationTable};

/// Sorted, deduplicated country names. Duplicate rows collapse to one option.
pub fn country_options(table: &PopulationTable) -> Vec<String> {
    table
        .records()
        .iter()
        .map(|r| r.country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Years with a "<year> Population" column, in file column order
pub fn year_options(table: &PopulationTable) -> Vec<String> {
    table
        .headers()
        .iter()
        .filter_map(|h| year_of_column(h))
        .map(str::to_string)
        .collect()
}

/// The first two year options
pub fn default_years(options: &[String]) -> Vec<String> {
    options.iter().take(2).cloned().collect()
}

/// What the user has picked. Years keep the order they were picked in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub country: String,
    pub years: Vec<String>,
}

impl Selection {
    pub fn new(country: impl Into<String>, years: Vec<String>) -> Self {
        let mut selection = Self {
            country: country.into(),
            years: Vec::with_capacity(years.len()),
        };
        for year in years {
            if !selection.has_year(&year) {
                selection.years.push(year);
            }
        }
        selection
    }

    /// First country and the default years
    pub fn initial(table: &PopulationTable) -> Self {
        let country = country_options(table).into_iter().next().unwrap_or_default();
        Self::new(country, default_years(&year_options(table)))
    }

    pub fn has_year(&self, year: &str) -> bool {
        self.years.iter().any(|y| y == year)
    }

    /// Deselect if selected, otherwise append
    pub fn toggle_year(&mut self, year: &str) {
        if let Some(pos) = self.years.iter().position(|y| y == year) {
            self.years.remove(pos);
        } else {
            self.years.push(year.to_string());
        }
    }

    /// 1-based position of the year in the selection
    pub fn year_rank(&self, year: &str) -> Option<usize> {
        self.years.iter().position(|y| y == year).map(|p| p + 1)
    }
}
