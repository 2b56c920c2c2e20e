use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

/// Boundary file used when no `--geometry` is given.
pub const DEFAULT_GEOMETRY_URL: &str = "https://raw.githubusercontent.com/tommyscodebase/12_Days_Geospatial_Python_Bootcamp/refs/heads/main/13_final_project_data/world.geojson";

/// Population table used when no `--population` is given.
pub const DEFAULT_POPULATION_URL: &str = "https://raw.githubusercontent.com/tommyscodebase/12_Days_Geospatial_Python_Bootcamp/main/13_final_project_data/world_population.csv";

/// Where a dataset comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// Anything with an http(s) scheme is fetched, everything else is read from disk
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How a boundary's area is measured before the km² conversion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AreaMode {
    /// Planar area in the file's own coordinate units, divided by 10^6.
    /// For lon/lat data this is degrees², so the figure is only indicative.
    #[default]
    Native,
    /// Area on a spherical earth in m², divided by 10^6.
    Geodesic,
}

/// Denominator of the world population percentage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ShareBasis {
    /// Sum of the "World Population Percentage" column over rows with a 2022 figure
    #[default]
    PercentageSum,
    /// Sum of the 2022 populations themselves
    PopulationSum,
}

/// Knobs that change what the dashboard computes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub area_mode: AreaMode,
    pub share_basis: ShareBasis,
}

/// Everything the loader needs to build a session
#[derive(Clone, Debug)]
pub struct Config {
    pub geometry: Source,
    pub population: Source,
    pub cities: Option<Source>,
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geometry: Source::parse(DEFAULT_GEOMETRY_URL),
            population: Source::parse(DEFAULT_POPULATION_URL),
            cities: None,
            settings: Settings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert!(matches!(Source::parse("https://example.org/a.csv"), Source::Url(_)));
        assert!(matches!(Source::parse("HTTP://example.org/a.csv"), Source::Url(_)));
        assert_eq!(
            Source::parse("data/world.geojson"),
            Source::Path(PathBuf::from("data/world.geojson"))
        );
    }

    #[test]
    fn test_defaults_point_at_remote_files() {
        let config = Config::default();
        assert!(matches!(config.geometry, Source::Url(_)));
        assert!(matches!(config.population, Source::Url(_)));
        assert_eq!(config.settings.area_mode, AreaMode::Native);
        assert_eq!(config.settings.share_basis, ShareBasis::PercentageSum);
    }
}
