mod cities;
mod geometry;
mod population;
mod source;

pub use cities::{CapitalCity, CapitalIndex};
pub use geometry::{centroid, Bounds, CountryGeometry, GeometryTable, Polygon, Ring};
pub use population::{
    population_column, year_of_column, PopulationRecord, PopulationTable, COUNTRY_COLUMN,
    WORLD_SHARE_COLUMN,
};

use std::time::Instant;

use tracing::info;

use crate::config::{Config, Source};
use crate::error::Result;

/// Everything loaded at session start. Read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    pub geometry: GeometryTable,
    pub population: PopulationTable,
    pub capitals: CapitalIndex,
}

/// Fetch and parse every configured source. Any failure is fatal.
pub fn load(config: &Config) -> Result<Tables> {
    let geometry = load_geometry(&config.geometry)?;
    let population = load_population(&config.population)?;
    let capitals = match &config.cities {
        Some(source) => load_capitals(source)?,
        None => CapitalIndex::default(),
    };

    Ok(Tables {
        geometry,
        population,
        capitals,
    })
}

/// Load the country boundary GeoJSON
pub fn load_geometry(source: &Source) -> Result<GeometryTable> {
    let start = Instant::now();
    let origin = source.to_string();
    let table = GeometryTable::from_geojson(source.fetch()?, &origin)?;
    info!(
        source = %origin,
        rows = table.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded boundaries"
    );
    Ok(table)
}

/// Load the wide-format population CSV
pub fn load_population(source: &Source) -> Result<PopulationTable> {
    let start = Instant::now();
    let origin = source.to_string();
    let bytes = source.fetch()?;
    let table = PopulationTable::from_csv(bytes.as_slice(), &origin)?;
    info!(
        source = %origin,
        rows = table.len(),
        columns = table.headers().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded population table"
    );
    Ok(table)
}

/// Load national capitals from a populated-places GeoJSON
pub fn load_capitals(source: &Source) -> Result<CapitalIndex> {
    let start = Instant::now();
    let origin = source.to_string();
    let index = CapitalIndex::from_geojson(source.fetch()?, &origin)?;
    info!(
        source = %origin,
        capitals = index.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded capitals"
    );
    Ok(index)
}
