//! Small fixtures shared by unit tests.

use crate::data::{CapitalIndex, GeometryTable, PopulationTable, Tables};

pub const WORLD_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"name": "China", "Capital": "Beijing"},
     "geometry": {"type": "Polygon", "coordinates": [[[100,20],[120,20],[120,40],[100,40],[100,20]]]}},
    {"type": "Feature", "properties": {"name": "United States of America"},
     "geometry": {"type": "Polygon", "coordinates": [[[-120,30],[-80,30],[-80,48],[-120,48],[-120,30]]]}},
    {"type": "Feature", "properties": {"name": "Atlantis"},
     "geometry": {"type": "MultiPolygon", "coordinates": [
        [[[-30,0],[-20,0],[-20,10],[-30,10],[-30,0]]],
        [[[-10,0],[-5,0],[-5,5],[-10,5],[-10,0]]]
     ]}},
    {"type": "Feature", "properties": {"name": "Nullland"},
     "geometry": {"type": "Polygon", "coordinates": [[[0,50],[10,50],[10,60],[0,60],[0,50]]]}}
  ]
}"#;

pub const POPULATION_CSV: &str = "\
Rank,Country/Territory,Capital,2022 Population,2020 Population,2015 Population,World Population Percentage
1,China,Beijing,1425887337,1424929781,1393715448,17.88
3,United States,\"Washington, D.C.\",338289857,335942003,324607776,4.24
150,Atlantis,Poseidonia,1000,900,800,0.5
180,Nullland,Void,,50,40,0.1
151,Atlantis,Poseidonia,2000,1900,1800,0.7
170,Erewhon,Nowhere,500,400,300,0.3
";

pub const CITIES_GEOJSON: &str = r#"{"type": "FeatureCollection", "features": [
  {"type": "Feature", "properties": {"name": "Beijing", "adm0name": "China", "adm0cap": 1},
   "geometry": {"type": "Point", "coordinates": [116.4, 39.9]}},
  {"type": "Feature", "properties": {"name": "Shanghai", "adm0name": "China", "adm0cap": 0},
   "geometry": {"type": "Point", "coordinates": [121.5, 31.2]}}
]}"#;

/// Tables without the optional capitals dataset
pub fn tables() -> Tables {
    Tables {
        geometry: GeometryTable::from_geojson(WORLD_GEOJSON.as_bytes().to_vec(), "world").unwrap(),
        population: PopulationTable::from_csv(POPULATION_CSV.as_bytes(), "population").unwrap(),
        capitals: CapitalIndex::default(),
    }
}

/// Tables including capital locations
pub fn tables_with_capitals() -> Tables {
    Tables {
        capitals: CapitalIndex::from_geojson(CITIES_GEOJSON.as_bytes().to_vec(), "cities").unwrap(),
        ..tables()
    }
}
