use geojson::{GeoJson, Value};
use serde::Deserialize;

use crate::error::{DashboardError, Result};
use crate::stats::NameMatcher;

/// Natural Earth populated-places properties we care about
#[derive(Debug, Deserialize)]
struct CityProperties {
    name: String,
    #[serde(default)]
    adm0name: Option<String>,
    #[serde(default)]
    adm0cap: Option<f64>,
}

/// A national capital with its location
#[derive(Clone, Debug, PartialEq)]
pub struct CapitalCity {
    pub country: String,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

/// National capitals keyed by country, from an optional point dataset
#[derive(Clone, Debug, Default)]
pub struct CapitalIndex {
    capitals: Vec<CapitalCity>,
}

impl CapitalIndex {
    pub fn new(capitals: Vec<CapitalCity>) -> Self {
        Self { capitals }
    }

    /// Load capitals (adm0cap = 1) from a populated-places FeatureCollection
    pub fn from_geojson(mut bytes: Vec<u8>, origin: &str) -> Result<Self> {
        let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)
            .map_err(|e| DashboardError::unavailable(origin, e))?;

        let GeoJson::FeatureCollection(fc) = geojson else {
            return Err(DashboardError::unavailable(origin, "expected a FeatureCollection"));
        };

        let mut capitals = Vec::new();
        for feature in fc.features {
            let Some(props) = feature.properties else {
                continue;
            };
            let Ok(props) = serde_json::from_value::<CityProperties>(serde_json::Value::Object(props)) else {
                continue;
            };
            if props.adm0cap.unwrap_or(0.0) < 1.0 {
                continue;
            }
            let Some(country) = props.adm0name else {
                continue;
            };
            if let Some(Value::Point(coords)) = feature.geometry.map(|g| g.value) {
                if coords.len() >= 2 {
                    capitals.push(CapitalCity {
                        country,
                        name: props.name,
                        lon: coords[0],
                        lat: coords[1],
                    });
                }
            }
        }

        Ok(Self { capitals })
    }

    pub fn len(&self) -> usize {
        self.capitals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capitals.is_empty()
    }

    /// Capital of `country`. With a `name`, only a capital of that name qualifies.
    pub fn find(&self, country: &str, name: Option<&str>, matcher: &impl NameMatcher) -> Option<&CapitalCity> {
        self.capitals
            .iter()
            .filter(|c| matcher.matches(country, &c.country))
            .find(|c| name.map_or(true, |name| c.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ExactName;

    const CITIES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "Beijing", "adm0name": "China", "adm0cap": 1},
         "geometry": {"type": "Point", "coordinates": [116.4, 39.9]}},
        {"type": "Feature", "properties": {"name": "Shanghai", "adm0name": "China", "adm0cap": 0},
         "geometry": {"type": "Point", "coordinates": [121.5, 31.2]}},
        {"type": "Feature", "properties": {"name": "Amsterdam", "adm0name": "Netherlands", "adm0cap": 1},
         "geometry": {"type": "Point", "coordinates": [4.9, 52.4]}},
        {"type": "Feature", "properties": {"name": "The Hague", "adm0name": "Netherlands", "adm0cap": 1.0},
         "geometry": {"type": "Point", "coordinates": [4.3, 52.1]}}
    ]}"#;

    #[test]
    fn test_keeps_only_capitals() {
        let index = CapitalIndex::from_geojson(CITIES.as_bytes().to_vec(), "cities").unwrap();
        assert_eq!(index.len(), 3);
        let beijing = index.find("China", None, &ExactName).unwrap();
        assert_eq!(beijing.name, "Beijing");
        assert_eq!((beijing.lon, beijing.lat), (116.4, 39.9));
    }

    #[test]
    fn test_named_capital_must_match() {
        let index = CapitalIndex::from_geojson(CITIES.as_bytes().to_vec(), "cities").unwrap();
        let hague = index.find("Netherlands", Some("The Hague"), &ExactName).unwrap();
        assert_eq!(hague.name, "The Hague");
        assert_eq!(index.find("Netherlands", None, &ExactName).unwrap().name, "Amsterdam");
        // A named capital never resolves to a different city
        assert!(index.find("Netherlands", Some("Rotterdam"), &ExactName).is_none());
        assert!(index.find("Atlantis", None, &ExactName).is_none());
    }
}
