use geojson::{GeoJson, Geometry, Value};
use glam::DVec2;
use rayon::prelude::*;
use tracing::debug;

use crate::config::AreaMode;
use crate::error::{DashboardError, Result};
use crate::stats::NameMatcher;

/// A closed ring of lon/lat coordinates
pub type Ring = Vec<(f64, f64)>;

/// Spherical earth radius used for geodesic areas (WGS84 semi-major axis)
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Polygon with one exterior ring and any number of holes
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    /// Planar area in coordinate units, holes subtracted
    pub fn planar_area(&self) -> f64 {
        let outer = ring_moments(&self.exterior).0.abs();
        let holes: f64 = self.holes.iter().map(|h| ring_moments(h).0.abs()).sum();
        (outer - holes).max(0.0)
    }

    /// Area on a sphere in m², holes subtracted
    pub fn geodesic_area(&self) -> f64 {
        let outer = ring_geodesic_area(&self.exterior);
        let holes: f64 = self.holes.iter().map(|h| ring_geodesic_area(h)).sum();
        (outer - holes).max(0.0)
    }
}

/// Lon/lat bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    fn of<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<Self> {
        let mut bounds: Option<Bounds> = None;
        for &(lon, lat) in points {
            let b = bounds.get_or_insert(Bounds {
                min_lon: lon,
                min_lat: lat,
                max_lon: lon,
                max_lat: lat,
            });
            b.min_lon = b.min_lon.min(lon);
            b.min_lat = b.min_lat.min(lat);
            b.max_lon = b.max_lon.max(lon);
            b.max_lat = b.max_lat.max(lat);
        }
        bounds
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }
}

/// One row of the boundary dataset
#[derive(Clone, Debug)]
pub struct CountryGeometry {
    pub name: String,
    pub capital: Option<String>,
    pub boundary: Vec<Polygon>,
    /// Planar area in native units (degrees² for lon/lat files)
    pub area: f64,
    /// Area on a sphere in m²
    pub geodesic_area: f64,
    pub centroid: (f64, f64),
    pub bounds: Option<Bounds>,
}

impl CountryGeometry {
    pub fn new(name: String, capital: Option<String>, boundary: Vec<Polygon>) -> Self {
        let area = boundary.iter().map(Polygon::planar_area).sum();
        let geodesic_area = boundary.iter().map(Polygon::geodesic_area).sum();
        let centroid = centroid(&boundary);
        let bounds = Bounds::of(boundary.iter().flat_map(|p| p.exterior.iter()));
        Self {
            name,
            capital,
            boundary,
            area,
            geodesic_area,
            centroid,
            bounds,
        }
    }

    /// Area in km² under the given measuring mode
    pub fn area_km2(&self, mode: AreaMode) -> f64 {
        match mode {
            AreaMode::Native => self.area / 1_000_000.0,
            AreaMode::Geodesic => self.geodesic_area / 1_000_000.0,
        }
    }
}

/// The boundary dataset, one row per named feature in file order
#[derive(Clone, Debug, Default)]
pub struct GeometryTable {
    rows: Vec<CountryGeometry>,
}

impl GeometryTable {
    pub fn new(rows: Vec<CountryGeometry>) -> Self {
        Self { rows }
    }

    /// Parse a GeoJSON FeatureCollection whose features carry a `name` property
    pub fn from_geojson(mut bytes: Vec<u8>, origin: &str) -> Result<Self> {
        let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)
            .map_err(|e| DashboardError::unavailable(origin, e))?;

        let GeoJson::FeatureCollection(fc) = geojson else {
            return Err(DashboardError::unavailable(origin, "expected a FeatureCollection"));
        };

        let mut raw = Vec::with_capacity(fc.features.len());
        let mut unnamed = 0usize;
        for feature in fc.features {
            let props = feature.properties.as_ref();
            let Some(name) = props.and_then(|p| p.get("name")).and_then(|v| v.as_str()) else {
                unnamed += 1;
                continue;
            };
            let capital = props
                .and_then(|p| p.get("Capital").or_else(|| p.get("capital")))
                .and_then(|v| v.as_str())
                .map(str::to_string);

            let mut polygons = Vec::new();
            if let Some(ref geometry) = feature.geometry {
                collect_polygons(geometry, &mut polygons);
            }
            raw.push((name.to_string(), capital, polygons));
        }

        if raw.is_empty() {
            return Err(DashboardError::unavailable(origin, "no feature has a \"name\" property"));
        }
        if unnamed > 0 {
            debug!(unnamed, "skipped features without a name");
        }

        // Area and centroid work dominates for detailed files
        let rows = raw
            .into_par_iter()
            .map(|(name, capital, polygons)| CountryGeometry::new(name, capital, polygons))
            .collect();

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[CountryGeometry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row whose name matches
    pub fn find(&self, name: &str, matcher: &impl NameMatcher) -> Option<&CountryGeometry> {
        self.rows.iter().find(|row| matcher.matches(name, &row.name))
    }
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon> {
    let (exterior, holes) = rings.split_first()?;
    Some(Polygon {
        exterior: to_ring(exterior),
        holes: holes.iter().map(|h| to_ring(h)).collect(),
    })
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => out.extend(to_polygon(rings)),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| to_polygon(rings)));
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

/// Signed shoelace area and first moment of a ring.
/// The ring's centroid is `moment / area`.
fn ring_moments(ring: &[(f64, f64)]) -> (f64, DVec2) {
    if ring.len() < 3 {
        return (0.0, DVec2::ZERO);
    }
    let mut area = 0.0;
    let mut moment = DVec2::ZERO;
    for (i, &(x0, y0)) in ring.iter().enumerate() {
        let (x1, y1) = ring[(i + 1) % ring.len()];
        let a = DVec2::new(x0, y0);
        let b = DVec2::new(x1, y1);
        let cross = a.perp_dot(b);
        area += cross;
        moment += (a + b) * cross;
    }
    (area / 2.0, moment / 6.0)
}

/// Spherical excess approximation over a lon/lat ring, in m²
fn ring_geodesic_area(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut total = 0.0;
    for (i, &(lon0, lat0)) in ring.iter().enumerate() {
        let (lon1, lat1) = ring[(i + 1) % ring.len()];
        total += (lon1 - lon0).to_radians()
            * (2.0 + lat0.to_radians().sin() + lat1.to_radians().sin());
    }
    (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

/// Area-weighted centroid of all polygons; vertex mean when everything is degenerate
pub fn centroid(polygons: &[Polygon]) -> (f64, f64) {
    let mut weight = 0.0;
    let mut sum = DVec2::ZERO;

    for polygon in polygons {
        let (area, moment) = ring_moments(&polygon.exterior);
        if area != 0.0 {
            weight += area.abs();
            sum += moment * area.signum();
        }
        for hole in &polygon.holes {
            let (area, moment) = ring_moments(hole);
            if area != 0.0 {
                weight -= area.abs();
                sum -= moment * area.signum();
            }
        }
    }

    if weight.abs() > f64::EPSILON {
        let c = sum / weight;
        return (c.x, c.y);
    }

    let points: Vec<DVec2> = polygons
        .iter()
        .flat_map(|p| p.exterior.iter())
        .map(|&(x, y)| DVec2::new(x, y))
        .collect();
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().copied().sum::<DVec2>() / points.len() as f64;
    (mean.x, mean.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ExactName;

    fn square(x: f64, y: f64, size: f64) -> Ring {
        vec![
            (x, y),
            (x + size, y),
            (x + size, y + size),
            (x, y + size),
            (x, y),
        ]
    }

    #[test]
    fn test_square_area_and_centroid() {
        let poly = Polygon {
            exterior: square(100.0, 20.0, 10.0),
            holes: vec![],
        };
        assert!((poly.planar_area() - 100.0).abs() < 1e-9);
        let (cx, cy) = centroid(&[poly]);
        assert!((cx - 105.0).abs() < 1e-9);
        assert!((cy - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_does_not_matter() {
        let mut ring = square(0.0, 0.0, 2.0);
        ring.reverse();
        let poly = Polygon {
            exterior: ring,
            holes: vec![],
        };
        assert!((poly.planar_area() - 4.0).abs() < 1e-9);
        let (cx, cy) = centroid(&[poly]);
        assert!((cx - 1.0).abs() < 1e-9 && (cy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hole_is_subtracted() {
        let poly = Polygon {
            exterior: square(0.0, 0.0, 10.0),
            holes: vec![square(0.0, 0.0, 5.0)],
        };
        assert!((poly.planar_area() - 75.0).abs() < 1e-9);
        // Hole in the lower-left pulls the centroid up and right
        let (cx, cy) = centroid(&[poly]);
        assert!(cx > 5.0 && cy > 5.0);
    }

    #[test]
    fn test_multipolygon_centroid_is_area_weighted() {
        let big = Polygon {
            exterior: square(0.0, 0.0, 2.0),
            holes: vec![],
        };
        let small = Polygon {
            exterior: square(10.0, 0.0, 1.0),
            holes: vec![],
        };
        let (cx, _) = centroid(&[big, small]);
        // (4*1 + 1*10.5) / 5
        assert!((cx - 2.9).abs() < 1e-9);
    }

    #[test]
    fn test_geodesic_area_of_one_degree_cell() {
        let poly = Polygon {
            exterior: square(0.0, 0.0, 1.0),
            holes: vec![],
        };
        let km2 = poly.geodesic_area() / 1e6;
        // A 1°x1° cell at the equator is roughly 12,300 km²
        assert!(km2 > 12_000.0 && km2 < 12_600.0, "got {}", km2);
    }

    #[test]
    fn test_from_geojson() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Square", "Capital": "Middle"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[4,0],[4,4],[0,4],[0,0]]]}},
                {"type": "Feature", "properties": {"name": "Islands"},
                 "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[10,10],[11,10],[11,11],[10,11],[10,10]]],
                    [[[20,10],[21,10],[21,11],[20,11],[20,10]]]
                 ]}},
                {"type": "Feature", "properties": {"id": 7},
                 "geometry": {"type": "Point", "coordinates": [1,1]}}
            ]
        }"#;
        let table = GeometryTable::from_geojson(json.as_bytes().to_vec(), "test").unwrap();
        assert_eq!(table.len(), 2);

        let square = table.find("Square", &ExactName).unwrap();
        assert_eq!(square.capital.as_deref(), Some("Middle"));
        assert!((square.area - 16.0).abs() < 1e-9);
        assert_eq!(square.centroid, (2.0, 2.0));

        let islands = table.find("Islands", &ExactName).unwrap();
        assert_eq!(islands.boundary.len(), 2);
        assert!(islands.capital.is_none());
        let bounds = islands.bounds.unwrap();
        assert_eq!((bounds.min_lon, bounds.max_lon), (10.0, 21.0));

        assert!(table.find("square", &ExactName).is_none());
    }

    #[test]
    fn test_rejects_non_collections_and_garbage() {
        let point = br#"{"type": "Point", "coordinates": [1, 2]}"#.to_vec();
        assert!(matches!(
            GeometryTable::from_geojson(point, "p"),
            Err(DashboardError::DataUnavailable { .. })
        ));
        assert!(matches!(
            GeometryTable::from_geojson(b"not json".to_vec(), "g"),
            Err(DashboardError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_requires_name_property() {
        let json = br#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"NAME": "Upper"}, "geometry": null}
        ]}"#
        .to_vec();
        assert!(matches!(
            GeometryTable::from_geojson(json, "g"),
            Err(DashboardError::DataUnavailable { .. })
        ));
    }
}
