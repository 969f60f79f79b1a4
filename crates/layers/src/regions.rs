//! Representative points for country regions, from GeoJSON boundaries.

use std::collections::BTreeMap;

use foundation::iso::IsoCode;
use foundation::math::{LonLat, Vec3};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("boundary data is not a GeoJSON feature collection: {0}")]
    Json(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub iso: IsoCode,
    pub name: String,
    pub centroid: LonLat,
}

/// Region centroids keyed by ISO code; the arc endpoints of every corridor.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: BTreeMap<IsoCode, Region>,
}

type Position = Vec<f64>;

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    properties: Option<Properties>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Deserialize, Default)]
struct Properties {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "ISO_A3")]
    iso_a3: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl RegionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a feature collection whose feature `id` (or `ISO_A3` property)
    /// is the ISO3 code. Features without a usable code or geometry are
    /// skipped; the first feature for a code wins.
    pub fn from_geojson_str(text: &str) -> Result<Self, RegionError> {
        let collection: FeatureCollection =
            serde_json::from_str(text).map_err(|e| RegionError::Json(e.to_string()))?;

        let mut table = Self::new();
        let mut skipped = 0usize;
        for feature in collection.features {
            let props = feature.properties.unwrap_or_default();
            let code = feature
                .id
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .and_then(|s| IsoCode::parse(s).ok())
                .or_else(|| props.iso_a3.as_deref().and_then(|s| IsoCode::parse(s).ok()));
            let centroid = feature.geometry.as_ref().and_then(geometry_centroid);
            let (Some(iso), Some(centroid)) = (code, centroid) else {
                skipped += 1;
                continue;
            };
            let name = props.name.unwrap_or_else(|| iso.to_string());
            table.regions.entry(iso).or_insert(Region {
                iso,
                name,
                centroid,
            });
        }
        if skipped > 0 {
            debug!(skipped, "boundary features without code or geometry ignored");
        }
        info!(regions = table.len(), "region centroids computed");
        Ok(table)
    }

    pub fn insert(&mut self, iso: IsoCode, name: impl Into<String>, centroid: LonLat) {
        self.regions.insert(
            iso,
            Region {
                iso,
                name: name.into(),
                centroid,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, iso: IsoCode) -> Option<&Region> {
        self.regions.get(&iso)
    }

    pub fn centroid(&self, iso: IsoCode) -> Option<LonLat> {
        self.regions.get(&iso).map(|r| r.centroid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.values()
    }
}

fn unit(p: &Position) -> Option<Vec3> {
    match p.as_slice() {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => {
            Some(LonLat::new(*lon, *lat).to_unit())
        }
        _ => None,
    }
}

fn geometry_centroid(geometry: &Geometry) -> Option<LonLat> {
    let polygons: Vec<&Vec<Vec<Position>>> = match geometry {
        Geometry::Polygon(rings) => vec![rings],
        Geometry::MultiPolygon(polys) => polys.iter().collect(),
        Geometry::Point(p) => return unit(p).and_then(LonLat::from_direction),
        Geometry::MultiPoint(points) | Geometry::LineString(points) => {
            return mean_direction(points.iter());
        }
        Geometry::MultiLineString(lines) => return mean_direction(lines.iter().flatten()),
    };

    let mut moment = Vec3::default();
    let mut area = 0.0;
    for rings in &polygons {
        for (ring_idx, ring) in rings.iter().enumerate() {
            let (ring_moment, ring_area) = ring_moment(ring);
            // Holes subtract regardless of winding.
            let sign = if ring_idx == 0 { 1.0 } else { -1.0 };
            moment = moment + ring_moment.scale(sign);
            area += sign * ring_area;
        }
    }

    if area > 1e-12 {
        if let Some(c) = LonLat::from_direction(moment) {
            return Some(c);
        }
    }
    mean_direction(polygons.iter().flat_map(|rings| rings.iter().flatten()))
}

/// Area-weighted spherical moment and area of one ring, winding-independent.
fn ring_moment(ring: &[Position]) -> (Vec3, f64) {
    let mut pts: Vec<Vec3> = ring.iter().filter_map(unit).collect();
    if pts.len() >= 2 && (pts[0] - pts[pts.len() - 1]).length() < 1e-12 {
        pts.pop();
    }
    if pts.len() < 3 {
        return (Vec3::default(), 0.0);
    }

    let a = pts[0];
    let mut moment = Vec3::default();
    let mut signed_area = 0.0;
    for w in pts[1..].windows(2) {
        let (b, c) = (w[0], w[1]);
        let sum = a + b + c;
        let Some(dir) = sum.normalized() else {
            continue;
        };
        let tri_area = 0.5 * (b - a).cross(c - a).dot(dir);
        moment = moment + sum.scale(tri_area / 3.0);
        signed_area += tri_area;
    }

    if signed_area < 0.0 {
        (moment.scale(-1.0), -signed_area)
    } else {
        (moment, signed_area)
    }
}

fn mean_direction<'a>(points: impl Iterator<Item = &'a Position>) -> Option<LonLat> {
    let sum = points
        .filter_map(unit)
        .fold(Vec3::default(), |acc, v| acc + v);
    LonLat::from_direction(sum)
}
