//! GeoJSON boundary loading.
//!
//! Accepts a `FeatureCollection`, a single `Feature`, a bare `Polygon` /
//! `MultiPolygon` or a `GeometryCollection`. Every polygon found is unioned
//! into one [`Region`]; other geometry types are ignored.

use crate::domain::geometry::Region;
use crate::utils::error::{Result, SstError};
use geo::{Area, Geometry, Polygon};
use geojson::{GeoJson, Value};
use std::path::Path;

fn region_error(message: impl Into<String>) -> SstError {
    SstError::RegionError {
        message: message.into(),
    }
}

fn geometries(document: GeoJson) -> Vec<geojson::Geometry> {
    match document {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    }
}

/// Positions need at least x and y before conversion.
fn has_short_position(value: &Value) -> bool {
    match value {
        Value::Point(position) => position.len() < 2,
        Value::MultiPoint(line) | Value::LineString(line) => line.iter().any(|p| p.len() < 2),
        Value::MultiLineString(rings) | Value::Polygon(rings) => {
            rings.iter().flatten().any(|p| p.len() < 2)
        }
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().any(|p| p.len() < 2),
        Value::GeometryCollection(geometries) => {
            geometries.iter().any(|g| has_short_position(&g.value))
        }
    }
}

fn collect_polygons(geometry: Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(polygon) => out.push(polygon),
        Geometry::MultiPolygon(polygons) => out.extend(polygons.0),
        Geometry::GeometryCollection(collection) => {
            for geometry in collection.0 {
                collect_polygons(geometry, out);
            }
        }
        _ => {}
    }
}

pub fn parse_region(name: &str, content: &str) -> Result<Region> {
    let document: GeoJson = content
        .parse()
        .map_err(|e| region_error(format!("invalid GeoJSON: {}", e)))?;

    let mut polygons = Vec::new();
    for geometry in geometries(document) {
        if has_short_position(&geometry.value) {
            return Err(region_error("position with fewer than two coordinates"));
        }
        let geometry = Geometry::<f64>::try_from(geometry)
            .map_err(|e| region_error(format!("unsupported geometry: {}", e)))?;
        collect_polygons(geometry, &mut polygons);
    }

    if polygons.iter().any(|polygon| polygon.unsigned_area() == 0.0) {
        return Err(region_error("polygon encloses no area"));
    }

    Region::new(name, polygons).ok_or_else(|| region_error("boundary source contains no polygon"))
}

pub async fn load_region<P: AsRef<Path>>(name: &str, path: P) -> Result<Region> {
    let path = path.as_ref();
    tracing::debug!("Loading region '{}' from {}", name, path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| region_error(format!("cannot read {}: {}", path.display(), e)))?;
    let region = parse_region(name, &content)?;

    tracing::info!(
        "🗺️ Region '{}' loaded: {} polygon(s)",
        region.name(),
        region.polygon_count()
    );
    Ok(region)
}
