use crate::domain::geometry::{bounding_union, Region};
use chrono::{DateTime, Utc};
use geo_types::{coord, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// A north-up raster for one band of one scene, row-major from the
/// upper-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandGrid {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_size: f64,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub nodata: Option<f64>,
    pub values: Vec<f64>,
}

impl BandGrid {
    pub fn extent(&self) -> Rect<f64> {
        Rect::new(
            coord! {
                x: self.origin_x,
                y: self.origin_y - self.height as f64 * self.pixel_size,
            },
            coord! {
                x: self.origin_x + self.width as f64 * self.pixel_size,
                y: self.origin_y,
            },
        )
    }

    /// Nearest-pixel lookup. Masked (nodata, NaN) and out-of-grid points
    /// return `None`.
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        let col = ((x - self.origin_x) / self.pixel_size).floor();
        let row = ((self.origin_y - y) / self.pixel_size).floor();
        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return None;
        }
        let value = *self.values.get(row as usize * self.width + col as usize)?;
        if value.is_nan() || self.nodata == Some(value) {
            return None;
        }
        Some(value)
    }

    pub fn is_consistent(&self) -> bool {
        self.pixel_size.is_finite()
            && self.pixel_size > 0.0
            && self.width.checked_mul(self.height) == Some(self.values.len())
    }
}

/// Footprints travel as `{min_x, min_y, max_x, max_y}`.
#[derive(Serialize, Deserialize)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

fn serialize_footprint<S: Serializer>(
    footprint: &Option<Rect<f64>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    footprint
        .map(|rect| Bounds {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        })
        .serialize(serializer)
}

fn deserialize_footprint<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Rect<f64>>, D::Error> {
    let bounds = Option::<Bounds>::deserialize(deserializer)?;
    Ok(bounds.map(|b| {
        Rect::new(
            coord! { x: b.min_x, y: b.min_y },
            coord! { x: b.max_x, y: b.max_y },
        )
    }))
}

/// One image of the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub acquired: DateTime<Utc>,
    #[serde(
        default,
        serialize_with = "serialize_footprint",
        deserialize_with = "deserialize_footprint"
    )]
    pub footprint: Option<Rect<f64>>,
    #[serde(default)]
    pub bands: BTreeMap<String, BandGrid>,
}

impl Scene {
    /// Declared footprint, else the union of the band extents.
    pub fn footprint(&self) -> Option<Rect<f64>> {
        self.footprint
            .or_else(|| bounding_union(self.bands.values().map(BandGrid::extent)))
    }

    pub fn band(&self, name: &str) -> Option<&BandGrid> {
        self.bands.get(name)
    }

    /// Keeps only `band`; a scene without it ends up with no bands.
    pub fn select(&self, band: &str) -> Scene {
        Scene {
            id: self.id.clone(),
            acquired: self.acquired,
            footprint: self.footprint(),
            bands: self
                .bands
                .get_key_value(band)
                .map(|(k, v)| (k.clone(), v.clone()))
                .into_iter()
                .collect(),
        }
    }
}

/// Scene manifest as served by a catalog: a bare array or `{"scenes": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SceneManifest {
    List(Vec<Scene>),
    Wrapped { scenes: Vec<Scene> },
}

impl SceneManifest {
    pub fn into_scenes(self) -> Vec<Scene> {
        match self {
            SceneManifest::List(scenes) | SceneManifest::Wrapped { scenes } => scenes,
        }
    }
}

/// One row of the exported table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub date: String,
    pub mean_sst: Option<f64>,
}

/// What the extract phase hands to the reducer.
#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub region: Region,
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<MonthlyRecord>,
    pub windows_with_data: usize,
    pub effective_scale: f64,
}
