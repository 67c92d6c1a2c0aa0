//! Per-window reduction: calendar filter, temporal mean, band guard, areal mean.

use crate::config::job_config::ReductionConfig;
use crate::domain::calendar::CalendarWindow;
use crate::domain::geometry::Region;
use crate::domain::model::{BandGrid, MonthlyRecord, Scene};
use crate::utils::error::{Result, SstError};
use geo::{Intersects, Rect};

/// Band-selected scenes whose footprint touches the region.
pub fn prepare_collection(scenes: &[Scene], band: &str, region: &Region) -> Vec<Scene> {
    scenes
        .iter()
        .map(|scene| scene.select(band))
        .filter(|scene| {
            scene
                .footprint()
                .is_some_and(|footprint| footprint.intersects(region.bbox()))
        })
        .collect()
}

/// Pixel-wise temporal mean of every scene in one calendar window.
///
/// Nothing is computed up front; values are averaged at the points the
/// areal reduction asks for.
#[derive(Debug)]
pub struct MeanComposite<'a> {
    band: &'a str,
    grids: Vec<&'a BandGrid>,
}

impl<'a> MeanComposite<'a> {
    pub fn for_window(collection: &'a [Scene], window: &CalendarWindow, band: &'a str) -> Self {
        let grids = collection
            .iter()
            .filter(|scene| window.contains(&scene.acquired))
            .filter_map(|scene| scene.band(band))
            .collect();
        Self { band, grids }
    }

    /// False when no scene in the window carried the band.
    pub fn has_band(&self, band: &str) -> bool {
        self.band == band && !self.grids.is_empty()
    }

    /// Mean over the scenes with a valid pixel at (x, y).
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        let (sum, count) = self
            .grids
            .iter()
            .filter_map(|grid| grid.sample(x, y))
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

/// First lattice cell and cell count along one axis. Kept in f64 so tiny
/// scales saturate to infinity instead of overflowing.
fn lattice_axis(min: f64, max: f64, scale: f64) -> (f64, f64) {
    let first = (min / scale).floor();
    (first, (max / scale).floor() - first + 1.0)
}

fn lattice_size(bbox: &Rect<f64>, scale: f64) -> f64 {
    let (_, nx) = lattice_axis(bbox.min().x, bbox.max().x, scale);
    let (_, ny) = lattice_axis(bbox.min().y, bbox.max().y, scale);
    nx * ny
}

fn lattice_fits(size: f64, max_pixels: f64) -> bool {
    size.is_finite() && size <= max_pixels
}

/// The scale the areal mean will actually use.
///
/// With best effort the requested scale doubles until the lattice holds at
/// most `max_pixels` cells; without it an oversized lattice is an error.
pub fn effective_scale(bbox: &Rect<f64>, params: &ReductionConfig) -> Result<f64> {
    let mut scale = params.scale;
    let limit = params.max_pixels as f64;

    while !lattice_fits(lattice_size(bbox, scale), limit) {
        if !params.best_effort {
            return Err(SstError::ReductionError {
                message: format!(
                    "region needs {} samples at scale {}, more than max_pixels {}",
                    lattice_size(bbox, scale),
                    scale,
                    params.max_pixels
                ),
            });
        }
        scale *= 2.0;
    }
    Ok(scale)
}

/// Mean of the composite over lattice points inside the region. `None` when
/// no point carries a valid value.
///
/// A region smaller than one lattice cell may hold no lattice point at all;
/// it is then sampled once at an interior point. `scale` is expected to come
/// from [`effective_scale`].
pub fn areal_mean(composite: &MeanComposite<'_>, region: &Region, scale: f64) -> Option<f64> {
    let bbox = region.bbox();
    let (x0, nx) = lattice_axis(bbox.min().x, bbox.max().x, scale);
    let (y0, ny) = lattice_axis(bbox.min().y, bbox.max().y, scale);
    let mut inside = 0usize;
    let mut sum = 0.0;
    let mut count = 0usize;

    for iy in 0..ny as u64 {
        let y = (y0 + iy as f64 + 0.5) * scale;
        for ix in 0..nx as u64 {
            let x = (x0 + ix as f64 + 0.5) * scale;
            if !region.contains(x, y) {
                continue;
            }
            inside += 1;
            if let Some(v) = composite.sample(x, y) {
                sum += v;
                count += 1;
            }
        }
    }

    if inside == 0 {
        let point = region.interior_point()?;
        return composite.sample(point.x(), point.y());
    }
    (count > 0).then(|| sum / count as f64)
}

/// Reduce one calendar window to a scalar, or `None` for "no data".
pub fn reduce_window(
    collection: &[Scene],
    window: &CalendarWindow,
    band: &str,
    region: &Region,
    scale: f64,
) -> Option<f64> {
    let composite = MeanComposite::for_window(collection, window, band);
    if !composite.has_band(band) {
        return None;
    }
    areal_mean(&composite, region, scale)
}

/// Twelve monthly values of one year, January first.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    pub year: i32,
    pub months: [Option<f64>; 12],
}

/// Year-major, month-minor records labelled "<MonthName> <Year>".
pub fn flatten(series: &[YearSeries]) -> Vec<MonthlyRecord> {
    series
        .iter()
        .flat_map(|year| {
            year.months.iter().enumerate().map(move |(i, value)| {
                let label = CalendarWindow {
                    year: year.year,
                    month: i as u32 + 1,
                }
                .label();
                MonthlyRecord {
                    date: label,
                    mean_sst: *value,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Polygon};
    use std::collections::BTreeMap;

    fn rect(min: f64, max: f64) -> Rect<f64> {
        Rect::new(coord! { x: min, y: min }, coord! { x: max, y: max })
    }

    fn region(min: f64, max: f64) -> Region {
        let polygon: Polygon<f64> = rect(min, max).to_polygon();
        Region::new("test", vec![polygon]).unwrap()
    }

    fn grid(values: Vec<f64>) -> BandGrid {
        BandGrid {
            origin_x: 0.0,
            origin_y: 20.0,
            pixel_size: 10.0,
            width: 2,
            height: 2,
            nodata: Some(-999.0),
            values,
        }
    }

    fn scene_with_grid(id: &str, acquired: &str, band: &str, grid: BandGrid) -> Scene {
        Scene {
            id: id.to_string(),
            acquired: acquired.parse().unwrap(),
            footprint: None,
            bands: BTreeMap::from([(band.to_string(), grid)]),
        }
    }

    fn scene(id: &str, acquired: &str, band: &str, values: Vec<f64>) -> Scene {
        scene_with_grid(id, acquired, band, grid(values))
    }

    #[test]
    fn test_temporal_then_areal_mean() {
        let scenes = vec![
            scene("a", "2020-03-02T00:00:00Z", "sst", vec![20.0, 22.0, 24.0, 26.0]),
            scene("b", "2020-03-20T00:00:00Z", "sst", vec![22.0, 24.0, 26.0, -999.0]),
            scene("c", "2020-04-01T00:00:00Z", "sst", vec![99.0, 99.0, 99.0, 99.0]),
        ];
        let region = region(0.0, 20.0);
        let collection = prepare_collection(&scenes, "sst", &region);
        let march = CalendarWindow::new(2020, 3).unwrap();

        // pixel means: 21, 23, 25, 26 (nodata skipped in scene b)
        let value = reduce_window(&collection, &march, "sst", &region, 10.0).unwrap();
        assert!((value - 23.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_is_none() {
        let scenes = vec![scene("a", "2020-03-02T00:00:00Z", "sst", vec![1.0; 4])];
        let region = region(0.0, 20.0);
        let collection = prepare_collection(&scenes, "sst", &region);
        let may = CalendarWindow::new(2020, 5).unwrap();

        assert_eq!(reduce_window(&collection, &may, "sst", &region, 10.0), None);
    }

    #[test]
    fn test_missing_band_is_none() {
        let mut chlor = scene("a", "2020-03-02T00:00:00Z", "chlor_a", vec![1.0; 4]);
        chlor.footprint = Some(rect(0.0, 20.0));
        let region = region(0.0, 20.0);
        let collection = prepare_collection(&[chlor], "sst", &region);
        let march = CalendarWindow::new(2020, 3).unwrap();

        assert_eq!(collection.len(), 1);
        let composite = MeanComposite::for_window(&collection, &march, "sst");
        assert!(!composite.has_band("sst"));
        assert_eq!(reduce_window(&collection, &march, "sst", &region, 10.0), None);
    }

    #[test]
    fn test_fully_masked_window_is_none() {
        let scenes = vec![scene("a", "2020-03-02T00:00:00Z", "sst", vec![-999.0; 4])];
        let region = region(0.0, 20.0);
        let collection = prepare_collection(&scenes, "sst", &region);
        let march = CalendarWindow::new(2020, 3).unwrap();

        assert_eq!(reduce_window(&collection, &march, "sst", &region, 10.0), None);
    }

    #[test]
    fn test_scenes_outside_region_are_dropped() {
        let scenes = vec![scene("a", "2020-03-02T00:00:00Z", "sst", vec![1.0; 4])];
        let far = region(500.0, 600.0);
        assert!(prepare_collection(&scenes, "sst", &far).is_empty());
    }

    #[test]
    fn test_region_smaller_than_one_cell_still_gets_a_value() {
        let coarse = BandGrid {
            origin_x: 0.0,
            origin_y: 1000.0,
            pixel_size: 1000.0,
            width: 1,
            height: 1,
            nodata: None,
            values: vec![20.0],
        };
        let scenes = vec![scene_with_grid("a", "2020-03-02T00:00:00Z", "sst", coarse)];
        let small = region(100.0, 400.0);
        let collection = prepare_collection(&scenes, "sst", &small);
        let march = CalendarWindow::new(2020, 3).unwrap();

        assert_eq!(reduce_window(&collection, &march, "sst", &small, 100.0), Some(20.0));
        assert_eq!(reduce_window(&collection, &march, "sst", &small, 1000.0), Some(20.0));
    }

    #[test]
    fn test_best_effort_coarsens_scale() {
        let bbox = rect(0.0, 1000.0);
        let params = ReductionConfig {
            scale: 1.0,
            best_effort: true,
            max_pixels: 10_000,
        };
        let scale = effective_scale(&bbox, &params).unwrap();
        assert!(scale > 1.0);
        assert!(lattice_size(&bbox, scale) <= 10_000.0);
        assert!(lattice_size(&bbox, scale / 2.0) > 10_000.0);
    }

    #[test]
    fn test_tiny_scale_is_coarsened_without_overflow() {
        let params = ReductionConfig {
            scale: 1e-14,
            best_effort: true,
            max_pixels: 10_000,
        };
        let wide = rect(-1e6, 1e6);
        let scale = effective_scale(&wide, &params).unwrap();
        assert!(lattice_size(&wide, scale) <= 10_000.0);

        // both edges overflow to infinity at this scale
        let offset = Rect::new(coord! { x: 5e5, y: 5e5 }, coord! { x: 1e6, y: 1e6 });
        let tiny = ReductionConfig {
            scale: 1e-320,
            ..params
        };
        let scale = effective_scale(&offset, &tiny).unwrap();
        assert!(scale.is_finite());
        assert!(lattice_size(&offset, scale) <= 10_000.0);

        let strict = ReductionConfig {
            best_effort: false,
            ..params
        };
        assert!(matches!(
            effective_scale(&wide, &strict),
            Err(SstError::ReductionError { .. })
        ));
    }

    #[test]
    fn test_without_best_effort_oversized_lattice_fails() {
        let bbox = rect(0.0, 1000.0);
        let params = ReductionConfig {
            scale: 1.0,
            best_effort: false,
            max_pixels: 10_000,
        };
        assert!(matches!(
            effective_scale(&bbox, &params),
            Err(SstError::ReductionError { .. })
        ));

        let relaxed = ReductionConfig {
            scale: 100.0,
            ..params
        };
        assert_eq!(effective_scale(&bbox, &relaxed).unwrap(), 100.0);
    }

    #[test]
    fn test_flatten_preserves_order_and_nulls() {
        let mut months = [Some(1.0); 12];
        months[4] = None;
        let series = vec![
            YearSeries { year: 2019, months },
            YearSeries {
                year: 2020,
                months: [None; 12],
            },
        ];
        let records = flatten(&series);

        assert_eq!(records.len(), 24);
        assert_eq!(records[0].date, "January 2019");
        assert_eq!(records[4].mean_sst, None);
        assert_eq!(records[5].mean_sst, Some(1.0));
        assert_eq!(records[12].date, "January 2020");
        assert_eq!(records[23].date, "December 2020");
    }
}
