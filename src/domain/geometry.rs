//! Planar geometry for the reduction region.
//!
//! Coordinates are in the archive's native planar units, the same units the
//! band grids and the reduction scale use. No reprojection happens here.

use geo::{BoundingRect, Contains, InteriorPoint, MultiPolygon, Point, Polygon, Rect};

/// Smallest rectangle covering every input rectangle.
pub fn bounding_union(rects: impl IntoIterator<Item = Rect<f64>>) -> Option<Rect<f64>> {
    MultiPolygon::new(rects.into_iter().map(|rect| rect.to_polygon()).collect()).bounding_rect()
}

/// The reduction region: every polygon of the boundary source, unioned.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    area: MultiPolygon<f64>,
    bbox: Rect<f64>,
}

impl Region {
    /// Returns `None` for an empty polygon list.
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon<f64>>) -> Option<Self> {
        let area = MultiPolygon::new(polygons);
        let bbox = area.bounding_rect()?;
        Some(Self {
            name: name.into(),
            area,
            bbox,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polygon_count(&self) -> usize {
        self.area.0.len()
    }

    pub fn bbox(&self) -> &Rect<f64> {
        &self.bbox
    }

    /// Interior containment; holes are excluded, boundary points are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.area.contains(&Point::new(x, y))
    }

    /// A point guaranteed to lie inside the region.
    pub fn interior_point(&self) -> Option<Point<f64>> {
        self.area.interior_point()
    }
}
