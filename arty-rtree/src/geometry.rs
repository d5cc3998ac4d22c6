//! Coordinate systems for the R-Tree.
//!
//! A [`Geometry`] owns every piece of box arithmetic the tree performs, so
//! the tree engine never looks at raw coordinates. Two systems are provided:
//!
//! - [`Cartesian`]: planar coordinates, no normalization.
//! - [`LatLon`]: `(longitude, latitude)` pairs, re-centred on the first point
//!   ever seen so that boxes spanning the antimeridian stay small.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::bounding_box::BoundingBox;

/// A 2D point in the native units of a [`Geometry`].
///
/// For [`LatLon`] the `x` axis is longitude and the `y` axis is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Box arithmetic and point normalization for one coordinate system.
///
/// An instance is chosen when a tree is built and used for the tree's whole
/// lifetime. Only [`normalize`](Geometry::normalize) and
/// [`denormalize`](Geometry::denormalize) are required; the box operations
/// default to plain axis-aligned arithmetic on the normalized plane.
pub trait Geometry {
    /// Maps a native point into the tree's internal plane.
    fn normalize(&self, point: Point) -> Point;

    /// Inverse of [`normalize`](Geometry::normalize).
    fn denormalize(&self, point: Point) -> Point;

    /// Tight box around a set of (already normalized) points.
    ///
    /// Returns `None` for an empty slice.
    fn box_of_points(&self, points: &[Point]) -> Option<BoundingBox> {
        let (first, rest) = points.split_first()?;
        let mut bbox = BoundingBox::of_point(*first);
        for point in rest {
            bbox = bbox.union(&BoundingBox::of_point(*point));
        }
        Some(bbox)
    }

    /// Tight box around a set of boxes. Returns `None` when there are none.
    fn box_of_boxes<'a, I>(&self, boxes: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BoundingBox>, bbox| match acc {
                None => Some(bbox.clone()),
                Some(acc) => Some(acc.union(bbox)),
            })
    }

    /// Tight box around two boxes.
    fn union(&self, a: &BoundingBox, b: &BoundingBox) -> BoundingBox {
        a.union(b)
    }

    /// Closed-interval overlap on every axis.
    fn intersects(&self, a: &BoundingBox, b: &BoundingBox) -> bool {
        a.intersects(b)
    }

    /// `inner` lies within (or equals) `outer` on every axis.
    fn contains(&self, outer: &BoundingBox, inner: &BoundingBox) -> bool {
        outer.contains(inner)
    }

    /// Overlapping region of two boxes, if any.
    fn intersection(&self, a: &BoundingBox, b: &BoundingBox) -> Option<BoundingBox> {
        a.intersection(b)
    }

    /// Product of the per-axis extents. Degenerate boxes have zero area.
    fn area(&self, bbox: &BoundingBox) -> f64 {
        bbox.area()
    }

    /// Denormalized corners of an internal box.
    fn to_corners(&self, bbox: &BoundingBox) -> (Point, Point) {
        let (lo, hi) = bbox.corners();
        (self.denormalize(lo), self.denormalize(hi))
    }
}

/// Planar coordinates; normalization is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cartesian;

impl Geometry for Cartesian {
    fn normalize(&self, point: Point) -> Point {
        point
    }

    fn denormalize(&self, point: Point) -> Point {
        point
    }
}

/// Longitude / latitude in degrees.
///
/// Longitudes are re-expressed relative to the first longitude this instance
/// ever normalizes and reduced into `(-180, 180]`, giving a Cartesian patch
/// centred on that first point. Two points either side of the antimeridian
/// therefore end up close together instead of 360 degrees apart. The anchor
/// is set lazily, exactly once.
#[derive(Debug, Clone, Default)]
pub struct LatLon {
    zero_lon: OnceCell<f64>,
}

impl LatLon {
    pub fn new() -> Self {
        Self::default()
    }

    /// The anchor longitude, once a point has been normalized.
    pub fn anchor(&self) -> Option<f64> {
        self.zero_lon.get().copied()
    }
}

/// Reduce an angle to `(-180, 180]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut angle = angle % 360.0;
    if angle <= -180.0 {
        angle += 360.0;
    } else if angle > 180.0 {
        angle -= 360.0;
    }
    angle
}

impl Geometry for LatLon {
    fn normalize(&self, point: Point) -> Point {
        let zero = *self.zero_lon.get_or_init(|| {
            log::debug!("Anchoring longitude normalization at {}", point.x);
            point.x
        });
        Point::new(normalize_angle(point.x - zero), point.y)
    }

    fn denormalize(&self, point: Point) -> Point {
        let zero = self.anchor().unwrap_or(0.0);
        Point::new(normalize_angle(point.x + zero), point.y)
    }
}
