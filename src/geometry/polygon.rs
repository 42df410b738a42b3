// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Simple polygons in canonical form.
//!
//! A polygon is stored counterclockwise with the lexicographically smallest
//! vertex first. Two polygons describing the same point set with the same
//! vertices therefore compare equal regardless of how the caller ordered
//! the vertex list, which makes polygons directly usable as interning keys.

use super::point::Point;
use super::rect::Rect;
use super::transform::ComplexTransform;
use super::vector::Vector;
use crate::types::Coord;

/// A simple polygon: one closed hull, no holes.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    points: Vec<Point<Coord>>,
}

/// Twice the signed area of the hull, positive for counterclockwise
/// orientation. Accumulated in 64 bit to avoid overflow.
fn signed_double_area(points: &[Point<Coord>]) -> i64 {
    let n = points.len();
    let mut acc = 0i64;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    acc
}

impl Polygon {
    /// Create a polygon from a vertex list, normalizing it to canonical form.
    /// Vertex lists with fewer than three points yield the empty polygon.
    pub fn new(points: Vec<Point<Coord>>) -> Self {
        if points.len() < 3 {
            return Polygon { points: Vec::new() };
        }
        let mut points = points;
        if signed_double_area(&points) < 0 {
            points.reverse();
        }
        let min_index = points
            .iter()
            .enumerate()
            .min_by_key(|&(_, p)| *p)
            .map(|(i, _)| i)
            .unwrap_or(0);
        points.rotate_left(min_index);
        Polygon { points }
    }

    /// Check whether this is the empty polygon.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The vertices in canonical order.
    pub fn points(&self) -> &[Point<Coord>] {
        &self.points
    }

    /// The bounding box, or `None` for the empty polygon.
    pub fn try_bounding_box(&self) -> Option<Rect<Coord>> {
        let first = self.points.first()?;
        let init = Rect::new(*first, *first);
        Some(
            self.points[1..]
                .iter()
                .fold(init, |acc, p| acc.add_point(*p)),
        )
    }

    /// Shift all vertices by `v`. Translation preserves the canonical form.
    pub fn translated(&self, v: Vector<Coord>) -> Polygon {
        Polygon {
            points: self.points.iter().map(|&p| p + v).collect(),
        }
    }

    /// Apply a transform to all vertices. Mirroring flips the orientation,
    /// so the result is re-normalized.
    pub fn transformed(&self, t: &ComplexTransform<Coord>) -> Polygon {
        Polygon::new(self.points.iter().map(|&p| t.transform_point(p)).collect())
    }
}

impl From<Rect<Coord>> for Polygon {
    fn from(r: Rect<Coord>) -> Self {
        let ll = r.lower_left();
        let ur = r.upper_right();
        Polygon::new(vec![
            ll,
            Point::new(ur.x, ll.y),
            ur,
            Point::new(ll.x, ur.y),
        ])
    }
}

#[test]
fn test_polygon_canonical_form() {
    // The same square entered clockwise, rotated, counterclockwise.
    let a = Polygon::new(vec![
        Point::new(0, 0),
        Point::new(0, 10),
        Point::new(10, 10),
        Point::new(10, 0),
    ]);
    let b = Polygon::new(vec![
        Point::new(10, 10),
        Point::new(0, 10),
        Point::new(0, 0),
        Point::new(10, 0),
    ]);
    let c = Polygon::from(Rect::new((0, 0), (10, 10)));
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(a.points()[0], Point::new(0, 0));
    assert!(signed_double_area(a.points()) > 0);
}

#[test]
fn test_polygon_transformed() {
    let p = Polygon::from(Rect::new((0, 0), (10, 20)));
    let t = ComplexTransform::rigid(
        false,
        crate::geometry::transform::Angle::R90,
        Vector::new(100, 0),
    );
    let q = p.transformed(&t);
    assert_eq!(q, Polygon::from(Rect::new((80, 0), (100, 10))));
    assert_eq!(q.try_bounding_box(), Some(Rect::new((80, 0), (100, 10))));

    // A mirrored transform flips orientation; normalization restores it.
    let m = ComplexTransform::rigid(true, crate::geometry::transform::Angle::R0, Vector::zero());
    let r = p.transformed(&m);
    assert_eq!(r, Polygon::from(Rect::new((0, -20), (10, 0))));
}

#[test]
fn test_degenerate_polygon_is_empty() {
    assert!(Polygon::new(vec![Point::new(0, 0), Point::new(1, 1)]).is_empty());
    assert_eq!(Polygon::new(vec![]).try_bounding_box(), None);
}
