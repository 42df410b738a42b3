// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Interning storage for polygon bodies and the references that place them.
//!
//! A [`PolygonRef`] splits a placed polygon into its canonical body (anchored
//! at the origin and interned in the [`ShapeRepository`]) and a displacement.
//! Because equal bodies share one id, two references are equal exactly when
//! they describe the same placed polygon. References are small `Copy` values
//! and are used as set elements and map keys throughout the processor.

use crate::geometry::point::Point;
use crate::geometry::polygon::Polygon;
use crate::geometry::rect::Rect;
use crate::geometry::transform::ComplexTransform;
use crate::geometry::vector::Vector;
use crate::types::Coord;

use std::collections::HashMap;

/// Identifier of an interned polygon body.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PolygonId(u32);

/// Interning storage: equal polygon bodies share one id.
#[derive(Default, Debug)]
pub struct ShapeRepository {
    bodies: Vec<Polygon>,
    ids_by_body: HashMap<Polygon, PolygonId>,
}

impl ShapeRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Default::default()
    }

    /// Intern a polygon body. Returns the existing id when an equal body is
    /// already stored.
    pub fn intern(&mut self, body: Polygon) -> PolygonId {
        if let Some(&id) = self.ids_by_body.get(&body) {
            return id;
        }
        let id = PolygonId(self.bodies.len() as u32);
        self.bodies.push(body.clone());
        self.ids_by_body.insert(body, id);
        id
    }

    /// Look up an interned body.
    pub fn body(&self, id: PolygonId) -> &Polygon {
        &self.bodies[id.0 as usize]
    }

    /// Number of distinct bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check whether no body has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// A polygon body in a repository plus the displacement placing it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PolygonRef {
    body: PolygonId,
    displacement: Vector<Coord>,
}

impl PolygonRef {
    /// Split `polygon` into canonical body and displacement, interning the
    /// body. The anchor is the canonical first vertex, so equal placed
    /// polygons always decompose identically.
    pub fn new(polygon: Polygon, repository: &mut ShapeRepository) -> Self {
        let anchor = polygon
            .points()
            .first()
            .copied()
            .unwrap_or_else(Point::zero);
        let body = polygon.translated(-anchor.to_vector());
        PolygonRef {
            body: repository.intern(body),
            displacement: anchor.to_vector(),
        }
    }

    /// Id of the interned body.
    pub fn body_id(&self) -> PolygonId {
        self.body
    }

    /// Displacement of the body.
    pub fn displacement(&self) -> Vector<Coord> {
        self.displacement
    }

    /// Reconstruct the placed polygon.
    pub fn polygon(&self, repository: &ShapeRepository) -> Polygon {
        repository.body(self.body).translated(self.displacement)
    }

    /// Bounding box of the placed polygon, `None` for empty bodies.
    pub fn try_bounding_box(&self, repository: &ShapeRepository) -> Option<Rect<Coord>> {
        repository
            .body(self.body)
            .try_bounding_box()
            .map(|b| b.translated(self.displacement))
    }

    /// The reference to the transformed placed polygon, re-interned.
    pub fn transformed(
        &self,
        t: &ComplexTransform<Coord>,
        repository: &mut ShapeRepository,
    ) -> PolygonRef {
        let polygon = self.polygon(repository).transformed(t);
        PolygonRef::new(polygon, repository)
    }
}

#[test]
fn test_interning_shares_bodies() {
    let mut repo = ShapeRepository::new();
    let a = PolygonRef::new(Polygon::from(Rect::new((0, 0), (10, 10))), &mut repo);
    let b = PolygonRef::new(Polygon::from(Rect::new((100, 50), (110, 60))), &mut repo);
    // Same body, different placement.
    assert_eq!(repo.len(), 1);
    assert_eq!(a.body_id(), b.body_id());
    assert_ne!(a, b);
    assert_eq!(a.polygon(&repo), Polygon::from(Rect::new((0, 0), (10, 10))));
    assert_eq!(
        b.try_bounding_box(&repo),
        Some(Rect::new((100, 50), (110, 60)))
    );
}

#[test]
fn test_transformed_ref_equals_ref_of_transformed_polygon() {
    use crate::geometry::transform::Angle;

    let mut repo = ShapeRepository::new();
    let t = ComplexTransform::rigid(false, Angle::R90, Vector::new(7, -3));
    let poly = Polygon::from(Rect::new((0, 0), (10, 20)));
    let r = PolygonRef::new(poly.clone(), &mut repo);
    let transformed = r.transformed(&t, &mut repo);
    assert_eq!(
        transformed,
        PolygonRef::new(poly.transformed(&t), &mut repo)
    );
}
