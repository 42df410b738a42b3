// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Placements of child cells, optionally repeated as regular arrays.

use super::types::CellId;
use crate::geometry::rect::Rect;
use crate::geometry::transform::ComplexTransform;
use crate::geometry::vector::Vector;
use crate::types::Coord;

/// A regular two-dimensional repetition: `na × nb` elements spanned by the
/// basis vectors `a` and `b`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegularRepetition {
    a: Vector<Coord>,
    b: Vector<Coord>,
    na: u32,
    nb: u32,
}

impl RegularRepetition {
    /// Create a repetition. The counts include the base element, so both
    /// should be at least one.
    pub fn new(a: Vector<Coord>, b: Vector<Coord>, na: u32, nb: u32) -> Self {
        RegularRepetition { a, b, na, nb }
    }

    /// First basis vector.
    pub fn vector_a(&self) -> Vector<Coord> {
        self.a
    }

    /// Second basis vector.
    pub fn vector_b(&self) -> Vector<Coord> {
        self.b
    }

    /// Element count along `a`.
    pub fn na(&self) -> u32 {
        self.na
    }

    /// Element count along `b`.
    pub fn nb(&self) -> u32 {
        self.nb
    }
}

/// A placement of a child cell under a transform, optionally repeated as a
/// regular array. Structural equality, ordering and hashing make instance
/// arrays usable as elements of intrusion-context sets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellInstArray {
    cell: CellId,
    transform: ComplexTransform<Coord>,
    repetition: Option<RegularRepetition>,
}

impl CellInstArray {
    /// A single placement of `cell`.
    pub fn new(cell: CellId, transform: ComplexTransform<Coord>) -> Self {
        CellInstArray {
            cell,
            transform,
            repetition: None,
        }
    }

    /// A repeated placement of `cell`. The basis vectors of the repetition
    /// are given in the frame of the instantiating cell.
    pub fn with_repetition(
        cell: CellId,
        transform: ComplexTransform<Coord>,
        repetition: RegularRepetition,
    ) -> Self {
        CellInstArray {
            cell,
            transform,
            repetition: Some(repetition),
        }
    }

    /// The instantiated cell.
    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// The transform of the base element.
    pub fn base_transform(&self) -> &ComplexTransform<Coord> {
        &self.transform
    }

    /// The repetition, if any.
    pub fn repetition(&self) -> Option<&RegularRepetition> {
        self.repetition.as_ref()
    }

    /// Number of expanded elements.
    pub fn num_elements(&self) -> usize {
        match &self.repetition {
            Some(rep) => rep.na as usize * rep.nb as usize,
            None => 1,
        }
    }

    /// The bounding box of the images of `target_bbox` under all element
    /// transforms. Exact: the repetition lattice is linear, so the extremes
    /// are attained at its four corners.
    pub fn transformed_bbox(&self, target_bbox: &Rect<Coord>) -> Rect<Coord> {
        let base = self.transform.transform_rect(target_bbox);
        match &self.repetition {
            None => base,
            Some(rep) => {
                let da = rep.a * (rep.na.saturating_sub(1) as Coord);
                let db = rep.b * (rep.nb.saturating_sub(1) as Coord);
                base.add_rect(&base.translated(da))
                    .add_rect(&base.translated(db))
                    .add_rect(&base.translated(da + db))
            }
        }
    }

    /// Enumerate the transforms of all expanded elements, row-major along
    /// `a` then `b`. Deterministic and finite.
    pub fn each_transform(&self) -> impl Iterator<Item = ComplexTransform<Coord>> {
        let (a, b, na, nb) = match &self.repetition {
            Some(rep) => (rep.a, rep.b, rep.na, rep.nb),
            None => (Vector::zero(), Vector::zero(), 1, 1),
        };
        let base = self.transform;
        (0..na).flat_map(move |i| {
            (0..nb).map(move |j| {
                let d = a * (i as Coord) + b * (j as Coord);
                ComplexTransform::translation(d).concat(&base)
            })
        })
    }
}

#[test]
fn test_array_expansion() {
    use crate::geometry::point::Point;
    use itertools::Itertools;

    let cell = CellId(0);
    let single = CellInstArray::new(cell, ComplexTransform::translation(Vector::new(5, 5)));
    assert_eq!(single.num_elements(), 1);
    assert_eq!(single.each_transform().collect_vec().len(), 1);

    let arr = CellInstArray::with_repetition(
        cell,
        ComplexTransform::translation(Vector::new(10, 0)),
        RegularRepetition::new(Vector::new(100, 0), Vector::new(0, 200), 2, 2),
    );
    assert_eq!(arr.num_elements(), 4);
    let origins = arr
        .each_transform()
        .map(|t| t.transform_point(Point::new(0, 0)))
        .collect_vec();
    assert_eq!(
        origins,
        vec![
            Point::new(10, 0),
            Point::new(10, 200),
            Point::new(110, 0),
            Point::new(110, 200),
        ]
    );
}
