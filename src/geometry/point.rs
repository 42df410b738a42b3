// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A location in the two-dimensional integer plane.

use super::vector::Vector;
use super::CoordinateType;

use std::ops::{Add, Sub};

/// A point in the plane. Ordering is lexicographic, `x` before `y`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point<C> {
    /// Horizontal coordinate.
    pub x: C,
    /// Vertical coordinate.
    pub y: C,
}

impl<C: CoordinateType> Point<C> {
    /// Create a new point.
    pub fn new(x: C, y: C) -> Self {
        Point { x, y }
    }

    /// The origin.
    pub fn zero() -> Self {
        Point::new(C::zero(), C::zero())
    }

    /// Interpret this point as a vector from the origin.
    pub fn to_vector(self) -> Vector<C> {
        Vector::new(self.x, self.y)
    }
}

impl<C: CoordinateType> From<(C, C)> for Point<C> {
    fn from((x, y): (C, C)) -> Self {
        Point::new(x, y)
    }
}

impl<C> From<Point<C>> for [C; 2] {
    fn from(p: Point<C>) -> Self {
        [p.x, p.y]
    }
}

impl<C: CoordinateType> Add<Vector<C>> for Point<C> {
    type Output = Point<C>;

    fn add(self, rhs: Vector<C>) -> Point<C> {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<C: CoordinateType> Sub<Vector<C>> for Point<C> {
    type Output = Point<C>;

    fn sub(self, rhs: Vector<C>) -> Point<C> {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<C: CoordinateType> Sub<Point<C>> for Point<C> {
    type Output = Vector<C>;

    fn sub(self, rhs: Point<C>) -> Vector<C> {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}
