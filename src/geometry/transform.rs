// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Affine transforms on the integer grid.
//!
//! A [`ComplexTransform`] applies, in this order: mirroring at the x-axis,
//! rotation by a multiple of 90 degrees, integer magnification, and an
//! integer translation. Composition is exact and associative; rigid
//! transforms (unit magnification) invert exactly.

use super::point::Point;
use super::rect::Rect;
use super::vector::Vector;
use super::CoordinateType;

/// Rotation by a multiple of 90 degrees, counterclockwise.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Angle {
    /// No rotation.
    #[default]
    R0,
    /// Quarter turn.
    R90,
    /// Half turn.
    R180,
    /// Three-quarter turn.
    R270,
}

impl Angle {
    fn quarter_turns(self) -> u8 {
        match self {
            Angle::R0 => 0,
            Angle::R90 => 1,
            Angle::R180 => 2,
            Angle::R270 => 3,
        }
    }

    fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Angle::R0,
            1 => Angle::R90,
            2 => Angle::R180,
            _ => Angle::R270,
        }
    }

    /// Sum of the two rotations.
    pub fn compose(self, other: Angle) -> Angle {
        Angle::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// The opposite rotation.
    pub fn inverted(self) -> Angle {
        Angle::from_quarter_turns(4 - self.quarter_turns())
    }
}

/// An affine transform: mirror at the x-axis, then rotate by a quarter-turn
/// multiple, then magnify, then translate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComplexTransform<C> {
    mirror: bool,
    rotation: Angle,
    magnification: C,
    displacement: Vector<C>,
}

impl<C: CoordinateType> Default for ComplexTransform<C> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<C: CoordinateType> ComplexTransform<C> {
    /// The identity transform.
    pub fn identity() -> Self {
        ComplexTransform {
            mirror: false,
            rotation: Angle::R0,
            magnification: C::one(),
            displacement: Vector::zero(),
        }
    }

    /// A pure translation.
    pub fn translation(displacement: Vector<C>) -> Self {
        ComplexTransform {
            displacement,
            ..Self::identity()
        }
    }

    /// A rigid transform: mirror, rotation and translation, unit magnification.
    pub fn rigid(mirror: bool, rotation: Angle, displacement: Vector<C>) -> Self {
        ComplexTransform {
            mirror,
            rotation,
            magnification: C::one(),
            displacement,
        }
    }

    /// A general transform.
    pub fn new(mirror: bool, rotation: Angle, magnification: C, displacement: Vector<C>) -> Self {
        ComplexTransform {
            mirror,
            rotation,
            magnification,
            displacement,
        }
    }

    /// Is the x-axis mirrored before rotating?
    pub fn mirror(&self) -> bool {
        self.mirror
    }

    /// Rotation part.
    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    /// Magnification part.
    pub fn magnification(&self) -> C {
        self.magnification
    }

    /// Translation part.
    pub fn displacement(&self) -> Vector<C> {
        self.displacement
    }

    /// Check for the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Apply the linear part (mirror, rotation, magnification) to a vector.
    pub fn transform_vector(&self, v: Vector<C>) -> Vector<C> {
        let (x, y) = if self.mirror { (v.x, -v.y) } else { (v.x, v.y) };
        let (x, y) = match self.rotation {
            Angle::R0 => (x, y),
            Angle::R90 => (-y, x),
            Angle::R180 => (-x, -y),
            Angle::R270 => (y, -x),
        };
        Vector::new(x * self.magnification, y * self.magnification)
    }

    /// Apply the transform to a point.
    pub fn transform_point(&self, p: Point<C>) -> Point<C> {
        let v = self.transform_vector(p.to_vector());
        Point::new(v.x, v.y) + self.displacement
    }

    /// Apply the transform to a rectangle. Quarter-turn rotations keep
    /// rectangles axis-aligned, so the image is again a rectangle.
    pub fn transform_rect(&self, r: &Rect<C>) -> Rect<C> {
        Rect::new(
            self.transform_point(r.lower_left()),
            self.transform_point(r.upper_right()),
        )
    }

    /// Compose with another transform: `self.concat(&t)` applies `t` first,
    /// then `self`.
    pub fn concat(&self, other: &Self) -> Self {
        let rotation = if self.mirror {
            self.rotation.compose(other.rotation.inverted())
        } else {
            self.rotation.compose(other.rotation)
        };
        ComplexTransform {
            mirror: self.mirror ^ other.mirror,
            rotation,
            magnification: self.magnification * other.magnification,
            displacement: self.transform_vector(other.displacement) + self.displacement,
        }
    }

    /// The inverse transform. Exact for unit magnification; inverses of
    /// magnified transforms truncate and should be avoided.
    pub fn inverted(&self) -> Self {
        debug_assert!(
            self.magnification == C::one(),
            "inversion is exact for unit magnification only"
        );
        let rotation = if self.mirror {
            self.rotation
        } else {
            self.rotation.inverted()
        };
        let inverse = ComplexTransform {
            mirror: self.mirror,
            rotation,
            magnification: self.magnification,
            displacement: Vector::zero(),
        };
        let d = inverse.transform_vector(self.displacement);
        ComplexTransform {
            displacement: -d,
            ..inverse
        }
    }
}

#[test]
fn test_transform_point() {
    let t: ComplexTransform<i32> = ComplexTransform::rigid(false, Angle::R90, Vector::new(10, 0));
    assert_eq!(t.transform_point(Point::new(1, 2)), Point::new(8, 1));

    let m: ComplexTransform<i32> = ComplexTransform::rigid(true, Angle::R0, Vector::zero());
    assert_eq!(m.transform_point(Point::new(1, 2)), Point::new(1, -2));
}

#[test]
fn test_concat_matches_sequential_application() {
    let ts = [
        ComplexTransform::rigid(false, Angle::R90, Vector::new(3, -7)),
        ComplexTransform::rigid(true, Angle::R270, Vector::new(-2, 5)),
        ComplexTransform::rigid(true, Angle::R180, Vector::new(11, 1)),
    ];
    let p = Point::new(13, -4);
    for a in &ts {
        for b in &ts {
            assert_eq!(
                a.concat(b).transform_point(p),
                a.transform_point(b.transform_point(p))
            );
            for c in &ts {
                // Associativity.
                assert_eq!(a.concat(b).concat(c), a.concat(&b.concat(c)));
            }
        }
    }
}

#[test]
fn test_inverted_rigid_round_trip() {
    let ts = [
        ComplexTransform::rigid(false, Angle::R0, Vector::new(100, 0)),
        ComplexTransform::rigid(false, Angle::R90, Vector::new(3, -7)),
        ComplexTransform::rigid(true, Angle::R270, Vector::new(-2, 5)),
        ComplexTransform::rigid(true, Angle::R90, Vector::new(0, 9)),
    ];
    for t in &ts {
        assert!(t.inverted().concat(t).is_identity());
        assert!(t.concat(&t.inverted()).is_identity());
    }
}
