// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Integer geometry primitives: points, vectors, rectangles, quarter-turn
//! transforms and canonical polygons.

use num_traits::{PrimInt, Signed};

pub mod point;
pub mod polygon;
pub mod rect;
pub mod transform;
pub mod vector;

/// Trait bound for coordinate types of the elementary geometry.
///
/// Implemented for all signed primitive integers.
pub trait CoordinateType: PrimInt + Signed + std::fmt::Debug {}

impl<T: PrimInt + Signed + std::fmt::Debug> CoordinateType for T {}
