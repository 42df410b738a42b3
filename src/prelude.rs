// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The `prelude` helps to import most commonly used types.

pub use crate::geometry::point::Point;
pub use crate::geometry::polygon::Polygon;
pub use crate::geometry::rect::Rect;
pub use crate::geometry::transform::{Angle, ComplexTransform};
pub use crate::geometry::vector::Vector;
pub use crate::geometry::CoordinateType;
pub use crate::layout::cell::Cell;
pub use crate::layout::instance::{CellInstArray, RegularRepetition};
pub use crate::layout::layout::Layout;
pub use crate::layout::repository::{PolygonId, PolygonRef, ShapeRepository};
pub use crate::layout::shapes::Shapes;
pub use crate::layout::types::{CellId, LayerId, LayerInfo};
pub use crate::process::context::IntrusionContext;
pub use crate::process::errors::ProcessError;
pub use crate::process::local_op::{Interactions, LocalOperation};
pub use crate::process::LocalProcessor;
pub use crate::scan::{scan_overlapping_pairs, ScanReceiver2};
pub use crate::types::{Coord, SInt, UInt};
