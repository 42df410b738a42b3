// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-layer shape containers.

use super::repository::PolygonRef;
use std::collections::BTreeSet;

/// The shapes of one layer of one cell: an ordered set of polygon
/// references. Ordered storage gives deterministic iteration.
#[derive(Default, Debug, Clone)]
pub struct Shapes {
    refs: BTreeSet<PolygonRef>,
}

impl Shapes {
    /// Create an empty shape container.
    pub fn new() -> Self {
        Default::default()
    }

    /// Insert a polygon reference. Returns `false` if it was already present.
    pub fn insert(&mut self, r: PolygonRef) -> bool {
        self.refs.insert(r)
    }

    /// Insert many polygon references.
    pub fn extend(&mut self, refs: impl IntoIterator<Item = PolygonRef>) {
        self.refs.extend(refs)
    }

    /// Iterate over the shapes in ascending order.
    pub fn each_shape(&self) -> impl Iterator<Item = PolygonRef> + '_ {
        self.refs.iter().copied()
    }

    /// Check for membership.
    pub fn contains(&self, r: &PolygonRef) -> bool {
        self.refs.contains(r)
    }

    /// Number of shapes.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Check whether the container holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
