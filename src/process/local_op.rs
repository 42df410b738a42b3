// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The abstract local operation evaluated by the processor.

use super::errors::ProcessError;
use crate::layout::layout::Layout;
use crate::layout::repository::PolygonRef;

use std::collections::{BTreeMap, BTreeSet};

/// Interaction map handed to a local operation: each scope shape mapped to
/// the intruder shapes whose bounding boxes touch it, all expressed in the
/// frame of the evaluated cell. Scope shapes without intruders map to an
/// empty list.
pub type Interactions = BTreeMap<PolygonRef, Vec<PolygonRef>>;

/// A local geometric operation.
///
/// The processor calls `compute_local` once per cell and intrusion context.
/// New output polygons are interned into the layout's shape repository and
/// inserted into `result`.
pub trait LocalOperation {
    /// Compute the output polygons for one interaction map, merging them
    /// into `result`.
    ///
    /// Implementations must be deterministic: identical interaction maps
    /// (comparing each intruder list as a set) must produce identical
    /// output sets. The result may be empty.
    fn compute_local(
        &self,
        layout: &mut Layout,
        interactions: &Interactions,
        result: &mut BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError>;
}
