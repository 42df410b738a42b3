// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Scan receivers registering the interactions between shapes and
//! instances.
//!
//! Four receiver kinds sit on top of the generic box scanner:
//! shape×shape and shape×instance feed the per-cell interaction map handed
//! to the local operation; instance×instance and instance×shape collect the
//! candidate intruders of child subtrees during context discovery.
//! Instances are addressed by their index into a caller-provided slice so
//! that in-cell children and foreign context instances can be scanned
//! uniformly.

use super::local_op::Interactions;
use crate::geometry::transform::ComplexTransform;
use crate::layout::instance::CellInstArray;
use crate::layout::layout::Layout;
use crate::layout::repository::PolygonRef;
use crate::layout::types::LayerId;
use crate::scan::ScanReceiver2;
use crate::types::Coord;

use std::collections::BTreeSet;

/// Candidate intruders of one child instance: indices of touching foreign
/// instances and the foreign shapes alongside it.
pub(crate) type InstanceInteractions = Vec<(BTreeSet<usize>, BTreeSet<PolygonRef>)>;

/// Records scope shape × intruder shape interactions.
pub(crate) struct ShapeShapeReceiver<'a> {
    pub result: &'a mut Interactions,
}

impl ScanReceiver2<PolygonRef, PolygonRef> for ShapeShapeReceiver<'_> {
    fn interact(&mut self, a: &PolygonRef, b: &PolygonRef) {
        self.result.entry(*a).or_default().push(*b);
    }
}

/// Records scope shape × instance interactions. The intruder-layer shapes
/// below the instance are looked up with a recursive, region-restricted
/// iteration; materialization into the evaluating cell's frame is deferred
/// to `pending` so that the shape repository is not written during the
/// scan.
pub(crate) struct ShapeInstReceiver<'a> {
    pub layout: &'a Layout,
    pub arrays: &'a [CellInstArray],
    pub intruder_layer: LayerId,
    /// (scope shape, found intruder, transform of the intruder into the
    /// evaluating cell's frame).
    pub pending: Vec<(PolygonRef, PolygonRef, ComplexTransform<Coord>)>,
}

impl ScanReceiver2<PolygonRef, usize> for ShapeInstReceiver<'_> {
    fn interact(&mut self, a: &PolygonRef, inst_index: &usize) {
        let layout = self.layout;
        let inst = &self.arrays[*inst_index];

        let abox = match a.try_bounding_box(&layout.repository) {
            Some(b) => b,
            None => return,
        };
        let inst_box = match layout.inst_array_bbox(inst, self.intruder_layer) {
            Some(b) => b,
            None => return,
        };
        let region = match abox.intersection(&inst_box) {
            Some(r) => r,
            None => return,
        };
        let child_bbox = match layout.cell_bbox(inst.cell(), self.intruder_layer) {
            Some(b) => b,
            None => return,
        };

        for et in inst.each_transform() {
            if !et.transform_rect(&child_bbox).touches(&region) {
                continue;
            }
            let child_region = et.inverted().transform_rect(&region);
            layout.for_each_shape_recursive(
                inst.cell(),
                self.intruder_layer,
                child_region,
                &mut |found, t| {
                    self.pending.push((*a, found, et.concat(&t)));
                },
            );
        }
    }
}

/// Records instance × instance interactions: candidate subtree intruders
/// for the child contexts.
pub(crate) struct InstInstReceiver<'a> {
    pub result: &'a mut InstanceInteractions,
}

impl ScanReceiver2<usize, usize> for InstInstReceiver<'_> {
    fn interact(&mut self, a: &usize, b: &usize) {
        self.result[*a].0.insert(*b);
    }
}

/// Records instance × shape interactions: foreign shapes living alongside a
/// child instance.
pub(crate) struct InstShapeReceiver<'a> {
    pub result: &'a mut InstanceInteractions,
}

impl ScanReceiver2<usize, PolygonRef> for InstShapeReceiver<'_> {
    fn interact(&mut self, a: &usize, b: &PolygonRef) {
        self.result[*a].1.insert(*b);
    }
}
