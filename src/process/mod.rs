// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The hierarchical local processor.
//!
//! A run has two passes. The top-down *context discovery* walks the
//! hierarchy from the top cell and assigns every reachable cell its set of
//! distinct [`IntrusionContext`]s: the foreign shapes and instances that
//! reach the cell from outside, expressed in the cell's own frame. A cell
//! instantiated many times under equivalent surroundings receives a single
//! context, so its subtree is evaluated once. The bottom-up *evaluation*
//! then computes the local operation per cell and context, commits results
//! common to all contexts to the cell's output layer and propagates
//! context-specific residues into the instantiating parents.

pub mod context;
pub mod errors;
mod interactions;
pub mod local_op;

use log::debug;
use std::collections::BTreeSet;

use crate::geometry::rect::Rect;
use crate::geometry::transform::ComplexTransform;
use crate::geometry::vector::Vector;
use crate::layout::instance::CellInstArray;
use crate::layout::layout::Layout;
use crate::layout::repository::PolygonRef;
use crate::layout::types::{CellId, LayerId};
use crate::scan::scan_overlapping_pairs;
use crate::types::{Coord, IntHashMap};

use self::context::{CellContextTable, ContextSlot, IntrusionContext};
use self::errors::ProcessError;
use self::interactions::{
    InstInstReceiver, InstShapeReceiver, InstanceInteractions, ShapeInstReceiver,
    ShapeShapeReceiver,
};
use self::local_op::{Interactions, LocalOperation};

/// Evaluates a [`LocalOperation`] over the hierarchy below a top cell.
///
/// The processor reads the scope and intruder layers, writes the output
/// layer and interns new polygons into the layout's shape repository. It is
/// constructed for a single [`LocalProcessor::run`] call.
pub struct LocalProcessor<'a> {
    pub(crate) layout: &'a mut Layout,
    top: CellId,
    op: &'a dyn LocalOperation,
    scope_layer: LayerId,
    intruder_layer: LayerId,
    output_layer: LayerId,
    pub(crate) contexts_per_cell: IntHashMap<CellId, CellContextTable>,
}

impl<'a> LocalProcessor<'a> {
    /// Create a processor for one run of `op` below `top`.
    pub fn new(
        layout: &'a mut Layout,
        top: CellId,
        op: &'a dyn LocalOperation,
        scope_layer: LayerId,
        intruder_layer: LayerId,
        output_layer: LayerId,
    ) -> Self {
        LocalProcessor {
            layout,
            top,
            op,
            scope_layer,
            intruder_layer,
            output_layer,
            contexts_per_cell: Default::default(),
        }
    }

    /// Run the processor. On success, the output layer of each cell holds
    /// that cell's portion of the result.
    ///
    /// The layout's changes-in-progress marker is set for the duration of
    /// the run and released on every exit path. On failure the output layer
    /// may hold partial results and should be discarded.
    pub fn run(&mut self) -> Result<(), ProcessError> {
        self.layout.update();
        self.layout.start_changes();
        let result = self.run_inner();
        self.layout.end_changes();
        result
    }

    fn run_inner(&mut self) -> Result<(), ProcessError> {
        debug!("computing intrusion contexts below cell {}", self.top);
        self.compute_contexts(
            None,
            self.top,
            ComplexTransform::identity(),
            IntrusionContext::default(),
        )?;
        debug!(
            "evaluating {} cell(s) bottom-up",
            self.contexts_per_cell.len()
        );
        self.compute_results()
    }

    /// Top-down context discovery for `cell_id`, reached under `trans` with
    /// the given intruders. When the context is already known the subtree
    /// is memoized: only a new drop is recorded.
    fn compute_contexts(
        &mut self,
        parent: Option<ContextSlot>,
        cell_id: CellId,
        trans: ComplexTransform<Coord>,
        intruders: IntrusionContext,
    ) -> Result<(), ProcessError> {
        let table = self.contexts_per_cell.entry(cell_id).or_default();
        if let Some(index) = table.find(&intruders) {
            // The index was just found; the slot must exist.
            let ctx = table.context_mut(index).expect("context slot must exist");
            ctx.add_drop(parent, trans);
            return Ok(());
        }

        let index = table.create(intruders.clone());
        let ctx = table.context_mut(index).expect("context slot must exist");
        ctx.add_drop(parent, trans);
        let slot = ContextSlot {
            cell: cell_id,
            index,
        };

        for (child, tn, below) in self.collect_child_contexts(cell_id, &intruders)? {
            self.compute_contexts(Some(slot), child, tn, below)?;
        }
        Ok(())
    }

    /// Determine the intrusion context of every child array element of
    /// `cell_id` evaluated under `intruders`.
    fn collect_child_contexts(
        &mut self,
        cell_id: CellId,
        intruders: &IntrusionContext,
    ) -> Result<Vec<(CellId, ComplexTransform<Coord>, IntrusionContext)>, ProcessError> {
        let scope_layer = self.scope_layer;
        let intruder_layer = self.intruder_layer;

        // Register which foreign instances and shapes touch each child
        // instance. Children are boxed by their scope extent (that is where
        // results can be computed below them), intruder candidates by their
        // intruder extent.
        let (num_own, arrays, inst_interactions) = {
            let layout: &Layout = self.layout;
            let cell = layout
                .cells
                .get(&cell_id)
                .ok_or(ProcessError::CellNotFound(cell_id))?;
            if cell.is_leaf() {
                return Ok(Vec::new());
            }
            let num_own = cell.num_insts();
            let arrays = cell
                .each_inst()
                .copied()
                .chain(intruders.instances.iter().copied())
                .collect::<Vec<CellInstArray>>();

            let mut interactions: InstanceInteractions = vec![Default::default(); num_own];

            let set1: Vec<(usize, Rect<Coord>)> = (0..num_own)
                .filter_map(|i| {
                    layout
                        .inst_array_bbox(&arrays[i], scope_layer)
                        .map(|b| (i, b))
                })
                .collect();

            let set2: Vec<(usize, Rect<Coord>)> = (0..arrays.len())
                .filter_map(|j| {
                    layout
                        .inst_array_bbox(&arrays[j], intruder_layer)
                        .map(|b| (j, b))
                })
                .collect();
            {
                let mut receiver = InstInstReceiver {
                    result: &mut interactions,
                };
                scan_overlapping_pairs(&set1, &set2, &mut receiver);
            }

            let shape_set: Vec<(PolygonRef, Rect<Coord>)> = cell
                .shapes(intruder_layer)
                .into_iter()
                .flat_map(|s| s.each_shape())
                .chain(intruders.shapes.iter().copied())
                .filter_map(|r| r.try_bounding_box(&layout.repository).map(|b| (r, b)))
                .collect();
            {
                let mut receiver = InstShapeReceiver {
                    result: &mut interactions,
                };
                scan_overlapping_pairs(&set1, &shape_set, &mut receiver);
            }
            (num_own, arrays, interactions)
        };

        // Assemble the context of each array element.
        let mut children = Vec::new();
        for i in 0..num_own {
            let arr = arrays[i];
            let child_id = arr.cell();
            // Nothing to compute below a subtree without scope content.
            let child_scope_bbox = match self.layout.cell_bbox(child_id, scope_layer) {
                Some(b) => b,
                None => continue,
            };
            let (touching_insts, touching_shapes) = &inst_interactions[i];

            for (n, tn) in arr.each_transform().enumerate() {
                let tni = tn.inverted();
                let nbox = tn.transform_rect(&child_scope_bbox);

                let mut below = IntrusionContext::default();
                {
                    let repository = &mut self.layout.repository;
                    for r in touching_shapes {
                        below.shapes.insert(r.transformed(&tni, repository));
                    }
                }

                // Foreign elements touching the child's scope extent,
                // excluding boundary-only contact. A placement is not its
                // own intruder; other elements of the same array are.
                if let Some(shrunk) = nbox.enlarged(Vector::new(-1, -1)) {
                    for &j in touching_insts {
                        let foreign = &arrays[j];
                        let foreign_bbox =
                            match self.layout.cell_bbox(foreign.cell(), intruder_layer) {
                                Some(b) => b,
                                None => continue,
                            };
                        for (k, tf) in foreign.each_transform().enumerate() {
                            if j == i && k == n {
                                continue;
                            }
                            if tf.transform_rect(&foreign_bbox).touches(&shrunk) {
                                below
                                    .instances
                                    .insert(CellInstArray::new(foreign.cell(), tni.concat(&tf)));
                            }
                        }
                    }
                }

                children.push((child_id, tn, below));
            }
        }
        Ok(children)
    }

    /// Bottom-up evaluation: reconcile every cell that received contexts,
    /// children strictly before parents, freeing each table afterwards.
    fn compute_results(&mut self) -> Result<(), ProcessError> {
        for cell_id in self.layout.each_cell_bottom_up() {
            if let Some(table) = self.contexts_per_cell.remove(&cell_id) {
                table.compute_results(cell_id, self)?;
            }
        }
        Ok(())
    }

    /// Evaluate the local operation for one cell under one intrusion
    /// context, merging the output into `result`.
    pub(crate) fn compute_local_cell(
        &mut self,
        cell_id: CellId,
        intruders: &IntrusionContext,
        result: &mut BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError> {
        let mut interactions = Interactions::new();
        let mut pending = Vec::new();

        {
            let layout: &Layout = self.layout;
            let cell = layout
                .cells
                .get(&cell_id)
                .ok_or(ProcessError::CellNotFound(cell_id))?;

            let scope: Vec<PolygonRef> = cell
                .shapes(self.scope_layer)
                .map(|s| s.each_shape().collect())
                .unwrap_or_default();
            for r in &scope {
                interactions.insert(*r, Vec::new());
            }

            if !scope.is_empty() {
                let set1: Vec<(PolygonRef, Rect<Coord>)> = scope
                    .iter()
                    .filter_map(|r| r.try_bounding_box(&layout.repository).map(|b| (*r, b)))
                    .collect();

                // Scope shapes against in-cell intruder shapes and foreign
                // context shapes.
                let shape_set: Vec<(PolygonRef, Rect<Coord>)> = cell
                    .shapes(self.intruder_layer)
                    .into_iter()
                    .flat_map(|s| s.each_shape())
                    .chain(intruders.shapes.iter().copied())
                    .filter_map(|r| r.try_bounding_box(&layout.repository).map(|b| (r, b)))
                    .collect();
                if !shape_set.is_empty() {
                    let mut receiver = ShapeShapeReceiver {
                        result: &mut interactions,
                    };
                    scan_overlapping_pairs(&set1, &shape_set, &mut receiver);
                }

                // Scope shapes against in-cell instances and foreign
                // context instances, boxed by their intruder extent.
                let arrays: Vec<CellInstArray> = cell
                    .each_inst()
                    .copied()
                    .chain(intruders.instances.iter().copied())
                    .collect();
                if !arrays.is_empty() {
                    let set2: Vec<(usize, Rect<Coord>)> = (0..arrays.len())
                        .filter_map(|j| {
                            layout
                                .inst_array_bbox(&arrays[j], self.intruder_layer)
                                .map(|b| (j, b))
                        })
                        .collect();
                    let mut receiver = ShapeInstReceiver {
                        layout,
                        arrays: &arrays,
                        intruder_layer: self.intruder_layer,
                        pending: Vec::new(),
                    };
                    scan_overlapping_pairs(&set1, &set2, &mut receiver);
                    pending = receiver.pending;
                }
            }
        }

        // Materialize the flattened intruders in the evaluating cell's
        // frame. Deferred to here: the scans only read the repository.
        {
            let repository = &mut self.layout.repository;
            for (scope_ref, found, t) in pending {
                let r = found.transformed(&t, repository);
                interactions.entry(scope_ref).or_default().push(r);
            }
        }

        let op = self.op;
        op.compute_local(self.layout, &interactions, result)
    }

    /// Commit the common results of a cell to its output layer.
    pub(crate) fn push_results(
        &mut self,
        cell_id: CellId,
        result: &BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError> {
        if result.is_empty() {
            return Ok(());
        }
        let cell = self
            .layout
            .cells
            .get_mut(&cell_id)
            .ok_or(ProcessError::CellNotFound(cell_id))?;
        cell.shapes_get_or_create(self.output_layer)
            .extend(result.iter().copied());
        Ok(())
    }
}
