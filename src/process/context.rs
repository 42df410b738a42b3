// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Intrusion contexts and the per-cell context tables.
//!
//! A cell is evaluated once per distinct [`IntrusionContext`]. Every
//! instantiation of the cell under that context is recorded as a
//! [`ContextDrop`]; the reconciliation in
//! [`CellContextTable::compute_results`] decides which results are common
//! to all contexts (and committed to the cell) and which are
//! context-specific (and routed through the drops into the parents).

use super::errors::ProcessError;
use super::LocalProcessor;
use crate::geometry::transform::ComplexTransform;
use crate::layout::instance::CellInstArray;
use crate::layout::repository::PolygonRef;
use crate::layout::types::CellId;
use crate::types::Coord;

use indexmap::IndexMap;
use log::trace;
use std::collections::BTreeSet;

/// The foreign intruders reaching a cell from outside, expressed in the
/// cell's own coordinate frame. Compared and hashed by content; the sets
/// are ordered, so equal contexts hash equally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntrusionContext {
    /// Foreign instances whose intruder-layer content reaches the cell.
    pub instances: BTreeSet<CellInstArray>,
    /// Foreign intruder shapes reaching the cell.
    pub shapes: BTreeSet<PolygonRef>,
}

impl IntrusionContext {
    /// Check whether no foreign intruders are present.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.shapes.is_empty()
    }
}

/// Addresses one context inside the processor's per-cell tables: the owning
/// cell plus the insertion index in that cell's table. Indices are stable
/// because tables only grow during context discovery.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ContextSlot {
    /// The cell owning the context table.
    pub cell: CellId,
    /// Insertion index within the table.
    pub index: usize,
}

/// Records that the owning cell is instantiated from a parent context under
/// a transform.
#[derive(Debug, Clone)]
pub struct ContextDrop {
    /// Slot of the parent context. `None` only for the root drop.
    pub parent: Option<ContextSlot>,
    /// Transform from the owning cell's frame into the parent frame.
    pub trans: ComplexTransform<Coord>,
}

/// Bookkeeping for one intrusion context of one cell: the drops that reach
/// it and the context-specific results propagated up from below.
#[derive(Debug, Default)]
pub struct CellContext {
    drops: Vec<ContextDrop>,
    propagated: BTreeSet<PolygonRef>,
}

impl CellContext {
    /// Record one more instantiation of this context.
    pub fn add_drop(&mut self, parent: Option<ContextSlot>, trans: ComplexTransform<Coord>) {
        self.drops.push(ContextDrop { parent, trans });
    }

    /// Results attributed to this context by child cells.
    pub fn propagated(&self) -> &BTreeSet<PolygonRef> {
        &self.propagated
    }

    /// Transform every reference in `res` into the parent frame of each
    /// drop and insert it into the parent context's propagated set. Shapes
    /// are copied, not moved: a context may be referenced by many drops.
    pub(crate) fn propagate(
        &self,
        proc: &mut LocalProcessor,
        from_cell: CellId,
        res: &BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError> {
        if res.is_empty() {
            return Ok(());
        }
        for drop in &self.drops {
            let parent = match drop.parent {
                Some(parent) => parent,
                None => return Err(ProcessError::OrphanPropagation(from_cell)),
            };
            let repository = &mut proc.layout.repository;
            let parent_ctx = proc
                .contexts_per_cell
                .get_mut(&parent.cell)
                .and_then(|table| table.context_mut(parent.index))
                .ok_or(ProcessError::ContextNotFound(parent.cell))?;
            for r in res {
                parent_ctx
                    .propagated
                    .insert(r.transformed(&drop.trans, repository));
            }
        }
        Ok(())
    }
}

/// The insertion-ordered context table of one cell.
#[derive(Debug, Default)]
pub struct CellContextTable {
    contexts: IndexMap<IntrusionContext, CellContext>,
}

impl CellContextTable {
    /// Find the insertion index of a context.
    pub fn find(&self, key: &IntrusionContext) -> Option<usize> {
        self.contexts.get_index_of(key)
    }

    /// Append a new context and return its insertion index.
    pub fn create(&mut self, key: IntrusionContext) -> usize {
        let (index, _) = self.contexts.insert_full(key, CellContext::default());
        index
    }

    /// Mutable access to a context by insertion index.
    pub fn context_mut(&mut self, index: usize) -> Option<&mut CellContext> {
        self.contexts.get_index_mut(index).map(|(_, ctx)| ctx)
    }

    /// Reconcile all contexts of `cell` and commit the results.
    ///
    /// Walks the contexts in insertion order, maintaining `common`, the set
    /// of output references produced identically by every context seen so
    /// far. Results missing from a later context are re-attributed to the
    /// earlier contexts' drops; extra results are attributed to their own
    /// context's drops. The final `common` is committed to the cell's
    /// output layer.
    ///
    /// `common` is seeded from an intruder-free baseline evaluation when no
    /// intruder-free context exists: results that only appear under foreign
    /// intruders are context-specific and belong to the instantiating
    /// parents, even when the cell happens to be instantiated only once.
    /// The baseline has no drops, so nothing is ever propagated through it.
    pub(crate) fn compute_results(
        self,
        cell: CellId,
        proc: &mut LocalProcessor,
    ) -> Result<(), ProcessError> {
        let entries: Vec<(IntrusionContext, CellContext)> = self.contexts.into_iter().collect();
        trace!("reconciling cell {} with {} context(s)", cell, entries.len());

        let mut common: BTreeSet<PolygonRef> = BTreeSet::new();
        let mut first = true;

        if !entries.iter().any(|(key, _)| key.is_empty()) {
            proc.compute_local_cell(cell, &IntrusionContext::default(), &mut common)?;
            first = false;
        }

        for i in 0..entries.len() {
            let (key, ctx) = &entries[i];
            if first {
                common.extend(ctx.propagated().iter().copied());
                proc.compute_local_cell(cell, key, &mut common)?;
                first = false;
            } else {
                let mut res: BTreeSet<PolygonRef> = ctx.propagated().iter().copied().collect();
                proc.compute_local_cell(cell, key, &mut res)?;

                if common.is_empty() {
                    ctx.propagate(proc, cell, &res)?;
                } else if res != common {
                    let lost: BTreeSet<PolygonRef> =
                        common.difference(&res).copied().collect();
                    if !lost.is_empty() {
                        common = common.intersection(&res).copied().collect();
                        // Re-attribute to every context processed so far:
                        // these results were assumed common but are not.
                        for (_, earlier) in &entries[..i] {
                            earlier.propagate(proc, cell, &lost)?;
                        }
                    }
                    let gained: BTreeSet<PolygonRef> =
                        res.difference(&common).copied().collect();
                    ctx.propagate(proc, cell, &gained)?;
                }
            }
        }

        proc.push_results(cell, &common)
    }
}
