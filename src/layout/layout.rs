// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The layout database: cells, layers, the shape repository, hierarchical
//! bounding boxes and recursive region queries.

use super::cell::Cell;
use super::instance::CellInstArray;
use super::repository::{PolygonRef, ShapeRepository};
use super::types::{CellId, LayerId, LayerInfo};
use crate::geometry::polygon::Polygon;
use crate::geometry::rect::Rect;
use crate::geometry::transform::ComplexTransform;
use crate::types::{Coord, IntHashMap, IntHashSet, UInt};

use itertools::Itertools;
use std::collections::HashMap;

/// Data structure which holds cells and cell instances.
///
/// # Examples
///
/// ```
/// use hierproc::prelude::*;
/// let mut layout = Layout::new();
/// let top = layout.create_cell(Some("TOP".into()));
/// let layer = layout.find_or_create_layer(1, 0);
/// layout.insert_shape(top, layer, Rect::new((0, 0), (10, 10)));
/// assert!(layout.has_cell("TOP"));
/// ```
#[derive(Default, Debug)]
pub struct Layout {
    /// Data-base unit. Pixels per micrometer.
    dbu: UInt,
    /// All cells.
    pub(crate) cells: IntHashMap<CellId, Cell>,
    /// Counter for generating the next cell index.
    cell_index_counter: u32,
    /// Lookup table for finding cells by name.
    cells_by_name: HashMap<String, CellId>,
    /// Counter for generating the next layer index.
    layer_index_counter: u32,
    /// Lookup table for finding layers by index/datatype numbers.
    layers_by_index_datatype: HashMap<(UInt, UInt), LayerId>,
    /// Info structures for all layers.
    layer_info: IntHashMap<LayerId, LayerInfo>,
    /// Interned polygon bodies shared by all cells.
    pub(crate) repository: ShapeRepository,
    /// Hierarchical per-layer bounding boxes, filled by `update()`.
    pub(crate) cell_bboxes: IntHashMap<CellId, IntHashMap<LayerId, Rect<Coord>>>,
    /// Advisory marker: a batch edit of the layout is in progress.
    changes_in_progress: bool,
}

impl Layout {
    /// Create a new and empty layout.
    pub fn new() -> Self {
        Layout {
            dbu: 1000,
            ..Default::default()
        }
    }

    /// Get the database unit.
    pub fn dbu(&self) -> UInt {
        self.dbu
    }

    /// Set the database unit.
    pub fn set_dbu(&mut self, dbu: UInt) {
        self.dbu = dbu;
    }

    /// Create a new cell in this layout and return its index.
    ///
    /// # Panics
    /// Panics when a cell with this name already exists.
    pub fn create_cell(&mut self, name: Option<String>) -> CellId {
        if let Some(name) = &name {
            if self.cells_by_name.contains_key(name) {
                panic!("Cell with this name already exists.");
            }
        }
        let id = CellId(self.cell_index_counter);
        self.cell_index_counter += 1;
        self.cells.insert(id, Cell::new(id, name.clone()));
        if let Some(name) = name {
            self.cells_by_name.insert(name, id);
        }
        id
    }

    /// Find a cell index by the cell name.
    pub fn cell_index_by_name(&self, name: &str) -> Option<CellId> {
        self.cells_by_name.get(name).copied()
    }

    /// Returns true iff a cell with this name exists.
    pub fn has_cell(&self, name: &str) -> bool {
        self.cells_by_name.contains_key(name)
    }

    /// Find a cell by its index.
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Get the total number of cells in this layout.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over all cell indices, in ascending order.
    pub fn each_cell_id(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.keys().copied().sorted()
    }

    /// Find layer index by the (index, data type) tuple.
    pub fn find_layer(&self, index: UInt, datatype: UInt) -> Option<LayerId> {
        self.layers_by_index_datatype.get(&(index, datatype)).copied()
    }

    /// Find layer index by the (index, data type) tuple or create a new
    /// layer if nothing can be found.
    pub fn find_or_create_layer(&mut self, index: UInt, datatype: UInt) -> LayerId {
        match self.find_layer(index, datatype) {
            Some(layer) => layer,
            None => {
                let layer = LayerId(self.layer_index_counter);
                self.layer_index_counter += 1;
                self.layers_by_index_datatype.insert((index, datatype), layer);
                self.layer_info.insert(
                    layer,
                    LayerInfo {
                        index,
                        datatype,
                        name: None,
                    },
                );
                layer
            }
        }
    }

    /// Get the read-only layer info datastructure for the given layer.
    pub fn get_layer_info(&self, layer: LayerId) -> Option<&LayerInfo> {
        self.layer_info.get(&layer)
    }

    /// Set the name of a layer. `None` indicates that the layer has no name.
    pub fn set_layer_name(&mut self, layer: LayerId, name: Option<String>) {
        if let Some(info) = self.layer_info.get_mut(&layer) {
            info.name = name;
        }
    }

    /// Intern `polygon` and insert it on the given layer of the given cell.
    /// Returns the created reference.
    ///
    /// # Panics
    /// Panics when the cell does not exist.
    pub fn insert_shape(
        &mut self,
        cell: CellId,
        layer: LayerId,
        polygon: impl Into<Polygon>,
    ) -> PolygonRef {
        let r = PolygonRef::new(polygon.into(), &mut self.repository);
        self.cells
            .get_mut(&cell)
            .expect("cell does not exist")
            .shapes_get_or_create(layer)
            .insert(r);
        r
    }

    /// Insert a child instance array into `parent`.
    ///
    /// # Panics
    /// Panics when either cell does not exist or when the instance would
    /// make the hierarchy cyclic.
    pub fn insert_instance(&mut self, parent: CellId, inst: CellInstArray) {
        assert!(
            self.cells.contains_key(&inst.cell()),
            "instantiated cell does not exist"
        );
        assert!(
            !self.reaches(inst.cell(), parent),
            "Cannot create recursive instances."
        );
        self.cells
            .get_mut(&parent)
            .expect("cell does not exist")
            .push_instance(inst);
    }

    /// Check whether `target` is reachable from `from` through instance
    /// edges (including `from == target`).
    fn reaches(&self, from: CellId, target: CellId) -> bool {
        if from == target {
            return true;
        }
        let mut stack = vec![from];
        let mut visited = IntHashSet::default();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(cell) = self.cells.get(&id) {
                for inst in cell.each_inst() {
                    if inst.cell() == target {
                        return true;
                    }
                    stack.push(inst.cell());
                }
            }
        }
        false
    }

    /// Access the shared polygon repository.
    pub fn repository(&self) -> &ShapeRepository {
        &self.repository
    }

    /// Mutable access to the shared polygon repository, for interning new
    /// polygon bodies.
    pub fn repository_mut(&mut self) -> &mut ShapeRepository {
        &mut self.repository
    }

    /// All cell indices ordered bottom-up: every cell comes after all cells
    /// it instantiates. Deterministic for a given layout.
    pub fn each_cell_bottom_up(&self) -> Vec<CellId> {
        fn visit(
            cells: &IntHashMap<CellId, Cell>,
            id: CellId,
            visited: &mut IntHashSet<CellId>,
            order: &mut Vec<CellId>,
        ) {
            if !visited.insert(id) {
                return;
            }
            if let Some(cell) = cells.get(&id) {
                for inst in cell.each_inst() {
                    visit(cells, inst.cell(), visited, order);
                }
            }
            order.push(id);
        }

        let mut order = Vec::with_capacity(self.cells.len());
        let mut visited = IntHashSet::default();
        for id in self.cells.keys().copied().sorted() {
            visit(&self.cells, id, &mut visited, &mut order);
        }
        order
    }

    /// Recompute the hierarchical per-layer bounding boxes of all cells.
    /// Must be called before using [`Layout::cell_bbox`],
    /// [`Layout::inst_array_bbox`] or [`Layout::for_each_shape_recursive`]
    /// after the layout was edited.
    pub fn update(&mut self) {
        let order = self.each_cell_bottom_up();
        self.cell_bboxes.clear();
        for cell_id in order {
            let mut per_layer: IntHashMap<LayerId, Rect<Coord>> = Default::default();
            {
                let cell = &self.cells[&cell_id];

                // Own shapes.
                for layer in cell.each_used_layer() {
                    let bbox = cell.shapes(layer).and_then(|shapes| {
                        shapes
                            .each_shape()
                            .filter_map(|r| r.try_bounding_box(&self.repository))
                            .reduce(|a, b| a.add_rect(&b))
                    });
                    if let Some(b) = bbox {
                        per_layer.insert(layer, b);
                    }
                }

                // Child instances: children are visited first, so their
                // boxes are already cached.
                for inst in cell.each_inst() {
                    if let Some(child_layers) = self.cell_bboxes.get(&inst.cell()) {
                        for (&layer, child_bbox) in
                            child_layers.iter().sorted_by_key(|(l, _)| **l)
                        {
                            let b = inst.transformed_bbox(child_bbox);
                            per_layer
                                .entry(layer)
                                .and_modify(|acc| *acc = acc.add_rect(&b))
                                .or_insert(b);
                        }
                    }
                }
            }
            self.cell_bboxes.insert(cell_id, per_layer);
        }
    }

    /// The cached hierarchical bounding box of a cell on a layer, including
    /// all child instances. `None` when the subtree holds no shapes on the
    /// layer. Only valid after [`Layout::update`].
    pub fn cell_bbox(&self, cell: CellId, layer: LayerId) -> Option<Rect<Coord>> {
        self.cell_bboxes.get(&cell)?.get(&layer).copied()
    }

    /// The bounding box of all elements of an instance array on a layer.
    /// Only valid after [`Layout::update`].
    pub fn inst_array_bbox(&self, inst: &CellInstArray, layer: LayerId) -> Option<Rect<Coord>> {
        self.cell_bbox(inst.cell(), layer)
            .map(|b| inst.transformed_bbox(&b))
    }

    /// Visit every shape on `layer` in the subtree of `cell` whose bounding
    /// box touches `region` (given in the frame of `cell`). The callback
    /// receives the found reference together with the transform from the
    /// frame of the cell it was found in into the frame of `cell`. Instance
    /// arrays are expanded. Only valid after [`Layout::update`].
    pub fn for_each_shape_recursive<F>(
        &self,
        cell: CellId,
        layer: LayerId,
        region: Rect<Coord>,
        f: &mut F,
    ) where
        F: FnMut(PolygonRef, ComplexTransform<Coord>),
    {
        self.visit_shapes_recursive(cell, layer, region, ComplexTransform::identity(), f);
    }

    fn visit_shapes_recursive<F>(
        &self,
        cell_id: CellId,
        layer: LayerId,
        region: Rect<Coord>,
        trans: ComplexTransform<Coord>,
        f: &mut F,
    ) where
        F: FnMut(PolygonRef, ComplexTransform<Coord>),
    {
        let cell = match self.cells.get(&cell_id) {
            Some(cell) => cell,
            None => return,
        };
        if let Some(shapes) = cell.shapes(layer) {
            for r in shapes.each_shape() {
                let touches = r
                    .try_bounding_box(&self.repository)
                    .map_or(false, |b| b.touches(&region));
                if touches {
                    f(r, trans);
                }
            }
        }
        for inst in cell.each_inst() {
            let child_bbox = match self.cell_bbox(inst.cell(), layer) {
                Some(b) => b,
                None => continue,
            };
            for et in inst.each_transform() {
                if et.transform_rect(&child_bbox).touches(&region) {
                    let child_region = et.inverted().transform_rect(&region);
                    self.visit_shapes_recursive(
                        inst.cell(),
                        layer,
                        child_region,
                        trans.concat(&et),
                        f,
                    );
                }
            }
        }
    }

    /// Mark the begin of a batch of changes. Advisory only.
    pub fn start_changes(&mut self) {
        self.changes_in_progress = true;
    }

    /// Mark the end of a batch of changes.
    pub fn end_changes(&mut self) {
        self.changes_in_progress = false;
    }

    /// Check whether a batch of changes is in progress.
    pub fn is_under_change(&self) -> bool {
        self.changes_in_progress
    }
}
