// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A cell is a container for geometric shapes and cell instances.

use super::instance::CellInstArray;
use super::shapes::Shapes;
use super::types::{CellId, LayerId};
use crate::types::IntHashMap;

use itertools::Itertools;

/// A `Cell` holds polygon shapes organized on layers, plus an ordered list
/// of child instance arrays.
#[derive(Debug, Clone)]
pub struct Cell {
    /// The index of this cell inside the layout.
    id: CellId,
    /// Cell name.
    name: Option<String>,
    /// Mapping from layer indices to geometry data.
    shapes_map: IntHashMap<LayerId, Shapes>,
    /// Child instances, in insertion order.
    instances: Vec<CellInstArray>,
}

impl Cell {
    pub(crate) fn new(id: CellId, name: Option<String>) -> Self {
        Cell {
            id,
            name,
            shapes_map: Default::default(),
            instances: Vec::new(),
        }
    }

    /// Get the index of this cell.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Return the cell name if it is defined.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the shapes object for the given layer.
    pub fn shapes(&self, layer: LayerId) -> Option<&Shapes> {
        self.shapes_map.get(&layer)
    }

    /// Get the mutable shapes object for the given layer, creating it when
    /// none exists yet.
    pub(crate) fn shapes_get_or_create(&mut self, layer: LayerId) -> &mut Shapes {
        self.shapes_map.entry(layer).or_default()
    }

    /// Return all layers that contain at least one shape, in ascending order.
    pub fn each_used_layer(&self) -> Vec<LayerId> {
        self.shapes_map
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(&l, _)| l)
            .sorted()
            .collect()
    }

    pub(crate) fn push_instance(&mut self, inst: CellInstArray) {
        self.instances.push(inst);
    }

    /// Iterate over the child instance arrays in insertion order.
    pub fn each_inst(&self) -> impl Iterator<Item = &CellInstArray> {
        self.instances.iter()
    }

    /// Number of child instance arrays.
    pub fn num_insts(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if this cell does not contain any other cell instances.
    pub fn is_leaf(&self) -> bool {
        self.instances.is_empty()
    }
}
