// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Hierarchical local geometry processing for chip layouts.
//!
//! The [`process::LocalProcessor`] evaluates a local geometric operation
//! over a cell hierarchy: for every polygon on a *scope* layer it collects
//! the polygons on an *intruder* layer whose bounding boxes touch it — in
//! the same cell, in parent cells or in sibling subtrees — and hands the
//! interaction map to a [`process::local_op::LocalOperation`], which
//! produces polygons on an *output* layer.
//!
//! Hierarchy is preserved: a cell is evaluated once per distinct intrusion
//! context, results common to all contexts are committed to the cell
//! itself, and context-specific residues are propagated into the
//! instantiating parents.
//!
//! # Example
//!
//! ```
//! use hierproc::prelude::*;
//! use std::collections::BTreeSet;
//!
//! // Emit every scope shape that has at least one intruder.
//! struct EmitIntruded;
//!
//! impl LocalOperation for EmitIntruded {
//!     fn compute_local(
//!         &self,
//!         _layout: &mut Layout,
//!         interactions: &Interactions,
//!         result: &mut BTreeSet<PolygonRef>,
//!     ) -> Result<(), ProcessError> {
//!         result.extend(
//!             interactions
//!                 .iter()
//!                 .filter(|(_, intruders)| !intruders.is_empty())
//!                 .map(|(scope, _)| *scope),
//!         );
//!         Ok(())
//!     }
//! }
//!
//! let mut layout = Layout::new();
//! let scope = layout.find_or_create_layer(1, 0);
//! let intruder = layout.find_or_create_layer(2, 0);
//! let output = layout.find_or_create_layer(10, 0);
//! let top = layout.create_cell(Some("TOP".into()));
//! layout.insert_shape(top, scope, Rect::new((0, 0), (10, 10)));
//! layout.insert_shape(top, intruder, Rect::new((5, 5), (25, 25)));
//!
//! let op = EmitIntruded;
//! LocalProcessor::new(&mut layout, top, &op, scope, intruder, output)
//!     .run()
//!     .unwrap();
//!
//! let out = layout.cell(top).unwrap().shapes(output).unwrap();
//! assert_eq!(out.len(), 1);
//! ```

#![deny(missing_docs)]

pub mod geometry;
pub mod layout;
pub mod prelude;
pub mod process;
pub mod scan;
pub mod types;
