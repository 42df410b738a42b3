// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A layout data structure represents chip geometries. It consists of a
//! hierarchical arrangement of `Cell`s. Each cell contains polygon shapes
//! grouped on layers, and placements of other cells.

pub mod cell;
pub mod instance;
#[allow(clippy::module_inception)]
pub mod layout;
pub mod repository;
pub mod shapes;
pub mod types;
