// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Errors surfaced by a processor run.

use crate::layout::types::CellId;
use std::fmt;

/// A processor run failure. There are no recoverable classes: the run is
/// atomic from the caller's point of view, and on failure the partially
/// written output layer should be discarded.
#[derive(Debug)]
pub enum ProcessError {
    /// The hierarchy referenced a cell index with no cell behind it.
    CellNotFound(CellId),
    /// A drop referenced a context that is not (or no longer) present.
    ContextNotFound(CellId),
    /// Context-specific results reached the root drop, which has no parent
    /// to receive them.
    OrphanPropagation(CellId),
    /// The local operation failed.
    Operation(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::CellNotFound(cell) => write!(f, "cell not found: {}", cell),
            ProcessError::ContextNotFound(cell) => {
                write!(f, "missing context for cell: {}", cell)
            }
            ProcessError::OrphanPropagation(cell) => {
                write!(f, "results of cell {} propagated past the root", cell)
            }
            ProcessError::Operation(e) => write!(f, "local operation failed: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Operation(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
