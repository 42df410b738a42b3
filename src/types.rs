// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Basic type aliases used across the crate.

// Use an alternative hasher that has better performance for integer keys.
use fnv::{FnvHashMap, FnvHashSet};

/// Default unsigned integer type.
pub type UInt = u32;
/// Default signed integer type.
pub type SInt = i32;

/// Integer coordinate type.
pub type Coord = i32;

/// Hash map with fast hashing for small integer-like keys.
pub type IntHashMap<K, V> = FnvHashMap<K, V>;
/// Hash set with fast hashing for small integer-like keys.
pub type IntHashSet<V> = FnvHashSet<V>;
