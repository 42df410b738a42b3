// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A generic two-set box scanner.
//!
//! [`scan_overlapping_pairs`] reports every pair from two sets of pre-boxed
//! elements whose bounding boxes touch. Set 2 is bulk-loaded into an
//! R*-tree; set 1 is streamed against it. Pair order is deterministic for a
//! fixed input sequence: set 1 in the given order, hits sorted by their
//! position in set 2.

use crate::geometry::rect::Rect;
use crate::geometry::CoordinateType;

use rstar::{RTree, RTreeObject, AABB};

/// Receives the touching pairs found by [`scan_overlapping_pairs`].
pub trait ScanReceiver2<A, B> {
    /// Called once for each pair whose bounding boxes touch.
    fn interact(&mut self, a: &A, b: &B);
}

#[derive(Debug, Clone)]
struct ScanEntry<C> {
    index: usize,
    bbox: Rect<C>,
}

impl<C: CoordinateType> RTreeObject for ScanEntry<C> {
    type Envelope = AABB<[C; 2]>;

    fn envelope(&self) -> Self::Envelope {
        rect2aabb(&self.bbox)
    }
}

/// Convert a rectangle into an axis aligned bounding box used by RStar.
fn rect2aabb<C: CoordinateType>(r: &Rect<C>) -> AABB<[C; 2]> {
    AABB::from_corners(r.lower_left().into(), r.upper_right().into())
}

/// Report every pair from `set1` × `set2` whose boxes touch (closed
/// intervals) to `receiver`.
pub fn scan_overlapping_pairs<C, A, B, R>(
    set1: &[(A, Rect<C>)],
    set2: &[(B, Rect<C>)],
    receiver: &mut R,
) where
    C: CoordinateType,
    R: ScanReceiver2<A, B>,
{
    if set1.is_empty() || set2.is_empty() {
        return;
    }
    let entries = set2
        .iter()
        .enumerate()
        .map(|(index, (_, bbox))| ScanEntry { index, bbox: *bbox })
        .collect();
    let tree = RTree::bulk_load(entries);
    for (a, abox) in set1 {
        let mut hits: Vec<usize> = tree
            .locate_in_envelope_intersecting(&rect2aabb(abox))
            .map(|e| e.index)
            .collect();
        hits.sort_unstable();
        for j in hits {
            receiver.interact(a, &set2[j].0);
        }
    }
}

#[cfg(test)]
struct CollectPairs {
    pairs: Vec<(char, char)>,
}

#[cfg(test)]
impl ScanReceiver2<char, char> for CollectPairs {
    fn interact(&mut self, a: &char, b: &char) {
        self.pairs.push((*a, *b));
    }
}

#[test]
fn test_scan_reports_touching_pairs() {
    let set1 = [
        ('a', Rect::new((0, 0), (10, 10))),
        ('b', Rect::new((100, 100), (110, 110))),
    ];
    let set2 = [
        ('x', Rect::new((5, 5), (25, 25))),
        // Edge contact counts as touching.
        ('y', Rect::new((10, 0), (20, 10))),
        ('z', Rect::new((50, 50), (60, 60))),
    ];
    let mut receiver = CollectPairs { pairs: Vec::new() };
    scan_overlapping_pairs(&set1, &set2, &mut receiver);
    assert_eq!(receiver.pairs, vec![('a', 'x'), ('a', 'y')]);
}
