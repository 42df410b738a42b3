// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

extern crate hierproc;

use hierproc::prelude::*;
use itertools::Itertools;
use std::cell::Cell as StdCell;
use std::collections::BTreeSet;

/// Emit every scope shape that has at least one intruder.
struct EmitIntruded;

impl LocalOperation for EmitIntruded {
    fn compute_local(
        &self,
        _layout: &mut Layout,
        interactions: &Interactions,
        result: &mut BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError> {
        result.extend(
            interactions
                .iter()
                .filter(|(_, intruders)| !intruders.is_empty())
                .map(|(scope, _)| *scope),
        );
        Ok(())
    }
}

/// Emit the scope shapes unchanged, ignoring all intruders.
struct Identity;

impl LocalOperation for Identity {
    fn compute_local(
        &self,
        _layout: &mut Layout,
        interactions: &Interactions,
        result: &mut BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError> {
        result.extend(interactions.keys().copied());
        Ok(())
    }
}

/// Never emits anything.
struct Discard;

impl LocalOperation for Discard {
    fn compute_local(
        &self,
        _layout: &mut Layout,
        _interactions: &Interactions,
        _result: &mut BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError> {
        Ok(())
    }
}

/// Identity that counts its invocations.
struct CountingIdentity {
    calls: StdCell<usize>,
}

impl LocalOperation for CountingIdentity {
    fn compute_local(
        &self,
        _layout: &mut Layout,
        interactions: &Interactions,
        result: &mut BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError> {
        self.calls.set(self.calls.get() + 1);
        result.extend(interactions.keys().copied());
        Ok(())
    }
}

/// Always fails.
struct Failing;

impl LocalOperation for Failing {
    fn compute_local(
        &self,
        _layout: &mut Layout,
        _interactions: &Interactions,
        _result: &mut BTreeSet<PolygonRef>,
    ) -> Result<(), ProcessError> {
        Err(ProcessError::Operation("operation failed".into()))
    }
}

/// The output polygons of one cell, materialized and sorted.
fn output(layout: &Layout, cell: CellId, layer: LayerId) -> Vec<Polygon> {
    layout
        .cell(cell)
        .and_then(|c| c.shapes(layer))
        .map(|s| {
            s.each_shape()
                .map(|r| r.polygon(layout.repository()))
                .sorted()
                .collect_vec()
        })
        .unwrap_or_default()
}

fn rect_polys(rects: &[Rect<Coord>]) -> Vec<Polygon> {
    rects
        .iter()
        .map(|&r| Polygon::from(r))
        .sorted()
        .collect_vec()
}

struct Layers {
    scope: LayerId,
    intruder: LayerId,
    output: LayerId,
}

fn new_layout() -> (Layout, Layers) {
    let mut layout = Layout::new();
    let layers = Layers {
        scope: layout.find_or_create_layer(1, 0),
        intruder: layout.find_or_create_layer(2, 0),
        output: layout.find_or_create_layer(10, 0),
    };
    (layout, layers)
}

fn run(layout: &mut Layout, top: CellId, op: &dyn LocalOperation, layers: &Layers) {
    LocalProcessor::new(layout, top, op, layers.scope, layers.intruder, layers.output)
        .run()
        .unwrap();
}

// Scenario: single cell, no hierarchy. Both scope shapes are intruded by
// the one intruder shape.
#[test]
fn test_single_cell() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    layout.insert_shape(top, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_shape(top, layers.scope, Rect::new((20, 20), (30, 30)));
    layout.insert_shape(top, layers.intruder, Rect::new((5, 5), (25, 25)));

    run(&mut layout, top, &EmitIntruded, &layers);

    assert_eq!(
        output(&layout, top, layers.output),
        rect_polys(&[Rect::new((0, 0), (10, 10)), Rect::new((20, 20), (30, 30))])
    );
}

// Scenario: one child, one instance, no intruders anywhere. The result is
// intruder-free and stays in the child.
#[test]
fn test_single_instance_without_context() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(child, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(
        top,
        CellInstArray::new(child, ComplexTransform::translation(Vector::new(100, 0))),
    );

    run(&mut layout, top, &Identity, &layers);

    assert_eq!(
        output(&layout, child, layers.output),
        rect_polys(&[Rect::new((0, 0), (10, 10))])
    );
    assert!(output(&layout, top, layers.output).is_empty());
}

// Scenario: a shared child under differing contexts. The child's result
// differs per context, so nothing is committed to the child and the
// intruded instantiation propagates into the top cell.
#[test]
fn test_shared_child_with_differing_contexts() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(child, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(top, CellInstArray::new(child, ComplexTransform::identity()));
    layout.insert_instance(
        top,
        CellInstArray::new(child, ComplexTransform::translation(Vector::new(200, 0))),
    );
    // Near the first instance only.
    layout.insert_shape(top, layers.intruder, Rect::new((5, 5), (15, 15)));

    run(&mut layout, top, &EmitIntruded, &layers);

    assert!(output(&layout, child, layers.output).is_empty());
    assert_eq!(
        output(&layout, top, layers.output),
        rect_polys(&[Rect::new((0, 0), (10, 10))])
    );
}

// Scenario: a 2×2 array with the intruder over the base element only.
// Exactly one propagated rectangle reaches the top cell.
#[test]
fn test_array_instance_with_partial_intrusion() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(child, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(
        top,
        CellInstArray::with_repetition(
            child,
            ComplexTransform::identity(),
            RegularRepetition::new(Vector::new(100, 0), Vector::new(0, 100), 2, 2),
        ),
    );
    layout.insert_shape(top, layers.intruder, Rect::new((2, 2), (8, 8)));

    run(&mut layout, top, &EmitIntruded, &layers);

    assert!(output(&layout, child, layers.output).is_empty());
    assert_eq!(
        output(&layout, top, layers.output),
        rect_polys(&[Rect::new((0, 0), (10, 10))])
    );
}

// Scenario: two independent instantiations with identical (empty)
// surroundings share one context: the child is evaluated exactly once.
#[test]
fn test_identical_contexts_evaluate_once() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(child, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(top, CellInstArray::new(child, ComplexTransform::identity()));
    layout.insert_instance(
        top,
        CellInstArray::new(child, ComplexTransform::translation(Vector::new(1000, 1000))),
    );

    let op = CountingIdentity {
        calls: StdCell::new(0),
    };
    run(&mut layout, top, &op, &layers);

    // One evaluation for the child's single context, one for the top cell.
    assert_eq!(op.calls.get(), 2);
    assert_eq!(
        output(&layout, child, layers.output),
        rect_polys(&[Rect::new((0, 0), (10, 10))])
    );
    assert!(output(&layout, top, layers.output).is_empty());
}

// Scenario: an intruder reaching through two hierarchy levels. The result
// is context-specific and propagates leaf → mid → top.
#[test]
fn test_intruder_through_two_levels() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let mid = layout.create_cell(Some("mid".into()));
    let leaf = layout.create_cell(Some("leaf".into()));
    layout.insert_shape(leaf, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(
        mid,
        CellInstArray::new(leaf, ComplexTransform::translation(Vector::new(50, 0))),
    );
    layout.insert_instance(
        top,
        CellInstArray::new(mid, ComplexTransform::translation(Vector::new(100, 0))),
    );
    // Overlaps the leaf's scope rectangle, which lands at (150, 0)..(160, 10).
    layout.insert_shape(top, layers.intruder, Rect::new((155, 5), (165, 15)));

    run(&mut layout, top, &EmitIntruded, &layers);

    assert!(output(&layout, leaf, layers.output).is_empty());
    assert!(output(&layout, mid, layers.output).is_empty());
    assert_eq!(
        output(&layout, top, layers.output),
        rect_polys(&[Rect::new((150, 0), (160, 10))])
    );
}

// A rotated instantiation: the propagated result carries the instance
// transform.
#[test]
fn test_rotated_instance_propagation() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(child, layers.scope, Rect::new((0, 0), (10, 20)));
    layout.insert_instance(
        top,
        CellInstArray::new(
            child,
            ComplexTransform::rigid(false, Angle::R90, Vector::new(100, 0)),
        ),
    );
    // The child's scope rectangle lands at (80, 0)..(100, 10).
    layout.insert_shape(top, layers.intruder, Rect::new((85, 2), (95, 8)));

    run(&mut layout, top, &EmitIntruded, &layers);

    assert!(output(&layout, child, layers.output).is_empty());
    assert_eq!(
        output(&layout, top, layers.output),
        rect_polys(&[Rect::new((80, 0), (100, 10))])
    );
}

// Intruder shapes below a child instance must reach scope shapes in the
// parent cell.
#[test]
fn test_intruder_below_instance_reaches_parent_scope() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(top, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_shape(child, layers.intruder, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(
        top,
        CellInstArray::new(child, ComplexTransform::translation(Vector::new(5, 0))),
    );

    run(&mut layout, top, &EmitIntruded, &layers);

    assert_eq!(
        output(&layout, top, layers.output),
        rect_polys(&[Rect::new((0, 0), (10, 10))])
    );
    assert!(output(&layout, child, layers.output).is_empty());
}

// Intruder content in one subtree must reach scope shapes in a sibling
// subtree.
#[test]
fn test_sibling_subtree_intrusion() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let scoped = layout.create_cell(Some("scoped".into()));
    let intruding = layout.create_cell(Some("intruding".into()));
    layout.insert_shape(scoped, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_shape(intruding, layers.intruder, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(top, CellInstArray::new(scoped, ComplexTransform::identity()));
    layout.insert_instance(
        top,
        CellInstArray::new(intruding, ComplexTransform::translation(Vector::new(8, 0))),
    );

    run(&mut layout, top, &EmitIntruded, &layers);

    // Context-specific: the result propagates into the top cell.
    assert!(output(&layout, scoped, layers.output).is_empty());
    assert_eq!(
        output(&layout, top, layers.output),
        rect_polys(&[Rect::new((0, 0), (10, 10))])
    );
}

// With a globally empty intruder layer every interaction list is empty.
#[test]
fn test_empty_intruder_layer() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(top, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_shape(child, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(
        top,
        CellInstArray::new(child, ComplexTransform::translation(Vector::new(100, 0))),
    );

    run(&mut layout, top, &EmitIntruded, &layers);

    assert!(output(&layout, top, layers.output).is_empty());
    assert!(output(&layout, child, layers.output).is_empty());
}

// An operation that returns nothing leaves every output layer empty.
#[test]
fn test_discarding_operation() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    layout.insert_shape(top, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_shape(top, layers.intruder, Rect::new((5, 5), (25, 25)));

    run(&mut layout, top, &Discard, &layers);

    assert!(output(&layout, top, layers.output).is_empty());
}

// The identity operation reproduces the scope layer in each cell exactly,
// independently of any intruders.
#[test]
fn test_identity_operation_reproduces_scope_layer() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(top, layers.scope, Rect::new((-20, -20), (-10, -10)));
    layout.insert_shape(child, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_instance(top, CellInstArray::new(child, ComplexTransform::identity()));
    layout.insert_instance(
        top,
        CellInstArray::new(child, ComplexTransform::translation(Vector::new(200, 0))),
    );
    // Intrudes the first instantiation only.
    layout.insert_shape(top, layers.intruder, Rect::new((5, 5), (15, 15)));

    run(&mut layout, top, &Identity, &layers);

    assert_eq!(
        output(&layout, top, layers.output),
        rect_polys(&[Rect::new((-20, -20), (-10, -10))])
    );
    assert_eq!(
        output(&layout, child, layers.output),
        rect_polys(&[Rect::new((0, 0), (10, 10))])
    );
}

fn build_determinism_layout() -> (Layout, Layers, CellId, Vec<CellId>) {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    let a = layout.create_cell(Some("a".into()));
    let b = layout.create_cell(Some("b".into()));
    layout.insert_shape(a, layers.scope, Rect::new((0, 0), (10, 10)));
    layout.insert_shape(a, layers.intruder, Rect::new((40, 0), (50, 10)));
    layout.insert_shape(b, layers.scope, Rect::new((0, 0), (30, 5)));
    layout.insert_instance(b, CellInstArray::new(a, ComplexTransform::identity()));
    layout.insert_instance(
        top,
        CellInstArray::new(b, ComplexTransform::translation(Vector::new(100, 0))),
    );
    layout.insert_instance(
        top,
        CellInstArray::new(
            b,
            ComplexTransform::rigid(false, Angle::R180, Vector::new(-100, 0)),
        ),
    );
    layout.insert_shape(top, layers.intruder, Rect::new((105, 2), (115, 4)));
    let cells = vec![top, a, b];
    (layout, layers, top, cells)
}

// Two runs on the same input produce identical output layer contents.
#[test]
fn test_deterministic_output() {
    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let (mut layout, layers, top, cells) = build_determinism_layout();
        run(&mut layout, top, &EmitIntruded, &layers);
        let snapshot = cells
            .iter()
            .map(|&c| output(&layout, c, layers.output))
            .collect_vec();
        snapshots.push(snapshot);
    }
    assert_eq!(snapshots[0], snapshots[1]);
}

// A failing operation aborts the run and still releases the
// changes-in-progress marker.
#[test]
fn test_failing_operation_releases_changes_marker() {
    let (mut layout, layers) = new_layout();
    let top = layout.create_cell(Some("top".into()));
    layout.insert_shape(top, layers.scope, Rect::new((0, 0), (10, 10)));

    let result = LocalProcessor::new(
        &mut layout,
        top,
        &Failing,
        layers.scope,
        layers.intruder,
        layers.output,
    )
    .run();

    assert!(result.is_err());
    assert!(!layout.is_under_change());
}
