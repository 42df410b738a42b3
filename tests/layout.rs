// SPDX-FileCopyrightText: 2022 Thomas Kramer
//
// SPDX-License-Identifier: AGPL-3.0-or-later

extern crate hierproc;

use hierproc::prelude::*;
use itertools::Itertools;

#[test]
fn test_bottom_up_order() {
    let mut layout = Layout::new();
    let top = layout.create_cell(Some("top".into()));
    let mid = layout.create_cell(Some("mid".into()));
    let leaf = layout.create_cell(Some("leaf".into()));
    layout.insert_instance(top, CellInstArray::new(mid, ComplexTransform::identity()));
    layout.insert_instance(mid, CellInstArray::new(leaf, ComplexTransform::identity()));

    let order = layout.each_cell_bottom_up();
    assert_eq!(order.len(), 3);
    let position = |c: CellId| order.iter().position(|&x| x == c).unwrap();
    assert!(position(leaf) < position(mid));
    assert!(position(mid) < position(top));
}

#[test]
#[should_panic(expected = "Cannot create recursive instances.")]
fn test_no_recursive_instances() {
    let mut layout = Layout::new();
    let top = layout.create_cell(Some("top".into()));
    let sub = layout.create_cell(Some("sub".into()));
    layout.insert_instance(top, CellInstArray::new(sub, ComplexTransform::identity()));
    // This should fail:
    layout.insert_instance(sub, CellInstArray::new(top, ComplexTransform::identity()));
}

#[test]
#[should_panic(expected = "Cell with this name already exists.")]
fn test_no_duplicate_cell_names() {
    let mut layout = Layout::new();
    let _ = layout.create_cell(Some("a".into()));
    let _ = layout.create_cell(Some("a".into()));
}

#[test]
fn test_hierarchical_bounding_boxes() {
    let mut layout = Layout::new();
    let layer = layout.find_or_create_layer(1, 0);
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));

    layout.insert_shape(child, layer, Rect::new((0, 0), (10, 10)));
    layout.insert_shape(top, layer, Rect::new((-5, -5), (0, 0)));
    layout.insert_instance(
        top,
        CellInstArray::new(
            child,
            ComplexTransform::translation(Vector::new(100, 0)),
        ),
    );
    layout.update();

    assert_eq!(
        layout.cell_bbox(child, layer),
        Some(Rect::new((0, 0), (10, 10)))
    );
    // Own shapes and the translated child box combined.
    assert_eq!(
        layout.cell_bbox(top, layer),
        Some(Rect::new((-5, -5), (110, 10)))
    );
}

#[test]
fn test_array_instance_bbox() {
    let mut layout = Layout::new();
    let layer = layout.find_or_create_layer(1, 0);
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));
    layout.insert_shape(child, layer, Rect::new((0, 0), (10, 10)));

    let arr = CellInstArray::with_repetition(
        child,
        ComplexTransform::identity(),
        RegularRepetition::new(Vector::new(100, 0), Vector::new(0, 200), 2, 3),
    );
    layout.insert_instance(top, arr);
    layout.update();

    assert_eq!(
        layout.inst_array_bbox(&arr, layer),
        Some(Rect::new((0, 0), (110, 410)))
    );
    assert_eq!(
        layout.cell_bbox(top, layer),
        Some(Rect::new((0, 0), (110, 410)))
    );
}

#[test]
fn test_recursive_shape_visit() {
    let mut layout = Layout::new();
    let layer = layout.find_or_create_layer(1, 0);
    let top = layout.create_cell(Some("top".into()));
    let child = layout.create_cell(Some("child".into()));

    layout.insert_shape(top, layer, Rect::new((0, 0), (10, 10)));
    layout.insert_shape(child, layer, Rect::new((0, 0), (4, 4)));
    layout.insert_instance(
        top,
        CellInstArray::new(
            child,
            ComplexTransform::translation(Vector::new(50, 0)),
        ),
    );
    layout.insert_instance(
        top,
        CellInstArray::new(
            child,
            ComplexTransform::translation(Vector::new(500, 500)),
        ),
    );
    layout.update();

    // A region covering the top shape and the first child instance only.
    let mut found = Vec::new();
    layout.for_each_shape_recursive(top, layer, Rect::new((0, 0), (100, 100)), &mut |r, t| {
        found.push(r.polygon(layout.repository()).transformed(&t));
    });
    let found = found.into_iter().sorted().collect_vec();
    let expected = vec![
        Polygon::from(Rect::new((0, 0), (10, 10))),
        Polygon::from(Rect::new((50, 0), (54, 4))),
    ]
    .into_iter()
    .sorted()
    .collect_vec();
    assert_eq!(found, expected);
}

#[test]
fn test_changes_marker() {
    let mut layout = Layout::new();
    assert!(!layout.is_under_change());
    layout.start_changes();
    assert!(layout.is_under_change());
    layout.end_changes();
    assert!(!layout.is_under_change());
}
