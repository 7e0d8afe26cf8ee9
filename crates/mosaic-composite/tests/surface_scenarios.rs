//! End-to-end surface editing scenarios.

use mosaic_composite::{CompositeSurface, Direction, Error, Handle, Link, Point3};

const TOLERANCE: f64 = 1e-9;

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn assert_c1(surface: &CompositeSurface) {
    let violations = surface.continuity_violations(TOLERANCE);
    assert!(violations.is_empty(), "{violations:?}");
    assert!(surface.symmetry_violations().is_empty());
}

/// 2×2 block: `a` NW, `b` NE, `c` SW, `d` SE, closed by a merge.
fn quad() -> (CompositeSurface, [Handle; 4]) {
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    let b = surface.continue_existing_patch(a, Direction::E).unwrap();
    let c = surface.continue_existing_patch(a, Direction::S).unwrap();
    let d = surface.continue_existing_patch(c, Direction::E).unwrap();
    surface
        .merge_existing_patches(d, Direction::N, b, Direction::S)
        .unwrap();
    (surface, [a, b, c, d])
}

#[test]
fn continue_then_edit_corner_reaches_diagonal() {
    let mut surface = CompositeSurface::new();
    let p0 = surface.insert_new_patch().unwrap();
    let p1 = surface.continue_existing_patch(p0, Direction::E).unwrap();
    for i in 0..4 {
        assert_eq!(
            surface.get_control_point(p1, i, 0).unwrap(),
            surface.get_control_point(p0, i, 3).unwrap()
        );
    }

    let p2 = surface.insert_new_patch().unwrap();
    surface.translate_patch(p2, p(4.0, 4.0, 0.0)).unwrap();
    surface
        .merge_existing_patches(p0, Direction::SE, p2, Direction::NW)
        .unwrap();
    assert_eq!(
        surface.get_control_point(p2, 0, 0).unwrap(),
        surface.get_control_point(p0, 3, 3).unwrap()
    );

    let target = p(9.0, 9.0, 9.0);
    surface.update_control_point(p0, 3, 3, target).unwrap();
    assert_eq!(surface.get_control_point(p0, 3, 3).unwrap(), target);
    assert_eq!(surface.get_control_point(p1, 3, 0).unwrap(), target);
    assert_eq!(surface.get_control_point(p2, 0, 0).unwrap(), target);
    assert_c1(&surface);
}

#[test]
fn merge_closes_quad_around_vertex() {
    let (surface, [a, b, c, d]) = quad();
    assert_eq!(surface.node_count(), 4);
    assert_eq!(
        surface.neighbour(b, Direction::S).unwrap(),
        Some(Link { node: d, back: Direction::N })
    );

    let centre = surface.get_control_point(a, 3, 3).unwrap();
    assert_eq!(surface.get_control_point(b, 3, 0).unwrap(), centre);
    assert_eq!(surface.get_control_point(c, 0, 3).unwrap(), centre);
    assert_eq!(surface.get_control_point(d, 0, 0).unwrap(), centre);
    assert_c1(&surface);
}

#[test]
fn interior_vertex_edit_moves_all_four_corners() {
    let (mut surface, [a, b, c, d]) = quad();
    let target = p(-1.0, 0.5, 3.0);
    surface.update_control_point(a, 3, 3, target).unwrap();

    assert_eq!(surface.get_control_point(b, 3, 0).unwrap(), target);
    assert_eq!(surface.get_control_point(c, 0, 3).unwrap(), target);
    assert_eq!(surface.get_control_point(d, 0, 0).unwrap(), target);
    assert_c1(&surface);
}

#[test]
fn translating_a_ring_member_keeps_the_ring_c1() {
    let (mut surface, [_, b, _, _]) = quad();
    surface.translate_patch(b, p(0.0, 0.0, 2.5)).unwrap();
    assert_c1(&surface);
}

#[test]
fn closed_tube_terminates() {
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    let b = surface.continue_existing_patch(a, Direction::E).unwrap();
    let c = surface.continue_existing_patch(b, Direction::E).unwrap();
    surface
        .merge_existing_patches(c, Direction::E, a, Direction::W)
        .unwrap();

    surface.update_control_point(b, 0, 1, p(0.0, 0.0, 5.0)).unwrap();
    surface.translate_patch(a, p(1.0, 0.0, 0.0)).unwrap();
    assert_eq!(surface.node_count(), 3);
    assert!(surface.symmetry_violations().is_empty());
    assert_eq!(
        surface.get_control_point(c, 2, 3).unwrap(),
        surface.get_control_point(a, 2, 0).unwrap()
    );
}

#[test]
fn self_merge_closes_single_patch_tube() {
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    surface
        .merge_existing_patches(a, Direction::W, a, Direction::E)
        .unwrap();
    surface.update_control_point(a, 1, 0, p(0.0, 0.0, 1.0)).unwrap();
    assert_eq!(
        surface.get_control_point(a, 1, 3).unwrap(),
        p(0.0, 0.0, 1.0)
    );
    assert!(surface.symmetry_violations().is_empty());
}

#[test]
fn rejected_structural_operations_leave_nets_untouched() {
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    let b = surface.continue_existing_patch(a, Direction::E).unwrap();
    let c = surface.insert_new_patch().unwrap();
    surface.translate_patch(c, p(0.0, 8.0, 0.0)).unwrap();

    let before: Vec<_> = [a, b, c]
        .iter()
        .map(|&h| *surface.grid(h).unwrap())
        .collect();

    let attempts = [
        surface.merge_existing_patches(a, Direction::E, c, Direction::W),
        surface
            .join_existing_patches(c, Direction::N, b, Direction::W)
            .map(|_| ()),
        surface.continue_existing_patch(b, Direction::W).map(|_| ()),
    ];
    for attempt in attempts {
        assert!(matches!(attempt, Err(Error::AlreadyConnected { .. })));
    }
    assert!(matches!(
        surface.merge_existing_patches(a, Direction::N, c, Direction::NE),
        Err(Error::InvalidTopology(_))
    ));

    assert_eq!(surface.node_count(), 3);
    for (&h, grid) in [a, b, c].iter().zip(&before) {
        assert!(surface.grid(h).unwrap().bit_eq(grid));
    }
}

#[test]
fn join_through_rotated_seams_is_c1() {
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    let b = surface.insert_new_patch().unwrap();
    surface.translate_patch(b, p(6.0, 1.0, 0.0)).unwrap();
    let bridge = surface
        .join_existing_patches(a, Direction::E, b, Direction::E)
        .unwrap();
    assert_c1(&surface);

    surface.update_control_point(b, 2, 3, p(1.0, 2.0, 3.0)).unwrap();
    assert_c1(&surface);
    let (link, index) = surface
        .resolve_symmetric_index(bridge, Direction::S, 3, 2)
        .unwrap();
    assert_eq!(link.node, b);
    assert_eq!(
        surface.get_control_point(bridge, 3, 2).unwrap(),
        surface
            .get_control_point(b, index.row(), index.col())
            .unwrap()
    );
}

#[test]
fn merge_around_three_patch_vertex_is_c1() {
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    let b = surface.continue_existing_patch(a, Direction::E).unwrap();
    let c = surface.continue_existing_patch(a, Direction::S).unwrap();
    assert_c1(&surface);

    surface
        .merge_existing_patches(b, Direction::S, c, Direction::E)
        .unwrap();
    assert_c1(&surface);

    let vertex = surface.get_control_point(a, 3, 3).unwrap();
    assert_eq!(surface.get_control_point(b, 3, 0).unwrap(), vertex);
    assert_eq!(surface.get_control_point(c, 0, 3).unwrap(), vertex);
    // Three patches cannot share a tangent cross, so the corner blocks close
    // onto the vertex
    for (node, row, col) in [(a, 3, 2), (a, 2, 3), (a, 2, 2), (b, 2, 1), (c, 1, 2)] {
        let point = surface.get_control_point(node, row, col).unwrap();
        assert!(point.distance(vertex) < TOLERANCE, "{node} ({row}, {col}) at {point}");
    }
}

#[test]
fn merge_into_open_fan_keeps_existing_seams() {
    // `a` with neighbours east and south-east of it, plus a loose patch
    // merged under the eastern one
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    let b = surface.continue_existing_patch(a, Direction::E).unwrap();
    let c = surface.continue_existing_patch(b, Direction::S).unwrap();
    let loose = surface.insert_new_patch().unwrap();
    surface.translate_patch(loose, p(7.0, 1.0, 2.0)).unwrap();
    assert_c1(&surface);

    surface
        .merge_existing_patches(loose, Direction::E, c, Direction::W)
        .unwrap();
    assert_c1(&surface);
    assert_eq!(
        surface.get_control_point(loose, 0, 3).unwrap(),
        surface.get_control_point(b, 3, 0).unwrap()
    );
}

#[test]
fn merge_closing_five_patch_ring_is_c1() {
    // Five patches wound round the south-east corner of `a`; the last one
    // is glued back onto `a`'s south edge
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    let b = surface.continue_existing_patch(a, Direction::E).unwrap();
    let c = surface.continue_existing_patch(b, Direction::S).unwrap();
    let d = surface.continue_existing_patch(c, Direction::W).unwrap();
    let e = surface.continue_existing_patch(d, Direction::N).unwrap();
    assert_c1(&surface);

    surface
        .merge_existing_patches(e, Direction::E, a, Direction::S)
        .unwrap();
    assert_c1(&surface);

    let vertex = surface.get_control_point(a, 3, 3).unwrap();
    for (node, row, col) in [(b, 3, 0), (c, 0, 0), (d, 0, 3), (e, 3, 3)] {
        assert_eq!(surface.get_control_point(node, row, col).unwrap(), vertex);
    }
}
