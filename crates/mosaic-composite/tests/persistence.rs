//! Text and JSON round trips of mixed meshes.

use mosaic_composite::{
    CompositeConfig, CompositeCurve, CompositeSurface, Direction, End, Error, Handle,
    NullEvaluator, Point3,
};

/// Five patches built with every structural operator, plus a few edits so
/// the control points are not all integers.
fn mixed_mesh() -> CompositeSurface {
    let mut surface = CompositeSurface::new();
    let a = surface.insert_new_patch().unwrap();
    let b = surface.continue_existing_patch(a, Direction::E).unwrap();
    let c = surface.continue_existing_patch(a, Direction::S).unwrap();
    let _bridge = surface
        .join_existing_patches(b, Direction::S, c, Direction::E)
        .unwrap();
    let e = surface.insert_new_patch().unwrap();
    surface.translate_patch(e, Point3::new(0.1, 7.3, -0.2)).unwrap();
    surface
        .merge_existing_patches(e, Direction::W, b, Direction::E)
        .unwrap();
    surface
        .update_control_point(a, 0, 3, Point3::new(0.3, -1.0 / 3.0, 1e-7))
        .unwrap();
    surface
        .update_control_point(e, 2, 1, Point3::new(f64::MIN_POSITIVE, 2.5e10, -0.0))
        .unwrap();
    surface
}

fn adjacency(surface: &CompositeSurface) -> Vec<Vec<(Direction, usize, Direction)>> {
    let position = |h: Handle| {
        surface
            .handles()
            .iter()
            .position(|&other| other == h)
            .unwrap()
    };
    surface
        .handles()
        .into_iter()
        .map(|h| {
            surface
                .neighbours(h)
                .unwrap()
                .into_iter()
                .map(|(slot, link)| (slot, position(link.node), link.back))
                .collect()
        })
        .collect()
}

fn assert_same_mesh(left: &CompositeSurface, right: &CompositeSurface) {
    assert_eq!(left.node_count(), right.node_count());
    assert_eq!(adjacency(left), adjacency(right));
    for (l, r) in left.handles().into_iter().zip(right.handles()) {
        assert!(left.grid(l).unwrap().bit_eq(right.grid(r).unwrap()));
    }
}

#[test]
fn text_round_trip_of_mixed_mesh() {
    let surface = mixed_mesh();
    assert_eq!(surface.node_count(), 5);
    let text = surface.to_text().unwrap();

    let restored =
        CompositeSurface::read_text(text.as_bytes(), CompositeConfig::default(), NullEvaluator)
            .unwrap();
    assert_same_mesh(&surface, &restored);
    assert!(restored.symmetry_violations().is_empty());
    assert_eq!(restored.to_text().unwrap(), text);
}

#[test]
fn json_round_trip_of_mixed_mesh() {
    let surface = mixed_mesh();
    let json = surface.to_json().unwrap();
    let restored = CompositeSurface::from_json(&json, NullEvaluator).unwrap();
    assert_same_mesh(&surface, &restored);
    assert_eq!(restored.snapshot(), surface.snapshot());
}

#[test]
fn restored_mesh_keeps_propagating() {
    let surface = mixed_mesh();
    let mut restored = CompositeSurface::read_text(
        surface.to_text().unwrap().as_bytes(),
        CompositeConfig::default(),
        NullEvaluator,
    )
    .unwrap();
    let a = restored.handle_at(0).unwrap();
    let b = restored.handle_at(1).unwrap();
    restored
        .update_control_point(a, 1, 3, Point3::new(4.0, 4.0, 4.0))
        .unwrap();
    assert_eq!(
        restored.get_control_point(b, 1, 0).unwrap(),
        Point3::new(4.0, 4.0, 4.0)
    );
}

#[test]
fn header_carries_iso_line_counts() {
    let config = CompositeConfig {
        iso_line_count_u: 12,
        iso_line_count_v: 30,
        ..CompositeConfig::default()
    };
    let mut surface = CompositeSurface::with_config(config);
    surface.insert_new_patch().unwrap();
    let text = surface.to_text().unwrap();
    assert!(text.starts_with("12 30 1\n"));

    let restored =
        CompositeSurface::read_text(text.as_bytes(), CompositeConfig::default(), NullEvaluator)
            .unwrap();
    assert_eq!(restored.config().iso_line_count_u, 12);
    assert_eq!(restored.config().iso_line_count_v, 30);
}

#[test]
fn malformed_text_is_rejected() {
    let load = |text: &str| {
        CompositeSurface::read_text(text.as_bytes(), CompositeConfig::default(), NullEvaluator)
    };
    assert!(matches!(load(""), Err(Error::Parse { token: 0, .. })));
    assert!(matches!(load("50 50 -1"), Err(Error::Parse { token: 3, .. })));
    assert!(matches!(load("50 50 1 0 0 0"), Err(Error::Parse { .. })));

    let mut surface = CompositeSurface::new();
    surface.insert_new_patch().unwrap();
    let text = surface.to_text().unwrap() + " 7";
    assert!(matches!(load(&text), Err(Error::Parse { .. })));
}

#[test]
fn curve_text_round_trip() {
    let mut curve = CompositeCurve::new();
    let a = curve.insert_new_arc().unwrap();
    let b = curve.continue_existing_arc(a, End::Right).unwrap();
    let c = curve.continue_existing_arc(b, End::Right).unwrap();
    curve.merge_existing_arcs(c, End::Right, a, End::Left).unwrap();
    curve
        .update_control_point(b, 2, Point3::new(0.7, -0.25, 1.0 / 7.0))
        .unwrap();

    let text = curve.to_text().unwrap();
    assert!(text.starts_with("100 2 3\n"));
    let restored =
        CompositeCurve::read_text(text.as_bytes(), CompositeConfig::default(), NullEvaluator)
            .unwrap();
    assert_eq!(restored.snapshot(), curve.snapshot());
    assert!(restored.continuity_violations(1e-12).is_empty());
}
