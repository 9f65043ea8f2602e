use extrusion_engine::Extrusion;
use extrusion_engine::geom::{
    ExtrusionParams, POLYGON_END, Point3, PolygonTessellator, Rotation, TessellationError, Vec2,
    Vec3,
};

#[test]
fn default_node_is_a_unit_box() {
    let mut node = Extrusion::default();

    assert_eq!(node.vertices().len(), 8);
    assert_eq!(node.tex_coords().len(), 8);
    assert_eq!(node.primitive_count(), 12);
    assert_eq!(node.indices().len(), 48);
    assert_eq!(node.normals().len(), 36);

    let bounds = node.bounding_box().expect("box bounds");
    assert_eq!(bounds.min, Point3::new(-1.0, 0.0, -1.0));
    assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
    assert!(node.diagnostics().is_clean());
}

#[test]
fn empty_inputs_produce_empty_outputs() {
    for params in [
        ExtrusionParams {
            cross_section: Vec::new(),
            ..Default::default()
        },
        ExtrusionParams {
            spine: Vec::new(),
            ..Default::default()
        },
        ExtrusionParams {
            spine: vec![Point3::new(1.0, 2.0, 3.0)],
            ..Default::default()
        },
    ] {
        let mut node = Extrusion::new(params);
        assert!(node.vertices().is_empty());
        assert!(node.tex_coords().is_empty());
        assert!(node.normals().is_empty());
        assert!(node.indices().is_empty());
        assert!(node.bounding_box().is_none());
        assert_eq!(node.primitive_count(), 0);
    }
}

#[test]
fn getters_are_idempotent() {
    let mut node = Extrusion::default();
    node.set_crease_angle(1.2);

    let vertices = node.vertices().to_vec();
    let indices = node.indices().to_vec();
    let normals = node.normals().to_vec();
    for _ in 0..3 {
        assert_eq!(node.vertices(), vertices.as_slice());
        assert_eq!(node.indices(), indices.as_slice());
        assert_eq!(node.normals(), normals.as_slice());
    }
    assert_eq!(node.cache_stats().regenerations, 1);
}

#[test]
fn every_setter_is_reflected_on_next_read() {
    let mut node = Extrusion::default();
    let base = node.mesh().clone();

    node.set_cross_section(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(0.0, 0.0),
    ]);
    assert_eq!(node.vertices().len(), 6);

    node.set_spine(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
        Point3::new(0.0, 4.0, 0.0),
    ]);
    assert_eq!(node.vertices().len(), 9);

    node.set_scale(vec![Vec2::new(3.0, 3.0)]);
    assert_eq!(node.vertices()[1], Point3::new(3.0, 0.0, 0.0));

    node.set_orientation(vec![Rotation::new(Vec3::Y, std::f64::consts::PI)]);
    let p = node.vertices()[1];
    assert!((p.x + 3.0).abs() < 1e-12 && p.z.abs() < 1e-12);

    node.set_end_cap(false);
    node.set_begin_cap(false);
    assert_eq!(node.primitive_count(), 12);

    node.set_params(ExtrusionParams::default());
    assert_eq!(node.mesh(), &base);
}

#[test]
fn ccw_reverses_index_order_only() {
    let mut node = Extrusion::default();
    let forward_vertices = node.vertices().to_vec();
    let forward = node.indices().to_vec();

    node.set_ccw(false);
    assert_eq!(node.vertices(), forward_vertices.as_slice());
    let reversed = node.indices().to_vec();

    assert_eq!(forward.len(), reversed.len());
    for (f, r) in forward.chunks(4).zip(reversed.chunks(4)) {
        assert_eq!(f[3], POLYGON_END);
        assert_eq!(r[3], POLYGON_END);
        assert_eq!([f[0], f[1], f[2]], [r[2], r[1], r[0]]);
    }
}

#[test]
fn ccw_false_flips_the_lit_side() {
    let mut node = Extrusion::default();
    let up = node.normals()[0];
    node.set_ccw(false);
    let down = node.normals()[2];

    assert_eq!(up, Vec3::Y);
    assert_eq!(down, -Vec3::Y);
}

#[test]
fn closed_spine_and_profile_counts() {
    let mut node = Extrusion::default();
    node.set_spine(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 4.0),
        Point3::new(0.0, 0.0, 0.0),
    ]);

    assert_eq!(node.primitive_count(), 24);
    assert_eq!(node.indices().len(), 96);
    assert_eq!(node.diagnostics().cap_triangle_count(), 0);
}

#[test]
fn crease_zero_is_faceted_and_pi_is_smooth() {
    let mut node = Extrusion::default();
    let faceted = node.normals().to_vec();
    node.set_crease_angle(std::f64::consts::PI);
    let smooth = node.normals().to_vec();

    assert!(faceted.iter().all(|n| n.x.abs() == 1.0 || n.y.abs() == 1.0 || n.z.abs() == 1.0));
    assert!(smooth.iter().all(|n| n.x != 0.0 && n.y != 0.0 && n.z != 0.0));
}

struct RejectAll;

impl PolygonTessellator for RejectAll {
    fn tessellate(&self, _polygon: &[Point3]) -> Result<Vec<[usize; 3]>, TessellationError> {
        Err(TessellationError::NoEarFound)
    }
}

#[test]
fn failed_cap_tessellation_falls_back_to_fan() {
    let params = ExtrusionParams {
        convex: false,
        ..Default::default()
    };
    let mut fallback = Extrusion::with_tessellator(params, RejectAll);
    let mut convex = Extrusion::default();

    assert_eq!(fallback.indices(), convex.indices());
    let diag = fallback.diagnostics();
    assert_eq!(diag.tessellation_fallback_count, 2);
    assert_eq!(diag.warnings.len(), 2);
    assert!(!diag.is_clean());
}

#[test]
fn params_load_from_json() {
    let json = r#"{
        "cross_section": [{ "x": 1, "y": 0 }, { "x": 0, "y": 1 }, { "x": -1, "y": 0 }, { "x": 1, "y": 0 }],
        "spine": [{ "x": 0, "y": 0, "z": 0 }, { "x": 0, "y": 3, "z": 0 }],
        "begin_cap": false
    }"#;
    let params: ExtrusionParams = serde_json::from_str(json).expect("parse params");
    let mut node = Extrusion::new(params);

    assert_eq!(node.vertices().len(), 6);
    assert_eq!(node.diagnostics().begin_cap_triangle_count, 0);
    assert_eq!(node.diagnostics().end_cap_triangle_count, 1);
}
