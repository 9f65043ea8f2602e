use crate::geom::{CacheState, Extrusion, ExtrusionCache, ExtrusionParams, Point3, Vec2};

#[test]
fn consecutive_setters_coalesce_into_one_regeneration() {
    let mut node = Extrusion::default();
    let _ = node.vertices();

    node.set_ccw(false);
    node.set_crease_angle(0.5);
    node.set_scale(vec![Vec2::new(2.0, 2.0)]);
    assert_eq!(node.cache_stats().regenerations, 1);

    let _ = node.normals();
    let _ = node.indices();
    let stats = node.cache_stats();
    assert_eq!(stats.regenerations, 2);
    assert_eq!(stats.invalidations, 3);
    assert_eq!(stats.hits, 1);
}

#[test]
fn regenerated_output_replaces_previous_arrays() {
    let mut node = Extrusion::default();
    let before = node.vertices().to_vec();

    node.set_spine(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
    ]);
    let after = node.vertices().to_vec();

    assert_eq!(before.len(), 8);
    assert_eq!(after.len(), 12);
    assert_eq!(&after[..4], &before[..4]);
}

#[test]
fn cache_memory_estimate_tracks_mesh() {
    let mut node = Extrusion::default();
    assert_eq!(node.cache_stats().estimated_memory_bytes, 0);

    let _ = node.mesh();
    assert!(node.cache_stats().estimated_memory_bytes > 0);

    node.set_cross_section(Vec::new());
    let _ = node.mesh();
    assert_eq!(node.cache_stats().estimated_memory_bytes, 0);
}

#[test]
fn standalone_cache_with_generated_mesh() {
    let params = ExtrusionParams::default();
    let tess = crate::geom::EarClipTessellator::default();
    let mut cache = ExtrusionCache::new();

    let count = cache
        .get_or_regenerate(|| crate::geom::generate_extrusion(&params, &tess, crate::geom::Tolerance::FRAME))
        .triangle_count();
    assert_eq!(count, 12);
    assert_eq!(cache.state(), CacheState::Clean);
    assert_eq!(cache.last_diagnostics().triangle_count, 12);
}
