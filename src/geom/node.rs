//! The `Extrusion` node: inputs, change notification and cached outputs.

use super::cache::{ExtrusionCache, ExtrusionCacheStats};
use super::diagnostics::ExtrusionDiagnostics;
use super::extrusion::{ExtrusionParams, generate_extrusion};
use super::mesh::{ExtrusionBounds, ExtrusionMesh, Primitives};
use super::triangulation::{EarClipTessellator, PolygonTessellator};
use super::{Point3, Rotation, Tolerance, Vec2, Vec3};

/// An extrusion node with lazily regenerated geometry.
///
/// Every setter marks the geometry dirty; every getter regenerates it first if
/// needed. Getters take `&mut self` for that reason, so the borrow checker
/// serializes reads and writes. The node is `Send` when its tessellator is,
/// but sharing one across threads needs an external lock such as a `Mutex`.
///
/// ```ignore
/// let mut node = Extrusion::default();
/// node.set_spine(vec![Point3::ORIGIN, Point3::new(0.0, 0.0, 3.0)]);
/// let triangles = node.primitive_count();
/// ```
#[derive(Debug)]
pub struct Extrusion<T: PolygonTessellator = EarClipTessellator> {
    params: ExtrusionParams,
    cache: ExtrusionCache,
    tessellator: T,
    tolerance: Tolerance,
}

impl Default for Extrusion {
    fn default() -> Self {
        Self::new(ExtrusionParams::default())
    }
}

impl Extrusion {
    #[must_use]
    pub fn new(params: ExtrusionParams) -> Self {
        Self::with_tessellator(params, EarClipTessellator::default())
    }
}

impl<T: PolygonTessellator> Extrusion<T> {
    /// Uses `tessellator` for non-convex caps.
    #[must_use]
    pub fn with_tessellator(params: ExtrusionParams, tessellator: T) -> Self {
        Self {
            params,
            cache: ExtrusionCache::new(),
            tessellator,
            tolerance: Tolerance::FRAME,
        }
    }

    /// Overrides the frame-builder epsilon.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self.cache.invalidate();
        self
    }

    #[must_use]
    pub const fn params(&self) -> &ExtrusionParams {
        &self.params
    }

    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    #[must_use]
    pub const fn solid(&self) -> bool {
        self.params.solid
    }

    /// Applies `f` to the inputs and marks the geometry dirty.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut ExtrusionParams) -> R) -> R {
        let out = f(&mut self.params);
        self.cache.invalidate();
        out
    }

    pub fn set_params(&mut self, params: ExtrusionParams) {
        self.edit(|p| *p = params);
    }

    pub fn set_cross_section(&mut self, cross_section: Vec<Vec2>) {
        self.edit(|p| p.cross_section = cross_section);
    }

    pub fn set_spine(&mut self, spine: Vec<Point3>) {
        self.edit(|p| p.spine = spine);
    }

    pub fn set_orientation(&mut self, orientation: Vec<Rotation>) {
        self.edit(|p| p.orientation = orientation);
    }

    pub fn set_scale(&mut self, scale: Vec<Vec2>) {
        self.edit(|p| p.scale = scale);
    }

    pub fn set_begin_cap(&mut self, begin_cap: bool) {
        self.edit(|p| p.begin_cap = begin_cap);
    }

    pub fn set_end_cap(&mut self, end_cap: bool) {
        self.edit(|p| p.end_cap = end_cap);
    }

    pub fn set_ccw(&mut self, ccw: bool) {
        self.edit(|p| p.ccw = ccw);
    }

    pub fn set_convex(&mut self, convex: bool) {
        self.edit(|p| p.convex = convex);
    }

    pub fn set_crease_angle(&mut self, crease_angle: f64) {
        self.edit(|p| p.crease_angle = crease_angle);
    }

    pub fn set_solid(&mut self, solid: bool) {
        self.edit(|p| p.solid = solid);
    }

    /// The generated mesh, regenerating first when dirty.
    pub fn mesh(&mut self) -> &ExtrusionMesh {
        let Self {
            params,
            cache,
            tessellator,
            tolerance,
        } = self;
        cache.get_or_regenerate(|| generate_extrusion(params, &*tessellator, *tolerance))
    }

    pub fn vertices(&mut self) -> &[Point3] {
        &self.mesh().vertices
    }

    pub fn tex_coords(&mut self) -> &[Vec2] {
        &self.mesh().tex_coords
    }

    /// One normal per corner of the index stream.
    pub fn normals(&mut self) -> &[Vec3] {
        &self.mesh().normals
    }

    /// Polygons terminated by [`POLYGON_END`](super::mesh::POLYGON_END).
    pub fn indices(&mut self) -> &[i32] {
        &self.mesh().indices
    }

    /// `None` when nothing was generated.
    pub fn bounding_box(&mut self) -> Option<ExtrusionBounds> {
        self.mesh().bounding_box()
    }

    pub fn primitive_count(&mut self) -> usize {
        self.mesh().triangle_count()
    }

    pub fn primitives(&mut self) -> Primitives<'_> {
        self.mesh().primitives()
    }

    /// Diagnostics of the current geometry.
    pub fn diagnostics(&mut self) -> &ExtrusionDiagnostics {
        let _ = self.mesh();
        self.cache.last_diagnostics()
    }

    #[must_use]
    pub fn cache_stats(&self) -> ExtrusionCacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.cache.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::triangulation::TessellationError;
    use std::cell::Cell;

    #[derive(Debug, Default)]
    struct CountingTessellator {
        calls: Cell<usize>,
        inner: EarClipTessellator,
    }

    impl PolygonTessellator for CountingTessellator {
        fn tessellate(&self, polygon: &[Point3]) -> Result<Vec<[usize; 3]>, TessellationError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.tessellate(polygon)
        }
    }

    #[test]
    fn test_getters_do_not_regenerate() {
        let mut node = Extrusion::default();
        let first = node.vertices().to_vec();
        let _ = node.indices();
        let _ = node.normals();
        let _ = node.tex_coords();
        let second = node.vertices().to_vec();

        assert_eq!(first, second);
        assert_eq!(node.cache_stats().regenerations, 1);
        assert_eq!(node.cache_stats().hits, 4);
    }

    #[test]
    fn test_setter_marks_dirty_and_regenerates() {
        let mut node = Extrusion::default();
        assert_eq!(node.primitive_count(), 12);

        node.set_begin_cap(false);
        assert!(node.is_dirty());
        assert_eq!(node.primitive_count(), 10);
        assert_eq!(node.cache_stats().regenerations, 2);
    }

    #[test]
    fn test_spine_change_moves_vertices() {
        let mut node = Extrusion::default();
        node.set_spine(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 5.0, 0.0)]);

        let bounds = node.bounding_box().unwrap();
        assert_eq!(bounds.max.y, 5.0);
        assert_eq!(bounds.center, Point3::new(0.0, 2.5, 0.0));
    }

    #[test]
    fn test_solid_change_invalidates() {
        let mut node = Extrusion::default();
        let _ = node.mesh();
        node.set_solid(false);

        assert!(!node.solid());
        assert!(node.is_dirty());
    }

    #[test]
    fn test_edit_returns_closure_value() {
        let mut node = Extrusion::default();
        let old = node.edit(|p| std::mem::replace(&mut p.crease_angle, 1.0));
        assert_eq!(old, 0.0);
        assert_eq!(node.params().crease_angle, 1.0);
        assert!(node.is_dirty());
    }

    #[test]
    fn test_empty_spine() {
        let mut node = Extrusion::default();
        node.set_spine(Vec::new());

        assert!(node.vertices().is_empty());
        assert!(node.indices().is_empty());
        assert!(node.bounding_box().is_none());
        assert_eq!(node.primitives().count(), 0);
    }

    #[test]
    fn test_custom_tessellator_runs_for_non_convex_caps() {
        let params = ExtrusionParams {
            convex: false,
            ..Default::default()
        };
        let mut node = Extrusion::with_tessellator(params, CountingTessellator::default());
        assert_eq!(node.primitive_count(), 12);
        let _ = node.indices();
        assert_eq!(node.tessellator.calls.get(), 2);

        node.set_convex(true);
        let _ = node.indices();
        assert_eq!(node.tessellator.calls.get(), 2);
    }

    #[test]
    fn test_primitives_resolve_attributes() {
        let mut node = Extrusion::default();
        let triangles: Vec<_> = node.primitives().collect();

        assert_eq!(triangles.len(), 12);
        for tri in &triangles {
            for corner in tri {
                assert!((corner.normal.length() - 1.0).abs() < 1e-12);
                assert!((0.0..=1.0).contains(&corner.tex_coord.x));
            }
        }
    }

    #[test]
    fn test_custom_tolerance_is_kept() {
        let mut node = Extrusion::default().with_tolerance(Tolerance::new(1e-4));
        assert_eq!(node.tolerance().eps, 1e-4);
        assert_eq!(node.primitive_count(), 12);
    }

    #[test]
    fn test_diagnostics_follow_current_geometry() {
        let mut node = Extrusion::default();
        assert_eq!(node.diagnostics().vertex_count, 8);

        node.set_cross_section(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)]);
        assert_eq!(node.diagnostics().vertex_count, 6);
    }
}
