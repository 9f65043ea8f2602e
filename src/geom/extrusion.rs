//! VRML97 `Extrusion` geometry generation.
//!
//! A 2-D cross-section is swept along a 3-D spine. At every spine point the
//! cross-section is scaled, rotated by the orientation override and placed in
//! the local frame built by [`build_spine_frames`]. The swept rings are joined
//! by wall quads and optionally closed by caps; per-corner normals are
//! smoothed up to the crease angle.
//!
//! [`generate_extrusion`] runs the full pipeline and never fails: degenerate
//! input yields an empty mesh or a degraded one with the fallbacks recorded in
//! [`ExtrusionDiagnostics`].

use serde::{Deserialize, Serialize};

use super::caps::{CapFlags, emit_caps};
use super::diagnostics::ExtrusionDiagnostics;
use super::frame::{ExtrusionFrame, build_spine_frames, clamped_override};
use super::mesh::{ExtrusionMesh, IndexStream};
use super::metrics::{ExtrusionMetrics, TimingBucket};
use super::normals::NormalGenerator;
use super::triangulation::PolygonTessellator;
use super::walls::emit_walls;
use super::{Point3, Rotation, Tolerance, Vec2};

/// All inputs of an extrusion node.
///
/// Missing fields deserialize to the node defaults, so a partial config such
/// as `{ "spine": [...] }` is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrusionParams {
    /// Profile in the local XZ plane. Closed when first and last points are equal.
    pub cross_section: Vec<Vec2>,
    /// Closed when first and last points are equal.
    pub spine: Vec<Point3>,
    /// One rotation per spine point; the last entry repeats when shorter.
    pub orientation: Vec<Rotation>,
    /// Profile X/Z scale per spine point; the last entry repeats when shorter.
    pub scale: Vec<Vec2>,
    pub begin_cap: bool,
    pub end_cap: bool,
    pub ccw: bool,
    pub convex: bool,
    /// Radians.
    pub crease_angle: f64,
    /// Rendering hint only. Does not affect the generated geometry.
    pub solid: bool,
}

impl Default for ExtrusionParams {
    fn default() -> Self {
        Self {
            cross_section: vec![
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(-1.0, -1.0),
                Vec2::new(-1.0, 1.0),
                Vec2::new(1.0, 1.0),
            ],
            spine: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            orientation: vec![Rotation::IDENTITY],
            scale: vec![Vec2::ONE],
            begin_cap: true,
            end_cap: true,
            ccw: true,
            convex: true,
            crease_angle: 0.0,
            solid: true,
        }
    }
}

impl ExtrusionParams {
    #[must_use]
    pub fn profile_closed(&self) -> bool {
        is_closed(&self.cross_section)
    }

    #[must_use]
    pub fn spine_closed(&self) -> bool {
        is_closed(&self.spine)
    }

    #[must_use]
    pub const fn cap_flags(&self) -> CapFlags {
        CapFlags {
            begin: self.begin_cap,
            end: self.end_cap,
            convex: self.convex,
        }
    }
}

/// Exact equality of the first and last point. A single point is closed.
fn is_closed<T: PartialEq>(points: &[T]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => first == last,
        _ => false,
    }
}

/// Number of points left once a closing duplicate is dropped.
fn trimmed_len<T: PartialEq>(points: &[T]) -> usize {
    if is_closed(points) { points.len() - 1 } else { points.len() }
}

/// Shape of the swept vertex grid: `rings` copies of a `ring_len` profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingLayout {
    pub rings: usize,
    pub ring_len: usize,
    pub profile_closed: bool,
    pub spine_closed: bool,
}

impl RingLayout {
    #[must_use]
    pub fn from_params(params: &ExtrusionParams) -> Self {
        Self {
            rings: trimmed_len(&params.spine),
            ring_len: trimmed_len(&params.cross_section),
            profile_closed: params.profile_closed(),
            spine_closed: params.spine_closed(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rings == 0 || self.ring_len == 0
    }

    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.rings * self.ring_len
    }

    /// Upper bound on emitted triangles, used to size the index stream.
    #[must_use]
    pub fn estimated_triangle_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let ring_pairs = self.rings - 1 + usize::from(self.spine_closed);
        let segments = self.ring_len - 1 + usize::from(self.profile_closed);
        let caps = if self.spine_closed { 0 } else { 2 * self.ring_len.saturating_sub(2) };
        ring_pairs * segments * 2 + caps
    }
}

/// Places the cross-section at every frame.
///
/// Returns vertices and texture coordinates laid out ring by ring. `u` runs
/// along the profile and `v` along the spine; both reach 1 on the closing
/// seam of a closed loop.
fn sweep_profile(
    params: &ExtrusionParams,
    layout: RingLayout,
    frames: &[ExtrusionFrame],
) -> (Vec<Point3>, Vec<Vec2>) {
    let profile = &params.cross_section[..layout.ring_len];
    let u_den = (if layout.profile_closed { layout.ring_len } else { layout.ring_len - 1 }).max(1) as f64;
    let v_den = (if layout.spine_closed { layout.rings } else { layout.rings - 1 }).max(1) as f64;

    let mut vertices = Vec::with_capacity(layout.vertex_count());
    let mut tex_coords = Vec::with_capacity(layout.vertex_count());

    for (i, frame) in frames.iter().enumerate() {
        let orientation = clamped_override(&params.orientation, i, Rotation::IDENTITY);
        let scale = clamped_override(&params.scale, i, Vec2::ONE);
        let transform = frame.profile_transform(orientation, scale);
        let v = i as f64 / v_den;

        for (j, c) in profile.iter().enumerate() {
            vertices.push(transform.apply_point(Point3::new(c.x, 0.0, c.y)));
            tex_coords.push(Vec2::new(j as f64 / u_den, v));
        }
    }

    (vertices, tex_coords)
}

/// Generates the full extrusion mesh for `params`.
///
/// Pipeline: spine frames, profile sweep, caps, walls, normals. Triangles are
/// emitted in reversed order when exactly one of these holds: the winding
/// counter ends negative, or `ccw` is `false`.
#[must_use]
pub fn generate_extrusion(
    params: &ExtrusionParams,
    tessellator: &dyn PolygonTessellator,
    tol: Tolerance,
) -> (ExtrusionMesh, ExtrusionDiagnostics) {
    let mut diag = ExtrusionDiagnostics::new();
    let layout = RingLayout::from_params(params);
    if layout.is_empty() {
        log::debug!(
            "extrusion: empty after trimming (profile {}, spine {}), nothing generated",
            params.cross_section.len(),
            params.spine.len()
        );
        return (ExtrusionMesh::default(), diag);
    }

    let mut metrics = ExtrusionMetrics::default();
    metrics.begin();

    let frames = metrics.time(TimingBucket::Frames, || {
        build_spine_frames(&params.spine, layout.spine_closed, tol)
    });
    diag.record_frame_fallbacks(frames.fallbacks);
    diag.winding_counter = frames.winding.value();
    let reversed = frames.winding.is_reversed() ^ !params.ccw;
    diag.reversed_winding = reversed;

    let (vertices, tex_coords) =
        metrics.time(TimingBucket::Sweep, || sweep_profile(params, layout, &frames.frames));

    let mut stream =
        IndexStream::with_capacity(layout.ring_len, reversed, layout.estimated_triangle_count());
    metrics.time(TimingBucket::Caps, || {
        emit_caps(&mut stream, &vertices, layout, params.cap_flags(), tessellator, &mut diag);
    });
    diag.wall_triangle_count = metrics.time(TimingBucket::Walls, || emit_walls(&mut stream, layout));
    let indices = stream.into_indices();

    // `indices` already wind according to `ccw`, so faces are read as counter-clockwise.
    let generated = metrics.time(TimingBucket::Normals, || {
        NormalGenerator::new(true, params.crease_angle).generate(&vertices, &indices)
    });
    diag.degenerate_face_count = generated.degenerate_faces;
    if generated.degenerate_faces > 0 {
        log::debug!("extrusion: {} degenerate faces", generated.degenerate_faces);
    }

    let mesh = ExtrusionMesh {
        vertices,
        tex_coords,
        normals: generated.normals,
        indices,
    };
    diag.vertex_count = mesh.vertex_count();
    diag.triangle_count = mesh.triangle_count();
    diag.timing = metrics.end();

    log::debug!("extrusion regenerated: {}", diag.summary());
    (mesh, diag)
}
