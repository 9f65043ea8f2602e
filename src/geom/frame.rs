//! Per-spine-point coordinate frames.
//!
//! Every spine point gets an orthonormal frame: `y_axis` follows the spine
//! tangent, `z_axis` lies in the plane of the adjacent spine segments and
//! `x_axis` completes the basis. Consecutive frames are kept close to each
//! other so the swept profile does not flip between spine points.
//!
//! The builder also accumulates the [`WindingCounter`] that decides the index
//! order of every triangle emitted for the extrusion.

use super::{Point3, Rotation, Tolerance, Transform, Vec2, Vec3};

/// Anti-parallel limit for the two reference segments around a spine point.
const ANTI_PARALLEL_DOT: f64 = -0.999;

/// Largest `|Y·Z|` accepted before the third axis is synthesized.
const MAX_AXIS_SKEW: f64 = 0.5;

/// Frames closer than this to the previous frame trigger the flip search.
const CONTINUITY_DOT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionFrame {
    pub origin: Point3,
    pub x_axis: Vec3,
    /// Spine tangent.
    pub y_axis: Vec3,
    pub z_axis: Vec3,
}

impl ExtrusionFrame {
    /// Frame-only transform: local `(x, y, z)` maps to
    /// `origin + x * x_axis + y * y_axis + z * z_axis`.
    #[must_use]
    pub const fn to_transform(&self) -> Transform {
        Transform::from_axes(self.origin, self.x_axis, self.y_axis, self.z_axis)
    }

    /// Full profile transform for this frame: scale in the profile plane,
    /// then the orientation override, then the frame itself.
    #[must_use]
    pub fn profile_transform(&self, orientation: Rotation, scale: Vec2) -> Transform {
        self.to_transform() * orientation.to_transform() * Transform::scale(scale.x, 1.0, scale.y)
    }

    #[must_use]
    pub fn negative_component_count(&self) -> usize {
        self.x_axis.negative_component_count()
            + self.y_axis.negative_component_count()
            + self.z_axis.negative_component_count()
    }
}

/// Signed parity vote over all frames of one spine.
///
/// Each frame with an odd number of negative axis components votes `-1`,
/// every other frame votes `+1`. A negative total reverses the index order
/// of all emitted triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindingCounter(i32);

impl WindingCounter {
    pub fn record(&mut self, frame: &ExtrusionFrame) {
        if frame.negative_component_count() % 2 == 1 {
            self.0 -= 1;
        } else {
            self.0 += 1;
        }
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn is_reversed(self) -> bool {
        self.0 < 0
    }
}

/// How often each fallback fired while building one set of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFallbacks {
    pub degenerate_tangents: usize,
    pub parallel_references: usize,
    pub synthesized_axes: usize,
    pub continuity_corrections: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpineFrames {
    pub frames: Vec<ExtrusionFrame>,
    pub winding: WindingCounter,
    pub fallbacks: FrameFallbacks,
}

/// Builds one frame per effective spine point.
///
/// `spine` is the spine as stored. When `closed` is set the last stored point
/// duplicates the first one and only `spine.len() - 1` frames are produced;
/// neighbour lookups wrap around through the duplicate.
///
/// Never fails: degenerate input degrades to fallback axes.
#[must_use]
pub fn build_spine_frames(spine: &[Point3], closed: bool, tol: Tolerance) -> SpineFrames {
    let count = if closed { spine.len().saturating_sub(1) } else { spine.len() };
    let mut out = SpineFrames {
        frames: Vec::with_capacity(count),
        ..SpineFrames::default()
    };
    if count == 0 {
        return out;
    }

    let eps = tol.eps;
    let mut prev_x = Vec3::X;
    let mut prev_y = Vec3::Y;
    let mut prev_z = Vec3::Z;

    for i in 0..count {
        let mut y = spine_tangent(spine, count, closed, i);
        if y.normalize_checked(eps) <= eps {
            y = if prev_y.y < 0.0 { Vec3::Y.neg() } else { Vec3::Y };
            out.fallbacks.degenerate_tangents += 1;
            log::trace!("spine point {i}: degenerate tangent, using {y:?}");
        }

        let (mut z0, mut z1) = reference_vectors(spine, count, closed, i, y, eps);
        z0.normalize_checked(eps);
        z1.normalize_checked(eps);

        let mut z = if z0.dot(z1) < ANTI_PARALLEL_DOT {
            out.fallbacks.parallel_references += 1;
            prev_z
        } else {
            z0.cross(z1)
        };

        if z.normalize_checked(eps) <= eps || y.dot(z).abs() > MAX_AXIS_SKEW {
            z = synthesize_third_axis(y, eps);
            out.fallbacks.synthesized_axes += 1;
            log::trace!("spine point {i}: synthesized third axis {z:?}");
        }

        let mut x = y.cross(z);
        x.normalize_checked(eps);

        if i > 0 && (z.dot(prev_z) <= CONTINUITY_DOT || x.dot(prev_x) <= CONTINUITY_DOT) {
            z = closest_candidate(x, z, prev_z);
            x = y.cross(z);
            x.normalize_checked(eps);
            out.fallbacks.continuity_corrections += 1;
            log::trace!("spine point {i}: continuity correction applied");
        }

        prev_x = x;
        prev_y = y;
        prev_z = z;

        let frame = ExtrusionFrame {
            origin: spine[i],
            x_axis: x,
            y_axis: y,
            z_axis: z,
        };
        out.winding.record(&frame);
        out.frames.push(frame);
    }

    out
}

/// Clamped override lookup: the last entry repeats, an empty list yields `fallback`.
#[must_use]
pub fn clamped_override<T: Copy>(values: &[T], index: usize, fallback: T) -> T {
    values
        .get(index.min(values.len().saturating_sub(1)))
        .copied()
        .unwrap_or(fallback)
}

fn spine_tangent(spine: &[Point3], count: usize, closed: bool, i: usize) -> Vec3 {
    if closed {
        if i > 0 {
            spine[i + 1] - spine[i - 1]
        } else {
            spine[1] - spine[count - 1]
        }
    } else if count == 1 {
        Vec3::ZERO
    } else if i == 0 {
        spine[1] - spine[0]
    } else if i == count - 1 {
        spine[count - 1] - spine[count - 2]
    } else {
        spine[i + 1] - spine[i - 1]
    }
}

fn reference_vectors(
    spine: &[Point3],
    count: usize,
    closed: bool,
    i: usize,
    y: Vec3,
    eps: f64,
) -> (Vec3, Vec3) {
    if closed {
        if i > 0 {
            (spine[i + 1] - spine[i], spine[i - 1] - spine[i])
        } else {
            (spine[1] - spine[0], spine[count - 1] - spine[0])
        }
    } else if count <= 2 {
        let mut probe = Vec3::X.cross(y);
        if probe.normalize_checked(eps) <= eps {
            (Vec3::Y, y)
        } else {
            (Vec3::X, y)
        }
    } else if i == 0 {
        (spine[2] - spine[1], spine[0] - spine[1])
    } else if i == count - 1 {
        (spine[count - 1] - spine[count - 2], spine[count - 3] - spine[count - 2])
    } else {
        (spine[i + 1] - spine[i], spine[i - 1] - spine[i])
    }
}

/// Unit axis next to `y`'s dominant component, re-orthogonalized against `y`.
fn synthesize_third_axis(y: Vec3, eps: f64) -> Vec3 {
    let big = y.dominant_axis();
    let sign = if y.axis(big) > 0.0 { 1.0 } else { -1.0 };
    let mut z = [0.0; 3];
    z[(big + 1) % 3] = sign;
    let z = Vec3::from(z);

    let mut x = y.cross(z);
    x.normalize_checked(eps);
    let mut z = x.cross(y);
    z.normalize_checked(eps);
    z
}

/// Candidate from `{x, -x, z, -z}` best aligned with `prev_z`; earlier candidates win ties.
fn closest_candidate(x: Vec3, z: Vec3, prev_z: Vec3) -> Vec3 {
    let candidates = [x, x.neg(), z, z.neg()];
    let mut best = candidates[0];
    let mut best_dot = best.dot(prev_z);
    for candidate in &candidates[1..] {
        let dot = candidate.dot(prev_z);
        if dot > best_dot {
            best = *candidate;
            best_dot = dot;
        }
    }
    best
}
