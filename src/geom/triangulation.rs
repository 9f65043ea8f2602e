//! Simple-polygon tessellation used for non-convex caps.
//!
//! [`PolygonTessellator`] is the seam the cap builder talks to; the default
//! [`EarClipTessellator`] projects the 3-D ring onto its dominant plane and
//! clips ears from a doubly linked node ring.

use super::{Point3, Tolerance, Vec3};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TessellationError {
    #[error("polygon requires at least 3 points, got {count}")]
    NotEnoughPoints { count: usize },
    #[error("polygon points must be finite")]
    NonFinitePoint,
    #[error("polygon has no usable plane (zero area)")]
    DegeneratePlane,
    #[error("polygon degenerates after removing duplicate and collinear points")]
    DegeneratesAfterFiltering,
    #[error("failed to triangulate polygon (no ears found)")]
    NoEarFound,
}

/// Splits one simple polygon into triangles.
///
/// Returned triangles index into `polygon` and keep the orientation of the
/// input ring: a polygon listed counter-clockwise about its normal yields
/// counter-clockwise triangles about the same normal.
pub trait PolygonTessellator {
    fn tessellate(&self, polygon: &[Point3]) -> Result<Vec<[usize; 3]>, TessellationError>;
}

/// Ear clipping on the polygon projected along its dominant normal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarClipTessellator {
    pub tolerance: Tolerance,
}

impl EarClipTessellator {
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

impl Default for EarClipTessellator {
    fn default() -> Self {
        Self::new(Tolerance::DEFAULT)
    }
}

impl PolygonTessellator for EarClipTessellator {
    fn tessellate(&self, polygon: &[Point3]) -> Result<Vec<[usize; 3]>, TessellationError> {
        if polygon.len() < 3 {
            return Err(TessellationError::NotEnoughPoints { count: polygon.len() });
        }
        if polygon.iter().any(|p| !p.is_finite()) {
            return Err(TessellationError::NonFinitePoint);
        }

        let normal = newell_normal(polygon);
        if self.tolerance.is_zero_vec3(normal) {
            return Err(TessellationError::DegeneratePlane);
        }

        let projected = project_to_plane(polygon, normal);
        let mut nodes = build_ring_nodes(&projected);
        earclip_polygon(0, &mut nodes, self.tolerance)
    }
}

/// Unnormalized Newell normal of a polygon ring. Its length is twice the area.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point2 {
    u: f64,
    v: f64,
}

/// Drops the dominant normal axis. The remaining pair is ordered so the
/// projected ring is counter-clockwise exactly when the 3-D ring is
/// counter-clockwise about `normal`.
fn project_to_plane(points: &[Point3], normal: Vec3) -> Vec<Point2> {
    let axis = normal.dominant_axis();
    let flip = normal.axis(axis) < 0.0;
    points
        .iter()
        .map(|p| {
            let (u, v) = match axis {
                0 => (p.y, p.z),
                1 => (p.z, p.x),
                _ => (p.x, p.y),
            };
            if flip { Point2 { u: v, v: u } } else { Point2 { u, v } }
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Node {
    idx: usize,
    point: Point2,
    prev: usize,
    next: usize,
}

fn build_ring_nodes(points: &[Point2]) -> Vec<Node> {
    let len = points.len();
    points
        .iter()
        .enumerate()
        .map(|(i, point)| Node {
            idx: i,
            point: *point,
            prev: (i + len - 1) % len,
            next: (i + 1) % len,
        })
        .collect()
}

fn ring_len(start: usize, nodes: &[Node]) -> usize {
    let mut count = 0usize;
    let mut cur = start;
    loop {
        count += 1;
        cur = nodes[cur].next;
        if cur == start || count > nodes.len() {
            break;
        }
    }
    count
}

/// Unlinks duplicate and collinear nodes. Returns `None` when fewer than
/// three nodes survive.
fn filter_ring_points(start: usize, nodes: &mut [Node], tol: Tolerance) -> Option<usize> {
    if ring_len(start, nodes) < 3 {
        return None;
    }

    let mut start = start;
    let mut cur = start;
    let mut guard = 0usize;

    loop {
        guard += 1;
        if guard > nodes.len().saturating_mul(4).max(16) {
            break;
        }

        let prev = nodes[cur].prev;
        let next = nodes[cur].next;
        let p = nodes[prev].point;
        let c = nodes[cur].point;
        let n = nodes[next].point;

        let dup = approx_eq_2d(p, c, tol) || approx_eq_2d(c, n, tol);
        let collinear = distance_point_to_line_2d(p, c, n) <= tol.eps;

        if dup || collinear {
            if cur == start {
                start = next;
            }
            remove_node(cur, nodes);
            if ring_len(start, nodes) < 3 {
                return None;
            }
            cur = prev;
        } else {
            cur = next;
        }

        if cur == start {
            break;
        }
    }

    Some(start)
}

fn earclip_polygon(
    start: usize,
    nodes: &mut [Node],
    tol: Tolerance,
) -> Result<Vec<[usize; 3]>, TessellationError> {
    let mut start =
        filter_ring_points(start, nodes, tol).ok_or(TessellationError::DegeneratesAfterFiltering)?;

    let is_ccw = signed_area_ring(start, nodes) > 0.0;
    let mut remaining = ring_len(start, nodes);

    let mut ear = start;
    let mut stop = start;
    let mut triangles = Vec::with_capacity(remaining.saturating_sub(2));
    let mut passes_without_clip = 0usize;

    while remaining > 2 {
        let prev = nodes[ear].prev;
        let next = nodes[ear].next;
        if is_ear(prev, ear, next, nodes, is_ccw, tol) {
            triangles.push([nodes[prev].idx, nodes[ear].idx, nodes[next].idx]);

            if ear == start {
                start = next;
            }
            remove_node(ear, nodes);
            remaining -= 1;
            ear = next;
            stop = next;
            passes_without_clip = 0;
            continue;
        }

        ear = next;
        if ear == stop {
            passes_without_clip += 1;
            if passes_without_clip > 2 {
                return Err(TessellationError::NoEarFound);
            }
            start = filter_ring_points(start, nodes, tol)
                .ok_or(TessellationError::DegeneratesAfterFiltering)?;
            remaining = ring_len(start, nodes);
            ear = start;
            stop = start;
        }
    }

    Ok(triangles)
}

fn is_ear(prev: usize, ear: usize, next: usize, nodes: &[Node], is_ccw: bool, tol: Tolerance) -> bool {
    let a = nodes[prev].point;
    let b = nodes[ear].point;
    let c = nodes[next].point;

    if distance_point_to_line_2d(a, b, c) <= tol.eps {
        return false;
    }

    let cross = orient2d(a, b, c);
    if (is_ccw && cross <= 0.0) || (!is_ccw && cross >= 0.0) {
        return false;
    }

    let mut p = nodes[next].next;
    let mut guard = 0usize;
    while p != prev {
        guard += 1;
        if guard > nodes.len() {
            break;
        }
        let pt = nodes[p].point;
        if point_in_triangle(a, b, c, pt, is_ccw, tol) {
            let cross_p = orient2d(nodes[nodes[p].prev].point, pt, nodes[nodes[p].next].point);
            let is_reflex = if is_ccw { cross_p <= tol.eps } else { cross_p >= -tol.eps };
            if is_reflex {
                return false;
            }
        }
        p = nodes[p].next;
    }

    true
}

fn signed_area_ring(start: usize, nodes: &[Node]) -> f64 {
    let mut area = 0.0;
    let mut p = start;
    loop {
        let q = nodes[p].next;
        let a = nodes[p].point;
        let b = nodes[q].point;
        area += a.u * b.v - b.u * a.v;
        p = q;
        if p == start {
            break;
        }
    }
    0.5 * area
}

fn remove_node(node: usize, nodes: &mut [Node]) {
    let prev = nodes[node].prev;
    let next = nodes[node].next;
    nodes[prev].next = next;
    nodes[next].prev = prev;
}

fn approx_eq_2d(a: Point2, b: Point2, tol: Tolerance) -> bool {
    (a.u - b.u).abs() <= tol.eps && (a.v - b.v).abs() <= tol.eps
}

fn orient2d(a: Point2, b: Point2, c: Point2) -> f64 {
    (b.u - a.u) * (c.v - a.v) - (b.v - a.v) * (c.u - a.u)
}

fn point_in_triangle(a: Point2, b: Point2, c: Point2, p: Point2, is_ccw: bool, tol: Tolerance) -> bool {
    let ab = orient2d(a, b, p);
    let bc = orient2d(b, c, p);
    let ca = orient2d(c, a, p);

    if is_ccw {
        ab >= -tol.eps && bc >= -tol.eps && ca >= -tol.eps
    } else {
        ab <= tol.eps && bc <= tol.eps && ca <= tol.eps
    }
}

fn distance_point_to_line_2d(a: Point2, p: Point2, b: Point2) -> f64 {
    let du = b.u - a.u;
    let dv = b.v - a.v;
    let len = du.hypot(dv);
    if len <= f64::EPSILON {
        return (p.u - a.u).hypot(p.v - a.v);
    }
    ((p.u - a.u) * dv - (p.v - a.v) * du).abs() / len
}
