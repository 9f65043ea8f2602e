//! Begin and end caps of an open extrusion.
//!
//! Convex caps are fans over the first or last ring. Other caps go through a
//! [`PolygonTessellator`] and fall back to the fan when it fails.

use super::Point3;
use super::diagnostics::ExtrusionDiagnostics;
use super::extrusion::RingLayout;
use super::mesh::IndexStream;
use super::triangulation::PolygonTessellator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapSide {
    Begin,
    End,
}

impl CapSide {
    const fn label(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapFlags {
    pub begin: bool,
    pub end: bool,
    pub convex: bool,
}

/// Emits the begin and end caps requested by `flags`.
///
/// Caps only exist on an open spine. Convex caps are fanned; non-convex caps
/// go through `tessellator` and fall back to the fan when it fails. Cap
/// triangle counts and fallbacks are recorded in `diag`.
pub fn emit_caps(
    stream: &mut IndexStream,
    vertices: &[Point3],
    layout: RingLayout,
    flags: CapFlags,
    tessellator: &dyn PolygonTessellator,
    diag: &mut ExtrusionDiagnostics,
) {
    if layout.is_empty() || layout.spine_closed {
        return;
    }

    if flags.begin {
        diag.begin_cap_triangle_count =
            emit_cap(stream, vertices, layout, CapSide::Begin, flags.convex, tessellator, diag);
    }
    if flags.end {
        diag.end_cap_triangle_count =
            emit_cap(stream, vertices, layout, CapSide::End, flags.convex, tessellator, diag);
    }
}

/// Vertex indices of a cap ring in submission order.
///
/// The begin cap walks the first ring in profile order; the end cap walks the
/// last ring backwards so both caps face away from the walls.
#[must_use]
pub fn cap_ring(layout: RingLayout, side: CapSide) -> Vec<usize> {
    let n = layout.ring_len;
    match side {
        CapSide::Begin => (0..n).collect(),
        CapSide::End => {
            let base = (layout.rings - 1) * n;
            (0..n).map(|i| base + n - 1 - i).collect()
        }
    }
}

fn emit_cap(
    stream: &mut IndexStream,
    vertices: &[Point3],
    layout: RingLayout,
    side: CapSide,
    convex: bool,
    tessellator: &dyn PolygonTessellator,
    diag: &mut ExtrusionDiagnostics,
) -> usize {
    let ring = cap_ring(layout, side);

    if !convex {
        let polygon: Vec<Point3> = ring.iter().map(|&i| vertices[i]).collect();
        match tessellator.tessellate(&polygon) {
            Ok(triangles) => {
                for [a, b, c] in &triangles {
                    stream.push_triangle(ring[*a], ring[*b], ring[*c]);
                }
                return triangles.len();
            }
            Err(err) => {
                log::warn!("{} cap tessellation failed, using fan: {err}", side.label());
                diag.tessellation_fallback_count += 1;
                diag.add_warning(format!("{} cap fanned after tessellation failure: {err}", side.label()));
            }
        }
    }

    emit_fan(stream, &ring)
}

fn emit_fan(stream: &mut IndexStream, ring: &[usize]) -> usize {
    for i in 1..ring.len().saturating_sub(1) {
        stream.push_triangle(ring[0], ring[i], ring[i + 1]);
    }
    ring.len().saturating_sub(2)
}
