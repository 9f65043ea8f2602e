//! Side walls between consecutive rings.

use super::extrusion::RingLayout;
use super::mesh::IndexStream;

/// Emits two triangles per quad between consecutive rings.
///
/// A closed profile adds the quad from its last point back to the first on
/// every ring pair; a closed spine adds the ring pair from the last ring back
/// to the first. Returns the number of triangles written.
pub fn emit_walls(stream: &mut IndexStream, layout: RingLayout) -> usize {
    if layout.is_empty() {
        return 0;
    }

    let before = stream.triangle_count();
    let last_ring = layout.rings - 1;
    let wrap = layout.spine_closed.then_some((last_ring, 0));

    for (i, next) in (0..last_ring).map(|i| (i, i + 1)).chain(wrap) {
        for j in 0..layout.ring_len - 1 {
            emit_quad(stream, i, next, j, j + 1);
        }
        if layout.profile_closed {
            emit_quad(stream, i, next, layout.ring_len - 1, 0);
        }
    }

    stream.triangle_count() - before
}

fn emit_quad(stream: &mut IndexStream, ring: usize, next_ring: usize, j: usize, next_j: usize) {
    stream.push_grid_triangle((ring, j), (next_ring, j), (next_ring, next_j));
    stream.push_grid_triangle((ring, j), (next_ring, next_j), (ring, next_j));
}
