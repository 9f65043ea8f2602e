//! Generated mesh payload and the `-1`-terminated index stream it is built from.

use serde::Serialize;

use super::{BBox, Point3, Vec2, Vec3};

/// Terminates every polygon in an index stream.
pub const POLYGON_END: i32 = -1;

/// Generated extrusion geometry.
///
/// `vertices` and `tex_coords` are parallel arrays laid out ring by ring.
/// `indices` lists polygons, each followed by [`POLYGON_END`]. `normals`
/// holds one entry per polygon corner in stream order, so its length equals
/// the number of non-sentinel entries in `indices`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExtrusionMesh {
    pub vertices: Vec<Point3>,
    pub tex_coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshValidationError {
    #[error("index stream does not end with a polygon terminator")]
    MissingTerminator,
    #[error("polygon {polygon} has {corners} corners, expected at least 3")]
    DegeneratePolygon { polygon: usize, corners: usize },
    #[error("index {index} at stream position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: i32,
        position: usize,
        vertex_count: usize,
    },
    #[error("expected {expected} texture coordinates (one per vertex), found {found}")]
    TexCoordCountMismatch { expected: usize, found: usize },
    #[error("expected {expected} normals (one per polygon corner), found {found}")]
    NormalCountMismatch { expected: usize, found: usize },
    #[error("mesh has non-finite vertex, texture coordinate or normal values")]
    NonFiniteValue,
}

/// Axis-aligned bounds of the generated vertices plus their center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtrusionBounds {
    pub min: Point3,
    pub max: Point3,
    pub center: Point3,
}

impl From<BBox> for ExtrusionBounds {
    fn from(bbox: BBox) -> Self {
        Self {
            min: bbox.min,
            max: bbox.max,
            center: bbox.center(),
        }
    }
}

/// One corner of a generated triangle, resolved to concrete attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveVertex {
    pub point: Point3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl ExtrusionMesh {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of polygons in the index stream. Every generated polygon is a triangle.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.iter().filter(|&&i| i == POLYGON_END).count()
    }

    /// Number of non-sentinel entries in the index stream.
    #[must_use]
    pub fn corner_count(&self) -> usize {
        self.indices.iter().filter(|&&i| i >= 0).count()
    }

    /// Polygons of the index stream, without their terminators.
    pub fn polygons(&self) -> impl Iterator<Item = &[i32]> + '_ {
        polygons(&self.indices)
    }

    /// `None` when the mesh has no vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Option<ExtrusionBounds> {
        BBox::from_points(&self.vertices).map(ExtrusionBounds::from)
    }

    /// Walks the index stream and yields each triangle with per-corner
    /// position, normal and texture coordinate. Polygons with more than three
    /// corners are fanned from their first corner.
    pub fn primitives(&self) -> Primitives<'_> {
        Primitives {
            mesh: self,
            polygon_start: 0,
            normal_start: 0,
            fan: 0,
        }
    }

    pub fn validate(&self) -> Result<(), MeshValidationError> {
        if self.tex_coords.len() != self.vertices.len() {
            return Err(MeshValidationError::TexCoordCountMismatch {
                expected: self.vertices.len(),
                found: self.tex_coords.len(),
            });
        }

        if self.indices.last().is_some_and(|&i| i != POLYGON_END) {
            return Err(MeshValidationError::MissingTerminator);
        }

        let vertex_count = self.vertices.len();
        for (position, &index) in self.indices.iter().enumerate() {
            if index == POLYGON_END {
                continue;
            }
            let in_range = usize::try_from(index).is_ok_and(|i| i < vertex_count);
            if !in_range {
                return Err(MeshValidationError::IndexOutOfRange {
                    index,
                    position,
                    vertex_count,
                });
            }
        }

        for (polygon, corners) in self.polygons().enumerate() {
            if corners.len() < 3 {
                return Err(MeshValidationError::DegeneratePolygon {
                    polygon,
                    corners: corners.len(),
                });
            }
        }

        let corners = self.corner_count();
        if self.normals.len() != corners {
            return Err(MeshValidationError::NormalCountMismatch {
                expected: corners,
                found: self.normals.len(),
            });
        }

        let finite = self.vertices.iter().all(|p| p.is_finite())
            && self.tex_coords.iter().all(|t| t.is_finite())
            && self.normals.iter().all(|n| n.is_finite());
        if !finite {
            return Err(MeshValidationError::NonFiniteValue);
        }

        Ok(())
    }
}

/// Builder for a terminated triangle stream over a ring-major vertex grid.
///
/// The triangle order is fixed at construction: when `reversed` is set every
/// triangle is written as `(c, b, a)` instead of `(a, b, c)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexStream {
    indices: Vec<i32>,
    ring_len: usize,
    reversed: bool,
}

impl IndexStream {
    #[must_use]
    pub fn new(ring_len: usize, reversed: bool) -> Self {
        Self {
            indices: Vec::new(),
            ring_len,
            reversed,
        }
    }

    #[must_use]
    pub fn with_capacity(ring_len: usize, reversed: bool, triangles: usize) -> Self {
        Self {
            indices: Vec::with_capacity(triangles.saturating_mul(4)),
            ring_len,
            reversed,
        }
    }

    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Vertex index of profile point `point` on ring `ring`.
    #[must_use]
    pub const fn vertex(&self, ring: usize, point: usize) -> usize {
        ring * self.ring_len + point
    }

    /// Appends a triangle given as `(ring, point)` grid coordinates.
    pub fn push_grid_triangle(&mut self, a: (usize, usize), b: (usize, usize), c: (usize, usize)) {
        self.push_triangle(
            self.vertex(a.0, a.1),
            self.vertex(b.0, b.1),
            self.vertex(c.0, c.1),
        );
    }

    /// Appends a triangle given as raw vertex indices.
    pub fn push_triangle(&mut self, a: usize, b: usize, c: usize) {
        let (a, b, c) = if self.reversed { (c, b, a) } else { (a, b, c) };
        self.indices
            .extend_from_slice(&[a as i32, b as i32, c as i32, POLYGON_END]);
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 4
    }

    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.indices
    }

    #[must_use]
    pub fn into_indices(self) -> Vec<i32> {
        self.indices
    }
}

/// Splits a terminated index stream into polygons. Empty polygons are skipped.
pub fn polygons(indices: &[i32]) -> impl Iterator<Item = &[i32]> + '_ {
    indices
        .split(|&i| i == POLYGON_END)
        .filter(|polygon| !polygon.is_empty())
}

/// Iterator returned by [`ExtrusionMesh::primitives`].
#[derive(Debug, Clone)]
pub struct Primitives<'a> {
    mesh: &'a ExtrusionMesh,
    polygon_start: usize,
    normal_start: usize,
    fan: usize,
}

impl Primitives<'_> {
    fn corner(&self, stream_pos: usize, normal_pos: usize) -> Option<PrimitiveVertex> {
        let index = usize::try_from(*self.mesh.indices.get(stream_pos)?).ok()?;
        Some(PrimitiveVertex {
            point: *self.mesh.vertices.get(index)?,
            normal: self.mesh.normals.get(normal_pos).copied().unwrap_or(Vec3::Z),
            tex_coord: self.mesh.tex_coords.get(index).copied().unwrap_or_default(),
        })
    }
}

impl Iterator for Primitives<'_> {
    type Item = [PrimitiveVertex; 3];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.mesh.indices.get(self.polygon_start..)?;
            if rest.is_empty() {
                return None;
            }
            let len = rest.iter().position(|&i| i == POLYGON_END).unwrap_or(rest.len());

            if self.fan + 2 < len {
                let s = self.polygon_start;
                let n = self.normal_start;
                let k = self.fan;
                self.fan += 1;
                return Some([
                    self.corner(s, n)?,
                    self.corner(s + k + 1, n + k + 1)?,
                    self.corner(s + k + 2, n + k + 2)?,
                ]);
            }

            self.polygon_start += len + 1;
            self.normal_start += len;
            self.fan = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> ExtrusionMesh {
        ExtrusionMesh {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            tex_coords: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
            normals: vec![Vec3::Z; 3],
            indices: vec![0, 1, 2, POLYGON_END],
        }
    }

    #[test]
    fn test_valid_triangle_passes() {
        let mesh = single_triangle();
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.corner_count(), 3);
    }

    #[test]
    fn test_default_mesh_is_empty_and_valid() {
        let mesh = ExtrusionMesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounding_box().is_none());
        assert_eq!(mesh.primitives().count(), 0);
        assert_eq!(mesh.validate(), Ok(()));
    }

    #[test]
    fn test_validate_reports_missing_terminator() {
        let mut mesh = single_triangle();
        mesh.indices.pop();
        assert_eq!(mesh.validate(), Err(MeshValidationError::MissingTerminator));
    }

    #[test]
    fn test_validate_reports_out_of_range_index() {
        let mut mesh = single_triangle();
        mesh.indices[1] = 7;
        assert_eq!(
            mesh.validate(),
            Err(MeshValidationError::IndexOutOfRange {
                index: 7,
                position: 1,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn test_validate_reports_normal_mismatch() {
        let mut mesh = single_triangle();
        mesh.normals.pop();
        assert_eq!(
            mesh.validate(),
            Err(MeshValidationError::NormalCountMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_index_stream_applies_order() {
        let mut forward = IndexStream::new(4, false);
        forward.push_grid_triangle((0, 1), (1, 1), (1, 2));
        assert_eq!(forward.as_slice(), &[1, 5, 6, POLYGON_END]);

        let mut reversed = IndexStream::new(4, true);
        reversed.push_grid_triangle((0, 1), (1, 1), (1, 2));
        assert_eq!(reversed.as_slice(), &[6, 5, 1, POLYGON_END]);
        assert_eq!(reversed.triangle_count(), 1);
    }

    #[test]
    fn test_polygons_skip_empty_segments() {
        let stream = [0, 1, 2, POLYGON_END, 2, 1, 3, POLYGON_END];
        let polys: Vec<&[i32]> = polygons(&stream).collect();
        assert_eq!(polys, vec![&[0, 1, 2][..], &[2, 1, 3][..]]);
    }

    #[test]
    fn test_primitives_follow_stream_order() {
        let mut mesh = single_triangle();
        mesh.vertices.push(Point3::new(1.0, 1.0, 0.0));
        mesh.tex_coords.push(Vec2::new(1.0, 1.0));
        mesh.indices.extend_from_slice(&[1, 3, 2, POLYGON_END]);
        mesh.normals.extend_from_slice(&[Vec3::X, Vec3::Y, Vec3::Z]);

        let prims: Vec<_> = mesh.primitives().collect();
        assert_eq!(prims.len(), 2);
        assert_eq!(prims[1][0].point, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(prims[1][0].normal, Vec3::X);
        assert_eq!(prims[1][1].tex_coord, Vec2::new(1.0, 1.0));
        assert_eq!(prims[1][2].normal, Vec3::Z);
    }

    #[test]
    fn test_primitives_fan_larger_polygons() {
        let mut mesh = single_triangle();
        mesh.vertices.push(Point3::new(-1.0, 0.5, 0.0));
        mesh.tex_coords.push(Vec2::ZERO);
        mesh.indices = vec![0, 1, 2, 3, POLYGON_END];
        mesh.normals = vec![Vec3::Z; 4];

        assert_eq!(mesh.primitives().count(), 2);
    }

    #[test]
    fn test_bounding_box_center() {
        let bounds = single_triangle().bounding_box().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(bounds.center, Point3::new(0.5, 0.5, 0.0));
    }
}
