//! Per-corner normals with crease-angle smoothing.
//!
//! Each polygon gets a unit face normal (Newell's method, unweighted by
//! area). A corner's normal is the normalized sum of the face normals of all
//! polygons touching the corner's position whose face normal lies within the
//! crease angle of the corner's own face. Corners are matched by position,
//! not by index, so seams with duplicated vertices still smooth.

use std::collections::HashMap;

use super::mesh::polygons;
use super::triangulation::newell_normal;
use super::{Point3, Tolerance, Vec3};

/// Angular slack in radians on the crease comparison so faces exactly at
/// the threshold, and coplanar faces at crease 0, still smooth.
const CREASE_ANGLE_SLACK: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalGenerator {
    /// Front faces wind counter-clockwise. When `false` face normals are negated.
    pub ccw: bool,
    /// Largest angle in radians between face normals that still smooths.
    pub crease_angle: f64,
    /// Distance under which two vertices count as the same corner position.
    pub weld: Tolerance,
}

/// Normals plus the number of polygons that had no usable face normal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratedNormals {
    pub normals: Vec<Vec3>,
    pub degenerate_faces: usize,
}

impl NormalGenerator {
    #[must_use]
    pub const fn new(ccw: bool, crease_angle: f64) -> Self {
        Self {
            ccw,
            crease_angle,
            weld: Tolerance::WELD,
        }
    }

    /// One normal per non-sentinel entry of `indices`, in stream order.
    #[must_use]
    pub fn generate(&self, vertices: &[Point3], indices: &[i32]) -> GeneratedNormals {
        let faces: Vec<Vec<usize>> = polygons(indices)
            .map(|polygon| {
                polygon
                    .iter()
                    .filter_map(|&i| usize::try_from(i).ok())
                    .filter(|&i| i < vertices.len())
                    .collect()
            })
            .collect();

        let face_normals: Vec<Option<Vec3>> = faces
            .iter()
            .map(|face| {
                let points: Vec<Point3> = face.iter().map(|&i| vertices[i]).collect();
                let n = newell_normal(&points).normalized()?;
                Some(if self.ccw { n } else { n.neg() })
            })
            .collect();
        let degenerate_faces = face_normals.iter().filter(|n| n.is_none()).count();

        let positions = weld_positions(vertices, self.weld);
        let mut faces_at: Vec<Vec<usize>> = vec![Vec::new(); positions.count];
        for (face_id, face) in faces.iter().enumerate() {
            for &vertex in face {
                let bucket = &mut faces_at[positions.ids[vertex]];
                if bucket.last() != Some(&face_id) {
                    bucket.push(face_id);
                }
            }
        }

        let cos_crease = (self.crease_angle.clamp(0.0, std::f64::consts::PI) + CREASE_ANGLE_SLACK)
            .min(std::f64::consts::PI)
            .cos();

        let mut normals = Vec::with_capacity(indices.len());
        for (face_id, face) in faces.iter().enumerate() {
            let own = face_normals[face_id];
            for &vertex in face {
                let mut sum = Vec3::ZERO;
                for &other in &faces_at[positions.ids[vertex]] {
                    let Some(n) = face_normals[other] else {
                        continue;
                    };
                    let smooth = own.is_none_or(|own| own.dot(n) >= cos_crease);
                    if smooth {
                        sum = sum + n;
                    }
                }
                let normal = sum.normalized().or(own).unwrap_or(Vec3::Z);
                normals.push(normal);
            }
        }

        GeneratedNormals {
            normals,
            degenerate_faces,
        }
    }
}

struct WeldedPositions {
    /// Position id per input vertex.
    ids: Vec<usize>,
    count: usize,
}

/// Assigns one id per distinct position, searching neighbouring grid cells
/// so points straddling a cell boundary still match.
fn weld_positions(points: &[Point3], tol: Tolerance) -> WeldedPositions {
    fn quantize(value: f64, inv: f64) -> Option<i64> {
        if !value.is_finite() {
            return None;
        }
        let q = (value * inv).floor();
        Some(q.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    }

    let inv = 1.0 / tol.eps.max(f64::MIN_POSITIVE);
    let mut buckets: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    let mut representatives: Vec<Point3> = Vec::new();
    let mut ids = Vec::with_capacity(points.len());

    for p in points.iter().copied() {
        let key = match (quantize(p.x, inv), quantize(p.y, inv), quantize(p.z, inv)) {
            (Some(kx), Some(ky), Some(kz)) => Some((kx, ky, kz)),
            _ => None,
        };

        let found = key.and_then(|(kx, ky, kz)| {
            (-1i64..=1).find_map(|dx| {
                (-1i64..=1).find_map(|dy| {
                    (-1i64..=1).find_map(|dz| {
                        buckets
                            .get(&(kx.saturating_add(dx), ky.saturating_add(dy), kz.saturating_add(dz)))?
                            .iter()
                            .copied()
                            .find(|&id| tol.approx_eq_point3(representatives[id], p))
                    })
                })
            })
        });

        let id = found.unwrap_or_else(|| {
            let id = representatives.len();
            representatives.push(p);
            if let Some(key) = key {
                buckets.entry(key).or_default().push(id);
            }
            id
        });
        ids.push(id);
    }

    WeldedPositions {
        ids,
        count: representatives.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::mesh::POLYGON_END;
    use std::f64::consts::PI;

    /// Two triangles folded 90 degrees along the shared edge (0,0,0)-(0,1,0).
    fn folded_pair() -> (Vec<Point3>, Vec<i32>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let indices = vec![0, 2, 1, POLYGON_END, 0, 1, 3, POLYGON_END];
        (vertices, indices)
    }

    #[test]
    fn test_zero_crease_keeps_faces_flat() {
        let (vertices, indices) = folded_pair();
        let out = NormalGenerator::new(true, 0.0).generate(&vertices, &indices);

        assert_eq!(out.normals.len(), 6);
        for n in &out.normals[..3] {
            assert!((n.z - 1.0).abs() < 1e-12);
        }
        for n in &out.normals[3..] {
            assert!((n.x - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_wide_crease_smooths_shared_corners() {
        let (vertices, indices) = folded_pair();
        let out = NormalGenerator::new(true, PI).generate(&vertices, &indices);

        let diagonal = Vec3::new(1.0, 0.0, 1.0).normalized().unwrap();
        // Corner 0 and 1 of both faces sit on the fold.
        for pos in [0, 2, 3, 4] {
            assert!((out.normals[pos] - diagonal).length() < 1e-12, "corner {pos}");
        }
        // Unshared corners keep their own face normal.
        assert!((out.normals[1] - Vec3::Z).length() < 1e-12);
        assert!((out.normals[5] - Vec3::X).length() < 1e-12);
    }

    #[test]
    fn test_crease_threshold_splits_at_angle() {
        let (vertices, indices) = folded_pair();
        let below = NormalGenerator::new(true, PI / 2.0 - 0.01).generate(&vertices, &indices);
        let above = NormalGenerator::new(true, PI / 2.0 + 0.01).generate(&vertices, &indices);

        assert!((below.normals[0].z - 1.0).abs() < 1e-12);
        assert!(above.normals[0].x > 0.5);
    }

    #[test]
    fn test_zero_crease_splits_nearly_coplanar_faces() {
        let tilt = 1e-4;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, tilt),
        ];
        let indices = vec![0, 2, 1, POLYGON_END, 0, 1, 3, POLYGON_END];

        let flat = NormalGenerator::new(true, 0.0).generate(&vertices, &indices);
        assert_eq!(flat.normals[0], Vec3::Z);
        assert!(flat.normals[3].x > 0.5 * tilt);

        let smooth = NormalGenerator::new(true, 1e-3).generate(&vertices, &indices);
        assert!(smooth.normals[0].x > 0.25 * tilt);
    }

    #[test]
    fn test_clockwise_flag_negates_normals() {
        let (vertices, indices) = folded_pair();
        let ccw = NormalGenerator::new(true, 0.0).generate(&vertices, &indices);
        let cw = NormalGenerator::new(false, 0.0).generate(&vertices, &indices);

        for (a, b) in ccw.normals.iter().zip(&cw.normals) {
            assert!((*a + *b).length() < 1e-12);
        }
    }

    #[test]
    fn test_duplicated_positions_are_matched() {
        let mut vertices = folded_pair().0;
        vertices.push(Point3::new(0.0, 0.0, 0.0));
        vertices.push(Point3::new(0.0, 1.0, 0.0));
        let indices = vec![0, 2, 1, POLYGON_END, 4, 5, 3, POLYGON_END];

        let out = NormalGenerator::new(true, PI).generate(&vertices, &indices);
        assert!(out.normals[0].x > 0.5 && out.normals[0].z > 0.5);
        assert!(out.normals[3].x > 0.5 && out.normals[3].z > 0.5);
    }

    #[test]
    fn test_degenerate_face_gets_fallback_normal() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let out = NormalGenerator::new(true, 0.0).generate(&vertices, &[0, 1, 2, POLYGON_END]);

        assert_eq!(out.degenerate_faces, 1);
        assert_eq!(out.normals, vec![Vec3::Z; 3]);
    }

    #[test]
    fn test_empty_stream() {
        let out = NormalGenerator::new(true, 0.5).generate(&[], &[]);
        assert!(out.normals.is_empty());
        assert_eq!(out.degenerate_faces, 0);
    }
}
