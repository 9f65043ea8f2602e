//! Dirty-flag cache for generated extrusion geometry.
//!
//! The cache holds exactly one generated mesh and the diagnostics of the
//! regeneration that produced it. Any input change marks it [`CacheState::Dirty`];
//! the next read regenerates everything and marks it [`CacheState::Clean`].
//! There is no partial invalidation.
//!
//! # Example
//! ```ignore
//! let mut cache = ExtrusionCache::default();
//! let mesh = cache.get_or_regenerate(|| generate_extrusion(&params, &tess, tol));
//! cache.invalidate();
//! let stats = cache.stats();
//! println!("regenerations: {}, hits: {}", stats.regenerations, stats.hits);
//! ```

use std::mem::size_of;

use super::diagnostics::ExtrusionDiagnostics;
use super::mesh::ExtrusionMesh;
use super::{Point3, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    Clean,
    #[default]
    Dirty,
}

/// Single-entry geometry cache.
///
/// Starts dirty so the first read always generates.
#[derive(Debug, Default)]
pub struct ExtrusionCache {
    state: CacheState,
    mesh: ExtrusionMesh,
    diagnostics: ExtrusionDiagnostics,

    regenerations: usize,
    hits: usize,
    invalidations: usize,
}

/// Cache statistics for diagnostics and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtrusionCacheStats {
    /// Reads that had to regenerate.
    pub regenerations: usize,
    /// Reads served from the cached mesh.
    pub hits: usize,
    /// Calls to [`ExtrusionCache::invalidate`], including redundant ones.
    pub invalidations: usize,
    /// Estimated size of the cached arrays in bytes.
    pub estimated_memory_bytes: usize,
}

impl ExtrusionCacheStats {
    /// Returns the hit rate as a value between 0.0 and 1.0.
    /// Returns 0.0 if the cache has not been read.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.regenerations;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl ExtrusionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> CacheState {
        self.state
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state == CacheState::Dirty
    }

    /// Marks the cached mesh stale. Idempotent.
    pub fn invalidate(&mut self) {
        self.invalidations += 1;
        if self.state == CacheState::Clean {
            log::trace!("extrusion cache invalidated");
        }
        self.state = CacheState::Dirty;
    }

    /// Returns the cached mesh, calling `regenerate` first when dirty.
    ///
    /// The previous mesh is replaced wholesale.
    pub fn get_or_regenerate(
        &mut self,
        regenerate: impl FnOnce() -> (ExtrusionMesh, ExtrusionDiagnostics),
    ) -> &ExtrusionMesh {
        match self.state {
            CacheState::Clean => self.hits += 1,
            CacheState::Dirty => {
                let (mesh, diagnostics) = regenerate();
                self.mesh = mesh;
                self.diagnostics = diagnostics;
                self.regenerations += 1;
                self.state = CacheState::Clean;
            }
        }
        &self.mesh
    }

    /// Diagnostics of the last regeneration, without regenerating.
    #[must_use]
    pub const fn last_diagnostics(&self) -> &ExtrusionDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn stats(&self) -> ExtrusionCacheStats {
        ExtrusionCacheStats {
            regenerations: self.regenerations,
            hits: self.hits,
            invalidations: self.invalidations,
            estimated_memory_bytes: self.estimate_memory_usage(),
        }
    }

    /// Resets counters without touching the cached mesh or its state.
    pub fn reset_counters(&mut self) {
        self.regenerations = 0;
        self.hits = 0;
        self.invalidations = 0;
    }

    /// Drops the cached mesh, resets counters and marks the cache dirty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn estimate_memory_usage(&self) -> usize {
        self.mesh.vertices.len() * size_of::<Point3>()
            + self.mesh.tex_coords.len() * size_of::<Vec2>()
            + self.mesh.normals.len() * size_of::<Vec3>()
            + self.mesh.indices.len() * size_of::<i32>()
    }
}
