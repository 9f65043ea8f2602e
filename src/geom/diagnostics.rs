//! Diagnostics for extrusion generation.
//!
//! Every regeneration produces an [`ExtrusionDiagnostics`] next to the mesh.
//! Generation never fails, so this is where degraded input shows up:
//!
//! - Frame fallbacks (coincident spine points, parallel segments, synthesized axes)
//! - Continuity corrections between consecutive spine frames
//! - Non-convex caps that could not be tessellated and were fanned instead
//! - Degenerate faces that produced no usable normal
//!
//! # Example
//!
//! ```ignore
//! let mut node = Extrusion::default();
//! let _ = node.vertices();
//! let diag = node.diagnostics();
//! if !diag.is_clean() {
//!     log::warn!("extrusion degraded: {}", diag.summary());
//! }
//! ```

use std::fmt;

use super::frame::FrameFallbacks;
use super::metrics::ExtrusionTimingReport;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtrusionDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub wall_triangle_count: usize,
    pub begin_cap_triangle_count: usize,
    pub end_cap_triangle_count: usize,

    /// Spine points whose tangent collapsed and fell back to the vertical axis.
    pub degenerate_tangent_count: usize,

    /// Spine points whose neighbouring segments were anti-parallel, so the
    /// previous frame's third axis was reused.
    pub parallel_reference_count: usize,

    /// Spine points whose third axis had to be synthesized from the tangent.
    pub synthesized_axis_count: usize,

    /// Spine points whose frame was re-picked to stay close to the previous one.
    pub continuity_correction_count: usize,

    /// Caps whose tessellation failed and were fanned instead.
    pub tessellation_fallback_count: usize,

    /// Polygons with a zero-length face normal.
    pub degenerate_face_count: usize,

    /// Final value of the winding counter.
    pub winding_counter: i32,

    /// Whether emitted triangles use reversed index order.
    pub reversed_winding: bool,

    /// Only populated when the `extrusion_metrics` feature is enabled.
    pub timing: Option<ExtrusionTimingReport>,

    pub warnings: Vec<String>,
}

impl ExtrusionDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_frame_fallbacks(&mut self, fallbacks: FrameFallbacks) {
        self.degenerate_tangent_count = fallbacks.degenerate_tangents;
        self.parallel_reference_count = fallbacks.parallel_references;
        self.synthesized_axis_count = fallbacks.synthesized_axes;
        self.continuity_correction_count = fallbacks.continuity_corrections;
    }

    /// Total number of frame fallbacks and corrections.
    #[must_use]
    pub fn frame_fallback_count(&self) -> usize {
        self.degenerate_tangent_count
            + self.parallel_reference_count
            + self.synthesized_axis_count
            + self.continuity_correction_count
    }

    #[must_use]
    pub fn cap_triangle_count(&self) -> usize {
        self.begin_cap_triangle_count + self.end_cap_triangle_count
    }

    /// `true` when no tessellation fallback, degenerate face or warning was recorded.
    ///
    /// Frame fallbacks alone do not make a mesh unclean: a spine along a
    /// world axis routinely synthesizes its third axis.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.tessellation_fallback_count == 0
            && self.degenerate_face_count == 0
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Short single-line form for logging: `"V:{vertices} T:{triangles} [issues...]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.cap_triangle_count() > 0 {
            parts.push(format!("caps:{}", self.cap_triangle_count()));
        }
        if self.reversed_winding {
            parts.push("reversed".to_string());
        }
        if self.degenerate_tangent_count > 0 {
            parts.push(format!("degenerate-tangent:{}", self.degenerate_tangent_count));
        }
        if self.parallel_reference_count > 0 {
            parts.push(format!("parallel:{}", self.parallel_reference_count));
        }
        if self.synthesized_axis_count > 0 {
            parts.push(format!("synthesized:{}", self.synthesized_axis_count));
        }
        if self.continuity_correction_count > 0 {
            parts.push(format!("continuity:{}", self.continuity_correction_count));
        }
        if self.tessellation_fallback_count > 0 {
            parts.push(format!("cap-fallback:{}", self.tessellation_fallback_count));
        }
        if self.degenerate_face_count > 0 {
            parts.push(format!("degenerate-face:{}", self.degenerate_face_count));
        }

        parts.join(" ")
    }
}

impl fmt::Display for ExtrusionDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extrusion Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(
            f,
            "  Triangles: {} (walls {}, caps {})",
            self.triangle_count,
            self.wall_triangle_count,
            self.cap_triangle_count()
        )?;
        writeln!(
            f,
            "  Winding: {} ({})",
            self.winding_counter,
            if self.reversed_winding { "reversed" } else { "forward" }
        )?;

        if self.frame_fallback_count() > 0 {
            writeln!(f, "  Frame fallbacks:")?;
            if self.degenerate_tangent_count > 0 {
                writeln!(f, "    - Degenerate tangents: {}", self.degenerate_tangent_count)?;
            }
            if self.parallel_reference_count > 0 {
                writeln!(f, "    - Parallel segments: {}", self.parallel_reference_count)?;
            }
            if self.synthesized_axis_count > 0 {
                writeln!(f, "    - Synthesized axes: {}", self.synthesized_axis_count)?;
            }
            if self.continuity_correction_count > 0 {
                writeln!(f, "    - Continuity corrections: {}", self.continuity_correction_count)?;
            }
        }

        if self.tessellation_fallback_count > 0 {
            writeln!(f, "  Cap tessellation fallbacks: {}", self.tessellation_fallback_count)?;
        }
        if self.degenerate_face_count > 0 {
            writeln!(f, "  Degenerate faces: {}", self.degenerate_face_count)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        writeln!(f, "  Status: {}", if self.is_clean() { "CLEAN" } else { "DEGRADED" })
    }
}
