mod cache;
mod caps;
mod core;
mod diagnostics;
mod extrusion;
mod frame;
mod mesh;
mod metrics;
mod node;
mod normals;
mod triangulation;
mod walls;

pub use cache::{CacheState, ExtrusionCache, ExtrusionCacheStats};
pub use caps::{CapFlags, CapSide, cap_ring, emit_caps};
pub use self::core::{BBox, Point3, Rotation, Tolerance, Transform, Vec2, Vec3};
pub use diagnostics::ExtrusionDiagnostics;
pub use extrusion::{ExtrusionParams, RingLayout, generate_extrusion};
pub use frame::{
    ExtrusionFrame, FrameFallbacks, SpineFrames, WindingCounter, build_spine_frames,
    clamped_override,
};
pub use mesh::{
    ExtrusionBounds, ExtrusionMesh, IndexStream, MeshValidationError, POLYGON_END,
    PrimitiveVertex, Primitives, polygons,
};
pub use metrics::{ExtrusionMetrics, ExtrusionTimingReport, TimingBucket};
pub use node::Extrusion;
pub use normals::{GeneratedNormals, NormalGenerator};
pub use triangulation::{EarClipTessellator, PolygonTessellator, TessellationError, newell_normal};
pub use walls::emit_walls;

#[cfg(test)]
mod tests;
