//! Opt-in timing hooks for extrusion generation.
//!
//! Timing is only collected when the `extrusion_metrics` feature is enabled
//! and the target is not WASM (`std::time::Instant` is unavailable there).
//! Otherwise every call compiles down to invoking the closure.
//!
//! # Usage
//!
//! ```ignore
//! let mut metrics = ExtrusionMetrics::default();
//! metrics.begin();
//! let frames = metrics.time(TimingBucket::Frames, || build_spine_frames(&spine, closed, tol));
//! if let Some(report) = metrics.end() {
//!     println!("frames: {} ns", report.frames_ns);
//! }
//! ```

cfg_if::cfg_if! {
    if #[cfg(all(feature = "extrusion_metrics", not(target_arch = "wasm32")))] {
        const METRICS_ENABLED: bool = true;
    } else {
        const METRICS_ENABLED: bool = false;
    }
}

/// Generation phases that accumulate time separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Frame Builder pass over the spine.
    Frames,
    /// Sweeping the cross-section through every frame.
    Sweep,
    /// Begin/end cap triangulation, including tessellation.
    Caps,
    /// Wall quads between rings.
    Walls,
    /// Crease-angle normal generation.
    Normals,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtrusionTimingReport {
    pub frames_ns: u64,
    pub sweep_ns: u64,
    pub caps_ns: u64,
    pub walls_ns: u64,
    pub normals_ns: u64,
}

impl ExtrusionTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.frames_ns
            .saturating_add(self.sweep_ns)
            .saturating_add(self.caps_ns)
            .saturating_add(self.walls_ns)
            .saturating_add(self.normals_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::Frames => &mut self.frames_ns,
            TimingBucket::Sweep => &mut self.sweep_ns,
            TimingBucket::Caps => &mut self.caps_ns,
            TimingBucket::Walls => &mut self.walls_ns,
            TimingBucket::Normals => &mut self.normals_ns,
        }
    }
}

/// Accumulator for one regeneration.
///
/// When metrics are disabled all methods are no-ops and [`end`](Self::end)
/// returns `None`.
#[derive(Debug, Default)]
pub struct ExtrusionMetrics {
    report: ExtrusionTimingReport,
}

impl ExtrusionMetrics {
    #[must_use]
    pub const fn enabled() -> bool {
        METRICS_ENABLED
    }

    pub fn begin(&mut self) {
        self.report = ExtrusionTimingReport::default();
    }

    #[must_use]
    pub fn end(&self) -> Option<ExtrusionTimingReport> {
        METRICS_ENABLED.then(|| self.report.clone())
    }

    /// Runs `f` and adds its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "extrusion_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            self.add_nanos(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "extrusion_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg_attr(
        not(all(feature = "extrusion_metrics", not(target_arch = "wasm32"))),
        allow(dead_code)
    )]
    fn add_nanos(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = self.report.bucket_mut(bucket);
        *slot = slot.saturating_add(nanos);
    }
}
