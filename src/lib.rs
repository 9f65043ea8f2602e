//! VRML97 `Extrusion` geometry with a dirty-flag cache.
//!
//! [`geom::Extrusion`] owns the node inputs and regenerates vertices, texture
//! coordinates, crease-angle normals and a `-1`-terminated index stream on the
//! first read after any input change. The pipeline itself is available as
//! [`geom::generate_extrusion`] for callers that manage their own caching.
//!
//! The library logs through the `log` facade and never installs a logger.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

pub use geom::{Extrusion, ExtrusionMesh, ExtrusionParams};
