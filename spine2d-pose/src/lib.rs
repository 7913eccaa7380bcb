//! Pose evaluation for Spine-style 2D skeletons.
//!
//! Bone hierarchies with inheritance modes, transform constraints, weighted vertex skinning,
//! Bezier path sampling, skins and bounding-polygon hit tests. Loading asset files, animation
//! timelines and GPU rendering are left to the caller.

#![forbid(unsafe_code)]

mod bounds;
mod builder;
mod error;
mod geometry;
mod ids;
mod model;
mod render;
mod runtime;

pub use bounds::*;
pub use builder::*;
pub use error::*;
pub use geometry::{Aabb, PathPosition, polygon_contains_point, polygon_intersects_segment};
pub use ids::AttachmentId;
pub use model::*;
pub use render::*;
pub use runtime::*;


#[cfg(test)]
mod builder_tests;
