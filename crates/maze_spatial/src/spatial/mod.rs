//! Spatial partitioning data structures
//!
//! Axis-aligned boxes, mesh ingestion, and the bounding volume hierarchy
//! used for ray casting against static maze geometry.

mod aabb;
mod bvh;
mod mesh;

pub use aabb::AABB;
pub use bvh::{Bvh, BvhConfig, BvhNode, BvhStats, NodeId, TraversalStats};
pub use mesh::{MeshError, TriangleMesh};
