//! # Maze Spatial
//!
//! Geometry and collision core for a first-person maze game.
//!
//! ## Features
//!
//! - **Bounding Volume Hierarchy**: median-split tree over static maze
//!   triangles with pruned nearest-hit ray queries
//! - **Primitive Tests**: ray-box slab test, Möller-Trumbore ray-triangle
//! - **Gameplay Collision**: box-box, sphere-box and point-box checks on
//!   position-relative entity colliders
//! - **Configuration**: tree limits and log level from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust
//! use maze_spatial::prelude::*;
//!
//! let floor = Triangle::new(
//!     Vec3::new(-1.0, 0.0, -1.0),
//!     Vec3::new(1.0, 0.0, -1.0),
//!     Vec3::new(0.0, 0.0, 1.0),
//! );
//! let bvh = Bvh::build(vec![floor]);
//!
//! let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
//! let hit = bvh.intersect_ray(&ray).expect("ray points at the floor");
//! assert_eq!(hit.triangle_index, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod physics;
pub mod spatial;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SpatialConfig},
        foundation::math::Vec3,
        physics::{BoundingSphere, BoxHit, Collider, Ray, RayHit, Triangle},
        spatial::{Bvh, BvhConfig, TraversalStats, TriangleMesh, AABB},
    };
}
