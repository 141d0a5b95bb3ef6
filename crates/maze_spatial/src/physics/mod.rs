//! Physics module for collision detection
//!
//! Primitive intersection tests, gameplay colliders, and the direct
//! collision queries the gameplay layer runs every tick.

pub mod collision;
pub mod collision_queries;

pub use collision::{
    BoundingSphere,
    BoxHit,
    Collider,
    Ray,
    RayHit,
    Triangle,
};
pub use collision_queries::{
    box_overlaps,
    closest_point_on_box,
    point_in_box,
    ray_vs_box,
    sphere_overlaps_box,
};
