//! Direct (non-hierarchical) collision queries
//!
//! Gameplay checks run every tick against a handful of moving colliders, so
//! they test world-space volumes directly instead of going through a tree.
//! Each function is a pure function of its arguments and reuses the AABB and
//! ray primitives, so gameplay picking agrees with rendering visibility on
//! every edge case.

use crate::foundation::math::Vec3;
use crate::spatial::AABB;
use super::collision::{BoundingSphere, BoxHit, Ray};

/// Box-box overlap; touching boxes overlap
pub fn box_overlaps(a: &AABB, b: &AABB) -> bool {
    a.overlaps(b)
}

/// Sphere-box overlap
///
/// True when the box point closest to `center` lies within `radius`.
pub fn sphere_overlaps_box(center: Vec3, radius: f32, aabb: &AABB) -> bool {
    BoundingSphere::new(center, radius).overlaps_box(aabb)
}

/// Inclusive point-in-box test
pub fn point_in_box(point: Vec3, aabb: &AABB) -> bool {
    aabb.contains_point(point)
}

/// Ray-box slab test, the same routine the tree traversal prunes with
pub fn ray_vs_box(ray: &Ray, aabb: &AABB) -> Option<BoxHit> {
    aabb.intersect_ray(ray)
}

/// Point of `aabb` closest to `point`
pub fn closest_point_on_box(point: Vec3, aabb: &AABB) -> Vec3 {
    aabb.closest_point(point)
}
