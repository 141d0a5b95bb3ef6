//! Gameplay colliders
//!
//! A collider stores its box relative to the entity position and is moved
//! into world space on every query. Entities move between ticks, so the
//! world-space box is never cached.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::spatial::AABB;
use super::primitives::{BoundingSphere, BoxHit, Ray};

/// Half-width of the pickup box (keys and other small trap items)
const PICKUP_HALF_WIDTH: f32 = 0.2;

/// Height of the pickup box
const PICKUP_HEIGHT: f32 = 0.5;

/// Box collider attached to a gameplay entity (player, wall segment, trap)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Entity position in world space
    pub position: Vec3,
    /// Bounds relative to `position`
    pub local_bounds: AABB,
}

impl Collider {
    /// Creates a collider from a position and position-relative bounds
    pub fn new(position: Vec3, local_bounds: AABB) -> Self {
        Self { position, local_bounds }
    }

    /// Player collider: an upright cylinder of `radius` and `height`
    /// approximated by its bounding box, standing on `position`
    pub fn player(position: Vec3, radius: f32, height: f32) -> Self {
        Self::new(
            position,
            AABB::new(Vec3::new(-radius, 0.0, -radius), Vec3::new(radius, height, radius)),
        )
    }

    /// Wall collider of `size` = (width, height, depth), centered on
    /// `position` in x/z and standing on it in y
    pub fn wall(position: Vec3, size: Vec3) -> Self {
        Self::upright_box(position, size)
    }

    /// Small box used by keys and other collectible trap items
    pub fn pickup(position: Vec3) -> Self {
        Self::upright_box(
            position,
            Vec3::new(PICKUP_HALF_WIDTH * 2.0, PICKUP_HEIGHT, PICKUP_HALF_WIDTH * 2.0),
        )
    }

    fn upright_box(position: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(position, AABB::from_center_extents(Vec3::new(0.0, half.y, 0.0), half))
    }

    /// Move the collider; the bounds follow on the next query
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Bounds in world space, recomputed from the current position
    pub fn world_aabb(&self) -> AABB {
        self.local_bounds.translated(self.position)
    }

    /// Box-box test against another collider
    pub fn overlaps(&self, other: &Collider) -> bool {
        self.world_aabb().overlaps(&other.world_aabb())
    }

    /// Sphere-box test, e.g. player proximity against a trap trigger
    pub fn overlaps_sphere(&self, sphere: &BoundingSphere) -> bool {
        sphere.overlaps_box(&self.world_aabb())
    }

    /// Point-in-box test
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.world_aabb().contains_point(point)
    }

    /// Ray-box test, used for gameplay picking
    pub fn intersect_ray(&self, ray: &Ray) -> Option<BoxHit> {
        self.world_aabb().intersect_ray(ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_player_hits_wall_until_moved_away() {
        let mut player = Collider::player(Vec3::new(1.0, 0.0, 1.0), 0.5, 2.0);
        let wall = Collider::wall(Vec3::new(2.0, 0.0, 1.0), Vec3::new(2.0, 3.0, 0.2));

        assert!(player.overlaps(&wall));
        assert!(wall.overlaps(&player));

        player.set_position(Vec3::new(5.0, 0.0, 5.0));
        assert!(!player.overlaps(&wall));
    }

    #[test]
    fn test_world_aabb_follows_position() {
        let mut wall = Collider::wall(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 3.0, 1.0));
        assert_eq!(wall.world_aabb().min, Vec3::new(-2.0, 0.0, -0.5));
        assert_eq!(wall.world_aabb().max, Vec3::new(2.0, 3.0, 0.5));

        wall.set_position(Vec3::new(10.0, 1.0, 0.0));
        assert_eq!(wall.world_aabb().min, Vec3::new(8.0, 1.0, -0.5));
        assert_eq!(wall.world_aabb().max, Vec3::new(12.0, 4.0, 0.5));
        assert_eq!(wall.local_bounds.min, Vec3::new(-2.0, 0.0, -0.5));
    }

    #[test]
    fn test_pickup_triggers_on_player_sphere() {
        let key = Collider::pickup(Vec3::new(0.0, 0.0, 0.0));
        assert!(key.overlaps_sphere(&BoundingSphere::new(Vec3::zeros(), 0.5)));
        assert!(key.overlaps_sphere(&BoundingSphere::new(Vec3::new(0.6, 0.25, 0.0), 0.45)));
        assert!(!key.overlaps_sphere(&BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 0.5)));
    }

    #[test]
    fn test_contains_point_and_ray_pick() {
        let wall = Collider::wall(Vec3::new(0.0, 0.0, -3.0), Vec3::new(2.0, 2.0, 0.2));
        assert!(wall.contains_point(Vec3::new(0.0, 1.0, -3.0)));
        assert!(!wall.contains_point(Vec3::new(0.0, 2.5, -3.0)));

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = wall.intersect_ray(&ray).expect("looking straight at the wall");
        assert_relative_eq!(hit.distance, 2.9, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }
}
