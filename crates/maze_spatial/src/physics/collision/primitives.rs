//! Primitive collision shapes and intersection algorithms
//!
//! Provides basic geometric primitives (rays, spheres, triangles) with
//! intersection tests shared by the tree traversal and gameplay queries.

use crate::foundation::math::constants::{BARYCENTRIC_EPSILON, DETERMINANT_EPSILON, MIN_HIT_DISTANCE};
use crate::foundation::math::utils::safe_normalize;
use crate::foundation::math::Vec3;
use crate::spatial::AABB;

/// A ray for ray casting and picking
///
/// The direction is kept as given. Hit distances are measured in units of
/// its length, so callers wanting Euclidean distances pass a unit direction
/// (see [`Ray::normalized`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Creates a ray with a unit-length direction
    pub fn normalized(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: safe_normalize(direction),
        }
    }

    /// Get a point along the ray at parameter t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray intersection test against a triangle buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Ray parameter of the hit (non-negative)
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
    /// Unit geometric normal, oriented towards the ray origin
    pub normal: Vec3,
    /// Index of the hit triangle in the buffer the query ran against
    pub triangle_index: usize,
}

impl RayHit {
    /// Whether this hit should win over `other` in a nearest-hit search
    ///
    /// Equal distances resolve to the lower triangle index, so the answer
    /// does not depend on which order candidates are visited in.
    pub fn is_nearer_than(&self, other: &RayHit) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance && self.triangle_index < other.triangle_index)
    }

    /// Pick the nearer of two optional hits, treating `None` as farthest
    pub fn nearest(a: Option<RayHit>, b: Option<RayHit>) -> Option<RayHit> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.is_nearer_than(&a) { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Result of a ray intersection test against a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxHit {
    /// Ray parameter of the entry point (0 when starting inside)
    pub distance: f32,
    /// Entry point in world space
    pub point: Vec3,
    /// Outward normal of the entry face, zero when starting inside
    pub normal: Vec3,
}

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere touches or overlaps a box
    ///
    /// Clamps the center into the box to find the box point closest to the
    /// sphere, then compares that distance against the radius.
    pub fn overlaps_box(&self, aabb: &AABB) -> bool {
        if aabb.is_empty() {
            return false;
        }
        let closest = aabb.closest_point(self.center);
        (closest - self.center).magnitude() <= self.radius
    }
}

/// A triangle for ray queries
///
/// The unit normal follows the winding, `normalize(cross(v1 - v0, v2 - v0))`,
/// and is computed once at construction. Zero-area triangles store a zero
/// normal and are never hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Vec3; 3],
    normal: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = safe_normalize((v1 - v0).cross(&(v2 - v0)));
        Self {
            vertices: [v0, v1, v2],
            normal,
        }
    }

    /// The three vertices in winding order
    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    /// Unit normal (right-hand rule), zero for degenerate triangles
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        let [v0, v1, v2] = self.vertices;
        (v0 + v1 + v2) / 3.0
    }

    /// Tight bounds of the three vertices
    pub fn bounds(&self) -> AABB {
        AABB::from_points(self.vertices)
    }

    /// Möller–Trumbore ray-triangle intersection
    ///
    /// Returns `(t, u, v)` with barycentric `u, v` on a hit. Edges and
    /// vertices count as inside, widened by [`BARYCENTRIC_EPSILON`], so a ray
    /// through an edge or vertex shared by several triangles hits at least
    /// one of them and never slips through the crack rounding would open.
    /// Hits at or before [`MIN_HIT_DISTANCE`] are rejected.
    ///
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by Möller & Trumbore
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to (or coplanar with) the triangle, or zero area
        if a.abs() < DETERMINANT_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(&h);
        if !(-BARYCENTRIC_EPSILON..=1.0 + BARYCENTRIC_EPSILON).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < -BARYCENTRIC_EPSILON || u + v > 1.0 + BARYCENTRIC_EPSILON {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t > MIN_HIT_DISTANCE {
            Some((t, u, v))
        } else {
            None
        }
    }

    /// Full hit record for a ray, tagged with this triangle's buffer index
    ///
    /// The normal is flipped to face the ray origin when the ray arrives
    /// from the back side.
    pub fn hit(&self, ray: &Ray, triangle_index: usize) -> Option<RayHit> {
        let (t, _, _) = self.intersect_ray(ray)?;
        let normal = if self.normal.dot(&ray.direction) > 0.0 {
            -self.normal
        } else {
            self.normal
        };
        Some(RayHit {
            distance: t,
            point: ray.point_at(t),
            normal,
            triangle_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_normal_follows_winding() {
        assert_relative_eq!(unit_triangle().normal(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);

        let [v0, v1, v2] = *unit_triangle().vertices();
        let reversed = Triangle::new(v0, v2, v1);
        assert_relative_eq!(reversed.normal(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_intersect_should_hit_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = unit_triangle().hit(&ray, 7).expect("ray should hit");
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-6);
        assert_relative_eq!(hit.point, Vec3::zeros(), epsilon = 1e-6);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_eq!(hit.triangle_index, 7);
    }

    #[test]
    fn test_back_face_hit_flips_normal_towards_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::z());
        let hit = unit_triangle().hit(&ray, 0).expect("back faces are hit too");
        assert_relative_eq!(hit.distance, 1.0, epsilon = 1e-6);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert!(hit.normal.dot(&ray.direction) <= 0.0);
    }

    #[test]
    fn test_intersect_should_miss_parallel() {
        let ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::x());
        assert!(unit_triangle().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_intersect_should_miss_outside() {
        let ray = Ray::new(Vec3::new(1.0, 1.0, -1.0), Vec3::z());
        assert!(unit_triangle().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_intersect_should_miss_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::z());
        assert!(unit_triangle().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_origin_on_surface_is_not_a_hit() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert!(unit_triangle().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_edges_and_vertices_are_inside() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let down = Vec3::new(0.0, 0.0, -1.0);
        // On edge v0-v1 (v = 0), on edge v0-v2 (u = 0), and at vertex v1 (u = 1).
        for p in [Vec3::new(0.5, 0.0, 1.0), Vec3::new(0.0, 0.5, 1.0), Vec3::new(1.0, 0.0, 1.0)] {
            assert!(tri.intersect_ray(&Ray::new(p, down)).is_some(), "{p:?} should hit");
        }
    }

    #[test]
    fn test_clear_misses_outside_the_tolerance() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let down = Vec3::new(0.0, 0.0, -1.0);
        for p in [Vec3::new(0.5, -0.001, 1.0), Vec3::new(-0.001, 0.5, 1.0), Vec3::new(0.501, 0.501, 1.0)] {
            assert!(tri.intersect_ray(&Ray::new(p, down)).is_none(), "{p:?} should miss");
        }
    }

    #[test]
    fn test_rays_at_a_shared_vertex_never_slip_through() {
        // Six triangles of a tiled floor meet at (0.7, 0, 1.4).
        let s = 0.7_f32;
        let corner = |i: f32, j: f32| Vec3::new(i * s, 0.0, j * s);
        let fan = [
            Triangle::new(corner(0.0, 1.0), corner(1.0, 1.0), corner(1.0, 2.0)),
            Triangle::new(corner(0.0, 1.0), corner(1.0, 2.0), corner(0.0, 2.0)),
            Triangle::new(corner(1.0, 1.0), corner(2.0, 2.0), corner(1.0, 2.0)),
            Triangle::new(corner(0.0, 2.0), corner(1.0, 2.0), corner(1.0, 3.0)),
            Triangle::new(corner(1.0, 2.0), corner(2.0, 2.0), corner(2.0, 3.0)),
            Triangle::new(corner(1.0, 2.0), corner(2.0, 3.0), corner(1.0, 3.0)),
        ];
        let target = corner(1.0, 2.0);
        let origins = [
            Vec3::new(5.869_793, 0.939_268, 4.590_275),
            Vec3::new(-3.1, 2.2, 0.4),
            Vec3::new(0.2, 4.7, 9.3),
            Vec3::new(7.7, 0.51, -1.9),
        ];
        for origin in origins {
            let ray = Ray::normalized(origin, target - origin);
            assert!(fan.iter().any(|t| t.intersect_ray(&ray).is_some()), "{origin:?}");
        }
    }

    #[test]
    fn test_shared_edge_hits_both_triangles_at_same_distance() {
        // Quad split along its diagonal from (0,0) to (1,1).
        let a = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        );
        let b = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let ray = Ray::new(Vec3::new(0.5, 0.5, 3.0), Vec3::new(0.0, 0.0, -1.0));
        let hit_a = a.hit(&ray, 0).expect("diagonal belongs to the first triangle");
        let hit_b = b.hit(&ray, 1).expect("diagonal belongs to the second triangle");
        assert_relative_eq!(hit_a.distance, hit_b.distance, epsilon = 1e-6);
        assert_eq!(RayHit::nearest(Some(hit_b), Some(hit_a)).map(|h| h.triangle_index), Some(0));
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let sliver = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(sliver.normal(), Vec3::zeros());
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sliver.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_ray_normalized_and_point_at() {
        let ray = Ray::normalized(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 4.0));
        assert_relative_eq!(ray.direction.magnitude(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(ray.point_at(5.0), Vec3::new(1.0, 3.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn test_nearest_treats_none_as_farthest() {
        let near = RayHit {
            distance: 1.0,
            point: Vec3::zeros(),
            normal: Vec3::z(),
            triangle_index: 3,
        };
        let far = RayHit { distance: 2.0, triangle_index: 0, ..near };
        assert_eq!(RayHit::nearest(None, Some(far)), Some(far));
        assert_eq!(RayHit::nearest(Some(near), None), Some(near));
        assert_eq!(RayHit::nearest(Some(far), Some(near)), Some(near));
        assert_eq!(RayHit::nearest(None, None), None);
    }

    #[test]
    fn test_sphere_overlaps_box() {
        let aabb = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        assert!(BoundingSphere::new(Vec3::new(3.0, 1.0, 1.0), 1.5).overlaps_box(&aabb));
        assert!(!BoundingSphere::new(Vec3::new(3.0, 1.0, 1.0), 0.9).overlaps_box(&aabb));
        assert!(BoundingSphere::new(Vec3::new(3.0, 1.0, 1.0), 1.0).overlaps_box(&aabb));
        assert!(BoundingSphere::new(Vec3::new(1.0, 1.0, 1.0), 0.1).overlaps_box(&aabb));
        assert!(!BoundingSphere::new(Vec3::zeros(), 10.0).overlaps_box(&AABB::empty()));
    }
}
