//! Axis-aligned bounding boxes
//!
//! The box type every higher layer builds on: tree node bounds, collider
//! volumes and the slab test used by both rendering and gameplay picking.

use serde::{Deserialize, Serialize};

use crate::foundation::math::constants::{PARALLEL_EPSILON, SLAB_TOLERANCE};
use crate::foundation::math::Vec3;
use crate::physics::collision::{BoxHit, Ray};

/// Axis-Aligned Bounding Box for spatial queries
///
/// `min[i] <= max[i]` on every axis; zero-volume boxes are valid. The only
/// box violating that is the *empty* box returned by [`AABB::empty`] and by
/// [`AABB::from_points`] on no points, and every query against it says "no".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The empty box, identity element of [`AABB::union`]
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box enclosing all points, or the empty box for no points
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        points.into_iter().fold(Self::empty(), |bounds, p| Self {
            min: bounds.min.inf(&p),
            max: bounds.max.sup(&p),
        })
    }

    /// True for the empty box (no point is inside it)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point (faces included)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB overlaps another AABB
    ///
    /// Touching boxes count as overlapping.
    pub fn overlaps(&self, other: &AABB) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Smallest box enclosing both boxes
    #[must_use]
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// This box moved by `offset`
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> AABB {
        if self.is_empty() {
            return *self;
        }
        AABB {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Point of this box closest to `point` (the point itself when inside)
    ///
    /// The empty box has no points; `point` is returned unchanged.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        if self.is_empty() {
            return point;
        }
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Test ray intersection with this AABB using the slab method
    ///
    /// Rays start at parameter 0, so boxes behind the origin are missed. An
    /// axis whose direction component is below [`PARALLEL_EPSILON`] is treated
    /// as parallel: the ray misses unless the origin lies inside that slab.
    /// Grazing rays (entry equals exit) are hits.
    ///
    /// The returned normal is the outward normal of the face the ray enters
    /// through. A ray starting inside the box (or on a face it leaves through)
    /// hits at distance 0 with a zero normal.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<BoxHit> {
        if self.is_empty() {
            return None;
        }

        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;
        let mut entry_axis = None;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction.abs() < PARALLEL_EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let mut t1 = (self.min[axis] - origin) / direction;
            let mut t2 = (self.max[axis] - origin) / direction;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            if t1 >= t_min {
                t_min = t1;
                entry_axis = Some(axis);
            }
            t_max = t_max.min(t2);

            if t_min > t_max {
                return None;
            }
        }

        let mut normal = Vec3::zeros();
        if let Some(axis) = entry_axis {
            normal[axis] = -ray.direction[axis].signum();
        }

        Some(BoxHit {
            distance: t_min,
            point: ray.point_at(t_min),
            normal,
        })
    }

    /// Conservative slab test used to prune tree traversal
    ///
    /// Accepts everything [`AABB::intersect_ray`] accepts, and also rays
    /// that miss by no more than [`SLAB_TOLERANCE`] relative to the exit
    /// distance. A flat box around coplanar triangles then never rejects a
    /// ray through one of their edges or vertices.
    pub fn may_intersect_ray(&self, ray: &Ray) -> bool {
        if self.is_empty() {
            return false;
        }

        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction.abs() < PARALLEL_EPSILON {
                let slack = SLAB_TOLERANCE
                    * self.min[axis].abs().max(self.max[axis].abs()).max(1.0);
                if origin < self.min[axis] - slack || origin > self.max[axis] + slack {
                    return false;
                }
                continue;
            }

            let t1 = (self.min[axis] - origin) / direction;
            let t2 = (self.max[axis] - origin) / direction;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }

        t_min <= t_max + SLAB_TOLERANCE * t_max.abs().max(1.0)
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}
