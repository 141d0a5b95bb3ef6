//! Collision primitives and gameplay colliders
//!
//! # Module Organization
//!
//! - [`primitives`] - Basic geometric primitives (rays, spheres, triangles)
//!   and their intersection tests
//! - [`collider`] - Position-relative box colliders for gameplay entities
//!
//! # Key Types
//!
//! - [`Ray`], [`RayHit`], [`BoxHit`] - Ray queries and their results
//! - [`Triangle`], [`BoundingSphere`] - Primitive geometric types
//! - [`Collider`] - Entity box stored relative to its position

pub mod primitives;
pub mod collider;

// Re-export commonly used types
pub use primitives::{Ray, RayHit, BoxHit, BoundingSphere, Triangle};
pub use collider::Collider;
