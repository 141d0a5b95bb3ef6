//! Math utilities and types
//!
//! Provides the vector type and the numeric tolerances shared by every
//! geometric predicate in the crate.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Numeric tolerances
///
/// The box test, the triangle test and the tree traversal all read these, so
/// rendering and gameplay queries agree on the same edge cases.
pub mod constants {
    /// Direction components with a smaller magnitude are treated as parallel
    /// to the slab planes of that axis.
    pub const PARALLEL_EPSILON: f32 = 1e-6;

    /// Möller–Trumbore determinants with a smaller magnitude mean the ray is
    /// coplanar with (or parallel to) the triangle.
    pub const DETERMINANT_EPSILON: f32 = 1e-6;

    /// Slack on the barycentric bounds of the triangle test, so rays aimed
    /// at a shared edge or vertex cannot slip between neighbouring triangles.
    pub const BARYCENTRIC_EPSILON: f32 = 1e-5;

    /// Triangle hits must lie strictly beyond this ray parameter, which
    /// rejects self-intersection at the ray origin.
    pub const MIN_HIT_DISTANCE: f32 = 1e-6;

    /// Relative slack of the pruning box test. Zero-thickness boxes around
    /// axis-aligned triangles round their slab intervals by an ulp or two,
    /// which must not reject rays the triangle test accepts.
    pub const SLAB_TOLERANCE: f32 = 1e-5;
}

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Normalize a vector, returning the zero vector for near-zero input
    /// instead of propagating NaN.
    pub fn safe_normalize(v: Vec3) -> Vec3 {
        let length = v.magnitude();
        if length < f32::EPSILON {
            Vec3::zeros()
        } else {
            v / length
        }
    }

    /// Index of the largest value, preferring the first on ties.
    pub fn argmax(values: [f32; 3]) -> usize {
        let mut best = 0;
        for axis in 1..3 {
            if values[axis] > values[best] {
                best = axis;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::utils::{argmax, safe_normalize};
    use super::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_safe_normalize_unit_length() {
        let n = safe_normalize(Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(n, Vec3::new(0.6, 0.0, 0.8), epsilon = 1e-6);
    }

    #[test]
    fn test_safe_normalize_zero_vector() {
        let n = safe_normalize(Vec3::zeros());
        assert_eq!(n, Vec3::zeros());
        assert!(n.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_argmax_prefers_first_axis_on_ties() {
        assert_eq!(argmax([1.0, 1.0, 1.0]), 0);
        assert_eq!(argmax([0.0, 2.0, 2.0]), 1);
        assert_eq!(argmax([0.0, 1.0, 3.0]), 2);
    }
}
