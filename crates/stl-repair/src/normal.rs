//! Zero-normal detection and facet normal recomputation.

use nalgebra::Vector3;

/// Whether a stored normal is the all-zero placeholder some exporters emit.
///
/// Exact comparison, no tolerance: `(0.0001, 0, 0)` is a valid normal. Negative
/// zero compares equal to zero and counts as degenerate; NaN never does.
#[inline]
pub fn is_degenerate_normal(normal: &Vector3<f32>) -> bool {
    normal.x == 0.0 && normal.y == 0.0 && normal.z == 0.0
}

/// Compute the unit facet normal of a triangle from its vertices.
///
/// Uses `cross(v2 - v3, v2 - v1)`. The edge pair and operand order fix the sign
/// of the result and must not be swapped for the more usual `v2 - v1, v3 - v1`.
///
/// A zero-area triangle has a zero-length cross product, and the division
/// produces NaN components. That is returned as-is.
pub fn recompute_normal(v1: &Vector3<f32>, v2: &Vector3<f32>, v3: &Vector3<f32>) -> Vector3<f32> {
    let edge1 = v2 - v3;
    let edge2 = v2 - v1;
    let raw = edge1.cross(&edge2);
    raw / raw.norm()
}

/// Whether a recomputed normal came from degenerate geometry.
#[inline]
pub fn is_undefined_normal(normal: &Vector3<f32>) -> bool {
    normal.iter().any(|c| c.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_normal_is_degenerate() {
        assert!(is_degenerate_normal(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(is_degenerate_normal(&Vector3::new(-0.0, 0.0, -0.0)));
    }

    #[test]
    fn test_near_zero_normal_is_valid() {
        assert!(!is_degenerate_normal(&Vector3::new(0.0001, 0.0, 0.0)));
        assert!(!is_degenerate_normal(&Vector3::new(0.0, 0.0, f32::MIN_POSITIVE)));
        assert!(!is_degenerate_normal(&Vector3::new(f32::NAN, 0.0, 0.0)));
    }

    #[test]
    fn test_recompute_unit_triangle() {
        // cross((1,-1,0), (1,0,0)) = (0,0,1)
        let n = recompute_normal(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(0.0, 1.0, 0.0),
        );
        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, 0.0);
        assert_relative_eq!(n.z, 1.0);
    }

    #[test]
    fn test_recompute_operand_order() {
        // Reversing the winding must flip the result.
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 0.0, 2.0);
        let c = Vector3::new(0.0, 3.0, 0.0);
        let n = recompute_normal(&a, &b, &c);
        let flipped = recompute_normal(&a, &c, &b);
        // cross((0,-3,2), (0,0,2)) = (-6,0,0)
        assert_relative_eq!(n.x, -1.0);
        assert_relative_eq!(flipped.x, 1.0);
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_recompute_is_unit_length() {
        let n = recompute_normal(
            &Vector3::new(1.5, -2.0, 0.25),
            &Vector3::new(10.0, 3.0, -4.0),
            &Vector3::new(-7.0, 8.0, 2.0),
        );
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-6);
        assert!(!is_undefined_normal(&n));
    }

    #[test]
    fn test_collinear_triangle_yields_nan() {
        let n = recompute_normal(
            &Vector3::new(0.0, 0.0, 0.0),
            &Vector3::new(1.0, 0.0, 0.0),
            &Vector3::new(2.0, 0.0, 0.0),
        );
        assert!(is_undefined_normal(&n));
    }
}
