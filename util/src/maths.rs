//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Normalise an angle into the range (-pi, pi].
///
/// Angles already inside the range are returned unchanged, which makes the
/// function exactly idempotent. Non-finite inputs produce a NaN.
pub fn wrap_angle<T>(angle: T) -> T
where
    T: Float + FloatConst
{
    let pi_t = T::PI();
    let tau_t = pi_t + pi_t;

    if angle > -pi_t && angle <= pi_t {
        return angle
    }

    // Shift into [0, 2pi], then back down into [-pi, pi]
    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    // -pi itself belongs to the other end of the range
    if wrapped <= -pi_t {
        wrapped + tau_t
    }
    else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Return true if every value in the slice is finite.
pub fn all_finite<T>(values: &[T]) -> bool
where
    T: Float
{
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{PI, TAU, FRAC_PI_2};

    #[test]
    fn test_wrap_angle() {
        // In range values are untouched
        assert_eq!(wrap_angle(0f64), 0f64);
        assert_eq!(wrap_angle(1f64), 1f64);
        assert_eq!(wrap_angle(PI), PI);
        assert_eq!(wrap_angle(-FRAC_PI_2), -FRAC_PI_2);

        // The lower bound maps onto the upper one
        assert_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(wrap_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-3.0 * PI), PI, epsilon = 1e-12);

        assert_relative_eq!(wrap_angle(TAU + 1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-TAU - 1.0), -1.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-1.5 * PI), 0.5 * PI, epsilon = 1e-12);

        assert!(wrap_angle(f64::NAN).is_nan());
        assert!(wrap_angle(f64::INFINITY).is_nan());
    }

    #[test]
    fn test_wrap_angle_range_and_idempotence() {
        // Sweep a wide range of angles, including many multiples of pi
        let mut x = -50.0 * PI;
        while x <= 50.0 * PI {
            let w = wrap_angle(x);
            assert!(w > -PI && w <= PI, "wrap({}) = {} out of range", x, w);
            assert_eq!(wrap_angle(w), w);

            // Same angle modulo 2pi
            assert_relative_eq!(w.sin(), x.sin(), epsilon = 1e-9);
            assert_relative_eq!(w.cos(), x.cos(), epsilon = 1e-9);

            x += 0.137;
        }

        for k in -20..=20 {
            let w = wrap_angle(k as f64 * PI);
            assert!(w > -PI && w <= PI);
            assert_eq!(wrap_angle(w), w);
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2.0, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-2.0, &-1.0, &1.0), -1.0);
        assert_eq!(clamp(&0.5, &-1.0, &1.0), 0.5);
    }

    #[test]
    fn test_all_finite() {
        assert!(all_finite(&[0.0, 1.0, -3.0]));
        assert!(!all_finite(&[0.0, f64::NAN]));
        assert!(!all_finite(&[f64::NEG_INFINITY]));
    }
}
