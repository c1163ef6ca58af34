//! Degree-based trigonometry and range normalization helpers.
//!
//! All solar formulas in this crate are expressed in degrees, so these wrappers
//! keep the conversions in one place. The inverse functions return degrees and
//! follow `f64` semantics for out-of-domain input: `acos(1.2)` is NaN, and NaN
//! flows through every helper unchanged.

/// Sine of an angle given in degrees.
pub fn sin(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

/// Cosine of an angle given in degrees.
pub fn cos(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

/// Tangent of an angle given in degrees.
pub fn tan(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}

pub fn arcsin(x: f64) -> f64 {
    x.asin().to_degrees()
}

/// Inverse cosine in degrees. Yields NaN when `x` lies outside `[-1, 1]`.
pub fn arccos(x: f64) -> f64 {
    x.acos().to_degrees()
}

pub fn arctan(x: f64) -> f64 {
    x.atan().to_degrees()
}

/// Inverse cotangent in degrees.
pub fn arccot(x: f64) -> f64 {
    (1.0 / x).atan().to_degrees()
}

pub fn arctan2(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

/// Wrap `a` into the half-open range `[0, b)`.
///
/// Works for any real `a` (including large negative values) as long as `b > 0`.
/// NaN input stays NaN.
///
/// # Examples
/// ```
/// use praytimes::math::fix;
/// assert_eq!(fix(25.0, 24.0), 1.0);
/// assert_eq!(fix(-1.0, 24.0), 23.0);
/// assert_eq!(fix(360.0, 360.0), 0.0);
/// ```
pub fn fix(a: f64, b: f64) -> f64 {
    let mut wrapped = a - b * (a / b).floor();
    if wrapped < 0.0 {
        wrapped += b;
    }
    // a tiny negative remainder can round up to exactly `b`
    if wrapped >= b { 0.0 } else { wrapped }
}

/// Normalize an angle into `[0, 360)` degrees.
pub fn fix_angle(a: f64) -> f64 {
    fix(a, 360.0)
}

/// Normalize a fractional hour into `[0, 24)`.
pub fn fix_hour(a: f64) -> f64 {
    fix(a, 24.0)
}

/// Forward distance in hours from `from` to `to` on a 24-hour clock.
///
/// Always non-negative: `time_diff(23.0, 1.0)` is `2.0`.
pub fn time_diff(from: f64, to: f64) -> f64 {
    fix_hour(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_degree_trig_known_values() {
        assert!((sin(30.0) - 0.5).abs() < EPS);
        assert!((cos(60.0) - 0.5).abs() < EPS);
        assert!((tan(45.0) - 1.0).abs() < EPS);
        assert!((arcsin(0.5) - 30.0).abs() < 1e-9);
        assert!((arccos(0.5) - 60.0).abs() < 1e-9);
        assert!((arctan(1.0) - 45.0).abs() < 1e-9);
        assert!((arccot(1.0) - 45.0).abs() < 1e-9);
        assert!((arctan2(1.0, -1.0) - 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_arccos_out_of_domain_is_nan() {
        assert!(arccos(1.0001).is_nan());
        assert!(arccos(-1.5).is_nan());
    }

    #[test]
    fn test_fix_wraps_into_range() {
        assert_eq!(fix(370.0, 360.0), 10.0);
        assert_eq!(fix(-10.0, 360.0), 350.0);
        assert_eq!(fix(-720.0, 360.0), 0.0);
        assert_eq!(fix_hour(24.0), 0.0);
        assert_eq!(fix_hour(-0.5), 23.5);
        assert_eq!(fix_angle(725.0), 5.0);
    }

    #[test]
    fn test_fix_tiny_negative_stays_below_bound() {
        let value = fix_hour(-1e-18);
        assert!((0.0..24.0).contains(&value), "got {}", value);
    }

    #[test]
    fn test_fix_propagates_nan() {
        assert!(fix_hour(f64::NAN).is_nan());
    }

    #[test]
    fn test_time_diff_is_forward_distance() {
        assert_eq!(time_diff(18.0, 6.0), 12.0);
        assert_eq!(time_diff(6.0, 18.0), 12.0);
        assert_eq!(time_diff(23.0, 1.0), 2.0);
        assert_eq!(time_diff(5.0, 5.0), 0.0);
    }
}
