//! Low-precision solar ephemeris.
//!
//! Provides the Gregorian to Julian day conversion and the sun's declination and
//! equation of time for a given Julian day. The coefficients come from the
//! U.S. Naval Observatory's approximate solar coordinates formula, which is
//! accurate to about one arcminute within two centuries of J2000. Prayer time
//! tables are published from this exact formula, so the coefficients must not be
//! "improved" without breaking compatibility with them.

use crate::math::{arcsin, arctan2, cos, fix_angle, fix_hour, sin};

/// Julian day of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000: f64 = 2_451_545.0;

/// Apparent solar coordinates needed by the prayer time solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Declination in degrees.
    pub declination: f64,
    /// Equation of time in hours (apparent minus mean solar time).
    ///
    /// Not wrapped: around the vernal equinox the raw value is close to 24 rather
    /// than close to 0. Consumers only use it modulo 24.
    pub equation_of_time: f64,
}

/// Convert a Gregorian calendar date to a Julian day number.
///
/// The result refers to 00:00 UT of the given date, so it always ends in `.5`.
/// January and February are counted as months 13 and 14 of the previous year,
/// and the Gregorian century correction is applied.
/// Ref: Jean Meeus, *Astronomical Algorithms*, chapter 7.
///
/// # Examples
/// ```
/// use praytimes::astro::{julian_day, J2000};
/// // Noon on 2000-01-01 is the J2000 epoch.
/// assert_eq!(julian_day(2000, 1, 1) + 0.5, J2000);
/// ```
pub fn julian_day(year: i32, month: u32, day: u32) -> f64 {
    let (year, month) = if month <= 2 {
        (f64::from(year) - 1.0, f64::from(month) + 12.0)
    } else {
        (f64::from(year), f64::from(month))
    };

    let century = (year / 100.0).floor();
    let correction = 2.0 - century + (century / 4.0).floor();

    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + f64::from(day)
        + correction
        - 1524.5
}

/// Compute the sun's declination and the equation of time.
///
/// # Arguments
/// * `jd` - Julian day, including any fractional day offset
pub fn sun_position(jd: f64) -> SunPosition {
    let d = jd - J2000;

    let mean_anomaly = fix_angle(357.529 + 0.985_600_28 * d);
    let mean_longitude = fix_angle(280.459 + 0.985_647_36 * d);
    let ecliptic_longitude = fix_angle(
        mean_longitude + 1.915 * sin(mean_anomaly) + 0.020 * sin(2.0 * mean_anomaly),
    );
    let obliquity = 23.439 - 0.000_000_36 * d;

    let right_ascension =
        arctan2(cos(obliquity) * sin(ecliptic_longitude), cos(ecliptic_longitude)) / 15.0;

    SunPosition {
        declination: arcsin(sin(obliquity) * sin(ecliptic_longitude)),
        equation_of_time: mean_longitude / 15.0 - fix_hour(right_ascension),
    }
}
