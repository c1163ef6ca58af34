//! Hour-angle solver for solar events.
//!
//! Given a location and the Julian date of the request, finds the clock time
//! (in hours of local solar time at Greenwich offset, before the timezone
//! correction) at which the sun reaches a given altitude. Times are refined from
//! an approximate day fraction, which is why every function takes one.

use crate::astro::{SunPosition, sun_position};
use crate::math::{arccos, arccot, fix_hour, sin, cos, tan};

/// Which side of solar noon an event lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Before noon (counter-clockwise): imsak, fajr, sunrise.
    BeforeNoon,
    /// After noon (clockwise): asr, sunset, maghrib, isha.
    AfterNoon,
}

/// Altitude correction for sunrise/sunset in degrees below the horizon.
///
/// 0.833° covers atmospheric refraction and the solar semi-diameter; an
/// observer above sea level sees the horizon dip by about `0.0347 * sqrt(h)`.
pub fn rise_set_angle(elevation: f64) -> f64 {
    0.833 + 0.0347 * elevation.max(0.0).sqrt()
}

/// Solves solar event times for one location and one day.
#[derive(Debug, Clone, Copy)]
pub struct SolarSolver {
    /// Julian date of the request, already shifted by the longitude.
    julian_date: f64,
    latitude: f64,
}

impl SolarSolver {
    pub fn new(julian_date: f64, latitude: f64) -> Self {
        Self {
            julian_date,
            latitude,
        }
    }

    pub fn julian_date(&self) -> f64 {
        self.julian_date
    }

    fn position(&self, day_fraction: f64) -> SunPosition {
        sun_position(self.julian_date + day_fraction)
    }

    /// Solar noon near the given day fraction.
    pub fn mid_day(&self, day_fraction: f64) -> f64 {
        fix_hour(12.0 - self.position(day_fraction).equation_of_time)
    }

    /// Time at which the sun is `angle` degrees below the horizon.
    ///
    /// Returns NaN when the sun never reaches that altitude on this day.
    pub fn sun_angle_time(&self, angle: f64, day_fraction: f64, direction: Direction) -> f64 {
        let declination = self.position(day_fraction).declination;
        let noon = self.mid_day(day_fraction);

        let hour_angle = arccos(
            (-sin(angle) - sin(declination) * sin(self.latitude))
                / (cos(declination) * cos(self.latitude)),
        ) / 15.0;

        match direction {
            Direction::BeforeNoon => noon - hour_angle,
            Direction::AfterNoon => noon + hour_angle,
        }
    }

    /// Time at which an object's shadow reaches `factor` times its length plus
    /// its noon shadow.
    pub fn asr_time(&self, factor: f64, day_fraction: f64) -> f64 {
        let declination = self.position(day_fraction).declination;
        let angle = -arccot(factor + tan((self.latitude - declination).abs()));
        self.sun_angle_time(angle, day_fraction, Direction::AfterNoon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::julian_day;

    fn solver(year: i32, month: u32, day: u32, latitude: f64, longitude: f64) -> SolarSolver {
        SolarSolver::new(julian_day(year, month, day) - longitude / (15.0 * 24.0), latitude)
    }

    #[test]
    fn test_rise_set_angle_grows_with_elevation() {
        assert_eq!(rise_set_angle(0.0), 0.833);
        assert!((rise_set_angle(100.0) - 1.180).abs() < 1e-9);
        assert_eq!(rise_set_angle(-50.0), 0.833);
    }

    #[test]
    fn test_mid_day_equinox_is_near_noon() {
        let noon = solver(2024, 3, 20, 0.0, 0.0).mid_day(0.5);
        // Equation of time is about -7.5 minutes on the March equinox
        assert!((noon - 12.0).abs() < 17.0 / 60.0, "noon {}", noon);
        assert!(noon > 12.0);
    }

    #[test]
    fn test_sunrise_and_sunset_are_symmetric_about_noon() {
        let solver = solver(2024, 3, 20, 0.0, 0.0);
        let angle = rise_set_angle(0.0);
        let sunrise = solver.sun_angle_time(angle, 0.5, Direction::BeforeNoon);
        let sunset = solver.sun_angle_time(angle, 0.5, Direction::AfterNoon);
        let noon = solver.mid_day(0.5);

        assert!(((sunrise + sunset) / 2.0 - noon).abs() < 1e-9);
        assert!((sunset - sunrise - 12.1).abs() < 0.1, "day length {}", sunset - sunrise);
    }

    #[test]
    fn test_unreachable_angle_is_nan() {
        // Sun never gets 18 degrees below the horizon in Tromso in June
        let solver = solver(2024, 6, 21, 69.65, 18.96);
        assert!(solver.sun_angle_time(18.0, 0.2, Direction::BeforeNoon).is_nan());
        assert!(solver.sun_angle_time(rise_set_angle(0.0), 0.25, Direction::BeforeNoon).is_nan());
        // Noon is always defined
        assert!(!solver.mid_day(0.5).is_nan());
    }

    #[test]
    fn test_hanafi_asr_is_later_than_standard() {
        let solver = solver(2024, 1, 15, 21.42, 39.83);
        let standard = solver.asr_time(1.0, 13.0 / 24.0);
        let hanafi = solver.asr_time(2.0, 13.0 / 24.0);
        let noon = solver.mid_day(0.5);

        assert!(standard > noon);
        assert!(hanafi > standard);
    }

    #[test]
    fn test_steeper_angle_is_further_from_noon() {
        let solver = solver(2024, 6, 21, 43.0, -80.0);
        let fajr_18 = solver.sun_angle_time(18.0, 5.0 / 24.0, Direction::BeforeNoon);
        let fajr_15 = solver.sun_angle_time(15.0, 5.0 / 24.0, Direction::BeforeNoon);
        assert!(fajr_18 < fajr_15);
    }
}
