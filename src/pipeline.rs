//! Turns raw sun-angle solutions into clock times.
//!
//! The pipeline runs once per request:
//!
//! 1. Seed every event with a nominal hour.
//! 2. Solve each event, feeding the previous pass back in as the approximate
//!    time of day (repeated `iterations` times).
//! 3. Shift from solar time at the meridian to the requested timezone.
//! 4. Bound twilight events to a portion of the night at high latitudes.
//! 5. Replace events configured as minute offsets.
//! 6. Add the dhuhr offset and derive midnight.
//! 7. Add per-event tuning and normalize into `[0, 24)`.
//!
//! Events the sun never reaches stay NaN through every stage.

use crate::calculator::Coordinates;
use crate::events::{PrayerEvent, PrayerTimes, TimeOffsets};
use crate::math::{fix_hour, time_diff};
use crate::params::{HighLatMethod, MidnightMethod, ResolvedParameters, Threshold};
use crate::solver::{Direction, SolarSolver, rise_set_angle};

/// Nominal hours used as the first approximation. Midnight is derived, never solved.
const SEED_HOURS: [f64; 9] = [5.0, 5.0, 6.0, 12.0, 13.0, 18.0, 18.0, 18.0, 0.0];

/// Everything one computation needs besides the parameters and tuning.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput {
    /// Julian date of the requested civil day.
    pub julian_day: f64,
    pub coordinates: Coordinates,
    /// Hours from UTC, DST already applied.
    pub timezone: f64,
    /// Number of refinement passes; values below 1 are treated as 1.
    pub iterations: u32,
}

/// Compute all nine events for one request.
pub fn compute_times(
    input: &PipelineInput,
    params: &ResolvedParameters,
    offsets: &TimeOffsets,
) -> PrayerTimes {
    let coordinates = input.coordinates;
    let solver = SolarSolver::new(
        input.julian_day - coordinates.longitude / (15.0 * 24.0),
        coordinates.latitude,
    );
    let horizon = rise_set_angle(coordinates.elevation);

    let mut times = PrayerTimes::new(SEED_HOURS);
    for _ in 0..input.iterations.max(1) {
        times = solve_events(&solver, params, horizon, &times);
    }

    apply_timezone(&mut times, input.timezone - coordinates.longitude / 15.0);

    if params.high_lats != HighLatMethod::None {
        adjust_high_latitudes(&mut times, params);
    }

    substitute_minute_offsets(&mut times, params);
    times[PrayerEvent::Dhuhr] += params.dhuhr_minutes / 60.0;
    times[PrayerEvent::Midnight] = midnight(&times, params.midnight);

    apply_tuning(&mut times, offsets);
    normalize(&mut times);
    times
}

/// One solver pass over the eight solar events.
fn solve_events(
    solver: &SolarSolver,
    params: &ResolvedParameters,
    horizon: f64,
    previous: &PrayerTimes,
) -> PrayerTimes {
    let fraction = |event: PrayerEvent| previous[event] / 24.0;

    let mut times = *previous;
    times[PrayerEvent::Imsak] = solver.sun_angle_time(
        params.imsak.value(),
        fraction(PrayerEvent::Imsak),
        Direction::BeforeNoon,
    );
    times[PrayerEvent::Fajr] = solver.sun_angle_time(
        params.fajr.value(),
        fraction(PrayerEvent::Fajr),
        Direction::BeforeNoon,
    );
    times[PrayerEvent::Sunrise] =
        solver.sun_angle_time(horizon, fraction(PrayerEvent::Sunrise), Direction::BeforeNoon);
    times[PrayerEvent::Dhuhr] = solver.mid_day(fraction(PrayerEvent::Dhuhr));
    times[PrayerEvent::Asr] =
        solver.asr_time(params.asr.shadow_factor(), fraction(PrayerEvent::Asr));
    times[PrayerEvent::Sunset] =
        solver.sun_angle_time(horizon, fraction(PrayerEvent::Sunset), Direction::AfterNoon);
    times[PrayerEvent::Maghrib] = solver.sun_angle_time(
        params.maghrib.value(),
        fraction(PrayerEvent::Maghrib),
        Direction::AfterNoon,
    );
    times[PrayerEvent::Isha] = solver.sun_angle_time(
        params.isha.value(),
        fraction(PrayerEvent::Isha),
        Direction::AfterNoon,
    );
    times
}

fn apply_timezone(times: &mut PrayerTimes, shift: f64) {
    for event in PrayerEvent::ALL {
        if event != PrayerEvent::Midnight {
            times[event] += shift;
        }
    }
}

/// Clamp imsak and fajr to a portion of the night before sunrise, and maghrib
/// and isha to a portion after sunset.
fn adjust_high_latitudes(times: &mut PrayerTimes, params: &ResolvedParameters) {
    let sunrise = times[PrayerEvent::Sunrise];
    let sunset = times[PrayerEvent::Sunset];
    let night = time_diff(sunset, sunrise);
    let method = params.high_lats;

    let bounded = [
        (PrayerEvent::Imsak, params.imsak, sunrise, Direction::BeforeNoon),
        (PrayerEvent::Fajr, params.fajr, sunrise, Direction::BeforeNoon),
        (PrayerEvent::Isha, params.isha, sunset, Direction::AfterNoon),
        (PrayerEvent::Maghrib, params.maghrib, sunset, Direction::AfterNoon),
    ];

    for (event, threshold, base, direction) in bounded {
        times[event] = bound_to_night(times[event], base, threshold, night, method, direction);
    }
}

/// Move `time` to `base ± portion` when it is undefined or further from `base`
/// than the allowed portion of the night.
fn bound_to_night(
    time: f64,
    base: f64,
    threshold: Threshold,
    night: f64,
    method: HighLatMethod,
    direction: Direction,
) -> f64 {
    let portion = method.night_fraction(threshold.value()) * night;
    let distance = match direction {
        Direction::BeforeNoon => time_diff(time, base),
        Direction::AfterNoon => time_diff(base, time),
    };

    if time.is_nan() || distance > portion {
        match direction {
            Direction::BeforeNoon => base - portion,
            Direction::AfterNoon => base + portion,
        }
    } else {
        time
    }
}

fn substitute_minute_offsets(times: &mut PrayerTimes, params: &ResolvedParameters) {
    if let Threshold::Minutes(minutes) = params.imsak {
        times[PrayerEvent::Imsak] = times[PrayerEvent::Fajr] - minutes / 60.0;
    }
    if let Threshold::Minutes(minutes) = params.maghrib {
        times[PrayerEvent::Maghrib] = times[PrayerEvent::Sunset] + minutes / 60.0;
    }
    // after maghrib, which may itself have just been replaced
    if let Threshold::Minutes(minutes) = params.isha {
        times[PrayerEvent::Isha] = times[PrayerEvent::Maghrib] + minutes / 60.0;
    }
}

fn midnight(times: &PrayerTimes, method: MidnightMethod) -> f64 {
    let sunset = times[PrayerEvent::Sunset];
    let morning = match method {
        MidnightMethod::Jafari => times[PrayerEvent::Fajr],
        MidnightMethod::Standard => times[PrayerEvent::Sunrise],
    };
    sunset + time_diff(sunset, morning) / 2.0
}

fn apply_tuning(times: &mut PrayerTimes, offsets: &TimeOffsets) {
    for event in PrayerEvent::ALL {
        times[event] += f64::from(offsets.get(event)) / 60.0;
    }
}

fn normalize(times: &mut PrayerTimes) {
    for event in PrayerEvent::ALL {
        times[event] = fix_hour(times[event]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::julian_day;
    use crate::format::{TimeFormat, format_time};
    use crate::methods::MethodCatalog;
    use crate::params::ParameterSet;

    fn method_params(method: &str) -> ParameterSet {
        let method = MethodCatalog::builtin().lookup(method).unwrap();
        ParameterSet::default_settings().merged_with(&method.params)
    }

    fn input(date: (i32, u32, u32), latitude: f64, longitude: f64, timezone: f64) -> PipelineInput {
        PipelineInput {
            julian_day: julian_day(date.0, date.1, date.2),
            coordinates: Coordinates::new(latitude, longitude),
            timezone,
            iterations: 1,
        }
    }

    fn formatted(times: &PrayerTimes) -> Vec<String> {
        times
            .iter()
            .map(|(_, hours)| format_time(hours, TimeFormat::H24, &[]))
            .collect()
    }

    #[test]
    fn test_mid_latitude_summer_day() {
        let times = compute_times(
            &input((2024, 6, 21), 43.0, -80.0, -4.0),
            &method_params("MWL").resolve(),
            &TimeOffsets::default(),
        );

        assert_eq!(
            formatted(&times),
            vec!["03:13", "03:23", "05:41", "13:22", "17:27", "21:03", "21:03", "23:11", "01:22"]
        );
    }

    #[test]
    fn test_equator_equinox_is_symmetric() {
        let times = compute_times(
            &input((2024, 3, 20), 0.0, 0.0, 0.0),
            &method_params("MWL").resolve(),
            &TimeOffsets::default(),
        );

        let sunrise = times[PrayerEvent::Sunrise];
        let sunset = times[PrayerEvent::Sunset];
        let dhuhr = times[PrayerEvent::Dhuhr];
        assert!((dhuhr - 12.0).abs() < 0.25, "dhuhr {}", dhuhr);
        assert!(((sunrise + sunset) / 2.0 - dhuhr).abs() < 1.0 / 60.0);
        assert_eq!(format_time(sunrise, TimeFormat::H24, &[]), "06:04");
        assert_eq!(format_time(sunset, TimeFormat::H24, &[]), "18:11");
    }

    #[test]
    fn test_every_value_is_normalized() {
        let times = compute_times(
            &input((2024, 12, 21), -33.87, 151.21, 11.0),
            &method_params("ISNA").resolve(),
            &TimeOffsets::new([-600, 0, 0, 0, 0, 0, 0, 0, 600]),
        );

        for (event, hours) in times.iter() {
            assert!((0.0..24.0).contains(&hours), "{} = {}", event, hours);
        }
    }

    #[test]
    fn test_tuning_only_moves_the_tuned_event() {
        let input = input((2024, 6, 21), 43.0, -80.0, -4.0);
        let params = method_params("MWL").resolve();
        let base = compute_times(&input, &params, &TimeOffsets::default());

        let mut offsets = TimeOffsets::default();
        offsets.set(PrayerEvent::Fajr, 10);
        let tuned = compute_times(&input, &params, &offsets);

        for event in PrayerEvent::ALL {
            let shift = time_diff(base[event], tuned[event]);
            if event == PrayerEvent::Fajr {
                assert!((shift - 10.0 / 60.0).abs() < 1e-9);
            } else {
                assert_eq!(base[event], tuned[event], "{} moved", event);
            }
        }
        assert_eq!(format_time(tuned[PrayerEvent::Fajr], TimeFormat::H24, &[]), "03:33");
    }

    #[test]
    fn test_minute_based_isha() {
        let times = compute_times(
            &input((2024, 6, 21), 21.4225, 39.8262, 3.0),
            &method_params("Makkah").resolve(),
            &TimeOffsets::default(),
        );

        let gap = time_diff(times[PrayerEvent::Maghrib], times[PrayerEvent::Isha]);
        assert!((gap - 1.5).abs() < 1e-9);
        assert_eq!(format_time(times[PrayerEvent::Fajr], TimeFormat::H24, &[]), "04:11");
        assert_eq!(format_time(times[PrayerEvent::Maghrib], TimeFormat::H24, &[]), "19:06");
        assert_eq!(format_time(times[PrayerEvent::Isha], TimeFormat::H24, &[]), "20:36");
    }

    #[test]
    fn test_jafari_midnight_and_maghrib_angle() {
        let times = compute_times(
            &input((2024, 6, 21), 35.6892, 51.389, 3.5),
            &method_params("Tehran").resolve(),
            &TimeOffsets::default(),
        );

        assert!(times[PrayerEvent::Maghrib] > times[PrayerEvent::Sunset]);
        let expected = times[PrayerEvent::Sunset]
            + time_diff(times[PrayerEvent::Sunset], times[PrayerEvent::Fajr]) / 2.0;
        assert!((times[PrayerEvent::Midnight] - fix_hour(expected)).abs() < 1e-9);
        assert_eq!(format_time(times[PrayerEvent::Maghrib], TimeFormat::H24, &[]), "19:45");
        assert_eq!(format_time(times[PrayerEvent::Isha], TimeFormat::H24, &[]), "20:44");
        assert_eq!(format_time(times[PrayerEvent::Midnight], TimeFormat::H24, &[]), "23:13");
    }

    #[test]
    fn test_high_latitude_night_middle() {
        let times = compute_times(
            &input((2024, 6, 21), 65.0, 25.0, 3.0),
            &method_params("MWL").resolve(),
            &TimeOffsets::default(),
        );

        let formatted = formatted(&times);
        assert_eq!(formatted[1], "01:22");
        assert_eq!(formatted[2], "02:21");
        assert_eq!(formatted[5], "00:23");
        assert_eq!(formatted[7], "01:22");
    }

    #[test]
    fn test_high_latitude_without_correction_is_undefined() {
        let mut params = method_params("MWL");
        params.high_lats = Some(HighLatMethod::None);
        let times = compute_times(
            &input((2024, 6, 21), 65.0, 25.0, 3.0),
            &params.resolve(),
            &TimeOffsets::default(),
        );

        assert!(!times.is_defined(PrayerEvent::Imsak));
        assert!(!times.is_defined(PrayerEvent::Fajr));
        assert!(!times.is_defined(PrayerEvent::Isha));
        assert!(times.is_defined(PrayerEvent::Sunrise));
        assert!(times.is_defined(PrayerEvent::Dhuhr));
    }

    #[test]
    fn test_high_latitude_fractions() {
        let mut params = method_params("MWL");
        let input = input((2024, 6, 21), 60.0, 25.0, 3.0);

        params.high_lats = Some(HighLatMethod::AngleBased);
        let times = compute_times(&input, &params.resolve(), &TimeOffsets::default());
        assert_eq!(format_time(times[PrayerEvent::Fajr], TimeFormat::H24, &[]), "02:24");
        assert_eq!(format_time(times[PrayerEvent::Isha], TimeFormat::H24, &[]), "00:15");

        params.high_lats = Some(HighLatMethod::OneSeventh);
        let times = compute_times(&input, &params.resolve(), &TimeOffsets::default());
        assert_eq!(format_time(times[PrayerEvent::Fajr], TimeFormat::H24, &[]), "03:12");
        assert_eq!(format_time(times[PrayerEvent::Isha], TimeFormat::H24, &[]), "23:32");
    }

    #[test]
    fn test_polar_day_keeps_noon_and_asr() {
        let times = compute_times(
            &input((2024, 6, 21), 70.0, 25.0, 3.0),
            &method_params("MWL").resolve(),
            &TimeOffsets::default(),
        );

        for event in [PrayerEvent::Sunrise, PrayerEvent::Sunset, PrayerEvent::Fajr, PrayerEvent::Isha, PrayerEvent::Midnight] {
            assert!(!times.is_defined(event), "{} should be undefined", event);
        }
        assert_eq!(format_time(times[PrayerEvent::Dhuhr], TimeFormat::H24, &[]), "13:22");
        assert_eq!(format_time(times[PrayerEvent::Asr], TimeFormat::H24, &[]), "18:35");
    }

    #[test]
    fn test_elevation_widens_the_day() {
        let mut at_altitude = input((2024, 6, 21), 43.0, -80.0, -4.0);
        at_altitude.coordinates.elevation = 1000.0;
        let times = compute_times(
            &at_altitude,
            &method_params("MWL").resolve(),
            &TimeOffsets::default(),
        );

        assert_eq!(format_time(times[PrayerEvent::Sunrise], TimeFormat::H24, &[]), "05:34");
        assert_eq!(format_time(times[PrayerEvent::Sunset], TimeFormat::H24, &[]), "21:10");
    }

    #[test]
    fn test_more_iterations_change_little() {
        let mut refined = input((2024, 6, 21), 43.0, -80.0, -4.0);
        let params = method_params("MWL").resolve();
        let once = compute_times(&refined, &params, &TimeOffsets::default());
        refined.iterations = 3;
        let thrice = compute_times(&refined, &params, &TimeOffsets::default());

        for event in PrayerEvent::ALL {
            assert!((once[event] - thrice[event]).abs() < 1.0 / 60.0, "{} drifted", event);
        }
    }

    #[test]
    fn test_dhuhr_offset_is_added() {
        let mut params = method_params("MWL");
        let input = input((2024, 6, 21), 43.0, -80.0, -4.0);
        let base = compute_times(&input, &params.resolve(), &TimeOffsets::default());

        params.set(crate::params::ParamKey::Dhuhr, "5 min").unwrap();
        let shifted = compute_times(&input, &params.resolve(), &TimeOffsets::default());
        let shift = shifted[PrayerEvent::Dhuhr] - base[PrayerEvent::Dhuhr];
        assert!((shift - 5.0 / 60.0).abs() < 1e-9);
    }
}
