use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use praytimes::math::{fix, time_diff};
use praytimes::{
    Coordinates, HighLatMethod, ParameterSet, PrayTimes, PrayerEvent, Threshold, TimeOffsets,
    TimesRequest,
};

/// Any day of 2024
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..366).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Latitudes where the sun always rises and sets
fn latitude_strategy() -> impl Strategy<Value = f64> {
    -60.0..=60.0
}

fn longitude_strategy() -> impl Strategy<Value = f64> {
    -180.0..=180.0
}

fn high_lat_strategy() -> impl Strategy<Value = HighLatMethod> {
    prop_oneof![
        Just(HighLatMethod::NightMiddle),
        Just(HighLatMethod::OneSeventh),
        Just(HighLatMethod::AngleBased),
    ]
}

fn request(date: NaiveDate, latitude: f64, longitude: f64) -> TimesRequest {
    TimesRequest::builder(date, Coordinates::new(latitude, longitude))
        .timezone((longitude / 15.0).round().clamp(-12.0, 14.0))
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn test_fix_stays_in_range(a in -1.0e9f64..1.0e9, b in 0.001f64..1000.0) {
        let wrapped = fix(a, b);
        prop_assert!(wrapped >= 0.0 && wrapped < b, "fix({}, {}) = {}", a, b, wrapped);
    }

    #[test]
    fn test_fix_stays_in_range_near_zero(a in -1.0e-12f64..1.0e-12) {
        let wrapped = fix(a, 24.0);
        prop_assert!(wrapped >= 0.0 && wrapped < 24.0, "fix({}) = {}", a, wrapped);
    }

    #[test]
    fn test_all_times_normalized_or_undefined(
        date in date_strategy(),
        latitude in -89.0f64..=89.0,
        longitude in longitude_strategy(),
    ) {
        let times = PrayTimes::new().compute(&request(date, latitude, longitude));
        for (event, hours) in times.iter() {
            prop_assert!(hours.is_nan() || (0.0..24.0).contains(&hours), "{} = {}", event, hours);
        }
    }

    /// Fajr never precedes sunrise minus the night portion and isha never
    /// follows sunset plus it.
    #[test]
    fn test_high_latitude_bounds(
        date in date_strategy(),
        latitude in latitude_strategy(),
        longitude in longitude_strategy(),
        method in high_lat_strategy(),
    ) {
        let mut calculator = PrayTimes::new();
        calculator.adjust_merge(&ParameterSet {
            high_lats: Some(method),
            ..ParameterSet::default()
        });
        let settings = calculator.settings();
        let times = calculator.compute(&request(date, latitude, longitude));

        let sunrise = times.get(PrayerEvent::Sunrise);
        let sunset = times.get(PrayerEvent::Sunset);
        let night = time_diff(sunset, sunrise);

        let fajr_angle = settings.fajr.map_or(0.0, |t| t.value());
        let isha_angle = settings.isha.map_or(0.0, |t| t.value());
        let fajr_portion = method.night_fraction(fajr_angle) * night;
        let isha_portion = method.night_fraction(isha_angle) * night;

        let fajr = times.get(PrayerEvent::Fajr);
        let isha = times.get(PrayerEvent::Isha);
        prop_assert!(!fajr.is_nan() && !isha.is_nan());
        prop_assert!(time_diff(fajr, sunrise) <= fajr_portion + 1e-9,
            "fajr {} is more than {} before sunrise {}", fajr, fajr_portion, sunrise);
        prop_assert!(time_diff(sunset, isha) <= isha_portion + 1e-9,
            "isha {} is more than {} after sunset {}", isha, isha_portion, sunset);
    }

    /// A steeper fajr angle is reached earlier.
    #[test]
    fn test_steeper_fajr_is_earlier(
        date in date_strategy(),
        latitude in -45.0f64..=45.0,
        longitude in longitude_strategy(),
    ) {
        let request = request(date, latitude, longitude);
        let mut calculator = PrayTimes::new();
        let mut params = calculator.settings();
        params.high_lats = Some(HighLatMethod::None);

        params.fajr = Some(Threshold::Angle(18.0));
        calculator.adjust(params);
        let steep = calculator.compute(&request).get(PrayerEvent::Fajr);

        params.fajr = Some(Threshold::Angle(15.0));
        calculator.adjust(params);
        let shallow = calculator.compute(&request).get(PrayerEvent::Fajr);

        let gap = time_diff(steep, shallow);
        prop_assert!(gap > 0.0 && gap < 3.0, "18° at {}, 15° at {}", steep, shallow);
    }

    /// Tuning one event moves exactly that event by exactly the offset.
    #[test]
    fn test_tuning_moves_one_event(
        date in date_strategy(),
        latitude in latitude_strategy(),
        longitude in longitude_strategy(),
        index in 0usize..9,
        minutes in -120i32..=120,
    ) {
        let request = request(date, latitude, longitude);
        let mut calculator = PrayTimes::new();
        let base = calculator.compute(&request);

        let event = PrayerEvent::ALL[index];
        let mut offsets = TimeOffsets::default();
        offsets.set(event, minutes);
        calculator.tune(offsets);
        let tuned = calculator.compute(&request);

        for other in PrayerEvent::ALL {
            if other == event {
                let expected = f64::from(minutes).rem_euclid(1440.0) / 60.0;
                let shift = time_diff(base.get(other), tuned.get(other));
                prop_assert!((shift - expected).abs() < 1e-9 || (shift - expected).abs() > 24.0 - 1e-9,
                    "{} moved {} instead of {}", other, shift, expected);
            } else {
                prop_assert_eq!(base.get(other), tuned.get(other));
            }
        }
    }

    #[test]
    fn test_julian_day_counts_days(offset in 0i64..100_000) {
        let start = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap();
        let date = start + Duration::days(offset);
        let jd_start = praytimes::astro::julian_day(1900, 3, 1);
        let jd = praytimes::astro::julian_day(
            chrono::Datelike::year(&date),
            chrono::Datelike::month(&date),
            chrono::Datelike::day(&date),
        );
        prop_assert_eq!(jd - jd_start, offset as f64);
    }
}
