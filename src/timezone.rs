//! Local timezone and daylight saving helpers.
//!
//! These read the system's local timezone through `chrono::Local`. They are used
//! when the user configures no timezone; no timezone database is consulted.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};

fn local_noon(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(12)
}

/// Offset from UTC in hours in effect at local noon on `date`.
pub fn local_gmt_offset(date: NaiveDate) -> f64 {
    let noon = local_noon(date);
    let offset = Local
        .offset_from_local_datetime(&noon)
        .earliest()
        .map(|offset| offset.fix())
        // noon skipped by a transition; read the offset as if noon were UTC
        .unwrap_or_else(|| Local.offset_from_utc_datetime(&noon).fix());
    f64::from(offset.local_minus_utc()) / 3600.0
}

/// Standard (non-DST) offset for the year of `date`.
///
/// Taken as the smaller of the offsets on January 1 and July 1, which covers
/// both hemispheres.
pub fn local_timezone(date: NaiveDate) -> f64 {
    let year = date.year();
    let january = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(date);
    let july = NaiveDate::from_ymd_opt(year, 7, 1).unwrap_or(date);
    local_gmt_offset(january).min(local_gmt_offset(july))
}

/// Whether daylight saving time is in effect on `date`.
pub fn is_dst(date: NaiveDate) -> bool {
    local_gmt_offset(date) != local_timezone(date)
}
