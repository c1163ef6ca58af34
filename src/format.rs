//! Rendering fractional hours as display strings.

use anyhow::Result;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::math::fix_hour;

/// Placeholder shown for events that do not occur on the requested day.
pub const INVALID_TIME: &str = "-----";

/// Suffixes used by the 12-hour format when none are configured.
pub const DEFAULT_SUFFIXES: [&str; 2] = ["am", "pm"];

/// Output format for computed times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TimeFormat {
    /// `HH:MM` on a 24-hour clock.
    #[default]
    H24,
    /// `HH:MM` on a 12-hour clock with an am/pm suffix.
    H12,
    /// 12-hour clock without a suffix.
    H12NoSuffix,
    /// The raw fractional hour.
    Float,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::H24 => "24h",
            TimeFormat::H12 => "12h",
            TimeFormat::H12NoSuffix => "12hNS",
            TimeFormat::Float => "Float",
        }
    }
}

impl FromStr for TimeFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" => Ok(TimeFormat::H24),
            "12h" => Ok(TimeFormat::H12),
            "12hns" => Ok(TimeFormat::H12NoSuffix),
            "float" => Ok(TimeFormat::Float),
            _ => anyhow::bail!(
                "Time format must be '24h', '12h', '12hNS' or 'Float' (got '{}')",
                s
            ),
        }
    }
}

impl TryFrom<String> for TimeFormat {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a fractional hour.
///
/// NaN renders as [`INVALID_TIME`]. `Float` returns the shortest string that
/// parses back to the same value. The clock formats round to the nearest minute
/// by adding half a minute and truncating. In 12-hour mode the suffix is taken
/// from the unrounded hour, and an empty `suffixes` slice falls back to
/// [`DEFAULT_SUFFIXES`].
///
/// # Examples
/// ```
/// use praytimes::format::{TimeFormat, format_time};
/// assert_eq!(format_time(13.5, TimeFormat::H24, &[]), "13:30");
/// assert_eq!(format_time(13.5, TimeFormat::H12, &[]), "01:30pm");
/// assert_eq!(format_time(f64::NAN, TimeFormat::H24, &[]), "-----");
/// ```
pub fn format_time(time: f64, format: TimeFormat, suffixes: &[&str]) -> String {
    if time.is_nan() {
        return INVALID_TIME.to_string();
    }

    match format {
        TimeFormat::Float => time.to_string(),
        TimeFormat::H24 => {
            let (hours, minutes) = clock_parts(time);
            format!("{:02}:{:02}", hours, minutes)
        }
        TimeFormat::H12 | TimeFormat::H12NoSuffix => {
            let (hours, minutes) = clock_parts(time);
            let suffix = if format == TimeFormat::H12 {
                let is_morning = fix_hour(time) < 12.0;
                match (suffixes.first(), suffixes.get(1)) {
                    (Some(am), Some(pm)) => {
                        if is_morning { *am } else { *pm }
                    }
                    _ => {
                        if is_morning { DEFAULT_SUFFIXES[0] } else { DEFAULT_SUFFIXES[1] }
                    }
                }
            } else {
                ""
            };
            format!("{:02}:{:02}{}", (hours + 11) % 12 + 1, minutes, suffix)
        }
    }
}

/// Whole hours and minutes of `time`, rounded to the nearest minute.
fn clock_parts(time: f64) -> (u32, u32) {
    let rounded = fix_hour(time + 0.5 / 60.0);
    let hours = rounded.floor();
    let minutes = ((rounded - hours) * 60.0).floor();
    (hours as u32, minutes as u32)
}

/// Parse a value produced by the `Float` format back into fractional hours.
pub fn parse_float_time(text: &str) -> Result<f64> {
    if text == INVALID_TIME {
        return Ok(f64::NAN);
    }
    text.trim()
        .parse::<f64>()
        .map_err(|e| anyhow::anyhow!("Invalid fractional hour '{}': {}", text, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_SUFFIXES: [&str; 0] = [];

    #[test]
    fn test_nan_renders_sentinel() {
        assert_eq!(format_time(f64::NAN, TimeFormat::H24, &NO_SUFFIXES), INVALID_TIME);
        assert_eq!(format_time(f64::NAN, TimeFormat::H12, &NO_SUFFIXES), INVALID_TIME);
        assert_eq!(format_time(f64::NAN, TimeFormat::Float, &NO_SUFFIXES), INVALID_TIME);
    }

    #[test]
    fn test_24h_rounds_to_nearest_minute() {
        assert_eq!(format_time(13.0167, TimeFormat::H24, &NO_SUFFIXES), "13:01");
        // 13.0083 h is 13:00:29.9, which rounds down
        assert_eq!(format_time(13.0083, TimeFormat::H24, &NO_SUFFIXES), "13:00");
        assert_eq!(format_time(5.0, TimeFormat::H24, &NO_SUFFIXES), "05:00");
        assert_eq!(format_time(23.999, TimeFormat::H24, &NO_SUFFIXES), "00:00");
    }

    #[test]
    fn test_12h_clock_hours() {
        assert_eq!(format_time(0.25, TimeFormat::H12, &NO_SUFFIXES), "12:15am");
        assert_eq!(format_time(12.5, TimeFormat::H12, &NO_SUFFIXES), "12:30pm");
        assert_eq!(format_time(21.05, TimeFormat::H12, &NO_SUFFIXES), "09:03pm");
        assert_eq!(format_time(9.0, TimeFormat::H12NoSuffix, &NO_SUFFIXES), "09:00");
    }

    #[test]
    fn test_12h_suffix_uses_unrounded_hour() {
        // 11:59:56 displays as 12:00 but is still morning
        assert_eq!(format_time(11.999, TimeFormat::H12, &NO_SUFFIXES), "12:00am");
    }

    #[test]
    fn test_custom_suffixes() {
        let suffixes = [" AM", " PM"];
        assert_eq!(format_time(7.5, TimeFormat::H12, &suffixes), "07:30 AM");
        assert_eq!(format_time(19.5, TimeFormat::H12, &suffixes), "07:30 PM");
    }

    #[test]
    fn test_float_round_trip() {
        for value in [0.0, 4.923469826034762, 13.366258326245436, 23.999999] {
            let text = format_time(value, TimeFormat::Float, &NO_SUFFIXES);
            assert_eq!(parse_float_time(&text).unwrap(), value);
        }
        assert!(parse_float_time(INVALID_TIME).unwrap().is_nan());
        assert!(parse_float_time("soon").is_err());
    }

    #[test]
    fn test_time_format_parsing() {
        assert_eq!("24h".parse::<TimeFormat>().unwrap(), TimeFormat::H24);
        assert_eq!("12H".parse::<TimeFormat>().unwrap(), TimeFormat::H12);
        assert_eq!("12hNS".parse::<TimeFormat>().unwrap(), TimeFormat::H12NoSuffix);
        assert_eq!("Float".parse::<TimeFormat>().unwrap(), TimeFormat::Float);
        assert!("iso".parse::<TimeFormat>().is_err());

        for format in [TimeFormat::H24, TimeFormat::H12, TimeFormat::H12NoSuffix, TimeFormat::Float] {
            assert_eq!(format.to_string().parse::<TimeFormat>().unwrap(), format);
        }
    }
}
