//! Application constants and default values for praytimes.
//!
//! This module contains the calculation defaults, configuration defaults and
//! validation limits used throughout the crate.

use crate::format::TimeFormat;

// ═══ Calculation Defaults ═══
// Used by a freshly constructed calculator

pub const DEFAULT_METHOD: &str = "MWL"; // Muslim World League
pub const DEFAULT_ITERATIONS: u32 = 1; // one pass is enough; the sun moves little within a day
pub const DEFAULT_TIME_FORMAT: TimeFormat = TimeFormat::H24;
pub const DEFAULT_ELEVATION: f64 = 0.0; // meters above sea level
pub const DEFAULT_TIMEZONE: f64 = 0.0; // hours from UTC when a request names none

// ═══ Configuration File ═══

pub const CONFIG_DIR_NAME: &str = "praytimes";
pub const CONFIG_FILE_NAME: &str = "praytimes.toml";

// Location written into a freshly generated config (Makkah)
pub const DEFAULT_LATITUDE: f64 = 21.4225;
pub const DEFAULT_LONGITUDE: f64 = 39.8262;

// ═══ Validation Limits ═══
// These limits keep user input within meaningful ranges

pub const MINIMUM_ITERATIONS: u32 = 1;
pub const MAXIMUM_ITERATIONS: u32 = 10; // later passes change results by far less than a second

pub const MINIMUM_TIMEZONE: f64 = -12.0; // hours (Baker Island)
pub const MAXIMUM_TIMEZONE: f64 = 14.0; // hours (Line Islands)

pub const MAXIMUM_TUNE_MINUTES: i32 = 720; // larger offsets are almost certainly a typo

// ═══ Application Exit Codes ═══

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
