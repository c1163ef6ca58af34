//! # praytimes
//!
//! Islamic prayer times for any date, location and calculation convention.
//!
//! Times are found by modelling the apparent position of the sun and solving for
//! the moment it crosses each configured angle below the horizon, then applying
//! timezone, high-latitude, minute-offset and tuning adjustments.
//!
//! ## Architecture
//!
//! - **math**: degree trigonometry and range reduction
//! - **astro**: Julian day and solar declination / equation of time
//! - **solver**: hour-angle solutions for noon, twilight angles and Asr
//! - **pipeline**: iteration and every post-solve adjustment
//! - **params**: typed calculation parameters
//! - **methods**: built-in calculation conventions
//! - **events**: the nine daily events and per-event containers
//! - **format**: rendering fractional hours
//! - **calculator**: the `PrayTimes` calculator and validated requests
//! - **timezone**: system UTC offset and DST helpers
//! - **config**: configuration loading, validation, and default generation
//! - **constants**: defaults and validation limits
//! - **logger**: structured logging with visual formatting
//! - **args**: command line parsing for the binary

pub mod args;
pub mod astro;
pub mod calculator;
pub mod config;
pub mod constants;
pub mod events;
pub mod format;
pub mod logger;
pub mod math;
pub mod methods;
pub mod params;
pub mod pipeline;
pub mod solver;
pub mod timezone;

// Re-export important types for easier access
pub use calculator::{Coordinates, PrayTimes, TimesRequest, TimesRequestBuilder};
pub use config::Config;
pub use events::{FormattedTimes, PrayerEvent, PrayerTimes, TimeOffsets};
pub use format::{TimeFormat, format_time};
pub use logger::{Log, LogLevel};
pub use methods::{CalculationMethod, MethodCatalog};
pub use params::{AsrMethod, HighLatMethod, MidnightMethod, ParamKey, ParameterSet, Threshold};
