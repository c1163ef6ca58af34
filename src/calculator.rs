//! The prayer times calculator.
//!
//! A [`PrayTimes`] value owns its configuration: the selected method, the active
//! parameter set, tuning offsets and display format. Independent instances share
//! nothing, so each thread (or each user) can hold its own. Mutating one
//! instance while another thread reads it requires the caller's own
//! synchronization; nothing inside is shared or locked.
//!
//! ```
//! use chrono::NaiveDate;
//! use praytimes::{Coordinates, PrayTimes, PrayerEvent, TimesRequest};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut calculator = PrayTimes::new();
//! calculator.set_method("ISNA")?;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
//! let request = TimesRequest::builder(date, Coordinates::new(43.0, -80.0))
//!     .timezone(-5.0)
//!     .dst(true)
//!     .build()?;
//!
//! let times = calculator.get_times(&request);
//! assert_eq!(times.get(PrayerEvent::Fajr), "03:53");
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

use crate::astro::julian_day;
use crate::constants::{
    DEFAULT_ELEVATION, DEFAULT_ITERATIONS, DEFAULT_METHOD, DEFAULT_TIME_FORMAT, DEFAULT_TIMEZONE,
    MAXIMUM_TIMEZONE, MINIMUM_TIMEZONE,
};
use crate::events::{FormattedTimes, PrayerEvent, PrayerTimes, TimeOffsets};
use crate::format::{DEFAULT_SUFFIXES, TimeFormat, format_time};
use crate::logger::Log;
use crate::methods::MethodCatalog;
use crate::params::ParameterSet;
use crate::pipeline::{PipelineInput, compute_times};

/// Geographic position of the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Meters above sea level.
    pub elevation: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: DEFAULT_ELEVATION,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }
}

/// A validated request for one day's times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimesRequest {
    date: NaiveDate,
    coordinates: Coordinates,
    timezone: f64,
    dst: bool,
    format: Option<TimeFormat>,
}

impl TimesRequest {
    /// Start a request for `date` at `coordinates`, in UTC with no DST and the
    /// calculator's current format.
    pub fn builder(date: NaiveDate, coordinates: Coordinates) -> TimesRequestBuilder {
        TimesRequestBuilder {
            date,
            coordinates,
            timezone: DEFAULT_TIMEZONE,
            dst: false,
            format: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Standard offset from UTC in hours, without DST.
    pub fn timezone(&self) -> f64 {
        self.timezone
    }

    pub fn dst(&self) -> bool {
        self.dst
    }

    /// Offset from UTC actually used for the computation.
    pub fn effective_timezone(&self) -> f64 {
        if self.dst {
            self.timezone + 1.0
        } else {
            self.timezone
        }
    }

    pub fn format(&self) -> Option<TimeFormat> {
        self.format
    }
}

/// Builder for [`TimesRequest`].
#[derive(Debug, Clone, Copy)]
pub struct TimesRequestBuilder {
    date: NaiveDate,
    coordinates: Coordinates,
    timezone: f64,
    dst: bool,
    format: Option<TimeFormat>,
}

impl TimesRequestBuilder {
    /// Hours from UTC, e.g. `-5.0` or `5.5`.
    pub fn timezone(mut self, hours: f64) -> Self {
        self.timezone = hours;
        self
    }

    /// Whether daylight saving time is in effect (adds one hour).
    pub fn dst(mut self, dst: bool) -> Self {
        self.dst = dst;
        self
    }

    /// Display format for this request; it also becomes the calculator's format.
    pub fn format(mut self, format: TimeFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Validate and build the request.
    ///
    /// Coordinates must be finite and the timezone must lie in the range of
    /// real-world offsets. Latitude and longitude ranges are not checked.
    pub fn build(self) -> Result<TimesRequest> {
        let Coordinates {
            latitude,
            longitude,
            elevation,
        } = self.coordinates;

        for (name, value) in [
            ("latitude", latitude),
            ("longitude", longitude),
            ("elevation", elevation),
        ] {
            if !value.is_finite() {
                anyhow::bail!("{} must be a finite number (got {})", name, value);
            }
        }

        if !(MINIMUM_TIMEZONE..=MAXIMUM_TIMEZONE).contains(&self.timezone) {
            anyhow::bail!(
                "Timezone must be between {} and {} hours (got {})",
                MINIMUM_TIMEZONE,
                MAXIMUM_TIMEZONE,
                self.timezone
            );
        }

        Ok(TimesRequest {
            date: self.date,
            coordinates: self.coordinates,
            timezone: self.timezone,
            dst: self.dst,
            format: self.format,
        })
    }
}

/// Prayer times calculator with its own configuration.
#[derive(Debug, Clone)]
pub struct PrayTimes {
    method: String,
    settings: ParameterSet,
    offsets: TimeOffsets,
    format: TimeFormat,
    suffixes: [String; 2],
    iterations: u32,
}

impl Default for PrayTimes {
    fn default() -> Self {
        Self::new()
    }
}

impl PrayTimes {
    /// Calculator using the default method (Muslim World League).
    pub fn new() -> Self {
        let settings = MethodCatalog::builtin()
            .lookup(DEFAULT_METHOD)
            .map(|method| ParameterSet::default_settings().merged_with(&method.params))
            .unwrap_or_else(ParameterSet::default_settings);

        Self {
            method: DEFAULT_METHOD.to_string(),
            settings,
            offsets: TimeOffsets::default(),
            format: DEFAULT_TIME_FORMAT,
            suffixes: DEFAULT_SUFFIXES.map(str::to_string),
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Calculator using the named method.
    pub fn with_method(name: &str) -> Result<Self> {
        let mut calculator = Self::new();
        calculator.set_method(name)?;
        Ok(calculator)
    }

    /// Select a calculation method by name.
    ///
    /// The method's parameters are layered over the default settings and
    /// replace the active settings. An unknown name is an error and leaves the
    /// current method in place.
    pub fn set_method(&mut self, name: &str) -> Result<()> {
        let Some(method) = MethodCatalog::builtin().lookup(name) else {
            Log::log_warning(&format!(
                "Unknown calculation method '{}', keeping {}",
                name, self.method
            ));
            anyhow::bail!(
                "Unknown calculation method '{}'. Available methods: {}",
                name,
                MethodCatalog::builtin().ids().join(", ")
            );
        };

        self.method = method.id.to_string();
        self.settings = ParameterSet::default_settings().merged_with(&method.params);
        Log::log_debug(&format!("Calculation method set to {} ({})", method.id, method.name));
        Ok(())
    }

    /// Replace the active settings entirely.
    ///
    /// Keys absent from `params` fall back to angle 0 or rule `None` when times
    /// are computed. Use [`PrayTimes::adjust_merge`] to change only some keys.
    pub fn adjust(&mut self, params: ParameterSet) {
        let missing = params.missing_keys();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|key| key.as_str()).collect();
            Log::log_warning(&format!(
                "Settings replaced without {}; these fall back to defaults of 0 or None",
                names.join(", ")
            ));
        }
        self.settings = params;
    }

    /// Override only the keys present in `params`.
    pub fn adjust_merge(&mut self, params: &ParameterSet) {
        self.settings = self.settings.merged_with(params);
    }

    /// Replace the tuning offsets.
    pub fn tune(&mut self, offsets: TimeOffsets) {
        self.offsets = offsets;
    }

    /// Set the tuning offset of a single event.
    pub fn tune_event(&mut self, event: PrayerEvent, minutes: i32) {
        self.offsets.set(event, minutes);
    }

    pub fn set_format(&mut self, format: TimeFormat) {
        self.format = format;
    }

    /// Suffixes for the 12-hour format, e.g. `(" AM", " PM")`.
    pub fn set_suffixes(&mut self, am: &str, pm: &str) {
        self.suffixes = [am.to_string(), pm.to_string()];
    }

    /// Number of solver refinement passes, at least 1.
    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations.max(1);
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn settings(&self) -> ParameterSet {
        self.settings
    }

    pub fn offsets(&self) -> TimeOffsets {
        self.offsets
    }

    pub fn format(&self) -> TimeFormat {
        self.format
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Compute fractional-hour times for a request. Events that do not occur
    /// are NaN.
    pub fn compute(&self, request: &TimesRequest) -> PrayerTimes {
        let date = request.date();
        let input = PipelineInput {
            julian_day: julian_day(date.year(), date.month(), date.day()),
            coordinates: request.coordinates(),
            timezone: request.effective_timezone(),
            iterations: self.iterations,
        };
        compute_times(&input, &self.settings.resolve(), &self.offsets)
    }

    /// Compute and format the times for a request.
    ///
    /// A format carried by the request becomes the calculator's format for
    /// later calls as well.
    pub fn get_times(&mut self, request: &TimesRequest) -> FormattedTimes {
        if let Some(format) = request.format() {
            self.format = format;
        }
        let times = self.compute(request);
        self.format_times(&times)
    }

    /// Format computed times with the current format and suffixes.
    pub fn format_times(&self, times: &PrayerTimes) -> FormattedTimes {
        let suffixes = [self.suffixes[0].as_str(), self.suffixes[1].as_str()];
        FormattedTimes::new(PrayerEvent::ALL.map(|event| {
            format_time(times.get(event), self.format, &suffixes)
        }))
    }

    /// Parse a date in `YYYY-MM-DD` form.
    pub fn parse_date(text: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", text))
    }
}
