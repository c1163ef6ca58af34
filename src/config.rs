//! Configuration system for praytimes.
//!
//! Settings are read from `praytimes.toml` in the user's config directory
//! (`$XDG_CONFIG_HOME/praytimes/praytimes.toml` on Linux). A commented default
//! file is written on first use. Every field is optional; command line flags
//! override whatever the file sets.
//!
//! ```toml
//! #[Calculation]
//! method = "MWL"                   # MWL, ISNA, Egypt, Makkah, Karachi, Tehran or Jafari
//! iterations = 1                   # Solver refinement passes (1-10)
//!
//! #[Location]
//! latitude = 21.4225               # Degrees, positive north
//! longitude = 39.8262              # Degrees, positive east
//! elevation = 0.0                  # Meters above sea level
//! timezone = 3.0                   # Hours from UTC; omit to use the system timezone
//! dst = false                      # Add one hour for daylight saving time
//!
//! #[Output]
//! time_format = "24h"              # "24h", "12h", "12hNS" or "Float"
//! time_suffixes = ["am", "pm"]     # Suffixes for the 12h format
//! tune = [0, 0, 0, 0, 0, 0, 0, 0, 0]
//!
//! [adjust]                         # Overrides merged over the method
//! asr = "Hanafi"
//! isha = "90 min"
//! ```
//!
//! ## Validation
//!
//! - `method` must name a known calculation method
//! - `iterations` must lie within 1-10
//! - `timezone` must lie within -12 to +14 hours
//! - `tune` must have exactly nine entries, in the order imsak, fajr, sunrise,
//!   dhuhr, asr, sunset, maghrib, isha, midnight
//! - `time_suffixes` must have exactly two entries
//!
//! Latitude and longitude are deliberately not range-checked.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::calculator::{Coordinates, PrayTimes};
use crate::constants::*;
use crate::events::TimeOffsets;
use crate::format::{DEFAULT_SUFFIXES, TimeFormat};
use crate::logger::Log;
use crate::methods::MethodCatalog;
use crate::params::ParameterSet;

/// Contents of `praytimes.toml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Calculation method id (`"MWL"`, `"ISNA"`, ...).
    pub method: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>, // meters
    pub timezone: Option<f64>,  // hours from UTC; system timezone when absent
    pub dst: Option<bool>,
    pub time_format: Option<TimeFormat>,
    pub time_suffixes: Option<Vec<String>>,
    pub iterations: Option<u32>,
    /// Per-event minute offsets in canonical event order.
    pub tune: Option<Vec<i32>>,
    /// Parameter overrides merged over the selected method.
    pub adjust: Option<ParameterSet>,
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Write a commented default configuration to `path`.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let methods = MethodCatalog::builtin().ids().join(", ");

        let config_content = ConfigBuilder::new()
            .add_section("Calculation")
            .add_setting(
                "method",
                &format!("\"{}\"", DEFAULT_METHOD),
                &format!("One of {}", methods),
            )
            .add_setting(
                "iterations",
                &DEFAULT_ITERATIONS.to_string(),
                &format!(
                    "Solver refinement passes ({}-{})",
                    MINIMUM_ITERATIONS, MAXIMUM_ITERATIONS
                ),
            )
            .add_section("Location")
            .add_setting(
                "latitude",
                &format!("{:.4}", DEFAULT_LATITUDE),
                "Degrees, positive north",
            )
            .add_setting(
                "longitude",
                &format!("{:.4}", DEFAULT_LONGITUDE),
                "Degrees, positive east",
            )
            .add_setting(
                "elevation",
                &format!("{:.1}", DEFAULT_ELEVATION),
                "Meters above sea level",
            )
            .add_setting(
                "#timezone",
                "3.0",
                "Hours from UTC; leave commented to use the system timezone",
            )
            .add_setting(
                "dst",
                "false",
                "Add one hour for daylight saving time when timezone is set",
            )
            .add_section("Output")
            .add_setting(
                "time_format",
                &format!("\"{}\"", DEFAULT_TIME_FORMAT),
                "\"24h\", \"12h\", \"12hNS\" or \"Float\"",
            )
            .add_setting(
                "time_suffixes",
                &format!("[\"{}\", \"{}\"]", DEFAULT_SUFFIXES[0], DEFAULT_SUFFIXES[1]),
                "Suffixes for the 12h format",
            )
            .add_setting(
                "tune",
                "[0, 0, 0, 0, 0, 0, 0, 0, 0]",
                "Minutes added to imsak, fajr, sunrise, dhuhr, asr, sunset, maghrib, isha, midnight",
            )
            .add_table("adjust", "Overrides merged over the method")
            .add_setting("asr", "\"Standard\"", "\"Standard\", \"Hanafi\" or a shadow factor")
            .add_setting(
                "high_lats",
                "\"NightMiddle\"",
                "\"None\", \"NightMiddle\", \"OneSeventh\" or \"AngleBased\"",
            )
            .add_setting("#isha", "\"90 min\"", "An angle in degrees or minutes after maghrib")
            .build();

        fs::write(path, config_content)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;

        Log::log_indented(&format!("Created default configuration at {}", path.display()));
        Ok(())
    }

    /// Check field values and fix up the ones that can be recovered.
    fn apply_defaults_and_validate_fields(config: &mut Config) -> Result<()> {
        if let Some(method) = &config.method {
            let Some(found) = MethodCatalog::builtin().lookup(method) else {
                anyhow::bail!(
                    "Unknown calculation method '{}'. Available methods: {}",
                    method,
                    MethodCatalog::builtin().ids().join(", ")
                );
            };
            // Normalize case so later lookups hit the exact key
            config.method = Some(found.id.to_string());
        } else {
            config.method = Some(DEFAULT_METHOD.to_string());
        }

        if let Some(iterations) = config.iterations {
            if !(MINIMUM_ITERATIONS..=MAXIMUM_ITERATIONS).contains(&iterations) {
                anyhow::bail!(
                    "Iterations must be between {} and {} (got {})",
                    MINIMUM_ITERATIONS,
                    MAXIMUM_ITERATIONS,
                    iterations
                );
            }
        } else {
            config.iterations = Some(DEFAULT_ITERATIONS);
        }

        if let Some(timezone) = config.timezone {
            if !(MINIMUM_TIMEZONE..=MAXIMUM_TIMEZONE).contains(&timezone) {
                anyhow::bail!(
                    "Timezone must be between {} and {} hours (got {})",
                    MINIMUM_TIMEZONE,
                    MAXIMUM_TIMEZONE,
                    timezone
                );
            }
        }

        if let Some(suffixes) = &config.time_suffixes {
            if suffixes.len() != 2 {
                anyhow::bail!(
                    "time_suffixes must have exactly two entries (got {})",
                    suffixes.len()
                );
            }
        }

        if let Some(tune) = &mut config.tune {
            TimeOffsets::from_slice(tune).context("Invalid tune setting in config")?;
            for minutes in tune.iter_mut() {
                if minutes.abs() > MAXIMUM_TUNE_MINUTES {
                    Log::log_warning(&format!(
                        "Ignoring tune offset of {} minutes (limit is {})",
                        minutes, MAXIMUM_TUNE_MINUTES
                    ));
                    *minutes = 0;
                }
            }
        }

        if config.elevation.unwrap_or(DEFAULT_ELEVATION) < 0.0 {
            Log::log_warning("Negative elevation is treated as sea level");
        }

        Ok(())
    }

    /// Load and validate a configuration file. Does not create a missing file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Self::apply_defaults_and_validate_fields(&mut config)?;
        validate_config(&config)?;

        Ok(config)
    }

    /// Load the configuration from the default location, creating it first
    /// if it does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// Configured location, if both coordinates are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(
                Coordinates::new(latitude, longitude)
                    .with_elevation(self.elevation.unwrap_or(DEFAULT_ELEVATION)),
            ),
            _ => None,
        }
    }

    /// Apply every calculation setting to `calculator`.
    pub fn apply_to(&self, calculator: &mut PrayTimes) -> Result<()> {
        if let Some(method) = &self.method {
            calculator.set_method(method)?;
        }
        if let Some(adjust) = &self.adjust {
            calculator.adjust_merge(adjust);
        }
        if let Some(tune) = &self.tune {
            calculator.tune(TimeOffsets::from_slice(tune)?);
        }
        if let Some(format) = self.time_format {
            calculator.set_format(format);
        }
        if let Some([am, pm]) = self.time_suffixes.as_deref() {
            calculator.set_suffixes(am, pm);
        }
        calculator.set_iterations(self.iterations.unwrap_or(DEFAULT_ITERATIONS));
        Ok(())
    }

    pub fn log_config(&self, path: &Path) {
        Log::log_block_start(&format!("Loaded configuration from {}", path.display()));

        Log::log_indented(&format!(
            "Method: {}",
            self.method.as_deref().unwrap_or(DEFAULT_METHOD)
        ));

        if let Some(coordinates) = self.coordinates() {
            let lat_dir = if coordinates.latitude >= 0.0 { "N" } else { "S" };
            let lon_dir = if coordinates.longitude >= 0.0 { "E" } else { "W" };
            Log::log_indented(&format!(
                "Location: {:.4}°{}, {:.4}°{} at {} m",
                coordinates.latitude.abs(),
                lat_dir,
                coordinates.longitude.abs(),
                lon_dir,
                coordinates.elevation
            ));
        } else {
            Log::log_indented("Location: not configured");
        }

        match self.timezone {
            Some(timezone) => Log::log_indented(&format!(
                "Timezone: UTC{:+}{}",
                timezone,
                if self.dst.unwrap_or(false) { " (DST)" } else { "" }
            )),
            None => Log::log_indented("Timezone: system"),
        }

        Log::log_indented(&format!(
            "Time format: {}",
            self.time_format.unwrap_or(DEFAULT_TIME_FORMAT)
        ));

        if let Some(adjust) = &self.adjust {
            if !adjust.is_empty() {
                Log::log_indented(&format!("Adjustments: {}", adjust));
            }
        }
        if let Some(tune) = &self.tune {
            if tune.iter().any(|minutes| *minutes != 0) {
                Log::log_indented(&format!("Tuning: {:?}", tune));
            }
        }
    }
}

/// Cross-field checks run after individual fields are validated.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.latitude.is_some() != config.longitude.is_some() {
        anyhow::bail!("latitude and longitude must be set together");
    }

    if config.dst.unwrap_or(false) && config.timezone.is_none() {
        Log::log_warning("dst is ignored without an explicit timezone; the system timezone already includes it");
    }

    for (name, value) in [
        ("latitude", config.latitude),
        ("longitude", config.longitude),
        ("elevation", config.elevation),
    ] {
        if let Some(value) = value {
            if !value.is_finite() {
                anyhow::bail!("{} must be a finite number (got {})", name, value);
            }
        }
    }

    Ok(())
}

/// Builder for configuration files with aligned trailing comments.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Table { header: String, comment: String },
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Comment heading for a group of top-level settings.
    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{}]", title)));
        self
    }

    /// Real TOML table header; settings added after it belong to the table.
    fn add_table(mut self, name: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Table {
            header: format!("[{}]", name),
            comment: format!("# {}", comment),
        });
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{} = {}", key, value),
            comment: format!("# {}", comment),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Table { header, .. } => Some(header.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        for (index, entry) in self.entries.into_iter().enumerate() {
            match entry {
                ConfigEntry::Section(title) => {
                    if index > 0 {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Table { header, comment } => {
                    result.push(String::new());
                    let padding = " ".repeat(max_width - header.len());
                    result.push(format!("{}{}{}", header, padding, comment));
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}
