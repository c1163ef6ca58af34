//! The nine daily events and the containers that hold one value per event.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// One of the nine computed daily events, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrayerEvent {
    Imsak,
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Sunset,
    Maghrib,
    Isha,
    Midnight,
}

impl PrayerEvent {
    /// All events in canonical order. Tuning offsets follow this order.
    pub const ALL: [PrayerEvent; 9] = [
        PrayerEvent::Imsak,
        PrayerEvent::Fajr,
        PrayerEvent::Sunrise,
        PrayerEvent::Dhuhr,
        PrayerEvent::Asr,
        PrayerEvent::Sunset,
        PrayerEvent::Maghrib,
        PrayerEvent::Isha,
        PrayerEvent::Midnight,
    ];

    /// Lowercase key used in result maps (`"fajr"`, `"midnight"`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            PrayerEvent::Imsak => "imsak",
            PrayerEvent::Fajr => "fajr",
            PrayerEvent::Sunrise => "sunrise",
            PrayerEvent::Dhuhr => "dhuhr",
            PrayerEvent::Asr => "asr",
            PrayerEvent::Sunset => "sunset",
            PrayerEvent::Maghrib => "maghrib",
            PrayerEvent::Isha => "isha",
            PrayerEvent::Midnight => "midnight",
        }
    }

    /// Capitalized display name.
    pub fn name(&self) -> &'static str {
        match self {
            PrayerEvent::Imsak => "Imsak",
            PrayerEvent::Fajr => "Fajr",
            PrayerEvent::Sunrise => "Sunrise",
            PrayerEvent::Dhuhr => "Dhuhr",
            PrayerEvent::Asr => "Asr",
            PrayerEvent::Sunset => "Sunset",
            PrayerEvent::Maghrib => "Maghrib",
            PrayerEvent::Isha => "Isha",
            PrayerEvent::Midnight => "Midnight",
        }
    }

    /// Position in the canonical order.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PrayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrayerEvent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        PrayerEvent::ALL
            .into_iter()
            .find(|event| event.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown prayer event: {}", s))
    }
}

/// Fractional-hour values for all nine events.
///
/// A value is either in `[0, 24)` or NaN when the event does not occur at the
/// requested latitude and date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrayerTimes {
    hours: [f64; 9],
}

impl PrayerTimes {
    pub fn new(hours: [f64; 9]) -> Self {
        Self { hours }
    }

    pub fn get(&self, event: PrayerEvent) -> f64 {
        self.hours[event.index()]
    }

    /// Whether the event has a defined time.
    pub fn is_defined(&self, event: PrayerEvent) -> bool {
        !self.get(event).is_nan()
    }

    /// Iterate `(event, hours)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (PrayerEvent, f64)> + '_ {
        PrayerEvent::ALL
            .into_iter()
            .map(move |event| (event, self.get(event)))
    }

    pub fn as_array(&self) -> &[f64; 9] {
        &self.hours
    }
}

impl Index<PrayerEvent> for PrayerTimes {
    type Output = f64;

    fn index(&self, event: PrayerEvent) -> &f64 {
        &self.hours[event.index()]
    }
}

impl IndexMut<PrayerEvent> for PrayerTimes {
    fn index_mut(&mut self, event: PrayerEvent) -> &mut f64 {
        &mut self.hours[event.index()]
    }
}

/// Per-event minute corrections applied after every other adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeOffsets([i32; 9]);

impl TimeOffsets {
    pub fn new(minutes: [i32; 9]) -> Self {
        Self(minutes)
    }

    /// Build offsets from a slice that must contain exactly nine values.
    pub fn from_slice(minutes: &[i32]) -> Result<Self> {
        let minutes: [i32; 9] = minutes.try_into().map_err(|_| {
            anyhow::anyhow!(
                "Expected 9 tuning offsets ({}), got {}",
                PrayerEvent::ALL.map(|event| event.key()).join(", "),
                minutes.len()
            )
        })?;
        Ok(Self(minutes))
    }

    pub fn get(&self, event: PrayerEvent) -> i32 {
        self.0[event.index()]
    }

    pub fn set(&mut self, event: PrayerEvent, minutes: i32) {
        self.0[event.index()] = minutes;
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&minutes| minutes == 0)
    }

    pub fn as_array(&self) -> &[i32; 9] {
        &self.0
    }
}

impl FromStr for TimeOffsets {
    type Err = anyhow::Error;

    /// Parse a comma-separated list such as `"0,2,0,0,0,0,3,0,0"`.
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<i32>()
                    .map_err(|e| anyhow::anyhow!("Invalid tuning offset '{}': {}", part.trim(), e))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_slice(&values)
    }
}

/// Display strings for all nine events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedTimes {
    values: [String; 9],
}

impl FormattedTimes {
    pub fn new(values: [String; 9]) -> Self {
        Self { values }
    }

    pub fn get(&self, event: PrayerEvent) -> &str {
        &self.values[event.index()]
    }

    /// Look up a value by lowercase event key.
    pub fn by_key(&self, key: &str) -> Option<&str> {
        key.parse::<PrayerEvent>().ok().map(|event| self.get(event))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrayerEvent, &str)> + '_ {
        PrayerEvent::ALL
            .into_iter()
            .map(move |event| (event, self.get(event)))
    }

    /// Mapping from lowercase event key to display string.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        self.iter()
            .map(|(event, value)| (event.key(), value.to_string()))
            .collect()
    }
}
