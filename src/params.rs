//! Calculation parameters.
//!
//! Each configurable key has a typed value. Twilight thresholds are either a sun
//! angle below the horizon or a minute offset from a reference event; the
//! remaining keys select a named rule. Values are resolved from their textual
//! form (`"18"`, `"90 min"`, `"Hanafi"`) once, when the configuration is built,
//! so the computation never inspects strings.

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Extract the first number in `text`, or 0 when there is none.
///
/// `"90 min"` gives 90, `"4.5"` gives 4.5 and `"min"` gives 0.
pub fn leading_number(text: &str) -> f64 {
    static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(number) = NUMBER.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").ok()) else {
        return 0.0;
    };

    number
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Number-or-string form used by the TOML configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawParam {
    Number(f64),
    Text(String),
}

/// A twilight threshold: either a sun angle below the horizon or a fixed
/// number of minutes relative to a reference event.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawParam")]
pub enum Threshold {
    /// Degrees below the horizon.
    Angle(f64),
    /// Minutes from the reference event (imsak before fajr, maghrib after
    /// sunset, isha after maghrib).
    Minutes(f64),
}

impl Threshold {
    /// Numeric magnitude regardless of the variant.
    pub fn value(&self) -> f64 {
        match self {
            Threshold::Angle(v) | Threshold::Minutes(v) => *v,
        }
    }

    pub fn is_minutes(&self) -> bool {
        matches!(self, Threshold::Minutes(_))
    }
}

impl FromStr for Threshold {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = leading_number(s);
        if s.contains("min") {
            Ok(Threshold::Minutes(value))
        } else {
            Ok(Threshold::Angle(value))
        }
    }
}

impl TryFrom<RawParam> for Threshold {
    type Error = anyhow::Error;

    fn try_from(raw: RawParam) -> Result<Self> {
        match raw {
            RawParam::Number(v) => Ok(Threshold::Angle(v)),
            RawParam::Text(s) => s.parse(),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Angle(v) => write!(f, "{}", v),
            Threshold::Minutes(v) => write!(f, "{} min", v),
        }
    }
}

/// Juristic rule for the Asr shadow length.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawParam")]
pub enum AsrMethod {
    /// Shadow equals object length (Shafi'i, Maliki, Hanbali).
    Standard,
    /// Shadow equals twice the object length.
    Hanafi,
    /// Explicit shadow factor.
    Factor(f64),
}

impl AsrMethod {
    pub fn shadow_factor(&self) -> f64 {
        match self {
            AsrMethod::Standard => 1.0,
            AsrMethod::Hanafi => 2.0,
            AsrMethod::Factor(factor) => *factor,
        }
    }
}

impl FromStr for AsrMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(AsrMethod::Standard),
            "hanafi" => Ok(AsrMethod::Hanafi),
            other => other
                .parse::<f64>()
                .map(AsrMethod::Factor)
                .map_err(|_| anyhow::anyhow!("Asr method must be 'Standard', 'Hanafi' or a shadow factor (got '{}')", s)),
        }
    }
}

impl TryFrom<RawParam> for AsrMethod {
    type Error = anyhow::Error;

    fn try_from(raw: RawParam) -> Result<Self> {
        match raw {
            RawParam::Number(v) => Ok(AsrMethod::Factor(v)),
            RawParam::Text(s) => s.parse(),
        }
    }
}

impl fmt::Display for AsrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsrMethod::Standard => f.write_str("Standard"),
            AsrMethod::Hanafi => f.write_str("Hanafi"),
            AsrMethod::Factor(factor) => write!(f, "{}", factor),
        }
    }
}

/// How midnight is placed between sunset and the next morning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawParam")]
pub enum MidnightMethod {
    /// Midpoint of sunset and sunrise.
    #[default]
    Standard,
    /// Midpoint of sunset and fajr.
    Jafari,
}

impl FromStr for MidnightMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(MidnightMethod::Standard),
            "jafari" => Ok(MidnightMethod::Jafari),
            _ => anyhow::bail!("Midnight method must be 'Standard' or 'Jafari' (got '{}')", s),
        }
    }
}

impl TryFrom<RawParam> for MidnightMethod {
    type Error = anyhow::Error;

    fn try_from(raw: RawParam) -> Result<Self> {
        match raw {
            RawParam::Text(s) => s.parse(),
            RawParam::Number(v) => anyhow::bail!("Midnight method must be a name, got {}", v),
        }
    }
}

impl fmt::Display for MidnightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidnightMethod::Standard => f.write_str("Standard"),
            MidnightMethod::Jafari => f.write_str("Jafari"),
        }
    }
}

/// Correction applied where twilight angles are not reached (high latitudes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawParam")]
pub enum HighLatMethod {
    /// No correction; undefined times stay undefined.
    None,
    /// Bound by half of the night.
    #[default]
    NightMiddle,
    /// Bound by one seventh of the night.
    OneSeventh,
    /// Bound by `angle / 60` of the night.
    AngleBased,
}

impl HighLatMethod {
    /// Fraction of the night an event may lie away from its reference.
    pub fn night_fraction(&self, angle: f64) -> f64 {
        match self {
            HighLatMethod::AngleBased => angle / 60.0,
            HighLatMethod::OneSeventh => 1.0 / 7.0,
            HighLatMethod::NightMiddle | HighLatMethod::None => 0.5,
        }
    }
}

impl FromStr for HighLatMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(HighLatMethod::None),
            "nightmiddle" => Ok(HighLatMethod::NightMiddle),
            "oneseventh" => Ok(HighLatMethod::OneSeventh),
            "anglebased" => Ok(HighLatMethod::AngleBased),
            _ => anyhow::bail!(
                "High latitude method must be 'None', 'NightMiddle', 'OneSeventh' or 'AngleBased' (got '{}')",
                s
            ),
        }
    }
}

impl TryFrom<RawParam> for HighLatMethod {
    type Error = anyhow::Error;

    fn try_from(raw: RawParam) -> Result<Self> {
        match raw {
            RawParam::Text(s) => s.parse(),
            RawParam::Number(v) => anyhow::bail!("High latitude method must be a name, got {}", v),
        }
    }
}

impl fmt::Display for HighLatMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HighLatMethod::None => "None",
            HighLatMethod::NightMiddle => "NightMiddle",
            HighLatMethod::OneSeventh => "OneSeventh",
            HighLatMethod::AngleBased => "AngleBased",
        };
        f.write_str(name)
    }
}

/// Minute offset that accepts `5`, `"5"` or `"5 min"`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "RawParam")]
pub struct MinuteOffset(pub f64);

impl From<RawParam> for MinuteOffset {
    fn from(raw: RawParam) -> Self {
        match raw {
            RawParam::Number(v) => MinuteOffset(v),
            RawParam::Text(s) => MinuteOffset(leading_number(&s)),
        }
    }
}

impl fmt::Display for MinuteOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

/// Names of the configurable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Imsak,
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    Midnight,
    HighLats,
}

impl ParamKey {
    pub const ALL: [ParamKey; 8] = [
        ParamKey::Imsak,
        ParamKey::Fajr,
        ParamKey::Dhuhr,
        ParamKey::Asr,
        ParamKey::Maghrib,
        ParamKey::Isha,
        ParamKey::Midnight,
        ParamKey::HighLats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::Imsak => "imsak",
            ParamKey::Fajr => "fajr",
            ParamKey::Dhuhr => "dhuhr",
            ParamKey::Asr => "asr",
            ParamKey::Maghrib => "maghrib",
            ParamKey::Isha => "isha",
            ParamKey::Midnight => "midnight",
            ParamKey::HighLats => "highLats",
        }
    }
}

impl FromStr for ParamKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace('_', "").to_ascii_lowercase();
        ParamKey::ALL
            .into_iter()
            .find(|key| key.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown parameter: {}", s))
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of calculation parameters. Any key may be absent.
///
/// Absent keys are resolved at computation time: thresholds fall back to an
/// angle of 0, `dhuhr` to 0 minutes, `asr` and `midnight` to `Standard`, and
/// `high_lats` to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSet {
    pub imsak: Option<Threshold>,
    pub fajr: Option<Threshold>,
    pub dhuhr: Option<MinuteOffset>,
    pub asr: Option<AsrMethod>,
    pub maghrib: Option<Threshold>,
    pub isha: Option<Threshold>,
    pub midnight: Option<MidnightMethod>,
    #[serde(alias = "highLats")]
    pub high_lats: Option<HighLatMethod>,
}

impl ParameterSet {
    /// Method-agnostic settings used underneath every calculation method.
    pub fn default_settings() -> Self {
        Self {
            imsak: Some(Threshold::Minutes(10.0)),
            dhuhr: Some(MinuteOffset(0.0)),
            asr: Some(AsrMethod::Standard),
            midnight: Some(MidnightMethod::Standard),
            high_lats: Some(HighLatMethod::NightMiddle),
            ..Self::default()
        }
    }

    /// Return a copy where every key present in `overrides` replaces ours.
    pub fn merged_with(&self, overrides: &ParameterSet) -> ParameterSet {
        ParameterSet {
            imsak: overrides.imsak.or(self.imsak),
            fajr: overrides.fajr.or(self.fajr),
            dhuhr: overrides.dhuhr.or(self.dhuhr),
            asr: overrides.asr.or(self.asr),
            maghrib: overrides.maghrib.or(self.maghrib),
            isha: overrides.isha.or(self.isha),
            midnight: overrides.midnight.or(self.midnight),
            high_lats: overrides.high_lats.or(self.high_lats),
        }
    }

    /// Fill keys we do not define from `defaults`, keeping our own values.
    pub fn with_defaults(&self, defaults: &ParameterSet) -> ParameterSet {
        defaults.merged_with(self)
    }

    /// Set one key from its textual form, e.g. `("isha", "90 min")`.
    pub fn set(&mut self, key: ParamKey, value: &str) -> Result<()> {
        match key {
            ParamKey::Imsak => self.imsak = Some(value.parse()?),
            ParamKey::Fajr => self.fajr = Some(value.parse()?),
            ParamKey::Dhuhr => self.dhuhr = Some(MinuteOffset(leading_number(value))),
            ParamKey::Asr => self.asr = Some(value.parse()?),
            ParamKey::Maghrib => self.maghrib = Some(value.parse()?),
            ParamKey::Isha => self.isha = Some(value.parse()?),
            ParamKey::Midnight => self.midnight = Some(value.parse()?),
            ParamKey::HighLats => self.high_lats = Some(value.parse()?),
        }
        Ok(())
    }

    /// Textual value of one key, if set.
    pub fn get(&self, key: ParamKey) -> Option<String> {
        match key {
            ParamKey::Imsak => self.imsak.map(|v| v.to_string()),
            ParamKey::Fajr => self.fajr.map(|v| v.to_string()),
            ParamKey::Dhuhr => self.dhuhr.map(|v| v.to_string()),
            ParamKey::Asr => self.asr.map(|v| v.to_string()),
            ParamKey::Maghrib => self.maghrib.map(|v| v.to_string()),
            ParamKey::Isha => self.isha.map(|v| v.to_string()),
            ParamKey::Midnight => self.midnight.map(|v| v.to_string()),
            ParamKey::HighLats => self.high_lats.map(|v| v.to_string()),
        }
    }

    /// Keys with no value.
    pub fn missing_keys(&self) -> Vec<ParamKey> {
        ParamKey::ALL
            .into_iter()
            .filter(|key| self.get(*key).is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.missing_keys().len() == ParamKey::ALL.len()
    }

    /// Resolve absent keys to their fallbacks for computation.
    pub fn resolve(&self) -> ResolvedParameters {
        ResolvedParameters {
            imsak: self.imsak.unwrap_or(Threshold::Angle(0.0)),
            fajr: self.fajr.unwrap_or(Threshold::Angle(0.0)),
            dhuhr_minutes: self.dhuhr.map_or(0.0, |m| m.0),
            asr: self.asr.unwrap_or(AsrMethod::Standard),
            maghrib: self.maghrib.unwrap_or(Threshold::Angle(0.0)),
            isha: self.isha.unwrap_or(Threshold::Angle(0.0)),
            midnight: self.midnight.unwrap_or_default(),
            high_lats: self.high_lats.unwrap_or(HighLatMethod::None),
        }
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = ParamKey::ALL
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| format!("{}: {}", key, value)))
            .collect();
        write!(f, "{}", entries.join(", "))
    }
}

/// Fully specified parameters, as consumed by the adjustment pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParameters {
    pub imsak: Threshold,
    pub fajr: Threshold,
    pub dhuhr_minutes: f64,
    pub asr: AsrMethod,
    pub maghrib: Threshold,
    pub isha: Threshold,
    pub midnight: MidnightMethod,
    pub high_lats: HighLatMethod,
}
