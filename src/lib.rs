use chrono::{Datelike, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{
    COARSE_REFRESH_MS, DEFAULT_GRANULARITY, MAX_DATE, MAX_GRANULARITY, MILLIS_REFRESH_MS,
    MIN_DATE, SECONDS_REFRESH_MS,
};

pub mod config;
pub mod datebook;
pub mod engine;
pub mod state;
pub mod storage;

pub use datebook::DateBook;

/// Milliseconds per display unit
pub mod millis {
    pub const PER_SECOND: u64 = 1_000;
    pub const PER_MINUTE: u64 = 60 * PER_SECOND;
    pub const PER_HOUR: u64 = 60 * PER_MINUTE;
    pub const PER_DAY: u64 = 24 * PER_HOUR;
}

/// Date format used on the wire and in `<input type="date">`.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// A user-named calendar date, as listed in the menu and stored under `dates`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedDate {
    /// Unique, non-empty label; also the key the active counter refers to.
    pub name: String,
    /// Target day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

/// Reasons a new date is not added to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRejected {
    /// The name is empty after trimming.
    EmptyName,
    /// No date was entered.
    MissingDate,
    /// The date text is not `YYYY-MM-DD` or names a non-existent day.
    InvalidDate(String),
    /// The date lies outside [`min_date`]..=[`max_date`].
    OutOfRange(NaiveDate),
    /// Another entry already uses this name.
    DuplicateName(String),
}

impl fmt::Display for DateRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRejected::EmptyName => write!(f, "Name cannot be empty"),
            DateRejected::MissingDate => write!(f, "Date cannot be empty"),
            DateRejected::InvalidDate(raw) => {
                write!(f, "Invalid date '{}', expected YYYY-MM-DD", raw)
            }
            DateRejected::OutOfRange(date) => write!(
                f,
                "Date {} is outside the supported range ({} to {})",
                date,
                min_date(),
                max_date()
            ),
            DateRejected::DuplicateName(name) => {
                write!(f, "A date named '{}' already exists", name)
            }
        }
    }
}

impl std::error::Error for DateRejected {}

impl NamedDate {
    /// Create an entry without validation.
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
        }
    }

    /// Build an entry from raw form input.
    ///
    /// The name is trimmed; the date must be `YYYY-MM-DD` and fall inside
    /// [`min_date`]..=[`max_date`].
    pub fn parse(name: &str, date: &str) -> Result<Self, DateRejected> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DateRejected::EmptyName);
        }
        let date = parse_iso_date(date)?;
        if date < min_date() || date > max_date() {
            return Err(DateRejected::OutOfRange(date));
        }
        Ok(Self::new(name, date))
    }
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, DateRejected> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateRejected::MissingDate);
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map_err(|_| DateRejected::InvalidDate(trimmed.to_string()))
}

/// `YYYY-MM-DD`, the stored and `<input type="date">` representation.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// `dd/mm/yyyy`, as shown in the date list.
pub fn format_display_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

/// Earliest date accepted for a new entry.
pub fn min_date() -> NaiveDate {
    let (y, m, d) = MIN_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Latest date accepted for a new entry.
pub fn max_date() -> NaiveDate {
    let (y, m, d) = MAX_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MAX)
}

/// The counter currently being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCounter {
    /// Name of the [`NamedDate`] being counted.
    pub name: String,
    /// Its date; the countdown targets local midnight at the start of it.
    pub date: NaiveDate,
}

impl ActiveCounter {
    /// Target instant in epoch milliseconds.
    pub fn target_ms(&self) -> i64 {
        local_midnight_ms(self.date)
    }
}

impl From<&NamedDate> for ActiveCounter {
    fn from(entry: &NamedDate) -> Self {
        Self {
            name: entry.name.clone(),
            date: entry.date,
        }
    }
}

/// Epoch milliseconds of local midnight at the start of `date`.
pub fn local_midnight_ms(date: NaiveDate) -> i64 {
    midnight_ms_in(&Local, date)
}

/// Epoch milliseconds of midnight at the start of `date` in `tz`.
///
/// When midnight falls inside a DST gap the first valid instant one hour later
/// is used; if that cannot be resolved either the date is read as UTC.
pub fn midnight_ms_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(instant) => instant.timestamp_millis(),
        None => {
            let shifted = midnight + chrono::Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|instant| instant.timestamp_millis())
                .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
        }
    }
}

/// Color scheme, stored as `"light"` / `"dark"` under `theme-data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// `None` for anything but `light` or `dark`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the five display units, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 5] = [
        TimeUnit::Days,
        TimeUnit::Hours,
        TimeUnit::Minutes,
        TimeUnit::Seconds,
        TimeUnit::Milliseconds,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Days => "days",
            TimeUnit::Hours => "hours",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Milliseconds => "milliseconds",
        }
    }
}

/// How many units are shown (level + 1) and how often the display refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Granularity(u8);

impl Granularity {
    pub const MAX: Granularity = Granularity(MAX_GRANULARITY);

    /// Returns `None` when `level` is above 4.
    pub fn new(level: u8) -> Option<Self> {
        (level <= MAX_GRANULARITY).then_some(Self(level))
    }

    /// 0 = days only, 4 = down to milliseconds.
    pub fn level(self) -> u8 {
        self.0
    }

    /// 0 → 1 → 2 → 3 → 4 → 0
    pub fn next(self) -> Self {
        Self((self.0 + 1) % (MAX_GRANULARITY + 1))
    }

    /// Tick period: 1000 ms for levels 0-2, 250 ms for 3, 125 ms for 4.
    pub fn refresh_ms(self) -> u32 {
        match self.0 {
            0..=2 => COARSE_REFRESH_MS,
            3 => SECONDS_REFRESH_MS,
            _ => MILLIS_REFRESH_MS,
        }
    }

    pub fn visible_units(self) -> usize {
        self.0 as usize + 1
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self(DEFAULT_GRANULARITY)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `target - now` in milliseconds; positive while the target lies ahead.
#[inline]
pub fn delta_ms(target_ms: i64, now_ms: i64) -> i64 {
    target_ms.saturating_sub(now_ms)
}

/// Whether the target is still ahead or already reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Target in the future (`delta > 0`).
    Until,
    /// Target now or in the past (`delta <= 0`).
    Since,
}

impl Direction {
    pub fn of(delta: i64) -> Self {
        if delta > 0 {
            Direction::Until
        } else {
            Direction::Since
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Until => "Until",
            Direction::Since => "Since",
        }
    }
}

/// `|delta|` split into day/hour/minute/second/millisecond buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBreakdown {
    /// Whole days, unbounded.
    pub days: u64,
    /// 0-23
    pub hours: u64,
    /// 0-59
    pub minutes: u64,
    /// 0-59
    pub seconds: u64,
    /// 0-999
    pub milliseconds: u64,
}

impl TimeBreakdown {
    pub fn from_delta(delta: i64) -> Self {
        let abs = delta.unsigned_abs();
        Self {
            days: abs / millis::PER_DAY,
            hours: (abs / millis::PER_HOUR) % 24,
            minutes: (abs / millis::PER_MINUTE) % 60,
            seconds: (abs / millis::PER_SECOND) % 60,
            milliseconds: abs % millis::PER_SECOND,
        }
    }

    /// Reassemble the absolute delta. Saturates instead of overflowing.
    pub fn total_ms(&self) -> u64 {
        self.days
            .saturating_mul(millis::PER_DAY)
            .saturating_add(self.hours * millis::PER_HOUR)
            .saturating_add(self.minutes * millis::PER_MINUTE)
            .saturating_add(self.seconds * millis::PER_SECOND)
            .saturating_add(self.milliseconds)
    }

    pub fn value(&self, unit: TimeUnit) -> u64 {
        match unit {
            TimeUnit::Days => self.days,
            TimeUnit::Hours => self.hours,
            TimeUnit::Minutes => self.minutes,
            TimeUnit::Seconds => self.seconds,
            TimeUnit::Milliseconds => self.milliseconds,
        }
    }

    /// The first `granularity + 1` units, most significant first.
    pub fn visible(&self, granularity: Granularity) -> Vec<(TimeUnit, u64)> {
        TimeUnit::ALL
            .iter()
            .take(granularity.visible_units())
            .map(|&unit| (unit, self.value(unit)))
            .collect()
    }
}

/// Everything the counter view needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterReading {
    /// "Until" or "Since" label source.
    pub direction: Direction,
    /// Visible units with their values, most significant first.
    pub units: Vec<(TimeUnit, u64)>,
}

impl CounterReading {
    pub fn new(delta: i64, granularity: Granularity) -> Self {
        Self {
            direction: Direction::of(delta),
            units: TimeBreakdown::from_delta(delta).visible(granularity),
        }
    }
}
