//! Application-level configuration constants.

use log::Level;

pub const APP_TITLE: &str = "day counter";
pub const LOG_LEVEL: Level = Level::Info;

// Local storage keys
pub const THEME_KEY: &str = "theme-data";
pub const GRANULARITY_KEY: &str = "counterState";
pub const ACTIVE_COUNTER_KEY: &str = "currentCounter";
pub const DATES_KEY: &str = "dates";

// Defaults for absent or unreadable stored values
pub const DEFAULT_GRANULARITY: u8 = 3;
pub const MAX_GRANULARITY: u8 = 4;

// Refresh periods (ms) per granularity level
pub const COARSE_REFRESH_MS: u32 = 1000;
pub const SECONDS_REFRESH_MS: u32 = 250;
pub const MILLIS_REFRESH_MS: u32 = 125;

// Accepted date range for new entries, as (year, month, day)
pub const MIN_DATE: (i32, u32, u32) = (2000, 1, 1);
pub const MAX_DATE: (i32, u32, u32) = (2100, 12, 31);

// DOM hooks
pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const NO_SCROLL_CLASS: &str = "no-scroll";
pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";
