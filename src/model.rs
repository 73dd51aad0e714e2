use crate::pattern::PatternError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    #[serde(alias = "weeks")]
    #[value(alias = "weeks")]
    Week,
    #[serde(alias = "months")]
    #[value(alias = "months")]
    Month,
    #[serde(alias = "years")]
    #[value(alias = "years")]
    Year,
}

pub const ALL_VIEWS: [ViewMode; 3] = [ViewMode::Week, ViewMode::Month, ViewMode::Year];

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
            ViewMode::Year => "Year",
        }
    }

    /// Title-click order; wraps from Year back to Week.
    pub fn next(&self) -> ViewMode {
        match self {
            ViewMode::Week => ViewMode::Month,
            ViewMode::Month => ViewMode::Year,
            ViewMode::Year => ViewMode::Week,
        }
    }
}

/// One selectable day, month or year in the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub date: NaiveDate,
    pub label: String,
    pub is_current_period: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid format pattern: {0}")]
    Pattern(#[from] PatternError),
    #[error("first day of week must be 0 (Sunday) to 6 (Saturday), got {0}")]
    FirstDayOfWeek(u8),
    #[error("at least one view must be available")]
    NoViews,
    #[error("initial view {0:?} is not among the available views")]
    ViewUnavailable(ViewMode),
    #[error("year half span must be between 1 and {max}, got {got}")]
    HalfSpan { got: u32, max: u32 },
    #[error("unknown style part {0:?}")]
    UnknownPart(String),
    #[error("invalid color {value:?} for {part}")]
    Color { part: String, value: String },
}
