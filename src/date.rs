use crate::pattern::DatePattern;
use chrono::{DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, Utc, Weekday};

/// Any date-like value a host may hand to the picker. Normalized once by
/// [`parse_or_none`]; nothing past the boundary looks at the shape again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Instant(DateTime<Utc>),
    Text(String),
}

impl From<NaiveDate> for DateValue {
    fn from(value: NaiveDate) -> Self {
        DateValue::Date(value)
    }
}

impl From<NaiveDateTime> for DateValue {
    fn from(value: NaiveDateTime) -> Self {
        DateValue::DateTime(value)
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(value: DateTime<Utc>) -> Self {
        DateValue::Instant(value)
    }
}

impl From<String> for DateValue {
    fn from(value: String) -> Self {
        DateValue::Text(value)
    }
}

impl From<&str> for DateValue {
    fn from(value: &str) -> Self {
        DateValue::Text(value.to_string())
    }
}

/// Normalizes a host value into a calendar date. Absent values and text
/// that does not match `pattern` yield `None`.
pub fn parse_or_none(value: Option<&DateValue>, pattern: &DatePattern) -> Option<NaiveDate> {
    let date = match value? {
        DateValue::Date(date) => Some(*date),
        DateValue::DateTime(dt) => Some(dt.date()),
        DateValue::Instant(instant) => Some(instant.date_naive()),
        DateValue::Text(text) => pattern.parse(text),
    };
    tracing::trace!(?value, ?date, pattern = pattern.as_str(), "normalized date value");
    date
}

/// The dates `half_span` years either side of `date`, bounding a window of
/// `2 * half_span + 1` years.
pub fn year_window(date: NaiveDate, half_span: u32) -> (NaiveDate, NaiveDate) {
    let span = half_span as i32 * 12;
    (shift_months(date, -span), shift_months(date, span))
}

/// Moves by whole months, clamping the day to the target month and
/// saturating at the ends of the representable range.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let delta = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(delta)
    } else {
        date.checked_sub_months(delta)
    };
    shifted.unwrap_or(if months >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Keeps `date` far enough from chrono's range limits that a six-week grid
/// and a window of `half_span` years either side both fit around it.
pub fn clamp_anchor(date: NaiveDate, half_span: u32) -> NaiveDate {
    let margin = Months::new(half_span.saturating_mul(12).saturating_add(2));
    let low = NaiveDate::MIN
        .checked_add_months(margin)
        .unwrap_or(NaiveDate::MAX);
    let high = NaiveDate::MAX
        .checked_sub_months(margin)
        .unwrap_or(NaiveDate::MIN);
    date.max(low).min(high)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(31)
}

/// Same day in another month, clamped to that month's length.
pub fn with_year_month(date: NaiveDate, year: i32, month: u32) -> Option<NaiveDate> {
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Last `first_day` on or before `date`.
pub fn start_of_week(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_sunday() - first_day.num_days_from_sunday()) % 7;
    date.checked_sub_days(chrono::Days::new(back as u64))
        .unwrap_or(date)
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_from_sunday(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Source of "today" for quick picks and the today marker.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
