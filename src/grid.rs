//! Calendar grids for the three views.
//!
//! Every generator is a pure function of [`GridContext`], so the same
//! context always yields the same cells.

use crate::date::{clamp_anchor, start_of_week, with_year_month, year_window};
use crate::model::{GridCell, ViewMode};
use chrono::{Datelike, NaiveDate, Weekday};

pub const WEEK_ROWS: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;
pub const WEEK_CELLS: usize = WEEK_ROWS * DAYS_PER_WEEK;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridContext {
    pub anchor: NaiveDate,
    pub selected: Option<NaiveDate>,
    pub today: NaiveDate,
    pub first_day_of_week: Weekday,
    pub year_half_span: u32,
}

impl GridContext {
    /// The anchor pulled in from the ends of chrono's range so every view
    /// keeps its full cell count.
    pub fn view_anchor(&self) -> NaiveDate {
        clamp_anchor(self.anchor, self.year_half_span)
    }
}

pub fn cells(view: ViewMode, ctx: &GridContext) -> Vec<GridCell> {
    match view {
        ViewMode::Week => weeks_view(ctx),
        ViewMode::Month => months_view(ctx),
        ViewMode::Year => years_view(ctx),
    }
}

pub fn columns(view: ViewMode) -> usize {
    match view {
        ViewMode::Week => DAYS_PER_WEEK,
        ViewMode::Month | ViewMode::Year => 3,
    }
}

/// Six whole weeks covering the anchor's month.
pub fn weeks_view(ctx: &GridContext) -> Vec<GridCell> {
    let anchor = ctx.view_anchor();
    let first = anchor.with_day(1).unwrap_or(anchor);
    start_of_week(first, ctx.first_day_of_week)
        .iter_days()
        .take(WEEK_CELLS)
        .map(|date| GridCell {
            date,
            label: date.day().to_string(),
            is_current_period: date.year() == first.year() && date.month() == first.month(),
            is_today: date == ctx.today,
            is_selected: ctx.selected == Some(date),
        })
        .collect()
}

pub fn months_view(ctx: &GridContext) -> Vec<GridCell> {
    let anchor = ctx.view_anchor();
    (1..=12)
        .filter_map(|month| with_year_month(anchor, anchor.year(), month))
        .map(|date| GridCell {
            date,
            label: month_name(date.month()).to_string(),
            is_current_period: true,
            is_today: same_month(date, ctx.today),
            is_selected: ctx.selected.is_some_and(|s| same_month(date, s)),
        })
        .collect()
}

pub fn years_view(ctx: &GridContext) -> Vec<GridCell> {
    let anchor = ctx.view_anchor();
    let (from, to) = year_window(anchor, ctx.year_half_span);
    (from.year()..=to.year())
        .filter_map(|year| with_year_month(anchor, year, anchor.month()))
        .map(|date| GridCell {
            date,
            label: date.year().to_string(),
            is_current_period: true,
            is_today: date.year() == ctx.today.year(),
            is_selected: ctx.selected.is_some_and(|s| s.year() == date.year()),
        })
        .collect()
}

pub fn title(view: ViewMode, ctx: &GridContext) -> String {
    let anchor = ctx.view_anchor();
    match view {
        ViewMode::Week => format!("{} {}", month_name(anchor.month()), anchor.year()),
        ViewMode::Month => anchor.year().to_string(),
        ViewMode::Year => {
            let (from, to) = year_window(anchor, ctx.year_half_span);
            format!("{} — {}", from.year(), to.year())
        }
    }
}

pub fn weekday_headers(first_day: Weekday) -> Vec<&'static str> {
    let mut day = first_day;
    let mut headers = Vec::with_capacity(DAYS_PER_WEEK);
    for _ in 0..DAYS_PER_WEEK {
        headers.push(weekday_short(day));
        day = day.succ();
    }
    headers
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

/// Plain-text grid: title, weekday headers (Week view only), then rows.
/// A cell is followed by `*` when selected, `+` when today and `~` when it
/// falls outside the displayed period.
pub fn to_text(view: ViewMode, ctx: &GridContext) -> String {
    let cells = cells(view, ctx);
    let width = cells.iter().map(|c| c.label.chars().count()).max().unwrap_or(0);
    let mut lines = vec![title(view, ctx)];
    if view == ViewMode::Week {
        let headers = weekday_headers(ctx.first_day_of_week)
            .iter()
            .map(|h| format!("{} ", h))
            .collect::<Vec<_>>();
        lines.push(headers.join(" ").trim_end().to_string());
    }
    for row in cells.chunks(columns(view)) {
        let rendered = row
            .iter()
            .map(|cell| {
                let mark = marker(cell);
                match view {
                    ViewMode::Week => format!("{:0>2}{}", cell.label, mark),
                    ViewMode::Month => {
                        format!("{:<pad$}", format!("{}{}", cell.label, mark), pad = width + 1)
                    }
                    ViewMode::Year => format!("{:>width$}{}", cell.label, mark),
                }
            })
            .collect::<Vec<_>>();
        lines.push(rendered.join(" ").trim_end().to_string());
    }
    lines.join("\n")
}

fn marker(cell: &GridCell) -> char {
    if cell.is_selected {
        '*'
    } else if cell.is_today {
        '+'
    } else if !cell.is_current_period {
        '~'
    } else {
        ' '
    }
}

fn weekday_short(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Tu",
        Weekday::Wed => "We",
        Weekday::Thu => "Th",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "Su",
    }
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
