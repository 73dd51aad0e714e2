use crate::date::{
    clamp_anchor, parse_or_none, shift_months, start_of_week, Clock, DateValue, SystemClock,
};
use crate::grid::{self, GridContext};
use crate::input::TextInput;
use crate::model::{GridCell, ViewMode, ALL_VIEWS};
use crate::overlay::{Overlay, OverlayLayer};
use crate::pattern::DatePattern;
use chrono::{Days, NaiveDate, Weekday};

pub const DEFAULT_YEAR_HALF_SPAN: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    pub pattern: DatePattern,
    pub placeholder: Option<String>,
    pub first_day_of_week: Weekday,
    pub view: ViewMode,
    pub available_views: Vec<ViewMode>,
    pub year_half_span: u32,
}

impl Default for PickerConfig {
    fn default() -> Self {
        PickerConfig {
            pattern: DatePattern::default(),
            placeholder: None,
            first_day_of_week: Weekday::Sun,
            view: ViewMode::Week,
            available_views: ALL_VIEWS.to_vec(),
            year_half_span: DEFAULT_YEAR_HALF_SPAN,
        }
    }
}

/// Text-input-backed date picker state.
///
/// All transitions run synchronously on the caller's thread. Confirmed
/// dates go to the `on_change` callback.
pub struct DatePicker {
    config: PickerConfig,
    clock: Box<dyn Clock>,
    layer: OverlayLayer,
    overlay: Option<Overlay>,
    on_change: Box<dyn FnMut(NaiveDate)>,
    selected: Option<NaiveDate>,
    anchor: NaiveDate,
    view: ViewMode,
    closing: bool,
    input: TextInput,
}

impl DatePicker {
    pub fn new(
        mut config: PickerConfig,
        layer: OverlayLayer,
        on_change: impl FnMut(NaiveDate) + 'static,
    ) -> Self {
        if config.available_views.is_empty() {
            tracing::debug!("no available views given, offering all of them");
            config.available_views = ALL_VIEWS.to_vec();
        }
        let view = if config.available_views.contains(&config.view) {
            config.view
        } else {
            let fallback = config.available_views[0];
            tracing::debug!(requested = ?config.view, ?fallback, "initial view unavailable");
            fallback
        };
        let clock = SystemClock;
        DatePicker {
            anchor: clamp_anchor(clock.today(), config.year_half_span),
            clock: Box::new(clock),
            config,
            layer,
            overlay: None,
            on_change: Box::new(on_change),
            selected: None,
            view,
            closing: false,
            input: TextInput::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        if self.selected.is_none() {
            self.set_anchor(self.clock.today());
        }
        self
    }

    pub fn with_date(mut self, date: Option<DateValue>) -> Self {
        self.set_date(date.as_ref());
        self
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn input_text(&self) -> &str {
        self.input.value()
    }

    pub fn placeholder(&self) -> &str {
        self.config
            .placeholder
            .as_deref()
            .unwrap_or_else(|| self.config.pattern.as_str())
    }

    /// Only true while this picker's overlay is the active one on its layer.
    pub fn is_expanded(&self) -> bool {
        self.overlay.as_ref().is_some_and(Overlay::is_current)
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn grid_context(&self) -> GridContext {
        GridContext {
            anchor: self.anchor,
            selected: self.selected,
            today: self.clock.today(),
            first_day_of_week: self.config.first_day_of_week,
            year_half_span: self.config.year_half_span,
        }
    }

    pub fn cells(&self) -> Vec<GridCell> {
        grid::cells(self.view, &self.grid_context())
    }

    pub fn title(&self) -> String {
        grid::title(self.view, &self.grid_context())
    }

    pub fn weekday_headers(&self) -> Vec<&'static str> {
        grid::weekday_headers(self.config.first_day_of_week)
    }

    pub fn open(&mut self) {
        // Drop our own guard before installing so the old overlay is gone first.
        self.overlay = None;
        self.overlay = Some(self.layer.install());
        self.closing = false;
        tracing::debug!(view = ?self.view, anchor = %self.anchor, "picker opened");
    }

    pub fn outside_click(&mut self) {
        self.close();
    }

    pub fn close(&mut self) {
        self.closing = true;
        self.overlay = None;
        tracing::debug!("picker closed");
    }

    /// Returns whether the view changed.
    pub fn title_click(&mut self) -> bool {
        let next = self.view.next();
        if !self.config.available_views.contains(&next) {
            return false;
        }
        tracing::debug!(from = ?self.view, to = ?next, "view changed");
        self.view = next;
        true
    }

    pub fn cell_click(&mut self, date: NaiveDate) {
        match self.view {
            ViewMode::Week => self.pick(date),
            ViewMode::Month => {
                self.set_anchor(date);
                self.view = ViewMode::Week;
            }
            ViewMode::Year => {
                self.set_anchor(date);
                self.view = ViewMode::Month;
            }
        }
    }

    pub fn prev(&mut self) {
        self.navigate(-1);
    }

    pub fn next(&mut self) {
        self.navigate(1);
    }

    fn navigate(&mut self, direction: i32) {
        let months = match self.view {
            ViewMode::Week => 1,
            ViewMode::Month => 12,
            ViewMode::Year => (2 * self.config.year_half_span as i32 + 1) * 12,
        };
        self.set_anchor(shift_months(self.anchor, months * direction));
        tracing::debug!(anchor = %self.anchor, "navigated");
    }

    pub fn today_click(&mut self) {
        let today = self.clock.today();
        self.pick(today);
    }

    pub fn tomorrow_click(&mut self) {
        let today = self.clock.today();
        self.pick(today.checked_add_days(Days::new(1)).unwrap_or(today));
    }

    /// The first weekday, counted within the Sunday-based week a week
    /// from today.
    pub fn next_week_click(&mut self) {
        let today = self.clock.today();
        let ahead = today.checked_add_days(Days::new(7)).unwrap_or(today);
        let sunday = start_of_week(ahead, Weekday::Sun);
        let offset = self.config.first_day_of_week.num_days_from_sunday();
        self.pick(
            sunday
                .checked_add_days(Days::new(u64::from(offset)))
                .unwrap_or(sunday),
        );
    }

    fn pick(&mut self, date: NaiveDate) {
        self.selected = Some(date);
        self.set_anchor(date);
        self.input.set(self.config.pattern.format(date));
        self.close();
        tracing::debug!(%date, "date picked");
        (self.on_change)(date);
    }

    /// Replaces the text verbatim. Emits when it parses, but leaves the text
    /// and the calendar as they are.
    pub fn input_changed(&mut self, text: impl Into<String>) {
        self.input.set(text);
        self.text_changed();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.edit(|input| input.insert_char(ch));
    }

    pub fn backspace(&mut self) {
        self.edit(TextInput::backspace);
    }

    pub fn delete(&mut self) {
        self.edit(TextInput::delete);
    }

    pub fn move_left(&mut self) {
        self.input.move_left();
    }

    pub fn move_right(&mut self) {
        self.input.move_right();
    }

    pub fn move_home(&mut self) {
        self.input.move_home();
    }

    pub fn move_end(&mut self) {
        self.input.move_end();
    }

    fn edit(&mut self, f: impl FnOnce(&mut TextInput)) {
        let before = self.input.value().to_string();
        f(&mut self.input);
        if self.input.value() != before {
            self.text_changed();
        }
    }

    fn text_changed(&mut self) {
        if let Some(date) = self.config.pattern.parse(self.input.value()) {
            tracing::trace!(%date, "input parsed");
            (self.on_change)(date);
        }
    }

    /// Input lost focus: move the selection and the calendar to whatever the
    /// text currently parses to. The text is left as typed.
    pub fn blur(&mut self) {
        if let Some(date) = self.config.pattern.parse(self.input.value()) {
            self.selected = Some(date);
            self.set_anchor(date);
        }
    }

    /// A new value supplied by the host.
    pub fn set_date(&mut self, date: Option<&DateValue>) {
        let parsed = parse_or_none(date, &self.config.pattern);
        self.selected = parsed;
        self.set_anchor(parsed.unwrap_or_else(|| self.clock.today()));
        let text = parsed
            .map(|d| self.config.pattern.format(d))
            .unwrap_or_default();
        self.input = TextInput::new(&text);
    }

    fn set_anchor(&mut self, date: NaiveDate) {
        self.anchor = clamp_anchor(date, self.config.year_half_span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::FixedClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn iso() -> DatePattern {
        DatePattern::new("YYYY-MM-DD").unwrap()
    }

    struct Harness {
        picker: DatePicker,
        layer: OverlayLayer,
        changes: Rc<RefCell<Vec<NaiveDate>>>,
    }

    fn harness(config: PickerConfig, today: NaiveDate) -> Harness {
        let layer = OverlayLayer::new();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let picker = DatePicker::new(config, layer.clone(), move |d| sink.borrow_mut().push(d))
            .with_clock(FixedClock(today));
        Harness {
            picker,
            layer,
            changes,
        }
    }

    fn iso_config() -> PickerConfig {
        PickerConfig {
            pattern: iso(),
            ..PickerConfig::default()
        }
    }

    #[test]
    fn absent_date_anchors_on_today() {
        let h = harness(iso_config(), ymd(2025, 6, 1));
        assert_eq!(h.picker.selected(), None);
        assert_eq!(h.picker.anchor(), ymd(2025, 6, 1));
        assert_eq!(h.picker.input_text(), "");
        assert_eq!(h.picker.placeholder(), "YYYY-MM-DD");
        assert!(!h.picker.is_expanded());
    }

    #[test]
    fn drill_down_from_year_to_day() {
        let mut h = harness(
            PickerConfig {
                view: ViewMode::Year,
                ..iso_config()
            },
            ymd(2025, 6, 1),
        );
        h.picker.open();
        assert_eq!(h.picker.title(), "2021 — 2029");

        h.picker.cell_click(ymd(2023, 6, 1));
        assert_eq!(h.picker.view(), ViewMode::Month);
        assert_eq!(h.picker.anchor(), ymd(2023, 6, 1));
        assert!(h.picker.is_expanded());

        h.picker.cell_click(ymd(2023, 3, 1));
        assert_eq!(h.picker.view(), ViewMode::Week);
        assert_eq!(h.picker.title(), "March 2023");
        assert!(h.changes.borrow().is_empty());

        h.picker.cell_click(ymd(2023, 3, 15));
        assert_eq!(*h.changes.borrow(), vec![ymd(2023, 3, 15)]);
        assert_eq!(h.picker.selected(), Some(ymd(2023, 3, 15)));
        assert_eq!(h.picker.input_text(), "2023-03-15");
        assert!(!h.picker.is_expanded());
        assert!(h.picker.is_closing());
        assert!(!h.layer.is_active());
    }

    #[test]
    fn outside_day_reanchors() {
        let mut h = harness(iso_config(), ymd(2023, 3, 20));
        h.picker.open();
        let first = h.picker.cells()[0].clone();
        assert!(!first.is_current_period);
        h.picker.cell_click(first.date);
        assert_eq!(h.picker.anchor(), ymd(2023, 2, 26));
        assert_eq!(h.picker.title(), "February 2023");
    }

    #[test]
    fn opening_twice_keeps_one_overlay() {
        let mut h = harness(iso_config(), ymd(2025, 6, 1));
        h.picker.open();
        h.picker.open();
        assert_eq!(h.layer.active_count(), 1);
        assert!(h.picker.is_expanded());
        h.picker.outside_click();
        assert_eq!(h.layer.active_count(), 0);
        assert!(!h.picker.is_expanded());
    }

    #[test]
    fn second_picker_collapses_first() {
        let layer = OverlayLayer::new();
        let mut a = DatePicker::new(iso_config(), layer.clone(), |_| {});
        let mut b = DatePicker::new(iso_config(), layer.clone(), |_| {});
        a.open();
        b.open();
        assert_eq!(layer.active_count(), 1);
        assert!(!a.is_expanded());
        assert!(b.is_expanded());
        a.close();
        assert!(b.is_expanded());
        drop(b);
        assert!(!layer.is_active());
    }

    #[test]
    fn title_click_skips_missing_views() {
        let mut h = harness(
            PickerConfig {
                available_views: vec![ViewMode::Week, ViewMode::Year],
                ..iso_config()
            },
            ymd(2025, 6, 1),
        );
        // Week -> Month is unavailable, so nothing moves.
        assert!(!h.picker.title_click());
        assert_eq!(h.picker.view(), ViewMode::Week);

        let mut h = harness(
            PickerConfig {
                available_views: vec![ViewMode::Month, ViewMode::Year],
                view: ViewMode::Month,
                ..iso_config()
            },
            ymd(2025, 6, 1),
        );
        assert!(h.picker.title_click());
        assert_eq!(h.picker.view(), ViewMode::Year);
        assert!(!h.picker.title_click());
        assert_eq!(h.picker.view(), ViewMode::Year);

        let mut h = harness(iso_config(), ymd(2025, 6, 1));
        for expected in [ViewMode::Month, ViewMode::Year, ViewMode::Week] {
            assert!(h.picker.title_click());
            assert_eq!(h.picker.view(), expected);
        }
    }

    #[test]
    fn initial_view_falls_back_to_available() {
        let h = harness(
            PickerConfig {
                view: ViewMode::Week,
                available_views: vec![ViewMode::Year],
                ..iso_config()
            },
            ymd(2025, 6, 1),
        );
        assert_eq!(h.picker.view(), ViewMode::Year);
    }

    #[test]
    fn navigation_moves_by_view_granularity() {
        let mut h = harness(iso_config(), ymd(2023, 1, 31));
        h.picker.open();
        h.picker.next();
        assert_eq!(h.picker.anchor(), ymd(2023, 2, 28));
        h.picker.prev();
        h.picker.prev();
        assert_eq!(h.picker.anchor(), ymd(2022, 12, 28));

        h.picker.title_click();
        h.picker.next();
        assert_eq!(h.picker.anchor(), ymd(2023, 12, 28));

        h.picker.title_click();
        h.picker.prev();
        assert_eq!(h.picker.anchor(), ymd(2014, 12, 28));
        assert_eq!(h.picker.view(), ViewMode::Year);
        assert!(h.picker.is_expanded());
        assert_eq!(h.picker.selected(), None);
        assert!(h.changes.borrow().is_empty());
    }

    #[test]
    fn quick_picks() {
        // 2023-03-15 is a Wednesday; a week later is Wednesday the 22nd.
        let today = ymd(2023, 3, 15);
        let mut h = harness(iso_config(), today);
        h.picker.open();
        h.picker.today_click();
        h.picker.tomorrow_click();
        h.picker.next_week_click();
        assert_eq!(
            *h.changes.borrow(),
            vec![today, ymd(2023, 3, 16), ymd(2023, 3, 19)]
        );
        assert!(!h.picker.is_expanded());

        let mut h = harness(
            PickerConfig {
                first_day_of_week: Weekday::Mon,
                ..iso_config()
            },
            today,
        );
        h.picker.next_week_click();
        assert_eq!(h.picker.selected(), Some(ymd(2023, 3, 20)));
        assert_eq!(h.picker.input_text(), "2023-03-20");
    }

    #[test]
    fn next_week_never_lands_before_a_week_out() {
        // Monday 2023-03-13; a week later sits in the Sunday-based week of
        // 2023-03-19, whose Wednesday is the 22nd.
        let today = ymd(2023, 3, 13);
        let mut h = harness(
            PickerConfig {
                first_day_of_week: Weekday::Wed,
                ..iso_config()
            },
            today,
        );
        h.picker.next_week_click();
        assert_eq!(*h.changes.borrow(), vec![ymd(2023, 3, 22)]);

        let mut h = harness(
            PickerConfig {
                first_day_of_week: Weekday::Sat,
                ..iso_config()
            },
            today,
        );
        h.picker.next_week_click();
        assert_eq!(h.picker.selected(), Some(ymd(2023, 3, 25)));
    }

    #[test]
    fn grids_stay_full_at_range_ends() {
        let mut h = harness(iso_config(), NaiveDate::MAX);
        h.picker.open();
        h.picker.next();
        assert_eq!(h.picker.cells().len(), grid::WEEK_CELLS);
        assert!(h.picker.anchor() < NaiveDate::MAX);
        h.picker.title_click();
        h.picker.title_click();
        assert_eq!(h.picker.view(), ViewMode::Year);
        let years = h.picker.cells();
        assert_eq!(years.len(), 9);
        h.picker.next();
        assert_eq!(h.picker.cells(), years);

        let mut h = harness(iso_config(), NaiveDate::MIN);
        h.picker.open();
        h.picker.prev();
        assert_eq!(h.picker.cells().len(), grid::WEEK_CELLS);
        h.picker.set_date(Some(&DateValue::from(NaiveDate::MIN)));
        assert_eq!(h.picker.selected(), Some(NaiveDate::MIN));
        assert!(h.picker.anchor() > NaiveDate::MIN);
        assert_eq!(h.picker.cells().len(), grid::WEEK_CELLS);
    }

    #[test]
    fn empty_views_offer_everything() {
        let mut h = harness(
            PickerConfig {
                available_views: vec![],
                ..iso_config()
            },
            ymd(2025, 6, 1),
        );
        assert_eq!(h.picker.config().available_views, ALL_VIEWS.to_vec());
        assert_eq!(h.picker.view(), ViewMode::Week);
        assert!(h.picker.title_click());
    }

    #[test]
    fn malformed_text_is_kept_and_not_emitted() {
        let mut h = harness(iso_config(), ymd(2025, 6, 1));
        h.picker.input_changed("2024-13-40");
        assert_eq!(h.picker.input_text(), "2024-13-40");
        assert!(h.changes.borrow().is_empty());
    }

    #[test]
    fn typing_emits_once_parseable_without_resync() {
        let mut h = harness(iso_config(), ymd(2025, 6, 1));
        for ch in "2024-01-05".chars() {
            h.picker.insert_char(ch);
        }
        assert_eq!(*h.changes.borrow(), vec![ymd(2024, 1, 5)]);
        assert_eq!(h.picker.input_text(), "2024-01-05");
        assert_eq!(h.picker.anchor(), ymd(2025, 6, 1));
        assert_eq!(h.picker.selected(), None);

        h.picker.move_left();
        h.picker.move_right();
        assert_eq!(h.changes.borrow().len(), 1);

        h.picker.backspace();
        h.picker.insert_char('9');
        assert_eq!(*h.changes.borrow(), vec![ymd(2024, 1, 5), ymd(2024, 1, 9)]);

        h.picker.blur();
        assert_eq!(h.picker.selected(), Some(ymd(2024, 1, 9)));
        assert_eq!(h.picker.anchor(), ymd(2024, 1, 9));
        assert_eq!(h.picker.input_text(), "2024-01-09");
    }

    #[test]
    fn blur_with_garbage_keeps_state() {
        let mut h = harness(iso_config(), ymd(2025, 6, 1))
            .picker
            .with_date(Some(ymd(2020, 2, 2).into()));
        h.input_changed("not a date");
        h.blur();
        assert_eq!(h.selected(), Some(ymd(2020, 2, 2)));
        assert_eq!(h.input_text(), "not a date");
    }

    #[test]
    fn external_update_resyncs_text_only() {
        let mut h = harness(iso_config(), ymd(2025, 6, 1));
        h.picker.open();
        h.picker.title_click();
        h.picker.input_changed("half typed");

        h.picker.set_date(Some(&"2022-08-09".into()));
        assert_eq!(h.picker.input_text(), "2022-08-09");
        assert_eq!(h.picker.selected(), Some(ymd(2022, 8, 9)));
        assert_eq!(h.picker.anchor(), ymd(2022, 8, 9));
        assert_eq!(h.picker.view(), ViewMode::Month);
        assert!(h.picker.is_expanded());

        h.picker.set_date(None);
        assert_eq!(h.picker.input_text(), "");
        assert_eq!(h.picker.selected(), None);
        assert_eq!(h.picker.anchor(), ymd(2025, 6, 1));
        assert!(h.changes.borrow().is_empty());
    }

    #[test]
    fn drop_removes_overlay() {
        let mut h = harness(iso_config(), ymd(2025, 6, 1));
        h.picker.open();
        assert!(h.layer.is_active());
        drop(h.picker);
        assert!(!h.layer.is_active());
    }
}
