use crate::config::SettingsLocation;
use crate::date::{Clock, DateValue, SystemClock};
use crate::grid;
use crate::model::ViewMode;
use crate::overlay::OverlayLayer;
use crate::picker::{DatePicker, PickerConfig};
use crate::theme::Theme;
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::cell::Cell;
use std::io::{stdout, Stdout};
use std::rc::Rc;
use std::time::Duration;

const INPUT_WIDTH: u16 = 40;
const CELL_WIDTH: u16 = 4;
const CALENDAR_WIDTH: u16 = CELL_WIDTH * grid::DAYS_PER_WEEK as u16 + 2;
// Toolbox, controls, weekday headers, six weeks, borders.
const CALENDAR_HEIGHT: u16 = 3 + grid::WEEK_ROWS as u16 + 2;
const QUICK_PICKS: [(&str, Target); 3] = [
    ("Today", Target::Today),
    ("Tomorrow", Target::Tomorrow),
    ("Next week", Target::NextWeek),
];

pub fn run(
    config: PickerConfig,
    theme: Theme,
    date: Option<DateValue>,
    location: &SettingsLocation,
) -> Result<Option<NaiveDate>> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(config, theme, date, SystemClock, location);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result?;
    Ok(app.value.get())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Target {
    Today,
    Tomorrow,
    NextWeek,
    Prev,
    Title,
    Next,
    Cell(NaiveDate),
}

struct App {
    picker: DatePicker,
    layer: OverlayLayer,
    theme: Theme,
    value: Rc<Cell<Option<NaiveDate>>>,
    source: String,
    status: String,
    hits: Vec<(Rect, Target)>,
    input_area: Rect,
    calendar_area: Option<Rect>,
}

impl App {
    fn new(
        config: PickerConfig,
        theme: Theme,
        date: Option<DateValue>,
        clock: impl Clock + 'static,
        location: &SettingsLocation,
    ) -> Self {
        let layer = OverlayLayer::new();
        let value = Rc::new(Cell::new(None));
        let bound = Rc::clone(&value);
        let picker = DatePicker::new(config, layer.clone(), move |date| bound.set(Some(date)))
            .with_clock(clock)
            .with_date(date);
        App {
            picker,
            layer,
            theme,
            value,
            source: format!("{} config {}", location.scope.label(), location.path.display()),
            status: "Click the field or press Enter to open the calendar".into(),
            hits: Vec::new(),
            input_area: Rect::default(),
            calendar_area: None,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Returns `true` when the user is done.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.picker.blur();
            return true;
        }
        let before = self.value.get();
        let done = if self.picker.is_expanded() {
            self.handle_calendar_key(key);
            false
        } else {
            self.handle_input_key(key)
        };
        self.report(before);
        done
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.picker.blur();
                return true;
            }
            KeyCode::Enter | KeyCode::Down => self.open(),
            KeyCode::Left => self.picker.move_left(),
            KeyCode::Right => self.picker.move_right(),
            KeyCode::Home => self.picker.move_home(),
            KeyCode::End => self.picker.move_end(),
            KeyCode::Backspace => self.picker.backspace(),
            KeyCode::Delete => self.picker.delete(),
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.picker.insert_char(c);
                    if !self.parses() {
                        self.status = format!("Not a date yet ({})", self.picker.placeholder());
                    }
                }
            }
            _ => {}
        }
        false
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.picker.outside_click();
                self.status = "Calendar closed".into();
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('<') => {
                self.activate(Target::Prev)
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('>') => {
                self.activate(Target::Next)
            }
            KeyCode::Tab | KeyCode::Char('v') => self.activate(Target::Title),
            KeyCode::Char('t') => self.activate(Target::Today),
            KeyCode::Char('m') => self.activate(Target::Tomorrow),
            KeyCode::Char('w') => self.activate(Target::NextWeek),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        self.click(mouse.column, mouse.row);
    }

    fn click(&mut self, x: u16, y: u16) {
        let before = self.value.get();
        if self.picker.is_expanded() {
            match self.calendar_area {
                Some(area) if contains(area, x, y) => {
                    if let Some(target) = self.target_at(x, y) {
                        self.activate(target);
                    }
                }
                // Everything outside the calendar belongs to the overlay.
                _ => {
                    self.picker.outside_click();
                    self.status = "Calendar closed".into();
                }
            }
        } else if contains(self.input_area, x, y) {
            self.open();
        }
        self.report(before);
    }

    fn open(&mut self) {
        self.picker.blur();
        self.picker.open();
        self.status = format!("{} view", self.picker.view().label());
    }

    fn activate(&mut self, target: Target) {
        match target {
            Target::Today => self.picker.today_click(),
            Target::Tomorrow => self.picker.tomorrow_click(),
            Target::NextWeek => self.picker.next_week_click(),
            Target::Prev => self.picker.prev(),
            Target::Next => self.picker.next(),
            Target::Title => {
                if self.picker.title_click() {
                    self.status = format!("{} view", self.picker.view().label());
                } else {
                    self.status = "No further view available".into();
                }
            }
            Target::Cell(date) => {
                let view = self.picker.view();
                self.picker.cell_click(date);
                if view != ViewMode::Week {
                    self.status = format!("{} view", self.picker.view().label());
                }
            }
        }
    }

    fn report(&mut self, before: Option<NaiveDate>) {
        let after = self.value.get();
        if after != before {
            if let Some(date) = after {
                self.status = format!("Picked {}", self.picker.config().pattern.format(date));
            }
        }
    }

    fn parses(&self) -> bool {
        self.picker
            .config()
            .pattern
            .parse(self.picker.input_text())
            .is_some()
    }

    fn target_at(&self, x: u16, y: u16) -> Option<Target> {
        self.hits
            .iter()
            .find(|(area, _)| contains(*area, x, y))
            .map(|(_, target)| *target)
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.hits.clear();
        self.calendar_area = None;
        self.draw_header(f, layout[0]);
        self.draw_input(f, layout[1]);
        self.draw_footer(f, layout[2]);
        if self.picker.is_expanded() {
            let below = self.input_area.y + self.input_area.height;
            let bottom = f.size().bottom();
            let area = Rect {
                x: self.input_area.x,
                y: below,
                width: CALENDAR_WIDTH.min(f.size().width.saturating_sub(self.input_area.x)),
                height: CALENDAR_HEIGHT.min(bottom.saturating_sub(below)),
            };
            self.draw_calendar(f, area);
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                "datepick ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("pattern {}", self.picker.config().pattern),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(self.source.clone(), Style::default().fg(Color::DarkGray)),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_input(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let input_area = Rect {
            x: area.x + 1,
            y: area.y,
            width: INPUT_WIDTH.min(area.width.saturating_sub(1)),
            height: 3.min(area.height),
        };
        self.input_area = input_area;

        let expanded = self.picker.is_expanded();
        let text = self.picker.input_text();
        let line = if text.is_empty() && !expanded {
            Line::from(Span::styled(
                self.picker.placeholder().to_string(),
                self.theme.placeholder,
            ))
        } else if expanded {
            Line::from(Span::styled(text.to_string(), self.theme.input))
        } else {
            Line::from(Span::styled(self.picker.input().with_caret(), self.theme.input))
        };
        let border = if self.picker.is_closing() {
            self.theme.container_closing
        } else {
            self.theme.container
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled("Date", border));
        f.render_widget(Paragraph::new(line).block(block), input_area);
    }

    fn draw_calendar(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        self.calendar_area = Some(area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.calendar)
            .style(self.theme.calendar);
        let inner = block.inner(area);
        f.render_widget(Clear, area);
        f.render_widget(block, area);
        if inner.height < 3 {
            return;
        }

        self.draw_toolbox(f, row(inner, 0));
        self.draw_controls(f, row(inner, 1));

        let view = self.picker.view();
        let mut top = inner.y + 2;
        let columns = grid::columns(view) as u16;
        let cell_width = (inner.width / columns).max(1);
        if view == ViewMode::Week {
            let headers = self.picker.weekday_headers();
            for (idx, header) in headers.iter().enumerate() {
                let cell = Rect {
                    x: inner.x + idx as u16 * cell_width,
                    y: top,
                    width: cell_width,
                    height: 1,
                };
                let text = Paragraph::new(Span::styled(*header, self.theme.headers))
                    .alignment(Alignment::Center);
                f.render_widget(text, cell.intersection(inner));
            }
            top += 1;
        }

        for (idx, cell) in self.picker.cells().iter().enumerate() {
            let rect = Rect {
                x: inner.x + (idx as u16 % columns) * cell_width,
                y: top + idx as u16 / columns,
                width: cell_width,
                height: 1,
            };
            if rect.y >= inner.bottom() {
                break;
            }
            let text = Paragraph::new(Span::styled(
                cell.label.clone(),
                self.theme.cell_style(cell),
            ))
            .alignment(Alignment::Center);
            f.render_widget(text, rect.intersection(inner));
            self.hits.push((rect, Target::Cell(cell.date)));
        }
    }

    fn draw_toolbox(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let mut x = area.x;
        for (label, target) in QUICK_PICKS {
            let width = Span::raw(label).width() as u16;
            let rect = Rect {
                x,
                y: area.y,
                width,
                height: 1,
            }
            .intersection(area);
            f.render_widget(
                Paragraph::new(Span::styled(label, self.theme.toolbox)),
                rect,
            );
            self.hits.push((rect, target));
            x = x.saturating_add(width + 1);
        }
    }

    fn draw_controls(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let left = Span::styled(self.theme.arrows.left.clone(), self.theme.left_arrow);
        let right = Span::styled(self.theme.arrows.right.clone(), self.theme.right_arrow);
        let left_width = (left.width() as u16 + 2).min(area.width);
        let right_width = (right.width() as u16 + 2).min(area.width - left_width);
        let left_rect = Rect {
            width: left_width,
            ..area
        };
        let right_rect = Rect {
            x: area.right() - right_width,
            width: right_width,
            ..area
        };
        let title_rect = Rect {
            x: area.x + left_width,
            width: area.width - left_width - right_width,
            ..area
        };

        f.render_widget(Paragraph::new(Line::default()).style(self.theme.controls), area);
        f.render_widget(
            Paragraph::new(left).alignment(Alignment::Center),
            left_rect,
        );
        f.render_widget(
            Paragraph::new(Span::styled(self.picker.title(), self.theme.title))
                .alignment(Alignment::Center),
            title_rect,
        );
        f.render_widget(
            Paragraph::new(right).alignment(Alignment::Center),
            right_rect,
        );
        self.hits.push((left_rect, Target::Prev));
        self.hits.push((title_rect, Target::Title));
        self.hits.push((right_rect, Target::Next));
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        if self.picker.is_expanded() {
            spans.extend([
                Span::styled("click", Style::default().fg(Color::LightCyan)),
                Span::raw(" pick  "),
                Span::styled("←→ / h l", Style::default().fg(Color::LightCyan)),
                Span::raw(" prev/next  "),
                Span::styled("Tab", Style::default().fg(Color::LightYellow)),
                Span::raw(" view  "),
                Span::styled("t m w", Style::default().fg(Color::LightGreen)),
                Span::raw(" today/tomorrow/next week  "),
                Span::styled("Esc", Style::default().fg(Color::LightRed)),
                Span::raw(" close"),
            ]);
        } else {
            spans.extend([
                Span::styled("type", Style::default().fg(Color::LightCyan)),
                Span::raw(" edit date  "),
                Span::styled("Enter", Style::default().fg(Color::LightYellow)),
                Span::raw(" calendar  "),
                Span::styled("Esc", Style::default().fg(Color::LightRed)),
                Span::raw(" done"),
            ]);
        }
        Line::from(spans)
    }
}

fn row(area: Rect, offset: u16) -> Rect {
    Rect {
        y: area.y + offset,
        height: 1,
        ..area
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.right() && y >= area.y && y < area.bottom()
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
