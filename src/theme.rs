use ratatui::prelude::{Color, Modifier, Style};

/// Per-part styles, the terminal counterpart of the widget's class hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub container: Style,
    pub container_closing: Style,
    pub input: Style,
    pub placeholder: Style,
    pub calendar: Style,
    pub toolbox: Style,
    pub controls: Style,
    pub left_arrow: Style,
    pub right_arrow: Style,
    pub title: Style,
    pub headers: Style,
    pub cell: Style,
    pub cell_outside: Style,
    pub cell_today: Style,
    pub cell_selected: Style,
    pub arrows: Arrows,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrows {
    pub left: String,
    pub right: String,
}

impl Default for Arrows {
    fn default() -> Self {
        Arrows {
            left: "◀".into(),
            right: "▶".into(),
        }
    }
}

pub const PART_NAMES: [&str; 15] = [
    "container",
    "container_closing",
    "input",
    "placeholder",
    "calendar",
    "toolbox",
    "controls",
    "left_arrow",
    "right_arrow",
    "title",
    "headers",
    "cell",
    "cell_outside",
    "cell_today",
    "cell_selected",
];

impl Default for Theme {
    fn default() -> Self {
        Theme {
            container: Style::default().fg(Color::DarkGray),
            container_closing: Style::default().fg(Color::DarkGray),
            input: Style::default().fg(Color::White),
            placeholder: Style::default().fg(Color::DarkGray),
            calendar: Style::default().fg(Color::Cyan).bg(Color::Rgb(16, 18, 24)),
            toolbox: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            controls: Style::default().fg(Color::Gray),
            left_arrow: Style::default().fg(Color::LightCyan),
            right_arrow: Style::default().fg(Color::LightCyan),
            title: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            headers: Style::default().fg(Color::Gray),
            cell: Style::default().fg(Color::White),
            cell_outside: Style::default().fg(Color::DarkGray),
            cell_today: Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            cell_selected: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            arrows: Arrows::default(),
        }
    }
}

impl Theme {
    pub fn part_mut(&mut self, name: &str) -> Option<&mut Style> {
        let style = match name {
            "container" => &mut self.container,
            "container_closing" => &mut self.container_closing,
            "input" => &mut self.input,
            "placeholder" => &mut self.placeholder,
            "calendar" => &mut self.calendar,
            "toolbox" => &mut self.toolbox,
            "controls" => &mut self.controls,
            "left_arrow" => &mut self.left_arrow,
            "right_arrow" => &mut self.right_arrow,
            "title" => &mut self.title,
            "headers" => &mut self.headers,
            "cell" => &mut self.cell,
            "cell_outside" => &mut self.cell_outside,
            "cell_today" => &mut self.cell_today,
            "cell_selected" => &mut self.cell_selected,
            _ => return None,
        };
        Some(style)
    }

    /// Selected wins over today, today over out-of-period.
    pub fn cell_style(&self, cell: &crate::model::GridCell) -> Style {
        if cell.is_selected {
            self.cell_selected
        } else if cell.is_today {
            self.cell_today
        } else if !cell.is_current_period {
            self.cell_outside
        } else {
            self.cell
        }
    }
}
