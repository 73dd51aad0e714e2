use crate::date::weekday_from_sunday;
use crate::model::{ConfigError, ViewMode, ALL_VIEWS};
use crate::pattern::{DatePattern, DEFAULT_PATTERN};
use crate::picker::{PickerConfig, DEFAULT_YEAR_HALF_SPAN};
use crate::theme::{Arrows, Theme};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use ratatui::prelude::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const MAX_YEAR_HALF_SPAN: u32 = 50;
const PROJECT_DIR: &str = ".datepick";
const FILE_NAME: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub first_day_of_week: u8,
    pub view: ViewMode,
    pub available_views: Vec<ViewMode>,
    pub year_half_span: u32,
    pub left_arrow: String,
    pub right_arrow: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub classes: BTreeMap<String, PartStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    pub bold: bool,
    pub underline: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let arrows = Arrows::default();
        Settings {
            format: DEFAULT_PATTERN.to_string(),
            placeholder: None,
            first_day_of_week: 0,
            view: ViewMode::Week,
            available_views: ALL_VIEWS.to_vec(),
            year_half_span: DEFAULT_YEAR_HALF_SPAN,
            left_arrow: arrows.left,
            right_arrow: arrows.right,
            classes: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(PickerConfig, Theme), ConfigError> {
        let pattern = DatePattern::new(&self.format)?;
        let first_day_of_week = weekday_from_sunday(self.first_day_of_week)
            .ok_or(ConfigError::FirstDayOfWeek(self.first_day_of_week))?;
        let mut available_views = Vec::with_capacity(ALL_VIEWS.len());
        for view in &self.available_views {
            if !available_views.contains(view) {
                available_views.push(*view);
            }
        }
        if available_views.is_empty() {
            return Err(ConfigError::NoViews);
        }
        if !available_views.contains(&self.view) {
            return Err(ConfigError::ViewUnavailable(self.view));
        }
        if !(1..=MAX_YEAR_HALF_SPAN).contains(&self.year_half_span) {
            return Err(ConfigError::HalfSpan {
                got: self.year_half_span,
                max: MAX_YEAR_HALF_SPAN,
            });
        }

        let mut theme = Theme {
            arrows: Arrows {
                left: self.left_arrow.clone(),
                right: self.right_arrow.clone(),
            },
            ..Theme::default()
        };
        for (name, part) in &self.classes {
            let patch = part.to_style(name)?;
            let style = theme
                .part_mut(name)
                .ok_or_else(|| ConfigError::UnknownPart(name.clone()))?;
            *style = style.patch(patch);
        }

        let config = PickerConfig {
            pattern,
            placeholder: self.placeholder.clone(),
            first_day_of_week,
            view: self.view,
            available_views,
            year_half_span: self.year_half_span,
        };
        Ok((config, theme))
    }
}

impl PartStyle {
    fn to_style(&self, part: &str) -> Result<Style, ConfigError> {
        let mut style = Style::default();
        if let Some(fg) = &self.fg {
            style = style.fg(parse_color(part, fg)?);
        }
        if let Some(bg) = &self.bg {
            style = style.bg(parse_color(part, bg)?);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.underline {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Ok(style)
    }
}

fn parse_color(part: &str, value: &str) -> Result<Color, ConfigError> {
    Color::from_str(value).map_err(|_| ConfigError::Color {
        part: part.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsScope {
    Project,
    Global,
}

#[derive(Debug, Clone)]
pub struct SettingsLocation {
    pub path: PathBuf,
    pub scope: SettingsScope,
}

impl SettingsScope {
    pub fn label(&self) -> &'static str {
        match self {
            SettingsScope::Project => "project",
            SettingsScope::Global => "global",
        }
    }
}

pub fn init_project_settings(dir: &Path) -> Result<SettingsLocation> {
    let project_dir = dir.join(PROJECT_DIR);
    fs::create_dir_all(&project_dir).context("failed to create .datepick directory")?;
    let location = SettingsLocation {
        path: project_dir.join(FILE_NAME),
        scope: SettingsScope::Project,
    };
    if !location.path.exists() {
        save_settings(&location, &Settings::default())?;
    }
    Ok(location)
}

pub fn locate_settings(start: &Path) -> Result<SettingsLocation> {
    if let Some(project_path) = find_project_settings(start) {
        return Ok(SettingsLocation {
            path: project_path,
            scope: SettingsScope::Project,
        });
    }
    Ok(SettingsLocation {
        path: global_settings_path()?,
        scope: SettingsScope::Global,
    })
}

/// A missing file means defaults; nothing is written.
pub fn load_settings(location: &SettingsLocation) -> Result<Settings> {
    if !location.path.exists() {
        tracing::debug!(path = %location.path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }
    let data = fs::read_to_string(&location.path)
        .with_context(|| format!("reading {:?}", location.path))?;
    let settings: Settings = serde_yaml::from_str(&data)
        .with_context(|| format!("parsing settings file {:?}", location.path))?;
    tracing::info!(path = %location.path.display(), "loaded settings");
    Ok(settings)
}

pub fn save_settings(location: &SettingsLocation, settings: &Settings) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(settings).context("serializing settings")?;
    fs::write(&location.path, serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    Ok(())
}

pub fn log_file_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("datepick.log"))
}

fn find_project_settings(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_DIR).join(FILE_NAME))
        .find(|candidate| candidate.exists())
}

fn global_settings_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(FILE_NAME))
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "datepick").context("locating configuration directory")
}
