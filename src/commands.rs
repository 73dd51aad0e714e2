use crate::cli::PickerArgs;
use crate::config::{
    init_project_settings, load_settings, locate_settings, Settings, SettingsLocation,
};
use crate::date::{Clock, DateValue, FixedClock, SystemClock};
use crate::grid::{self, GridContext};
use crate::model::ViewMode;
use crate::pattern::DatePattern;
use crate::ui;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::env;

pub fn init() -> Result<()> {
    let cwd = env::current_dir()?;
    let location = init_project_settings(&cwd)?;
    tracing::info!(path = %location.path.display(), "project config ready");
    println!("Initialized config at {}", location.path.display());
    Ok(())
}

pub fn pick(date: Option<String>, args: PickerArgs) -> Result<()> {
    let (settings, location) = load_current_settings(&args)?;
    let (config, theme) = settings
        .validate()
        .with_context(|| format!("invalid settings in {}", location.path.display()))?;
    let pattern = config.pattern.clone();
    let picked = ui::run(config, theme, date.map(DateValue::from), &location)?;
    match picked {
        Some(date) => {
            tracing::info!(%date, "picked");
            println!("{}", pattern.format(date));
        }
        None => tracing::info!("no date confirmed"),
    }
    Ok(())
}

pub fn grid(
    anchor: Option<String>,
    selected: Option<String>,
    today: Option<String>,
    args: PickerArgs,
) -> Result<()> {
    let (settings, _) = load_current_settings(&args)?;
    let clock: Box<dyn Clock> = match today {
        Some(text) => {
            let pattern = DatePattern::new(&settings.format)?;
            Box::new(FixedClock(parse_arg(&text, &pattern, "--today")?))
        }
        None => Box::new(SystemClock),
    };
    let text = render_grid(
        &settings,
        anchor.as_deref(),
        selected.as_deref(),
        clock.as_ref(),
    )?;
    println!("{}", text);
    Ok(())
}

pub fn parse(text: String, output_format: String, args: PickerArgs) -> Result<()> {
    let (settings, _) = load_current_settings(&args)?;
    println!("{}", normalize(&settings, &text, &output_format)?);
    Ok(())
}

pub fn show_config(args: PickerArgs) -> Result<()> {
    let (settings, location) = load_current_settings(&args)?;
    settings.validate()?;
    let status = if location.path.exists() {
        "loaded"
    } else {
        "not found, using defaults"
    };
    println!(
        "# {} config: {} ({})",
        location.scope.label(),
        location.path.display(),
        status
    );
    print!("{}", serde_yaml::to_string(&settings)?);
    Ok(())
}

fn render_grid(
    settings: &Settings,
    anchor: Option<&str>,
    selected: Option<&str>,
    clock: &dyn Clock,
) -> Result<String> {
    let (config, _) = settings.validate()?;
    let today = clock.today();
    let anchor = match anchor {
        Some(text) => parse_arg(text, &config.pattern, "--anchor")?,
        None => today,
    };
    let selected = selected
        .map(|text| parse_arg(text, &config.pattern, "--selected"))
        .transpose()?;
    let ctx = GridContext {
        anchor,
        selected,
        today,
        first_day_of_week: config.first_day_of_week,
        year_half_span: config.year_half_span,
    };
    Ok(grid::to_text(config.view, &ctx))
}

fn normalize(settings: &Settings, text: &str, output_format: &str) -> Result<String> {
    let (config, _) = settings.validate()?;
    let output = DatePattern::new(output_format).context("invalid --output-format")?;
    let date = parse_arg(text, &config.pattern, "date")?;
    Ok(output.format(date))
}

fn parse_arg(text: &str, pattern: &DatePattern, what: &str) -> Result<NaiveDate> {
    pattern.parse(text).ok_or_else(|| {
        tracing::warn!(%pattern, text, "unparseable {}", what);
        anyhow!("{} {:?} does not match pattern {}", what, text, pattern)
    })
}

fn load_current_settings(args: &PickerArgs) -> Result<(Settings, SettingsLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_settings(&cwd)?;
    let mut settings = load_settings(&location)?;
    apply_overrides(&mut settings, args);
    Ok((settings, location))
}

fn apply_overrides(settings: &mut Settings, args: &PickerArgs) {
    if let Some(format) = &args.format {
        settings.format = format.clone();
    }
    if let Some(placeholder) = &args.placeholder {
        settings.placeholder = Some(placeholder.clone());
    }
    if let Some(first_day) = args.first_day {
        settings.first_day_of_week = first_day;
    }
    if !args.views.is_empty() {
        settings.available_views = args.views.clone();
        // Narrowing the views without naming a start view starts on the first one.
        if args.view.is_none() && !args.views.contains(&settings.view) {
            settings.view = args.views[0];
        }
    }
    if let Some(view) = args.view {
        settings.view = view;
    }
    if let Some(half_span) = args.half_span {
        settings.year_half_span = half_span;
    }
}
