use crate::model::ViewMode;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "datepick", version, about = "Terminal date picker with a pop-up calendar")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a project config (.datepick/config.yml) in the current directory
    Init,
    /// Pick a date interactively and print it on exit
    Pick {
        /// Initial value, parsed with the format pattern
        #[arg(long)]
        date: Option<String>,
        #[command(flatten)]
        picker: PickerArgs,
    },
    /// Print a calendar grid
    Grid {
        /// Date whose month/year/window is shown (defaults to today)
        #[arg(long)]
        anchor: Option<String>,
        /// Date to mark as selected
        #[arg(long)]
        selected: Option<String>,
        /// Date to mark as today (defaults to the system date)
        #[arg(long)]
        today: Option<String>,
        #[command(flatten)]
        picker: PickerArgs,
    },
    /// Parse date text with the format pattern and print it normalized
    Parse {
        /// Text to parse
        text: String,
        /// Pattern for the output
        #[arg(long, default_value = "YYYY-MM-DD")]
        output_format: String,
        #[command(flatten)]
        picker: PickerArgs,
    },
    /// Show the resolved configuration and where it came from
    Config {
        #[command(flatten)]
        picker: PickerArgs,
    },
}

/// Overrides applied on top of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct PickerArgs {
    /// Date pattern, moment style (e.g. YYYY-MM-DD, LL)
    #[arg(long)]
    pub format: Option<String>,
    /// Input placeholder (defaults to the pattern)
    #[arg(long)]
    pub placeholder: Option<String>,
    /// First day of the week, 0 = Sunday .. 6 = Saturday
    #[arg(long)]
    pub first_day: Option<u8>,
    /// Initial view
    #[arg(long, value_enum)]
    pub view: Option<ViewMode>,
    /// Views reachable from the title, in order
    #[arg(long, value_enum, value_delimiter = ',')]
    pub views: Vec<ViewMode>,
    /// Years either side of the anchor in the year view
    #[arg(long)]
    pub half_span: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_picker_overrides() {
        let cli = Cli::parse_from([
            "datepick",
            "grid",
            "--anchor",
            "March 1, 2023",
            "--views",
            "weeks,years",
            "--view",
            "year",
            "--first-day",
            "1",
        ]);
        match cli.command {
            Some(Command::Grid { anchor, picker, .. }) => {
                assert_eq!(anchor.as_deref(), Some("March 1, 2023"));
                assert_eq!(picker.views, vec![ViewMode::Week, ViewMode::Year]);
                assert_eq!(picker.view, Some(ViewMode::Year));
                assert_eq!(picker.first_day, Some(1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
