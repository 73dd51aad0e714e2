use anyhow::Result;
use clap::Parser;
use datepick::cli::{Cli, Command, PickerArgs};
use datepick::{commands, config, logging};

fn main() -> Result<()> {
    let args = Cli::parse();
    let command = args.command.unwrap_or(Command::Pick {
        date: None,
        picker: PickerArgs::default(),
    });
    match &command {
        // The terminal belongs to the UI; log to a file instead.
        Command::Pick { .. } => {
            if let Err(err) = config::log_file_path().and_then(|path| logging::init_file(&path)) {
                eprintln!("warning: logging disabled: {err:#}");
            }
        }
        _ => logging::init_stderr(),
    }
    tracing::debug!(?command, "starting");
    match command {
        Command::Init => commands::init(),
        Command::Pick { date, picker } => commands::pick(date, picker),
        Command::Grid {
            anchor,
            selected,
            today,
            picker,
        } => commands::grid(anchor, selected, today, picker),
        Command::Parse {
            text,
            output_format,
            picker,
        } => commands::parse(text, output_format, picker),
        Command::Config { picker } => commands::show_config(picker),
    }
}
