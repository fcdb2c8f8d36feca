use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use env_logger::Env;
use tock::{
    app,
    config::{ConfigStore, FileConfigStore},
    duration,
    session::SessionConfig,
};

/// terminal countdown timer and stopwatch with big block digits
#[derive(Parser, Debug, Clone)]
#[command(
    about,
    disable_version_flag = true,
    long_about = "Counts down from DURATION, or up from zero when no duration is given. \
                  Space pauses and resumes; q, Q or ESC quits. A report is printed on exit."
)]
pub struct Cli {
    /// how long to count down, e.g. 90, 5m, 1h30m (omit for a stopwatch)
    #[arg(value_parser = duration::parse_duration)]
    duration: Option<Duration>,

    /// render on the current line instead of fullscreen
    #[arg(short, long)]
    inline: bool,

    /// start paused
    #[arg(short, long)]
    paused: bool,

    /// name shown in the report and the notification
    #[arg(short, long)]
    name: Option<String>,

    /// print the report as JSON
    #[arg(long)]
    json: bool,

    /// read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// print version and exit
    #[arg(short = 'v', long)]
    version: bool,
}

impl Cli {
    fn session(&self) -> SessionConfig {
        SessionConfig {
            target: self.duration.unwrap_or_default(),
            fullscreen: !self.inline,
            start_paused: self.paused,
            name: self.name.clone(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    if cli.version {
        println!("tock version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = store.load();

    let summary = match app::run(&config, cli.session()) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(e.exit_code());
        }
    };

    if cli.json {
        match summary.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("{summary}");
    }
}
