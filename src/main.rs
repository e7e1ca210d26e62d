mod balanced;
mod config;
mod difficulty;
mod draw;
mod error;
mod league;
mod normalize;
mod pipeline;
mod schedule;
mod standings;

use crate::config::Settings;
use anyhow::Context;
use log::{LevelFilter, info};
use nhl_api::cache::DirCache;
use nhl_api::client::NhlSource;
use std::io;

fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let settings = Settings::load().context("loading settings")?;
    setup_logger(settings.log_level);
    info!(
        "{} season, {} mode, {} schedules, rated by {}",
        settings.season.label(),
        settings.mode,
        settings.policy,
        settings.metric
    );

    let source = NhlSource::with_cache(Box::new(DirCache::new(&settings.cache_dir)));
    let report = pipeline::run(&source, &settings).map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("schedule difficulty failed at the {stage} stage"))
    })?;
    info!(
        "opponents rated by {} from {} standings",
        report.metric,
        report.reference_season.label()
    );

    draw::draw(&mut io::stdout().lock(), &report).context("writing report")?;
    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("nhlsked {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "nhlsked - NHL schedule difficulty by team

Usage:
  nhlsked
  nhlsked --help
  nhlsked --version

Environment:
  NHLSKED_CONFIG             Path to a JSON settings file
  NHLSKED_SEASON             Season to rate: start year (2012, 2012-2013) or 'current'
  NHLSKED_REFERENCE_SEASON   Season whose standings rate opponents (default: the one before)
  NHLSKED_MODE               raw | absolute | relative (default relative)
  NHLSKED_POLICY             symmetric | home-only (default symmetric)
  NHLSKED_METRIC             points | in-conference | versus-shift (default points)
  NHLSKED_CACHE_DIR          Page cache directory (default ./cache)
  NHLSKED_LOG                Log level (default warn; RUST_LOG also honored)"
}

fn setup_logger(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).init();
}
