#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Geocache in a terminal.

mod script;
mod session;
mod text_view;

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use geocache_core::{Event, GameConfig, ViewportSpan};
use geocache_system_sensor::{ScriptedPositionSource, SensorEvent};
use geocache_world::query;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use script::{parse_fix_line, parse_line, ScriptCommand};
use session::Session;
use text_view::TextView;

#[derive(Parser, Debug)]
#[command(author, version, about = "Collect, stack and destroy location-anchored caches", long_about = None)]
struct Args {
    /// TOML file overriding the gameplay tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// File of position fixes (`LAT LNG` or `fail REASON` per line) replayed after startup
    #[arg(long)]
    fixes: Option<PathBuf>,

    /// Behave as if the platform offered no position source
    #[arg(long, conflicts_with = "fixes")]
    no_sensor: bool,

    /// Print every world event as a JSON line instead of narration
    #[arg(long)]
    json: bool,

    /// Visible latitude span in degrees; makes cache windows follow the view
    #[arg(long, requires = "view_lng_span", value_parser = parse_span)]
    view_lat_span: Option<f64>,

    /// Visible longitude span in degrees
    #[arg(long, requires = "view_lat_span", value_parser = parse_span)]
    view_lng_span: Option<f64>,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    points: String,
    location: &'a str,
    notice: Option<&'a str>,
}

#[derive(Serialize)]
struct CacheReport {
    i: i32,
    j: i32,
    value: u32,
    distance_meters: f64,
    in_range: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let source = if args.no_sensor {
        ScriptedPositionSource::unavailable()
    } else {
        ScriptedPositionSource::new(load_fixes(args.fixes.as_deref())?)
    };
    let span = match (args.view_lat_span, args.view_lng_span) {
        (Some(lat), Some(lng)) => Some(ViewportSpan::new(lat, lng)),
        _ => None,
    };

    let stdin = io::stdin();
    if args.json {
        let view = TextView::new(io::sink(), span);
        play(config, source, view, stdin.lock(), Output::Json)
    } else {
        let view = TextView::new(io::stdout(), span);
        play(config, source, view, stdin.lock(), Output::Text)
    }
}

fn parse_span(raw: &str) -> std::result::Result<f64, String> {
    let span: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if span.is_finite() && span >= 0.0 {
        Ok(span)
    } else {
        Err(format!("span must be a finite, non-negative number of degrees (received {raw})"))
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config: GameConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config at {}", path.display()))?;
    Ok(config)
}

fn load_fixes(path: Option<&Path>) -> Result<Vec<SensorEvent>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixes at {}", path.display()))?;
    let mut fixes = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let parsed = parse_fix_line(line)
            .with_context(|| format!("{}:{}", path.display(), index + 1))?;
        fixes.extend(parsed);
    }
    debug!(count = fixes.len(), "loaded scripted fixes");
    Ok(fixes)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    Text,
    Json,
}

fn play<W: Write>(
    config: GameConfig,
    source: ScriptedPositionSource,
    view: TextView<W>,
    input: impl BufRead,
    output: Output,
) -> Result<()> {
    let (mut session, events) = Session::start(config, source, view)?;
    if output == Output::Text {
        let banner = query::welcome_banner(session.world());
        session.view_mut().line(banner)?;
    }
    emit(output, &events)?;

    for line in input.lines() {
        let line = line.context("Failed to read from stdin")?;
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                warn!(%error, line = line.as_str(), "ignoring input line");
                eprintln!("{error}");
                continue;
            }
        };

        let events = match command {
            ScriptCommand::World(command) => session.submit(command)?,
            ScriptCommand::Sensor(event) => session.feed(event)?,
            ScriptCommand::Restart => session.restart()?,
            ScriptCommand::Caches => {
                print_caches(&mut session, output)?;
                continue;
            }
            ScriptCommand::Status => {
                print_status(&mut session, output)?;
                continue;
            }
            ScriptCommand::Quit => break,
        };
        emit(output, &events)?;
    }

    let _ = session.shutdown()?;
    Ok(())
}

fn emit(output: Output, events: &[Event]) -> Result<()> {
    if output == Output::Json {
        let mut stdout = io::stdout().lock();
        for event in events {
            serde_json::to_writer(&mut stdout, event)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn print_status<W: Write>(session: &mut Session<TextView<W>>, output: Output) -> Result<()> {
    let status = session.status();
    let report = StatusReport {
        points: status.points_line(),
        location: status.location_line(),
        notice: status.notice(),
    };
    match output {
        Output::Json => println!("{}", serde_json::to_string(&report)?),
        Output::Text => {
            let mut text = format!("{}\n{}", report.points, report.location);
            if let Some(notice) = report.notice {
                text.push('\n');
                text.push_str(notice);
            }
            session.view_mut().line(&text)?;
        }
    }
    Ok(())
}

fn print_caches<W: Write>(session: &mut Session<TextView<W>>, output: Output) -> Result<()> {
    let caches: Vec<CacheReport> = query::cache_view(session.world())
        .iter()
        .map(|cache| CacheReport {
            i: cache.cell.i(),
            j: cache.cell.j(),
            value: cache.value,
            distance_meters: cache.distance_meters,
            in_range: cache.in_range,
        })
        .collect();
    match output {
        Output::Json => println!("{}", serde_json::to_string(&caches)?),
        Output::Text => {
            for cache in caches {
                let reach = if cache.in_range { "in reach" } else { "far" };
                session.view_mut().line(&format!(
                    "{:>5},{:<5} {:>3} points  {:>6.1}m  {reach}",
                    cache.i, cache.j, cache.value, cache.distance_meters
                ))?;
            }
        }
    }
    Ok(())
}
