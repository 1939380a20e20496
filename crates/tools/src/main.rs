use std::path::PathBuf;

use clap::{Parser, Subcommand};
use editor::AppSettings;
use geometry::{DEFAULT_MARKER_STEP_M, GeometryService, HttpGeometryService, measure};
use tools::replay::{parse_script, run_replay};
use tools::read_waypoints;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track geometry utilities")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the length and distance markers of a waypoint file as JSON
    Measure {
        /// Waypoint file: `[{latitude, longitude}, ...]` or `{ "waypoints": [...] }`
        track: PathBuf,

        /// Distance between markers in metres
        #[arg(long, default_value_t = DEFAULT_MARKER_STEP_M)]
        step: u32,

        /// Ask a running geometry server instead of computing locally
        #[arg(long)]
        server: Option<String>,
    },

    /// Replay a scripted edit session against an in-memory map
    Replay {
        /// Script file: `{ "waypoints": [...], "steps": [...] }`
        script: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Directory holding `settings.json` (created with defaults if missing)
        #[arg(long)]
        settings_dir: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("start runtime: {e}"))?;

    match args.command {
        Command::Measure {
            track,
            step,
            server,
        } => runtime.block_on(cmd_measure(track, step, server)),
        Command::Replay {
            script,
            json,
            settings_dir,
        } => runtime.block_on(cmd_replay(script, json, settings_dir)),
    }
}

async fn cmd_measure(track: PathBuf, step: u32, server: Option<String>) -> Result<(), String> {
    let waypoints = read_waypoints(&track)?;
    let summary = match server {
        Some(url) => {
            let service = HttpGeometryService::new(&url);
            info!("measuring {} waypoints via {}", waypoints.len(), service.endpoint());
            service
                .compute(&waypoints)
                .await
                .map_err(|e| e.to_string())?
        }
        None => measure(&waypoints, step),
    };

    let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

async fn cmd_replay(
    script: PathBuf,
    json: bool,
    settings_dir: Option<PathBuf>,
) -> Result<(), String> {
    let settings = match settings_dir {
        Some(dir) => AppSettings::load_or_init(&dir).map_err(|e| e.to_string())?,
        None => AppSettings::default(),
    };
    let text = std::fs::read_to_string(&script).map_err(|e| format!("read {script:?}: {e}"))?;
    let report = run_replay(&parse_script(&text)?, settings).await?;

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        println!("length: {} m", report.length);
        println!("markers: {}", report.markers);
        println!("waypoints: {}", report.waypoints.len());
        println!("changes: {}", report.changes);
        println!("metrics: {}", report.metrics);
    }
    Ok(())
}
