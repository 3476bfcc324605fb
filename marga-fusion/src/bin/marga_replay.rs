//! Replays trip directories through the path merger.
//!
//! Each trip directory holds a path-handler log and, optionally, a car-pose
//! log. Every sample is merged in time order and the fusion history is
//! written back into the trip directory as JSON.
//!
//! # Usage
//!
//! ```bash
//! marga_replay data/trip_01 data/trip_02
//! marga_replay --config configs/marga.toml --backend columns data/trip_01
//! RUST_LOG=debug marga_replay --step 0.1 data/trip_01
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use log::{error, info};

use marga_fusion::{
    Backend, CarPoseTrack, MargaConfig, PathLog, PathMerger, TrajectoryStore, TripReplay,
};

/// Offline path-fusion replay
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the store backend
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Override the timeline step in seconds (0 = every sample)
    #[arg(short, long)]
    step: Option<f64>,

    /// Override the history file name written into each trip directory
    #[arg(short, long)]
    output: Option<String>,

    /// Trip directories to replay
    #[arg(required = true)]
    trips: Vec<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match MargaConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(backend) = args.backend {
        config.input.backend = backend;
    }
    if let Some(step) = args.step {
        config.replay.step_s = step;
    }
    if let Some(output) = args.output {
        config.replay.output = output;
    }
    config.merger.debug = true;

    // Trips are independent; one worker per directory
    let failures = std::thread::scope(|scope| {
        let handles: Vec<_> = args
            .trips
            .iter()
            .map(|trip| {
                let config = &config;
                scope.spawn(move || (trip, replay_trip(config, trip)))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok((_, Ok(()))) => false,
                Ok((trip, Err(e))) => {
                    error!("{}: {}", trip.display(), e);
                    true
                }
                Err(_) => {
                    error!("Trip worker panicked");
                    true
                }
            })
            .filter(|failed| *failed)
            .count()
    });

    if failures > 0 {
        eprintln!("{} of {} trips failed", failures, args.trips.len());
        std::process::exit(1);
    }
}

fn replay_trip(config: &MargaConfig, trip_dir: &Path) -> marga_fusion::Result<()> {
    let log = PathLog::from_csv_path(config.path_log_in(trip_dir))?;
    let store: Box<dyn TrajectoryStore> = match config.input.backend {
        Backend::Rows => Box::new(log.into_row_table()),
        Backend::Columns => Box::new(log.into_column_table()?),
    };

    let car_pose_path = config.car_pose_log_in(trip_dir);
    let car_track = if car_pose_path.exists() {
        Some(CarPoseTrack::from_csv_path(&car_pose_path)?)
    } else {
        info!("{}: no car-pose log, using logged poses", trip_dir.display());
        None
    };

    let mut replay = TripReplay::new(store.as_ref());
    if let Some(track) = car_track.as_ref() {
        replay = replay.with_car_track(track);
    }

    let mut merger = PathMerger::new(config.merger.clone())?;
    let summary = replay.run_with_step(&mut merger, config.replay.step_s)?;

    let output = config.output_in(trip_dir);
    let history = merger.take_history();
    history.write_json(&output)?;
    info!(
        "{}: {} merged, {} skipped, {} fusion records -> {}",
        trip_dir.display(),
        summary.merged(),
        summary.skipped,
        history.len(),
        output.display()
    );
    Ok(())
}
