use std::process::ExitCode;

use log::{error, info, warn};
use race_leaderboard::errors::{CustomResult, DatabaseSnafu, Error};
use race_leaderboard::modules::helpers::config::Config;
use race_leaderboard::modules::helpers::logging::{setup_logging, LogOutput};
use race_leaderboard::modules::models::general::establish_connection;
use race_leaderboard::modules::models::race::Race;
use race_leaderboard::modules::redis::{LeaderboardCache, Redis};
use race_leaderboard::modules::seed::{save_snapshot, SeedReport};
use race_leaderboard::Snapshot;
use snafu::ResultExt;

/// load a recorded snapshot file into postgres.
///
/// usage: load_snapshot <snapshot.json>
fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, LogOutput::Stdout).expect("failed to setup logging");

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            error!(target:"load_snapshot", "usage: load_snapshot <snapshot.json>");
            return ExitCode::FAILURE;
        }
    };

    match run(&config, &path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target:"load_snapshot", "failed loading {}: {}", path, err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, path: &str) -> CustomResult<()> {
    let snapshot = Snapshot::load(path)?;
    let conn = &mut establish_connection(config)?;

    let report = save_snapshot(conn, &snapshot)?;
    if report.skipped_entries > 0 {
        warn!(
            target: "load_snapshot",
            "{} entries referenced records outside the snapshot",
            report.skipped_entries,
        );
    }

    // new passings change the leaderboards of every race at their event
    let redis_url = match config.redis_url.as_deref() {
        Some(redis_url) => redis_url,
        None => return Ok(()),
    };
    let events: Vec<i32> = SeedReport::touched_events(&snapshot).into_iter().collect();
    let races = Race::get_by_events(conn, &events).context(DatabaseSnafu)?;

    let r_conn = &mut Redis::connect(redis_url).map_err(|source| Error::Redis { source })?;
    for race in races {
        LeaderboardCache::clear(r_conn, race.id)?;
        info!(target:"load_snapshot", "cleared published leaderboard of race {}", race.id);
    }

    Ok(())
}
