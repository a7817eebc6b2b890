use std::process::ExitCode;

use log::error;
use race_leaderboard::modules::helpers::config::Config;
use race_leaderboard::modules::helpers::logging::{setup_logging, LogOutput};
use race_leaderboard::{get_leaderboard_with_timeout, MemoryStore};

/// compute a leaderboard from a recorded snapshot file.
///
/// usage: replay_passings <snapshot.json> <race id>
#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, LogOutput::Stderr).expect("Failed to setup logging");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, race_id) = match args.as_slice() {
        [path, race_id] => match race_id.parse::<i32>() {
            Ok(race_id) => (path, race_id),
            Err(_) => {
                error!(target:"replay_passings", "invalid race id: {}", race_id);
                return ExitCode::FAILURE;
            }
        },
        _ => {
            error!(target:"replay_passings", "usage: replay_passings <snapshot.json> <race id>");
            return ExitCode::FAILURE;
        }
    };

    let store = match MemoryStore::load(path) {
        Ok(store) => store,
        Err(err) => {
            error!(target:"replay_passings", "{}", err);
            return ExitCode::FAILURE;
        }
    };

    match get_leaderboard_with_timeout(&store, race_id, config.leaderboard_timeout).await {
        Ok(leaderboard) => match serde_json::to_string_pretty(&leaderboard) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!(target:"replay_passings", "{}", err);
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            error!(
                target: "replay_passings",
                "failed computing leaderboard of race {}: {}",
                race_id,
                err,
            );
            ExitCode::FAILURE
        }
    }
}
