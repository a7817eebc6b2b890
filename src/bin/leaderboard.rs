use std::process::ExitCode;

use log::{error, info, warn};
use race_leaderboard::errors::{CustomResult, Error};
use race_leaderboard::modules::helpers::config::Config;
use race_leaderboard::modules::helpers::logging::{setup_logging, LogOutput};
use race_leaderboard::modules::redis::{LeaderboardCache, Redis};
use race_leaderboard::{get_leaderboard_with_timeout, Leaderboard, PgStore};

const USAGE: &str = "usage: leaderboard <race id> [--publish | --cached]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// compute from postgres and print
    Compute,
    /// compute, print, and publish to redis
    Publish,
    /// print the last published leaderboard
    Cached,
}

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

    let mut args = std::env::args().skip(1);
    let race_id = match args.next().map(|arg| arg.parse::<i32>()) {
        Some(Ok(race_id)) => race_id,
        _ => {
            error!(target:"leaderboard", "{}", USAGE);
            return ExitCode::FAILURE;
        }
    };
    let mode = match args.next().as_deref() {
        None => Mode::Compute,
        Some("--publish") => Mode::Publish,
        Some("--cached") => Mode::Cached,
        Some(_) => {
            error!(target:"leaderboard", "{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(config, race_id, mode).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target:"leaderboard", "failed getting leaderboard of race {}: {}", race_id, err);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, race_id: i32, mode: Mode) -> CustomResult<()> {
    if mode == Mode::Cached {
        let r_conn = &mut connect_redis(&config)?;
        return match LeaderboardCache::fetch(r_conn, race_id)? {
            Some(leaderboard) => print(&leaderboard),
            None => {
                warn!(target:"leaderboard", "no leaderboard published for race {}", race_id);
                Ok(())
            }
        };
    }

    let timeout = config.leaderboard_timeout;
    let store = PgStore::new(config.clone());
    let leaderboard = get_leaderboard_with_timeout(&store, race_id, timeout).await?;
    print(&leaderboard)?;

    if mode == Mode::Publish {
        let r_conn = &mut connect_redis(&config)?;
        LeaderboardCache::publish(r_conn, race_id, &leaderboard)?;
        info!(target:"leaderboard", "published leaderboard of race {}", race_id);
    }

    Ok(())
}

fn connect_redis(config: &Config) -> CustomResult<redis::Connection> {
    let redis_url = config.redis_url.as_deref().ok_or_else(|| Error::MissingConfig {
        key: "REDIS_URL".to_string(),
    })?;

    Redis::connect(redis_url).map_err(|source| Error::Redis { source })
}

fn print(leaderboard: &Leaderboard) -> CustomResult<()> {
    let json = serde_json::to_string_pretty(leaderboard)
        .map_err(|source| Error::Serialization { source })?;
    println!("{json}");

    Ok(())
}
