use std::collections::HashMap;
use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use log::LevelFilter;

use crate::errors::{CustomResult, Error};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_FILE: &str = "leaderboard.log";

/// settings read from the environment (and `.env`, when present)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub logging_level: LevelFilter,
    pub log_file: String,
    pub leaderboard_timeout: Duration,
}

impl Config {
    pub fn from_env() -> CustomResult<Config> {
        dotenv().ok();
        Config::from_vars(&env::vars().collect())
    }

    /// build the config from an explicit set of variables
    pub fn from_vars(vars: &HashMap<String, String>) -> CustomResult<Config> {
        let get = |key: &str| {
            vars.get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let leaderboard_timeout = match get("LEADERBOARD_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
                _ => {
                    return Err(Error::InvalidConfig {
                        key: "LEADERBOARD_TIMEOUT_SECS".to_string(),
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
            logging_level: parse_level(get("LOGGING_LEVEL").as_deref()),
            log_file: get("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            leaderboard_timeout,
        })
    }

    pub fn database_url(&self) -> CustomResult<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| Error::MissingConfig { key: "DATABASE_URL".to_string() })
    }
}

fn parse_level(verbosity: Option<&str>) -> LevelFilter {
    match verbosity.map(str::to_uppercase).as_deref() {
        Some("OFF") => LevelFilter::Off,
        Some("ERROR") => LevelFilter::Error,
        Some("WARN") => LevelFilter::Warn,
        Some("DEBUG") => LevelFilter::Debug,
        Some("TRACE") => LevelFilter::Trace,
        // default to info
        _ => LevelFilter::Info,
    }
}
