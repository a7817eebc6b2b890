use std::path::PathBuf;
use std::time::Duration;

use snafu::Snafu;

pub type CustomResult<T> = Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("race {race_id} does not exist"))]
    NotFound { race_id: i32 },

    #[snafu(display("database error: {source}"))]
    Database { source: diesel::result::Error },

    #[snafu(display("could not connect to the database: {source}"))]
    Connection { source: diesel::ConnectionError },

    #[snafu(display("redis error: {source}"))]
    Redis { source: redis::RedisError },

    #[snafu(display("could not (de)serialize leaderboard data: {source}"))]
    Serialization { source: serde_json::Error },

    #[snafu(display("could not read {}: {source}", path.display()))]
    Io { source: std::io::Error, path: PathBuf },

    #[snafu(display("leaderboard for race {race_id} took longer than {limit:?}"))]
    Timeout { race_id: i32, limit: Duration },

    #[snafu(display("background task failed: {source}"))]
    TaskJoin { source: tokio::task::JoinError },

    #[snafu(display("{key} must be set"))]
    MissingConfig { key: String },

    #[snafu(display("invalid value for {key}: {value}"))]
    InvalidConfig { key: String, value: String },
}
