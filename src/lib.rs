pub mod errors;
pub mod models;
pub mod schema;

pub(crate) mod macros;
pub mod modules;

pub use modules::leaderboard::{
    get_leaderboard, get_leaderboard_with_timeout, Leaderboard, LeaderboardEntry,
};
pub use modules::store::{MemoryStore, PgStore, RaceStore, Snapshot};
