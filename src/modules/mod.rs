pub mod leaderboard;
pub mod redis;
pub mod seed;
pub mod store;

pub mod models {
    pub mod entry;
    pub mod passing;
    pub mod race;
    pub mod rider;

    pub mod general;
}

pub mod helpers {
    pub mod config;
    pub mod logging;
}
