//! the data the leaderboard is computed from.
//!
//! races, entries, riders and passings are owned by other parts of the system.
//! the leaderboard only reads them through [`RaceStore`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::errors::CustomResult;
use crate::modules::models::entry::Entry;
use crate::modules::models::passing::Passing;
use crate::modules::models::race::Race;
use crate::modules::models::rider::Rider;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryStore, Snapshot};
pub use postgres::PgStore;

#[async_trait]
pub trait RaceStore: Send + Sync {
    /// fails with `Error::NotFound` when the race does not exist
    async fn get_race(&self, race_id: i32) -> CustomResult<Race>;

    async fn get_entries(&self, race_id: i32) -> CustomResult<Vec<Entry>>;

    /// riders that do not exist are left out of the result
    async fn get_riders(&self, ids: &[i32]) -> CustomResult<Vec<Rider>>;

    async fn get_rider_by_id(&self, id: i32) -> CustomResult<Option<Rider>> {
        Ok(self.get_riders(&[id]).await?.into_iter().next())
    }

    async fn get_rider_by_transponder(&self, code: &str) -> CustomResult<Option<Rider>>;

    /// passings of `event_id` at or after `since` made by one of `transponders`.
    /// an empty transponder set matches nothing
    async fn query_passings(
        &self,
        event_id: i32,
        since: NaiveDateTime,
        transponders: &BTreeSet<String>,
    ) -> CustomResult<Vec<Passing>>;
}
