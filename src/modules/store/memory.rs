use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tokio::sync::RwLock;

use crate::errors::{CustomResult, Error, IoSnafu, SerializationSnafu};
use crate::modules::models::entry::Entry;
use crate::modules::models::passing::Passing;
use crate::modules::models::race::Race;
use crate::modules::models::rider::{normalize_transponder, Rider};
use crate::modules::store::RaceStore;

/// every record needed to compute leaderboards, as one document
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub races: Vec<Race>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub riders: Vec<Rider>,
    #[serde(default)]
    pub passings: Vec<Passing>,
}

impl Snapshot {
    /// read a snapshot from a json file
    pub fn load(path: impl AsRef<Path>) -> CustomResult<Snapshot> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).context(IoSnafu { path })?;

        serde_json::from_str(&raw).context(SerializationSnafu)
    }
}

/// an in-process store over a [`Snapshot`].
///
/// used for replaying recorded passing files and in tests.
pub struct MemoryStore {
    data: RwLock<Snapshot>,
    latency: Option<Duration>,
    transponder_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn from_snapshot(snapshot: Snapshot) -> MemoryStore {
        MemoryStore {
            data: RwLock::new(snapshot),
            latency: None,
            transponder_lookups: AtomicUsize::new(0),
        }
    }

    /// read a snapshot file into a new store
    pub fn load(path: impl AsRef<Path>) -> CustomResult<MemoryStore> {
        Ok(MemoryStore::from_snapshot(Snapshot::load(path)?))
    }

    /// delay every read, to simulate a slow backend
    pub fn with_latency(mut self, latency: Duration) -> MemoryStore {
        self.latency = Some(latency);
        self
    }

    pub async fn push_passing(&self, passing: Passing) {
        self.data.write().await.passings.push(passing);
    }

    /// how many times a rider was looked up by transponder
    pub fn transponder_lookups(&self) -> usize {
        self.transponder_lookups.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RaceStore for MemoryStore {
    async fn get_race(&self, race_id: i32) -> CustomResult<Race> {
        self.wait().await;
        self.data
            .read()
            .await
            .races
            .iter()
            .find(|race| race.id == race_id)
            .cloned()
            .ok_or(Error::NotFound { race_id })
    }

    async fn get_entries(&self, race_id: i32) -> CustomResult<Vec<Entry>> {
        self.wait().await;
        Ok(self
            .data
            .read()
            .await
            .entries
            .iter()
            .filter(|entry| entry.race_id == race_id)
            .cloned()
            .collect())
    }

    async fn get_riders(&self, ids: &[i32]) -> CustomResult<Vec<Rider>> {
        self.wait().await;
        Ok(self
            .data
            .read()
            .await
            .riders
            .iter()
            .filter(|rider| ids.contains(&rider.id))
            .cloned()
            .collect())
    }

    async fn get_rider_by_transponder(&self, code: &str) -> CustomResult<Option<Rider>> {
        self.transponder_lookups.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        let code = match normalize_transponder(code) {
            Some(code) => code,
            None => return Ok(None),
        };

        Ok(self
            .data
            .read()
            .await
            .riders
            .iter()
            .find(|rider| rider.transponder_code() == Some(code))
            .cloned())
    }

    async fn query_passings(
        &self,
        event_id: i32,
        since: NaiveDateTime,
        transponders: &BTreeSet<String>,
    ) -> CustomResult<Vec<Passing>> {
        self.wait().await;
        Ok(self
            .data
            .read()
            .await
            .passings
            .iter()
            .filter(|passing| passing.matches(event_id, since, transponders))
            .cloned()
            .collect())
    }
}
