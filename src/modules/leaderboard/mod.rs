//! the live leaderboard of a race.
//!
//! the race and its registered transponders are read concurrently, then the
//! passings of the race window. everything after that is computed in memory
//! from that snapshot.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::NaiveDateTime;
use futures::future::try_join_all;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::modules::models::passing::Passing;
use crate::modules::models::race::Race;
use crate::modules::models::rider::Rider;
use crate::modules::store::RaceStore;

pub mod ranking;

use ranking::{LapHistory, LapThreshold, Rankings};

/// who a leaderboard line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiderIdentity {
    /// the passing was stored with a rider
    Recorded(i32),
    /// looked up afterwards through the current owner of the transponder
    Resolved(i32),
    /// nobody owns the transponder
    Unknown,
}

impl RiderIdentity {
    pub fn rider_id(self) -> Option<i32> {
        match self {
            RiderIdentity::Recorded(id) | RiderIdentity::Resolved(id) => Some(id),
            RiderIdentity::Unknown => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub race_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rider_id: Option<i32>,
    pub transponder: String,
    pub date: NaiveDateTime,
    pub lap_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_diff: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub is_finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_finish_time: Option<NaiveDateTime>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn leader(&self) -> Option<&LeaderboardEntry> {
        self.leaderboard.first()
    }
}

/// # registered transponders
/// the distinct transponders of the riders entered in a race.
/// riders without a transponder do not count.
///
/// ## Arguments
/// * `store` - where the race data lives
/// * `race_id` - the race
///
/// ## Returns
/// * `BTreeSet<String>` - the transponder codes, empty when nobody is entered
pub async fn resolve_transponders<S: RaceStore + ?Sized>(
    store: &S,
    race_id: i32,
) -> CustomResult<BTreeSet<String>> {
    let entries = store.get_entries(race_id).await?;
    if entries.is_empty() {
        return Ok(BTreeSet::new());
    }

    let rider_ids: Vec<i32> = entries.iter().map(|entry| entry.rider_id).collect();
    let riders = store.get_riders(&rider_ids).await?;

    Ok(Rider::transponders_of(&riders))
}

/// find the rider behind a passing, falling back to the current owner of the transponder
async fn identify<S: RaceStore + ?Sized>(
    store: &S,
    passing: &Passing,
) -> CustomResult<RiderIdentity> {
    if let Some(rider_id) = passing.rider_id {
        return Ok(RiderIdentity::Recorded(rider_id));
    }

    match store.get_rider_by_transponder(&passing.transponder).await? {
        Some(rider) => Ok(RiderIdentity::Resolved(rider.id)),
        None => {
            warn!(
                target: "leaderboard:identify",
                "no rider owns transponder {}",
                passing.transponder,
            );
            Ok(RiderIdentity::Unknown)
        }
    }
}

/// # get the leaderboard of a race
/// rank every registered transponder by laps completed (capped at the race's lap
/// count) and crossing time, with the gap to the leader at each rider's last lap.
///
/// ## Arguments
/// * `store` - where the race data lives
/// * `race_id` - the race
///
/// ## Returns
/// * `Leaderboard` - the ranked board and finish status. fails with
///   `Error::NotFound` if the race does not exist
pub async fn get_leaderboard<S: RaceStore + ?Sized>(
    store: &S,
    race_id: i32,
) -> CustomResult<Leaderboard> {
    let (race, transponders) = tokio::try_join!(
        store.get_race(race_id),
        resolve_transponders(store, race_id)
    )?;
    debug!(
        target: "leaderboard:get_leaderboard",
        "race {} has {} registered transponders",
        race_id,
        transponders.len(),
    );

    let passings = store
        .query_passings(race.event_id, race.passings_since(), &transponders)
        .await?;
    debug!(
        target: "leaderboard:get_leaderboard",
        "race {} has {} passings",
        race_id,
        passings.len(),
    );

    let history = LapHistory::from_passings(passings);
    let mut rankings = Rankings::new(&history);
    let standings = rankings.at(LapThreshold::for_race(&race)).to_vec();

    let identities =
        try_join_all(standings.iter().map(|standing| identify(store, &standing.passing))).await?;

    let leaderboard: Vec<LeaderboardEntry> = standings
        .into_iter()
        .zip(identities)
        .map(|(standing, identity)| LeaderboardEntry {
            race_id,
            rider_id: identity.rider_id(),
            seconds_diff: rankings.seconds_behind_leader(&standing),
            transponder: standing.passing.transponder,
            date: standing.passing.date,
            lap_count: standing.lap_count,
        })
        .collect();

    let (is_finished, leader_finish_time) = finish_status(&race, leaderboard.first());
    debug!(
        target: "leaderboard:get_leaderboard",
        "race {}: {} riders on the board, finished: {}",
        race_id,
        leaderboard.len(),
        is_finished,
    );

    Ok(Leaderboard {
        is_finished,
        leader_finish_time,
        leaderboard,
    })
}

/// [`get_leaderboard`], abandoned as a whole once `limit` has passed
pub async fn get_leaderboard_with_timeout<S: RaceStore + ?Sized>(
    store: &S,
    race_id: i32,
    limit: Duration,
) -> CustomResult<Leaderboard> {
    match tokio::time::timeout(limit, get_leaderboard(store, race_id)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                target: "leaderboard:get_leaderboard_with_timeout",
                "leaderboard for race {} timed out",
                race_id,
            );
            Err(Error::Timeout { race_id, limit })
        }
    }
}

/// a race is finished once its leader has completed the configured lap count.
/// races without a lap count never finish
fn finish_status(race: &Race, leader: Option<&LeaderboardEntry>) -> (bool, Option<NaiveDateTime>) {
    match (race.target_laps(), leader) {
        (Some(target), Some(leader)) if leader.lap_count >= target => (true, Some(leader.date)),
        _ => (false, None),
    }
}
