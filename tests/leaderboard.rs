use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use race_leaderboard::errors::{CustomResult, Error};
use race_leaderboard::modules::leaderboard::resolve_transponders;
use race_leaderboard::modules::models::entry::Entry;
use race_leaderboard::modules::models::passing::Passing;
use race_leaderboard::modules::models::race::Race;
use race_leaderboard::modules::models::rider::Rider;
use race_leaderboard::{
    get_leaderboard, get_leaderboard_with_timeout, MemoryStore, RaceStore, Snapshot,
};

const RACE: i32 = 1;
const EVENT: i32 = 10;

fn at(seconds: i64) -> NaiveDateTime {
    DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap().naive_utc()
}

fn race(lap_count: Option<i32>) -> Race {
    Race {
        id: RACE,
        name: "Cat 1/2".to_string(),
        event_id: EVENT,
        series_id: Some(2),
        scheduled_start_time: Some("10:00".to_string()),
        actual_start: None,
        actual_end: None,
        lap_count,
    }
}

fn rider(id: i32, transponder: Option<&str>) -> Rider {
    Rider {
        id,
        firstname: format!("Rider{id}"),
        lastname: "Test".to_string(),
        transponder: transponder.map(str::to_string),
    }
}

fn entry(id: i32, rider_id: i32) -> Entry {
    Entry {
        id,
        race_id: RACE,
        rider_id,
    }
}

fn laps(transponder: &str, times: &[i64]) -> Vec<Passing> {
    times
        .iter()
        .map(|seconds| Passing {
            id: 0,
            event_id: EVENT,
            transponder: transponder.to_string(),
            date: at(*seconds),
            rider_id: None,
        })
        .collect()
}

fn numbered(passings: Vec<Vec<Passing>>) -> Vec<Passing> {
    passings
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(id, passing)| Passing {
            id: id as i32 + 1,
            ..passing
        })
        .collect()
}

/// riders 1 and 2 entered with transponders "A" and "B"
fn two_rider_snapshot(lap_count: Option<i32>, passings: Vec<Vec<Passing>>) -> Snapshot {
    Snapshot {
        races: vec![race(lap_count)],
        entries: vec![entry(1, 1), entry(2, 2)],
        riders: vec![rider(1, Some("A")), rider(2, Some("B"))],
        passings: numbered(passings),
    }
}

#[tokio::test]
async fn gap_is_measured_against_the_lap_leader() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(
        None,
        vec![laps("A", &[0, 60]), laps("B", &[5, 70])],
    ));

    let board = get_leaderboard(&store, RACE).await.unwrap();

    assert!(!board.is_finished);
    assert_eq!(board.leader_finish_time, None);
    let ranked: Vec<(&str, u32, Option<i64>)> = board
        .leaderboard
        .iter()
        .map(|e| (e.transponder.as_str(), e.lap_count, e.seconds_diff))
        .collect();
    assert_eq!(ranked, vec![("A", 2, None), ("B", 2, Some(10))]);
    assert!(board.leaderboard.iter().all(|e| e.race_id == RACE));
}

#[tokio::test]
async fn finishes_when_leader_completes_lap_count() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(
        Some(3),
        vec![laps("A", &[0, 60, 120, 180]), laps("B", &[5, 70])],
    ));

    let board = get_leaderboard(&store, RACE).await.unwrap();

    assert!(board.is_finished);
    assert_eq!(board.leader_finish_time, Some(at(120)));
    let leader = board.leader().unwrap();
    assert_eq!((leader.transponder.as_str(), leader.lap_count, leader.date), ("A", 3, at(120)));
    assert_eq!(board.leaderboard[1].lap_count, 2);
    assert_eq!(board.leaderboard[1].seconds_diff, Some(10));
}

#[tokio::test]
async fn unfinished_race_has_no_finish_time() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(
        Some(5),
        vec![laps("A", &[0, 60, 120]), laps("B", &[5, 70])],
    ));

    let board = get_leaderboard(&store, RACE).await.unwrap();

    assert!(!board.is_finished);
    assert_eq!(board.leader_finish_time, None);
    assert_eq!(board.leaderboard[0].lap_count, 3);
}

#[tokio::test]
async fn unknown_race_is_not_found() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(None, vec![]));

    let result = get_leaderboard(&store, 99).await;

    assert!(matches!(result, Err(Error::NotFound { race_id: 99 })));
}

#[tokio::test]
async fn race_without_entries_is_empty() {
    let store = MemoryStore::from_snapshot(Snapshot {
        races: vec![race(Some(3))],
        riders: vec![rider(1, Some("A"))],
        passings: numbered(vec![laps("A", &[0, 60, 120])]),
        ..Snapshot::default()
    });

    let board = get_leaderboard(&store, RACE).await.unwrap();

    assert!(!board.is_finished);
    assert_eq!(board.leader_finish_time, None);
    assert!(board.leaderboard.is_empty());
}

#[tokio::test]
async fn race_without_passings_is_empty() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(Some(3), vec![]));

    let board = get_leaderboard(&store, RACE).await.unwrap();

    assert!(!board.is_finished);
    assert!(board.leaderboard.is_empty());
}

#[tokio::test]
async fn only_registered_transponders_in_the_race_window_count() {
    let mut snapshot = two_rider_snapshot(
        None,
        vec![
            laps("A", &[-30, 0, 60]),
            laps("B", &[5, 70]),
            // not entered
            laps("C", &[1, 2, 3]),
        ],
    );
    snapshot.races[0].actual_start = Some(at(0));
    // another event at the same venue
    snapshot.passings.push(Passing {
        id: 100,
        event_id: EVENT + 1,
        transponder: "B".to_string(),
        date: at(100),
        rider_id: None,
    });
    let store = MemoryStore::from_snapshot(snapshot);

    let board = get_leaderboard(&store, RACE).await.unwrap();

    let ranked: Vec<(&str, u32)> = board
        .leaderboard
        .iter()
        .map(|e| (e.transponder.as_str(), e.lap_count))
        .collect();
    assert_eq!(ranked, vec![("A", 2), ("B", 2)]);
}

#[tokio::test]
async fn transponders_are_resolved_from_entries() {
    let store = MemoryStore::from_snapshot(Snapshot {
        races: vec![race(None)],
        entries: vec![entry(1, 1), entry(2, 2), entry(3, 3), entry(4, 4), entry(5, 404)],
        riders: vec![
            rider(1, Some("A")),
            rider(2, None),
            rider(3, Some("A")),
            rider(4, Some("D")),
        ],
        passings: vec![],
    });

    let transponders = resolve_transponders(&store, RACE).await.unwrap();

    assert_eq!(transponders.into_iter().collect::<Vec<_>>(), vec!["A", "D"]);
}

#[tokio::test]
async fn identity_is_backfilled_from_the_transponder_owner() {
    let mut snapshot = two_rider_snapshot(None, vec![laps("A", &[0, 60]), laps("B", &[5, 70])]);
    // the passing of B already carries its rider
    for passing in snapshot.passings.iter_mut().filter(|p| p.transponder == "B") {
        passing.rider_id = Some(2);
    }
    let store = MemoryStore::from_snapshot(snapshot);

    let board = get_leaderboard(&store, RACE).await.unwrap();

    assert_eq!(board.leaderboard[0].rider_id, Some(1));
    assert_eq!(board.leaderboard[1].rider_id, Some(2));
    assert_eq!(store.transponder_lookups(), 1);
}

#[tokio::test]
async fn unregistered_transponder_passing_has_no_rider() {
    let passings = vec![laps("A", &[0, 60]), laps("B", &[5, 70])];
    let store = OwnerlessStore::new(two_rider_snapshot(None, passings));

    let board = get_leaderboard(&store, RACE).await.unwrap();

    assert_eq!(board.leaderboard.len(), 2);
    assert_eq!(board.leaderboard[0].rider_id, Some(1));
    assert_eq!(board.leaderboard[1].transponder, "B");
    assert_eq!(board.leaderboard[1].rider_id, None);
    assert_eq!(board.leaderboard[1].seconds_diff, Some(10));
    assert_eq!(store.inner.transponder_lookups(), 2);
}

/// a store where transponder "B" changed hands after the entries were resolved
struct OwnerlessStore {
    inner: MemoryStore,
}

impl OwnerlessStore {
    fn new(snapshot: Snapshot) -> OwnerlessStore {
        OwnerlessStore {
            inner: MemoryStore::from_snapshot(snapshot),
        }
    }
}

#[async_trait]
impl RaceStore for OwnerlessStore {
    async fn get_race(&self, race_id: i32) -> CustomResult<Race> {
        self.inner.get_race(race_id).await
    }

    async fn get_entries(&self, race_id: i32) -> CustomResult<Vec<Entry>> {
        self.inner.get_entries(race_id).await
    }

    async fn get_riders(&self, ids: &[i32]) -> CustomResult<Vec<Rider>> {
        self.inner.get_riders(ids).await
    }

    async fn get_rider_by_transponder(&self, code: &str) -> CustomResult<Option<Rider>> {
        let owner = self.inner.get_rider_by_transponder(code).await?;
        Ok(owner.filter(|_| code != "B"))
    }

    async fn query_passings(
        &self,
        event_id: i32,
        since: NaiveDateTime,
        transponders: &BTreeSet<String>,
    ) -> CustomResult<Vec<Passing>> {
        self.inner.query_passings(event_id, since, transponders).await
    }
}

/// which collaborator call of [`FailingStore`] breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Breaks {
    Entries,
    OwnerLookup,
}

/// a store with one broken collaborator call
struct FailingStore {
    inner: MemoryStore,
    breaks: Breaks,
}

impl FailingStore {
    fn new(snapshot: Snapshot, breaks: Breaks) -> FailingStore {
        FailingStore {
            inner: MemoryStore::from_snapshot(snapshot),
            breaks,
        }
    }

    fn failure() -> Error {
        Error::MissingConfig {
            key: "DATABASE_URL".to_string(),
        }
    }
}

#[async_trait]
impl RaceStore for FailingStore {
    async fn get_race(&self, race_id: i32) -> CustomResult<Race> {
        self.inner.get_race(race_id).await
    }

    async fn get_entries(&self, race_id: i32) -> CustomResult<Vec<Entry>> {
        if self.breaks == Breaks::Entries {
            return Err(FailingStore::failure());
        }
        self.inner.get_entries(race_id).await
    }

    async fn get_riders(&self, ids: &[i32]) -> CustomResult<Vec<Rider>> {
        self.inner.get_riders(ids).await
    }

    async fn get_rider_by_transponder(&self, code: &str) -> CustomResult<Option<Rider>> {
        if self.breaks == Breaks::OwnerLookup {
            return Err(FailingStore::failure());
        }
        self.inner.get_rider_by_transponder(code).await
    }

    async fn query_passings(
        &self,
        event_id: i32,
        since: NaiveDateTime,
        transponders: &BTreeSet<String>,
    ) -> CustomResult<Vec<Passing>> {
        self.inner.query_passings(event_id, since, transponders).await
    }
}

#[tokio::test]
async fn failed_entry_lookup_fails_the_leaderboard() {
    let store = FailingStore::new(
        two_rider_snapshot(None, vec![laps("A", &[0, 60]), laps("B", &[5, 70])]),
        Breaks::Entries,
    );

    let result = get_leaderboard(&store, RACE).await;

    match result {
        Err(Error::MissingConfig { key }) => assert_eq!(key, "DATABASE_URL"),
        other => panic!("expected the entry lookup error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_owner_lookup_fails_the_leaderboard() {
    let mut snapshot = two_rider_snapshot(None, vec![laps("A", &[0, 60]), laps("B", &[5, 70])]);
    // only A needs its owner looked up
    for passing in snapshot.passings.iter_mut().filter(|p| p.transponder == "B") {
        passing.rider_id = Some(2);
    }
    let store = FailingStore::new(snapshot, Breaks::OwnerLookup);

    let result = get_leaderboard(&store, RACE).await;

    match result {
        Err(Error::MissingConfig { key }) => assert_eq!(key, "DATABASE_URL"),
        other => panic!("expected the owner lookup error, got {other:?}"),
    }
}

#[tokio::test]
async fn owner_lookup_is_skipped_when_every_passing_has_a_rider() {
    let mut snapshot = two_rider_snapshot(None, vec![laps("A", &[0, 60]), laps("B", &[5, 70])]);
    for passing in snapshot.passings.iter_mut() {
        passing.rider_id = Some(if passing.transponder == "A" { 1 } else { 2 });
    }
    let store = FailingStore::new(snapshot, Breaks::OwnerLookup);

    let board = get_leaderboard(&store, RACE).await.unwrap();

    assert_eq!(board.leaderboard.len(), 2);
}

#[tokio::test]
async fn repeated_calls_are_identical() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(
        Some(4),
        vec![laps("A", &[0, 60, 121]), laps("B", &[5, 70, 119])],
    ));

    let first = get_leaderboard(&store, RACE).await.unwrap();
    let second = get_leaderboard(&store, RACE).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn new_passings_refine_the_board() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(
        Some(3),
        vec![laps("A", &[0, 60]), laps("B", &[5, 70])],
    ));
    let before = get_leaderboard(&store, RACE).await.unwrap();
    assert!(!before.is_finished);

    for (id, (transponder, seconds)) in [("B", 118), ("A", 121)].into_iter().enumerate() {
        store
            .push_passing(Passing {
                id: 50 + id as i32,
                event_id: EVENT,
                transponder: transponder.to_string(),
                date: at(seconds),
                rider_id: None,
            })
            .await;
    }
    let after = get_leaderboard(&store, RACE).await.unwrap();

    assert!(after.is_finished);
    assert_eq!(after.leader_finish_time, Some(at(118)));
    let ranked: Vec<(&str, u32, Option<i64>)> = after
        .leaderboard
        .iter()
        .map(|e| (e.transponder.as_str(), e.lap_count, e.seconds_diff))
        .collect();
    assert_eq!(ranked, vec![("B", 3, None), ("A", 3, Some(3))]);
}

#[tokio::test]
async fn slow_store_times_out() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(None, vec![laps("A", &[0, 60])]))
        .with_latency(Duration::from_millis(200));

    let result = get_leaderboard_with_timeout(&store, RACE, Duration::from_millis(20)).await;

    match result {
        Err(Error::Timeout { race_id, limit }) => {
            assert_eq!(race_id, RACE);
            assert_eq!(limit, Duration::from_millis(20));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn fast_store_finishes_within_timeout() {
    let store = MemoryStore::from_snapshot(two_rider_snapshot(None, vec![laps("A", &[0, 60])]));

    let board = get_leaderboard_with_timeout(&store, RACE, Duration::from_secs(5)).await.unwrap();

    assert_eq!(board.leaderboard.len(), 1);
}
