//! copy a recorded [`Snapshot`] into postgres.
//!
//! snapshot ids are file-local, the database hands out its own. entries and
//! passings are translated to the new race and rider ids as they are inserted.

use std::collections::{BTreeSet, HashMap};

use diesel::pg::PgConnection;
use diesel::result::Error as DieselError;
use diesel::Connection;
use log::{info, warn};
use snafu::ResultExt;

use crate::errors::{CustomResult, DatabaseSnafu};
use crate::modules::models::entry::Entry;
use crate::modules::models::passing::Passing;
use crate::modules::models::race::Race;
use crate::modules::models::rider::Rider;
use crate::modules::store::Snapshot;

/// what a snapshot load wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// snapshot race id -> database race id
    pub races: HashMap<i32, i32>,
    /// snapshot rider id -> database rider id
    pub riders: HashMap<i32, i32>,
    pub entries: usize,
    pub skipped_entries: usize,
    pub passings: usize,
}

impl SeedReport {
    /// the events that received races or passings.
    /// published leaderboards of every race at these events are stale
    pub fn touched_events(snapshot: &Snapshot) -> BTreeSet<i32> {
        snapshot
            .races
            .iter()
            .map(|race| race.event_id)
            .chain(snapshot.passings.iter().map(|passing| passing.event_id))
            .collect()
    }
}

/// # save a snapshot
/// insert every race, rider, entry and passing of the snapshot in one transaction.
///
/// ## Arguments
/// * `conn` - the database connection
/// * `snapshot` - the records to insert
///
/// ## Returns
/// * `SeedReport` - the id translation and the number of inserted records
pub fn save_snapshot(conn: &mut PgConnection, snapshot: &Snapshot) -> CustomResult<SeedReport> {
    conn.transaction::<SeedReport, DieselError, _>(|conn| {
        let mut report = SeedReport::default();

        for race in &snapshot.races {
            let saved = Race::new(conn, &race.to_new())?;
            report.races.insert(race.id, saved.id);
        }

        for rider in &snapshot.riders {
            let saved = Rider::new(conn, &rider.to_new())?;
            report.riders.insert(rider.id, saved.id);
        }

        for entry in &snapshot.entries {
            match entry.to_new(&report.races, &report.riders) {
                Some(new_entry) => {
                    Entry::new(conn, &new_entry)?;
                    report.entries += 1;
                }
                None => {
                    warn!(
                        target: "seed:save_snapshot",
                        "skipping entry {}: race {} or rider {} is not in the snapshot",
                        entry.id,
                        entry.race_id,
                        entry.rider_id,
                    );
                    report.skipped_entries += 1;
                }
            }
        }

        for passing in &snapshot.passings {
            Passing::new(conn, &passing.to_new(&report.riders))?;
            report.passings += 1;
        }

        Ok(report)
    })
    .context(DatabaseSnafu)
    .map(|report| {
        info!(
            target: "seed:save_snapshot",
            "saved {} races, {} riders, {} entries and {} passings",
            report.races.len(),
            report.riders.len(),
            report.entries,
            report.passings,
        );
        report
    })
}
