use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::error;
use serde::{Deserialize, Serialize};

use crate::models::NewRace;
use crate::schema::races;

#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = races)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: i32,
    pub name: String,
    pub event_id: i32,
    #[serde(default)]
    pub series_id: Option<i32>,
    #[serde(default)]
    pub scheduled_start_time: Option<String>,
    #[serde(default)]
    pub actual_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub actual_end: Option<NaiveDateTime>,
    #[serde(default)]
    pub lap_count: Option<i32>,
}

impl Race {
    /// # create race
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `new_race` - the race to insert
    ///
    /// ## Returns
    /// * `Race` - the created race
    pub fn new(conn: &mut PgConnection, new_race: &NewRace) -> QueryResult<Race> {
        use crate::schema::races::dsl::*;

        match diesel::insert_into(races).values(new_race).get_result::<Race>(conn) {
            Ok(race) => Ok(race),
            Err(error) => {
                error!(target:"models/race:new", "Error creating race: {}", error);
                Err(error)
            }
        }
    }

    /// # get race by id
    /// get the race with the given database id
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `race_id` - the database id of the race
    ///
    /// ## Returns
    /// * `Race` - the race, or `NotFound`
    pub fn get_by_id(conn: &mut PgConnection, race_id: i32) -> QueryResult<Race> {
        use crate::schema::races::dsl::*;

        races
            .filter(id.eq(race_id))
            .select(Race::as_select())
            .first::<Race>(conn)
    }

    /// # get the races held at a set of events
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `event_ids` - the events
    ///
    /// ## Returns
    /// * `Vec<Race>` - the races of those events
    pub fn get_by_events(conn: &mut PgConnection, event_ids: &[i32]) -> QueryResult<Vec<Race>> {
        use crate::schema::races::dsl::*;

        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        races
            .filter(event_id.eq_any(event_ids))
            .select(Race::as_select())
            .load::<Race>(conn)
    }

    pub fn to_new(&self) -> NewRace {
        NewRace {
            name: self.name.clone(),
            event_id: self.event_id,
            series_id: self.series_id,
            scheduled_start_time: self.scheduled_start_time.clone(),
            actual_start: self.actual_start,
            actual_end: self.actual_end,
            lap_count: self.lap_count,
        }
    }

    /// the configured number of laps, if the race has one.
    /// zero or negative lap counts mean the race is not bounded by laps.
    pub fn target_laps(&self) -> Option<u32> {
        self.lap_count
            .filter(|laps| *laps > 0)
            .map(|laps| laps as u32)
    }

    /// passings before this instant do not belong to the race.
    pub fn passings_since(&self) -> NaiveDateTime {
        self.actual_start
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH.naive_utc())
    }
}
