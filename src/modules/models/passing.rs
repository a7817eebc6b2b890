use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDateTime;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::error;
use serde::{Deserialize, Serialize};

use crate::models::NewPassing;
use crate::schema::passings;

/// one timestamped read of a transponder at the timing line
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = passings)]
#[serde(rename_all = "camelCase")]
pub struct Passing {
    pub id: i32,
    pub event_id: i32,
    pub transponder: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub rider_id: Option<i32>,
}

impl Passing {
    /// # record a passing
    pub fn new(conn: &mut PgConnection, new_passing: &NewPassing) -> QueryResult<Passing> {
        use crate::schema::passings::dsl::*;

        match diesel::insert_into(passings).values(new_passing).get_result::<Passing>(conn) {
            Ok(passing) => Ok(passing),
            Err(error) => {
                error!(target:"models/passing:new", "Error inserting passing: {}", error);
                Err(error)
            }
        }
    }

    /// # query the passings of a race
    /// select the passings of an event that happened at or after `since`
    /// and were made by one of the given transponders.
    ///
    /// an empty transponder set matches nothing.
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `event_id_in` - the event the passings were recorded at
    /// * `since` - passings before this instant are ignored
    /// * `transponders` - the transponders that count
    ///
    /// ## Returns
    /// * `Vec<Passing>` - the matching passings in no particular order
    pub fn query(
        conn: &mut PgConnection,
        event_id_in: i32,
        since: NaiveDateTime,
        transponders: &BTreeSet<String>,
    ) -> QueryResult<Vec<Passing>> {
        use crate::schema::passings::dsl::*;

        if transponders.is_empty() {
            return Ok(Vec::new());
        }

        passings
            .filter(event_id.eq(event_id_in))
            .filter(date.ge(since))
            .filter(transponder.eq_any(transponders.iter().cloned().collect::<Vec<String>>()))
            .select(Passing::as_select())
            .load::<Passing>(conn)
    }

    /// the insertable form of this passing. the stored rider is translated through
    /// `riders`, and dropped when it is not in the map
    pub fn to_new(&self, riders: &HashMap<i32, i32>) -> NewPassing {
        NewPassing {
            event_id: self.event_id,
            transponder: self.transponder.clone(),
            date: self.date,
            rider_id: self.rider_id.and_then(|rider| riders.get(&rider).copied()),
        }
    }

    /// whether this passing belongs to the given race window.
    /// the in-memory counterpart of `Passing::query`
    pub fn matches(
        &self,
        event_id_in: i32,
        since: NaiveDateTime,
        transponders: &BTreeSet<String>,
    ) -> bool {
        self.event_id == event_id_in
            && self.date >= since
            && transponders.contains(&self.transponder)
    }
}
