use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::error;
use serde::{Deserialize, Serialize};

use crate::models::NewEntry;
use crate::schema::entries;

#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = entries)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i32,
    pub race_id: i32,
    pub rider_id: i32,
}

impl Entry {
    /// # register a rider into a race
    pub fn new(conn: &mut PgConnection, new_entry: &NewEntry) -> QueryResult<Entry> {
        use crate::schema::entries::dsl::*;

        match diesel::insert_into(entries).values(new_entry).get_result::<Entry>(conn) {
            Ok(entry) => Ok(entry),
            Err(error) => {
                error!(target:"models/entry:new", "Error creating entry: {}", error);
                Err(error)
            }
        }
    }

    /// # get the entries of a race
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `race_id_in` - the database id of the race
    ///
    /// ## Returns
    /// * `Vec<Entry>` - every registration for the race, possibly empty
    pub fn from_race(conn: &mut PgConnection, race_id_in: i32) -> QueryResult<Vec<Entry>> {
        use crate::schema::entries::dsl::*;

        entries
            .filter(race_id.eq(race_id_in))
            .select(Entry::as_select())
            .load::<Entry>(conn)
    }

    /// the insertable form of this entry, with race and rider ids translated through
    /// `races` and `riders`. `None` when either is missing from the maps
    pub fn to_new(
        &self,
        races: &HashMap<i32, i32>,
        riders: &HashMap<i32, i32>,
    ) -> Option<NewEntry> {
        Some(NewEntry {
            race_id: *races.get(&self.race_id)?,
            rider_id: *riders.get(&self.rider_id)?,
        })
    }
}
