use std::collections::BTreeSet;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use log::error;
use serde::{Deserialize, Serialize};

use crate::models::NewRider;
use crate::schema::riders;

/// whitespace stripped from both ends of a transponder code
const TRANSPONDER_PADDING: &str = " \t\r\n";

diesel::sql_function! {
    /// postgres `btrim(string, characters)`
    fn btrim(x: Nullable<Text>, characters: Text) -> Nullable<Text>;
}

/// the comparable form of a transponder code. blank codes are no code at all
pub fn normalize_transponder(code: &str) -> Option<&str> {
    let code = code.trim_matches(|c| TRANSPONDER_PADDING.contains(c));
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = riders)]
#[serde(rename_all = "camelCase")]
pub struct Rider {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub transponder: Option<String>,
}

impl Rider {
    /// # create rider
    pub fn new(conn: &mut PgConnection, new_rider: &NewRider) -> QueryResult<Rider> {
        use crate::schema::riders::dsl::*;

        match diesel::insert_into(riders).values(new_rider).get_result::<Rider>(conn) {
            Ok(rider) => Ok(rider),
            Err(error) => {
                error!(target:"models/rider:new", "Error creating rider: {}", error);
                Err(error)
            }
        }
    }

    /// # get riders by id
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `ids` - the database ids of the riders
    ///
    /// ## Returns
    /// * `Vec<Rider>` - the riders that exist, in no particular order
    pub fn get_from_ids(conn: &mut PgConnection, ids: &[i32]) -> QueryResult<Vec<Rider>> {
        use crate::schema::riders::dsl::*;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        riders
            .filter(id.eq_any(ids))
            .select(Rider::as_select())
            .load::<Rider>(conn)
    }

    pub fn get_by_id(conn: &mut PgConnection, rider_id: i32) -> QueryResult<Option<Rider>> {
        use crate::schema::riders::dsl::*;

        riders
            .filter(id.eq(rider_id))
            .select(Rider::as_select())
            .first::<Rider>(conn)
            .optional()
    }

    /// # get the rider currently owning a transponder
    /// a transponder with no owner is not an error, it returns `None`.
    /// codes are compared without surrounding whitespace on either side
    pub fn get_by_transponder(conn: &mut PgConnection, code: &str) -> QueryResult<Option<Rider>> {
        use crate::schema::riders::dsl::*;

        let code = match normalize_transponder(code) {
            Some(code) => code,
            None => return Ok(None),
        };

        riders
            .filter(btrim(transponder, TRANSPONDER_PADDING).eq(code))
            .select(Rider::as_select())
            .first::<Rider>(conn)
            .optional()
    }

    pub fn to_new(&self) -> NewRider {
        NewRider {
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            transponder: self.transponder.clone(),
        }
    }

    /// the transponder code, if the rider has been equipped with one
    pub fn transponder_code(&self) -> Option<&str> {
        self.transponder.as_deref().and_then(normalize_transponder)
    }

    /// collect the distinct transponder codes of a group of riders.
    /// riders without a transponder are skipped
    pub fn transponders_of(riders: &[Rider]) -> BTreeSet<String> {
        riders
            .iter()
            .filter_map(|rider| rider.transponder_code())
            .map(str::to_string)
            .collect()
    }
}
