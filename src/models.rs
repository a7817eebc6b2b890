use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::*;


#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = races)]
pub struct NewRace {
    pub name: String,
    pub event_id: i32,
    pub series_id: Option<i32>,
    pub scheduled_start_time: Option<String>,
    pub actual_start: Option<NaiveDateTime>,
    pub actual_end: Option<NaiveDateTime>,
    pub lap_count: Option<i32>,
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = entries)]
pub struct NewEntry {
    pub race_id: i32,
    pub rider_id: i32,
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = riders)]
pub struct NewRider {
    pub firstname: String,
    pub lastname: String,
    pub transponder: Option<String>,
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = passings)]
pub struct NewPassing {
    pub event_id: i32,
    pub transponder: String,
    pub date: NaiveDateTime,
    pub rider_id: Option<i32>,
}
