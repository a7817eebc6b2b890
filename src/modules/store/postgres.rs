use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::PgConnection;
use log::error;
use snafu::ResultExt;

use crate::errors::{CustomResult, DatabaseSnafu, Error, TaskJoinSnafu};
use crate::macros::database_error_handler::db_handle_get_error;
use crate::modules::helpers::config::Config;
use crate::modules::models::entry::Entry;
use crate::modules::models::general::establish_connection;
use crate::modules::models::passing::Passing;
use crate::modules::models::race::Race;
use crate::modules::models::rider::Rider;
use crate::modules::store::RaceStore;

/// reads the race data from postgres.
///
/// every call opens its own connection on the blocking thread pool,
/// so concurrent calls do not wait on each other.
#[derive(Clone)]
pub struct PgStore {
    config: Arc<Config>,
}

impl PgStore {
    pub fn new(config: Config) -> PgStore {
        PgStore {
            config: Arc::new(config),
        }
    }

    async fn with_connection<T, F>(&self, query: F) -> CustomResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> CustomResult<T> + Send + 'static,
    {
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            let conn = &mut establish_connection(&config)?;
            query(conn)
        })
        .await
        .context(TaskJoinSnafu)?
    }
}

fn race_by_id(conn: &mut PgConnection, race_id: i32) -> diesel::QueryResult<Race> {
    let race = db_handle_get_error!(
        Race::get_by_id(conn, race_id),
        "store/postgres:get_race",
        format!("race {}", race_id)
    );
    Ok(race)
}

#[async_trait]
impl RaceStore for PgStore {
    async fn get_race(&self, race_id: i32) -> CustomResult<Race> {
        self.with_connection(move |conn| match race_by_id(conn, race_id) {
            Ok(race) => Ok(race),
            Err(diesel::result::Error::NotFound) => Err(Error::NotFound { race_id }),
            Err(source) => Err(Error::Database { source }),
        })
        .await
    }

    async fn get_entries(&self, race_id: i32) -> CustomResult<Vec<Entry>> {
        self.with_connection(move |conn| Entry::from_race(conn, race_id).context(DatabaseSnafu))
            .await
    }

    async fn get_riders(&self, ids: &[i32]) -> CustomResult<Vec<Rider>> {
        let ids = ids.to_vec();
        self.with_connection(move |conn| Rider::get_from_ids(conn, &ids).context(DatabaseSnafu))
            .await
    }

    async fn get_rider_by_id(&self, id: i32) -> CustomResult<Option<Rider>> {
        self.with_connection(move |conn| Rider::get_by_id(conn, id).context(DatabaseSnafu))
            .await
    }

    async fn get_rider_by_transponder(&self, code: &str) -> CustomResult<Option<Rider>> {
        let code = code.to_string();
        self.with_connection(move |conn| {
            Rider::get_by_transponder(conn, &code).map_err(|source| {
                error!(
                    target: "store/postgres:get_rider_by_transponder",
                    "Error looking up transponder {}: {}",
                    code,
                    source,
                );
                Error::Database { source }
            })
        })
        .await
    }

    async fn query_passings(
        &self,
        event_id: i32,
        since: NaiveDateTime,
        transponders: &BTreeSet<String>,
    ) -> CustomResult<Vec<Passing>> {
        if transponders.is_empty() {
            return Ok(Vec::new());
        }

        let transponders = transponders.clone();
        self.with_connection(move |conn| {
            Passing::query(conn, event_id, since, &transponders).context(DatabaseSnafu)
        })
        .await
    }
}
