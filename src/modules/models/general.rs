use diesel::pg::PgConnection;
use diesel::Connection;
use log::error;

use crate::errors::{CustomResult, Error};
use crate::modules::helpers::config::Config;

/// # establish a connection
/// open a new connection to the postgres database configured in `DATABASE_URL`
///
/// ## Arguments
/// * `config` - the loaded configuration
///
/// ## Returns
/// * `PgConnection` - an open connection
pub fn establish_connection(config: &Config) -> CustomResult<PgConnection> {
    let database_url = config.database_url()?;

    PgConnection::establish(database_url).map_err(|source| {
        error!(
            target: "models/general:establish_connection",
            "Error connecting to database: {}",
            source,
        );
        Error::Connection { source }
    })
}
