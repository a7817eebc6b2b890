pub(crate) mod database_error_handler;
