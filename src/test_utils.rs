use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;

use chrono::NaiveDate;
use std::sync::Arc;

/// Create command line arguments pointing at a closed database port.
///
/// Connection pools are lazy, so states built from these arguments work for
/// any code path that does not reach the database, and fail fast for paths
/// that do.
pub(crate) fn get_test_args() -> CommandLineArgs {
    CommandLineArgs {
        host: "127.0.0.1".to_string(),
        port: 0,
        db_host: "127.0.0.1".to_string(),
        // Reserved port, nothing listens here.
        db_port: 1,
        db_user: "meteopanel".to_string(),
        db_password: "".to_string(),
        db_name: "meteopanel_test".to_string(),
        db_connection_limit: 1,
        start_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
        render_task_limit: Some(1),
        graceful_shutdown_timeout: 1,
    }
}

/// Create a shared application state around the test arguments.
pub(crate) fn get_test_state() -> SharedAppState {
    Arc::new(AppState::new(&get_test_args()))
}
