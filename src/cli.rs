//! Command Line Interface (CLI) arguments.

use chrono::NaiveDate;
use clap::Parser;

/// Meteopanel command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "METEOPANEL_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 5000, env = "PORT")]
    pub port: u16,
    /// Host name or IP address of the weather readings database
    #[arg(long, default_value = "127.0.0.1", env = "DB_HOST")]
    pub db_host: String,
    /// Port of the weather readings database
    #[arg(long, default_value_t = 3306, env = "DB_PORT")]
    pub db_port: u16,
    /// Database user
    #[arg(long, default_value = "root", env = "DB_USER")]
    pub db_user: String,
    /// Database password
    #[arg(long, default_value = "", env = "DB_PASSWORD")]
    pub db_password: String,
    /// Database name
    #[arg(long, default_value = "railway", env = "DB_NAME")]
    pub db_name: String,
    /// Maximum number of database connections in the pool
    #[arg(long, default_value_t = 5, env = "METEOPANEL_DB_CONNECTION_LIMIT")]
    pub db_connection_limit: u32,
    /// Inclusive lower bound on reading timestamps included in statistics
    #[arg(long, default_value = "2024-08-01", env = "METEOPANEL_START_DATE")]
    pub start_date: NaiveDate,
    /// Maximum number of charts rasterized concurrently
    #[arg(long, env = "METEOPANEL_RENDER_TASK_LIMIT")]
    pub render_task_limit: Option<usize>,
    /// Maximum time in seconds to wait for operations to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "METEOPANEL_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
