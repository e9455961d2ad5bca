//! Data access for the weather-station sample table.

use crate::cli::CommandLineArgs;
use crate::error::PanelError;
use crate::models::Field;

use chrono::NaiveDate;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;

/// Name of the table holding one row per weather reading.
const SAMPLE_TABLE: &str = "emeteorologicaps";

/// Read-only access to the weather readings database.
///
/// Holds the connection pool for the lifetime of the process; constructed
/// once at startup and dropped at shutdown.
#[derive(Debug)]
pub struct Datastore {
    pool: MySqlPool,
}

impl Datastore {
    /// Create and return a [Datastore].
    ///
    /// The pool connects lazily on first use. Idle connections are reaped
    /// immediately, so each request dials and releases its own connection.
    pub fn new(args: &CommandLineArgs) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&args.db_host)
            .port(args.db_port)
            .username(&args.db_user)
            .password(&args.db_password)
            .database(&args.db_name);
        let pool = MySqlPoolOptions::new()
            .max_connections(args.db_connection_limit)
            .min_connections(0)
            .idle_timeout(Some(Duration::ZERO))
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(options);
        Self { pool }
    }

    /// Fetch all non-null values of one field from rows at or after `since`.
    ///
    /// # Arguments
    ///
    /// * `field`: The measurement column to read
    /// * `since`: Inclusive lower bound on the reading timestamp
    pub async fn fetch_series(
        &self,
        field: Field,
        since: NaiveDate,
    ) -> Result<Vec<f64>, PanelError> {
        let values = sqlx::query_scalar(&series_sql(field))
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }

    /// Fetch row-paired values of two fields from rows at or after `since`.
    ///
    /// Rows where either column is NULL are excluded, so the two returned
    /// series have equal length and remain paired by index.
    pub async fn fetch_pairs(
        &self,
        x: Field,
        y: Field,
        since: NaiveDate,
    ) -> Result<(Vec<f64>, Vec<f64>), PanelError> {
        let rows: Vec<(f64, f64)> = sqlx::query_as(&pairs_sql(x, y))
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().unzip())
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// Column identifiers below come only from the closed Field enum; the date
// bound is the sole piece of caller data and is always a bind parameter.
// Columns are cast to DOUBLE so FLOAT, DECIMAL and integer schemas all
// decode as f64.

/// Returns the query for a single measurement column.
fn series_sql(field: Field) -> String {
    format!(
        "SELECT CAST({col} AS DOUBLE) FROM {table} \
         WHERE fecha >= ? AND {col} IS NOT NULL",
        col = field.column(),
        table = SAMPLE_TABLE,
    )
}

/// Returns the query for a pair of measurement columns.
fn pairs_sql(x: Field, y: Field) -> String {
    format!(
        "SELECT CAST({x} AS DOUBLE), CAST({y} AS DOUBLE) FROM {table} \
         WHERE fecha >= ? AND {x} IS NOT NULL AND {y} IS NOT NULL",
        x = x.column(),
        y = y.column(),
        table = SAMPLE_TABLE,
    )
}
