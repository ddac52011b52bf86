//! PostgreSQL database operations for garden records.
//!
//! This module provides functions for interacting with the PostgreSQL database,
//! organized by resource. Every function runs inside a caller-provided transaction and
//! rows are re-validated through the entity constructors on the way out.

use crate::{DataStoreError, ValidationError};

/// Irrigation zone operations.
pub mod irrigation_zone;

/// Garden location operations.
pub mod garden_location;

/// Plant operations.
pub mod plant;

/// Observation operations.
pub mod observation;

/// Measurement operations.
pub mod measurement;

/// Result type for database operations.
pub type SqlResult<T> = Result<T, DataStoreError>;

/// Converts an sqlx error, logging it when it is not an expected constraint failure.
pub(crate) fn db_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> DataStoreError {
    move |e| {
        let err = DataStoreError::from(e);
        log_store_error(action, &err);
        err
    }
}

/// Like [`db_error`] for DELETE statements, where a foreign-key violation means "in use".
pub(crate) fn delete_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> DataStoreError {
    move |e| {
        let err = DataStoreError::from_delete(e);
        log_store_error(action, &err);
        err
    }
}

fn log_store_error(action: &str, err: &DataStoreError) {
    match err {
        DataStoreError::Internal(_) => tracing::error!(error = %err, "database error {action}"),
        _ => tracing::debug!(error = %err, "{action} refused"),
    }
}

/// Reports a stored row that no longer validates.
pub(crate) fn corrupt(table: &'static str, id: i64, err: ValidationError) -> DataStoreError {
    tracing::error!(table, id, error = %err, "stored row failed validation");
    DataStoreError::Corrupt(format!("{table} row {id}: {err}"))
}

#[cfg(test)]
/// Test utilities for PostgreSQL database operations.
pub mod tests {
    use sqlx::PgPool;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Creates a unique, migrated test database for each test invocation.
    ///
    /// Connects through `TEST_DATABASE_URL`, defaulting to the local `postgres` database.
    /// Panics when PostgreSQL is unreachable.
    pub async fn setup_test_db() -> PgPool {
        let base_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/postgres".to_string());

        let pid = std::process::id();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("garden_test_{}_{}_{}", pid, timestamp, counter);

        let mut parsed_url = url::Url::parse(&base_url).expect("Invalid database URL");

        let admin_pool = PgPool::connect(&base_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::query(&format!("CREATE DATABASE {}", db_name))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test database");

        admin_pool.close().await;

        parsed_url.set_path(&format!("/{}", db_name));
        let test_db_url = parsed_url.as_str();

        let pool = PgPool::connect(test_db_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }
}
