//! Schema bootstrap for the safety store.

use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Version recorded in `safestep_schema_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Errors raised when initialising the safety store schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A DDL or bookkeeping statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Name of the failing step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The database was created by a different schema version.
    #[error("expected safety store schema version {expected} but found {found}")]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
}

/// Create the `road_structures` table, its coordinate index and the version
/// table inside one transaction.
///
/// Running this against an already initialised database is a no-op. A
/// database recording another version is rejected.
pub fn initialise_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    run_migration_step(
        &transaction,
        "create road_structures",
        "CREATE TABLE IF NOT EXISTS road_structures (
            id INTEGER PRIMARY KEY,
            longitude REAL NOT NULL,
            latitude REAL NOT NULL,
            braille_block INTEGER CHECK (braille_block BETWEEN 0 AND 2),
            audio_signal INTEGER CHECK (audio_signal BETWEEN 0 AND 2),
            bollard INTEGER CHECK (bollard BETWEEN 0 AND 2),
            weight REAL NOT NULL CHECK (weight >= 0)
        )",
    )?;
    run_migration_step(
        &transaction,
        "index road_structures coordinates",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_road_structures_coordinate
            ON road_structures(longitude, latitude)",
    )?;
    ensure_schema_version(&transaction)?;

    transaction.commit().map_err(|source| SchemaError::Migration {
        step: "commit schema transaction",
        source,
    })
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS safestep_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM safestep_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| SchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(SCHEMA_VERSION) => Ok(()),
        Some(found) => Err(SchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO safestep_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| SchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Migration { step, source })
}
