//! SQLite-backed safety store and hazard report sink.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use geo::Coord;
use rusqlite::{Connection, OptionalExtension, Row, params, types::FromSql};
use safestep_core::{
    DEFAULT_REPORT_INCREMENT, HazardReportSink, ReportOutcome, SafetyStore, ScoredLocation,
    ScoredLocationError,
};
use thiserror::Error;

use super::record::{InfrastructureStatus, RoadStructure, UnknownStatusCode};
use super::schema::{SchemaError, initialise_schema};

/// Error raised when reading or writing the safety store.
#[derive(Debug, Error)]
pub enum SqliteSafetyStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The schema could not be created or has an unexpected version.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A query failed.
    #[error("safety store step '{step}' failed: {source}")]
    Query {
        /// Name of the failing step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored row holds an invalid coordinate or weight.
    #[error("road structure {id} is invalid: {source}")]
    InvalidRecord {
        /// Row identifier.
        id: i64,
        /// Validation failure.
        #[source]
        source: ScoredLocationError,
    },
    /// A stored row holds an unknown infrastructure status code.
    #[error("road structure {id} has an invalid {column} value: {source}")]
    InvalidStatus {
        /// Row identifier.
        id: i64,
        /// Column holding the bad code.
        column: &'static str,
        /// Decoding failure.
        #[source]
        source: UnknownStatusCode,
    },
    /// A caller supplied a location or weight that cannot be stored.
    #[error("cannot store location: {0}")]
    InvalidInput(#[source] ScoredLocationError),
}

/// Safety store over the `road_structures` table.
///
/// Coordinates are matched exactly; there is no tolerance when a report
/// increments an existing record.
pub struct SqliteSafetyStore {
    connection: Connection,
    path: Option<PathBuf>,
}

impl fmt::Debug for SqliteSafetyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteSafetyStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

const SELECT_ROAD_STRUCTURES: &str = "SELECT id, longitude, latitude, braille_block, audio_signal, bollard, weight
     FROM road_structures ORDER BY id";

impl SqliteSafetyStore {
    /// Open or create a store at `path` and initialise its schema.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteSafetyStoreError::OpenDatabase`] when the file cannot
    /// be opened and [`SqliteSafetyStoreError::Schema`] when bootstrapping
    /// fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteSafetyStoreError> {
        let database_path = path.as_ref().to_path_buf();
        let connection = Connection::open(&database_path).map_err(|source| {
            SqliteSafetyStoreError::OpenDatabase {
                path: database_path.clone(),
                source,
            }
        })?;
        Self::from_connection(connection, Some(database_path))
    }

    /// Create a private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error when SQLite cannot allocate the database or the
    /// schema cannot be created.
    pub fn open_in_memory() -> Result<Self, SqliteSafetyStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteSafetyStoreError::OpenDatabase {
                path: PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection, None)
    }

    fn from_connection(
        mut connection: Connection,
        path: Option<PathBuf>,
    ) -> Result<Self, SqliteSafetyStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self { connection, path })
    }

    /// Database path, or `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert `record`, replacing any record at the same coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteSafetyStoreError::InvalidInput`] for a non-finite
    /// coordinate or a negative weight, and a query error otherwise.
    pub fn insert_road_structure(
        &self,
        record: &RoadStructure,
    ) -> Result<(), SqliteSafetyStoreError> {
        ScoredLocation::new(record.location, record.weight)
            .map_err(SqliteSafetyStoreError::InvalidInput)?;
        self.connection
            .execute(
                "INSERT INTO road_structures
                    (longitude, latitude, braille_block, audio_signal, bollard, weight)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(longitude, latitude) DO UPDATE SET
                    braille_block = excluded.braille_block,
                    audio_signal = excluded.audio_signal,
                    bollard = excluded.bollard,
                    weight = excluded.weight",
                params![
                    record.location.x,
                    record.location.y,
                    record.braille_block.map(InfrastructureStatus::code),
                    record.audio_signal.map(InfrastructureStatus::code),
                    record.bollard.map(InfrastructureStatus::code),
                    record.weight,
                ],
            )
            .map(|_| ())
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "insert road structure",
                source,
            })
    }

    /// Delete the record at exactly `location`.
    ///
    /// Returns whether a record was removed; deleting a missing record is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns a query error when the delete fails.
    pub fn remove_at(&self, location: Coord<f64>) -> Result<bool, SqliteSafetyStoreError> {
        let removed = self
            .connection
            .execute(
                "DELETE FROM road_structures WHERE longitude = ?1 AND latitude = ?2",
                params![location.x, location.y],
            )
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "remove road structure",
                source,
            })?;
        Ok(removed > 0)
    }

    /// Return every stored record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails or a row cannot be decoded.
    pub fn road_structures(&self) -> Result<Vec<RoadStructure>, SqliteSafetyStoreError> {
        let mut statement = self
            .connection
            .prepare(SELECT_ROAD_STRUCTURES)
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "prepare road structure query",
                source,
            })?;
        let mut rows = statement
            .query([])
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "query road structures",
                source,
            })?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(|source| SqliteSafetyStoreError::Query {
            step: "read road structure row",
            source,
        })? {
            records.push(decode_row(row)?);
        }
        Ok(records)
    }

    fn weight_at(&self, location: Coord<f64>) -> Result<Option<f64>, SqliteSafetyStoreError> {
        self.connection
            .query_row(
                "SELECT weight FROM road_structures WHERE longitude = ?1 AND latitude = ?2",
                params![location.x, location.y],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "read weight",
                source,
            })
    }
}

fn decode_row(row: &Row<'_>) -> Result<RoadStructure, SqliteSafetyStoreError> {
    let id: i64 = read_column(row, 0)?;
    let longitude: f64 = read_column(row, 1)?;
    let latitude: f64 = read_column(row, 2)?;
    let weight: f64 = read_column(row, 6)?;

    Ok(RoadStructure {
        location: Coord {
            x: longitude,
            y: latitude,
        },
        braille_block: read_status(row, id, 3, "braille_block")?,
        audio_signal: read_status(row, id, 4, "audio_signal")?,
        bollard: read_status(row, id, 5, "bollard")?,
        weight,
    })
}

fn read_column<T: FromSql>(row: &Row<'_>, index: usize) -> Result<T, SqliteSafetyStoreError> {
    row.get(index)
        .map_err(|source| SqliteSafetyStoreError::Query {
            step: "decode road structure row",
            source,
        })
}

fn read_status(
    row: &Row<'_>,
    id: i64,
    index: usize,
    column: &'static str,
) -> Result<Option<InfrastructureStatus>, SqliteSafetyStoreError> {
    let code: Option<i64> = read_column(row, index)?;
    code.map(InfrastructureStatus::try_from)
        .transpose()
        .map_err(|source| SqliteSafetyStoreError::InvalidStatus { id, column, source })
}

impl SafetyStore for SqliteSafetyStore {
    type Error = SqliteSafetyStoreError;

    fn load_scored_locations(&self) -> Result<Vec<ScoredLocation>, Self::Error> {
        let mut statement = self
            .connection
            .prepare("SELECT id, longitude, latitude, weight FROM road_structures ORDER BY id")
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "prepare scored location query",
                source,
            })?;
        let rows = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    Coord {
                        x: row.get(1)?,
                        y: row.get(2)?,
                    },
                    row.get::<_, f64>(3)?,
                ))
            })
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "query scored locations",
                source,
            })?;

        let mut locations = Vec::new();
        for row in rows {
            let (id, location, weight) = row.map_err(|source| SqliteSafetyStoreError::Query {
                step: "read scored location row",
                source,
            })?;
            let scored = ScoredLocation::new(location, weight)
                .map_err(|source| SqliteSafetyStoreError::InvalidRecord { id, source })?;
            locations.push(scored);
        }
        log::debug!("loaded {} scored locations", locations.len());
        Ok(locations)
    }
}

impl HazardReportSink for SqliteSafetyStore {
    type Error = SqliteSafetyStoreError;

    fn report_hazard(&self, location: Coord<f64>) -> Result<ReportOutcome, Self::Error> {
        ScoredLocation::new(location, DEFAULT_REPORT_INCREMENT)
            .map_err(SqliteSafetyStoreError::InvalidInput)?;

        let transaction =
            self.connection
                .unchecked_transaction()
                .map_err(|source| SqliteSafetyStoreError::Query {
                    step: "begin report transaction",
                    source,
                })?;

        let updated = transaction
            .execute(
                "UPDATE road_structures SET weight = weight + ?3
                 WHERE longitude = ?1 AND latitude = ?2",
                params![location.x, location.y, DEFAULT_REPORT_INCREMENT],
            )
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "increment weight",
                source,
            })?;

        let inserted = updated == 0;
        if inserted {
            transaction
                .execute(
                    "INSERT INTO road_structures (longitude, latitude, weight) VALUES (?1, ?2, ?3)",
                    params![location.x, location.y, DEFAULT_REPORT_INCREMENT],
                )
                .map_err(|source| SqliteSafetyStoreError::Query {
                    step: "insert reported location",
                    source,
                })?;
        }

        let weight = self
            .weight_at(location)?
            .unwrap_or(DEFAULT_REPORT_INCREMENT);
        transaction
            .commit()
            .map_err(|source| SqliteSafetyStoreError::Query {
                step: "commit report transaction",
                source,
            })?;

        log::info!(
            "hazard report at ({}, {}): weight now {weight}",
            location.x,
            location.y
        );
        Ok(if inserted {
            ReportOutcome::Inserted { weight }
        } else {
            ReportOutcome::Incremented { weight }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    const CROSSING: Coord<f64> = Coord {
        x: 126.9780,
        y: 37.5665,
    };

    #[fixture]
    fn store() -> SqliteSafetyStore {
        SqliteSafetyStore::open_in_memory().expect("open in-memory store")
    }

    fn surveyed(location: Coord<f64>, weight: f64) -> RoadStructure {
        RoadStructure {
            location,
            braille_block: Some(InfrastructureStatus::Installed),
            audio_signal: Some(InfrastructureStatus::Deficient),
            bollard: Some(InfrastructureStatus::Missing),
            weight,
        }
    }

    #[rstest]
    fn report_inserts_then_increments(store: SqliteSafetyStore) {
        let first = store.report_hazard(CROSSING).expect("first report");
        assert_eq!(first, ReportOutcome::Inserted { weight: 0.5 });

        let second = store.report_hazard(CROSSING).expect("second report");
        assert_eq!(second, ReportOutcome::Incremented { weight: 1.0 });

        let locations = store.load_scored_locations().expect("load locations");
        assert_eq!(locations.len(), 1);
    }

    #[rstest]
    fn report_increments_surveyed_record(store: SqliteSafetyStore) {
        store
            .insert_road_structure(&surveyed(CROSSING, 3.0))
            .expect("insert record");

        let outcome = store.report_hazard(CROSSING).expect("report");
        assert_eq!(outcome, ReportOutcome::Incremented { weight: 3.5 });

        let records = store.road_structures().expect("read records");
        assert_eq!(records, vec![surveyed(CROSSING, 3.5)]);
    }

    #[rstest]
    fn report_matches_coordinates_exactly(store: SqliteSafetyStore) {
        store
            .insert_road_structure(&surveyed(CROSSING, 3.0))
            .expect("insert record");
        let nearby = Coord {
            x: 126.9781,
            y: 37.5665,
        };

        let outcome = store.report_hazard(nearby).expect("report");
        assert_eq!(outcome, ReportOutcome::Inserted { weight: 0.5 });
        assert_eq!(store.load_scored_locations().expect("load").len(), 2);
    }

    #[rstest]
    fn report_rejects_non_finite_location(store: SqliteSafetyStore) {
        let err = store
            .report_hazard(Coord {
                x: f64::NAN,
                y: 0.0,
            })
            .expect_err("NaN must be rejected");
        assert!(matches!(err, SqliteSafetyStoreError::InvalidInput(_)));
    }

    #[rstest]
    fn insert_replaces_record_at_same_coordinate(store: SqliteSafetyStore) {
        store
            .insert_road_structure(&surveyed(CROSSING, 1.0))
            .expect("first insert");
        store
            .insert_road_structure(&RoadStructure::unsurveyed(CROSSING, 2.0))
            .expect("second insert");

        let records = store.road_structures().expect("read records");
        assert_eq!(records, vec![RoadStructure::unsurveyed(CROSSING, 2.0)]);
    }

    #[rstest]
    fn insert_rejects_negative_weight(store: SqliteSafetyStore) {
        let err = store
            .insert_road_structure(&RoadStructure::unsurveyed(CROSSING, -1.0))
            .expect_err("negative weight must be rejected");
        assert!(matches!(err, SqliteSafetyStoreError::InvalidInput(_)));
    }

    #[rstest]
    fn remove_at_is_idempotent(store: SqliteSafetyStore) {
        store
            .insert_road_structure(&surveyed(CROSSING, 1.0))
            .expect("insert record");

        assert!(store.remove_at(CROSSING).expect("first removal"));
        assert!(!store.remove_at(CROSSING).expect("second removal"));
        assert!(store.load_scored_locations().expect("load").is_empty());
    }

    #[rstest]
    fn load_preserves_insertion_order(store: SqliteSafetyStore) {
        let points = [
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 2.0, y: -1.0 },
        ];
        for (weight, point) in (1_u8..).zip(points) {
            store
                .insert_road_structure(&RoadStructure::unsurveyed(point, f64::from(weight)))
                .expect("insert record");
        }

        let loaded: Vec<_> = store
            .load_scored_locations()
            .expect("load")
            .into_iter()
            .map(|scored| scored.location)
            .collect();
        assert_eq!(loaded, points);
    }

    #[rstest]
    fn reports_persist_across_reopen() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("safety.sqlite");

        {
            let store = SqliteSafetyStore::open(&path).expect("open store");
            store.report_hazard(CROSSING).expect("report");
            assert_eq!(store.path(), Some(path.as_path()));
        }

        let reopened = SqliteSafetyStore::open(&path).expect("reopen store");
        let outcome = reopened.report_hazard(CROSSING).expect("second report");
        assert_eq!(outcome, ReportOutcome::Incremented { weight: 1.0 });
    }

    #[rstest]
    fn open_fails_without_parent_directory() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("missing").join("safety.sqlite");

        let result = SqliteSafetyStore::open(&path);
        assert!(result.is_err(), "missing parent directory must fail");
    }
}
