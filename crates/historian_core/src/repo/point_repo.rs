//! Point Store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own `data_points` rows: ingestion and per-source listing.
//! - Stamp the ingestion timestamp from the store clock inside the INSERT.
//!
//! # Invariants
//! - `timestamp` is never caller-supplied; it is computed by SQLite at
//!   insertion time in epoch milliseconds.
//! - Per-source listing order is ascending `id` (insertion order).
//! - The foreign key to `data_sources` backstops the registry existence
//!   check; an FK violation surfaces as `SourceNotFound`.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::point::{DataPoint, NewDataPoint, PointId};
use crate::model::source::SourceId;
use crate::repo::source_repo::{ensure_schema_version, ensure_table_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const POINT_SELECT_SQL: &str = "SELECT
    id,
    source_id,
    value,
    timestamp
FROM data_points";

/// Repository interface for the Point Store.
pub trait PointRepository {
    /// Persists one reading and returns its storage-assigned id.
    fn create_point(&self, point: &NewDataPoint) -> RepoResult<PointId>;
    /// Gets one point by id.
    fn find_by_id(&self, id: PointId) -> RepoResult<Option<DataPoint>>;
    /// Lists all points for one source, ordered by ascending id.
    ///
    /// An unknown source id yields an empty list, mirroring a query rather
    /// than a lookup.
    fn list_by_source(&self, source_id: SourceId) -> RepoResult<Vec<DataPoint>>;
}

/// SQLite-backed Point Store.
pub struct SqlitePointRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePointRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table_ready(conn, "data_points", &["id", "source_id", "value", "timestamp"])?;
        Ok(Self { conn })
    }
}

impl PointRepository for SqlitePointRepository<'_> {
    fn create_point(&self, point: &NewDataPoint) -> RepoResult<PointId> {
        point.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO data_points (source_id, value, timestamp)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000));",
            params![point.source_id, point.value],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_foreign_key_violation(&err) => {
                Err(RepoError::SourceNotFound(point.source_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_id(&self, id: PointId) -> RepoResult<Option<DataPoint>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POINT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_point_row(row)?));
        }

        Ok(None)
    }

    fn list_by_source(&self, source_id: SourceId) -> RepoResult<Vec<DataPoint>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POINT_SELECT_SQL} WHERE source_id = ?1 ORDER BY id ASC;"))?;

        let mut rows = stmt.query(params![source_id])?;
        let mut points = Vec::new();
        while let Some(row) = rows.next()? {
            points.push(parse_point_row(row)?);
        }

        Ok(points)
    }
}

fn parse_point_row(row: &Row<'_>) -> RepoResult<DataPoint> {
    Ok(DataPoint {
        id: row.get("id")?,
        source_id: row.get("source_id")?,
        value: row.get("value")?,
        timestamp: row.get("timestamp")?,
    })
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
