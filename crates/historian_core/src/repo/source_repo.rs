//! Source Registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own `data_sources` rows: registration, id/name lookup, paginated listing.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - No two sources share a name; the pre-check via `find_by_name` is
//!   backstopped by the unique name index, and an index violation surfaces
//!   as `DuplicateName`, not as a generic storage error.
//! - Listing order is insertion order: ascending `id`.
//! - Read paths reject invalid persisted state instead of masking it.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::source::{DataSource, NewDataSource, SourceId};
use crate::model::ValidationError;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SOURCE_SELECT_SQL: &str = "SELECT
    id,
    name,
    source_type,
    config
FROM data_sources";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by the Source Registry and the Point Store.
#[derive(Debug)]
pub enum RepoError {
    /// Draft failed validation before any write.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap failure, surfaced verbatim.
    Db(DbError),
    /// Registration attempted with a name already in use.
    DuplicateName(String),
    /// Ingestion referenced a source that does not exist.
    SourceNotFound(SourceId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => {
                write!(f, "data source name already in use: `{name}`")
            }
            Self::SourceNotFound(id) => write!(f, "data source not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table is missing: {table}")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column is missing: {table}.{column}")
            }
            Self::InvalidData(message) => {
                write!(f, "invalid persisted historian data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination options for source listing.
///
/// Defaults are a boundary concern: callers of the core pass concrete values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceListQuery {
    /// Maximum rows to return. No upper bound is enforced here.
    pub limit: u32,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for the Source Registry.
pub trait SourceRepository {
    /// Registers one source and returns its storage-assigned id.
    fn create_source(&self, source: &NewDataSource) -> RepoResult<SourceId>;
    /// Gets one source by id.
    fn find_by_id(&self, id: SourceId) -> RepoResult<Option<DataSource>>;
    /// Gets one source by exact, case-sensitive name.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<DataSource>>;
    /// Lists sources in insertion order (ascending id) with pagination.
    fn list_sources(&self, query: &SourceListQuery) -> RepoResult<Vec<DataSource>>;
}

/// SQLite-backed Source Registry.
pub struct SqliteSourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSourceRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table_ready(conn, "data_sources", &["id", "name", "source_type", "config"])?;
        Ok(Self { conn })
    }
}

impl SourceRepository for SqliteSourceRepository<'_> {
    fn create_source(&self, source: &NewDataSource) -> RepoResult<SourceId> {
        source.validate()?;

        if self.find_by_name(source.name.as_str())?.is_some() {
            return Err(RepoError::DuplicateName(source.name.clone()));
        }

        let config_text = serde_json::to_string(&source.config).map_err(|err| {
            RepoError::InvalidData(format!("config payload cannot be serialized: {err}"))
        })?;

        let inserted = self.conn.execute(
            "INSERT INTO data_sources (name, source_type, config)
             VALUES (?1, ?2, ?3);",
            params![
                source.name.as_str(),
                source.source_type.as_str(),
                config_text
            ],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            // A concurrent create can pass the pre-check and still hit the
            // unique index.
            Err(err) if is_unique_violation(&err) => {
                Err(RepoError::DuplicateName(source.name.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_id(&self, id: SourceId) -> RepoResult<Option<DataSource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SOURCE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_source_row(row)?));
        }

        Ok(None)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<DataSource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SOURCE_SELECT_SQL} WHERE name = ?1;"))?;

        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_source_row(row)?));
        }

        Ok(None)
    }

    fn list_sources(&self, query: &SourceListQuery) -> RepoResult<Vec<DataSource>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SOURCE_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
        ))?;

        let mut rows = stmt.query(params![i64::from(query.limit), i64::from(query.offset)])?;
        let mut sources = Vec::new();
        while let Some(row) = rows.next()? {
            sources.push(parse_source_row(row)?);
        }

        Ok(sources)
    }
}

fn parse_source_row(row: &Row<'_>) -> RepoResult<DataSource> {
    let id: SourceId = row.get("id")?;
    let config_text: String = row.get("config")?;
    let config = serde_json::from_str(&config_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid config JSON in data_sources.config for id {id}"
        ))
    })?;

    Ok(DataSource {
        id,
        name: row.get("name")?,
        source_type: row.get("source_type")?,
        config,
    })
}

/// Returns whether the error is a unique-index violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Rejects connections whose schema version does not match this binary.
pub(crate) fn ensure_schema_version(conn: &Connection) -> RepoResult<()> {
    let actual_version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Verifies the table and its required columns exist on this connection.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
