//! Use-case operations for transport-facing callers.
//!
//! # Responsibility
//! - Expose the four historian operations behind stable functions.
//! - Apply boundary defaults (offset/limit) before calling the core.
//! - Keep every operation request-scoped: one connection per call, released
//!   on success and failure alike.
//!
//! # Invariants
//! - No connection or session outlives a single operation.
//! - Failures surface as `ApiError` kinds, never ad-hoc strings.
//!
//! # See also
//! - docs/architecture/data-model.md

use historian_core::db::{open_db, DbError};
use historian_core::{
    DataPoint, DataSource, NewDataSource, PointService, PointServiceError, RepoError, SourceId,
    SourceListQuery, SourceService, SourceServiceError, SqlitePointRepository,
    SqliteSourceRepository,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::OnceLock;

const DEFAULT_LIST_OFFSET: u32 = 0;
const DEFAULT_LIST_LIMIT: u32 = 100;
const DEFAULT_DB_FILE_NAME: &str = "historian.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Typed failure for all access-layer operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Registration attempted with a name already in use; retrying with the
    /// same input will not succeed.
    DuplicateName(String),
    /// Ingestion referenced a nonexistent source; register it first.
    SourceNotFound(SourceId),
    /// The request itself is malformed (empty name, non-finite value).
    InvalidRequest(String),
    /// The backing store could not be reached or committed; not retried
    /// here, surfaced verbatim.
    Storage(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName(name) => {
                write!(f, "data source name already in use: `{name}`")
            }
            Self::SourceNotFound(id) => write!(f, "data source not found: {id}"),
            Self::InvalidRequest(message) => write!(f, "invalid request: {message}"),
            Self::Storage(message) => write!(f, "storage failure: {message}"),
        }
    }
}

impl Error for ApiError {}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidRequest(err.to_string()),
            RepoError::DuplicateName(name) => Self::DuplicateName(name),
            RepoError::SourceNotFound(id) => Self::SourceNotFound(id),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<SourceServiceError> for ApiError {
    fn from(value: SourceServiceError) -> Self {
        match value {
            SourceServiceError::DuplicateName(name) => Self::DuplicateName(name),
            SourceServiceError::Repo(err) => err.into(),
            SourceServiceError::InconsistentState(details) => {
                Self::Storage(format!("inconsistent registry state: {details}"))
            }
        }
    }
}

impl From<PointServiceError> for ApiError {
    fn from(value: PointServiceError) -> Self {
        match value {
            PointServiceError::SourceNotFound(id) => Self::SourceNotFound(id),
            PointServiceError::Repo(err) => err.into(),
            PointServiceError::InconsistentState(details) => {
                Self::Storage(format!("inconsistent point store state: {details}"))
            }
        }
    }
}

/// Transport-facing view of a registered source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceDto {
    pub id: i64,
    pub name: String,
    pub source_type: String,
    pub config: Value,
}

impl From<DataSource> for DataSourceDto {
    fn from(value: DataSource) -> Self {
        Self {
            id: value.id,
            name: value.name,
            source_type: value.source_type,
            config: value.config,
        }
    }
}

/// Transport-facing view of a persisted reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPointDto {
    pub id: i64,
    pub source_id: i64,
    pub value: f64,
    /// Store-assigned ingestion time in epoch milliseconds.
    pub timestamp: i64,
}

impl From<DataPoint> for DataPointDto {
    fn from(value: DataPoint) -> Self {
        Self {
            id: value.id,
            source_id: value.source_id,
            value: value.value,
            timestamp: value.timestamp,
        }
    }
}

/// Registration input for `register_source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterSourceRequest {
    pub name: String,
    pub source_type: String,
    /// Opaque configuration payload; `None` becomes an empty `{}` object.
    pub config: Option<Value>,
}

/// Configures the process-wide database path used by all operations.
///
/// Safe to call repeatedly with the same path (idempotent); switching to a
/// different path after first configuration is rejected.
pub fn configure_db_path(path: impl Into<PathBuf>) -> Result<(), String> {
    let path = path.into();
    let _ = DB_PATH.set(path.clone());

    match DB_PATH.get() {
        Some(active) if *active == path => Ok(()),
        Some(active) => Err(format!(
            "database path already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            path.display()
        )),
        None => Err("database path configuration did not complete".to_string()),
    }
}

/// Registers a new data source and returns the created entity.
///
/// # Contract
/// - Opens and releases its own connection; no state survives the call.
/// - Fails with `ApiError::DuplicateName` when the name is taken; nothing is
///   written in that case.
pub fn register_source(request: RegisterSourceRequest) -> Result<DataSourceDto, ApiError> {
    let conn = open_db(resolve_db_path())?;
    let service = SourceService::new(SqliteSourceRepository::try_new(&conn)?);

    let draft = match request.config {
        Some(config) => NewDataSource::with_config(request.name, request.source_type, config),
        None => NewDataSource::new(request.name, request.source_type),
    };

    match service.register(draft) {
        Ok(source) => {
            info!(
                "event=register_source module=api status=ok source_id={}",
                source.id
            );
            Ok(source.into())
        }
        Err(err) => {
            warn!("event=register_source module=api status=error error={err}");
            Err(err.into())
        }
    }
}

/// Lists registered sources in insertion order.
///
/// Boundary defaults: `offset` falls back to 0, `limit` to 100. A `limit` of
/// 0 is treated as unset.
pub fn list_sources(
    offset: Option<u32>,
    limit: Option<u32>,
) -> Result<Vec<DataSourceDto>, ApiError> {
    let conn = open_db(resolve_db_path())?;
    let service = SourceService::new(SqliteSourceRepository::try_new(&conn)?);

    let query = SourceListQuery {
        limit: normalize_limit(limit),
        offset: offset.unwrap_or(DEFAULT_LIST_OFFSET),
    };
    let sources = service.list_sources(&query)?;
    Ok(sources.into_iter().map(DataSourceDto::from).collect())
}

/// Ingests one reading for an existing source.
///
/// # Contract
/// - The returned `timestamp` is assigned by the store; no client time field
///   is accepted anywhere in the input.
/// - Fails with `ApiError::SourceNotFound` when the source does not exist;
///   nothing is written in that case.
pub fn ingest_point(source_id: SourceId, value: f64) -> Result<DataPointDto, ApiError> {
    let conn = open_db(resolve_db_path())?;
    let service = PointService::new(
        SqliteSourceRepository::try_new(&conn)?,
        SqlitePointRepository::try_new(&conn)?,
    );

    match service.ingest(source_id, value) {
        Ok(point) => {
            info!(
                "event=ingest_point module=api status=ok source_id={source_id} point_id={}",
                point.id
            );
            Ok(point.into())
        }
        Err(err) => {
            warn!("event=ingest_point module=api status=error source_id={source_id} error={err}");
            Err(err.into())
        }
    }
}

/// Lists all points for one source in insertion order.
///
/// Unknown source ids yield an empty list rather than a failure.
pub fn list_source_points(source_id: SourceId) -> Result<Vec<DataPointDto>, ApiError> {
    let conn = open_db(resolve_db_path())?;
    let service = PointService::new(
        SqliteSourceRepository::try_new(&conn)?,
        SqlitePointRepository::try_new(&conn)?,
    );

    let points = service.list_by_source(source_id)?;
    Ok(points.into_iter().map(DataPointDto::from).collect())
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get()
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME))
}

fn normalize_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => DEFAULT_LIST_LIMIT,
        Some(value) => value,
    }
}
