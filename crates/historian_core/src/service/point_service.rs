//! Point Store use-case service.
//!
//! # Responsibility
//! - Provide ingest/list APIs over the point repository.
//! - Resolve the owning source through the Source Registry before any write.
//!
//! # Invariants
//! - Ingestion either persists exactly one point and returns it, or persists
//!   nothing and reports a typed failure.
//! - The registry existence check runs before the insert; the storage-layer
//!   foreign key catches races and keeps the same failure kind.

use crate::model::point::{DataPoint, NewDataPoint};
use crate::model::source::SourceId;
use crate::repo::point_repo::PointRepository;
use crate::repo::source_repo::{RepoError, RepoResult, SourceRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for point ingestion use-cases.
#[derive(Debug)]
pub enum PointServiceError {
    /// Ingestion referenced a source that does not exist.
    SourceNotFound(SourceId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for PointServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound(id) => write!(f, "data source not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent point store state: {details}")
            }
        }
    }
}

impl Error for PointServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PointServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::SourceNotFound(id) => Self::SourceNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Point Store facade over the point repository and the Source Registry.
pub struct PointService<S: SourceRepository, P: PointRepository> {
    sources: S,
    points: P,
}

impl<S: SourceRepository, P: PointRepository> PointService<S, P> {
    /// Creates a service from registry and store repository implementations.
    pub fn new(sources: S, points: P) -> Self {
        Self { sources, points }
    }

    /// Ingests one reading for an existing source and returns the persisted
    /// point with its store-assigned timestamp.
    ///
    /// # Contract
    /// - Fails with `SourceNotFound` when `source_id` is unknown; no row is
    ///   written in that case.
    /// - The returned timestamp comes from the store clock, never the caller.
    pub fn ingest(&self, source_id: SourceId, value: f64) -> Result<DataPoint, PointServiceError> {
        if self.sources.find_by_id(source_id)?.is_none() {
            return Err(PointServiceError::SourceNotFound(source_id));
        }

        let draft = NewDataPoint::new(source_id, value);
        let id = self.points.create_point(&draft)?;
        self.points
            .find_by_id(id)?
            .ok_or(PointServiceError::InconsistentState(
                "created data point not found in read-back",
            ))
    }

    /// Lists all points for one source in insertion order.
    ///
    /// Unknown source ids yield an empty list.
    pub fn list_by_source(&self, source_id: SourceId) -> RepoResult<Vec<DataPoint>> {
        self.points.list_by_source(source_id)
    }
}
