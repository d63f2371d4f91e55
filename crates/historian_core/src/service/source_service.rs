//! Source Registry use-case service.
//!
//! # Responsibility
//! - Provide register/get/list APIs over the source repository.
//! - Return the full created entity after registration.
//!
//! # Invariants
//! - Registration either persists exactly one source and returns it, or
//!   persists nothing and reports a typed failure.
//! - Sources are never updated or deleted.

use crate::model::source::{DataSource, NewDataSource, SourceId};
use crate::repo::source_repo::{RepoError, RepoResult, SourceListQuery, SourceRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for source registration use-cases.
#[derive(Debug)]
pub enum SourceServiceError {
    /// A source with the requested name already exists.
    DuplicateName(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for SourceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName(name) => {
                write!(f, "data source name already in use: `{name}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent registry state: {details}")
            }
        }
    }
}

impl Error for SourceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SourceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateName(name) => Self::DuplicateName(name),
            other => Self::Repo(other),
        }
    }
}

/// Source Registry facade over repository implementations.
pub struct SourceService<R: SourceRepository> {
    repo: R,
}

impl<R: SourceRepository> SourceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers one source and returns the persisted entity.
    ///
    /// # Contract
    /// - Fails with `DuplicateName` when the name is already in use; no row
    ///   is written in that case.
    /// - The returned entity carries the storage-assigned id.
    pub fn register(&self, source: NewDataSource) -> Result<DataSource, SourceServiceError> {
        let id = self.repo.create_source(&source)?;
        self.repo
            .find_by_id(id)?
            .ok_or(SourceServiceError::InconsistentState(
                "created data source not found in read-back",
            ))
    }

    /// Gets one source by stable id.
    pub fn get_source(&self, id: SourceId) -> RepoResult<Option<DataSource>> {
        self.repo.find_by_id(id)
    }

    /// Gets one source by exact, case-sensitive name.
    pub fn get_source_by_name(&self, name: &str) -> RepoResult<Option<DataSource>> {
        self.repo.find_by_name(name)
    }

    /// Lists sources in insertion order using caller-resolved pagination.
    pub fn list_sources(&self, query: &SourceListQuery) -> RepoResult<Vec<DataSource>> {
        self.repo.list_sources(query)
    }
}
