//! Core domain logic for the data historian.
//! This crate is the single source of truth for registry/store invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::point::{DataPoint, NewDataPoint, PointId};
pub use model::source::{DataSource, NewDataSource, SourceId};
pub use model::ValidationError;
pub use repo::point_repo::{PointRepository, SqlitePointRepository};
pub use repo::source_repo::{
    RepoError, RepoResult, SourceListQuery, SourceRepository, SqliteSourceRepository,
};
pub use service::point_service::{PointService, PointServiceError};
pub use service::source_service::{SourceService, SourceServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
