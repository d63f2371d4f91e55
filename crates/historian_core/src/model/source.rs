//! Data source domain model.
//!
//! # Responsibility
//! - Define the registered-source record and its registration draft.
//! - Keep the configuration payload opaque: stored and returned verbatim.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused for another source.
//! - `name` is unique across all sources, compared case-sensitively.
//! - Sources are immutable after registration; there is no delete path.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable surrogate identifier for a registered data source.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type SourceId = i64;

/// A registered origin of readings.
///
/// `source_type` is a free-form tag (for example `"temperature"`); the core
/// enforces no enumerated set. `config` is an arbitrary JSON document the
/// core never inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// Storage-assigned surrogate id, stable for the source lifetime.
    pub id: SourceId,
    /// Unique, case-sensitive source name.
    pub name: String,
    /// Free-form type tag.
    pub source_type: String,
    /// Opaque configuration payload, defaults to an empty object.
    pub config: Value,
}

/// Registration draft for a new data source.
///
/// The id is absent on purpose: it exists only after storage assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDataSource {
    pub name: String,
    pub source_type: String,
    pub config: Value,
}

impl NewDataSource {
    /// Creates a draft with an empty `{}` configuration payload.
    pub fn new(name: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self::with_config(name, source_type, Value::Object(Map::new()))
    }

    /// Creates a draft carrying a caller-provided configuration payload.
    pub fn with_config(
        name: impl Into<String>,
        source_type: impl Into<String>,
        config: Value,
    ) -> Self {
        Self {
            name: name.into(),
            source_type: source_type.into(),
            config,
        }
    }

    /// Checks registration preconditions that do not require storage access.
    ///
    /// # Errors
    /// - `ValidationError::EmptyName` when the name is empty or whitespace.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }
}
