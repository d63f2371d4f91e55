//! Data point domain model.
//!
//! # Invariants
//! - `timestamp` is assigned from the store clock at insertion, never by the
//!   caller; the draft therefore carries no time field at all.
//! - `source_id` must reference a source that exists at creation time.

use crate::model::source::SourceId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Stable surrogate identifier for a persisted data point.
pub type PointId = i64;

/// One timestamped numeric reading attached to a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Storage-assigned surrogate id, stable for the point lifetime.
    pub id: PointId,
    /// Owning source reference, validated at creation time.
    pub source_id: SourceId,
    /// Numeric reading.
    pub value: f64,
    /// Store-assigned ingestion time in epoch milliseconds.
    pub timestamp: i64,
}

/// Ingestion draft for a new data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDataPoint {
    pub source_id: SourceId,
    pub value: f64,
}

impl NewDataPoint {
    pub fn new(source_id: SourceId, value: f64) -> Self {
        Self { source_id, value }
    }

    /// Checks ingestion preconditions that do not require storage access.
    ///
    /// # Errors
    /// - `ValidationError::NonFiniteValue` for NaN or infinite values, which
    ///   SQLite cannot store in a `REAL NOT NULL` column.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.value.is_finite() {
            return Err(ValidationError::NonFiniteValue(self.value));
        }
        Ok(())
    }
}
