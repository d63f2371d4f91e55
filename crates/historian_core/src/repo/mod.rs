//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the Source Registry and Point Store data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate drafts before any SQL mutation.
//! - Repository APIs return semantic errors (`DuplicateName`,
//!   `SourceNotFound`) in addition to DB transport errors; storage-layer
//!   constraint violations are translated back into the same semantic kinds.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod point_repo;
pub mod source_repo;
