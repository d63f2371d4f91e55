//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep access-layer callers decoupled from storage details.
//!
//! # Invariants
//! - The Point Store service resolves sources through the Source Registry
//!   before any write; the dependency order is registry before store.

pub mod point_service;
pub mod source_service;
