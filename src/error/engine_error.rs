//! Engine-level error types.

use super::NodeError;
use thiserror::Error;

/// One node-level failure surfaced in the aggregate operation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub resource_id: String,
    pub error: NodeError,
}

/// Engine-level errors
///
/// Configuration errors ([`CycleDetected`](EngineError::CycleDetected),
/// [`UnknownDependency`](EngineError::UnknownDependency),
/// [`DuplicateResourceId`](EngineError::DuplicateResourceId)) are detected
/// before any runtime call and abort the whole operation with no side effects.
/// [`OperationFailed`](EngineError::OperationFailed) aggregates every
/// node-level failure of a completed walk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cycle detected in resource graph")]
    CycleDetected,
    #[error("resource {resource} depends on unknown resource {dependency}")]
    UnknownDependency { resource: String, dependency: String },
    #[error("duplicate resource id: {0}")]
    DuplicateResourceId(String),
    #[error("operation failed: {} resource(s) failed", failures.len())]
    OperationFailed { failures: Vec<NodeFailure> },
    #[error("internal error: {0}")]
    Internal(String),
}
