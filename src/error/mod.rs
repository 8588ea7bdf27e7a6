//! Error types for the orchestration engine.
//!
//! - [`NodeError`] — Errors raised while executing a single resource node.
//! - [`EngineError`] — Top-level errors for graph construction, validation,
//!   and the aggregate operation result.

pub mod engine_error;
pub mod node_error;

pub use engine_error::{EngineError, NodeFailure};
pub use node_error::NodeError;

/// Convenience alias for engine-level results.
pub type EngineResult<T> = Result<T, EngineError>;
/// Convenience alias for node-level results.
pub type NodeResult<T> = Result<T, NodeError>;
