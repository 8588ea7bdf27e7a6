use crate::error::{EngineError, EngineResult};

use super::types::ExecGraph;

/// Validate the operation graph before any node executes.
///
/// A cycle fails the entire operation with no side effects; no partial
/// execution occurs.
pub fn validate_graph(graph: &ExecGraph) -> EngineResult<()> {
    if petgraph::algo::is_cyclic_directed(&graph.graph) {
        return Err(EngineError::CycleDetected);
    }
    Ok(())
}
