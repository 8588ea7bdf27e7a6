//! Concurrent dependency-ordered graph walk.
//!
//! One tokio task per resource node, coordinated by the graph shape rather
//! than a scheduler queue: a node is spawned only once every direct
//! predecessor has reached a terminal state, and independent branches run
//! concurrently with no artificial throttling. When a node fails, its
//! transitive dependents are marked skipped and never invoked, while
//! already-running independent branches are awaited to completion — external
//! side effects may be irreversible mid-flight, so nothing is force-cancelled.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult, NodeFailure, NodeResult};
use crate::graph::{ExecGraph, ExecNode};

use super::{Message, OpResult, Operation};

/// Terminal state of one node after the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Succeeded,
    Failed(String),
    Skipped,
}

/// Aggregate outcome of one walk, keyed by resource id (the root sentinel is
/// not reported).
#[derive(Debug)]
pub struct WalkReport {
    pub states: HashMap<String, NodeState>,
    pub failures: Vec<NodeFailure>,
}

impl WalkReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Execute every node of a validated acyclic graph against the shared
/// operation context.
pub async fn walk(graph: &ExecGraph, op: Arc<Operation>) -> EngineResult<WalkReport> {
    let g = &graph.graph;
    let mut terminal: HashMap<NodeIndex, NodeState> = HashMap::new();
    let mut ready: Vec<NodeIndex> = vec![graph.root_idx];
    let mut join_set: JoinSet<(NodeIndex, NodeResult<()>)> = JoinSet::new();
    let mut report = WalkReport {
        states: HashMap::new(),
        failures: Vec::new(),
    };

    loop {
        while let Some(idx) = ready.pop() {
            let Some(node) = g.node_weight(idx) else {
                continue;
            };

            // A node with any failed or skipped predecessor is never invoked.
            let skipped = g.neighbors_directed(idx, Direction::Incoming).any(|p| {
                matches!(
                    terminal.get(&p),
                    Some(NodeState::Failed(_) | NodeState::Skipped)
                )
            });
            if skipped {
                debug!(node = node.id(), "skipping node with failed dependency");
                finish_node(
                    graph,
                    &op,
                    idx,
                    NodeState::Skipped,
                    &mut terminal,
                    &mut report,
                    &mut ready,
                );
                continue;
            }

            let node = node.clone();
            let task_op = Arc::clone(&op);
            join_set.spawn(async move {
                let result = node.execute(&task_op).await;
                (idx, result)
            });
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let (idx, result) = joined
            .map_err(|e| EngineError::Internal(format!("node task join error: {e}")))?;

        let state = match result {
            Ok(()) => NodeState::Succeeded,
            Err(err) => {
                let resource_id = g
                    .node_weight(idx)
                    .map(|n| n.id().to_string())
                    .unwrap_or_default();
                warn!(node = %resource_id, error = %err, "node execution failed");
                report.failures.push(NodeFailure {
                    resource_id,
                    error: err.clone(),
                });
                NodeState::Failed(err.to_string())
            }
        };
        finish_node(graph, &op, idx, state, &mut terminal, &mut report, &mut ready);
    }

    Ok(report)
}

/// Mark a node terminal, emit its progress message, and enqueue every
/// successor whose predecessors are now all terminal.
fn finish_node(
    graph: &ExecGraph,
    op: &Operation,
    idx: NodeIndex,
    state: NodeState,
    terminal: &mut HashMap<NodeIndex, NodeState>,
    report: &mut WalkReport,
    ready: &mut Vec<NodeIndex>,
) {
    let g = &graph.graph;
    terminal.insert(idx, state.clone());

    if let Some(ExecNode::Resource { resource, .. }) = g.node_weight(idx) {
        let (op_result, detail) = match &state {
            NodeState::Succeeded => (OpResult::Success, None),
            NodeState::Failed(message) => (OpResult::Failed, Some(message.clone())),
            NodeState::Skipped => (OpResult::Skipped, None),
        };
        report.states.insert(resource.id.clone(), state);
        op.emit(Message {
            resource_id: resource.id.clone(),
            op_result,
            detail,
        });
    }

    for successor in g.neighbors_directed(idx, Direction::Outgoing) {
        if terminal.contains_key(&successor) {
            continue;
        }
        let all_preds_terminal = g
            .neighbors_directed(successor, Direction::Incoming)
            .all(|p| terminal.contains_key(&p));
        if all_preds_terminal {
            ready.push(successor);
        }
    }
}
