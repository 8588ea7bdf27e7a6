use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::error::{EngineError, EngineResult};
use crate::resource::{ActionType, Resource};

/// Polymorphic unit of execution in the operation graph.
#[derive(Debug, Clone)]
pub enum ExecNode {
    /// Sentinel entry point. No resource, no-op execution; exists so the walk
    /// has a single well-defined starting frontier.
    Root,
    /// One resource plus the action decided upstream.
    Resource {
        resource: Resource,
        action: ActionType,
    },
}

impl ExecNode {
    /// Display id of this node. The root sentinel is never indexed, so the
    /// name cannot collide with a resource id.
    pub fn id(&self) -> &str {
        match self {
            ExecNode::Root => "root",
            ExecNode::Resource { resource, .. } => &resource.id,
        }
    }
}

/// A resource together with the action decided upstream; input to
/// [`build_graph`](super::build_graph).
#[derive(Debug, Clone)]
pub struct ResourceChange {
    pub resource: Resource,
    pub action: ActionType,
}

impl ResourceChange {
    pub fn new(resource: Resource, action: ActionType) -> Self {
        ResourceChange { resource, action }
    }
}

/// Resource id to petgraph NodeIndex mapping. The root sentinel is not
/// included.
pub type NodeIndexMap = std::collections::HashMap<String, NodeIndex>;

/// The validated operation DAG.
#[derive(Debug)]
pub struct ExecGraph {
    /// Graph structure; edges point from dependency to dependent.
    pub graph: StableDiGraph<ExecNode, ()>,

    /// Root sentinel index.
    pub root_idx: NodeIndex,

    /// Resource id to node index mapping.
    pub node_index_map: NodeIndexMap,
}

impl ExecGraph {
    /// Look up a resource node by id.
    pub fn get_node(&self, resource_id: &str) -> EngineResult<&ExecNode> {
        let idx = self.node_index_map.get(resource_id).ok_or_else(|| {
            EngineError::Internal(format!("node not found: {resource_id}"))
        })?;
        self.graph
            .node_weight(*idx)
            .ok_or_else(|| EngineError::Internal(format!("node not found: {resource_id}")))
    }

    /// Number of resource nodes, excluding the root sentinel.
    pub fn resource_count(&self) -> usize {
        self.node_index_map.len()
    }
}
