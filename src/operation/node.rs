//! Per-node execution: the state machine driven once per walk.
//!
//! The root sentinel is a no-op. A resource node either deletes through its
//! runtime, or resolves implicit references, dispatches an apply, strips
//! ignored fields from the result, and records it — all per the action decided
//! upstream. Any failure terminates only this node; nothing is written to the
//! shared state for a failed resource.

use tracing::debug;

use crate::error::NodeResult;
use crate::graph::ExecNode;
use crate::resource::{ActionType, Resource};
use crate::runtime::{ApplyRequest, DeleteRequest};

use super::refs::{remove_nested_field, resolve_implicit_refs};
use super::Operation;

impl ExecNode {
    /// Execute this node against the shared operation context.
    pub async fn execute(&self, op: &Operation) -> NodeResult<()> {
        match self {
            ExecNode::Root => Ok(()),
            ExecNode::Resource { resource, action } => match action {
                ActionType::Delete => delete_resource(resource, op).await,
                ActionType::Create | ActionType::Update => apply_resource(resource, op).await,
                ActionType::Unchanged => {
                    // Keep the release complete without dispatching: record the
                    // last applied state as-is.
                    let state = op
                        .prior_state_index()
                        .get(&resource.id)
                        .cloned()
                        .unwrap_or_else(|| resource.clone());
                    op.record_applied(state);
                    Ok(())
                }
            },
        }
    }
}

async fn delete_resource(resource: &Resource, op: &Operation) -> NodeResult<()> {
    let runtime = op.runtime_for(&resource.resource_type)?;
    let prior = op
        .prior_state_index()
        .get(&resource.id)
        .cloned()
        .unwrap_or_else(|| resource.clone());

    debug!(resource = %resource.id, "deleting resource");
    runtime.delete(DeleteRequest { resource: prior }).await?;
    op.record_deleted(&resource.id);
    Ok(())
}

async fn apply_resource(resource: &Resource, op: &Operation) -> NodeResult<()> {
    let runtime = op.runtime_for(&resource.resource_type)?;

    // Resolution works on a deep copy; the canonical desired configuration
    // keeps its reference markers.
    let attributes = resolve_implicit_refs(&resource.attributes, op.ctx_resource_index())?;
    let mut desired = resource.clone();
    desired.attributes = attributes;

    let prior = op.prior_state_index().get(&resource.id).cloned();

    debug!(resource = %resource.id, "applying resource");
    let response = runtime
        .apply(ApplyRequest {
            resource: desired,
            prior_resource: prior,
        })
        .await?;

    let mut result = response.resource;
    for field in op.ignore_fields() {
        let segments: Vec<&str> = field.split('.').collect();
        remove_nested_field(&mut result.attributes, &segments);
    }

    op.record_applied(result);
    Ok(())
}
