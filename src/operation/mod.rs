//! Operation context and execution.
//!
//! An [`Operation`] is the shared, lock-guarded state threaded through every
//! node execution within one graph walk: the three resource indices, the
//! runtime registry, the release record, the progress channel, and the
//! ignored-field list. It is constructed through [`OperationBuilder`], lives
//! for exactly one walk, and is discarded afterwards.

pub mod node;
pub mod refs;
pub mod walker;

pub use refs::{remove_nested_field, resolve_implicit_refs, IMPLICIT_REF_PREFIX};
pub use walker::{walk, NodeState, WalkReport};

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{EngineError, EngineResult};
use crate::graph::{build_graph, validate_graph, ResourceChange};
use crate::resource::{OperationType, Release, ReleasePhase, Resource, ResourceIndex};
use crate::runtime::{Runtime, RuntimeRegistry};

/// Outcome tag carried by progress messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpResult {
    Success,
    Failed,
    Skipped,
}

/// Progress message emitted as each node reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub resource_id: String,
    pub op_result: OpResult,
    pub detail: Option<String>,
}

/// State mutated by nodes as they complete. Guarded by the single
/// operation-scoped lock; the lock is held only for the mutation, never
/// across a runtime call.
struct OperationState {
    live_index: ResourceIndex,
    release: Release,
}

/// Shared context for one graph walk.
pub struct Operation {
    operation_type: OperationType,
    ctx_resource_index: ResourceIndex,
    prior_state_index: ResourceIndex,
    state: Mutex<OperationState>,
    runtimes: RuntimeRegistry,
    msg_tx: Option<mpsc::UnboundedSender<Message>>,
    ignore_fields: Vec<String>,
}

impl Operation {
    /// Start building an operation for the given kind and runtime registry.
    pub fn builder(operation_type: OperationType, runtimes: RuntimeRegistry) -> OperationBuilder {
        OperationBuilder {
            operation_type,
            runtimes,
            ctx_resource_index: ResourceIndex::new(),
            prior_state_index: ResourceIndex::new(),
            live_index: ResourceIndex::new(),
            msg_tx: None,
            ignore_fields: Vec::new(),
        }
    }

    /// Build, validate, and concurrently walk the graph for `changes`,
    /// returning the finalized release.
    ///
    /// Configuration errors (cycles, dangling dependencies) abort before any
    /// runtime call. Node-level failures are collected into
    /// [`EngineError::OperationFailed`]; independent branches still complete.
    ///
    /// On failure the release is finalized with phase
    /// [`ReleasePhase::Failed`] but is not carried in the error. To inspect
    /// the partial state, keep a clone of the `Arc` and call
    /// [`release_snapshot`](Self::release_snapshot) after `execute` returns.
    pub async fn execute(self: Arc<Self>, changes: Vec<ResourceChange>) -> EngineResult<Release> {
        let graph = build_graph(changes)?;
        validate_graph(&graph)?;

        let report = walker::walk(&graph, Arc::clone(&self)).await?;
        if report.is_success() {
            Ok(self.finalize(ReleasePhase::Succeeded))
        } else {
            self.finalize(ReleasePhase::Failed);
            Err(EngineError::OperationFailed {
                failures: report.failures,
            })
        }
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// Read-only snapshot used to resolve implicit references. Established
    /// before the walk begins and never mutated mid-walk, so reads need no
    /// lock.
    pub fn ctx_resource_index(&self) -> &ResourceIndex {
        &self.ctx_resource_index
    }

    /// Last known applied state, read-only.
    pub fn prior_state_index(&self) -> &ResourceIndex {
        &self.prior_state_index
    }

    pub fn ignore_fields(&self) -> &[String] {
        &self.ignore_fields
    }

    /// Snapshot of the live index as mutated so far.
    pub fn live_state(&self, resource_id: &str) -> Option<Resource> {
        self.state.lock().live_index.get(resource_id).cloned()
    }

    /// Snapshot of the release as mutated so far.
    pub fn release_snapshot(&self) -> Release {
        self.state.lock().release.clone()
    }

    pub(crate) fn runtime_for(
        &self,
        resource_type: &str,
    ) -> crate::error::NodeResult<Arc<dyn Runtime>> {
        self.runtimes.get(resource_type)
    }

    /// Record a successfully applied resource into the live index and the
    /// release.
    pub(crate) fn record_applied(&self, resource: Resource) {
        let mut state = self.state.lock();
        state
            .live_index
            .insert(resource.id.clone(), resource.clone());
        state.release.resources.insert(resource.id.clone(), resource);
    }

    /// Remove a deleted resource from the live index and the release.
    pub(crate) fn record_deleted(&self, resource_id: &str) {
        let mut state = self.state.lock();
        state.live_index.remove(resource_id);
        state.release.resources.remove(resource_id);
    }

    /// Emit a progress message. The channel is unbounded so this never blocks
    /// node completion; once the receiver is dropped, messages are discarded.
    pub(crate) fn emit(&self, message: Message) {
        if let Some(tx) = &self.msg_tx {
            let _ = tx.send(message);
        }
    }

    fn finalize(&self, phase: ReleasePhase) -> Release {
        let mut state = self.state.lock();
        state.release.phase = phase;
        state.release.clone()
    }
}

/// Builder for configuring an [`Operation`].
pub struct OperationBuilder {
    operation_type: OperationType,
    runtimes: RuntimeRegistry,
    ctx_resource_index: ResourceIndex,
    prior_state_index: ResourceIndex,
    live_index: ResourceIndex,
    msg_tx: Option<mpsc::UnboundedSender<Message>>,
    ignore_fields: Vec<String>,
}

impl OperationBuilder {
    /// Set the read-only snapshot implicit references resolve against,
    /// typically the prior plus current desired state.
    pub fn context_index(mut self, index: ResourceIndex) -> Self {
        self.ctx_resource_index = index;
        self
    }

    /// Set the last known applied state.
    pub fn prior_state_index(mut self, index: ResourceIndex) -> Self {
        self.prior_state_index = index;
        self
    }

    /// Seed the live index; it is mutated as nodes complete.
    pub fn live_index(mut self, index: ResourceIndex) -> Self {
        self.live_index = index;
        self
    }

    /// Attach a progress channel. The sender side is unbounded: emitting never
    /// blocks a node, and messages sent after the receiver is dropped are
    /// discarded. The caller owns the receiver and should drain it until the
    /// walk completes.
    pub fn message_sender(mut self, tx: mpsc::UnboundedSender<Message>) -> Self {
        self.msg_tx = Some(tx);
        self
    }

    /// Attribute paths stripped from runtime results before they are stored,
    /// so provider-populated fields are not treated as drift later.
    pub fn ignore_fields(mut self, fields: Vec<String>) -> Self {
        self.ignore_fields = fields;
        self
    }

    pub fn build(self) -> Arc<Operation> {
        Arc::new(Operation {
            operation_type: self.operation_type,
            ctx_resource_index: self.ctx_resource_index,
            prior_state_index: self.prior_state_index,
            state: Mutex::new(OperationState {
                live_index: self.live_index,
                release: Release::new(),
            }),
            runtimes: self.runtimes,
            msg_tx: self.msg_tx,
            ignore_fields: self.ignore_fields,
        })
    }
}
