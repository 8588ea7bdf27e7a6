//! # XStack — A Declarative Infrastructure-Orchestration Engine
//!
//! `xstack` drives a declarative set of resources with inter-dependencies to
//! a desired state against pluggable backend runtimes. It provides:
//!
//! - **Resource-operation graph**: a validated DAG over resources, built from
//!   `depends_on` edges with a root sentinel as the single traversal origin.
//! - **Concurrent walk**: one task per node, started only after all
//!   predecessors terminate; independent branches run in parallel, dependents
//!   of a failed node are skipped, in-flight work is never force-cancelled.
//! - **Implicit references**: a resource's attributes may embed
//!   `$xstack_path.<id>.<dotted.path>` markers referring to another resource's
//!   runtime-produced value, resolved lazily against the operation's context
//!   index.
//! - **Runtime dispatch**: a type-keyed registry of [`Runtime`]
//!   implementations (container orchestration, provisioning, ...) applying,
//!   reading, and deleting resources.
//! - **Release record**: per-operation resource states and an aggregate
//!   status, mutated under a single operation-scoped lock.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xstack::{
//!     ActionType, Operation, OperationType, Resource, ResourceChange, RuntimeRegistry,
//! };
//!
//! # async fn example(runtimes: RuntimeRegistry) -> Result<(), xstack::EngineError> {
//! let resource = Resource::new("app-service", "kubernetes");
//! let op = Operation::builder(OperationType::Apply, runtimes).build();
//! let release = op
//!     .execute(vec![ResourceChange::new(resource, ActionType::Create)])
//!     .await?;
//! println!("{:?}", release.phase);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod operation;
pub mod resource;
pub mod runtime;

pub use crate::error::{EngineError, EngineResult, NodeError, NodeFailure, NodeResult};
pub use crate::graph::{build_graph, validate_graph, ExecGraph, ExecNode, ResourceChange};
pub use crate::operation::{
    walk, Message, NodeState, OpResult, Operation, OperationBuilder, WalkReport,
    IMPLICIT_REF_PREFIX,
};
pub use crate::resource::{
    index_resources, ActionType, OperationType, Release, ReleasePhase, Resource, ResourceIndex,
};
pub use crate::runtime::{
    ApplyRequest, ApplyResponse, DeleteRequest, ReadRequest, ReadResponse, Runtime,
    RuntimeRegistry,
};
