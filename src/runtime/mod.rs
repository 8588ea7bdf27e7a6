//! Runtime provider contract and registry.
//!
//! A [`Runtime`] is an external backend (a container-orchestration API, a
//! provisioning API, ...) capable of applying, reading, and deleting resources
//! of a given type. The engine selects one through the [`RuntimeRegistry`] by
//! the resource's type tag and treats any returned error as that node's
//! failure signal, propagating the message without interpreting it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{NodeError, NodeResult};
use crate::resource::Resource;

#[derive(Debug, Clone)]
pub struct ApplyRequest {
    /// Desired state with every implicit reference already resolved.
    pub resource: Resource,
    /// Last applied state, so providers can retain server-populated fields.
    pub prior_resource: Option<Resource>,
}

#[derive(Debug, Clone)]
pub struct ApplyResponse {
    pub resource: Resource,
}

#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub resource: Resource,
}

#[derive(Debug, Clone)]
pub struct ReadResponse {
    /// `None` when the resource does not exist in the backend.
    pub resource: Option<Resource>,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub resource: Resource,
}

/// Trait for backend providers. Each resource type maps to one implementation.
#[async_trait]
pub trait Runtime: Send + Sync {
    async fn apply(&self, request: ApplyRequest) -> NodeResult<ApplyResponse>;

    async fn read(&self, request: ReadRequest) -> NodeResult<ReadResponse>;

    async fn delete(&self, request: DeleteRequest) -> NodeResult<()>;
}

/// Registry of runtimes by resource type tag, resolved once at operation
/// setup.
pub struct RuntimeRegistry {
    runtimes: HashMap<String, Arc<dyn Runtime>>,
}

impl RuntimeRegistry {
    pub fn new() -> Self {
        RuntimeRegistry {
            runtimes: HashMap::new(),
        }
    }

    pub fn register(&mut self, resource_type: &str, runtime: Arc<dyn Runtime>) {
        self.runtimes.insert(resource_type.to_string(), runtime);
    }

    pub fn get(&self, resource_type: &str) -> NodeResult<Arc<dyn Runtime>> {
        self.runtimes
            .get(resource_type)
            .cloned()
            .ok_or_else(|| NodeError::RuntimeNotFound(resource_type.to_string()))
    }
}

impl Default for RuntimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
