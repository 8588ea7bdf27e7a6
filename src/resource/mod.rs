//! Resource data model.
//!
//! A [`Resource`] is one declaratively configured infrastructure unit: an id,
//! a type tag selecting a [`Runtime`](crate::runtime::Runtime), an arbitrarily
//! nested attribute payload, and the ids of the resources it depends on.
//! [`ResourceIndex`] maps resource keys to resources; three such indices
//! (context, prior state, live) exist per operation. The [`Release`] is the
//! mutable record of one operation's resulting resource states.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One declaratively configured infrastructure unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    /// Unique key within one operation.
    pub id: String,

    /// Type tag selecting the runtime that owns this resource.
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Desired configuration payload: nested mappings, sequences, scalars.
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// Ids of resources this one depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Resource {
            id: id.into(),
            resource_type: resource_type.into(),
            attributes: Map::new(),
            depends_on: Vec::new(),
        }
    }

    /// Key under which this resource is indexed.
    pub fn resource_key(&self) -> &str {
        &self.id
    }
}

/// Mapping from resource key to resource.
pub type ResourceIndex = HashMap<String, Resource>;

/// Build a [`ResourceIndex`] from a slice of resources.
pub fn index_resources(resources: &[Resource]) -> ResourceIndex {
    resources
        .iter()
        .map(|r| (r.resource_key().to_string(), r.clone()))
        .collect()
}

/// Action decided upstream for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Create,
    Update,
    Delete,
    Unchanged,
}

/// Kind of operation one graph walk performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Apply,
    Destroy,
    Preview,
}

/// Lifecycle phase of a [`Release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleasePhase {
    Running,
    Succeeded,
    Failed,
}

/// Mutable record of one operation's progress: the evolving collection of
/// resource states plus the overall phase. Mutated one resource at a time
/// under the operation lock; finalized when the walk completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub resources: HashMap<String, Resource>,
    pub phase: ReleasePhase,
}

impl Release {
    pub fn new() -> Self {
        Release {
            resources: HashMap::new(),
            phase: ReleasePhase::Running,
        }
    }
}

impl Default for Release {
    fn default() -> Self {
        Self::new()
    }
}
