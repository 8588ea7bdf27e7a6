use thiserror::Error;

/// Node-level errors
///
/// These are fatal to the affected resource node only: the walker marks the
/// node failed, skips its dependents, and lets independent branches proceed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("can't find specified value in resource:{resource} by ref:{reference}")]
    IllegalManifest { resource: String, reference: String },
    #[error("malformed implicit reference: {0}")]
    MalformedRef(String),
    #[error("runtime not found for resource type: {0}")]
    RuntimeNotFound(String),
    #[error("runtime operation failed: {0}")]
    ProviderFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_error_display() {
        assert_eq!(
            NodeError::IllegalManifest {
                resource: "jack".into(),
                reference: "jack.notExist".into()
            }
            .to_string(),
            "can't find specified value in resource:jack by ref:jack.notExist"
        );
        assert_eq!(
            NodeError::MalformedRef("jack".into()).to_string(),
            "malformed implicit reference: jack"
        );
        assert_eq!(
            NodeError::RuntimeNotFound("kubernetes".into()).to_string(),
            "runtime not found for resource type: kubernetes"
        );
        assert_eq!(
            NodeError::ProviderFailure("apply rejected".into()).to_string(),
            "runtime operation failed: apply rejected"
        );
    }
}
