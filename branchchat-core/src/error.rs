//! Error types for branchchat operations

/// Result type for branchchat operations
pub type Result<T> = std::result::Result<T, BranchChatError>;

/// Error types for the conversation graph
#[derive(Debug, thiserror::Error)]
pub enum BranchChatError {
    /// Referenced node id is absent from the store
    #[error("Node not found: {0}")]
    NotFound(String),

    /// Explicit node id is already taken
    #[error("Node already exists: {0}")]
    Conflict(String),

    /// Request is well-formed but not meaningful (e.g. merging a node into itself)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Responder (LLM backend) failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BranchChatError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Backend(_) => "backend_error",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Report any failure raised by a responder as a backend error
    pub fn into_backend(self) -> Self {
        match self {
            Self::Backend(_) => self,
            other => Self::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BranchChatError::NotFound("BRANCH-9".to_string());
        assert_eq!(err.to_string(), "Node not found: BRANCH-9");
        assert_eq!(err.kind(), "not_found");

        let err = BranchChatError::Conflict("ROOT".to_string());
        assert_eq!(err.to_string(), "Node already exists: ROOT");
    }

    #[test]
    fn test_error_kinds() {
        let kinds: Vec<_> = [
            BranchChatError::NotFound(String::new()),
            BranchChatError::Conflict(String::new()),
            BranchChatError::InvalidArgument(String::new()),
            BranchChatError::Backend(String::new()),
            BranchChatError::Configuration(String::new()),
        ]
        .iter()
        .map(BranchChatError::kind)
        .collect();
        assert_eq!(
            kinds,
            [
                "not_found",
                "conflict",
                "invalid_argument",
                "backend_error",
                "configuration"
            ]
        );
    }

    #[test]
    fn test_into_backend() {
        let err = BranchChatError::Configuration("no key".to_string()).into_backend();
        assert!(matches!(err, BranchChatError::Backend(ref m) if m == "Configuration error: no key"));

        let err = BranchChatError::Backend("timeout".to_string()).into_backend();
        assert!(matches!(err, BranchChatError::Backend(ref m) if m == "timeout"));
    }
}
