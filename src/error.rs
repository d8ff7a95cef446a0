use crate::llm::LlmError;

/// Failures surfaced to callers of the legal Q&A service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Configuration(String),
    #[error("AI service timeout")]
    UpstreamTimeout,
    /// `status` is the upstream HTTP status when one was received
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
    #[error("{0}")]
    Internal(String),
}

impl From<LlmError> for ServiceError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => ServiceError::Configuration(e.to_string()),
            LlmError::Timeout => ServiceError::UpstreamTimeout,
            LlmError::Status { status, .. } => ServiceError::Upstream {
                status: Some(status),
                message: e.to_string(),
            },
            LlmError::MalformedResponse(_) | LlmError::Transport(_) => ServiceError::Upstream {
                status: None,
                message: format!("AI service error: {}", e),
            },
        }
    }
}
