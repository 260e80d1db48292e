use thiserror::Error;

/// Failures a provider client can report to the resolution engine.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Upstream unreachable or a non-success HTTP status. Retryable.
    #[error("transport error: {0}")]
    Transport(String),

    /// Missing or rejected credential. Needs operator intervention.
    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_is_retryable() {
        assert!(ProviderError::Transport("timeout".into()).is_retryable());
        assert!(!ProviderError::Auth("bad key".into()).is_retryable());
        assert!(!ProviderError::NotFound("cik".into()).is_retryable());
        assert!(!ProviderError::Config("period".into()).is_retryable());
    }

    #[test]
    fn auth_display_is_distinct() {
        let err = ProviderError::Auth("key expired".into());
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "authorization failed: key expired");
    }
}
