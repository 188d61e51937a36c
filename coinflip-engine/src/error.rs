use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Round is not active")]
    RoundNotActive,

    #[error("Round has ended")]
    RoundEnded,

    #[error("Already joined this round: {0}")]
    AlreadyJoined(String),

    #[error("Payment verification failed")]
    PaymentVerificationFailed,

    #[error("Invalid coin side: {0}")]
    InvalidSide(String),

    #[error("Invalid round state: {0}")]
    InvalidState(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Join rejections are recoverable and leave the round untouched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::RoundNotActive
                | Self::RoundEnded
                | Self::AlreadyJoined(_)
                | Self::PaymentVerificationFailed
        )
    }

    /// Stable machine-readable code for display layers.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::RoundNotActive => "round_not_active",
            Self::RoundEnded => "round_ended",
            Self::AlreadyJoined(_) => "already_joined",
            Self::PaymentVerificationFailed => "payment_verification_failed",
            Self::InvalidSide(_) => "invalid_side",
            Self::InvalidState(_) => "invalid_state",
            Self::Config(_) => "invalid_config",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_codes() {
        assert_eq!(EngineError::RoundNotActive.reason_code(), "round_not_active");
        assert_eq!(EngineError::RoundEnded.reason_code(), "round_ended");
        assert_eq!(
            EngineError::AlreadyJoined("alice".to_string()).reason_code(),
            "already_joined"
        );
        assert_eq!(
            EngineError::PaymentVerificationFailed.reason_code(),
            "payment_verification_failed"
        );

        assert!(EngineError::RoundEnded.is_rejection());
        assert!(!EngineError::invalid_state("resolving").is_rejection());
        assert!(!EngineError::config("bad rake").is_rejection());
    }
}
