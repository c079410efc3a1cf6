//! Failure taxonomy for the correction pipeline.
//!
//! The enum travels inside `anyhow::Error`; callers that need to branch on
//! the kind (the retry controller, the CLI) downcast with `LlmError::of`.
//! Only `RateLimited` is ever retried.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Missing credential or unresolvable model identifier. Raised before
    /// any network call; never retried.
    Configuration(String),
    /// 429-equivalent transient failure. The only retryable kind.
    RateLimited,
    /// Non-rate-limit network or HTTP failure.
    Transport(String),
    /// Structurally invalid payload missing mandatory fields.
    MalformedResponse(String),
    /// Rate limiting persisted past the retry budget.
    RetriesExhausted,
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Configuration(msg) => write!(f, "{}", msg),
            LlmError::RateLimited => write!(f, "Rate limited by the Gemini API."),
            LlmError::Transport(msg) => write!(f, "{}", msg),
            LlmError::MalformedResponse(msg) => write!(f, "{}", msg),
            LlmError::RetriesExhausted => write!(
                f,
                "Rate limited by the Gemini API after multiple retries. Try again later."
            ),
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// The typed kind carried by an `anyhow::Error`, if any.
    pub fn of(err: &anyhow::Error) -> Option<&LlmError> {
        err.downcast_ref::<LlmError>()
    }

    /// Retryability predicate for the retry controller.
    pub fn is_rate_limited(err: &anyhow::Error) -> bool {
        matches!(Self::of(err), Some(LlmError::RateLimited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_through_anyhow() {
        let err = anyhow::Error::new(LlmError::RateLimited);
        assert_eq!(LlmError::of(&err), Some(&LlmError::RateLimited));
        assert!(LlmError::is_rate_limited(&err));
    }

    #[test]
    fn test_non_rate_limit_kinds_are_not_retryable() {
        for err in [
            anyhow::Error::new(LlmError::Transport("boom".to_string())),
            anyhow::Error::new(LlmError::Configuration("no key".to_string())),
            anyhow::Error::new(LlmError::MalformedResponse("bad".to_string())),
            anyhow::anyhow!("untyped"),
        ] {
            assert!(!LlmError::is_rate_limited(&err));
        }
    }

    #[test]
    fn test_retries_exhausted_message_is_user_facing() {
        let msg = LlmError::RetriesExhausted.to_string();
        assert!(msg.contains("Try again later"));
    }
}
