//! Error types for the question flow.

use intestacy_core::CalcError;

/// Errors from building or driving the question flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The raw answer does not fit the pending question. The session is
    /// untouched and the same question should be asked again.
    #[error("{message}")]
    InvalidInput { question: String, message: String },

    #[error("unknown question id '{0}'")]
    UnknownQuestionId(String),

    #[error("question '{question}' has no transition for answer '{answer}'")]
    MissingTransition { question: String, answer: bool },

    #[error("transition table contains a cycle through question '{0}'")]
    CyclicTransition(String),

    #[error("session has already been resolved")]
    AlreadyResolved,

    #[error(transparent)]
    Calculation(#[from] CalcError),
}

impl FlowError {
    pub(crate) fn invalid(question: impl ToString, message: impl Into<String>) -> Self {
        FlowError::InvalidInput {
            question: question.to_string(),
            message: message.into(),
        }
    }

    /// Whether the caller can recover by asking the same question again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FlowError::InvalidInput { .. })
    }
}
