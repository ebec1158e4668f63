//! Error types for the LoveSync core.

/// Top-level error type for the app core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),
}

/// Relationship-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Message content is empty")]
    EmptyMessage,

    #[error("No {role} participant in this session")]
    MissingParticipant { role: String },

    #[error("No active ritual to operate on")]
    NoActiveRitual,
}

/// Guided-flow errors.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Flow {flow} is missing required field {field}")]
    MissingField {
        flow: &'static str,
        field: &'static str,
    },

    #[error("Flow {flow} field {field} is invalid: {reason}")]
    InvalidField {
        flow: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("Terminal effect failed: {0}")]
    Effect(#[from] StoreError),
}

/// Result type alias for the app core.
pub type Result<T> = std::result::Result<T, Error>;
