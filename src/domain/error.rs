use thiserror::Error;

/// Typed failures the engine surfaces to callers. Gateway submission
/// failures are deliberately not here: a failed attempt is terminal for
/// that order and is reported through the audit sink, never retried or
/// propagated as an engine error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("order not ready to send: {0}")]
    OrderNotReady(String),

    #[error("invalid pricing input: {0}")]
    InvalidPricingInput(&'static str),
}
