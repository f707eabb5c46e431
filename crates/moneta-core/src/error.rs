use moneta_domain::InvariantViolation;
use thiserror::Error;

/// Failures surfaced by the reducer and inverter. The reducer catches
/// nothing; callers handle these at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    #[error("transaction batches may only contain transaction updates and deletes")]
    InvalidSubAction,
    #[error("sub-action targets budget {0} instead of the enclosing budget")]
    ForeignSubAction(i64),
}
