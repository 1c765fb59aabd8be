use rust_decimal::Decimal;
use thiserror::Error;

/// input rejected before any calculation runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is not numeric: {input:?}")]
    NonNumeric { field: &'static str, input: String },

    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: Decimal,
        expected: String,
    },
}

/// status transition request that the state machine refuses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("illegal transition for {instrument}: {from} -> {requested}")]
    IllegalTransition {
        instrument: &'static str,
        from: String,
        requested: String,
    },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("operation not supported: {message}")]
    OperationNotSupported { message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
