use thiserror::Error;

pub type SoResult<T> = Result<T, SoError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid identifier for {what}: {value} (ids must be positive 32-bit integers)")]
    InvalidId { what: &'static str, value: i64 },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
