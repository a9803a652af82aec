//! Request validation errors.

use thiserror::Error;

/// Reasons a raw request body is rejected before reaching a coordinator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Body was valid JSON but not an object.
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("`{field}` is required")]
    MissingField { field: &'static str },

    #[error("`{field}` must be a non-empty string")]
    EmptyField { field: &'static str },

    #[error("`{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// Only greedy decoding is deterministic enough to cache.
    #[error("`temperature` must be 0 (got {value})")]
    NonZeroTemperature { value: f64 },
}

impl ValidationError {
    /// Stable code reported to callers.
    pub const CODE: &'static str = "VALIDATION_ERROR";
}
