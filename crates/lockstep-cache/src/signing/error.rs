use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("signing secret is missing or empty (set LOCKSTEP_SIGNING_SECRET)")]
    MissingSecret,
}
