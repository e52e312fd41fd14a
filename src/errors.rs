use crate::connectors::errors::PaymentError;
use crate::store::StoreError;

/// Top level error shape returned by every entity operation and service flow.
///
/// Store and payment failures are forwarded verbatim; nothing in this crate
/// retries or swallows them.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Persistence(#[from] StoreError),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid password combination!")]
    Auth,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}
