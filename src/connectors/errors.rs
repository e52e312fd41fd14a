/// Errors surfaced by the payment processor connector.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Transport-level failure reaching the processor
    #[error("payment request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The processor rejected the request
    #[error("payment api error {status}: {message}")]
    Api { status: u16, message: String },
    /// The processor answered with something we could not interpret
    #[error("invalid payment response: {0}")]
    InvalidResponse(String),
}
