use crate::domain::session::PaymentStatus;
use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    /// The input does not carry the `upi://pay` prefix. Callers should treat
    /// this as "not a payment descriptor", not as a fault.
    #[error("not a UPI payment descriptor")]
    NotPaymentUri,
    #[error("malformed payment descriptor: {0}")]
    MalformedDescriptor(#[from] url::ParseError),
    #[error("payment descriptor is missing the payee identifier")]
    MissingPayee,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("unknown payment status: {0}")]
    UnknownStatus(String),
    #[error("unknown assistance channel: {0}")]
    UnknownChannel(String),
    /// A transition was invoked out of sequence. This indicates a caller-side
    /// sequencing bug, not a recoverable runtime condition.
    #[error("session precondition violated: {0}")]
    Precondition(&'static str),
    #[error("session already reached terminal status {0}")]
    TerminalStatus(PaymentStatus),
    #[error("remote collaborator error: {0}")]
    Remote(String),
}
