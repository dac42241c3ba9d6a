/// The proofmark error type.
#[derive(Debug, thiserror::Error)]
pub enum PMError {
    #[error("Internal error: [{0}]")]
    InternalError(String),

    #[error("I/O error")]
    IOError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed constant: {0}")]
    MalformedConstant(String),

    #[error("Display digest unavailable: {0}")]
    DigestUnavailable(String),

    #[error("Original record does not verify against the configured key material")]
    SelfTestFailed,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("Usage error: {0}")]
    UsageError(&'static str),
}

impl From<hex::FromHexError> for PMError {
    fn from(err: hex::FromHexError) -> Self {
        PMError::MalformedConstant(err.to_string())
    }
}
