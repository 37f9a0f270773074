use thiserror::Error;

/// Failures raised while building, signing, or submitting a user operation.
///
/// Construction-time failures (`InvalidField`, `ArithmeticOverflow`) are
/// detected locally before anything is signed or submitted. The validation
/// failures (`SignatureValidationFailed`, `ReplayedNonce`) are only ever
/// surfaced by the entry point; this crate reports them verbatim and never
/// retries on the caller's behalf.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),

    #[error("signature validation failed: {0}")]
    SignatureValidationFailed(String),

    #[error("nonce already consumed: {0}")]
    ReplayedNonce(String),

    #[error("entry point endpoint unreachable: {0}")]
    UnreachableEndpoint(String),

    #[error("malformed entry point response: {0}")]
    MalformedResponse(String),

    #[error("execution reverted: {0}")]
    ExecutionReverted(String),

    #[error("signer failure: {0}")]
    Signer(String),
}

impl OperationError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
