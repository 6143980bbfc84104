use thiserror::Error;

use crate::claims::TokenType;

/// Precise failure kinds for token operations.
///
/// The full taxonomy is only visible inside the process (logging, tests,
/// rotation race resolution). Both gateways collapse every rejection kind
/// into a single externally observable "unauthenticated" outcome so callers
/// cannot probe whether a token was expired, forged, or revoked.
/// `StoreUnavailable` is the one exception: an availability failure must
/// never be presented as a verdict.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Input is not a parseable token
    #[error("token is malformed")]
    Malformed,

    /// Signature does not verify under the process-wide key
    #[error("token signature is invalid")]
    InvalidSignature,

    /// `exp` is now or in the past
    #[error("token has expired")]
    Expired,

    /// Access token presented where refresh was expected, or vice versa
    #[error("wrong token type: expected {expected}, got {actual}")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },

    /// Token ID is present in the revocation cache
    #[error("token has been revoked")]
    Revoked,

    /// Revocation store unreachable or timed out; not a verdict
    #[error("revocation store unavailable: {0}")]
    StoreUnavailable(String),

    /// Signing failed while encoding (configuration-level fault)
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    /// True for failures that mean "this token is not acceptable", as
    /// opposed to infrastructure faults.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            TokenError::StoreUnavailable(_) | TokenError::Signing(_)
        )
    }
}
