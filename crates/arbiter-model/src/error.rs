use crate::token::TokenId;

/// Faults in the supplied fact graph, detected before the engine runs.
///
/// These are the only non-local errors in the system: a dangling reference
/// means the diagnostic-data builder broke its contract, and the engine
/// refuses to start rather than panic mid-walk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactError {
    #[error("duplicate token id: {id}")]
    DuplicateToken { id: TokenId },

    #[error("unknown certificate {id} referenced by {referenced_by}")]
    UnknownCertificate { id: TokenId, referenced_by: TokenId },

    #[error("unknown revocation data {id} referenced by {referenced_by}")]
    UnknownRevocation { id: TokenId, referenced_by: TokenId },

    #[error("validation target {id} is not present in the diagnostic data")]
    UnknownTarget { id: TokenId },

    #[error("revocation data {id} targets {target} but is listed by {listed_by}")]
    RevocationTargetMismatch {
        id: TokenId,
        target: TokenId,
        listed_by: TokenId,
    },
}
