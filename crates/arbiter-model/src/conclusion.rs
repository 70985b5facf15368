use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level verdict of a validation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Indication {
    Passed,
    Indeterminate,
    Failed,
}

/// Fine-grained reason code attached to a non-passed conclusion.
///
/// Closed enumeration following the ETSI EN 319 102-1 sub-indication set,
/// restricted to the codes this engine can produce plus the standard codes
/// a report consumer must be prepared to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubIndication {
    FormatFailure,
    NoSigningCertificateFound,
    NoCertificateChainFound,
    Revoked,
    RevokedNoPoe,
    OutOfBoundsNoPoe,
    RevocationOutOfBoundsNoPoe,
    TryLater,
    CertificateChainGeneralFailure,
    CryptoConstraintsFailure,
    NoRevocationDataForRevocationIssuer,
    NoPoe,
}

impl fmt::Display for Indication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Indication::Passed => "PASSED",
            Indication::Indeterminate => "INDETERMINATE",
            Indication::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

impl fmt::Display for SubIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubIndication::FormatFailure => "FORMAT_FAILURE",
            SubIndication::NoSigningCertificateFound => "NO_SIGNING_CERTIFICATE_FOUND",
            SubIndication::NoCertificateChainFound => "NO_CERTIFICATE_CHAIN_FOUND",
            SubIndication::Revoked => "REVOKED",
            SubIndication::RevokedNoPoe => "REVOKED_NO_POE",
            SubIndication::OutOfBoundsNoPoe => "OUT_OF_BOUNDS_NO_POE",
            SubIndication::RevocationOutOfBoundsNoPoe => "REVOCATION_OUT_OF_BOUNDS_NO_POE",
            SubIndication::TryLater => "TRY_LATER",
            SubIndication::CertificateChainGeneralFailure => "CERTIFICATE_CHAIN_GENERAL_FAILURE",
            SubIndication::CryptoConstraintsFailure => "CRYPTO_CONSTRAINTS_FAILURE",
            SubIndication::NoRevocationDataForRevocationIssuer => {
                "NO_REVOCATION_DATA_FOR_REVOCATION_ISSUER"
            }
            SubIndication::NoPoe => "NO_POE",
        };
        f.write_str(s)
    }
}

/// A message produced by one check, tagged with the check name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Name of the check that produced the message.
    pub check: String,
    /// Human-readable text.
    pub text: String,
}

impl Message {
    pub fn new(check: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            text: text.into(),
        }
    }
}

/// Outcome of one chain execution: the verdict plus every message the
/// checks emitted, in evaluation order. Created fresh per chain run and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusion {
    pub indication: Indication,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_indication: Option<SubIndication>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infos: Vec<Message>,
}

impl Conclusion {
    /// A passed conclusion with no messages.
    pub fn passed() -> Self {
        Self {
            indication: Indication::Passed,
            sub_indication: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.indication == Indication::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.indication == Indication::Failed
    }

    pub fn is_indeterminate(&self) -> bool {
        self.indication == Indication::Indeterminate
    }
}
