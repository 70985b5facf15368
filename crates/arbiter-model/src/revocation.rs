use crate::token::TokenId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of revocation evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationKind {
    Ocsp,
    Crl,
}

/// Status claimed for the target certificate at production time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CertificateStatus {
    /// The issuer knows the certificate and reports it not revoked.
    Good,
    /// The certificate has been revoked.
    Revoked {
        revocation_time: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// The certificate is suspended (certificateHold).
    OnHold { hold_time: DateTime<Utc> },
    /// The issuer has no information about the certificate.
    Unknown,
}

/// An immutable revocation data fact record (one OCSP response or CRL,
/// already decoded by the diagnostic-data builder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationData {
    /// Token identifier.
    pub id: TokenId,

    /// OCSP or CRL.
    pub kind: RevocationKind,

    /// The certificate this token makes a claim about.
    pub target: TokenId,

    /// When the token was produced (producedAt / CRL issuance).
    pub production_time: DateTime<Utc>,

    /// thisUpdate field. Its absence is a consistency fault, not a parse
    /// error, so it stays optional here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub this_update: Option<DateTime<Utc>>,

    /// nextUpdate field, when the issuer announced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_update: Option<DateTime<Utc>>,

    /// Claimed status of the target at production time.
    pub status: CertificateStatus,

    /// Certificate that signed this token, when identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<TokenId>,

    /// Issuance chain of the signer, signer first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signer_chain: Vec<TokenId>,

    /// Verdict of the external cryptographic verifier for this token.
    #[serde(default)]
    pub signature_intact: bool,

    /// Digest algorithm used by the token signature, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_algorithm: Option<String>,

    /// expiredCertsOnCRL extension (CRL only): the issuer keeps expired
    /// certificates on the list back to this date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_certs_on_crl: Option<DateTime<Utc>>,

    /// ArchiveCutoff extension (OCSP only, RFC 6960 §4.4.4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_cut_off: Option<DateTime<Utc>>,

    /// certHash extension present in the OCSP response.
    #[serde(default)]
    pub cert_hash_present: bool,

    /// certHash digest matches the target certificate.
    #[serde(default)]
    pub cert_hash_match: bool,
}

impl RevocationData {
    /// Create a revocation token claiming `Good` for the target, with
    /// thisUpdate equal to the production time.
    pub fn new(
        id: impl Into<TokenId>,
        kind: RevocationKind,
        target: impl Into<TokenId>,
        production_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            target: target.into(),
            production_time,
            this_update: Some(production_time),
            next_update: None,
            status: CertificateStatus::Good,
            signer: None,
            signer_chain: Vec::new(),
            signature_intact: false,
            digest_algorithm: None,
            expired_certs_on_crl: None,
            archive_cut_off: None,
            cert_hash_present: false,
            cert_hash_match: false,
        }
    }

    /// Set the claimed status.
    pub fn with_status(mut self, status: CertificateStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the thisUpdate field (use `None` to model a malformed token).
    pub fn with_this_update(mut self, this_update: Option<DateTime<Utc>>) -> Self {
        self.this_update = this_update;
        self
    }

    /// Set the nextUpdate field.
    pub fn with_next_update(mut self, next_update: DateTime<Utc>) -> Self {
        self.next_update = Some(next_update);
        self
    }

    /// Set the signing certificate and its chain (signer first).
    pub fn with_signer(mut self, signer: impl Into<TokenId>, chain: Vec<TokenId>) -> Self {
        let signer = signer.into();
        self.signer = Some(signer.clone());
        let mut signer_chain = vec![signer];
        signer_chain.extend(chain);
        signer_chain.dedup();
        self.signer_chain = signer_chain;
        self
    }

    /// Mark the token signature as cryptographically intact.
    pub fn with_intact_signature(mut self) -> Self {
        self.signature_intact = true;
        self
    }

    /// Set the digest algorithm of the token signature.
    pub fn with_digest_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.digest_algorithm = Some(algorithm.into());
        self
    }

    /// Whether the claimed status is a revocation.
    pub fn is_revoked(&self) -> bool {
        matches!(self.status, CertificateStatus::Revoked { .. })
    }

    /// Whether the claimed status is a suspension.
    pub fn is_on_hold(&self) -> bool {
        matches!(self.status, CertificateStatus::OnHold { .. })
    }
}
